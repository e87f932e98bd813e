use crate::constants::MAX_CACHED_CERTIFICATES;
use std::{
    collections::HashMap,
    time::{Duration, Instant},
};
use url::Url;

/// Downloaded certificates keyed by chain url, shared by both authenticators
/// behind their own lock.
///
/// Query and fragment are not part of the key, and the map never holds more than
/// `MAX_CACHED_CERTIFICATES` entries.
pub(crate) struct CertCache {
    ttl: Duration,
    entries: HashMap<String, (Instant, Vec<u8>)>,
}

impl CertCache {
    pub fn new(ttl: Duration) -> Self {
        CertCache {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn get(&self, cert_url: &Url) -> Option<Vec<u8>> {
        match self.entries.get(&cache_key(cert_url)) {
            Some((fetched_at, pem)) if fetched_at.elapsed() < self.ttl => Some(pem.clone()),
            _ => None,
        }
    }

    pub fn insert(&mut self, cert_url: &Url, pem: Vec<u8>) {
        let ttl = self.ttl;
        self.entries
            .retain(|_, (fetched_at, _)| fetched_at.elapsed() < ttl);

        let key = cache_key(cert_url);
        if !self.entries.contains_key(&key) && self.entries.len() >= MAX_CACHED_CERTIFICATES {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, (fetched_at, _))| *fetched_at)
                .map(|(key, _)| key.clone());
            if let Some(oldest) = oldest {
                self.entries.remove(&oldest);
            }
        }

        self.entries.insert(key, (Instant::now(), pem));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

fn cache_key(cert_url: &Url) -> String {
    let mut key = cert_url.clone();
    key.set_query(None);
    key.set_fragment(None);
    key.into()
}
