use crate::{
    cert_cache::CertCache,
    config::SkillConfig,
    dispatcher::{Dispatcher, Reply},
    pipeline::{AuthState, AuthVerdict, FetchedCertificate},
    request::InboundRequest,
};
use failure::Error;
use log::debug;
use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};
use url::Url;

/// Blocking counterpart of `CertificateFetcher`
pub trait BlockingCertificateFetcher: Send + Sync {
    fn fetch(&self, url: &Url) -> Result<FetchedCertificate, Error>;
}

/// Downloads certificates with a `reqwest::blocking::Client`. Must not be created
/// or used from inside an async runtime.
#[derive(Debug, Clone, Default)]
pub struct HttpBlockingCertificateFetcher {
    client: reqwest::blocking::Client,
}

impl HttpBlockingCertificateFetcher {
    pub fn new(client: reqwest::blocking::Client) -> Self {
        HttpBlockingCertificateFetcher { client }
    }
}

impl BlockingCertificateFetcher for HttpBlockingCertificateFetcher {
    fn fetch(&self, url: &Url) -> Result<FetchedCertificate, Error> {
        // Get cert using validated SignatureCertChainUrl
        let resp = self.client.get(url.clone()).send()?;
        let status = resp.status().as_u16();
        let bytes = resp.bytes()?;

        Ok(FetchedCertificate {
            status,
            body: bytes.to_vec(),
        })
    }
}

/// Authenticates requests synchronously. Certificates are downloaded for every
/// request unless a cache is enabled with `with_cert_cache`.
pub struct BlockingRequestAuthenticator<F = HttpBlockingCertificateFetcher> {
    fetcher: F,
    cert_cache: Option<Mutex<CertCache>>,
}

impl Default for BlockingRequestAuthenticator {
    fn default() -> Self {
        BlockingRequestAuthenticator::with_fetcher(HttpBlockingCertificateFetcher::default())
    }
}

impl BlockingRequestAuthenticator {
    /// Create default instance, fetching over https with no cache
    pub fn new() -> Self {
        BlockingRequestAuthenticator::default()
    }
}

impl<F: BlockingCertificateFetcher> BlockingRequestAuthenticator<F> {
    pub fn with_fetcher(fetcher: F) -> Self {
        BlockingRequestAuthenticator {
            fetcher,
            cert_cache: None,
        }
    }

    /// Keep downloaded certificates per chain url for `ttl`. Cached bytes still
    /// go through every certificate and signature check on each request.
    pub fn with_cert_cache(mut self, ttl: Duration) -> Self {
        self.cert_cache = Some(Mutex::new(CertCache::new(ttl)));
        self
    }

    /// Number of certificates currently held by the cache
    pub fn cached_certificates(&self) -> usize {
        self.cert_cache.as_ref().map_or(0, |cache| lock(cache).len())
    }

    /// Verify that the request came from Alexa.
    ///
    /// - `SignatureCertChainUrl` and `Signature` are headers of the request
    ///
    /// - The raw body of the request is used for signature verification
    pub fn authenticate(&self, request: &InboundRequest) -> AuthVerdict {
        let mut state = AuthState::Start;

        loop {
            state = match state.into_verdict() {
                Ok(verdict) => return verdict,
                Err(AuthState::UrlValidated {
                    cert_url,
                    signature,
                }) => AuthState::on_fetched(self.retrieve_cert(&cert_url), signature),
                Err(state) => state.advance(request),
            };
        }
    }

    fn retrieve_cert(&self, cert_url: &Url) -> Result<FetchedCertificate, Error> {
        let cache = match &self.cert_cache {
            Some(cache) => cache,
            None => return self.fetcher.fetch(cert_url),
        };

        let cached = lock(cache).get(cert_url);
        if let Some(pem) = cached {
            debug!("Using cached certificate for {}", cert_url);
            return Ok(FetchedCertificate {
                status: 200,
                body: pem,
            });
        }

        let fetched = self.fetcher.fetch(cert_url)?;
        if fetched.status == 200 {
            lock(cache).insert(cert_url, fetched.body.clone());
        }

        Ok(fetched)
    }
}

// A panic while holding the lock cannot leave the map half written
fn lock(cache: &Mutex<CertCache>) -> MutexGuard<'_, CertCache> {
    cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Blocking counterpart of `SkillService`
pub struct BlockingSkillService<F = HttpBlockingCertificateFetcher> {
    authenticator: BlockingRequestAuthenticator<F>,
    dispatcher: Dispatcher,
}

impl BlockingSkillService {
    pub fn new(config: Arc<SkillConfig>) -> Self {
        BlockingSkillService::with_authenticator(config, BlockingRequestAuthenticator::new())
    }
}

impl<F: BlockingCertificateFetcher> BlockingSkillService<F> {
    pub fn with_authenticator(
        config: Arc<SkillConfig>,
        authenticator: BlockingRequestAuthenticator<F>,
    ) -> Self {
        BlockingSkillService {
            authenticator,
            dispatcher: Dispatcher::new(config),
        }
    }

    pub fn handle(&self, request: &InboundRequest) -> Reply {
        let verdict = self.authenticator.authenticate(request);
        self.dispatcher.respond(request, &verdict)
    }
}
