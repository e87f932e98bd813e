use crate::{
    cert_cache::CertCache,
    config::SkillConfig,
    dispatcher::{Dispatcher, Reply},
    pipeline::{AuthState, AuthVerdict, FetchedCertificate},
    request::InboundRequest,
};
use failure::Error;
use futures_util::lock::Mutex;
use log::debug;
use std::{future::Future, sync::Arc, time::Duration};
use url::Url;

/// Retrieves the signing certificate from an already validated chain url
pub trait CertificateFetcher: Send + Sync {
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<FetchedCertificate, Error>> + Send;
}

/// Downloads certificates with a shared `reqwest::Client`
#[derive(Debug, Clone, Default)]
pub struct HttpCertificateFetcher {
    client: reqwest::Client,
}

impl HttpCertificateFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        HttpCertificateFetcher { client }
    }
}

impl CertificateFetcher for HttpCertificateFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedCertificate, Error> {
        // Get cert using validated SignatureCertChainUrl
        let resp = self.client.get(url.clone()).send().await?;
        let status = resp.status().as_u16();
        let bytes = resp.bytes().await?;

        Ok(FetchedCertificate {
            status,
            body: bytes.to_vec(),
        })
    }
}

/// Authenticates requests asynchronously. The certificate download is the only
/// await point; dropping the returned future abandons it.
///
/// Certificates are downloaded for every request unless a cache is enabled with
/// `with_cert_cache`.
pub struct RequestAuthenticator<F = HttpCertificateFetcher> {
    fetcher: F,
    cert_cache: Option<Mutex<CertCache>>,
}

impl Default for RequestAuthenticator {
    fn default() -> Self {
        RequestAuthenticator::with_fetcher(HttpCertificateFetcher::default())
    }
}

impl RequestAuthenticator {
    /// Create default instance, fetching over https with no cache
    pub fn new() -> Self {
        RequestAuthenticator::default()
    }
}

impl<F: CertificateFetcher> RequestAuthenticator<F> {
    pub fn with_fetcher(fetcher: F) -> Self {
        RequestAuthenticator {
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
    pub async fn cached_certificates(&self) -> usize {
        match &self.cert_cache {
            Some(cache) => cache.lock().await.len(),
            None => 0,
        }
    }

    /// Asynchronously verify that the request came from Alexa.
    ///
    /// - `SignatureCertChainUrl` and `Signature` are headers of the request
    ///
    /// - The raw body of the request is used for signature verification
    pub async fn authenticate(&self, request: &InboundRequest) -> AuthVerdict {
        let mut state = AuthState::Start;

        loop {
            state = match state.into_verdict() {
                Ok(verdict) => return verdict,
                Err(AuthState::UrlValidated {
                    cert_url,
                    signature,
                }) => AuthState::on_fetched(self.retrieve_cert(&cert_url).await, signature),
                Err(state) => state.advance(request),
            };
        }
    }

    async fn retrieve_cert(&self, cert_url: &Url) -> Result<FetchedCertificate, Error> {
        let cache = match &self.cert_cache {
            Some(cache) => cache,
            None => return self.fetcher.fetch(cert_url).await,
        };

        let cached = cache.lock().await.get(cert_url);
        if let Some(pem) = cached {
            debug!("Using cached certificate for {}", cert_url);
            return Ok(FetchedCertificate {
                status: 200,
                body: pem,
            });
        }

        let fetched = self.fetcher.fetch(cert_url).await?;
        if fetched.status == 200 {
            cache.lock().await.insert(cert_url, fetched.body.clone());
        }

        Ok(fetched)
    }
}

/// Authenticates, validates and dispatches requests for one skill
pub struct SkillService<F = HttpCertificateFetcher> {
    authenticator: RequestAuthenticator<F>,
    dispatcher: Dispatcher,
}

impl SkillService {
    pub fn new(config: Arc<SkillConfig>) -> Self {
        SkillService::with_authenticator(config, RequestAuthenticator::new())
    }
}

impl<F: CertificateFetcher> SkillService<F> {
    pub fn with_authenticator(config: Arc<SkillConfig>, authenticator: RequestAuthenticator<F>) -> Self {
        SkillService {
            authenticator,
            dispatcher: Dispatcher::new(config),
        }
    }

    pub async fn handle(&self, request: &InboundRequest) -> Reply {
        let verdict = self.authenticator.authenticate(request).await;
        self.dispatcher.respond(request, &verdict)
    }
}
