#![allow(dead_code)]

use alexa_skill_webhook::{
    format_response, BlockingCertificateFetcher, CertificateFetcher, FetchedCertificate, Headers, InboundRequest, IntentTable, MessageTemplate,
    Messages, SkillConfig, ValidatedRequest,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use failure::{format_err, Error};
use rsa::{
    pkcs1v15::SigningKey,
    pkcs8::DecodePrivateKey,
    signature::{SignatureEncoding, Signer},
    RsaPrivateKey,
};
use serde_json::json;
use sha1::Sha1;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use url::Url;

pub const SIGNING_KEY: &str = include_str!("../fixtures/signing-key.pem");
pub const TRUSTED_CERT: &[u8] = include_bytes!("../fixtures/echo-api-cert.pem");
pub const UNTRUSTED_CERT: &[u8] = include_bytes!("../fixtures/untrusted-cert.pem");
pub const EXPIRED_CERT: &[u8] = include_bytes!("../fixtures/expired-cert.pem");

pub const CERT_URL: &str = "https://s3.amazonaws.com/echo.api/echo-api-cert.pem";
pub const SKILL_ID: &str = "123456789";
pub const NOW: &str = "2027-01-15T08:00:00Z";

pub fn now() -> OffsetDateTime {
    OffsetDateTime::parse(NOW, &Rfc3339).unwrap()
}

pub fn sign(body: &[u8]) -> String {
    let key = RsaPrivateKey::from_pkcs8_pem(SIGNING_KEY).unwrap();
    let signature = SigningKey::<Sha1>::new(key).sign(body);
    STANDARD.encode(signature.to_bytes())
}

pub fn launch_body(application_id: &str, timestamp: &str) -> Vec<u8> {
    serde_json::to_vec(&json!({
        "version": "1.0",
        "session": { "application": { "applicationId": application_id } },
        "request": { "type": "LaunchRequest", "timestamp": timestamp }
    }))
    .unwrap()
}

pub fn intent_body(name: &str, timestamp: &str) -> Vec<u8> {
    serde_json::to_vec(&json!({
        "version": "1.0",
        "session": { "application": { "applicationId": SKILL_ID } },
        "request": {
            "type": "IntentRequest",
            "timestamp": timestamp,
            "intent": { "name": name }
        }
    }))
    .unwrap()
}

/// Request signed with the fixture key, arriving at `NOW`
pub fn signed_request(body: Vec<u8>, cert_url: &str) -> InboundRequest {
    let signature = sign(&body);
    let headers: Headers = vec![
        ("SignatureCertChainUrl", cert_url.to_string()),
        ("Signature", signature),
    ]
    .into_iter()
    .collect();
    InboundRequest::new(body, Some(headers)).with_received_at(now())
}

pub fn messages() -> Messages {
    Messages {
        launch: MessageTemplate::new("Random Books. Please request a book."),
        help: MessageTemplate::new("You can say, give me a random book.")
            .with_reprompt("What would you like?"),
        cancel: MessageTemplate::new("Good-bye"),
        stop: MessageTemplate::new("Good-bye"),
        error: MessageTemplate::new("An error occurred retrieving your request.")
            .with_reprompt("Try asking for a random book."),
    }
}

/// Config without `GetRandomBook` registered
pub fn config() -> Arc<SkillConfig> {
    Arc::new(SkillConfig::new(SKILL_ID, messages(), IntentTable::with_builtins()))
}

pub fn config_with_books() -> Arc<SkillConfig> {
    let intents = IntentTable::with_builtins().register(
        "GetRandomBook",
        |_: &ValidatedRequest, _: &Messages| {
            Ok(format_response(
                "If you're looking for a random book to read, check out Hamlet by William Shakespeare",
                Some("If you would like a new random book, please request a new book."),
                false,
            ))
        },
    );
    Arc::new(SkillConfig::new(SKILL_ID, messages(), intents))
}

/// Serves a fixed response and counts how often it was asked
#[derive(Clone)]
pub struct StaticFetcher {
    pub status: u16,
    pub body: Vec<u8>,
    pub calls: Arc<AtomicUsize>,
}

impl StaticFetcher {
    pub fn serving(body: &[u8]) -> Self {
        StaticFetcher {
            status: 200,
            body: body.to_vec(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn status(status: u16) -> Self {
        StaticFetcher {
            status,
            body: vec![],
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn respond(&self) -> Result<FetchedCertificate, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(FetchedCertificate {
            status: self.status,
            body: self.body.clone(),
        })
    }
}

/// Fails like an unreachable host
pub struct UnreachableFetcher;

impl UnreachableFetcher {
    pub fn respond(&self) -> Result<FetchedCertificate, Error> {
        Err(format_err!("connection refused"))
    }
}

impl CertificateFetcher for StaticFetcher {
    async fn fetch(&self, _url: &Url) -> Result<FetchedCertificate, Error> {
        self.respond()
    }
}

impl BlockingCertificateFetcher for StaticFetcher {
    fn fetch(&self, _url: &Url) -> Result<FetchedCertificate, Error> {
        self.respond()
    }
}

impl CertificateFetcher for UnreachableFetcher {
    async fn fetch(&self, _url: &Url) -> Result<FetchedCertificate, Error> {
        self.respond()
    }
}

impl BlockingCertificateFetcher for UnreachableFetcher {
    fn fetch(&self, _url: &Url) -> Result<FetchedCertificate, Error> {
        self.respond()
    }
}
