//! Authenticate, validate and dispatch incoming requests for Alexa custom,
//! webservice skills.
//!
//! - Built using the [Developer Documentation](https://developer.amazon.com/docs/custom-skills/host-a-custom-skill-as-a-web-service.html#manually-verify-request-sent-by-alexa)
//! as reference.
//!
//! Every request goes through the same gates, in order:
//!
//! 1. `SignatureCertChainUrl` and `Signature` headers are present and the chain url
//!    points at `https://s3.amazonaws.com/echo.api/`
//! 2. The signing certificate is downloaded, names `echo-api.amazon.com` and has
//!    at least a day of validity left
//! 3. The `Signature` header is a valid RSA SHA-1 signature of the raw body
//! 4. The body is fresh (at most 100 seconds old), names the configured skill and,
//!    for intent requests, a registered intent
//!
//! A request failing any gate gets an empty `400`. The reason is logged through
//! the `log` facade and never sent back. An authenticated body that is not JSON
//! gets the configured error speech.
//!
//! Trust is pinned to the certificate's name and expiry, the certificate chain is
//! not walked to a root CA.
//!
//! # Features
//! Both sync and async clients are provided by default. These are behind feature
//! flags `sync` or `async`, respectively.
//!
//! - `sync` provides `BlockingRequestAuthenticator` and `BlockingSkillService`
//! - `async` provides `RequestAuthenticator` and `SkillService`
//!
//! # Using
//! Plug `SkillService::handle` into the POST route of any server framework
//!
//! ```rust,no_run
//! use alexa_skill_webhook::{
//!     format_response, Headers, InboundRequest, IntentTable, Messages, MessageTemplate,
//!     SkillConfig, SkillService, ValidatedRequest,
//! };
//! use std::sync::Arc;
//!
//! # async fn run(raw_body: Vec<u8>, raw_headers: Vec<(String, String)>) {
//! let messages = Messages {
//!     launch: MessageTemplate::new("Random Books. Please request a book."),
//!     help: MessageTemplate::new("You can say, give me a random book."),
//!     cancel: MessageTemplate::new("Good-bye"),
//!     stop: MessageTemplate::new("Good-bye"),
//!     error: MessageTemplate::new("An error occurred retrieving your request.")
//!         .with_reprompt("Try asking for a random book."),
//! };
//! let intents = IntentTable::with_builtins().register(
//!     "GetRandomBook",
//!     |_: &ValidatedRequest, _: &Messages| {
//!         Ok(format_response("Check out Hamlet by William Shakespeare", None, false))
//!     },
//! );
//! let service = SkillService::new(Arc::new(SkillConfig::new("123456789", messages, intents)));
//!
//! // Per request, keep the body exactly as received
//! let headers: Headers = raw_headers.into_iter().collect();
//! let request = InboundRequest::new(raw_body, Some(headers));
//! let reply = service.handle(&request).await;
//!
//! let status = reply.status();
//! let body = reply.body().unwrap_or_default();
//! # let _ = (status, body);
//! # }
//! ```
//!

#[cfg(any(feature = "sync", feature = "async"))]
mod cert_cache;
mod cert_url;
mod certificate;
mod config;
mod constants;
mod dispatcher;
mod error;
mod intent;
mod normalize;
mod pipeline;
mod request;
mod response;
mod signature;
mod validator;

#[cfg(feature = "sync")]
mod sync;
#[cfg(feature = "sync")]
pub use sync::{
    BlockingCertificateFetcher, BlockingRequestAuthenticator, BlockingSkillService,
    HttpBlockingCertificateFetcher,
};

#[cfg(feature = "async")]
mod r#async;
#[cfg(feature = "async")]
pub use r#async::{CertificateFetcher, HttpCertificateFetcher, RequestAuthenticator, SkillService};

pub use cert_url::{cert_url_failures, validate_cert_url};
pub use certificate::CertificateInfo;
pub use config::{ConfigError, MessageTemplate, Messages, SkillConfig};
pub use dispatcher::{Dispatcher, Reply};
pub use error::{ErrorKind, VerificationError};
pub use intent::{Intent, IntentHandler, IntentTable};
pub use pipeline::{AuthState, AuthVerdict, FetchedCertificate};
pub use request::{Headers, InboundRequest};
pub use response::{format_response, OutputSpeech, Reprompt, ResponseEnvelope, SpeechResponse};
pub use signature::verify_signature;
pub use validator::{RequestKind, RequestValidator, ValidatedRequest};
