use failure::{Error, Fail};
use log::error;

/// Error detailing why a request was rejected
#[derive(Debug, Clone, PartialEq, Eq, Fail)]
pub enum VerificationError {
    #[fail(display = "No headers")]
    NoHeaders,
    #[fail(display = "No signature url")]
    NoSignatureUrl,
    #[fail(display = "No signature")]
    NoSignature,
    #[fail(display = "Could not parse signature url: '{}'", url)]
    UrlParse { url: String },
    #[fail(display = "Invalid signature protocol, expecting 'https', got '{}'", scheme)]
    UrlScheme { scheme: String },
    #[fail(
        display = "Invalid signature domain, expecting 's3.amazonaws.com', got '{}'",
        hostname
    )]
    UrlHostname { hostname: String },
    #[fail(display = "Invalid secure signature port, expecting '443', got '{}'", port)]
    UrlPort { port: u16 },
    #[fail(display = "Invalid signature path, expecting '/echo.api/', got '{}'", path)]
    UrlPath { path: String },
    #[fail(display = "Failed to retrieve cert")]
    RetrieveCert,
    #[fail(display = "Certificate not present at URL, got status '{}'", status)]
    CertNotPresent { status: u16 },
    #[fail(display = "Failed to decode PEM")]
    PemParse,
    #[fail(display = "Failed to parse certificate to x509")]
    CertParse,
    #[fail(display = "No valid data in SAN extension")]
    SanExtension,
    #[fail(display = "Certificate missing required subjectAltName 'echo-api.amazon.com'")]
    DomainNotTrusted,
    #[fail(display = "Certificate expired, {} days remaining", remaining_days)]
    ExpiredCert { remaining_days: i64 },
    #[fail(display = "Certificate not yet valid")]
    CertNotYetValid,
    #[fail(display = "Could not decode base64 signature")]
    SignatureDecode,
    #[fail(display = "Invalid signature")]
    InvalidSignature,
    #[fail(display = "No request body")]
    NoBody,
    #[fail(display = "Could not parse request body as JSON")]
    BodyParse,
    #[fail(display = "Missing request")]
    MissingRequest,
    #[fail(display = "Missing timestamp")]
    MissingTimestamp,
    #[fail(display = "Could not parse timestamp into DateTime: '{}'", timestamp)]
    TimestampParse { timestamp: String },
    #[fail(display = "Old request, {} seconds old", age_secs)]
    Timestamp { age_secs: i64 },
    #[fail(display = "Missing request type")]
    MissingRequestType,
    #[fail(display = "Invalid request type: '{}'", request_type)]
    InvalidRequestType { request_type: String },
    #[fail(display = "Missing intent name")]
    MissingIntent,
    #[fail(display = "Invalid intent: '{}'", name)]
    UnknownIntent { name: String },
    #[fail(display = "Missing session")]
    MissingSession,
    #[fail(display = "Missing applicationId")]
    MissingApplicationId,
    #[fail(display = "Invalid applicationId: '{}'", application_id)]
    InvalidApplicationId { application_id: String },
    #[fail(display = "Invalid version: '{}'", version)]
    InvalidVersion { version: String },
    #[fail(display = "Intent handler for '{}' failed", intent)]
    HandlerFault { intent: String },
}

/// Broad category a `VerificationError` falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing or malformed security headers
    Header,
    /// Chain url failed a structural check
    UrlFormat,
    /// Certificate could not be retrieved
    Network,
    /// Certificate could not be parsed, is untrusted or expired
    Certificate,
    /// Signature does not match the body
    Signature,
    /// Body is malformed or incomplete
    Schema,
    /// Timestamp is outside the tolerance window
    Freshness,
    /// Wrong application id or unknown intent
    Identity,
    /// Intent handler returned an error or panicked
    HandlerFault,
}

impl VerificationError {
    pub fn kind(&self) -> ErrorKind {
        use VerificationError::*;

        match self {
            NoHeaders | NoSignatureUrl | NoSignature => ErrorKind::Header,
            UrlParse { .. } | UrlScheme { .. } | UrlHostname { .. } | UrlPort { .. }
            | UrlPath { .. } => ErrorKind::UrlFormat,
            RetrieveCert | CertNotPresent { .. } => ErrorKind::Network,
            PemParse | CertParse | SanExtension | DomainNotTrusted | ExpiredCert { .. }
            | CertNotYetValid => ErrorKind::Certificate,
            SignatureDecode | InvalidSignature => ErrorKind::Signature,
            NoBody
            | BodyParse
            | MissingRequest
            | MissingTimestamp
            | TimestampParse { .. }
            | MissingRequestType
            | InvalidRequestType { .. }
            | MissingIntent
            | MissingSession
            | MissingApplicationId
            | InvalidVersion { .. } => ErrorKind::Schema,
            Timestamp { .. } => ErrorKind::Freshness,
            UnknownIntent { .. } | InvalidApplicationId { .. } => ErrorKind::Identity,
            HandlerFault { .. } => ErrorKind::HandlerFault,
        }
    }
}

pub fn log_error(e: Error) -> Result<(), Error> {
    error!("{}", e);
    for cause in e.iter_causes() {
        error!("Caused by: {}", cause);
    }
    Err(e)
}

/// Logs a failed check without giving up on the checks that follow it
pub fn log_rejection(e: &VerificationError) {
    error!("Rejected: {} ({:?})", e, e.kind());
}
