//! The authentication gates as an explicit state machine.
//!
//! Every transition except the certificate fetch is synchronous, so the
//! blocking and async authenticators share `advance` and only differ in how they
//! leave `UrlValidated`.

use crate::{
    cert_url::validate_cert_url,
    certificate::CertificateInfo,
    constants::*,
    error::{log_error, VerificationError},
    request::InboundRequest,
    signature::check_signature,
};
use failure::{Error, ResultExt};
use log::{debug, error};
use url::Url;

/// Outcome of authenticating one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthVerdict {
    Valid,
    Invalid(VerificationError),
}

impl AuthVerdict {
    pub fn is_valid(&self) -> bool {
        *self == AuthVerdict::Valid
    }
}

/// Status and body of a certificate download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedCertificate {
    pub status: u16,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Start,
    HeadersChecked,
    /// Waiting on the certificate download
    UrlValidated {
        cert_url: Url,
        signature: String,
    },
    CertificateFetched {
        pem: Vec<u8>,
        signature: String,
    },
    CertificateValidated {
        public_key: Vec<u8>,
        signature: String,
    },
    SignatureVerified,
    Authenticated,
    Rejected(VerificationError),
}

impl AuthState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AuthState::Authenticated | AuthState::Rejected(_))
    }

    /// Run the next synchronous gate. `UrlValidated` is returned unchanged, the
    /// caller has to fetch the certificate and call `on_fetched`.
    pub fn advance(self, request: &InboundRequest) -> AuthState {
        match self {
            AuthState::Start => match request.headers() {
                Some(_) => AuthState::HeadersChecked,
                None => AuthState::Rejected(VerificationError::NoHeaders),
            },
            AuthState::HeadersChecked => check_headers(request),
            state @ AuthState::UrlValidated { .. } => state,
            AuthState::CertificateFetched { pem, signature } => {
                match CertificateInfo::from_pem(&pem, request.received_at())
                    .and_then(|info| info.validate().map(|_| info))
                {
                    Ok(info) => AuthState::CertificateValidated {
                        public_key: info.public_key,
                        signature,
                    },
                    Err(e) => AuthState::Rejected(e),
                }
            }
            AuthState::CertificateValidated {
                public_key,
                signature,
            } => match check_signature(&signature, request.body(), &public_key) {
                Ok(()) => AuthState::SignatureVerified,
                Err(e) => AuthState::Rejected(e),
            },
            AuthState::SignatureVerified => AuthState::Authenticated,
            terminal => terminal,
        }
    }

    /// Leave `UrlValidated` with the result of the certificate download
    pub fn on_fetched(fetched: Result<FetchedCertificate, Error>, signature: String) -> AuthState {
        match fetched.context(VerificationError::RetrieveCert) {
            Ok(FetchedCertificate { status: 200, body }) => AuthState::CertificateFetched {
                pem: body,
                signature,
            },
            Ok(FetchedCertificate { status, .. }) => {
                AuthState::Rejected(VerificationError::CertNotPresent { status })
            }
            Err(e) => {
                let _ = log_error(e.into());
                AuthState::Rejected(VerificationError::RetrieveCert)
            }
        }
    }

    /// Collapse a terminal state into a verdict. Any other state is handed back
    /// so the caller can keep advancing it.
    pub fn into_verdict(self) -> Result<AuthVerdict, AuthState> {
        match self {
            AuthState::Authenticated => {
                debug!("Request is authenticated");
                Ok(AuthVerdict::Valid)
            }
            AuthState::Rejected(e) => {
                error!("Could not validate request came from Alexa: {}", e);
                Ok(AuthVerdict::Invalid(e))
            }
            state => Err(state),
        }
    }
}

fn check_headers(request: &InboundRequest) -> AuthState {
    let signature_cert_chain_url = match request.header(CERT_CHAIN_URL_HEADER) {
        Some(url) => url,
        None => return AuthState::Rejected(VerificationError::NoSignatureUrl),
    };

    let cert_url = match validate_cert_url(signature_cert_chain_url) {
        Ok(url) => url,
        Err(e) => return AuthState::Rejected(e),
    };

    match request.header(SIGNATURE_HEADER) {
        Some(signature) => AuthState::UrlValidated {
            cert_url,
            signature: signature.to_string(),
        },
        None => AuthState::Rejected(VerificationError::NoSignature),
    }
}
