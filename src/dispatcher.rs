use crate::{
    config::SkillConfig,
    error::{log_error, log_rejection, VerificationError},
    intent::Intent,
    pipeline::AuthVerdict,
    request::InboundRequest,
    response::ResponseEnvelope,
    validator::{RequestKind, RequestValidator, ValidatedRequest},
};
use log::{debug, error, info};
use std::{
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};

/// What to send back over HTTP
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// `200` with a JSON body
    Speech(ResponseEnvelope),
    /// `200` with no body
    Empty,
    /// `400` with no body. The reason is only logged, never sent to the caller.
    Rejected,
}

impl Reply {
    pub fn status(&self) -> u16 {
        match self {
            Reply::Speech(_) | Reply::Empty => 200,
            Reply::Rejected => 400,
        }
    }

    /// Serialized body, empty unless this is a speech reply
    pub fn body(&self) -> Result<Vec<u8>, serde_json::Error> {
        match self {
            Reply::Speech(envelope) => serde_json::to_vec(envelope),
            Reply::Empty | Reply::Rejected => Ok(vec![]),
        }
    }
}

/// Routes validated requests to launch, intent and session end handling
pub struct Dispatcher {
    config: Arc<SkillConfig>,
}

impl Dispatcher {
    pub fn new(config: Arc<SkillConfig>) -> Self {
        Dispatcher { config }
    }

    /// Turn an authentication verdict and the request body into a reply. Any
    /// failed check ends in `Reply::Rejected`, except an authenticated body that
    /// is not JSON, which gets the error speech.
    pub fn respond(&self, request: &InboundRequest, verdict: &AuthVerdict) -> Reply {
        if let AuthVerdict::Invalid(e) = verdict {
            debug!("Not dispatching unauthenticated request: {}", e);
            return Reply::Rejected;
        }

        match RequestValidator::new(&self.config).validate(request) {
            Ok(validated) => {
                debug!("Request is validated...");
                self.dispatch(&validated)
            }
            Err(e @ VerificationError::BodyParse) => {
                log_rejection(&e);
                Reply::Speech(self.config.messages().error.to_response(false))
            }
            Err(e) => {
                log_rejection(&e);
                Reply::Rejected
            }
        }
    }

    pub fn dispatch(&self, request: &ValidatedRequest) -> Reply {
        let messages = self.config.messages();

        match &request.kind {
            RequestKind::Launch => Reply::Speech(messages.launch.to_response(false)),
            RequestKind::Intent(intent) => self.invoke(intent, request),
            RequestKind::SessionEnded { reason } => {
                info!("Session ended: {}", reason.as_deref().unwrap_or("no reason given"));
                Reply::Empty
            }
        }
    }

    fn invoke(&self, intent: &Intent, request: &ValidatedRequest) -> Reply {
        let messages = self.config.messages();

        let handler = match self.config.intents().get(intent) {
            Some(handler) => handler,
            None => {
                log_rejection(&VerificationError::UnknownIntent {
                    name: intent.to_string(),
                });
                return Reply::Rejected;
            }
        };

        let fault = VerificationError::HandlerFault {
            intent: intent.to_string(),
        };
        match panic::catch_unwind(AssertUnwindSafe(|| handler.handle(request, messages))) {
            Ok(Ok(envelope)) => Reply::Speech(envelope),
            Ok(Err(e)) => {
                let _ = log_error(e.context(fault).into());
                Reply::Speech(messages.error.to_response(false))
            }
            Err(_) => {
                error!("{}: handler panicked", fault);
                Reply::Speech(messages.error.to_response(false))
            }
        }
    }
}
