use crate::{
    config::SkillConfig, constants::*, error::VerificationError, intent::Intent,
    request::InboundRequest,
};
use serde_json::Value;
use time::{format_description::well_known::Rfc3339, Duration, OffsetDateTime};

/// What the request asks the skill to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestKind {
    Launch,
    Intent(Intent),
    SessionEnded { reason: Option<String> },
}

/// A request body that passed every structural, freshness and identity check
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    pub kind: RequestKind,
    pub application_id: String,
    pub timestamp: OffsetDateTime,
    /// The full parsed body, for handlers that need slots or session details
    pub body: Value,
}

/// Body checks run after a request is authenticated
pub struct RequestValidator<'a> {
    config: &'a SkillConfig,
}

impl<'a> RequestValidator<'a> {
    pub fn new(config: &'a SkillConfig) -> Self {
        RequestValidator { config }
    }

    /// Validate the body, judging freshness against the arrival time
    pub fn validate(&self, request: &InboundRequest) -> Result<ValidatedRequest, VerificationError> {
        self.validate_body(request.body(), request.received_at())
    }

    /// Checks run in order and stop at the first failure
    pub fn validate_body(
        &self,
        body: &[u8],
        now: OffsetDateTime,
    ) -> Result<ValidatedRequest, VerificationError> {
        if body.is_empty() {
            return Err(VerificationError::NoBody);
        }
        let body: Value = serde_json::from_slice(body).map_err(|_| VerificationError::BodyParse)?;
        if !body.is_object() {
            return Err(VerificationError::NoBody);
        }

        let request = body.get("request").ok_or(VerificationError::MissingRequest)?;

        let timestamp = request
            .get("timestamp")
            .and_then(Value::as_str)
            .ok_or(VerificationError::MissingTimestamp)?;
        let timestamp = self.validate_timestamp(timestamp, now)?;

        let request_type = request
            .get("type")
            .and_then(Value::as_str)
            .ok_or(VerificationError::MissingRequestType)?;
        let kind = match request_type {
            LAUNCH_REQUEST => RequestKind::Launch,
            INTENT_REQUEST => {
                let name = request
                    .get("intent")
                    .and_then(|intent| intent.get("name"))
                    .and_then(Value::as_str)
                    .ok_or(VerificationError::MissingIntent)?;
                let intent = self.config.intents().resolve(name).ok_or_else(|| {
                    VerificationError::UnknownIntent {
                        name: name.to_string(),
                    }
                })?;
                RequestKind::Intent(intent)
            }
            SESSION_ENDED_REQUEST => RequestKind::SessionEnded {
                reason: request
                    .get("reason")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            },
            other => {
                return Err(VerificationError::InvalidRequestType {
                    request_type: other.to_string(),
                })
            }
        };

        let session = body.get("session").ok_or(VerificationError::MissingSession)?;
        let application_id = session
            .get("application")
            .and_then(|application| application.get("applicationId"))
            .and_then(Value::as_str)
            .ok_or(VerificationError::MissingApplicationId)?;
        if application_id != self.config.skill_id() {
            return Err(VerificationError::InvalidApplicationId {
                application_id: application_id.to_string(),
            });
        }

        match body.get("version").and_then(Value::as_str) {
            Some(ENVELOPE_VERSION) => {}
            version => {
                return Err(VerificationError::InvalidVersion {
                    version: version.unwrap_or_default().to_string(),
                })
            }
        }

        Ok(ValidatedRequest {
            kind,
            application_id: application_id.to_string(),
            timestamp,
            body,
        })
    }

    // Timestamp is in ISO 8601 format. Requests from the future are let through,
    // only the age is bounded.
    fn validate_timestamp(
        &self,
        timestamp: &str,
        now: OffsetDateTime,
    ) -> Result<OffsetDateTime, VerificationError> {
        let parsed = OffsetDateTime::parse(timestamp, &Rfc3339).map_err(|_| {
            VerificationError::TimestampParse {
                timestamp: timestamp.to_owned(),
            }
        })?;

        let age = now - parsed;
        if age > Duration::seconds(self.config.timestamp_tolerance_secs()) {
            return Err(VerificationError::Timestamp {
                age_secs: age.whole_seconds(),
            });
        }

        Ok(parsed)
    }
}
