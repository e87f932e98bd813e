use crate::{
    constants::*,
    intent::IntentTable,
    response::{format_response, ResponseEnvelope},
};
use failure::Fail;
use serde::{Deserialize, Serialize};

#[derive(Debug, Fail)]
pub enum ConfigError {
    #[fail(display = "Provided tolerance of '{}' seconds exceeds max of 150", secs)]
    TimestampMax { secs: u64 },
}

/// Text spoken for one situation, plus what to say if the user stays silent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageTemplate {
    pub output: String,
    #[serde(default)]
    pub reprompt: Option<String>,
}

impl MessageTemplate {
    pub fn new(output: impl Into<String>) -> Self {
        MessageTemplate {
            output: output.into(),
            reprompt: None,
        }
    }

    pub fn with_reprompt(mut self, reprompt: impl Into<String>) -> Self {
        self.reprompt = Some(reprompt.into());
        self
    }

    pub fn to_response(&self, end_session: bool) -> ResponseEnvelope {
        format_response(&self.output, self.reprompt.as_deref(), end_session)
    }
}

/// Message templates a skill answers with. Deserializable, so hosts can keep them
/// in a JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Messages {
    pub launch: MessageTemplate,
    pub help: MessageTemplate,
    pub cancel: MessageTemplate,
    pub stop: MessageTemplate,
    pub error: MessageTemplate,
}

/// Everything a skill needs at runtime. Built once at startup and shared
/// read-only between requests.
#[derive(Debug)]
pub struct SkillConfig {
    skill_id: String,
    messages: Messages,
    intents: IntentTable,
    timestamp_tolerance_secs: i64,
}

impl SkillConfig {
    pub fn new(skill_id: impl Into<String>, messages: Messages, intents: IntentTable) -> Self {
        SkillConfig {
            skill_id: skill_id.into(),
            messages,
            intents,
            timestamp_tolerance_secs: DEFAULT_TIMESTAMP_TOLERANCE_IN_SECS,
        }
    }

    /// Override the allowed request age (default `100` seconds). Alexa allows at
    /// most `150`.
    pub fn with_timestamp_tolerance(mut self, secs: u64) -> Result<Self, ConfigError> {
        if secs > MAX_TIMESTAMP_TOLERANCE_IN_SECS as u64 {
            return Err(ConfigError::TimestampMax { secs });
        }
        self.timestamp_tolerance_secs = secs as i64;
        Ok(self)
    }

    pub fn skill_id(&self) -> &str {
        &self.skill_id
    }

    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    pub fn intents(&self) -> &IntentTable {
        &self.intents
    }

    pub fn timestamp_tolerance_secs(&self) -> i64 {
        self.timestamp_tolerance_secs
    }
}
