use crate::{config::Messages, response::ResponseEnvelope, validator::ValidatedRequest};
use failure::Error;
use std::{collections::HashMap, fmt};

const HELP_INTENT: &str = "AMAZON.HelpIntent";
const STOP_INTENT: &str = "AMAZON.StopIntent";
const CANCEL_INTENT: &str = "AMAZON.CancelIntent";

/// Intent identifier, resolved from `request.intent.name`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Intent {
    Help,
    Stop,
    Cancel,
    Custom(String),
}

impl Intent {
    pub fn from_name(name: &str) -> Self {
        match name {
            HELP_INTENT => Intent::Help,
            STOP_INTENT => Intent::Stop,
            CANCEL_INTENT => Intent::Cancel,
            other => Intent::Custom(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Intent::Help => HELP_INTENT,
            Intent::Stop => STOP_INTENT,
            Intent::Cancel => CANCEL_INTENT,
            Intent::Custom(name) => name,
        }
    }
}

impl From<&str> for Intent {
    fn from(name: &str) -> Self {
        Intent::from_name(name)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Produces the response for one intent. Returning an error, or panicking, makes
/// the dispatcher answer with the configured error message.
pub trait IntentHandler: Send + Sync {
    fn handle(&self, request: &ValidatedRequest, messages: &Messages) -> Result<ResponseEnvelope, Error>;
}

impl<F> IntentHandler for F
where
    F: Fn(&ValidatedRequest, &Messages) -> Result<ResponseEnvelope, Error> + Send + Sync,
{
    fn handle(&self, request: &ValidatedRequest, messages: &Messages) -> Result<ResponseEnvelope, Error> {
        self(request, messages)
    }
}

/// Intents a skill answers to. Immutable once handed to `SkillConfig`.
#[derive(Default)]
pub struct IntentTable {
    handlers: HashMap<Intent, Box<dyn IntentHandler>>,
}

impl IntentTable {
    /// Empty table, every intent request is rejected
    pub fn new() -> Self {
        IntentTable::default()
    }

    /// Table answering `AMAZON.HelpIntent`, `AMAZON.StopIntent` and
    /// `AMAZON.CancelIntent` from the message templates
    pub fn with_builtins() -> Self {
        IntentTable::new()
            .register(Intent::Help, |_: &ValidatedRequest, messages: &Messages| {
                Ok(messages.help.to_response(false))
            })
            .register(Intent::Stop, |_: &ValidatedRequest, messages: &Messages| {
                Ok(messages.stop.to_response(true))
            })
            .register(Intent::Cancel, |_: &ValidatedRequest, messages: &Messages| {
                Ok(messages.cancel.to_response(true))
            })
    }

    /// Register a closure for `intent`, replacing any previous handler
    pub fn register<F>(self, intent: impl Into<Intent>, handler: F) -> Self
    where
        F: Fn(&ValidatedRequest, &Messages) -> Result<ResponseEnvelope, Error> + Send + Sync + 'static,
    {
        self.register_handler(intent, handler)
    }

    /// Register any `IntentHandler` for `intent`, replacing any previous handler
    pub fn register_handler(mut self, intent: impl Into<Intent>, handler: impl IntentHandler + 'static) -> Self {
        self.handlers.insert(intent.into(), Box::new(handler));
        self
    }

    /// The intent for `name`, if a handler is registered for it
    pub fn resolve(&self, name: &str) -> Option<Intent> {
        let intent = Intent::from_name(name);
        if self.handlers.contains_key(&intent) {
            Some(intent)
        } else {
            None
        }
    }

    pub fn get(&self, intent: &Intent) -> Option<&dyn IntentHandler> {
        self.handlers.get(intent).map(|handler| handler.as_ref())
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for IntentTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_set()
            .entries(self.handlers.keys().map(Intent::name))
            .finish()
    }
}
