use crate::constants::ENVELOPE_VERSION;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body sent back to Alexa
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub version: String,
    pub response: SpeechResponse,
    pub session_attributes: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechResponse {
    pub output_speech: OutputSpeech,
    pub should_end_session: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reprompt: Option<Reprompt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reprompt {
    pub output_speech: OutputSpeech,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSpeech {
    #[serde(rename = "type")]
    pub speech_type: String,
    pub ssml: String,
}

impl OutputSpeech {
    /// Wraps `text` in `<speak>` tags. The text is inserted as is, so it may
    /// carry its own SSML markup.
    pub fn ssml(text: &str) -> Self {
        OutputSpeech {
            speech_type: "SSML".to_string(),
            ssml: format!("<speak>{}</speak>", text),
        }
    }
}

/// Build the response envelope for `output`, with an optional reprompt
pub fn format_response(output: &str, reprompt: Option<&str>, end_session: bool) -> ResponseEnvelope {
    ResponseEnvelope {
        version: ENVELOPE_VERSION.to_string(),
        response: SpeechResponse {
            output_speech: OutputSpeech::ssml(output),
            should_end_session: end_session,
            reprompt: reprompt.map(|text| Reprompt {
                output_speech: OutputSpeech::ssml(text),
            }),
        },
        session_attributes: Map::new(),
    }
}
