pub use api::*;
pub use webhook::*;

/// Request and response bodies for the Vapi REST API.
mod api {
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
    pub struct ModelMessage {
        pub role: String,
        pub content: String,
    }

    #[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
    pub struct AssistantModel {
        pub provider: String,
        pub model: String,
        pub messages: Vec<ModelMessage>,
    }

    #[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
    pub struct AssistantVoice {
        pub provider: String,
        #[serde(rename = "voiceId")]
        pub voice_id: String,
    }

    #[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
    pub struct CreateAssistantPayload {
        pub name: String,
        pub model: AssistantModel,
        pub voice: AssistantVoice,
        #[serde(rename = "firstMessage")]
        pub first_message: String,
    }

    #[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
    pub struct CreatePhoneNumberPayload {
        #[serde(rename = "assistantId")]
        pub assistant_id: String,
        pub provider: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub number: Option<String>,
    }

    #[derive(Deserialize, Clone, Debug)]
    pub struct Assistant {
        pub id: String,
    }

    #[derive(Deserialize, Clone, Debug)]
    pub struct PhoneNumber {
        pub number: String,
    }
}

/// Call lifecycle callbacks posted to `/webhook/vapi`.
mod webhook {
    use serde::Deserialize;
    use serde_json::{Number, Value};

    /// Only the `type` tag is decoded strictly; event fields are read leniently so that a
    /// recognized event is always stored.
    #[derive(Deserialize, Clone, Copy, Debug, PartialEq)]
    #[serde(rename_all = "kebab-case")]
    enum EventType {
        CallStarted,
        CallEnded,
        TranscriptReady,
    }

    #[derive(Clone, Debug, PartialEq)]
    pub enum VapiEvent {
        CallStarted {
            call_id: Option<String>,
        },
        CallEnded {
            call_id: Option<String>,
            duration: Option<Number>,
            recording_url: Option<String>,
        },
        TranscriptReady {
            call_id: Option<String>,
            transcript: Option<Value>,
        },
        Unrecognized,
    }

    impl VapiEvent {
        /// Classify a raw webhook body.  Bodies without a known `type` are `Unrecognized`.
        pub fn from_payload(payload: &Value) -> Self {
            let event_type = payload
                .get("type")
                .and_then(|t| EventType::deserialize(t).ok());
            let call_id = || payload.get("callId").and_then(string_or_number);

            match event_type {
                Some(EventType::CallStarted) => VapiEvent::CallStarted { call_id: call_id() },
                Some(EventType::CallEnded) => VapiEvent::CallEnded {
                    call_id: call_id(),
                    duration: match payload.get("duration") {
                        Some(Value::Number(n)) => Some(n.clone()),
                        _ => None,
                    },
                    recording_url: payload
                        .get("recordingUrl")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                },
                Some(EventType::TranscriptReady) => VapiEvent::TranscriptReady {
                    call_id: call_id(),
                    transcript: payload.get("transcript").filter(|t| !t.is_null()).cloned(),
                },
                None => VapiEvent::Unrecognized,
            }
        }
    }

    fn string_or_number(value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Caller-supplied business reference carried alongside a call event.
    pub fn business_id(payload: &Value) -> Option<String> {
        ["businessId", "business_id"]
            .iter()
            .find_map(|key| payload.get(*key))
            .and_then(string_or_number)
    }

}
