use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const RESPONSE_VERSION: &str = "1.0";
pub const TRAIN_LINE_SLOT: &str = "TrainLine";

/// Canonical backend identifier for a cluster of lines sharing one status feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineGroup {
    #[serde(rename = "123")]
    OneTwoThree,
    #[serde(rename = "456")]
    FourFiveSix,
    #[serde(rename = "ACE")]
    Ace,
    #[serde(rename = "BDFM")]
    Bdfm,
    #[serde(rename = "NQR")]
    Nqr,
    #[serde(rename = "L")]
    L,
    #[serde(rename = "JZ")]
    Jz,
    #[serde(rename = "unrecognized")]
    Unrecognized,
}

impl LineGroup {
    pub const ALL_RECOGNIZED: [LineGroup; 7] = [
        Self::OneTwoThree,
        Self::FourFiveSix,
        Self::Ace,
        Self::Bdfm,
        Self::Nqr,
        Self::L,
        Self::Jz,
    ];

    /// Identifier sent to the status endpoint as `lineName`.
    pub fn as_code(self) -> &'static str {
        match self {
            Self::OneTwoThree => "123",
            Self::FourFiveSix => "456",
            Self::Ace => "ACE",
            Self::Bdfm => "BDFM",
            Self::Nqr => "NQR",
            Self::L => "L",
            Self::Jz => "JZ",
            Self::Unrecognized => "unrecognized",
        }
    }

    pub fn is_recognized(self) -> bool {
        self != Self::Unrecognized
    }
}

impl fmt::Display for LineGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub group: LineGroup,
    /// Spoken form of the line ("d", "one"); empty when unrecognized.
    pub display_label: String,
}

impl Classification {
    pub fn unrecognized() -> Self {
        Self {
            group: LineGroup::Unrecognized,
            display_label: String::new(),
        }
    }

    pub fn is_recognized(&self) -> bool {
        self.group.is_recognized()
    }
}

/// Request types the platform can send. Anything else is rejected by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Launch,
    Intent,
    SessionEnded,
}

impl RequestKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "LaunchRequest" => Some(Self::Launch),
            "IntentRequest" => Some(Self::Intent),
            "SessionEndedRequest" => Some(Self::SessionEnded),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformEvent {
    #[serde(default)]
    pub version: Option<String>,
    pub session: EventSession,
    pub request: EventRequest,
}

impl PlatformEvent {
    pub fn request_kind(&self) -> Option<RequestKind> {
        RequestKind::parse(&self.request.request_type)
    }

    pub fn application_id(&self) -> Option<&str> {
        self.session
            .application
            .as_ref()
            .map(|application| application.application_id.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSession {
    #[serde(default)]
    pub new: bool,
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub application: Option<Application>,
    #[serde(default)]
    pub attributes: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub application_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRequest {
    #[serde(rename = "type")]
    pub request_type: String,
    #[serde(default)]
    pub request_id: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub intent: Option<IntentPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentPayload {
    pub name: String,
    #[serde(default)]
    pub slots: HashMap<String, SlotValue>,
}

impl IntentPayload {
    /// Captured value of a slot; `None` when the slot or its value is missing.
    pub fn slot_value(&self, slot: &str) -> Option<&str> {
        self.slots.get(slot).and_then(|slot| slot.value.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotValue {
    pub name: String,
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlainTextSpeech {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepromptSpeech {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reprompt {
    pub output_speech: RepromptSpeech,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechletResponse {
    pub output_speech: PlainTextSpeech,
    pub card: Card,
    pub reprompt: Reprompt,
    pub should_end_session: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub version: String,
    pub session_attributes: Map<String, Value>,
    pub response: SpeechletResponse,
}

impl ResponseEnvelope {
    pub fn new(session_attributes: Map<String, Value>, response: SpeechletResponse) -> Self {
        Self {
            version: RESPONSE_VERSION.to_string(),
            session_attributes,
            response,
        }
    }
}
