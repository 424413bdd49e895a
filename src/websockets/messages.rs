use serde::{Deserialize, Serialize};

/// Wire message, identical in both directions
///
/// Every field is optional on the way in. A missing `roomId` decodes to an
/// empty room, which no connection can be a member of, so the message is
/// silently dropped at dispatch.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    /// Free-form, passed through untouched
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub message: String,
    #[serde(rename = "roomId", default)]
    pub room_id: String,
    /// Claimed display identity, not checked against the connection
    #[serde(default)]
    pub sender: String,
}

impl ChatMessage {
    pub fn new(
        action: impl Into<String>,
        message: impl Into<String>,
        room_id: impl Into<String>,
        sender: impl Into<String>,
    ) -> Self {
        Self {
            action: action.into(),
            message: message.into(),
            room_id: room_id.into(),
            sender: sender.into(),
        }
    }

    pub fn decode(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
