use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Kind of content a [`ChatMessage`] carries.
///
/// Unknown kinds sent by clients are kept as [`MessageKind::Other`]
/// so they are stored and returned untouched.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub enum MessageKind {
    #[default]
    Text,
    Image,
    File,
    Audio,
    Other(String),
}

impl MessageKind {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::File => "file",
            Self::Audio => "audio",
            Self::Other(kind) => kind,
        }
    }
}

impl Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for MessageKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "text" => Self::Text,
            "image" => Self::Image,
            "file" => Self::File,
            "audio" => Self::Audio,
            _ => Self::Other(value),
        }
    }
}

impl Serialize for MessageKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MessageKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Self::from)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub project_id: String,
    pub sender_id: String,
    /// Display name of the sender at the time the message was sent.
    pub sender_name: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub content: Option<String>,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub file_name: Option<String>,
}
