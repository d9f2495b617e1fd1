use serde::Deserialize;

use crate::schema::MessageKind;

/// Body of `POST /api/projects/{id}/messages`.
///
/// The project is taken from the path, a `projectId`
/// in the body is ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessage {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub sender_id: Option<String>,
    #[serde(default)]
    pub sender_name: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<MessageKind>,
    #[serde(default)]
    pub content: Option<String>,
    /// Milliseconds since the Unix epoch. Missing or `0` means now.
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub file_name: Option<String>,
}
