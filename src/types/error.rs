use serde::ser::SerializeStruct;
use std::fmt::Display;

/// Error kinds exposed to API clients.
///
/// Serialized as `{"type": "<kind>", "error": "<message>"}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    Internal,
    InvalidCredentials,
    InvalidFormBody(String),
    NotFound,
    ReadonlyMode,
    Unauthorized,
}

impl Error {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::InvalidCredentials => "invalid_credentials",
            Self::InvalidFormBody(..) => "invalid_form_body",
            Self::NotFound => "not_found",
            Self::ReadonlyMode => "readonly_mode",
            Self::Unauthorized => "unauthorized",
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Internal => f.write_str("Failed to perform request"),
            Self::InvalidCredentials => f.write_str("Invalid credentials"),
            Self::InvalidFormBody(message) => f.write_str(message),
            Self::NotFound => f.write_str("Not found"),
            Self::ReadonlyMode => f.write_str("Attempt to write read-only database"),
            Self::Unauthorized => f.write_str("Authentication required"),
        }
    }
}

impl serde::Serialize for Error {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("Error", 2)?;
        state.serialize_field("type", self.kind())?;
        state.serialize_field("error", &self.to_string())?;
        state.end()
    }
}
