use serde::{Deserialize, Serialize};

use crate::schema::User;
use crate::util::Sensitive;

#[derive(Debug, Default, Deserialize)]
pub struct Register {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Kept as a raw string so a missing role and an unknown
    /// role can be told apart.
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub password: Option<Sensitive<String>>,
    /// Generated from the name if not given.
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Login {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<Sensitive<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: User,
    pub access_token: String,
}
