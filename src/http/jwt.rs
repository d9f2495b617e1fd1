use chrono::{Duration, Utc};
use error_stack::Report;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Error;
use crate::{types, App};

/// Claims of an access token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Jwt {
    /// Id of the user the token was issued to.
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

impl Jwt {
    #[must_use]
    pub fn new(user_id: impl Into<String>, app: &App) -> Self {
        let now = Utc::now();
        let expiry = Duration::days(i64::from(app.config.jwt.expiry_days.get()));
        Self {
            sub: user_id.into(),
            iat: now.timestamp(),
            exp: (now + expiry).timestamp(),
        }
    }

    #[tracing::instrument(skip(token, app))]
    pub fn decode(token: &str, app: &App) -> Result<Self, Error> {
        #[derive(Debug, Error)]
        #[error("Got an invalid access token")]
        struct InvalidToken;

        let key = DecodingKey::from_secret(app.config.jwt.secret.as_str().as_bytes());
        let validation = Validation::new(Algorithm::HS512);

        jsonwebtoken::decode::<Self>(token, &key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                Error::from_report(
                    types::Error::Unauthorized,
                    Report::new(InvalidToken).attach_printable(e),
                )
            })
    }

    #[tracing::instrument(skip(app), fields(user.id = %self.sub))]
    pub fn encode(&self, app: &App) -> Result<String, Error> {
        #[derive(Debug, Error)]
        #[error("Could not sign access token")]
        struct SignFailed;

        let header = Header::new(Algorithm::HS512);
        let key = EncodingKey::from_secret(app.config.jwt.secret.as_str().as_bytes());
        jsonwebtoken::encode(&header, self, &key).map_err(|e| {
            Error::from_report(
                types::Error::Internal,
                Report::new(SignFailed).attach_printable(e),
            )
        })
    }
}
