use actix_web::{http::header, web, FromRequest};
use futures::future::{ready, Ready};
use thiserror::Error;

use super::{Error, Jwt};
use crate::{types, App};

/// Who is performing the request, taken from the bearer token.
///
/// The token is only verified here. Loading the user record
/// is up to the handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    Anonymous,
    User(String),
}

impl Actor {
    pub fn user_id(&self) -> Result<&str, Error> {
        #[derive(Debug, Error)]
        #[error("Attempt to access user-only route")]
        struct Unauthorized;

        match self {
            Self::User(id) => Ok(id.as_str()),
            Self::Anonymous => Err(Error::from_context(
                types::Error::Unauthorized,
                Unauthorized,
            )),
        }
    }

    fn from_token(token: Option<&str>, app: Option<&App>) -> Result<Self, Error> {
        #[derive(Debug, Error)]
        #[error("The web app has no available configuration")]
        struct NoConfig;

        let Some(token) = token else {
            return Ok(Self::Anonymous);
        };

        let app = app.ok_or_else(|| Error::from_context(types::Error::Internal, NoConfig))?;
        Jwt::decode(token, app).map(|claims| Self::User(claims.sub))
    }
}

impl FromRequest for Actor {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        _payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        let token = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim);

        let app = req.app_data::<web::Data<App>>().map(web::Data::get_ref);
        ready(Self::from_token(token, app))
    }
}
