use serde::Deserialize;
use std::num::NonZeroU32;

use super::Violations;
use crate::util::{validation, Sensitive};

#[derive(Debug, Deserialize)]
pub struct Jwt {
    /// Secret key used to sign and verify access tokens.
    ///
    /// **Environment variables**:
    /// - `PRANIKOV_JWT_SECRET` or `JWT_SECRET_KEY`
    pub secret: Sensitive<String>,
    /// How many days an issued access token stays valid.
    ///
    /// **Environment variables**:
    /// - `PRANIKOV_JWT_EXPIRY_DAYS`
    #[serde(default = "Jwt::default_expiry_days")]
    pub expiry_days: NonZeroU32,
}

impl Jwt {
    const DEFAULT_EXPIRY_DAYS: u32 = 30;

    const fn default_expiry_days() -> NonZeroU32 {
        match NonZeroU32::new(Self::DEFAULT_EXPIRY_DAYS) {
            Some(n) => n,
            None => panic!("DEFAULT_EXPIRY_DAYS is accidentally set to 0"),
        }
    }

    pub(crate) fn validate(&self, violations: &mut Violations) {
        violations.check(
            validation::is_valid_jwt_secret(self.secret.as_str()),
            "jwt.secret",
            "Invalid JWT secret key (must be 12 to 1024 characters long)",
        );
    }
}
