use serde::Deserialize;
use std::num::{NonZeroU32, NonZeroU64};

use super::Violations;
use crate::util::{validation, Sensitive};

#[derive(Debug, Deserialize)]
pub struct Database {
    /// Writable primary database.
    pub primary: DbPoolConfig,
    /// A read-only replica database used for accessing the data
    /// without interacting with the main database.
    #[serde(default)]
    pub replica: Option<DbPoolConfig>,
    /// Forces all database connections are encrypted with TLS.
    ///
    /// **Environment variables**:
    /// - `PRANIKOV_DB_ENFORCE_TLS`
    #[serde(default = "DbPoolConfig::default_enforce_tls")]
    pub enforce_tls: bool,
    /// How long this server can wait until its time limit where the
    /// database connection takes a while to acknowledge or
    /// successfully established.
    ///
    /// **Environment variables**:
    /// - `PRANIKOV_DB_TIMEOUT_SECS`
    #[serde(default = "DbPoolConfig::default_pool_timeout_secs")]
    pub timeout_secs: NonZeroU64,
}

impl Database {
    pub(crate) fn validate(&self, violations: &mut Violations) {
        self.primary.validate("db.primary", violations);
        if let Some(replica) = self.replica.as_ref() {
            replica.validate("db.replica", violations);
        }
    }
}

/// Configuration for connecting to any Postgres database
#[derive(Debug, Deserialize)]
pub struct DbPoolConfig {
    /// Database pool must be in read-only mode.
    ///
    /// **Environment variables**:
    /// - `PRANIKOV_DB_PRIMARY_READONLY`
    /// - `PRANIKOV_DB_REPLICA_READONLY`
    #[serde(default)]
    pub readonly: bool,
    /// Minimum idle database connections just to avoid wasting
    /// hardware resources from the database server.
    ///
    /// **Environment variables**:
    /// - `PRANIKOV_DB_PRIMARY_MIN_IDLE`
    /// - `PRANIKOV_DB_REPLICA_MIN_IDLE`
    #[serde(default)]
    pub min_idle: Option<NonZeroU32>,
    /// Maximum amount of pool size that database can handle
    ///
    /// **Environment variables**:
    /// - `PRANIKOV_DB_PRIMARY_POOL_SIZE`
    /// - `PRANIKOV_DB_REPLICA_POOL_SIZE`
    #[serde(default = "DbPoolConfig::default_pool_size")]
    pub pool_size: NonZeroU32,
    /// Connection URL connecting to the Postgres database.
    ///
    /// **Environment variables**:
    /// - `PRANIKOV_DB_PRIMARY_URL` or `DATABASE_URL`
    /// - `PRANIKOV_DB_REPLICA_URL`
    pub url: Sensitive<String>,
}

impl DbPoolConfig {
    const DEFAULT_POOL_SIZE: u32 = 5;
    const DEFAULT_POOL_TIMEOUT_SECS: u64 = 5;

    // Required by serde
    const fn default_pool_size() -> NonZeroU32 {
        match NonZeroU32::new(Self::DEFAULT_POOL_SIZE) {
            Some(n) => n,
            None => panic!("DEFAULT_POOL_SIZE is accidentally set to 0"),
        }
    }

    const fn default_pool_timeout_secs() -> NonZeroU64 {
        match NonZeroU64::new(Self::DEFAULT_POOL_TIMEOUT_SECS) {
            Some(n) => n,
            None => panic!("DEFAULT_POOL_TIMEOUT_SECS is accidentally set to 0"),
        }
    }

    const fn default_enforce_tls() -> bool {
        true
    }

    fn validate(&self, prefix: &str, violations: &mut Violations) {
        violations.check(
            validation::is_valid_url(self.url.as_str()),
            &format!("{prefix}.url"),
            "Invalid Postgres connection URL",
        );

        if let Some(min_idle) = self.min_idle {
            violations.check(
                min_idle <= self.pool_size,
                &format!("{prefix}.min_idle"),
                "must not be greater than pool_size",
            );
        }
    }
}
