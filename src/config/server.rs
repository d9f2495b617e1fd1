use error_stack::{Report, Result};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::num::NonZeroUsize;

use super::{ParseError, Violations};
use crate::util::figment::FigmentErrorAttachable;

#[derive(Debug, Deserialize)]
pub struct Server {
    /// Address the HTTP server binds to.
    ///
    /// **Environment variables**:
    /// - `PRANIKOV_IP`
    #[serde(default = "Server::default_ip")]
    pub ip: IpAddr,
    /// Port the HTTP server listens on.
    ///
    /// **Environment variables**:
    /// - `PRANIKOV_PORT` or `PORT`
    #[serde(default = "Server::default_port")]
    pub port: u16,
    /// Worker threads of both the runtime and the HTTP server.
    #[serde(default = "Server::default_workers")]
    pub workers: usize,
    /// Inserts the demo users, project and messages at startup
    /// if the store has none of them.
    #[serde(default = "Server::default_seed")]
    pub seed: bool,
    /// Largest JSON request body accepted, in bytes. Chat attachments
    /// are sent inline as base64 data URLs.
    ///
    /// **Environment variables**:
    /// - `PRANIKOV_MAX_BODY_BYTES`
    #[serde(default = "Server::default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Postgres database. Records are kept in memory if not set.
    #[serde(default)]
    pub db: Option<super::Database>,
    pub jwt: super::Jwt,
    #[serde(default)]
    pub logging: super::Logging,
}

impl Server {
    pub fn load() -> Result<Self, ParseError> {
        dotenvy::dotenv().ok();

        let config = Self::figment()
            .extract::<Self>()
            .map_err(|e| Report::new(ParseError).attach_figment_error(e))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ParseError> {
        let mut violations = Violations::default();
        violations.check(self.workers > 0, "workers", "must be at least 1");
        violations.check(self.max_body_bytes > 0, "max_body_bytes", "must be at least 1");
        self.jwt.validate(&mut violations);
        if let Some(db) = self.db.as_ref() {
            db.validate(&mut violations);
        }
        violations.into_result()
    }

    /// Configuration used by unit tests: in-memory store, no seeding.
    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        Self {
            ip: Self::default_ip(),
            port: 0,
            workers: 1,
            seed: false,
            max_body_bytes: Self::DEFAULT_MAX_BODY_BYTES,
            db: None,
            jwt: super::Jwt {
                secret: "pranikov_test_secret_key".to_string().into(),
                expiry_days: std::num::NonZeroU32::MIN,
            },
            logging: super::Logging::default(),
        }
    }
}

impl Server {
    const DEFAULT_CONFIG_FILE: &'static str = "pranikov.toml";
    const DEFAULT_PORT: u16 = 10000;
    const DEFAULT_MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

    fn default_ip() -> IpAddr {
        IpAddr::V4(Ipv4Addr::UNSPECIFIED)
    }

    const fn default_port() -> u16 {
        Self::DEFAULT_PORT
    }

    fn default_workers() -> usize {
        std::thread::available_parallelism().map_or(1, NonZeroUsize::get)
    }

    const fn default_seed() -> bool {
        true
    }

    const fn default_max_body_bytes() -> usize {
        Self::DEFAULT_MAX_BODY_BYTES
    }

    /// Creates a default [`Figment`] object to load server
    /// configuration. This function is there for [`Server::load`]
    /// and testing.
    ///
    /// [`Figment`]: figment::Figment
    pub(crate) fn figment() -> figment::Figment {
        use figment::{
            providers::{Env, Format, Toml},
            Figment,
        };

        Figment::new()
            .merge(Toml::file(Self::DEFAULT_CONFIG_FILE))
            // Keys with underscores in their names have to be
            // mapped by hand, everything else is split on `_`.
            .merge(Env::prefixed("PRANIKOV_").map(|v| {
                match v.as_str().to_ascii_uppercase().as_str() {
                    "DB_PRIMARY_MIN_IDLE" => "db.primary.min_idle".into(),
                    "DB_PRIMARY_POOL_SIZE" => "db.primary.pool_size".into(),

                    "DB_REPLICA_MIN_IDLE" => "db.replica.min_idle".into(),
                    "DB_REPLICA_POOL_SIZE" => "db.replica.pool_size".into(),

                    "DB_ENFORCE_TLS" => "db.enforce_tls".into(),
                    "DB_TIMEOUT_SECS" => "db.timeout_secs".into(),

                    "JWT_EXPIRY_DAYS" => "jwt.expiry_days".into(),
                    "MAX_BODY_BYTES" => "max_body_bytes".into(),

                    other => other.to_ascii_lowercase().replace('_', ".").into(),
                }
            }))
            // Environment variable aliases
            .merge(
                Env::raw()
                    .only(&["DATABASE_URL", "PORT", "JWT_SECRET_KEY"])
                    .map(|v| match v.as_str().to_ascii_uppercase().as_str() {
                        "DATABASE_URL" => "db.primary.url".into(),
                        "JWT_SECRET_KEY" => "jwt.secret".into(),
                        _ => "port".into(),
                    }),
            )
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use std::num::{NonZeroU32, NonZeroU64};

    #[test]
    fn env_aliases() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env("DATABASE_URL", "postgres://localhost/pranikov");
            jail.set_env("PORT", "8080");
            jail.set_env("JWT_SECRET_KEY", "uphill_jwt_secret_2024");

            jail.set_env("PRANIKOV_DB_PRIMARY_MIN_IDLE", "2");
            jail.set_env("PRANIKOV_DB_PRIMARY_POOL_SIZE", "10");

            jail.set_env("PRANIKOV_DB_REPLICA_URL", "postgres://replica/pranikov");
            jail.set_env("PRANIKOV_DB_REPLICA_POOL_SIZE", "589");

            jail.set_env("PRANIKOV_DB_ENFORCE_TLS", "false");
            jail.set_env("PRANIKOV_DB_TIMEOUT_SECS", "3030");
            jail.set_env("PRANIKOV_JWT_EXPIRY_DAYS", "7");
            jail.set_env("PRANIKOV_MAX_BODY_BYTES", "1048576");

            let config: Server = Server::figment().extract()?;
            let db = config.db.as_ref().unwrap();

            assert_eq!(8080, config.port);
            assert_eq!("uphill_jwt_secret_2024", config.jwt.secret.as_str());
            assert_eq!(NonZeroU32::new(7).unwrap(), config.jwt.expiry_days);
            assert_eq!(1_048_576, config.max_body_bytes);
            assert_eq!("postgres://localhost/pranikov", db.primary.url.as_str());
            assert_eq!(NonZeroU32::new(2), db.primary.min_idle);
            assert_eq!(NonZeroU32::new(10).unwrap(), db.primary.pool_size);
            assert_eq!(
                NonZeroU32::new(589).unwrap(),
                db.replica.as_ref().unwrap().pool_size
            );
            assert!(!db.enforce_tls);
            assert_eq!(NonZeroU64::new(3030).unwrap(), db.timeout_secs);

            Ok(())
        });
    }

    #[test]
    fn defaults_without_database() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env("PRANIKOV_JWT_SECRET", "uphill_jwt_secret_2024");

            let config: Server = Server::figment().extract()?;
            assert!(config.db.is_none());
            assert!(config.seed);
            assert_eq!(10000, config.port);
            assert_eq!(IpAddr::V4(Ipv4Addr::UNSPECIFIED), config.ip);
            assert_eq!(30, config.jwt.expiry_days.get());
            assert_eq!(32 * 1024 * 1024, config.max_body_bytes);
            assert!(config.validate().is_ok());

            Ok(())
        });
    }

    #[test]
    fn loads_from_file() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file(
                "pranikov.toml",
                r#"
                port = 3000
                seed = false

                [jwt]
                secret = "file_based_secret_key"

                [logging]
                style = "json"
                targets = "pranikov=debug"
                "#,
            )?;

            let config: Server = Server::figment().extract()?;
            assert_eq!(3000, config.port);
            assert!(!config.seed);
            assert_eq!(crate::config::LoggingStyle::JSON, config.logging.style);
            assert_eq!("pranikov=debug", config.logging.targets);

            Ok(())
        });
    }

    #[test]
    fn rejects_invalid_values() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env("JWT_SECRET_KEY", "short");
            jail.set_env("DATABASE_URL", "not a url");
            jail.set_env("PRANIKOV_MAX_BODY_BYTES", "0");

            let config: Server = Server::figment().extract()?;
            let report = config.validate().unwrap_err();
            let rendered = format!("{report:?}");
            assert!(rendered.contains("jwt.secret"));
            assert!(rendered.contains("db.primary.url"));
            assert!(rendered.contains("max_body_bytes"));

            Ok(())
        });
    }
}
