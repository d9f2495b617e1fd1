use error_stack::{Report, ResultExt};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use std::{str::FromStr, time::Duration};

use crate::config;

pub mod error;
pub use error::{Error, ErrorExt, ReportExt, Result};

pub type PoolConnection = sqlx::pool::PoolConnection<sqlx::Postgres>;

/// A Postgres database connection pool.
///
/// [Global database config](config::Database) is applied in common
/// settings such as `timeout_secs`, while the [pool config](config::DbPoolConfig)
/// is applied specifically to this pool.
#[derive(Clone)]
pub struct Pool {
    pool: sqlx::PgPool,
    readonly: bool,
}

impl Pool {
    /// Builds a lazily connected pool. No connection is made
    /// until [`Pool::wait_until_healthy`] or a query is performed.
    pub fn build(global_cfg: &config::Database, pool_cfg: &config::DbPoolConfig) -> Result<Self> {
        let mut pool_opts = PgPoolOptions::new()
            .acquire_timeout(Duration::from_secs(global_cfg.timeout_secs.get()))
            .max_connections(pool_cfg.pool_size.get());

        if let Some(min_idle) = pool_cfg.min_idle {
            pool_opts = pool_opts.min_connections(min_idle.get());
        }

        let mut connect_opts =
            PgConnectOptions::from_str(pool_cfg.url.as_str()).change_context(Error::InvalidUrl)?;

        if global_cfg.enforce_tls {
            connect_opts = connect_opts.ssl_mode(PgSslMode::Require);
        }

        Ok(Self {
            pool: pool_opts.connect_lazy_with(connect_opts),
            readonly: pool_cfg.readonly,
        })
    }
}

impl std::fmt::Debug for Pool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool")
            .field("connections", &self.connections())
            .field("readonly", &self.is_readonly())
            .finish()
    }
}

impl Pool {
    pub fn connections(&self) -> u32 {
        self.pool.size()
    }

    pub fn is_healthy(&self) -> bool {
        self.connections() > 0
    }

    pub const fn is_readonly(&self) -> bool {
        self.readonly
    }

    pub(crate) const fn inner(&self) -> &sqlx::PgPool {
        &self.pool
    }

    #[tracing::instrument(name = "db.connect", skip(self))]
    pub async fn get(&self) -> Result<PoolConnection> {
        if let Some(inner) = self.pool.try_acquire() {
            Ok(inner)
        } else {
            self.pool
                .acquire()
                .await
                .map_err(|e| match e {
                    sqlx::Error::PoolTimedOut if !self.is_healthy() => {
                        Report::new(e).change_context(Error::UnhealthyPool)
                    }
                    e => Report::new(Error::Internal(e)),
                })
        }
    }

    /// Obtains a connection that is allowed to write.
    #[tracing::instrument(name = "db.connect_writable", skip(self))]
    pub async fn get_writable(&self) -> Result<PoolConnection> {
        if self.readonly {
            return Err(Report::new(Error::Readonly));
        }
        self.get().await
    }

    #[tracing::instrument(skip(self))]
    pub async fn wait_until_healthy(&self) -> Result<()> {
        match self.pool.acquire().await {
            Ok(..) => Ok(()),
            Err(e) if !self.is_healthy() => Err(e).change_context(Error::UnhealthyPool),
            Err(err) => Err(Report::new(Error::Internal(err))),
        }
    }
}
