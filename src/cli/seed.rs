use clap::Parser;
use error_stack::{Result, ResultExt};
use thiserror::Error;

use pranikov::bootstrap::{self, Storage};
use pranikov::config::Server as Config;

#[derive(Debug, Error)]
#[error("Failed to seed the entity store")]
pub struct SeedError;

/// Run migrations and insert the demo data without serving
#[derive(Debug, Parser)]
pub struct SeedCommand {
    /// Assume the database schema is already up to date.
    #[clap(long)]
    pub skip_migrations: bool,
}

pub fn run(args: SeedCommand) -> Result<(), SeedError> {
    let config = Config::load().change_context(SeedError)?;
    pranikov::telemetry::init(&config.logging).change_context(SeedError)?;

    super::build_runtime(1)
        .change_context(SeedError)
        .attach_printable("could not build tokio runtime")?
        .block_on(async {
            let storage = Storage::open(config.db.as_ref()).change_context(SeedError)?;
            if !args.skip_migrations {
                storage.migrate().await.change_context(SeedError)?;
            }
            bootstrap::seed(storage.store.as_ref())
                .await
                .change_context(SeedError)?;
            Ok(())
        })
}
