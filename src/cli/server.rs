use clap::Parser;
use error_stack::{Result, ResultExt};
use std::net::IpAddr;
use std::num::NonZeroUsize;
use thiserror::Error;

use pranikov::bootstrap::{self, Storage};
use pranikov::config::Server as Config;
use pranikov::App;

#[derive(Debug, Error)]
#[error("Failed to start the server")]
pub struct StartServerError;

/// Expose the Pranikov API HTTP server
#[derive(Debug, Parser)]
pub struct ServerCommand {
    #[clap(long)]
    pub address: Option<IpAddr>,
    #[clap(long)]
    pub port: Option<u16>,
    #[clap(long)]
    pub workers: Option<NonZeroUsize>,
}

pub fn run(args: ServerCommand) -> Result<(), StartServerError> {
    let mut config = Config::load().change_context(StartServerError)?;
    args.override_config(&mut config);

    pranikov::telemetry::init(&config.logging).change_context(StartServerError)?;
    super::build_runtime(config.workers)
        .change_context(StartServerError)
        .attach_printable("could not build tokio runtime")?
        .block_on(start(config))
}

async fn start(config: Config) -> Result<(), StartServerError> {
    let storage = Storage::open(config.db.as_ref()).change_context(StartServerError)?;
    storage.migrate().await.change_context(StartServerError)?;

    if config.seed {
        bootstrap::seed(storage.store.as_ref())
            .await
            .change_context(StartServerError)?;
    }

    let app = App::new(config, storage.store);
    pranikov::http::serve(app)
        .await
        .change_context(StartServerError)
}

impl ServerCommand {
    fn override_config(&self, config: &mut Config) {
        // override server configurations if set by the cli
        if let Some(address) = self.address {
            config.ip = address;
        }

        if let Some(port) = self.port {
            config.port = port;
        }

        if let Some(workers) = self.workers {
            config.workers = workers.get();
        }
    }
}
