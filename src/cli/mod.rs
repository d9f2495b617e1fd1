use clap::Parser;
use error_stack::{Result, ResultExt};
use thiserror::Error;

mod seed;
mod server;

#[derive(Debug, Error)]
#[error("Command failed")]
pub struct CliError;

/// Command line options for Pranikov.
#[derive(Debug, Parser)]
#[command(
    about = "Project tracking backend of the Pranikov workspace",
    version,
    author,
    long_about
)]
pub struct Cli {
    #[clap(subcommand)]
    pub subcommand: Subcommand,
}

impl Cli {
    pub fn run(self) -> Result<(), CliError> {
        match self.subcommand {
            Subcommand::Server(args) => self::server::run(args).change_context(CliError),
            Subcommand::Seed(args) => self::seed::run(args).change_context(CliError),
        }
    }
}

#[derive(Debug, Parser)]
pub enum Subcommand {
    Server(self::server::ServerCommand),
    Seed(self::seed::SeedCommand),
}

fn build_runtime(workers: usize) -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(workers)
        .build()
}
