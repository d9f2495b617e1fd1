pub mod bootstrap;
pub mod config;
pub mod database;
pub mod http;
pub mod progress;
pub mod schema;
pub mod services;
pub mod store;
pub mod telemetry;
pub mod types;
pub mod util;

mod app;
pub use app::App;
