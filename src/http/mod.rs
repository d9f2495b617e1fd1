use actix_web::{web, HttpServer};
use error_stack::ResultExt;
use tracing_actix_web::TracingLogger;

pub mod actor;
pub mod controllers;
pub mod error;
pub mod jwt;

pub use actor::Actor;
pub use error::{Error, Result};
pub use jwt::Jwt;

use crate::App;

#[derive(Debug, thiserror::Error)]
#[error("Could not run the HTTP server")]
pub struct ServeError;

/// Registers the shared state, the extractor settings and every route.
pub fn configure(app: App) -> impl FnOnce(&mut web::ServiceConfig) {
    let max_body_bytes = app.config.max_body_bytes;
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(web::Data::new(app))
            .app_data(
                web::JsonConfig::default()
                    .limit(max_body_bytes)
                    .error_handler(|err, _req| Error::from(err).into()),
            )
            .app_data(
                web::QueryConfig::default().error_handler(|err, _req| Error::from(err).into()),
            );
        controllers::configure(cfg);
    }
}

#[tracing::instrument(skip_all)]
pub async fn serve(app: App) -> error_stack::Result<(), ServeError> {
    let address = (app.config.ip, app.config.port);
    let workers = app.config.workers;

    let server = HttpServer::new(move || {
        actix_web::App::new()
            .wrap(TracingLogger::default())
            .configure(configure(app.clone()))
    })
    .workers(workers)
    .bind(address)
    .change_context(ServeError)
    .attach_printable_lazy(|| format!("could not bind to {}:{}", address.0, address.1))?;

    tracing::info!("Listening on http://{}:{}", address.0, address.1);
    server.run().await.change_context(ServeError)
}

#[cfg(test)]
mod tests;
