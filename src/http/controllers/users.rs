use actix_web::{web, HttpResponse};

use crate::http::Result;
use crate::App;

#[tracing::instrument(skip_all)]
pub async fn list(app: web::Data<App>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(app.users().list().await?))
}
