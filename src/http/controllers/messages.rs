use actix_web::{
    web::{self, Json, Path},
    HttpResponse,
};

use crate::http::Result;
use crate::types::form::messages::SendMessage;
use crate::App;

#[tracing::instrument(skip(app))]
pub async fn list_for_project(app: web::Data<App>, id: Path<String>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(app.messages().list(Some(id.as_str())).await?))
}

#[tracing::instrument(skip(app, form))]
pub async fn send(
    app: web::Data<App>,
    id: Path<String>,
    form: Json<SendMessage>,
) -> Result<HttpResponse> {
    let message = app.messages().send(&id, form.into_inner()).await?;
    Ok(HttpResponse::Created().json(message))
}

#[tracing::instrument(skip_all)]
pub async fn list_all(app: web::Data<App>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(app.messages().list(None).await?))
}
