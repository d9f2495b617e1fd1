use actix_web::{
    web::{self, Json, Path, Query},
    HttpResponse,
};

use crate::http::Result;
use crate::services::ProjectFilter;
use crate::types::form::projects::{CreateProject, ListProjects, ReplaceCheckpoints};
use crate::App;

#[tracing::instrument(skip(app))]
pub async fn list(app: web::Data<App>, query: Query<ListProjects>) -> Result<HttpResponse> {
    let filter = ProjectFilter::from(query.into_inner());
    Ok(HttpResponse::Ok().json(app.projects().list(&filter).await?))
}

#[tracing::instrument(skip_all)]
pub async fn create(app: web::Data<App>, form: Json<CreateProject>) -> Result<HttpResponse> {
    let project = app.projects().create(form.into_inner()).await?;
    Ok(HttpResponse::Created().json(project))
}

#[tracing::instrument(skip(app))]
pub async fn get(app: web::Data<App>, id: Path<String>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(app.projects().get(&id).await?))
}

#[tracing::instrument(skip(app, form))]
pub async fn replace_checkpoints(
    app: web::Data<App>,
    id: Path<String>,
    form: Json<ReplaceCheckpoints>,
) -> Result<HttpResponse> {
    let ReplaceCheckpoints(checkpoints) = form.into_inner();
    let project = app.projects().replace_checkpoints(&id, checkpoints).await?;
    Ok(HttpResponse::Ok().json(project))
}
