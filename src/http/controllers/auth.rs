use actix_web::{
    web::{self, Json},
    HttpResponse,
};

use crate::http::{Actor, Jwt, Result};
use crate::schema::User;
use crate::types::form::auth::{AuthResponse, Login, Register};
use crate::App;

fn issue(app: &App, user: User) -> Result<AuthResponse> {
    let access_token = Jwt::new(user.id.as_str(), app).encode(app)?;
    Ok(AuthResponse { user, access_token })
}

#[tracing::instrument(skip_all)]
pub async fn register(app: web::Data<App>, form: Json<Register>) -> Result<HttpResponse> {
    let user = app.users().register(form.into_inner()).await?;
    Ok(HttpResponse::Created().json(issue(&app, user)?))
}

#[tracing::instrument(skip_all)]
pub async fn login(app: web::Data<App>, form: Json<Login>) -> Result<HttpResponse> {
    let user = app.users().login(form.into_inner()).await?;
    Ok(HttpResponse::Ok().json(issue(&app, user)?))
}

#[tracing::instrument(skip(app))]
pub async fn me(app: web::Data<App>, actor: Actor) -> Result<HttpResponse> {
    let user = app.users().get(actor.user_id()?).await?;
    Ok(HttpResponse::Ok().json(user))
}
