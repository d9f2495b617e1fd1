use actix_web::{web, HttpResponse};
use serde_json::json;

pub mod auth;
pub mod messages;
pub mod projects;
pub mod users;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health)).service(
        web::scope("/api")
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me)),
            )
            .route("/users", web::get().to(users::list))
            .service(
                web::resource("/projects")
                    .route(web::get().to(projects::list))
                    .route(web::post().to(projects::create)),
            )
            .route("/projects/{id}", web::get().to(projects::get))
            .route(
                "/projects/{id}/checkpoints",
                web::put().to(projects::replace_checkpoints),
            )
            .service(
                web::resource("/projects/{id}/messages")
                    .route(web::get().to(messages::list_for_project))
                    .route(web::post().to(messages::send)),
            )
            .route("/messages", web::get().to(messages::list_all)),
    );
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}
