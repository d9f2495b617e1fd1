#![allow(clippy::unwrap_used)]
use actix_web::{
    http::{header, StatusCode},
    test, App as WebApp,
};
use serde_json::{json, Value};

use super::configure;
use crate::{bootstrap, App};

async fn seeded_app() -> App {
    let app = App::new_for_tests();
    bootstrap::seed(app.store.as_ref()).await.unwrap();
    app
}

macro_rules! init {
    ($app:expr) => {
        test::init_service(WebApp::new().configure(configure($app))).await
    };
}

#[track_caller]
fn assert_error(body: &Value, kind: &str) {
    assert_eq!(kind, body["type"], "{body}");
    assert!(body["error"].is_string(), "{body}");
}

#[actix_web::test]
async fn test_health() {
    let service = init!(App::new_for_tests());
    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&service, req).await;
    assert_eq!(json!({ "status": "ok" }), body);
}

#[actix_web::test]
async fn test_register_and_me() {
    let service = init!(App::new_for_tests());

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({
            "name": "Sarah Dev",
            "email": "sarah@pranikov.com",
            "role": "EMPLOYEE",
            "password": "123",
        }))
        .to_request();

    let res = test::call_service(&service, req).await;
    assert_eq!(StatusCode::CREATED, res.status());

    let body: Value = test::read_body_json(res).await;
    let token = body["accessToken"].as_str().unwrap().to_string();
    assert_eq!("EMPLOYEE", body["user"]["role"]);
    assert!(body["user"].get("password").is_none());

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
        .to_request();

    let me: Value = test::call_and_read_body_json(&service, req).await;
    assert_eq!(body["user"], me);

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({ "name": "Sarah", "email": "SARAH@pranikov.com", "role": "MANAGER" }))
        .to_request();

    let res = test::call_service(&service, req).await;
    assert_eq!(StatusCode::BAD_REQUEST, res.status());
    let body: Value = test::read_body_json(res).await;
    assert_error(&body, "invalid_form_body");
    assert_eq!("Email already exists", body["error"]);

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({ "name": "Nobody" }))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&service, req).await).await;
    assert_eq!("Missing fields", body["error"]);
}

#[actix_web::test]
async fn test_me_requires_token() {
    let app = App::new_for_tests();
    let ghost = crate::http::Jwt::new("u404", &app).encode(&app).unwrap();
    let service = init!(app);

    let req = test::TestRequest::get().uri("/api/auth/me").to_request();
    let res = test::call_service(&service, req).await;
    assert_eq!(StatusCode::UNAUTHORIZED, res.status());

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header((header::AUTHORIZATION, "Bearer not-a-token"))
        .to_request();
    let res = test::call_service(&service, req).await;
    assert_eq!(StatusCode::UNAUTHORIZED, res.status());

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header((header::AUTHORIZATION, format!("Bearer {ghost}")))
        .to_request();
    let res = test::call_service(&service, req).await;
    assert_eq!(StatusCode::NOT_FOUND, res.status());
}

#[actix_web::test]
async fn test_login() {
    let service = init!(seeded_app().await);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": "Manager@Pranikov.com", "password": "123" }))
        .to_request();
    let res = test::call_service(&service, req).await;
    assert_eq!(StatusCode::OK, res.status());

    let body: Value = test::read_body_json(res).await;
    assert_eq!("u1", body["user"]["id"]);
    assert!(body["accessToken"].is_string());

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": "manager@pranikov.com", "password": "1234" }))
        .to_request();
    let res = test::call_service(&service, req).await;
    assert_eq!(StatusCode::UNAUTHORIZED, res.status());

    let body: Value = test::read_body_json(res).await;
    assert_error(&body, "invalid_credentials");
}

#[actix_web::test]
async fn test_project_visibility() {
    let service = init!(seeded_app().await);

    let list = |query: &'static str| {
        test::TestRequest::get()
            .uri(&format!("/api/projects{query}"))
            .to_request()
    };

    let body: Value =
        test::call_and_read_body_json(&service, list("?role=EMPLOYEE&userId=u2")).await;
    assert_eq!("p1", body[0]["id"]);
    assert_eq!(75, body[0]["progress"]);

    let body: Value =
        test::call_and_read_body_json(&service, list("?role=EMPLOYEE&userId=u9")).await;
    assert_eq!(json!([]), body);

    let body: Value =
        test::call_and_read_body_json(&service, list("?role=MANAGER&userId=u9")).await;
    assert_eq!(1, body.as_array().unwrap().len());

    let body: Value = test::call_and_read_body_json(&service, list("")).await;
    assert_eq!(json!([]), body);
}

#[actix_web::test]
async fn test_create_and_get_project() {
    let service = init!(App::new_for_tests());

    let req = test::TestRequest::post()
        .uri("/api/projects")
        .set_json(json!({
            "project_name": "Mobile App",
            "createdBy": "u1",
            "assignedUserIds": ["u2"],
            "progress": 90,
            "checkpoints": [{
                "id": "c1",
                "title": "Kickoff",
                "tasks": [
                    { "id": "t1", "title": "Plan", "status": "COMPLETED" },
                    { "id": "t2", "title": "Staff", "status": "PENDING" },
                    { "id": "t3", "title": "Budget", "status": "PENDING" },
                ],
            }],
        }))
        .to_request();

    let res = test::call_service(&service, req).await;
    assert_eq!(StatusCode::CREATED, res.status());

    let created: Value = test::read_body_json(res).await;
    assert_eq!("Mobile App", created["projectName"]);
    assert_eq!(33, created["progress"]);
    assert_eq!(Value::Null, created["deadline"]);

    let id = created["id"].as_str().unwrap();
    let req = test::TestRequest::get()
        .uri(&format!("/api/projects/{id}"))
        .to_request();
    let fetched: Value = test::call_and_read_body_json(&service, req).await;
    assert_eq!(created, fetched);

    let req = test::TestRequest::get().uri("/api/projects/p404").to_request();
    let res = test::call_service(&service, req).await;
    assert_eq!(StatusCode::NOT_FOUND, res.status());
    let body: Value = test::read_body_json(res).await;
    assert_error(&body, "not_found");
}

#[actix_web::test]
async fn test_replace_checkpoints() {
    let service = init!(seeded_app().await);
    let tree = json!([{
        "id": "c9",
        "title": "Launch",
        "description": "",
        "deadline": "2024-01-31",
        "status": "PENDING",
        "tasks": [{ "id": "t9", "title": "Ship it", "status": "COMPLETED" }],
    }]);

    let put = |payload: &Value| {
        test::TestRequest::put()
            .uri("/api/projects/p1/checkpoints")
            .set_json(payload)
            .to_request()
    };

    let body: Value = test::call_and_read_body_json(&service, put(&tree)).await;
    assert_eq!(100, body["progress"]);
    assert_eq!("COMPLETED", body["checkpoints"][0]["status"]);
    assert_eq!(1, body["checkpoints"].as_array().unwrap().len());

    let body: Value =
        test::call_and_read_body_json(&service, put(&json!({ "checkpoints": [] }))).await;
    assert_eq!(0, body["progress"]);

    let res = test::call_service(&service, put(&json!({ "checkpoints": "nope" }))).await;
    assert_eq!(StatusCode::BAD_REQUEST, res.status());
    let body: Value = test::read_body_json(res).await;
    assert_error(&body, "invalid_form_body");

    let mut unknown = tree.clone();
    unknown[0]["tasks"][0]["status"] = json!("DONE");
    let res = test::call_service(&service, put(&unknown)).await;
    assert_eq!(StatusCode::BAD_REQUEST, res.status());
    let body: Value = test::read_body_json(res).await;
    assert_error(&body, "invalid_form_body");
    assert!(body["error"].as_str().unwrap().contains("DONE"), "{body}");

    let req = test::TestRequest::put()
        .uri("/api/projects/p404/checkpoints")
        .set_json(&tree)
        .to_request();
    let res = test::call_service(&service, req).await;
    assert_eq!(StatusCode::NOT_FOUND, res.status());
}

#[actix_web::test]
async fn test_messages() {
    let service = init!(seeded_app().await);

    let send = |project: &str, payload: Value| {
        test::TestRequest::post()
            .uri(&format!("/api/projects/{project}/messages"))
            .set_json(payload)
            .to_request()
    };

    for timestamp in [300, 100, 200] {
        let req = send(
            "p1",
            json!({ "senderId": "u2", "content": "hi", "timestamp": timestamp }),
        );
        let res = test::call_service(&service, req).await;
        assert_eq!(StatusCode::CREATED, res.status());
    }

    let res = test::call_service(&service, send("p404", json!({ "senderId": "u2" }))).await;
    assert_eq!(StatusCode::NOT_FOUND, res.status());

    let res = test::call_service(&service, send("p1", json!({ "content": "anonymous" }))).await;
    assert_eq!(StatusCode::BAD_REQUEST, res.status());

    let req = test::TestRequest::get()
        .uri("/api/projects/p1/messages")
        .to_request();
    let body: Value = test::call_and_read_body_json(&service, req).await;
    let timestamps = body
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["timestamp"].as_i64().unwrap())
        .collect::<Vec<_>>();

    // seeded messages carry current timestamps
    assert_eq!(&[100, 200, 300], &timestamps[..3]);
    assert_eq!(5, timestamps.len());
    assert_eq!("text", body[0]["type"]);

    let req = test::TestRequest::get().uri("/api/messages").to_request();
    let all: Value = test::call_and_read_body_json(&service, req).await;
    assert_eq!(body, all);

    let req = test::TestRequest::get()
        .uri("/api/projects/p404/messages")
        .to_request();
    let body: Value = test::call_and_read_body_json(&service, req).await;
    assert_eq!(json!([]), body);
}

#[actix_web::test]
async fn test_large_attachment_message() {
    let service = init!(seeded_app().await);
    let content = format!("data:image/png;base64,{}", "A".repeat(3 * 1024 * 1024));

    let req = test::TestRequest::post()
        .uri("/api/projects/p1/messages")
        .set_json(json!({
            "senderId": "u2",
            "type": "image",
            "content": content,
            "fileName": "mockup.png",
        }))
        .to_request();
    let res = test::call_service(&service, req).await;
    assert_eq!(StatusCode::CREATED, res.status());

    let body: Value = test::read_body_json(res).await;
    assert_eq!("image", body["type"]);
    assert_eq!(content.len(), body["content"].as_str().unwrap().len());
}

#[actix_web::test]
async fn test_list_users_hides_passwords() {
    let service = init!(seeded_app().await);
    let req = test::TestRequest::get().uri("/api/users").to_request();
    let body: Value = test::call_and_read_body_json(&service, req).await;

    let users = body.as_array().unwrap();
    assert_eq!(3, users.len());
    assert!(users.iter().all(|u| u.get("password").is_none()));
}
