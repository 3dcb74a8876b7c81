//! End-to-end resource behaviour through the full router (in-memory backend)

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use roster_server::db::MemoryDatabase;
use roster_server::{build_router, AppState, ServerConfig};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> Router {
    build_router(AppState::memory(MemoryDatabase::new()), &ServerConfig::default())
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn create_student(app: &Router, name: &str) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/students",
        Some(json!({"name": name, "email": format!("{}@school.test", name.to_lowercase()), "age": 17})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

#[tokio::test]
async fn created_id_matches_get_by_id() {
    let app = app();
    let created = create_student(&app, "Ada").await;
    let id = created["id"].as_i64().expect("generated id");

    let (status, fetched) = send(&app, "GET", &format!("/students/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], id);
    assert_eq!(fetched["name"], "Ada");
}

#[tokio::test]
async fn list_paginates_and_counts_listed_entity() {
    let app = app();
    for name in ["Ada", "Bob", "Cy", "Di", "Ed"] {
        create_student(&app, name).await;
    }
    // Courses must not leak into the student total
    send(&app, "POST", "/courses", Some(json!({"name": "Algebra"}))).await;

    let (status, body) = send(&app, "GET", "/students?limit=2&page=1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["meta"]["totalItems"], 5);
    assert_eq!(body["meta"]["page"], 1);
    assert_eq!(body["meta"]["totalPages"], 3);

    let (_, last) = send(&app, "GET", "/students?limit=2&page=3", None).await;
    let names: Vec<_> = last["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(names, vec!["Ed"]);
}

#[tokio::test]
async fn invalid_page_falls_back_to_first() {
    let app = app();
    for name in ["Ada", "Bob", "Cy"] {
        create_student(&app, name).await;
    }

    let (status, body) = send(&app, "GET", "/students?page=abc&limit=2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["page"], 1);
    assert_eq!(body["data"][0]["name"], "Ada");
}

#[tokio::test]
async fn sorts_by_name_descending() {
    let app = app();
    for name in ["Bob", "Ada", "Cy"] {
        create_student(&app, name).await;
    }

    let (_, body) = send(&app, "GET", "/students?sortBy=name&order=DESC", None).await;
    let names: Vec<_> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(names, vec!["Cy", "Bob", "Ada"]);
}

#[tokio::test]
async fn missing_id_is_404() {
    let app = app();
    let (status, body) = send(&app, "GET", "/students/99999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"message": "Not found"}));
}

#[tokio::test]
async fn partial_update_changes_only_name() {
    let app = app();
    let created = create_student(&app, "Ada").await;
    let id = created["id"].as_i64().unwrap();

    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/students/{id}"),
        Some(json!({"name": "X"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], id);
    assert_eq!(updated["name"], "X");
    assert_eq!(updated["email"], created["email"]);
    assert_eq!(updated["age"], created["age"]);
    assert_eq!(updated["createdAt"], created["createdAt"]);
}

#[tokio::test]
async fn null_in_patch_clears_field() {
    let app = app();
    let created = create_student(&app, "Ada").await;
    let id = created["id"].as_i64().unwrap();

    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/students/{id}"),
        Some(json!({"email": null, "age": null})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Ada");
    assert_eq!(updated["email"], Value::Null);
    assert_eq!(updated["age"], Value::Null);

    let (_, course) = send(
        &app,
        "POST",
        "/courses",
        Some(json!({"name": "Algebra", "studentId": id})),
    )
    .await;
    let course_uri = format!("/courses/{}", course["id"]);

    let (status, unlinked) = send(&app, "PUT", &course_uri, Some(json!({"studentId": null}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(unlinked["studentId"], Value::Null);
    assert_eq!(unlinked["name"], "Algebra");

    let (_, fetched) = send(&app, "GET", &format!("/students/{id}"), None).await;
    assert_eq!(fetched["Course"], json!([]));
}

#[tokio::test]
async fn duplicate_query_keys_keep_first_value() {
    let app = app();
    for name in ["Ada", "Bob", "Cy"] {
        create_student(&app, name).await;
    }

    let request = Request::builder()
        .uri("/students?page=1&page=2&limit=2")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "application/json"
    );

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["meta"]["page"], 1);
    assert_eq!(body["data"][0]["name"], "Ada");
}

#[tokio::test]
async fn delete_then_get_is_404() {
    let app = app();
    let created = create_student(&app, "Ada").await;
    let uri = format!("/students/{}", created["id"]);

    let (status, body) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Student deleted successfully");

    let (status, _) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn populate_course_joins_on_list_only_when_asked() {
    let app = app();
    let (_, teacher) = send(
        &app,
        "POST",
        "/teachers",
        Some(json!({"name": "Grace", "department": "Computing"})),
    )
    .await;
    let teacher_id = teacher["id"].as_i64().unwrap();
    send(&app, "POST", "/teachers", Some(json!({"name": "Alan", "department": "Logic"}))).await;

    let (status, _) = send(
        &app,
        "POST",
        "/courses",
        Some(json!({"name": "Compilers", "teacherId": teacher_id})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, plain) = send(&app, "GET", "/teachers", None).await;
    assert!(plain["data"][0].get("Course").is_none());

    let (_, joined) = send(&app, "GET", "/teachers?populate=Course", None).await;
    assert_eq!(joined["data"][0]["Course"][0]["name"], "Compilers");
    assert_eq!(joined["data"][0]["Course"][0]["teacherId"], teacher_id);
    assert_eq!(joined["data"][1]["Course"], json!([]));
}

#[tokio::test]
async fn get_by_id_always_joins_course() {
    let app = app();
    let student = create_student(&app, "Ada").await;
    let id = student["id"].as_i64().unwrap();
    send(
        &app,
        "POST",
        "/courses",
        Some(json!({"name": "Algebra", "studentId": id})),
    )
    .await;

    let (_, fetched) = send(&app, "GET", &format!("/students/{id}?populate="), None).await;
    assert_eq!(fetched["Course"].as_array().unwrap().len(), 1);
    assert_eq!(fetched["Course"][0]["name"], "Algebra");
}

#[tokio::test]
async fn dangling_course_owner_is_server_error() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/courses",
        Some(json!({"name": "Algebra", "studentId": 404})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("student_id"));
}

#[tokio::test]
async fn malformed_json_is_400() {
    let app = app();
    let request = Request::builder()
        .method("POST")
        .uri("/students")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
