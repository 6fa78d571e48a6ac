mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn test_student_register_and_login() {
    let app = TestApp::new();

    let (status, body) = app
        .request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "name": "Meera",
                "password": "pass1234",
                "role": "STUDENT",
                "registerNumber": "21CS101",
                "email": "meera@college.edu"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User registered successfully");
    assert_eq!(body["user"]["registerNumber"], "21CS101");
    assert!(body["user"].get("password").is_none());

    let claims = app
        .state
        .jwt
        .verify(body["token"].as_str().unwrap())
        .unwrap();
    assert_eq!(claims.user_id, body["user"]["id"].as_str().unwrap());

    let (status, body) = app
        .request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "registerNumber": "21CS101", "password": "pass1234", "role": "STUDENT" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["user"]["name"], "Meera");
    assert_eq!(body["user"]["role"], "STUDENT");
}

#[tokio::test]
async fn test_student_login_failures() {
    let app = TestApp::new();
    app.request(
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "name": "Arjun",
            "password": "pass1234",
            "role": "STUDENT",
            "registerNumber": "21ME007"
        })),
    )
    .await;

    let (status, body) = app
        .request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "registerNumber": "21ME007", "password": "wrong" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");

    let (status, _) = app
        .request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "registerNumber": "99XX999", "password": "pass1234" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Right password, wrong portal.
    let (status, body) = app
        .request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "registerNumber": "21ME007", "password": "pass1234", "role": "ADMIN" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn test_register_validation() {
    let app = TestApp::new();

    let (status, body) = app
        .request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "name": "NoRole", "password": "pass1234" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required fields");

    let (status, body) = app
        .request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "name": "S", "password": "pass1234", "role": "STUDENT" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Register Number is required for Students");

    let (status, body) = app
        .request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "name": "S", "password": "pass1234", "role": "STAFF" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email is required");

    let (status, body) = app
        .request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "name": "S",
                "password": "pass1234",
                "role": "DEAN",
                "email": "d@c.edu"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid role");
}

#[tokio::test]
async fn test_duplicate_register_number_rejected() {
    let app = TestApp::new();
    let student = json!({
        "name": "Kiran",
        "password": "pass1234",
        "role": "STUDENT",
        "registerNumber": "21EE050"
    });

    let (status, _) = app
        .request("POST", "/api/auth/register", None, Some(student.clone()))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .request("POST", "/api/auth/register", None, Some(student))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Register Number already registered");
}

#[tokio::test]
async fn test_staff_register_and_login_through_identity_provider() {
    let app = TestApp::new();

    let (status, body) = app
        .request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "name": "Prof. Rao",
                "email": "rao@college.edu",
                "password": "lecture99",
                "role": "ORGANIZER"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role"], "ORGANIZER");
    let id = body["user"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "name": "Copy",
                "email": "rao@college.edu",
                "password": "lecture99",
                "role": "STAFF"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email already registered");

    let (status, body) = app
        .request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "name": "Weak",
                "email": "weak@college.edu",
                "password": "123",
                "role": "STAFF"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Password should be at least 6 characters");

    let (status, body) = app
        .request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({
                "email": "rao@college.edu",
                "password": "lecture99",
                "role": "ORGANIZER"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], id.as_str());
    assert_eq!(body["user"]["email"], "rao@college.edu");

    let (status, body) = app
        .request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "rao@college.edu", "password": "nope-nope" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn test_login_missing_fields() {
    let app = TestApp::new();

    let (status, body) = app
        .request("POST", "/api/auth/login", None, Some(json!({ "password": "x" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing fields");

    let (status, _) = app
        .request("POST", "/api/auth/login", None, Some(json!({ "email": "a@b.edu" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_json_is_bad_request() {
    let app = TestApp::new();
    let response = {
        use axum::body::Body;
        use axum::http::Request;
        use tower::ServiceExt;
        app.router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/auth/login")
                    .method("POST")
                    .header("content-type", "application/json")
                    .body(Body::from("invalid json"))
                    .unwrap(),
            )
            .await
            .unwrap()
    };
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
