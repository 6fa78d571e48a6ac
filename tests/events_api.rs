mod common;

use axum::http::StatusCode;
use campus_events::types::Role;
use chrono::{Duration, Utc};
use common::{event_body, TestApp};
use serde_json::json;

#[tokio::test]
async fn test_non_organizer_cannot_create_event() {
    let app = TestApp::new();
    let (_, student) = app.seed_user(Role::Student, "Stu", None).await;
    let (_, staff) = app.seed_user(Role::Staff, "Staff", Some("staff@college.edu")).await;
    let start = Utc::now() + Duration::days(3);

    for token in [&student, &staff] {
        let (status, body) = app
            .request("POST", "/api/events", Some(token), Some(event_body("Hack", start, 0)))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Unauthorized");
    }
}

#[tokio::test]
async fn test_requests_without_token_are_unauthorized() {
    let app = TestApp::new();
    let start = Utc::now() + Duration::days(3);

    let (status, _) = app
        .request("POST", "/api/events", None, Some(event_body("Hack", start, 0)))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .request("GET", "/api/registrations", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_event_defaults_and_validation() {
    let app = TestApp::new();
    let (organizer, token) = app
        .seed_user(Role::Organizer, "Org", Some("org@college.edu"))
        .await;
    let start = Utc::now() + Duration::days(5);

    let event = app.create_event(&token, "Tech Fest", start, 0).await;
    assert_eq!(event["organizerId"], organizer.id.as_str());
    assert_eq!(event["category"], "General");
    assert_eq!(event["posterType"], "image/jpeg");
    assert_eq!(event["limit"], 0);
    assert_eq!(event["dateOnly"], start.format("%Y-%m-%d").to_string());

    let (status, body) = app
        .request(
            "POST",
            "/api/events",
            Some(&token),
            Some(json!({
                "title": "No venue",
                "date": "2030-01-01",
                "fromTime": "10:00",
                "toTime": "11:00"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required fields");

    let (status, body) = app
        .request(
            "POST",
            "/api/events",
            Some(&token),
            Some(json!({
                "title": "Bad date",
                "date": "2030-13-45",
                "fromTime": "10:00",
                "toTime": "11:00",
                "venue": "Hall"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid date or time");
}

#[tokio::test]
async fn test_list_events_sorted_with_organizer_and_date_filter() {
    let app = TestApp::new();
    let (_, token) = app
        .seed_user(Role::Organizer, "Org", Some("org@college.edu"))
        .await;
    let later = Utc::now() + Duration::days(10);
    let sooner = Utc::now() + Duration::days(2);

    app.create_event(&token, "Later", later, 0).await;
    app.create_event(&token, "Sooner", sooner, 0).await;

    let (status, body) = app.request("GET", "/api/events", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let events = body.as_array().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["title"], "Sooner");
    assert_eq!(events[1]["title"], "Later");
    assert_eq!(events[0]["organizer"]["name"], "Org");
    assert_eq!(events[0]["organizer"]["email"], "org@college.edu");

    let uri = format!("/api/events?date={}", later.format("%Y-%m-%d"));
    let (status, body) = app.request("GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    let events = body.as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["title"], "Later");

    let (status, body) = app.request("GET", "/api/events?date=someday", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid date");
}

#[tokio::test]
async fn test_get_event_and_missing_event() {
    let app = TestApp::new();
    let (_, token) = app.seed_user(Role::Organizer, "Org", None).await;
    let (_, student) = app.seed_user(Role::Student, "Stu", None).await;
    let event = app
        .create_event(&token, "Seminar", Utc::now() + Duration::days(1), 0)
        .await;
    let id = event["id"].as_str().unwrap();

    let (status, body) = app
        .request("GET", &format!("/api/events/{id}"), Some(&student), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Seminar");

    let (status, body) = app
        .request("GET", "/api/events/nope", Some(&student), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Event not found");
}

#[tokio::test]
async fn test_update_and_delete_respect_ownership() {
    let app = TestApp::new();
    let (_, owner) = app.seed_user(Role::Organizer, "Owner", None).await;
    let (_, other) = app.seed_user(Role::Organizer, "Other", None).await;
    let (_, admin) = app.seed_user(Role::Admin, "Admin", None).await;
    let event = app
        .create_event(&owner, "Workshop", Utc::now() + Duration::days(4), 10)
        .await;
    let uri = format!("/api/events/{}", event["id"].as_str().unwrap());

    let (status, body) = app
        .request("PUT", &uri, Some(&other), Some(json!({ "title": "Hijacked" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Unauthorized");

    let (status, body) = app
        .request(
            "PUT",
            &uri,
            Some(&owner),
            Some(json!({
                "title": "Rust Workshop",
                "limit": "25",
                "date": "2031-06-01T09:30:00Z"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Rust Workshop");
    assert_eq!(body["limit"], 25);
    assert_eq!(body["dateOnly"], "2031-06-01");
    assert_eq!(body["fromTime"], "09:30");
    assert!(body["updatedAt"].is_string());

    for bad in [json!(-5), json!("abc")] {
        let (status, body) = app
            .request("PUT", &uri, Some(&owner), Some(json!({ "limit": bad })))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["limit"], 0);
        assert_eq!(body["title"], "Rust Workshop");
    }

    let (status, _) = app.request("DELETE", &uri, Some(&other), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.request("DELETE", &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Deleted successfully");

    let (status, body) = app.request("DELETE", &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not found");
}

#[tokio::test]
async fn test_health_and_metrics_endpoints() {
    let app = TestApp::new();
    let (_, token) = app.seed_user(Role::Organizer, "Org", None).await;
    app.create_event(&token, "Counted", Utc::now() + Duration::days(2), 0)
        .await;

    let (status, body) = app.request("GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = app.request("GET", "/api/metrics", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["eventsCreated"], 1);
    assert!(body["totalRequests"].as_u64().unwrap() >= 1);
}
