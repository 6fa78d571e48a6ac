#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use campus_events::config::Config;
use campus_events::identity::LocalIdentity;
use campus_events::mailer::MemoryMailer;
use campus_events::memory::MemoryStore;
use campus_events::routes::create_router;
use campus_events::state::AppState;
use campus_events::types::{new_id, Role, User};
use chrono::{DateTime, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

pub struct TestApp {
    pub state: AppState,
    pub mailer: Arc<MemoryMailer>,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_mailer(Arc::new(MemoryMailer::new()))
    }

    pub fn with_mailer(mailer: Arc<MemoryMailer>) -> Self {
        let config = Config {
            bcrypt_cost: 4,
            ..Config::default()
        };
        let state = AppState::with_collaborators(
            config,
            Arc::new(MemoryStore::new()),
            Arc::new(LocalIdentity::new(4)),
            mailer.clone(),
        );
        let router = create_router(state.clone());
        Self {
            state,
            mailer,
            router,
        }
    }

    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let body = match body {
            Some(value) => {
                builder = builder.header("content-type", "application/json");
                Body::from(serde_json::to_string(&value).unwrap())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    /// Store a user directly and mint a token for it.
    pub async fn seed_user(&self, role: Role, name: &str, email: Option<&str>) -> (User, String) {
        let user = User {
            id: new_id(),
            name: name.to_string(),
            email: email.map(str::to_string),
            register_number: None,
            role,
            password_hash: None,
            created_at: Utc::now(),
        };
        self.state.users.save(user.clone()).await.unwrap();
        let token = self
            .state
            .jwt
            .issue(&user.id, user.email.as_deref(), role)
            .unwrap();
        (user, token)
    }

    /// Create an event through the API as `token` and return its JSON.
    pub async fn create_event(
        &self,
        token: &str,
        title: &str,
        start: DateTime<Utc>,
        limit: u32,
    ) -> Value {
        let (status, body) = self
            .request(
                "POST",
                "/api/events",
                Some(token),
                Some(event_body(title, start, limit)),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create event failed: {body}");
        body
    }
}

pub fn event_body(title: &str, start: DateTime<Utc>, limit: u32) -> Value {
    json!({
        "title": title,
        "description": "Annual meetup",
        "date": start.format("%Y-%m-%d").to_string(),
        "fromTime": start.format("%H:%M").to_string(),
        "toTime": "23:59",
        "venue": "Main Auditorium",
        "limit": limit,
    })
}
