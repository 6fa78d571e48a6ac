use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Generate a fresh document id.
pub fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Student,
    Staff,
    Organizer,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "STUDENT",
            Role::Staff => "STAFF",
            Role::Organizer => "ORGANIZER",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STUDENT" => Ok(Role::Student),
            "STAFF" => Ok(Role::Staff),
            "ORGANIZER" => Ok(Role::Organizer),
            "ADMIN" => Ok(Role::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Stored documents
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub register_number: Option<String>,
    pub role: Role,
    /// bcrypt hash; only students carry a locally managed password
    #[serde(rename = "password", default, skip_serializing)]
    #[schema(ignore)]
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Start of the event
    pub date: DateTime<Utc>,
    /// Calendar day as entered, `YYYY-MM-DD`
    pub date_only: String,
    /// `HH:MM`
    pub from_time: String,
    /// `HH:MM`
    pub to_time: String,
    pub venue: String,
    pub room: String,
    pub manual_venue: bool,
    pub category: String,
    pub poster_url: String,
    pub poster_type: String,
    pub registration_link: String,
    /// Maximum registrations, 0 means unlimited
    pub limit: u32,
    pub organizer_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub id: String,
    pub user_id: String,
    pub event_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(user_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            user_id: user_id.into(),
            message: message.into(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum EmailStatus {
    Sent,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmailLog {
    pub id: String,
    pub to: String,
    pub subject: String,
    pub status: EmailStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    /// One of STUDENT, STAFF, ORGANIZER, ADMIN
    pub role: Option<String>,
    /// Required for students
    pub register_number: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: Option<String>,
    pub register_number: Option<String>,
    pub password: Option<String>,
    /// When present, the account must hold this role
    pub role: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    /// `YYYY-MM-DD`
    pub date: Option<String>,
    /// `HH:MM`
    pub from_time: Option<String>,
    /// `HH:MM`
    pub to_time: Option<String>,
    pub venue: Option<String>,
    pub room: Option<String>,
    pub manual_venue: Option<bool>,
    pub category: Option<String>,
    pub poster_url: Option<String>,
    pub poster_type: Option<String>,
    pub registration_link: Option<String>,
    /// Number or numeric string
    #[serde(default, deserialize_with = "deserialize_limit")]
    #[schema(value_type = Option<u32>)]
    pub limit: Option<u32>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub venue: Option<String>,
    /// RFC 3339 instant, `YYYY-MM-DDTHH:MM` or `YYYY-MM-DD`
    pub date: Option<String>,
    #[serde(default, deserialize_with = "deserialize_limit")]
    #[schema(value_type = Option<u32>)]
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EventsQuery {
    /// Only events starting on this calendar day (`YYYY-MM-DD`)
    pub date: Option<String>,
}

/// Accepts `5`, `5.0`, `"5"` or `" 5 "`. Anything else, including negatives, is `None`.
pub fn parse_limit(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.trunc() as u64))
            .and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}

/// Absent or `null` stays `None`; any other value that fails [`parse_limit`] becomes 0.
fn deserialize_limit<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.map(|v| parse_limit(&v).unwrap_or(0)))
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub register_number: Option<String>,
    pub role: Role,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            register_number: user.register_number.clone(),
            role: user.role,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: UserSummary,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrganizerSummary {
    pub name: String,
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EventWithOrganizer {
    #[serde(flatten)]
    pub event: Event,
    pub organizer: Option<OrganizerSummary>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterForEventResponse {
    pub message: String,
    pub registration: Registration,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegistrationWithEvent {
    #[serde(flatten)]
    pub registration: Registration,
    pub event: Event,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendeeUser {
    pub id: String,
    pub name: String,
    /// `N/A` when the account has no email
    pub email: String,
    /// `N/A` when the account has no register number
    pub register_number: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    #[serde(flatten)]
    pub registration: Registration,
    pub user: Option<AttendeeUser>,
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReminderSummary {
    /// Events starting inside the reminder window
    pub events_matched: usize,
    pub reminders_sent: usize,
    pub failures: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_wire_format() {
        assert_eq!(serde_json::to_value(Role::Organizer).unwrap(), "ORGANIZER");
        assert_eq!("STAFF".parse::<Role>().unwrap(), Role::Staff);
        assert!("student".parse::<Role>().is_err());
    }

    #[test]
    fn test_parse_limit() {
        assert_eq!(parse_limit(&json!(25)), Some(25));
        assert_eq!(parse_limit(&json!("40")), Some(40));
        assert_eq!(parse_limit(&json!(12.7)), Some(12));
        assert_eq!(parse_limit(&json!(-3)), None);
        assert_eq!(parse_limit(&json!("lots")), None);
        assert_eq!(parse_limit(&json!(null)), None);
    }

    #[test]
    fn test_create_event_request_accepts_string_limit() {
        let req: CreateEventRequest = serde_json::from_value(json!({
            "title": "Hackathon",
            "date": "2030-03-01",
            "fromTime": "09:00",
            "toTime": "17:00",
            "venue": "Main Hall",
            "limit": "50"
        }))
        .unwrap();
        assert_eq!(req.limit, Some(50));
        assert_eq!(req.from_time.as_deref(), Some("09:00"));

        let req: CreateEventRequest = serde_json::from_value(json!({ "title": "x" })).unwrap();
        assert_eq!(req.limit, None);

        let req: UpdateEventRequest = serde_json::from_value(json!({ "limit": -5 })).unwrap();
        assert_eq!(req.limit, Some(0));
        let req: UpdateEventRequest = serde_json::from_value(json!({ "limit": "abc" })).unwrap();
        assert_eq!(req.limit, Some(0));
        let req: UpdateEventRequest = serde_json::from_value(json!({ "limit": null })).unwrap();
        assert_eq!(req.limit, None);
    }

    #[test]
    fn test_user_password_never_serialized() {
        let user = User {
            id: "u1".into(),
            name: "Asha".into(),
            email: None,
            register_number: Some("21CS001".into()),
            role: Role::Student,
            password_hash: Some("$2b$10$hash".into()),
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("password").is_none());
        assert_eq!(value["registerNumber"], "21CS001");
        assert_eq!(value["role"], "STUDENT");
    }
}
