//! Storage seams, one trait per collection.
//!
//! Handlers only talk to these traits; [`crate::memory::MemoryStore`] is the
//! in-process implementation. Nothing here is transactional: callers that need
//! "check then write" semantics perform the reads and writes sequentially.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::AppResult;
use crate::types::{EmailLog, Event, Notification, Registration, User};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>>;
    async fn find_by_register_number(&self, register_number: &str) -> AppResult<Option<User>>;
    /// Insert or replace the document stored under `user.id`.
    async fn save(&self, user: User) -> AppResult<()>;
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    /// All events ordered by start date ascending.
    async fn list(&self) -> AppResult<Vec<Event>>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Event>>;
    /// Insert or replace the document stored under `event.id`.
    async fn save(&self, event: Event) -> AppResult<()>;
    /// Returns false when nothing was stored under `id`.
    async fn delete(&self, id: &str) -> AppResult<bool>;
    /// Events whose start lies in `[from, to]`, ordered by start date.
    async fn find_starting_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<Event>>;
}

#[async_trait]
pub trait RegistrationRepository: Send + Sync {
    async fn insert(&self, registration: Registration) -> AppResult<()>;
    async fn count_for_event(&self, event_id: &str) -> AppResult<usize>;
    async fn find(&self, user_id: &str, event_id: &str) -> AppResult<Option<Registration>>;
    async fn list_for_user(&self, user_id: &str) -> AppResult<Vec<Registration>>;
    async fn list_for_event(&self, event_id: &str) -> AppResult<Vec<Registration>>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn insert(&self, notification: Notification) -> AppResult<()>;
    /// Newest first.
    async fn list_for_user(&self, user_id: &str) -> AppResult<Vec<Notification>>;
}

#[async_trait]
pub trait EmailLogRepository: Send + Sync {
    async fn insert(&self, log: EmailLog) -> AppResult<()>;
    async fn list(&self) -> AppResult<Vec<EmailLog>>;
}
