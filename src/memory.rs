use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::error::AppResult;
use crate::repository::{
    EmailLogRepository, EventRepository, NotificationRepository, RegistrationRepository,
    UserRepository,
};
use crate::types::{EmailLog, Event, Notification, Registration, User};

/// In-process document store holding every collection.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, User>>,
    events: RwLock<HashMap<String, Event>>,
    registrations: RwLock<Vec<Registration>>,
    notifications: RwLock<Vec<Notification>>,
    email_logs: RwLock<Vec<EmailLog>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted_by_date(mut events: Vec<Event>) -> Vec<Event> {
    events.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.created_at.cmp(&b.created_at)));
    events
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_register_number(&self, register_number: &str) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.register_number.as_deref() == Some(register_number))
            .cloned())
    }

    async fn save(&self, user: User) -> AppResult<()> {
        self.users.write().await.insert(user.id.clone(), user);
        Ok(())
    }
}

#[async_trait]
impl EventRepository for MemoryStore {
    async fn list(&self) -> AppResult<Vec<Event>> {
        let events = self.events.read().await.values().cloned().collect();
        Ok(sorted_by_date(events))
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Event>> {
        Ok(self.events.read().await.get(id).cloned())
    }

    async fn save(&self, event: Event) -> AppResult<()> {
        self.events.write().await.insert(event.id.clone(), event);
        Ok(())
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        Ok(self.events.write().await.remove(id).is_some())
    }

    async fn find_starting_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<Event>> {
        let events = self
            .events
            .read()
            .await
            .values()
            .filter(|e| e.date >= from && e.date <= to)
            .cloned()
            .collect();
        Ok(sorted_by_date(events))
    }
}

#[async_trait]
impl RegistrationRepository for MemoryStore {
    async fn insert(&self, registration: Registration) -> AppResult<()> {
        self.registrations.write().await.push(registration);
        Ok(())
    }

    async fn count_for_event(&self, event_id: &str) -> AppResult<usize> {
        let registrations = self.registrations.read().await;
        Ok(registrations.iter().filter(|r| r.event_id == event_id).count())
    }

    async fn find(&self, user_id: &str, event_id: &str) -> AppResult<Option<Registration>> {
        let registrations = self.registrations.read().await;
        Ok(registrations
            .iter()
            .find(|r| r.user_id == user_id && r.event_id == event_id)
            .cloned())
    }

    async fn list_for_user(&self, user_id: &str) -> AppResult<Vec<Registration>> {
        let registrations = self.registrations.read().await;
        Ok(registrations
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_for_event(&self, event_id: &str) -> AppResult<Vec<Registration>> {
        let registrations = self.registrations.read().await;
        Ok(registrations
            .iter()
            .filter(|r| r.event_id == event_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl NotificationRepository for MemoryStore {
    async fn insert(&self, notification: Notification) -> AppResult<()> {
        self.notifications.write().await.push(notification);
        Ok(())
    }

    async fn list_for_user(&self, user_id: &str) -> AppResult<Vec<Notification>> {
        let notifications = self.notifications.read().await;
        let mut mine: Vec<Notification> = notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        // Stable sort keeps later inserts first among equal timestamps after the reverse.
        mine.reverse();
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(mine)
    }
}

#[async_trait]
impl EmailLogRepository for MemoryStore {
    async fn insert(&self, log: EmailLog) -> AppResult<()> {
        self.email_logs.write().await.push(log);
        Ok(())
    }

    async fn list(&self) -> AppResult<Vec<EmailLog>> {
        Ok(self.email_logs.read().await.clone())
    }
}
