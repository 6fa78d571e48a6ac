//! Day-ahead reminders for registered students.
//!
//! A pass looks at the wall-clock hour starting 24 hours from now, emails every
//! registered student with an address and leaves them an in-app notification.
//! Passes run on an interval inside the server and on demand from the admin
//! endpoint.

use std::time::Duration;

use chrono::{DateTime, FixedOffset, Utc};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::error::AppResult;
use crate::mailer::OutgoingMail;
use crate::notify::send_logged;
use crate::schedule::{display_time, reminder_window};
use crate::state::AppState;
use crate::types::{Event, Notification, ReminderSummary};

pub fn reminder_mail(to: &str, name: &str, event: &Event, offset: &FixedOffset) -> OutgoingMail {
    OutgoingMail {
        to: to.to_string(),
        subject: format!("Reminder: {} is tomorrow!", event.title),
        text: format!(
            "Hi {},\n\nJust a reminder that {} is starting tomorrow at {}.\nVenue: {}\n\nSee you there!",
            name,
            event.title,
            display_time(event.date, offset),
            event.venue
        ),
        html: None,
    }
}

/// Run a single reminder pass as of `now`.
pub async fn run_once(state: &AppState, now: DateTime<Utc>) -> AppResult<ReminderSummary> {
    let offset = state.config.event_offset;
    let (from, to) = reminder_window(now, &offset);
    info!(window_start = %from, window_end = %to, "Running reminder check");

    let events = state.events.find_starting_between(from, to).await?;
    let mut summary = ReminderSummary {
        events_matched: events.len(),
        ..Default::default()
    };

    for event in &events {
        let registrations = state.registrations.list_for_event(&event.id).await?;

        for registration in registrations {
            let Some(user) = state.users.find_by_id(&registration.user_id).await? else {
                warn!(user_id = %registration.user_id, "Registered user no longer exists");
                continue;
            };
            let Some(email) = user.email.as_deref() else {
                continue;
            };

            if !send_logged(state, reminder_mail(email, &user.name, event, &offset)).await {
                summary.failures += 1;
                continue;
            }
            summary.reminders_sent += 1;

            let message = format!(
                "Reminder: {} is tomorrow at {}!",
                event.title,
                display_time(event.date, &offset)
            );
            match state
                .notifications
                .insert(Notification::new(&user.id, message))
                .await
            {
                Ok(()) => state.metrics.increment_notifications().await,
                Err(e) => {
                    error!(user_id = %user.id, "Failed to create reminder notification: {}", e)
                }
            }
        }
    }

    state.metrics.increment_reminder_runs().await;
    info!(
        events = summary.events_matched,
        sent = summary.reminders_sent,
        failures = summary.failures,
        "Reminder check done"
    );
    Ok(summary)
}

/// Spawn the periodic reminder task. A zero interval disables it.
pub fn spawn_loop(state: AppState, every: Duration) -> Option<JoinHandle<()>> {
    if every.is_zero() {
        info!("Reminder loop disabled");
        return None;
    }

    Some(tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            if let Err(e) = run_once(&state, Utc::now()).await {
                error!("Reminder pass failed: {}", e);
            }
        }
    }))
}
