//! In-app notifications and confirmation email sent after a registration.
//!
//! None of this can fail the request that triggered it: every error is logged
//! and swallowed.

use chrono::{FixedOffset, Utc};
use tracing::{error, info};

use crate::auth::AuthUser;
use crate::mailer::OutgoingMail;
use crate::schedule::display_datetime;
use crate::state::AppState;
use crate::types::{new_id, EmailLog, EmailStatus, Event, Notification};

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn confirmation_mail(to: &str, event: &Event, offset: &FixedOffset) -> OutgoingMail {
    let when = display_datetime(event.date, offset);
    OutgoingMail {
        to: to.to_string(),
        subject: format!("Registration Confirmed: {}", event.title),
        text: format!(
            "Hello,\n\nYou have successfully registered for {}.\n\nDate: {}\nVenue: {}\n\nSee you there!",
            event.title, when, event.venue
        ),
        html: Some(format!(
            "<p>Hello,</p><p>You have successfully registered for <strong>{}</strong>.</p>\
             <p><strong>Date:</strong> {}<br><strong>Venue:</strong> {}</p><p>See you there!</p>",
            escape_html(&event.title),
            when,
            escape_html(&event.venue)
        )),
    }
}

/// Send `mail` and record the outcome in `email_logs`. Returns whether it was delivered.
pub async fn send_logged(state: &AppState, mail: OutgoingMail) -> bool {
    let to = mail.to.clone();
    let subject = mail.subject.clone();

    let (delivered, log) = match state.mailer.send(mail).await {
        Ok(message_id) => {
            info!(%to, %message_id, "Email sent");
            state.metrics.increment_emails_sent().await;
            (
                true,
                EmailLog {
                    id: new_id(),
                    to,
                    subject,
                    status: EmailStatus::Sent,
                    message_id: Some(message_id),
                    error: None,
                    created_at: Utc::now(),
                },
            )
        }
        Err(e) => {
            error!(%to, "Email sending failed: {}", e);
            state.metrics.increment_emails_failed().await;
            (
                false,
                EmailLog {
                    id: new_id(),
                    to,
                    subject,
                    status: EmailStatus::Failed,
                    message_id: None,
                    error: Some(e.to_string()),
                    created_at: Utc::now(),
                },
            )
        }
    };

    if let Err(e) = state.email_logs.insert(log).await {
        error!("Failed to write email log: {}", e);
    }
    delivered
}

async fn push(state: &AppState, notification: Notification) {
    let user_id = notification.user_id.clone();
    match state.notifications.insert(notification).await {
        Ok(()) => state.metrics.increment_notifications().await,
        Err(e) => error!(%user_id, "Failed to create notification: {}", e),
    }
}

/// Notify the student and the organizer, then email the student a confirmation.
pub async fn registration_created(state: &AppState, student: &AuthUser, event: &Event) {
    push(
        state,
        Notification::new(
            &student.user_id,
            format!(
                "You have successfully registered for the event: {}",
                event.title
            ),
        ),
    )
    .await;

    if !event.organizer_id.is_empty() {
        let who = student.email.as_deref().unwrap_or(&student.user_id);
        push(
            state,
            Notification::new(
                &event.organizer_id,
                format!("New registration for {}: {}", event.title, who),
            ),
        )
        .await;
    }

    match &student.email {
        Some(email) => {
            let mail = confirmation_mail(email, event, &state.config.event_offset);
            send_logged(state, mail).await;
        }
        None => info!(user_id = %student.user_id, "No email on account, skipping confirmation"),
    }
}
