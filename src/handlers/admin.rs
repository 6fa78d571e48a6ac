use axum::{extract::State, response::Json};
use chrono::Utc;
use tracing::info;

use crate::auth::AuthUser;
use crate::error::AppResult;
use crate::reminder;
use crate::state::AppState;
use crate::types::{ReminderSummary, Role};

/// Run the reminder pass now, e.g. from an external cron.
#[utoipa::path(
    post,
    path = "/api/admin/reminders/run",
    responses(
        (status = 200, description = "Pass summary", body = ReminderSummary),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not an admin")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn run_reminders(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<ReminderSummary>> {
    user.require_any(&[Role::Admin], "Unauthorized")?;
    info!(by = %user.user_id, "Manual reminder pass requested");
    Ok(Json(reminder::run_once(&state, Utc::now()).await?))
}
