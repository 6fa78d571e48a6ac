use axum::{extract::State, response::Json};

use crate::auth::AuthUser;
use crate::error::AppResult;
use crate::state::AppState;
use crate::types::Notification;

#[utoipa::path(
    get,
    path = "/api/notifications",
    responses(
        (status = 200, description = "Caller's notifications, newest first", body = [Notification]),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
pub async fn list_notifications(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Notification>>> {
    Ok(Json(state.notifications.list_for_user(&user.user_id).await?))
}
