use std::collections::HashSet;

use axum::{extract::State, response::Json};
use futures_util::future::try_join_all;
use tracing::debug;

use crate::auth::AuthUser;
use crate::error::AppResult;
use crate::state::AppState;
use crate::types::RegistrationWithEvent;

#[utoipa::path(
    get,
    path = "/api/registrations",
    responses(
        (status = 200, description = "Caller's registrations, newest first", body = [RegistrationWithEvent]),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "Registrations"
)]
pub async fn list_registrations(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<RegistrationWithEvent>>> {
    let mut registrations = state.registrations.list_for_user(&user.user_id).await?;
    debug!(user_id = %user.user_id, count = registrations.len(), "Fetched registrations");
    registrations.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let event_ids: HashSet<&str> = registrations.iter().map(|r| r.event_id.as_str()).collect();
    let events = try_join_all(event_ids.into_iter().map(|id| state.events.find_by_id(id))).await?;

    // Registrations pointing at deleted events are dropped.
    let enriched = registrations
        .into_iter()
        .filter_map(|registration| {
            let event = events
                .iter()
                .flatten()
                .find(|e| e.id == registration.event_id)?
                .clone();
            Some(RegistrationWithEvent {
                registration,
                event,
            })
        })
        .collect();

    Ok(Json(enriched))
}
