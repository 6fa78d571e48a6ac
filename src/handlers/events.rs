use std::collections::{HashMap, HashSet};

use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use chrono::Utc;
use futures_util::future::try_join_all;
use tracing::{info, warn};

use super::{present, JsonBody};
use crate::auth::AuthUser;
use crate::error::{AppError, AppResult};
use crate::notify;
use crate::schedule::{
    day_bounds, event_start, local_parts, parse_day, parse_instant, registration_closed,
    REGISTRATION_CUTOFF_HOURS,
};
use crate::state::AppState;
use crate::types::{
    new_id, Attendee, AttendeeUser, CreateEventRequest, Event, EventWithOrganizer, EventsQuery,
    MessageResponse, OrganizerSummary, RegisterForEventResponse, Registration, Role,
    UpdateEventRequest, User,
};

const MANAGERS: &[Role] = &[Role::Organizer, Role::Admin];
const ATTENDEE_VIEWERS: &[Role] = &[Role::Organizer, Role::Admin, Role::Staff];

/// Load users by id, skipping ids with no document.
async fn load_users(state: &AppState, ids: HashSet<&str>) -> AppResult<HashMap<String, User>> {
    let users = try_join_all(ids.into_iter().map(|id| state.users.find_by_id(id))).await?;
    Ok(users
        .into_iter()
        .flatten()
        .map(|user| (user.id.clone(), user))
        .collect())
}

async fn find_event(state: &AppState, id: &str, missing: &str) -> AppResult<Event> {
    state
        .events
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(missing))
}

/// Admins manage everything; organizers only what they created.
fn ensure_owner(user: &AuthUser, event: &Event) -> AppResult<()> {
    if user.is(Role::Admin) || event.organizer_id == user.user_id {
        Ok(())
    } else {
        Err(AppError::forbidden("Unauthorized"))
    }
}

#[utoipa::path(
    get,
    path = "/api/events",
    params(EventsQuery),
    responses(
        (status = 200, description = "Events ordered by start", body = [EventWithOrganizer]),
        (status = 400, description = "Invalid date filter")
    ),
    tag = "Events"
)]
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> AppResult<Json<Vec<EventWithOrganizer>>> {
    let mut events = state.events.list().await?;

    if let Some(date) = present(query.date) {
        let (start, end) = parse_day(&date)
            .and_then(|day| day_bounds(day, &state.config.event_offset))
            .ok_or_else(|| AppError::bad_request("Invalid date"))?;
        events.retain(|e| e.date >= start && e.date <= end);
    }

    let organizer_ids = events.iter().map(|e| e.organizer_id.as_str()).collect();
    let organizers = load_users(&state, organizer_ids).await?;

    let enriched = events
        .into_iter()
        .map(|event| {
            let organizer = organizers.get(&event.organizer_id).map(|u| OrganizerSummary {
                name: u.name.clone(),
                email: u.email.clone(),
            });
            EventWithOrganizer { event, organizer }
        })
        .collect();

    Ok(Json(enriched))
}

#[utoipa::path(
    post,
    path = "/api/events",
    request_body = CreateEventRequest,
    responses(
        (status = 200, description = "Created event", body = Event),
        (status = 400, description = "Missing or invalid fields"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not an organizer or admin")
    ),
    security(("bearer_auth" = [])),
    tag = "Events"
)]
pub async fn create_event(
    user: AuthUser,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateEventRequest>,
) -> AppResult<Json<Event>> {
    user.require_any(MANAGERS, "Unauthorized")?;

    let (Some(title), Some(date), Some(from_time), Some(to_time), Some(venue)) = (
        present(req.title),
        present(req.date),
        present(req.from_time),
        present(req.to_time),
        present(req.venue),
    ) else {
        return Err(AppError::bad_request("Missing required fields"));
    };

    let start = event_start(&date, &from_time, &state.config.event_offset)
        .ok_or_else(|| AppError::bad_request("Invalid date or time"))?;

    let event = Event {
        id: new_id(),
        title,
        description: req.description.unwrap_or_default(),
        date: start,
        date_only: date.trim().to_string(),
        from_time: from_time.trim().to_string(),
        to_time: to_time.trim().to_string(),
        venue,
        room: req.room.unwrap_or_default(),
        manual_venue: req.manual_venue.unwrap_or(false),
        category: present(req.category).unwrap_or_else(|| "General".to_string()),
        poster_url: req.poster_url.unwrap_or_default(),
        poster_type: present(req.poster_type).unwrap_or_else(|| "image/jpeg".to_string()),
        registration_link: req.registration_link.unwrap_or_default(),
        limit: req.limit.unwrap_or(0),
        organizer_id: user.user_id.clone(),
        created_at: Utc::now(),
        updated_at: None,
    };

    state.events.save(event.clone()).await?;
    state.metrics.increment_events().await;
    info!(event_id = %event.id, organizer_id = %event.organizer_id, "Event created");

    Ok(Json(event))
}

#[utoipa::path(
    get,
    path = "/api/events/{id}",
    params(("id" = String, Path, description = "Event id")),
    responses(
        (status = 200, description = "Event", body = Event),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Event not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Events"
)]
pub async fn get_event(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Event>> {
    Ok(Json(find_event(&state, &id, "Event not found").await?))
}

#[utoipa::path(
    put,
    path = "/api/events/{id}",
    params(("id" = String, Path, description = "Event id")),
    request_body = UpdateEventRequest,
    responses(
        (status = 200, description = "Updated event", body = Event),
        (status = 400, description = "Invalid date"),
        (status = 403, description = "Not allowed to manage this event"),
        (status = 404, description = "Event not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Events"
)]
pub async fn update_event(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<UpdateEventRequest>,
) -> AppResult<Json<Event>> {
    user.require_any(MANAGERS, "Unauthorized")?;
    let mut event = find_event(&state, &id, "Not found").await?;
    ensure_owner(&user, &event)?;

    if let Some(title) = present(req.title) {
        event.title = title;
    }
    if let Some(description) = req.description {
        event.description = description;
    }
    if let Some(venue) = present(req.venue) {
        event.venue = venue;
    }
    if let Some(date) = present(req.date) {
        let offset = state.config.event_offset;
        let start =
            parse_instant(&date, &offset).ok_or_else(|| AppError::bad_request("Invalid date"))?;
        let (date_only, from_time) = local_parts(start, &offset);
        event.date = start;
        event.date_only = date_only;
        event.from_time = from_time;
    }
    if let Some(limit) = req.limit {
        event.limit = limit;
    }
    event.updated_at = Some(Utc::now());

    state.events.save(event.clone()).await?;
    info!(event_id = %event.id, by = %user.user_id, "Event updated");

    Ok(Json(event))
}

#[utoipa::path(
    delete,
    path = "/api/events/{id}",
    params(("id" = String, Path, description = "Event id")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 403, description = "Not allowed to manage this event"),
        (status = 404, description = "Event not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Events"
)]
pub async fn delete_event(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    user.require_any(MANAGERS, "Unauthorized")?;
    let event = find_event(&state, &id, "Not found").await?;
    ensure_owner(&user, &event)?;

    state.events.delete(&id).await?;
    info!(event_id = %id, by = %user.user_id, "Event deleted");

    Ok(Json(MessageResponse::new("Deleted successfully")))
}

#[utoipa::path(
    post,
    path = "/api/events/{id}/register",
    params(("id" = String, Path, description = "Event id")),
    responses(
        (status = 200, description = "Registered", body = RegisterForEventResponse),
        (status = 400, description = "Closed, full or already registered"),
        (status = 403, description = "Caller is not a student"),
        (status = 404, description = "Event not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Events"
)]
pub async fn register_for_event(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<RegisterForEventResponse>> {
    user.require_any(&[Role::Student], "Unauthorized. Only students can register.")?;

    let event = find_event(&state, &id, "Event not found").await?;

    if registration_closed(event.date, Utc::now()) {
        return Err(AppError::bad_request(format!(
            "Registration closed. Registration must be completed at least {} hours before the event starts.",
            REGISTRATION_CUTOFF_HOURS
        )));
    }

    if event.limit > 0 {
        let taken = state.registrations.count_for_event(&id).await?;
        if taken >= event.limit as usize {
            warn!(event_id = %id, limit = event.limit, "Registration rejected, event full");
            return Err(AppError::bad_request("Event is full"));
        }
    }

    if state
        .registrations
        .find(&user.user_id, &id)
        .await?
        .is_some()
    {
        return Err(AppError::bad_request("Already registered"));
    }

    let registration = Registration {
        id: new_id(),
        user_id: user.user_id.clone(),
        event_id: id.clone(),
        created_at: Utc::now(),
    };
    state.registrations.insert(registration.clone()).await?;
    state.metrics.increment_registrations().await;
    info!(event_id = %id, user_id = %user.user_id, "Student registered");

    notify::registration_created(&state, &user, &event).await;

    Ok(Json(RegisterForEventResponse {
        message: "Registered successfully".to_string(),
        registration,
    }))
}

#[utoipa::path(
    get,
    path = "/api/events/{id}/attendees",
    params(("id" = String, Path, description = "Event id")),
    responses(
        (status = 200, description = "Registrations with attendee details", body = [Attendee]),
        (status = 403, description = "Not allowed to view attendees"),
        (status = 404, description = "Event not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Events"
)]
pub async fn list_attendees(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<Attendee>>> {
    user.require_any(ATTENDEE_VIEWERS, "Unauthorized")?;
    let event = find_event(&state, &id, "Not found").await?;
    if user.is(Role::Organizer) {
        ensure_owner(&user, &event)?;
    }

    let registrations = state.registrations.list_for_event(&id).await?;
    let user_ids = registrations.iter().map(|r| r.user_id.as_str()).collect();
    let users = load_users(&state, user_ids).await?;

    let attendees = registrations
        .into_iter()
        .map(|registration| {
            let user = users.get(&registration.user_id).map(|u| AttendeeUser {
                id: u.id.clone(),
                name: u.name.clone(),
                email: u.email.clone().unwrap_or_else(|| "N/A".to_string()),
                register_number: u
                    .register_number
                    .clone()
                    .unwrap_or_else(|| "N/A".to_string()),
            });
            Attendee {
                registered_at: registration.created_at,
                registration,
                user,
            }
        })
        .collect();

    Ok(Json(attendees))
}
