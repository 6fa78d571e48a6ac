use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::handlers;
use crate::observability::{self, HealthStatus, MetricsResponse};
use crate::types::{
    Attendee, AttendeeUser, AuthResponse, CreateEventRequest, EmailStatus, Event,
    EventWithOrganizer, LoginRequest, MessageResponse, Notification, OrganizerSummary,
    RegisterForEventResponse, RegisterRequest, Registration, RegistrationWithEvent,
    ReminderSummary, Role, UpdateEventRequest, UserSummary,
};

/// Registers the `bearer_auth` JWT scheme referenced by protected paths.
pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::events::list_events,
        handlers::events::create_event,
        handlers::events::get_event,
        handlers::events::update_event,
        handlers::events::delete_event,
        handlers::events::register_for_event,
        handlers::events::list_attendees,
        handlers::registrations::list_registrations,
        handlers::notifications::list_notifications,
        handlers::admin::run_reminders,
        observability::health_handler,
        observability::metrics_handler,
    ),
    components(schemas(
        Role,
        UserSummary,
        RegisterRequest,
        LoginRequest,
        AuthResponse,
        Event,
        EventWithOrganizer,
        OrganizerSummary,
        CreateEventRequest,
        UpdateEventRequest,
        Registration,
        RegisterForEventResponse,
        RegistrationWithEvent,
        Attendee,
        AttendeeUser,
        Notification,
        EmailStatus,
        MessageResponse,
        ReminderSummary,
        HealthStatus,
        MetricsResponse
    )),
    tags(
        (name = "Auth", description = "Account registration and login"),
        (name = "Events", description = "Event management and student registration"),
        (name = "Registrations", description = "The caller's registrations"),
        (name = "Notifications", description = "In-app notifications"),
        (name = "Admin", description = "Operational triggers"),
        (name = "Health", description = "Liveness and counters")
    ),
    info(
        title = "Campus Events API",
        description = "College event management: events, registrations and notifications",
        version = "1.0.0"
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for expected in [
            "/api/auth/login",
            "/api/auth/register",
            "/api/events",
            "/api/events/{id}",
            "/api/events/{id}/register",
            "/api/events/{id}/attendees",
            "/api/registrations",
            "/api/notifications",
            "/api/admin/reminders/run",
            "/api/health",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing {expected}"
            );
        }

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
