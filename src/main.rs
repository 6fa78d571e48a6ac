use std::net::SocketAddr;

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use campus_events::config::Config;
use campus_events::observability::init_tracing;
use campus_events::openapi::ApiDoc;
use campus_events::reminder;
use campus_events::routes::create_router;
use campus_events::state::AppState;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::load()?;
    let addr = SocketAddr::new(config.bind_addr, config.port);
    let reminder_interval = config.reminder_interval;

    let cors = match config.frontend_url.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([
                axum::http::header::AUTHORIZATION,
                axum::http::header::CONTENT_TYPE,
            ]),
        Err(_) => {
            error!("FRONTEND_URL is not a valid origin, allowing any origin");
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers(Any)
        }
    };

    let state = AppState::from_config(config).context("Failed to configure mail transport")?;
    let _reminders = reminder::spawn_loop(state.clone(), reminder_interval);

    let app = create_router(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Backend server running on http://{}", addr);
    info!("Swagger UI: http://{}/swagger-ui/", addr);

    axum::serve(listener, app)
        .await
        .context("Unexpected error happened in server")
        .inspect_err(|e| error!(error.cause_chain = ?e, error.message = %e, "Unexpected error"))
}
