use axum::{extract::State, response::Json};
use chrono::Utc;
use tracing::{error, info, warn};

use super::{present, JsonBody};
use crate::auth::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::identity::IdentityError;
use crate::state::AppState;
use crate::types::{new_id, AuthResponse, LoginRequest, RegisterRequest, Role, User, UserSummary};

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid credentials".to_string())
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created", body = AuthResponse),
        (status = 400, description = "Missing or rejected fields")
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> AppResult<Json<AuthResponse>> {
    let (Some(name), Some(password), Some(role)) =
        (present(req.name), present(req.password), present(req.role))
    else {
        return Err(AppError::bad_request("Missing required fields"));
    };
    let role: Role = role
        .parse()
        .map_err(|_| AppError::bad_request("Invalid role"))?;
    let email = present(req.email);

    let user = match role {
        Role::Student => {
            let register_number = present(req.register_number).ok_or_else(|| {
                AppError::bad_request("Register Number is required for Students")
            })?;
            register_student(&state, name, register_number, email, &password).await?
        }
        _ => {
            let email = email.ok_or_else(|| AppError::bad_request("Email is required"))?;
            register_with_identity(&state, name, email, role, &password).await?
        }
    };

    let token = state.jwt.issue(&user.id, user.email.as_deref(), user.role)?;
    info!(user_id = %user.id, role = %user.role, "User registered");

    Ok(Json(AuthResponse {
        message: "User registered successfully".to_string(),
        token,
        user: UserSummary::from(&user),
    }))
}

async fn register_student(
    state: &AppState,
    name: String,
    register_number: String,
    email: Option<String>,
    password: &str,
) -> AppResult<User> {
    if state
        .users
        .find_by_register_number(&register_number)
        .await?
        .is_some()
    {
        return Err(AppError::bad_request("Register Number already registered"));
    }

    let password_hash = hash_password(password, state.config.bcrypt_cost).await?;
    let user = User {
        id: new_id(),
        name,
        email,
        register_number: Some(register_number),
        role: Role::Student,
        password_hash: Some(password_hash),
        created_at: Utc::now(),
    };
    state.users.save(user.clone()).await?;
    Ok(user)
}

async fn register_with_identity(
    state: &AppState,
    name: String,
    email: String,
    role: Role,
    password: &str,
) -> AppResult<User> {
    let uid = state
        .identity
        .create_account(&email, password, &name)
        .await
        .map_err(|e| match e {
            IdentityError::Unavailable(msg) => AppError::internal(msg),
            other => AppError::bad_request(other.to_string()),
        })?;

    let user = User {
        id: uid,
        name,
        email: Some(email),
        register_number: None,
        role,
        password_hash: None,
        created_at: Utc::now(),
    };
    state.users.save(user.clone()).await?;
    Ok(user)
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session token issued", body = AuthResponse),
        (status = 400, description = "Missing fields"),
        (status = 401, description = "Invalid credentials"),
        (status = 404, description = "Account has no user document")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let password = present(req.password);
    let register_number = present(req.register_number);
    let email = present(req.email);

    let Some(password) = password else {
        return Err(AppError::bad_request("Missing fields"));
    };

    let user = match (register_number, email) {
        (Some(register_number), _) => {
            let user = state
                .users
                .find_by_register_number(&register_number)
                .await?
                .ok_or_else(invalid_credentials)?;
            let hash = user
                .password_hash
                .as_deref()
                .ok_or_else(invalid_credentials)?;
            if !verify_password(&password, hash).await? {
                warn!(%register_number, "Student login with wrong password");
                return Err(invalid_credentials());
            }
            user
        }
        (None, Some(email)) => {
            let uid = state
                .identity
                .verify_password(&email, &password)
                .await
                .map_err(|e| match e {
                    IdentityError::Unavailable(msg) => {
                        error!("Identity provider unavailable: {}", msg);
                        AppError::internal(msg)
                    }
                    IdentityError::InvalidCredentials => invalid_credentials(),
                    other => AppError::Unauthorized(other.to_string()),
                })?;
            let mut user = state
                .users
                .find_by_id(&uid)
                .await?
                .ok_or_else(|| AppError::not_found("User data not found"))?;
            if user.email.is_none() {
                user.email = Some(email);
            }
            user
        }
        (None, None) => return Err(AppError::bad_request("Missing fields")),
    };

    if let Some(expected) = present(req.role) {
        if expected != user.role.as_str() {
            warn!(user_id = %user.id, %expected, actual = %user.role, "Login role mismatch");
            return Err(invalid_credentials());
        }
    }

    let token = state.jwt.issue(&user.id, user.email.as_deref(), user.role)?;
    info!(user_id = %user.id, role = %user.role, "Login successful");

    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        token,
        user: UserSummary::from(&user),
    }))
}
