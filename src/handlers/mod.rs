pub mod admin;
pub mod auth;
pub mod events;
pub mod notifications;
pub mod registrations;

use axum::extract::FromRequest;

use crate::error::AppError;

/// JSON body whose rejections render as [`AppError`] (400 with an `error` field).
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// Treat absent, empty and whitespace-only strings alike.
pub(crate) fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
