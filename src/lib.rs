pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod mailer;
pub mod memory;
pub mod notify;
pub mod observability;
pub mod openapi;
pub mod reminder;
pub mod repository;
pub mod routes;
pub mod schedule;
pub mod state;
pub mod types;
