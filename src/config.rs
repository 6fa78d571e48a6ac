use std::{env, fmt::Display, net::IpAddr, str::FromStr, time::Duration};

use anyhow::{anyhow, Context, Result};
use chrono::{FixedOffset, Offset, Utc};
use tracing::{info, warn};

const DEFAULT_MAIL_FROM: &str = "\"College Events\" <noreply@collegeevents.com>";

/// SMTP transport settings. Absent when `SMTP_HOST` is unset.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: IpAddr,
    pub port: u16,
    pub jwt_secret: String,
    pub frontend_url: String,
    pub firebase_api_key: Option<String>,
    pub smtp: Option<SmtpConfig>,
    pub mail_from: String,
    /// Offset used to interpret `dateOnly` + `fromTime` and calendar-day filters.
    pub event_offset: FixedOffset,
    /// Zero disables the background reminder loop.
    pub reminder_interval: Duration,
    pub bcrypt_cost: u32,
}

impl Config {
    pub fn load() -> Result<Self> {
        let offset_minutes: i32 = try_load("EVENT_TZ_OFFSET_MINUTES", "0")?;
        let event_offset = FixedOffset::east_opt(offset_minutes * 60)
            .ok_or_else(|| anyhow!("EVENT_TZ_OFFSET_MINUTES out of range: {offset_minutes}"))?;

        let smtp = match optional("SMTP_HOST") {
            Some(host) => Some(SmtpConfig {
                host,
                port: try_load("SMTP_PORT", "587")?,
                username: optional("SMTP_USER").unwrap_or_default(),
                password: optional("SMTP_PASS").unwrap_or_default(),
            }),
            None => {
                info!("SMTP_HOST not set, outgoing mail stays in memory");
                None
            }
        };

        let jwt_secret = optional("JWT_SECRET").unwrap_or_else(|| {
            warn!("JWT_SECRET not set, falling back to the development secret");
            "secret".to_string()
        });

        Ok(Self {
            bind_addr: try_load("BIND_ADDR", "127.0.0.1")?,
            port: try_load("BACKEND_PORT", "5000")?,
            jwt_secret,
            frontend_url: try_load("FRONTEND_URL", "http://localhost:3000")?,
            firebase_api_key: optional("FIREBASE_API_KEY"),
            smtp,
            mail_from: optional("MAIL_FROM").unwrap_or_else(|| DEFAULT_MAIL_FROM.to_string()),
            event_offset,
            reminder_interval: Duration::from_secs(try_load("REMINDER_INTERVAL_SECS", "3600")?),
            bcrypt_cost: try_load("BCRYPT_COST", "10")?,
        })
    }
}

impl Default for Config {
    /// Development defaults: local identity, in-memory mail, UTC, no reminder loop.
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::from([127, 0, 0, 1]),
            port: 5000,
            jwt_secret: "secret".to_string(),
            frontend_url: "http://localhost:3000".to_string(),
            firebase_api_key: None,
            smtp: None,
            mail_from: DEFAULT_MAIL_FROM.to_string(),
            event_offset: Utc.fix(),
            reminder_interval: Duration::ZERO,
            bcrypt_cost: 10,
        }
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    let raw = optional(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.parse()
        .map_err(|e| anyhow!("{e}"))
        .with_context(|| format!("Invalid {key} value: {raw}"))
}
