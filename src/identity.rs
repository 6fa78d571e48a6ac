//! Externally managed credentials for staff, organizer and admin accounts.
//!
//! Students authenticate against a bcrypt hash kept on their user document;
//! everyone else goes through an [`IdentityProvider`]. Production uses the
//! Firebase Identity Toolkit REST API, development and tests use
//! [`LocalIdentity`].

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::auth::{hash_password, verify_password};
use crate::types::new_id;

const MIN_PASSWORD_LEN: usize = 6;
const IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("Email already registered")]
    EmailExists,

    #[error("Password should be at least 6 characters")]
    WeakPassword,

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Provider-specific refusal passed through to the caller
    #[error("{0}")]
    Rejected(String),

    #[error("Identity provider unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an account and return its uid.
    async fn create_account(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<String, IdentityError>;

    /// Check an email/password pair and return the account uid.
    async fn verify_password(&self, email: &str, password: &str) -> Result<String, IdentityError>;
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    }
}

struct LocalAccount {
    uid: String,
    password_hash: String,
}

/// In-process identity provider with bcrypt-hashed passwords.
pub struct LocalIdentity {
    accounts: RwLock<HashMap<String, LocalAccount>>,
    bcrypt_cost: u32,
}

impl LocalIdentity {
    pub fn new(bcrypt_cost: u32) -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            bcrypt_cost,
        }
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentity {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<String, IdentityError> {
        let email = email.trim().to_lowercase();
        if !looks_like_email(&email) {
            return Err(IdentityError::InvalidEmail);
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(IdentityError::WeakPassword);
        }
        if self.accounts.read().await.contains_key(&email) {
            return Err(IdentityError::EmailExists);
        }

        let password_hash = hash_password(password, self.bcrypt_cost)
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&email) {
            return Err(IdentityError::EmailExists);
        }
        let uid = new_id();
        debug!(uid = %uid, name = %display_name, "Created local identity account");
        accounts.insert(
            email,
            LocalAccount {
                uid: uid.clone(),
                password_hash,
            },
        );
        Ok(uid)
    }

    async fn verify_password(&self, email: &str, password: &str) -> Result<String, IdentityError> {
        let email = email.trim().to_lowercase();
        let (uid, hash) = {
            let accounts = self.accounts.read().await;
            let account = accounts
                .get(&email)
                .ok_or(IdentityError::InvalidCredentials)?;
            (account.uid.clone(), account.password_hash.clone())
        };

        let valid = verify_password(password, &hash)
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;
        if valid {
            Ok(uid)
        } else {
            Err(IdentityError::InvalidCredentials)
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Identity Toolkit REST client (`accounts:signUp`, `accounts:signInWithPassword`).
pub struct FirebaseIdentity {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl FirebaseIdentity {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: IDENTITY_TOOLKIT_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn call(&self, method: &str, body: serde_json::Value) -> Result<String, IdentityError> {
        let url = format!("{}/accounts:{}?key={}", self.base_url, method, self.api_key);
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        if response.status().is_success() {
            let account: AccountResponse = response
                .json()
                .await
                .map_err(|e| IdentityError::Unavailable(e.to_string()))?;
            return Ok(account.local_id);
        }

        let status = response.status();
        let message = match response.json::<ErrorEnvelope>().await {
            Ok(envelope) => envelope.error.message,
            Err(_) => format!("identity provider returned {status}"),
        };
        warn!(method, %status, %message, "Identity provider rejected request");
        Err(map_provider_error(&message))
    }
}

/// Translate Identity Toolkit error codes such as `EMAIL_EXISTS` or
/// `WEAK_PASSWORD : Password should be at least 6 characters`.
pub fn map_provider_error(message: &str) -> IdentityError {
    let code = message.split(':').next().unwrap_or_default().trim();
    match code {
        "EMAIL_EXISTS" => IdentityError::EmailExists,
        "WEAK_PASSWORD" => IdentityError::WeakPassword,
        "INVALID_EMAIL" | "MISSING_EMAIL" => IdentityError::InvalidEmail,
        "INVALID_LOGIN_CREDENTIALS" | "INVALID_PASSWORD" | "EMAIL_NOT_FOUND" => {
            IdentityError::InvalidCredentials
        }
        _ => IdentityError::Rejected(message.to_string()),
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentity {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<String, IdentityError> {
        self.call(
            "signUp",
            json!({
                "email": email,
                "password": password,
                "displayName": display_name,
                "returnSecureToken": true,
            }),
        )
        .await
    }

    async fn verify_password(&self, email: &str, password: &str) -> Result<String, IdentityError> {
        self.call(
            "signInWithPassword",
            json!({
                "email": email,
                "password": password,
                "returnSecureToken": true,
            }),
        )
        .await
    }
}
