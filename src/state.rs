use std::sync::Arc;

use tracing::info;

use crate::auth::JwtKeys;
use crate::config::Config;
use crate::identity::{FirebaseIdentity, IdentityProvider, LocalIdentity};
use crate::mailer::{MailError, Mailer, MemoryMailer, SmtpMailer};
use crate::memory::MemoryStore;
use crate::observability::AppMetrics;
use crate::repository::{
    EmailLogRepository, EventRepository, NotificationRepository, RegistrationRepository,
    UserRepository,
};

/// Everything a handler needs, cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub jwt: JwtKeys,
    pub users: Arc<dyn UserRepository>,
    pub events: Arc<dyn EventRepository>,
    pub registrations: Arc<dyn RegistrationRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
    pub email_logs: Arc<dyn EmailLogRepository>,
    pub identity: Arc<dyn IdentityProvider>,
    pub mailer: Arc<dyn Mailer>,
    pub metrics: Arc<AppMetrics>,
}

impl AppState {
    /// Wire collaborators from configuration: Firebase identity when an API key
    /// is present, SMTP when a host is present, in-memory otherwise.
    pub fn from_config(config: Config) -> Result<Self, MailError> {
        let identity: Arc<dyn IdentityProvider> = match &config.firebase_api_key {
            Some(key) => {
                info!("Using Firebase identity provider");
                Arc::new(FirebaseIdentity::new(key.clone()))
            }
            None => {
                info!("FIREBASE_API_KEY not set, using local identity provider");
                Arc::new(LocalIdentity::new(config.bcrypt_cost))
            }
        };

        let mailer: Arc<dyn Mailer> = match &config.smtp {
            Some(smtp) => Arc::new(SmtpMailer::new(smtp, &config.mail_from)?),
            None => Arc::new(MemoryMailer::new()),
        };

        Ok(Self::with_collaborators(
            config,
            Arc::new(MemoryStore::new()),
            identity,
            mailer,
        ))
    }

    /// Build state over a single store implementing every repository.
    pub fn with_collaborators<S>(
        config: Config,
        store: Arc<S>,
        identity: Arc<dyn IdentityProvider>,
        mailer: Arc<dyn Mailer>,
    ) -> Self
    where
        S: UserRepository
            + EventRepository
            + RegistrationRepository
            + NotificationRepository
            + EmailLogRepository
            + 'static,
    {
        Self {
            jwt: JwtKeys::new(&config.jwt_secret),
            config: Arc::new(config),
            users: store.clone(),
            events: store.clone(),
            registrations: store.clone(),
            notifications: store.clone(),
            email_logs: store,
            identity,
            mailer,
            metrics: Arc::new(AppMetrics::new()),
        }
    }
}
