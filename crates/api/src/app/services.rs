//! Long-lived collaborators shared by every request.

use std::sync::Arc;

use careops_auth::{PasswordHasher, TokenService, User};
use careops_core::Record;
use careops_infra::{
    ConfigError, IdentityResolver, InMemoryStore, Persistence, PostgresStore, Settings, Store,
};

#[derive(Debug, Clone)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
}

/// Store handles and credential services, built once at start-up.
///
/// `store` uses restricted credentials; `admin_store` the elevated ones
/// (account creation and staff management).
#[derive(Clone)]
pub struct AppServices {
    pub store: Arc<dyn Store>,
    pub admin_store: Arc<dyn Store>,
    pub tokens: Arc<TokenService>,
    pub hasher: PasswordHasher,
    pub resolver: IdentityResolver,
    pub allowed_origins: Arc<Vec<String>>,
    pub info: ServiceInfo,
}

impl AppServices {
    pub fn new(
        settings: &Settings,
        store: Arc<dyn Store>,
        admin_store: Arc<dyn Store>,
    ) -> Result<Self, ConfigError> {
        let tokens = Arc::new(settings.token_service()?);
        let hasher = settings.password_hasher()?;
        let resolver = IdentityResolver::new(tokens.clone(), store.clone());

        Ok(Self {
            store,
            admin_store,
            tokens,
            hasher,
            resolver,
            allowed_origins: Arc::new(settings.allowed_origins.clone()),
            info: ServiceInfo {
                name: settings.app_name.clone(),
                version: settings.app_version.clone(),
            },
        })
    }

    /// Both handles share one in-memory store.
    pub fn in_memory(settings: &Settings) -> Result<Self, ConfigError> {
        let store: Arc<dyn Store> =
            Arc::new(InMemoryStore::new().with_unique(User::TABLE, "email"));
        Self::new(settings, store.clone(), store)
    }

    pub async fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        match &settings.persistence {
            Persistence::InMemory => {
                tracing::info!("using in-memory stores");
                Ok(Self::in_memory(settings)?)
            }
            Persistence::Postgres { database_url, admin_url } => {
                let admin = PostgresStore::connect(admin_url).await?;
                admin.apply_schema().await?;
                let store = PostgresStore::connect(database_url).await?;
                tracing::info!("using postgres stores");
                Ok(Self::new(settings, Arc::new(store), Arc::new(admin))?)
            }
        }
    }
}
