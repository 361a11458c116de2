//! Application context. Everything a command needs is owned here and handed out
//! by reference; there is no global state.

use crate::{
    api::{ApiClient, AuthAdapter, UserAdapter},
    config::AppConfig,
    error::{Error, Result},
    query::QueryCache,
    session::SessionManager,
    storage::{FileStore, LocalStorage, StorageKey},
};
use secrecy::SecretString;
use tracing::debug;

#[derive(Debug)]
pub struct App {
    config: AppConfig,
    users: UserAdapter,
    storage: LocalStorage,
    cache: QueryCache,
    session: SessionManager,
}

impl App {
    /// Builds the context over the on-disk store at `config.store_path`.
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: AppConfig) -> Result<Self> {
        let storage = LocalStorage::new(FileStore::new(config.store_path.clone()));
        Self::with_storage(config, storage)
    }

    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_storage(config: AppConfig, storage: LocalStorage) -> Result<Self> {
        let client = ApiClient::new(&config)?;
        let auth = AuthAdapter::new(client.clone(), config.logout_path.clone());
        let users = UserAdapter::new(client);
        let cache = QueryCache::new(config.query_retry, config.retry_delay);
        let session = SessionManager::restore(auth, storage.clone(), cache.clone());

        debug!(
            base_url = %config.api_base_url,
            mode = config.mode.as_str(),
            authenticated = session.is_authenticated(),
            "application context ready"
        );

        Ok(Self {
            config,
            users,
            storage,
            cache,
            session,
        })
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[must_use]
    pub fn users(&self) -> &UserAdapter {
        &self.users
    }

    #[must_use]
    pub fn storage(&self) -> &LocalStorage {
        &self.storage
    }

    #[must_use]
    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    #[must_use]
    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Persisted bearer token for authenticated queries.
    /// # Errors
    /// Returns `AuthenticationRequired` when no token is stored.
    pub fn stored_token(&self) -> Result<SecretString> {
        self.storage
            .get_item::<String>(StorageKey::AuthToken)
            .map(SecretString::from)
            .ok_or(Error::AuthenticationRequired)
    }
}
