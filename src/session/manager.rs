use super::state::{Operation, SessionState};
use crate::{
    api::AuthAdapter,
    domain::{AuthToken, Credentials, Session, SessionUser},
    error::{Error, Result},
    query::QueryCache,
    storage::{LocalStorage, StorageKey},
};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

/// Owns the authentication state and coordinates the token adapter,
/// persistence and the query cache.
///
/// Operations take `&self`; overlapping calls are not serialized and the last
/// write wins. Observers get every transition through [`Self::subscribe`].
#[derive(Debug)]
pub struct SessionManager {
    auth: AuthAdapter,
    storage: LocalStorage,
    cache: QueryCache,
    state: watch::Sender<SessionState>,
}

impl SessionManager {
    /// Builds the manager from persisted state: authenticated when both a token
    /// and a user record are stored, anonymous otherwise.
    #[must_use]
    pub fn restore(auth: AuthAdapter, storage: LocalStorage, cache: QueryCache) -> Self {
        let token = storage.get_item::<String>(StorageKey::AuthToken);
        let user = storage.get_item::<SessionUser>(StorageKey::User);

        let session = match (token, user) {
            (Some(token), Some(user)) => {
                debug!("restored persisted session");
                Session::authenticated(user, SecretString::from(token))
            }
            _ => Session::default(),
        };

        let (state, _) = watch::channel(SessionState {
            session,
            ..SessionState::default()
        });

        Self {
            auth,
            storage,
            cache,
            state,
        }
    }

    /// Receiver that sees every state transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn session(&self) -> Session {
        self.state.borrow().session.clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// Bearer token for explicit per-request injection.
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.state.borrow().session.token.clone()
    }

    fn begin(&self, operation: Operation) {
        self.state.send_modify(|state| {
            state.in_flight = Some(operation);
            state.error = None;
        });
    }

    fn fail(&self, previous: Session, err: &Error) {
        self.state.send_modify(|state| {
            state.session = previous;
            state.in_flight = None;
            state.error = Some(err.clone());
        });
    }

    /// Signs in with the password grant. On success the token and a minimal
    /// user record are persisted and every cached query is invalidated.
    /// # Errors
    /// Returns the adapter or storage error; the previous session is kept and
    /// the error is recorded in the published state.
    #[instrument(skip_all, fields(username = %credentials.username))]
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthToken> {
        let previous = self.session();
        self.begin(Operation::Login);

        match self.try_login(credentials).await {
            Ok((token, session)) => {
                self.state.send_modify(|state| {
                    state.session = session;
                    state.in_flight = None;
                });
                self.cache.invalidate_all();
                info!("login succeeded");
                Ok(token)
            }
            Err(err) => {
                error!("login failed: {err}");
                self.fail(previous, &err);
                Err(err)
            }
        }
    }

    async fn try_login(&self, credentials: &Credentials) -> Result<(AuthToken, Session)> {
        let token = self.auth.login(credentials).await?;
        let user = SessionUser::named(credentials.username.clone());

        let user_value = serde_json::to_value(&user)
            .map_err(|err| Error::Serialization(format!("Failed to encode user: {err}")))?;
        // A refresh token left over from an earlier session must not outlive it.
        self.write_session(&[
            (StorageKey::AuthToken, Some(secret_value(&token.access_token))),
            (StorageKey::RefreshToken, token.refresh_token.as_ref().map(secret_value)),
            (StorageKey::User, Some(user_value)),
        ])?;

        let session = Session::authenticated(user, token.access_token.clone());
        Ok((token, session))
    }

    /// Applies `writes` in order (`None` removes the key). When one fails, the
    /// keys are put back to what they held before and the error is returned.
    fn write_session(&self, writes: &[(StorageKey, Option<Value>)]) -> Result<()> {
        let before: Vec<_> = writes
            .iter()
            .map(|(key, _)| (*key, self.storage.get_value(*key)))
            .collect();

        let result = writes
            .iter()
            .try_for_each(|(key, value)| self.put(*key, value.as_ref()));

        if let Err(err) = &result {
            warn!("session write failed, restoring previous keys: {err}");
            for (key, value) in &before {
                if let Err(err) = self.put(*key, value.as_ref()) {
                    error!("could not restore {key}: {err}");
                }
            }
        }
        result
    }

    fn put(&self, key: StorageKey, value: Option<&Value>) -> Result<()> {
        match value {
            Some(value) => self.storage.set_item(key, value),
            None => self.storage.remove_item(key),
        }
    }

    /// Signs out. The remote call is attempted first; local cleanup (persisted
    /// keys, session, query cache) runs whatever its outcome.
    /// # Errors
    /// Returns the remote logout error, or a storage error, after cleanup.
    #[instrument(skip_all)]
    pub async fn logout(&self) -> Result<()> {
        let token = self.token();
        self.begin(Operation::Logout);

        let remote = self.auth.logout(token.as_ref()).await;
        if let Err(err) = &remote {
            warn!("remote logout failed, clearing local session anyway: {err}");
        }

        let local = self.clear_persisted();
        self.cache.clear();

        let outcome = remote.and(local);
        self.state.send_modify(|state| {
            state.session = Session::default();
            state.in_flight = None;
            state.error = outcome.as_ref().err().cloned();
        });

        info!("logged out");
        outcome
    }

    fn clear_persisted(&self) -> Result<()> {
        [
            StorageKey::AuthToken,
            StorageKey::RefreshToken,
            StorageKey::User,
        ]
        .into_iter()
        .map(|key| self.storage.remove_item(key))
        .fold(Ok(()), Result::and)
    }

    /// Exchanges the persisted refresh token for a new access token, keeping
    /// the current user.
    /// # Errors
    /// Returns `AuthenticationRequired` when no refresh token is stored, or the
    /// adapter/storage error.
    #[instrument(skip_all)]
    pub async fn refresh(&self) -> Result<AuthToken> {
        let refresh_token = self
            .storage
            .get_item::<String>(StorageKey::RefreshToken)
            .map(SecretString::from)
            .ok_or(Error::AuthenticationRequired)?;

        let previous = self.session();
        self.begin(Operation::Refresh);

        let result = async {
            let token = self.auth.refresh_token(&refresh_token).await?;
            let mut writes = vec![(StorageKey::AuthToken, Some(secret_value(&token.access_token)))];
            // Without a rotated refresh token the stored one stays valid.
            if let Some(refresh) = &token.refresh_token {
                writes.push((StorageKey::RefreshToken, Some(secret_value(refresh))));
            }
            self.write_session(&writes)?;
            Ok(token)
        }
        .await;

        match result {
            Ok(token) => {
                let user = previous
                    .user
                    .clone()
                    .or_else(|| self.storage.get_item(StorageKey::User))
                    .unwrap_or_default();
                let session = Session::authenticated(user, token.access_token.clone());

                self.state.send_modify(|state| {
                    state.session = session;
                    state.in_flight = None;
                });
                self.cache.invalidate_all();
                info!("token refreshed");
                Ok(token)
            }
            Err(err) => {
                error!("token refresh failed: {err}");
                self.fail(previous, &err);
                Err(err)
            }
        }
    }
}

fn secret_value(secret: &SecretString) -> Value {
    Value::String(secret.expose_secret().to_string())
}
