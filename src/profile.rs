//! Signed-in user's profile, read and written through the query cache.

use crate::{
    app::App,
    domain::{SessionUser, User, UserProfile},
    error::Result,
    query::QueryKey,
    storage::StorageKey,
};
use tracing::{info, instrument};

/// Current user, cached under `["currentUser"]`.
/// # Errors
/// Returns `AuthenticationRequired` without a stored token, otherwise the
/// adapter error after retries.
#[instrument(skip_all)]
pub async fn current_user(app: &App) -> Result<User> {
    let token = app.stored_token()?;
    app.cache()
        .fetch(&QueryKey::current_user(), || {
            app.users().get_current_user(&token)
        })
        .await
}

/// Validates and sends a profile update, then seeds the cache with the result.
/// A stored session user picks up the new name.
/// # Errors
/// Returns `AuthenticationRequired`, `Validation`, or the adapter error.
#[instrument(skip_all)]
pub async fn update_profile(app: &App, profile: &UserProfile) -> Result<User> {
    let token = app.stored_token()?;
    profile.validate()?;

    let user = app.users().update_profile(&token, profile).await?;
    app.cache().set_query_data(&QueryKey::current_user(), &user)?;

    if let Some(mut stored) = app.storage().get_item::<SessionUser>(StorageKey::User) {
        if !user.name.is_empty() {
            stored.name = Some(user.name.clone());
            app.storage().set_item(StorageKey::User, &stored)?;
        }
    }

    info!("profile updated");
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tests::{can_bind_localhost, test_config};
    use crate::error::Error;
    use crate::storage::LocalStorage;
    use anyhow::Result;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn signed_in_app(server: &MockServer) -> Result<App> {
        let storage = LocalStorage::memory();
        storage.set_item(StorageKey::AuthToken, "T1")?;
        storage.set_item(StorageKey::User, &SessionUser::named("a"))?;
        Ok(App::with_storage(test_config(&server.uri()), storage)?)
    }

    #[tokio::test]
    async fn current_user_requires_token() -> Result<()> {
        let app = App::with_storage(test_config("http://127.0.0.1:9"), LocalStorage::memory())?;
        let result = current_user(&app).await;
        assert_eq!(result.err(), Some(Error::AuthenticationRequired));
        Ok(())
    }

    #[tokio::test]
    async fn current_user_is_cached() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/profile/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "u-1",
                "name": "Ada",
                "email": "ada@example.com"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let app = signed_in_app(&server)?;
        let first = current_user(&app).await?;
        let second = current_user(&app).await?;
        assert_eq!(first, second);
        assert_eq!(first.name, "Ada");
        Ok(())
    }

    #[tokio::test]
    async fn update_profile_rejects_bad_email_locally() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        let app = signed_in_app(&server)?;

        let profile = UserProfile {
            email: Some("not-an-email".to_string()),
            ..UserProfile::default()
        };
        let result = update_profile(&app, &profile).await;
        assert!(matches!(result, Err(Error::Validation(_))));

        let received = server.received_requests().await.unwrap_or_default();
        assert!(received.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn update_profile_seeds_cache_and_merges_name() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/profile"))
            .and(body_json(json!({"name": "Grace"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "u-1",
                "name": "Grace",
                "email": "ada@example.com"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let app = signed_in_app(&server)?;
        let profile = UserProfile {
            name: Some("Grace".to_string()),
            ..UserProfile::default()
        };
        update_profile(&app, &profile).await?;

        let cached: Option<User> = app.cache().get_query_data(&QueryKey::current_user());
        assert_eq!(cached.map(|user| user.name).as_deref(), Some("Grace"));
        assert_eq!(
            app.storage().get_item::<SessionUser>(StorageKey::User),
            Some(SessionUser::named("Grace"))
        );
        Ok(())
    }
}
