//! Profile and directory endpoints. Responses come from several backends with
//! slightly different shapes, so every field is optional on the wire and
//! normalized into [`User`].

use super::ApiClient;
use crate::{
    domain::{User, UserProfile},
    error::{Error, Result},
};
use reqwest::Method;
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

pub const PROFILE_ME_PATH: &str = "/profile/me";
pub const PROFILE_PATH: &str = "/profile";
pub const USERS_PATH: &str = "/users";

const DEFAULT_ROLE: &str = "user";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiUser {
    id: Option<Value>,
    name: Option<String>,
    email: Option<String>,
    role: Option<String>,
    avatar: Option<String>,
    #[serde(alias = "createdAt")]
    created_at: Option<String>,
    #[serde(alias = "updatedAt")]
    updated_at: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

fn id_text(id: Option<Value>) -> String {
    match id {
        Some(Value::String(id)) => id,
        Some(Value::Number(id)) => id.to_string(),
        _ => String::new(),
    }
}

impl From<ApiUser> for User {
    fn from(user: ApiUser) -> Self {
        Self {
            id: id_text(user.id),
            name: user.name.unwrap_or_default(),
            email: user.email.unwrap_or_default(),
            role: non_empty(user.role).unwrap_or_else(|| DEFAULT_ROLE.to_string()),
            avatar: user.avatar,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Directory listings come back either as a bare array or wrapped in an object.
#[derive(Deserialize)]
#[serde(untagged)]
enum UserList {
    Bare(Vec<ApiUser>),
    Wrapped {
        #[serde(alias = "data", alias = "items")]
        users: Vec<ApiUser>,
    },
}

impl UserList {
    fn into_users(self) -> Vec<User> {
        let users = match self {
            Self::Bare(users) | Self::Wrapped { users } => users,
        };
        users.into_iter().map(User::from).collect()
    }
}

#[derive(Clone, Debug)]
pub struct UserAdapter {
    client: ApiClient,
}

impl UserAdapter {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Fetches the signed-in user's profile.
    /// # Errors
    /// Returns transport, HTTP or decode errors unchanged.
    #[instrument(skip_all)]
    pub async fn get_current_user(&self, token: &SecretString) -> Result<User> {
        let user: ApiUser = self.client.get_json(PROFILE_ME_PATH, Some(token)).await?;
        Ok(user.into())
    }

    /// Sends the editable profile fields; absent fields are omitted from the body.
    /// # Errors
    /// Returns transport, HTTP or decode errors unchanged.
    #[instrument(skip_all)]
    pub async fn update_profile(
        &self,
        token: &SecretString,
        profile: &UserProfile,
    ) -> Result<User> {
        let user: ApiUser = self
            .client
            .send_json(Method::PATCH, PROFILE_PATH, profile, Some(token))
            .await?;
        Ok(user.into())
    }

    /// # Errors
    /// Returns transport, HTTP or decode errors unchanged.
    #[instrument(skip_all)]
    pub async fn list_users(&self, token: &SecretString) -> Result<Vec<User>> {
        let users: UserList = self.client.get_json(USERS_PATH, Some(token)).await?;
        Ok(users.into_users())
    }

    /// # Errors
    /// Returns `Validation` for a blank id, otherwise transport, HTTP or decode
    /// errors unchanged.
    #[instrument(skip(self, token))]
    pub async fn get_user(&self, token: &SecretString, id: &str) -> Result<User> {
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(Error::Validation("User id is required.".to_string()));
        }

        let users = USERS_PATH.trim_start_matches('/');
        let user: ApiUser = self
            .client
            .get_json_at(&[users, trimmed], Some(token))
            .await?;
        Ok(user.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tests::{can_bind_localhost, test_config};
    use anyhow::Result;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn token() -> SecretString {
        SecretString::from("T1".to_string())
    }

    fn adapter(server: &MockServer) -> Result<UserAdapter> {
        Ok(UserAdapter::new(ApiClient::new(&test_config(&server.uri()))?))
    }

    #[test]
    fn normalizes_missing_fields() -> Result<()> {
        let user: User = serde_json::from_value::<ApiUser>(json!({}))?.into();
        assert_eq!(user.id, "");
        assert_eq!(user.name, "");
        assert_eq!(user.email, "");
        assert_eq!(user.role, "user");
        assert_eq!(user.avatar, None);
        Ok(())
    }

    #[test]
    fn normalizes_numeric_id_and_empty_role() -> Result<()> {
        let user: User = serde_json::from_value::<ApiUser>(json!({
            "id": 42,
            "name": "Ada",
            "role": "",
            "createdAt": "2024-01-01T00:00:00Z",
            "updated_at": "2024-02-01T00:00:00Z"
        }))?
        .into();
        assert_eq!(user.id, "42");
        assert_eq!(user.role, "user");
        assert_eq!(user.created_at.as_deref(), Some("2024-01-01T00:00:00Z"));
        assert_eq!(user.updated_at.as_deref(), Some("2024-02-01T00:00:00Z"));
        Ok(())
    }

    #[test]
    fn user_list_accepts_bare_and_wrapped() -> Result<()> {
        let bare: UserList = serde_json::from_value(json!([{"id": "1"}, {"id": "2"}]))?;
        assert_eq!(bare.into_users().len(), 2);

        let wrapped: UserList = serde_json::from_value(json!({"data": [{"id": "1"}]}))?;
        let users = wrapped.into_users();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id, "1");
        Ok(())
    }

    #[tokio::test]
    async fn get_current_user_sends_bearer() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/profile/me"))
            .and(header("Authorization", "Bearer T1"))
            .and(header("X-Device-Id", "dev"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "u-1",
                "name": "Ada",
                "email": "ada@example.com",
                "role": "admin",
                "avatar": "https://cdn.example.com/ada.png"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let user = adapter(&server)?.get_current_user(&token()).await?;
        assert_eq!(user.id, "u-1");
        assert_eq!(user.role, "admin");
        assert_eq!(user.avatar.as_deref(), Some("https://cdn.example.com/ada.png"));
        Ok(())
    }

    #[tokio::test]
    async fn update_profile_patches_present_fields() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path("/profile"))
            .and(header("Authorization", "Bearer T1"))
            .and(body_json(json!({"name": "Grace"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "u-1",
                "name": "Grace",
                "email": "ada@example.com"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let profile = UserProfile {
            name: Some("Grace".to_string()),
            ..UserProfile::default()
        };
        let user = adapter(&server)?.update_profile(&token(), &profile).await?;
        assert_eq!(user.name, "Grace");
        assert_eq!(user.role, "user");
        Ok(())
    }

    #[tokio::test]
    async fn get_user_rejects_blank_id_without_request() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        let result = adapter(&server)?.get_user(&token(), "   ").await;
        assert!(matches!(result, Err(Error::Validation(_))));

        let received = server.received_requests().await.unwrap_or_default();
        assert!(received.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn get_user_fetches_by_id() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 7,
                "name": "User 7",
                "email": "user7@example.com"
            })))
            .mount(&server)
            .await;

        let user = adapter(&server)?.get_user(&token(), " 7 ").await?;
        assert_eq!(user.id, "7");
        assert_eq!(user.email, "user7@example.com");
        Ok(())
    }

    #[tokio::test]
    async fn get_user_keeps_id_in_one_segment() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/profile/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "me"})))
            .expect(0)
            .mount(&server)
            .await;

        let result = adapter(&server)?
            .get_user(&token(), "x/../../profile/me")
            .await;
        assert_eq!(result.err().and_then(|err| err.status()), Some(404));

        let received = server.received_requests().await.unwrap_or_default();
        let paths: Vec<&str> = received.iter().map(|request| request.url.path()).collect();
        assert_eq!(paths, ["/users/x%2F..%2F..%2Fprofile%2Fme"]);

        let result = adapter(&server)?.get_user(&token(), "..").await;
        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(server.received_requests().await.unwrap_or_default().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn list_users_propagates_http_error() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(403))
            .expect(1)
            .mount(&server)
            .await;

        let result = adapter(&server)?.list_users(&token()).await;
        assert_eq!(
            result.err(),
            Some(Error::Http {
                status: 403,
                message: "Request failed.".to_string()
            })
        );
        Ok(())
    }
}
