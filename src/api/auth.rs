//! Token endpoint adapter. Passwords and tokens travel as `SecretString` and are
//! never logged.

use super::ApiClient;
use crate::{
    domain::{AuthToken, Credentials},
    error::Result,
};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

pub const TOKEN_PATH: &str = "/oauth/token";

#[derive(Serialize)]
#[serde(tag = "grant_type", rename_all = "snake_case")]
enum TokenRequest<'a> {
    Password {
        username: &'a str,
        password: &'a str,
    },
    RefreshToken {
        refresh_token: &'a str,
    },
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: u64,
    #[serde(default)]
    token_type: Option<String>,
}

impl From<TokenResponse> for AuthToken {
    fn from(response: TokenResponse) -> Self {
        Self {
            access_token: SecretString::from(response.access_token),
            refresh_token: response
                .refresh_token
                .filter(|token| !token.is_empty())
                .map(SecretString::from),
            expires_in: response.expires_in,
            token_type: response.token_type,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AuthAdapter {
    client: ApiClient,
    logout_path: Option<String>,
}

impl AuthAdapter {
    #[must_use]
    pub fn new(client: ApiClient, logout_path: Option<String>) -> Self {
        Self {
            client,
            logout_path,
        }
    }

    /// Exchanges username and password for a token (`grant_type=password`).
    /// # Errors
    /// Returns transport, HTTP or decode errors unchanged.
    #[instrument(skip_all, fields(username = %credentials.username))]
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthToken> {
        let request = TokenRequest::Password {
            username: &credentials.username,
            password: credentials.password.expose_secret(),
        };

        let response: TokenResponse = self
            .client
            .send_json(Method::POST, TOKEN_PATH, &request, None)
            .await?;

        debug!("password grant succeeded");
        Ok(response.into())
    }

    /// Exchanges a refresh token for a new token (`grant_type=refresh_token`).
    /// # Errors
    /// Returns transport, HTTP or decode errors unchanged.
    #[instrument(skip_all)]
    pub async fn refresh_token(&self, refresh_token: &SecretString) -> Result<AuthToken> {
        let request = TokenRequest::RefreshToken {
            refresh_token: refresh_token.expose_secret(),
        };

        let response: TokenResponse = self
            .client
            .send_json(Method::POST, TOKEN_PATH, &request, None)
            .await?;

        debug!("refresh grant succeeded");
        Ok(response.into())
    }

    /// Ends the session server-side when a logout endpoint is configured;
    /// otherwise there is nothing to do remotely.
    /// # Errors
    /// Returns transport or HTTP errors from the logout endpoint.
    #[instrument(skip_all)]
    pub async fn logout(&self, token: Option<&SecretString>) -> Result<()> {
        match self.logout_path.as_deref() {
            Some(path) => self.client.post_empty(path, token).await,
            None => {
                debug!("no logout endpoint configured, clearing locally");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        api::tests::{can_bind_localhost, test_config},
        Error,
    };
    use anyhow::{anyhow, Result};
    use serde_json::json;
    use wiremock::matchers::{body_json, header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn adapter(server: &MockServer, logout: Option<&str>) -> Result<AuthAdapter> {
        let client = ApiClient::new(&test_config(&server.uri()))?;
        Ok(AuthAdapter::new(client, logout.map(str::to_string)))
    }

    #[test]
    fn token_request_wire_format() -> Result<()> {
        let password = serde_json::to_value(TokenRequest::Password {
            username: "a",
            password: "b",
        })?;
        assert_eq!(
            password,
            json!({"grant_type": "password", "username": "a", "password": "b"})
        );

        let refresh = serde_json::to_value(TokenRequest::RefreshToken { refresh_token: "R" })?;
        assert_eq!(
            refresh,
            json!({"grant_type": "refresh_token", "refresh_token": "R"})
        );
        Ok(())
    }

    #[tokio::test]
    async fn login_sends_password_grant_with_standard_headers() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(header("X-App-Id", "dev"))
            .and(header("X-Device-Os", "web"))
            .and(body_json(json!({
                "grant_type": "password",
                "username": "a",
                "password": "b"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "T1",
                "expires_in": 3600
            })))
            .expect(1)
            .mount(&server)
            .await;

        let token = adapter(&server, None)
            .await?
            .login(&Credentials::new("a", "b"))
            .await?;

        assert_eq!(token.access_token.expose_secret(), "T1");
        assert_eq!(token.expires_in, 3600);
        assert!(token.refresh_token.is_none());
        assert!(token.token_type.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn login_does_not_send_authorization() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "T1",
                "refresh_token": "R1",
                "token_type": "bearer",
                "expires_in": 60
            })))
            .mount(&server)
            .await;

        let token = adapter(&server, None)
            .await?
            .login(&Credentials::new("a", "b"))
            .await?;
        assert_eq!(
            token.refresh_token.as_ref().map(|t| t.expose_secret()),
            Some("R1")
        );
        assert_eq!(token.token_type.as_deref(), Some("bearer"));
        Ok(())
    }

    #[tokio::test]
    async fn login_propagates_http_error() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid_grant"))
            .expect(1)
            .mount(&server)
            .await;

        let err = adapter(&server, None)
            .await?
            .login(&Credentials::new("a", "wrong"))
            .await
            .err()
            .ok_or_else(|| anyhow!("expected error"))?;

        assert_eq!(
            err,
            Error::Http {
                status: 401,
                message: "invalid_grant".to_string()
            }
        );
        Ok(())
    }

    #[tokio::test]
    async fn login_rejects_response_without_access_token() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"expires_in": 1})))
            .mount(&server)
            .await;

        let result = adapter(&server, None)
            .await?
            .login(&Credentials::new("a", "b"))
            .await;
        assert!(matches!(result, Err(Error::Parse(_))));
        Ok(())
    }

    #[tokio::test]
    async fn refresh_sends_refresh_grant() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(body_json(json!({
                "grant_type": "refresh_token",
                "refresh_token": "R1"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "T2",
                "refresh_token": "R2",
                "expires_in": 3600
            })))
            .expect(1)
            .mount(&server)
            .await;

        let token = adapter(&server, None)
            .await?
            .refresh_token(&SecretString::from("R1".to_string()))
            .await?;
        assert_eq!(token.access_token.expose_secret(), "T2");
        Ok(())
    }

    #[tokio::test]
    async fn logout_without_endpoint_is_local() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        adapter(&server, None).await?.logout(None).await?;

        let received = server.received_requests().await.unwrap_or_default();
        assert!(received.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn logout_posts_with_bearer_when_configured() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth/logout"))
            .and(header("Authorization", "Bearer T1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let token = SecretString::from("T1".to_string());
        adapter(&server, Some("/oauth/logout"))
            .await?
            .logout(Some(&token))
            .await?;
        Ok(())
    }
}
