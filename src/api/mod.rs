//! HTTP plumbing shared by the auth and user adapters.
//!
//! Every request carries the fixed device/app header bundle. A bearer token is
//! attached only when the caller passes one in; the client keeps no credential
//! state of its own. Errors are mapped to [`Error`] and returned unchanged to
//! the caller, with no retry at this layer.

pub mod auth;
pub mod user;

pub use auth::AuthAdapter;
pub use user::UserAdapter;

use crate::{
    config::{AppConfig, DeviceHeaders},
    error::{Error, Result},
};
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method, RequestBuilder, Response,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, Instrument};
use url::Url;

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Maximum number of error body characters surfaced to the user.
const MAX_ERROR_CHARS: usize = 200;

/// Cheap to clone; clones share the connection pool.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    device: DeviceHeaders,
}

impl ApiClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|err| Error::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            http,
            base_url: config.api_base_url.clone(),
            device: config.device.clone(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Standard header bundle, plus `Authorization` when a token is given.
    /// # Errors
    /// Returns an error if a configured header value is not valid header text.
    pub fn standard_headers(&self, token: Option<&SecretString>) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        for (name, value) in self.device.pairs() {
            let header = HeaderName::from_bytes(name.as_bytes())
                .map_err(|err| Error::Config(format!("Invalid header name {name}: {err}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|err| Error::Config(format!("Invalid value for {name}: {err}")))?;
            headers.insert(header, value);
        }

        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|_| Error::Config("Access token is not valid header text.".to_string()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&SecretString>,
    ) -> Result<RequestBuilder> {
        let url = build_url(&self.base_url, path);
        self.request_url(method, url, token)
    }

    fn request_url(
        &self,
        method: Method,
        url: impl reqwest::IntoUrl,
        token: Option<&SecretString>,
    ) -> Result<RequestBuilder> {
        Ok(self
            .http
            .request(method, url)
            .headers(self.standard_headers(token)?))
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&SecretString>,
    ) -> Result<T> {
        let request = self.request(Method::GET, path, token)?;
        let response = send(request, "GET", path).await?;
        handle_json_response(response).await
    }

    /// GET on the base URL extended by `segments`, each percent-encoded as a
    /// single path segment.
    pub(crate) async fn get_json_at<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        token: Option<&SecretString>,
    ) -> Result<T> {
        let url = segment_url(&self.base_url, segments)?;
        let path = url.path().to_string();
        let request = self.request_url(Method::GET, url, token)?;
        let response = send(request, "GET", &path).await?;
        handle_json_response(response).await
    }

    pub(crate) async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        token: Option<&SecretString>,
    ) -> Result<T> {
        let payload = serde_json::to_vec(body)
            .map_err(|err| Error::Serialization(format!("Failed to encode request: {err}")))?;
        let label = method.to_string();
        let request = self.request(method, path, token)?.body(payload);
        let response = send(request, &label, path).await?;
        handle_json_response(response).await
    }

    pub(crate) async fn post_empty(&self, path: &str, token: Option<&SecretString>) -> Result<()> {
        let request = self.request(Method::POST, path, token)?;
        let response = send(request, "POST", path).await?;
        handle_empty_response(response).await
    }
}

/// Joins `path` onto the base URL, keeping any path prefix on the base.
pub(crate) fn build_url(base_url: &Url, path: &str) -> String {
    let base = base_url.as_str().trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

/// Appends `segments` to the base URL path. Separators and dot segments inside
/// a segment are encoded, so caller input never changes the endpoint.
pub(crate) fn segment_url(base_url: &Url, segments: &[&str]) -> Result<Url> {
    if let Some(segment) = segments.iter().find(|s| matches!(s.trim(), "" | "." | "..")) {
        return Err(Error::Validation(format!("Invalid path segment: '{segment}'")));
    }

    let mut url = base_url.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|()| Error::Config(format!("API base URL cannot carry a path: {base_url}")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

async fn send(request: RequestBuilder, method: &str, path: &str) -> Result<Response> {
    let span = tracing::info_span!("api.request", http.method = %method, path = %path);
    let response = request
        .send()
        .instrument(span)
        .await
        .map_err(map_request_error)?;

    debug!(status = %response.status(), "{method} {path}");
    Ok(response)
}

/// Maps transport errors into `Timeout` or `Network`.
fn map_request_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Timeout("Request timed out. Please try again.".to_string())
    } else if err.is_builder() {
        Error::Serialization(format!("Failed to build request: {err}"))
    } else {
        Error::Network(format!("Unable to reach the server: {err}"))
    }
}

async fn handle_json_response<T: DeserializeOwned>(response: Response) -> Result<T> {
    if response.status().is_success() {
        let bytes = response.bytes().await.map_err(map_request_error)?;
        serde_json::from_slice(&bytes)
            .map_err(|err| Error::Parse(format!("Failed to decode response: {err}")))
    } else {
        Err(http_error(response).await)
    }
}

async fn handle_empty_response(response: Response) -> Result<()> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(http_error(response).await)
    }
}

async fn http_error(response: Response) -> Error {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Error::Http {
        status,
        message: sanitize_body(&body),
    }
}

/// Trims and truncates error bodies for display.
fn sanitize_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Request failed.".to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}
