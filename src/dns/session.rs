use std::fmt;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{ApiError, ApiErrorDetail, Error, Result, UnrecognizedError};

/// Parses a provider's error envelope into its ordered `(code, message)` list,
/// or `None` when the body is not shaped like that envelope.
pub type ErrorEnvelope = fn(&str) -> Option<Vec<ApiErrorDetail>>;

/// HTTP settings shared by all provider clients.
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    /// Replaces the provider's API root, mostly for tests.
    pub base_url: Option<String>,
    pub timeout: Option<Duration>,
    pub user_agent: Option<String>,
}

impl ClientOptions {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
            ..Self::default()
        }
    }
}

/// One authenticated HTTP session against a provider API root.
///
/// Sessions are never mutated after construction: scoping helpers return a
/// new session.
#[derive(Clone)]
pub struct Session {
    provider: &'static str,
    client: Client,
    base_url: String,
    headers: HeaderMap,
    query: Vec<(String, String)>,
    envelope: ErrorEnvelope,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let query_keys: Vec<&str> = self.query.iter().map(|(k, _)| k.as_str()).collect();
        f.debug_struct("Session")
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .field("headers", &"<REDACTED>")
            .field("query_keys", &query_keys)
            .finish()
    }
}

impl Session {
    pub(crate) fn new(
        provider: &'static str,
        default_base_url: &str,
        headers: HeaderMap,
        envelope: ErrorEnvelope,
        options: &ClientOptions,
    ) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = &options.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }

        let mut base_url = options
            .base_url
            .clone()
            .unwrap_or_else(|| default_base_url.to_string());
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Self {
            provider,
            client: builder.build()?,
            base_url,
            headers,
            query: Vec::new(),
            envelope,
        })
    }

    /// A copy of this session whose every request also carries `key=value`.
    pub fn with_query(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut scoped = self.clone();
        scoped.query.push((key.into(), value.into()));
        scoped
    }

    pub fn provider(&self) -> &'static str {
        self.provider
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path.trim_start_matches('/'));
        debug!(provider = self.provider, method = method.as_str(), path, "sending request");

        let mut builder = self.client.request(method, url).headers(self.headers.clone());
        if !self.query.is_empty() {
            builder = builder.query(&self.query);
        }
        builder
    }

    /// Sends the request and turns any non-2xx answer into an error.
    pub(crate) async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await?;
        let status = response.status();
        debug!(provider = self.provider, status = status.as_u16(), "received response");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await?;
        Err(normalize_error(self.provider, status.as_u16(), &body, self.envelope))
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self
            .send(self.request(Method::GET, path).query(query))
            .await?;
        decode(response).await
    }

    pub(crate) async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let response = self
            .send(self.request(Method::POST, path).json(body))
            .await?;
        decode(response).await
    }

    pub(crate) async fn patch_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let response = self
            .send(self.request(Method::PATCH, path).json(body))
            .await?;
        decode(response).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<Response> {
        self.send(self.request(Method::DELETE, path)).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

/// Maps a failed response to [`Error::Api`] when the body matches the
/// provider's envelope, and to [`Error::Unrecognized`] with the untouched
/// status and body otherwise.
pub fn normalize_error(
    provider: &'static str,
    status: u16,
    body: &str,
    envelope: ErrorEnvelope,
) -> Error {
    match envelope(body) {
        Some(errors) => Error::Api(ApiError {
            provider,
            status,
            errors,
        }),
        None => Error::Unrecognized(UnrecognizedError::Status {
            status,
            body: body.to_string(),
        }),
    }
}

/// Builds a header map, rejecting credentials that can't be sent as headers.
pub(crate) fn auth_headers<'a>(
    pairs: impl IntoIterator<Item = (&'static str, &'a str)>,
) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (name, value) in pairs {
        let mut value = HeaderValue::from_str(value).map_err(|_| {
            Error::authentication(format!("{} contains characters not allowed in a header", name))
        })?;
        value.set_sensitive(true);
        headers.insert(HeaderName::from_static(name), value);
    }
    Ok(headers)
}

/// Treats empty and whitespace-only strings as missing.
pub(crate) fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_error(body: &str) -> Option<Vec<ApiErrorDetail>> {
        let value: serde_json::Value = serde_json::from_str(body).ok()?;
        let message = value.get("message")?.as_str()?;
        Some(vec![ApiErrorDetail::new("E", message)])
    }

    #[test]
    fn test_normalize_recognized_envelope() {
        let err = normalize_error("test", 422, r#"{"message":"nope"}"#, single_error);
        match err {
            Error::Api(api) => {
                assert_eq!(api.status, 422);
                assert_eq!(api.errors, vec![ApiErrorDetail::new("E", "nope")]);
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn test_normalize_keeps_unrecognized_body() {
        let err = normalize_error("test", 502, "<html>Bad Gateway</html>", single_error);
        match err {
            Error::Unrecognized(UnrecognizedError::Status { status, body }) => {
                assert_eq!(status, 502);
                assert_eq!(body, "<html>Bad Gateway</html>");
            }
            other => panic!("expected Unrecognized error, got {:?}", other),
        }
    }

    #[test]
    fn test_with_query_leaves_original_untouched() {
        let session = Session::new(
            "test",
            "https://example.invalid",
            HeaderMap::new(),
            single_error,
            &ClientOptions::default(),
        )
        .unwrap();

        let scoped = session.with_query("teamId", "team_1");
        assert_eq!(scoped.query_value("teamId"), Some("team_1"));
        assert_eq!(session.query_value("teamId"), None);
        assert_eq!(session.base_url(), "https://example.invalid/");
    }

    #[test]
    fn test_debug_redacts_credentials() {
        let headers = auth_headers([("authorization", "Bearer secret-token")]).unwrap();
        let session = Session::new(
            "test",
            "https://example.invalid/",
            headers,
            single_error,
            &ClientOptions::default(),
        )
        .unwrap()
        .with_query("password", "hunter2");

        let debug = format!("{:?}", session);
        assert!(!debug.contains("secret-token"));
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("password"));
    }

    #[test]
    fn test_present_rejects_blank() {
        assert_eq!(present(Some("  ")), None);
        assert_eq!(present(None), None);
        assert_eq!(present(Some(" tok ")), Some("tok"));
    }
}
