//! Catalog client over the gallery REST API.

use std::fmt::Debug;
use std::num::NonZeroU32;
use std::str::FromStr;
use std::time::Duration;

use reqwest::header::{self, HeaderMap};
use reqwest::{Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::config::CatalogClientConfig;
use crate::envelope::normalize_page;
use crate::error::{CatalogClientError, DecodeError};
use crate::types::{ErrorResponse, Page};

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";
pub const DEFAULT_PAGE_SIZE: NonZeroU32 = NonZeroU32::new(20).unwrap();

/// A client for the catalog service.
///
/// This is a thin layer over [reqwest] that handles:
/// - HTTP client configuration with timeouts
/// - Bearer token authentication for the admin API
/// - Mapping of error statuses to [CatalogClientError]
/// - Normalization of paginated responses
#[derive(Clone)]
pub struct CatalogClient {
    client: reqwest::Client,
    base_url: Url,
    config: CatalogClientConfig,
}

impl Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("api_url", &self.config.api_url)
            .field("has_token", &self.config.token.is_some())
            .finish_non_exhaustive()
    }
}

impl CatalogClient {
    /// Create a new catalog client from configuration.
    pub fn new(config: CatalogClientConfig) -> Result<Self, CatalogClientError> {
        let base_url = Url::parse(&config.api_url).map_err(|e| {
            CatalogClientError::InvalidConfig(format!("invalid api url '{}': {e}", config.api_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(CatalogClientError::InvalidConfig(format!(
                "api url '{}' cannot be used as a base",
                config.api_url
            )));
        }

        let client = build_http_client(&config)?;

        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    /// Get the configured API URL.
    pub fn api_url(&self) -> &str {
        &self.config.api_url
    }

    /// The bearer token sent with every request, if any.
    pub fn token(&self) -> Option<&str> {
        self.config.token.as_deref()
    }

    /// Update the client configuration and recreate the client.
    pub fn update_config(
        &mut self,
        update: impl FnOnce(&mut CatalogClientConfig),
    ) -> Result<(), CatalogClientError> {
        let mut modified_config = self.config.clone();
        update(&mut modified_config);
        *self = Self::new(modified_config)?;
        Ok(())
    }

    /// Resolve path segments against the API base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, CatalogClientError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|()| {
                CatalogClientError::InvalidConfig(format!(
                    "api url '{}' cannot be used as a base",
                    self.config.api_url
                ))
            })?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    async fn send(
        &self,
        request: RequestBuilder,
        kind: RequestKind,
    ) -> Result<Response, CatalogClientError> {
        let response = request.send().await.map_err(CatalogClientError::Network)?;
        check_status(response, kind).await
    }

    /// GET an endpoint and decode its body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T, CatalogClientError> {
        let url = self.endpoint(segments)?;
        let response = self
            .send(self.client.get(url).query(query), RequestKind::Read)
            .await?;
        decode_body(read_json(response).await?)
    }

    /// GET a paginated endpoint, accepting either page envelope.
    pub async fn get_page<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<Page<T>, CatalogClientError> {
        let url = self.endpoint(segments)?;
        let response = self
            .send(self.client.get(url).query(query), RequestKind::Read)
            .await?;
        Ok(normalize_page(read_json(response).await?)?)
    }

    /// Send a JSON body with `method` and decode the response body.
    pub async fn send_json<B, T>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
        kind: RequestKind,
    ) -> Result<T, CatalogClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(segments)?;
        let response = self
            .send(self.client.request(method, url).json(body), kind)
            .await?;
        decode_body(read_json(response).await?)
    }

    /// DELETE an endpoint, ignoring any response body.
    pub async fn delete(&self, segments: &[&str]) -> Result<(), CatalogClientError> {
        let url = self.endpoint(segments)?;
        self.send(self.client.delete(url), RequestKind::Mutation)
            .await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Response handling
// ---------------------------------------------------------------------------

/// Whether a request changes catalog data.
/// Only mutations report structured validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Read,
    Mutation,
}

async fn check_status(response: Response, kind: RequestKind) -> Result<Response, CatalogClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    // Error bodies are only read for their `detail`, anything else
    // (e.g. an HTML error page from a proxy) is dropped.
    let detail = response
        .bytes()
        .await
        .ok()
        .and_then(|body| serde_json::from_slice::<ErrorResponse>(&body).ok())
        .map(|body| body.detail);

    debug!(%status, ?detail, "catalog request failed");

    Err(CatalogClientError::from_status(
        status,
        detail,
        kind == RequestKind::Mutation,
    ))
}

async fn read_json(response: Response) -> Result<Value, CatalogClientError> {
    let body = response.bytes().await.map_err(CatalogClientError::Network)?;
    serde_json::from_slice(&body).map_err(|e| DecodeError::Json(e).into())
}

fn decode_body<T: DeserializeOwned>(body: Value) -> Result<T, CatalogClientError> {
    serde_json::from_value(body).map_err(|e| DecodeError::Body(e).into())
}

fn build_http_client(config: &CatalogClientConfig) -> Result<reqwest::Client, CatalogClientError> {
    let mut headers = HeaderMap::new();

    // Bearer token for the admin API
    if let Some(token) = &config.token {
        let mut value = header::HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| CatalogClientError::InvalidConfig(e.to_string()))?;
        value.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, value);
    }

    for (key, value) in &config.extra_headers {
        headers.insert(
            header::HeaderName::from_str(key).map_err(
                |e: reqwest::header::InvalidHeaderName| {
                    CatalogClientError::InvalidConfig(e.to_string())
                },
            )?,
            header::HeaderValue::from_str(value).map_err(
                |e: reqwest::header::InvalidHeaderValue| {
                    CatalogClientError::InvalidConfig(e.to_string())
                },
            )?,
        );
    }

    debug!(
        api_url = %config.api_url,
        has_token = config.token.is_some(),
        extra_headers = config.extra_headers.len(),
        "building catalog HTTP client"
    );

    let client_builder = reqwest::Client::builder()
        .default_headers(headers)
        .connect_timeout(Duration::from_secs(15))
        .timeout(Duration::from_secs(60));

    let client_builder = if let Some(ref user_agent) = config.user_agent {
        client_builder.user_agent(user_agent)
    } else {
        client_builder
    };

    client_builder
        .build()
        .map_err(|e| CatalogClientError::InvalidConfig(e.to_string()))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use httpmock::prelude::*;
    use pretty_assertions::assert_eq;
    use reqwest::StatusCode;
    use serde_json::json;

    use super::*;
    use crate::types::WebsiteSummary;

    const API_PREFIX: &str = "/api/v1";

    fn client_config(server: &MockServer) -> CatalogClientConfig {
        CatalogClientConfig {
            api_url: format!("{}{API_PREFIX}", server.base_url()),
            token: None,
            extra_headers: Default::default(),
            user_agent: None,
        }
    }

    #[tokio::test]
    async fn get_page_rejects_unknown_shape() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/search");
            then.status(200).json_body(json!({ "results": [] }));
        });

        let client = CatalogClient::new(client_config(&server)).unwrap();
        let err = client
            .get_page::<WebsiteSummary>(&["search"], &[])
            .await
            .unwrap_err();

        assert!(
            matches!(err, CatalogClientError::Decode(DecodeError::UnknownEnvelope)),
            "expected decode error, got {err:?}"
        );
    }

    #[tokio::test]
    async fn non_json_body_is_a_decode_error() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/websites");
            then.status(200).body("<html>maintenance</html>");
        });

        let client = CatalogClient::new(client_config(&server)).unwrap();
        let err = client
            .get_page::<WebsiteSummary>(&["websites"], &[])
            .await
            .unwrap_err();

        assert!(
            matches!(err, CatalogClientError::Decode(DecodeError::Json(_))),
            "expected decode error, got {err:?}"
        );
    }

    #[tokio::test]
    async fn unreachable_server_is_a_network_error() {
        let client = CatalogClient::new(CatalogClientConfig {
            // port 9 (discard) is not expected to accept http connections
            api_url: "http://127.0.0.1:9/api/v1".to_string(),
            ..Default::default()
        })
        .unwrap();

        let err = client
            .get_json::<Value>(&["websites"], &[])
            .await
            .unwrap_err();

        assert!(
            matches!(err, CatalogClientError::Network(_)),
            "expected network error, got {err:?}"
        );
    }

    #[tokio::test]
    async fn bearer_token_sent_after_config_update() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/v1/auth/me")
                .header("authorization", "Bearer secret-token");
            then.status(200).json_body(json!({ "email": "admin@example.com" }));
        });

        let mut client = CatalogClient::new(client_config(&server)).unwrap();
        client
            .update_config(|config| config.token = Some("secret-token".to_string()))
            .unwrap();
        let body: Value = client.get_json(&["auth", "me"], &[]).await.unwrap();

        mock.assert();
        assert_eq!(client.token(), Some("secret-token"));
        assert_eq!(body["email"], "admin@example.com");
    }

    #[tokio::test]
    async fn extra_headers_set_on_all_requests() {
        let mut extra_headers: BTreeMap<String, String> = BTreeMap::new();
        extra_headers.insert("gallery-test".to_string(), "test-value".to_string());
        extra_headers.insert("gallery-test2".to_string(), "test-value2".to_string());

        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.header("gallery-test", "test-value")
                .header("gallery-test2", "test-value2");
            then.status(200).json_body(json!([]));
        });

        let client = CatalogClient::new(CatalogClientConfig {
            extra_headers,
            ..client_config(&server)
        })
        .unwrap();
        client.get_json::<Value>(&["styles"], &[]).await.unwrap();
        client.delete(&["websites", "acme"]).await.unwrap();

        mock.assert_hits(2);
    }

    #[tokio::test]
    async fn mutation_status_is_validation_error() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/api/v1/websites");
            then.status(409)
                .json_body(json!({ "detail": "Website with this slug already exists" }));
        });

        let client = CatalogClient::new(client_config(&server)).unwrap();
        let err = client
            .send_json::<_, Value>(
                reqwest::Method::POST,
                &["websites"],
                &json!({}),
                RequestKind::Mutation,
            )
            .await
            .unwrap_err();

        assert!(
            matches!(err, CatalogClientError::Validation { status, .. } if status == StatusCode::CONFLICT),
            "expected validation error, got {err:?}"
        );
    }

    #[test]
    fn invalid_api_url_is_rejected() {
        let err = CatalogClient::new(CatalogClientConfig {
            api_url: "not a url".to_string(),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, CatalogClientError::InvalidConfig(_)));
    }

    #[test]
    fn invalid_header_is_rejected() {
        let err = CatalogClient::new(CatalogClientConfig {
            api_url: DEFAULT_API_URL.to_string(),
            extra_headers: BTreeMap::from([("bad header".to_string(), "x".to_string())]),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, CatalogClientError::InvalidConfig(_)));
    }
}
