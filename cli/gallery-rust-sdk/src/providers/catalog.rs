use std::collections::VecDeque;
use std::fmt::Debug;
use std::num::NonZeroU32;
use std::path::Path;
use std::sync::{Arc, Mutex};

pub use gallery_catalog::types::*;
pub use gallery_catalog::{
    CatalogClient,
    CatalogClientConfig,
    CatalogClientError,
    DEFAULT_API_URL,
    DEFAULT_PAGE_SIZE,
    DecodeError,
    FilterKey,
    FilterSet,
    Query,
    RequestKind,
};
use enum_dispatch::enum_dispatch;
use gallery_catalog::envelope::normalize_page;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument};

pub const GALLERY_CATALOG_MOCK_DATA_VAR: &str = "_GALLERY_USE_CATALOG_MOCK";

// Arc allows you to push things into the client from outside the client if necessary
// Mutex allows you to share across threads (necessary because of tokio)
type MockField<T> = Arc<Mutex<T>>;

/// A canned error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenericResponse {
    pub status: u16,
    #[serde(default)]
    pub detail: Option<Value>,
}

/// A canned response of the mock client.
///
/// Bodies are kept as raw JSON and decoded the same way
/// the HTTP client decodes them, so pages may use either envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Error(GenericResponse),
    Body(Value),
}

#[derive(Debug, Error)]
pub enum MockDataError {
    /// Failed to read the JSON file pointed at by the _GALLERY_USE_CATALOG_MOCK var
    #[error("failed to read mock response file")]
    ReadMockFile(#[source] std::io::Error),
    /// Failed to parse the contents of the mock data file as JSON
    #[error("failed to parse mock data as JSON")]
    ParseJson(#[source] serde_json::Error),
    /// The data was parsed as JSON but it wasn't semantically valid
    #[error("invalid mocked data: {0}")]
    InvalidData(String),
}

/// Reads a list of mock responses from disk.
fn read_mock_responses(path: impl AsRef<Path>) -> Result<VecDeque<Response>, MockDataError> {
    let contents = std::fs::read_to_string(path).map_err(MockDataError::ReadMockFile)?;
    let deserialized: Vec<Response> =
        serde_json::from_str(&contents).map_err(MockDataError::ParseJson)?;

    for response in &deserialized {
        if let Response::Error(GenericResponse { status, .. }) = response {
            let valid = StatusCode::from_u16(*status)
                .map(|status| !status.is_success())
                .unwrap_or(false);
            if !valid {
                return Err(MockDataError::InvalidData(format!(
                    "{status} is not an error status"
                )));
            }
        }
    }

    Ok(deserialized.into())
}

/// Either a client for the actual catalog service,
/// or a mock client for testing.
#[derive(Debug, Clone)]
#[enum_dispatch(ClientTrait)]
pub enum Client {
    Catalog(CatalogClient),
    Mock(MockClient),
}

/// The complete catalog API interface.
///
/// This trait enables alternate implementations:
/// - **HTTP**: REST calls to the catalog API via [`CatalogClient`]
/// - **Mock**: Canned responses without HTTP via [`MockClient`]
#[enum_dispatch]
#[allow(async_fn_in_trait)]
pub trait ClientTrait {
    /// Fetch one page of a website listing.
    ///
    /// Exactly one request is made, failures are not retried.
    async fn fetch_page(
        &self,
        listing: &Listing,
        filters: &FilterSet,
        page_size: NonZeroU32,
    ) -> Result<Page<WebsiteSummary>, CatalogClientError>;

    /// Get a single website by slug.
    async fn get_website(&self, slug: &str) -> Result<WebsiteDetail, CatalogClientError>;

    /// Get a size limited highlight list.
    async fn highlights(
        &self,
        highlight: Highlight,
        limit: NonZeroU32,
    ) -> Result<Vec<WebsiteSummary>, CatalogClientError>;

    async fn categories(&self) -> Result<Vec<Category>, CatalogClientError>;

    async fn styles(&self) -> Result<Vec<Style>, CatalogClientError>;

    async fn collections(&self) -> Result<Vec<Collection>, CatalogClientError>;

    async fn platforms(&self) -> Result<Vec<Platform>, CatalogClientError>;

    /// Exchange credentials for an access token.
    async fn login(&self, credentials: &LoginRequest) -> Result<Token, CatalogClientError>;

    /// Get the user the configured token belongs to.
    async fn current_user(&self) -> Result<User, CatalogClientError>;

    async fn create_website(
        &self,
        website: &WebsiteCreate,
    ) -> Result<WebsiteDetail, CatalogClientError>;

    async fn update_website(
        &self,
        slug: &str,
        update: &WebsiteUpdate,
    ) -> Result<WebsiteDetail, CatalogClientError>;

    async fn delete_website(&self, slug: &str) -> Result<(), CatalogClientError>;

    /// Replace the bearer token sent with subsequent requests.
    fn set_token(&mut self, token: Option<String>) -> Result<(), CatalogClientError>;
}

impl ClientTrait for CatalogClient {
    #[instrument(skip_all, fields(endpoint = %listing, page = filters.page))]
    async fn fetch_page(
        &self,
        listing: &Listing,
        filters: &FilterSet,
        page_size: NonZeroU32,
    ) -> Result<Page<WebsiteSummary>, CatalogClientError> {
        let params = filters.request_params(page_size);
        debug!(?params, "fetching page");

        let page: Page<WebsiteSummary> = self.get_page(&listing.segments(), &params).await?;

        debug!(
            items = page.items.len(),
            total_items = page.meta.total_items,
            total_pages = page.meta.total_pages,
            "fetched page"
        );
        Ok(page)
    }

    #[instrument(skip(self))]
    async fn get_website(&self, slug: &str) -> Result<WebsiteDetail, CatalogClientError> {
        self.get_json(&["websites", slug], &[]).await
    }

    #[instrument(skip_all, fields(%highlight, %limit))]
    async fn highlights(
        &self,
        highlight: Highlight,
        limit: NonZeroU32,
    ) -> Result<Vec<WebsiteSummary>, CatalogClientError> {
        self.get_json(&["websites", highlight.segment()], &[(
            "limit",
            limit.to_string(),
        )])
        .await
    }

    #[instrument(skip(self))]
    async fn categories(&self) -> Result<Vec<Category>, CatalogClientError> {
        self.get_json(&["categories"], &[]).await
    }

    #[instrument(skip(self))]
    async fn styles(&self) -> Result<Vec<Style>, CatalogClientError> {
        self.get_json(&["styles"], &[]).await
    }

    #[instrument(skip(self))]
    async fn collections(&self) -> Result<Vec<Collection>, CatalogClientError> {
        self.get_json(&["collections"], &[]).await
    }

    #[instrument(skip(self))]
    async fn platforms(&self) -> Result<Vec<Platform>, CatalogClientError> {
        self.get_json(&["platforms"], &[]).await
    }

    #[instrument(skip_all, fields(email = %credentials.email))]
    async fn login(&self, credentials: &LoginRequest) -> Result<Token, CatalogClientError> {
        self.send_json(
            Method::POST,
            &["auth", "login"],
            credentials,
            RequestKind::Read,
        )
        .await
    }

    #[instrument(skip(self))]
    async fn current_user(&self) -> Result<User, CatalogClientError> {
        self.get_json(&["auth", "me"], &[]).await
    }

    #[instrument(skip_all, fields(slug = %website.slug))]
    async fn create_website(
        &self,
        website: &WebsiteCreate,
    ) -> Result<WebsiteDetail, CatalogClientError> {
        self.send_json(Method::POST, &["websites"], website, RequestKind::Mutation)
            .await
    }

    #[instrument(skip(self, update))]
    async fn update_website(
        &self,
        slug: &str,
        update: &WebsiteUpdate,
    ) -> Result<WebsiteDetail, CatalogClientError> {
        self.send_json(
            Method::PUT,
            &["websites", slug],
            update,
            RequestKind::Mutation,
        )
        .await
    }

    #[instrument(skip(self))]
    async fn delete_website(&self, slug: &str) -> Result<(), CatalogClientError> {
        self.delete(&["websites", slug]).await
    }

    fn set_token(&mut self, token: Option<String>) -> Result<(), CatalogClientError> {
        self.update_config(|config| config.token = token)
    }
}

/// A catalog client that can be seeded with mock responses
///
/// Responses are served in the order they were pushed,
/// regardless of which operation is called.
#[derive(Debug, Clone, Default)]
pub struct MockClient {
    pub mock_responses: MockField<VecDeque<Response>>,
    token: MockField<Option<String>>,
}

impl MockClient {
    /// Create a new mock client, potentially reading mock responses from disk
    pub fn new(mock_data_path: Option<impl AsRef<Path>>) -> Result<Self, MockDataError> {
        let mock_responses = match mock_data_path {
            Some(path) => read_mock_responses(&path)?,
            None => VecDeque::new(),
        };
        Ok(Self {
            mock_responses: Arc::new(Mutex::new(mock_responses)),
            token: Default::default(),
        })
    }

    /// Push a raw JSON body into the list of mock responses
    pub fn push_body(&self, body: Value) {
        self.mock_responses
            .lock()
            .expect("couldn't acquire mock lock")
            .push_back(Response::Body(body));
    }

    /// Push a serializable response into the list of mock responses
    pub fn push_response(&self, response: &impl Serialize) {
        let body = serde_json::to_value(response).expect("mock response must serialize");
        self.push_body(body);
    }

    /// Push an API error into the list of mock responses
    pub fn push_error_response(&self, status: u16, detail: impl Into<String>) {
        self.mock_responses
            .lock()
            .expect("couldn't acquire mock lock")
            .push_back(Response::Error(GenericResponse {
                status,
                detail: Some(Value::String(detail.into())),
            }));
    }

    /// The token most recently handed to [ClientTrait::set_token].
    pub fn token(&self) -> Option<String> {
        self.token.lock().expect("couldn't acquire mock lock").clone()
    }

    /// Number of responses not yet served.
    pub fn remaining(&self) -> usize {
        self.mock_responses
            .lock()
            .expect("couldn't acquire mock lock")
            .len()
    }

    fn next_response(&self, operation: &str, mutation: bool) -> Result<Value, CatalogClientError> {
        let response = self
            .mock_responses
            .lock()
            .expect("couldn't acquire mock lock")
            .pop_front();
        debug!(operation, found = response.is_some(), "serving mock response");

        match response {
            Some(Response::Body(body)) => Ok(body),
            Some(Response::Error(GenericResponse { status, detail })) => {
                let status = StatusCode::from_u16(status).map_err(|_| {
                    CatalogClientError::InvalidConfig(format!("invalid mock status {status}"))
                })?;
                let detail = detail.and_then(|detail| serde_json::from_value(detail).ok());
                Err(CatalogClientError::from_status(status, detail, mutation))
            },
            None => Err(CatalogClientError::InvalidConfig(format!(
                "no mock response left for {operation}"
            ))),
        }
    }

    fn next_body<T: DeserializeOwned>(
        &self,
        operation: &str,
        mutation: bool,
    ) -> Result<T, CatalogClientError> {
        let body = self.next_response(operation, mutation)?;
        serde_json::from_value(body).map_err(|e| DecodeError::Body(e).into())
    }
}

impl ClientTrait for MockClient {
    async fn fetch_page(
        &self,
        _listing: &Listing,
        _filters: &FilterSet,
        _page_size: NonZeroU32,
    ) -> Result<Page<WebsiteSummary>, CatalogClientError> {
        let body = self.next_response("fetch_page", false)?;
        Ok(normalize_page(body)?)
    }

    async fn get_website(&self, _slug: &str) -> Result<WebsiteDetail, CatalogClientError> {
        self.next_body("get_website", false)
    }

    async fn highlights(
        &self,
        _highlight: Highlight,
        _limit: NonZeroU32,
    ) -> Result<Vec<WebsiteSummary>, CatalogClientError> {
        self.next_body("highlights", false)
    }

    async fn categories(&self) -> Result<Vec<Category>, CatalogClientError> {
        self.next_body("categories", false)
    }

    async fn styles(&self) -> Result<Vec<Style>, CatalogClientError> {
        self.next_body("styles", false)
    }

    async fn collections(&self) -> Result<Vec<Collection>, CatalogClientError> {
        self.next_body("collections", false)
    }

    async fn platforms(&self) -> Result<Vec<Platform>, CatalogClientError> {
        self.next_body("platforms", false)
    }

    async fn login(&self, _credentials: &LoginRequest) -> Result<Token, CatalogClientError> {
        self.next_body("login", false)
    }

    async fn current_user(&self) -> Result<User, CatalogClientError> {
        self.next_body("current_user", false)
    }

    async fn create_website(
        &self,
        _website: &WebsiteCreate,
    ) -> Result<WebsiteDetail, CatalogClientError> {
        self.next_body("create_website", true)
    }

    async fn update_website(
        &self,
        _slug: &str,
        _update: &WebsiteUpdate,
    ) -> Result<WebsiteDetail, CatalogClientError> {
        self.next_body("update_website", true)
    }

    async fn delete_website(&self, _slug: &str) -> Result<(), CatalogClientError> {
        self.next_response("delete_website", true).map(|_| ())
    }

    fn set_token(&mut self, token: Option<String>) -> Result<(), CatalogClientError> {
        *self.token.lock().expect("couldn't acquire mock lock") = token;
        Ok(())
    }
}

pub mod test_helpers {
    use serde_json::json;

    use super::*;

    /// A listing entry with only the required fields set.
    pub fn website_summary(id: i64, slug: &str) -> WebsiteSummary {
        WebsiteSummary {
            id,
            slug: slug.to_string(),
            title: slug.to_string(),
            description: None,
            original_url: None,
            thumbnail_url: None,
            image_url: None,
            is_featured: false,
            view_count: 0,
            created_at: "2024-01-01T00:00:00".to_string(),
        }
    }

    /// A page of `count` websites in the `items` envelope.
    pub fn items_page(page: u32, size: u32, total: u64, count: usize) -> Value {
        let items = (0..count)
            .map(|i| website_summary(i as i64, &format!("site-{page}-{i}")))
            .collect::<Vec<_>>();
        json!({
            "items": items,
            "page": page,
            "size": size,
            "total": total,
            "pages": if size > 0 { total.div_ceil(u64::from(size)) } else { 0 },
        })
    }

    pub fn website_detail(slug: &str) -> WebsiteDetail {
        WebsiteDetail {
            summary: website_summary(1, slug),
            platform: None,
            categories: vec![],
            styles: vec![],
            collections: vec![],
            is_active: true,
            updated_at: None,
        }
    }

    pub fn user(email: &str) -> User {
        User {
            id: 1,
            email: email.to_string(),
            full_name: None,
            is_superuser: true,
            is_active: true,
            created_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::test_helpers::*;
    use super::*;

    #[tokio::test]
    async fn mock_pages_go_through_envelope_normalization() {
        let client = MockClient::new(None::<&Path>).unwrap();
        client.push_body(json!({
            "data": [website_summary(1, "acme")],
            "meta": { "page": 1, "per_page": 20, "total": 45, "total_pages": 1 },
        }));

        let page = client
            .fetch_page(
                &Listing::Websites,
                &FilterSet::default(),
                NonZeroU32::new(20).unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(page.items, vec![website_summary(1, "acme")]);
        assert_eq!(page.meta.total_pages, 3);
    }

    #[tokio::test]
    async fn mock_errors_map_like_http_errors() {
        let client = MockClient::default();
        client.push_error_response(404, "Website not found");
        client.push_error_response(422, "slug already taken");

        let err = client.get_website("missing").await.unwrap_err();
        assert!(
            matches!(&err, CatalogClientError::NotFound { detail: Some(d) } if d == "Website not found"),
            "{err:?}"
        );

        let err = client
            .create_website(&WebsiteCreate::default())
            .await
            .unwrap_err();
        assert!(
            matches!(err, CatalogClientError::Validation { .. }),
            "{err:?}"
        );
    }

    #[tokio::test]
    async fn exhausted_mock_reports_error() {
        let client = MockClient::default();
        let err = client.categories().await.unwrap_err();
        assert!(matches!(err, CatalogClientError::InvalidConfig(_)), "{err:?}");
    }

    #[tokio::test]
    async fn dispatch_reaches_mock_client() {
        let mock = MockClient::default();
        mock.push_response(&vec![website_summary(2, "popular")]);
        let mut client = Client::from(mock.clone());

        let websites = client
            .highlights(Highlight::Popular, NonZeroU32::new(5).unwrap())
            .await
            .unwrap();
        client.set_token(Some("abc".to_string())).unwrap();

        assert_eq!(websites[0].slug, "popular");
        assert_eq!(mock.token().as_deref(), Some("abc"));
        assert_eq!(mock.remaining(), 0);
    }

    #[test]
    fn mock_file_is_read_in_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "{}",
            json!([
                { "status": 401, "detail": "Not authenticated" },
                [{ "id": 1, "slug": "saas", "title": "SaaS" }],
            ])
        )
        .unwrap();

        let client = MockClient::new(Some(file.path())).unwrap();
        let responses = client.mock_responses.lock().unwrap();
        assert!(matches!(
            responses[0],
            Response::Error(GenericResponse { status: 401, .. })
        ));
        assert!(matches!(responses[1], Response::Body(Value::Array(_))));
    }

    #[test]
    fn mock_file_rejects_success_status_as_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", json!([{ "status": 200 }])).unwrap();

        let err = MockClient::new(Some(file.path())).unwrap_err();
        assert!(matches!(err, MockDataError::InvalidData(_)), "{err:?}");
    }

    mod http {
        use std::collections::BTreeMap;

        use httpmock::prelude::*;
        use pretty_assertions::assert_eq;
        use serde_json::json;

        use super::super::*;
        use crate::providers::catalog::test_helpers::website_summary;

        fn catalog_client(server: &MockServer) -> Client {
            CatalogClient::new(CatalogClientConfig {
                api_url: format!("{}/api/v1", server.base_url()),
                token: None,
                extra_headers: BTreeMap::new(),
                user_agent: None,
            })
            .unwrap()
            .into()
        }

        #[tokio::test]
        async fn fetch_page_sends_filters_with_page_and_size() {
            let server = MockServer::start_async().await;
            let mock = server.mock(|when, then| {
                when.method(GET)
                    .path("/api/v1/websites")
                    .query_param("page", "2")
                    .query_param("size", "20")
                    .query_param("category", "minimal")
                    .query_param("q", "dark hero");
                then.status(200).json_body(json!({
                    "items": [website_summary(1, "acme")],
                    "page": 2,
                    "size": 20,
                    "total": 21,
                    "pages": 2,
                }));
            });

            let client = catalog_client(&server);
            let filters = FilterSet::default()
                .with(FilterKey::Category, "minimal")
                .with(FilterKey::Q, "dark hero")
                .with(FilterKey::Page, "2");
            let page = client
                .fetch_page(&Listing::Websites, &filters, DEFAULT_PAGE_SIZE)
                .await
                .unwrap();

            mock.assert();
            assert_eq!(page.items, vec![website_summary(1, "acme")]);
            assert_eq!(page.meta, PaginationMeta::new(2, 20, 21));
        }

        #[tokio::test]
        async fn fetch_page_accepts_data_envelope() {
            let server = MockServer::start_async().await;
            let mock = server.mock(|when, then| {
                when.method(GET).path("/api/v1/categories/saas/websites");
                then.status(200).json_body(json!({
                    "data": [website_summary(1, "a"), website_summary(2, "b")],
                    "meta": { "page": 1, "per_page": 20, "total": 2, "total_pages": 1 },
                }));
            });

            let client = catalog_client(&server);
            let page = client
                .fetch_page(
                    &Listing::Category("saas".to_string()),
                    &FilterSet::default(),
                    DEFAULT_PAGE_SIZE,
                )
                .await
                .unwrap();

            mock.assert();
            assert_eq!(page.items.len(), 2);
            assert_eq!(page.meta.total_pages, 1);
        }

        #[tokio::test]
        async fn set_token_sends_bearer_header() {
            let server = MockServer::start_async().await;
            let mock = server.mock(|when, then| {
                when.method(GET)
                    .path("/api/v1/auth/me")
                    .header("authorization", "Bearer secret-token");
                then.status(200).json_body(json!({
                    "id": 7,
                    "email": "admin@example.com",
                    "full_name": "Admin",
                    "is_superuser": true,
                    "is_active": true,
                    "created_at": "2024-01-01T00:00:00",
                }));
            });

            let mut client = catalog_client(&server);
            client.set_token(Some("secret-token".to_string())).unwrap();
            let user = client.current_user().await.unwrap();

            mock.assert();
            assert_eq!(user.email, "admin@example.com");
            assert!(user.is_superuser);
        }

        #[tokio::test]
        async fn no_authorization_header_without_token() {
            let server = MockServer::start_async().await;
            let mock = server.mock(|when, then| {
                when.method(GET)
                    .path("/api/v1/categories")
                    .header_missing("authorization");
                then.status(200).json_body(json!([]));
            });

            let client = catalog_client(&server);
            let categories = client.categories().await.unwrap();

            mock.assert();
            assert!(categories.is_empty());
        }

        #[tokio::test]
        async fn highlights_send_limit() {
            let server = MockServer::start_async().await;
            let mock = server.mock(|when, then| {
                when.method(GET)
                    .path("/api/v1/websites/popular")
                    .query_param("limit", "5");
                then.status(200)
                    .json_body(json!([website_summary(1, "a"), website_summary(2, "b")]));
            });

            let client = catalog_client(&server);
            let websites = client
                .highlights(Highlight::Popular, NonZeroU32::new(5).unwrap())
                .await
                .unwrap();

            mock.assert();
            assert_eq!(websites.len(), 2);
        }

        #[tokio::test]
        async fn missing_website_is_not_found() {
            let server = MockServer::start_async().await;
            let mock = server.mock(|when, then| {
                when.method(GET).path("/api/v1/websites/gone");
                then.status(404).json_body(json!({ "detail": "Website not found" }));
            });

            let client = catalog_client(&server);
            let err = client.get_website("gone").await.unwrap_err();

            mock.assert();
            assert!(
                matches!(&err, CatalogClientError::NotFound { detail: Some(detail) } if detail == "Website not found"),
                "expected not found, got {err:?}"
            );
        }

        #[tokio::test]
        async fn failed_login_is_auth_error_with_detail() {
            let server = MockServer::start_async().await;
            let mock = server.mock(|when, then| {
                when.method(POST)
                    .path("/api/v1/auth/login")
                    .json_body(json!({ "email": "admin@example.com", "password": "wrong" }));
                then.status(401)
                    .json_body(json!({ "detail": "Incorrect email or password" }));
            });

            let client = catalog_client(&server);
            let err = client
                .login(&LoginRequest {
                    email: "admin@example.com".to_string(),
                    password: "wrong".to_string(),
                })
                .await
                .unwrap_err();

            mock.assert();
            assert!(err.is_auth(), "expected auth error, got {err:?}");
            assert_eq!(err.detail().as_deref(), Some("Incorrect email or password"));
        }

        #[tokio::test]
        async fn login_returns_token() {
            let server = MockServer::start_async().await;
            server.mock(|when, then| {
                when.method(POST).path("/api/v1/auth/login");
                then.status(200)
                    .json_body(json!({ "access_token": "abc", "token_type": "bearer" }));
            });

            let client = catalog_client(&server);
            let token = client
                .login(&LoginRequest {
                    email: "admin@example.com".to_string(),
                    password: "secret".to_string(),
                })
                .await
                .unwrap();

            assert_eq!(token.access_token, "abc");
        }

        #[tokio::test]
        async fn create_reports_field_validation_errors() {
            let server = MockServer::start_async().await;
            server.mock(|when, then| {
                when.method(POST).path("/api/v1/websites");
                then.status(422).json_body(json!({
                    "detail": [{ "loc": ["body", "title"], "msg": "field required", "type": "missing" }]
                }));
            });

            let client = catalog_client(&server);
            let err = client
                .create_website(&WebsiteCreate {
                    slug: "acme".to_string(),
                    ..Default::default()
                })
                .await
                .unwrap_err();

            assert!(
                matches!(err, CatalogClientError::Validation { status, .. } if status == StatusCode::UNPROCESSABLE_ENTITY),
                "expected validation error, got {err:?}"
            );
            assert_eq!(err.detail().as_deref(), Some("body.title: field required"));
        }

        #[tokio::test]
        async fn conflict_on_create_carries_message() {
            let server = MockServer::start_async().await;
            server.mock(|when, then| {
                when.method(POST).path("/api/v1/websites");
                then.status(409)
                    .json_body(json!({ "detail": "Website with this slug already exists" }));
            });

            let client = catalog_client(&server);
            let err = client
                .create_website(&WebsiteCreate::default())
                .await
                .unwrap_err();

            assert_eq!(
                err.to_string(),
                "409 Conflict: Website with this slug already exists"
            );
        }

        #[tokio::test]
        async fn update_sends_only_changed_fields() {
            let server = MockServer::start_async().await;
            let mock = server.mock(|when, then| {
                when.method(PUT)
                    .path("/api/v1/websites/acme")
                    .json_body(json!({ "title": "Acme Inc" }));
                then.status(200).json_body(json!({
                    "id": 1,
                    "slug": "acme",
                    "title": "Acme Inc",
                    "created_at": "2024-05-01T10:00:00",
                }));
            });

            let client = catalog_client(&server);
            let website = client
                .update_website("acme", &WebsiteUpdate {
                    title: Some("Acme Inc".to_string()),
                    ..Default::default()
                })
                .await
                .unwrap();

            mock.assert();
            assert_eq!(website.summary.title, "Acme Inc");
        }

        #[tokio::test]
        async fn delete_accepts_empty_response() {
            let server = MockServer::start_async().await;
            let mock = server.mock(|when, then| {
                when.method(DELETE).path("/api/v1/websites/acme");
                then.status(204);
            });

            let client = catalog_client(&server);
            client.delete_website("acme").await.unwrap();

            mock.assert();
        }

        #[tokio::test]
        async fn server_error_without_json_body() {
            let server = MockServer::start_async().await;
            server.mock(|when, then| {
                when.method(GET).path("/api/v1/platforms");
                then.status(502).body("Bad Gateway");
            });

            let client = catalog_client(&server);
            let err = client.platforms().await.unwrap_err();

            assert!(
                matches!(err, CatalogClientError::Status { status, detail: None } if status == StatusCode::BAD_GATEWAY),
                "expected status error, got {err:?}"
            );
        }
    }
}
