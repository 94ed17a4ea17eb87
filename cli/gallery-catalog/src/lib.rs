//! HTTP client infrastructure for the gallery catalog API.
//!
//! This crate provides:
//! - HTTP client construction with bearer token authentication
//! - Common error handling for catalog API operations
//! - The typed filter vocabulary and its query-string codec
//! - Normalization of the paginated response shapes served by the API
//!
//! ## Usage
//!
//! ```ignore
//! use gallery_catalog::types::WebsiteSummary;
//! use gallery_catalog::{CatalogClient, CatalogClientConfig, DEFAULT_PAGE_SIZE, FilterSet, Listing, Page};
//!
//! let config = CatalogClientConfig {
//!     api_url: "http://localhost:8000/api/v1".to_string(),
//!     token: None,
//!     extra_headers: BTreeMap::new(),
//!     user_agent: None,
//! };
//!
//! let client = CatalogClient::new(config)?;
//! let params = FilterSet::default().request_params(DEFAULT_PAGE_SIZE);
//! let page: Page<WebsiteSummary> = client.get_page(&Listing::Websites.segments(), &params).await?;
//! ```

mod client;
mod config;
pub mod envelope;
mod error;
pub mod query;
pub mod types;

pub use client::{CatalogClient, DEFAULT_API_URL, DEFAULT_PAGE_SIZE, RequestKind};
pub use config::CatalogClientConfig;
pub use error::{CatalogClientError, DecodeError};
pub use query::{FilterKey, FilterSet, Query};
pub use types::{Highlight, Listing, Page, PaginationMeta};
