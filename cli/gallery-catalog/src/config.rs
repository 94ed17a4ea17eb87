//! Configuration types for catalog client construction.

use std::collections::BTreeMap;

/// Configuration for catalog client construction.
#[derive(Debug, Clone, Default)]
pub struct CatalogClientConfig {
    /// Base URL for the catalog API, including the version prefix.
    pub api_url: String,
    /// Optional bearer token for the admin API.
    pub token: Option<String>,
    /// Additional headers to include in requests.
    pub extra_headers: BTreeMap<String, String>,
    /// Custom user agent for requests.
    pub user_agent: Option<String>,
}
