use std::path::PathBuf;

use anyhow::{Context, bail};
use gallery_core::traceable_path;
use gallery_rust_sdk::providers::catalog::{
    CatalogClient,
    CatalogClientConfig,
    Client,
    GALLERY_CATALOG_MOCK_DATA_VAR,
    MockClient,
};
use tracing::debug;

use crate::config::Config;

/// Initialize the catalog client
///
/// - Initialize a mock client if the `_GALLERY_USE_CATALOG_MOCK` environment variable
///   points at a file of mock responses
/// - Initialize a real client otherwise
pub fn init_catalog_client(config: &Config) -> Result<Client, anyhow::Error> {
    if let Ok(path_str) = std::env::var(GALLERY_CATALOG_MOCK_DATA_VAR) {
        let path = PathBuf::from(path_str);
        if !path.exists() {
            bail!("path to mock data file doesn't exist: {}", path.display());
        }

        debug!(
            mock_data_path = traceable_path(&path),
            "using mock catalog client"
        );
        return Ok(MockClient::new(Some(path))?.into());
    }

    let mut extra_headers = config.gallery.extra_headers.clone();

    // Pass in a bool if we are running in CI, so requests can reflect this in the headers
    if std::env::var("CI").is_ok() {
        extra_headers.insert("gallery-ci".to_string(), "true".to_string());
    }

    let client_config = CatalogClientConfig {
        api_url: config.gallery.api_url.clone(),
        token: config
            .gallery
            .api_token
            .clone()
            .filter(|token| !token.is_empty()),
        extra_headers,
        user_agent: config.gallery.user_agent.clone(),
    };

    debug!("using catalog client with url: {}", client_config.api_url);
    let client = CatalogClient::new(client_config).context("could not create catalog client")?;
    Ok(client.into())
}
