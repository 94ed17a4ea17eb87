use std::collections::{BTreeMap, HashMap};
use std::env;
use std::fs;
use std::num::NonZeroU32;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use config::{Config as HierarchicalConfig, Environment};
use gallery_rust_sdk::providers::catalog::{DEFAULT_API_URL, DEFAULT_PAGE_SIZE};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Name of gallery managed directories (config, data, cache, state)
pub const GALLERY_DIR_NAME: &str = "gallery";
pub const GALLERY_CONFIG_DIR_VAR: &str = "GALLERY_CONFIG_DIR";
pub const GALLERY_CONFIG_FILE: &str = "gallery.toml";

/// Largest page size and highlight limit the API accepts
pub const MAX_PAGE_SIZE: u32 = 100;
pub const DEFAULT_HIGHLIGHTS_LIMIT: u32 = 20;

#[derive(Clone, Debug, Deserialize, Default, Serialize)]
pub struct Config {
    /// gallery configuration options
    #[serde(default, flatten)]
    pub gallery: GalleryConfig,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct GalleryConfig {
    /// Directory for ephemeral data (default: `$XDG_CACHE_HOME/gallery`)
    pub cache_dir: PathBuf,
    /// Directory for persistent data such as credentials
    /// (default: `$XDG_DATA_HOME/gallery`)
    pub data_dir: PathBuf,
    /// Directory for the navigation history (default: `$XDG_STATE_HOME/gallery`)
    pub state_dir: PathBuf,
    /// Directory the configuration file is read from (default: `$XDG_CONFIG_HOME/gallery`)
    pub config_dir: PathBuf,

    /// Base URL of the catalog API, including the version prefix
    pub api_url: String,

    /// How many websites a listing page shows
    pub page_size: u32,

    /// How many websites `featured`, `latest` and `popular` show
    pub highlights_limit: u32,

    /// User agent sent with every request
    pub user_agent: Option<String>,

    /// Additional headers sent with every request
    #[serde(default)]
    pub extra_headers: BTreeMap<String, String>,

    /// Token for the admin API.
    ///
    /// Takes precedence over the token stored by `gallery auth login`.
    pub api_token: Option<String>,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::new(),
            data_dir: PathBuf::new(),
            state_dir: PathBuf::new(),
            config_dir: PathBuf::new(),
            api_url: DEFAULT_API_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE.get(),
            highlights_limit: DEFAULT_HIGHLIGHTS_LIMIT,
            user_agent: None,
            extra_headers: BTreeMap::new(),
            api_token: None,
        }
    }
}

impl GalleryConfig {
    /// The validated page size
    pub fn page_size(&self) -> Result<NonZeroU32> {
        bounded("page_size", self.page_size)
    }

    /// The validated highlight limit
    pub fn highlights_limit(&self) -> Result<NonZeroU32> {
        bounded("highlights_limit", self.highlights_limit)
    }
}

fn bounded(key: &str, value: u32) -> Result<NonZeroU32> {
    match NonZeroU32::new(value) {
        Some(value) if value.get() <= MAX_PAGE_SIZE => Ok(value),
        _ => bail!("'{key}' must be between 1 and {MAX_PAGE_SIZE}, got {value}"),
    }
}

/// Resolve `$XDG_*_HOME/gallery` style directories
fn gallery_dir(base: Option<PathBuf>, name: &str) -> Result<PathBuf> {
    base.map(|base| base.join(GALLERY_DIR_NAME))
        .with_context(|| format!("could not determine {name} directory"))
}

/// Config files in `$XDG_CONFIG_DIRS`, most important first
fn system_config_files() -> Vec<PathBuf> {
    let dirs = env::var("XDG_CONFIG_DIRS")
        .ok()
        .filter(|dirs| !dirs.is_empty())
        .unwrap_or_else(|| "/etc/xdg".to_string());

    env::split_paths(&dirs)
        .map(|dir| dir.join(GALLERY_DIR_NAME).join(GALLERY_CONFIG_FILE))
        .filter(|file| file.exists())
        .collect()
}

fn toml_source(path: PathBuf) -> impl config::Source + Send + Sync + 'static {
    config::File::from(path)
        .format(config::FileFormat::Toml)
        .required(false)
}

impl Config {
    fn read_raw_config() -> Result<HierarchicalConfig> {
        let cache_dir = gallery_dir(dirs::cache_dir(), "cache")?;
        let data_dir = gallery_dir(dirs::data_dir(), "data")?;
        // not every platform has a state directory
        let state_dir = match dirs::state_dir() {
            Some(state_dir) => state_dir.join(GALLERY_DIR_NAME),
            None => data_dir.join("state"),
        };

        let config_dir = match env::var(GALLERY_CONFIG_DIR_VAR) {
            Ok(v) => {
                debug!("`${GALLERY_CONFIG_DIR_VAR}` set: {v}");
                PathBuf::from(v)
            },
            Err(_) => {
                let config_dir = gallery_dir(dirs::config_dir(), "config")?;
                debug!("`${GALLERY_CONFIG_DIR_VAR}` not set, using {config_dir:?}");
                config_dir
            },
        };
        fs::create_dir_all(&config_dir)
            .with_context(|| format!("Could not create config directory: {config_dir:?}"))?;

        let mut builder = HierarchicalConfig::builder()
            .set_default("cache_dir", cache_dir.to_string_lossy().as_ref())?
            .set_default("data_dir", data_dir.to_string_lossy().as_ref())?
            .set_default("state_dir", state_dir.to_string_lossy().as_ref())?
            .set_default("api_url", DEFAULT_API_URL)?
            .set_default("page_size", i64::from(DEFAULT_PAGE_SIZE.get()))?
            .set_default("highlights_limit", i64::from(DEFAULT_HIGHLIGHTS_LIMIT))?
            // Config dir is added to the config for completeness;
            // the config file cannot change the config dir.
            .set_override("config_dir", config_dir.to_string_lossy().as_ref())?;

        // read from /etc
        builder = builder.add_source(toml_source(PathBuf::from("/etc").join(GALLERY_CONFIG_FILE)));

        // look for files in XDG_CONFIG_DIRS locations, least important first
        for file in system_config_files().into_iter().rev() {
            builder = builder.add_source(toml_source(file));
        }

        // Add explicit GALLERY_CONFIG_DIR file last
        builder = builder.add_source(toml_source(config_dir.join(GALLERY_CONFIG_FILE)));

        // override via env variables
        let gallery_envs = env::vars()
            .filter_map(|(k, v)| k.strip_prefix("GALLERY_").map(|k| (k.to_owned(), v)))
            .collect::<HashMap<_, _>>();

        let builder = builder.add_source(
            Environment::default()
                .source(Some(gallery_envs))
                .try_parsing(true),
        );

        Ok(builder.build()?)
    }

    /// Creates a [Config] from the environment and config files
    pub fn parse() -> Result<Config> {
        let cli_config: Config = Self::read_raw_config()?
            .try_deserialize()
            .context("Could not parse config")?;

        cli_config.gallery.page_size()?;
        cli_config.gallery.highlights_limit()?;

        Ok(cli_config)
    }
}
