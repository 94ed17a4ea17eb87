//! Catalog interaction types.
//!
//! These types represent the resources served by the catalog API
//! and the normalized pagination model shared by all listings.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// Pagination metadata in the single shape used throughout the client,
/// regardless of which envelope the server answered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub page_size: u32,
    pub total_items: u64,
    pub total_pages: u64,
}

impl PaginationMeta {
    /// Build metadata for a page, deriving the page count from the totals.
    pub fn new(page: u32, page_size: u32, total_items: u64) -> Self {
        let total_pages = if page_size > 0 {
            total_items.div_ceil(u64::from(page_size))
        } else {
            0
        };
        Self {
            page,
            page_size,
            total_items,
            total_pages,
        }
    }

    /// Build metadata from server provided values.
    ///
    /// The page count is recomputed as `ceil(total_items / page_size)`
    /// whenever `page_size` is positive.
    /// Otherwise the server's own count is kept.
    pub fn from_upstream(page: u32, page_size: u32, total_items: u64, upstream_pages: u64) -> Self {
        if page_size == 0 {
            return Self {
                page,
                page_size,
                total_items,
                total_pages: upstream_pages,
            };
        }

        let meta = Self::new(page, page_size, total_items);
        if meta.total_pages != upstream_pages {
            tracing::debug!(
                upstream_pages,
                computed_pages = meta.total_pages,
                "server page count disagrees with totals, using computed value"
            );
        }
        meta
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.page) < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// A single page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PaginationMeta,
}

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

/// The paginated website listings served by the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    /// All websites, narrowed by any combination of filters.
    Websites,
    /// Full text search, requires the `q` filter.
    Search,
    /// Websites of a single category.
    Category(String),
    /// Websites of a single style.
    Style(String),
    /// Websites of a single collection.
    Collection(String),
}

impl Listing {
    /// Path segments relative to the API base URL.
    pub fn segments(&self) -> Vec<&str> {
        match self {
            Listing::Websites => vec!["websites"],
            Listing::Search => vec!["search"],
            Listing::Category(slug) => vec!["categories", slug.as_str(), "websites"],
            Listing::Style(slug) => vec!["styles", slug.as_str(), "websites"],
            Listing::Collection(slug) => vec!["collections", slug.as_str(), "websites"],
        }
    }
}

impl Display for Listing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}", self.segments().join("/"))
    }
}

/// Unpaginated, size limited website lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    Featured,
    Latest,
    Popular,
}

impl Highlight {
    pub fn segment(&self) -> &'static str {
        match self {
            Highlight::Featured => "featured",
            Highlight::Latest => "latest",
            Highlight::Popular => "popular",
        }
    }
}

impl Display for Highlight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.segment())
    }
}

// ---------------------------------------------------------------------------
// Websites
// ---------------------------------------------------------------------------

/// A website as it appears in listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebsiteSummary {
    pub id: i64,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub original_url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub view_count: u64,
    pub created_at: String,
}

/// A website with its taxonomy associations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebsiteDetail {
    #[serde(flatten)]
    pub summary: WebsiteSummary,
    #[serde(default)]
    pub platform: Option<Platform>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub styles: Vec<Style>,
    #[serde(default)]
    pub collections: Vec<Collection>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Body of an admin website creation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebsiteCreate {
    pub title: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub is_featured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform_id: Option<i64>,
    pub category_ids: Vec<i64>,
    pub style_ids: Vec<i64>,
    pub collection_ids: Vec<i64>,
}

/// Body of an admin website update, only present fields are changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebsiteUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_featured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_ids: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_ids: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_ids: Option<Vec<i64>>,
}

impl WebsiteUpdate {
    pub fn is_empty(&self) -> bool {
        self == &WebsiteUpdate::default()
    }
}

// ---------------------------------------------------------------------------
// Taxonomy
// ---------------------------------------------------------------------------

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(default)]
    pub website_count: u64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub id: i64,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub website_count: u64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: i64,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub website_count: u64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub id: i64,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub website_url: Option<String>,
    #[serde(default)]
    pub website_count: u64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

// ---------------------------------------------------------------------------
// Error bodies
// ---------------------------------------------------------------------------

/// The `{"detail": ...}` body the API attaches to error responses.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ErrorResponse {
    pub detail: ErrorDetail,
}

/// Error detail is either a plain message or a list of per-field errors.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Message(String),
    Fields(Vec<FieldError>),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FieldError {
    #[serde(default)]
    pub loc: Vec<serde_json::Value>,
    pub msg: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

impl Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let loc = self
            .loc
            .iter()
            .map(|part| match part {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(".");
        if loc.is_empty() {
            write!(f, "{}", self.msg)
        } else {
            write!(f, "{loc}: {}", self.msg)
        }
    }
}

impl Display for ErrorDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorDetail::Message(message) => f.write_str(message),
            ErrorDetail::Fields(fields) => {
                let rendered = fields
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ");
                f.write_str(&rendered)
            },
        }
    }
}
