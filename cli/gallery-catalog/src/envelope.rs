//! Normalization of paginated response bodies.
//!
//! The catalog has served pages in two shapes over time:
//!
//! ```text
//! { "items": [...], "page": 1, "size": 20, "total": 45, "pages": 3 }
//! { "data": [...], "meta": { "page": 1, "per_page": 20, "total": 45, "total_pages": 3 } }
//! ```
//!
//! Both are accepted and turned into a [Page].
//! The shape is detected by the presence of the `items` or `data` key.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::DecodeError;
use crate::types::{Page, PaginationMeta};

/// The envelope a paginated body arrived in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeShape {
    /// `{items, page, size, total, pages}`
    Items,
    /// `{data, meta: {page, per_page, total, total_pages}}`
    Data,
}

impl EnvelopeShape {
    /// Detect the shape of a body by key presence.
    /// `items` wins if a body carries both keys.
    pub fn detect(body: &Value) -> Option<Self> {
        let object = body.as_object()?;
        if object.contains_key("items") {
            Some(EnvelopeShape::Items)
        } else if object.contains_key("data") {
            Some(EnvelopeShape::Data)
        } else {
            None
        }
    }

    fn name(&self) -> &'static str {
        match self {
            EnvelopeShape::Items => "items",
            EnvelopeShape::Data => "data",
        }
    }
}

#[derive(Debug, Deserialize)]
struct ItemsEnvelope<T> {
    items: Vec<T>,
    page: u32,
    size: u32,
    total: u64,
    #[serde(default)]
    pages: u64,
}

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: Vec<T>,
    meta: DataMeta,
}

#[derive(Debug, Deserialize)]
struct DataMeta {
    page: u32,
    per_page: u32,
    total: u64,
    #[serde(default)]
    total_pages: u64,
}

/// Turn a paginated body of either shape into a [Page].
pub fn normalize_page<T: DeserializeOwned>(body: Value) -> Result<Page<T>, DecodeError> {
    let Some(shape) = EnvelopeShape::detect(&body) else {
        return Err(DecodeError::UnknownEnvelope);
    };

    let malformed = |source| DecodeError::Envelope {
        shape: shape.name(),
        source,
    };

    let page = match shape {
        EnvelopeShape::Items => {
            let envelope: ItemsEnvelope<T> = serde_json::from_value(body).map_err(malformed)?;
            Page {
                items: envelope.items,
                meta: PaginationMeta::from_upstream(
                    envelope.page,
                    envelope.size,
                    envelope.total,
                    envelope.pages,
                ),
            }
        },
        EnvelopeShape::Data => {
            let envelope: DataEnvelope<T> = serde_json::from_value(body).map_err(malformed)?;
            Page {
                items: envelope.data,
                meta: PaginationMeta::from_upstream(
                    envelope.meta.page,
                    envelope.meta.per_page,
                    envelope.meta.total,
                    envelope.meta.total_pages,
                ),
            }
        },
    };

    tracing::trace!(
        shape = shape.name(),
        items = page.items.len(),
        total_items = page.meta.total_items,
        "normalized page"
    );

    Ok(page)
}
