//! The filter vocabulary of the catalog and its query-string codec.
//!
//! A [FilterSet] is never stored on its own, it is decoded from the
//! [Query] of the current location whenever it is needed
//! and encoded back into a [Query] when a filter changes.

use std::fmt::Display;
use std::num::NonZeroU32;
use std::str::FromStr;

use derive_more::{Deref, DerefMut, From};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The implicit page of a filter set without a `page` key.
pub const DEFAULT_PAGE: u32 = 1;

/// Keys recognized in a catalog query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterKey {
    Category,
    Style,
    Collection,
    Platform,
    Q,
    Page,
}

impl FilterKey {
    /// All filters except `page`, in declaration order.
    pub const FILTERS: [FilterKey; 5] = [
        FilterKey::Category,
        FilterKey::Style,
        FilterKey::Collection,
        FilterKey::Platform,
        FilterKey::Q,
    ];

    pub const ALL: [FilterKey; 6] = [
        FilterKey::Category,
        FilterKey::Style,
        FilterKey::Collection,
        FilterKey::Platform,
        FilterKey::Q,
        FilterKey::Page,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKey::Category => "category",
            FilterKey::Style => "style",
            FilterKey::Collection => "collection",
            FilterKey::Platform => "platform",
            FilterKey::Q => "q",
            FilterKey::Page => "page",
        }
    }
}

impl Display for FilterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown filter '{0}', expected one of: category, style, collection, platform, q, page")]
pub struct UnknownFilterKey(String);

impl FromStr for FilterKey {
    type Err = UnknownFilterKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| UnknownFilterKey(s.to_string()))
    }
}

/// An ordered string map of query parameters.
///
/// Keys that are not [FilterKey]s are kept as they are,
/// so a location can carry parameters the catalog does not know about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref, DerefMut, From, Serialize, Deserialize)]
pub struct Query(IndexMap<String, String>);

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an `application/x-www-form-urlencoded` string.
    /// A leading `?` is ignored.
    pub fn parse(input: &str) -> Self {
        let input = input.strip_prefix('?').unwrap_or(input);
        url::form_urlencoded::parse(input.as_bytes())
            .into_owned()
            .collect()
    }

    /// Render as an `application/x-www-form-urlencoded` string.
    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.0.iter())
            .finish()
    }

    pub fn get_key(&self, key: FilterKey) -> Option<&str> {
        self.0.get(key.as_str()).map(String::as_str)
    }

    pub fn set_key(&mut self, key: FilterKey, value: impl Into<String>) {
        self.0.insert(key.as_str().to_string(), value.into());
    }

    /// Remove a key, keeping the order of the remaining keys.
    pub fn remove_key(&mut self, key: FilterKey) -> Option<String> {
        self.0.shift_remove(key.as_str())
    }
}

impl Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Query {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Query(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// The typed filters of a catalog listing.
///
/// `None` and `Some("")` both mean "unset".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSet {
    pub category: Option<String>,
    pub style: Option<String>,
    pub collection: Option<String>,
    pub platform: Option<String>,
    pub q: Option<String>,
    pub page: u32,
}

impl Default for FilterSet {
    fn default() -> Self {
        Self {
            category: None,
            style: None,
            collection: None,
            platform: None,
            q: None,
            page: DEFAULT_PAGE,
        }
    }
}

impl FilterSet {
    /// The value of a non-page filter, if set and non-empty.
    pub fn filter(&self, key: FilterKey) -> Option<&str> {
        let value = match key {
            FilterKey::Category => &self.category,
            FilterKey::Style => &self.style,
            FilterKey::Collection => &self.collection,
            FilterKey::Platform => &self.platform,
            FilterKey::Q => &self.q,
            FilterKey::Page => return None,
        };
        value.as_deref().filter(|value| !value.is_empty())
    }

    fn filter_mut(&mut self, key: FilterKey) -> Option<&mut Option<String>> {
        match key {
            FilterKey::Category => Some(&mut self.category),
            FilterKey::Style => Some(&mut self.style),
            FilterKey::Collection => Some(&mut self.collection),
            FilterKey::Platform => Some(&mut self.platform),
            FilterKey::Q => Some(&mut self.q),
            FilterKey::Page => None,
        }
    }

    /// Return a copy with `key` set to `value`.
    ///
    /// Setting [FilterKey::Page] parses `value`
    /// and falls back to the default page on failure.
    pub fn with(mut self, key: FilterKey, value: impl Into<String>) -> Self {
        let value = value.into();
        match self.filter_mut(key) {
            Some(slot) => *slot = Some(value),
            None => self.page = parse_page(Some(&value)),
        }
        self
    }

    /// Clear empty strings to unset and lift page 0 to the default page.
    pub fn normalize(mut self) -> Self {
        for key in FilterKey::FILTERS {
            if let Some(slot) = self.filter_mut(key) {
                if slot.as_deref() == Some("") {
                    *slot = None;
                }
            }
        }
        if self.page < DEFAULT_PAGE {
            self.page = DEFAULT_PAGE;
        }
        self
    }

    /// Whether any filter other than `page` is set.
    pub fn has_active_filters(&self) -> bool {
        FilterKey::FILTERS
            .into_iter()
            .any(|key| self.filter(key).is_some())
    }

    /// All set filters other than `page`, in declaration order.
    pub fn active_filter_entries(&self) -> Vec<(FilterKey, &str)> {
        FilterKey::FILTERS
            .into_iter()
            .filter_map(|key| self.filter(key).map(|value| (key, value)))
            .collect()
    }

    /// Request parameters for a paginated fetch.
    ///
    /// Unlike [encode], `page` is always included.
    pub fn request_params(&self, page_size: NonZeroU32) -> Vec<(&'static str, String)> {
        let mut params = vec![
            (FilterKey::Page.as_str(), self.page.max(DEFAULT_PAGE).to_string()),
            ("size", page_size.to_string()),
        ];
        params.extend(
            self.active_filter_entries()
                .into_iter()
                .map(|(key, value)| (key.as_str(), value.to_string())),
        );
        params
    }
}

/// Encode a filter set into query parameters.
///
/// Unset and empty filters are omitted, `page` is omitted unless it is past the first page.
pub fn encode(filters: &FilterSet) -> Query {
    let mut query = Query::new();
    for (key, value) in filters.active_filter_entries() {
        query.set_key(key, value);
    }
    if filters.page > DEFAULT_PAGE {
        query.set_key(FilterKey::Page, filters.page.to_string());
    }
    query
}

/// Decode query parameters into a filter set. Never fails.
///
/// Unknown keys are ignored, a missing, malformed or zero `page` decodes to the default page.
pub fn decode(query: &Query) -> FilterSet {
    let value = |key: FilterKey| {
        query
            .get_key(key)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };

    FilterSet {
        category: value(FilterKey::Category),
        style: value(FilterKey::Style),
        collection: value(FilterKey::Collection),
        platform: value(FilterKey::Platform),
        q: value(FilterKey::Q),
        page: parse_page(query.get_key(FilterKey::Page)),
    }
}

fn parse_page(value: Option<&str>) -> u32 {
    value
        .and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|page| *page >= DEFAULT_PAGE)
        .unwrap_or(DEFAULT_PAGE)
}
