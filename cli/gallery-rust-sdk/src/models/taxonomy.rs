//! Cache of the filter vocabularies: categories, styles, collections and platforms.

use gallery_catalog::types::{Category, Collection, Platform, Style};
use gallery_catalog::{CatalogClientError, FilterKey};
use tracing::{debug, warn};

use crate::providers::catalog::ClientTrait;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaxonomyCache {
    pub categories: Vec<Category>,
    pub styles: Vec<Style>,
    pub collections: Vec<Collection>,
    pub platforms: Vec<Platform>,
    loaded: bool,
}

impl TaxonomyCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Fetch all four lists concurrently.
    ///
    /// Does nothing once loaded. A failure leaves the cache empty,
    /// so a later call tries again.
    pub async fn load_all(&mut self, client: &impl ClientTrait) -> Result<(), CatalogClientError> {
        if self.loaded {
            return Ok(());
        }

        let result = futures::try_join!(
            client.categories(),
            client.styles(),
            client.collections(),
            client.platforms(),
        );

        match result {
            Ok((categories, styles, collections, platforms)) => {
                debug!(
                    categories = categories.len(),
                    styles = styles.len(),
                    collections = collections.len(),
                    platforms = platforms.len(),
                    "loaded taxonomy"
                );
                self.categories = categories;
                self.styles = styles;
                self.collections = collections;
                self.platforms = platforms;
                self.loaded = true;
                Ok(())
            },
            Err(err) => {
                warn!(error = %err, "failed to load filter data");
                Err(err)
            },
        }
    }

    pub fn category_by_slug(&self, slug: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.slug == slug)
    }

    pub fn style_by_slug(&self, slug: &str) -> Option<&Style> {
        self.styles.iter().find(|s| s.slug == slug)
    }

    pub fn collection_by_slug(&self, slug: &str) -> Option<&Collection> {
        self.collections.iter().find(|c| c.slug == slug)
    }

    pub fn platform_by_slug(&self, slug: &str) -> Option<&Platform> {
        self.platforms.iter().find(|p| p.slug == slug)
    }

    /// Whether `slug` is a known value for the filter `key`.
    /// Always false for `q` and `page`, which are not taxonomies.
    pub fn contains(&self, key: FilterKey, slug: &str) -> bool {
        match key {
            FilterKey::Category => self.category_by_slug(slug).is_some(),
            FilterKey::Style => self.style_by_slug(slug).is_some(),
            FilterKey::Collection => self.collection_by_slug(slug).is_some(),
            FilterKey::Platform => self.platform_by_slug(slug).is_some(),
            FilterKey::Q | FilterKey::Page => false,
        }
    }
}
