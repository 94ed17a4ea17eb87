//! Filter state derived from the current location.

use gallery_catalog::query::{self, DEFAULT_PAGE};
use gallery_catalog::{FilterKey, FilterSet};
use tracing::debug;

use super::location::Location;

/// Reads and changes the active filters through a [Location].
///
/// The manager holds no filter state of its own:
/// every read decodes the current query and every change pushes a new one.
#[derive(Debug, Clone, Default)]
pub struct FilterStateManager<L> {
    location: L,
}

impl<L: Location> FilterStateManager<L> {
    pub fn new(location: L) -> Self {
        Self { location }
    }

    pub fn location(&self) -> &L {
        &self.location
    }

    pub fn location_mut(&mut self) -> &mut L {
        &mut self.location
    }

    pub fn into_location(self) -> L {
        self.location
    }

    /// The filters of the current location.
    pub fn current(&self) -> FilterSet {
        query::decode(self.location.query())
    }

    /// Set or clear a single filter.
    ///
    /// An empty or missing value removes the key.
    /// Changing any key other than `page` also resets the page.
    pub fn set_filter(&mut self, key: FilterKey, value: Option<&str>) {
        let mut next = self.location.query().clone();
        match value.filter(|value| !value.is_empty()) {
            Some(value) => next.set_key(key, value),
            None => {
                next.remove_key(key);
            },
        }

        if key == FilterKey::Page {
            // page 1 is implicit
            if query::decode(&next).page == DEFAULT_PAGE {
                next.remove_key(FilterKey::Page);
            }
        } else {
            next.remove_key(FilterKey::Page);
        }

        debug!(%key, ?value, query = %next, "pushing filter change");
        self.location.push(next);
    }

    pub fn remove_filter(&mut self, key: FilterKey) {
        self.set_filter(key, None);
    }

    pub fn set_page(&mut self, page: u32) {
        self.set_filter(FilterKey::Page, Some(&page.to_string()));
    }

    /// Remove every recognized key, keeping unrelated parameters.
    pub fn clear_filters(&mut self) {
        let mut next = self.location.query().clone();
        for key in FilterKey::ALL {
            next.remove_key(key);
        }
        debug!(query = %next, "clearing filters");
        self.location.push(next);
    }

    pub fn has_active_filters(&self) -> bool {
        self.current().has_active_filters()
    }

    /// The set filters other than `page`, in declaration order.
    pub fn active_filter_entries(&self) -> Vec<(FilterKey, String)> {
        self.current()
            .active_filter_entries()
            .into_iter()
            .map(|(key, value)| (key, value.to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use gallery_catalog::Query;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;
    use crate::models::location::History;

    fn manager(query: &str) -> FilterStateManager<History> {
        FilterStateManager::new(History::new(Query::parse(query)))
    }

    fn non_page_key() -> impl Strategy<Value = FilterKey> {
        proptest::sample::select(FilterKey::FILTERS.to_vec())
    }

    proptest! {
        #[test]
        fn changing_a_filter_resets_the_page(
            page in 1u32..1000,
            key in non_page_key(),
            value in proptest::option::of("[a-z]{0,8}"),
        ) {
            let mut filters = manager("category=minimal");
            filters.set_page(page);
            filters.set_filter(key, value.as_deref());
            prop_assert_eq!(filters.current().page, 1);
        }

        #[test]
        fn active_filter_views_agree(query in "(category|style|q|page|other)=[a-z0-9]{0,4}(&(collection|platform|page)=[a-z0-9]{0,4})?") {
            let filters = manager(&query);
            prop_assert_eq!(
                filters.has_active_filters(),
                !filters.active_filter_entries().is_empty()
            );
        }
    }

    #[test]
    fn setting_style_keeps_category_and_resets_page() {
        let mut filters = manager("category=minimal&page=3");
        filters.set_filter(FilterKey::Style, Some("dark"));

        assert_eq!(filters.current(), FilterSet {
            category: Some("minimal".to_string()),
            style: Some("dark".to_string()),
            ..Default::default()
        });
        assert_eq!(
            filters.location().query().to_query_string(),
            "category=minimal&style=dark"
        );
    }

    #[test]
    fn empty_value_removes_the_key() {
        let mut filters = manager("q=hero&platform=webflow");
        filters.set_filter(FilterKey::Q, Some(""));
        assert_eq!(
            filters.location().query().to_query_string(),
            "platform=webflow"
        );

        filters.remove_filter(FilterKey::Platform);
        assert!(!filters.has_active_filters());
    }

    #[test]
    fn page_one_is_not_written() {
        let mut filters = manager("style=dark&page=4");
        filters.set_page(1);
        assert_eq!(filters.location().query().to_query_string(), "style=dark");

        filters.set_page(2);
        assert_eq!(
            filters.location().query().to_query_string(),
            "style=dark&page=2"
        );
    }

    #[test]
    fn clear_keeps_unrecognized_keys() {
        let mut filters = manager("ref=newsletter&category=saas&q=x&page=5");
        filters.clear_filters();

        assert_eq!(filters.current(), FilterSet::default());
        assert_eq!(
            filters.location().query().to_query_string(),
            "ref=newsletter"
        );
    }

    #[test]
    fn every_change_is_a_history_entry() {
        let mut filters = manager("");
        filters.set_filter(FilterKey::Category, Some("saas"));
        filters.set_page(2);

        let history = filters.location_mut();
        assert_eq!(history.len(), 3);
        assert!(history.back());
        assert_eq!(history.query().to_query_string(), "category=saas");

        assert_eq!(filters.current().page, 1);
    }

    #[test]
    fn active_entries_are_owned_and_ordered() {
        let filters = manager("q=hero&collection=portfolios&category=saas");
        assert_eq!(filters.active_filter_entries(), vec![
            (FilterKey::Category, "saas".to_string()),
            (FilterKey::Collection, "portfolios".to_string()),
            (FilterKey::Q, "hero".to_string()),
        ]);
    }
}
