use anyhow::{Result, bail};
use bpaf::Bpaf;
use gallery_rust_sdk::models::filters::FilterStateManager;
use gallery_rust_sdk::models::list_state::{ListState, ListStateContainer, ListingFetcher};
use gallery_rust_sdk::models::sequence::LoadOutcome;
use gallery_rust_sdk::providers::catalog::{FilterKey, FilterSet, Listing, Page};
use tracing::{debug, instrument};

use super::Gallery;
use crate::utils::message;
use crate::utils::render::{print_json, render_filters, render_page_footer, render_summaries};

// List websites for the active filters
#[derive(Debug, Bpaf, Clone)]
pub struct Browse {
    /// Display the page as JSON
    #[bpaf(long)]
    pub json: bool,

    /// Go to page N of the current listing
    #[bpaf(long, argument("N"))]
    pub page: Option<u32>,
}

impl Browse {
    #[instrument(name = "browse", skip_all, fields(page = self.page))]
    pub async fn handle(self, gallery: Gallery) -> Result<()> {
        let mut manager = FilterStateManager::new(gallery.load_history()?);

        if let Some(page) = self.page {
            if page == 0 {
                bail!("pages start at 1");
            }
            manager.set_page(page);
            gallery.save_history(manager.location())?;
        }

        let filters = manager.current();
        show_listing(gallery, Listing::Websites, &filters, self.json).await
    }
}

// Search websites
#[derive(Debug, Bpaf, Clone)]
pub struct Search {
    /// Display the page as JSON
    #[bpaf(long)]
    pub json: bool,

    /// Words to look for in titles and descriptions
    #[bpaf(positional("search-term"))]
    pub search_term: String,
}

impl Search {
    #[instrument(name = "search", skip_all, fields(search_term = self.search_term))]
    pub async fn handle(self, gallery: Gallery) -> Result<()> {
        let term = self.search_term.trim();
        if term.is_empty() {
            bail!("search term must not be empty");
        }

        let mut manager = FilterStateManager::new(gallery.load_history()?);
        manager.set_filter(FilterKey::Q, Some(term));
        gallery.save_history(manager.location())?;

        let filters = manager.current();
        show_listing(gallery, Listing::Search, &filters, self.json).await
    }
}

/// Load one page of `listing` through a list state container and print it
pub(super) async fn show_listing(
    gallery: Gallery,
    listing: Listing,
    filters: &FilterSet,
    json: bool,
) -> Result<()> {
    debug!(%listing, page = filters.page, "loading listing");
    let container = ListStateContainer::new(ListingFetcher::new(
        gallery.client,
        listing,
        gallery.page_size,
    ));

    let outcome = container.load(filters).await;
    let state = container.into_state();
    ensure_loaded(outcome, &state)?;

    let Some(meta) = state.meta else {
        bail!("loaded page has no pagination");
    };

    if json {
        return print_json(&Page {
            items: state.items,
            meta,
        });
    }

    let active = filters
        .active_filter_entries()
        .into_iter()
        .map(|(key, value)| (key, value.to_string()))
        .collect::<Vec<_>>();
    if !active.is_empty() {
        message::plain(format!("Filters: {}", render_filters(&active)));
    }

    if state.items.is_empty() {
        message::plain("No websites found.");
        if !active.is_empty() {
            message::plain("Use 'gallery filter clear' to see all websites.");
        }
        return Ok(());
    }

    println!("{}", render_summaries(&state.items));
    message::plain(render_page_footer(&meta));
    Ok(())
}

fn ensure_loaded<T>(outcome: LoadOutcome, state: &ListState<T>) -> Result<()> {
    match outcome {
        LoadOutcome::Loaded => Ok(()),
        LoadOutcome::Failed => bail!(
            "could not load websites: {}",
            state.error().unwrap_or("unknown error")
        ),
        LoadOutcome::Superseded => bail!("the listing was replaced by a newer load"),
    }
}
