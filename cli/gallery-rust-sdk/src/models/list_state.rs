//! The list state container.
//!
//! Holds the last fetched page of a listing and coordinates fetches
//! triggered by filter changes. Loads may overlap, only the result of
//! the most recently started load is ever committed.

use std::future::Future;
use std::num::NonZeroU32;
use std::sync::{Mutex, MutexGuard, PoisonError};

use gallery_catalog::{CatalogClientError, FilterSet, Listing, Page, PaginationMeta};
use gallery_catalog::types::WebsiteSummary;
use tracing::{debug, instrument};

use super::sequence::{LoadOutcome, LoadStatus, Sequencer, Ticket};
use crate::providers::catalog::ClientTrait;

/// Fetches one page for a set of filters.
#[allow(async_fn_in_trait)]
pub trait PageFetcher {
    type Item;

    async fn fetch(&self, filters: &FilterSet) -> Result<Page<Self::Item>, CatalogClientError>;
}

/// Fetches pages of one [Listing] through a catalog client.
#[derive(Debug)]
pub struct ListingFetcher<C> {
    client: C,
    listing: Listing,
    page_size: NonZeroU32,
}

impl<C: ClientTrait> ListingFetcher<C> {
    pub fn new(client: C, listing: Listing, page_size: NonZeroU32) -> Self {
        Self {
            client,
            listing,
            page_size,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }
}

impl<C: ClientTrait> PageFetcher for ListingFetcher<C> {
    type Item = WebsiteSummary;

    async fn fetch(&self, filters: &FilterSet) -> Result<Page<WebsiteSummary>, CatalogClientError> {
        self.client
            .fetch_page(&self.listing, filters, self.page_size)
            .await
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListState<T> {
    pub items: Vec<T>,
    pub meta: Option<PaginationMeta>,
    pub status: LoadStatus,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            meta: None,
            status: LoadStatus::Idle,
        }
    }
}

impl<T> ListState<T> {
    pub fn loading(&self) -> bool {
        self.status == LoadStatus::Loading
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            LoadStatus::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Owns a [ListState] and the only way to change it, [ListStateContainer::load].
///
/// On failure the previous items and metadata are kept next to the error.
pub struct ListStateContainer<F: PageFetcher> {
    fetcher: F,
    state: Mutex<ListState<F::Item>>,
    sequence: Sequencer,
}

impl<F: PageFetcher> ListStateContainer<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            state: Mutex::new(ListState::default()),
            sequence: Sequencer::new(),
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// A snapshot of the current state.
    pub fn state(&self) -> ListState<F::Item>
    where
        F::Item: Clone,
    {
        self.lock_state().clone()
    }

    /// Consume the container, returning its final state.
    pub fn into_state(self) -> ListState<F::Item> {
        self.state.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    /// Load the page for `filters`.
    ///
    /// The load is sequenced when this is called, not when the returned
    /// future is first polled, so overlapping loads resolve in call order.
    pub fn load<'a>(&'a self, filters: &'a FilterSet) -> impl Future<Output = LoadOutcome> + 'a {
        let ticket = self.begin();
        async move {
            let result = self.fetcher.fetch(filters).await;
            self.commit(ticket, result)
        }
    }

    /// Lock the state, ignoring poisoning. The state is plain data
    /// and every write leaves it consistent.
    fn lock_state(&self) -> MutexGuard<'_, ListState<F::Item>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self) -> Ticket {
        let ticket = self.sequence.next();
        debug!(seq = ticket.seq(), "starting list load");
        self.lock_state().status = LoadStatus::Loading;
        ticket
    }

    #[instrument(skip_all, fields(seq = ticket.seq()))]
    fn commit(
        &self,
        ticket: Ticket,
        result: Result<Page<F::Item>, CatalogClientError>,
    ) -> LoadOutcome {
        let mut state = self.lock_state();
        if !self.sequence.is_latest(ticket) {
            debug!("discarding superseded result");
            return LoadOutcome::Superseded;
        }

        match result {
            Ok(page) => {
                debug!(items = page.items.len(), "committing page");
                state.items = page.items;
                state.meta = Some(page.meta);
                state.status = LoadStatus::Loaded;
                LoadOutcome::Loaded
            },
            Err(err) => {
                debug!(error = %err, "load failed, keeping previous items");
                state.status = LoadStatus::Failed(err.to_string());
                LoadOutcome::Failed
            },
        }
    }
}
