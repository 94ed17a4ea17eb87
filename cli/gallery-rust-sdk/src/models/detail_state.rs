//! The detail state container, holding a single website.
//!
//! Sequenced like the list container, but a failed load clears the
//! current website instead of keeping a stale one.

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use gallery_catalog::types::WebsiteDetail;
use tracing::debug;

use super::sequence::{LoadOutcome, LoadStatus, Sequencer};
use crate::providers::catalog::ClientTrait;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailState {
    pub website: Option<WebsiteDetail>,
    pub status: LoadStatus,
}

impl DetailState {
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

pub struct DetailStateContainer<C> {
    client: C,
    state: Mutex<DetailState>,
    sequence: Sequencer,
}

impl<C: ClientTrait> DetailStateContainer<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            state: Mutex::new(DetailState::default()),
            sequence: Sequencer::new(),
        }
    }

    pub fn state(&self) -> DetailState {
        self.lock_state().clone()
    }

    pub fn into_state(self) -> DetailState {
        self.state.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_state(&self) -> MutexGuard<'_, DetailState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Load the website with `slug`, sequenced at call time.
    pub fn load<'a>(&'a self, slug: &'a str) -> impl Future<Output = LoadOutcome> + 'a {
        let ticket = self.sequence.next();
        debug!(seq = ticket.seq(), slug, "starting detail load");
        self.lock_state().status = LoadStatus::Loading;

        async move {
            let result = self.client.get_website(slug).await;

            let mut state = self.lock_state();
            if !self.sequence.is_latest(ticket) {
                debug!(seq = ticket.seq(), "discarding superseded detail");
                return LoadOutcome::Superseded;
            }

            match result {
                Ok(website) => {
                    state.website = Some(website);
                    state.status = LoadStatus::Loaded;
                    LoadOutcome::Loaded
                },
                Err(err) => {
                    debug!(seq = ticket.seq(), error = %err, "detail load failed");
                    state.website = None;
                    state.status = LoadStatus::Failed(err.to_string());
                    LoadOutcome::Failed
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::providers::catalog::MockClient;
    use crate::providers::catalog::test_helpers::website_detail;

    #[tokio::test]
    async fn failure_clears_current_website() {
        let client = MockClient::default();
        client.push_response(&website_detail("acme"));
        client.push_error_response(404, "Website not found");
        let container = DetailStateContainer::new(client);

        assert_eq!(container.load("acme").await, LoadOutcome::Loaded);
        assert_eq!(
            container.state().website.map(|w| w.summary.slug),
            Some("acme".to_string())
        );

        assert_eq!(container.load("gone").await, LoadOutcome::Failed);
        let state = container.into_state();
        assert_eq!(state.website, None);
        assert_eq!(state.error(), Some("404 Not Found: Website not found"));
    }

    #[tokio::test]
    async fn poisoned_lock_is_recovered() {
        let client = MockClient::default();
        client.push_response(&website_detail("acme"));
        let container = DetailStateContainer::new(client);

        std::thread::scope(|scope| {
            let result = scope
                .spawn(|| {
                    let _state = container.state.lock().unwrap();
                    panic!("panicked while holding the state lock");
                })
                .join();
            assert!(result.is_err());
        });
        assert!(container.state.is_poisoned());

        assert_eq!(container.load("acme").await, LoadOutcome::Loaded);
        assert_eq!(container.state().status, LoadStatus::Loaded);
    }

    #[tokio::test]
    async fn overlapping_loads_keep_the_last_one() {
        let client = MockClient::default();
        client.push_response(&website_detail("first"));
        client.push_response(&website_detail("second"));
        let container = DetailStateContainer::new(client);

        let first = container.load("first");
        let second = container.load("second");
        let (first, second) = futures::join!(first, second);

        assert_eq!(first, LoadOutcome::Superseded);
        assert_eq!(second, LoadOutcome::Loaded);
        assert_eq!(
            container.state().website.map(|w| w.summary.slug),
            Some("second".to_string())
        );
    }
}
