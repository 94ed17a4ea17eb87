use std::num::NonZeroU32;

use anyhow::{Context, Result, bail};
use bpaf::Bpaf;
use gallery_rust_sdk::providers::catalog::{ClientTrait, Highlight};
use tracing::instrument;

use super::Gallery;
use crate::config::MAX_PAGE_SIZE;
use crate::utils::message;
use crate::utils::render::{print_json, render_summaries};

#[derive(Debug, Bpaf, Clone)]
pub struct HighlightArgs {
    /// Display the list as JSON
    #[bpaf(long)]
    pub json: bool,

    /// Show at most N websites (default: 'highlights_limit' from config)
    #[bpaf(long, short('n'), argument("N"))]
    pub limit: Option<u32>,
}

impl HighlightArgs {
    fn limit(&self, default: NonZeroU32) -> Result<NonZeroU32> {
        let Some(limit) = self.limit else {
            return Ok(default);
        };
        match NonZeroU32::new(limit) {
            Some(limit) if limit.get() <= MAX_PAGE_SIZE => Ok(limit),
            _ => bail!("limit must be between 1 and {MAX_PAGE_SIZE}"),
        }
    }

    #[instrument(name = "highlights", skip_all, fields(%highlight))]
    pub async fn handle(self, highlight: Highlight, gallery: Gallery) -> Result<()> {
        let limit = self.limit(gallery.highlights_limit)?;

        let websites = gallery
            .client
            .highlights(highlight, limit)
            .await
            .with_context(|| format!("could not load {highlight} websites"))?;

        if self.json {
            return print_json(&websites);
        }
        if websites.is_empty() {
            message::plain(format!("No {highlight} websites yet."));
            return Ok(());
        }
        println!("{}", render_summaries(&websites));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use gallery_rust_sdk::providers::auth::MemoryTokenStore;
    use gallery_rust_sdk::providers::catalog::CatalogClientError;
    use gallery_rust_sdk::providers::catalog::test_helpers::website_summary;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::commands::test_helpers::mock_gallery;

    #[test]
    fn limit_defaults_to_config() {
        let default = NonZeroU32::new(7).unwrap();
        let args = HighlightArgs {
            json: false,
            limit: None,
        };
        assert_eq!(args.limit(default).unwrap(), default);

        let args = HighlightArgs {
            json: false,
            limit: Some(101),
        };
        assert!(args.limit(default).is_err());
    }

    #[tokio::test]
    async fn lists_highlights() {
        let (gallery, mock, _dir) = mock_gallery(MemoryTokenStore::default());
        mock.push_response(&vec![website_summary(1, "acme"), website_summary(2, "globex")]);

        HighlightArgs {
            json: false,
            limit: Some(2),
        }
        .handle(Highlight::Popular, gallery)
        .await
        .unwrap();
        assert_eq!(mock.remaining(), 0);
    }

    #[tokio::test]
    async fn catalog_error_stays_downcastable() {
        let (gallery, mock, _dir) = mock_gallery(MemoryTokenStore::default());
        mock.push_error_response(500, "boom");

        let err = HighlightArgs {
            json: false,
            limit: None,
        }
        .handle(Highlight::Featured, gallery)
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "could not load featured websites");
        assert!(err.downcast_ref::<CatalogClientError>().is_some());
    }
}
