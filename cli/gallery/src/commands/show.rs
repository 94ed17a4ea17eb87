use anyhow::{Result, bail};
use bpaf::Bpaf;
use gallery_rust_sdk::models::detail_state::DetailStateContainer;
use gallery_rust_sdk::models::sequence::LoadOutcome;
use tracing::instrument;

use super::Gallery;
use crate::utils::render::{print_json, render_detail};

// Show detailed website information
#[derive(Debug, Bpaf, Clone)]
pub struct Show {
    /// Display the website as JSON
    #[bpaf(long)]
    pub json: bool,

    /// The website to show, as listed by 'gallery browse'
    #[bpaf(positional("slug"))]
    pub slug: String,
}

impl Show {
    #[instrument(name = "show", skip_all, fields(slug = self.slug))]
    pub async fn handle(self, gallery: Gallery) -> Result<()> {
        let container = DetailStateContainer::new(gallery.client);

        let outcome = container.load(&self.slug).await;
        let state = container.into_state();
        if outcome != LoadOutcome::Loaded {
            bail!(
                "could not load website '{}': {}",
                self.slug,
                state.error().unwrap_or("unknown error")
            );
        }
        let Some(website) = state.website else {
            bail!("could not load website '{}'", self.slug);
        };

        if self.json {
            return print_json(&website);
        }
        println!("{}", render_detail(&website));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use gallery_rust_sdk::providers::auth::MemoryTokenStore;
    use gallery_rust_sdk::providers::catalog::test_helpers::website_detail;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::commands::test_helpers::mock_gallery;

    #[tokio::test]
    async fn shows_website() {
        let (gallery, mock, _dir) = mock_gallery(MemoryTokenStore::default());
        mock.push_response(&website_detail("acme"));

        Show {
            json: false,
            slug: "acme".to_string(),
        }
        .handle(gallery)
        .await
        .unwrap();
        assert_eq!(mock.remaining(), 0);
    }

    #[tokio::test]
    async fn missing_website_names_slug() {
        let (gallery, mock, _dir) = mock_gallery(MemoryTokenStore::default());
        mock.push_error_response(404, "Website not found");

        let err = Show {
            json: true,
            slug: "gone".to_string(),
        }
        .handle(gallery)
        .await
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "could not load website 'gone': 404 Not Found: Website not found"
        );
    }
}
