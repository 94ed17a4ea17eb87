use anyhow::{Result, bail};
use bpaf::Bpaf;
use gallery_rust_sdk::models::filters::FilterStateManager;
use gallery_rust_sdk::models::location::History;
use gallery_rust_sdk::models::taxonomy::TaxonomyCache;
use gallery_rust_sdk::providers::catalog::FilterKey;
use tracing::{debug, instrument};

use super::Gallery;
use crate::utils::errors::display_chain;
use crate::utils::message;
use crate::utils::render::render_filters;

/// Show, change and step through the active filters
#[derive(Debug, Bpaf, Clone)]
pub enum FilterCommands {
    /// Show the active filters
    #[bpaf(command)]
    Show,

    /// Set a filter, going back to the first page
    #[bpaf(command)]
    Set {
        /// One of category, style, collection, platform, q or page
        #[bpaf(positional("key"))]
        key: FilterKey,
        #[bpaf(positional("value"))]
        value: String,
    },

    /// Remove a filter, going back to the first page
    #[bpaf(command, long("rm"))]
    Remove {
        #[bpaf(positional("key"))]
        key: FilterKey,
    },

    /// Remove all filters
    #[bpaf(command)]
    Clear,

    /// Return to the previous filters
    #[bpaf(command)]
    Back,

    /// Undo a 'back'
    #[bpaf(command)]
    Forward,
}

impl FilterCommands {
    #[instrument(name = "filter", skip_all)]
    pub async fn handle(self, gallery: Gallery) -> Result<()> {
        let mut manager = FilterStateManager::new(gallery.load_history()?);

        match self {
            FilterCommands::Show => {},
            FilterCommands::Set { key, value } => {
                let value = value.trim();
                if key == FilterKey::Page && !matches!(value.parse::<u32>(), Ok(1..)) {
                    bail!("'{value}' is not a page number");
                }
                if FilterKey::FILTERS.contains(&key) && key != FilterKey::Q {
                    warn_if_unknown(&gallery, key, value).await;
                }
                manager.set_filter(key, Some(value));
                gallery.save_history(manager.location())?;
                message::updated(format!("Set '{key}' to '{value}'"));
            },
            FilterCommands::Remove { key } => {
                manager.remove_filter(key);
                gallery.save_history(manager.location())?;
                message::updated(format!("Removed '{key}'"));
            },
            FilterCommands::Clear => {
                manager.clear_filters();
                gallery.save_history(manager.location())?;
                message::updated("Cleared all filters");
            },
            FilterCommands::Back => {
                if !step(&gallery, manager.location_mut(), History::back)? {
                    message::warning("Already at the oldest filters");
                }
            },
            FilterCommands::Forward => {
                if !step(&gallery, manager.location_mut(), History::forward)? {
                    message::warning("Already at the newest filters");
                }
            },
        }

        let current = manager.current();
        println!("{}", render_filters(&manager.active_filter_entries()));
        if current.page > 1 {
            println!("page {}", current.page);
        }
        Ok(())
    }
}

/// Move through the history and persist the new position
fn step(gallery: &Gallery, history: &mut History, move_to: fn(&mut History) -> bool) -> Result<bool> {
    if !move_to(history) {
        return Ok(false);
    }
    gallery.save_history(history)?;
    Ok(true)
}

/// Warn about slugs the catalog doesn't know.
///
/// The filter is set regardless, the catalog may be unreachable
/// or the slug may be added later.
async fn warn_if_unknown(gallery: &Gallery, key: FilterKey, slug: &str) {
    let mut taxonomy = TaxonomyCache::new();
    if let Err(e) = taxonomy.load_all(&gallery.client).await {
        debug!("skipping filter validation: {}", display_chain(&e));
        return;
    }
    if !taxonomy.contains(key, slug) {
        message::warning(format!(
            "'{slug}' is not a known {key}, run 'gallery taxonomy' to list the available ones"
        ));
    }
}
