use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use bpaf::Bpaf;
use gallery_rust_sdk::models::guard::{ADMIN_HOME, GuardDecision, guard};
use gallery_rust_sdk::providers::auth::Session;
use gallery_rust_sdk::providers::catalog::{ClientTrait, WebsiteCreate, WebsiteUpdate};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::Gallery;
use crate::utils::message;

/// Create, update and delete websites
#[derive(Debug, Bpaf, Clone)]
pub enum AdminCommands {
    /// Create a website from a JSON file
    #[bpaf(command)]
    Create {
        #[bpaf(positional("FILE"))]
        file: PathBuf,
    },

    /// Change a website, only fields present in the JSON file are updated
    #[bpaf(command)]
    Update {
        #[bpaf(positional("slug"))]
        slug: String,
        #[bpaf(positional("FILE"))]
        file: PathBuf,
    },

    /// Delete a website
    #[bpaf(command)]
    Delete {
        #[bpaf(positional("slug"))]
        slug: String,
    },
}

impl AdminCommands {
    /// The admin page this command corresponds to
    fn path(&self) -> String {
        match self {
            AdminCommands::Create { .. } => format!("{ADMIN_HOME}/new"),
            AdminCommands::Update { slug, .. } => format!("{ADMIN_HOME}/{slug}/edit"),
            AdminCommands::Delete { .. } => ADMIN_HOME.to_string(),
        }
    }

    #[instrument(name = "admin", skip_all)]
    pub async fn handle(self, gallery: Gallery) -> Result<()> {
        let mut client = gallery.client;
        let mut session = Session::new(gallery.token_store);

        let authenticated = session.init(&mut client).await?;
        if let GuardDecision::Redirect(to) = guard(&self.path(), authenticated) {
            debug!(redirect = to, "admin command refused");
            bail!("not logged in, run 'gallery auth login --email <email>' first");
        }

        match self {
            AdminCommands::Create { file } => {
                let website: WebsiteCreate = read_json(&file)?;
                let created = client.create_website(&website).await?;
                message::created(format!("Created website '{}'", created.summary.slug));
            },
            AdminCommands::Update { slug, file } => {
                let update: WebsiteUpdate = read_json(&file)?;
                if update.is_empty() {
                    bail!("'{}' contains no fields to update", file.display());
                }
                let updated = client.update_website(&slug, &update).await?;
                message::updated(format!("Updated website '{}'", updated.summary.slug));
            },
            AdminCommands::Delete { slug } => {
                client.delete_website(&slug).await?;
                message::deleted(format!("Deleted website '{slug}'"));
            },
        }
        Ok(())
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("could not read '{}'", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("'{}' is not a valid website definition", path.display()))
}
