mod admin;
mod auth;
mod browse;
mod filter;
mod highlights;
mod show;
mod taxonomy;

use std::fmt;
use std::num::NonZeroU32;
use std::path::PathBuf;

use anyhow::{Context, Result};
use bpaf::{Bpaf, ParseFailure, Parser};
use gallery_rust_sdk::models::location::History;
use gallery_rust_sdk::providers::auth::{FileTokenStore, MemoryTokenStore, TokenStore};
use gallery_rust_sdk::providers::catalog::{Client, ClientTrait, Highlight};
use indoc::{formatdoc, indoc};
use tracing::{debug, warn};

use crate::config::Config;
use crate::utils::errors::{display_chain, format_history_error};
use crate::utils::init::init_catalog_client;
use crate::utils::message;

/// Name of the navigation history file in the state directory
pub const HISTORY_FILENAME: &str = "history.json";

static GALLERY_DESCRIPTION: &'_ str = indoc! {"
    Browse a curated gallery of websites from the command line.\n\n

    Filters are kept between invocations,
    so 'gallery filter set category saas' followed by 'gallery browse'
    lists the SaaS websites, and 'gallery filter back' undoes the change."
};

fn vec_len<T>(x: Vec<T>) -> usize {
    Vec::len(&x)
}

#[derive(Bpaf, Clone, Copy, Debug)]
pub enum Verbosity {
    Verbose(
        /// Increase logging verbosity
        ///
        /// Invoke multiple times for increasing detail.
        #[bpaf(short('v'), long("verbose"), req_flag(()), many, map(vec_len))]
        usize,
    ),

    /// Silence logs except for errors
    #[bpaf(short, long)]
    Quiet,
}

impl Default for Verbosity {
    fn default() -> Self {
        Verbosity::Verbose(0)
    }
}

#[derive(Bpaf)]
#[bpaf(options, descr(GALLERY_DESCRIPTION))]
pub struct GalleryCli(#[bpaf(external(gallery_args))] pub GalleryArgs);

/// Main gallery args parser
///
/// To parse the gallery CLI, use [`GalleryCli`] instead using [`gallery_cli()`].
#[derive(Debug, Bpaf)]
#[bpaf(ignore_rustdoc)] // we don't want this struct to be interpreted as a group
pub struct GalleryArgs {
    /// Verbose mode
    ///
    /// Invoke multiple times for increasing detail.
    #[bpaf(external, fallback(Default::default()))]
    pub verbosity: Verbosity,

    #[bpaf(external(commands), optional)]
    command: Option<Commands>,
}

impl fmt::Debug for Commands {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Command")
    }
}

/// Everything a command needs to talk to the catalog
/// and to keep state between invocations.
pub struct Gallery {
    pub client: Client,
    pub token_store: Box<dyn TokenStore>,
    pub page_size: NonZeroU32,
    pub highlights_limit: NonZeroU32,
    pub state_dir: PathBuf,
}

impl Gallery {
    pub fn new(config: &Config) -> Result<Self> {
        let client = init_catalog_client(config)?;

        // a configured token takes precedence over the one stored by `auth login`
        let token_store: Box<dyn TokenStore> = match config
            .gallery
            .api_token
            .clone()
            .filter(|token| !token.is_empty())
        {
            Some(token) => {
                debug!("using api_token from config");
                Box::new(MemoryTokenStore::with_token(token))
            },
            None => Box::new(FileTokenStore::in_dir(&config.gallery.data_dir)),
        };

        let mut gallery = Gallery {
            client,
            token_store,
            page_size: config.gallery.page_size()?,
            highlights_limit: config.gallery.highlights_limit()?,
            state_dir: config.gallery.state_dir.clone(),
        };
        gallery.restore_token()?;
        Ok(gallery)
    }

    /// Attach a stored token to the client.
    ///
    /// An unreadable credentials file only affects admin commands,
    /// so browsing continues without a token.
    fn restore_token(&mut self) -> Result<()> {
        match self.token_store.load() {
            Ok(Some(token)) => self.client.set_token(Some(token))?,
            Ok(None) => {},
            Err(e) => warn!("could not read stored credentials: {}", display_chain(&e)),
        }
        Ok(())
    }

    pub fn history_path(&self) -> PathBuf {
        self.state_dir.join(HISTORY_FILENAME)
    }

    /// The persisted navigation history, or a fresh one
    pub fn load_history(&self) -> Result<History> {
        History::load(self.history_path()).map_err(|e| anyhow::anyhow!(format_history_error(&e)))
    }

    pub fn save_history(&self, history: &History) -> Result<()> {
        history
            .save(self.history_path())
            .context("could not save filter history")
    }
}

impl GalleryArgs {
    pub async fn handle(self, config: Config) -> Result<()> {
        // Given no command, skip initialization and print welcome message
        let Some(command) = self.command else {
            print_welcome_message();
            return Ok(());
        };

        let gallery = Gallery::new(&config)?;

        match command {
            Commands::Help(group) => {
                group.handle();
                Ok(())
            },
            Commands::Browse(args) => args.handle(gallery).await,
            Commands::Search(args) => args.handle(gallery).await,
            Commands::Filter(args) => args.handle(gallery).await,
            Commands::Show(args) => args.handle(gallery).await,
            Commands::Featured(args) => args.handle(Highlight::Featured, gallery).await,
            Commands::Latest(args) => args.handle(Highlight::Latest, gallery).await,
            Commands::Popular(args) => args.handle(Highlight::Popular, gallery).await,
            Commands::Taxonomy(args) => args.handle(gallery).await,
            Commands::Auth(args) => args.handle(gallery).await,
            Commands::Admin(args) => args.handle(gallery).await,
        }
    }
}

/// Print general welcome message with short usage instructions
fn print_welcome_message() {
    let welcome_message = formatdoc! {r#"
        gallery version {version}

        Usage: gallery OPTIONS (browse|search|filter|show|...) [--help]

        Use 'gallery --help' for full list of commands and more information
    "#, version = env!("CARGO_PKG_VERSION")};

    message::plain(welcome_message);
}

#[derive(Bpaf, Clone)]
enum Commands {
    /// Prints help information
    #[bpaf(command, hide)]
    Help(#[bpaf(external(help))] Help),

    /// List websites matching the active filters
    #[bpaf(command)]
    Browse(#[bpaf(external(browse::browse))] browse::Browse),

    /// Search websites by title and description
    #[bpaf(command)]
    Search(#[bpaf(external(browse::search))] browse::Search),

    /// Show, change and step through the active filters
    #[bpaf(command)]
    Filter(
        #[bpaf(external(filter::filter_commands), fallback(filter::FilterCommands::Show))]
        filter::FilterCommands,
    ),

    /// Show details about a single website
    #[bpaf(command)]
    Show(#[bpaf(external(show::show))] show::Show),

    /// List featured websites
    #[bpaf(command)]
    Featured(#[bpaf(external(highlights::highlight_args))] highlights::HighlightArgs),

    /// List the most recently added websites
    #[bpaf(command)]
    Latest(#[bpaf(external(highlights::highlight_args))] highlights::HighlightArgs),

    /// List the most viewed websites
    #[bpaf(command)]
    Popular(#[bpaf(external(highlights::highlight_args))] highlights::HighlightArgs),

    /// List categories, styles, collections or platforms
    #[bpaf(command)]
    Taxonomy(#[bpaf(external(taxonomy::taxonomy))] taxonomy::Taxonomy),

    /// Log in to and out of the admin API
    #[bpaf(command)]
    Auth(#[bpaf(external(auth::auth_commands))] auth::AuthCommands),

    /// Create, update and delete websites
    #[bpaf(command)]
    Admin(#[bpaf(external(admin::admin_commands))] admin::AdminCommands),
}

#[derive(Debug, Bpaf, Clone)]
struct Help {
    /// Command to show help for
    #[bpaf(positional("cmd"))]
    cmd: Option<String>,
}

/// Force `--help` output for `gallery` with a given command
pub fn display_help(cmd: Option<String>) {
    let mut args = Vec::from_iter(cmd.as_deref());
    args.push("--help");

    match gallery_cli().run_inner(&*args) {
        Ok(_) => unreachable!(),
        Err(ParseFailure::Completion(comp)) => print!("{comp:80}"),
        Err(ParseFailure::Stdout(doc, _)) => message::plain(format!("{doc:80}")),
        Err(ParseFailure::Stderr(err)) => message::error(err),
    }
}

impl Help {
    fn handle(self) {
        display_help(self.cmd);
    }
}
