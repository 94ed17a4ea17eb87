use std::fmt::Display;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use bpaf::Bpaf;
use gallery_rust_sdk::providers::catalog::{ClientTrait, FilterKey, FilterSet, Listing};
use itertools::Itertools;
use tracing::instrument;

use super::Gallery;
use super::browse::show_listing;
use crate::utils::render::print_json;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxonomyKind {
    Categories,
    Styles,
    Collections,
    Platforms,
}

impl TaxonomyKind {
    /// The filter that narrows listings to one entry of this kind
    pub fn filter_key(&self) -> FilterKey {
        match self {
            TaxonomyKind::Categories => FilterKey::Category,
            TaxonomyKind::Styles => FilterKey::Style,
            TaxonomyKind::Collections => FilterKey::Collection,
            TaxonomyKind::Platforms => FilterKey::Platform,
        }
    }

    /// The paginated listing of one entry, platforms have none
    fn listing(&self, slug: String) -> Option<Listing> {
        match self {
            TaxonomyKind::Categories => Some(Listing::Category(slug)),
            TaxonomyKind::Styles => Some(Listing::Style(slug)),
            TaxonomyKind::Collections => Some(Listing::Collection(slug)),
            TaxonomyKind::Platforms => None,
        }
    }
}

impl FromStr for TaxonomyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "categories" | "category" => Ok(TaxonomyKind::Categories),
            "styles" | "style" => Ok(TaxonomyKind::Styles),
            "collections" | "collection" => Ok(TaxonomyKind::Collections),
            "platforms" | "platform" => Ok(TaxonomyKind::Platforms),
            other => Err(format!(
                "unknown taxonomy '{other}', expected one of categories, styles, collections, platforms"
            )),
        }
    }
}

impl Display for TaxonomyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TaxonomyKind::Categories => "categories",
            TaxonomyKind::Styles => "styles",
            TaxonomyKind::Collections => "collections",
            TaxonomyKind::Platforms => "platforms",
        };
        f.write_str(name)
    }
}

// List a taxonomy, or the websites of one of its entries
#[derive(Debug, Bpaf, Clone)]
pub struct Taxonomy {
    /// Display the result as JSON
    #[bpaf(long)]
    pub json: bool,

    /// Page of websites to show when a slug is given
    #[bpaf(long, argument("N"))]
    pub page: Option<u32>,

    /// One of categories, styles, collections or platforms
    #[bpaf(positional("kind"))]
    pub kind: TaxonomyKind,

    /// List the websites of this entry
    #[bpaf(positional("slug"))]
    pub slug: Option<String>,
}

/// `slug  title (N websites)` rows
fn render_rows<'a>(rows: impl IntoIterator<Item = (&'a str, &'a str, u64)>) -> String {
    let rows = rows.into_iter().collect_vec();
    let width = rows.iter().map(|(slug, _, _)| slug.len()).max().unwrap_or(0);
    rows.into_iter()
        .map(|(slug, title, count)| format!("{slug:<width$}  {title} ({count} websites)"))
        .join("\n")
}

impl Taxonomy {
    #[instrument(name = "taxonomy", skip_all, fields(kind = %self.kind))]
    pub async fn handle(self, gallery: Gallery) -> Result<()> {
        if let Some(slug) = self.slug {
            let Some(listing) = self.kind.listing(slug.clone()) else {
                bail!(
                    "{} have no website listing, use 'gallery filter set {} {slug}' instead",
                    self.kind,
                    self.kind.filter_key()
                );
            };
            let filters = match self.page {
                Some(page) => FilterSet::default().with(FilterKey::Page, page.to_string()),
                None => FilterSet::default(),
            };
            return show_listing(gallery, listing, &filters, self.json).await;
        }

        let client = &gallery.client;
        let context = || format!("could not load {}", self.kind);
        let rendered = match self.kind {
            TaxonomyKind::Categories => {
                let mut categories = client.categories().await.with_context(context)?;
                categories.sort_by_key(|c| c.sort_order);
                if self.json {
                    return print_json(&categories);
                }
                render_rows(
                    categories
                        .iter()
                        .map(|c| (c.slug.as_str(), c.title.as_str(), c.website_count)),
                )
            },
            TaxonomyKind::Styles => {
                let styles = client.styles().await.with_context(context)?;
                if self.json {
                    return print_json(&styles);
                }
                render_rows(
                    styles
                        .iter()
                        .map(|s| (s.slug.as_str(), s.title.as_str(), s.website_count)),
                )
            },
            TaxonomyKind::Collections => {
                let collections = client.collections().await.with_context(context)?;
                if self.json {
                    return print_json(&collections);
                }
                render_rows(
                    collections
                        .iter()
                        .map(|c| (c.slug.as_str(), c.title.as_str(), c.website_count)),
                )
            },
            TaxonomyKind::Platforms => {
                let platforms = client.platforms().await.with_context(context)?;
                if self.json {
                    return print_json(&platforms);
                }
                render_rows(
                    platforms
                        .iter()
                        .map(|p| (p.slug.as_str(), p.title.as_str(), p.website_count)),
                )
            },
        };

        println!("{rendered}");
        Ok(())
    }
}
