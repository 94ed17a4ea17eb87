use std::fmt::Write;

use anyhow::Result;
use gallery_rust_sdk::providers::catalog::{
    FilterKey,
    PaginationMeta,
    WebsiteDetail,
    WebsiteSummary,
};
use itertools::Itertools;
use serde::Serialize;

const DEFAULT_DESCRIPTION: &str = "<no description provided>";

/// Print `value` to stdout as pretty JSON
pub fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// One line per website: `slug - title: description`
pub fn render_summaries(websites: &[WebsiteSummary]) -> String {
    let Some(width) = websites.iter().map(|website| website.slug.len()).max() else {
        return String::new();
    };

    websites
        .iter()
        .map(|website| {
            let featured = if website.is_featured { " *" } else { "" };
            let description = website
                .description
                .as_deref()
                .map(|d| d.replace('\n', " "))
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());
            format!(
                "{slug:<width$}  {title}{featured}: {description}",
                slug = website.slug,
                title = website.title,
            )
        })
        .join("\n")
}

/// `Page 2 of 3 (45 websites)`
pub fn render_page_footer(meta: &PaginationMeta) -> String {
    let mut footer = format!(
        "Page {} of {} ({} websites)",
        meta.page,
        meta.total_pages.max(1),
        meta.total_items
    );
    if meta.has_next() {
        footer.push_str(&format!(
            "\nUse '--page {}' to see more",
            meta.page + 1
        ));
    }
    footer
}

pub fn render_detail(website: &WebsiteDetail) -> String {
    let summary = &website.summary;
    let mut out = String::new();

    // writing to a String never fails
    let _ = writeln!(out, "{} - {}", summary.slug, summary.title);
    if let Some(description) = &summary.description {
        let _ = writeln!(out, "{description}");
    }
    let _ = writeln!(out);

    let mut fields = Vec::new();
    if let Some(url) = &summary.original_url {
        fields.push(("URL", url.clone()));
    }
    if let Some(platform) = &website.platform {
        fields.push(("Platform", platform.title.clone()));
    }
    let joined = |titles: Vec<&str>| titles.join(", ");
    if !website.categories.is_empty() {
        fields.push((
            "Categories",
            joined(website.categories.iter().map(|c| c.title.as_str()).collect()),
        ));
    }
    if !website.styles.is_empty() {
        fields.push((
            "Styles",
            joined(website.styles.iter().map(|s| s.title.as_str()).collect()),
        ));
    }
    if !website.collections.is_empty() {
        fields.push((
            "Collections",
            joined(website.collections.iter().map(|c| c.title.as_str()).collect()),
        ));
    }
    fields.push(("Views", summary.view_count.to_string()));
    fields.push(("Featured", summary.is_featured.to_string()));
    fields.push(("Added", summary.created_at.clone()));

    for (name, value) in fields {
        let _ = writeln!(out, "{:<12}{value}", format!("{name}:"));
    }

    out.trim_end().to_string()
}

/// `category=saas style=dark`, or a hint if nothing is set
pub fn render_filters(entries: &[(FilterKey, String)]) -> String {
    if entries.is_empty() {
        return "No active filters".to_string();
    }
    entries
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .join(" ")
}
