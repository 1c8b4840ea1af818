use std::{fs, time::Duration};

use anyhow::Context;
use indicatif::ProgressBar;
use owo_colors::{OwoColorize, Stream};

use crate::{
    config::Config,
    scholar::{
        extract::extract_papers,
        fetch::{decode_page, fetch_profile_page, profile_url},
    },
    update::{BlockChange, CitationIndex, update_publications},
};

/// Titles in the scraped listing are cut to this many characters.
const LISTING_WIDTH: usize = 60;

/// Fetch the profile, then rewrite the publications file in one go.
///
/// The publications file is only written after everything else has succeeded.
pub fn run(config: &Config) -> anyhow::Result<()> {
    let html = load_profile_page(config)?;
    let papers = extract_papers(&html);
    println!("Found {} papers on Google Scholar", papers.len());

    for paper in papers.iter().filter(|p| p.citations >= config.min_citations) {
        let title: String = paper.title.chars().take(LISTING_WIDTH).collect();
        println!(
            "  [{}] {}",
            paper.citations.if_supports_color(Stream::Stdout, |n| n.cyan()),
            title
        );
    }

    let path = &config.publications;
    println!("\nUpdating {}...", path.display());
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read publications file {}", path.display()))?;

    let index = CitationIndex::from_papers(&papers);
    let outcome = update_publications(&content, &index, config.min_citations);
    for change in &outcome.changes {
        match change {
            BlockChange::Updated { title, citations } => println!(
                "  {} {title} -> {citations} citations",
                "Updated:".if_supports_color(Stream::Stdout, |s| s.green())
            ),
            BlockChange::Removed { title } => println!(
                "  {} {title}",
                "Removed citations:".if_supports_color(Stream::Stdout, |s| s.yellow())
            ),
        }
    }

    if config.dry_run {
        println!(
            "Dry run: {} entries would be updated.",
            outcome.updated().if_supports_color(Stream::Stdout, |n| n.bold())
        );
        return Ok(());
    }

    fs::write(path, &outcome.content)
        .with_context(|| format!("failed to write publications file {}", path.display()))?;
    println!(
        "Done. Updated {} entries.",
        outcome.updated().if_supports_color(Stream::Stdout, |n| n.bold())
    );
    Ok(())
}

fn load_profile_page(config: &Config) -> anyhow::Result<String> {
    if let Some(path) = &config.html {
        println!("Reading profile page from {}...", path.display());
        let bytes = fs::read(path)
            .with_context(|| format!("failed to read profile page {}", path.display()))?;
        return Ok(decode_page(&bytes));
    }

    let url = profile_url(&config.host, &config.user, config.offset, config.page_size)?;
    println!("Fetching Google Scholar data for {}...", config.user);
    let spinner = ProgressBar::new_spinner();
    spinner.set_message(format!("GET {url}"));
    spinner.enable_steady_tick(Duration::from_millis(100));
    let page = fetch_profile_page(&url);
    spinner.finish_and_clear();
    page
}
