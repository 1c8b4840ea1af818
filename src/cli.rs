use std::path::PathBuf;

use clap::Parser;

use crate::config::{
    Config, DEFAULT_HOST, DEFAULT_MIN_CITATIONS, DEFAULT_PAGE_SIZE, DEFAULT_PUBLICATIONS,
    DEFAULT_USER,
};

/// Pull citation counts from a Google Scholar profile into a publications data file.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Scholar profile identifier
    #[arg(short, long, value_name = "ID", default_value = DEFAULT_USER)]
    pub user: String,

    /// Publications file to rewrite
    #[arg(short, long = "file", value_name = "PATH", default_value = DEFAULT_PUBLICATIONS)]
    pub file: PathBuf,

    /// Papers cited fewer times than this lose their `citations` field
    #[arg(short, long, value_name = "N", default_value_t = DEFAULT_MIN_CITATIONS)]
    pub min_citations: u64,

    /// Index of the first paper to request
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub offset: u32,

    /// Number of papers to request
    #[arg(long, value_name = "N", default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: u32,

    /// Host serving the profile page
    #[arg(long, value_name = "HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Read a saved profile page instead of fetching it
    #[arg(long, value_name = "PATH")]
    pub html: Option<PathBuf>,

    /// Report what would change without writing the file
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Config {
            user: cli.user,
            host: cli.host,
            offset: cli.offset,
            page_size: cli.page_size,
            publications: cli.file,
            min_citations: cli.min_citations,
            html: cli.html,
            dry_run: cli.dry_run,
        }
    }
}
