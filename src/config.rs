use std::path::PathBuf;

pub const DEFAULT_USER: &str = "xphZoxIAAAAJ";
pub const DEFAULT_HOST: &str = "scholar.google.com";
pub const DEFAULT_PUBLICATIONS: &str = "src/data/publications.ts";
pub const DEFAULT_MIN_CITATIONS: u64 = 50;
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Everything one run of the pipeline needs to know.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Scholar profile identifier (the `user=` query parameter).
    pub user: String,
    pub host: String,
    /// Zero-based index of the first paper on the requested page.
    pub offset: u32,
    pub page_size: u32,
    /// Data file whose `citations` fields get rewritten.
    pub publications: PathBuf,
    /// Papers below this count have their `citations` field removed.
    pub min_citations: u64,
    /// Saved profile page to read instead of hitting the network.
    pub html: Option<PathBuf>,
    pub dry_run: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            user: DEFAULT_USER.to_string(),
            host: DEFAULT_HOST.to_string(),
            offset: 0,
            page_size: DEFAULT_PAGE_SIZE,
            publications: PathBuf::from(DEFAULT_PUBLICATIONS),
            min_citations: DEFAULT_MIN_CITATIONS,
            html: None,
            dry_run: false,
        }
    }
}
