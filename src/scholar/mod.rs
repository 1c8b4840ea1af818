pub mod extract;
pub mod fetch;
pub mod html;

/// One row of a profile page: a paper title and how often it has been cited.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaperRecord {
    pub title: String,
    pub citations: u64,
}
