pub mod extract;
pub mod text;

use scraper::Html;

pub use extract::Record;

/// Two-step pipeline: raw HTML → document tree → faculty records.
pub fn process_page(html: &str) -> Vec<Record> {
    let doc = Html::parse_document(html);
    extract::extract(&doc)
}
