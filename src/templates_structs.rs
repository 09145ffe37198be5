// Template context structures for Askama templates.

use askama::Template;

/// The single search page: column list for the forms, plus the rows of
/// the last general search (values in column order).
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub columns: Vec<String>,
    pub search_term: String,
    pub results: Vec<Vec<String>>,
    pub searched: bool,
}
