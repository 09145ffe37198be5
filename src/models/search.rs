use super::store::{Record, RecordStore};

/// Rows where any column's lowercase value contains the term.
/// An empty store or a term with no hits yields an empty vec, never an error.
pub fn general_match<'a>(store: &'a RecordStore, term: &str) -> Vec<&'a Record> {
    let needle = term.trim().to_lowercase();
    store
        .rows
        .iter()
        .filter(|row| {
            store
                .columns
                .iter()
                .any(|c| row.get(c).to_lowercase().contains(&needle))
        })
        .collect()
}

/// Rows where the given column's lowercase value equals the term exactly.
/// An unknown column matches nothing (absent fields read as "").
pub fn specific_match<'a>(store: &'a RecordStore, column: &str, term: &str) -> Vec<&'a Record> {
    let needle = term.trim().to_lowercase();
    store
        .rows
        .iter()
        .filter(|row| row.get(column).to_lowercase() == needle)
        .collect()
}

/// Product rows whose `Category` equals the person's category, case-insensitively.
pub fn category_matches<'a>(store: &'a RecordStore, category: &str) -> Vec<&'a Record> {
    let needle = category.to_lowercase();
    store
        .rows
        .iter()
        .filter(|row| row.get("Category").to_lowercase() == needle)
        .collect()
}
