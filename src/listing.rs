use serde::{Deserialize, Serialize};

use crate::Id;

/// A named entry in a listing, with how many upcoming shows it has.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ListingEntry {
    pub id: Id,
    pub name: String,
    pub num_upcoming_shows: i64,
}

/// The outcome of a name search.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SearchResults {
    pub count: usize,
    pub data: Vec<ListingEntry>,
    pub search_term: String,
}

impl SearchResults {
    pub fn new(search_term: String, data: Vec<ListingEntry>) -> Self {
        SearchResults {
            count: data.len(),
            data,
            search_term,
        }
    }
}

/// Escapes the `LIKE` wildcards in a search term so that it only matches
/// literally.
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());

    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }

        escaped.push(c);
    }

    escaped
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn wildcards_are_escaped() {
        assert_eq!(escape_like("100% _real_"), "100\\% \\_real\\_");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
        assert_eq!(escape_like("Hop"), "Hop");
    }
}
