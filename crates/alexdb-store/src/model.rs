//! Row types shared between the mapper, the store, and the query surface

use serde::{Deserialize, Serialize};

/// A concept or topic tag with its relevance score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub score: Option<f64>,
}

/// Flattened work row, ready for insertion.
///
/// Produced by the mapper from one decoded snapshot record. Arrays are
/// serialized to JSON columns at insert time; empty arrays become NULL,
/// never a placeholder string.
#[derive(Debug, Clone, Default)]
pub struct WorkRow {
    pub openalex_id: String,
    pub doi: Option<String>,
    pub title: Option<String>,
    pub abstract_text: Option<String>,
    pub year: i32,
    pub publication_date: Option<String>,
    pub work_type: Option<String>,
    pub language: Option<String>,
    pub source: Option<String>,
    pub source_id: Option<String>,
    pub issn: Option<String>,
    pub volume: Option<String>,
    pub issue: Option<String>,
    pub first_page: Option<String>,
    pub last_page: Option<String>,
    pub publisher: Option<String>,
    pub cited_by_count: i64,
    pub is_oa: bool,
    pub oa_status: Option<String>,
    pub oa_url: Option<String>,
    pub authors: Vec<String>,
    pub concepts: Vec<Tag>,
    pub topics: Vec<Tag>,
    pub referenced_works: Vec<String>,
    pub raw_json: Option<String>,
}

/// Flattened source (journal/venue) row.
#[derive(Debug, Clone, Default)]
pub struct SourceRow {
    pub openalex_id: String,
    pub issn_l: Option<String>,
    pub issns: Vec<String>,
    pub display_name: Option<String>,
    pub source_type: Option<String>,
    pub host_organization: Option<String>,
    pub works_count: i64,
    pub cited_by_count: i64,
    pub two_year_mean_citedness: Option<f64>,
    pub h_index: Option<i64>,
    pub i10_index: Option<i64>,
    pub is_oa: bool,
    pub is_in_doaj: bool,
}

/// One resolved citation edge (internal keys).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CitationEdge {
    pub citing_id: i64,
    pub cited_id: i64,
    pub citing_year: i32,
}

/// A work as read back from the store.
#[derive(Debug, Clone, Serialize)]
pub struct Work {
    pub id: i64,
    pub openalex_id: String,
    pub doi: Option<String>,
    pub title: Option<String>,
    pub abstract_text: Option<String>,
    pub year: Option<i32>,
    pub publication_date: Option<String>,
    pub work_type: Option<String>,
    pub language: Option<String>,
    pub source: Option<String>,
    pub issn: Option<String>,
    pub publisher: Option<String>,
    pub cited_by_count: i64,
    pub is_oa: bool,
    pub oa_status: Option<String>,
    pub oa_url: Option<String>,
    pub authors: Vec<String>,
    pub concepts: Vec<Tag>,
    pub topics: Vec<Tag>,
    pub referenced_works: Vec<String>,
}

/// One full-text search hit.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub openalex_id: String,
    pub title: Option<String>,
    pub year: Option<i32>,
    pub doi: Option<String>,
    /// bm25 rank (lower is better)
    pub rank: f64,
}

/// Result page of a full-text search.
#[derive(Debug, Clone)]
pub struct SearchPage {
    pub hits: Vec<SearchHit>,
    pub total: usize,
    pub query: String,
    pub elapsed_ms: f64,
}

/// Aggregate counts for the status surface.
#[derive(Debug, Clone, Default)]
pub struct StoreStats {
    pub works: i64,
    pub sources: i64,
    pub citations: i64,
    pub fts_indexed: i64,
    pub issn_mappings: i64,
    pub graph_cursor: i64,
}

impl StoreStats {
    pub fn fts_complete(&self) -> bool {
        self.works > 0 && self.fts_indexed == self.works
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_json_round() {
        let tag = Tag {
            name: "Machine learning".into(),
            score: Some(0.83),
        };
        let json = serde_json::to_string(&tag).unwrap();
        assert!(json.contains("Machine learning"));
        let back: Tag = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tag);
    }

    #[test]
    fn fts_complete_requires_works() {
        let empty = StoreStats::default();
        assert!(!empty.fts_complete());

        let done = StoreStats {
            works: 10,
            fts_indexed: 10,
            ..Default::default()
        };
        assert!(done.fts_complete());

        let behind = StoreStats {
            works: 10,
            fts_indexed: 7,
            ..Default::default()
        };
        assert!(!behind.fts_complete());
    }
}
