//! Raw snapshot record structures (deserialized from JSONL)

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::abstract_decode::decode_inverted_index;

/// OpenAlex Work JSON structure
#[derive(Debug, Deserialize)]
pub struct WorkRecord {
    /// OpenAlex ID (e.g., "https://openalex.org/W2741809807")
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub doi: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    /// Display name (usually same as title)
    #[serde(default)]
    pub display_name: Option<String>,

    /// Publication date (ISO 8601)
    #[serde(default)]
    pub publication_date: Option<String>,

    #[serde(default)]
    pub publication_year: Option<i32>,

    /// Language (ISO 639-1)
    #[serde(default)]
    pub language: Option<String>,

    /// Work type (article, preprint, book, etc.)
    #[serde(rename = "type", default)]
    pub work_type: Option<String>,

    #[serde(default)]
    pub cited_by_count: i64,

    #[serde(default)]
    pub open_access: Option<OpenAccessInfo>,

    /// Abstract as inverted index
    #[serde(default)]
    pub abstract_inverted_index: Option<Map<String, Value>>,

    #[serde(default)]
    pub authorships: Vec<Authorship>,

    #[serde(default)]
    pub concepts: Vec<ScoredEntity>,

    #[serde(default)]
    pub topics: Vec<ScoredEntity>,

    /// Primary location (source/venue info)
    #[serde(default)]
    pub primary_location: Option<Location>,

    #[serde(default)]
    pub biblio: Option<Biblio>,

    #[serde(default)]
    pub referenced_works: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct OpenAccessInfo {
    #[serde(default)]
    pub is_oa: bool,
    #[serde(default)]
    pub oa_status: Option<String>,
    #[serde(default)]
    pub oa_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Authorship {
    #[serde(default)]
    pub author: Option<Author>,
}

#[derive(Debug, Deserialize)]
pub struct Author {
    #[serde(default)]
    pub display_name: Option<String>,
}

/// A concept or topic with its relevance score
#[derive(Debug, Deserialize)]
pub struct ScoredEntity {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub source: Option<VenueInfo>,
}

#[derive(Debug, Deserialize)]
pub struct VenueInfo {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    /// All ISSNs of the venue; the first is taken as canonical
    #[serde(default)]
    pub issn: Option<Vec<String>>,
    #[serde(default)]
    pub host_organization_name: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct Biblio {
    #[serde(default)]
    pub volume: Option<String>,
    #[serde(default)]
    pub issue: Option<String>,
    #[serde(default)]
    pub first_page: Option<String>,
    #[serde(default)]
    pub last_page: Option<String>,
}

impl WorkRecord {
    /// Extract short ID from full URL (e.g., "https://openalex.org/W123" -> "W123")
    pub fn short_id(&self) -> &str {
        strip_entity_prefix(&self.id)
    }

    /// Decode abstract from inverted index
    pub fn abstract_text(&self) -> Option<String> {
        self.abstract_inverted_index
            .as_ref()
            .map(decode_inverted_index)
            .filter(|s| !s.is_empty())
    }
}

/// OpenAlex Source (venue) JSON structure
#[derive(Debug, Deserialize)]
pub struct SourceRecord {
    #[serde(default)]
    pub id: String,

    /// Linking ISSN
    #[serde(default)]
    pub issn_l: Option<String>,

    /// All ISSNs of the venue
    #[serde(default)]
    pub issn: Vec<String>,

    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(rename = "type", default)]
    pub source_type: Option<String>,

    #[serde(default)]
    pub host_organization_name: Option<String>,

    #[serde(default)]
    pub works_count: i64,

    #[serde(default)]
    pub cited_by_count: i64,

    #[serde(default)]
    pub summary_stats: Option<SummaryStats>,

    #[serde(default)]
    pub is_oa: bool,

    #[serde(default)]
    pub is_in_doaj: bool,
}

/// Upstream impact metrics carried on the source record
#[derive(Debug, Deserialize, Default)]
pub struct SummaryStats {
    #[serde(rename = "2yr_mean_citedness", default)]
    pub two_year_mean_citedness: Option<f64>,
    #[serde(default)]
    pub h_index: Option<i64>,
    #[serde(default)]
    pub i10_index: Option<i64>,
}

impl SourceRecord {
    pub fn short_id(&self) -> &str {
        strip_entity_prefix(&self.id)
    }
}

/// Strip the OpenAlex URL prefix from an entity id
pub fn strip_entity_prefix(url: &str) -> &str {
    url.strip_prefix("https://openalex.org/").unwrap_or(url)
}

/// Strip the DOI URL prefix
pub fn strip_doi_prefix(doi: &str) -> &str {
    doi.strip_prefix("https://doi.org/").unwrap_or(doi)
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) const SAMPLE_WORK: &str = r#"{
        "id": "https://openalex.org/W2741809807",
        "doi": "https://doi.org/10.1038/s41586-018-0102-6",
        "title": "Sample Title",
        "display_name": "Sample Title",
        "publication_date": "2025-01-15",
        "publication_year": 2025,
        "language": "en",
        "type": "article",
        "cited_by_count": 42,
        "open_access": {"is_oa": true, "oa_status": "gold", "oa_url": "https://example.org/pdf"},
        "abstract_inverted_index": {"Hello": [0], "world": [1]},
        "authorships": [
            {"author": {"display_name": "Ada Lovelace"}},
            {"author": {"display_name": "Charles Babbage"}}
        ],
        "concepts": [
            {"display_name": "Biology", "score": 0.9},
            {"display_name": "Genetics", "score": 0.7}
        ],
        "topics": [{"display_name": "Gene expression", "score": 0.95}],
        "primary_location": {"source": {
            "id": "https://openalex.org/S137773608",
            "display_name": "Nature",
            "issn": ["0028-0836", "1476-4687"],
            "host_organization_name": "Nature Portfolio"
        }},
        "biblio": {"volume": "558", "issue": "7708", "first_page": "60", "last_page": "65"},
        "referenced_works": ["https://openalex.org/W1", "https://openalex.org/W2"]
    }"#;

    #[test]
    fn parse_work_record() {
        let rec: WorkRecord = serde_json::from_str(SAMPLE_WORK).unwrap();
        assert_eq!(rec.short_id(), "W2741809807");
        assert_eq!(rec.publication_year, Some(2025));
        assert_eq!(rec.cited_by_count, 42);
        assert_eq!(rec.authorships.len(), 2);
        assert_eq!(rec.referenced_works.len(), 2);
    }

    #[test]
    fn work_abstract_decode() {
        let rec: WorkRecord = serde_json::from_str(SAMPLE_WORK).unwrap();
        assert_eq!(rec.abstract_text(), Some("Hello world".to_string()));
    }

    #[test]
    fn minimal_work() {
        let rec: WorkRecord = serde_json::from_str(r#"{"id": "https://openalex.org/W1"}"#).unwrap();
        assert_eq!(rec.short_id(), "W1");
        assert!(rec.doi.is_none());
        assert!(rec.abstract_text().is_none());
        assert!(rec.publication_year.is_none());
    }

    #[test]
    fn parse_source_record() {
        let json = r#"{
            "id": "https://openalex.org/S137773608",
            "issn_l": "0028-0836",
            "issn": ["0028-0836", "1476-4687"],
            "display_name": "Nature",
            "type": "journal",
            "works_count": 400000,
            "cited_by_count": 21000000,
            "summary_stats": {"2yr_mean_citedness": 49.5, "h_index": 1300, "i10_index": 110000},
            "is_oa": false,
            "is_in_doaj": false
        }"#;
        let rec: SourceRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.short_id(), "S137773608");
        assert_eq!(rec.issn.len(), 2);
        let stats = rec.summary_stats.unwrap();
        assert_eq!(stats.two_year_mean_citedness, Some(49.5));
    }

    #[test]
    fn prefix_stripping() {
        assert_eq!(strip_entity_prefix("https://openalex.org/W42"), "W42");
        assert_eq!(strip_entity_prefix("W42"), "W42");
        assert_eq!(strip_doi_prefix("https://doi.org/10.1/x"), "10.1/x");
    }
}
