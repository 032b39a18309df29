//! Flatten raw work/source records into store rows
//!
//! Scalar fields map to columns, nested structures collapse to JSON
//! side columns, and the inverted-index abstract is decoded to text.
//! A record without an id or publication year carries nothing the
//! downstream stages can use and is dropped (counted by the caller).

use alexdb_store::{SourceRow, Tag, WorkRow};

use crate::record::{strip_doi_prefix, strip_entity_prefix, SourceRecord, WorkRecord};

/// Top concepts kept per work
const CONCEPT_LIMIT: usize = 5;
/// Top topics kept per work
const TOPIC_LIMIT: usize = 3;

/// Flatten a work record into an insertable row.
///
/// Returns None when the record has no id or no publication year.
/// `raw_line` is stored verbatim when raw retention is on.
pub fn flatten_work(record: WorkRecord, raw_line: Option<&str>) -> Option<WorkRow> {
    let openalex_id = record.short_id();
    if openalex_id.is_empty() {
        return None;
    }
    let openalex_id = openalex_id.to_string();
    let year = record.publication_year?;

    let abstract_text = record.abstract_text();

    let authors: Vec<String> = record
        .authorships
        .iter()
        .filter_map(|a| a.author.as_ref())
        .filter_map(|a| a.display_name.clone())
        .collect();

    let concepts = top_tags(&record.concepts, CONCEPT_LIMIT);
    let topics = top_tags(&record.topics, TOPIC_LIMIT);

    let referenced_works: Vec<String> = record
        .referenced_works
        .iter()
        .map(|r| strip_entity_prefix(r).to_string())
        .collect();

    let venue = record
        .primary_location
        .as_ref()
        .and_then(|loc| loc.source.as_ref());
    let issn = venue
        .and_then(|v| v.issn.as_ref())
        .and_then(|list| list.first())
        .cloned();

    let biblio = record.biblio.unwrap_or_default();
    let oa = record.open_access.unwrap_or_default();

    Some(WorkRow {
        openalex_id,
        doi: record.doi.as_deref().map(strip_doi_prefix).map(str::to_string),
        title: record.title.or(record.display_name),
        abstract_text,
        year,
        publication_date: record.publication_date,
        work_type: record.work_type,
        language: record.language,
        source: venue.and_then(|v| v.display_name.clone()),
        source_id: venue
            .and_then(|v| v.id.as_deref())
            .map(strip_entity_prefix)
            .map(str::to_string),
        issn,
        volume: biblio.volume,
        issue: biblio.issue,
        first_page: biblio.first_page,
        last_page: biblio.last_page,
        publisher: venue.and_then(|v| v.host_organization_name.clone()),
        cited_by_count: record.cited_by_count,
        is_oa: oa.is_oa,
        oa_status: oa.oa_status,
        oa_url: oa.oa_url,
        authors,
        concepts,
        topics,
        referenced_works,
        raw_json: raw_line.map(str::to_string),
    })
}

fn top_tags(entities: &[crate::record::ScoredEntity], limit: usize) -> Vec<Tag> {
    entities
        .iter()
        .take(limit)
        .filter_map(|e| {
            e.display_name.as_ref().map(|name| Tag {
                name: name.clone(),
                score: e.score,
            })
        })
        .collect()
}

/// Flatten a source record. Only the id is required.
pub fn flatten_source(record: SourceRecord) -> Option<SourceRow> {
    let openalex_id = record.short_id();
    if openalex_id.is_empty() {
        return None;
    }
    let openalex_id = openalex_id.to_string();
    let stats = record.summary_stats.unwrap_or_default();

    Some(SourceRow {
        openalex_id,
        issn_l: record.issn_l,
        issns: record.issn,
        display_name: record.display_name,
        source_type: record.source_type,
        host_organization: record.host_organization_name,
        works_count: record.works_count,
        cited_by_count: record.cited_by_count,
        two_year_mean_citedness: stats.two_year_mean_citedness,
        h_index: stats.h_index,
        i10_index: stats.i10_index,
        is_oa: record.is_oa,
        is_in_doaj: record.is_in_doaj,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_WORK: &str = r#"{
        "id": "https://openalex.org/W2741809807",
        "doi": "https://doi.org/10.1038/s41586-018-0102-6",
        "title": "Sample Title",
        "publication_year": 2025,
        "publication_date": "2025-01-15",
        "type": "article",
        "cited_by_count": 42,
        "open_access": {"is_oa": true, "oa_status": "gold"},
        "abstract_inverted_index": {"Hello": [0], "world": [1]},
        "authorships": [
            {"author": {"display_name": "Ada Lovelace"}},
            {"author": {"display_name": "Charles Babbage"}}
        ],
        "concepts": [
            {"display_name": "C1", "score": 0.9}, {"display_name": "C2", "score": 0.8},
            {"display_name": "C3", "score": 0.7}, {"display_name": "C4", "score": 0.6},
            {"display_name": "C5", "score": 0.5}, {"display_name": "C6", "score": 0.4}
        ],
        "topics": [
            {"display_name": "T1", "score": 0.9}, {"display_name": "T2", "score": 0.8},
            {"display_name": "T3", "score": 0.7}, {"display_name": "T4", "score": 0.6}
        ],
        "primary_location": {"source": {
            "id": "https://openalex.org/S137773608",
            "display_name": "Nature",
            "issn": ["0028-0836", "1476-4687"],
            "host_organization_name": "Nature Portfolio"
        }},
        "biblio": {"volume": "558", "issue": "7708", "first_page": "60", "last_page": "65"},
        "referenced_works": ["https://openalex.org/W1", "https://openalex.org/W2"]
    }"#;

    fn sample() -> WorkRecord {
        serde_json::from_str(SAMPLE_WORK).unwrap()
    }

    #[test]
    fn flatten_full_record() {
        let row = flatten_work(sample(), None).unwrap();
        assert_eq!(row.openalex_id, "W2741809807");
        assert_eq!(row.doi.as_deref(), Some("10.1038/s41586-018-0102-6"));
        assert_eq!(row.year, 2025);
        assert_eq!(row.abstract_text.as_deref(), Some("Hello world"));
        assert_eq!(row.authors, vec!["Ada Lovelace", "Charles Babbage"]);
        assert_eq!(row.source.as_deref(), Some("Nature"));
        assert_eq!(row.source_id.as_deref(), Some("S137773608"));
        assert_eq!(row.issn.as_deref(), Some("0028-0836"));
        assert_eq!(row.publisher.as_deref(), Some("Nature Portfolio"));
        assert_eq!(row.volume.as_deref(), Some("558"));
        assert_eq!(row.referenced_works, vec!["W1", "W2"]);
        assert!(row.raw_json.is_none());
    }

    #[test]
    fn tag_limits() {
        let row = flatten_work(sample(), None).unwrap();
        assert_eq!(row.concepts.len(), 5);
        assert_eq!(row.concepts[0].name, "C1");
        assert_eq!(row.topics.len(), 3);
        assert_eq!(row.topics[2].name, "T3");
    }

    #[test]
    fn missing_year_is_dropped() {
        let rec: WorkRecord =
            serde_json::from_str(r#"{"id": "https://openalex.org/W1", "title": "no year"}"#)
                .unwrap();
        assert!(flatten_work(rec, None).is_none());
    }

    #[test]
    fn missing_id_is_dropped() {
        let rec: WorkRecord =
            serde_json::from_str(r#"{"title": "anonymous", "publication_year": 2020}"#).unwrap();
        assert!(flatten_work(rec, None).is_none());
    }

    #[test]
    fn display_name_fills_missing_title() {
        let rec: WorkRecord = serde_json::from_str(
            r#"{"id": "W1", "display_name": "Fallback", "publication_year": 2020}"#,
        )
        .unwrap();
        let row = flatten_work(rec, None).unwrap();
        assert_eq!(row.title.as_deref(), Some("Fallback"));
    }

    #[test]
    fn raw_line_retained_on_request() {
        let row = flatten_work(sample(), Some(SAMPLE_WORK)).unwrap();
        assert_eq!(row.raw_json.as_deref(), Some(SAMPLE_WORK));
    }

    #[test]
    fn flatten_source_record() {
        let rec: SourceRecord = serde_json::from_str(
            r#"{
                "id": "https://openalex.org/S1",
                "issn_l": "1111-2222",
                "issn": ["1111-2222", "3333-4444"],
                "display_name": "Journal of Tests",
                "summary_stats": {"2yr_mean_citedness": 3.2}
            }"#,
        )
        .unwrap();
        let row = flatten_source(rec).unwrap();
        assert_eq!(row.openalex_id, "S1");
        assert_eq!(row.issns.len(), 2);
        assert_eq!(row.two_year_mean_citedness, Some(3.2));
    }

    #[test]
    fn source_without_id_is_dropped() {
        let rec: SourceRecord = serde_json::from_str(r#"{"display_name": "nameless"}"#).unwrap();
        assert!(flatten_source(rec).is_none());
    }
}
