//! Decode OpenAlex abstract inverted index to plaintext
//!
//! OpenAlex stores abstracts as inverted indexes for legal reasons:
//! ```json
//! {"Despite": [0], "growing": [1], "interest": [2, 50], ...}
//! ```
//!
//! This module reconstructs the original text by position.

use serde_json::{Map, Value};

/// Decode inverted index to plaintext abstract
///
/// Input: JSON object mapping words to position arrays
/// Output: Space-separated words in original order
///
/// When two words claim the same position, the one encountered first in
/// the index wins and the duplicate is dropped. The stable sort keeps
/// that choice deterministic.
///
/// # Example
/// ```
/// use serde_json::json;
/// use alexdb_snapshot::abstract_decode::decode_inverted_index;
///
/// let index = json!({"Hello": [0], "world": [1]});
/// let text = decode_inverted_index(index.as_object().unwrap());
/// assert_eq!(text, "Hello world");
/// ```
pub fn decode_inverted_index(index: &Map<String, Value>) -> String {
    if index.is_empty() {
        return String::new();
    }

    // Collect (position, word) pairs
    let mut pairs: Vec<(usize, &str)> = Vec::new();

    for (word, positions) in index {
        if let Some(arr) = positions.as_array() {
            for pos in arr {
                if let Some(p) = pos.as_u64() {
                    pairs.push((p as usize, word.as_str()));
                }
            }
        }
    }

    pairs.sort_by_key(|(pos, _)| *pos);
    pairs.dedup_by_key(|(pos, _)| *pos);

    let words: Vec<&str> = pairs.into_iter().map(|(_, w)| w).collect();
    words.join(" ")
}

/// Decode inverted index from serde_json::Value
///
/// Returns None if the value is null, not an object, or empty
pub fn decode_abstract(value: Option<&Value>) -> Option<String> {
    let obj = value?.as_object()?;
    let text = decode_inverted_index(obj);
    if text.is_empty() { None } else { Some(text) }
}
