//! Snapshot shard discovery and manifest verification
//!
//! A local snapshot directory mirrors the S3 layout: shards live under
//! `updated_date=YYYY-MM-DD/part_NNNN.gz`. The Redshift-style manifest
//! file, when present, lists every shard with its record count and is
//! used to verify the download is complete before loading.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;

/// One shard of the snapshot, identified by its path relative to the
/// entity directory. That relative key is what the checkpoint table
/// stores, so a snapshot can move between machines without losing
/// progress.
#[derive(Debug, Clone)]
pub struct Shard {
    pub path: PathBuf,
    pub key: String,
}

impl Shard {
    /// Extract updated_date from the shard key
    pub fn updated_date(&self) -> Option<NaiveDate> {
        let marker = "updated_date=";
        let start = self.key.find(marker)? + marker.len();
        let date_str = self.key.get(start..start + 10)?;
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").ok()
    }

    /// Extract part number from the shard key (e.g., part_0003 -> 3)
    pub fn part_number(&self) -> Option<usize> {
        let marker = "part_";
        let start = self.key.rfind(marker)? + marker.len();
        let end = self.key[start..].find('.')? + start;
        self.key[start..end].parse().ok()
    }
}

/// List all shards under an entity directory, sorted by key so every
/// run claims them in the same order.
pub fn list_shards(entity_dir: &Path) -> Result<Vec<Shard>, alexdb_core::StageError> {
    let pattern = entity_dir.join("updated_date=*").join("part_*.gz");
    let mut shards: Vec<Shard> = glob::glob(&pattern.to_string_lossy())?
        .filter_map(Result::ok)
        .map(|path| {
            let key = path
                .strip_prefix(entity_dir)
                .unwrap_or(&path)
                .to_string_lossy()
                .replace('\\', "/");
            Shard { path, key }
        })
        .collect();
    shards.sort_by(|a, b| a.key.cmp(&b.key));
    Ok(shards)
}

/// Redshift-style manifest shipped alongside the snapshot
#[derive(Debug, Deserialize)]
pub struct Manifest {
    pub entries: Vec<ManifestEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ManifestEntry {
    /// S3 url (e.g., "s3://openalex/data/works/updated_date=2025-01-01/part_0000.gz")
    pub url: String,
    #[serde(default)]
    pub meta: Option<EntryMeta>,
}

#[derive(Debug, Deserialize)]
pub struct EntryMeta {
    pub content_length: u64,
    pub record_count: u64,
}

impl Manifest {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn load(path: &Path) -> Result<Self, alexdb_core::StageError> {
        let json = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&json).map_err(std::io::Error::other)?)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total record count declared by the manifest (None when any entry
    /// lacks metadata).
    pub fn declared_records(&self) -> Option<u64> {
        self.entries
            .iter()
            .map(|e| e.meta.as_ref().map(|m| m.record_count))
            .sum()
    }

    /// Shard keys listed in the manifest but absent on disk.
    pub fn missing_shards(&self, local: &[Shard]) -> Vec<String> {
        self.entries
            .iter()
            .filter_map(|e| e.shard_key())
            .filter(|key| !local.iter().any(|s| &s.key == key))
            .collect()
    }
}

impl ManifestEntry {
    /// Shard key relative to the entity directory
    pub fn shard_key(&self) -> Option<String> {
        let start = self.url.find("updated_date=")?;
        Some(self.url[start..].to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE_MANIFEST: &str = r#"{
        "entries": [
            {
                "url": "s3://openalex/data/works/updated_date=2025-01-15/part_0000.gz",
                "meta": {"content_length": 123456, "record_count": 1000}
            },
            {
                "url": "s3://openalex/data/works/updated_date=2025-01-14/part_0001.gz",
                "meta": {"content_length": 234567, "record_count": 2000}
            }
        ]
    }"#;

    fn touch(dir: &Path, rel: &str) {
        let path = dir.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"").unwrap();
    }

    #[test]
    fn lists_shards_sorted() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "updated_date=2025-01-15/part_0001.gz");
        touch(dir.path(), "updated_date=2025-01-14/part_0000.gz");
        touch(dir.path(), "updated_date=2025-01-15/part_0000.gz");
        // Not a shard
        touch(dir.path(), "updated_date=2025-01-15/manifest");

        let shards = list_shards(dir.path()).unwrap();
        let keys: Vec<&str> = shards.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "updated_date=2025-01-14/part_0000.gz",
                "updated_date=2025-01-15/part_0000.gz",
                "updated_date=2025-01-15/part_0001.gz",
            ]
        );
    }

    #[test]
    fn shard_key_fields() {
        let shard = Shard {
            path: PathBuf::new(),
            key: "updated_date=2025-01-15/part_0003.gz".to_string(),
        };
        assert_eq!(
            shard.updated_date(),
            Some(NaiveDate::from_ymd_opt(2025, 1, 15).unwrap())
        );
        assert_eq!(shard.part_number(), Some(3));
    }

    #[test]
    fn parse_manifest() {
        let m = Manifest::from_json(SAMPLE_MANIFEST).unwrap();
        assert_eq!(m.len(), 2);
        assert_eq!(m.declared_records(), Some(3000));
    }

    #[test]
    fn manifest_without_meta_has_no_declared_total() {
        let json = r#"{
            "entries": [{"url": "s3://openalex/data/works/updated_date=2025-01-15/part_0000.gz"}]
        }"#;
        let m = Manifest::from_json(json).unwrap();
        assert!(m.entries[0].meta.is_none());
        assert_eq!(m.declared_records(), None);
    }

    #[test]
    fn detects_missing_shards() {
        let m = Manifest::from_json(SAMPLE_MANIFEST).unwrap();
        let local = vec![Shard {
            path: PathBuf::new(),
            key: "updated_date=2025-01-15/part_0000.gz".to_string(),
        }];
        let missing = m.missing_shards(&local);
        assert_eq!(missing, vec!["updated_date=2025-01-14/part_0001.gz"]);
    }
}
