use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// How many past briefings are retained on disk.
const HISTORY_CAP: usize = 20;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BriefingRecord {
    pub timestamp: DateTime<Utc>,
    pub briefing: String,
    pub article_count: usize,
}

/// Persistent log of generated briefings, newest first, backed by a single
/// JSON file. Load and save are both best-effort: a missing or corrupt file
/// reads as empty, and a failed write is logged rather than propagated so
/// persistence problems never break briefing generation.
pub struct BriefingHistory {
    path: PathBuf,
}

impl BriefingHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Vec<BriefingRecord> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return Vec::new(),
        };
        match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(e) => {
                warn!("briefing history at {} is corrupt, starting fresh: {}", self.path.display(), e);
                Vec::new()
            }
        }
    }

    /// Prepend a new briefing and persist, trimming to the retention cap.
    pub fn append(&self, briefing: &str, article_count: usize) {
        let mut records = self.load();
        records.insert(
            0,
            BriefingRecord {
                timestamp: Utc::now(),
                briefing: briefing.to_string(),
                article_count,
            },
        );
        records.truncate(HISTORY_CAP);
        self.save(&records);
    }

    fn save(&self, records: &[BriefingRecord]) {
        let serialized = match serde_json::to_string_pretty(records) {
            Ok(s) => s,
            Err(e) => {
                warn!("failed to serialize briefing history: {}", e);
                return;
            }
        };
        if let Err(e) = std::fs::write(&self.path, serialized) {
            warn!("failed to write briefing history to {}: {}", self.path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let history = BriefingHistory::new(dir.path().join("history.json"));
        assert!(history.load().is_empty());
    }

    #[test]
    fn corrupt_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, "{not json").unwrap();
        let history = BriefingHistory::new(&path);
        assert!(history.load().is_empty());
    }

    #[test]
    fn appends_newest_first_and_caps_retention() {
        let dir = tempfile::tempdir().unwrap();
        let history = BriefingHistory::new(dir.path().join("history.json"));

        for i in 0..25 {
            history.append(&format!("briefing {}", i), i);
        }

        let records = history.load();
        assert_eq!(records.len(), 20);
        assert_eq!(records[0].briefing, "briefing 24");
        assert_eq!(records[0].article_count, 24);
        assert_eq!(records[19].briefing, "briefing 5");
    }

    #[test]
    fn survives_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let history = BriefingHistory::new(dir.path().join("history.json"));
        history.append("morning digest", 12);

        let records = history.load();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].briefing, "morning digest");
        assert_eq!(records[0].article_count, 12);
    }
}
