use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::strategy::Strategy;

/// Maximum number of saved replies kept.
pub const HISTORY_CAPACITY: usize = 50;

/// Stored in place of a strategy when none was selected.
pub const NOT_APPLICABLE: &str = "N/A";

/// A saved single reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Creation time in milliseconds since the epoch; unique within a history.
    pub id: i64,
    /// Strategy selected when the reply was saved.
    #[serde(with = "strategy_or_na")]
    pub strategy: Option<Strategy>,
    /// The saved reply text.
    pub response: String,
    /// When the entry was created.
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Saved replies, newest first, at most [`HISTORY_CAPACITY`] long.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    /// Build from stored entries, dropping anything past capacity.
    pub fn from_entries(mut entries: Vec<HistoryEntry>) -> Self {
        entries.truncate(HISTORY_CAPACITY);
        Self { entries }
    }

    /// Create an entry stamped `now` and prepend it, evicting the oldest past capacity.
    ///
    /// The id is the creation time in milliseconds, bumped past the newest
    /// existing id so ids stay unique and increasing.
    pub fn record(
        &mut self,
        strategy: Option<Strategy>,
        response: impl Into<String>,
        now: DateTime<Utc>,
    ) -> &HistoryEntry {
        let mut id = now.timestamp_millis();
        if let Some(newest) = self.entries.first() {
            id = id.max(newest.id + 1);
        }

        self.entries.insert(
            0,
            HistoryEntry {
                id,
                strategy,
                response: response.into(),
                created_at: now,
            },
        );
        self.entries.truncate(HISTORY_CAPACITY);
        &self.entries[0]
    }

    /// Find an entry by id.
    pub fn get(&self, id: i64) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Entries, newest first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the history is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

mod strategy_or_na {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::NOT_APPLICABLE;
    use crate::strategy::Strategy;

    pub fn serialize<S: Serializer>(value: &Option<Strategy>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(strategy) => strategy.serialize(s),
            None => s.serialize_str(NOT_APPLICABLE),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Strategy>, D::Error> {
        let raw = String::deserialize(d)?;
        if raw == NOT_APPLICABLE {
            return Ok(None);
        }
        Strategy::lookup(&raw)
            .map(Some)
            .map_err(serde::de::Error::custom)
    }
}
