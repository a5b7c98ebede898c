// src/models/record.rs

//! Collected record data structure.

use serde::{Deserialize, Serialize};

/// A single post collected from the feed.
///
/// Immutable once accepted into the result store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Record {
    /// Stable per-item identifier (namespaced activity token)
    pub id: String,

    /// Popularity metric read from the item's labeled control
    pub metric_value: u64,

    /// Opaque reference to the originating item element
    pub source_ref: String,

    /// Position in discovery order across the whole session
    pub discovery_order: u32,
}

impl Record {
    pub fn new(id: impl Into<String>, metric_value: u64, source_ref: impl Into<String>, discovery_order: u32) -> Self {
        Self {
            id: id.into(),
            metric_value,
            source_ref: source_ref.into(),
            discovery_order,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_roundtrip_json() {
        let record = Record::new("urn:li:activity:7421", 250, "item[0]", 0);
        let json = serde_json::to_string(&record).unwrap();
        let back: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
