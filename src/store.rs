// src/store.rs

//! Deduplicated, ordered result store.

use std::collections::HashSet;

use crate::models::Record;

/// Holds accepted records, most recently found first.
///
/// Threshold filtering happens upstream in the probe; the store only
/// dedups and orders. Records are immutable once accepted.
#[derive(Debug, Default)]
pub struct ResultStore {
    records: Vec<Record>,
    ids: HashSet<String>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the record at the head unless its id is already present.
    ///
    /// Returns whether the record was accepted.
    pub fn add_if_new(&mut self, record: Record) -> bool {
        if !self.ids.insert(record.id.clone()) {
            return false;
        }
        self.records.insert(0, record);
        true
    }

    /// Ordered view of the collected records for export.
    pub fn snapshot(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop all collected records. Only called on explicit user request.
    pub fn clear(&mut self) {
        self.records.clear();
        self.ids.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, order: u32) -> Record {
        Record::new(id, 100, format!("item[{order}]"), order)
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut store = ResultStore::new();
        assert!(store.add_if_new(record("urn:li:activity:1", 0)));
        assert!(!store.add_if_new(record("urn:li:activity:1", 1)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_most_recent_first_ordering() {
        let mut store = ResultStore::new();
        store.add_if_new(record("urn:li:activity:1", 0));
        store.add_if_new(record("urn:li:activity:2", 1));
        store.add_if_new(record("urn:li:activity:3", 2));

        let ids: Vec<_> = store.snapshot().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["urn:li:activity:3", "urn:li:activity:2", "urn:li:activity:1"]
        );
    }

    #[test]
    fn test_clear_empties_everything() {
        let mut store = ResultStore::new();
        store.add_if_new(record("urn:li:activity:1", 0));
        store.clear();
        assert!(store.is_empty());
        // The id is reusable after an explicit clear.
        assert!(store.add_if_new(record("urn:li:activity:1", 1)));
    }
}
