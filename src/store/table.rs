//! Best-Time Table
//!
//! In-memory record set enforcing one record per (level, player name),
//! always holding that player's lowest time.
//!
//! Records are kept in insertion order. Listing sorts stably by time, so
//! equal times come back in storage order.

use std::collections::BTreeMap;
use thiserror::Error;
use tracing::warn;

use crate::store::record::{Level, ScoreRecord};

/// Result of an accepted submission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SubmitOutcome {
    /// First time this player finished this level.
    Inserted,
    /// Replaced a slower time.
    Improved {
        /// Time that was replaced.
        previous: f64,
    },
}

/// Rejected submission.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SubmitError {
    /// Submitted time is not strictly lower than the stored one.
    #[error("new time is not better than existing time ({existing})")]
    NotImproved {
        /// Currently stored best time.
        existing: f64,
    },
}

/// Record set with a (level, player name) index.
#[derive(Debug, Default, Clone)]
pub struct ScoreTable {
    /// Records in storage order.
    records: Vec<ScoreRecord>,
    /// level -> player name -> position in `records`.
    index: BTreeMap<Level, BTreeMap<String, usize>>,
}

impl ScoreTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from persisted records, in file order.
    ///
    /// Duplicate (level, player name) entries collapse into the first one,
    /// which keeps the lowest time seen.
    pub fn from_records(records: Vec<ScoreRecord>) -> Self {
        let mut table = Self::new();
        for record in records {
            match table.position(record.level, &record.player_name) {
                Some(pos) => {
                    warn!(
                        level = record.level,
                        player = %record.player_name,
                        "Duplicate record in score file, keeping best time"
                    );
                    let stored = &mut table.records[pos];
                    if record.beats(stored.time) {
                        stored.time = record.time;
                    }
                }
                None => table.push(record),
            }
        }
        table
    }

    /// All records for `level`, fastest first.
    pub fn list_by_level(&self, level: Level) -> Vec<ScoreRecord> {
        let mut listed: Vec<ScoreRecord> = self
            .records
            .iter()
            .filter(|r| r.level == level)
            .cloned()
            .collect();
        listed.sort_by(|a, b| a.time.total_cmp(&b.time));
        listed
    }

    /// Insert or improve a player's time.
    ///
    /// Leaves the table untouched on `NotImproved`.
    pub fn submit(&mut self, record: ScoreRecord) -> Result<SubmitOutcome, SubmitError> {
        match self.position(record.level, &record.player_name) {
            Some(pos) => {
                let stored = &mut self.records[pos];
                if !record.beats(stored.time) {
                    return Err(SubmitError::NotImproved { existing: stored.time });
                }
                let previous = stored.time;
                stored.time = record.time;
                Ok(SubmitOutcome::Improved { previous })
            }
            None => {
                self.push(record);
                Ok(SubmitOutcome::Inserted)
            }
        }
    }

    /// Stored best time for a player on a level.
    pub fn best_time(&self, level: Level, player_name: &str) -> Option<f64> {
        self.position(level, player_name).map(|pos| self.records[pos].time)
    }

    /// All records in storage order.
    pub fn records(&self) -> &[ScoreRecord] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if no records are stored.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn position(&self, level: Level, player_name: &str) -> Option<usize> {
        self.index.get(&level)?.get(player_name).copied()
    }

    fn push(&mut self, record: ScoreRecord) {
        let pos = self.records.len();
        self.index
            .entry(record.level)
            .or_default()
            .insert(record.player_name.clone(), pos);
        self.records.push(record);
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_unknown_level_is_empty() {
        let mut table = ScoreTable::new();
        table.submit(ScoreRecord::new(1, "Alice", 12.5)).unwrap();
        assert!(table.list_by_level(2).is_empty());
        assert!(ScoreTable::new().list_by_level(1).is_empty());
    }

    #[test]
    fn test_first_submission_inserts() {
        let mut table = ScoreTable::new();
        let outcome = table.submit(ScoreRecord::new(1, "Alice", 12.5)).unwrap();
        assert_eq!(outcome, SubmitOutcome::Inserted);
        assert_eq!(table.list_by_level(1), vec![ScoreRecord::new(1, "Alice", 12.5)]);
    }

    #[test]
    fn test_better_time_replaces() {
        let mut table = ScoreTable::new();
        table.submit(ScoreRecord::new(1, "Alice", 12.5)).unwrap();
        let outcome = table.submit(ScoreRecord::new(1, "Alice", 9.0)).unwrap();
        assert_eq!(outcome, SubmitOutcome::Improved { previous: 12.5 });
        assert_eq!(table.best_time(1, "Alice"), Some(9.0));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_worse_time_rejected() {
        let mut table = ScoreTable::new();
        table.submit(ScoreRecord::new(1, "Alice", 12.5)).unwrap();
        let result = table.submit(ScoreRecord::new(1, "Alice", 15.0));
        assert_eq!(result, Err(SubmitError::NotImproved { existing: 12.5 }));
        assert_eq!(table.best_time(1, "Alice"), Some(12.5));
    }

    #[test]
    fn test_equal_time_rejected() {
        let mut table = ScoreTable::new();
        table.submit(ScoreRecord::new(1, "Alice", 12.5)).unwrap();
        let result = table.submit(ScoreRecord::new(1, "Alice", 12.5));
        assert!(matches!(result, Err(SubmitError::NotImproved { .. })));
    }

    #[test]
    fn test_names_are_case_sensitive_and_untrimmed() {
        let mut table = ScoreTable::new();
        table.submit(ScoreRecord::new(1, "Alice", 12.5)).unwrap();
        let lower = table.submit(ScoreRecord::new(1, "alice", 20.0));
        assert_eq!(lower, Ok(SubmitOutcome::Inserted));
        let padded = table.submit(ScoreRecord::new(1, "Alice ", 20.0));
        assert_eq!(padded, Ok(SubmitOutcome::Inserted));
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_same_player_different_levels() {
        let mut table = ScoreTable::new();
        table.submit(ScoreRecord::new(1, "Alice", 12.5)).unwrap();
        table.submit(ScoreRecord::new(2, "Alice", 30.0)).unwrap();
        assert_eq!(table.best_time(1, "Alice"), Some(12.5));
        assert_eq!(table.best_time(2, "Alice"), Some(30.0));
    }

    #[test]
    fn test_ties_keep_storage_order() {
        let mut table = ScoreTable::new();
        table.submit(ScoreRecord::new(1, "Zed", 10.0)).unwrap();
        table.submit(ScoreRecord::new(1, "Amy", 10.0)).unwrap();
        table.submit(ScoreRecord::new(1, "Bob", 5.0)).unwrap();

        let names: Vec<_> = table
            .list_by_level(1)
            .into_iter()
            .map(|r| r.player_name)
            .collect();
        assert_eq!(names, vec!["Bob", "Zed", "Amy"]);
    }

    #[test]
    fn test_from_records_collapses_duplicates() {
        let table = ScoreTable::from_records(vec![
            ScoreRecord::new(1, "Alice", 12.5),
            ScoreRecord::new(1, "Bob", 11.0),
            ScoreRecord::new(1, "Alice", 8.0),
            ScoreRecord::new(1, "Alice", 20.0),
        ]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.records()[0], ScoreRecord::new(1, "Alice", 8.0));
        assert_eq!(table.records()[1], ScoreRecord::new(1, "Bob", 11.0));
    }

    proptest! {
        #[test]
        fn prop_decreasing_times_all_accepted(
            mut times in proptest::collection::vec(0.0f64..1000.0, 1..20)
        ) {
            times.sort_by(|a, b| b.total_cmp(a));
            times.dedup();
            let mut table = ScoreTable::new();
            for &t in &times {
                prop_assert!(table.submit(ScoreRecord::new(7, "Alice", t)).is_ok());
                prop_assert_eq!(table.best_time(7, "Alice"), Some(t));
            }
            prop_assert_eq!(table.len(), 1);
        }

        #[test]
        fn prop_not_better_leaves_table_unchanged(
            best in 0.0f64..1000.0,
            extra in 0.0f64..1000.0,
        ) {
            let mut table = ScoreTable::new();
            table.submit(ScoreRecord::new(1, "Alice", best)).unwrap();
            let before = table.records().to_vec();

            let result = table.submit(ScoreRecord::new(1, "Alice", best + extra));
            prop_assert_eq!(result, Err(SubmitError::NotImproved { existing: best }));
            prop_assert_eq!(table.records(), &before[..]);
        }

        #[test]
        fn prop_listing_sorted_and_unique(
            subs in proptest::collection::vec((0i64..3, 0usize..4, 0.0f64..100.0), 0..60)
        ) {
            let names = ["Alice", "Bob", "Carol", "Dave"];
            let mut table = ScoreTable::new();
            for (level, who, time) in subs {
                let _ = table.submit(ScoreRecord::new(level, names[who], time));
            }

            for level in 0..3 {
                let listed = table.list_by_level(level);
                prop_assert!(listed.windows(2).all(|w| w[0].time <= w[1].time));
                prop_assert!(listed.iter().all(|r| r.level == level));

                let mut seen: Vec<&str> = listed.iter().map(|r| r.player_name.as_str()).collect();
                seen.sort_unstable();
                seen.dedup();
                prop_assert_eq!(seen.len(), listed.len());
            }
        }
    }
}
