//! Score Records
//!
//! One player's best completion time on one level.
//! Field names on the wire and on disk are `level`, `playerName`, `time`.

use serde::{Serialize, Deserialize};

/// Level number as submitted by clients.
pub type Level = i64;

/// A player's best time on a level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    /// Level this time was set on.
    pub level: Level,
    /// Player name, matched exactly (case-sensitive, untrimmed).
    pub player_name: String,
    /// Completion time in seconds. Lower is better.
    pub time: f64,
}

impl ScoreRecord {
    /// Create a new record.
    pub fn new(level: Level, player_name: impl Into<String>, time: f64) -> Self {
        Self {
            level,
            player_name: player_name.into(),
            time,
        }
    }

    /// Strictly faster than `other`. Equal times do not count.
    #[inline]
    pub fn beats(&self, other: f64) -> bool {
        self.time < other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_field_names() {
        let record = ScoreRecord::new(1, "Alice", 12.5);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"level":1,"playerName":"Alice","time":12.5}"#);
    }

    #[test]
    fn test_integer_time_loads_as_float() {
        let record: ScoreRecord =
            serde_json::from_str(r#"{"level":3,"playerName":"Bob","time":12}"#).unwrap();
        assert_eq!(record.time, 12.0);
        assert_eq!(record.level, 3);
    }

    #[test]
    fn test_equal_time_does_not_beat() {
        let record = ScoreRecord::new(1, "Alice", 10.0);
        assert!(!record.beats(10.0));
        assert!(record.beats(10.5));
        assert!(!record.beats(9.99));
    }
}
