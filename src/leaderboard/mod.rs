//! The global optimization leaderboard.
//!
//! Rows are insert-only: the application never updates or deletes an entry,
//! and display reads the top slice by protein descending. The store itself
//! is an external collaborator behind the [`Leaderboard`] trait — hosted
//! Postgres in production, SQLite for local runs and tests.

pub mod sqlite;
pub mod supabase;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;

/// Shown when a stored machine configuration cannot be decoded.
const INVALID_CONFIG: &str = "Invalid configuration";

/// A row on the leaderboard. Immutable once stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub protein: u64,
    pub energy: u64,
    pub user_id: Option<String>,
    pub user_name: String,
    /// Canonically a JSON object mapping machine id to run count. Legacy
    /// rows may hold the same object JSON-encoded as a string.
    pub machine_config: Value,
    pub created_at: Option<String>,
}

/// A new row to insert. The store assigns id and created_at.
#[derive(Debug, Clone, Serialize)]
pub struct NewEntry {
    pub protein: u64,
    pub energy: u64,
    pub user_id: Option<String>,
    pub user_name: String,
    pub machine_config: Value,
}

/// Where leaderboard rows live.
#[async_trait]
pub trait Leaderboard: Send + Sync {
    async fn insert(&self, entry: NewEntry) -> Result<(), AppError>;

    /// The top `n` entries by protein descending.
    async fn top(&self, n: usize) -> Result<Vec<LeaderboardEntry>, AppError>;
}

/// Decode a stored machine configuration, tolerating the string-encoded
/// legacy form. `None` means the value is unusable in any shape.
pub fn decode_machine_config(value: &Value) -> Option<BTreeMap<String, u64>> {
    let object = match value {
        Value::String(raw) => serde_json::from_str::<Value>(raw).ok()?,
        other => other.clone(),
    };

    let map = object.as_object()?;
    let mut runs = BTreeMap::new();
    for (id, count) in map {
        runs.insert(id.clone(), count.as_u64()?);
    }
    Some(runs)
}

/// Display form of a configuration: zero counts dropped, `A:5, B:2`.
/// A failed decode renders a placeholder, never an error.
pub fn format_machine_config(value: &Value) -> String {
    match decode_machine_config(value) {
        Some(runs) => runs
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(id, count)| format!("{id}:{count}"))
            .collect::<Vec<_>>()
            .join(", "),
        None => INVALID_CONFIG.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_canonical_object() {
        let runs = decode_machine_config(&json!({"A": 5, "B": 0})).unwrap();
        assert_eq!(runs.get("A"), Some(&5));
        assert_eq!(runs.get("B"), Some(&0));
    }

    #[test]
    fn decodes_string_encoded_object() {
        let runs = decode_machine_config(&json!(r#"{"A":5,"E":1}"#)).unwrap();
        assert_eq!(runs.get("E"), Some(&1));
    }

    #[test]
    fn garbage_decodes_to_none() {
        assert!(decode_machine_config(&json!("not json")).is_none());
        assert!(decode_machine_config(&json!(42)).is_none());
        assert!(decode_machine_config(&json!({"A": "five"})).is_none());
        assert!(decode_machine_config(&json!({"A": -1})).is_none());
    }

    #[test]
    fn format_drops_zero_counts() {
        assert_eq!(format_machine_config(&json!({"A": 5, "B": 0, "C": 2})), "A:5, C:2");
    }

    #[test]
    fn format_handles_string_encoded_config() {
        assert_eq!(format_machine_config(&json!(r#"{"D":1}"#)), "D:1");
    }

    #[test]
    fn format_renders_placeholder_on_decode_failure() {
        assert_eq!(format_machine_config(&json!("{{broken")), INVALID_CONFIG);
    }

    #[test]
    fn entry_deserializes_from_store_row() {
        let entry: LeaderboardEntry = serde_json::from_value(json!({
            "id": 7,
            "protein": 320,
            "energy": 46,
            "user_id": null,
            "user_name": "flex",
            "machine_config": r#"{"A":1,"C":3}"#,
            "created_at": "2025-03-01T10:00:00Z"
        }))
        .unwrap();

        assert_eq!(entry.protein, 320);
        assert!(entry.user_id.is_none());
        assert_eq!(format_machine_config(&entry.machine_config), "A:1, C:3");
    }
}
