//! SQLite-backed leaderboard for local runs and tests.
//!
//! Mirrors the hosted table's column set so entries round-trip unchanged.

use std::sync::Mutex;

use async_trait::async_trait;
use rusqlite::{Connection, params};
use serde_json::Value;

use super::{Leaderboard, LeaderboardEntry, NewEntry};
use crate::error::AppError;

pub struct SqliteLeaderboard {
    conn: Mutex<Connection>,
}

impl SqliteLeaderboard {
    pub fn open(path: &str) -> Result<Self, AppError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS optimized_leaderboard (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                protein INTEGER NOT NULL,
                energy INTEGER NOT NULL,
                user_id TEXT,
                user_name TEXT NOT NULL,
                machine_config TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn in_memory() -> Result<Self, AppError> {
        Self::open(":memory:")
    }
}

#[async_trait]
impl Leaderboard for SqliteLeaderboard {
    async fn insert(&self, entry: NewEntry) -> Result<(), AppError> {
        let config_json = serde_json::to_string(&entry.machine_config)?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO optimized_leaderboard (protein, energy, user_id, user_name, machine_config)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                entry.protein as i64,
                entry.energy as i64,
                entry.user_id,
                entry.user_name,
                config_json,
            ],
        )?;
        Ok(())
    }

    async fn top(&self, n: usize) -> Result<Vec<LeaderboardEntry>, AppError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT protein, energy, user_id, user_name, machine_config, created_at
             FROM optimized_leaderboard
             ORDER BY protein DESC
             LIMIT ?1",
        )?;

        let rows = stmt
            .query_map([n as i64], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, Option<String>>(5)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let entries = rows
            .into_iter()
            .map(|(protein, energy, user_id, user_name, config_raw, created_at)| {
                // Unparsable config text survives as a string value; display
                // turns it into the placeholder.
                let machine_config = serde_json::from_str::<Value>(&config_raw)
                    .unwrap_or(Value::String(config_raw));
                LeaderboardEntry {
                    protein: protein.max(0) as u64,
                    energy: energy.max(0) as u64,
                    user_id,
                    user_name,
                    machine_config,
                    created_at,
                }
            })
            .collect();

        Ok(entries)
    }
}
