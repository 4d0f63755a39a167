//! Hosted leaderboard over Supabase's PostgREST API.

use async_trait::async_trait;

use super::{Leaderboard, LeaderboardEntry, NewEntry};
use crate::error::AppError;

const TABLE: &str = "optimized_leaderboard";

pub struct SupabaseLeaderboard {
    base_url: String,
    anon_key: String,
    client: reqwest::Client,
}

impl SupabaseLeaderboard {
    /// `base_url` is the project URL, e.g. `https://xyz.supabase.co`.
    pub fn new(
        base_url: impl Into<String>,
        anon_key: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            client,
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, TABLE)
    }
}

#[async_trait]
impl Leaderboard for SupabaseLeaderboard {
    async fn insert(&self, entry: NewEntry) -> Result<(), AppError> {
        let resp = self
            .client
            .post(self.table_url())
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .header("Prefer", "return=minimal")
            .json(&[entry])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(AppError::upstream(format!(
                "leaderboard insert failed ({status}): {text}"
            )));
        }

        Ok(())
    }

    async fn top(&self, n: usize) -> Result<Vec<LeaderboardEntry>, AppError> {
        let resp = self
            .client
            .get(self.table_url())
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .query(&[
                ("select", "*"),
                ("order", "protein.desc"),
                ("limit", &n.to_string()),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(AppError::upstream(format!(
                "leaderboard read failed ({status}): {text}"
            )));
        }

        let entries: Vec<LeaderboardEntry> = resp.json().await?;
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn table_url_points_at_postgrest() {
        let store = SupabaseLeaderboard::new(
            "https://project.supabase.co/",
            "anon",
            reqwest::Client::new(),
        );
        assert_eq!(
            store.table_url(),
            "https://project.supabase.co/rest/v1/optimized_leaderboard"
        );
    }

    #[test]
    fn new_entry_serializes_to_table_columns() {
        let entry = NewEntry {
            protein: 150,
            energy: 30,
            user_id: Some("uuid-1".to_string()),
            user_name: "flex".to_string(),
            machine_config: json!({"B": 3, "C": 1}),
        };

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            value,
            json!({
                "protein": 150,
                "energy": 30,
                "user_id": "uuid-1",
                "user_name": "flex",
                "machine_config": {"B": 3, "C": 1}
            })
        );
    }

    #[test]
    fn rows_deserialize_including_extra_columns() {
        let rows: Vec<LeaderboardEntry> = serde_json::from_value(json!([
            {
                "id": 1,
                "protein": 500,
                "energy": 50,
                "user_id": "uuid-2",
                "user_name": "arnie",
                "machine_config": {"E": 1, "C": 1},
                "created_at": "2025-02-10T09:30:00+00:00"
            }
        ]))
        .unwrap();

        assert_eq!(rows[0].protein, 500);
        assert_eq!(rows[0].user_name, "arnie");
    }
}
