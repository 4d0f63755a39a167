use serde_json::json;

use brawn::leaderboard::sqlite::SqliteLeaderboard;
use brawn::leaderboard::{Leaderboard, NewEntry, format_machine_config};

fn entry(name: &str, protein: u64, config: serde_json::Value) -> NewEntry {
    NewEntry {
        protein,
        energy: 25,
        user_id: Some(format!("id-{name}")),
        user_name: name.to_string(),
        machine_config: config,
    }
}

#[tokio::test]
async fn top_is_capped_and_sorted_by_protein_descending() {
    let store = SqliteLeaderboard::in_memory().unwrap();
    for protein in [40, 250, 10, 300, 120, 90, 500, 70, 200, 150, 60, 30] {
        store
            .insert(entry(&format!("user-{protein}"), protein, json!({"A": 1})))
            .await
            .unwrap();
    }

    let top = store.top(10).await.unwrap();
    assert_eq!(top.len(), 10);

    let proteins: Vec<u64> = top.iter().map(|e| e.protein).collect();
    let mut sorted = proteins.clone();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    assert_eq!(proteins, sorted);
    assert_eq!(proteins[0], 500);
    // The two smallest never make the cut.
    assert!(!proteins.contains(&10));
    assert!(!proteins.contains(&30));
}

#[tokio::test]
async fn entries_survive_reopening_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("leaderboard-test.db");
    let path_str = path.to_str().unwrap();

    {
        let store = SqliteLeaderboard::open(path_str).unwrap();
        store
            .insert(entry("flex", 180, json!({"B": 4, "A": 2})))
            .await
            .unwrap();
    }

    {
        let store = SqliteLeaderboard::open(path_str).unwrap();
        let top = store.top(10).await.unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].user_name, "flex");
        assert_eq!(top[0].machine_config, json!({"A": 2, "B": 4}));
        assert!(top[0].created_at.is_some());
    }
}

#[tokio::test]
async fn anonymous_entries_keep_a_null_user_id() {
    let store = SqliteLeaderboard::in_memory().unwrap();
    store
        .insert(NewEntry {
            protein: 50,
            energy: 10,
            user_id: None,
            user_name: "Anonymous".to_string(),
            machine_config: json!({"A": 5}),
        })
        .await
        .unwrap();

    let top = store.top(10).await.unwrap();
    assert!(top[0].user_id.is_none());
    assert_eq!(top[0].user_name, "Anonymous");
}

#[tokio::test]
async fn legacy_string_encoded_config_still_displays() {
    let store = SqliteLeaderboard::in_memory().unwrap();
    store
        .insert(entry("old-row", 70, json!(r#"{"D":1,"A":2}"#)))
        .await
        .unwrap();

    let top = store.top(10).await.unwrap();
    assert_eq!(format_machine_config(&top[0].machine_config), "A:2, D:1");
}
