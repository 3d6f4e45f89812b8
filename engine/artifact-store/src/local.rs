//! Local file-based artifact storage

use crate::backend::LocalArtifactStore;
use crate::config::StoreConfig;
use crate::error::Result;

/// Create a new local store with default configuration
pub fn create_local_store(data_dir: impl Into<std::path::PathBuf>) -> Result<LocalArtifactStore> {
    LocalArtifactStore::with_default_config(data_dir)
}

/// Create a new local store with custom configuration
pub fn create_local_store_with_config(config: StoreConfig) -> Result<LocalArtifactStore> {
    LocalArtifactStore::new(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ArtifactStore;
    use crate::config::ArtifactKind;
    use crate::error::StoreError;
    use box_score_engine::{EntitySnapshot, PlayersArtifact, RollingWindowAggregate, StatTotals};
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use tempfile::TempDir;

    fn sample_artifact() -> PlayersArtifact {
        let player = EntitySnapshot {
            id: 203999,
            name: "Nikola Jokic".to_string(),
            team_id: 1610612743,
            team: "DEN".to_string(),
            season: RollingWindowAggregate::from_totals(StatTotals { gp: 10, pts: 290, ..Default::default() }),
            last7: RollingWindowAggregate::zero(),
            last14: RollingWindowAggregate::zero(),
        };
        let fetched_at = Utc.with_ymd_and_hms(2025, 11, 20, 12, 0, 0).unwrap();
        PlayersArtifact::assemble("2025-26", 1, vec![player], Vec::new(), fetched_at)
    }

    #[tokio::test]
    async fn test_local_store_creation() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_local_store(temp_dir.path()).unwrap();
        assert_eq!(store.data_dir(), &temp_dir.path().to_path_buf());
    }

    #[tokio::test]
    async fn test_local_store_initialization_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path().join("nested").join("data");

        let mut store = create_local_store(&data_dir).unwrap();
        store.initialize().await.unwrap();

        assert!(data_dir.exists());
    }

    #[tokio::test]
    async fn test_missing_document_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = create_local_store(temp_dir.path()).unwrap();
        store.initialize().await.unwrap();

        assert!(store.load_document(ArtifactKind::Opponents).await.unwrap().is_none());
        assert!(store.load_players().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_players_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = create_local_store(temp_dir.path()).unwrap();
        store.initialize().await.unwrap();

        let artifact = sample_artifact();
        store.replace_players(&artifact).await.unwrap();

        let loaded = store.load_players().await.unwrap().unwrap();
        assert_eq!(loaded, artifact);
        assert!(temp_dir.path().join("players.json").exists());
        assert!(!temp_dir.path().join("players.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_replace_overwrites_whole_document() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = create_local_store(temp_dir.path()).unwrap();
        store.initialize().await.unwrap();

        store
            .replace_document(ArtifactKind::Schedule, &json!({"1": {"BOS": 3, "LAL": 4}}))
            .await
            .unwrap();
        store.replace_document(ArtifactKind::Schedule, &json!({"2": {"BOS": 2}})).await.unwrap();

        let loaded = store.load_document(ArtifactKind::Schedule).await.unwrap().unwrap();
        assert_eq!(loaded, json!({"2": {"BOS": 2}}));
    }

    #[tokio::test]
    async fn test_pretty_output_is_indented() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = create_local_store(temp_dir.path()).unwrap();
        store.initialize().await.unwrap();

        store.replace_document(ArtifactKind::Schedule, &json!({"1": {"BOS": 3}})).await.unwrap();

        let text = std::fs::read_to_string(temp_dir.path().join("schedule.json")).unwrap();
        assert!(text.contains("\n  \"1\""));
    }

    #[tokio::test]
    async fn test_corrupt_document_is_a_serialization_error() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("players.json"), "{ not json").unwrap();

        let mut store = create_local_store(temp_dir.path()).unwrap();
        store.initialize().await.unwrap();

        let result = store.load_players().await;
        assert!(matches!(result, Err(StoreError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_uninitialized_store_rejects_writes() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_local_store(temp_dir.path()).unwrap();

        let result = store.replace_document(ArtifactKind::Positions, &json!({})).await;
        assert!(matches!(result, Err(StoreError::InvalidOperation(_))));
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() {
        let config = StoreConfig { players_file: String::new(), ..Default::default() };
        assert!(matches!(create_local_store_with_config(config), Err(StoreError::Config(_))));
    }
}
