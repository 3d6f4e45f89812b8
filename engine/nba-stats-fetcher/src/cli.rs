//! Arguments and setup shared by the binaries

use crate::config::FetcherConfig;
use anyhow::{Context, Result};
use artifact_store::{create_local_store_with_config, ArtifactStore, LocalArtifactStore};
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Args)]
pub struct CommonArgs {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Season to fetch (e.g., 2024-25)
    #[arg(long)]
    pub season: Option<String>,

    /// Directory the artifacts are written to
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,
}

impl CommonArgs {
    /// Load configuration and apply command line overrides
    pub fn load_config(&self) -> Result<FetcherConfig> {
        let mut config = FetcherConfig::load(self.config.as_deref())?;

        if let Some(season) = &self.season {
            config.api.season = season.clone();
        }
        if let Some(data_dir) = &self.data_dir {
            config.store.data_dir = data_dir.clone();
        }

        config.validate().map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;
        Ok(config)
    }
}

/// Open and initialize the local artifact store
pub async fn open_store(config: &FetcherConfig) -> Result<LocalArtifactStore> {
    let mut store = create_local_store_with_config(config.store.clone())?;
    store
        .initialize()
        .await
        .with_context(|| format!("Failed to prepare {:?}", config.store.data_dir))?;
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use artifact_store::ArtifactKind;
    use clap::Parser;
    use tempfile::TempDir;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        common: CommonArgs,
    }

    #[test]
    fn test_overrides_apply() {
        let cli = TestCli::try_parse_from(["test", "--season", "2023-24", "--data-dir", "/tmp/nba"]).unwrap();
        let config = cli.common.load_config().unwrap();

        assert_eq!(config.api.season, "2023-24");
        assert_eq!(config.store.data_dir, PathBuf::from("/tmp/nba"));
    }

    #[test]
    fn test_empty_season_is_rejected() {
        let args = CommonArgs { season: Some(String::new()), ..Default::default() };
        assert!(args.load_config().is_err());
    }

    #[tokio::test]
    async fn test_open_store_creates_data_dir() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = FetcherConfig::default();
        config.store.data_dir = temp_dir.path().join("data");

        let store = open_store(&config).await.unwrap();
        assert!(config.store.data_dir.exists());
        assert!(store.load_document(ArtifactKind::Players).await.unwrap().is_none());
    }
}
