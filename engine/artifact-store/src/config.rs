//! Configuration for the artifact store

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Documents produced by a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Player snapshots, population index and failures; also the next run's cache
    Players,
    /// Games per team per week
    Schedule,
    /// Opponents per team per week
    Opponents,
    /// Active players and their positions
    Positions,
}

/// Configuration for the artifact store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory the artifacts are written to
    pub data_dir: PathBuf,

    pub players_file: String,
    pub schedule_file: String,
    pub opponents_file: String,
    pub positions_file: String,

    /// Pretty-print JSON (indent 2) for human inspection
    pub pretty: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            players_file: "players.json".to_string(),
            schedule_file: "schedule.json".to_string(),
            opponents_file: "opponents.json".to_string(),
            positions_file: "player_positions.json".to_string(),
            pretty: true,
        }
    }
}

impl StoreConfig {
    /// Create a new configuration with custom data directory
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into(), ..Default::default() }
    }

    pub fn file_name(&self, kind: ArtifactKind) -> &str {
        match kind {
            ArtifactKind::Players => &self.players_file,
            ArtifactKind::Schedule => &self.schedule_file,
            ArtifactKind::Opponents => &self.opponents_file,
            ArtifactKind::Positions => &self.positions_file,
        }
    }

    /// Full path of an artifact
    pub fn path_for(&self, kind: ArtifactKind) -> PathBuf {
        self.data_dir.join(self.file_name(kind))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        for kind in [
            ArtifactKind::Players,
            ArtifactKind::Schedule,
            ArtifactKind::Opponents,
            ArtifactKind::Positions,
        ] {
            let name = self.file_name(kind);
            if name.trim().is_empty() {
                return Err(format!("File name for {kind:?} must not be empty"));
            }
            if name.contains('/') || name.contains('\\') {
                return Err(format!("File name for {kind:?} must not contain a path separator: {name}"));
            }
        }
        Ok(())
    }
}
