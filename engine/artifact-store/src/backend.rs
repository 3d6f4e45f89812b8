//! Artifact store backends

use crate::config::{ArtifactKind, StoreConfig};
use crate::error::{Result, StoreError};
use async_trait::async_trait;
use box_score_engine::PlayersArtifact;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Storage for the documents a run produces
///
/// `replace_document` is all-or-nothing: a reader sees either the previous
/// document or the new one, never a partial write.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Prepare the store (create directories, etc.)
    async fn initialize(&mut self) -> Result<()>;

    /// Load a document, `None` if it has never been written
    async fn load_document(&self, kind: ArtifactKind) -> Result<Option<Value>>;

    /// Replace a document
    async fn replace_document(&self, kind: ArtifactKind, document: &Value) -> Result<()>;

    /// Get the store configuration
    fn config(&self) -> &StoreConfig;

    /// Load the players artifact written by a previous run
    async fn load_players(&self) -> Result<Option<PlayersArtifact>> {
        match self.load_document(ArtifactKind::Players).await? {
            Some(document) => Ok(Some(serde_json::from_value(document)?)),
            None => Ok(None),
        }
    }

    /// Replace the players artifact
    async fn replace_players(&self, artifact: &PlayersArtifact) -> Result<()> {
        let document = serde_json::to_value(artifact)?;
        self.replace_document(ArtifactKind::Players, &document).await
    }
}

/// Local file system store
pub struct LocalArtifactStore {
    config: StoreConfig,
    initialized: bool,
}

impl LocalArtifactStore {
    /// Create a new local store
    pub fn new(config: StoreConfig) -> Result<Self> {
        config.validate().map_err(StoreError::config)?;
        Ok(Self { config, initialized: false })
    }

    /// Create a new local store with default file names
    pub fn with_default_config(data_dir: impl Into<std::path::PathBuf>) -> Result<Self> {
        Self::new(StoreConfig::new(data_dir))
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &std::path::PathBuf {
        &self.config.data_dir
    }

    fn ensure_initialized(&self) -> Result<()> {
        if !self.initialized {
            return Err(StoreError::invalid_operation("Store not initialized"));
        }
        Ok(())
    }

    fn encode(&self, document: &Value) -> Result<Vec<u8>> {
        let mut bytes = if self.config.pretty {
            serde_json::to_vec_pretty(document)?
        } else {
            serde_json::to_vec(document)?
        };
        bytes.push(b'\n');
        Ok(bytes)
    }

    /// Write to a sibling temp file, sync it, then rename over the target
    async fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
        let mut temp_name = path.as_os_str().to_owned();
        temp_name.push(".tmp");
        let temp_path = Path::new(&temp_name);

        let mut file = tokio::fs::File::create(temp_path).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        drop(file);

        if let Err(e) = tokio::fs::rename(temp_path, path).await {
            let _ = tokio::fs::remove_file(temp_path).await;
            return Err(e.into());
        }
        Ok(())
    }
}

#[async_trait]
impl ArtifactStore for LocalArtifactStore {
    async fn initialize(&mut self) -> Result<()> {
        tokio::fs::create_dir_all(&self.config.data_dir).await?;
        self.initialized = true;
        info!("Local artifact store initialized at {:?}", self.config.data_dir);
        Ok(())
    }

    async fn load_document(&self, kind: ArtifactKind) -> Result<Option<Value>> {
        self.ensure_initialized()?;

        let path = self.config.path_for(kind);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No {:?} artifact at {:?}", kind, path);
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let document = serde_json::from_slice(&bytes)?;
        debug!("Loaded {:?} artifact from {:?}", kind, path);
        Ok(Some(document))
    }

    async fn replace_document(&self, kind: ArtifactKind, document: &Value) -> Result<()> {
        self.ensure_initialized()?;

        let path = self.config.path_for(kind);
        let bytes = self.encode(document)?;
        Self::write_atomically(&path, &bytes).await?;

        info!("Wrote {:?} artifact to {:?} ({} bytes)", kind, path, bytes.len());
        Ok(())
    }

    fn config(&self) -> &StoreConfig {
        &self.config
    }
}

/// In-memory store for testing
pub struct InMemoryArtifactStore {
    config: StoreConfig,
    documents: Arc<Mutex<HashMap<ArtifactKind, Value>>>,
    initialized: bool,
}

impl InMemoryArtifactStore {
    /// Create a new in-memory store
    pub fn new(config: StoreConfig) -> Self {
        Self { config, documents: Arc::new(Mutex::new(HashMap::new())), initialized: false }
    }

    /// Pre-load a document, e.g. a cache from an earlier run
    pub async fn seed(&self, kind: ArtifactKind, document: Value) {
        self.documents.lock().await.insert(kind, document);
    }

    fn ensure_initialized(&self) -> Result<()> {
        if !self.initialized {
            return Err(StoreError::invalid_operation("Store not initialized"));
        }
        Ok(())
    }
}

#[async_trait]
impl ArtifactStore for InMemoryArtifactStore {
    async fn initialize(&mut self) -> Result<()> {
        self.initialized = true;
        info!("In-memory artifact store initialized");
        Ok(())
    }

    async fn load_document(&self, kind: ArtifactKind) -> Result<Option<Value>> {
        self.ensure_initialized()?;
        let documents = self.documents.lock().await;
        Ok(documents.get(&kind).cloned())
    }

    async fn replace_document(&self, kind: ArtifactKind, document: &Value) -> Result<()> {
        self.ensure_initialized()?;
        let mut documents = self.documents.lock().await;
        documents.insert(kind, document.clone());
        debug!("Stored {:?} artifact in memory", kind);
        Ok(())
    }

    fn config(&self) -> &StoreConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_in_memory_requires_initialize() {
        let store = InMemoryArtifactStore::new(StoreConfig::default());
        let result = store.load_document(ArtifactKind::Schedule).await;
        assert!(matches!(result, Err(StoreError::InvalidOperation(_))));
    }

    #[tokio::test]
    async fn test_in_memory_replace_and_load() {
        let mut store = InMemoryArtifactStore::new(StoreConfig::default());
        store.initialize().await.unwrap();

        assert!(store.load_document(ArtifactKind::Schedule).await.unwrap().is_none());

        store.replace_document(ArtifactKind::Schedule, &json!({"1": {"BOS": 3}})).await.unwrap();
        store.replace_document(ArtifactKind::Schedule, &json!({"1": {"BOS": 4}})).await.unwrap();

        let loaded = store.load_document(ArtifactKind::Schedule).await.unwrap().unwrap();
        assert_eq!(loaded["1"]["BOS"], 4);
    }

    #[tokio::test]
    async fn test_seeded_cache_is_visible() {
        let mut store = InMemoryArtifactStore::new(StoreConfig::default());
        store.initialize().await.unwrap();
        store.seed(ArtifactKind::Positions, json!({"players": []})).await;

        assert!(store.load_document(ArtifactKind::Positions).await.unwrap().is_some());
        assert!(store.load_players().await.unwrap().is_none());
    }
}
