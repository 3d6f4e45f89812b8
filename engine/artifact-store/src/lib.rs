//! # Artifact Store
//!
//! Persists the JSON documents a box score run produces: the players
//! artifact (which doubles as the next run's cache), weekly schedule counts,
//! weekly opponent lists and player positions.
//!
//! ## Architecture
//!
//! - **ArtifactStore**: Abstract trait for storage backends
//! - **LocalArtifactStore**: Files in a data directory, replaced atomically
//! - **InMemoryArtifactStore**: Map-backed store for tests
//!
//! ## Usage
//!
//! ```rust
//! use artifact_store::{create_local_store, ArtifactKind, ArtifactStore};
//! use tempfile::TempDir;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let temp_dir = TempDir::new()?;
//!     let mut store = create_local_store(temp_dir.path())?;
//!     store.initialize().await?;
//!
//!     let counts = serde_json::json!({"1": {"start_date": "2025-10-20", "BOS": 3}});
//!     store.replace_document(ArtifactKind::Schedule, &counts).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod local;

pub use backend::{ArtifactStore, InMemoryArtifactStore, LocalArtifactStore};
pub use config::{ArtifactKind, StoreConfig};
pub use error::{Result, StoreError};
pub use local::{create_local_store, create_local_store_with_config};
