//! Persistent vector store in a local index directory.
//!
//! [`LocalVectorStore`] keeps each collection in memory and mirrors it to
//! `<index_dir>/<collection>.collection.json`. Every mutation rewrites the
//! affected file through a temporary sibling and a rename, so a crash never
//! leaves a half-written collection behind. Search is an exhaustive cosine
//! scan, which is fine for the single-document corpora this store targets.
//!
//! The store assumes a single writer process; there is no file locking.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::document::{IndexedEntry, SearchResult};
use crate::error::{RagError, Result};
use crate::filter::MetadataFilter;
use crate::inmemory::{Collection, missing_collection};
use crate::vectorstore::VectorStore;

const BACKEND: &str = "Local";
const FILE_SUFFIX: &str = ".collection.json";

/// A [`VectorStore`] persisted as JSON files under a directory.
///
/// # Example
///
/// ```rust,ignore
/// use docchat_rag::{LocalVectorStore, VectorStore};
///
/// let store = LocalVectorStore::open("./docchat_index").await?;
/// store.create_collection("medical_reports", 1024).await?;
/// ```
#[derive(Debug)]
pub struct LocalVectorStore {
    root: PathBuf,
    collections: RwLock<HashMap<String, Collection>>,
}

impl LocalVectorStore {
    /// Open (creating if needed) the index directory and load every
    /// collection file in it.
    pub async fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| io_error(&root, "create index directory", e))?;

        let mut collections = HashMap::new();
        let mut dir =
            tokio::fs::read_dir(&root).await.map_err(|e| io_error(&root, "read index directory", e))?;
        while let Some(item) =
            dir.next_entry().await.map_err(|e| io_error(&root, "read index directory", e))?
        {
            let path = item.path();
            let Some(name) = collection_name_from_path(&path) else { continue };
            let bytes =
                tokio::fs::read(&path).await.map_err(|e| io_error(&path, "read collection", e))?;
            let collection: Collection = serde_json::from_slice(&bytes).map_err(|e| {
                RagError::store(BACKEND, format!("corrupt collection file {}: {e}", path.display()))
            })?;
            debug!(collection = %name, entries = collection.entries.len(), "loaded collection");
            collections.insert(name, collection);
        }

        info!(path = %root.display(), collections = collections.len(), "opened local vector store");
        Ok(Self { root, collections: RwLock::new(collections) })
    }

    /// The index directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}{FILE_SUFFIX}"))
    }

    async fn persist(&self, name: &str, collection: &Collection) -> Result<()> {
        let path = self.collection_path(name);
        let tmp = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec(collection)
            .map_err(|e| RagError::store(BACKEND, format!("failed to serialize '{name}': {e}")))?;
        tokio::fs::write(&tmp, bytes).await.map_err(|e| io_error(&tmp, "write collection", e))?;
        tokio::fs::rename(&tmp, &path).await.map_err(|e| io_error(&path, "replace collection", e))?;
        debug!(collection = name, entries = collection.entries.len(), "persisted collection");
        Ok(())
    }
}

/// Collection names become file names, so keep them to a portable alphabet.
fn validate_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        && !name.starts_with('.');
    if valid {
        Ok(())
    } else {
        Err(RagError::store(
            BACKEND,
            format!("invalid collection name '{name}': use letters, digits, '_', '-' or '.'"),
        ))
    }
}

fn collection_name_from_path(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;
    let name = file_name.strip_suffix(FILE_SUFFIX)?;
    if validate_name(name).is_err() {
        warn!(path = %path.display(), "ignoring collection file with invalid name");
        return None;
    }
    Some(name.to_string())
}

fn io_error(path: &Path, action: &str, err: std::io::Error) -> RagError {
    RagError::store(BACKEND, format!("failed to {action} at {}: {err}", path.display()))
}

#[async_trait]
impl VectorStore for LocalVectorStore {
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()> {
        validate_name(name)?;
        let mut collections = self.collections.write().await;
        if let Some(existing) = collections.get_mut(name) {
            if existing.dimensions == 0 && dimensions != 0 {
                existing.dimensions = dimensions;
                let snapshot = existing.clone();
                self.persist(name, &snapshot).await?;
            }
            return Ok(());
        }

        let collection = Collection::new(dimensions);
        self.persist(name, &collection).await?;
        collections.insert(name.to_string(), collection);
        info!(collection = name, dimensions, "created collection");
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        if collections.remove(name).is_some() {
            let path = self.collection_path(name);
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(io_error(&path, "remove collection", e)),
            }
            info!(collection = name, "deleted collection");
        }
        Ok(())
    }

    async fn upsert(&self, collection: &str, entries: &[IndexedEntry]) -> Result<()> {
        let mut collections = self.collections.write().await;
        let current =
            collections.get(collection).ok_or_else(|| missing_collection(BACKEND, collection))?;

        // Apply to a copy so a failed write leaves memory and disk in agreement.
        let mut updated = current.clone();
        updated.upsert(entries, BACKEND)?;
        self.persist(collection, &updated).await?;
        collections.insert(collection.to_string(), updated);
        Ok(())
    }

    async fn delete_where(&self, collection: &str, filter: &MetadataFilter) -> Result<usize> {
        let mut collections = self.collections.write().await;
        let current =
            collections.get(collection).ok_or_else(|| missing_collection(BACKEND, collection))?;

        let mut updated = current.clone();
        let removed = updated.delete_where(filter);
        if removed > 0 {
            self.persist(collection, &updated).await?;
            collections.insert(collection.to_string(), updated);
        }
        debug!(collection, %filter, removed, "deleted entries");
        Ok(removed)
    }

    async fn replace_where(
        &self,
        collection: &str,
        filter: &MetadataFilter,
        entries: &[IndexedEntry],
    ) -> Result<usize> {
        let mut collections = self.collections.write().await;
        let current =
            collections.get(collection).ok_or_else(|| missing_collection(BACKEND, collection))?;

        // One clone, one write: the file never holds the source half-replaced.
        let mut updated = current.clone();
        let removed = updated.replace_where(filter, entries, BACKEND)?;
        self.persist(collection, &updated).await?;
        collections.insert(collection.to_string(), updated);
        debug!(collection, %filter, removed, inserted = entries.len(), "replaced entries");
        Ok(removed)
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let collections = self.collections.read().await;
        let store =
            collections.get(collection).ok_or_else(|| missing_collection(BACKEND, collection))?;
        Ok(store.entries.len())
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<SearchResult>> {
        let collections = self.collections.read().await;
        let store =
            collections.get(collection).ok_or_else(|| missing_collection(BACKEND, collection))?;
        store.search(embedding, top_k, filter, BACKEND)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_restricted_to_file_safe_characters() {
        assert!(validate_name("medical_reports-v2.1").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("../escape").is_err());
        assert!(validate_name(".hidden").is_err());
        assert!(validate_name("with space").is_err());
    }

    #[test]
    fn only_collection_files_are_recognised() {
        assert_eq!(
            collection_name_from_path(Path::new("/idx/docs.collection.json")).as_deref(),
            Some("docs")
        );
        assert_eq!(collection_name_from_path(Path::new("/idx/docs.collection.json.tmp")), None);
        assert_eq!(collection_name_from_path(Path::new("/idx/notes.txt")), None);
    }
}
