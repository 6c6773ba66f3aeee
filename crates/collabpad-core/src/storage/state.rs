//! The persisted document blob.

use super::{BlobStore, StorageError, StorageResult};
use crate::document::{DocumentTree, Notebook, NotebookId, PageId};
use serde::{Deserialize, Serialize};

/// Display name used until the user picks one.
pub const DEFAULT_USER_NAME: &str = "Guest";

fn default_dark_mode() -> bool {
    true
}

fn default_user_name() -> String {
    DEFAULT_USER_NAME.to_string()
}

/// Everything that survives a restart. History, session and tool settings do not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    pub notebooks: Vec<Notebook>,
    #[serde(default)]
    pub current_notebook_id: Option<NotebookId>,
    #[serde(default)]
    pub current_page_id: Option<PageId>,
    #[serde(default = "default_dark_mode")]
    pub dark_mode: bool,
    #[serde(default = "default_user_name")]
    pub current_user_name: String,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self::capture(&DocumentTree::new(), default_dark_mode(), DEFAULT_USER_NAME)
    }
}

impl PersistedState {
    pub fn capture(document: &DocumentTree, dark_mode: bool, user_name: &str) -> Self {
        Self {
            notebooks: document.notebooks().to_vec(),
            current_notebook_id: Some(document.current_notebook_id()),
            current_page_id: Some(document.current_page_id()),
            dark_mode,
            current_user_name: user_name.to_string(),
        }
    }

    /// Rebuild the document tree, repairing dangling pointers.
    pub fn document(&self) -> DocumentTree {
        DocumentTree::from_parts(
            self.notebooks.clone(),
            self.current_notebook_id,
            self.current_page_id,
        )
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn save(&self, store: &dyn BlobStore, key: &str) -> StorageResult<()> {
        store.set(key, &self.to_json()?)
    }

    /// Strict load: missing or malformed blobs are errors.
    pub fn try_load(store: &dyn BlobStore, key: &str) -> StorageResult<Self> {
        let json = store.get(key)?;
        Ok(Self::from_json(&json)?)
    }

    /// Load, falling back to a fresh default document on any failure.
    pub fn load(store: &dyn BlobStore, key: &str) -> Self {
        match Self::try_load(store, key) {
            Ok(state) => state,
            Err(StorageError::NotFound(_)) => {
                log::debug!("no stored state under {key}, starting fresh");
                Self::default()
            }
            Err(e) => {
                log::warn!("discarding unreadable stored state: {e}");
                Self::default()
            }
        }
    }
}
