//! File-backed [`TaskStore`].
//!
//! Each namespace is one pretty-printed JSON document under the data
//! directory, named after the percent-encoded namespace. Files are written
//! to a temporary sibling and renamed into place, so a reader never sees a
//! half-written mirror.

use async_trait::async_trait;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::Value;
use std::path::{Path, PathBuf};
use todo_core::{StoreResult, TaskStore};
use tokio::fs;
use tracing::{debug, error, instrument, warn};

pub struct FileTaskStore {
    data_dir: PathBuf,
}

impl FileTaskStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the document backing `namespace`.
    pub fn path_for(&self, namespace: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", file_stem(namespace)))
    }
}

/// Everything but ASCII letters, digits and `-` is escaped, `_` and `%`
/// included, so distinct namespaces never share a file.
const FILE_NAME_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-');

/// File stem for a namespace. A bare `_` cannot come out of the encoder and
/// stands for the empty namespace.
fn file_stem(namespace: &str) -> String {
    if namespace.is_empty() {
        "_".to_string()
    } else {
        utf8_percent_encode(namespace, FILE_NAME_ENCODE_SET).to_string()
    }
}

#[async_trait]
impl TaskStore for FileTaskStore {
    #[instrument(skip(self, value))]
    async fn save(&self, namespace: &str, value: Value) -> StoreResult<()> {
        let path = self.path_for(namespace);
        let tmp_path = path.with_extension("json.tmp");

        fs::create_dir_all(&self.data_dir).await.map_err(|e| {
            error!(data_dir = ?self.data_dir, "Failed to create data directory: {}", e);
            e
        })?;

        let json = serde_json::to_string_pretty(&value)?;
        fs::write(&tmp_path, json).await.map_err(|e| {
            error!(file = ?tmp_path, "Failed to write mirror: {}", e);
            e
        })?;
        fs::rename(&tmp_path, &path).await.map_err(|e| {
            error!(file = ?path, "Failed to move mirror into place: {}", e);
            e
        })?;

        debug!(file = ?path, "Saved mirror");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn load(&self, namespace: &str) -> StoreResult<Option<Value>> {
        let path = self.path_for(namespace);
        let json = match fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(file = ?path, "No mirror found");
                return Ok(None);
            }
            Err(e) => {
                error!(file = ?path, "Failed to read mirror: {}", e);
                return Err(e.into());
            }
        };

        match serde_json::from_str(&json) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(file = ?path, "Ignoring corrupt mirror: {}", e);
                Ok(None)
            }
        }
    }
}
