//! Local mirror of the last known task list.

use crate::error::StoreResult;
use crate::list::TaskList;
use crate::task::Task;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

/// One JSON value per namespace.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Overwrite whatever is stored under `namespace`.
    async fn save(&self, namespace: &str, value: Value) -> StoreResult<()>;

    /// `None` when nothing usable is stored.
    async fn load(&self, namespace: &str) -> StoreResult<Option<Value>>;
}

#[async_trait]
impl<S: TaskStore + ?Sized> TaskStore for Arc<S> {
    async fn save(&self, namespace: &str, value: Value) -> StoreResult<()> {
        (**self).save(namespace, value).await
    }

    async fn load(&self, namespace: &str) -> StoreResult<Option<Value>> {
        (**self).load(namespace).await
    }
}

/// Typed helpers for storing task lists.
#[async_trait]
pub trait TaskStoreExt: TaskStore {
    async fn save_tasks(&self, namespace: &str, tasks: &TaskList) -> StoreResult<()> {
        let value = serde_json::to_value(tasks.to_vec())?;
        self.save(namespace, value).await
    }

    /// A stored value that is not a task array loads as `None`.
    async fn load_tasks(&self, namespace: &str) -> StoreResult<Option<Vec<Task>>> {
        let Some(value) = self.load(namespace).await? else {
            return Ok(None);
        };
        match serde_json::from_value(value) {
            Ok(tasks) => Ok(Some(tasks)),
            Err(e) => {
                warn!(namespace, error = %e, "Ignoring stored value that is not a task list");
                Ok(None)
            }
        }
    }
}

impl<S: TaskStore + ?Sized> TaskStoreExt for S {}

#[derive(Clone, Default)]
pub struct InMemoryTaskStore {
    values: Arc<RwLock<HashMap<String, Value>>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn save(&self, namespace: &str, value: Value) -> StoreResult<()> {
        let mut values = self.values.write().await;
        values.insert(namespace.to_string(), value);
        Ok(())
    }

    async fn load(&self, namespace: &str) -> StoreResult<Option<Value>> {
        let values = self.values.read().await;
        Ok(values.get(namespace).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Priority, TaskId};
    use serde_json::json;

    #[tokio::test]
    async fn test_in_memory_store_namespaces() {
        let store = InMemoryTaskStore::new();
        store.save("developers", json!([1, 2])).await.unwrap();
        store.save("designers", json!("other")).await.unwrap();

        assert_eq!(store.load("developers").await.unwrap(), Some(json!([1, 2])));
        assert_eq!(store.load("designers").await.unwrap(), Some(json!("other")));
        assert_eq!(store.load("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_task_round_trip_through_store() {
        let store = InMemoryTaskStore::new();
        let list = TaskList::from_tasks([Task {
            id: TaskId::from(1),
            owner: "Test user".to_string(),
            value: "x".to_string(),
            priority: Priority::new(2).unwrap(),
            checked: false,
        }]);

        store.save_tasks("developers", &list).await.unwrap();
        let loaded = store.load_tasks("developers").await.unwrap().unwrap();
        assert_eq!(loaded, list.to_vec());
    }

    #[tokio::test]
    async fn test_non_task_value_loads_as_none() {
        let store = InMemoryTaskStore::new();
        store.save("developers", json!({"not": "a list"})).await.unwrap();
        assert_eq!(store.load_tasks("developers").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_overwrites_wholesale() {
        let store = InMemoryTaskStore::new();
        store.save("developers", json!([1, 2, 3])).await.unwrap();
        store.save("developers", json!([])).await.unwrap();
        assert_eq!(store.load("developers").await.unwrap(), Some(json!([])));
    }
}
