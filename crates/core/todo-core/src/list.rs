use crate::task::{Summary, Task, TaskId};
use std::collections::HashMap;

/// Ordered tasks with unique ids.
///
/// Lookup goes through an id index; `order` keeps fetch order for full
/// replacements and append order for creates.
#[derive(Debug, Clone, Default)]
pub struct TaskList {
    order: Vec<TaskId>,
    tasks: HashMap<TaskId, Task>,
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    /// A repeated id keeps its first position and its last value.
    pub fn from_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        let mut list = Self::new();
        for task in tasks {
            list.push(task);
        }
        list
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn contains(&self, id: &TaskId) -> bool {
        self.tasks.contains_key(id)
    }

    pub fn position(&self, id: &TaskId) -> Option<usize> {
        if !self.contains(id) {
            return None;
        }
        self.order.iter().position(|existing| existing == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> + '_ {
        self.order.iter().filter_map(|id| self.tasks.get(id))
    }

    /// Append a task, or overwrite in place if its id is already present.
    /// Returns the task's index.
    pub fn push(&mut self, task: Task) -> usize {
        if let Some(index) = self.position(&task.id) {
            self.tasks.insert(task.id.clone(), task);
            return index;
        }
        self.order.push(task.id.clone());
        self.tasks.insert(task.id.clone(), task);
        self.order.len() - 1
    }

    /// Overwrite the entry for `id` at its current position.
    ///
    /// No-op returning `None` when `id` is absent. If the replacement carries
    /// a different id, the slot is re-keyed and any other entry with that id
    /// is dropped.
    pub fn replace(&mut self, id: &TaskId, task: Task) -> Option<usize> {
        let mut index = self.position(id)?;
        if task.id != *id {
            if let Some(other) = self.position(&task.id) {
                self.order.remove(other);
                if other < index {
                    index -= 1;
                }
            }
            self.tasks.remove(id);
            self.order[index] = task.id.clone();
        }
        self.tasks.insert(task.id.clone(), task);
        Some(index)
    }

    pub fn remove(&mut self, id: &TaskId) -> Option<Task> {
        let task = self.tasks.remove(id)?;
        self.order.retain(|existing| existing != id);
        Some(task)
    }

    pub fn to_vec(&self) -> Vec<Task> {
        self.iter().cloned().collect()
    }

    pub fn summary(&self) -> Summary {
        Summary::from_tasks(self.iter())
    }
}

impl<'a> IntoIterator for &'a TaskList {
    type Item = &'a Task;
    type IntoIter = Box<dyn Iterator<Item = &'a Task> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

impl FromIterator<Task> for TaskList {
    fn from_iter<I: IntoIterator<Item = Task>>(iter: I) -> Self {
        Self::from_tasks(iter)
    }
}
