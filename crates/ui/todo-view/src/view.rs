//! View components and the patch commands that update them.
//!
//! Views are plain values. Nothing holds a reference back into a container;
//! the controller emits [`Patch`]es addressed by [`NodeId`] instead.

use serde::Serialize;
use std::fmt;
use todo_core::{Priority, PriorityError, Summary, Task, TaskDraft, TaskId, TaskList};

/// Stable handle of a task row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl From<&TaskId> for NodeId {
    fn from(id: &TaskId) -> Self {
        NodeId(format!("task-{id}"))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw values of a submitted form, as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskForm {
    pub value: String,
    pub priority: String,
}

impl TaskForm {
    pub fn new(value: impl Into<String>, priority: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            priority: priority.into(),
        }
    }

    pub fn to_draft(&self) -> Result<TaskDraft, PriorityError> {
        TaskDraft::parse(self.value.clone(), &self.priority)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SummaryView {
    pub all: usize,
    pub completed: usize,
    pub performing: usize,
}

impl SummaryView {
    pub fn labels(&self) -> [(&'static str, usize); 3] {
        [
            ("all", self.all),
            ("completed", self.completed),
            ("performing", self.performing),
        ]
    }
}

impl From<Summary> for SummaryView {
    fn from(summary: Summary) -> Self {
        Self {
            all: summary.total,
            completed: summary.completed,
            performing: summary.pending,
        }
    }
}

/// The empty "Add task" form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateForm {
    pub text: String,
    pub priority: String,
}

impl CreateForm {
    pub const SUBMIT_LABEL: &'static str = "Add task";

    pub fn empty() -> Self {
        Self {
            text: String::new(),
            priority: Priority::default().to_string(),
        }
    }
}

impl Default for CreateForm {
    fn default() -> Self {
        Self::empty()
    }
}

/// One editable task row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemRow {
    pub node: NodeId,
    pub id: TaskId,
    pub owner: String,
    pub text: String,
    pub priority: String,
    pub checked: bool,
}

impl ItemRow {
    pub const SAVE_LABEL: &'static str = "Save task";
    pub const REMOVE_LABEL: &'static str = "Remove task";

    pub fn from_task(task: &Task) -> Self {
        Self {
            node: NodeId::from(&task.id),
            id: task.id.clone(),
            owner: task.owner.clone(),
            text: task.value.clone(),
            priority: task.priority.to_string(),
            checked: task.checked,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Patch {
    AppendRow { node: NodeId, row: ItemRow },
    RemoveRow { node: NodeId },
    ReplaceRow { node: NodeId, row: ItemRow },
    SetChecked { node: NodeId, checked: bool },
    UpdateSummary(SummaryView),
    ClearCreateForm,
}

/// Summary, create form and one row per task, in list order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListContainer {
    pub summary: SummaryView,
    pub create: CreateForm,
    pub rows: Vec<ItemRow>,
}

impl ListContainer {
    pub fn render(tasks: &TaskList) -> Self {
        Self {
            summary: tasks.summary().into(),
            create: CreateForm::empty(),
            rows: tasks.iter().map(ItemRow::from_task).collect(),
        }
    }

    pub fn row(&self, node: &NodeId) -> Option<&ItemRow> {
        self.rows.iter().find(|row| &row.node == node)
    }

    /// Patches addressing a node that is not mounted are ignored.
    pub fn apply(&mut self, patch: &Patch) {
        match patch {
            Patch::AppendRow { node, row } => {
                if self.row(node).is_none() {
                    self.rows.push(row.clone());
                }
            }
            Patch::RemoveRow { node } => self.rows.retain(|row| &row.node != node),
            Patch::ReplaceRow { node, row } => {
                if let Some(existing) = self.rows.iter_mut().find(|r| &r.node == node) {
                    *existing = row.clone();
                }
            }
            Patch::SetChecked { node, checked } => {
                if let Some(existing) = self.rows.iter_mut().find(|r| &r.node == node) {
                    existing.checked = *checked;
                }
            }
            Patch::UpdateSummary(summary) => self.summary = *summary,
            Patch::ClearCreateForm => self.create = CreateForm::empty(),
        }
    }

    pub fn apply_all<'a>(&mut self, patches: impl IntoIterator<Item = &'a Patch>) {
        for patch in patches {
            self.apply(patch);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: u64, value: &str, checked: bool) -> Task {
        Task {
            id: TaskId::from(id),
            owner: "Test user".to_string(),
            value: value.to_string(),
            priority: Priority::new(5).unwrap(),
            checked,
        }
    }

    #[test]
    fn test_render_follows_list_order() {
        let list = TaskList::from_tasks([task(2, "b", true), task(1, "a", false)]);
        let view = ListContainer::render(&list);

        let texts: Vec<_> = view.rows.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, ["b", "a"]);
        assert_eq!(
            view.summary,
            SummaryView {
                all: 2,
                completed: 1,
                performing: 1
            }
        );
        assert_eq!(view.create, CreateForm::empty());
        assert_eq!(view.create.priority, "1");
    }

    #[test]
    fn test_node_ids_are_stable() {
        let row = ItemRow::from_task(&task(7, "x", false));
        assert_eq!(row.node.to_string(), "task-7");
        assert_eq!(row.node, NodeId::from(&TaskId::from("7")));
    }

    #[test]
    fn test_apply_patches() {
        let mut view = ListContainer::render(&TaskList::from_tasks([task(1, "a", false)]));
        let added = ItemRow::from_task(&task(2, "b", false));

        view.apply(&Patch::AppendRow {
            node: added.node.clone(),
            row: added.clone(),
        });
        view.apply(&Patch::SetChecked {
            node: added.node.clone(),
            checked: true,
        });
        view.apply(&Patch::RemoveRow {
            node: NodeId::from(&TaskId::from(1)),
        });

        assert_eq!(view.rows.len(), 1);
        assert!(view.rows[0].checked);
        assert_eq!(view.rows[0].text, "b");
    }

    #[test]
    fn test_patches_for_unknown_nodes_are_ignored() {
        let mut view = ListContainer::render(&TaskList::new());
        let ghost = ItemRow::from_task(&task(9, "ghost", false));

        view.apply(&Patch::ReplaceRow {
            node: ghost.node.clone(),
            row: ghost.clone(),
        });
        view.apply(&Patch::SetChecked {
            node: ghost.node.clone(),
            checked: true,
        });
        view.apply(&Patch::RemoveRow { node: ghost.node });

        assert!(view.rows.is_empty());
    }

    #[test]
    fn test_form_to_draft() {
        let draft = TaskForm::new("y", "3").to_draft().unwrap();
        assert_eq!(draft.value, "y");
        assert_eq!(draft.priority.get(), 3);
        assert!(TaskForm::new("y", "three").to_draft().is_err());
    }

    #[test]
    fn test_patch_serializes_with_op_tag() {
        let patch = Patch::RemoveRow {
            node: NodeId::from(&TaskId::from(3)),
        };
        let value = serde_json::to_value(&patch).unwrap();
        assert_eq!(value, serde_json::json!({"op": "remove_row", "node": "task-3"}));
    }
}
