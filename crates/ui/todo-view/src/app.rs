//! Controller wiring user actions to the service, the mirror and the view.

use crate::view::{ItemRow, ListContainer, NodeId, Patch, SummaryView, TaskForm};
use todo_core::{
    TaskId, TaskList, TaskListService, TaskStore, TaskStoreExt, TodoApi, TodoError,
};
use tracing::{info, instrument, warn};

/// One named task list: service, local mirror and view patches.
///
/// Every action returns the patches that bring an already rendered
/// [`ListContainer`] in line with the service. Failed actions are logged and
/// return only the patches needed to undo optimistic input (a toggled
/// checkbox), usually none.
pub struct TodoApp<A, S> {
    service: TaskListService<A>,
    store: S,
    list_name: String,
}

impl<A: TodoApi, S: TaskStore> TodoApp<A, S> {
    /// Open a list, seeding it from the local mirror when one exists.
    pub async fn open(api: A, store: S, list_name: impl Into<String>) -> Self {
        let list_name = list_name.into();
        let cached = match store.load_tasks(&list_name).await {
            Ok(tasks) => tasks.unwrap_or_default(),
            Err(e) => {
                warn!(list = %list_name, error = %e, "Could not read local mirror");
                Vec::new()
            }
        };
        Self {
            service: TaskListService::with_tasks(api, cached),
            store,
            list_name,
        }
    }

    pub fn list_name(&self) -> &str {
        &self.list_name
    }

    pub fn service(&self) -> &TaskListService<A> {
        &self.service
    }

    pub fn service_mut(&mut self) -> &mut TaskListService<A> {
        &mut self.service
    }

    pub fn tasks(&self) -> &TaskList {
        self.service.tasks()
    }

    /// Log in and fetch the list, persisting it on success.
    ///
    /// Returns whether a fresh list was loaded from the server.
    #[instrument(skip(self), fields(list = %self.list_name))]
    pub async fn init(&mut self, identity: &str) -> bool {
        if let Err(e) = self.service.login(identity).await {
            warn!(error = %e, "Login failed");
            return false;
        }
        match self.service.fetch_all().await {
            Ok(tasks) => info!(count = tasks.len(), "Fetched task list"),
            Err(e) => {
                warn!(error = %e, "Fetching the task list failed");
                return false;
            }
        }
        self.persist().await;
        true
    }

    pub fn render(&self) -> ListContainer {
        ListContainer::render(self.service.tasks())
    }

    #[instrument(skip(self, form), fields(list = %self.list_name))]
    pub async fn submit_create(&mut self, form: TaskForm) -> Vec<Patch> {
        let draft = match form.to_draft() {
            Ok(draft) => draft,
            Err(e) => {
                warn!(error = %e, "Invalid create form");
                return Vec::new();
            }
        };
        let before = self.service.tasks().len();
        match self.service.create(draft).await {
            Ok(task) => {
                self.persist().await;
                let row = ItemRow::from_task(&task);
                let node = row.node.clone();
                // A known id is overwritten in place rather than appended
                let row_patch = if self.service.tasks().len() > before {
                    Patch::AppendRow { node, row }
                } else {
                    Patch::ReplaceRow { node, row }
                };
                vec![row_patch, self.summary_patch(), Patch::ClearCreateForm]
            }
            Err(e) => {
                self.log_failure("create", &e);
                Vec::new()
            }
        }
    }

    #[instrument(skip(self, form), fields(list = %self.list_name, id = %id))]
    pub async fn submit_edit(&mut self, id: &TaskId, form: TaskForm) -> Vec<Patch> {
        let draft = match form.to_draft() {
            Ok(draft) => draft,
            Err(e) => {
                warn!(error = %e, "Invalid edit form");
                return Vec::new();
            }
        };
        match self.service.edit(id, draft).await {
            Ok(_) => {
                self.persist().await;
                self.row_refresh(id)
            }
            Err(e) => {
                self.log_failure("edit", &e);
                Vec::new()
            }
        }
    }

    /// A failed toggle puts the checkbox back to the stored state.
    #[instrument(skip(self), fields(list = %self.list_name, id = %id))]
    pub async fn toggle(&mut self, id: &TaskId) -> Vec<Patch> {
        match self.service.toggle_complete(id).await {
            Ok(_) => {
                self.persist().await;
                self.row_refresh(id)
            }
            Err(e) => {
                self.log_failure("toggle", &e);
                match self.service.tasks().get(id) {
                    Some(task) => vec![Patch::SetChecked {
                        node: NodeId::from(id),
                        checked: task.checked,
                    }],
                    None => Vec::new(),
                }
            }
        }
    }

    #[instrument(skip(self), fields(list = %self.list_name, id = %id))]
    pub async fn remove(&mut self, id: &TaskId) -> Vec<Patch> {
        match self.service.remove(id).await {
            Ok(true) => {
                self.persist().await;
                vec![
                    Patch::RemoveRow {
                        node: NodeId::from(id),
                    },
                    self.summary_patch(),
                ]
            }
            Ok(false) => Vec::new(),
            Err(e) => {
                self.log_failure("remove", &e);
                Vec::new()
            }
        }
    }

    fn summary_patch(&self) -> Patch {
        Patch::UpdateSummary(SummaryView::from(self.service.summary()))
    }

    fn row_refresh(&self, id: &TaskId) -> Vec<Patch> {
        let mut patches = Vec::with_capacity(2);
        if let Some(task) = self.service.tasks().get(id) {
            let row = ItemRow::from_task(task);
            patches.push(Patch::ReplaceRow {
                node: NodeId::from(id),
                row,
            });
        }
        patches.push(self.summary_patch());
        patches
    }

    fn log_failure(&self, action: &str, error: &TodoError) {
        warn!(action, error = %error, "Action failed, view left unchanged");
    }

    /// The mirror is never authoritative; write failures are only logged.
    async fn persist(&self) {
        if let Err(e) = self
            .store
            .save_tasks(&self.list_name, self.service.tasks())
            .await
        {
            warn!(list = %self.list_name, error = %e, "Failed to update local mirror");
        }
    }
}
