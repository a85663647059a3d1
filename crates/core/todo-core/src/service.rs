//! Client-side mirror of the remote task list.

use crate::api::TodoApi;
use crate::error::{ApiError, TodoError, TodoResult};
use crate::list::TaskList;
use crate::session::{BearerToken, LoginResponse};
use crate::task::{Summary, Task, TaskDraft, TaskId};
use tracing::{debug, info, instrument, warn};

/// Holds the session and the in-memory task list, and keeps the list in step
/// with the server.
///
/// Every operation except [`login`](Self::login) fails with
/// [`TodoError::NotAuthenticated`] before touching the network while no
/// session exists. A response that does not have the expected shape never
/// changes the list.
pub struct TaskListService<A> {
    api: A,
    session: Option<BearerToken>,
    tasks: TaskList,
}

impl<A: TodoApi> TaskListService<A> {
    pub fn new(api: A) -> Self {
        Self::with_tasks(api, Vec::new())
    }

    /// Seed the list, typically from the local mirror, before the first fetch.
    pub fn with_tasks(api: A, tasks: Vec<Task>) -> Self {
        Self {
            api,
            session: None,
            tasks: TaskList::from_tasks(tasks),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn session(&self) -> Option<&BearerToken> {
        self.session.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn tasks(&self) -> &TaskList {
        &self.tasks
    }

    pub fn snapshot(&self) -> Vec<Task> {
        self.tasks.to_vec()
    }

    pub fn summary(&self) -> Summary {
        self.tasks.summary()
    }

    fn token(&self) -> TodoResult<&BearerToken> {
        self.session.as_ref().ok_or(TodoError::NotAuthenticated)
    }

    /// Exchange an identity for a session.
    ///
    /// On rejection the current session is left untouched.
    #[instrument(skip(self))]
    pub async fn login(&mut self, identity: &str) -> TodoResult<LoginResponse> {
        let response = match self.api.login(identity).await {
            Ok(response) => response,
            Err(e) if e.is_transport() => return Err(e.into()),
            Err(e) => {
                warn!(error = %e, "Login rejected");
                return Err(TodoError::LoginRejected(e.to_string()));
            }
        };

        let token = BearerToken::from_access_token(&response.access_token).ok_or_else(|| {
            TodoError::LoginRejected("response has no access_token".to_string())
        })?;
        self.session = Some(token);
        info!("Logged in");
        Ok(response)
    }

    /// Replace the whole list with the server's, or leave it untouched.
    #[instrument(skip(self))]
    pub async fn fetch_all(&mut self) -> TodoResult<&TaskList> {
        let tasks = self.api.list(self.token()?).await?;
        self.tasks = TaskList::from_tasks(tasks);
        info!(count = self.tasks.len(), "Replaced task list");
        Ok(&self.tasks)
    }

    #[instrument(skip(self, draft), fields(value = %draft.value, priority = %draft.priority))]
    pub async fn create(&mut self, draft: TaskDraft) -> TodoResult<Task> {
        let task = self.api.create(self.token()?, &draft).await?;
        let index = self.tasks.push(task.clone());
        debug!(id = %task.id, index, "Appended task");
        Ok(task)
    }

    /// `Ok(false)` when the server refused the delete; the list is unchanged.
    /// Transport failures are returned as errors.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn remove(&mut self, id: &TaskId) -> TodoResult<bool> {
        let result = self.api.delete(self.token()?, id).await;
        match result {
            Ok(()) => {
                let removed = self.tasks.remove(id).is_some();
                debug!(removed, "Deleted task");
                Ok(true)
            }
            Err(e @ ApiError::Transport(_)) => Err(e.into()),
            Err(e) => {
                warn!(error = %e, "Delete rejected");
                Ok(false)
            }
        }
    }

    #[instrument(skip(self, draft), fields(id = %id, value = %draft.value, priority = %draft.priority))]
    pub async fn edit(&mut self, id: &TaskId, draft: TaskDraft) -> TodoResult<Task> {
        let task = self.api.update(self.token()?, id, &draft).await?;
        self.replace(id, &task);
        Ok(task)
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn toggle_complete(&mut self, id: &TaskId) -> TodoResult<Task> {
        let task = self.api.toggle(self.token()?, id).await?;
        self.replace(id, &task);
        Ok(task)
    }

    fn replace(&mut self, id: &TaskId, task: &Task) {
        match self.tasks.replace(id, task.clone()) {
            Some(index) => debug!(index, "Replaced task in place"),
            None => debug!("Task no longer in list, response ignored"),
        }
    }
}
