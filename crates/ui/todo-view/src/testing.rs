use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use todo_core::{
    ApiError, ApiResult, BearerToken, LoginResponse, Task, TaskDraft, TaskId, TodoApi,
};

/// In-memory to-do server.
#[derive(Clone, Default)]
pub struct FakeApi {
    tasks: Arc<Mutex<Vec<Task>>>,
    next_id: Arc<AtomicUsize>,
    calls: Arc<AtomicUsize>,
    reject_login: Arc<AtomicBool>,
    fail_mutations: Arc<AtomicBool>,
}

impl FakeApi {
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let api = Self::default();
        api.next_id.store(tasks.len() + 100, Ordering::SeqCst);
        *api.tasks.lock().unwrap() = tasks;
        api
    }

    /// Id handed to the next created task.
    pub fn set_next_id(&self, id: usize) {
        self.next_id.store(id, Ordering::SeqCst);
    }

    pub fn reject_login(&self) {
        self.reject_login.store(true, Ordering::SeqCst);
    }

    /// Every later create, update, toggle and delete answers 500.
    pub fn fail_mutations(&self) {
        self.fail_mutations.store(true, Ordering::SeqCst);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn mutation(&self) -> ApiResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(ApiError::Server {
                status: 500,
                message: "boom".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl TodoApi for FakeApi {
    async fn login(&self, identity: &str) -> ApiResult<LoginResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.reject_login.load(Ordering::SeqCst) {
            return Err(ApiError::Unauthorized);
        }
        Ok(LoginResponse {
            access_token: format!("token-{identity}"),
            extra: Default::default(),
        })
    }

    async fn list(&self, _token: &BearerToken) -> ApiResult<Vec<Task>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.tasks.lock().unwrap().clone())
    }

    async fn create(&self, _token: &BearerToken, draft: &TaskDraft) -> ApiResult<Task> {
        self.mutation()?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let task = Task {
            id: TaskId::from(id as u64),
            owner: "Test user".to_string(),
            value: draft.value.clone(),
            priority: draft.priority,
            checked: false,
        };
        self.tasks.lock().unwrap().push(task.clone());
        Ok(task)
    }

    async fn delete(&self, _token: &BearerToken, id: &TaskId) -> ApiResult<()> {
        self.mutation()?;
        let mut tasks = self.tasks.lock().unwrap();
        let before = tasks.len();
        tasks.retain(|task| &task.id != id);
        if tasks.len() == before {
            return Err(ApiError::Rejected("Task not found".to_string()));
        }
        Ok(())
    }

    async fn update(&self, _token: &BearerToken, id: &TaskId, draft: &TaskDraft) -> ApiResult<Task> {
        self.mutation()?;
        let mut tasks = self.tasks.lock().unwrap();
        let task = tasks
            .iter_mut()
            .find(|task| &task.id == id)
            .ok_or(ApiError::NotFound)?;
        task.value = draft.value.clone();
        task.priority = draft.priority;
        Ok(task.clone())
    }

    async fn toggle(&self, _token: &BearerToken, id: &TaskId) -> ApiResult<Task> {
        self.mutation()?;
        let mut tasks = self.tasks.lock().unwrap();
        let task = tasks
            .iter_mut()
            .find(|task| &task.id == id)
            .ok_or(ApiError::NotFound)?;
        task.checked = !task.checked;
        Ok(task.clone())
    }
}
