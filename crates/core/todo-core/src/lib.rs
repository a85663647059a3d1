//! Core types for the task list client.
//!
//! - [`TaskListService`] keeps an in-memory [`TaskList`] in step with the
//!   remote to-do API.
//! - [`Transport`] and [`TaskStore`] are the network and persistence
//!   capabilities; [`HttpTodoApi`] turns raw HTTP responses into tagged
//!   [`ApiResult`]s.

pub mod api;
pub mod error;
pub mod list;
pub mod service;
pub mod session;
pub mod store;
pub mod task;
pub mod transport;

#[cfg(test)]
mod testing;

pub use api::{HttpTodoApi, TodoApi};
pub use error::{
    ApiError, ApiResult, StoreError, StoreResult, TodoError, TodoResult, TransportError,
    TransportResult,
};
pub use list::TaskList;
pub use service::TaskListService;
pub use session::{BearerToken, LoginResponse};
pub use store::{InMemoryTaskStore, TaskStore, TaskStoreExt};
pub use task::{Priority, PriorityError, Summary, Task, TaskDraft, TaskId};
pub use transport::{Transport, TransportRequest, TransportResponse};

// Re-export http types used in the transport contract
pub use http::{Method, StatusCode};
