//! View layer for a task list.
//!
//! [`ListContainer`] is the rendered state, [`TodoApp`] turns user actions
//! into service calls and returns the [`Patch`]es that keep a rendered
//! container current, and [`TextRenderer`] draws either for a terminal.

pub mod app;
pub mod render;
pub mod view;

#[cfg(test)]
mod testing;

pub use app::TodoApp;
pub use render::TextRenderer;
pub use view::{CreateForm, ItemRow, ListContainer, NodeId, Patch, SummaryView, TaskForm};
