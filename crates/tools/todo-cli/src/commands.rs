use crate::config::Config;
use anyhow::{Context, Result, bail};
use console::style;
use todo_core::{HttpTodoApi, TaskId};
use todo_rest_client::{ReqwestTransport, ReqwestTransportBuilder};
use todo_store::FileTaskStore;
use todo_view::{Patch, TaskForm, TextRenderer, TodoApp};
use tracing::debug;

pub type App = TodoApp<HttpTodoApi<ReqwestTransport>, FileTaskStore>;

/// Build the HTTP client and file mirror, and open the configured list.
pub async fn open_app(config: &Config) -> Result<App> {
    let mut builder = ReqwestTransportBuilder::new(config.server.url.clone());
    if let Some(timeout) = config.timeout() {
        builder = builder.with_timeout(timeout);
    }
    let transport = builder.build().context("Failed to create HTTP client")?;
    let store = FileTaskStore::new(&config.storage.data_dir);
    debug!(data_dir = ?config.storage.data_dir, "Using local mirror");

    Ok(TodoApp::open(HttpTodoApi::new(transport), store, config.list.name.clone()).await)
}

/// Open the list and load it from the server.
pub async fn connect(config: &Config) -> Result<App> {
    let mut app = open_app(config).await?;
    if !app.init(&config.list.identity).await {
        bail!(
            "Could not load list '{}' from {} as '{}'",
            config.list.name,
            config.server.url,
            config.list.identity
        );
    }
    Ok(app)
}

pub fn print_patches(renderer: &TextRenderer, patches: &[Patch]) {
    for patch in patches {
        println!("{}", renderer.describe(patch));
    }
}

fn ensure_known(app: &App, id: &TaskId) -> Result<()> {
    if !app.tasks().contains(id) {
        bail!("No task with id {} in list '{}'", id, app.list_name());
    }
    Ok(())
}

pub async fn show(config: &Config) -> Result<()> {
    let app = connect(config).await?;
    print!("{}", TextRenderer::new().render(&app.render()));
    Ok(())
}

pub async fn summary(config: &Config) -> Result<()> {
    let app = connect(config).await?;
    let summary = app.service().summary();
    println!(
        "total: {}  completed: {}  pending: {}",
        summary.total, summary.completed, summary.pending
    );
    Ok(())
}

/// Render the local mirror without contacting the server.
pub async fn cached(config: &Config) -> Result<()> {
    let app = open_app(config).await?;
    println!(
        "{}",
        style(format!(
            "Local copy of '{}' in {}",
            config.list.name,
            config.storage.data_dir.display()
        ))
        .dim()
    );
    print!("{}", TextRenderer::new().render(&app.render()));
    Ok(())
}

pub async fn add(app: &mut App, form: TaskForm) -> Result<Vec<Patch>> {
    form.to_draft().context("Invalid priority")?;
    let patches = app.submit_create(form).await;
    if patches.is_empty() {
        bail!("Task was not created");
    }
    Ok(patches)
}

pub async fn edit(app: &mut App, id: &TaskId, form: TaskForm) -> Result<Vec<Patch>> {
    ensure_known(app, id)?;
    form.to_draft().context("Invalid priority")?;
    let patches = app.submit_edit(id, form).await;
    if patches.is_empty() {
        bail!("Task {} was not updated", id);
    }
    Ok(patches)
}

pub async fn toggle(app: &mut App, id: &TaskId) -> Result<Vec<Patch>> {
    ensure_known(app, id)?;
    let patches = app.toggle(id).await;
    if matches!(patches.first(), Some(Patch::SetChecked { .. }) | None) {
        bail!("Task {} could not be toggled", id);
    }
    Ok(patches)
}

pub async fn remove(app: &mut App, id: &TaskId) -> Result<Vec<Patch>> {
    ensure_known(app, id)?;
    let patches = app.remove(id).await;
    if patches.is_empty() {
        bail!("Task {} was not removed", id);
    }
    Ok(patches)
}
