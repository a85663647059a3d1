//! `todo`: command line client for a remote to-do list.
//!
//! Every command logs in with the configured identity, loads the list and
//! keeps a local JSON mirror of it up to date. `cached` reads the mirror only.

mod commands;
mod config;
mod interactive;
mod logging;

use anyhow::Result;
use clap::{Parser, Subcommand};
use crate::config::{Config, Overrides};
use std::path::PathBuf;
use todo_core::TaskId;
use todo_view::{TaskForm, TextRenderer};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (default: $TODO_CONFIG_FILE or ./todo.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Server URL
    #[arg(short, long, global = true)]
    server: Option<String>,

    /// Name of the task list
    #[arg(short, long, global = true)]
    list: Option<String>,

    /// Identity used to log in
    #[arg(short, long, global = true)]
    identity: Option<String>,

    /// Directory holding the local mirror
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Log in, fetch and render the list
    Show,
    /// Print total, completed and pending counts
    Summary,
    /// Create a task
    Add {
        value: String,
        /// Priority between 1 and 100
        #[arg(short, long, default_value = "1")]
        priority: String,
    },
    /// Change a task's text and priority
    Edit {
        id: TaskId,
        value: String,
        /// Priority between 1 and 100
        #[arg(short, long, default_value = "1")]
        priority: String,
    },
    /// Flip a task between completed and pending
    Toggle { id: TaskId },
    /// Delete a task
    Remove { id: TaskId },
    /// Render the local mirror without contacting the server
    Cached,
    /// Start a menu-driven session
    Interactive,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            server: self.server.clone(),
            list: self.list.clone(),
            identity: self.identity.clone(),
            data_dir: self.data_dir.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?.with_overrides(cli.overrides())?;
    logging::init_tracing(&config)?;

    run(cli.command, &config).await
}

async fn run(command: Commands, config: &Config) -> Result<()> {
    let renderer = TextRenderer::new();
    match command {
        Commands::Show => commands::show(config).await,
        Commands::Summary => commands::summary(config).await,
        Commands::Cached => commands::cached(config).await,
        Commands::Interactive => interactive::run(config).await,
        Commands::Add { value, priority } => {
            let mut app = commands::connect(config).await?;
            let patches = commands::add(&mut app, TaskForm::new(value, priority)).await?;
            commands::print_patches(&renderer, &patches);
            Ok(())
        }
        Commands::Edit {
            id,
            value,
            priority,
        } => {
            let mut app = commands::connect(config).await?;
            let patches = commands::edit(&mut app, &id, TaskForm::new(value, priority)).await?;
            commands::print_patches(&renderer, &patches);
            Ok(())
        }
        Commands::Toggle { id } => {
            let mut app = commands::connect(config).await?;
            let patches = commands::toggle(&mut app, &id).await?;
            commands::print_patches(&renderer, &patches);
            Ok(())
        }
        Commands::Remove { id } => {
            let mut app = commands::connect(config).await?;
            let patches = commands::remove(&mut app, &id).await?;
            commands::print_patches(&renderer, &patches);
            Ok(())
        }
    }
}
