use crate::commands::{self, App};
use crate::config::Config;
use anyhow::Result;
use console::{Term, style};
use dialoguer::{Input, Select, theme::ColorfulTheme};
use todo_core::{Priority, Task};
use todo_view::{TaskForm, TextRenderer};

const ACTIONS: [&str; 6] = ["Add task", "Edit task", "Toggle task", "Remove task", "Refresh", "Quit"];

/// Menu-driven session against one list.
pub async fn run(config: &Config) -> Result<()> {
    let mut app = commands::connect(config).await?;
    let term = Term::stdout();
    let theme = ColorfulTheme::default();
    let renderer = TextRenderer::new();

    term.clear_screen()?;
    println!("{}", style(format!("=== {} ===", config.list.name)).bold().cyan());
    println!("Logged in as {}", style(&config.list.identity).green().bold());

    loop {
        println!();
        print!("{}", renderer.render(&app.render()));

        let action = Select::with_theme(&theme)
            .with_prompt("What next?")
            .items(&ACTIONS)
            .default(0)
            .interact()?;

        let outcome = match action {
            0 => {
                let form = prompt_form(&theme, "", Priority::default())?;
                commands::add(&mut app, form).await
            }
            1 => match pick_task(&theme, &app, "Edit which task?")? {
                Some(task) => {
                    let form = prompt_form(&theme, &task.value, task.priority)?;
                    commands::edit(&mut app, &task.id, form).await
                }
                None => continue,
            },
            2 => match pick_task(&theme, &app, "Toggle which task?")? {
                Some(task) => commands::toggle(&mut app, &task.id).await,
                None => continue,
            },
            3 => match pick_task(&theme, &app, "Remove which task?")? {
                Some(task) => commands::remove(&mut app, &task.id).await,
                None => continue,
            },
            4 => {
                if !app.init(&config.list.identity).await {
                    term.write_line(&format!("{} Refresh failed", style("!").red().bold()))?;
                }
                continue;
            }
            _ => {
                term.write_line("Goodbye!")?;
                return Ok(());
            }
        };

        match outcome {
            Ok(patches) => commands::print_patches(&renderer, &patches),
            Err(e) => term.write_line(&format!("{} {:#}", style("!").red().bold(), e))?,
        }
    }
}

fn prompt_form(theme: &ColorfulTheme, text: &str, priority: Priority) -> Result<TaskForm> {
    let value: String = Input::with_theme(theme)
        .with_prompt("Text")
        .with_initial_text(text)
        .interact_text()?;
    let priority: String = Input::with_theme(theme)
        .with_prompt(format!("Priority ({}-{})", Priority::MIN, Priority::MAX))
        .default(priority.to_string())
        .validate_with(|input: &String| -> Result<(), String> {
            Priority::parse(input).map(|_| ()).map_err(|e| e.to_string())
        })
        .interact_text()?;
    Ok(TaskForm::new(value, priority))
}

fn pick_task(theme: &ColorfulTheme, app: &App, prompt: &str) -> Result<Option<Task>> {
    let tasks = app.service().snapshot();
    if tasks.is_empty() {
        println!("{}", style("The list is empty").dim());
        return Ok(None);
    }
    let items: Vec<String> = tasks
        .iter()
        .map(|task| {
            let mark = if task.checked { "x" } else { " " };
            format!("[{}] #{} {}", mark, task.id, task.value)
        })
        .collect();

    let selection = Select::with_theme(theme)
        .with_prompt(prompt)
        .items(&items)
        .default(0)
        .interact_opt()?;
    Ok(selection.map(|index| tasks[index].clone()))
}

