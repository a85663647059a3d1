//! Terminal rendering of view components.

use crate::view::{CreateForm, ItemRow, ListContainer, Patch, SummaryView};
use console::style;
use std::fmt::Write;

/// Renders containers and patches as styled terminal text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer {
    /// Include the create form below the rows.
    pub show_form: bool,
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_form(mut self) -> Self {
        self.show_form = true;
        self
    }

    pub fn render(&self, container: &ListContainer) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.summary(&container.summary));
        if container.rows.is_empty() {
            let _ = writeln!(out, "  {}", style("(no tasks)").dim());
        }
        for row in &container.rows {
            let _ = writeln!(out, "{}", self.row(row));
        }
        if self.show_form {
            let _ = writeln!(out, "{}", self.form(&container.create));
        }
        out
    }

    pub fn summary(&self, summary: &SummaryView) -> String {
        summary
            .labels()
            .iter()
            .map(|(label, count)| format!("{}: {}", style(label).bold(), count))
            .collect::<Vec<_>>()
            .join("  ")
    }

    pub fn row(&self, row: &ItemRow) -> String {
        let mark = if row.checked {
            style("[x]").green()
        } else {
            style("[ ]").yellow()
        };
        let text = if row.checked {
            style(row.text.as_str()).dim()
        } else {
            style(row.text.as_str())
        };
        format!(
            "  {} {} {} {} {}",
            mark,
            style(format!("#{}", row.id)).cyan(),
            text,
            style(format!("(p{})", row.priority)).magenta(),
            style(format!("by {}", row.owner)).dim()
        )
    }

    fn form(&self, form: &CreateForm) -> String {
        format!(
            "  {} text: {:?} priority: {}",
            style(CreateForm::SUBMIT_LABEL).bold(),
            form.text,
            form.priority
        )
    }

    /// One-line description of a patch, for change feedback.
    pub fn describe(&self, patch: &Patch) -> String {
        match patch {
            Patch::AppendRow { row, .. } => {
                format!("{} {}", style("added").green(), self.row(row).trim_start())
            }
            Patch::RemoveRow { node } => format!("{} {}", style("removed").red(), node),
            Patch::ReplaceRow { row, .. } => {
                format!("{} {}", style("updated").cyan(), self.row(row).trim_start())
            }
            Patch::SetChecked { node, checked } => {
                format!("{} {} checked={}", style("reverted").yellow(), node, checked)
            }
            Patch::UpdateSummary(summary) => self.summary(summary),
            Patch::ClearCreateForm => style("form cleared").dim().to_string(),
        }
    }
}
