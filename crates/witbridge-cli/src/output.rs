//! Output formatting for the CLI.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write;
use witbridge_client::HydrateOutcome;
use witbridge_core::WorkItem;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    #[default]
    Human,
    /// JSON output
    Json,
}

/// Print output in the specified format.
pub fn print<T: Serialize + HumanDisplay>(value: &T, format: OutputFormat) {
    match format {
        OutputFormat::Human => println!("{}", value.human_display()),
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(value).expect("Failed to serialize to JSON")
            );
        }
    }
}

/// Print a list of work item summaries with dynamic column widths.
pub fn print_item_list(items: &[WorkItemSummary], format: OutputFormat) {
    match format {
        OutputFormat::Human => {
            if items.is_empty() {
                println!("No work items found.");
                return;
            }

            let id_width = items
                .iter()
                .map(|i| i.id.to_string().len())
                .max()
                .unwrap_or(2)
                .max(2);
            let type_width = items
                .iter()
                .map(|i| i.work_item_type.len())
                .max()
                .unwrap_or(4)
                .max(4);
            let state_width = items.iter().map(|i| i.state.len()).max().unwrap_or(5).max(5);

            println!(
                "{:<id_w$}  {:<type_w$}  {:<state_w$}  {}",
                "ID",
                "TYPE",
                "STATE",
                "TITLE",
                id_w = id_width,
                type_w = type_width,
                state_w = state_width
            );
            println!("{}", "-".repeat(id_width + type_width + state_width + 26));

            for item in items {
                println!(
                    "{:<id_w$}  {:<type_w$}  {:<state_w$}  {}",
                    item.id,
                    item.work_item_type,
                    item.state,
                    item.title,
                    id_w = id_width,
                    type_w = type_width,
                    state_w = state_width
                );
            }
        }
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(items).expect("Failed to serialize to JSON")
            );
        }
    }
}

/// Print a success message.
pub fn print_success(message: &str, format: OutputFormat) {
    match format {
        OutputFormat::Human => println!("{message}"),
        OutputFormat::Json => println!("{}", success_json(message)),
    }
}

fn success_json(message: &str) -> String {
    serde_json::json!({ "status": "ok", "message": message }).to_string()
}

/// Report hydrate failures on stderr so stdout stays parseable.
pub fn report_failures(outcome: &HydrateOutcome) {
    for failure in &outcome.failures {
        eprintln!(
            "warning: {} item(s) could not be fetched: {}",
            failure.ids.len(),
            failure.error
        );
    }
}

/// Trait for human-readable display.
pub trait HumanDisplay {
    fn human_display(&self) -> String;
}

impl HumanDisplay for WorkItem {
    fn human_display(&self) -> String {
        let mut out = String::new();

        writeln!(out, "ID:        {}", self.id).unwrap();
        writeln!(out, "Rev:       {}", self.rev).unwrap();
        writeln!(out, "Title:     {}", self.title()).unwrap();
        writeln!(out, "Type:      {}", self.work_item_type()).unwrap();
        writeln!(out, "State:     {}", self.state()).unwrap();

        if let Some(assignee) = self.assignee() {
            writeln!(out, "Assignee:  {assignee}").unwrap();
        }

        if let Some(area) = &self.fields.area_path {
            writeln!(out, "Area:      {area}").unwrap();
        }

        if let Some(iteration) = &self.fields.iteration_path {
            writeln!(out, "Iteration: {iteration}").unwrap();
        }

        if let Some(priority) = self.fields.priority {
            writeln!(out, "Priority:  {priority}").unwrap();
        }

        if let Some(severity) = &self.fields.severity {
            writeln!(out, "Severity:  {severity}").unwrap();
        }

        if let Some(created) = &self.fields.created_date {
            writeln!(out, "Created:   {}", format_time(created)).unwrap();
        }

        if let Some(changed) = &self.fields.changed_date {
            writeln!(out, "Changed:   {}", format_time(changed)).unwrap();
        }

        if let Some(description) = &self.fields.description {
            writeln!(out, "\nDescription:\n{description}").unwrap();
        }

        if let Some(criteria) = &self.fields.acceptance_criteria {
            writeln!(out, "\nAcceptance criteria:\n{criteria}").unwrap();
        }

        if !self.fields.extra.is_empty() {
            writeln!(out, "\nOther fields:").unwrap();
            for (key, value) in &self.fields.extra {
                writeln!(out, "  {key}: {value}").unwrap();
            }
        }

        out
    }
}

fn format_time(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Summary view of a work item for list output.
#[derive(Debug, Serialize)]
pub struct WorkItemSummary {
    pub id: u64,
    pub title: String,
    pub work_item_type: String,
    pub state: String,
    pub assignee: Option<String>,
}

impl From<&WorkItem> for WorkItemSummary {
    fn from(item: &WorkItem) -> Self {
        Self {
            id: item.id,
            title: item.title().to_string(),
            work_item_type: item.work_item_type().to_string(),
            state: item.state().to_string(),
            assignee: item.assignee().map(ToString::to_string),
        }
    }
}

impl HumanDisplay for WorkItemSummary {
    fn human_display(&self) -> String {
        let assignee = self.assignee.as_deref().unwrap_or("-");
        format!(
            "{:<8} {:12} {:10} {} ({assignee})",
            self.id, self.work_item_type, self.state, self.title
        )
    }
}
