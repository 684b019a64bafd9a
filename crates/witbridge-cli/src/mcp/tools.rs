//! MCP tool definitions and handlers.

use super::protocol::{ToolCallResult, ToolDefinition};
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt::Write;
use witbridge_client::{HydrateOutcome, UpdateOutcome, WitClient};
use witbridge_core::{CreateFields, UpdateFields, WorkItem};

/// Get all available tool definitions.
pub fn get_tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "search_work_items".to_string(),
            description: "Search work items by free text in title or description. Returns the most recently changed matches.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Search text; omit to list the most recently changed items"
                    },
                    "limit": {
                        "type": "integer",
                        "description": "Maximum number of items to return (default: 10)",
                        "default": 10
                    }
                },
                "additionalProperties": false
            }),
        },
        ToolDefinition {
            name: "get_work_item".to_string(),
            description: "Get detailed information about a specific work item.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "id": {
                        "type": "integer",
                        "description": "The work item id"
                    }
                },
                "required": ["id"],
                "additionalProperties": false
            }),
        },
        ToolDefinition {
            name: "create_work_item".to_string(),
            description: "Create a new work item. The type must match one of the remote project's configured types (e.g. Bug, Task, User Story).".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "work_item_type": {
                        "type": "string",
                        "description": "Work item type (e.g. Bug, Task, User Story, Feature)"
                    },
                    "title": {
                        "type": "string",
                        "description": "Title of the work item"
                    },
                    "description": {
                        "type": "string",
                        "description": "Description of the work item"
                    },
                    "assigned_to": {
                        "type": "string",
                        "description": "Assignee email or display name"
                    },
                    "acceptance_criteria": {
                        "type": "string",
                        "description": "Acceptance criteria (applies to Bug, Epic, Feature, Product Backlog Item)"
                    }
                },
                "required": ["work_item_type", "title"],
                "additionalProperties": false
            }),
        },
        ToolDefinition {
            name: "update_work_item".to_string(),
            description: "Update fields on an existing work item. Only the provided fields change; state strings are forwarded as-is and validated remotely.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "id": {
                        "type": "integer",
                        "description": "The work item id"
                    },
                    "title": { "type": "string", "description": "New title" },
                    "description": { "type": "string", "description": "New description" },
                    "state": {
                        "type": "string",
                        "description": "New state (e.g. Active, Resolved, Closed)"
                    },
                    "assigned_to": {
                        "type": "string",
                        "description": "Assignee email or display name"
                    },
                    "priority": { "type": "integer", "description": "Priority (1-4)" },
                    "severity": {
                        "type": "string",
                        "description": "Severity (e.g. 1 - Critical, 2 - High)"
                    },
                    "acceptance_criteria": { "type": "string", "description": "Acceptance criteria" }
                },
                "required": ["id"],
                "additionalProperties": false
            }),
        },
        ToolDefinition {
            name: "run_wiql".to_string(),
            description: "Execute a raw Work Item Query Language (WIQL) query and return the matching items.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "WIQL query text"
                    }
                },
                "required": ["query"],
                "additionalProperties": false
            }),
        },
    ]
}

/// Handle a tool call and return the result.
pub async fn handle_tool_call(
    client: &WitClient,
    name: &str,
    arguments: Option<Value>,
) -> ToolCallResult {
    let args = arguments.unwrap_or(json!({}));

    match name {
        "search_work_items" => handle_search(client, args).await,
        "get_work_item" => handle_get(client, args).await,
        "create_work_item" => handle_create(client, args).await,
        "update_work_item" => handle_update(client, args).await,
        "run_wiql" => handle_wiql(client, args).await,
        _ => ToolCallResult::error(format!("Unknown tool: {name}")),
    }
}

#[derive(Deserialize)]
struct SearchArgs {
    query: Option<String>,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    10
}

async fn handle_search(client: &WitClient, args: Value) -> ToolCallResult {
    let args: SearchArgs = match serde_json::from_value(args) {
        Ok(a) => a,
        Err(e) => return ToolCallResult::error(format!("Invalid arguments: {e}")),
    };

    let result = match client.search(args.query.as_deref()).await {
        Ok(result) => result,
        Err(e) => return ToolCallResult::error(format!("Search failed: {e}")),
    };

    let total = result.work_items.len();
    let mut outcome = client.get_many(&result.ids()).await;

    let mut items = std::mem::take(&mut outcome.items);
    items.truncate(args.limit);

    let mut text = match &args.query {
        Some(query) => format!("Found {total} work item(s) for \"{query}\":\n\n"),
        None => format!("Found {total} work item(s):\n\n"),
    };
    text.push_str(&format_item_list(&items));
    append_failure_note(&mut text, &outcome);

    ToolCallResult::text(text)
}

#[derive(Deserialize)]
struct GetArgs {
    id: u64,
}

async fn handle_get(client: &WitClient, args: Value) -> ToolCallResult {
    let args: GetArgs = match serde_json::from_value(args) {
        Ok(a) => a,
        Err(e) => return ToolCallResult::error(format!("Invalid arguments: {e}")),
    };

    match client.get_item(args.id).await {
        Ok(item) => ToolCallResult::text(format!("Work item details:\n\n{}", format_item(&item))),
        Err(e) => ToolCallResult::error(format!("Failed to get work item: {e}")),
    }
}

#[derive(Deserialize)]
struct CreateArgs {
    work_item_type: String,
    title: String,
    description: Option<String>,
    assigned_to: Option<String>,
    acceptance_criteria: Option<String>,
}

async fn handle_create(client: &WitClient, args: Value) -> ToolCallResult {
    let args: CreateArgs = match serde_json::from_value(args) {
        Ok(a) => a,
        Err(e) => return ToolCallResult::error(format!("Invalid arguments: {e}")),
    };

    let fields = CreateFields {
        description: args.description,
        assigned_to: args.assigned_to,
        acceptance_criteria: args.acceptance_criteria,
    };

    match client.create_item(&args.work_item_type, &args.title, &fields).await {
        Ok(item) => {
            ToolCallResult::text(format!("Created work item:\n\n{}", format_item(&item)))
        }
        Err(e) => ToolCallResult::error(format!("Failed to create work item: {e}")),
    }
}

#[derive(Deserialize)]
struct UpdateArgs {
    id: u64,
    title: Option<String>,
    description: Option<String>,
    state: Option<String>,
    assigned_to: Option<String>,
    priority: Option<i64>,
    severity: Option<String>,
    acceptance_criteria: Option<String>,
}

async fn handle_update(client: &WitClient, args: Value) -> ToolCallResult {
    let args: UpdateArgs = match serde_json::from_value(args) {
        Ok(a) => a,
        Err(e) => return ToolCallResult::error(format!("Invalid arguments: {e}")),
    };

    let fields = UpdateFields {
        title: args.title,
        description: args.description,
        assigned_to: args.assigned_to,
        acceptance_criteria: args.acceptance_criteria,
        state: args.state,
        priority: args.priority,
        severity: args.severity,
    };

    match client.update_item(args.id, &fields).await {
        Ok(UpdateOutcome::Updated(item)) => {
            ToolCallResult::text(format!("Updated work item:\n\n{}", format_item(&item)))
        }
        Ok(UpdateOutcome::Unchanged) => ToolCallResult::text("No fields provided; nothing to update."),
        Err(e) => ToolCallResult::error(format!("Failed to update work item: {e}")),
    }
}

#[derive(Deserialize)]
struct WiqlArgs {
    query: String,
}

async fn handle_wiql(client: &WitClient, args: Value) -> ToolCallResult {
    let args: WiqlArgs = match serde_json::from_value(args) {
        Ok(a) => a,
        Err(e) => return ToolCallResult::error(format!("Invalid arguments: {e}")),
    };

    let result = match client.run_query(&args.query).await {
        Ok(result) => result,
        Err(e) => return ToolCallResult::error(format!("Query failed: {e}")),
    };

    if result.is_empty() {
        return ToolCallResult::text("Query matched no work items.");
    }

    let outcome = client.get_many(&result.ids()).await;

    let mut text = format!(
        "WIQL query results ({} item(s)):\n\nQuery: {}\n\n",
        outcome.items.len(),
        args.query
    );
    text.push_str(&format_item_list(&outcome.items));
    append_failure_note(&mut text, &outcome);

    ToolCallResult::text(text)
}

/// One-per-line brief listing used by search and wiql results.
fn format_item_list(items: &[WorkItem]) -> String {
    let mut out = String::new();
    for item in items {
        let assignee = item.assignee().unwrap_or("unassigned");
        let _ = writeln!(
            out,
            "ID: {}\nTitle: {}\nType: {}\nState: {}\nAssigned to: {}\n---",
            item.id,
            item.title(),
            item.work_item_type(),
            item.state(),
            assignee,
        );
    }
    out
}

/// Full detail block used by get/create/update results.
fn format_item(item: &WorkItem) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "ID: {}", item.id);
    let _ = writeln!(out, "Rev: {}", item.rev);
    let _ = writeln!(out, "Title: {}", item.title());
    let _ = writeln!(out, "Type: {}", item.work_item_type());
    let _ = writeln!(out, "State: {}", item.state());
    let _ = writeln!(out, "Assigned to: {}", item.assignee().unwrap_or("unassigned"));

    if let Some(priority) = item.fields.priority {
        let _ = writeln!(out, "Priority: {priority}");
    }
    if let Some(severity) = &item.fields.severity {
        let _ = writeln!(out, "Severity: {severity}");
    }
    if let Some(created) = &item.fields.created_date {
        let _ = writeln!(out, "Created: {created}");
    }
    if let Some(changed) = &item.fields.changed_date {
        let _ = writeln!(out, "Changed: {changed}");
    }
    if let Some(description) = &item.fields.description {
        let _ = write!(out, "\nDescription:\n{description}\n");
    }
    if let Some(criteria) = &item.fields.acceptance_criteria {
        let _ = write!(out, "\nAcceptance criteria:\n{criteria}\n");
    }

    out
}

/// Make partial hydration visible in the tool output.
fn append_failure_note(text: &mut String, outcome: &HydrateOutcome) {
    if outcome.is_complete() {
        return;
    }

    let missing: usize = outcome.failures.iter().map(|f| f.ids.len()).sum();
    let _ = write!(
        text,
        "\nNote: {missing} item(s) across {} chunk(s) could not be fetched:",
        outcome.failures.len()
    );
    for failure in &outcome.failures {
        if let (Some(first), Some(last)) = (failure.ids.first(), failure.ids.last()) {
            let _ = write!(text, "\n  - ids {first}..{last}: {}", failure.error);
        }
    }
}
