//! CLI command implementations.

use crate::output::{self, OutputFormat, WorkItemSummary};
use anyhow::{Context, Result};
use witbridge_client::{UpdateOutcome, WitClient};
use witbridge_core::{CreateFields, UpdateFields};

/// Search work items by free text and print up to `limit` of them.
pub async fn search(
    client: &WitClient,
    query: Option<&str>,
    limit: usize,
    format: OutputFormat,
) -> Result<()> {
    let result = client.search(query).await.context("Search failed")?;
    let outcome = client.get_many(&result.ids()).await;
    output::report_failures(&outcome);

    let mut items = outcome.items;
    items.truncate(limit);

    let summaries: Vec<WorkItemSummary> = items.iter().map(Into::into).collect();
    output::print_item_list(&summaries, format);
    Ok(())
}

/// Fetch and print a single work item.
pub async fn get(client: &WitClient, id: u64, format: OutputFormat) -> Result<()> {
    let item = client.get_item(id).await.context("Failed to get work item")?;
    output::print(&item, format);
    Ok(())
}

/// Create a work item and print the resulting state.
pub async fn create(
    client: &WitClient,
    work_item_type: &str,
    title: &str,
    fields: &CreateFields,
    format: OutputFormat,
) -> Result<()> {
    let item = client
        .create_item(work_item_type, title, fields)
        .await
        .context("Failed to create work item")?;
    output::print(&item, format);
    Ok(())
}

/// Update a work item; a call with no fields set is a no-op.
pub async fn update(
    client: &WitClient,
    id: u64,
    fields: &UpdateFields,
    format: OutputFormat,
) -> Result<()> {
    match client
        .update_item(id, fields)
        .await
        .context("Failed to update work item")?
    {
        UpdateOutcome::Updated(item) => output::print(&item, format),
        UpdateOutcome::Unchanged => output::print_success("Nothing to update.", format),
    }
    Ok(())
}

/// Run raw WIQL, hydrate all matches, and print them.
pub async fn wiql(client: &WitClient, query: &str, format: OutputFormat) -> Result<()> {
    let result = client.run_query(query).await.context("Query failed")?;

    if result.is_empty() {
        output::print_success("Query matched no work items.", format);
        return Ok(());
    }

    let outcome = client.get_many(&result.ids()).await;
    output::report_failures(&outcome);

    let summaries: Vec<WorkItemSummary> = outcome.items.iter().map(Into::into).collect();
    output::print_item_list(&summaries, format);
    Ok(())
}
