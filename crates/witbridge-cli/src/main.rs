//! witbridge CLI - Remote work item tracking from the command line and MCP.

mod commands;
mod mcp;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use witbridge_client::{ClientConfig, WitClient};

#[derive(Parser)]
#[command(name = "witbridge")]
#[command(author, version, about = "Work item tracking bridge CLI")]
#[command(propagate_version = true)]
struct Cli {
    /// Output format
    #[arg(long, global = true, default_value = "human")]
    format: output::OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search work items by free text in title or description
    Search {
        /// Search text (omit to list the most recently changed items)
        query: Option<String>,

        /// Maximum number of items to show
        #[arg(long, short = 'n', default_value = "10")]
        limit: usize,
    },

    /// Get a work item by id
    Get {
        /// Work item id
        id: u64,
    },

    /// Create a new work item
    Create {
        /// Work item type (e.g. Bug, Task, User Story)
        #[arg(long = "type", short = 't')]
        work_item_type: String,

        /// Title of the work item
        title: String,

        /// Description
        #[arg(long, short = 'd')]
        description: Option<String>,

        /// Assignee email or display name
        #[arg(long, short = 'a')]
        assignee: Option<String>,

        /// Acceptance criteria
        #[arg(long)]
        acceptance_criteria: Option<String>,
    },

    /// Update fields on a work item
    Update {
        /// Work item id
        id: u64,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New description
        #[arg(long, short = 'd')]
        description: Option<String>,

        /// New state (e.g. Active, Resolved, Closed)
        #[arg(long, short = 's')]
        state: Option<String>,

        /// Assignee email or display name
        #[arg(long, short = 'a')]
        assignee: Option<String>,

        /// Priority (1-4)
        #[arg(long, short = 'p')]
        priority: Option<i64>,

        /// Severity (e.g. "2 - High")
        #[arg(long)]
        severity: Option<String>,

        /// Acceptance criteria
        #[arg(long)]
        acceptance_criteria: Option<String>,
    },

    /// Run a raw WIQL query and hydrate the matching items
    Wiql {
        /// WIQL query text
        query: String,
    },

    /// MCP server for agent integration
    #[command(subcommand)]
    Mcp(McpCommands),
}

#[derive(Subcommand)]
enum McpCommands {
    /// Start the MCP server (communicates via stdin/stdout)
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    // MCP owns stdout, so diagnostics go to stderr.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = ClientConfig::from_env().context("Failed to load connection settings")?;
    let client = WitClient::new(&config).context("Failed to construct client")?;

    match cli.command {
        Commands::Search { query, limit } => {
            commands::search(&client, query.as_deref(), limit, cli.format).await
        }
        Commands::Get { id } => commands::get(&client, id, cli.format).await,
        Commands::Create {
            work_item_type,
            title,
            description,
            assignee,
            acceptance_criteria,
        } => {
            let fields = witbridge_core::CreateFields {
                description,
                assigned_to: assignee,
                acceptance_criteria,
            };
            commands::create(&client, &work_item_type, &title, &fields, cli.format).await
        }
        Commands::Update {
            id,
            title,
            description,
            state,
            assignee,
            priority,
            severity,
            acceptance_criteria,
        } => {
            let fields = witbridge_core::UpdateFields {
                title,
                description,
                assigned_to: assignee,
                acceptance_criteria,
                state,
                priority,
                severity,
            };
            commands::update(&client, id, &fields, cli.format).await
        }
        Commands::Wiql { query } => commands::wiql(&client, &query, cli.format).await,
        Commands::Mcp(McpCommands::Serve) => mcp::serve(&client).await,
    }
}
