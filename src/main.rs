use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use recallrift::cli;
use recallrift::cli::export::ExportArgs;
use recallrift::cli::search::SearchArgs;
use recallrift::config::RecallConfig;
use recallrift::memory::transfer::MergeMode;
use recallrift::server;

#[derive(Parser)]
#[command(
    name = "recallrift",
    version,
    about = "Personal memories with fuzzy search, analytics and AI recall"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the MCP server (stdio unless --http or [server].transport = "http")
    Serve {
        /// Serve streamable HTTP on [server].host:port instead of stdio
        #[arg(long)]
        http: bool,
    },
    /// Create a memory
    Add {
        title: String,
        content: String,
        #[arg(short, long)]
        category: Option<String>,
        /// Comma-separated tags
        #[arg(short, long)]
        tags: Option<String>,
        /// Ask the AI for tags when none are given
        #[arg(long)]
        suggest_tags: bool,
    },
    /// Search and filter memories
    Search(SearchArgs),
    /// Show one memory in full
    Show { id: String },
    /// Edit fields of a memory
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        /// New category; pass "" to clear
        #[arg(long)]
        category: Option<String>,
        /// Replacement comma-separated tags
        #[arg(long)]
        tags: Option<String>,
    },
    /// Delete one or more memories
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Toggle the favorite flag
    Favorite { id: String },
    /// Delete ALL memories
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Manage categories
    Category {
        #[command(subcommand)]
        action: CategoryAction,
    },
    /// Read or write stored settings (e.g. gemini_api_key)
    Setting {
        #[command(subcommand)]
        action: SettingAction,
    },
    /// Show activity analytics
    Analytics {
        #[arg(long)]
        json: bool,
    },
    /// Export memories as JSON
    Export(ExportArgs),
    /// Import memories from an export or backup file
    Import {
        file: PathBuf,
        /// skip, replace or merge when an ID already exists
        #[arg(long, default_value = "skip")]
        mode: MergeMode,
        /// Keep incoming IDs for new memories
        #[arg(long)]
        preserve_ids: bool,
        /// Import even if some records lack title, content or createdAt
        #[arg(long)]
        no_validate: bool,
    },
    /// Write a full backup (memories and categories)
    Backup {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Ask the AI a question about your memories
    Ask { question: String },
    /// Summarize one memory with the AI
    Summarize { id: String },
    /// AI insights about your memories
    Insights {
        /// Structured patterns, recommendations and growth areas
        #[arg(long)]
        productivity: bool,
    },
    /// Manage smart collections
    Collection {
        #[command(subcommand)]
        action: CollectionAction,
    },
    /// Built-in memory templates
    Template {
        #[command(subcommand)]
        action: TemplateAction,
    },
    /// Load demo data into an empty store
    Seed,
    /// Run database diagnostics
    Doctor {
        /// Also send a test prompt to the AI provider
        #[arg(long)]
        test_ai: bool,
    },
}

#[derive(Subcommand)]
enum CategoryAction {
    Add {
        name: String,
        /// Display color, e.g. "#10B981"
        #[arg(long)]
        color: Option<String>,
    },
    List,
    /// Delete by ID or unambiguous name
    Delete { id_or_name: String },
}

#[derive(Subcommand)]
enum SettingAction {
    /// Print one setting, or all when no key is given
    Get { key: Option<String> },
    /// Store a value; an empty value removes the setting
    Set { key: String, value: String },
}

#[derive(Subcommand)]
enum CollectionAction {
    List,
    Add {
        name: String,
        #[arg(long)]
        description: Option<String>,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
        /// Comma-separated category names
        #[arg(long)]
        categories: Option<String>,
        /// Comma-separated keywords matched in title or content
        #[arg(long)]
        keywords: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    Show { id_or_name: String },
    Delete { id_or_name: String },
    /// Let the AI propose a collection
    Suggest {
        /// Save the suggestion
        #[arg(long)]
        save: bool,
    },
}

#[derive(Subcommand)]
enum TemplateAction {
    List,
    /// Create a memory from a template
    Use {
        id: String,
        /// Text substituted for {title}
        #[arg(long)]
        title: Option<String>,
    },
    /// AI-proposed templates based on your memories
    Suggest,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config (for log level)
    let config = RecallConfig::load()?;

    // Initialize tracing with the configured log level.
    // Log to stderr so stdout stays clean for MCP JSON-RPC and CLI output.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve { http } => {
            if http || config.server.transport == "http" {
                server::serve_http(config).await?;
            } else {
                server::serve_stdio(config).await?;
            }
        }
        Command::Add {
            title,
            content,
            category,
            tags,
            suggest_tags,
        } => {
            cli::memories::add(
                &config,
                &title,
                &content,
                category.as_deref(),
                tags.as_deref(),
                suggest_tags,
            )
            .await?;
        }
        Command::Search(args) => cli::search::search(&config, &args)?,
        Command::Show { id } => cli::memories::show(&config, &id)?,
        Command::Edit {
            id,
            title,
            content,
            category,
            tags,
        } => cli::memories::edit(&config, &id, title, content, category, tags)?,
        Command::Delete { ids } => cli::memories::delete(&config, &ids)?,
        Command::Favorite { id } => cli::memories::favorite(&config, &id)?,
        Command::Reset { yes } => cli::reset::reset(&config, yes)?,
        Command::Category { action } => match action {
            CategoryAction::Add { name, color } => {
                cli::categories::add(&config, &name, color.as_deref())?
            }
            CategoryAction::List => cli::categories::list(&config)?,
            CategoryAction::Delete { id_or_name } => {
                cli::categories::delete(&config, &id_or_name)?
            }
        },
        Command::Setting { action } => match action {
            SettingAction::Get { key } => cli::settings::get(&config, key.as_deref())?,
            SettingAction::Set { key, value } => cli::settings::set(&config, &key, &value)?,
        },
        Command::Analytics { json } => cli::analytics::analytics(&config, json)?,
        Command::Export(args) => cli::export::export(&config, &args)?,
        Command::Import {
            file,
            mode,
            preserve_ids,
            no_validate,
        } => cli::import::import(&config, &file, mode, preserve_ids, !no_validate)?,
        Command::Backup { output } => cli::export::backup(&config, output.as_deref())?,
        Command::Ask { question } => cli::ai::ask(&config, &question).await?,
        Command::Summarize { id } => cli::ai::summarize(&config, &id).await?,
        Command::Insights { productivity } => cli::ai::insights(&config, productivity).await?,
        Command::Collection { action } => match action {
            CollectionAction::List => cli::collections::list(&config)?,
            CollectionAction::Add {
                name,
                description,
                tags,
                categories,
                keywords,
                color,
            } => cli::collections::add(
                &config,
                &name,
                description.as_deref(),
                tags.as_deref(),
                categories.as_deref(),
                keywords.as_deref(),
                color.as_deref(),
            )?,
            CollectionAction::Show { id_or_name } => {
                cli::collections::show(&config, &id_or_name)?
            }
            CollectionAction::Delete { id_or_name } => {
                cli::collections::delete(&config, &id_or_name)?
            }
            CollectionAction::Suggest { save } => {
                cli::collections::suggest(&config, save).await?
            }
        },
        Command::Template { action } => match action {
            TemplateAction::List => cli::templates::list()?,
            TemplateAction::Use { id, title } => {
                cli::templates::use_template(&config, &id, title.as_deref())?
            }
            TemplateAction::Suggest => cli::templates::suggest(&config).await?,
        },
        Command::Seed => cli::seed::seed(&config)?,
        Command::Doctor { test_ai } => cli::doctor::doctor(&config, test_ai).await?,
    }

    Ok(())
}
