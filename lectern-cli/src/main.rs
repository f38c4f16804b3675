//! Lectern CLI - terminal front end for the Lectern reading platform

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use lectern_core::session::Role;
use lectern_core::{BookId, ClientConfig};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Parse a role name (student, teacher, admin)
fn parse_role(s: &str) -> Result<Role, String> {
    Role::parse(s).ok_or_else(|| format!("'{}' is not a known role", s))
}

#[derive(Parser)]
#[command(name = "lectern")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Base URL of the book API (overrides LECTERN_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Directory for the local store (overrides LECTERN_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store credentials issued by the sign-in service
    Login {
        /// Access token
        #[arg(long)]
        token: String,

        /// Numeric user id
        #[arg(long)]
        user_id: Option<i64>,

        /// Display name
        #[arg(long)]
        name: Option<String>,

        /// Account role (student, teacher, admin)
        #[arg(long, value_parser = parse_role)]
        role: Option<Role>,
    },

    /// Forget stored credentials
    Logout,

    /// Show new releases and popular books
    Home {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Open a book's detail page and record it in the history
    View {
        /// Book id
        id: BookId,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Toggle a book in your favorites
    Favorite {
        /// Book id
        id: BookId,
    },

    /// Search the catalog
    Search {
        /// Search query
        query: String,

        /// Show full results instead of suggestions
        #[arg(long)]
        all: bool,
    },

    /// Manage the reading history
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// Check whether a document URL can be previewed
    Preview {
        /// Document URL
        url: String,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    /// List recently viewed books
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove one book from the history
    Remove {
        /// Book id
        id: BookId,
    },

    /// Clear the whole history
    Clear,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "lectern_cli=debug,lectern_core=debug"
    } else {
        "lectern_cli=info,lectern_core=warn"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = ClientConfig::from_env();
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }

    let ctx = commands::Context::new(config)?;

    match cli.command {
        Commands::Login {
            token,
            user_id,
            name,
            role,
        } => commands::login(&ctx, token, user_id, name, role),

        Commands::Logout => commands::logout(&ctx),

        Commands::Home { json } => commands::home(&ctx, json).await,

        Commands::View { id, json } => commands::view(&ctx, id, json).await,

        Commands::Favorite { id } => commands::favorite(&ctx, id).await,

        Commands::Search { query, all } => commands::search(&ctx, &query, all).await,

        Commands::History { action } => match action {
            HistoryAction::List { json } => commands::history_list(&ctx, json),
            HistoryAction::Remove { id } => commands::history_remove(&ctx, id),
            HistoryAction::Clear => commands::history_clear(&ctx),
        },

        Commands::Preview { url } => commands::preview(&ctx, &url),
    }
}
