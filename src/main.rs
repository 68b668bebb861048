//! `scholar-digest` entry point.
//!
//! ```bash
//! export SEMANTIC_SCHOLAR_API_KEY=...
//! scholar-digest populate-journals --max-journals 2000
//! scholar-digest digest --query "IBD" --keywords "IBD genetics" "Crohn's disease" --show-impact
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use scholar_digest::adapters::{OpenAlexClient, SemanticScholarClient};
use scholar_digest::commands::{self, digest::DigestOptions};
use scholar_digest::models::Settings;
use scholar_digest::storage::JournalStore;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const API_KEY_VAR: &str = "SEMANTIC_SCHOLAR_API_KEY";
const DEFAULT_FIELDS: &str =
    "title,authors,citationCount,publicationDate,venue,externalIds,abstract,tldr";

/// Search and analyze academic papers using the Semantic Scholar API
#[derive(Parser, Debug)]
#[command(name = "scholar-digest", version, about)]
struct Cli {
    /// Journal metric database path (overrides settings)
    #[arg(long, global = true, value_name = "PATH")]
    db_path: Option<PathBuf>,

    /// Settings file (defaults to the user data directory)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the top cited papers for a query and recent papers per keyword
    Digest(DigestArgs),
    /// Show details for a single paper
    Paper {
        /// Semantic Scholar id, or a prefixed id such as DOI:10.1000/xyz
        id: String,
        /// Comma-separated API fields to retrieve
        #[arg(long)]
        fields: Option<String>,
        /// Also print the paper's impact score
        #[arg(long)]
        show_impact: bool,
    },
    /// Populate the journal metric cache from OpenAlex
    PopulateJournals {
        #[arg(long, default_value_t = 1000)]
        max_journals: usize,
    },
    /// Look up a journal in the cache by ISSN or name
    Journal {
        query: String,
    },
    /// Print the effective settings
    Settings {
        /// Write the effective settings to the settings file
        #[arg(long)]
        save: bool,
    },
}

#[derive(clap::Args, Debug)]
struct DigestArgs {
    /// Primary search query for the top cited papers
    #[arg(long, default_value = "IBD")]
    query: String,

    /// Keywords for the recent papers search
    #[arg(
        long,
        num_args = 1..,
        default_values_t = ["IBD genetics".to_string(), "Crohn's disease".to_string(), "ulcerative colitis".to_string()]
    )]
    keywords: Vec<String>,

    /// Terms to exclude from results (matched in title or abstract)
    #[arg(
        long,
        num_args = 0..,
        default_values_t = ["microbiome".to_string(), "prebiotics".to_string(), "probiotics".to_string()]
    )]
    exclude_terms: Vec<String>,

    /// Days back for the recent papers search
    #[arg(long, default_value_t = 7)]
    days_back: u32,

    /// Months back (30 days each) for the top cited search
    #[arg(long, default_value_t = 12)]
    months_back: u32,

    /// Number of top cited papers to print
    #[arg(long, default_value_t = 5)]
    top_n: usize,

    /// Maximum results fetched per keyword
    #[arg(long, default_value_t = 150)]
    max_results_per_keyword: usize,

    /// Maximum papers fetched when finding the top cited
    #[arg(long, default_value_t = 1000)]
    max_fetch_top_cited: usize,

    /// Number of papers printed per keyword
    #[arg(long, default_value_t = 3)]
    display_limit: usize,

    /// Comma-separated API fields to retrieve
    #[arg(long, default_value = DEFAULT_FIELDS)]
    fields: String,

    /// Keep recent papers in fetch order instead of ranking by impact
    #[arg(long)]
    no_impact_sort: bool,

    /// Print impact scores next to each paper
    #[arg(long)]
    show_impact: bool,
}

impl From<DigestArgs> for DigestOptions {
    fn from(args: DigestArgs) -> Self {
        DigestOptions {
            query: args.query,
            keywords: args.keywords,
            exclude_terms: args.exclude_terms,
            days_back: args.days_back,
            months_back: args.months_back,
            top_n: args.top_n,
            max_results_per_keyword: args.max_results_per_keyword,
            max_fetch_top_cited: args.max_fetch_top_cited,
            display_limit: args.display_limit,
            fields: Some(args.fields),
            sort_by_impact: !args.no_impact_sort,
            show_impact: args.show_impact,
        }
    }
}

fn require_api_key() -> Result<String> {
    match std::env::var(API_KEY_VAR) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => bail!(
            "Please set the {var} environment variable.\n\
             On Windows: set {var}=your_api_key_here\n\
             On Mac/Linux: export {var}=your_api_key_here",
            var = API_KEY_VAR
        ),
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut settings: Settings = commands::settings::load_settings(cli.config.as_deref())?;
    if let Some(db_path) = cli.db_path {
        settings.journal_db_path = Some(db_path);
    }
    debug!("Effective settings: {:?}", settings);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Digest(args) => {
            let api_key = require_api_key()?;
            let options = DigestOptions::from(args);
            let mut client = SemanticScholarClient::new(api_key, settings.client_config())?;
            let store = commands::digest::open_store_for(&options, &settings.journal_db_path());
            let today = chrono::Local::now().date_naive();
            commands::digest::run_digest(&mut client, store.as_ref(), &options, today, &mut out)
                .await?;
        }
        Command::Paper {
            id,
            fields,
            show_impact,
        } => {
            let api_key = require_api_key()?;
            let mut client = SemanticScholarClient::new(api_key, settings.client_config())?;
            let store = if show_impact {
                Some(JournalStore::open(settings.journal_db_path())?)
            } else {
                None
            };
            commands::papers::show_paper(
                &mut client,
                store.as_ref(),
                &id,
                fields.as_deref(),
                &mut out,
            )
            .await?;
        }
        Command::PopulateJournals { max_journals } => {
            let store = JournalStore::open(settings.journal_db_path())
                .context("Failed to open journal database")?;
            let mut client = OpenAlexClient::new(settings.openalex_base_url.clone())?;
            commands::journals::populate_journals(&mut client, &store, max_journals, &mut out)
                .await?;
        }
        Command::Journal { query } => {
            let store = JournalStore::open(settings.journal_db_path())
                .context("Failed to open journal database")?;
            commands::journals::show_journal(&store, &query, &mut out)?;
        }
        Command::Settings { save } => {
            commands::settings::show_settings(&settings, cli.config.as_deref(), save, &mut out)?;
        }
    }

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(writer)
        .with_target(false)
        .init();

    let result = run(cli).await;
    // Flush buffered log lines before the error message.
    drop(guard);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
