//! Fitledger CLI - weekly workout accountability from the command line
//!
//! Usage:
//! ```bash
//! fitledger init
//! fitledger register 1001 "Alice"
//! fitledger verify 1001 "Alice" 2 --evidence-url https://cdn.example/run.jpg
//! fitledger penalty 1001
//! fitledger weekly
//! fitledger closeout --week 2026-W03
//! fitledger scheduler
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fitledger_config::ConfigLoader;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod db;
mod scheduler;

use commands::{member, week, Output};

/// Fitledger - weekly workout accountability ledger
#[derive(Parser)]
#[command(name = "fitledger")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (defaults apply when it does not exist)
    #[arg(long, short, default_value = "fitledger.toml", global = true)]
    pub config: PathBuf,

    /// Database file path, overrides `store.database`
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the ledger database and its sheets
    Init {
        /// Delete an existing database first
        #[arg(long)]
        force: bool,
    },

    /// Register a member
    Register {
        /// Member ID (e.g., a chat user id)
        member_id: String,
        /// Display name
        name: String,
    },

    /// Report a completed session for this week
    Verify {
        /// Member ID
        member_id: String,
        /// Display name, used to register the member on first report
        name: String,
        /// Session number within the week (1..=required count)
        session: u32,
        /// Link to the photo or video proving the session
        #[arg(long)]
        evidence_url: Option<String>,
        /// Penalty amount paid along with this report
        #[arg(long, default_value_t = 0)]
        paid: u64,
        /// Free-form note
        #[arg(long, default_value = "")]
        note: String,
    },

    /// Show a member's progress and penalty balance
    Penalty {
        /// Member ID
        member_id: String,
    },

    /// Show this week's progress for every member
    Weekly,

    /// List registered members
    Members,

    /// List verification events of a week
    History {
        /// Week id (e.g., 2026-W03); defaults to the current week
        #[arg(long)]
        week: Option<String>,
        /// Only events of this member
        #[arg(long)]
        member: Option<String>,
    },

    /// Close a week and accrue penalties for missed sessions
    Closeout {
        /// Week id to close; defaults to the week that just ended
        #[arg(long)]
        week: Option<String>,
    },

    /// Run the weekly close-out on schedule
    Scheduler {
        /// Evaluate the schedule once and exit
        #[arg(long)]
        once: bool,
    },

    /// Show the active policy and exercise rules
    Policy,

    /// Show database status
    Status,
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ConfigLoader::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config {}", cli.config.display()))?;
    init_logging(&config.get().log_level);

    let out = Output::new(cli.json);
    let db_path = cli.db.unwrap_or_else(|| config.get().store.database.clone());

    match cli.command {
        Commands::Init { force } => {
            db::init_database(&db_path, &config, force).await?;
            out.message(&format!("✅ Database initialized at {}", db_path.display()));
        }

        Commands::Status => {
            db::show_status(&db_path, &config, &out).await?;
        }

        Commands::Policy => {
            commands::show_policy(&config, &out)?;
        }

        Commands::Register { member_id, name } => {
            let ctx = db::context(&db_path, &config).await?;
            member::register(&ctx, &out, &member_id, &name).await?;
        }

        Commands::Verify {
            member_id,
            name,
            session,
            evidence_url,
            paid,
            note,
        } => {
            let ctx = db::context(&db_path, &config).await?;
            let report = member::Report {
                member_id,
                name,
                session,
                evidence_url,
                paid,
                note,
            };
            member::verify(&ctx, &out, report).await?;
        }

        Commands::Penalty { member_id } => {
            let ctx = db::context(&db_path, &config).await?;
            member::penalty(&ctx, &out, &member_id).await?;
        }

        Commands::Members => {
            let ctx = db::context(&db_path, &config).await?;
            member::list(&ctx, &out).await?;
        }

        Commands::Weekly => {
            let ctx = db::context(&db_path, &config).await?;
            week::weekly(&ctx, &out).await?;
        }

        Commands::History { week, member } => {
            let ctx = db::context(&db_path, &config).await?;
            week::history(&ctx, &out, week, member).await?;
        }

        Commands::Closeout { week } => {
            let ctx = db::context(&db_path, &config).await?;
            week::closeout(&ctx, &out, week).await?;
        }

        Commands::Scheduler { once } => {
            let ctx = db::context(&db_path, &config).await?;
            let schedule = scheduler::Schedule::from_config(&config)?;
            scheduler::run(&ctx, &out, schedule, once).await?;
        }
    }

    Ok(())
}
