//! Database initialization, status and service wiring

use anyhow::{Context, Result};
use fitledger_business::ServiceContext;
use fitledger_config::ConfigLoader;
use fitledger_persistence::{sheets, CloseoutRepo, Database, SqliteTableStore};
use serde::Serialize;
use std::path::Path;

use crate::commands::Output;

fn database_url(db_path: &Path) -> String {
    format!("sqlite:{}", db_path.display())
}

fn ensure_parent_dir(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    Ok(())
}

/// Create the database file and every sheet
pub async fn init_database(db_path: &Path, config: &ConfigLoader, force: bool) -> Result<()> {
    if force && db_path.exists() {
        std::fs::remove_file(db_path).context("Failed to remove existing database")?;
        tracing::warn!(path = %db_path.display(), "removed existing database");
    }
    ensure_parent_dir(db_path)?;

    let store = SqliteTableStore::open(&database_url(db_path), config.store_timeout())
        .await
        .context("Failed to create database")?;
    store.close().await;
    Ok(())
}

/// Open the ledger and build the service context from configuration
pub async fn context(db_path: &Path, config: &ConfigLoader) -> Result<ServiceContext> {
    ensure_parent_dir(db_path)?;
    let db = Database::open(&database_url(db_path), config.store_timeout())
        .await
        .context("Failed to open database. Run 'fitledger init' first.")?;

    Ok(ServiceContext::new(&db, config.policy()?, config.calendar()?))
}

#[derive(Serialize)]
struct Status {
    path: String,
    members: i64,
    verifications: i64,
    closed_weeks: i64,
    last_closed_week: Option<String>,
}

/// Show database status
pub async fn show_status(db_path: &Path, config: &ConfigLoader, out: &Output) -> Result<()> {
    if !db_path.exists() {
        out.message(&format!("❌ Database not found at {}", db_path.display()));
        out.message("   Run 'fitledger init' to create the database");
        return Ok(());
    }

    let store = SqliteTableStore::open(&database_url(db_path), config.store_timeout()).await?;
    let closeouts = CloseoutRepo::get_all(&store).await?;
    let status = Status {
        path: db_path.display().to_string(),
        members: store.count(sheets::members::SHEET).await?,
        verifications: store.count(sheets::verifications::SHEET).await?,
        closed_weeks: store.count(sheets::closeouts::SHEET).await?,
        last_closed_week: closeouts.last().map(|c| c.week_id.clone()),
    };
    store.close().await;

    out.render(&status, |s| {
        println!("📊 Database Status");
        println!("   Path: {}", s.path);
        println!();
        println!("   Members:       {}", s.members);
        println!("   Verifications: {}", s.verifications);
        println!("   Closed weeks:  {}", s.closed_weeks);
        if let Some(week) = &s.last_closed_week {
            println!("   Last closed:   {}", week);
        }
    })
}
