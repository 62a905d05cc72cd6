mod cli;
mod config;
mod db;
mod error;
mod identity;
mod models;
mod tracker;
mod tui;
mod utils;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;

use cli::args::{Cli, Commands};
use cli::handlers;
use config::AppConfig;
use identity::FileIdentityCache;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = AppConfig::load().context("Loading config")?;

    // Ensure data directory exists, then open (and migrate) the DB
    AppConfig::ensure_data_dir()?;
    let db_path = AppConfig::db_path()?;
    let conn = db::open(&db_path)
        .with_context(|| format!("Opening database at {:?}", db_path))?;

    // Every session starts by loading (or creating) this device's identity
    let cache = FileIdentityCache::new(AppConfig::identity_path()?);
    let user = identity::bootstrap(&cache, &conn, Utc::now()).context("Loading identity")?;

    match cli.command {
        Some(Commands::Mark { juz }) => handlers::handle_mark(&conn, &user, juz, true)?,
        Some(Commands::Unmark { juz }) => handlers::handle_mark(&conn, &user, juz, false)?,
        Some(Commands::Progress) => handlers::handle_progress(&conn, &user)?,
        Some(Commands::Stats) => handlers::handle_stats(&conn, &config)?,
        Some(Commands::Admin { passphrase }) => {
            handlers::handle_admin(&conn, &config, &passphrase)?
        }
        Some(Commands::Name { name }) => handlers::handle_name(&conn, &cache, &name)?,
        Some(Commands::Whoami) => handlers::handle_whoami(&user, &cache)?,
        Some(Commands::Export) => handlers::handle_export(&conn, &user)?,

        // No subcommand → launch TUI
        None => tui::app::run(conn, config, user)?,
    }

    Ok(())
}
