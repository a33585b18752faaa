// ABOUTME: nutrifit-admin - command-line tool for NutriFit operator tasks
// ABOUTME: Mints access codes, drives terms compliance actions, and reports on acceptance
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 NutriFit.app
//!
//! Usage:
//! ```bash
//! # Mint signup access codes
//! nutrifit-admin code mint --count 5
//!
//! # List access codes, including consumed ones
//! nutrifit-admin code list --include-consumed
//!
//! # Force one user to re-accept the terms
//! nutrifit-admin terms force --email user@example.com
//!
//! # Force every user to re-accept (e.g. a legal correction without a new version)
//! nutrifit-admin terms force --all
//!
//! # Acceptance report for the current terms version
//! nutrifit-admin terms report
//!
//! # Per-user acceptance history
//! nutrifit-admin terms history --email user@example.com
//!
//! # Repair acceptance state drift from the audit log
//! nutrifit-admin terms reconcile
//! ```

use clap::{Parser, Subcommand};
use nutrifit_core::{
    config::environment::ServerConfig,
    constants::env_config,
    database_plugins::{factory::Database, DatabaseProvider},
    errors::{AppError, AppResult},
    logging::LoggingConfig,
    services::signup::mint_access_code,
    terms::{StateReconciler, TermsRegistry},
};
use std::env;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "nutrifit-admin",
    about = "NutriFit operations CLI",
    long_about = "Command-line tool for NutriFit operators: signup access codes, terms-of-use compliance actions, and acceptance reporting."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Database URL override
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Signup access code commands
    Code {
        #[command(subcommand)]
        action: CodeCommand,
    },

    /// Terms-of-use compliance commands
    Terms {
        #[command(subcommand)]
        action: TermsCommand,
    },
}

#[non_exhaustive]
#[derive(Subcommand)]
enum CodeCommand {
    /// Mint new single-use access codes
    Mint {
        /// Number of codes to mint
        #[arg(long, default_value = "1")]
        count: u32,
    },

    /// List access codes
    List {
        /// Include codes that have already been consumed
        #[arg(long)]
        include_consumed: bool,
    },
}

#[non_exhaustive]
#[derive(Subcommand)]
enum TermsCommand {
    /// Force re-acceptance without publishing a new terms version
    Force {
        /// Email of the user to flag
        #[arg(long)]
        email: Option<String>,

        /// Flag every registered user
        #[arg(long)]
        all: bool,
    },

    /// Acceptance summary for the current terms version
    Report,

    /// Acceptance history for one user
    History {
        /// Email of the user
        #[arg(long)]
        email: String,

        /// Maximum number of records to show
        #[arg(long, default_value = "20")]
        limit: u32,
    },

    /// Repair acceptance state drift from the audit log
    Reconcile,
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::from_env();
    if cli.verbose {
        logging.level = "debug".into();
    }
    logging.init()?;

    info!("NutriFit admin CLI");

    let database_url = cli
        .database_url
        .or_else(|| env::var("DATABASE_URL").ok())
        .unwrap_or_else(env_config::database_url);

    info!("Connecting to database: {}", database_url);
    let database = Database::new(&database_url).await?;

    // Ensure the schema exists before any command touches it
    database.migrate().await?;

    match cli.command {
        Command::Code { action } => match action {
            CodeCommand::Mint { count } => mint_codes(&database, count).await?,
            CodeCommand::List { include_consumed } => {
                list_codes(&database, include_consumed).await?;
            }
        },
        Command::Terms { action } => match action {
            TermsCommand::Force { email, all } => {
                force_reacceptance(&database, email, all).await?;
            }
            TermsCommand::Report => acceptance_report(&database).await?,
            TermsCommand::History { email, limit } => {
                acceptance_history(&database, &email, limit).await?;
            }
            TermsCommand::Reconcile => reconcile(&database).await?,
        },
    }

    Ok(())
}

async fn mint_codes(database: &Database, count: u32) -> AppResult<()> {
    println!("\nMinted access codes:");
    println!("{}", "=".repeat(40));
    for _ in 0..count {
        let access_code = mint_access_code(database).await?;
        println!("  {}", access_code.code);
    }
    println!("\nEach code admits exactly one signup.");
    Ok(())
}

async fn list_codes(database: &Database, include_consumed: bool) -> AppResult<()> {
    let codes = database.list_access_codes(include_consumed).await?;
    if codes.is_empty() {
        println!("No access codes found.");
        return Ok(());
    }

    println!("\nAccess codes:");
    println!("{}", "=".repeat(60));
    for code in codes {
        let status = if code.is_consumed() { "consumed" } else { "open" };
        println!(
            "  {}  {:<8}  created {}",
            code.code,
            status,
            code.created_at.format("%Y-%m-%d %H:%M")
        );
        if let Some(user_id) = code.consumed_by {
            println!("            consumed by user {user_id}");
        }
    }
    Ok(())
}

async fn force_reacceptance(
    database: &Database,
    email: Option<String>,
    all: bool,
) -> AppResult<()> {
    match (email, all) {
        (Some(email), false) => {
            let user = database.get_user_by_email_required(&email).await?;
            database.require_reacceptance(user.id).await?;
            println!("User {email} must re-accept the terms at next sign-in.");
        }
        (None, true) => {
            let affected = database.require_reacceptance_all().await?;
            println!("{affected} users must re-accept the terms at next sign-in.");
        }
        _ => {
            return Err(AppError::invalid_input(
                "Pass exactly one of --email or --all",
            ));
        }
    }
    Ok(())
}

async fn acceptance_report(database: &Database) -> AppResult<()> {
    let config = ServerConfig::from_env()?;
    let registry = TermsRegistry::new(&config.terms);
    let current = registry.current_version();

    let total_users = database.get_user_count().await?;
    let current_acceptances = database.count_acceptances_for_version(current).await?;
    let by_method = database.count_acceptances_by_method().await?;
    let states = database.list_terms_states().await?;

    let up_to_date = states.iter().filter(|s| s.satisfies(current)).count();
    let flagged = states.iter().filter(|s| s.needs_reacceptance).count();

    println!("\nTerms acceptance report");
    println!("{}", "=".repeat(60));
    println!("Current version:         {current}");
    println!("Registered users:        {total_users}");
    println!("Up to date:              {up_to_date}");
    println!("Flagged for re-accept:   {flagged}");
    println!("Acceptances of current:  {current_acceptances}");

    if !by_method.is_empty() {
        println!("\nAudit records by method:");
        for (method, count) in by_method {
            println!("  {:<16} {count}", method.as_str());
        }
    }
    Ok(())
}

async fn acceptance_history(database: &Database, email: &str, limit: u32) -> AppResult<()> {
    let user = database.get_user_by_email_required(email).await?;
    let history = database.get_acceptance_history(user.id, Some(limit)).await?;
    if history.is_empty() {
        println!("No acceptance records for {email}.");
        return Ok(());
    }

    println!("\nAcceptance history for {email}:");
    println!("{}", "=".repeat(72));
    for record in history {
        println!(
            "  {}  {}  {:<15}  {}",
            record.accepted_at.format("%Y-%m-%d %H:%M:%S"),
            record.version,
            record.method,
            record.ip_address.as_deref().unwrap_or("-"),
        );
    }
    Ok(())
}

async fn reconcile(database: &Database) -> AppResult<()> {
    let reconciler = StateReconciler::new(Arc::new(database.clone()));
    let report = reconciler.sweep().await?;
    if report.is_clean() {
        println!(
            "Examined {} users, acceptance state matches the audit log.",
            report.examined
        );
    } else {
        println!(
            "Examined {} users, repaired {}:",
            report.examined, report.repaired
        );
        for user_id in &report.repaired_users {
            println!("  {user_id}");
        }
    }
    Ok(())
}
