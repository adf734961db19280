//! Operator CLI for the outreach ledger.
//!
//! Administrative surface only: inspect history, check today's count
//! against the cap, and clear the ledger. Passes themselves are driven
//! by the embedding application through the `outreach` library.

use std::collections::HashSet;
use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Confirm};

use outreach::{has_reached_cap, CsvLedger, Ledger};

const DEFAULT_LEDGER: &str = "sent_messages.csv";

#[derive(Parser)]
#[command(name = "outreach", version, about = "Administer the outreach ledger")]
struct Cli {
    /// Ledger CSV path (falls back to OUTREACH_LEDGER, then the default)
    #[arg(long)]
    ledger: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the sent-message history
    History,

    /// Show today's send count against the daily cap
    Status {
        /// Daily cap to compare against
        #[arg(long, default_value_t = 10)]
        max: usize,
    },

    /// Irreversibly clear the whole history
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let path = cli
        .ledger
        .or_else(|| env::var_os("OUTREACH_LEDGER").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LEDGER));
    let ledger = CsvLedger::new(path);

    match cli.command {
        Command::History => show_history(&ledger).await,
        Command::Status { max } => show_status(&ledger, max).await,
        Command::Clear { yes } => clear_history(&ledger, yes).await,
    }
}

async fn show_history(ledger: &CsvLedger) -> Result<()> {
    let records = ledger.load().await;
    if records.is_empty() {
        println!("{}", "No messages sent yet".dimmed());
        return Ok(());
    }

    for record in &records {
        let when = record
            .sent_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "unknown time".to_string());
        println!(
            "{}  {}  {}",
            when.dimmed(),
            record.name.bold(),
            record.profile_url.blue()
        );
        if !record.query_title.is_empty() {
            println!("      found via: {}", record.query_title);
        }
    }

    let today = Local::now().date_naive();
    let unique: HashSet<_> = records.iter().filter_map(|r| r.profile_id()).collect();
    println!();
    println!(
        "{} total, {} unique recipients, {} sent today",
        records.len(),
        unique.len(),
        ledger.count_for_date(today).await
    );
    Ok(())
}

async fn show_status(ledger: &CsvLedger, max: usize) -> Result<()> {
    let today = Local::now().date_naive();
    let count = ledger.count_for_date(today).await;

    if has_reached_cap(ledger, today, max).await {
        println!(
            "{}",
            format!("Daily cap reached: {count}/{max} messages sent today").red()
        );
    } else {
        println!(
            "{}",
            format!("{count}/{max} messages sent today").green()
        );
    }
    Ok(())
}

async fn clear_history(ledger: &CsvLedger, yes: bool) -> Result<()> {
    let count = ledger.load().await.len();
    if count == 0 {
        println!("{}", "No message history found".dimmed());
        return Ok(());
    }

    if !yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!(
                "Irreversibly delete all {count} sent-message records?"
            ))
            .default(false)
            .interact()
            .context("confirmation prompt failed")?;
        if !confirmed {
            println!("{}", "Aborted".yellow());
            return Ok(());
        }
    }

    ledger
        .clear_all()
        .await
        .context("failed to clear the ledger")?;
    println!("{}", "Message history cleared".green());
    Ok(())
}
