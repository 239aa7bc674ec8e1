use clap::{Parser, Subcommand};
use serde::Serialize;
use std::process::ExitCode;

use crate_sync::{AppState, config::Config, error::AppResult};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Sync Discogs seller inventories and want-lists into a local store.
#[derive(Parser)]
#[command(name = "crate-sync", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a seller's inventory, syncing it if missing or stale.
    Inventory { seller: String },
    /// Print a user's want-list release ids.
    Wantlist { username: String },
    /// Check whether a user has a want-list upstream.
    Exists { username: String },
    /// A seller's listings restricted to a user's want-list.
    InWantlist { seller: String, username: String },
    /// Want-list items in stock across several sellers.
    InStock {
        username: String,
        #[arg(required = true)]
        sellers: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> AppResult<()> {
    let config = Config::from_env()?;
    let state = AppState::build(config).await?;

    match command {
        Command::Inventory { seller } => print(&state.inventories.get(&seller).await?),
        Command::Wantlist { username } => print(&state.wantlists.get(&username).await?),
        Command::Exists { username } => {
            let exists = state.wantlists.exists(&username).await?;
            print(&serde_json::json!({ "username": username, "exists": exists }))
        }
        Command::InWantlist { seller, username } => {
            print(&state.stock.in_wantlist(&seller, &username).await?)
        }
        Command::InStock { username, sellers } => print(
            &state
                .stock
                .wantlist_items_in_stock(&username, &sellers)
                .await?,
        ),
    }
}

fn print<T: Serialize>(value: &T) -> AppResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
