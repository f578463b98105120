use anyhow::Context;
use clap::{Parser, Subcommand};
use pennbid_execution::query;
use pennbid_simulator::scenario::{self, account_hex, Scenario};
use std::{path::PathBuf, str::FromStr};
use tracing::{info, Level};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a YAML scenario and print the resulting ledger
    Run {
        #[arg(short, long)]
        scenario: PathBuf,

        /// Overrides the scenario's log level
        #[arg(short, long)]
        log_level: Option<String>,
    },
    /// Print the public keys of the development accounts
    Accounts {
        #[arg(short, long, default_value_t = 4)]
        count: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse args
    let args = Args::parse();

    match args.command {
        Command::Run {
            scenario,
            log_level,
        } => {
            let scenario = Scenario::load(&scenario)?;

            // Create logger
            let log_level = log_level.unwrap_or_else(|| scenario.log_level.clone());
            let level = Level::from_str(&log_level)
                .with_context(|| format!("invalid log level {log_level}"))?;
            tracing_subscriber::fmt().with_max_level(level).init();

            let report = scenario::run(&scenario).await?;
            for block in &report.blocks {
                for event in &block.events {
                    info!(height = block.height, ?event, "outcome");
                }
            }

            let state = report.simulator.state();
            for id in 1..=query::max_game_id(state).await {
                if let Some(game) = query::game_info(state, id).await {
                    info!(
                        id,
                        total_pot = game.total_pot,
                        bettors = game.bettor_count,
                        resolved = game.resolved,
                        "game"
                    );
                }
            }
            for id in 1..=query::max_auction_id(state).await {
                if let Some(auction) = query::auction_info(state, id).await {
                    info!(
                        id,
                        asset = %auction.asset,
                        highest_bid = auction.highest_bid,
                        settled = auction.settled,
                        "auction"
                    );
                }
            }
            for (account, balance) in report.balances(&scenario).await {
                info!(account, balance, "balance");
            }
            let escrow = query::escrow(state).await;
            let accrued = query::treasury(state)
                .await
                .map(|t| t.accrued)
                .unwrap_or_default();
            info!(held = escrow.held, accrued, "ledger");
        }
        Command::Accounts { count } => {
            for index in 0..count {
                println!("{index}: {}", account_hex(index));
            }
        }
    }

    Ok(())
}
