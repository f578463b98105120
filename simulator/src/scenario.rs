//! Scripted ledger runs loaded from YAML.
//!
//! Accounts are referenced by index and map to [dev_account] keys, so a
//! scenario never needs to embed private material.

use crate::{dev_account, Simulator, Summary};
use anyhow::{bail, Context};
use commonware_cryptography::{ed25519::PublicKey, Signer};
use pennbid_execution::{nonce, query, Genesis};
use pennbid_types::{
    config::Config,
    execution::{Instruction, Transaction, MAX_BLOCK_TRANSACTIONS},
    ledger::AssetRef,
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, path::Path};
use tracing::warn;

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    pub ledger: Config,
    /// Dev account that owns the treasury, instead of `ledger.owner`.
    #[serde(default)]
    pub owner_account: Option<u64>,
    /// Clock reading of the first block.
    #[serde(default)]
    pub start_time: u64,
    #[serde(default)]
    pub balances: Vec<Allocation>,
    #[serde(default)]
    pub assets: Vec<Grant>,
    pub blocks: Vec<Step>,
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Allocation {
    pub account: u64,
    pub amount: u64,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Grant {
    pub account: u64,
    pub collection: String,
    pub token_id: u64,
}

/// One block: advance the clock, then submit `actions` in order.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Step {
    #[serde(default)]
    pub advance: u64,
    #[serde(default)]
    pub actions: Vec<Action>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Action {
    pub account: u64,
    #[serde(flatten)]
    pub call: Call,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum Call {
    StartGame {
        game_length: u64,
        max_bet: u64,
    },
    SubmitBet {
        game_id: u64,
        amount: u64,
    },
    ResolveGame {
        game_id: u64,
    },
    StartAuction {
        collection: String,
        token_id: u64,
        auction_length: u64,
        min_bid: u64,
    },
    SubmitBid {
        auction_id: u64,
        amount: u64,
    },
    SettleAuction {
        auction_id: u64,
    },
    WithdrawFees,
}

impl From<Call> for Instruction {
    fn from(call: Call) -> Self {
        match call {
            Call::StartGame {
                game_length,
                max_bet,
            } => Instruction::StartGame {
                game_length,
                max_bet,
            },
            Call::SubmitBet { game_id, amount } => Instruction::SubmitBet { game_id, amount },
            Call::ResolveGame { game_id } => Instruction::ResolveGame { game_id },
            Call::StartAuction {
                collection,
                token_id,
                auction_length,
                min_bid,
            } => Instruction::StartAuction {
                asset: AssetRef::new(collection, token_id),
                auction_length,
                min_bid,
            },
            Call::SubmitBid { auction_id, amount } => Instruction::SubmitBid { auction_id, amount },
            Call::SettleAuction { auction_id } => Instruction::SettleAuction { auction_id },
            Call::WithdrawFees => Instruction::WithdrawFees,
        }
    }
}

impl Scenario {
    pub fn from_yaml(contents: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(contents).context("failed to parse scenario")
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        Self::from_yaml(&contents)
    }

    /// Every account index the scenario mentions.
    pub fn accounts(&self) -> Vec<u64> {
        let mut accounts: Vec<u64> = self
            .balances
            .iter()
            .map(|a| a.account)
            .chain(self.assets.iter().map(|g| g.account))
            .chain(self.owner_account)
            .chain(
                self.blocks
                    .iter()
                    .flat_map(|step| step.actions.iter().map(|a| a.account)),
            )
            .collect();
        accounts.sort_unstable();
        accounts.dedup();
        accounts
    }

    pub fn genesis(&self) -> Genesis {
        let mut genesis = Genesis::default();
        for allocation in &self.balances {
            genesis = genesis.with_balance(
                dev_account(allocation.account).public_key(),
                allocation.amount,
            );
        }
        for grant in &self.assets {
            genesis = genesis.with_asset(
                AssetRef::new(grant.collection.clone(), grant.token_id),
                dev_account(grant.account).public_key(),
            );
        }
        genesis
    }
}

/// Result of replaying a scenario.
pub struct Report {
    pub simulator: Simulator,
    pub blocks: Vec<Summary>,
}

impl Report {
    /// Balance of every account the scenario mentions.
    pub async fn balances(&self, scenario: &Scenario) -> BTreeMap<u64, u64> {
        let mut balances = BTreeMap::new();
        for account in scenario.accounts() {
            let public = dev_account(account).public_key();
            balances.insert(account, query::balance(self.simulator.state(), &public).await);
        }
        balances
    }
}

/// Replays `scenario` block by block on a fresh [Simulator].
pub async fn run(scenario: &Scenario) -> anyhow::Result<Report> {
    if let Some(index) = scenario
        .blocks
        .iter()
        .position(|step| step.actions.len() > MAX_BLOCK_TRANSACTIONS)
    {
        bail!(
            "block {index} has {} actions, more than {MAX_BLOCK_TRANSACTIONS}",
            scenario.blocks[index].actions.len()
        );
    }

    let mut config = scenario.ledger.clone();
    if let Some(account) = scenario.owner_account {
        config.owner = account_hex(account);
    }
    let settings = config
        .validate()
        .context("invalid ledger configuration")?;
    let mut simulator = Simulator::new(settings, &scenario.genesis(), scenario.start_time).await;

    let mut nonces: BTreeMap<u64, u64> = BTreeMap::new();
    let mut blocks = Vec::with_capacity(scenario.blocks.len());
    for (index, step) in scenario.blocks.iter().enumerate() {
        simulator.advance_clock(step.advance);

        let mut transactions = Vec::with_capacity(step.actions.len());
        for action in &step.actions {
            let signer = dev_account(action.account);
            let next = match nonces.get(&action.account) {
                Some(next) => *next,
                None => nonce(simulator.state(), &signer.public_key()).await,
            };
            nonces.insert(action.account, next + 1);
            transactions.push(Transaction::sign(
                &signer,
                next,
                action.call.clone().into(),
            ));
        }

        for (result, action) in simulator
            .submit_transactions(transactions)
            .await
            .into_iter()
            .zip(&step.actions)
        {
            if let Err(err) = result {
                warn!(block = index, account = action.account, %err, "submission refused");
            }
        }
        blocks.push(simulator.produce_block().await);
    }

    if simulator.pending() > 0 {
        bail!("{} transactions left unexecuted", simulator.pending());
    }
    Ok(Report { simulator, blocks })
}

/// Hex public key of dev account `index`, as used in `ledger.owner`.
pub fn account_hex(index: u64) -> String {
    let public: PublicKey = dev_account(index).public_key();
    commonware_utils::hex(public.as_ref())
}
