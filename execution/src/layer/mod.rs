use commonware_cryptography::ed25519::PublicKey;
use pennbid_types::{
    config::Settings,
    execution::{Event, Instruction, Key, Output, Transaction, Value},
    ledger::LedgerError,
    BlockInfo,
};
use std::collections::BTreeMap;
use tracing::debug;

use crate::{
    randomness::{RandomnessSource, SeedDraw},
    state::{load_account, validate_and_increment_nonce, PrepareError, State, Status},
};

mod handlers;


/// Executes one block of transactions over a borrowed [State].
///
/// Every instruction writes into `staged`. A successful instruction promotes
/// its staged writes into `pending`; a rejected one drops them, so the block's
/// changes only ever contain whole instructions. Nonce increments bypass the
/// staging area and always land in `pending`.
pub struct Layer<'a, S: State, R: RandomnessSource = SeedDraw> {
    state: &'a S,
    pending: BTreeMap<Key, Status>,
    staged: BTreeMap<Key, Status>,

    settings: &'a Settings,
    block: BlockInfo,
    randomness: R,
}

impl<'a, S: State, R: RandomnessSource> Layer<'a, S, R> {
    pub fn new(state: &'a S, settings: &'a Settings, block: BlockInfo, randomness: R) -> Self {
        Self {
            state,
            pending: BTreeMap::new(),
            staged: BTreeMap::new(),

            settings,
            block,
            randomness,
        }
    }

    /// Clock reading every phase check in this block is made against.
    pub fn now(&self) -> u64 {
        self.block.timestamp
    }

    fn insert(&mut self, key: Key, value: Value) {
        self.staged.insert(key, Status::Update(value));
    }

    async fn prepare(&mut self, transaction: &Transaction) -> Result<(), PrepareError> {
        let mut account = load_account(self, &transaction.public).await;
        validate_and_increment_nonce(&mut account, transaction.nonce)?;
        self.pending.insert(
            Key::Account(transaction.public.clone()),
            Status::Update(Value::Account(account)),
        );

        Ok(())
    }

    async fn dispatch(&mut self, transaction: &Transaction) -> Result<Vec<Event>, LedgerError> {
        let public = &transaction.public;
        match &transaction.instruction {
            // LuckyChance
            Instruction::StartGame {
                game_length,
                max_bet,
            } => {
                self.handle_start_game(public, *game_length, *max_bet)
                    .await
            }
            Instruction::SubmitBet { game_id, amount } => {
                self.handle_submit_bet(public, *game_id, *amount).await
            }
            Instruction::ResolveGame { game_id } => {
                self.handle_resolve_game(public, *game_id).await
            }

            // Auctions
            Instruction::StartAuction {
                asset,
                auction_length,
                min_bid,
            } => {
                self.handle_start_auction(public, asset, *auction_length, *min_bid)
                    .await
            }
            Instruction::SubmitBid { auction_id, amount } => {
                self.handle_submit_bid(public, *auction_id, *amount).await
            }
            Instruction::SettleAuction { auction_id } => {
                self.handle_settle_auction(public, *auction_id).await
            }

            // Treasury
            Instruction::WithdrawFees => self.handle_withdraw_fees(public).await,
        }
    }

    async fn apply(&mut self, transaction: &Transaction) -> Vec<Event> {
        match self.dispatch(transaction).await {
            Ok(events) => {
                let staged = std::mem::take(&mut self.staged);
                self.pending.extend(staged);
                events
            }
            Err(error) => {
                self.staged.clear();
                debug!(
                    caller = ?transaction.public,
                    nonce = transaction.nonce,
                    %error,
                    "rejected instruction"
                );
                vec![Event::Rejected {
                    caller: transaction.public.clone(),
                    error,
                }]
            }
        }
    }

    pub async fn execute(
        &mut self,
        transactions: Vec<Transaction>,
    ) -> (Vec<Output>, BTreeMap<PublicKey, u64>) {
        let mut processed_nonces = BTreeMap::new();
        let mut outputs = Vec::new();

        for tx in transactions {
            if let Err(err) = self.prepare(&tx).await {
                debug!(?err, public = ?tx.public, "skipping transaction");
                continue;
            }
            processed_nonces.insert(tx.public.clone(), tx.nonce.saturating_add(1));
            outputs.extend(self.apply(&tx).await.into_iter().map(Output::Event));
            outputs.push(Output::Transaction(tx));
        }

        (outputs, processed_nonces)
    }

    pub fn commit(self) -> Vec<(Key, Status)> {
        self.pending.into_iter().collect()
    }
}

impl<'a, S: State, R: RandomnessSource> State for Layer<'a, S, R> {
    async fn get(&self, key: &Key) -> Option<Value> {
        let status = self.staged.get(key).or_else(|| self.pending.get(key));
        match status {
            Some(Status::Update(value)) => Some(value.clone()),
            Some(Status::Delete) => None,
            None => self.state.get(key).await,
        }
    }

    async fn insert(&mut self, key: Key, value: Value) {
        self.staged.insert(key, Status::Update(value));
    }

    async fn delete(&mut self, key: &Key) {
        self.staged.insert(key.clone(), Status::Delete);
    }
}
