use commonware_codec::DecodeExt;
use commonware_cryptography::{
    ed25519::{PrivateKey, PublicKey},
    sha256::{Digest, Sha256},
    Digestible, Hasher, PrivateKeyExt,
};
use pennbid_execution::{
    apply_genesis, Genesis, Layer, Memory, Noncer, PrepareError, SeedDraw, State,
};
use pennbid_types::{
    config::Settings,
    execution::{Block, Event, Output, Transaction, MAX_BLOCK_TRANSACTIONS},
    NAMESPACE,
};
use rand::{rngs::StdRng, SeedableRng};
use std::collections::BTreeMap;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, info};

pub mod scenario;

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("invalid encoding: {0}")]
    InvalidEncoding(#[from] commonware_codec::Error),
    #[error("invalid signature from {0:?}")]
    InvalidSignature(PublicKey),
    #[error("nonce mismatch: expected {expected}, got {got}")]
    NonceMismatch { expected: u64, got: u64 },
}

impl From<PrepareError> for SubmitError {
    fn from(err: PrepareError) -> Self {
        match err {
            PrepareError::NonceMismatch { expected, got } => Self::NonceMismatch { expected, got },
        }
    }
}

/// Outcome of one produced block.
#[derive(Clone, Debug)]
pub struct Summary {
    pub height: u64,
    pub timestamp: u64,
    pub digest: Digest,
    pub transactions: usize,
    pub events: Vec<Event>,
}

/// Deterministic development key for account `index`.
pub fn dev_account(index: u64) -> PrivateKey {
    let mut rng = StdRng::seed_from_u64(index);
    PrivateKey::from_rng(&mut rng)
}

/// Single-node ledger: admits transactions, produces blocks on a manual clock
/// and applies each block's changes to an in-memory store.
pub struct Simulator {
    settings: Settings,
    state: Memory,

    parent: Digest,
    height: u64,
    timestamp: u64,

    mempool: Vec<Transaction>,
    history: BTreeMap<u64, Summary>,
    update_tx: broadcast::Sender<Summary>,
}

impl Simulator {
    pub async fn new(settings: Settings, genesis: &Genesis, timestamp: u64) -> Self {
        let mut state = Memory::default();
        apply_genesis(&mut state, &settings, genesis).await;

        let mut hasher = Sha256::new();
        hasher.update(NAMESPACE);
        let parent = hasher.finalize();

        let (update_tx, _) = broadcast::channel(1024);
        Self {
            settings,
            state,

            parent,
            height: 0,
            timestamp,

            mempool: Vec::new(),
            history: BTreeMap::new(),
            update_tx,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Committed ledger, readable with `pennbid_execution::query`.
    pub fn state(&self) -> &Memory {
        &self.state
    }

    pub fn height(&self) -> u64 {
        self.height
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn pending(&self) -> usize {
        self.mempool.len()
    }

    pub fn summary(&self, height: u64) -> Option<&Summary> {
        self.history.get(&height)
    }

    pub fn update_subscriber(&self) -> broadcast::Receiver<Summary> {
        self.update_tx.subscribe()
    }

    /// Moves the clock forward. The next block is stamped with the new time.
    pub fn advance_clock(&mut self, seconds: u64) {
        self.timestamp = self.timestamp.saturating_add(seconds);
    }

    /// Admits every transaction with a valid signature and the next expected
    /// nonce (counting transactions already waiting in the mempool).
    pub async fn submit_transactions(
        &mut self,
        transactions: Vec<Transaction>,
    ) -> Vec<Result<(), SubmitError>> {
        let mut noncer = Noncer::new(&self.state);
        for tx in &self.mempool {
            let _ = noncer.prepare(tx).await;
        }

        let mut admitted = Vec::new();
        let mut results = Vec::with_capacity(transactions.len());
        for tx in transactions {
            if !tx.verify() {
                results.push(Err(SubmitError::InvalidSignature(tx.public.clone())));
                continue;
            }
            if let Err(err) = noncer.prepare(&tx).await {
                results.push(Err(err.into()));
                continue;
            }
            admitted.push(tx);
            results.push(Ok(()));
        }

        self.mempool.extend(admitted);
        results
    }

    /// Decodes a wire-encoded transaction and submits it.
    pub async fn submit_encoded(&mut self, body: &[u8]) -> Result<(), SubmitError> {
        let tx = Transaction::decode(body)?;
        self.submit_transactions(vec![tx])
            .await
            .pop()
            .unwrap_or(Ok(()))
    }

    /// Executes up to [MAX_BLOCK_TRANSACTIONS] queued transactions as the next
    /// block and commits the result.
    pub async fn produce_block(&mut self) -> Summary {
        let count = self.mempool.len().min(MAX_BLOCK_TRANSACTIONS);
        let transactions: Vec<Transaction> = self.mempool.drain(..count).collect();
        let block = Block::new(self.parent, self.height + 1, self.timestamp, transactions);

        let (outputs, changes) = {
            let mut layer = Layer::new(&self.state, &self.settings, block.info(), SeedDraw);
            let (outputs, _) = layer.execute(block.transactions.clone()).await;
            (outputs, layer.commit())
        };
        let writes = changes.len();
        self.state.apply(changes).await;

        let events: Vec<Event> = outputs
            .into_iter()
            .filter_map(|output| match output {
                Output::Event(event) => Some(event),
                Output::Transaction(_) => None,
            })
            .collect();
        for event in &events {
            debug!(height = block.height, ?event, "event");
        }

        self.parent = block.digest();
        self.height = block.height;
        let summary = Summary {
            height: block.height,
            timestamp: block.timestamp,
            digest: block.digest(),
            transactions: block.transactions.len(),
            events,
        };
        info!(
            height = summary.height,
            timestamp = summary.timestamp,
            transactions = summary.transactions,
            writes,
            "produced block"
        );

        self.history.insert(summary.height, summary.clone());
        if self.update_tx.receiver_count() > 0 {
            let _ = self.update_tx.send(summary.clone());
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use commonware_codec::Encode;
    use commonware_cryptography::Signer;
    use commonware_runtime::{deterministic::Runner, Runner as _};
    use pennbid_execution::{mocks::create_settings, nonce, query};
    use pennbid_types::{execution::Instruction, ledger::LedgerError};

    async fn simulator(funded: &[u64]) -> Simulator {
        let owner = dev_account(0).public_key();
        let mut genesis = Genesis::default();
        for index in funded {
            genesis = genesis.with_balance(dev_account(*index).public_key(), 1_000);
        }
        Simulator::new(create_settings(owner), &genesis, 0).await
    }

    #[test]
    fn test_submit_checks_signature_and_nonce() {
        let executor = Runner::default();
        executor.start(|_| async move {
            let mut simulator = simulator(&[1]).await;
            let signer = dev_account(1);

            let first = Transaction::sign(&signer, 0, Instruction::WithdrawFees);
            let second = Transaction::sign(&signer, 1, Instruction::WithdrawFees);
            let gap = Transaction::sign(&signer, 5, Instruction::WithdrawFees);
            let mut forged = Transaction::sign(&signer, 2, Instruction::WithdrawFees);
            forged.nonce = 3;

            let results = simulator
                .submit_transactions(vec![first, second, gap, forged])
                .await;
            assert!(results[0].is_ok());
            assert!(results[1].is_ok());
            assert!(matches!(
                results[2],
                Err(SubmitError::NonceMismatch {
                    expected: 2,
                    got: 5
                })
            ));
            assert!(matches!(results[3], Err(SubmitError::InvalidSignature(_))));
            assert_eq!(simulator.pending(), 2);

            // Queued nonces are remembered across submissions
            let third = Transaction::sign(&signer, 2, Instruction::WithdrawFees);
            assert!(simulator.submit_transactions(vec![third]).await[0].is_ok());
        });
    }

    #[test]
    fn test_submit_encoded() {
        let executor = Runner::default();
        executor.start(|_| async move {
            let mut simulator = simulator(&[1]).await;
            let tx = Transaction::sign(
                &dev_account(1),
                0,
                Instruction::StartGame {
                    game_length: 5,
                    max_bet: 10,
                },
            );
            let encoded = tx.encode();
            assert!(simulator.submit_encoded(&encoded).await.is_ok());
            assert!(matches!(
                simulator.submit_encoded(&encoded[..encoded.len() - 1]).await,
                Err(SubmitError::InvalidEncoding(_))
            ));
            assert_eq!(simulator.pending(), 1);
        });
    }

    #[test]
    fn test_blocks_follow_clock() {
        let executor = Runner::default();
        executor.start(|_| async move {
            let mut simulator = simulator(&[1]).await;
            let mut updates = simulator.update_subscriber();
            let signer = dev_account(1);
            let public = signer.public_key();

            simulator
                .submit_transactions(vec![
                    Transaction::sign(
                        &signer,
                        0,
                        Instruction::StartGame {
                            game_length: 3,
                            max_bet: 10,
                        },
                    ),
                    Transaction::sign(
                        &signer,
                        1,
                        Instruction::SubmitBet {
                            game_id: 1,
                            amount: 4,
                        },
                    ),
                ])
                .await;
            let first = simulator.produce_block().await;
            assert_eq!(first.height, 1);
            assert_eq!(first.transactions, 2);
            assert_eq!(first.events.len(), 2);
            assert_eq!(updates.try_recv().map(|s| s.height).ok(), Some(1));

            simulator.advance_clock(2);
            simulator
                .submit_transactions(vec![Transaction::sign(
                    &signer,
                    2,
                    Instruction::ResolveGame { game_id: 1 },
                )])
                .await;
            let second = simulator.produce_block().await;
            assert_eq!(
                second.events,
                vec![Event::Rejected {
                    caller: public.clone(),
                    error: LedgerError::WindowOpen,
                }]
            );

            simulator.advance_clock(1);
            simulator
                .submit_transactions(vec![Transaction::sign(
                    &signer,
                    3,
                    Instruction::ResolveGame { game_id: 1 },
                )])
                .await;
            let third = simulator.produce_block().await;
            assert_eq!(third.timestamp, 3);
            assert!(matches!(
                third.events[0],
                Event::GameResolved { payout: 4, fee: 0, .. }
            ));

            assert_ne!(first.digest, third.digest);
            assert_eq!(simulator.height(), 3);
            assert_eq!(nonce(simulator.state(), &public).await, 4);
            assert_eq!(query::balance(simulator.state(), &public).await, 1_000);
            assert!(simulator.summary(2).is_some());
        });
    }
}
