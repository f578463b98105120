use commonware_cryptography::ed25519::PublicKey;
use pennbid_types::execution::{Account, Key, Transaction, Value};
use std::{
    collections::{BTreeMap, HashMap},
    future::Future,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrepareError {
    NonceMismatch { expected: u64, got: u64 },
}

/// Key-value view of the ledger.
///
/// Engines never touch a global: every read and write goes through the
/// `State` they were handed.
pub trait State {
    fn get(&self, key: &Key) -> impl Future<Output = Option<Value>>;
    fn insert(&mut self, key: Key, value: Value) -> impl Future<Output = ()>;
    fn delete(&mut self, key: &Key) -> impl Future<Output = ()>;

    fn apply(&mut self, changes: Vec<(Key, Status)>) -> impl Future<Output = ()> {
        async {
            for (key, status) in changes {
                match status {
                    Status::Update(value) => self.insert(key, value).await,
                    Status::Delete => self.delete(&key).await,
                }
            }
        }
    }
}

#[derive(Default)]
pub struct Memory {
    state: HashMap<Key, Value>,
}

impl Memory {
    pub fn len(&self) -> usize {
        self.state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }
}

impl State for Memory {
    async fn get(&self, key: &Key) -> Option<Value> {
        self.state.get(key).cloned()
    }

    async fn insert(&mut self, key: Key, value: Value) {
        self.state.insert(key, value);
    }

    async fn delete(&mut self, key: &Key) {
        self.state.remove(key);
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Status {
    Update(Value),
    Delete,
}

pub async fn nonce<S: State>(state: &S, public: &PublicKey) -> u64 {
    load_account(state, public).await.nonce
}

pub(crate) async fn load_account<S: State>(state: &S, public: &PublicKey) -> Account {
    match state.get(&Key::Account(public.clone())).await {
        Some(Value::Account(account)) => account,
        _ => Account::default(),
    }
}

pub(crate) fn validate_and_increment_nonce(
    account: &mut Account,
    provided_nonce: u64,
) -> Result<(), PrepareError> {
    if account.nonce != provided_nonce {
        return Err(PrepareError::NonceMismatch {
            expected: account.nonce,
            got: provided_nonce,
        });
    }
    account.nonce += 1;
    Ok(())
}

/// Admission filter for transactions waiting to be included in a block.
///
/// Tracks nonces of already-admitted transactions on top of the committed
/// state so a sender can queue several transactions ahead of execution.
pub struct Noncer<'a, S: State> {
    state: &'a S,
    pending: BTreeMap<Key, Status>,
}

impl<'a, S: State> Noncer<'a, S> {
    pub fn new(state: &'a S) -> Self {
        Self {
            state,
            pending: BTreeMap::new(),
        }
    }

    pub async fn prepare(&mut self, transaction: &Transaction) -> Result<(), PrepareError> {
        let mut account = load_account(self, &transaction.public).await;
        validate_and_increment_nonce(&mut account, transaction.nonce)?;
        self.insert(
            Key::Account(transaction.public.clone()),
            Value::Account(account),
        )
        .await;

        Ok(())
    }
}

impl<'a, S: State> State for Noncer<'a, S> {
    async fn get(&self, key: &Key) -> Option<Value> {
        match self.pending.get(key) {
            Some(Status::Update(value)) => Some(value.clone()),
            Some(Status::Delete) => None,
            None => self.state.get(key).await,
        }
    }

    async fn insert(&mut self, key: Key, value: Value) {
        self.pending.insert(key, Status::Update(value));
    }

    async fn delete(&mut self, key: &Key) {
        self.pending.insert(key.clone(), Status::Delete);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::create_account_keypair;
    use commonware_runtime::deterministic::Runner;
    use commonware_runtime::Runner as _;
    use pennbid_types::execution::Instruction;

    #[test]
    fn test_noncer_admits_sequential_nonces() {
        let executor = Runner::default();
        executor.start(|_| async move {
            let state = Memory::default();
            let (signer, public) = create_account_keypair(1);
            let mut noncer = Noncer::new(&state);

            let first = Transaction::sign(&signer, 0, Instruction::WithdrawFees);
            let second = Transaction::sign(&signer, 1, Instruction::WithdrawFees);
            let replay = Transaction::sign(&signer, 1, Instruction::WithdrawFees);

            assert!(noncer.prepare(&first).await.is_ok());
            assert!(noncer.prepare(&second).await.is_ok());
            assert_eq!(
                noncer.prepare(&replay).await,
                Err(PrepareError::NonceMismatch {
                    expected: 2,
                    got: 1
                })
            );

            // Committed state is untouched
            assert_eq!(nonce(&state, &public).await, 0);
        });
    }

    #[test]
    fn test_apply_updates_and_deletes() {
        let executor = Runner::default();
        executor.start(|_| async move {
            let mut state = Memory::default();
            state
                .apply(vec![
                    (Key::MaxGameId, Status::Update(Value::Counter(3))),
                    (Key::MaxAuctionId, Status::Update(Value::Counter(1))),
                ])
                .await;
            assert_eq!(state.len(), 2);

            state.apply(vec![(Key::MaxAuctionId, Status::Delete)]).await;
            assert_eq!(state.get(&Key::MaxGameId).await, Some(Value::Counter(3)));
            assert!(state.get(&Key::MaxAuctionId).await.is_none());
        });
    }
}
