//! Initial ledger contents.
//!
//! Currency and assets are issued elsewhere; a fresh ledger is seeded with
//! the balances and asset ownership it should start from.

use crate::State;
use commonware_cryptography::ed25519::PublicKey;
use pennbid_types::{
    config::Settings,
    execution::{Key, Value},
    ledger::{AssetRef, Custodian, Treasury, ValueEscrow},
};
use std::collections::BTreeMap;
use tracing::info;

#[derive(Clone, Debug, Default)]
pub struct Genesis {
    pub balances: Vec<(PublicKey, u64)>,
    pub assets: Vec<(AssetRef, PublicKey)>,
}

impl Genesis {
    pub fn with_balance(mut self, public: PublicKey, amount: u64) -> Self {
        self.balances.push((public, amount));
        self
    }

    pub fn with_asset(mut self, asset: AssetRef, owner: PublicKey) -> Self {
        self.assets.push((asset, owner));
        self
    }
}

/// Writes `genesis` into `state` along with empty escrow and treasury records.
///
/// Repeated balances for one account are summed; a repeated asset keeps its
/// last owner.
pub async fn apply_genesis<S: State>(state: &mut S, settings: &Settings, genesis: &Genesis) {
    let mut balances: BTreeMap<PublicKey, u64> = BTreeMap::new();
    for (public, amount) in &genesis.balances {
        let entry = balances.entry(public.clone()).or_default();
        *entry = entry.saturating_add(*amount);
    }
    let supply: u64 = balances.values().fold(0, |acc, v| acc.saturating_add(*v));
    for (public, amount) in balances {
        state.insert(Key::Balance(public), Value::Balance(amount)).await;
    }

    for (asset, owner) in &genesis.assets {
        state
            .insert(
                Key::AssetOwner(asset.clone()),
                Value::AssetOwner(Custodian::Account(owner.clone())),
            )
            .await;
    }

    state
        .insert(Key::Escrow, Value::Escrow(ValueEscrow::default()))
        .await;
    state
        .insert(
            Key::Treasury,
            Value::Treasury(Treasury::new(settings.owner.clone())),
        )
        .await;

    info!(supply, assets = genesis.assets.len(), "applied genesis");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        mocks::{create_account_keypair, create_settings},
        query, Memory,
    };
    use commonware_runtime::deterministic::Runner;
    use commonware_runtime::Runner as _;

    #[test]
    fn test_genesis_sums_duplicate_balances() {
        let executor = Runner::default();
        executor.start(|_| async move {
            let (_, owner) = create_account_keypair(0);
            let (_, alice) = create_account_keypair(1);
            let asset = AssetRef::new("PennFT", 1);
            let genesis = Genesis::default()
                .with_balance(alice.clone(), 10)
                .with_balance(alice.clone(), 5)
                .with_asset(asset.clone(), alice.clone());

            let mut state = Memory::default();
            apply_genesis(&mut state, &create_settings(owner.clone()), &genesis).await;

            assert_eq!(query::balance(&state, &alice).await, 15);
            assert_eq!(
                query::asset_owner(&state, &asset).await,
                Some(Custodian::Account(alice))
            );
            assert_eq!(query::treasury(&state).await.map(|t| t.owner), Some(owner));
            assert_eq!(query::escrow(&state).await.held, 0);
        });
    }
}
