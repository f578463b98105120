//! Read accessors over any [State].
//!
//! Missing records read as their empty value (zero counters and balances),
//! matching how a fresh ledger behaves.

pub use crate::state::nonce;

use crate::State;
use commonware_cryptography::ed25519::PublicKey;
use pennbid_types::{
    execution::{Key, Value},
    ledger::{AssetRef, Auction, Custodian, Game, Treasury, ValueEscrow},
};

async fn counter<S: State>(state: &S, key: &Key) -> u64 {
    match state.get(key).await {
        Some(Value::Counter(value)) => value,
        _ => 0,
    }
}

/// Highest game id allocated; games are numbered `1..=max_game_id`.
pub async fn max_game_id<S: State>(state: &S) -> u64 {
    counter(state, &Key::MaxGameId).await
}

pub async fn game_info<S: State>(state: &S, id: u64) -> Option<Game> {
    match state.get(&Key::Game(id)).await {
        Some(Value::Game(game)) => Some(game),
        _ => None,
    }
}

pub async fn bettor_count<S: State>(state: &S, id: u64) -> u64 {
    game_info(state, id)
        .await
        .map(|game| game.bettor_count)
        .unwrap_or_default()
}

/// Bettor at `index` in first-deposit order.
pub async fn bettor_at<S: State>(state: &S, id: u64, index: u64) -> Option<PublicKey> {
    match state.get(&Key::GameBettor(id, index)).await {
        Some(Value::GameBettor(public)) => Some(public),
        _ => None,
    }
}

/// Cumulative deposit of `bettor` in game `id`.
pub async fn bettor_amount<S: State>(state: &S, id: u64, bettor: &PublicKey) -> u64 {
    match state.get(&Key::GameBet(id, bettor.clone())).await {
        Some(Value::GameBet(amount)) => amount,
        _ => 0,
    }
}

/// Every bettor of game `id` with their cumulative deposit, in order.
pub async fn bettors<S: State>(state: &S, id: u64) -> Vec<(PublicKey, u64)> {
    let count = bettor_count(state, id).await;
    let mut entries = Vec::with_capacity(count as usize);
    for index in 0..count {
        if let Some(bettor) = bettor_at(state, id, index).await {
            let amount = bettor_amount(state, id, &bettor).await;
            entries.push((bettor, amount));
        }
    }
    entries
}

pub async fn max_auction_id<S: State>(state: &S) -> u64 {
    counter(state, &Key::MaxAuctionId).await
}

pub async fn auction_info<S: State>(state: &S, id: u64) -> Option<Auction> {
    match state.get(&Key::Auction(id)).await {
        Some(Value::Auction(auction)) => Some(auction),
        _ => None,
    }
}

pub async fn balance<S: State>(state: &S, public: &PublicKey) -> u64 {
    match state.get(&Key::Balance(public.clone())).await {
        Some(Value::Balance(amount)) => amount,
        _ => 0,
    }
}

pub async fn asset_owner<S: State>(state: &S, asset: &AssetRef) -> Option<Custodian> {
    match state.get(&Key::AssetOwner(asset.clone())).await {
        Some(Value::AssetOwner(custodian)) => Some(custodian),
        _ => None,
    }
}

pub async fn escrow<S: State>(state: &S) -> ValueEscrow {
    match state.get(&Key::Escrow).await {
        Some(Value::Escrow(escrow)) => escrow,
        _ => ValueEscrow::default(),
    }
}

pub async fn treasury<S: State>(state: &S) -> Option<Treasury> {
    match state.get(&Key::Treasury).await {
        Some(Value::Treasury(treasury)) => Some(treasury),
        _ => None,
    }
}
