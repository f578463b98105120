//! Winner draws for LuckyChance games.
//!
//! The default [SeedDraw] is derived entirely from data visible to whoever
//! produces the block (the game seed, the block digest and the block
//! timestamp). Anyone who can choose or withhold a block can bias it. It is
//! kept because every replica must reach the same result; deployments that do
//! not replicate execution should inject [RngDraw] over a strong generator.

use commonware_cryptography::{
    sha256::{Digest, Sha256},
    Hasher,
};
use commonware_utils::modulo;
use pennbid_types::{ledger::Game, BlockInfo};
use rand::{Rng, RngCore};

/// Source of the ticket that selects a game's winner.
pub trait RandomnessSource {
    /// Returns a ticket in `[0, bound)`. `bound` is never zero.
    fn draw(&mut self, game: &Game, block: &BlockInfo, bound: u64) -> u64;
}

/// Deterministic draw from the game seed and ambient block data.
#[derive(Clone, Copy, Debug, Default)]
pub struct SeedDraw;

impl RandomnessSource for SeedDraw {
    fn draw(&mut self, game: &Game, block: &BlockInfo, bound: u64) -> u64 {
        let mut hasher = Sha256::new();
        hasher.update(game.seed.as_ref());
        hasher.update(block.digest.as_ref());
        hasher.update(&block.timestamp.to_be_bytes());
        hasher.update(&game.id.to_be_bytes());
        let digest = hasher.finalize();
        modulo(digest.as_ref(), bound)
    }
}

/// Draw from any [RngCore]. Not reproducible across replicas.
pub struct RngDraw<R: RngCore> {
    rng: R,
}

impl<R: RngCore> RngDraw<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: RngCore> RandomnessSource for RngDraw<R> {
    fn draw(&mut self, _game: &Game, _block: &BlockInfo, bound: u64) -> u64 {
        self.rng.gen_range(0..bound)
    }
}

/// Seed fixed into a game when it is created.
pub fn game_seed(operator_seed: u64, game_id: u64, block: &BlockInfo) -> Digest {
    let mut hasher = Sha256::new();
    hasher.update(&operator_seed.to_be_bytes());
    hasher.update(&game_id.to_be_bytes());
    hasher.update(&block.timestamp.to_be_bytes());
    hasher.finalize()
}
