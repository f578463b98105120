use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, Read, ReadExt, Write};
use commonware_cryptography::{ed25519::PublicKey, sha256::Digest};

use super::Phase;

/// A LuckyChance pooled-wager game.
///
/// The ordered bettor list and the per-bettor totals live under their own
/// keys (`GameBettor`, `GameBet`) so a deposit only rewrites the entries it
/// touches. `bettor_count` is the length of that list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Game {
    pub id: u64,
    pub creator: PublicKey,
    pub max_bet: u64,
    pub game_length: u64,
    pub start_time: u64,
    pub end_time: u64,
    /// Fixed at creation and mixed into the winner draw.
    pub seed: Digest,
    pub total_pot: u64,
    pub bettor_count: u64,
    pub resolved: bool,
    pub winner: Option<PublicKey>,
}

impl Game {
    pub fn new(
        id: u64,
        creator: PublicKey,
        max_bet: u64,
        game_length: u64,
        start_time: u64,
        seed: Digest,
    ) -> Self {
        Self {
            id,
            creator,
            max_bet,
            game_length,
            start_time,
            end_time: start_time.saturating_add(game_length),
            seed,
            total_pot: 0,
            bettor_count: 0,
            resolved: false,
            winner: None,
        }
    }

    pub fn phase(&self, now: u64) -> Phase {
        Phase::at(now, self.end_time, self.resolved)
    }

    /// Room left under the pool cap.
    pub fn remaining_capacity(&self) -> u64 {
        self.max_bet.saturating_sub(self.total_pot)
    }
}

impl Write for Game {
    fn write(&self, writer: &mut impl BufMut) {
        self.id.write(writer);
        self.creator.write(writer);
        self.max_bet.write(writer);
        self.game_length.write(writer);
        self.start_time.write(writer);
        self.end_time.write(writer);
        self.seed.write(writer);
        self.total_pot.write(writer);
        self.bettor_count.write(writer);
        self.resolved.write(writer);
        self.winner.write(writer);
    }
}

impl Read for Game {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            id: u64::read(reader)?,
            creator: PublicKey::read(reader)?,
            max_bet: u64::read(reader)?,
            game_length: u64::read(reader)?,
            start_time: u64::read(reader)?,
            end_time: u64::read(reader)?,
            seed: Digest::read(reader)?,
            total_pot: u64::read(reader)?,
            bettor_count: u64::read(reader)?,
            resolved: bool::read(reader)?,
            winner: Option::<PublicKey>::read(reader)?,
        })
    }
}

impl EncodeSize for Game {
    fn encode_size(&self) -> usize {
        self.id.encode_size()
            + self.creator.encode_size()
            + self.max_bet.encode_size()
            + self.game_length.encode_size()
            + self.start_time.encode_size()
            + self.end_time.encode_size()
            + self.seed.encode_size()
            + self.total_pot.encode_size()
            + self.bettor_count.encode_size()
            + self.resolved.encode_size()
            + self.winner.encode_size()
    }
}
