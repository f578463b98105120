use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, Read, ReadExt, Write};
use commonware_cryptography::ed25519::PublicKey;

use super::{AssetRef, Phase};

/// An English auction over a single escrowed asset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Auction {
    pub id: u64,
    pub asset: AssetRef,
    pub original_owner: PublicKey,
    pub auction_length: u64,
    pub start_time: u64,
    pub end_time: u64,
    pub min_bid: u64,
    /// Zero until the first bid lands.
    pub highest_bid: u64,
    pub highest_bidder: Option<PublicKey>,
    pub settled: bool,
}

impl Auction {
    pub fn new(
        id: u64,
        asset: AssetRef,
        original_owner: PublicKey,
        auction_length: u64,
        start_time: u64,
        min_bid: u64,
    ) -> Self {
        Self {
            id,
            asset,
            original_owner,
            auction_length,
            start_time,
            end_time: start_time.saturating_add(auction_length),
            min_bid,
            highest_bid: 0,
            highest_bidder: None,
            settled: false,
        }
    }

    pub fn phase(&self, now: u64) -> Phase {
        Phase::at(now, self.end_time, self.settled)
    }

    /// Whether `amount` would become the new highest bid.
    pub fn accepts(&self, amount: u64) -> bool {
        if self.highest_bid == 0 {
            amount >= self.min_bid
        } else {
            amount > self.highest_bid
        }
    }
}

impl Write for Auction {
    fn write(&self, writer: &mut impl BufMut) {
        self.id.write(writer);
        self.asset.write(writer);
        self.original_owner.write(writer);
        self.auction_length.write(writer);
        self.start_time.write(writer);
        self.end_time.write(writer);
        self.min_bid.write(writer);
        self.highest_bid.write(writer);
        self.highest_bidder.write(writer);
        self.settled.write(writer);
    }
}

impl Read for Auction {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            id: u64::read(reader)?,
            asset: AssetRef::read(reader)?,
            original_owner: PublicKey::read(reader)?,
            auction_length: u64::read(reader)?,
            start_time: u64::read(reader)?,
            end_time: u64::read(reader)?,
            min_bid: u64::read(reader)?,
            highest_bid: u64::read(reader)?,
            highest_bidder: Option::<PublicKey>::read(reader)?,
            settled: bool::read(reader)?,
        })
    }
}

impl EncodeSize for Auction {
    fn encode_size(&self) -> usize {
        self.id.encode_size()
            + self.asset.encode_size()
            + self.original_owner.encode_size()
            + self.auction_length.encode_size()
            + self.start_time.encode_size()
            + self.end_time.encode_size()
            + self.min_bid.encode_size()
            + self.highest_bid.encode_size()
            + self.highest_bidder.encode_size()
            + self.settled.encode_size()
    }
}
