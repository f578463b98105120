use bytes::{Buf, BufMut};
use commonware_codec::{
    varint::UInt, Encode, EncodeSize, Error, FixedSize, RangeCfg, Read, ReadExt, Write,
};
use commonware_cryptography::{
    ed25519::{self, PublicKey},
    sha256::{Digest, Sha256},
    Committable, Digestible, Hasher, Signer, Verifier,
};
use commonware_utils::union;

use crate::ledger::{
    AssetRef, Auction, Custodian, Game, LedgerError, Treasury, ValueEscrow,
};

pub const NAMESPACE: &[u8] = b"_PENNBID";
pub const TRANSACTION_SUFFIX: &[u8] = b"_TX";
pub const MAX_BLOCK_TRANSACTIONS: usize = 500;

#[inline]
pub fn transaction_namespace(namespace: &[u8]) -> Vec<u8> {
    union(namespace, TRANSACTION_SUFFIX)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub nonce: u64,
    pub instruction: Instruction,

    pub public: ed25519::PublicKey,
    pub signature: ed25519::Signature,
}

impl Transaction {
    fn payload(nonce: &u64, instruction: &Instruction) -> Vec<u8> {
        let mut payload = Vec::new();
        nonce.write(&mut payload);
        instruction.write(&mut payload);

        payload
    }

    pub fn sign(private: &ed25519::PrivateKey, nonce: u64, instruction: Instruction) -> Self {
        let signature = private.sign(
            Some(&transaction_namespace(NAMESPACE)),
            &Self::payload(&nonce, &instruction),
        );

        Self {
            nonce,
            instruction,
            public: private.public_key(),
            signature,
        }
    }

    pub fn verify(&self) -> bool {
        self.public.verify(
            Some(&transaction_namespace(NAMESPACE)),
            &Self::payload(&self.nonce, &self.instruction),
            &self.signature,
        )
    }
}

impl Write for Transaction {
    fn write(&self, writer: &mut impl BufMut) {
        self.nonce.write(writer);
        self.instruction.write(writer);
        self.public.write(writer);
        self.signature.write(writer);
    }
}

impl Read for Transaction {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let nonce = u64::read(reader)?;
        let instruction = Instruction::read(reader)?;
        let public = ed25519::PublicKey::read(reader)?;
        let signature = ed25519::Signature::read(reader)?;

        Ok(Self {
            nonce,
            instruction,
            public,
            signature,
        })
    }
}

impl EncodeSize for Transaction {
    fn encode_size(&self) -> usize {
        self.nonce.encode_size()
            + self.instruction.encode_size()
            + self.public.encode_size()
            + self.signature.encode_size()
    }
}

impl Digestible for Transaction {
    type Digest = Digest;

    fn digest(&self) -> Digest {
        let mut hasher = Sha256::new();
        hasher.update(self.nonce.to_be_bytes().as_ref());
        hasher.update(self.instruction.encode().as_ref());
        hasher.update(self.public.as_ref());
        // Any valid signature is valid for the transaction, so it is left out
        hasher.finalize()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    // LuckyChance (tags 10-12)
    /// Open a pooled-wager game.
    /// Binary: [10] [gameLength:u64 BE] [maxBet:u64 BE]
    StartGame { game_length: u64, max_bet: u64 },

    /// Deposit into a game's pot.
    /// Binary: [11] [gameId:u64 BE] [amount:u64 BE]
    SubmitBet { game_id: u64, amount: u64 },

    /// Draw the winner of an expired game and pay out.
    /// Binary: [12] [gameId:u64 BE]
    ResolveGame { game_id: u64 },

    // Auction (tags 20-22)
    /// Escrow an asset and open bidding.
    /// Binary: [20] [collectionLen:u32 BE] [collection...] [tokenId:u64 BE] [auctionLength:u64 BE] [minBid:u64 BE]
    StartAuction {
        asset: AssetRef,
        auction_length: u64,
        min_bid: u64,
    },

    /// Outbid the current highest bidder.
    /// Binary: [21] [auctionId:u64 BE] [amount:u64 BE]
    SubmitBid { auction_id: u64, amount: u64 },

    /// Hand the asset and proceeds to their final owners.
    /// Binary: [22] [auctionId:u64 BE]
    SettleAuction { auction_id: u64 },

    // Treasury (tag 30)
    /// Move every accrued fee to the owner.
    /// Binary: [30]
    WithdrawFees,
}

impl Write for Instruction {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::StartGame {
                game_length,
                max_bet,
            } => {
                10u8.write(writer);
                game_length.write(writer);
                max_bet.write(writer);
            }
            Self::SubmitBet { game_id, amount } => {
                11u8.write(writer);
                game_id.write(writer);
                amount.write(writer);
            }
            Self::ResolveGame { game_id } => {
                12u8.write(writer);
                game_id.write(writer);
            }
            Self::StartAuction {
                asset,
                auction_length,
                min_bid,
            } => {
                20u8.write(writer);
                asset.write(writer);
                auction_length.write(writer);
                min_bid.write(writer);
            }
            Self::SubmitBid { auction_id, amount } => {
                21u8.write(writer);
                auction_id.write(writer);
                amount.write(writer);
            }
            Self::SettleAuction { auction_id } => {
                22u8.write(writer);
                auction_id.write(writer);
            }
            Self::WithdrawFees => 30u8.write(writer),
        }
    }
}

impl Read for Instruction {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let instruction = match u8::read(reader)? {
            10 => Self::StartGame {
                game_length: u64::read(reader)?,
                max_bet: u64::read(reader)?,
            },
            11 => Self::SubmitBet {
                game_id: u64::read(reader)?,
                amount: u64::read(reader)?,
            },
            12 => Self::ResolveGame {
                game_id: u64::read(reader)?,
            },
            20 => Self::StartAuction {
                asset: AssetRef::read(reader)?,
                auction_length: u64::read(reader)?,
                min_bid: u64::read(reader)?,
            },
            21 => Self::SubmitBid {
                auction_id: u64::read(reader)?,
                amount: u64::read(reader)?,
            },
            22 => Self::SettleAuction {
                auction_id: u64::read(reader)?,
            },
            30 => Self::WithdrawFees,

            i => return Err(Error::InvalidEnum(i)),
        };

        Ok(instruction)
    }
}

impl EncodeSize for Instruction {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::StartGame { .. } => 8 + 8,
                Self::SubmitBet { .. } => 8 + 8,
                Self::ResolveGame { .. } => 8,
                Self::StartAuction { asset, .. } => asset.encode_size() + 8 + 8,
                Self::SubmitBid { .. } => 8 + 8,
                Self::SettleAuction { .. } => 8,
                Self::WithdrawFees => 0,
            }
    }
}

/// Ambient data visible to every transaction in a block: the clock and the
/// block digest (the weak entropy source for draws).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockInfo {
    pub height: u64,
    pub timestamp: u64,
    pub digest: Digest,
}

impl BlockInfo {
    pub fn new(height: u64, timestamp: u64, digest: Digest) -> Self {
        Self {
            height,
            timestamp,
            digest,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    pub parent: Digest,

    pub height: u64,
    pub timestamp: u64,

    pub transactions: Vec<Transaction>,

    digest: Digest,
}

impl Block {
    fn compute_digest(
        parent: &Digest,
        height: u64,
        timestamp: u64,
        transactions: &[Transaction],
    ) -> Digest {
        let mut hasher = Sha256::new();
        hasher.update(parent);
        hasher.update(&height.to_be_bytes());
        hasher.update(&timestamp.to_be_bytes());
        for transaction in transactions {
            hasher.update(&transaction.digest());
        }
        hasher.finalize()
    }

    pub fn new(parent: Digest, height: u64, timestamp: u64, transactions: Vec<Transaction>) -> Self {
        assert!(transactions.len() <= MAX_BLOCK_TRANSACTIONS);
        let digest = Self::compute_digest(&parent, height, timestamp, &transactions);
        Self {
            parent,
            height,
            timestamp,
            transactions,
            digest,
        }
    }

    pub fn info(&self) -> BlockInfo {
        BlockInfo::new(self.height, self.timestamp, self.digest)
    }
}

impl Write for Block {
    fn write(&self, writer: &mut impl BufMut) {
        self.parent.write(writer);
        UInt(self.height).write(writer);
        UInt(self.timestamp).write(writer);
        self.transactions.write(writer);
    }
}

impl Read for Block {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let parent = Digest::read(reader)?;
        let height = UInt::read(reader)?.into();
        let timestamp = UInt::read(reader)?.into();
        let transactions = Vec::<Transaction>::read_cfg(
            reader,
            &(RangeCfg::from(0..=MAX_BLOCK_TRANSACTIONS), ()),
        )?;

        let digest = Self::compute_digest(&parent, height, timestamp, &transactions);
        Ok(Self {
            parent,
            height,
            timestamp,
            transactions,
            digest,
        })
    }
}

impl EncodeSize for Block {
    fn encode_size(&self) -> usize {
        self.parent.encode_size()
            + UInt(self.height).encode_size()
            + UInt(self.timestamp).encode_size()
            + self.transactions.encode_size()
    }
}

impl Digestible for Block {
    type Digest = Digest;

    fn digest(&self) -> Digest {
        self.digest
    }
}

impl Committable for Block {
    type Commitment = Digest;

    fn commitment(&self) -> Digest {
        self.digest
    }
}

/// Minimal account structure for transaction nonce tracking.
#[derive(Clone, Default, Eq, PartialEq, Debug)]
pub struct Account {
    pub nonce: u64,
}

impl Write for Account {
    fn write(&self, writer: &mut impl BufMut) {
        self.nonce.write(writer);
    }
}

impl Read for Account {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            nonce: u64::read(reader)?,
        })
    }
}

impl EncodeSize for Account {
    fn encode_size(&self) -> usize {
        self.nonce.encode_size()
    }
}

#[derive(Hash, Eq, PartialEq, Ord, PartialOrd, Clone, Debug)]
pub enum Key {
    /// Account for nonce tracking (tag 0)
    Account(PublicKey),
    /// Native currency balance (tag 1)
    Balance(PublicKey),
    /// Registry entry for a non-fungible asset (tag 2)
    AssetOwner(AssetRef),

    // Engine-wide records (tags 3-5)
    Escrow,
    Treasury,
    MaxGameId,

    // LuckyChance (tags 10-12)
    Game(u64),
    /// Bettor at a position in a game's first-deposit order.
    GameBettor(u64, u64),
    /// Cumulative deposit of a bettor in a game.
    GameBet(u64, PublicKey),

    // Auction (tags 20-21)
    MaxAuctionId,
    Auction(u64),
}

impl Write for Key {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Account(pk) => {
                0u8.write(writer);
                pk.write(writer);
            }
            Self::Balance(pk) => {
                1u8.write(writer);
                pk.write(writer);
            }
            Self::AssetOwner(asset) => {
                2u8.write(writer);
                asset.write(writer);
            }
            Self::Escrow => 3u8.write(writer),
            Self::Treasury => 4u8.write(writer),
            Self::MaxGameId => 5u8.write(writer),
            Self::Game(id) => {
                10u8.write(writer);
                id.write(writer);
            }
            Self::GameBettor(id, index) => {
                11u8.write(writer);
                id.write(writer);
                index.write(writer);
            }
            Self::GameBet(id, pk) => {
                12u8.write(writer);
                id.write(writer);
                pk.write(writer);
            }
            Self::MaxAuctionId => 20u8.write(writer),
            Self::Auction(id) => {
                21u8.write(writer);
                id.write(writer);
            }
        }
    }
}

impl Read for Key {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let key = match u8::read(reader)? {
            0 => Self::Account(PublicKey::read(reader)?),
            1 => Self::Balance(PublicKey::read(reader)?),
            2 => Self::AssetOwner(AssetRef::read(reader)?),
            3 => Self::Escrow,
            4 => Self::Treasury,
            5 => Self::MaxGameId,
            10 => Self::Game(u64::read(reader)?),
            11 => Self::GameBettor(u64::read(reader)?, u64::read(reader)?),
            12 => Self::GameBet(u64::read(reader)?, PublicKey::read(reader)?),
            20 => Self::MaxAuctionId,
            21 => Self::Auction(u64::read(reader)?),

            i => return Err(Error::InvalidEnum(i)),
        };

        Ok(key)
    }
}

impl EncodeSize for Key {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::Account(_) | Self::Balance(_) => PublicKey::SIZE,
                Self::AssetOwner(asset) => asset.encode_size(),
                Self::Escrow | Self::Treasury | Self::MaxGameId | Self::MaxAuctionId => 0,
                Self::Game(_) | Self::Auction(_) => u64::SIZE,
                Self::GameBettor(..) => u64::SIZE + u64::SIZE,
                Self::GameBet(..) => u64::SIZE + PublicKey::SIZE,
            }
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Value {
    /// Account for nonce tracking (tag 0)
    Account(Account),
    Balance(u64),
    AssetOwner(Custodian),

    Escrow(ValueEscrow),
    Treasury(Treasury),
    /// Highest id allocated so far (`MaxGameId`, `MaxAuctionId`).
    Counter(u64),

    Game(Game),
    GameBettor(PublicKey),
    GameBet(u64),

    Auction(Auction),
}

impl Write for Value {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Account(account) => {
                0u8.write(writer);
                account.write(writer);
            }
            Self::Balance(amount) => {
                1u8.write(writer);
                amount.write(writer);
            }
            Self::AssetOwner(custodian) => {
                2u8.write(writer);
                custodian.write(writer);
            }
            Self::Escrow(escrow) => {
                3u8.write(writer);
                escrow.write(writer);
            }
            Self::Treasury(treasury) => {
                4u8.write(writer);
                treasury.write(writer);
            }
            Self::Counter(value) => {
                5u8.write(writer);
                value.write(writer);
            }
            Self::Game(game) => {
                10u8.write(writer);
                game.write(writer);
            }
            Self::GameBettor(pk) => {
                11u8.write(writer);
                pk.write(writer);
            }
            Self::GameBet(amount) => {
                12u8.write(writer);
                amount.write(writer);
            }
            Self::Auction(auction) => {
                21u8.write(writer);
                auction.write(writer);
            }
        }
    }
}

impl Read for Value {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let value = match u8::read(reader)? {
            0 => Self::Account(Account::read(reader)?),
            1 => Self::Balance(u64::read(reader)?),
            2 => Self::AssetOwner(Custodian::read(reader)?),
            3 => Self::Escrow(ValueEscrow::read(reader)?),
            4 => Self::Treasury(Treasury::read(reader)?),
            5 => Self::Counter(u64::read(reader)?),
            10 => Self::Game(Game::read(reader)?),
            11 => Self::GameBettor(PublicKey::read(reader)?),
            12 => Self::GameBet(u64::read(reader)?),
            21 => Self::Auction(Auction::read(reader)?),

            i => return Err(Error::InvalidEnum(i)),
        };

        Ok(value)
    }
}

impl EncodeSize for Value {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::Account(account) => account.encode_size(),
                Self::Balance(amount) | Self::Counter(amount) | Self::GameBet(amount) => {
                    amount.encode_size()
                }
                Self::AssetOwner(custodian) => custodian.encode_size(),
                Self::Escrow(escrow) => escrow.encode_size(),
                Self::Treasury(treasury) => treasury.encode_size(),
                Self::Game(game) => game.encode_size(),
                Self::GameBettor(pk) => pk.encode_size(),
                Self::Auction(auction) => auction.encode_size(),
            }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // LuckyChance events (tags 10-12)
    GameStarted {
        id: u64,
        creator: PublicKey,
        max_bet: u64,
        end_time: u64,
    },
    BetSubmitted {
        game_id: u64,
        bettor: PublicKey,
        amount: u64,
        bettor_total: u64,
        total_pot: u64,
    },
    GameResolved {
        game_id: u64,
        winner: Option<PublicKey>,
        payout: u64,
        fee: u64,
    },

    // Auction events (tags 20-22)
    AuctionStarted {
        id: u64,
        seller: PublicKey,
        asset: AssetRef,
        min_bid: u64,
        end_time: u64,
    },
    BidSubmitted {
        auction_id: u64,
        bidder: PublicKey,
        amount: u64,
        /// Displaced bidder, refunded `refund`.
        refunded: Option<PublicKey>,
        refund: u64,
    },
    AuctionSettled {
        auction_id: u64,
        winner: Option<PublicKey>,
        seller: PublicKey,
        proceeds: u64,
        fee: u64,
    },

    // Treasury events (tag 30)
    FeesWithdrawn {
        owner: PublicKey,
        amount: u64,
    },

    // Rejection (tag 40)
    Rejected {
        caller: PublicKey,
        error: LedgerError,
    },
}

impl Write for Event {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::GameStarted {
                id,
                creator,
                max_bet,
                end_time,
            } => {
                10u8.write(writer);
                id.write(writer);
                creator.write(writer);
                max_bet.write(writer);
                end_time.write(writer);
            }
            Self::BetSubmitted {
                game_id,
                bettor,
                amount,
                bettor_total,
                total_pot,
            } => {
                11u8.write(writer);
                game_id.write(writer);
                bettor.write(writer);
                amount.write(writer);
                bettor_total.write(writer);
                total_pot.write(writer);
            }
            Self::GameResolved {
                game_id,
                winner,
                payout,
                fee,
            } => {
                12u8.write(writer);
                game_id.write(writer);
                winner.write(writer);
                payout.write(writer);
                fee.write(writer);
            }
            Self::AuctionStarted {
                id,
                seller,
                asset,
                min_bid,
                end_time,
            } => {
                20u8.write(writer);
                id.write(writer);
                seller.write(writer);
                asset.write(writer);
                min_bid.write(writer);
                end_time.write(writer);
            }
            Self::BidSubmitted {
                auction_id,
                bidder,
                amount,
                refunded,
                refund,
            } => {
                21u8.write(writer);
                auction_id.write(writer);
                bidder.write(writer);
                amount.write(writer);
                refunded.write(writer);
                refund.write(writer);
            }
            Self::AuctionSettled {
                auction_id,
                winner,
                seller,
                proceeds,
                fee,
            } => {
                22u8.write(writer);
                auction_id.write(writer);
                winner.write(writer);
                seller.write(writer);
                proceeds.write(writer);
                fee.write(writer);
            }
            Self::FeesWithdrawn { owner, amount } => {
                30u8.write(writer);
                owner.write(writer);
                amount.write(writer);
            }
            Self::Rejected { caller, error } => {
                40u8.write(writer);
                caller.write(writer);
                error.write(writer);
            }
        }
    }
}

impl Read for Event {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let event = match u8::read(reader)? {
            10 => Self::GameStarted {
                id: u64::read(reader)?,
                creator: PublicKey::read(reader)?,
                max_bet: u64::read(reader)?,
                end_time: u64::read(reader)?,
            },
            11 => Self::BetSubmitted {
                game_id: u64::read(reader)?,
                bettor: PublicKey::read(reader)?,
                amount: u64::read(reader)?,
                bettor_total: u64::read(reader)?,
                total_pot: u64::read(reader)?,
            },
            12 => Self::GameResolved {
                game_id: u64::read(reader)?,
                winner: Option::<PublicKey>::read(reader)?,
                payout: u64::read(reader)?,
                fee: u64::read(reader)?,
            },
            20 => Self::AuctionStarted {
                id: u64::read(reader)?,
                seller: PublicKey::read(reader)?,
                asset: AssetRef::read(reader)?,
                min_bid: u64::read(reader)?,
                end_time: u64::read(reader)?,
            },
            21 => Self::BidSubmitted {
                auction_id: u64::read(reader)?,
                bidder: PublicKey::read(reader)?,
                amount: u64::read(reader)?,
                refunded: Option::<PublicKey>::read(reader)?,
                refund: u64::read(reader)?,
            },
            22 => Self::AuctionSettled {
                auction_id: u64::read(reader)?,
                winner: Option::<PublicKey>::read(reader)?,
                seller: PublicKey::read(reader)?,
                proceeds: u64::read(reader)?,
                fee: u64::read(reader)?,
            },
            30 => Self::FeesWithdrawn {
                owner: PublicKey::read(reader)?,
                amount: u64::read(reader)?,
            },
            40 => Self::Rejected {
                caller: PublicKey::read(reader)?,
                error: LedgerError::read(reader)?,
            },

            i => return Err(Error::InvalidEnum(i)),
        };

        Ok(event)
    }
}

impl EncodeSize for Event {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::GameStarted { creator, .. } => 8 + creator.encode_size() + 8 + 8,
                Self::BetSubmitted { bettor, .. } => 8 + bettor.encode_size() + 8 + 8 + 8,
                Self::GameResolved { winner, .. } => 8 + winner.encode_size() + 8 + 8,
                Self::AuctionStarted { seller, asset, .. } => {
                    8 + seller.encode_size() + asset.encode_size() + 8 + 8
                }
                Self::BidSubmitted {
                    bidder, refunded, ..
                } => 8 + bidder.encode_size() + 8 + refunded.encode_size() + 8,
                Self::AuctionSettled { winner, seller, .. } => {
                    8 + winner.encode_size() + seller.encode_size() + 8 + 8
                }
                Self::FeesWithdrawn { owner, .. } => owner.encode_size() + 8,
                Self::Rejected { caller, error } => caller.encode_size() + error.encode_size(),
            }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Event(Event),
    Transaction(Transaction),
}

impl Write for Output {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Event(event) => {
                0u8.write(writer);
                event.write(writer);
            }
            Self::Transaction(transaction) => {
                1u8.write(writer);
                transaction.write(writer);
            }
        }
    }
}

impl Read for Output {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let kind = u8::read(reader)?;
        match kind {
            0 => Ok(Self::Event(Event::read(reader)?)),
            1 => Ok(Self::Transaction(Transaction::read(reader)?)),
            _ => Err(Error::InvalidEnum(kind)),
        }
    }
}

impl EncodeSize for Output {
    fn encode_size(&self) -> usize {
        1 + match self {
            Self::Event(event) => event.encode_size(),
            Self::Transaction(transaction) => transaction.encode_size(),
        }
    }
}
