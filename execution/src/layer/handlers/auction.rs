use super::super::*;
use crate::query;
use pennbid_types::ledger::{house_fee, AssetRef, Auction, Phase, MAX_COLLECTION_LENGTH};
use tracing::{info, warn};

impl<'a, S: State, R: RandomnessSource> Layer<'a, S, R> {
    async fn load_auction(&self, auction_id: u64) -> Result<Auction, LedgerError> {
        if auction_id == 0 || auction_id > query::max_auction_id(self).await {
            return Err(LedgerError::NotFound);
        }
        match query::auction_info(self, auction_id).await {
            Some(auction) => Ok(auction),
            None => {
                warn!(auction_id, "allocated auction missing from store");
                Err(LedgerError::NotFound)
            }
        }
    }

    // === Auction Handlers ===

    pub(in crate::layer) async fn handle_start_auction(
        &mut self,
        public: &PublicKey,
        asset: &AssetRef,
        auction_length: u64,
        min_bid: u64,
    ) -> Result<Vec<Event>, LedgerError> {
        if auction_length > self.settings.max_auction_length
            || asset.collection.len() > MAX_COLLECTION_LENGTH
        {
            return Err(LedgerError::InvalidParameter);
        }

        let now = self.now();
        let end_time = now
            .checked_add(auction_length)
            .ok_or(LedgerError::Overflow)?;
        let id = query::max_auction_id(&*self)
            .await
            .checked_add(1)
            .ok_or(LedgerError::Overflow)?;
        let auction = Auction::new(
            id,
            asset.clone(),
            public.clone(),
            auction_length,
            now,
            min_bid,
        );
        self.insert(Key::Auction(id), Value::Auction(auction));
        self.insert(Key::MaxAuctionId, Value::Counter(id));

        self.transfer_asset_into(id, public, asset).await?;

        Ok(vec![Event::AuctionStarted {
            id,
            seller: public.clone(),
            asset: asset.clone(),
            min_bid,
            end_time,
        }])
    }

    pub(in crate::layer) async fn handle_submit_bid(
        &mut self,
        public: &PublicKey,
        auction_id: u64,
        amount: u64,
    ) -> Result<Vec<Event>, LedgerError> {
        let mut auction = self.load_auction(auction_id).await?;
        if auction.phase(self.now()) != Phase::Open {
            return Err(LedgerError::WindowClosed);
        }
        if amount == 0 {
            return Err(LedgerError::ZeroValue);
        }
        if !auction.accepts(amount) {
            return Err(LedgerError::BidTooLow);
        }

        let refund = auction.highest_bid;
        let refunded = auction.highest_bidder.replace(public.clone());
        auction.highest_bid = amount;
        self.insert(Key::Auction(auction_id), Value::Auction(auction));

        self.escrow_deposit(public, amount).await?;
        if let Some(previous) = &refunded {
            self.escrow_release(previous, refund).await?;
        }

        Ok(vec![Event::BidSubmitted {
            auction_id,
            bidder: public.clone(),
            amount,
            refunded,
            refund,
        }])
    }

    pub(in crate::layer) async fn handle_settle_auction(
        &mut self,
        _public: &PublicKey,
        auction_id: u64,
    ) -> Result<Vec<Event>, LedgerError> {
        let mut auction = self.load_auction(auction_id).await?;
        match auction.phase(self.now()) {
            Phase::Open => return Err(LedgerError::WindowOpen),
            Phase::Settled => return Err(LedgerError::AlreadySettled),
            Phase::Expired => {}
        }

        auction.settled = true;
        self.insert(Key::Auction(auction_id), Value::Auction(auction.clone()));

        let seller = auction.original_owner;
        let (winner, proceeds, fee) = match auction.highest_bidder {
            Some(winner) => {
                let fee = house_fee(auction.highest_bid, self.settings.house_fee_bps);
                let proceeds = auction
                    .highest_bid
                    .checked_sub(fee)
                    .ok_or(LedgerError::Overflow)?;
                self.transfer_asset_out(auction_id, &winner, &auction.asset)
                    .await?;
                self.escrow_release(&seller, proceeds).await?;
                self.escrow_collect_fee(fee).await?;
                (Some(winner), proceeds, fee)
            }
            None => {
                self.transfer_asset_out(auction_id, &seller, &auction.asset)
                    .await?;
                (None, 0, 0)
            }
        };

        info!(
            auction_id,
            asset = %auction.asset,
            ?winner,
            proceeds,
            fee,
            "settled auction"
        );
        Ok(vec![Event::AuctionSettled {
            auction_id,
            winner,
            seller,
            proceeds,
            fee,
        }])
    }
}
