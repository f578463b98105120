use super::super::*;
use crate::query;
use pennbid_types::ledger::{AssetRef, Custodian};
use tracing::warn;

impl<'a, S: State, R: RandomnessSource> Layer<'a, S, R> {
    /// Takes custody of `asset` for auction `auction_id`.
    ///
    /// Fails with `NotFound` for an unregistered asset and `Unauthorized`
    /// unless `from` currently holds it.
    pub(in crate::layer) async fn transfer_asset_into(
        &mut self,
        auction_id: u64,
        from: &PublicKey,
        asset: &AssetRef,
    ) -> Result<(), LedgerError> {
        match query::asset_owner(&*self, asset).await {
            None => Err(LedgerError::NotFound),
            Some(Custodian::Account(owner)) if &owner == from => {
                self.insert(
                    Key::AssetOwner(asset.clone()),
                    Value::AssetOwner(Custodian::Auction(auction_id)),
                );
                Ok(())
            }
            Some(_) => Err(LedgerError::Unauthorized),
        }
    }

    /// Releases `asset` from auction `auction_id` to `to`.
    pub(in crate::layer) async fn transfer_asset_out(
        &mut self,
        auction_id: u64,
        to: &PublicKey,
        asset: &AssetRef,
    ) -> Result<(), LedgerError> {
        match query::asset_owner(&*self, asset).await {
            Some(Custodian::Auction(id)) if id == auction_id => {
                self.insert(
                    Key::AssetOwner(asset.clone()),
                    Value::AssetOwner(Custodian::Account(to.clone())),
                );
                Ok(())
            }
            custodian => {
                warn!(auction_id, %asset, ?custodian, "asset not held by auction");
                Err(LedgerError::Unauthorized)
            }
        }
    }
}
