use super::super::*;
use crate::query;
use pennbid_types::ledger::Treasury;
use tracing::warn;

impl<'a, S: State, R: RandomnessSource> Layer<'a, S, R> {
    // === Balances ===

    pub(in crate::layer) async fn credit(
        &mut self,
        public: &PublicKey,
        amount: u64,
    ) -> Result<(), LedgerError> {
        if amount == 0 {
            return Ok(());
        }
        let balance = query::balance(&*self, public).await;
        let balance = balance.checked_add(amount).ok_or(LedgerError::Overflow)?;
        self.insert(Key::Balance(public.clone()), Value::Balance(balance));
        Ok(())
    }

    pub(in crate::layer) async fn debit(
        &mut self,
        public: &PublicKey,
        amount: u64,
    ) -> Result<(), LedgerError> {
        let balance = query::balance(&*self, public).await;
        let remaining = balance
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientFunds)?;
        self.insert(Key::Balance(public.clone()), Value::Balance(remaining));
        Ok(())
    }

    // === Value escrow ===

    /// Moves `amount` from `from` into escrow.
    pub(in crate::layer) async fn escrow_deposit(
        &mut self,
        from: &PublicKey,
        amount: u64,
    ) -> Result<(), LedgerError> {
        self.debit(from, amount).await?;

        let mut escrow = query::escrow(&*self).await;
        escrow.held = escrow
            .held
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        escrow.total_deposited = escrow.total_deposited.saturating_add(amount);
        self.insert(Key::Escrow, Value::Escrow(escrow));
        Ok(())
    }

    async fn escrow_withdraw(&mut self, amount: u64) -> Result<(), LedgerError> {
        let mut escrow = query::escrow(&*self).await;
        let Some(held) = escrow.held.checked_sub(amount) else {
            warn!(held = escrow.held, amount, "escrow short of settlement amount");
            return Err(LedgerError::Overflow);
        };
        escrow.held = held;
        escrow.total_released = escrow.total_released.saturating_add(amount);
        self.insert(Key::Escrow, Value::Escrow(escrow));
        Ok(())
    }

    /// Pays `amount` out of escrow to `to`.
    pub(in crate::layer) async fn escrow_release(
        &mut self,
        to: &PublicKey,
        amount: u64,
    ) -> Result<(), LedgerError> {
        if amount == 0 {
            return Ok(());
        }
        self.escrow_withdraw(amount).await?;
        self.credit(to, amount).await
    }

    /// Routes `amount` out of escrow into the treasury.
    pub(in crate::layer) async fn escrow_collect_fee(
        &mut self,
        amount: u64,
    ) -> Result<(), LedgerError> {
        if amount == 0 {
            return Ok(());
        }
        self.escrow_withdraw(amount).await?;

        let mut treasury = self.get_or_init_treasury().await;
        treasury.accrued = treasury
            .accrued
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        treasury.total_collected = treasury.total_collected.saturating_add(amount);
        self.insert(Key::Treasury, Value::Treasury(treasury));
        Ok(())
    }

    pub(in crate::layer) async fn get_or_init_treasury(&self) -> Treasury {
        match query::treasury(self).await {
            Some(treasury) => treasury,
            None => Treasury::new(self.settings.owner.clone()),
        }
    }
}
