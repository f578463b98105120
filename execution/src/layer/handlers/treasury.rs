use super::super::*;
use tracing::info;

impl<'a, S: State, R: RandomnessSource> Layer<'a, S, R> {
    // === Treasury Handlers ===

    pub(in crate::layer) async fn handle_withdraw_fees(
        &mut self,
        public: &PublicKey,
    ) -> Result<Vec<Event>, LedgerError> {
        let mut treasury = self.get_or_init_treasury().await;
        if &treasury.owner != public {
            return Err(LedgerError::Unauthorized);
        }
        if treasury.accrued == 0 {
            return Err(LedgerError::ZeroValue);
        }

        let amount = treasury.accrued;
        treasury.accrued = 0;
        treasury.total_withdrawn = treasury.total_withdrawn.saturating_add(amount);
        self.insert(Key::Treasury, Value::Treasury(treasury));

        self.credit(public, amount).await?;

        info!(owner = ?public, amount, "withdrew fees");
        Ok(vec![Event::FeesWithdrawn {
            owner: public.clone(),
            amount,
        }])
    }
}
