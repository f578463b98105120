use super::super::*;
use crate::{query, randomness::game_seed};
use pennbid_types::ledger::{house_fee, Game, Phase};
use tracing::{info, warn};

/// Bettor whose cumulative range contains `ticket`.
///
/// Ranges are laid end to end in bettor order, each as wide as that bettor's
/// deposit, so the chance of winning is proportional to share of the pot.
fn pick_weighted(entries: &[(PublicKey, u64)], ticket: u64) -> Option<&PublicKey> {
    let mut cumulative: u64 = 0;
    for (bettor, amount) in entries {
        cumulative = cumulative.saturating_add(*amount);
        if ticket < cumulative {
            return Some(bettor);
        }
    }
    None
}

impl<'a, S: State, R: RandomnessSource> Layer<'a, S, R> {
    async fn load_game(&self, game_id: u64) -> Result<Game, LedgerError> {
        if game_id == 0 || game_id > query::max_game_id(self).await {
            return Err(LedgerError::NotFound);
        }
        match query::game_info(self, game_id).await {
            Some(game) => Ok(game),
            None => {
                warn!(game_id, "allocated game missing from store");
                Err(LedgerError::NotFound)
            }
        }
    }

    // === LuckyChance Handlers ===

    pub(in crate::layer) async fn handle_start_game(
        &mut self,
        public: &PublicKey,
        game_length: u64,
        max_bet: u64,
    ) -> Result<Vec<Event>, LedgerError> {
        if game_length == 0 || game_length > self.settings.max_game_length || max_bet == 0 {
            return Err(LedgerError::InvalidParameter);
        }

        let now = self.now();
        let end_time = now
            .checked_add(game_length)
            .ok_or(LedgerError::Overflow)?;
        let id = query::max_game_id(&*self)
            .await
            .checked_add(1)
            .ok_or(LedgerError::Overflow)?;
        let seed = game_seed(self.settings.seed, id, &self.block);

        let game = Game::new(id, public.clone(), max_bet, game_length, now, seed);
        self.insert(Key::Game(id), Value::Game(game));
        self.insert(Key::MaxGameId, Value::Counter(id));

        Ok(vec![Event::GameStarted {
            id,
            creator: public.clone(),
            max_bet,
            end_time,
        }])
    }

    pub(in crate::layer) async fn handle_submit_bet(
        &mut self,
        public: &PublicKey,
        game_id: u64,
        amount: u64,
    ) -> Result<Vec<Event>, LedgerError> {
        let mut game = self.load_game(game_id).await?;
        if amount == 0 {
            return Err(LedgerError::ZeroValue);
        }
        if game.phase(self.now()) != Phase::Open {
            return Err(LedgerError::WindowClosed);
        }
        // The cap covers the whole pool, not each bettor
        let total_pot = game
            .total_pot
            .checked_add(amount)
            .filter(|pot| *pot <= game.max_bet)
            .ok_or(LedgerError::CapExceeded)?;

        let prior = query::bettor_amount(&*self, game_id, public).await;
        if prior == 0 {
            self.insert(
                Key::GameBettor(game_id, game.bettor_count),
                Value::GameBettor(public.clone()),
            );
            game.bettor_count += 1;
        }
        let bettor_total = prior.checked_add(amount).ok_or(LedgerError::Overflow)?;
        self.insert(
            Key::GameBet(game_id, public.clone()),
            Value::GameBet(bettor_total),
        );
        game.total_pot = total_pot;
        self.insert(Key::Game(game_id), Value::Game(game));

        self.escrow_deposit(public, amount).await?;

        Ok(vec![Event::BetSubmitted {
            game_id,
            bettor: public.clone(),
            amount,
            bettor_total,
            total_pot,
        }])
    }

    pub(in crate::layer) async fn handle_resolve_game(
        &mut self,
        _public: &PublicKey,
        game_id: u64,
    ) -> Result<Vec<Event>, LedgerError> {
        let mut game = self.load_game(game_id).await?;
        match game.phase(self.now()) {
            Phase::Open => return Err(LedgerError::WindowOpen),
            Phase::Settled => return Err(LedgerError::AlreadySettled),
            Phase::Expired => {}
        }

        game.resolved = true;
        if game.total_pot == 0 {
            self.insert(Key::Game(game_id), Value::Game(game));
            info!(game_id, "resolved game without bettors");
            return Ok(vec![Event::GameResolved {
                game_id,
                winner: None,
                payout: 0,
                fee: 0,
            }]);
        }

        let entries = query::bettors(&*self, game_id).await;
        let ticket = self.randomness.draw(&game, &self.block, game.total_pot);
        let Some(winner) = pick_weighted(&entries, ticket).cloned() else {
            warn!(
                game_id,
                ticket,
                total_pot = game.total_pot,
                "ticket outside bettor ranges"
            );
            return Err(LedgerError::Overflow);
        };
        let fee = house_fee(game.total_pot, self.settings.house_fee_bps);
        let payout = game
            .total_pot
            .checked_sub(fee)
            .ok_or(LedgerError::Overflow)?;

        game.winner = Some(winner.clone());
        self.insert(Key::Game(game_id), Value::Game(game));

        self.escrow_release(&winner, payout).await?;
        self.escrow_collect_fee(fee).await?;

        info!(game_id, ?winner, ticket, payout, fee, "resolved game");
        Ok(vec![Event::GameResolved {
            game_id,
            winner: Some(winner),
            payout,
            fee,
        }])
    }
}
