use crate::randomness::RandomnessSource;
use commonware_cryptography::{
    ed25519::{PrivateKey, PublicKey},
    sha256::Sha256,
    Hasher, PrivateKeyExt, Signer,
};
use pennbid_types::{config::Settings, ledger::Game, BlockInfo};
use rand::{rngs::StdRng, SeedableRng};

/// Creates an account keypair for Ed25519 signatures used by users
pub fn create_account_keypair(seed: u64) -> (PrivateKey, PublicKey) {
    let mut rng = StdRng::seed_from_u64(seed);
    let private = PrivateKey::from_rng(&mut rng);
    let public = private.public_key();
    (private, public)
}

/// Creates block context at `height` with clock reading `timestamp`
pub fn create_block(height: u64, timestamp: u64) -> BlockInfo {
    let mut hasher = Sha256::new();
    hasher.update(&height.to_be_bytes());
    hasher.update(&timestamp.to_be_bytes());
    BlockInfo::new(height, timestamp, hasher.finalize())
}

/// Operator settings with `owner` and a 5% house fee
pub fn create_settings(owner: PublicKey) -> Settings {
    Settings {
        owner,
        house_fee_bps: 500,
        max_game_length: 100,
        max_auction_length: 60 * 60 * 24 * 7,
        seed: 1,
    }
}

/// Draw that always returns the same ticket (clamped into range)
pub struct FixedDraw(pub u64);

impl RandomnessSource for FixedDraw {
    fn draw(&mut self, _game: &Game, _block: &BlockInfo, bound: u64) -> u64 {
        self.0.min(bound - 1)
    }
}
