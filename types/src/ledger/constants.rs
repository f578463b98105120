/// Denominator for every basis-point quantity.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Upper bound for the house fee (100%).
pub const MAX_HOUSE_FEE_BPS: u16 = 10_000;

/// House fee applied when the operator does not configure one (5%).
pub const DEFAULT_HOUSE_FEE_BPS: u16 = 500;

/// Longest LuckyChance game, in seconds, when not configured.
pub const DEFAULT_MAX_GAME_LENGTH: u64 = 100;

/// Longest auction, in seconds, when not configured (7 days).
pub const DEFAULT_MAX_AUCTION_LENGTH: u64 = 60 * 60 * 24 * 7;

/// Maximum length of an asset collection name.
pub const MAX_COLLECTION_LENGTH: usize = 64;
