use commonware_codec::DecodeExt;
use commonware_cryptography::ed25519::PublicKey;
use commonware_utils::from_hex_formatted;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ledger::{
    DEFAULT_HOUSE_FEE_BPS, DEFAULT_MAX_AUCTION_LENGTH, DEFAULT_MAX_GAME_LENGTH, MAX_HOUSE_FEE_BPS,
};

/// Operator configuration, as read from disk.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Config {
    /// Hex-encoded ed25519 public key allowed to withdraw fees.
    #[serde(default)]
    pub owner: String,
    #[serde(default = "default_house_fee_bps")]
    pub house_fee_bps: u16,
    #[serde(default = "default_max_game_length")]
    pub max_game_length: u64,
    #[serde(default = "default_max_auction_length")]
    pub max_auction_length: u64,
    /// Mixed into every game's draw seed.
    #[serde(default)]
    pub seed: u64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be hex: {value}")]
    InvalidHex { field: &'static str, value: String },
    #[error("{field} is invalid: {value}")]
    InvalidDecode {
        field: &'static str,
        value: String,
        #[source]
        source: commonware_codec::Error,
    },
    #[error("house_fee_bps must be <= {max} (got {value})")]
    FeeTooHigh { value: u16, max: u16 },
    #[error("{field} must be > 0")]
    InvalidNonZero { field: &'static str },
}

/// Configuration that passed validation. Handed to every [crate::execution]
/// consumer; never re-checked per transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub owner: PublicKey,
    pub house_fee_bps: u16,
    pub max_game_length: u64,
    pub max_auction_length: u64,
    pub seed: u64,
}

fn default_house_fee_bps() -> u16 {
    DEFAULT_HOUSE_FEE_BPS
}

fn default_max_game_length() -> u64 {
    DEFAULT_MAX_GAME_LENGTH
}

fn default_max_auction_length() -> u64 {
    DEFAULT_MAX_AUCTION_LENGTH
}

pub fn parse_public_key(field: &'static str, value: &str) -> Result<PublicKey, ConfigError> {
    let bytes = from_hex_formatted(value).ok_or(ConfigError::InvalidHex {
        field,
        value: value.to_string(),
    })?;
    PublicKey::decode(bytes.as_ref()).map_err(|source| ConfigError::InvalidDecode {
        field,
        value: value.to_string(),
        source,
    })
}

impl Config {
    pub fn validate(self) -> Result<Settings, ConfigError> {
        let owner = parse_public_key("owner", &self.owner)?;
        if self.house_fee_bps > MAX_HOUSE_FEE_BPS {
            return Err(ConfigError::FeeTooHigh {
                value: self.house_fee_bps,
                max: MAX_HOUSE_FEE_BPS,
            });
        }
        if self.max_game_length == 0 {
            return Err(ConfigError::InvalidNonZero {
                field: "max_game_length",
            });
        }
        if self.max_auction_length == 0 {
            return Err(ConfigError::InvalidNonZero {
                field: "max_auction_length",
            });
        }

        Ok(Settings {
            owner,
            house_fee_bps: self.house_fee_bps,
            max_game_length: self.max_game_length,
            max_auction_length: self.max_auction_length,
            seed: self.seed,
        })
    }
}
