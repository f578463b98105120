mod asset;
mod auction;
mod codec;
mod constants;
mod error;
mod escrow;
mod game;
mod phase;
mod treasury;

pub use asset::*;
pub use auction::*;
pub use codec::{read_string, string_encode_size, write_string};
pub use constants::*;
pub use error::*;
pub use escrow::*;
pub use game::*;
pub use phase::*;
pub use treasury::*;
