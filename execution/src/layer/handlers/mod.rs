mod assets;
mod auction;
mod escrow;
mod lucky_chance;
mod treasury;
