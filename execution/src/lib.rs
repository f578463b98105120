#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

pub mod genesis;
pub mod query;
pub mod randomness;

mod layer;

mod state;

pub use genesis::{apply_genesis, Genesis};
pub use layer::Layer;
pub use randomness::{RandomnessSource, RngDraw, SeedDraw};
pub use state::{nonce, Memory, Noncer, PrepareError, State, Status};
