pub mod config;
pub mod execution;
pub mod ledger;

pub use execution::{BlockInfo, NAMESPACE};
