#[macro_use]
extern crate serde;

mod address;
mod context;
pub mod ecies;
mod error;
mod event;
mod ledger;
mod proposal;
mod salt;
mod serde_hex;
mod store;
mod tally;
mod transaction;
mod util;
mod vote;

pub use address::*;
pub use context::*;
pub use error::*;
pub use event::*;
pub use ledger::*;
pub use proposal::*;
pub use salt::*;
pub use serde_hex::*;
pub use store::*;
pub use tally::*;
pub use transaction::*;
pub use util::*;
pub use vote::*;

#[cfg(test)]
mod tests;
