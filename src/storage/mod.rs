//! In-memory ledger state
//!
//! Immutable-by-convention unspent output snapshots and the shared pool of
//! transactions waiting to be included in a block.

pub mod transaction_pool;
pub mod utxo_pool;

pub use transaction_pool::TransactionPool;
pub use utxo_pool::{UTXOPool, UTXO};
