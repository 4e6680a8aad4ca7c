//! Core ledger functionality
//!
//! Blocks and transactions, validation against unspent output snapshots, strict
//! block application, and the fork tracker that keeps every recent fork alive.

pub mod block;
pub mod block_applier;
pub mod block_handler;
pub mod blockchain;
pub mod monetary;
pub mod shared;
pub mod transaction;
pub mod tx_handler;

pub use block::Block;
pub use block_applier::{apply_block, AppliedBlock};
pub use block_handler::BlockHandler;
pub use blockchain::{BlockChain, BlockNode};
pub use monetary::{checked_sum, COINBASE_REWARD};
pub use shared::SharedBlockChain;
pub use transaction::{TXInput, TXOutput, Transaction};
pub use tx_handler::{check_transaction, is_valid_tx, TxHandler};
