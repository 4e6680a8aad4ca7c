//! # Architect Ledger - fork-aware UTXO ledger core
//!
//! This is the part of my chain that decides which blocks and transactions are
//! valid. It keeps every recent fork alive, each with its own snapshot of unspent
//! outputs, so a competing branch can take over without replaying history.
//!
//! ## How I Organized My Code
//! - `core/`: blocks, transactions, validation, block application, the fork tracker
//! - `storage/`: unspent output snapshots and the pending transaction pool
//! - `wallet/`: ECDSA P-256 keys and input signing
//! - `config/`: cutoff age and log level
//! - `utils/`: hashing, signatures, bincode helpers
//! - `cli/`: the `simulate` and `config` commands
//!
//! ## Rules I Need to Remember
//! - A block is applied all or nothing; mempool batches are best effort.
//! - The coinbase of a block is credited before its transactions run.
//! - Snapshots are never mutated once a node holds them.
//! - Nodes more than `cut_off_age` heights behind the deepest block are dropped,
//!   and blocks built on them are refused.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod storage;
pub mod utils;
pub mod wallet;

// Re-export commonly used types for convenience
pub use cli::{run_simulation, Command, Opt, SimulationReport};
pub use config::{Config, LedgerSettings, DEFAULT_CUT_OFF_AGE, GLOBAL_CONFIG};
pub use core::{
    apply_block, check_transaction, is_valid_tx, AppliedBlock, Block, BlockChain, BlockHandler,
    BlockNode, SharedBlockChain, TXInput, TXOutput, Transaction, TxHandler, COINBASE_REWARD,
};
pub use error::{BlockRejection, LedgerError, Result, TxRejection};
pub use storage::{TransactionPool, UTXOPool, UTXO};
pub use utils::{
    ecdsa_p256_sha256_sign_digest, ecdsa_p256_sha256_sign_verify, new_key_pair, sha256_digest,
    EcdsaP256Verifier, SignatureVerifier,
};
pub use wallet::Wallet;
