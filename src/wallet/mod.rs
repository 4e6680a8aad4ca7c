//! Key management
//!
//! Wallets own ECDSA P-256 key pairs and sign transaction inputs.

#[allow(clippy::module_inception)]
pub mod wallet;

pub use wallet::Wallet;
