//! Configuration management
//!
//! Settings for the ledger core: the pruning window (cutoff age) and the log
//! level used by the binary. Values come from defaults, the environment, or a
//! TOML file.

pub mod settings;

pub use settings::{Config, LedgerSettings, DEFAULT_CUT_OFF_AGE, GLOBAL_CONFIG};
