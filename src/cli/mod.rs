//! Command-line interface
//!
//! Argument parsing for the `architect-ledger` binary and the local chain
//! simulation it runs.

pub mod commands;
pub mod simulate;

pub use commands::{Command, Opt};
pub use simulate::{run_simulation, SimulationReport};
