//! Error handling for the ledger
//!
//! Infrastructure failures (crypto, configuration, serialization) are reported
//! through [`LedgerError`]. Rejected blocks and transactions are routine outcomes,
//! so they get their own enumerations instead of being folded into the error type.

use std::fmt;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Error types for infrastructure operations
#[derive(Debug, Clone)]
pub enum LedgerError {
    /// Cryptographic operation errors
    Crypto(String),
    /// Configuration errors
    Config(String),
    /// Serialization/deserialization errors
    Serialization(String),
    /// File I/O errors
    Io(String),
    /// Malformed transaction construction
    Transaction(String),
    /// An output reference was added to a pool that already holds it
    DuplicateOutput(String),
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::Crypto(msg) => write!(f, "Cryptographic error: {msg}"),
            LedgerError::Config(msg) => write!(f, "Configuration error: {msg}"),
            LedgerError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            LedgerError::Io(msg) => write!(f, "I/O error: {msg}"),
            LedgerError::Transaction(msg) => write!(f, "Transaction error: {msg}"),
            LedgerError::DuplicateOutput(utxo) => write!(f, "Output already unspent: {utxo}"),
        }
    }
}

impl std::error::Error for LedgerError {}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        LedgerError::Io(err.to_string())
    }
}

impl From<bincode::error::EncodeError> for LedgerError {
    fn from(err: bincode::error::EncodeError) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}

impl From<bincode::error::DecodeError> for LedgerError {
    fn from(err: bincode::error::DecodeError) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for LedgerError {
    fn from(err: toml::de::Error) -> Self {
        LedgerError::Config(err.to_string())
    }
}

/// Why a single transaction was not accepted into a snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxRejection {
    /// Input `index` references an output that is not unspent
    MissingInput { index: usize },
    /// Input `index` references the same output as an earlier input
    DuplicateInput { index: usize },
    /// The signature on input `index` does not verify against the owner key
    InvalidSignature { index: usize },
    /// Output `index` carries a negative value
    NegativeOutput { index: usize },
    /// Outputs are worth more than the inputs they spend
    InsufficientInputValue { input: i64, output: i64 },
    /// Summing input or output values overflowed
    ValueOverflow,
    /// Input `index` was already consumed earlier in the same batch
    ConflictsWithBatch { index: usize },
    /// Output `index` would overwrite an output that is still unspent
    OutputAlreadyExists { index: usize },
}

impl fmt::Display for TxRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxRejection::MissingInput { index } => {
                write!(f, "input {index} spends an unknown or spent output")
            }
            TxRejection::DuplicateInput { index } => {
                write!(f, "input {index} claims an output already claimed by this transaction")
            }
            TxRejection::InvalidSignature { index } => {
                write!(f, "signature on input {index} does not verify")
            }
            TxRejection::NegativeOutput { index } => write!(f, "output {index} is negative"),
            TxRejection::InsufficientInputValue { input, output } => {
                write!(f, "outputs ({output}) exceed inputs ({input})")
            }
            TxRejection::ValueOverflow => write!(f, "value sum overflow"),
            TxRejection::ConflictsWithBatch { index } => {
                write!(f, "input {index} already consumed in this batch")
            }
            TxRejection::OutputAlreadyExists { index } => {
                write!(f, "output {index} already exists in the pool")
            }
        }
    }
}

impl std::error::Error for TxRejection {}

/// Why a candidate block was not added to the fork tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockRejection {
    /// The parent block is not retained (never seen, or pruned)
    UnknownParent,
    /// A transaction in the block failed validation or conflicted with a sibling
    InvalidTransactionSet { index: usize, reason: TxRejection },
    /// The coinbase outputs collide with outputs that are still unspent
    InvalidCoinbase,
    /// A parentless block was submitted after the genesis block
    MalformedGenesis,
    /// A block with the same hash is already retained
    DuplicateBlock,
}

impl fmt::Display for BlockRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockRejection::UnknownParent => write!(f, "parent block is not retained"),
            BlockRejection::InvalidTransactionSet { index, reason } => {
                write!(f, "transaction {index} rejected: {reason}")
            }
            BlockRejection::InvalidCoinbase => write!(f, "coinbase outputs already exist"),
            BlockRejection::MalformedGenesis => write!(f, "a genesis block already exists"),
            BlockRejection::DuplicateBlock => write!(f, "block already known"),
        }
    }
}

impl std::error::Error for BlockRejection {}
