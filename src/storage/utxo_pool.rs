use crate::core::{TXOutput, Transaction};
use crate::error::{LedgerError, Result};
use data_encoding::HEXLOWER;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to one output: (id of the creating transaction, output index)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UTXO {
    tx_hash: Vec<u8>,
    index: usize,
}

impl UTXO {
    pub fn new(tx_hash: &[u8], index: usize) -> UTXO {
        UTXO {
            tx_hash: tx_hash.to_vec(),
            index,
        }
    }

    pub fn get_tx_hash(&self) -> &[u8] {
        self.tx_hash.as_slice()
    }

    pub fn get_index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for UTXO {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", HEXLOWER.encode(&self.tx_hash), self.index)
    }
}

/// Snapshot of unspent outputs as of one block.
///
/// Backed by a persistent hash map: `clone` shares structure with the original and
/// later edits on either side copy only the touched paths. Deriving a child
/// snapshot from a parent therefore costs O(changes), and a published snapshot can
/// never be altered through another handle.
#[derive(Debug, Clone, Default)]
pub struct UTXOPool {
    utxos: im::HashMap<UTXO, TXOutput>,
}

impl UTXOPool {
    pub fn new() -> UTXOPool {
        UTXOPool::default()
    }

    /// Seeds a pool with every output of `tx`, e.g. a genesis coinbase
    pub fn from_transaction_outputs(tx: &Transaction) -> Result<UTXOPool> {
        let mut pool = UTXOPool::new();
        pool.add_transaction_outputs(tx)?;
        Ok(pool)
    }

    pub fn contains_utxo(&self, utxo: &UTXO) -> bool {
        self.utxos.contains_key(utxo)
    }

    pub fn get_tx_output(&self, utxo: &UTXO) -> Option<&TXOutput> {
        self.utxos.get(utxo)
    }

    /// Fails without touching the pool if `utxo` is already unspent
    pub fn add_utxo(&mut self, utxo: UTXO, output: TXOutput) -> Result<()> {
        if self.utxos.contains_key(&utxo) {
            return Err(LedgerError::DuplicateOutput(utxo.to_string()));
        }
        self.utxos.insert(utxo, output);
        Ok(())
    }

    /// Adds every output of `tx`, all or nothing
    pub fn add_transaction_outputs(&mut self, tx: &Transaction) -> Result<()> {
        if let Some(index) = self.first_existing_output(tx) {
            return Err(LedgerError::DuplicateOutput(
                UTXO::new(tx.get_id(), index).to_string(),
            ));
        }
        for (index, output) in tx.get_vout().iter().enumerate() {
            self.utxos.insert(UTXO::new(tx.get_id(), index), output.clone());
        }
        Ok(())
    }

    /// Index of the first output of `tx` that is already in the pool
    pub fn first_existing_output(&self, tx: &Transaction) -> Option<usize> {
        (0..tx.get_vout().len()).find(|&index| self.contains_utxo(&UTXO::new(tx.get_id(), index)))
    }

    /// Removing an absent reference is a no-op
    pub fn remove_utxo(&mut self, utxo: &UTXO) -> Option<TXOutput> {
        self.utxos.remove(utxo)
    }

    /// Total value held in the pool, `None` on overflow
    pub fn total_value(&self) -> Option<i64> {
        crate::core::monetary::checked_sum(self.utxos.values().map(TXOutput::get_value))
    }

    /// Outputs spendable by `pub_key`
    pub fn find_utxo(&self, pub_key: &[u8]) -> Vec<(UTXO, TXOutput)> {
        self.utxos
            .iter()
            .filter(|(_, output)| output.is_locked_with_key(pub_key))
            .map(|(utxo, output)| (utxo.clone(), output.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }
}
