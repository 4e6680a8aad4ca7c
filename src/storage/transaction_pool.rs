use crate::core::Transaction;
use data_encoding::HEXLOWER;
use std::collections::HashMap;
use std::sync::RwLock;

/// Unconfirmed transactions waiting for a miner. No validation happens here.
///
/// ( K -> txid_hex, V => Transaction )
pub struct TransactionPool {
    inner: RwLock<HashMap<String, Transaction>>,
}

impl Default for TransactionPool {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionPool {
    pub fn new() -> TransactionPool {
        TransactionPool {
            inner: RwLock::new(HashMap::new()),
        }
    }

    pub fn add_transaction(&self, tx: Transaction) {
        match self.inner.write() {
            Ok(mut pool) => {
                pool.insert(HEXLOWER.encode(tx.get_id()), tx);
            }
            Err(_) => {
                log::error!("Failed to acquire write lock on transaction pool");
            }
        }
    }

    pub fn get_transaction(&self, txid: &[u8]) -> Option<Transaction> {
        match self.inner.read() {
            Ok(pool) => pool.get(&HEXLOWER.encode(txid)).cloned(),
            Err(_) => {
                log::error!("Failed to acquire read lock on transaction pool");
                None
            }
        }
    }

    pub fn contains(&self, txid: &[u8]) -> bool {
        match self.inner.read() {
            Ok(pool) => pool.contains_key(&HEXLOWER.encode(txid)),
            Err(_) => {
                log::error!("Failed to acquire read lock on transaction pool");
                false
            }
        }
    }

    pub fn remove_transaction(&self, txid: &[u8]) {
        match self.inner.write() {
            Ok(mut pool) => {
                pool.remove(&HEXLOWER.encode(txid));
            }
            Err(_) => {
                log::error!("Failed to acquire write lock on transaction pool");
            }
        }
    }

    /// Current contents, in no particular order
    pub fn get_transactions(&self) -> Vec<Transaction> {
        match self.inner.read() {
            Ok(pool) => pool.values().cloned().collect(),
            Err(_) => {
                log::error!("Failed to acquire read lock on transaction pool");
                Vec::new()
            }
        }
    }

    /// Takes every pending transaction, leaving the pool empty
    pub fn drain(&self) -> Vec<Transaction> {
        match self.inner.write() {
            Ok(mut pool) => pool.drain().map(|(_, tx)| tx).collect(),
            Err(_) => {
                log::error!("Failed to acquire write lock on transaction pool");
                Vec::new()
            }
        }
    }

    pub fn clear(&self) {
        match self.inner.write() {
            Ok(mut pool) => {
                pool.clear();
            }
            Err(_) => {
                log::error!("Failed to acquire write lock on transaction pool");
            }
        }
    }

    pub fn len(&self) -> usize {
        match self.inner.read() {
            Ok(pool) => pool.len(),
            Err(_) => {
                log::error!("Failed to acquire read lock on transaction pool");
                0
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
