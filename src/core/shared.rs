use crate::core::{Block, BlockChain, BlockNode, Transaction};
use crate::error::BlockRejection;
use crate::storage::UTXOPool;
use crate::utils::{EcdsaP256Verifier, SignatureVerifier};
use std::sync::{Arc, RwLock};

/// Cloneable handle to a chain shared between threads.
///
/// Writers serialize on the lock; readers get owned copies (snapshots are cheap to
/// clone) so nothing borrowed outlives the guard.
pub struct SharedBlockChain<V: SignatureVerifier = EcdsaP256Verifier> {
    inner: Arc<RwLock<BlockChain<V>>>,
}

impl<V: SignatureVerifier> Clone for SharedBlockChain<V> {
    fn clone(&self) -> Self {
        SharedBlockChain {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V: SignatureVerifier> SharedBlockChain<V> {
    pub fn new(block_chain: BlockChain<V>) -> SharedBlockChain<V> {
        SharedBlockChain {
            inner: Arc::new(RwLock::new(block_chain)),
        }
    }

    pub fn add_block(&self, block: Block) -> bool {
        match self.inner.write() {
            Ok(mut chain) => chain.add_block(block),
            Err(e) => {
                log::error!("Failed to acquire write lock on block chain: {e}");
                false
            }
        }
    }

    /// `None` when the lock is poisoned
    pub fn try_add_block(&self, block: Block) -> Option<Result<usize, BlockRejection>> {
        match self.inner.write() {
            Ok(mut chain) => Some(chain.try_add_block(block)),
            Err(e) => {
                log::error!("Failed to acquire write lock on block chain: {e}");
                None
            }
        }
    }

    pub fn add_transaction(&self, tx: Transaction) {
        match self.inner.read() {
            Ok(chain) => chain.add_transaction(tx),
            Err(e) => log::error!("Failed to acquire read lock on block chain: {e}"),
        }
    }

    pub fn get_max_height_node(&self) -> Option<Arc<BlockNode>> {
        self.read(|chain| chain.get_max_height_node())
    }

    pub fn get_max_height_block(&self) -> Option<Block> {
        self.read(|chain| chain.get_max_height_block().clone())
    }

    pub fn get_max_height_utxo_pool(&self) -> Option<UTXOPool> {
        self.read(|chain| chain.get_max_height_utxo_pool().clone())
    }

    pub fn get_max_height(&self) -> usize {
        self.read(|chain| chain.get_max_height()).unwrap_or(0)
    }

    pub fn get_transactions(&self) -> Vec<Transaction> {
        self.read(|chain| chain.get_transaction_pool().get_transactions())
            .unwrap_or_default()
    }

    pub fn contains_block(&self, block_hash: &[u8]) -> bool {
        self.read(|chain| chain.contains_block(block_hash))
            .unwrap_or(false)
    }

    /// Runs `f` under the read lock
    pub fn read<R>(&self, f: impl FnOnce(&BlockChain<V>) -> R) -> Option<R> {
        match self.inner.read() {
            Ok(chain) => Some(f(&chain)),
            Err(e) => {
                log::error!("Failed to acquire read lock on block chain: {e}");
                None
            }
        }
    }
}
