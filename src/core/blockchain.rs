// The fork tracker. I keep every block node that is still within the cutoff window,
// indexed by hash and by height, and remember which node is the deepest one.
// Older nodes are dropped as soon as a new deepest block moves the window past them,
// so memory stays bounded no matter how long the chain gets.

use crate::config::{LedgerSettings, GLOBAL_CONFIG};
use crate::core::block_applier::apply_block;
use crate::core::{Block, Transaction};
use crate::error::BlockRejection;
use crate::storage::{TransactionPool, UTXOPool};
use crate::utils::{EcdsaP256Verifier, SignatureVerifier};
use data_encoding::HEXLOWER;
use log::{info, warn};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// A retained block together with its height and the snapshot after applying it.
/// Never mutated after creation.
#[derive(Debug)]
pub struct BlockNode {
    block: Block,
    height: usize,
    utxo_pool: UTXOPool,
}

impl BlockNode {
    pub fn get_block(&self) -> &Block {
        &self.block
    }

    pub fn get_height(&self) -> usize {
        self.height
    }

    pub fn get_utxo_pool(&self) -> &UTXOPool {
        &self.utxo_pool
    }
}

pub struct BlockChain<V: SignatureVerifier = EcdsaP256Verifier> {
    block_nodes: HashMap<Vec<u8>, Arc<BlockNode>>, // Every retained node by block hash
    height_index: BTreeMap<usize, Vec<Vec<u8>>>,    // Hashes per height, in arrival order
    current_height: usize,
    deepest: Arc<BlockNode>, // First node seen at current_height
    cut_off_age: usize,
    tx_pool: TransactionPool,
    verifier: V,
}

impl BlockChain<EcdsaP256Verifier> {
    /// Starts a chain from `genesis_block` using ECDSA P-256 signatures and the
    /// global configuration
    pub fn new(genesis_block: Block) -> BlockChain<EcdsaP256Verifier> {
        Self::with_verifier(genesis_block, EcdsaP256Verifier)
    }
}

impl<V: SignatureVerifier> BlockChain<V> {
    pub fn with_verifier(genesis_block: Block, verifier: V) -> BlockChain<V> {
        Self::with_config(genesis_block, &GLOBAL_CONFIG.get_settings(), verifier)
    }

    /// The caller vouches for the genesis block: only its coinbase outputs seed
    /// the first snapshot, so construction cannot fail.
    pub fn with_config(genesis_block: Block, settings: &LedgerSettings, verifier: V) -> BlockChain<V> {
        if !genesis_block.is_genesis() {
            warn!("Genesis block declares a parent; treating it as the root anyway");
        }
        if !genesis_block.get_transactions().is_empty() {
            warn!(
                "Ignoring {} non-coinbase transactions in the genesis block",
                genesis_block.get_transactions().len()
            );
        }

        let utxo_pool = UTXOPool::from_transaction_outputs(genesis_block.get_coinbase())
            .unwrap_or_else(|e| {
                warn!("Genesis coinbase could not be credited: {e}");
                UTXOPool::new()
            });

        let genesis_hash = genesis_block.get_hash().to_vec();
        info!("Starting chain at genesis {}", HEXLOWER.encode(&genesis_hash));

        let genesis_node = Arc::new(BlockNode {
            block: genesis_block,
            height: 1,
            utxo_pool,
        });

        let mut block_nodes = HashMap::new();
        block_nodes.insert(genesis_hash.clone(), Arc::clone(&genesis_node));
        let mut height_index = BTreeMap::new();
        height_index.insert(1, vec![genesis_hash]);

        BlockChain {
            block_nodes,
            height_index,
            current_height: 1,
            deepest: genesis_node,
            cut_off_age: settings.cut_off_age.max(1),
            tx_pool: TransactionPool::new(),
            verifier,
        }
    }

    /// Adds `block` if it is valid and extends a retained node.
    pub fn add_block(&mut self, block: Block) -> bool {
        let block_hash = HEXLOWER.encode(block.get_hash());
        match self.try_add_block(block) {
            Ok(_) => true,
            Err(rejection) => {
                warn!("Rejected block {block_hash}: {rejection}");
                false
            }
        }
    }

    /// Like `add_block`, but says why a block was rejected and at what height an
    /// accepted one landed. The chain is unchanged on rejection. The transaction
    /// pool is never touched here; removing included transactions is up to the
    /// caller.
    pub fn try_add_block(&mut self, block: Block) -> Result<usize, BlockRejection> {
        // A parentless block can only be the genesis, which we already have
        let parent_hash = block
            .get_pre_block_hash()
            .ok_or(BlockRejection::MalformedGenesis)?;

        if self.block_nodes.contains_key(block.get_hash()) {
            return Err(BlockRejection::DuplicateBlock);
        }

        let parent = self
            .block_nodes
            .get(parent_hash)
            .cloned()
            .ok_or(BlockRejection::UnknownParent)?;

        let applied = apply_block(&block, parent.get_utxo_pool(), &self.verifier)?;
        let height = parent.get_height() + 1;

        self.insert_node(block, height, applied.utxo_pool);
        Ok(height)
    }

    fn insert_node(&mut self, block: Block, height: usize, utxo_pool: UTXOPool) {
        let block_hash = block.get_hash().to_vec();
        info!(
            "Added block {} at height {} ({} transactions)",
            HEXLOWER.encode(&block_hash),
            height,
            block.get_transactions().len()
        );

        let node = Arc::new(BlockNode {
            block,
            height,
            utxo_pool,
        });
        self.height_index
            .entry(height)
            .or_default()
            .push(block_hash.clone());
        self.block_nodes.insert(block_hash, Arc::clone(&node));

        if height > self.current_height {
            self.current_height = height;
            self.deepest = node;
            self.prune();
        }
    }

    // Drops every node at or below current_height - cut_off_age. Sweeping the whole
    // range (not just the newly crossed height) keeps this correct for any history.
    fn prune(&mut self) {
        let retain_floor = self.current_height.saturating_sub(self.cut_off_age);
        if retain_floor == 0 {
            return;
        }

        let retained = self.height_index.split_off(&(retain_floor + 1));
        let pruned = std::mem::replace(&mut self.height_index, retained);

        let mut removed = 0;
        for hashes in pruned.into_values() {
            for hash in hashes {
                if self.block_nodes.remove(&hash).is_some() {
                    removed += 1;
                }
            }
        }
        if removed > 0 {
            info!("Pruned {removed} blocks at or below height {retain_floor}");
        }
    }

    pub fn get_max_height_block(&self) -> &Block {
        self.deepest.get_block()
    }

    /// Snapshot to mine the next block on top of the max height block
    pub fn get_max_height_utxo_pool(&self) -> &UTXOPool {
        self.deepest.get_utxo_pool()
    }

    pub fn get_max_height_node(&self) -> Arc<BlockNode> {
        Arc::clone(&self.deepest)
    }

    pub fn get_max_height(&self) -> usize {
        self.current_height
    }

    pub fn get_transaction_pool(&self) -> &TransactionPool {
        &self.tx_pool
    }

    pub fn add_transaction(&self, tx: Transaction) {
        self.tx_pool.add_transaction(tx);
    }

    pub fn contains_block(&self, block_hash: &[u8]) -> bool {
        self.block_nodes.contains_key(block_hash)
    }

    pub fn get_node(&self, block_hash: &[u8]) -> Option<Arc<BlockNode>> {
        self.block_nodes.get(block_hash).cloned()
    }

    pub fn get_block(&self, block_hash: &[u8]) -> Option<&Block> {
        self.block_nodes.get(block_hash).map(|node| node.get_block())
    }

    pub fn get_utxo_pool(&self, block_hash: &[u8]) -> Option<&UTXOPool> {
        self.block_nodes
            .get(block_hash)
            .map(|node| node.get_utxo_pool())
    }

    /// Retained blocks at `height`, in arrival order
    pub fn get_blocks_at_height(&self, height: usize) -> Vec<&Block> {
        self.height_index
            .get(&height)
            .into_iter()
            .flatten()
            .filter_map(|hash| self.get_block(hash))
            .collect()
    }

    /// Lowest height that still has retained blocks
    pub fn get_min_retained_height(&self) -> Option<usize> {
        self.height_index.keys().next().copied()
    }

    pub fn block_count(&self) -> usize {
        self.block_nodes.len()
    }

    pub fn cut_off_age(&self) -> usize {
        self.cut_off_age
    }

    pub fn verifier(&self) -> &V {
        &self.verifier
    }
}
