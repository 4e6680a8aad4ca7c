use crate::core::tx_handler::TxHandler;
use crate::core::{Block, BlockChain, Transaction};
use crate::utils::{EcdsaP256Verifier, SignatureVerifier};
use data_encoding::HEXLOWER;
use log::{error, info, warn};

/// Node-facing wrapper around a [`BlockChain`]: accepts incoming blocks and
/// transactions and assembles new blocks on top of the deepest one.
pub struct BlockHandler<V: SignatureVerifier = EcdsaP256Verifier> {
    block_chain: BlockChain<V>,
}

impl<V: SignatureVerifier> BlockHandler<V> {
    pub fn new(block_chain: BlockChain<V>) -> BlockHandler<V> {
        BlockHandler { block_chain }
    }

    pub fn process_block(&mut self, block: Block) -> bool {
        self.block_chain.add_block(block)
    }

    /// Builds a block paying the reward to `coinbase_pub_key` from whatever
    /// pooled transactions are valid against the max height snapshot, and adds
    /// it to the chain. Returns the block only if the chain accepted it.
    pub fn create_block(&mut self, coinbase_pub_key: &[u8]) -> Option<Block> {
        let parent_hash = self.block_chain.get_max_height_block().get_hash().to_vec();
        let mut block = match Block::new(Some(&parent_hash), coinbase_pub_key) {
            Ok(block) => block,
            Err(e) => {
                error!("Failed to create coinbase: {e}");
                return None;
            }
        };

        let mut candidates = self.block_chain.get_transaction_pool().get_transactions();
        // Pool order is arbitrary; sort so the same pool always yields the same block
        candidates.sort_by(|a, b| a.get_id().cmp(b.get_id()));
        let accepted = {
            let mut handler = TxHandler::new(
                self.block_chain.get_max_height_utxo_pool(),
                self.block_chain.verifier(),
            );
            handler.handle_txs(&candidates)
        };
        for tx in accepted {
            block.add_transaction(tx);
        }

        if let Err(e) = block.finalize() {
            error!("Failed to finalize block: {e}");
            return None;
        }

        if self.block_chain.add_block(block.clone()) {
            // The new block is the deepest one, so its transactions are settled
            for tx in block.get_transactions() {
                self.block_chain
                    .get_transaction_pool()
                    .remove_transaction(tx.get_id());
            }
            info!(
                "Created block {} with {} transactions",
                HEXLOWER.encode(block.get_hash()),
                block.get_transactions().len()
            );
            Some(block)
        } else {
            warn!("Newly created block was not accepted");
            None
        }
    }

    pub fn process_tx(&self, tx: Transaction) {
        self.block_chain.add_transaction(tx);
    }

    pub fn get_block_chain(&self) -> &BlockChain<V> {
        &self.block_chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LedgerSettings;
    use crate::storage::UTXO;

    fn accept_all(_: &[u8], _: &[u8], _: &[u8]) -> bool {
        true
    }

    fn handler() -> (BlockHandler<fn(&[u8], &[u8], &[u8]) -> bool>, Block) {
        let genesis = Block::generate_genesis_block(b"alice").unwrap();
        let verifier: fn(&[u8], &[u8], &[u8]) -> bool = accept_all;
        let chain = BlockChain::with_config(genesis.clone(), &LedgerSettings::default(), verifier);
        (BlockHandler::new(chain), genesis)
    }

    fn transfer(txid: &[u8], vout: usize, value: i64) -> Transaction {
        let mut tx = Transaction::new();
        tx.add_input(txid, vout);
        tx.add_output(value, b"bob".to_vec());
        tx.finalize().unwrap();
        tx
    }

    #[test]
    fn test_create_block_on_empty_pool() {
        let (mut handler, genesis) = handler();
        let block = handler.create_block(b"miner").unwrap();

        assert_eq!(block.get_pre_block_hash(), Some(genesis.get_hash()));
        assert!(block.get_transactions().is_empty());
        assert_eq!(handler.get_block_chain().get_max_height(), 2);
    }

    #[test]
    fn test_create_block_keeps_only_valid_pooled_txs() {
        let (mut handler, genesis) = handler();
        let coinbase_id = genesis.get_coinbase().get_id().to_vec();
        let good = transfer(&coinbase_id, 0, 25);
        let overspend = transfer(&coinbase_id, 0, 30);
        handler.process_tx(good.clone());
        handler.process_tx(overspend.clone());

        let block = handler.create_block(b"miner").unwrap();
        assert_eq!(block.get_transactions(), &[good.clone()]);

        let chain = handler.get_block_chain();
        assert!(chain
            .get_max_height_utxo_pool()
            .contains_utxo(&UTXO::new(good.get_id(), 0)));
        // The rejected transaction stays pooled for a later block
        assert!(chain.get_transaction_pool().contains(overspend.get_id()));
        assert!(!chain.get_transaction_pool().contains(good.get_id()));
    }

    #[test]
    fn test_process_block_leaves_pool_alone() {
        let (mut handler, genesis) = handler();
        let tx = transfer(genesis.get_coinbase().get_id(), 0, 10);
        handler.process_tx(tx.clone());

        let mut block = Block::new(Some(genesis.get_hash()), b"other").unwrap();
        block.add_transaction(tx.clone());
        block.finalize().unwrap();
        assert!(handler.process_block(block));

        // Blocks from elsewhere do not settle pooled transactions
        assert!(handler
            .get_block_chain()
            .get_transaction_pool()
            .contains(tx.get_id()));
    }

    #[test]
    fn test_process_block_rejects_orphan() {
        let (mut handler, _) = handler();
        let mut orphan = Block::new(Some(&[1u8; 32][..]), b"miner").unwrap();
        orphan.finalize().unwrap();
        assert!(!handler.process_block(orphan));
    }
}
