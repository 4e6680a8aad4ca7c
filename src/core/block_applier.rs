use crate::core::tx_handler::TxHandler;
use crate::core::Block;
use crate::error::BlockRejection;
use crate::storage::UTXOPool;
use crate::utils::SignatureVerifier;
use data_encoding::HEXLOWER;
use log::debug;

/// Outcome of applying a block on top of its parent's snapshot
#[derive(Debug, Clone)]
pub struct AppliedBlock {
    pub utxo_pool: UTXOPool,
    pub accepted: usize,
}

/// Applies `block` on top of `parent_pool`, all or nothing.
///
/// The coinbase outputs are credited first, then the transactions are accepted in
/// list order, so a transaction may spend the coinbase or an earlier transaction
/// of the same block. A single rejected transaction rejects the whole block and
/// no snapshot is produced. `parent_pool` is never modified.
pub fn apply_block<V>(
    block: &Block,
    parent_pool: &UTXOPool,
    verifier: &V,
) -> Result<AppliedBlock, BlockRejection>
where
    V: SignatureVerifier + ?Sized,
{
    if !block.get_coinbase().is_coinbase() {
        debug!(
            "Block {} carries a coinbase that spends inputs",
            HEXLOWER.encode(block.get_hash())
        );
        return Err(BlockRejection::InvalidCoinbase);
    }

    let mut working_pool = parent_pool.clone();
    if let Err(e) = working_pool.add_transaction_outputs(block.get_coinbase()) {
        debug!(
            "Block {} has a colliding coinbase: {e}",
            HEXLOWER.encode(block.get_hash())
        );
        return Err(BlockRejection::InvalidCoinbase);
    }

    let mut handler = TxHandler::new(&working_pool, verifier);
    for (index, tx) in block.get_transactions().iter().enumerate() {
        if let Err(reason) = handler.accept(tx) {
            debug!(
                "Block {} rejected at transaction {index}: {reason}",
                HEXLOWER.encode(block.get_hash())
            );
            return Err(BlockRejection::InvalidTransactionSet { index, reason });
        }
    }

    Ok(AppliedBlock {
        utxo_pool: handler.into_utxo_pool(),
        accepted: block.get_transactions().len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Transaction;
    use crate::error::TxRejection;
    use crate::storage::UTXO;

    fn accept_all(_: &[u8], _: &[u8], _: &[u8]) -> bool {
        true
    }

    fn genesis() -> (Block, UTXOPool) {
        let block = Block::generate_genesis_block(b"alice").unwrap();
        let pool = UTXOPool::from_transaction_outputs(block.get_coinbase()).unwrap();
        (block, pool)
    }

    fn transfer(txid: &[u8], vout: usize, value: i64) -> Transaction {
        let mut tx = Transaction::new();
        tx.add_input(txid, vout);
        tx.add_output(value, b"bob".to_vec());
        tx.finalize().unwrap();
        tx
    }

    #[test]
    fn test_apply_credits_coinbase_and_spends() {
        let (genesis, pool) = genesis();
        let mut block = Block::new(Some(genesis.get_hash()), b"carol").unwrap();
        let tx = transfer(genesis.get_coinbase().get_id(), 0, 20);
        block.add_transaction(tx.clone());
        block.finalize().unwrap();

        let applied = apply_block(&block, &pool, &accept_all).unwrap();
        assert_eq!(applied.accepted, 1);
        assert!(applied
            .utxo_pool
            .contains_utxo(&UTXO::new(block.get_coinbase().get_id(), 0)));
        assert!(applied.utxo_pool.contains_utxo(&UTXO::new(tx.get_id(), 0)));
        assert!(!applied
            .utxo_pool
            .contains_utxo(&UTXO::new(genesis.get_coinbase().get_id(), 0)));
        assert!(pool.contains_utxo(&UTXO::new(genesis.get_coinbase().get_id(), 0)));
    }

    #[test]
    fn test_block_may_spend_its_own_coinbase() {
        let (genesis, pool) = genesis();
        let mut block = Block::new(Some(genesis.get_hash()), b"carol").unwrap();
        block.add_transaction(transfer(block.get_coinbase().get_id(), 0, 25));
        block.finalize().unwrap();

        assert!(apply_block(&block, &pool, &accept_all).is_ok());
    }

    #[test]
    fn test_one_bad_transaction_rejects_block() {
        let (genesis, pool) = genesis();
        let coinbase_id = genesis.get_coinbase().get_id().to_vec();
        let mut block = Block::new(Some(genesis.get_hash()), b"carol").unwrap();
        block.add_transaction(transfer(&coinbase_id, 0, 10));
        block.add_transaction(transfer(&coinbase_id, 0, 5));
        block.finalize().unwrap();

        let rejection = apply_block(&block, &pool, &accept_all).unwrap_err();
        assert_eq!(
            rejection,
            BlockRejection::InvalidTransactionSet {
                index: 1,
                reason: TxRejection::ConflictsWithBatch { index: 0 },
            }
        );
    }

    #[test]
    fn test_block_chains_transactions() {
        let (genesis, pool) = genesis();
        let first = transfer(genesis.get_coinbase().get_id(), 0, 20);
        let second = transfer(first.get_id(), 0, 20);
        let mut block = Block::new(Some(genesis.get_hash()), b"carol").unwrap();
        block.add_transaction(first.clone());
        block.add_transaction(second.clone());
        block.finalize().unwrap();

        let applied = apply_block(&block, &pool, &accept_all).unwrap();
        assert_eq!(applied.accepted, 2);
        assert!(!applied.utxo_pool.contains_utxo(&UTXO::new(first.get_id(), 0)));
        assert!(applied.utxo_pool.contains_utxo(&UTXO::new(second.get_id(), 0)));
    }

    #[test]
    fn test_coinbase_with_inputs_is_rejected() {
        let (genesis, pool) = genesis();
        let spending = transfer(genesis.get_coinbase().get_id(), 0, 25);
        let block = Block::with_coinbase(Some(genesis.get_hash()), spending);

        assert_eq!(
            apply_block(&block, &pool, &accept_all).unwrap_err(),
            BlockRejection::InvalidCoinbase
        );
    }

    #[test]
    fn test_colliding_coinbase_is_rejected() {
        let (genesis, pool) = genesis();
        let block = Block::with_coinbase(Some(genesis.get_hash()), genesis.get_coinbase().clone());

        assert_eq!(
            apply_block(&block, &pool, &accept_all).unwrap_err(),
            BlockRejection::InvalidCoinbase
        );
    }
}
