//! Per-transaction validation and batch processing
//!
//! [`check_transaction`] is the pure validity predicate. [`TxHandler`] layers a
//! working snapshot and a per-batch consumed set on top of it. Batches are
//! processed best-effort by [`TxHandler::handle_txs`] (mempool epochs), while
//! blocks go through the strict path in `block_applier`.

use crate::core::monetary::checked_sum;
use crate::core::Transaction;
use crate::error::TxRejection;
use crate::storage::{UTXOPool, UTXO};
use crate::utils::SignatureVerifier;
use log::debug;
use std::collections::HashSet;

/// Checks `tx` against `utxo_pool` without mutating anything.
///
/// A transaction is valid when every input spends a distinct unspent output with a
/// signature by that output's owner, no output is negative, and the outputs are
/// not worth more than the inputs.
pub fn check_transaction<V>(
    tx: &Transaction,
    utxo_pool: &UTXOPool,
    verifier: &V,
) -> Result<(), TxRejection>
where
    V: SignatureVerifier + ?Sized,
{
    let mut claimed: HashSet<UTXO> = HashSet::with_capacity(tx.get_vin().len());
    let mut input_values = Vec::with_capacity(tx.get_vin().len());

    for (index, input) in tx.get_vin().iter().enumerate() {
        let utxo = UTXO::new(input.get_txid(), input.get_vout());
        let output = utxo_pool
            .get_tx_output(&utxo)
            .ok_or(TxRejection::MissingInput { index })?;

        // A repeated reference passes the lookup above, so it needs its own check
        if !claimed.insert(utxo) {
            return Err(TxRejection::DuplicateInput { index });
        }

        let message = tx
            .get_raw_data_to_sign(index)
            .ok_or(TxRejection::InvalidSignature { index })?;
        if !verifier.verify_signature(output.get_pub_key(), &message, input.get_signature()) {
            return Err(TxRejection::InvalidSignature { index });
        }

        input_values.push(output.get_value());
    }

    if let Some(index) = tx.get_vout().iter().position(|out| out.get_value() < 0) {
        return Err(TxRejection::NegativeOutput { index });
    }

    let input = checked_sum(input_values).ok_or(TxRejection::ValueOverflow)?;
    let output = tx.get_output_value().ok_or(TxRejection::ValueOverflow)?;
    if input < output {
        return Err(TxRejection::InsufficientInputValue { input, output });
    }

    Ok(())
}

pub fn is_valid_tx<V>(tx: &Transaction, utxo_pool: &UTXOPool, verifier: &V) -> bool
where
    V: SignatureVerifier + ?Sized,
{
    check_transaction(tx, utxo_pool, verifier).is_ok()
}

/// Applies transactions one at a time to a private copy of a snapshot
pub struct TxHandler<'a, V: SignatureVerifier + ?Sized> {
    utxo_pool: UTXOPool,
    consumed: HashSet<UTXO>,
    verifier: &'a V,
}

impl<'a, V: SignatureVerifier + ?Sized> TxHandler<'a, V> {
    /// The handler works on a clone; `utxo_pool` itself is never modified
    pub fn new(utxo_pool: &UTXOPool, verifier: &'a V) -> TxHandler<'a, V> {
        TxHandler {
            utxo_pool: utxo_pool.clone(),
            consumed: HashSet::new(),
            verifier,
        }
    }

    pub fn is_valid_tx(&self, tx: &Transaction) -> bool {
        is_valid_tx(tx, &self.utxo_pool, self.verifier)
    }

    /// Accepts `tx` into the working snapshot or leaves everything untouched.
    ///
    /// Later transactions may spend outputs created by earlier accepted ones, but
    /// never an output some earlier transaction of the batch already consumed.
    pub fn accept(&mut self, tx: &Transaction) -> Result<(), TxRejection> {
        if let Some(index) = tx
            .get_vin()
            .iter()
            .position(|input| self.consumed.contains(&UTXO::new(input.get_txid(), input.get_vout())))
        {
            return Err(TxRejection::ConflictsWithBatch { index });
        }

        check_transaction(tx, &self.utxo_pool, self.verifier)?;

        // Swapped in only on success
        let mut next_pool = self.utxo_pool.clone();
        for input in tx.get_vin() {
            next_pool.remove_utxo(&UTXO::new(input.get_txid(), input.get_vout()));
        }
        if let Err(e) = next_pool.add_transaction_outputs(tx) {
            debug!("Transaction would overwrite an unspent output: {e}");
            let index = next_pool.first_existing_output(tx).unwrap_or_default();
            return Err(TxRejection::OutputAlreadyExists { index });
        }

        self.utxo_pool = next_pool;
        self.consumed.extend(
            tx.get_vin()
                .iter()
                .map(|input| UTXO::new(input.get_txid(), input.get_vout())),
        );
        Ok(())
    }

    /// Best-effort epoch processing: keeps every transaction that validates in
    /// order and silently drops the rest.
    pub fn handle_txs(&mut self, possible_txs: &[Transaction]) -> Vec<Transaction> {
        let mut accepted = Vec::with_capacity(possible_txs.len());
        for tx in possible_txs {
            match self.accept(tx) {
                Ok(()) => accepted.push(tx.clone()),
                Err(reason) => {
                    debug!(
                        "Skipping transaction {}: {reason}",
                        data_encoding::HEXLOWER.encode(tx.get_id())
                    );
                }
            }
        }
        accepted
    }

    pub fn get_utxo_pool(&self) -> &UTXOPool {
        &self.utxo_pool
    }

    pub fn into_utxo_pool(self) -> UTXOPool {
        self.utxo_pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TXOutput;

    fn accept_all(_: &[u8], _: &[u8], _: &[u8]) -> bool {
        true
    }

    // Signature is valid iff it equals the owner's key
    fn key_is_signature(public_key: &[u8], _: &[u8], signature: &[u8]) -> bool {
        public_key == signature
    }

    fn funded_pool(values: &[i64]) -> (UTXOPool, Transaction) {
        let outputs = values
            .iter()
            .map(|&value| TXOutput::new(value, b"alice".to_vec()))
            .collect();
        let coinbase = Transaction::new_coinbase_tx_with_outputs(outputs).unwrap();
        (UTXOPool::from_transaction_outputs(&coinbase).unwrap(), coinbase)
    }

    fn spend(inputs: &[(&[u8], usize)], outputs: &[i64]) -> Transaction {
        let mut tx = Transaction::new();
        for (txid, vout) in inputs {
            tx.add_input(txid, *vout);
        }
        for &value in outputs {
            tx.add_output(value, b"bob".to_vec());
        }
        for index in 0..inputs.len() {
            tx.add_signature(b"alice".to_vec(), index).unwrap();
        }
        tx.finalize().unwrap();
        tx
    }

    #[test]
    fn test_valid_spend() {
        let (pool, coinbase) = funded_pool(&[10]);
        let tx = spend(&[(coinbase.get_id(), 0)], &[7, 3]);
        assert_eq!(check_transaction(&tx, &pool, &key_is_signature), Ok(()));
    }

    #[test]
    fn test_missing_input() {
        let (pool, coinbase) = funded_pool(&[10]);
        let tx = spend(&[(coinbase.get_id(), 1)], &[1]);
        assert_eq!(
            check_transaction(&tx, &pool, &accept_all),
            Err(TxRejection::MissingInput { index: 0 })
        );
    }

    #[test]
    fn test_duplicate_input() {
        let (pool, coinbase) = funded_pool(&[10]);
        let tx = spend(&[(coinbase.get_id(), 0), (coinbase.get_id(), 0)], &[15]);
        assert_eq!(
            check_transaction(&tx, &pool, &accept_all),
            Err(TxRejection::DuplicateInput { index: 1 })
        );
    }

    #[test]
    fn test_invalid_signature_regardless_of_balance() {
        let (pool, coinbase) = funded_pool(&[10]);
        let mut tx = Transaction::new();
        tx.add_input(coinbase.get_id(), 0);
        tx.add_output(1, b"bob".to_vec());
        tx.add_signature(b"mallory".to_vec(), 0).unwrap();
        tx.finalize().unwrap();

        assert_eq!(
            check_transaction(&tx, &pool, &key_is_signature),
            Err(TxRejection::InvalidSignature { index: 0 })
        );
    }

    #[test]
    fn test_negative_output() {
        let (pool, coinbase) = funded_pool(&[10]);
        let tx = spend(&[(coinbase.get_id(), 0)], &[12, -2]);
        assert_eq!(
            check_transaction(&tx, &pool, &accept_all),
            Err(TxRejection::NegativeOutput { index: 1 })
        );
    }

    #[test]
    fn test_value_creation_by_one_unit() {
        let (pool, coinbase) = funded_pool(&[10]);
        let tx = spend(&[(coinbase.get_id(), 0)], &[11]);
        assert_eq!(
            check_transaction(&tx, &pool, &accept_all),
            Err(TxRejection::InsufficientInputValue {
                input: 10,
                output: 11
            })
        );
    }

    #[test]
    fn test_input_overflow() {
        let (pool, coinbase) = funded_pool(&[i64::MAX, 1]);
        let tx = spend(&[(coinbase.get_id(), 0), (coinbase.get_id(), 1)], &[1]);
        assert_eq!(
            check_transaction(&tx, &pool, &accept_all),
            Err(TxRejection::ValueOverflow)
        );
    }

    #[test]
    fn test_handle_txs_is_best_effort() {
        let (pool, coinbase) = funded_pool(&[10, 5]);
        let first = spend(&[(coinbase.get_id(), 0)], &[10]);
        let double_spend = spend(&[(coinbase.get_id(), 0)], &[9]);
        let overspend = spend(&[(coinbase.get_id(), 1)], &[6]);
        let chained = spend(&[(first.get_id(), 0)], &[4]);

        let mut handler = TxHandler::new(&pool, &accept_all);
        let accepted = handler.handle_txs(&[
            first.clone(),
            double_spend,
            overspend,
            chained.clone(),
        ]);

        assert_eq!(accepted, vec![first.clone(), chained.clone()]);
        let result = handler.get_utxo_pool();
        assert!(!result.contains_utxo(&UTXO::new(first.get_id(), 0)));
        assert!(result.contains_utxo(&UTXO::new(chained.get_id(), 0)));
        assert!(result.contains_utxo(&UTXO::new(coinbase.get_id(), 1)));
        // The source snapshot is untouched
        assert!(pool.contains_utxo(&UTXO::new(coinbase.get_id(), 0)));
    }

    #[test]
    fn test_accept_reports_batch_conflict() {
        let (pool, coinbase) = funded_pool(&[10]);
        let first = spend(&[(coinbase.get_id(), 0)], &[10]);
        let second = spend(&[(coinbase.get_id(), 0)], &[1]);

        let mut handler = TxHandler::new(&pool, &accept_all);
        assert_eq!(handler.accept(&first), Ok(()));
        assert_eq!(
            handler.accept(&second),
            Err(TxRejection::ConflictsWithBatch { index: 0 })
        );
    }

    #[test]
    fn test_output_collision_leaves_inputs_unspent() {
        let (mut pool, coinbase) = funded_pool(&[10]);
        let tx = spend(&[(coinbase.get_id(), 0)], &[4, 6]);
        pool.add_utxo(UTXO::new(tx.get_id(), 1), TXOutput::new(6, b"bob".to_vec()))
            .unwrap();

        let mut handler = TxHandler::new(&pool, &accept_all);
        assert_eq!(
            handler.accept(&tx),
            Err(TxRejection::OutputAlreadyExists { index: 1 })
        );
        let result = handler.get_utxo_pool();
        assert!(result.contains_utxo(&UTXO::new(coinbase.get_id(), 0)));
        assert!(!result.contains_utxo(&UTXO::new(tx.get_id(), 0)));
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_replayed_outputs_are_rejected() {
        let (pool, _) = funded_pool(&[10]);
        let free = spend(&[], &[0]);

        let mut handler = TxHandler::new(&pool, &accept_all);
        assert_eq!(handler.accept(&free), Ok(()));
        assert_eq!(
            handler.accept(&free),
            Err(TxRejection::OutputAlreadyExists { index: 0 })
        );
        assert_eq!(handler.into_utxo_pool().len(), 2);
    }
}
