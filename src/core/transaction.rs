// Transactions follow the UTXO model: each input consumes an output of an earlier
// transaction and each output creates a new spendable (value, owner key) pair.
// Ids are content hashes, so a transaction is finalized once and never touched again.

use crate::core::monetary::checked_sum;
use crate::error::{LedgerError, Result};
use crate::utils::{deserialize, serialize, sha256_digest};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A reference to an earlier output plus the owner's signature authorizing the spend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct TXInput {
    txid: Vec<u8>,      // Id of the transaction that created the output
    vout: usize,        // Index of the output in that transaction
    signature: Vec<u8>, // Signature over get_raw_data_to_sign(input index)
}

impl TXInput {
    pub fn new(txid: &[u8], vout: usize) -> TXInput {
        TXInput {
            txid: txid.to_vec(),
            vout,
            signature: vec![],
        }
    }

    pub fn get_txid(&self) -> &[u8] {
        self.txid.as_slice()
    }

    pub fn get_vout(&self) -> usize {
        self.vout
    }

    pub fn get_signature(&self) -> &[u8] {
        self.signature.as_slice()
    }
}

/// A spendable amount locked to an owner's public key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct TXOutput {
    value: i64,
    pub_key: Vec<u8>,
}

impl TXOutput {
    /// Negative values are accepted here and rejected during validation
    pub fn new(value: i64, pub_key: Vec<u8>) -> TXOutput {
        TXOutput { value, pub_key }
    }

    pub fn get_value(&self) -> i64 {
        self.value
    }

    pub fn get_pub_key(&self) -> &[u8] {
        self.pub_key.as_slice()
    }

    pub fn is_locked_with_key(&self, pub_key: &[u8]) -> bool {
        self.pub_key.eq(pub_key)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct Transaction {
    id: Vec<u8>,
    vin: Vec<TXInput>,
    vout: Vec<TXOutput>,
    // Random bytes that keep two coinbase transactions paying the same key apart
    nonce: Vec<u8>,
}

impl Transaction {
    pub fn new() -> Transaction {
        Transaction::default()
    }

    /// Builds a finalized coinbase transaction paying `value` to `pub_key`
    pub fn new_coinbase_tx(pub_key: &[u8], value: i64) -> Result<Transaction> {
        Self::new_coinbase_tx_with_outputs(vec![TXOutput::new(value, pub_key.to_vec())])
    }

    pub fn new_coinbase_tx_with_outputs(outputs: Vec<TXOutput>) -> Result<Transaction> {
        let mut tx = Transaction {
            id: vec![],
            vin: vec![],
            vout: outputs,
            nonce: Uuid::new_v4().as_bytes().to_vec(),
        };
        tx.finalize()?;
        Ok(tx)
    }

    pub fn add_input(&mut self, prev_tx_hash: &[u8], output_index: usize) {
        self.vin.push(TXInput::new(prev_tx_hash, output_index));
    }

    pub fn add_output(&mut self, value: i64, pub_key: Vec<u8>) {
        self.vout.push(TXOutput::new(value, pub_key));
    }

    pub fn add_signature(&mut self, signature: Vec<u8>, index: usize) -> Result<()> {
        let input = self.vin.get_mut(index).ok_or_else(|| {
            LedgerError::Transaction(format!("No input at index {index} to sign"))
        })?;
        input.signature = signature;
        Ok(())
    }

    /// The message the owner of input `index`'s output must sign.
    ///
    /// Covers the spent output reference and every output of this transaction, so a
    /// signature cannot be replayed onto different payees.
    pub fn get_raw_data_to_sign(&self, index: usize) -> Option<Vec<u8>> {
        let input = self.vin.get(index)?;
        let mut raw = Vec::with_capacity(input.txid.len() + 8 + self.vout.len() * 72);
        raw.extend_from_slice(&input.txid);
        raw.extend_from_slice(&(input.vout as u64).to_be_bytes());
        for output in &self.vout {
            raw.extend_from_slice(&output.value.to_be_bytes());
            raw.extend_from_slice(&output.pub_key);
        }
        Some(raw)
    }

    /// Computes the content hash. Must be called after all inputs are signed.
    pub fn finalize(&mut self) -> Result<()> {
        self.id = self.hash()?;
        Ok(())
    }

    fn hash(&self) -> Result<Vec<u8>> {
        let tx_copy = Transaction {
            id: vec![],
            vin: self.vin.clone(),
            vout: self.vout.clone(),
            nonce: self.nonce.clone(),
        };
        Ok(sha256_digest(&tx_copy.serialize()?))
    }

    pub fn is_coinbase(&self) -> bool {
        self.vin.is_empty() && !self.nonce.is_empty()
    }

    pub fn get_id(&self) -> &[u8] {
        self.id.as_slice()
    }

    pub fn get_vin(&self) -> &[TXInput] {
        self.vin.as_slice()
    }

    pub fn get_vout(&self) -> &[TXOutput] {
        self.vout.as_slice()
    }

    pub fn get_input(&self, index: usize) -> Option<&TXInput> {
        self.vin.get(index)
    }

    /// Sum of all output values, `None` on overflow
    pub fn get_output_value(&self) -> Option<i64> {
        checked_sum(self.vout.iter().map(|out| out.value))
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        serialize(self)
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Transaction> {
        deserialize(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coinbase_ids_are_unique() {
        let a = Transaction::new_coinbase_tx(b"miner", 25).unwrap();
        let b = Transaction::new_coinbase_tx(b"miner", 25).unwrap();
        assert!(a.is_coinbase());
        assert_ne!(a.get_id(), b.get_id());
    }

    #[test]
    fn test_id_covers_signatures() {
        let mut tx = Transaction::new();
        tx.add_input(&[1u8; 32], 0);
        tx.add_output(10, b"payee".to_vec());
        tx.finalize().unwrap();
        let unsigned_id = tx.get_id().to_vec();

        tx.add_signature(vec![9, 9, 9], 0).unwrap();
        tx.finalize().unwrap();
        assert_ne!(tx.get_id(), unsigned_id.as_slice());
        assert!(!tx.is_coinbase());
    }

    #[test]
    fn test_raw_data_to_sign_depends_on_outputs() {
        let mut tx = Transaction::new();
        tx.add_input(&[1u8; 32], 3);
        tx.add_output(10, b"payee".to_vec());
        let before = tx.get_raw_data_to_sign(0).unwrap();

        tx.add_output(1, b"change".to_vec());
        assert_ne!(tx.get_raw_data_to_sign(0).unwrap(), before);
        assert!(tx.get_raw_data_to_sign(1).is_none());
    }

    #[test]
    fn test_add_signature_out_of_range() {
        let mut tx = Transaction::new();
        assert!(matches!(
            tx.add_signature(vec![1], 0),
            Err(LedgerError::Transaction(_))
        ));
    }

    #[test]
    fn test_output_value_overflow() {
        let mut tx = Transaction::new();
        tx.add_output(i64::MAX, vec![]);
        tx.add_output(1, vec![]);
        assert_eq!(tx.get_output_value(), None);
    }
}
