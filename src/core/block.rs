use crate::core::{Transaction, COINBASE_REWARD};
use crate::error::Result;
use crate::utils::{deserialize, serialize, sha256_digest};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct Block {
    pre_block_hash: Option<Vec<u8>>, // None only for the genesis block
    hash: Vec<u8>,
    coinbase: Transaction,
    transactions: Vec<Transaction>,
}

impl Block {
    /// Starts an unfinalized block paying the standard reward to `coinbase_pub_key`
    pub fn new(pre_block_hash: Option<&[u8]>, coinbase_pub_key: &[u8]) -> Result<Block> {
        let coinbase = Transaction::new_coinbase_tx(coinbase_pub_key, COINBASE_REWARD)?;
        Ok(Self::with_coinbase(pre_block_hash, coinbase))
    }

    pub fn with_coinbase(pre_block_hash: Option<&[u8]>, coinbase: Transaction) -> Block {
        Block {
            pre_block_hash: pre_block_hash.map(|hash| hash.to_vec()),
            hash: vec![],
            coinbase,
            transactions: vec![],
        }
    }

    /// A finalized, parentless block holding only a coinbase
    pub fn generate_genesis_block(coinbase_pub_key: &[u8]) -> Result<Block> {
        let mut block = Block::new(None, coinbase_pub_key)?;
        block.finalize()?;
        Ok(block)
    }

    pub fn add_transaction(&mut self, tx: Transaction) {
        self.transactions.push(tx);
    }

    /// Computes the block hash over parent, coinbase and transactions
    pub fn finalize(&mut self) -> Result<()> {
        let block_copy = Block {
            pre_block_hash: self.pre_block_hash.clone(),
            hash: vec![],
            coinbase: self.coinbase.clone(),
            transactions: self.transactions.clone(),
        };
        self.hash = sha256_digest(&block_copy.serialize()?);
        Ok(())
    }

    pub fn is_genesis(&self) -> bool {
        self.pre_block_hash.is_none()
    }

    pub fn get_pre_block_hash(&self) -> Option<&[u8]> {
        self.pre_block_hash.as_deref()
    }

    pub fn get_hash(&self) -> &[u8] {
        self.hash.as_slice()
    }

    pub fn get_coinbase(&self) -> &Transaction {
        &self.coinbase
    }

    pub fn get_transactions(&self) -> &[Transaction] {
        self.transactions.as_slice()
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        serialize(self)
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Block> {
        deserialize(bytes)
    }
}
