// Drives a local chain the way a small network would: one funded owner pays a miner
// every block, the miner keeps extending the deepest block, and every few blocks a
// competing sibling shows up. The report lets me eyeball forks and pruning.

use crate::config::LedgerSettings;
use crate::core::{Block, BlockChain, BlockHandler, Transaction, COINBASE_REWARD};
use crate::error::{LedgerError, Result};
use crate::storage::UTXOPool;
use crate::utils::EcdsaP256Verifier;
use crate::wallet::Wallet;
use data_encoding::HEXLOWER;
use log::{debug, info};
use serde::Serialize;

/// Amount the owner pays the miner in every block
const PAYMENT: i64 = 1;

#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub cut_off_age: usize,
    pub blocks_created: usize,
    pub forks_created: usize,
    pub transactions_confirmed: usize,
    pub max_height: usize,
    pub retained_blocks: usize,
    pub min_retained_height: Option<usize>,
    pub tip_hash: String,
    pub tip_value: Option<i64>,
    pub expected_value: i64,
    pub genesis_extension_accepted: bool,
}

pub fn run_simulation(
    blocks: usize,
    fork_every: usize,
    settings: &LedgerSettings,
) -> Result<SimulationReport> {
    settings.validate()?;
    let owner = Wallet::new()?;
    let miner = Wallet::new()?;
    info!(
        "Simulating {blocks} blocks, owner {} miner {}",
        owner.get_address(),
        miner.get_address()
    );

    let genesis = Block::generate_genesis_block(owner.get_public_key())?;
    let genesis_hash = genesis.get_hash().to_vec();
    let chain = BlockChain::with_config(genesis, settings, EcdsaP256Verifier);
    let mut handler = BlockHandler::new(chain);

    let mut blocks_created = 0;
    let mut forks_created = 0;
    let mut transactions_confirmed = 0;

    for round in 1..=blocks {
        if let Some(tx) = pay(&owner, miner.get_public_key(), handler.get_block_chain().get_max_height_utxo_pool())? {
            handler.process_tx(tx);
        }

        let block = handler
            .create_block(miner.get_public_key())
            .ok_or_else(|| LedgerError::Transaction(format!("Block {round} was not accepted")))?;
        blocks_created += 1;
        transactions_confirmed += block.get_transactions().len();

        if fork_every > 0 && round % fork_every == 0 {
            if let Some(parent) = block.get_pre_block_hash() {
                let mut sibling = Block::new(Some(parent), owner.get_public_key())?;
                sibling.finalize()?;
                if handler.process_block(sibling) {
                    forks_created += 1;
                }
            }
        }
    }

    // Once the window has moved past the genesis this must be refused
    let mut late = Block::new(Some(&genesis_hash), miner.get_public_key())?;
    late.finalize()?;
    let genesis_extension_accepted = handler.process_block(late);
    debug!("Extension of the genesis accepted: {genesis_extension_accepted}");

    let chain = handler.get_block_chain();
    let tip_pool = chain.get_max_height_utxo_pool();
    let expected_value = COINBASE_REWARD
        .checked_mul(chain.get_max_height() as i64)
        .ok_or_else(|| LedgerError::Transaction("Reward total overflows".to_string()))?;

    Ok(SimulationReport {
        cut_off_age: chain.cut_off_age(),
        blocks_created,
        forks_created,
        transactions_confirmed,
        max_height: chain.get_max_height(),
        retained_blocks: chain.block_count(),
        min_retained_height: chain.get_min_retained_height(),
        tip_hash: HEXLOWER.encode(chain.get_max_height_block().get_hash()),
        tip_value: tip_pool.total_value(),
        expected_value,
        genesis_extension_accepted,
    })
}

// Spends the owner's largest output: PAYMENT to `payee`, the rest back as change
fn pay(owner: &Wallet, payee: &[u8], utxo_pool: &UTXOPool) -> Result<Option<Transaction>> {
    let funding = utxo_pool
        .find_utxo(owner.get_public_key())
        .into_iter()
        .filter(|(_, output)| output.get_value() >= PAYMENT)
        .max_by_key(|(utxo, output)| (output.get_value(), utxo.clone()));
    let Some((utxo, output)) = funding else {
        return Ok(None);
    };

    let mut tx = Transaction::new();
    tx.add_input(utxo.get_tx_hash(), utxo.get_index());
    tx.add_output(PAYMENT, payee.to_vec());
    let change = output.get_value() - PAYMENT;
    if change > 0 {
        tx.add_output(change, owner.get_public_key().to_vec());
    }
    owner.sign_input(&mut tx, 0)?;
    tx.finalize()?;
    Ok(Some(tx))
}
