use crate::core::Transaction;
use crate::error::{LedgerError, Result};
use crate::utils::{ecdsa_p256_sha256_sign_digest, sha256_digest};
use data_encoding::HEXLOWER;
use ring::rand::SystemRandom;
use ring::signature::{EcdsaKeyPair, KeyPair, ECDSA_P256_SHA256_FIXED_SIGNING};
use serde::{Deserialize, Serialize};

/// An ECDSA P-256 key pair. The public key is what outputs are locked to.
#[derive(Clone, Serialize, Deserialize)]
pub struct Wallet {
    pkcs8: Vec<u8>,
    public_key: Vec<u8>,
}

impl Wallet {
    pub fn new() -> Result<Wallet> {
        let pkcs8 = crate::utils::new_key_pair()?;
        Self::from_pkcs8(pkcs8)
    }

    pub fn from_pkcs8(pkcs8: Vec<u8>) -> Result<Wallet> {
        let rng = SystemRandom::new();
        let key_pair =
            EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, pkcs8.as_ref(), &rng)
                .map_err(|e| {
                    LedgerError::Crypto(format!("Failed to create key pair from PKCS8: {e}"))
                })?;
        let public_key = key_pair.public_key().as_ref().to_vec();
        Ok(Wallet { pkcs8, public_key })
    }

    pub fn get_public_key(&self) -> &[u8] {
        self.public_key.as_slice()
    }

    pub fn get_pkcs8(&self) -> &[u8] {
        self.pkcs8.as_slice()
    }

    /// Short printable name for the key, used in logs and CLI output
    pub fn get_address(&self) -> String {
        HEXLOWER.encode(&sha256_digest(&self.public_key)[..8])
    }

    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        ecdsa_p256_sha256_sign_digest(&self.pkcs8, message)
    }

    /// Signs input `index` of `tx`. Call once the inputs and outputs are final
    /// and before `Transaction::finalize`.
    pub fn sign_input(&self, tx: &mut Transaction, index: usize) -> Result<()> {
        let message = tx.get_raw_data_to_sign(index).ok_or_else(|| {
            LedgerError::Transaction(format!("No input at index {index} to sign"))
        })?;
        let signature = self.sign(&message)?;
        tx.add_signature(signature, index)
    }
}
