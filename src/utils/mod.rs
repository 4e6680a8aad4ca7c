//! Utility functions and helpers
//!
//! This module contains the hashing and signature capabilities the ledger
//! consumes, plus the bincode helpers used for content addressing.

pub mod crypto;
pub mod serialization;

pub use crypto::{
    ecdsa_p256_sha256_sign_digest, ecdsa_p256_sha256_sign_verify, new_key_pair, sha256_digest,
    EcdsaP256Verifier, SignatureVerifier,
};

pub use serialization::{deserialize, serialize};
