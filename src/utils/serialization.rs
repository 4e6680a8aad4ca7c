// Canonical bincode encoding. Transaction and block ids are digests of these bytes,
// so the configuration must never change between versions.
use crate::error::{LedgerError, Result};
use serde::{Deserialize, Serialize};

pub fn serialize<T: Serialize + bincode::Encode>(data: &T) -> Result<Vec<u8>> {
    bincode::encode_to_vec(data, bincode::config::standard())
        .map_err(|e| LedgerError::Serialization(format!("Serialization failed: {e}")))
}

pub fn deserialize<T>(bytes: &[u8]) -> Result<T>
where
    T: for<'de> Deserialize<'de> + bincode::Decode<()>,
{
    let (data, read) = bincode::decode_from_slice(bytes, bincode::config::standard())
        .map_err(|e| LedgerError::Serialization(format!("Deserialization failed: {e}")))?;
    if read != bytes.len() {
        return Err(LedgerError::Serialization(format!(
            "Trailing bytes after decoding: {} of {} consumed",
            read,
            bytes.len()
        )));
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{TXOutput, Transaction};

    #[test]
    fn test_transaction_survives_encoding() {
        let mut tx = Transaction::new();
        tx.add_input(&[7u8; 32], 1);
        tx.add_output(42, b"owner".to_vec());
        tx.finalize().unwrap();

        let bytes = serialize(&tx).unwrap();
        let decoded: Transaction = deserialize(&bytes).unwrap();
        assert_eq!(decoded.get_id(), tx.get_id());
        assert_eq!(decoded.get_vout(), &[TXOutput::new(42, b"owner".to_vec())]);
    }

    #[test]
    fn test_deserialize_rejects_trailing_bytes() {
        let mut bytes = serialize(&TXOutput::new(5, vec![1, 2, 3])).unwrap();
        bytes.push(0);
        assert!(deserialize::<TXOutput>(&bytes).is_err());
    }

    #[test]
    fn test_deserialize_invalid_data() {
        let invalid_bytes = vec![0xFF, 0xFF, 0xFF, 0xFF];
        let result: Result<Transaction> = deserialize(&invalid_bytes);
        assert!(result.is_err());
    }
}
