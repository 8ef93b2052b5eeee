//! Block digest derivation.

use sha2::{Digest, Sha256};

/// SHA-256 over the block record, rendered as lowercase hex.
///
/// The record is the decimal index, the timestamp, the decimal value and the
/// previous hash concatenated with no separators.
pub fn calculate_hash(index: u64, timestamp: &str, value: i64, prev_hash: &str) -> String {
    let record = format!("{}{}{}{}", index, timestamp, value, prev_hash);
    let mut hasher = Sha256::new();
    hasher.update(record.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_deterministic() {
        let a = calculate_hash(1, "2024-01-01T00:00:00Z", 72, "abc");
        let b = calculate_hash(1, "2024-01-01T00:00:00Z", 72, "abc");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.bytes().all(|c| matches!(c, b'0'..=b'9' | b'a'..=b'f')));
    }

    #[test]
    fn test_hash_matches_known_digest() {
        // index 0 and value 0 with empty strings hash the record "00"
        let digest = calculate_hash(0, "", 0, "");
        let mut hasher = Sha256::new();
        hasher.update(b"00");
        assert_eq!(digest, hex::encode(hasher.finalize()));
    }

    #[test]
    fn test_each_field_changes_hash() {
        let base = calculate_hash(1, "t", 10, "p");
        assert_ne!(base, calculate_hash(2, "t", 10, "p"));
        assert_ne!(base, calculate_hash(1, "u", 10, "p"));
        assert_ne!(base, calculate_hash(1, "t", 11, "p"));
        assert_ne!(base, calculate_hash(1, "t", 10, "q"));
    }

    #[test]
    fn test_negative_values_are_hashed() {
        assert_ne!(calculate_hash(1, "t", -5, ""), calculate_hash(1, "t", 5, ""));
    }
}
