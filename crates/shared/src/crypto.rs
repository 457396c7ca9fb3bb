//! Cryptographic utilities for panel key generation and hashing.

use rand::distributions::Alphanumeric;
use rand::Rng;
use sha2::{Digest, Sha256};

/// Length of the random part of a generated panel key.
const KEY_RANDOM_LEN: usize = 32;

/// Computes SHA-256 hash of the input and returns it as a hex string.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Extracts the prefix from a panel key (first 8 characters after "ep_").
pub fn extract_key_prefix(key: &str) -> Option<&str> {
    if key.starts_with("ep_") && key.len() >= 11 {
        Some(&key[3..11])
    } else {
        None
    }
}

/// Generates a new panel key with the "ep_" prefix.
///
/// The returned key is the only place the plaintext exists; callers are
/// expected to store `sha256_hex(&key)` and hand the plaintext to the
/// operator once.
pub fn generate_panel_key() -> String {
    let random: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(KEY_RANDOM_LEN)
        .map(char::from)
        .collect();
    format!("ep_{}", random)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex() {
        let hash = sha256_hex("test");
        assert_eq!(hash.len(), 64);
        assert_eq!(
            hash,
            "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
        );
    }

    #[test]
    fn test_sha256_hex_empty_string() {
        let hash = sha256_hex("");
        assert_eq!(hash.len(), 64);
        // SHA256 of empty string
        assert_eq!(
            hash,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_sha256_hex_deterministic() {
        let hash1 = sha256_hex("same_input");
        let hash2 = sha256_hex("same_input");
        assert_eq!(hash1, hash2);
    }

    #[test]
    fn test_extract_key_prefix() {
        assert_eq!(extract_key_prefix("ep_abcdefgh12345"), Some("abcdefgh"));
        assert_eq!(extract_key_prefix("ep_short"), None);
        assert_eq!(extract_key_prefix("invalid_key"), None);
    }

    #[test]
    fn test_extract_key_prefix_exact_length() {
        // ep_ (3) + 8 characters = 11 minimum
        assert_eq!(extract_key_prefix("ep_12345678"), Some("12345678"));
    }

    #[test]
    fn test_extract_key_prefix_wrong_prefix() {
        assert_eq!(extract_key_prefix("pk_abcdefgh12345"), None);
        assert_eq!(extract_key_prefix("EP_abcdefgh12345"), None); // Case sensitive
    }

    #[test]
    fn test_generate_panel_key_shape() {
        let key = generate_panel_key();
        assert!(key.starts_with("ep_"));
        assert_eq!(key.len(), 3 + KEY_RANDOM_LEN);
        assert!(extract_key_prefix(&key).is_some());
    }

    #[test]
    fn test_generate_panel_key_unique() {
        let a = generate_panel_key();
        let b = generate_panel_key();
        assert_ne!(a, b);
    }

    #[test]
    fn test_generated_key_hash_roundtrip() {
        let key = generate_panel_key();
        let hash = sha256_hex(&key);
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, sha256_hex(&key));
    }
}
