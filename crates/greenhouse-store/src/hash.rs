//! Content hashing for stored documents.

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Whether `bytes` hash to `expected_hash`.
pub fn verify_hash(bytes: &[u8], expected_hash: &str) -> bool {
    sha256_hex(bytes).eq_ignore_ascii_case(expected_hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex() {
        // Known SHA-256 hash for "Hello, World!"
        assert_eq!(
            sha256_hex(b"Hello, World!"),
            "dffd6021bb2bd5b0af676290809ec3a53191dd81c7f70a4b28688a362182986f"
        );
    }

    #[test]
    fn test_verify_hash() {
        let hash = sha256_hex(b"<greenhouse/>");
        assert!(verify_hash(b"<greenhouse/>", &hash));
        assert!(verify_hash(b"<greenhouse/>", &hash.to_uppercase()));
        assert!(!verify_hash(b"<greenhouse />", &hash));
    }
}
