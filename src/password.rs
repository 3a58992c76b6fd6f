//! Password digests.
//!
//! Passwords are stored as the lowercase hex SHA-256 of their UTF-8 bytes,
//! unsalted and single-round, so digests written by earlier clients of the
//! same table still verify.

use sha2::{Digest, Sha256};

/// Length of a digest produced by [`sha256_hex`].
const DIGEST_HEX_LEN: usize = 64;

pub fn sha256_hex(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Hashes `password` and compares it against a stored digest. A stored value
/// that is not a full-length digest never matches.
pub fn verify(password: &str, stored_hash: &str) -> bool {
    stored_hash.len() == DIGEST_HEX_LEN
        && digests_match(sha256_hex(password).as_bytes(), stored_hash.as_bytes())
}

/// Compares two equal-length digests without stopping at the first mismatch.
fn digests_match(computed: &[u8], stored: &[u8]) -> bool {
    computed.len() == stored.len()
        && computed
            .iter()
            .zip(stored)
            .fold(0u8, |acc, (c, s)| acc | (c ^ s))
            == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_matches_known_vectors() {
        assert_eq!(
            sha256_hex(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            sha256_hex("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn digest_is_deterministic_and_fixed_length() {
        let first = sha256_hex("secret1");
        let second = sha256_hex("secret1");
        assert_eq!(first, second);
        assert_eq!(first.len(), DIGEST_HEX_LEN);
        assert_eq!(sha256_hex("a much longer passphrase than usual").len(), DIGEST_HEX_LEN);
    }

    #[test]
    fn digest_does_not_contain_plaintext() {
        let hash = sha256_hex("hunter2");
        assert!(!hash.contains("hunter2"));
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn verify_accepts_only_the_original_password() {
        let stored = sha256_hex("secret1");
        assert!(verify("secret1", &stored));
        assert!(!verify("secret2", &stored));
        assert!(!verify("Secret1", &stored));
        assert!(!verify("", &stored));
    }

    #[test]
    fn verify_rejects_truncated_or_padded_digests() {
        let stored = sha256_hex("secret1");
        assert!(!verify("secret1", &stored[..DIGEST_HEX_LEN - 1]));
        assert!(!verify("secret1", &format!("{stored}0")));
        assert!(!verify("secret1", ""));
    }

    #[test]
    fn digests_differing_in_one_byte_do_not_match() {
        let digest = sha256_hex("secret1");
        let mut flipped = digest.clone().into_bytes();
        flipped[DIGEST_HEX_LEN - 1] = if flipped[DIGEST_HEX_LEN - 1] == b'0' { b'1' } else { b'0' };

        assert!(digests_match(digest.as_bytes(), digest.as_bytes()));
        assert!(!digests_match(digest.as_bytes(), &flipped));
        assert!(!digests_match(digest.as_bytes(), sha256_hex("secret2").as_bytes()));
    }
}
