use crate::*;
use ed25519_dalek::{SigningKey, VerifyingKey};
use sha3::{Digest, Keccak256};

/// A fixed 32-byte value: commitments, salts and encryption keys
pub type Bytes32 = [u8; 32];

/// Sequential proposal identifier, starting at 0
pub type ProposalId = u64;

/// Ledger time in seconds
pub type Timestamp = u64;

/// The all-zero sentinel meaning "not set"
pub const ZERO_BYTES32: Bytes32 = [0u8; 32];

pub fn is_zero(bytes: &Bytes32) -> bool {
    bytes == &ZERO_BYTES32
}

/// Keccak-256 over the concatenation of `parts`, with no length prefixes
pub fn keccak256(parts: &[&[u8]]) -> Bytes32 {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// Generate an ed25519 keypair used to sign transactions
pub fn generate_keypair() -> (SigningKey, VerifyingKey) {
    let mut csprng = rand::rngs::OsRng {};
    let secret = SigningKey::generate(&mut csprng);
    let public = secret.verifying_key();
    (secret, public)
}

/// Decode 32 bytes from hex, with or without a `0x` prefix
pub fn bytes32_from_hex(s: &str) -> Result<Bytes32, Error> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(s).map_err(|_| Error::KeyBadHex)?;
    let len = bytes.len();
    bytes.try_into().map_err(|_| Error::KeyBadLen(32, len))
}

/// Parse a hex-encoded ed25519 signing key
pub fn signing_key_from_hex(s: &str) -> Result<SigningKey, Error> {
    Ok(SigningKey::from_bytes(&bytes32_from_hex(s)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes32_from_hex() {
        let hexed = hex::encode([7u8; 32]);
        assert_eq!(bytes32_from_hex(&hexed).unwrap(), [7u8; 32]);
        assert_eq!(
            bytes32_from_hex(&format!("0x{}", hexed)).unwrap(),
            [7u8; 32]
        );

        assert!(matches!(bytes32_from_hex("zz"), Err(Error::KeyBadHex)));
        assert!(matches!(
            bytes32_from_hex("abcd"),
            Err(Error::KeyBadLen(32, 2))
        ));
    }

    #[test]
    fn test_keccak256_known_vector() {
        // Keccak-256 of the empty string
        assert_eq!(
            hex::encode(keccak256(&[])),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
        // Concatenation is unframed
        assert_eq!(keccak256(&[&b"ab"[..], &b"c"[..]]), keccak256(&[&b"abc"[..]]));
    }
}
