//! ECIES over X25519: a sealed box for handing a common salt to one voter.
//!
//! The sender generates an ephemeral X25519 key, agrees a shared secret with
//! the receiver's announced key, and derives an AES-256-GCM key from
//! `ephemeral_pk ‖ shared_secret` with HKDF-SHA256.
//!
//! Wire layout: `ephemeral_pk (32) ‖ nonce (12) ‖ ciphertext ‖ tag (16)`.

use crate::Error;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use hkdf::Hkdf;
use rand::{CryptoRng, RngCore};
use sha2::Sha256;
use x25519_dalek::{EphemeralSecret, PublicKey, StaticSecret};

pub const PUBLIC_KEY_LENGTH: usize = 32;
const AES_IV_LENGTH: usize = 12;
const AES_TAG_LENGTH: usize = 16;

/// Smallest possible sealed box: an empty message
pub const MIN_SEALED_LENGTH: usize = PUBLIC_KEY_LENGTH + AES_IV_LENGTH + AES_TAG_LENGTH;

type AesKey = [u8; 32];

/// Generate a keypair, ready for use in ECIES
pub fn generate_keypair() -> (StaticSecret, PublicKey) {
    let secret = StaticSecret::random_from_rng(rand::rngs::OsRng);
    let public = PublicKey::from(&secret);
    (secret, public)
}

/// Encrypt a message so only the holder of `receiver_pub`'s secret can read it.
pub fn encrypt<R: RngCore + CryptoRng>(
    receiver_pub: &PublicKey,
    msg: &[u8],
    rng: &mut R,
) -> Result<Vec<u8>, Error> {
    let ephemeral_sk = EphemeralSecret::random_from_rng(&mut *rng);
    let ephemeral_pk = PublicKey::from(&ephemeral_sk);

    let shared = ephemeral_sk.diffie_hellman(receiver_pub);
    let aes_key = derive_key(&ephemeral_pk, shared.as_bytes())?;
    let encrypted = aes_encrypt(&aes_key, msg, rng)?;

    let mut cipher_text = Vec::with_capacity(PUBLIC_KEY_LENGTH + encrypted.len());
    cipher_text.extend_from_slice(ephemeral_pk.as_bytes());
    cipher_text.extend(encrypted);

    Ok(cipher_text)
}

/// Decrypt a sealed box using the receiver's secret.
pub fn decrypt(receiver_sec: &StaticSecret, msg: &[u8]) -> Result<Vec<u8>, Error> {
    if msg.len() < MIN_SEALED_LENGTH {
        return Err(Error::SealedBoxTooShort(msg.len()));
    }

    let mut ephemeral_pk = [0u8; PUBLIC_KEY_LENGTH];
    ephemeral_pk.copy_from_slice(&msg[..PUBLIC_KEY_LENGTH]);
    let ephemeral_pk = PublicKey::from(ephemeral_pk);

    let shared = receiver_sec.diffie_hellman(&ephemeral_pk);
    let aes_key = derive_key(&ephemeral_pk, shared.as_bytes())?;

    aes_decrypt(&aes_key, &msg[PUBLIC_KEY_LENGTH..])
}

fn derive_key(ephemeral_pk: &PublicKey, shared: &[u8; 32]) -> Result<AesKey, Error> {
    let mut master = Vec::with_capacity(32 * 2);
    master.extend_from_slice(ephemeral_pk.as_bytes());
    master.extend_from_slice(shared);

    let h = Hkdf::<Sha256>::new(None, &master);
    let mut out = [0u8; 32];
    h.expand(&[], &mut out)
        .map_err(|_| Error::KeyDerivationError)?;
    Ok(out)
}

fn aes_encrypt<R: RngCore + CryptoRng>(
    key: &AesKey,
    msg: &[u8],
    rng: &mut R,
) -> Result<Vec<u8>, Error> {
    let aead = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));

    let mut nonce = [0u8; AES_IV_LENGTH];
    rng.fill_bytes(&mut nonce);

    let ciphertext = aead
        .encrypt(Nonce::from_slice(&nonce), msg)
        .map_err(|_| Error::EncryptionError)?;

    let mut output = Vec::with_capacity(AES_IV_LENGTH + ciphertext.len());
    output.extend_from_slice(&nonce);
    output.extend(ciphertext);

    Ok(output)
}

fn aes_decrypt(key: &AesKey, ciphertext: &[u8]) -> Result<Vec<u8>, Error> {
    let aead = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));

    let nonce = Nonce::from_slice(&ciphertext[..AES_IV_LENGTH]);
    let encrypted = &ciphertext[AES_IV_LENGTH..];

    aead.decrypt(nonce, encrypted)
        .map_err(|_| Error::DecryptionError)
}
