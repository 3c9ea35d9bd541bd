use crate::*;
use ed25519_dalek::SigningKey;
use hkdf::Hkdf;
use rand::RngCore;
use sha2::Sha256;
use std::convert::TryInto;
use x25519_dalek::{PublicKey, StaticSecret};

const ENCRYPTION_KEY_INFO: &[u8] = b"commit_reveal encryption key";

/// Generate a random, non-zero 32-byte salt
pub fn generate_salt() -> Bytes32 {
    let mut csprng = rand::rngs::OsRng {};
    let mut salt = ZERO_BYTES32;
    while is_zero(&salt) {
        csprng.fill_bytes(&mut salt);
    }
    salt
}

/// Derive the x25519 keypair an identity announces for receiving salt boxes.
///
/// Deterministic in the signing key, so one secret is enough to act as a voter.
pub fn encryption_keypair(secret: &SigningKey) -> Result<(StaticSecret, PublicKey), Error> {
    let h = Hkdf::<Sha256>::new(None, secret.as_bytes());
    let mut okm = ZERO_BYTES32;
    h.expand(ENCRYPTION_KEY_INFO, &mut okm)
        .map_err(|_| Error::KeyDerivationError)?;

    let encryption_secret = StaticSecret::from(okm);
    let encryption_public = PublicKey::from(&encryption_secret);
    Ok((encryption_secret, encryption_public))
}

/// Build the per-voter salt payloads for a new proposal, in voter order.
///
/// A public proposal hands every voter the raw common salt. A private one
/// seals it to each voter's announced encryption key, so every voter must
/// have announced one first.
pub fn deal_common_salt<S: Store>(
    store: &S,
    voters: &[Address],
    common_salt: &Bytes32,
    is_public: bool,
) -> Result<Vec<Vec<u8>>, Error> {
    if is_public {
        return Ok(voters.iter().map(|_| common_salt.to_vec()).collect());
    }

    let mut csprng = rand::rngs::OsRng {};
    voters
        .iter()
        .map(|voter| {
            let key = store
                .encryption_key(voter)
                .ok_or(Error::MissingEncryptionKey(*voter))?;
            ecies::encrypt(&PublicKey::from(key), common_salt, &mut csprng)
        })
        .collect()
}

/// Recover the common salt from a voter's invitation payload
pub fn open_common_salt(
    payload: &[u8],
    is_public: bool,
    secret: Option<&StaticSecret>,
) -> Result<Bytes32, Error> {
    let plain = if is_public {
        payload.to_vec()
    } else {
        let secret = secret.ok_or(Error::DecryptionError)?;
        ecies::decrypt(secret, payload)?
    };

    let len = plain.len();
    plain.try_into().map_err(|_| Error::InvalidSaltPayload(len))
}

/// Look up a voter's invitation in the event log and recover the common salt
pub fn recover_common_salt<S: Store>(
    store: &S,
    proposal_id: ProposalId,
    voter: &Address,
    secret: Option<&StaticSecret>,
) -> Result<Bytes32, Error> {
    let proposal = store.get_proposal(proposal_id)?;
    let payload = store
        .invitation(proposal_id, voter)
        .ok_or(Error::InvitationNotFound(proposal_id, *voter))?;

    open_common_salt(payload, proposal.is_public, secret)
}

/// Prepare a commitment with a fresh one-time salt.
///
/// Returns `(commitment, one_time_salt)`; the voter must keep the salt until
/// the reveal phase.
pub fn prepare_commitment(vote: Vote, common_salt: &Bytes32) -> (Bytes32, Bytes32) {
    let one_time_salt = generate_salt();
    (
        compute_commitment(vote, &one_time_salt, common_salt),
        one_time_salt,
    )
}
