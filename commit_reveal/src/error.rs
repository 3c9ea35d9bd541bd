use crate::*;

use thiserror::Error;

/// Error types
#[derive(Debug, Error)]
pub enum Error {
    #[error("commit_reveal: signature error: {0}")]
    SignatureError(#[from] ed25519_dalek::SignatureError),

    #[error("commit_reveal: invalid address - invalid hexidecimal")]
    AddressBadHex,

    #[error("commit_reveal: invalid address - wrong length")]
    AddressBadLen,

    #[error("commit_reveal: invalid key - invalid hexidecimal")]
    KeyBadHex,

    #[error("commit_reveal: invalid key - expected {0} bytes, found {1}")]
    KeyBadLen(usize, usize),

    #[error("commit_reveal: CBOR error: {0}")]
    CBOR(#[from] serde_cbor::Error),

    #[error("commit_reveal: JSON error: {0}")]
    JSON(#[from] serde_json::Error),

    #[error("commit_reveal: error deserializing: unknown format")]
    DeserializationUnknownFormat,

    #[error("commit_reveal: sealed box is too short ({0} bytes)")]
    SealedBoxTooShort(usize),

    #[error("commit_reveal: failed to derive sealed box key")]
    KeyDerivationError,

    #[error("commit_reveal: failed to encrypt salt")]
    EncryptionError,

    #[error("commit_reveal: failed to decrypt salt")]
    DecryptionError,

    #[error("commit_reveal: voter {0} has not announced an encryption key")]
    MissingEncryptionKey(Address),

    #[error("commit_reveal: salt payload must be 32 bytes, found {0}")]
    InvalidSaltPayload(usize),

    #[error("commit_reveal: no invitation for voter {1} in proposal {0}")]
    InvitationNotFound(ProposalId, Address),

    #[error("commit_reveal: invalid ledger snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("commit_reveal: transaction rejected: {0}")]
    Ledger(#[from] LedgerError),
}

/// Protocol errors raised by the ledger state machine.
///
/// A failing operation never mutates ledger state.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LedgerError {
    // Input validation
    #[error("commit_reveal ledger: at least one voter is required")]
    NoVoters,

    #[error("commit_reveal ledger: voters and encrypted salts differ in length")]
    ArrayLengthMismatch,

    #[error("commit_reveal ledger: phase durations must be greater than zero")]
    InvalidDuration,

    #[error("commit_reveal ledger: public key must not be zero")]
    ZeroPubKey,

    #[error("commit_reveal ledger: salt must not be zero")]
    ZeroSalt,

    // Phase and timing
    #[error("commit_reveal ledger: proposal is not in the commit phase")]
    NotInCommitPhase,

    #[error("commit_reveal ledger: commit phase has ended")]
    CommitPhaseEnded,

    #[error("commit_reveal ledger: proposal is not in the reveal phase")]
    NotInRevealPhase,

    #[error("commit_reveal ledger: reveal phase has not ended")]
    RevealPhaseNotEnded,

    #[error("commit_reveal ledger: proposal is already finished")]
    AlreadyFinished,

    // Authorization and per-voter state
    #[error("commit_reveal ledger: caller is not a voter for this proposal")]
    NotAVoter,

    #[error("commit_reveal ledger: caller has already committed")]
    AlreadyCommitted,

    #[error("commit_reveal ledger: caller has not committed")]
    NotCommitted,

    #[error("commit_reveal ledger: caller has already revealed")]
    AlreadyRevealed,

    // Lookup
    #[error("commit_reveal ledger: proposal {0} does not exist")]
    ProposalNotFound(ProposalId),
}
