use crate::*;
use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use num_enum::TryFromPrimitive;
use serde::Serialize;
use std::ops::Deref;

/// Register the caller's salt-box encryption key
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AnnounceKeyTransaction {
    #[serde(with = "Bytes32Hex")]
    pub pub_key: Bytes32,
}

/// Open a new proposal to a fixed set of voters
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CreateProposalTransaction {
    pub context: String,
    pub voters: Vec<Address>,

    /// One opaque payload per voter, in voter order. Passed through to
    /// `VoterInvited` events untouched.
    #[serde(with = "PayloadListHex")]
    pub encrypted_salts: Vec<Vec<u8>>,

    pub is_public: bool,

    /// Seconds from creation until the commit deadline
    pub commit_duration: u64,

    /// Seconds from the commit deadline until the reveal deadline
    pub reveal_duration: u64,
}

impl CreateProposalTransaction {
    /// A private proposal; set `is_public` for plaintext salt distribution
    pub fn new(
        context: impl Into<String>,
        voters: Vec<Address>,
        encrypted_salts: Vec<Vec<u8>>,
        commit_duration: u64,
        reveal_duration: u64,
    ) -> Self {
        CreateProposalTransaction {
            context: context.into(),
            voters,
            encrypted_salts,
            is_public: false,
            commit_duration,
            reveal_duration,
        }
    }
}

/// Publish a commitment during the commit phase
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CommitVoteTransaction {
    pub proposal_id: ProposalId,

    #[serde(with = "Bytes32Hex")]
    pub commitment: Bytes32,
}

/// Disclose the one-time salt behind an earlier commitment
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RevealSaltTransaction {
    pub proposal_id: ProposalId,

    #[serde(with = "Bytes32Hex")]
    pub one_time_salt: Bytes32,
}

/// Close a proposal after its reveal deadline. Anyone may send this.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct FinalizeProposalTransaction {
    pub proposal_id: ProposalId,
}

/// An unsigned transaction
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum Transaction {
    AnnounceKey(AnnounceKeyTransaction),
    CreateProposal(CreateProposalTransaction),
    CommitVote(CommitVoteTransaction),
    RevealSalt(RevealSaltTransaction),
    FinalizeProposal(FinalizeProposalTransaction),
}

impl Transaction {
    /// Get the transaction type
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            Transaction::AnnounceKey(_) => TransactionType::AnnounceKey,
            Transaction::CreateProposal(_) => TransactionType::CreateProposal,
            Transaction::CommitVote(_) => TransactionType::CommitVote,
            Transaction::RevealSalt(_) => TransactionType::RevealSalt,
            Transaction::FinalizeProposal(_) => TransactionType::FinalizeProposal,
        }
    }

    /// Sign this transaction, producing a SignedTransaction
    pub fn sign(self, secret: &SigningKey) -> Result<SignedTransaction, Error> {
        Ok(match self {
            Transaction::AnnounceKey(tx) => Signed::sign(secret, tx)?.into(),
            Transaction::CreateProposal(tx) => Signed::sign(secret, tx)?.into(),
            Transaction::CommitVote(tx) => Signed::sign(secret, tx)?.into(),
            Transaction::RevealSalt(tx) => Signed::sign(secret, tx)?.into(),
            Transaction::FinalizeProposal(tx) => Signed::sign(secret, tx)?.into(),
        })
    }
}

/// A signed transaction
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum SignedTransaction {
    AnnounceKey(Signed<AnnounceKeyTransaction>),
    CreateProposal(Signed<CreateProposalTransaction>),
    CommitVote(Signed<CommitVoteTransaction>),
    RevealSalt(Signed<RevealSaltTransaction>),
    FinalizeProposal(Signed<FinalizeProposalTransaction>),
}

impl SignedTransaction {
    /// Get the transaction type
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            SignedTransaction::AnnounceKey(_) => TransactionType::AnnounceKey,
            SignedTransaction::CreateProposal(_) => TransactionType::CreateProposal,
            SignedTransaction::CommitVote(_) => TransactionType::CommitVote,
            SignedTransaction::RevealSalt(_) => TransactionType::RevealSalt,
            SignedTransaction::FinalizeProposal(_) => TransactionType::FinalizeProposal,
        }
    }

    /// Pack into bytes
    pub fn as_bytes(&self) -> Result<Vec<u8>, Error> {
        Ok(serde_cbor::to_vec(self)?)
    }

    /// Unpack from JSON or CBOR bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        unpack(bytes)
    }

    /// The identity that signed this transaction
    pub fn caller(&self) -> Address {
        match self {
            SignedTransaction::AnnounceKey(signed) => signed.caller(),
            SignedTransaction::CreateProposal(signed) => signed.caller(),
            SignedTransaction::CommitVote(signed) => signed.caller(),
            SignedTransaction::RevealSalt(signed) => signed.caller(),
            SignedTransaction::FinalizeProposal(signed) => signed.caller(),
        }
    }

    pub fn verify_signature(&self) -> Result<(), Error> {
        match self {
            SignedTransaction::AnnounceKey(signed) => signed.verify_signature(),
            SignedTransaction::CreateProposal(signed) => signed.verify_signature(),
            SignedTransaction::CommitVote(signed) => signed.verify_signature(),
            SignedTransaction::RevealSalt(signed) => signed.verify_signature(),
            SignedTransaction::FinalizeProposal(signed) => signed.verify_signature(),
        }
    }
}

/// This trait should be considered sealed and should not be implemented outside this crate
#[doc(hidden)]
pub trait Signable: Serialize + Sized {
    fn transaction_type(&self) -> TransactionType;

    /// The message that gets signed: the type tag followed by the CBOR body
    fn signing_bytes(&self) -> Result<Vec<u8>, Error> {
        let mut bytes = vec![self.transaction_type() as u8];
        bytes.extend(serde_cbor::to_vec(self)?);
        Ok(bytes)
    }
}

/// A generic signed transaction
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Signed<T: Signable> {
    pub tx: T,

    #[serde(with = "EdPublicKeyHex")]
    pub signer: VerifyingKey,

    #[serde(with = "EdSignatureHex")]
    pub sig: Signature,
}

impl<T: Signable> Signed<T> {
    /// Sign a transaction, producing a Signed<T>
    pub fn sign(secret: &SigningKey, transaction: T) -> Result<Self, Error> {
        let message = transaction.signing_bytes()?;
        let sig = secret.sign(&message);

        Ok(Signed {
            tx: transaction,
            signer: secret.verifying_key(),
            sig,
        })
    }

    /// Verify the signature on a signed transaction
    pub fn verify_signature(&self) -> Result<(), Error> {
        let message = self.tx.signing_bytes()?;
        Ok(self.signer.verify_strict(&message, &self.sig)?)
    }

    /// The identity this transaction acts as
    pub fn caller(&self) -> Address {
        Address::from_public_key(&self.signer)
    }

    /// Get the inner unsigned transaction
    pub fn inner(&self) -> &T {
        &self.tx
    }
}

impl<T: Signable> AsRef<T> for Signed<T> {
    fn as_ref(&self) -> &T {
        &self.tx
    }
}

impl<T: Signable> Deref for Signed<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.tx
    }
}

/// A transaction type
#[derive(Serialize, Deserialize, TryFromPrimitive, Copy, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum TransactionType {
    AnnounceKey = 1,
    CreateProposal = 2,
    CommitVote = 3,
    RevealSalt = 4,
    FinalizeProposal = 5,
}

impl TransactionType {
    pub fn name(&self) -> &'static str {
        match self {
            TransactionType::AnnounceKey => "announce_key",
            TransactionType::CreateProposal => "create_proposal",
            TransactionType::CommitVote => "commit_vote",
            TransactionType::RevealSalt => "reveal_salt",
            TransactionType::FinalizeProposal => "finalize_proposal",
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// Automatic translation between types
// ----------------------------------

macro_rules! transaction_conversions {
    ($($variant:ident => $tx:ty),* $(,)?) => {
        $(
            impl Signable for $tx {
                fn transaction_type(&self) -> TransactionType {
                    TransactionType::$variant
                }
            }

            impl From<$tx> for Transaction {
                fn from(tx: $tx) -> Self {
                    Transaction::$variant(tx)
                }
            }

            impl From<Signed<$tx>> for SignedTransaction {
                fn from(tx: Signed<$tx>) -> Self {
                    SignedTransaction::$variant(tx)
                }
            }
        )*
    };
}

transaction_conversions! {
    AnnounceKey => AnnounceKeyTransaction,
    CreateProposal => CreateProposalTransaction,
    CommitVote => CommitVoteTransaction,
    RevealSalt => RevealSaltTransaction,
    FinalizeProposal => FinalizeProposalTransaction,
}

/// Decode JSON (anything starting with `{`) or else CBOR
pub(crate) fn unpack<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, Error> {
    match bytes.iter().find(|b| !b.is_ascii_whitespace()) {
        Some(b'{') => Ok(serde_json::from_slice(bytes)?),
        Some(_) => Ok(serde_cbor::from_slice(bytes)?),
        None => Err(Error::DeserializationUnknownFormat),
    }
}

// a single-purpose type for use in `#[serde(with)]`
enum PayloadListHex {}

impl PayloadListHex {
    fn serialize<S: serde::Serializer>(
        payloads: &[Vec<u8>],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let hexed: Vec<String> = payloads.iter().map(hex::encode).collect();
        hexed.serialize(serializer)
    }

    fn deserialize<'de, D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Vec<u8>>, D::Error> {
        use serde::de::Error as _;
        let hexed: Vec<String> = serde::Deserialize::deserialize(deserializer)?;
        hexed
            .iter()
            .map(|s| hex::decode(s).map_err(D::Error::custom))
            .collect()
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn test_transaction_type() {
        assert!(TransactionType::AnnounceKey as u8 == 1);
        assert!(TransactionType::CreateProposal as u8 == 2);
        assert!(TransactionType::CommitVote as u8 == 3);
        assert!(TransactionType::RevealSalt as u8 == 4);
        assert!(TransactionType::FinalizeProposal as u8 == 5);
        assert_eq!(
            TransactionType::try_from_primitive(3).unwrap(),
            TransactionType::CommitVote
        );
        assert_eq!(format!("{}", TransactionType::RevealSalt), "reveal_salt");
    }

    #[test]
    fn test_sign_and_verify() {
        let (secret, public) = generate_keypair();

        let tx = Transaction::from(CommitVoteTransaction {
            proposal_id: 4,
            commitment: [3; 32],
        });
        assert_eq!(tx.transaction_type(), TransactionType::CommitVote);

        let signed = tx.sign(&secret).unwrap();
        assert_eq!(signed.transaction_type(), TransactionType::CommitVote);
        assert_eq!(signed.caller(), Address::from_public_key(&public));
        signed.verify_signature().unwrap();

        // Round trip through both wire formats keeps the signature valid
        let cbor = signed.as_bytes().unwrap();
        let from_cbor = SignedTransaction::from_bytes(&cbor).unwrap();
        from_cbor.verify_signature().unwrap();

        let json = serde_json::to_vec(&signed).unwrap();
        let from_json = SignedTransaction::from_bytes(&json).unwrap();
        from_json.verify_signature().unwrap();
        assert_eq!(from_json.caller(), signed.caller());

        assert!(matches!(
            SignedTransaction::from_bytes(b"  "),
            Err(Error::DeserializationUnknownFormat)
        ));
    }

    #[test]
    fn test_tampered_transaction_fails() {
        let (secret, _public) = generate_keypair();
        let mut signed = Signed::sign(
            &secret,
            RevealSaltTransaction {
                proposal_id: 0,
                one_time_salt: [1; 32],
            },
        )
        .unwrap();
        signed.verify_signature().unwrap();

        signed.tx.one_time_salt = [2; 32];
        assert!(matches!(
            signed.verify_signature(),
            Err(Error::SignatureError(_))
        ));

        // A different signer key does not match the signature
        let (_other_secret, other_public) = generate_keypair();
        signed.tx.one_time_salt = [1; 32];
        signed.signer = other_public;
        assert!(signed.verify_signature().is_err());
    }

    #[test]
    fn test_create_proposal_json() {
        let voter = Address([9; 20]);
        let tx =
            CreateProposalTransaction::new("budget", vec![voter], vec![vec![0xca, 0xfe]], 60, 60);
        assert!(!tx.is_public);

        let json = serde_json::to_string(&Transaction::from(tx.clone())).unwrap();
        assert!(json.contains("\"type\":\"create_proposal\""));
        assert!(json.contains("\"encrypted_salts\":[\"cafe\"]"));

        let back: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Transaction::CreateProposal(tx));
    }
}
