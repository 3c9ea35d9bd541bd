use crate::*;
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// A vote choice
///
/// The discriminant is the single byte hashed into a commitment.
#[derive(
    Serialize, Deserialize, TryFromPrimitive, IntoPrimitive, Copy, Debug, Clone, PartialEq, Eq, Hash,
)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Vote {
    Aye = 1,
    Nay = 2,
    Abstain = 3,
}

impl Vote {
    /// Every possible vote, in tag order
    pub const ALL: [Vote; 3] = [Vote::Aye, Vote::Nay, Vote::Abstain];
}

impl std::fmt::Display for Vote {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            Vote::Aye => "aye",
            Vote::Nay => "nay",
            Vote::Abstain => "abstain",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for Vote {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "aye" | "yes" | "1" => Ok(Vote::Aye),
            "nay" | "no" | "2" => Ok(Vote::Nay),
            "abstain" | "3" => Ok(Vote::Abstain),
            other => Err(format!("unknown vote '{}'", other)),
        }
    }
}

/// Compute the commitment a voter publishes during the commit phase.
///
/// `keccak256(vote_byte ‖ one_time_salt ‖ common_salt)`, packed with no
/// length prefixes. Clients on other platforms must reproduce this layout
/// byte for byte.
pub fn compute_commitment(vote: Vote, one_time_salt: &Bytes32, common_salt: &Bytes32) -> Bytes32 {
    let tag: u8 = vote.into();
    keccak256(&[&[tag][..], &one_time_salt[..], &common_salt[..]])
}

/// Recover the vote behind a commitment, given both salts.
///
/// Returns `None` if no vote reproduces the commitment, which is what an
/// observer without the common salt will see.
pub fn verify_vote(
    commitment: &Bytes32,
    revealed_salt: &Bytes32,
    common_salt: &Bytes32,
) -> Option<Vote> {
    Vote::ALL
        .iter()
        .copied()
        .find(|vote| &compute_commitment(*vote, revealed_salt, common_salt) == commitment)
}
