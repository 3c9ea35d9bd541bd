use crate::*;
use indexmap::IndexMap;

/// Proposal lifecycle phase
#[derive(Serialize, Deserialize, Copy, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Commit,
    Reveal,
    Finished,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            Phase::Commit => "commit",
            Phase::Reveal => "reveal",
            Phase::Finished => "finished",
        };
        write!(f, "{}", name)
    }
}

/// Per-voter slots within a proposal.
///
/// Both slots start as the zero sentinel and are written at most once.
/// A zero commitment is accepted, so `committed` records the write itself.
#[derive(Serialize, Deserialize, Copy, Debug, Clone, PartialEq, Eq, Default)]
pub struct VoterRecord {
    pub committed: bool,

    #[serde(with = "Bytes32Hex")]
    pub commitment: Bytes32,

    #[serde(with = "Bytes32Hex")]
    pub revealed_salt: Bytes32,
}

impl VoterRecord {
    pub fn has_committed(&self) -> bool {
        self.committed
    }

    pub fn has_revealed(&self) -> bool {
        !is_zero(&self.revealed_salt)
    }
}

/// A proposal and its voter table
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    pub id: ProposalId,
    pub proposer: Address,
    pub context: String,
    pub phase: Phase,
    pub is_public: bool,
    pub created_at: Timestamp,
    pub commit_deadline: Timestamp,
    pub reveal_deadline: Timestamp,
    pub commit_count: u64,
    pub reveal_count: u64,

    /// Eligible voters in invitation order, fixed at creation
    pub voters: IndexMap<Address, VoterRecord>,
}

impl Proposal {
    pub fn voter_count(&self) -> u64 {
        self.voters.len() as u64
    }

    pub fn is_voter(&self, voter: &Address) -> bool {
        self.voters.contains_key(voter)
    }

    pub fn voter(&self, voter: &Address) -> Option<&VoterRecord> {
        self.voters.get(voter)
    }

    /// The phase this proposal is in at `now`, applying the lazy
    /// commit-to-reveal transition without storing it.
    pub fn resolved_phase(&self, now: Timestamp) -> Phase {
        match self.phase {
            Phase::Commit if now > self.commit_deadline => Phase::Reveal,
            phase => phase,
        }
    }

    /// Progress as `(committed, revealed, unrevealed)`
    pub fn reveal_progress(&self) -> (u64, u64, u64) {
        (
            self.commit_count,
            self.reveal_count,
            self.commit_count - self.reveal_count,
        )
    }

    /// True once the commit window has closed and the proposal is not finished
    pub fn is_reveal_open(&self, now: Timestamp) -> bool {
        self.phase != Phase::Finished && now > self.commit_deadline
    }
}
