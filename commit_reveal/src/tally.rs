use crate::*;
use indexmap::IndexMap;

/// Result of decoding every revealed vote in a proposal
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Tally {
    pub proposal_id: ProposalId,
    pub aye: u64,
    pub nay: u64,
    pub abstain: u64,

    /// Committers who have not revealed
    pub unrevealed: u64,

    /// Revealed voters whose salt does not reproduce their commitment under
    /// the given common salt
    pub invalid: Vec<Address>,

    /// Decoded vote per voter, in invitation order
    pub votes: IndexMap<Address, Vote>,
}

impl Tally {
    pub fn total(&self) -> u64 {
        self.aye + self.nay + self.abstain
    }

    fn add(&mut self, voter: Address, vote: Vote) {
        match vote {
            Vote::Aye => self.aye += 1,
            Vote::Nay => self.nay += 1,
            Vote::Abstain => self.abstain += 1,
        }
        self.votes.insert(voter, vote);
    }
}

/// Decode and count the revealed votes of a proposal.
///
/// Works in any phase; unfinished proposals simply count fewer reveals. Only
/// holders of the common salt get a meaningful result: with any other salt
/// every revealed voter lands in `invalid`.
pub fn tally<S: Store>(
    store: &S,
    proposal_id: ProposalId,
    common_salt: &Bytes32,
) -> Result<Tally, LedgerError> {
    let proposal = store.get_proposal(proposal_id)?;

    let mut tally = Tally {
        proposal_id,
        ..Tally::default()
    };

    for (voter, record) in proposal.voters.iter() {
        if !record.has_committed() {
            continue;
        }
        if !record.has_revealed() {
            tally.unrevealed += 1;
            continue;
        }
        match verify_vote(&record.commitment, &record.revealed_salt, common_salt) {
            Some(vote) => tally.add(*voter, vote),
            None => tally.invalid.push(*voter),
        }
    }

    Ok(tally)
}
