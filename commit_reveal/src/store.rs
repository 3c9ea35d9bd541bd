use crate::*;

/// Read access to ledger state and its event log.
///
/// Off-ledger collaborators (salt dealing, tallying, the CLI) only read
/// through this trait.
pub trait Store {
    /// Get a proposal by id
    fn proposal(&self, id: ProposalId) -> Option<&Proposal>;

    /// Get the encryption key an identity last announced
    fn encryption_key(&self, identity: &Address) -> Option<Bytes32>;

    /// The full event log, oldest first
    fn events(&self) -> &[Event];

    /// Get a proposal, or a `ProposalNotFound` error
    fn get_proposal(&self, id: ProposalId) -> Result<&Proposal, LedgerError> {
        self.proposal(id).ok_or(LedgerError::ProposalNotFound(id))
    }

    /// All events emitted for one proposal, oldest first
    fn proposal_events(&self, id: ProposalId) -> Vec<&Event> {
        self.events()
            .iter()
            .filter(|event| event.proposal_id() == Some(id))
            .collect()
    }

    /// The salt payload a voter was invited with
    fn invitation(&self, id: ProposalId, voter: &Address) -> Option<&[u8]> {
        self.events().iter().find_map(|event| match event {
            Event::VoterInvited {
                proposal_id,
                voter: invited,
                encrypted_salt,
            } if *proposal_id == id && invited == voter => Some(encrypted_salt.as_slice()),
            _ => None,
        })
    }
}
