//! The commit-reveal ledger.
//!
//! Every operation either applies in full or fails with a `LedgerError` and
//! leaves state untouched. Checks run against an immutable view first; state
//! is only written once every precondition has passed.

use crate::*;
use log::{debug, info, warn};
use std::collections::{BTreeMap, BTreeSet};
use std::convert::TryFrom;

/// An announced salt-box encryption key
#[derive(Serialize, Deserialize, Copy, Debug, Clone, PartialEq, Eq)]
pub struct RegisteredKey {
    #[serde(with = "Bytes32Hex")]
    pub pub_key: Bytes32,
    pub announced_at: Timestamp,
}

/// Outcome of a successfully applied transaction
#[derive(Copy, Debug, Clone, PartialEq, Eq)]
pub enum Receipt {
    /// A proposal was created with this id
    Created(ProposalId),
    Applied,
}

/// The ledger: key registry, proposal table and event log
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    keys: BTreeMap<Address, RegisteredKey>,

    /// Indexed by proposal id
    proposals: Vec<Proposal>,

    events: Vec<Event>,
}

impl Ledger {
    pub fn new() -> Self {
        Ledger::default()
    }

    /// Register (or replace) the caller's encryption key
    pub fn announce_key(&mut self, ctx: &Context, pub_key: Bytes32) -> Result<(), LedgerError> {
        if is_zero(&pub_key) {
            return Err(LedgerError::ZeroPubKey);
        }

        self.keys.insert(
            ctx.caller,
            RegisteredKey {
                pub_key,
                announced_at: ctx.now,
            },
        );
        debug!("key announced by {}", ctx.caller);
        self.events.push(Event::KeyAnnounced {
            identity: ctx.caller,
            pub_key,
        });

        Ok(())
    }

    /// Open a new proposal in the commit phase and invite its voters
    pub fn create_proposal(
        &mut self,
        ctx: &Context,
        tx: &CreateProposalTransaction,
    ) -> Result<ProposalId, LedgerError> {
        if tx.voters.is_empty() {
            return Err(LedgerError::NoVoters);
        }
        if tx.voters.len() != tx.encrypted_salts.len() {
            return Err(LedgerError::ArrayLengthMismatch);
        }
        if tx.commit_duration == 0 || tx.reveal_duration == 0 {
            return Err(LedgerError::InvalidDuration);
        }

        // Deadlines past the end of time count as invalid durations
        let commit_deadline = ctx
            .now
            .checked_add(tx.commit_duration)
            .ok_or(LedgerError::InvalidDuration)?;
        let reveal_deadline = commit_deadline
            .checked_add(tx.reveal_duration)
            .ok_or(LedgerError::InvalidDuration)?;

        let id = self.proposals.len() as ProposalId;
        let voters = tx
            .voters
            .iter()
            .map(|voter| (*voter, VoterRecord::default()))
            .collect();

        self.proposals.push(Proposal {
            id,
            proposer: ctx.caller,
            context: tx.context.clone(),
            phase: Phase::Commit,
            is_public: tx.is_public,
            created_at: ctx.now,
            commit_deadline,
            reveal_deadline,
            commit_count: 0,
            reveal_count: 0,
            voters,
        });

        self.events.push(Event::ProposalCreated {
            proposal_id: id,
            proposer: ctx.caller,
            context: tx.context.clone(),
            is_public: tx.is_public,
            commit_deadline,
            reveal_deadline,
        });
        // A repeated voter keeps the payload of their first entry
        let mut invited = BTreeSet::new();
        for (voter, encrypted_salt) in tx.voters.iter().zip(tx.encrypted_salts.iter()) {
            if !invited.insert(*voter) {
                continue;
            }
            self.events.push(Event::VoterInvited {
                proposal_id: id,
                voter: *voter,
                encrypted_salt: encrypted_salt.clone(),
            });
        }

        info!(
            "proposal {} created by {} with {} voters (commit until {}, reveal until {})",
            id,
            ctx.caller,
            invited.len(),
            commit_deadline,
            reveal_deadline
        );

        Ok(id)
    }

    /// Store the caller's commitment
    pub fn commit_vote(
        &mut self,
        ctx: &Context,
        proposal_id: ProposalId,
        commitment: Bytes32,
    ) -> Result<(), LedgerError> {
        let proposal = self.proposal_mut(proposal_id)?;

        if proposal.phase != Phase::Commit {
            return Err(LedgerError::NotInCommitPhase);
        }
        if ctx.now > proposal.commit_deadline {
            return Err(LedgerError::CommitPhaseEnded);
        }
        let record = proposal
            .voters
            .get_mut(&ctx.caller)
            .ok_or(LedgerError::NotAVoter)?;
        if record.has_committed() {
            return Err(LedgerError::AlreadyCommitted);
        }

        record.committed = true;
        record.commitment = commitment;
        proposal.commit_count += 1;

        debug!("proposal {}: {} committed", proposal_id, ctx.caller);
        self.events.push(Event::VoteCommitted {
            proposal_id,
            voter: ctx.caller,
            commitment,
        });

        Ok(())
    }

    /// Disclose the caller's one-time salt.
    ///
    /// The reveal deadline is soft: reveals keep being accepted after it until
    /// someone finalizes the proposal.
    pub fn reveal_salt(
        &mut self,
        ctx: &Context,
        proposal_id: ProposalId,
        one_time_salt: Bytes32,
    ) -> Result<(), LedgerError> {
        let proposal = self.proposal_mut(proposal_id)?;
        let phase = resolve_reveal_phase(proposal, ctx.now)?;

        let record = proposal
            .voters
            .get_mut(&ctx.caller)
            .filter(|record| record.has_committed())
            .ok_or(LedgerError::NotCommitted)?;
        if record.has_revealed() {
            return Err(LedgerError::AlreadyRevealed);
        }
        if is_zero(&one_time_salt) {
            return Err(LedgerError::ZeroSalt);
        }

        record.revealed_salt = one_time_salt;
        if proposal.phase != phase {
            info!("proposal {} entered the reveal phase", proposal_id);
            proposal.phase = phase;
        }
        proposal.reveal_count += 1;
        let finished = proposal.reveal_count == proposal.commit_count;
        if finished {
            proposal.phase = Phase::Finished;
        }

        debug!("proposal {}: {} revealed", proposal_id, ctx.caller);
        self.events.push(Event::SaltRevealed {
            proposal_id,
            voter: ctx.caller,
            one_time_salt,
        });
        if finished {
            info!("proposal {} finished: every committer revealed", proposal_id);
            self.events.push(Event::ProposalFinished { proposal_id });
        }

        Ok(())
    }

    /// Close a proposal once its reveal deadline has passed. Anyone may call this.
    pub fn finalize_proposal(
        &mut self,
        ctx: &Context,
        proposal_id: ProposalId,
    ) -> Result<(), LedgerError> {
        let proposal = self.proposal_mut(proposal_id)?;

        if proposal.phase == Phase::Finished {
            return Err(LedgerError::AlreadyFinished);
        }
        if ctx.now <= proposal.reveal_deadline {
            return Err(LedgerError::RevealPhaseNotEnded);
        }

        proposal.phase = Phase::Finished;
        info!(
            "proposal {} finalized by {} with {} of {} reveals",
            proposal_id, ctx.caller, proposal.reveal_count, proposal.commit_count
        );
        self.events.push(Event::ProposalFinished { proposal_id });

        Ok(())
    }

    /// Verify and apply a signed transaction at time `now`.
    ///
    /// The caller is the identity derived from the transaction's signer.
    pub fn apply(&mut self, tx: &SignedTransaction, now: Timestamp) -> Result<Receipt, Error> {
        tx.verify_signature()?;
        let ctx = Context::new(tx.caller(), now);

        let result = match tx {
            SignedTransaction::AnnounceKey(signed) => self
                .announce_key(&ctx, signed.pub_key)
                .map(|_| Receipt::Applied),
            SignedTransaction::CreateProposal(signed) => {
                self.create_proposal(&ctx, signed.inner()).map(Receipt::Created)
            }
            SignedTransaction::CommitVote(signed) => self
                .commit_vote(&ctx, signed.proposal_id, signed.commitment)
                .map(|_| Receipt::Applied),
            SignedTransaction::RevealSalt(signed) => self
                .reveal_salt(&ctx, signed.proposal_id, signed.one_time_salt)
                .map(|_| Receipt::Applied),
            SignedTransaction::FinalizeProposal(signed) => self
                .finalize_proposal(&ctx, signed.proposal_id)
                .map(|_| Receipt::Applied),
        };

        result.map_err(|e| {
            warn!(
                "rejected {} transaction from {}: {}",
                tx.transaction_type(),
                ctx.caller,
                e
            );
            Error::from(e)
        })
    }

    /// Progress as `(committed, revealed, unrevealed)`
    pub fn get_reveal_progress(
        &self,
        proposal_id: ProposalId,
    ) -> Result<(u64, u64, u64), LedgerError> {
        Ok(self.get_proposal(proposal_id)?.reveal_progress())
    }

    /// True iff the proposal is not finished and its commit window has closed
    pub fn is_reveal_open(
        &self,
        proposal_id: ProposalId,
        now: Timestamp,
    ) -> Result<bool, LedgerError> {
        Ok(self.get_proposal(proposal_id)?.is_reveal_open(now))
    }

    /// Number of proposals ever created; also the next proposal id
    pub fn proposal_count(&self) -> u64 {
        self.proposals.len() as u64
    }

    /// All proposals, oldest first
    pub fn proposals(&self) -> &[Proposal] {
        &self.proposals
    }

    /// The eligible voters of a proposal, in invitation order
    pub fn voters(&self, proposal_id: ProposalId) -> Result<Vec<Address>, LedgerError> {
        Ok(self.get_proposal(proposal_id)?.voters.keys().copied().collect())
    }

    pub fn is_voter(&self, proposal_id: ProposalId, voter: &Address) -> Result<bool, LedgerError> {
        Ok(self.get_proposal(proposal_id)?.is_voter(voter))
    }

    /// A voter's commitment, or the zero sentinel if none is stored
    pub fn commitment_of(
        &self,
        proposal_id: ProposalId,
        voter: &Address,
    ) -> Result<Bytes32, LedgerError> {
        Ok(self
            .get_proposal(proposal_id)?
            .voter(voter)
            .map(|record| record.commitment)
            .unwrap_or(ZERO_BYTES32))
    }

    /// A voter's revealed salt, or the zero sentinel if none is stored
    pub fn revealed_salt_of(
        &self,
        proposal_id: ProposalId,
        voter: &Address,
    ) -> Result<Bytes32, LedgerError> {
        Ok(self
            .get_proposal(proposal_id)?
            .voter(voter)
            .map(|record| record.revealed_salt)
            .unwrap_or(ZERO_BYTES32))
    }

    pub fn has_committed(
        &self,
        proposal_id: ProposalId,
        voter: &Address,
    ) -> Result<bool, LedgerError> {
        Ok(self
            .get_proposal(proposal_id)?
            .voter(voter)
            .map_or(false, VoterRecord::has_committed))
    }

    pub fn has_revealed(
        &self,
        proposal_id: ProposalId,
        voter: &Address,
    ) -> Result<bool, LedgerError> {
        Ok(self
            .get_proposal(proposal_id)?
            .voter(voter)
            .map_or(false, VoterRecord::has_revealed))
    }

    /// Pack a snapshot of the whole ledger as CBOR
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        Ok(serde_cbor::to_vec(self)?)
    }

    /// Pack a snapshot of the whole ledger as pretty JSON
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a snapshot written by `to_bytes` or `to_json`.
    ///
    /// Snapshots are untrusted input: one that breaks the ledger's
    /// invariants is rejected rather than loaded.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let ledger: Ledger = unpack(bytes)?;
        ledger.validate()?;
        Ok(ledger)
    }

    /// Check the invariants every sequence of operations upholds
    pub fn validate(&self) -> Result<(), Error> {
        let invalid = |msg: String| -> Result<(), Error> { Err(Error::InvalidSnapshot(msg)) };

        for (identity, key) in self.keys.iter() {
            if is_zero(&key.pub_key) {
                return invalid(format!("zero encryption key for {}", identity));
            }
        }

        for (index, proposal) in self.proposals.iter().enumerate() {
            let id = proposal.id;
            if id != index as ProposalId {
                return invalid(format!("proposal {} stored at index {}", id, index));
            }
            if proposal.voters.is_empty() {
                return invalid(format!("proposal {} has no voters", id));
            }
            if proposal.commit_deadline <= proposal.created_at
                || proposal.reveal_deadline <= proposal.commit_deadline
            {
                return invalid(format!("proposal {} has out-of-order deadlines", id));
            }

            let mut committed = 0u64;
            let mut revealed = 0u64;
            for (voter, record) in proposal.voters.iter() {
                if record.has_revealed() && !record.has_committed() {
                    return invalid(format!(
                        "proposal {}: {} revealed without committing",
                        id, voter
                    ));
                }
                committed += record.has_committed() as u64;
                revealed += record.has_revealed() as u64;
            }

            if proposal.commit_count != committed || proposal.reveal_count != revealed {
                return invalid(format!(
                    "proposal {} counters ({}, {}) disagree with its voter records ({}, {})",
                    id, proposal.commit_count, proposal.reveal_count, committed, revealed
                ));
            }
            if proposal.reveal_count > proposal.commit_count
                || proposal.commit_count > proposal.voter_count()
            {
                return invalid(format!("proposal {} counters out of bounds", id));
            }
        }

        Ok(())
    }

    fn proposal_mut(&mut self, id: ProposalId) -> Result<&mut Proposal, LedgerError> {
        let index = usize::try_from(id).map_err(|_| LedgerError::ProposalNotFound(id))?;
        self.proposals
            .get_mut(index)
            .ok_or(LedgerError::ProposalNotFound(id))
    }
}

/// Resolve the phase a reveal-phase operation runs in.
///
/// Applies the lazy commit-to-reveal transition without storing it; callers
/// write the returned phase back only once the whole operation has passed
/// its checks.
fn resolve_reveal_phase(proposal: &Proposal, now: Timestamp) -> Result<Phase, LedgerError> {
    match proposal.resolved_phase(now) {
        Phase::Finished => Err(LedgerError::AlreadyFinished),
        Phase::Commit => Err(LedgerError::NotInRevealPhase),
        Phase::Reveal => Ok(Phase::Reveal),
    }
}

impl Store for Ledger {
    fn proposal(&self, id: ProposalId) -> Option<&Proposal> {
        usize::try_from(id)
            .ok()
            .and_then(|index| self.proposals.get(index))
    }

    fn encryption_key(&self, identity: &Address) -> Option<Bytes32> {
        self.keys.get(identity).map(|key| key.pub_key)
    }

    fn events(&self) -> &[Event] {
        &self.events
    }
}
