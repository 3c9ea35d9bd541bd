use crate::*;

/// Events appended to the ledger's log, consumed by off-ledger indexers
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum Event {
    KeyAnnounced {
        identity: Address,
        #[serde(with = "Bytes32Hex")]
        pub_key: Bytes32,
    },
    ProposalCreated {
        proposal_id: ProposalId,
        proposer: Address,
        context: String,
        is_public: bool,
        commit_deadline: Timestamp,
        reveal_deadline: Timestamp,
    },
    VoterInvited {
        proposal_id: ProposalId,
        voter: Address,
        #[serde(with = "BytesHex")]
        encrypted_salt: Vec<u8>,
    },
    VoteCommitted {
        proposal_id: ProposalId,
        voter: Address,
        #[serde(with = "Bytes32Hex")]
        commitment: Bytes32,
    },
    SaltRevealed {
        proposal_id: ProposalId,
        voter: Address,
        #[serde(with = "Bytes32Hex")]
        one_time_salt: Bytes32,
    },
    ProposalFinished {
        proposal_id: ProposalId,
    },
}

impl Event {
    /// The proposal this event belongs to, if any
    pub fn proposal_id(&self) -> Option<ProposalId> {
        match self {
            Event::KeyAnnounced { .. } => None,
            Event::ProposalCreated { proposal_id, .. }
            | Event::VoterInvited { proposal_id, .. }
            | Event::VoteCommitted { proposal_id, .. }
            | Event::SaltRevealed { proposal_id, .. }
            | Event::ProposalFinished { proposal_id } => Some(*proposal_id),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Event::KeyAnnounced { .. } => "key_announced",
            Event::ProposalCreated { .. } => "proposal_created",
            Event::VoterInvited { .. } => "voter_invited",
            Event::VoteCommitted { .. } => "vote_committed",
            Event::SaltRevealed { .. } => "salt_revealed",
            Event::ProposalFinished { .. } => "proposal_finished",
        }
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Event::KeyAnnounced { identity, pub_key } => {
                write!(f, "key_announced {} {}", identity, hex::encode(pub_key))
            }
            Event::ProposalCreated {
                proposal_id,
                proposer,
                context,
                is_public,
                commit_deadline,
                reveal_deadline,
            } => write!(
                f,
                "proposal_created #{} by {} public={} commit_deadline={} reveal_deadline={} {:?}",
                proposal_id, proposer, is_public, commit_deadline, reveal_deadline, context
            ),
            Event::VoterInvited {
                proposal_id,
                voter,
                encrypted_salt,
            } => write!(
                f,
                "voter_invited #{} {} ({} byte salt payload)",
                proposal_id,
                voter,
                encrypted_salt.len()
            ),
            Event::VoteCommitted {
                proposal_id,
                voter,
                commitment,
            } => write!(
                f,
                "vote_committed #{} {} {}",
                proposal_id,
                voter,
                hex::encode(commitment)
            ),
            Event::SaltRevealed {
                proposal_id,
                voter,
                one_time_salt,
            } => write!(
                f,
                "salt_revealed #{} {} {}",
                proposal_id,
                voter,
                hex::encode(one_time_salt)
            ),
            Event::ProposalFinished { proposal_id } => {
                write!(f, "proposal_finished #{}", proposal_id)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = Event::VoterInvited {
            proposal_id: 3,
            voter: Address([5; 20]),
            encrypted_salt: vec![0xde, 0xad],
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"voter_invited\""));
        assert!(json.contains("\"encrypted_salt\":\"dead\""));
        assert_eq!(serde_json::from_str::<Event>(&json).unwrap(), event);

        assert_eq!(event.proposal_id(), Some(3));
        assert_eq!(event.name(), "voter_invited");

        let announced = Event::KeyAnnounced {
            identity: Address([5; 20]),
            pub_key: [1; 32],
        };
        assert_eq!(announced.proposal_id(), None);
    }
}
