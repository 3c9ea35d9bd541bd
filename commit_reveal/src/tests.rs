use super::*;
use ed25519_dalek::SigningKey;

struct Participant {
    secret: SigningKey,
    encryption_secret: x25519_dalek::StaticSecret,
    encryption_public: x25519_dalek::PublicKey,
    address: Address,
}

impl Participant {
    fn new() -> Self {
        let (secret, public) = generate_keypair();
        let (encryption_secret, encryption_public) = ecies::generate_keypair();
        Participant {
            secret,
            encryption_secret,
            encryption_public,
            address: Address::from_public_key(&public),
        }
    }

    fn send<T: Into<Transaction>>(
        &self,
        ledger: &mut Ledger,
        clock: &ManualClock,
        tx: T,
    ) -> Result<Receipt, Error> {
        let signed = tx.into().sign(&self.secret)?;
        ledger.apply(&signed, clock.now())
    }
}

#[test]
fn end_to_end_private_proposal() {
    let clock = ManualClock::new(1_700_000_000);
    let mut ledger = Ledger::new();

    let proposer = Participant::new();
    let alice = Participant::new();
    let bob = Participant::new();

    // Voters announce their encryption keys
    for voter in [&alice, &bob].iter() {
        voter
            .send(
                &mut ledger,
                &clock,
                AnnounceKeyTransaction {
                    pub_key: voter.encryption_public.to_bytes(),
                },
            )
            .unwrap();
    }

    // The proposer deals the common salt and opens the proposal
    let voters = vec![alice.address, bob.address];
    let common_salt = generate_salt();
    let payloads = deal_common_salt(&ledger, &voters, &common_salt, false).unwrap();
    let receipt = proposer
        .send(
            &mut ledger,
            &clock,
            CreateProposalTransaction::new("adopt the new charter", voters, payloads, 3600, 3600),
        )
        .unwrap();
    let id = match receipt {
        Receipt::Created(id) => id,
        other => panic!("unexpected receipt {:?}", other),
    };

    // The common salt never appears on the ledger in the clear
    let snapshot = ledger.to_json().unwrap();
    assert!(!snapshot.contains(&hex::encode(common_salt)));

    // Each voter recovers the common salt from their own invitation and commits
    let mut reveals = vec![];
    for (voter, vote) in [(&alice, Vote::Aye), (&bob, Vote::Nay)].iter() {
        let recovered = recover_common_salt(
            &ledger,
            id,
            &voter.address,
            Some(&voter.encryption_secret),
        )
        .unwrap();
        assert_eq!(recovered, common_salt);

        let (commitment, one_time_salt) = prepare_commitment(*vote, &recovered);
        voter
            .send(
                &mut ledger,
                &clock,
                CommitVoteTransaction {
                    proposal_id: id,
                    commitment,
                },
            )
            .unwrap();
        reveals.push((*voter, one_time_salt));
    }
    assert_eq!(ledger.get_reveal_progress(id).unwrap(), (2, 0, 2));

    // Too early to reveal
    let (voter, salt) = reveals[0];
    let early = voter.send(
        &mut ledger,
        &clock,
        RevealSaltTransaction {
            proposal_id: id,
            one_time_salt: salt,
        },
    );
    assert!(matches!(
        early,
        Err(Error::Ledger(LedgerError::NotInRevealPhase))
    ));

    clock.advance(3601);
    assert!(ledger.is_reveal_open(id, clock.now()).unwrap());

    for (voter, salt) in reveals.iter() {
        voter
            .send(
                &mut ledger,
                &clock,
                RevealSaltTransaction {
                    proposal_id: id,
                    one_time_salt: *salt,
                },
            )
            .unwrap();
    }

    // Every committer revealed, so the proposal closed itself
    let proposal = ledger.get_proposal(id).unwrap();
    assert_eq!(proposal.phase, Phase::Finished);
    assert_eq!(
        ledger
            .proposal_events(id)
            .iter()
            .filter(|e| matches!(e, Event::ProposalFinished { .. }))
            .count(),
        1
    );

    let result = tally(&ledger, id, &common_salt).unwrap();
    assert_eq!((result.aye, result.nay, result.abstain), (1, 1, 0));
    assert!(result.invalid.is_empty());
    assert_eq!(result.votes.get(&alice.address), Some(&Vote::Aye));
    assert_eq!(result.votes.get(&bob.address), Some(&Vote::Nay));
}

#[test]
fn soft_deadline_and_public_finalize() {
    let clock = ManualClock::new(50_000);
    let mut ledger = Ledger::new();

    let proposer = Participant::new();
    let alice = Participant::new();
    let bob = Participant::new();
    let stranger = Participant::new();

    let voters = vec![alice.address, bob.address];
    let common_salt = generate_salt();
    let payloads = deal_common_salt(&ledger, &voters, &common_salt, true).unwrap();
    let mut create = CreateProposalTransaction::new("public poll", voters, payloads, 100, 100);
    create.is_public = true;
    proposer.send(&mut ledger, &clock, create).unwrap();

    let common = recover_common_salt(&ledger, 0, &bob.address, None).unwrap();
    assert_eq!(common, common_salt);

    let (alice_commitment, alice_salt) = prepare_commitment(Vote::Abstain, &common);
    let (bob_commitment, _bob_salt) = prepare_commitment(Vote::Aye, &common);
    alice
        .send(
            &mut ledger,
            &clock,
            CommitVoteTransaction {
                proposal_id: 0,
                commitment: alice_commitment,
            },
        )
        .unwrap();
    bob.send(
        &mut ledger,
        &clock,
        CommitVoteTransaction {
            proposal_id: 0,
            commitment: bob_commitment,
        },
    )
    .unwrap();

    clock.advance(150);
    alice
        .send(
            &mut ledger,
            &clock,
            RevealSaltTransaction {
                proposal_id: 0,
                one_time_salt: alice_salt,
            },
        )
        .unwrap();

    // Not yet past the reveal deadline
    let finalize = FinalizeProposalTransaction { proposal_id: 0 };
    assert!(matches!(
        stranger.send(&mut ledger, &clock, finalize.clone()),
        Err(Error::Ledger(LedgerError::RevealPhaseNotEnded))
    ));

    clock.advance(51);
    stranger
        .send(&mut ledger, &clock, finalize.clone())
        .unwrap();
    assert_eq!(ledger.get_proposal(0).unwrap().phase, Phase::Finished);
    assert_eq!(ledger.get_reveal_progress(0).unwrap(), (2, 1, 1));

    assert!(matches!(
        stranger.send(&mut ledger, &clock, finalize),
        Err(Error::Ledger(LedgerError::AlreadyFinished))
    ));

    let result = tally(&ledger, 0, &common_salt).unwrap();
    assert_eq!(result.abstain, 1);
    assert_eq!(result.unrevealed, 1);
}

#[test]
fn privacy_without_common_salt() {
    let one_time_salt = generate_salt();
    let common_salt = generate_salt();
    let commitment = compute_commitment(Vote::Aye, &one_time_salt, &common_salt);

    // An observer sees the commitment and the revealed one-time salt only
    for _ in 0..16 {
        assert_eq!(verify_vote(&commitment, &one_time_salt, &generate_salt()), None);
    }

    // A group member holding the common salt recovers the vote
    assert_eq!(
        verify_vote(&commitment, &one_time_salt, &common_salt),
        Some(Vote::Aye)
    );
}
