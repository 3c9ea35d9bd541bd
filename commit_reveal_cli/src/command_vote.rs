use crate::state::{load_ledger_for_update, submit};
use crate::Config;
use commit_reveal::*;

pub fn command_commit(matches: &clap::ArgMatches, config: &Config) {
    let proposal_id: ProposalId = crate::required_arg("commit", matches, "PROPOSAL-ID");
    let vote: Vote = crate::required_arg("commit", matches, "VOTE");

    let (_lock, mut ledger) = load_ledger_for_update("commit", &config.ledger_path);
    let common_salt = common_salt("commit", matches, config, &ledger, proposal_id);

    let (commitment, one_time_salt) = prepare_commitment(vote, &common_salt);
    submit(
        "commit",
        config,
        &mut ledger,
        CommitVoteTransaction {
            proposal_id,
            commitment,
        },
        matches.is_present("print-tx"),
    );

    // The voter needs this salt again to reveal
    println!("commitment: {}", hex::encode(commitment));
    println!("one-time-salt: {}", hex::encode(one_time_salt));
}

pub fn command_reveal(matches: &clap::ArgMatches, config: &Config) {
    let proposal_id: ProposalId = crate::required_arg("reveal", matches, "PROPOSAL-ID");
    let one_time_salt = crate::bytes32_arg(
        "reveal",
        "SALT",
        &crate::expand(matches.value_of("SALT").unwrap_or_default()),
    );

    let (_lock, mut ledger) = load_ledger_for_update("reveal", &config.ledger_path);
    submit(
        "reveal",
        config,
        &mut ledger,
        RevealSaltTransaction {
            proposal_id,
            one_time_salt,
        },
        matches.is_present("print-tx"),
    );

    let proposal = ledger
        .get_proposal(proposal_id)
        .unwrap_or_else(|e| crate::fail("reveal", e));
    let (committed, revealed, _) = proposal.reveal_progress();
    println!(
        "revealed for proposal {} ({}/{} revealed, {})",
        proposal_id, revealed, committed, proposal.phase
    );
}

/// The common salt from `--common-salt`, or opened from the caller's invitation
pub fn common_salt(
    cmd: &str,
    matches: &clap::ArgMatches,
    config: &Config,
    ledger: &Ledger,
    proposal_id: ProposalId,
) -> Bytes32 {
    if let Some(value) = matches.value_of("common-salt") {
        return crate::bytes32_arg(cmd, "common-salt", value);
    }

    recover_common_salt(
        ledger,
        proposal_id,
        &config.address(cmd),
        config.encryption_key.as_ref(),
    )
    .unwrap_or_else(|e| crate::fail(cmd, e))
}
