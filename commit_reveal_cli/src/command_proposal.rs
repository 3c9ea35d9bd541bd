use crate::state::{load_ledger_for_update, submit};
use crate::Config;
use commit_reveal::*;
use x25519_dalek::PublicKey;

pub fn command_announce(matches: &clap::ArgMatches, config: &Config) {
    let encryption_key = config.encryption_key.as_ref().unwrap_or_else(|| {
        crate::fail(
            "announce",
            "provide a secret key either via --secret-key or COMMIT_REVEAL_SECRET_KEY",
        )
    });
    let pub_key = PublicKey::from(encryption_key).to_bytes();

    let (_lock, mut ledger) = load_ledger_for_update("announce", &config.ledger_path);
    submit(
        "announce",
        config,
        &mut ledger,
        AnnounceKeyTransaction { pub_key },
        matches.is_present("print-tx"),
    );

    println!(
        "announced {} for {}",
        hex::encode(pub_key),
        config.address("announce")
    );
}

pub fn command_propose(matches: &clap::ArgMatches, config: &Config) {
    let context = crate::expand(matches.value_of("CONTEXT").unwrap_or_default());
    let voters: Vec<Address> = matches
        .values_of("voter")
        .map(|values| {
            values
                .map(|v| {
                    v.parse()
                        .unwrap_or_else(|e| crate::fail("propose", format!("invalid voter {}: {}", v, e)))
                })
                .collect()
        })
        .unwrap_or_default();
    let commit_duration: u64 = crate::required_arg("propose", matches, "commit-duration");
    let reveal_duration: u64 = crate::required_arg("propose", matches, "reveal-duration");
    let is_public = matches.is_present("public");

    let (_lock, mut ledger) = load_ledger_for_update("propose", &config.ledger_path);

    let common_salt = generate_salt();
    let encrypted_salts = deal_common_salt(&ledger, &voters, &common_salt, is_public)
        .unwrap_or_else(|e| crate::fail("propose", e));

    let mut tx = CreateProposalTransaction::new(
        context,
        voters,
        encrypted_salts,
        commit_duration,
        reveal_duration,
    );
    tx.is_public = is_public;

    let receipt = submit("propose", config, &mut ledger, tx, matches.is_present("print-tx"));
    if let Receipt::Created(proposal_id) = receipt {
        println!("proposal-id: {}", proposal_id);
    }
    println!("common-salt: {}", hex::encode(common_salt));
}

pub fn command_finalize(matches: &clap::ArgMatches, config: &Config) {
    let proposal_id: ProposalId = crate::required_arg("finalize", matches, "PROPOSAL-ID");

    let (_lock, mut ledger) = load_ledger_for_update("finalize", &config.ledger_path);
    submit(
        "finalize",
        config,
        &mut ledger,
        FinalizeProposalTransaction { proposal_id },
        matches.is_present("print-tx"),
    );

    let (committed, revealed, unrevealed) = ledger
        .get_reveal_progress(proposal_id)
        .unwrap_or_else(|e| crate::fail("finalize", e));
    println!(
        "proposal {} finished: {} committed, {} revealed, {} unrevealed",
        proposal_id, committed, revealed, unrevealed
    );
}
