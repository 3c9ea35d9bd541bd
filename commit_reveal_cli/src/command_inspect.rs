use crate::state::load_ledger;
use crate::Config;
use commit_reveal::*;

pub fn command_progress(matches: &clap::ArgMatches, config: &Config) {
    let proposal_id: ProposalId = crate::required_arg("progress", matches, "PROPOSAL-ID");

    let ledger = load_ledger("progress", &config.ledger_path);
    let proposal = ledger
        .get_proposal(proposal_id)
        .unwrap_or_else(|e| crate::fail("progress", e));

    let now = SystemClock.now();
    let (committed, revealed, unrevealed) = proposal.reveal_progress();

    println!("proposal: {}", proposal.id);
    println!("context: {}", proposal.context);
    println!("phase: {}", proposal.resolved_phase(now));
    println!("voters: {}", proposal.voter_count());
    println!("committed: {}", committed);
    println!("revealed: {}", revealed);
    println!("unrevealed: {}", unrevealed);
    println!("commit-deadline: {}", proposal.commit_deadline);
    println!("reveal-deadline: {}", proposal.reveal_deadline);
    println!("reveal-open: {}", proposal.is_reveal_open(now));
}

pub fn command_show(matches: &clap::ArgMatches, config: &Config) {
    let ledger = load_ledger("show", &config.ledger_path);

    let json = match matches.value_of("PROPOSAL-ID") {
        Some(_) => {
            let proposal_id: ProposalId = crate::required_arg("show", matches, "PROPOSAL-ID");
            let proposal = ledger
                .get_proposal(proposal_id)
                .unwrap_or_else(|e| crate::fail("show", e));
            serde_json::to_string_pretty(proposal)
        }
        None => serde_json::to_string_pretty(ledger.proposals()),
    };

    println!("{}", json.unwrap_or_else(|e| crate::fail("show", e)));
}

pub fn command_events(matches: &clap::ArgMatches, config: &Config) {
    let ledger = load_ledger("events", &config.ledger_path);

    let events: Vec<&Event> = match matches.value_of("PROPOSAL-ID") {
        Some(_) => {
            let proposal_id: ProposalId = crate::required_arg("events", matches, "PROPOSAL-ID");
            ledger.proposal_events(proposal_id)
        }
        None => ledger.events().iter().collect(),
    };

    for event in events {
        if matches.is_present("json") {
            let line = serde_json::to_string(event).unwrap_or_else(|e| crate::fail("events", e));
            println!("{}", line);
        } else {
            println!("{}", event);
        }
    }
}

pub fn command_tally(matches: &clap::ArgMatches, config: &Config) {
    let proposal_id: ProposalId = crate::required_arg("tally", matches, "PROPOSAL-ID");

    let ledger = load_ledger("tally", &config.ledger_path);
    let common_salt =
        crate::command_vote::common_salt("tally", matches, config, &ledger, proposal_id);

    let result = tally(&ledger, proposal_id, &common_salt)
        .unwrap_or_else(|e| crate::fail("tally", e));

    if matches.is_present("print-votes") {
        println!("Votes:");
        for (voter, vote) in result.votes.iter() {
            println!("  {} {}", voter, vote);
        }
    }

    println!("Tally:");
    println!("  aye: {}", result.aye);
    println!("  nay: {}", result.nay);
    println!("  abstain: {}", result.abstain);
    println!("  unrevealed: {}", result.unrevealed);

    if !result.invalid.is_empty() {
        println!("Reveals that do not match their commitment:");
        for voter in result.invalid.iter() {
            println!("  {}", voter);
        }
    }
}
