use clap::{App, AppSettings, Arg, SubCommand};
use log::LevelFilter;
use std::fmt::Display;

mod command_inspect;
mod command_keygen;
mod command_offline;
mod command_proposal;
mod command_vote;
mod config;
mod state;

pub use config::Config;

fn main() {
    let proposal_id_arg = Arg::with_name("PROPOSAL-ID")
        .index(1)
        .required(true)
        .help("Proposal id");

    let print_tx_arg = Arg::with_name("print-tx")
        .long("print-tx")
        .help("Print the signed transaction as JSON before applying it");

    let matches = App::new("Commit-Reveal CLI")
        .version("0.1.0")
        .about("Runs commit-reveal group votes against a local ledger file")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("ledger")
                .long("ledger")
                .takes_value(true)
                .help("Ledger file - can also be set with COMMIT_REVEAL_LEDGER"),
        )
        .arg(
            Arg::with_name("secret-key")
                .long("secret-key")
                .takes_value(true)
                .help("Hex signing key - can also be set with COMMIT_REVEAL_SECRET_KEY"),
        )
        .arg(
            Arg::with_name("encryption-key")
                .long("encryption-key")
                .takes_value(true)
                .help("Hex x25519 secret for salt boxes - can also be set with COMMIT_REVEAL_ENCRYPTION_KEY"),
        )
        .arg(
            Arg::with_name("v")
                .short("v")
                .multiple(true)
                .help("Sets the level of verbosity"),
        )
        .subcommand(SubCommand::with_name("keygen").about("Generate a new identity"))
        .subcommand(
            SubCommand::with_name("announce")
                .about("Announce this identity's encryption key")
                .arg(print_tx_arg.clone()),
        )
        .subcommand(
            SubCommand::with_name("propose")
                .about("Create a proposal and deal the common salt to its voters")
                .arg(
                    Arg::with_name("CONTEXT")
                        .index(1)
                        .required(true)
                        .help("What is being voted on"),
                )
                .arg(
                    Arg::with_name("voter")
                        .long("voter")
                        .takes_value(true)
                        .multiple(true)
                        .number_of_values(1)
                        .required(true)
                        .help("Address of an eligible voter, may be repeated"),
                )
                .arg(
                    Arg::with_name("commit-duration")
                        .long("commit-duration")
                        .takes_value(true)
                        .default_value("86400")
                        .help("Length of the commit phase in seconds"),
                )
                .arg(
                    Arg::with_name("reveal-duration")
                        .long("reveal-duration")
                        .takes_value(true)
                        .default_value("86400")
                        .help("Length of the reveal phase in seconds"),
                )
                .arg(
                    Arg::with_name("public")
                        .long("public")
                        .help("Publish the common salt instead of sealing it to each voter"),
                )
                .arg(print_tx_arg.clone()),
        )
        .subcommand(
            SubCommand::with_name("commit")
                .about("Commit a vote")
                .arg(proposal_id_arg.clone())
                .arg(
                    Arg::with_name("VOTE")
                        .index(2)
                        .required(true)
                        .help("aye, nay or abstain"),
                )
                .arg(
                    Arg::with_name("common-salt")
                        .long("common-salt")
                        .takes_value(true)
                        .help("Use this common salt instead of opening the invitation"),
                )
                .arg(print_tx_arg.clone()),
        )
        .subcommand(
            SubCommand::with_name("reveal")
                .about("Reveal the one-time salt of a committed vote")
                .arg(proposal_id_arg.clone())
                .arg(
                    Arg::with_name("SALT")
                        .index(2)
                        .required(true)
                        .help("One-time salt printed by `commit`"),
                )
                .arg(print_tx_arg.clone()),
        )
        .subcommand(
            SubCommand::with_name("finalize")
                .about("Close a proposal whose reveal deadline has passed")
                .arg(proposal_id_arg.clone())
                .arg(print_tx_arg),
        )
        .subcommand(
            SubCommand::with_name("progress")
                .about("Show commit and reveal counts")
                .arg(proposal_id_arg.clone()),
        )
        .subcommand(
            SubCommand::with_name("show")
                .about("Print proposals as JSON")
                .arg(
                    Arg::with_name("PROPOSAL-ID")
                        .index(1)
                        .help("Proposal id, all proposals if omitted"),
                ),
        )
        .subcommand(
            SubCommand::with_name("events")
                .about("Print the event log")
                .arg(
                    Arg::with_name("PROPOSAL-ID")
                        .index(1)
                        .help("Only events of this proposal"),
                )
                .arg(
                    Arg::with_name("json")
                        .long("json")
                        .help("One JSON object per line"),
                ),
        )
        .subcommand(
            SubCommand::with_name("tally")
                .about("Decode and count revealed votes")
                .arg(proposal_id_arg)
                .arg(
                    Arg::with_name("common-salt")
                        .long("common-salt")
                        .takes_value(true)
                        .help("Use this common salt instead of opening the invitation"),
                )
                .arg(
                    Arg::with_name("print-votes")
                        .long("print-votes")
                        .help("Print each decoded vote"),
                ),
        )
        .subcommand(
            SubCommand::with_name("commitment")
                .about("Compute a commitment offline")
                .arg(
                    Arg::with_name("VOTE")
                        .index(1)
                        .required(true)
                        .help("aye, nay or abstain"),
                )
                .arg(
                    Arg::with_name("COMMON-SALT")
                        .index(2)
                        .required(true)
                        .help("Hex common salt"),
                )
                .arg(
                    Arg::with_name("salt")
                        .long("salt")
                        .takes_value(true)
                        .help("Hex one-time salt, random if omitted"),
                ),
        )
        .subcommand(
            SubCommand::with_name("verify")
                .about("Recover the vote behind a commitment offline")
                .arg(
                    Arg::with_name("COMMITMENT")
                        .index(1)
                        .required(true)
                        .help("Hex commitment"),
                )
                .arg(
                    Arg::with_name("SALT")
                        .index(2)
                        .required(true)
                        .help("Hex one-time salt"),
                )
                .arg(
                    Arg::with_name("COMMON-SALT")
                        .index(3)
                        .required(true)
                        .help("Hex common salt"),
                ),
        )
        .get_matches();

    let level = match matches.occurrences_of("v") {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let config = Config::from_env(&matches).unwrap_or_else(|e| fail("config", e));
    log::info!("ledger: {}", config.ledger_path);

    // Subcommands
    match matches.subcommand() {
        ("keygen", Some(matches)) => command_keygen::command_keygen(matches),
        ("announce", Some(matches)) => command_proposal::command_announce(matches, &config),
        ("propose", Some(matches)) => command_proposal::command_propose(matches, &config),
        ("finalize", Some(matches)) => command_proposal::command_finalize(matches, &config),
        ("commit", Some(matches)) => command_vote::command_commit(matches, &config),
        ("reveal", Some(matches)) => command_vote::command_reveal(matches, &config),
        ("progress", Some(matches)) => command_inspect::command_progress(matches, &config),
        ("show", Some(matches)) => command_inspect::command_show(matches, &config),
        ("events", Some(matches)) => command_inspect::command_events(matches, &config),
        ("tally", Some(matches)) => command_inspect::command_tally(matches, &config),
        ("commitment", Some(matches)) => command_offline::command_commitment(matches),
        ("verify", Some(matches)) => command_offline::command_verify(matches),
        _ => {}
    }
}

/// Print an error for `cmd` and exit
pub fn fail<E: Display>(cmd: &str, e: E) -> ! {
    eprintln!("commit-reveal {}: {}", cmd, e);
    std::process::exit(1);
}

/// Expand `~` and environment variables in a path or argument
pub fn expand(input: &str) -> String {
    shellexpand::full(input)
        .map(|expanded| expanded.into_owned())
        .unwrap_or_else(|_| input.to_owned())
}

/// Parse a required positional argument
pub fn required_arg<T>(cmd: &str, matches: &clap::ArgMatches, name: &str) -> T
where
    T: std::str::FromStr,
    T::Err: Display,
{
    let value = matches
        .value_of(name)
        .unwrap_or_else(|| fail(cmd, format!("{} is required", name)));

    expand(value)
        .parse()
        .unwrap_or_else(|e| fail(cmd, format!("invalid {}: {}", name, e)))
}

/// Parse a 32-byte hex value such as a salt or commitment
pub fn bytes32_arg(cmd: &str, name: &str, value: &str) -> commit_reveal::Bytes32 {
    commit_reveal::bytes32_from_hex(value)
        .unwrap_or_else(|e| fail(cmd, format!("invalid {}: {}", name, e)))
}
