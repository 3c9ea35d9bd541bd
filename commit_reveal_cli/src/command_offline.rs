use commit_reveal::*;

pub fn command_commitment(matches: &clap::ArgMatches) {
    let vote: Vote = crate::required_arg("commitment", matches, "VOTE");
    let common_salt = crate::bytes32_arg(
        "commitment",
        "COMMON-SALT",
        matches.value_of("COMMON-SALT").unwrap_or_default(),
    );
    let one_time_salt = match matches.value_of("salt") {
        Some(value) => crate::bytes32_arg("commitment", "salt", value),
        None => generate_salt(),
    };

    let commitment = compute_commitment(vote, &one_time_salt, &common_salt);
    println!("commitment: {}", hex::encode(commitment));
    println!("one-time-salt: {}", hex::encode(one_time_salt));
}

pub fn command_verify(matches: &clap::ArgMatches) {
    let arg = |name: &str| {
        crate::bytes32_arg("verify", name, matches.value_of(name).unwrap_or_default())
    };
    let commitment = arg("COMMITMENT");
    let one_time_salt = arg("SALT");
    let common_salt = arg("COMMON-SALT");

    match verify_vote(&commitment, &one_time_salt, &common_salt) {
        Some(vote) => println!("{}", vote),
        None => crate::fail("verify", "commitment does not match any vote"),
    }
}
