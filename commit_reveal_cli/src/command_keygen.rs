use commit_reveal::Address;

pub fn command_keygen(_matches: &clap::ArgMatches) {
    let (secret, public) = commit_reveal::generate_keypair();
    let (_, encryption_public) = commit_reveal::encryption_keypair(&secret)
        .unwrap_or_else(|e| crate::fail("keygen", e));

    println!("secret-key: {}", hex::encode(secret.to_bytes()));
    println!("public-key: {}", hex::encode(public.to_bytes()));
    println!("address: {}", Address::from_public_key(&public));
    println!("encryption-key: {}", hex::encode(encryption_public.as_bytes()));
}
