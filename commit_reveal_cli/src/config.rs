use commit_reveal::{bytes32_from_hex, encryption_keypair, signing_key_from_hex, Address, Error};
use ed25519_dalek::{SigningKey, VerifyingKey};
use std::env::var;
use x25519_dalek::StaticSecret;

pub struct Config {
    pub ledger_path: String,
    pub secret_key: Option<SigningKey>,
    pub encryption_key: Option<StaticSecret>,
}

impl Config {
    /// Read configuration from the environment, letting command-line flags win.
    pub fn from_env(matches: &clap::ArgMatches) -> Result<Self, Error> {
        let ledger_path = match setting(matches, "ledger", "COMMIT_REVEAL_LEDGER") {
            Some(path) => crate::expand(&path),
            None => "./commit_reveal.json".to_owned(),
        };

        let secret_key = match setting(matches, "secret-key", "COMMIT_REVEAL_SECRET_KEY") {
            Some(val) => Some(signing_key_from_hex(&val)?),
            None => None,
        };

        let encryption_key =
            match setting(matches, "encryption-key", "COMMIT_REVEAL_ENCRYPTION_KEY") {
                Some(val) => Some(StaticSecret::from(bytes32_from_hex(&val)?)),
                None => match &secret_key {
                    Some(secret_key) => Some(encryption_keypair(secret_key)?.0),
                    None => None,
                },
            };

        Ok(Config {
            ledger_path,
            secret_key,
            encryption_key,
        })
    }

    /// The signing key, or exit if none was configured
    pub fn signer(&self, cmd: &str) -> &SigningKey {
        self.secret_key.as_ref().unwrap_or_else(|| {
            crate::fail(
                cmd,
                "provide a secret key either via --secret-key or COMMIT_REVEAL_SECRET_KEY",
            )
        })
    }

    /// The identity of the configured signer
    pub fn address(&self, cmd: &str) -> Address {
        let public: VerifyingKey = self.signer(cmd).verifying_key();
        Address::from_public_key(&public)
    }
}

fn setting(matches: &clap::ArgMatches, flag: &str, env_var: &str) -> Option<String> {
    match matches.value_of(flag) {
        Some(val) => Some(val.to_owned()),
        None => var(env_var).ok(),
    }
}
