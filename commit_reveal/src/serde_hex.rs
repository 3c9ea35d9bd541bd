// Hex (de)serialization helpers for use in `#[serde(with)]`
use crate::*;
use ed25519_dalek::{Signature, VerifyingKey};
use serde::{de, Deserialize, Deserializer, Serializer};
use std::convert::TryInto;

fn decode<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
    let s = String::deserialize(deserializer)?;
    let s = s.strip_prefix("0x").unwrap_or(&s);
    hex::decode(s).map_err(de::Error::custom)
}

// a single-purpose type for use in `#[serde(with)]`
pub enum Bytes32Hex {}

impl Bytes32Hex {
    pub fn serialize<S: Serializer>(bytes: &Bytes32, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Bytes32, D::Error> {
        let bytes = decode(deserializer)?;
        let len = bytes.len();
        bytes
            .try_into()
            .map_err(|_| de::Error::invalid_length(len, &"32 bytes"))
    }
}

// a single-purpose type for use in `#[serde(with)]`
pub enum BytesHex {}

impl BytesHex {
    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        decode(deserializer)
    }
}

// a single-purpose type for use in `#[serde(with)]`
pub enum EdPublicKeyHex {}

impl EdPublicKeyHex {
    pub fn serialize<S: Serializer>(
        public_key: &VerifyingKey,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(public_key.as_bytes()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<VerifyingKey, D::Error> {
        let bytes = Bytes32Hex::deserialize(deserializer)?;
        VerifyingKey::from_bytes(&bytes).map_err(de::Error::custom)
    }
}

// a single-purpose type for use in `#[serde(with)]`
pub enum EdSignatureHex {}

impl EdSignatureHex {
    pub fn serialize<S: Serializer>(sig: &Signature, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(sig.to_bytes()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Signature, D::Error> {
        let bytes = decode(deserializer)?;
        Signature::from_slice(&bytes).map_err(de::Error::custom)
    }
}
