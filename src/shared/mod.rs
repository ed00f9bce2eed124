//! Shared newtypes and utilities used across all domain modules.
//!
//! These types are serialization-transparent: they serialize/deserialize identically
//! to the raw format the venue sends, so they can be used directly in wire types.

pub mod serde_util;

use ethers::types::{Signature, H256, U256};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

pub use ethers::types::Address;

// ─── Cloid ───────────────────────────────────────────────────────────────────

/// Client order id: 16 bytes, written as `0x` + 32 hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cloid([u8; 16]);

impl Cloid {
    pub fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    pub fn random() -> Self {
        Self(rand::random())
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl std::fmt::Display for Cloid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Cloid {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(raw).map_err(|e| format!("invalid cloid {s:?}: {e}"))?;
        let arr: [u8; 16] = bytes
            .try_into()
            .map_err(|_| format!("invalid cloid {s:?}: expected 16 bytes"))?;
        Ok(Cloid(arr))
    }
}

impl Serialize for Cloid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Cloid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ─── RsvSignature ────────────────────────────────────────────────────────────

/// Signature as the venue expects it: `{ "r": "0x…", "s": "0x…", "v": 27 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsvSignature {
    pub r: H256,
    pub s: H256,
    pub v: u64,
}

impl From<Signature> for RsvSignature {
    fn from(sig: Signature) -> Self {
        Self {
            r: u256_to_h256(sig.r),
            s: u256_to_h256(sig.s),
            v: sig.v,
        }
    }
}

impl From<RsvSignature> for Signature {
    fn from(sig: RsvSignature) -> Self {
        Signature {
            r: U256::from_big_endian(sig.r.as_bytes()),
            s: U256::from_big_endian(sig.s.as_bytes()),
            v: sig.v,
        }
    }
}

fn u256_to_h256(value: U256) -> H256 {
    let mut buf = [0u8; 32];
    value.to_big_endian(&mut buf);
    H256::from(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cloid_hex_roundtrip() {
        let cloid: Cloid = "0x1234567890abcdef1234567890abcdef".parse().unwrap();
        assert_eq!(cloid.to_string(), "0x1234567890abcdef1234567890abcdef");

        let json = serde_json::to_value(cloid).unwrap();
        assert_eq!(json, "0x1234567890abcdef1234567890abcdef");
    }

    #[test]
    fn test_cloid_rejects_wrong_length() {
        assert!("0x1234".parse::<Cloid>().is_err());
        assert!("not hex".parse::<Cloid>().is_err());
    }

    #[test]
    fn test_rsv_signature_wire_shape() {
        let sig = Signature {
            r: U256::from(1u64),
            s: U256::from(2u64),
            v: 27,
        };
        let rsv = RsvSignature::from(sig);
        let json = serde_json::to_value(rsv).unwrap();

        assert_eq!(
            json["r"],
            "0x0000000000000000000000000000000000000000000000000000000000000001"
        );
        assert_eq!(
            json["s"],
            "0x0000000000000000000000000000000000000000000000000000000000000002"
        );
        assert_eq!(json["v"], 27);
        assert_eq!(Signature::from(rsv), sig);
    }
}
