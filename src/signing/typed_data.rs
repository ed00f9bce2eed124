//! Minimal EIP-712 typed-data builder.
//!
//! Only the flat structs the exchange signs are supported: every field is a
//! `string`, `uint64`, `address`, `bytes32` or `bool`. That keeps the hashing
//! a straight encode-and-keccak with no type graph to resolve.

use ethers::types::{Address, H256, U256};
use ethers::utils::keccak256;
use serde_json::{json, Map, Value};

const DOMAIN_TYPE: &[u8] =
    b"EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)";

/// A single field value in a typed struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedValue {
    String(String),
    Uint64(u64),
    Address(Address),
    Bytes32(H256),
    Bool(bool),
}

impl TypedValue {
    pub fn sol_type(&self) -> &'static str {
        match self {
            TypedValue::String(_) => "string",
            TypedValue::Uint64(_) => "uint64",
            TypedValue::Address(_) => "address",
            TypedValue::Bytes32(_) => "bytes32",
            TypedValue::Bool(_) => "bool",
        }
    }

    fn encode(&self) -> [u8; 32] {
        match self {
            TypedValue::String(s) => keccak256(s.as_bytes()),
            TypedValue::Uint64(n) => encode_uint256(U256::from(*n)),
            TypedValue::Address(a) => encode_address(*a),
            TypedValue::Bytes32(h) => h.to_fixed_bytes(),
            TypedValue::Bool(b) => encode_uint256(U256::from(u8::from(*b))),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            TypedValue::String(s) => Value::String(s.clone()),
            TypedValue::Uint64(n) => json!(n),
            TypedValue::Address(a) => Value::String(format!("{a:#x}")),
            TypedValue::Bytes32(h) => Value::String(format!("{h:#x}")),
            TypedValue::Bool(b) => Value::Bool(*b),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedField {
    pub name: &'static str,
    pub value: TypedValue,
}

impl TypedField {
    pub fn new(name: &'static str, value: TypedValue) -> Self {
        Self { name, value }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eip712Domain {
    pub name: &'static str,
    pub version: &'static str,
    pub chain_id: u64,
    pub verifying_contract: Address,
}

impl Eip712Domain {
    /// keccak256(typeHash ‖ keccak(name) ‖ keccak(version) ‖ chainId ‖ verifyingContract)
    pub fn separator(&self) -> [u8; 32] {
        let mut encoded = Vec::with_capacity(32 * 5);
        encoded.extend_from_slice(&keccak256(DOMAIN_TYPE));
        encoded.extend_from_slice(&keccak256(self.name.as_bytes()));
        encoded.extend_from_slice(&keccak256(self.version.as_bytes()));
        encoded.extend_from_slice(&encode_uint256(U256::from(self.chain_id)));
        encoded.extend_from_slice(&encode_address(self.verifying_contract));
        keccak256(&encoded)
    }
}

/// A domain plus one flat struct, ready to hash or hand to a wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedPayload {
    pub domain: Eip712Domain,
    pub primary_type: &'static str,
    pub fields: Vec<TypedField>,
}

impl TypedPayload {
    /// `Name(type1 field1,type2 field2,…)`
    pub fn encode_type(&self) -> String {
        let members = self
            .fields
            .iter()
            .map(|f| format!("{} {}", f.value.sol_type(), f.name))
            .collect::<Vec<_>>()
            .join(",");
        format!("{}({})", self.primary_type, members)
    }

    pub fn struct_hash(&self) -> [u8; 32] {
        let mut encoded = Vec::with_capacity(32 * (self.fields.len() + 1));
        encoded.extend_from_slice(&keccak256(self.encode_type().as_bytes()));
        for field in &self.fields {
            encoded.extend_from_slice(&field.value.encode());
        }
        keccak256(&encoded)
    }

    /// keccak256("\x19\x01" ‖ domainSeparator ‖ structHash)
    pub fn digest(&self) -> H256 {
        let mut message = Vec::with_capacity(66);
        message.extend_from_slice(b"\x19\x01");
        message.extend_from_slice(&self.domain.separator());
        message.extend_from_slice(&self.struct_hash());
        H256::from(keccak256(&message))
    }

    /// JSON form accepted by `eth_signTypedData_v4`.
    pub fn to_json(&self) -> Value {
        let domain_types = json!([
            {"name": "name", "type": "string"},
            {"name": "version", "type": "string"},
            {"name": "chainId", "type": "uint256"},
            {"name": "verifyingContract", "type": "address"},
        ]);
        let struct_types: Vec<Value> = self
            .fields
            .iter()
            .map(|f| json!({"name": f.name, "type": f.value.sol_type()}))
            .collect();

        let mut types = Map::new();
        types.insert("EIP712Domain".into(), domain_types);
        types.insert(self.primary_type.into(), Value::Array(struct_types));

        let message: Map<String, Value> = self
            .fields
            .iter()
            .map(|f| (f.name.to_string(), f.value.to_json()))
            .collect();

        json!({
            "domain": {
                "name": self.domain.name,
                "version": self.domain.version,
                "chainId": self.domain.chain_id,
                "verifyingContract": format!("{:#x}", self.domain.verifying_contract),
            },
            "types": types,
            "primaryType": self.primary_type,
            "message": message,
        })
    }
}

/// Encode a U256 as 32 bytes (big-endian, left-padded)
fn encode_uint256(value: U256) -> [u8; 32] {
    let mut buf = [0u8; 32];
    value.to_big_endian(&mut buf);
    buf
}

/// Encode an address as 32 bytes (left-padded with zeros)
fn encode_address(addr: Address) -> [u8; 32] {
    let mut buf = [0u8; 32];
    buf[12..].copy_from_slice(addr.as_bytes());
    buf
}
