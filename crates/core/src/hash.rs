//! The digest function shared by the ledger and the merkle tree.
//!
//! Every digest in hashledger is a 32-byte Blake3 output. Digests are opaque:
//! they are only ever compared for equality or rendered as hex.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Raw 256-bit digest bytes.
pub type H256 = [u8; 32];

/// A 256-bit digest with hex formatting.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Hash(pub H256);

impl Hash {
    /// The empty digest. Used as the genesis block's predecessor and as the
    /// root of a tree that was never built.
    pub const ZERO: Self = Self([0u8; 32]);

    pub fn from_bytes(bytes: H256) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &H256 {
        &self.0
    }

    /// Whether this is the empty digest.
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Lowercase hex, 64 characters, no prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse 64 hex characters (an optional `0x` prefix is accepted).
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let mut arr = [0u8; 32];
        hex::decode_to_slice(s, &mut arr)?;
        Ok(Self(arr))
    }

    /// Abbreviated hex for log lines and tables.
    pub fn short(&self) -> String {
        self.to_hex()[..16].to_string()
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash(0x{})", &self.to_hex()[..8])
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

/// Hex strings for human-readable formats such as JSON, raw bytes otherwise.
impl Serialize for Hash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Hash::from_hex(&s).map_err(de::Error::custom)
        } else {
            Ok(Hash(H256::deserialize(deserializer)?))
        }
    }
}

impl From<H256> for Hash {
    fn from(bytes: H256) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Digest arbitrary bytes.
pub fn hash(data: &[u8]) -> Hash {
    Hash(blake3::hash(data).into())
}

/// Digest the concatenation of `parts` without allocating the joined buffer.
pub fn hash_concat(parts: &[&[u8]]) -> Hash {
    let mut hasher = blake3::Hasher::new();
    for part in parts {
        hasher.update(part);
    }
    Hash(hasher.finalize().into())
}

/// Digest of two child digests, `left` first.
pub fn hash_pair(left: &Hash, right: &Hash) -> Hash {
    hash_concat(&[left.as_ref(), right.as_ref()])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_deterministic() {
        assert_eq!(hash(b"data1"), hash(b"data1"));
    }

    #[test]
    fn test_hash_distinguishes_inputs() {
        assert_ne!(hash(b"data1"), hash(b"data2"));
    }

    #[test]
    fn test_hex_roundtrip_with_prefix() {
        let h = hash(b"ledger");
        assert_eq!(Hash::from_hex(&h.to_hex()).unwrap(), h);
        assert_eq!(Hash::from_hex(&h.to_string()).unwrap(), h);
    }

    #[test]
    fn test_from_hex_rejects_wrong_length() {
        assert!(Hash::from_hex("abcd").is_err());
    }

    #[test]
    fn test_display_format() {
        let shown = hash(b"x").to_string();
        assert!(shown.starts_with("0x"));
        assert_eq!(shown.len(), 66);
    }

    #[test]
    fn test_pair_is_ordered_concat() {
        let a = hash(b"a");
        let b = hash(b"b");
        assert_eq!(hash_pair(&a, &b), hash_concat(&[a.as_ref(), b.as_ref()]));
        assert_ne!(hash_pair(&a, &b), hash_pair(&b, &a));
    }

    #[test]
    fn test_json_uses_hex() {
        let h = hash(b"ledger");
        let json = serde_json::to_string(&h).unwrap();
        assert_eq!(json, format!("\"{}\"", h.to_hex()));
        assert_eq!(serde_json::from_str::<Hash>(&json).unwrap(), h);
        assert!(serde_json::from_str::<Hash>("\"not hex\"").is_err());
    }

    #[test]
    fn test_bincode_uses_raw_bytes() {
        let h = hash(b"ledger");
        let encoded = bincode::serialize(&h).unwrap();
        assert_eq!(encoded, h.as_bytes().to_vec());
        assert_eq!(bincode::deserialize::<Hash>(&encoded).unwrap(), h);
    }

    #[test]
    fn test_zero() {
        assert!(Hash::ZERO.is_zero());
        assert!(!hash(b"").is_zero());
        assert_eq!(Hash::default(), Hash::ZERO);
    }
}
