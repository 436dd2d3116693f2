//! Checksum utilities for snapshot fingerprints

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::error::Result;

/// SHA256 checksum of serialized schema content
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checksum(String);

impl Checksum {
    /// Compute checksum from raw bytes
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = Sha256::digest(data);
        Self(format!("{:x}", hash))
    }

    /// Compute checksum of the compact JSON form of `value`
    pub fn from_json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        let canonical = serde_json::to_vec(value)?;
        Ok(Self::from_bytes(&canonical))
    }

    /// Get the hex string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Verify that `value` still matches this checksum
    pub fn verify_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<bool> {
        Ok(Self::from_json(value)? == *self)
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_consistency() {
        let value = serde_json::json!({"name": "Droid", "members": ["id"]});
        assert_eq!(Checksum::from_json(&value).unwrap(), Checksum::from_json(&value).unwrap());
        assert_eq!(Checksum::from_bytes(b"droid").as_str().len(), 64);
    }

    #[test]
    fn test_checksum_different_content() {
        let a = Checksum::from_json(&serde_json::json!({"name": "Droid"})).unwrap();
        let b = Checksum::from_json(&serde_json::json!({"name": "Human"})).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_checksum_verification() {
        let value = serde_json::json!(["id", "name"]);
        let checksum = Checksum::from_json(&value).unwrap();
        assert!(checksum.verify_json(&value).unwrap());
        assert!(!checksum.verify_json(&serde_json::json!(["id"])).unwrap());
    }
}
