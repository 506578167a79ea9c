//! Network-slice identifiers (S-NSSAI).
//!
//! Two identifiers are equal when their slice/service type and slice
//! differentiator are equal, regardless of how they were serialized.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Single network slice selection assistance information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Snssai {
    /// Slice/service type.
    pub sst: u8,
    /// Slice differentiator (six hex digits); empty when not set.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sd: String,
}

impl Snssai {
    /// Creates an identifier with a differentiator.
    pub fn new(sst: u8, sd: impl Into<String>) -> Self {
        Self { sst, sd: sd.into() }
    }

    /// Creates an identifier with no differentiator.
    pub fn with_sst(sst: u8) -> Self {
        Self { sst, sd: String::new() }
    }

    /// Decodes the JSON form used in query parameters, e.g. `{"sst":1,"sd":"010203"}`.
    pub fn from_json(encoded: &str) -> Result<Self> {
        serde_json::from_str(encoded).map_err(|e| Error::InvalidSnssai(format!("{encoded}: {e}")))
    }

    /// Decodes an identifier embedded in a stored document.
    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        Self::deserialize(value).map_err(|e| Error::InvalidSnssai(format!("{value}: {e}")))
    }

    /// Returns true when no field is set.
    pub fn is_empty(&self) -> bool {
        self.sst == 0 && self.sd.is_empty()
    }

    /// Returns the nested-document key for this slice: two lowercase hex
    /// digits of `sst` followed by `sd` (e.g. `01010203`).
    pub fn to_hex_key(&self) -> String {
        format!("{:02x}{}", self.sst, self.sd)
    }

    /// Parses a key produced by [`Snssai::to_hex_key`].
    pub fn from_hex_key(key: &str) -> Result<Self> {
        let (sst, sd) = key
            .split_at_checked(2)
            .ok_or_else(|| Error::InvalidSnssai(key.to_string()))?;
        let sst = u8::from_str_radix(sst, 16).map_err(|_| Error::InvalidSnssai(key.to_string()))?;
        if !sd.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidSnssai(key.to_string()));
        }
        Ok(Self::new(sst, sd))
    }
}

impl fmt::Display for Snssai {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sd.is_empty() {
            write!(f, "{}", self.sst)
        } else {
            write!(f, "{}-{}", self.sst, self.sd)
        }
    }
}
