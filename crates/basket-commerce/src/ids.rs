//! Product identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;
use thiserror::Error;

/// Identifier of a catalog product.
///
/// Serialized as a bare JSON number, matching the catalog service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(u64);

impl ProductId {
    /// Wrap a raw id.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw id.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ProductId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Text that does not name a product.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseProductIdError {
    #[error("product id must be a positive integer: {0}")]
    Invalid(#[from] ParseIntError),

    #[error("product id must be a positive integer, got 0")]
    Zero,
}

impl FromStr for ProductId {
    type Err = ParseProductIdError;

    /// Parse a positive integer, ignoring surrounding whitespace. Catalog ids
    /// start at 1.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<u64>()? {
            0 => Err(ParseProductIdError::Zero),
            id => Ok(Self(id)),
        }
    }
}
