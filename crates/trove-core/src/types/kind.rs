//! Store kind enum

use crate::CacheError;
use std::fmt;
use std::str::FromStr;

/// The known backend kinds a manager can construct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKind {
    /// In-process map store
    InMemory,
    /// Relational-table store (one row per key)
    Database,
    /// Remote key/value server store
    Redis,
}

impl StoreKind {
    /// Configuration name of this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKind::InMemory => "inmemory",
            StoreKind::Database => "database",
            StoreKind::Redis => "redis",
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreKind {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inmemory" => Ok(StoreKind::InMemory),
            "database" => Ok(StoreKind::Database),
            "redis" => Ok(StoreKind::Redis),
            other => Err(CacheError::UnknownStore(other.to_string())),
        }
    }
}
