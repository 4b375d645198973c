//! trove-core: Core traits and types for the trove cache library
//!
//! This crate provides the store contract, error type, and serialization
//! traits shared by every trove backend.

mod error;
mod traits;
mod types;

pub use error::{CacheError, Result};
pub use traits::*;
pub use types::*;
