//! Core traits

mod serializer;
mod store;

pub use serializer::*;
pub use store::CacheStore;
