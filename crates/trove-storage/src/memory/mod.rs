//! In-process map store

mod store;

pub use store::MemoryStore;
