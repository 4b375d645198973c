//! Shared types

mod kind;

pub use kind::StoreKind;
