//! Serialization utilities for use with [`serde_with::serde_as`] macros.

mod chain_id;

pub use self::chain_id::ChainId;
