//! Shared foundational types used across the Kiln asset toolchain.
//!
//! This crate provides content hashing and the logical-path helpers that
//! turn a logical asset name into its content-addressed file name and back.

#![warn(missing_docs)]

pub mod hash;
pub mod logical_path;

pub use hash::ContentHash;
pub use logical_path::{digest_path, embedded_digest, normalize_logical_path, DIGEST_HEX_LEN};
