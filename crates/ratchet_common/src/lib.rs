//! Shared foundational types used across the ratchet asset toolchain.
//!
//! This crate provides content fingerprinting and the logical-path helpers
//! that turn a logical asset name into its digest-qualified output name.

#![warn(missing_docs)]

pub mod fingerprint;
pub mod logical;

pub use fingerprint::Fingerprint;
pub use logical::{canonical_logical_path, digest_path, logical_dirname, split_extension};
