//! Digest-addressed asset manifest compiler and cache.
//!
//! Given logical asset names, this crate publishes their compiled,
//! content-addressed outputs to an output directory, records the mapping from
//! logical name to digest-qualified filename in a persisted JSON manifest, and
//! reclaims superseded outputs on demand. Compilation itself is delegated to a
//! [`Resolver`].

#![warn(missing_docs)]

pub mod dispatch;
pub mod error;
mod fsutil;
pub mod links;
pub mod locator;
pub mod manifest;
pub mod memory;
pub mod publisher;
pub mod resolver;
pub mod retention;
pub mod store;

pub use dispatch::{AssetCallback, CallbackError, CallbackRegistry, Dispatcher, Export};
pub use error::ManifestError;
pub use links::LinkExpander;
pub use locator::{ManifestKind, ManifestLocation};
pub use manifest::{ManifestData, ManifestEntry};
pub use memory::{MemoryAsset, MemoryResolver};
pub use publisher::{PublishOutcome, Publisher};
pub use resolver::{ResolveError, ResolvedAsset, Resolver};
pub use retention::RetentionPolicy;
pub use store::{ManifestOptions, ManifestStore};
