//! Filesystem asset resolution for the ratchet manifest.
//!
//! [`DirectoryResolver`] finds assets on an ordered list of load paths,
//! reads the link directives in their headers, and fingerprints their bytes.

#![warn(missing_docs)]

pub mod directives;
pub mod directory;
pub mod mime;

pub use directives::{parse_header, Directive, Header};
pub use directory::DirectoryResolver;
pub use mime::{mime_for, MimeType};
