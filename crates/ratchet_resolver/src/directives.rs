//! Link directives in asset headers.
//!
//! A text asset may open with a comment header declaring which other assets
//! must be published with it:
//!
//! ```text
//! //= link logo.png
//! //= link_directory ./icons
//! //= link_tree fonts
//! ```
//!
//! `//=`, `*=` (inside a `/* */` block) and `#=` are all accepted. The header
//! ends at the first line that is neither blank nor a comment. Directive
//! lines are removed from the published bytes; other comments are kept.

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

static DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:/\*|//|\*|#)=\s*([\w-]+)\s*(.*?)\s*(?:\*/)?\s*$")
        .expect("directive pattern is valid")
});

/// A single link declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Publish one asset.
    Link(String),
    /// Publish every file directly inside a directory.
    LinkDirectory(String),
    /// Publish every file below a directory, recursively.
    LinkTree(String),
}

/// The directives of an asset and its bytes with directive lines removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Directives in declaration order.
    pub directives: Vec<Directive>,
    /// The source with directive lines stripped.
    pub body: String,
}

/// Parses the directive header of `source`.
pub fn parse_header(source: &str) -> Header {
    let mut directives = Vec::new();
    let mut body = String::with_capacity(source.len());
    let mut in_header = true;
    let mut in_block = false;

    for line in source.split_inclusive('\n') {
        if in_header {
            let trimmed = line.trim();
            let is_comment = in_block
                || trimmed.is_empty()
                || trimmed.starts_with("//")
                || trimmed.starts_with("/*")
                || trimmed.starts_with('#');
            if !is_comment {
                in_header = false;
            } else {
                if trimmed.starts_with("/*") {
                    in_block = true;
                }
                if trimmed.ends_with("*/") {
                    in_block = false;
                }
                if let Some(caps) = DIRECTIVE.captures(trimmed) {
                    if let Some(directive) = directive(&caps[1], &caps[2]) {
                        directives.push(directive);
                    }
                    continue;
                }
            }
        }
        body.push_str(line);
    }

    Header { directives, body }
}

fn directive(name: &str, argument: &str) -> Option<Directive> {
    if argument.is_empty() {
        warn!(directive = name, "directive without an argument, ignoring");
        return None;
    }
    let argument = argument.to_string();
    match name {
        "link" => Some(Directive::Link(argument)),
        "link_directory" => Some(Directive::LinkDirectory(argument)),
        "link_tree" => Some(Directive::LinkTree(argument)),
        other => {
            warn!(directive = other, "unsupported directive, ignoring");
            None
        }
    }
}
