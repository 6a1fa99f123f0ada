//! Parsing wrapper that produces the trees the fingerprint core consumes.
//!
//! The core never parses source text itself. This module is the one place a
//! `tree_sitter::Parser` is created, so callers (the binary, tests, batch
//! drivers) share a single entry point and error mapping.
//!
//! # Example
//!
//! ```ignore
//! use jsfinger::parsing::parse_source;
//! use jsfinger::{extract_signature, ExtractOptions, Lang};
//!
//! let unit = parse_source("function hello() { return 'world'; }", Lang::JavaScript)?;
//! let signature = extract_signature(&unit, &ExtractOptions::default())?;
//! ```

use tree_sitter::{Node, Tree};

use crate::error::{FingerprintError, Result};
use crate::lang::Lang;

/// One parsed JavaScript source unit: the tree plus the text it was built from.
///
/// Identifier names and literal values live in the source text, not in the
/// tree, so the two always travel together.
pub struct SourceUnit {
    source: String,
    tree: Tree,
    lang: Lang,
}

impl SourceUnit {
    /// Bundle an externally produced tree with its source text.
    pub fn new(source: impl Into<String>, tree: Tree, lang: Lang) -> Self {
        Self {
            source: source.into(),
            tree,
            lang,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub fn lang(&self) -> Lang {
        self.lang
    }
}

impl std::fmt::Debug for SourceUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceUnit")
            .field("lang", &self.lang)
            .field("bytes", &self.source.len())
            .field("has_error", &self.tree.root_node().has_error())
            .finish()
    }
}

/// Parse source text into a [`SourceUnit`].
///
/// # Errors
///
/// Returns `FingerprintError::ParseFailure` if:
/// - The grammar cannot be set on the parser
/// - tree-sitter produces no tree at all
///
/// Trees with recovered syntax errors are accepted; unfamiliar nodes degrade
/// to fallback tokens during extraction.
pub fn parse_source(source: &str, lang: Lang) -> Result<SourceUnit> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&lang.tree_sitter_language())
        .map_err(|e| FingerprintError::ParseFailure {
            message: format!("Failed to set language for {}: {:?}", lang.name(), e),
        })?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| FingerprintError::ParseFailure {
            message: format!("tree-sitter returned no tree for {} source", lang.name()),
        })?;

    if tree.root_node().has_error() {
        tracing::debug!(
            "Parsed {} bytes of {} with recovered syntax errors",
            source.len(),
            lang.name()
        );
    }

    Ok(SourceUnit::new(source, tree, lang))
}
