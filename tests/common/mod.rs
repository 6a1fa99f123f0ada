//! Common test utilities and fixtures for jsfinger integration tests
//!
//! This module provides:
//! - Parsing and extraction shortcuts over in-memory JavaScript
//! - `CorpusDir` builder for on-disk corpus directories
//! - Custom assertions for signature and ranking JSON

#![allow(unused_imports)]
#![allow(dead_code)]

pub mod assertions;
pub mod corpus_dir;

pub use assertions::*;
pub use corpus_dir::CorpusDir;

use jsfinger::{extract_signature, parse_source, ExtractOptions, Lang, Signature, SourceUnit};

/// Parse JavaScript source, panicking on parser failure
pub fn parse_js(source: &str) -> SourceUnit {
    parse_source(source, Lang::JavaScript).expect("tree-sitter should always return a tree")
}

/// Full-mode signature of JavaScript source
pub fn signature_of(source: &str) -> Signature {
    extract_signature(&parse_js(source), &ExtractOptions::default()).expect("extraction failed")
}

/// Declaration-skipping signature of JavaScript source
pub fn signature_skipping_declarations(source: &str) -> Signature {
    extract_signature(&parse_js(source), &ExtractOptions::skip_declarations())
        .expect("extraction failed")
}

/// Tokens of the function with the given hierarchical name
pub fn tokens_of<'a>(signature: &'a Signature, name: &str) -> &'a [String] {
    signature
        .function_signature
        .iter()
        .find(|f| f.name == name)
        .map(|f| f.fn_statement_tokens.as_slice())
        .unwrap_or_else(|| {
            let names: Vec<&str> = signature
                .function_signature
                .iter()
                .map(|f| f.name.as_str())
                .collect();
            panic!("no function named '{}' in {:?}", name, names)
        })
}

/// Hierarchical names in index order
pub fn function_names(signature: &Signature) -> Vec<String> {
    signature
        .function_signature
        .iter()
        .map(|f| f.name.clone())
        .collect()
}
