//! jsfinger: structural fingerprinting of JavaScript libraries
//!
//! This library identifies which third-party JavaScript libraries (and which
//! versions) are embedded in compiled, often minified, application bundles.
//! It turns a tree-sitter syntax tree into a renaming- and
//! minification-resistant structural signature, and ranks a corpus of known
//! library signatures against it.
//!
//! # Pipeline
//!
//! - [`walker`]: generic filtered depth-first traversal
//! - [`literals`]: discriminative literal values of a unit
//! - [`functions`]: every function, named after itself or its container
//! - [`tokenizer`]: canonical `CATEGORY:Kind[predicate]` tokens per function
//! - [`flatten`]: hierarchical names and stable indices
//! - [`candidates`]: literal-overlap pre-filter over the corpus
//! - [`similarity`]: Jaccard-style scoring strategies
//! - [`corpus`]: library corpus and parallel ranking
//!
//! # Example
//!
//! ```ignore
//! use jsfinger::{extract_signature, parse_source, rank, ExtractOptions, Lang};
//! use jsfinger::{LibraryCorpus, RankOptions, Strategy};
//!
//! let unit = parse_source("function hello() { return 'world'; }", Lang::JavaScript)?;
//! let unknown = extract_signature(&unit, &ExtractOptions::default())?;
//!
//! let corpus = LibraryCorpus::from_entries(known_libraries);
//! let ranked = rank(&unknown, &corpus, Strategy::default(), &RankOptions::default());
//! println!("{}", serde_json::to_string_pretty(&ranked)?);
//! ```

pub mod candidates;
pub mod cli;
pub mod config;
pub mod corpus;
pub mod error;
pub mod flatten;
pub mod functions;
pub mod lang;
pub mod literals;
pub mod parsing;
pub mod signature;
pub mod similarity;
pub mod syntax;
pub mod tokenizer;
pub mod walker;

// Re-export commonly used types
pub use candidates::{candidates, LiteralIndex};
pub use cli::{Cli, Commands};
pub use config::DetectConfig;
pub use corpus::{candidate_map, rank, LibraryCorpus, LibraryId, RankOptions, RankedLibrary};
pub use error::{FingerprintError, Result};
pub use flatten::flatten;
pub use functions::{locate_functions, LocatedFunction};
pub use lang::Lang;
pub use literals::{collect_literals, LiteralValue};
pub use parsing::{parse_source, SourceUnit};
pub use signature::{
    extract_from_tree, extract_signature, ExtractOptions, FunctionSignature, Signature,
};
pub use similarity::{
    Comparison, Confidence, FunctionMatch, MatchMap, Overlap, SimilarityStrategy, Strategy,
    Strictness,
};
pub use tokenizer::{tokenize, TokenMode, TokenizeOptions};
pub use walker::{walk, Descend, NodeFilter, TreePath, WalkSignal};
