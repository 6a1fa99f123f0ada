//! Structural signature data model and extraction entry point
//!
//! A [`Signature`] is the unit persisted and compared: the flattened function
//! signatures plus the literal signature of one source unit.
//!
//! ```json
//! { "functionSignature": [ { "type": "fn", "name": "b::fn1", "index": 1,
//!                            "fnStatementTypes": [...], "fnStatementTokens": [...] } ],
//!   "literalSignature": [ "abc", 123 ] }
//! ```

use serde::{Deserialize, Serialize};
use tree_sitter::Node;

use crate::error::Result;
use crate::flatten::flatten;
use crate::functions::locate_functions;
use crate::literals::{collect_literals, LiteralValue};
use crate::parsing::SourceUnit;
use crate::tokenizer::{TokenMode, TokenizeOptions, DEFAULT_MAX_EXPRESSION_DEPTH};

/// Value of the `type` tag on every function signature
pub const FUNCTION_SIGNATURE_TYPE: &str = "fn";

fn default_signature_type() -> String {
    FUNCTION_SIGNATURE_TYPE.to_string()
}

/// One flattened function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionSignature {
    #[serde(rename = "type", default = "default_signature_type")]
    pub kind: String,
    /// Hierarchical name (`outer::inner`), unique within one signature
    pub name: String,
    /// Position in the name-sorted list
    pub index: usize,
    #[serde(default)]
    pub fn_statement_types: Vec<String>,
    #[serde(default)]
    pub fn_statement_tokens: Vec<String>,
}

impl FunctionSignature {
    pub fn new(
        name: impl Into<String>,
        index: usize,
        fn_statement_types: Vec<String>,
        fn_statement_tokens: Vec<String>,
    ) -> Self {
        Self {
            kind: default_signature_type(),
            name: name.into(),
            index,
            fn_statement_types,
            fn_statement_tokens,
        }
    }
}

/// Structural signature of one source unit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signature {
    #[serde(default)]
    pub function_signature: Vec<FunctionSignature>,
    #[serde(default)]
    pub literal_signature: Vec<LiteralValue>,
}

impl Signature {
    pub fn is_empty(&self) -> bool {
        self.function_signature.is_empty() && self.literal_signature.is_empty()
    }
}

/// Extraction options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    pub mode: TokenMode,
    pub max_expression_depth: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            mode: TokenMode::Full,
            max_expression_depth: DEFAULT_MAX_EXPRESSION_DEPTH,
        }
    }
}

impl ExtractOptions {
    /// Omit variable and parameter declaration tokens
    pub fn skip_declarations() -> Self {
        Self {
            mode: TokenMode::SkipDeclarations,
            ..Self::default()
        }
    }

    fn tokenize_options(&self) -> TokenizeOptions {
        TokenizeOptions {
            mode: self.mode,
            max_expression_depth: self.max_expression_depth,
        }
    }
}

/// Extract the structural signature of a parsed unit
pub fn extract_signature(unit: &SourceUnit, options: &ExtractOptions) -> Result<Signature> {
    extract_from_tree(unit.root(), unit.source(), options)
}

/// Extract the structural signature below an arbitrary root node
pub fn extract_from_tree(root: Node, source: &str, options: &ExtractOptions) -> Result<Signature> {
    let forest = locate_functions(root, source, &options.tokenize_options())?;
    let function_signature = flatten(forest);
    let literal_signature = collect_literals(root, source)?;

    tracing::debug!(
        "Extracted {} functions and {} literals",
        function_signature.len(),
        literal_signature.len()
    );

    Ok(Signature {
        function_signature,
        literal_signature,
    })
}
