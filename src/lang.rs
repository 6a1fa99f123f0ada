//! Language detection and tree-sitter grammar loading
//!
//! Only the JavaScript family is fingerprinted. TypeScript and TSX grammars
//! are supersets of the JavaScript node shapes, so the same extractors run
//! over all four; type annotations simply fall through to fallback tokens.

use std::path::Path;
use tree_sitter::Language;

use crate::error::{FingerprintError, Result};

/// Supported source languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Lang {
    #[default]
    JavaScript,
    Jsx,
    TypeScript,
    Tsx,
}

impl Lang {
    /// Detect language from file path extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| FingerprintError::UnsupportedLanguage {
                extension: "none".to_string(),
            })?;

        Self::from_extension(ext)
    }

    /// Detect language from file extension string
    pub fn from_extension(ext: &str) -> Result<Self> {
        match ext.to_lowercase().as_str() {
            // Bundles ship as .bundle / .jsbundle on mobile targets
            "js" | "mjs" | "cjs" | "bundle" | "jsbundle" => Ok(Self::JavaScript),
            "jsx" => Ok(Self::Jsx),
            "ts" | "mts" | "cts" => Ok(Self::TypeScript),
            "tsx" => Ok(Self::Tsx),
            _ => Err(FingerprintError::UnsupportedLanguage {
                extension: ext.to_string(),
            }),
        }
    }

    /// Get the canonical name of the language
    pub fn name(&self) -> &'static str {
        match self {
            Self::JavaScript => "javascript",
            Self::Jsx => "jsx",
            Self::TypeScript => "typescript",
            Self::Tsx => "tsx",
        }
    }

    /// Get the tree-sitter Language for parsing
    pub fn tree_sitter_language(&self) -> Language {
        match self {
            Self::JavaScript | Self::Jsx => tree_sitter_javascript::LANGUAGE.into(),
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Self::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }
}
