//! Candidate filter
//!
//! Cheap pre-selection of libraries worth a full comparison: any library
//! sharing at least one literal with the unknown signature is a candidate.
//! The filter never drops a library that shares a literal, but admits plenty
//! of false positives; the similarity engine decides.

use std::collections::BTreeSet;

use ahash::AHashMap;

use crate::literals::LiteralValue;

/// Inverted index from literal value to the libraries containing it
#[derive(Debug, Clone, Default)]
pub struct LiteralIndex {
    postings: AHashMap<LiteralValue, BTreeSet<usize>>,
    library_count: usize,
}

impl LiteralIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index over library literal signatures, in library order
    pub fn from_libraries<'a, I>(libraries: I) -> Self
    where
        I: IntoIterator<Item = &'a [LiteralValue]>,
    {
        let mut index = Self::new();
        for literals in libraries {
            index.add_library(literals);
        }
        index
    }

    /// Add the next library; returns the id it was indexed under
    pub fn add_library(&mut self, literals: &[LiteralValue]) -> usize {
        let id = self.library_count;
        self.library_count += 1;
        for literal in literals {
            self.postings.entry(literal.clone()).or_default().insert(id);
        }
        id
    }

    /// Number of libraries indexed
    pub fn library_count(&self) -> usize {
        self.library_count
    }

    /// Number of distinct literal values indexed
    pub fn literal_count(&self) -> usize {
        self.postings.len()
    }

    /// Libraries containing one literal value
    pub fn libraries_with(&self, literal: &LiteralValue) -> Option<&BTreeSet<usize>> {
        self.postings.get(literal)
    }

    /// Candidate libraries for an unknown literal signature.
    ///
    /// An empty unknown signature cannot narrow anything and yields every
    /// library. A non-empty signature that shares nothing yields an empty set;
    /// the caller decides whether to fall back to the full corpus.
    pub fn candidates(&self, unknown: &[LiteralValue]) -> BTreeSet<usize> {
        if unknown.is_empty() {
            return (0..self.library_count).collect();
        }

        let mut found = BTreeSet::new();
        for literal in unknown {
            if let Some(libraries) = self.postings.get(literal) {
                found.extend(libraries.iter().copied());
            }
        }
        found
    }
}

/// Candidate libraries for `unknown` according to `index`
pub fn candidates(unknown: &[LiteralValue], index: &LiteralIndex) -> BTreeSet<usize> {
    index.candidates(unknown)
}
