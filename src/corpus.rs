//! Library corpus and ranking
//!
//! A [`LibraryCorpus`] holds the known library signatures together with the
//! literal index used for candidate filtering. [`rank`] scores an unknown
//! signature against the candidate subset in parallel and returns the best
//! libraries first.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::candidates::LiteralIndex;
use crate::error::FingerprintError;
use crate::signature::Signature;
use crate::similarity::{Comparison, SimilarityStrategy, Strategy};

/// Default number of ranked libraries returned
pub const DEFAULT_TOP_N: usize = 100;

// ============================================================================
// Library identity
// ============================================================================

/// A library release, written `name@version`
///
/// Ordering is by name, then version, which is also the ranking tie-break.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LibraryId {
    pub name: String,
    pub version: String,
}

impl LibraryId {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for LibraryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

impl FromStr for LibraryId {
    type Err = FingerprintError;

    /// Split at the last `@`, so scoped packages (`@scope/pkg@1.0.0`) work
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.rsplit_once('@') {
            Some((name, version)) if !name.is_empty() && !version.is_empty() => {
                Ok(Self::new(name, version))
            }
            _ => Err(FingerprintError::Serialization {
                message: format!("Invalid library id '{}', expected name@version", s),
            }),
        }
    }
}

impl Serialize for LibraryId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for LibraryId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Corpus
// ============================================================================

/// One known library signature
#[derive(Debug, Clone)]
pub struct LibraryEntry {
    pub id: LibraryId,
    pub signature: Signature,
}

/// Known library signatures plus their literal index
#[derive(Debug, Clone, Default)]
pub struct LibraryCorpus {
    entries: Vec<LibraryEntry>,
    index: LiteralIndex,
}

impl LibraryCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a corpus from `(id, signature)` pairs
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (LibraryId, Signature)>,
    {
        let mut corpus = Self::new();
        for (id, signature) in entries {
            corpus.add(id, signature);
        }
        corpus
    }

    /// Add a library and index its literals
    pub fn add(&mut self, id: LibraryId, signature: Signature) {
        self.index.add_library(&signature.literal_signature);
        self.entries.push(LibraryEntry { id, signature });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[LibraryEntry] {
        &self.entries
    }

    pub fn literal_index(&self) -> &LiteralIndex {
        &self.index
    }

    /// Libraries sharing a literal with `unknown` (all of them if it has none)
    pub fn candidate_ids(&self, unknown: &Signature) -> Vec<LibraryId> {
        self.index
            .candidates(&unknown.literal_signature)
            .into_iter()
            .filter_map(|i| self.entries.get(i).map(|e| e.id.clone()))
            .collect()
    }
}

// ============================================================================
// Ranking
// ============================================================================

/// Ranking options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankOptions {
    pub top_n: usize,
    pub use_candidate_filter: bool,
    /// Score the whole corpus when the candidate filter finds nothing
    pub fallback_to_full_corpus: bool,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            use_candidate_filter: true,
            fallback_to_full_corpus: true,
        }
    }
}

/// One library's score against the unknown signature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedLibrary {
    pub library: LibraryId,
    #[serde(flatten)]
    pub comparison: Comparison,
}

/// Rank corpus libraries by similarity to `unknown`.
///
/// Results are sorted by descending confidence, ties broken by library name
/// then version, and truncated to `top_n`.
pub fn rank(
    unknown: &Signature,
    corpus: &LibraryCorpus,
    strategy: Strategy,
    options: &RankOptions,
) -> Vec<RankedLibrary> {
    let selected: Vec<usize> = if options.use_candidate_filter {
        let found = corpus.index.candidates(&unknown.literal_signature);
        if found.is_empty() && options.fallback_to_full_corpus {
            tracing::debug!("No candidate libraries, falling back to full corpus");
            (0..corpus.len()).collect()
        } else {
            found.into_iter().collect()
        }
    } else {
        (0..corpus.len()).collect()
    };

    tracing::debug!(
        "Scoring {} of {} libraries with {}",
        selected.len(),
        corpus.len(),
        strategy
    );

    let mut ranked: Vec<RankedLibrary> = selected
        .par_iter()
        .filter_map(|&i| corpus.entries.get(i))
        .map(|entry| RankedLibrary {
            library: entry.id.clone(),
            comparison: strategy.compare(unknown, &entry.signature),
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.comparison
            .confidence
            .val
            .total_cmp(&a.comparison.confidence.val)
            .then_with(|| a.library.cmp(&b.library))
    });
    ranked.truncate(options.top_n);
    ranked
}

/// Candidate libraries for each named unit: `{ unitId: [libraryId, ...] }`
pub fn candidate_map<'a, I>(units: I, corpus: &LibraryCorpus) -> BTreeMap<String, Vec<LibraryId>>
where
    I: IntoIterator<Item = (&'a str, &'a Signature)>,
{
    let units: Vec<(&str, &Signature)> = units.into_iter().collect();
    units
        .par_iter()
        .map(|(unit_id, signature)| (unit_id.to_string(), corpus.candidate_ids(signature)))
        .collect()
}
