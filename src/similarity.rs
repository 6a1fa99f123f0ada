//! Similarity engine
//!
//! Scores an unknown [`Signature`] against a library signature with one of a
//! closed set of strategies:
//!
//! - set overlap of literal values, function names or statement-type tags,
//!   as classic Jaccard (`den = |A ∪ B|`) or coverage of the unknown
//!   (`den = |A|`)
//! - function-token alignment: every unknown function is paired with the
//!   library function whose tokens overlap most, and the aggregate is the
//!   ratio of summed numerators to summed denominators
//!
//! Every score is a [`Confidence`] `{val, num, den}`; empty comparisons score
//! `val = 0` and never expose `den = 0`.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FingerprintError;
use crate::signature::{FunctionSignature, Signature};

// ============================================================================
// Confidence
// ============================================================================

/// Jaccard-style ratio `val = num / den`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Confidence {
    pub val: f64,
    pub num: usize,
    pub den: usize,
}

impl Confidence {
    /// Build from raw counts; `den == 0` (nothing to compare) becomes `{0, 0, 1}`
    pub fn from_counts(num: usize, den: usize) -> Self {
        if den == 0 {
            return Self::zero();
        }
        Self {
            val: num as f64 / den as f64,
            num,
            den,
        }
    }

    pub fn zero() -> Self {
        Self {
            val: 0.0,
            num: 0,
            den: 1,
        }
    }
}

impl Default for Confidence {
    fn default() -> Self {
        Self::zero()
    }
}

// ============================================================================
// Strategy selection
// ============================================================================

/// Denominator used by set-overlap strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Overlap {
    /// |A ∩ B| / |A ∪ B|
    Jaccard,
    /// |A ∩ B| / |A|, how much of the unknown the library covers
    Coverage,
}

/// How function token lists are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strictness {
    /// Distinct tokens only
    Loose,
    /// Token multiplicity counts (min counts over max counts)
    Strict,
}

/// The available similarity strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    Literals(Overlap),
    FunctionNames(Overlap),
    StatementTypes(Overlap),
    FunctionTokens(Strictness),
}

impl Default for Strategy {
    fn default() -> Self {
        Self::FunctionTokens(Strictness::Loose)
    }
}

impl Strategy {
    pub const ALL: [Strategy; 8] = [
        Strategy::Literals(Overlap::Jaccard),
        Strategy::Literals(Overlap::Coverage),
        Strategy::FunctionNames(Overlap::Jaccard),
        Strategy::FunctionNames(Overlap::Coverage),
        Strategy::StatementTypes(Overlap::Jaccard),
        Strategy::StatementTypes(Overlap::Coverage),
        Strategy::FunctionTokens(Strictness::Loose),
        Strategy::FunctionTokens(Strictness::Strict),
    ];

    /// Configuration name, e.g. `literals-jaccard`
    pub fn name(&self) -> &'static str {
        match self {
            Self::Literals(Overlap::Jaccard) => "literals-jaccard",
            Self::Literals(Overlap::Coverage) => "literals-coverage",
            Self::FunctionNames(Overlap::Jaccard) => "function-names-jaccard",
            Self::FunctionNames(Overlap::Coverage) => "function-names-coverage",
            Self::StatementTypes(Overlap::Jaccard) => "statement-types-jaccard",
            Self::StatementTypes(Overlap::Coverage) => "statement-types-coverage",
            Self::FunctionTokens(Strictness::Loose) => "function-tokens-loose",
            Self::FunctionTokens(Strictness::Strict) => "function-tokens-strict",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = FingerprintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::ALL
            .iter()
            .find(|strategy| strategy.name() == s)
            .copied()
            .ok_or_else(|| FingerprintError::Config {
                message: format!("Unknown similarity strategy '{}'", s),
            })
    }
}

impl Serialize for Strategy {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Strategy {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Results
// ============================================================================

/// Best library function found for one unknown function
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedFunction {
    pub matched_index: usize,
    pub prob: Confidence,
}

/// Unknown function index -> its best library match
pub type MatchMap = BTreeMap<usize, MatchedFunction>;

/// One entry of a sorted match list
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionMatch {
    pub unknown_index: usize,
    pub matched_index: usize,
    pub prob: Confidence,
}

/// Result of one unknown-vs-library comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    #[serde(flatten)]
    pub confidence: Confidence,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matches: Vec<FunctionMatch>,
}

/// Match list sorted by descending confidence, then unknown index
pub fn sorted_matches(map: &MatchMap) -> Vec<FunctionMatch> {
    let mut matches: Vec<FunctionMatch> = map
        .iter()
        .map(|(unknown_index, m)| FunctionMatch {
            unknown_index: *unknown_index,
            matched_index: m.matched_index,
            prob: m.prob,
        })
        .collect();
    matches.sort_by(|a, b| {
        b.prob
            .val
            .total_cmp(&a.prob.val)
            .then_with(|| a.unknown_index.cmp(&b.unknown_index))
    });
    matches
}

// ============================================================================
// Strategy trait
// ============================================================================

/// A way of scoring an unknown signature against a library signature
pub trait SimilarityStrategy {
    fn score(&self, unknown: &Signature, library: &Signature) -> Confidence;

    /// Per-function alignment, for strategies that have one
    fn match_functions(&self, _unknown: &Signature, _library: &Signature) -> Option<MatchMap> {
        None
    }

    /// Score plus the sorted match list
    fn compare(&self, unknown: &Signature, library: &Signature) -> Comparison {
        Comparison {
            confidence: self.score(unknown, library),
            matches: self
                .match_functions(unknown, library)
                .map(|map| sorted_matches(&map))
                .unwrap_or_default(),
        }
    }
}

impl SimilarityStrategy for Strategy {
    fn score(&self, unknown: &Signature, library: &Signature) -> Confidence {
        match *self {
            Self::Literals(overlap) => set_overlap(
                unknown.literal_signature.iter().collect(),
                library.literal_signature.iter().collect(),
                overlap,
            ),
            Self::FunctionNames(overlap) => set_overlap(
                function_names(unknown),
                function_names(library),
                overlap,
            ),
            Self::StatementTypes(overlap) => set_overlap(
                statement_types(unknown),
                statement_types(library),
                overlap,
            ),
            Self::FunctionTokens(strictness) => align_functions(unknown, library, strictness).0,
        }
    }

    fn match_functions(&self, unknown: &Signature, library: &Signature) -> Option<MatchMap> {
        match *self {
            Self::FunctionTokens(strictness) => Some(align_functions(unknown, library, strictness).1),
            _ => None,
        }
    }

    fn compare(&self, unknown: &Signature, library: &Signature) -> Comparison {
        match *self {
            Self::FunctionTokens(strictness) => {
                let (confidence, map) = align_functions(unknown, library, strictness);
                Comparison {
                    confidence,
                    matches: sorted_matches(&map),
                }
            }
            _ => Comparison {
                confidence: self.score(unknown, library),
                matches: Vec::new(),
            },
        }
    }
}

// ============================================================================
// Set overlap
// ============================================================================

/// Raw `(|A ∩ B|, |A ∪ B|)` of two sets
pub fn jaccard_counts<T: Eq + Hash>(a: &HashSet<T>, b: &HashSet<T>) -> (usize, usize) {
    let intersection = a.intersection(b).count();
    (intersection, a.len() + b.len() - intersection)
}

/// Jaccard confidence of two sets
pub fn jaccard<T: Eq + Hash>(a: &HashSet<T>, b: &HashSet<T>) -> Confidence {
    let (num, den) = jaccard_counts(a, b);
    Confidence::from_counts(num, den)
}

fn set_overlap<T: Eq + Hash>(unknown: HashSet<T>, library: HashSet<T>, overlap: Overlap) -> Confidence {
    let (num, union) = jaccard_counts(&unknown, &library);
    let den = match overlap {
        Overlap::Jaccard => union,
        Overlap::Coverage => unknown.len(),
    };
    Confidence::from_counts(num, den)
}

fn function_names(signature: &Signature) -> HashSet<&str> {
    signature
        .function_signature
        .iter()
        .map(|f| f.name.as_str())
        .collect()
}

fn statement_types(signature: &Signature) -> HashSet<&str> {
    signature
        .function_signature
        .iter()
        .flat_map(|f| f.fn_statement_types.iter().map(String::as_str))
        .collect()
}

// ============================================================================
// Function-token alignment
// ============================================================================

/// Token bag of one function, prepared once per comparison
enum TokenBag<'a> {
    Set(HashSet<&'a str>),
    Multiset(HashMap<&'a str, usize>),
}

impl<'a> TokenBag<'a> {
    fn new(function: &'a FunctionSignature, strictness: Strictness) -> Self {
        let tokens = function.fn_statement_tokens.iter().map(String::as_str);
        match strictness {
            Strictness::Loose => Self::Set(tokens.collect()),
            Strictness::Strict => {
                let mut counts = HashMap::new();
                for token in tokens {
                    *counts.entry(token).or_insert(0) += 1;
                }
                Self::Multiset(counts)
            }
        }
    }

    /// Size of the bag (denominator against an empty library)
    fn size(&self) -> usize {
        match self {
            Self::Set(set) => set.len(),
            Self::Multiset(counts) => counts.values().sum(),
        }
    }

    /// Raw `(num, den)` overlap with another bag of the same kind
    fn overlap(&self, other: &TokenBag<'a>) -> (usize, usize) {
        match (self, other) {
            (Self::Set(a), Self::Set(b)) => jaccard_counts(a, b),
            (Self::Multiset(a), Self::Multiset(b)) => {
                let mut num = 0;
                let mut den = 0;
                for (token, &count) in a {
                    let theirs = b.get(token).copied().unwrap_or(0);
                    num += count.min(theirs);
                    den += count.max(theirs);
                }
                for (token, &count) in b {
                    if !a.contains_key(token) {
                        den += count;
                    }
                }
                (num, den)
            }
            _ => (0, self.size() + other.size()),
        }
    }
}

/// Pair each unknown function with its best library function
fn align_functions(
    unknown: &Signature,
    library: &Signature,
    strictness: Strictness,
) -> (Confidence, MatchMap) {
    let library_bags: Vec<(usize, TokenBag)> = library
        .function_signature
        .iter()
        .map(|f| (f.index, TokenBag::new(f, strictness)))
        .collect();

    let mut map = MatchMap::new();
    let mut total_num = 0;
    let mut total_den = 0;

    for function in &unknown.function_signature {
        let bag = TokenBag::new(function, strictness);

        // (library index, num, den, val) of the best pair so far
        let mut best: Option<(usize, usize, usize, f64)> = None;
        for (library_index, library_bag) in &library_bags {
            let (num, den) = bag.overlap(library_bag);
            let val = Confidence::from_counts(num, den).val;
            let better = match best {
                None => true,
                Some((best_index, _, _, best_val)) => {
                    val > best_val || (val == best_val && *library_index < best_index)
                }
            };
            if better {
                best = Some((*library_index, num, den, val));
            }
        }

        // A function with no overlap anywhere counts only its own size
        match best {
            Some((matched_index, num, den, val)) if val > 0.0 => {
                total_num += num;
                total_den += den;
                map.insert(
                    function.index,
                    MatchedFunction {
                        matched_index,
                        prob: Confidence::from_counts(num, den),
                    },
                );
            }
            _ => total_den += bag.size(),
        }
    }

    (Confidence::from_counts(total_num, total_den), map)
}
