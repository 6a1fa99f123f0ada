//! Signature flattener
//!
//! Collapses the nested function forest into a flat, sorted list of
//! [`FunctionSignature`]s with hierarchical names and stable indices.

use std::collections::{HashMap, HashSet};

use crate::functions::LocatedFunction;
use crate::signature::FunctionSignature;
use crate::tokenizer::statement_types;
use crate::walker::TreePath;

/// Joins a function's name onto its ancestors' path
pub const NAME_DELIMITER: &str = "::";

/// Flatten a located-function forest.
///
/// Names are the `::`-joined chain of local names from the outermost
/// function down. Repeated names get `#1`, `#2`, ... appended in source
/// order, then the list is sorted by name and indexed `0..n`.
pub fn flatten(forest: Vec<TreePath<LocatedFunction>>) -> Vec<FunctionSignature> {
    let mut flat: Vec<(String, Vec<String>)> = Vec::new();
    let mut taken: HashSet<String> = HashSet::new();
    let mut next_suffix: HashMap<String, usize> = HashMap::new();

    // Explicit stack of (parent path, entry), popped in source order
    let mut stack: Vec<(String, TreePath<LocatedFunction>)> = forest
        .into_iter()
        .rev()
        .map(|entry| (String::new(), entry))
        .collect();

    while let Some((prefix, entry)) = stack.pop() {
        let base = if prefix.is_empty() {
            entry.data.name
        } else {
            format!("{}{}{}", prefix, NAME_DELIMITER, entry.data.name)
        };

        // A suffixed name can itself be taken (a literal key `'a#1'`)
        let mut name = base.clone();
        if taken.contains(&name) {
            let suffix = next_suffix.entry(base.clone()).or_insert(1);
            loop {
                name = format!("{}#{}", base, suffix);
                *suffix += 1;
                if !taken.contains(&name) {
                    break;
                }
            }
        }
        taken.insert(name.clone());

        for child in entry.children.into_iter().rev() {
            stack.push((name.clone(), child));
        }
        flat.push((name, entry.data.tokens));
    }

    flat.sort_by(|a, b| a.0.cmp(&b.0));
    flat.into_iter()
        .enumerate()
        .map(|(index, (name, tokens))| FunctionSignature::new(name, index, statement_types(&tokens), tokens))
        .collect()
}
