//! Function locator
//!
//! Finds every function in a source unit, names it, and tokenizes its body.
//! Function-like nodes are emitted under their own name; nodes that merely
//! hold a function value (declarators, assignments, object properties,
//! returns) name the function after the syntactic container. Both keep
//! descending so nested functions show up as children.

use std::collections::HashSet;

use tree_sitter::Node;

use crate::error::Result;
use crate::syntax::{
    is_function_like, node_text, operator, significant_children, string_content,
    template_chunks, unwrap_parens,
};
use crate::tokenizer::{tokenize, TokenizeOptions, DEFAULT_MAX_EXPRESSION_DEPTH};
use crate::walker::{walk, NodeFilter, TreePath, WalkSignal};

/// Name used when no name can be inferred
pub const ANONYMOUS: &str = "[anonymous]";

/// A function found in the tree, before flattening
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedFunction {
    /// Local name (own identifier or the one inferred from its container)
    pub name: String,
    /// Sorted statement tokens of the function body
    pub tokens: Vec<String>,
}

/// Tree filter that emits one [`LocatedFunction`] per function
pub struct FunctionLocator<'s> {
    source: &'s str,
    options: TokenizeOptions,
    /// Function nodes already emitted through a container, by node id
    handled: HashSet<usize>,
}

impl<'s> FunctionLocator<'s> {
    pub fn new(source: &'s str, options: TokenizeOptions) -> Self {
        Self {
            source,
            options,
            handled: HashSet::new(),
        }
    }

    fn located(&mut self, function: Node, name: String) -> Result<WalkSignal<LocatedFunction>> {
        self.handled.insert(function.id());
        let tokens = tokenize(function, self.source, &self.options)?;
        Ok(WalkSignal::emit(LocatedFunction { name, tokens }))
    }

    /// Own identifier of a function node, if it has one
    fn own_name(&self, function: &Node) -> Option<String> {
        let name = function.child_by_field_name("name")?;
        key_name(name, self.source)
    }

    /// The function value held by a container node, with the node naming it
    fn container_parts<'t>(&self, node: &Node<'t>) -> Option<(Node<'t>, Option<Node<'t>>)> {
        let (value, target) = match node.kind() {
            "variable_declarator" => (
                node.child_by_field_name("value")?,
                node.child_by_field_name("name"),
            ),
            "assignment_expression"
            | "augmented_assignment_expression"
            | "assignment_pattern"
            | "object_assignment_pattern" => (
                node.child_by_field_name("right")?,
                node.child_by_field_name("left"),
            ),
            "pair" => (
                node.child_by_field_name("value")?,
                node.child_by_field_name("key"),
            ),
            "field_definition" => (
                node.child_by_field_name("value")?,
                node.child_by_field_name("property"),
            ),
            "return_statement" => (significant_children(node).into_iter().next()?, None),
            _ => return None,
        };
        let value = unwrap_parens(value);
        if is_function_like(value.kind()) && !self.handled.contains(&value.id()) {
            Some((value, target))
        } else {
            None
        }
    }
}

impl<'tree, 's> NodeFilter<'tree> for FunctionLocator<'s> {
    type Output = LocatedFunction;

    fn visit(&mut self, _path: &str, node: Node<'tree>) -> Result<WalkSignal<LocatedFunction>> {
        if let Some((function, target)) = self.container_parts(&node) {
            let name = self
                .own_name(&function)
                .or_else(|| target.and_then(|t| target_name(t, self.source)))
                .unwrap_or_else(|| ANONYMOUS.to_string());
            return self.located(function, name);
        }

        if is_function_like(node.kind()) {
            if self.handled.contains(&node.id()) {
                return Ok(WalkSignal::pass());
            }
            let name = self
                .own_name(&node)
                .unwrap_or_else(|| ANONYMOUS.to_string());
            return self.located(node, name);
        }

        Ok(WalkSignal::pass())
    }
}

/// Name implied by an assignment target or declarator binding
fn target_name(target: Node, source: &str) -> Option<String> {
    let target = unwrap_parens(target);
    match target.kind() {
        "member_expression" => {
            let property = target.child_by_field_name("property")?;
            key_name(property, source)
        }
        "subscript_expression" => {
            let index = target.child_by_field_name("index")?;
            key_name(index, source)
        }
        _ => key_name(target, source),
    }
}

/// Name implied by an identifier, literal key or computed key
pub fn key_name(key: Node, source: &str) -> Option<String> {
    key_name_within(key, source, DEFAULT_MAX_EXPRESSION_DEPTH)
}

/// [`key_name`] with a budget for nested concatenations
fn key_name_within(key: Node, source: &str, budget: usize) -> Option<String> {
    let budget = budget.checked_sub(1)?;
    let key = unwrap_parens(key);
    match key.kind() {
        "identifier"
        | "property_identifier"
        | "private_property_identifier"
        | "shorthand_property_identifier"
        | "shorthand_property_identifier_pattern"
        | "statement_identifier"
        | "number"
        | "regex" => Some(node_text(&key, source).to_string()),
        "string" => Some(string_content(&key, source).to_string()),
        "null" => Some("null".to_string()),
        "template_string" => Some(template_chunks(&key, source).concat()),
        "computed_property_name" => {
            let inner = significant_children(&key).into_iter().next()?;
            key_name_within(inner, source, budget)
        }
        "binary_expression" => {
            let left = key_name_within(key.child_by_field_name("left")?, source, budget)?;
            let right = key_name_within(key.child_by_field_name("right")?, source, budget)?;
            Some(format!("{}{}{}", left, operator(&key).unwrap_or(""), right))
        }
        "member_expression" => {
            key_name_within(key.child_by_field_name("property")?, source, budget)
        }
        _ => None,
    }
}

/// Locate every function below `root`, as a forest mirroring their nesting
pub fn locate_functions(
    root: Node,
    source: &str,
    options: &TokenizeOptions,
) -> Result<Vec<TreePath<LocatedFunction>>> {
    let mut locator = FunctionLocator::new(source, *options);
    let found = walk(root, &mut locator)?;
    tracing::debug!(
        "Located {} functions",
        found.iter().map(TreePath::size).sum::<usize>()
    );
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::Lang;
    use crate::parsing::parse_source;

    fn names(forest: &[TreePath<LocatedFunction>]) -> Vec<String> {
        let mut out = Vec::new();
        let mut stack: Vec<&TreePath<LocatedFunction>> = forest.iter().rev().collect();
        while let Some(entry) = stack.pop() {
            out.push(entry.data.name.clone());
            stack.extend(entry.children.iter().rev());
        }
        out
    }

    fn locate(source: &str) -> Vec<TreePath<LocatedFunction>> {
        let unit = parse_source(source, Lang::JavaScript).unwrap();
        locate_functions(unit.root(), unit.source(), &TokenizeOptions::default()).unwrap()
    }

    #[test]
    fn test_declarations_and_anonymous() {
        let found = locate("function a(){} (function(){})(); [1].map(x => x);");
        assert_eq!(names(&found), vec!["a", ANONYMOUS, ANONYMOUS]);
    }

    #[test]
    fn test_container_names() {
        let found = locate(
            "var b = function(){}; obj.c = () => 1; o['d' + e] = function(){}; \
             var x = { f: function(){}, 'g': () => 0, h(){} }; \
             function k(p = function(){}){}",
        );
        assert_eq!(names(&found), vec!["b", "c", "d+e", "f", "g", "h", "k", "p"]);
    }

    #[test]
    fn test_destructuring_default_names_function() {
        let found = locate("var { a = function(){ go(); } } = o;");
        assert_eq!(names(&found), vec!["a"]);
    }

    #[test]
    fn test_oversized_computed_key_falls_back_to_anonymous() {
        let key = vec!["k"; 2000].join("+");
        let found = locate(&format!("o[{}] = function(){{}};", key));
        assert_eq!(names(&found), vec![ANONYMOUS]);
    }

    #[test]
    fn test_own_name_wins_over_container() {
        let found = locate("var b = function inner(){};");
        assert_eq!(names(&found), vec!["inner"]);
    }

    #[test]
    fn test_nested_three_levels() {
        let found = locate("function a(){ function b(){ var c = function(){ return () => 1; }; } }");
        assert_eq!(found.len(), 1);
        assert_eq!(names(&found), vec!["a", "b", "c", ANONYMOUS]);
        let c = &found[0].children[0].children[0];
        assert_eq!(c.data.name, "c");
        assert_eq!(c.children.len(), 1);
    }

    #[test]
    fn test_return_container_not_emitted_twice() {
        let found = locate("var f = function(){ return function(){ return 1; }; };");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].children.len(), 1);
        assert_eq!(found[0].size(), 2);
    }

    #[test]
    fn test_class_methods() {
        let found = locate("class A { constructor(){} #secret(){} static ['x'](){} }");
        assert_eq!(names(&found), vec!["constructor", "#secret", "x"]);
    }

    #[test]
    fn test_tokens_are_attached() {
        let found = locate("function a(){ return 1; }");
        assert_eq!(found[0].data.tokens, vec!["STATEMENT:Return[LITERAL:Numeric]"]);
    }
}
