//! Node helpers shared by the literal collector, function locator and tokenizer
//!
//! These paper over the places where the tree-sitter JavaScript grammar
//! differs from an ESTree-shaped view of the program: comments are extras
//! that can appear anywhere, parentheses get their own node, and directive
//! prologues are ordinary expression statements.

use tree_sitter::Node;

// ============================================================================
// Node kinds
// ============================================================================

/// Node kinds that are functions in their own right
pub const FUNCTION_KINDS: &[&str] = &[
    "function_declaration",
    "generator_function_declaration",
    "function_expression",
    // Grammar versions before 0.21 named function expressions `function`
    "function",
    "generator_function",
    "arrow_function",
    "method_definition",
];

/// Check if a node kind is function-like
pub fn is_function_like(kind: &str) -> bool {
    FUNCTION_KINDS.contains(&kind)
}

/// Check if a node kind is a comment (tree-sitter extras)
pub fn is_comment(kind: &str) -> bool {
    matches!(kind, "comment" | "html_comment")
}

// ============================================================================
// Text Extraction
// ============================================================================

/// Get text content of a node
pub fn node_text<'s>(node: &Node, source: &'s str) -> &'s str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

/// Text of a string literal without its quotes (escapes left raw)
pub fn string_content<'s>(node: &Node, source: &'s str) -> &'s str {
    let text = node_text(node, source);
    if text.len() >= 2 {
        &text[1..text.len() - 1]
    } else {
        ""
    }
}

/// Static chunks of a template string, split at each substitution
///
/// `` `a${x}b${y}` `` yields `["a", "b", ""]`; a template without
/// substitutions yields a single chunk.
pub fn template_chunks(node: &Node, source: &str) -> Vec<String> {
    let mut chunks = vec![String::new()];
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "template_substitution" => chunks.push(String::new()),
            kind if is_comment(kind) => {}
            _ => {
                if let Some(current) = chunks.last_mut() {
                    current.push_str(node_text(&child, source));
                }
            }
        }
    }
    chunks
}

/// Operator of a binary/unary/update/augmented-assignment node
///
/// Operators are anonymous nodes, so their kind is the operator text.
pub fn operator(node: &Node) -> Option<&'static str> {
    node.child_by_field_name("operator").map(|op| op.kind())
}

// ============================================================================
// Structure
// ============================================================================

/// Named, non-comment children of a node
pub fn significant_children<'t>(node: &Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    let children = node
        .named_children(&mut cursor)
        .filter(|child| !is_comment(child.kind()))
        .collect();
    children
}

/// Strip any number of enclosing parentheses
pub fn unwrap_parens<'t>(node: Node<'t>) -> Node<'t> {
    let mut current = node;
    while current.kind() == "parenthesized_expression" {
        match significant_children(&current).into_iter().next() {
            Some(inner) => current = inner,
            None => break,
        }
    }
    current
}

/// Check if an expression statement is a string-only statement
fn is_string_statement(node: &Node) -> bool {
    if node.kind() != "expression_statement" {
        return false;
    }
    let children = significant_children(node);
    children.len() == 1 && children[0].kind() == "string"
}

/// Check if a statement belongs to a directive prologue (`'use strict';`)
///
/// A directive is a string-only expression statement at the start of a
/// program or function body, preceded only by other directives.
pub fn is_directive(node: &Node) -> bool {
    if !is_string_statement(node) {
        return false;
    }

    let Some(parent) = node.parent() else {
        return false;
    };
    let in_prologue_scope = match parent.kind() {
        "program" => true,
        "statement_block" => parent
            .parent()
            .map(|owner| is_function_like(owner.kind()))
            .unwrap_or(false),
        _ => false,
    };
    if !in_prologue_scope {
        return false;
    }

    for sibling in significant_children(&parent) {
        if sibling.id() == node.id() {
            return true;
        }
        if !is_string_statement(&sibling) {
            return false;
        }
    }
    false
}
