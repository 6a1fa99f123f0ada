//! Statement/expression tokenizer
//!
//! Turns one function node into a sorted list of canonical structural
//! tokens shaped `CATEGORY:Kind[predicate]`. The predicate recursively embeds
//! the tokens of operands and children, in source order.
//!
//! Tradeoffs baked into the token vocabulary:
//!
//! - Literal values are abstracted to their type tag (`LITERAL:String`), so
//!   changing a constant does not change the token.
//! - Identifier names are kept verbatim.
//! - The top-level list is sorted, so statement order is not part of the
//!   fingerprint; order inside a predicate is.
//! - Block-bodied statements (`if`, loops, `switch`, `try`) emit a header
//!   token and then the tokens of their body statements as separate entries.
//! - Nested functions contribute a single token; their bodies are tokenized
//!   as functions of their own.
//! - Unmodelled syntax degrades to `t_CATEGORY:raw_kind` with a one-time
//!   warning instead of failing.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tree_sitter::Node;

use crate::error::{FingerprintError, Result};
use crate::syntax::{
    is_directive, node_text, operator, significant_children, string_content, unwrap_parens,
};

/// Default nesting limit for statements and expression predicates combined
///
/// Kept low enough that a full-depth descent fits a 2 MiB thread stack in
/// an unoptimized build.
pub const DEFAULT_MAX_EXPRESSION_DEPTH: usize = 256;

/// Which tokens to emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenMode {
    /// Every token, including variable and parameter declarations
    #[default]
    Full,
    /// Omit variable-declaration and parameter tokens entirely
    SkipDeclarations,
}

/// Options controlling tokenization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenizeOptions {
    pub mode: TokenMode,
    pub max_expression_depth: usize,
}

impl Default for TokenizeOptions {
    fn default() -> Self {
        Self {
            mode: TokenMode::Full,
            max_expression_depth: DEFAULT_MAX_EXPRESSION_DEPTH,
        }
    }
}

impl TokenizeOptions {
    pub fn with_mode(mut self, mode: TokenMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Token categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Declaration,
    Directive,
    Expression,
    Literal,
    Parameter,
    Statement,
    /// Node could not be placed in any category
    Unknown,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Declaration => "DECLARATION",
            Self::Directive => "DIRECTIVE",
            Self::Expression => "EXPRESSION",
            Self::Literal => "LITERAL",
            Self::Parameter => "PARAMETER",
            Self::Statement => "STATEMENT",
            Self::Unknown => "UNKNOWN",
        }
    }
}

/// Kinds already reported as unrecognized, so each is logged once per process
static REPORTED_KINDS: Lazy<Mutex<HashSet<String>>> = Lazy::new(|| Mutex::new(HashSet::new()));

/// Build the degraded token for an unmodelled node kind
pub fn fallback_token(category: Category, raw_kind: &str) -> String {
    let token = format!("t_{}:{}", category.as_str(), raw_kind);
    if REPORTED_KINDS.lock().insert(token.clone()) {
        tracing::warn!(
            "Unrecognized {} kind '{}', emitting fallback token",
            category.as_str(),
            raw_kind
        );
    }
    token
}

/// Format a token from its parts
fn token(category: Category, kind: &str, parts: &[String]) -> String {
    if parts.is_empty() {
        format!("{}:{}", category.as_str(), kind)
    } else {
        format!("{}:{}[{}]", category.as_str(), kind, parts.join(","))
    }
}

/// The `CATEGORY:Kind` prefix of a token (its predicate removed)
pub fn token_kind(token: &str) -> &str {
    match token.find('[') {
        Some(pos) => &token[..pos],
        None => token,
    }
}

/// Sorted statement-type tags of a token list
pub fn statement_types(tokens: &[String]) -> Vec<String> {
    let mut kinds: Vec<String> = tokens.iter().map(|t| token_kind(t).to_string()).collect();
    kinds.sort();
    kinds
}

/// Tokenize one function-like node.
///
/// # Errors
///
/// Returns `FingerprintError::MalformedNode` if the node has no body, which
/// only happens when the tree does not come from a JavaScript grammar.
pub fn tokenize(function: Node, source: &str, options: &TokenizeOptions) -> Result<Vec<String>> {
    let mut tokenizer = Tokenizer {
        source,
        options,
        tokens: Vec::new(),
    };
    tokenizer.function(function)?;

    let mut tokens = tokenizer.tokens;
    tokens.sort();
    Ok(tokens)
}

struct Tokenizer<'a> {
    source: &'a str,
    options: &'a TokenizeOptions,
    tokens: Vec<String>,
}

impl<'a> Tokenizer<'a> {
    fn text(&self, node: &Node) -> &'a str {
        node_text(node, self.source)
    }

    fn emit_declarations(&self) -> bool {
        self.options.mode == TokenMode::Full
    }

    // ------------------------------------------------------------------------
    // Functions
    // ------------------------------------------------------------------------

    fn function(&mut self, node: Node) -> Result<()> {
        let body = node
            .child_by_field_name("body")
            .ok_or_else(|| FingerprintError::MalformedNode {
                kind: node.kind().to_string(),
                path: format!(
                    "line {} column {}",
                    node.start_position().row + 1,
                    node.start_position().column + 1
                ),
                field: "body",
            })?;

        if self.emit_declarations() {
            if let Some(params) = node.child_by_field_name("parameters") {
                for param in significant_children(&params) {
                    let rendered = self.parameter(param, 0);
                    self.tokens.push(rendered);
                }
            } else if let Some(param) = node.child_by_field_name("parameter") {
                // Arrow function with a single bare parameter
                let rendered = self.parameter(param, 0);
                self.tokens.push(rendered);
            }
        }

        if body.kind() == "statement_block" {
            for statement in significant_children(&body) {
                self.statement(statement, 0);
            }
        } else {
            // Arrow function with an expression body
            let rendered = self.expression(body, 0);
            self.tokens.push(rendered);
        }
        Ok(())
    }

    fn parameter(&self, node: Node, depth: usize) -> String {
        if depth > self.options.max_expression_depth {
            return fallback_token(Category::Parameter, "depth-limit");
        }
        let p = Category::Parameter;
        match node.kind() {
            "identifier" | "shorthand_property_identifier_pattern" => {
                token(p, "Identifier", &[self.text(&node).to_string()])
            }
            "assignment_pattern" | "object_assignment_pattern" => {
                let left = node
                    .child_by_field_name("left")
                    .map(|l| self.parameter(l, depth + 1))
                    .unwrap_or_default();
                let right = node
                    .child_by_field_name("right")
                    .map(|r| self.expression(r, depth + 1))
                    .unwrap_or_default();
                token(p, "Assignment", &[left, right])
            }
            "rest_pattern" => {
                let inner: Vec<String> = significant_children(&node)
                    .into_iter()
                    .map(|c| self.parameter(c, depth + 1))
                    .collect();
                token(p, "Rest", &inner)
            }
            "object_pattern" => {
                let entries: Vec<String> = significant_children(&node)
                    .into_iter()
                    .map(|entry| match entry.kind() {
                        "pair_pattern" => {
                            let key = entry
                                .child_by_field_name("key")
                                .map(|k| self.property_key(k, depth + 1))
                                .unwrap_or_default();
                            let value = entry
                                .child_by_field_name("value")
                                .map(|v| self.parameter(v, depth + 1))
                                .unwrap_or_default();
                            format!("{}:{}", key, value)
                        }
                        _ => self.parameter(entry, depth + 1),
                    })
                    .collect();
                token(p, "Object", &entries)
            }
            "array_pattern" => {
                let entries: Vec<String> = significant_children(&node)
                    .into_iter()
                    .map(|e| self.parameter(e, depth + 1))
                    .collect();
                token(p, "Array", &entries)
            }
            // TypeScript wraps each parameter; the type annotation is dropped
            "required_parameter" | "optional_parameter" => {
                let pattern = node
                    .child_by_field_name("pattern")
                    .map(|pat| self.parameter(pat, depth + 1))
                    .unwrap_or_else(|| fallback_token(p, node.kind()));
                match node.child_by_field_name("value") {
                    Some(value) => token(p, "Assignment", &[pattern, self.expression(value, depth + 1)]),
                    None => pattern,
                }
            }
            "this" => token(p, "This", &[]),
            other => fallback_token(p, other),
        }
    }

    // ------------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------------

    /// Body of a compound statement, one level below `depth`
    fn statements_of(&mut self, node: Node, depth: usize) {
        if node.kind() == "statement_block" {
            for statement in significant_children(&node) {
                self.statement(statement, depth + 1);
            }
        } else {
            self.statement(node, depth + 1);
        }
    }

    fn condition(&self, node: &Node, field: &str, depth: usize) -> String {
        node.child_by_field_name(field)
            .map(|c| self.expression(c, depth + 1))
            .unwrap_or_default()
    }

    fn statement(&mut self, node: Node, depth: usize) {
        let s = Category::Statement;
        if depth > self.options.max_expression_depth {
            self.tokens.push(fallback_token(s, "depth-limit"));
            return;
        }
        match node.kind() {
            "expression_statement" => {
                if is_directive(&node) {
                    let text = significant_children(&node)
                        .first()
                        .map(|lit| string_content(lit, self.source).to_string())
                        .unwrap_or_default();
                    self.tokens.push(token(Category::Directive, "Directive", &[text]));
                    return;
                }
                for expr in significant_children(&node) {
                    let rendered = self.expression(expr, depth);
                    self.tokens.push(rendered);
                }
            }
            "variable_declaration" | "lexical_declaration" => {
                if self.emit_declarations() {
                    let rendered = self.variable_declaration(node, depth);
                    self.tokens.push(rendered);
                }
            }
            "function_declaration" => {
                let name = self.declared_name(&node);
                self.tokens.push(token(Category::Declaration, "Function", &name));
            }
            "generator_function_declaration" => {
                let name = self.declared_name(&node);
                self.tokens.push(token(Category::Declaration, "Generator", &name));
            }
            "class_declaration" => {
                let rendered = self.class(node, Category::Declaration, depth);
                self.tokens.push(rendered);
            }
            "statement_block" => {
                for statement in significant_children(&node) {
                    self.statement(statement, depth + 1);
                }
            }
            "if_statement" => self.if_chain(node, depth),
            "for_statement" => {
                let parts = ["initializer", "condition", "increment"]
                    .iter()
                    .map(|field| {
                        node.child_by_field_name(field)
                            .map(|part| self.for_clause(part, depth))
                            .unwrap_or_default()
                    })
                    .collect::<Vec<_>>();
                self.tokens.push(token(s, "For", &parts));
                if let Some(body) = node.child_by_field_name("body") {
                    self.statements_of(body, depth);
                }
            }
            "for_in_statement" => {
                let tag = match node.child_by_field_name("operator").map(|op| op.kind()) {
                    Some("of") => "ForOf",
                    _ => "ForIn",
                };
                let mut parts = Vec::new();
                if let Some(kind) = node.child_by_field_name("kind") {
                    parts.push(kind.kind().to_string());
                }
                parts.push(self.condition(&node, "left", depth));
                parts.push(self.condition(&node, "right", depth));
                self.tokens.push(token(s, tag, &parts));
                if let Some(body) = node.child_by_field_name("body") {
                    self.statements_of(body, depth);
                }
            }
            "while_statement" => {
                let test = self.condition(&node, "condition", depth);
                self.tokens.push(token(s, "While", &[test]));
                if let Some(body) = node.child_by_field_name("body") {
                    self.statements_of(body, depth);
                }
            }
            "do_statement" => {
                let test = self.condition(&node, "condition", depth);
                self.tokens.push(token(s, "DoWhile", &[test]));
                if let Some(body) = node.child_by_field_name("body") {
                    self.statements_of(body, depth);
                }
            }
            "return_statement" | "throw_statement" => {
                let tag = if node.kind() == "return_statement" {
                    "Return"
                } else {
                    "Throw"
                };
                let parts: Vec<String> = significant_children(&node)
                    .into_iter()
                    .map(|e| self.expression(e, depth + 1))
                    .collect();
                self.tokens.push(token(s, tag, &parts));
            }
            "break_statement" | "continue_statement" => {
                let tag = if node.kind() == "break_statement" {
                    "Break"
                } else {
                    "Continue"
                };
                let parts: Vec<String> = node
                    .child_by_field_name("label")
                    .map(|label| vec![self.text(&label).to_string()])
                    .unwrap_or_default();
                self.tokens.push(token(s, tag, &parts));
            }
            "try_statement" => self.try_statement(node, depth),
            "switch_statement" => self.switch_statement(node, depth),
            "labeled_statement" => {
                let label = node
                    .child_by_field_name("label")
                    .map(|l| self.text(&l).to_string())
                    .unwrap_or_default();
                self.tokens.push(token(s, "Labeled", &[label]));
                if let Some(body) = node.child_by_field_name("body") {
                    self.statements_of(body, depth);
                }
            }
            "with_statement" => {
                let object = self.condition(&node, "object", depth);
                self.tokens.push(token(s, "With", &[object]));
                if let Some(body) = node.child_by_field_name("body") {
                    self.statements_of(body, depth);
                }
            }
            "debugger_statement" => self.tokens.push(token(s, "Debugger", &[])),
            "empty_statement" => {}
            "export_statement" => match node.child_by_field_name("declaration") {
                Some(declaration) => self.statement(declaration, depth),
                None => self.tokens.push(fallback_token(s, node.kind())),
            },
            other if other.ends_with("_statement") => self.tokens.push(fallback_token(s, other)),
            other if other.ends_with("declaration") => {
                self.tokens.push(fallback_token(Category::Declaration, other))
            }
            other => self.tokens.push(fallback_token(Category::Unknown, other)),
        }
    }

    /// An `if` and its `else if` links, walked as a loop so long chains
    /// do not nest the call stack
    fn if_chain(&mut self, node: Node, depth: usize) {
        let s = Category::Statement;
        let mut current = node;
        let mut tag = "If";
        loop {
            let test = self.condition(&current, "condition", depth);
            self.tokens.push(token(s, tag, &[test]));

            if let Some(consequence) = current.child_by_field_name("consequence") {
                self.statements_of(consequence, depth);
            }
            let Some(alternative) = current.child_by_field_name("alternative") else {
                break;
            };

            // The alternative is an else_clause wrapping one statement
            let inner = if alternative.kind() == "else_clause" {
                significant_children(&alternative).into_iter().next()
            } else {
                Some(alternative)
            };
            match inner {
                Some(next) if next.kind() == "if_statement" => {
                    current = next;
                    tag = "Else-If";
                }
                Some(other) => {
                    self.tokens.push(token(s, "Else", &[]));
                    self.statements_of(other, depth);
                    break;
                }
                None => {
                    self.tokens.push(token(s, "Else", &[]));
                    break;
                }
            }
        }
    }

    fn try_statement(&mut self, node: Node, depth: usize) {
        let handler = node.child_by_field_name("handler");
        let finalizer = node.child_by_field_name("finalizer");

        let mut tag = String::from("Try");
        if handler.is_some() {
            tag.push_str("-Catch");
        }
        if finalizer.is_some() {
            tag.push_str("-Finally");
        }

        let param: Vec<String> = handler
            .and_then(|h| h.child_by_field_name("parameter"))
            .map(|p| vec![self.binding_name(p, depth + 1)])
            .unwrap_or_default();
        self.tokens.push(token(Category::Statement, &tag, &param));

        if let Some(body) = node.child_by_field_name("body") {
            self.statements_of(body, depth);
        }
        for clause in [handler, finalizer].into_iter().flatten() {
            if let Some(body) = clause.child_by_field_name("body") {
                self.statements_of(body, depth);
            }
        }
    }

    fn switch_statement(&mut self, node: Node, depth: usize) {
        let mut parts = vec![self.condition(&node, "value", depth)];
        let cases = node
            .child_by_field_name("body")
            .map(|body| significant_children(&body))
            .unwrap_or_default();

        for case in &cases {
            match case.child_by_field_name("value") {
                Some(test) => parts.push(self.expression(test, depth + 1)),
                None => parts.push("default".to_string()),
            }
        }
        self.tokens.push(token(Category::Statement, "Switch", &parts));

        for case in cases {
            let test_id = case.child_by_field_name("value").map(|v| v.id());
            for statement in significant_children(&case) {
                if Some(statement.id()) != test_id {
                    self.statement(statement, depth + 1);
                }
            }
        }
    }

    /// One clause of a classic `for (init; test; update)` header
    fn for_clause(&self, node: Node, depth: usize) -> String {
        match node.kind() {
            "variable_declaration" | "lexical_declaration" => self.variable_declaration(node, depth + 1),
            "expression_statement" => significant_children(&node)
                .into_iter()
                .map(|e| self.expression(e, depth + 1))
                .collect::<Vec<_>>()
                .join(","),
            "empty_statement" => String::new(),
            _ => self.expression(node, depth + 1),
        }
    }

    fn variable_declaration(&self, node: Node, depth: usize) -> String {
        let kind = match node.kind() {
            "variable_declaration" => "var",
            _ => node
                .child_by_field_name("kind")
                .map(|k| k.kind())
                .unwrap_or("let"),
        };
        let mut parts = vec![kind.to_string()];
        for declarator in significant_children(&node) {
            if declarator.kind() != "variable_declarator" {
                continue;
            }
            let mut inner = Vec::new();
            if let Some(name) = declarator.child_by_field_name("name") {
                inner.push(self.binding_name(name, depth + 1));
            }
            if let Some(value) = declarator.child_by_field_name("value") {
                inner.push(self.expression(value, depth + 1));
            }
            parts.push(format!("Declarator[{}]", inner.join(",")));
        }
        token(Category::Declaration, "Variable", &parts)
    }

    /// Name of a declaration as a one-element predicate (empty if anonymous)
    fn declared_name(&self, node: &Node) -> Vec<String> {
        node.child_by_field_name("name")
            .map(|n| vec![self.text(&n).to_string()])
            .unwrap_or_default()
    }

    /// A binding target: bare identifiers stay bare, patterns are expanded
    fn binding_name(&self, node: Node, depth: usize) -> String {
        match node.kind() {
            "identifier" => self.text(&node).to_string(),
            _ => self.expression(node, depth),
        }
    }

    fn class(&self, node: Node, category: Category, depth: usize) -> String {
        let mut parts = self.declared_name(&node);
        for child in significant_children(&node) {
            if child.kind() == "class_heritage" {
                for heritage in significant_children(&child) {
                    parts.push(self.expression(heritage, depth + 1));
                }
            }
        }
        token(category, "Class", &parts)
    }

    // ------------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------------

    fn field_expr(&self, node: &Node, field: &str, depth: usize) -> String {
        node.child_by_field_name(field)
            .map(|c| self.expression(c, depth + 1))
            .unwrap_or_default()
    }

    fn children_exprs(&self, node: &Node, depth: usize) -> Vec<String> {
        significant_children(node)
            .into_iter()
            .map(|c| self.expression(c, depth + 1))
            .collect()
    }

    fn property_key(&self, key: Node, depth: usize) -> String {
        match key.kind() {
            "property_identifier" | "private_property_identifier" | "identifier" => {
                self.text(&key).to_string()
            }
            "computed_property_name" => format!("[{}]", self.children_exprs(&key, depth).join(",")),
            _ => self.expression(key, depth),
        }
    }

    fn expression(&self, node: Node, depth: usize) -> String {
        if depth > self.options.max_expression_depth {
            return fallback_token(Category::Expression, "depth-limit");
        }

        let node = unwrap_parens(node);
        let e = Category::Expression;
        let l = Category::Literal;

        match node.kind() {
            // Names
            "identifier"
            | "shorthand_property_identifier"
            | "shorthand_property_identifier_pattern"
            | "private_property_identifier"
            | "property_identifier"
            | "undefined" => token(e, "Identifier", &[self.text(&node).to_string()]),
            "this" => token(e, "This", &[]),
            "super" => token(e, "Super", &[]),

            // Literals: type tag only
            "string" => token(l, "String", &[]),
            "template_string" => token(l, "Template", &[]),
            "number" if self.text(&node).ends_with('n') => token(l, "BigInt", &[]),
            "number" => token(l, "Numeric", &[]),
            "regex" => token(l, "RegExp", &[]),
            "true" | "false" => token(l, "Boolean", &[]),
            "null" => token(l, "Null", &[]),

            // Operators
            "binary_expression" => {
                let op = operator(&node).unwrap_or("?");
                let tag = match op {
                    "&&" | "||" | "??" => "Logical",
                    _ => "Binary",
                };
                token(
                    e,
                    tag,
                    &[
                        self.field_expr(&node, "left", depth),
                        op.to_string(),
                        self.field_expr(&node, "right", depth),
                    ],
                )
            }
            "unary_expression" => token(
                e,
                "Unary",
                &[
                    operator(&node).unwrap_or("?").to_string(),
                    self.field_expr(&node, "argument", depth),
                ],
            ),
            "update_expression" => {
                let op = operator(&node).unwrap_or("?").to_string();
                let argument = node.child_by_field_name("argument");
                let prefix = match (node.child_by_field_name("operator"), argument) {
                    (Some(op_node), Some(arg)) => op_node.start_byte() < arg.start_byte(),
                    _ => false,
                };
                let arg = argument
                    .map(|a| self.expression(a, depth + 1))
                    .unwrap_or_default();
                if prefix {
                    token(e, "Update", &[op, arg])
                } else {
                    token(e, "Update", &[arg, op])
                }
            }
            "assignment_expression" => token(
                e,
                "Assignment",
                &[
                    self.field_expr(&node, "left", depth),
                    "=".to_string(),
                    self.field_expr(&node, "right", depth),
                ],
            ),
            "augmented_assignment_expression" => token(
                e,
                "Assignment",
                &[
                    self.field_expr(&node, "left", depth),
                    operator(&node).unwrap_or("?").to_string(),
                    self.field_expr(&node, "right", depth),
                ],
            ),
            "ternary_expression" => token(
                e,
                "Conditional",
                &[
                    self.field_expr(&node, "condition", depth),
                    self.field_expr(&node, "consequence", depth),
                    self.field_expr(&node, "alternative", depth),
                ],
            ),
            "sequence_expression" => token(e, "Sequence", &self.sequence(node, depth)),

            // Calls and member access
            "call_expression" => {
                let callee = self.field_expr(&node, "function", depth);
                let arguments = node.child_by_field_name("arguments");
                match arguments {
                    Some(args) if args.kind() == "template_string" => {
                        token(e, "TaggedTemplate", &[callee, token(l, "Template", &[])])
                    }
                    _ => {
                        let tag = if node.child_by_field_name("optional_chain").is_some() {
                            "OptionalCall"
                        } else {
                            "Call"
                        };
                        let mut parts = vec![callee];
                        if let Some(args) = arguments {
                            parts.extend(self.children_exprs(&args, depth));
                        }
                        token(e, tag, &parts)
                    }
                }
            }
            "new_expression" => {
                let mut parts = vec![self.field_expr(&node, "constructor", depth)];
                if let Some(args) = node.child_by_field_name("arguments") {
                    parts.extend(self.children_exprs(&args, depth));
                }
                token(e, "New", &parts)
            }
            "member_expression" => {
                let tag = if node.child_by_field_name("optional_chain").is_some() {
                    "OptionalMember"
                } else {
                    "Member"
                };
                let property = node
                    .child_by_field_name("property")
                    .map(|p| self.text(&p).to_string())
                    .unwrap_or_default();
                token(e, tag, &[self.field_expr(&node, "object", depth), property])
            }
            "subscript_expression" => token(
                e,
                "ComputedMember",
                &[
                    self.field_expr(&node, "object", depth),
                    self.field_expr(&node, "index", depth),
                ],
            ),

            // Async and generators
            "await_expression" => token(e, "Await", &self.children_exprs(&node, depth)),
            "yield_expression" => {
                let mut parts = Vec::new();
                let mut cursor = node.walk();
                if node.children(&mut cursor).any(|c| c.kind() == "*") {
                    parts.push("*".to_string());
                }
                parts.extend(self.children_exprs(&node, depth));
                token(e, "Yield", &parts)
            }
            "spread_element" => token(e, "Spread", &self.children_exprs(&node, depth)),

            // Aggregates
            "array" => token(e, "Array", &self.children_exprs(&node, depth)),
            "object" => {
                let entries: Vec<String> = significant_children(&node)
                    .into_iter()
                    .map(|entry| self.object_entry(entry, depth + 1))
                    .collect();
                token(e, "Object", &entries)
            }

            // Nested functions and classes contribute a single token
            "function_expression" | "function" => token(e, "Function", &self.declared_name(&node)),
            "generator_function" => token(e, "Generator", &self.declared_name(&node)),
            "arrow_function" => token(e, "ArrowFunction", &[]),
            "class" => self.class(node, e, depth),

            "meta_property" => token(e, "MetaProperty", &[self.text(&node).to_string()]),

            // Destructuring targets
            "object_pattern" => {
                let entries: Vec<String> = significant_children(&node)
                    .into_iter()
                    .map(|entry| self.object_entry(entry, depth + 1))
                    .collect();
                token(e, "ObjectPattern", &entries)
            }
            "array_pattern" => token(e, "ArrayPattern", &self.children_exprs(&node, depth)),
            "assignment_pattern" | "object_assignment_pattern" => token(
                e,
                "AssignmentPattern",
                &[
                    self.field_expr(&node, "left", depth),
                    self.field_expr(&node, "right", depth),
                ],
            ),
            "rest_pattern" => token(e, "Rest", &self.children_exprs(&node, depth)),

            other => fallback_token(e, other),
        }
    }

    fn object_entry(&self, entry: Node, depth: usize) -> String {
        match entry.kind() {
            "pair" | "pair_pattern" => {
                let key = entry
                    .child_by_field_name("key")
                    .map(|k| self.property_key(k, depth))
                    .unwrap_or_default();
                let value = entry
                    .child_by_field_name("value")
                    .map(|v| self.expression(v, depth + 1))
                    .unwrap_or_default();
                format!("Property[{},{}]", key, value)
            }
            "shorthand_property_identifier" | "shorthand_property_identifier_pattern" => {
                format!("Property[{}]", self.text(&entry))
            }
            "method_definition" => {
                let key = entry
                    .child_by_field_name("name")
                    .map(|k| self.property_key(k, depth))
                    .unwrap_or_default();
                format!("Method[{}]", key)
            }
            _ => self.expression(entry, depth),
        }
    }

    /// Operands of a (right- or left-nested) comma sequence, flattened
    fn sequence(&self, node: Node, depth: usize) -> Vec<String> {
        let mut operands = Vec::new();
        let mut pending = vec![node];
        while let Some(current) = pending.pop() {
            for child in significant_children(&current) {
                // Parenthesized sequences stay a single operand
                if child.kind() == "sequence_expression" {
                    pending.push(child);
                } else {
                    operands.push(child);
                }
            }
        }
        operands.sort_by_key(|child| child.start_byte());
        operands
            .into_iter()
            .map(|child| self.expression(child, depth + 1))
            .collect()
    }
}
