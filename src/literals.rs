//! Literal signature collection
//!
//! Harvests the discriminative literal values of a source unit: strings,
//! numbers outside the small-integer set, regular expressions and the static
//! text of template literals. Booleans, `null` and `undefined` are never
//! captured, and each captured literal stops the walk at that node.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::BTreeSet;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize, Serializer};
use tree_sitter::Node;

use crate::error::Result;
use crate::syntax::{is_directive, node_text, operator, string_content, template_chunks};
use crate::walker::{walk, NodeFilter, WalkSignal};

/// Numbers too common across libraries to discriminate between them
pub const EXEMPT_NUMBERS: [f64; 7] = [-1.0, 0.0, 1.0, 2.0, 3.0, 4.0, 5.0];

/// Separator placed between the static chunks of a template literal
pub const TEMPLATE_SEPARATOR: &str = "${}";

/// Largest magnitude serialized as a JSON integer (2^53)
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// One element of a literal signature: a string or a number
///
/// Ordering compares the display form first (so mixed string/number lists
/// sort deterministically and locale-independently), numbers before strings
/// on a tie.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(untagged)]
pub enum LiteralValue {
    Number(OrderedFloat<f64>),
    Text(String),
}

impl LiteralValue {
    pub fn number(value: f64) -> Self {
        Self::Number(OrderedFloat(value))
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Display form used for ordering
    pub fn sort_key(&self) -> Cow<'_, str> {
        match self {
            Self::Number(n) => Cow::Owned(format_number(n.0)),
            Self::Text(s) => Cow::Borrowed(s.as_str()),
        }
    }

    fn variant_rank(&self) -> u8 {
        match self {
            Self::Number(_) => 0,
            Self::Text(_) => 1,
        }
    }
}

impl Ord for LiteralValue {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key()
            .cmp(&other.sort_key())
            .then_with(|| self.variant_rank().cmp(&other.variant_rank()))
            .then_with(|| match (self, other) {
                (Self::Number(a), Self::Number(b)) => a.cmp(b),
                _ => Ordering::Equal,
            })
    }
}

impl PartialOrd for LiteralValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for LiteralValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Number(n) if is_integral(n.0) => serializer.serialize_i64(n.0 as i64),
            Self::Number(n) => serializer.serialize_f64(n.0),
            Self::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl std::fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.sort_key())
    }
}

fn is_integral(value: f64) -> bool {
    value.is_finite() && value.fract() == 0.0 && value.abs() < MAX_SAFE_INTEGER
}

/// Render a number the way JavaScript prints it for ordinary magnitudes
pub fn format_number(value: f64) -> String {
    if is_integral(value) {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Check if a numeric value is in the exempt small-integer set
pub fn is_exempt_number(value: f64) -> bool {
    EXEMPT_NUMBERS.contains(&value)
}

/// Parse the source text of a JavaScript numeric literal
///
/// Handles decimal/exponent forms, `0x`/`0o`/`0b` prefixes, legacy octal
/// (`017`) and `_` separators. Returns `None` for BigInt literals (`10n`),
/// values that overflow to infinity (`1e400`) and anything unparseable.
pub fn parse_js_number(raw: &str) -> Option<f64> {
    parse_numeric_text(raw).filter(|value| value.is_finite())
}

fn parse_numeric_text(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != '_').collect();
    if cleaned.ends_with('n') {
        return None;
    }

    let lower = cleaned.to_ascii_lowercase();
    let radix_body = |prefix: &str, radix: u32| -> Option<f64> {
        lower
            .strip_prefix(prefix)
            .and_then(|digits| parse_radix(digits, radix))
    };

    if let Some(v) = radix_body("0x", 16) {
        return Some(v);
    }
    if let Some(v) = radix_body("0o", 8) {
        return Some(v);
    }
    if let Some(v) = radix_body("0b", 2) {
        return Some(v);
    }

    // Legacy octal: leading zero followed only by octal digits
    if lower.len() > 1
        && lower.starts_with('0')
        && lower.chars().all(|c| ('0'..='7').contains(&c))
    {
        return parse_radix(&lower[1..], 8);
    }

    lower.parse::<f64>().ok()
}

fn parse_radix(digits: &str, radix: u32) -> Option<f64> {
    if digits.is_empty() {
        return None;
    }
    let mut value = 0f64;
    for c in digits.chars() {
        let d = c.to_digit(radix)?;
        value = value * radix as f64 + d as f64;
    }
    Some(value)
}

/// Tree filter that captures discriminative literal values
pub struct LiteralCollector<'s> {
    source: &'s str,
}

impl<'s> LiteralCollector<'s> {
    pub fn new(source: &'s str) -> Self {
        Self { source }
    }

    fn capture_number(&self, raw: &str, negate: bool) -> WalkSignal<LiteralValue> {
        match parse_js_number(raw) {
            Some(value) => {
                let value = if negate { -value } else { value };
                if is_exempt_number(value) {
                    WalkSignal::prune()
                } else {
                    WalkSignal::emit_and_stop(LiteralValue::number(value))
                }
            }
            // BigInt, overflowing and malformed numbers keep their raw text
            None if !raw.is_empty() => {
                let text = if negate {
                    format!("-{}", raw)
                } else {
                    raw.to_string()
                };
                WalkSignal::emit_and_stop(LiteralValue::Text(text))
            }
            None => WalkSignal::prune(),
        }
    }
}

impl<'tree, 's> NodeFilter<'tree> for LiteralCollector<'s> {
    type Output = LiteralValue;

    fn visit(&mut self, _path: &str, node: Node<'tree>) -> Result<WalkSignal<LiteralValue>> {
        let signal = match node.kind() {
            "expression_statement" if is_directive(&node) => WalkSignal::prune(),
            "string" => {
                let content = string_content(&node, self.source);
                if content.is_empty() {
                    WalkSignal::prune()
                } else {
                    WalkSignal::emit_and_stop(LiteralValue::text(content))
                }
            }
            "number" => self.capture_number(node_text(&node, self.source), false),
            "unary_expression" if operator(&node) == Some("-") => {
                match node.child_by_field_name("argument") {
                    Some(arg) if arg.kind() == "number" => {
                        self.capture_number(node_text(&arg, self.source), true)
                    }
                    _ => WalkSignal::pass(),
                }
            }
            "regex" => {
                let pattern = node
                    .child_by_field_name("pattern")
                    .map(|p| node_text(&p, self.source))
                    .unwrap_or("");
                let flags = node
                    .child_by_field_name("flags")
                    .map(|f| node_text(&f, self.source))
                    .unwrap_or("");
                WalkSignal::emit_and_stop(LiteralValue::Text(format!("/{}/{}", pattern, flags)))
            }
            "template_string" => {
                let joined = template_chunks(&node, self.source).join(TEMPLATE_SEPARATOR);
                if joined.is_empty() {
                    WalkSignal::prune()
                } else {
                    WalkSignal::emit_and_stop(LiteralValue::Text(joined))
                }
            }
            "true" | "false" | "null" | "undefined" => WalkSignal::prune(),
            _ => WalkSignal::pass(),
        };
        Ok(signal)
    }
}

/// Collect the sorted, de-duplicated literal signature of a tree
pub fn collect_literals(root: Node, source: &str) -> Result<Vec<LiteralValue>> {
    let mut collector = LiteralCollector::new(source);
    let found = walk(root, &mut collector)?;

    // Captures stop the walk, so every entry is a leaf
    let values: BTreeSet<LiteralValue> = found.into_iter().map(|p| p.data).collect();
    Ok(values.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::Lang;
    use crate::parsing::parse_source;

    fn literals(source: &str) -> Vec<LiteralValue> {
        let unit = parse_source(source, Lang::JavaScript).unwrap();
        collect_literals(unit.root(), unit.source()).unwrap()
    }

    #[test]
    fn test_exempt_values_never_captured() {
        let found = literals("f(-1, 0, 1, 2, 3, 4, 5, true, false, null, undefined, '');");
        assert!(found.is_empty(), "unexpected literals: {:?}", found);
    }

    #[test]
    fn test_captures_discriminative_values() {
        let found = literals("var a = 'hello', b = 42, c = -7, d = /ab+c/gi, e = 6.5;");
        assert_eq!(
            found,
            vec![
                LiteralValue::number(-7.0),
                LiteralValue::text("/ab+c/gi"),
                LiteralValue::number(42.0),
                LiteralValue::number(6.5),
                LiteralValue::text("hello"),
            ]
        );
    }

    #[test]
    fn test_template_static_chunks() {
        let found = literals("var a = `x-${y}-z`; var b = `plain`; var c = `${q}`;");
        assert_eq!(
            found,
            vec![
                LiteralValue::text("${}"),
                LiteralValue::text("plain"),
                LiteralValue::text("x-${}-z"),
            ]
        );
    }

    #[test]
    fn test_string_and_number_are_distinct() {
        let found = literals("f('123', 123, 123, '123');");
        assert_eq!(
            found,
            vec![LiteralValue::number(123.0), LiteralValue::text("123")]
        );
    }

    #[test]
    fn test_directive_not_captured() {
        let found = literals("'use strict'; function a(){ 'use asm'; return 'x'; }");
        assert_eq!(found, vec![LiteralValue::text("x")]);
    }

    #[test]
    fn test_parse_js_number_forms() {
        assert_eq!(parse_js_number("0xff"), Some(255.0));
        assert_eq!(parse_js_number("0o17"), Some(15.0));
        assert_eq!(parse_js_number("0b101"), Some(5.0));
        assert_eq!(parse_js_number("017"), Some(15.0));
        assert_eq!(parse_js_number("1_000"), Some(1000.0));
        assert_eq!(parse_js_number("1e3"), Some(1000.0));
        assert_eq!(parse_js_number(".5"), Some(0.5));
        assert_eq!(parse_js_number("10n"), None);
        assert_eq!(parse_js_number("1e400"), None);
        assert_eq!(parse_js_number(&format!("0x{}", "f".repeat(300))), None);
    }

    #[test]
    fn test_overflowing_number_kept_as_text() {
        assert_eq!(
            literals("var big = 1e400, small = -1e400;"),
            vec![LiteralValue::text("-1e400"), LiteralValue::text("1e400")]
        );
    }

    #[test]
    fn test_hex_exempt_value() {
        // 0x1 is still the number one
        assert!(literals("f(0x1, 0x0);").is_empty());
    }

    #[test]
    fn test_bigint_kept_as_text() {
        assert_eq!(literals("f(10n);"), vec![LiteralValue::text("10n")]);
    }

    #[test]
    fn test_serialization_shape() {
        let values = vec![
            LiteralValue::number(123.0),
            LiteralValue::number(1.5),
            LiteralValue::text("abc"),
        ];
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r#"[123,1.5,"abc"]"#);

        let restored: Vec<LiteralValue> = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, values);
    }
}
