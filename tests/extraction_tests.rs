//! Signature extraction integration tests
//!
//! End-to-end checks from JavaScript source text to the JSON-serializable
//! structural signature: token vocabulary, naming, literal capture and
//! determinism.

mod common;

use common::*;
use jsfinger::{extract_signature, parse_source, ExtractOptions, Lang, LiteralValue};

// ============================================================================
// Token vocabulary
// ============================================================================

#[test]
fn test_literal_type_tags_sorted() {
    let signature = signature_of("function a(){ 1; '1'; true; null; /.*/g; `t`; }");
    assert_eq!(
        tokens_of(&signature, "a"),
        [
            "LITERAL:Boolean",
            "LITERAL:Null",
            "LITERAL:Numeric",
            "LITERAL:RegExp",
            "LITERAL:String",
            "LITERAL:Template",
        ]
    );
}

#[test]
fn test_empty_function_has_no_tokens() {
    let signature = signature_of("function a(){}");
    assert!(tokens_of(&signature, "a").is_empty());
    assert!(signature.function_signature[0].fn_statement_types.is_empty());
}

#[test]
fn test_skip_declarations_keeps_only_string() {
    let signature = signature_skipping_declarations("function a(){ var b; '123'; }");
    assert_eq!(tokens_of(&signature, "a"), ["LITERAL:String"]);
}

#[test]
fn test_literal_changes_do_not_change_tokens() {
    let a = signature_of("function f(x){ return x.indexOf('needle', 10) > 42 ? /a+/ : `one${x}`; }");
    let b = signature_of("function f(x){ return x.indexOf('other', 77) > 9 ? /b*/i : `two${x}`; }");
    assert_eq!(tokens_of(&a, "f"), tokens_of(&b, "f"));
    assert_ne!(a.literal_signature, b.literal_signature);
}

#[test]
fn test_statement_order_is_ignored() {
    let a = signature_of("function f(){ one(); two(); three(); }");
    let b = signature_of("function f(){ three(); one(); two(); }");
    assert_eq!(tokens_of(&a, "f"), tokens_of(&b, "f"));
}

#[test]
fn test_operand_order_is_kept() {
    let a = signature_of("function f(a, b){ return a - b; }");
    let b = signature_of("function f(a, b){ return b - a; }");
    assert_ne!(tokens_of(&a, "f"), tokens_of(&b, "f"));
}

#[test]
fn test_statement_types_follow_tokens() {
    let signature = signature_of("function f(x){ if (x) { return 1; } else { throw x; } }");
    assert_eq!(
        signature.function_signature[0].fn_statement_types,
        vec![
            "PARAMETER:Identifier",
            "STATEMENT:Else",
            "STATEMENT:If",
            "STATEMENT:Return",
            "STATEMENT:Throw",
        ]
    );
}

// ============================================================================
// Function discovery and naming
// ============================================================================

#[test]
fn test_nested_functions_flattened_names() {
    let signature =
        signature_of("var b = function(){ function fn1(){ go(); } (function fn2(){ run(); })(a); };");
    assert_eq!(function_names(&signature), vec!["b", "b::fn1", "b::fn2"]);
    assert_signature_invariants(&signature);
}

#[test]
fn test_three_levels_deep_have_distinct_names() {
    let signature = signature_of(
        "function outer(){ return function(){ return function(){ return function(){ return 1; }; }; }; }",
    );
    assert_eq!(
        function_names(&signature),
        vec![
            "outer",
            "outer::[anonymous]",
            "outer::[anonymous]::[anonymous]",
            "outer::[anonymous]::[anonymous]::[anonymous]",
        ]
    );
    assert_signature_invariants(&signature);
}

#[test]
fn test_anonymous_siblings_disambiguated() {
    let signature = signature_of("[1].map(function(){ a(); }); [2].map(function(){ b(); });");
    assert_eq!(
        function_names(&signature),
        vec!["[anonymous]", "[anonymous]#1"]
    );
    assert_eq!(
        tokens_of(&signature, "[anonymous]"),
        ["EXPRESSION:Call[EXPRESSION:Identifier[a]]"]
    );
}

#[test]
fn test_module_pattern_names() {
    let signature = signature_of(
        r#"
        var lib = {
            parse: function(input){ return JSON.parse(input); },
            "format": (value) => String(value),
            [key + "Suffix"]: function(){},
        };
        lib.extra = function extraImpl(){};
        module.exports = function(){ return lib; };
        "#,
    );
    assert_eq!(
        function_names(&signature),
        vec!["exports", "extraImpl", "format", "key+Suffix", "parse"]
    );
}

#[test]
fn test_class_methods_found() {
    let signature = signature_of(
        "class Store { constructor(state){ this.state = state; } get size(){ return 0; } static create(){ return new Store({}); } }",
    );
    assert_eq!(function_names(&signature), vec!["constructor", "create", "size"]);
    assert_eq!(
        tokens_of(&signature, "constructor"),
        [
            "EXPRESSION:Assignment[EXPRESSION:Member[EXPRESSION:This,state],=,EXPRESSION:Identifier[state]]",
            "PARAMETER:Identifier[state]",
        ]
    );
}

#[test]
fn test_suffixed_names_never_collide_with_literal_keys() {
    let signature =
        signature_of("var o = {'a#1': function(){ x(); }}; function a(){} function a(){ y(); }");
    assert_eq!(function_names(&signature), vec!["a", "a#1", "a#2"]);
    assert_eq!(tokens_of(&signature, "a#1"), ["EXPRESSION:Call[EXPRESSION:Identifier[x]]"]);
    assert_signature_invariants(&signature);
}

#[test]
fn test_delimiter_in_literal_key_does_not_collide_with_nesting() {
    let signature = signature_of("var o = {'a::b': function(){}}; function a(){ function b(){} }");
    assert_eq!(function_names(&signature), vec!["a", "a::b", "a::b#1"]);
    assert_signature_invariants(&signature);
}

// ============================================================================
// Deeply nested input
// ============================================================================

#[test]
fn test_long_else_if_chain_extracts() {
    let mut source = String::from("function route(p){ if (p === 'r0') { go(0); }");
    for i in 1..1000 {
        source.push_str(&format!(" else if (p === 'r{}') {{ go({}); }}", i, i));
    }
    source.push_str(" }");

    let signature = signature_of(&source);
    let tokens = tokens_of(&signature, "route");
    assert_eq!(tokens.iter().filter(|t| t.starts_with("STATEMENT:Else-If")).count(), 999);
    // Every branch string is still captured
    assert_eq!(signature.literal_signature.len(), 1000 + 994);
}

#[test]
fn test_deep_block_nesting_extracts() {
    let source = format!("function f(){{ {}a('deep');{} }}", "{".repeat(1000), "}".repeat(1000));
    let signature = signature_of(&source);
    assert_eq!(tokens_of(&signature, "f"), ["t_STATEMENT:depth-limit"]);
    assert_eq!(signature.literal_signature, vec![LiteralValue::text("deep")]);
}

#[test]
fn test_deep_expression_nesting_extracts() {
    let source = format!("function f(a){{ return {}; }}", vec!["a"; 1000].join("+"));
    let signature = signature_of(&source);
    let tokens = tokens_of(&signature, "f");
    assert!(tokens.iter().any(|t| t.contains("t_EXPRESSION:depth-limit")));
}

// ============================================================================
// Literal signature
// ============================================================================

#[test]
fn test_exempt_literals_never_captured() {
    let signature = signature_of(
        "function f(){ return [-1, 0, 1, 2, 3, 4, 5, true, false, null, undefined, '', 6]; }",
    );
    assert_eq!(signature.literal_signature, vec![LiteralValue::number(6.0)]);
}

#[test]
fn test_literal_signature_sorted_and_deduplicated() {
    let signature = signature_of(
        "var a = 'zeta', b = 'alpha', c = 100, d = 'alpha', e = /x/g, f = `p${q}s`;",
    );
    assert_eq!(
        signature.literal_signature,
        vec![
            LiteralValue::text("/x/g"),
            LiteralValue::number(100.0),
            LiteralValue::text("alpha"),
            LiteralValue::text("p${}s"),
            LiteralValue::text("zeta"),
        ]
    );
}

#[test]
fn test_overflowing_number_is_text_not_null() {
    let signature = signature_of("var big = 1e400;");
    assert_eq!(signature.literal_signature, vec![LiteralValue::text("1e400")]);

    let json = serde_json::to_string(&signature).unwrap();
    assert_eq!(json, r#"{"functionSignature":[],"literalSignature":["1e400"]}"#);
    let back: jsfinger::Signature = serde_json::from_str(&json).unwrap();
    assert_eq!(back, signature);
}

// ============================================================================
// Robustness and serialization
// ============================================================================

#[test]
fn test_extraction_is_deterministic() {
    let source = r#"
        !function(e){ var t = {}; function n(r){ if (t[r]) return t[r].exports;
        var o = t[r] = { i: r, l: !1, exports: {} }; return e[r].call(o.exports, o, o.exports, n), o.l = !0, o.exports }
        n.m = e; n.c = t; n.p = "/static/"; return n(n.s = 42) }([function(e, t){ e.exports = "chunk-a" }]);
    "#;
    let first = signature_of(source);
    let second = signature_of(source);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
    assert_signature_invariants(&first);
}

#[test]
fn test_unfamiliar_syntax_degrades_instead_of_failing() {
    let unit = parse_source(
        "function View(props){ return <div className=\"x\">{props.label}</div>; }",
        Lang::Jsx,
    )
    .unwrap();
    let signature = extract_signature(&unit, &ExtractOptions::default()).unwrap();
    let tokens = tokens_of(&signature, "View");
    assert!(tokens.iter().any(|t| t.contains("t_EXPRESSION:jsx_element")));
}

#[test]
fn test_typescript_annotations_tolerated() {
    let unit = parse_source(
        "export function add(a: number, b: number = 2): number { return a + b; }",
        Lang::TypeScript,
    )
    .unwrap();
    let signature = extract_signature(&unit, &ExtractOptions::default()).unwrap();
    assert_eq!(
        tokens_of(&signature, "add"),
        [
            "PARAMETER:Assignment[PARAMETER:Identifier[b],LITERAL:Numeric]",
            "PARAMETER:Identifier[a]",
            "STATEMENT:Return[EXPRESSION:Binary[EXPRESSION:Identifier[a],+,EXPRESSION:Identifier[b]]]",
        ]
    );
}

#[test]
fn test_recovered_syntax_errors_still_extract() {
    let signature = signature_of("function ok(){ return 'fine'; } var x = ;");
    assert!(function_names(&signature).contains(&"ok".to_string()));
    assert!(signature.literal_signature.contains(&LiteralValue::text("fine")));
}

#[test]
fn test_json_output_shape() {
    let signature = signature_of("function a(){ return 'abc' + 123; }");
    let json = assert_valid_json(&serde_json::to_string(&signature).unwrap(), "signature");

    let function = &json["functionSignature"][0];
    assert_eq!(function["type"], "fn");
    assert_eq!(function["name"], "a");
    assert_eq!(function["index"], 0);
    assert!(function["fnStatementTypes"].is_array());
    assert!(function["fnStatementTokens"].is_array());
    assert_eq!(json["literalSignature"], serde_json::json!([123, "abc"]));
}
