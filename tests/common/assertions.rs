//! Custom assertions for integration tests
//!
//! Validates the JSON shapes produced by extraction and ranking.

use serde_json::Value;

use jsfinger::Signature;

/// Assert that output is valid JSON and return parsed value
pub fn assert_valid_json(output: &str, context: &str) -> Value {
    serde_json::from_str(output).unwrap_or_else(|e| {
        panic!(
            "Expected valid JSON ({}): {}\nOutput:\n{}",
            context, e, output
        )
    })
}

/// Assert the invariants every extracted signature satisfies
pub fn assert_signature_invariants(signature: &Signature) {
    for (position, function) in signature.function_signature.iter().enumerate() {
        assert_eq!(function.kind, "fn");
        assert_eq!(
            function.index, position,
            "index of '{}' does not match its sorted position",
            function.name
        );

        let mut sorted = function.fn_statement_tokens.clone();
        sorted.sort();
        assert_eq!(
            sorted, function.fn_statement_tokens,
            "tokens of '{}' are not sorted",
            function.name
        );
    }

    let names: Vec<&str> = signature
        .function_signature
        .iter()
        .map(|f| f.name.as_str())
        .collect();
    let mut sorted_names = names.clone();
    sorted_names.sort();
    sorted_names.dedup();
    assert_eq!(names, sorted_names, "function names are not unique and sorted");
}

/// Assert the library ids of a ranking JSON array, in order
pub fn assert_ranked_ids(json: &Value, expected: &[&str]) {
    let ids: Vec<&str> = json
        .as_array()
        .unwrap_or_else(|| panic!("Expected ranking array, got:\n{}", json))
        .iter()
        .map(|entry| entry["library"].as_str().unwrap_or(""))
        .collect();
    assert_eq!(ids, expected, "unexpected ranking order");
}
