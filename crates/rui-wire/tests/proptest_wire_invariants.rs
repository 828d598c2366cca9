//! Property-based invariant tests for the record codec.
//!
//! 1. Escaping is reversible for arbitrary text
//! 2. Encoded records parse back to the same tag, names, and scalars, with
//!    unquoted tokens kept unquoted
//! 3. Parsing then re-encoding reproduces the wire text exactly
//! 4. Encoded records never contain a raw newline
//! 5. The parser never panics on arbitrary input

use proptest::prelude::*;
use rui_wire::{Record, Value, escape, is_bare_token, parse_record, unescape};

// ── Strategies ──────────────────────────────────────────────────────────

fn tag_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9-]{0,12}"
}

fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<String>().prop_map(Value::Text),
        any::<String>().prop_map(Value::Raw),
        any::<String>().prop_map(Value::Bare),
        any::<i64>().prop_map(Value::Int),
        Just(Value::Flag),
    ]
}

fn value_strategy() -> impl Strategy<Value = Value> {
    scalar_strategy().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            (tag_strategy(), prop::collection::vec((any::<String>(), inner.clone()), 0..4))
                .prop_map(|(tag, fields)| Value::Record(build(tag, fields))),
            prop::collection::vec(
                (tag_strategy(), prop::collection::vec((any::<String>(), inner), 0..3))
                    .prop_map(|(tag, fields)| Value::Record(build(tag, fields))),
                0..4
            )
            .prop_map(Value::List),
        ]
    })
}

fn build(tag: String, fields: Vec<(String, Value)>) -> Record {
    fields
        .into_iter()
        .fold(Record::new(tag), |record, (name, value)| record.with(name, value))
}

fn record_strategy() -> impl Strategy<Value = Record> {
    (
        tag_strategy(),
        prop::collection::vec((any::<String>(), value_strategy()), 0..6),
    )
        .prop_map(|(tag, fields)| build(tag, fields))
}

/// Value a scalar reads back as after encoding and parsing.
fn expected_scalar(value: &Value) -> Option<Value> {
    match value {
        Value::Text(text) => Some(Value::Text(text.clone())),
        Value::Raw(text) if text.contains(['`', '\n', '\r']) => Some(Value::Text(text.clone())),
        Value::Raw(text) => Some(Value::Raw(text.clone())),
        Value::Bare(token) if is_bare_token(token) => Some(Value::Bare(token.clone())),
        Value::Bare(token) => Some(Value::Text(token.clone())),
        Value::Int(number) => Some(Value::Bare(number.to_string())),
        Value::Flag => Some(Value::Bare("1".to_owned())),
        Value::Float(_) | Value::Record(_) | Value::List(_) => None,
    }
}

fn assert_same(original: &Record, parsed: &Record) -> Result<(), TestCaseError> {
    prop_assert_eq!(original.tag(), parsed.tag());
    prop_assert_eq!(original.len(), parsed.len());
    for ((name, value), (parsed_name, parsed_value)) in original.fields().zip(parsed.fields()) {
        prop_assert_eq!(name, parsed_name);
        assert_same_value(value, parsed_value)?;
    }
    Ok(())
}

fn assert_same_value(original: &Value, parsed: &Value) -> Result<(), TestCaseError> {
    match (original, parsed) {
        (Value::Record(a), Value::Record(b)) => assert_same(a, b),
        (Value::List(a), Value::List(b)) => {
            prop_assert_eq!(a.len(), b.len());
            for (a, b) in a.iter().zip(b) {
                assert_same_value(a, b)?;
            }
            Ok(())
        }
        (scalar, parsed @ (Value::Text(_) | Value::Raw(_) | Value::Bare(_))) => {
            let expected = expected_scalar(scalar);
            prop_assert_eq!(expected.as_ref(), Some(parsed));
            Ok(())
        }
        (a, b) => Err(TestCaseError::fail(format!("shape mismatch: {a:?} vs {b:?}"))),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 1. Escaping
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn escape_then_unescape_is_identity(text in any::<String>()) {
        prop_assert_eq!(unescape(&escape(&text)).unwrap(), text);
    }

    #[test]
    fn escaped_text_has_no_bare_quotes(text in any::<String>()) {
        let escaped = escape(&text);
        let mut chars = escaped.chars();
        while let Some(ch) = chars.next() {
            if ch == '\\' {
                chars.next();
            } else {
                prop_assert!(ch != '"' && ch != '\n' && ch != '\r');
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 2-4. Encode then parse
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn encoded_records_parse_back(record in record_strategy()) {
        let wire = record.encode();
        let parsed = parse_record(&wire)
            .map_err(|err| TestCaseError::fail(format!("{err} in {wire:?}")))?;
        assert_same(&record, &parsed)?;
    }

    #[test]
    fn parse_then_encode_reproduces_the_wire(record in record_strategy()) {
        let wire = record.encode();
        let parsed = parse_record(&wire)
            .map_err(|err| TestCaseError::fail(format!("{err} in {wire:?}")))?;
        prop_assert_eq!(parsed.encode(), wire);
    }

    #[test]
    fn encoded_records_are_single_line(record in record_strategy()) {
        let wire = record.encode();
        prop_assert!(!wire.contains('\n'));
        prop_assert!(!wire.contains('\r'));
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 5. Robustness
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn parser_never_panics(text in any::<String>()) {
        let _ = parse_record(&text);
    }

    #[test]
    fn parser_never_panics_on_near_miss_syntax(text in "[a-z{}\\[\\]=,\"'`/* \n\\\\]{0,64}") {
        let _ = parse_record(&text);
    }
}
