// edn-codec - Reader integration tests
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Integration tests for the edn reader.
//!
//! Exercises the public API end to end: literals, collections, the
//! discard and namespaced-map extensions, tag handling and the error
//! cases the grammar requires.

use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use edn_codec::{
    parse_all_str, parse_str, BigDecimal, BigInt, Keyword, Parser, ParserConfig, StrSource,
    Symbol, Tag, Value,
};

fn parse(text: &str) -> Value {
    parse_str(text)
        .unwrap_or_else(|e| panic!("failed to parse '{}': {}", text, e))
        .unwrap_or_else(|| panic!("no value in '{}'", text))
}

fn kw(name: &str) -> Value {
    Value::Keyword(Keyword::new(name).unwrap())
}

fn sym(name: &str) -> Value {
    Value::Symbol(Symbol::new(name).unwrap())
}

// =============================================================================
// Literals
// =============================================================================

#[test]
fn test_nil_and_booleans() {
    assert_eq!(parse("nil"), Value::Nil);
    assert_eq!(parse("true"), Value::Bool(true));
    assert_eq!(parse("false"), Value::Bool(false));
}

#[test]
fn test_integers() {
    assert_eq!(parse("0"), Value::int(0));
    assert_eq!(parse("42"), Value::int(42));
    assert_eq!(parse("-17"), Value::int(-17));
    assert_eq!(parse("+9"), Value::int(9));
}

#[test]
fn test_numeric_promotion() {
    // One past the signed 64-bit maximum parses as a bigint.
    assert_eq!(
        parse("9223372036854775808"),
        Value::BigInt(BigInt::from_str("9223372036854775808").unwrap())
    );
    // An N suffix forces a bigint regardless of magnitude.
    assert_eq!(parse("42N"), Value::BigInt(BigInt::from(42)));
    // Decimals default to floats; M forces an arbitrary-precision decimal.
    assert_eq!(parse("1.0"), Value::Float(1.0));
    assert_eq!(
        parse("1.0M"),
        Value::Decimal(BigDecimal::from_str("1.0").unwrap())
    );
}

#[test]
fn test_floats() {
    assert_eq!(parse("3.14159"), Value::Float(3.14159));
    assert_eq!(parse("1e3"), Value::Float(1000.0));
    assert_eq!(parse("-2.5E-2"), Value::Float(-0.025));
}

#[test]
fn test_strings_and_chars() {
    assert_eq!(parse("\"hello\\nworld\""), Value::string("hello\nworld"));
    assert_eq!(parse("\\a"), Value::Char('a'));
    assert_eq!(parse("\\newline"), Value::Char('\n'));
    assert_eq!(parse("\\,"), Value::Char(','));
}

#[test]
fn test_symbols_and_keywords() {
    assert_eq!(parse("foo"), sym("foo"));
    assert_eq!(
        parse("user/foo"),
        Value::Symbol(Symbol::namespaced("user", "foo").unwrap())
    );
    assert_eq!(parse(":foo"), kw("foo"));
    assert_eq!(
        parse(":user/foo"),
        Value::Keyword(Keyword::namespaced("user", "foo").unwrap())
    );
}

// =============================================================================
// Symbol grammar
// =============================================================================

#[test]
fn test_bare_slash_is_a_symbol() {
    assert_eq!(parse("/"), sym("/"));
}

#[test]
fn test_ns_slash_slash_names_slash() {
    assert_eq!(
        parse("ns//"),
        Value::Symbol(Symbol::namespaced("ns", "/").unwrap())
    );
}

#[test]
fn test_trailing_slash_is_error() {
    assert!(parse_str("foo/").unwrap_err().is_syntax());
}

#[test]
fn test_three_slashes_is_error() {
    assert!(parse_str("a/b/c").unwrap_err().is_syntax());
    assert!(parse_str("ns///").unwrap_err().is_syntax());
}

// =============================================================================
// Whitespace, commas, comments
// =============================================================================

#[test]
fn test_commas_are_whitespace() {
    assert_eq!(parse_all_str("a b").unwrap(), parse_all_str("a,b").unwrap());
    assert_eq!(parse_str("").unwrap(), parse_str(",").unwrap());
}

#[test]
fn test_comments_are_skipped() {
    assert_eq!(
        parse_all_str("1 ; one\n2 ;; two").unwrap(),
        vec![Value::int(1), Value::int(2)]
    );
}

// =============================================================================
// Collections
// =============================================================================

#[test]
fn test_collection_kinds_are_distinct() {
    assert_ne!(parse("(1 2 3)"), parse("[1 2 3]"));
    assert_eq!(
        parse("(1 2 3)"),
        Value::list([Value::int(1), Value::int(2), Value::int(3)])
    );
}

#[test]
fn test_heterogeneous_map() {
    let m = parse("{:a 1, \"b\" 2.0, [3] x}");
    match m {
        Value::Map(map) => assert_eq!(map.len(), 3),
        other => panic!("expected map, got {:?}", other),
    }
}

#[test]
fn test_duplicate_map_key_is_error() {
    assert!(parse_str("{:a 1, :a 2}").unwrap_err().is_syntax());
}

#[test]
fn test_duplicate_set_element_is_error() {
    assert!(parse_str("#{1 1}").unwrap_err().is_syntax());
}

#[test]
fn test_deep_nesting() {
    let v = parse("[[[[[1]]]]]");
    let mut depth = 0;
    let mut curr = v;
    while let Value::Vector(items) = curr {
        depth += 1;
        curr = items.get(0).cloned().unwrap_or(Value::Nil);
    }
    assert_eq!(depth, 5);
    assert_eq!(curr, Value::int(1));
}

// =============================================================================
// Discard
// =============================================================================

#[test]
fn test_discard_drops_one_value() {
    assert_eq!(
        parse("[1 #_2 3]"),
        Value::vector([Value::int(1), Value::int(3)])
    );
    assert_eq!(parse("#_ #_ 1 2 3"), Value::int(3));
}

#[test]
fn test_discard_suppresses_handler_side_effects() {
    // The uuid handler would reject this payload; discarding must not
    // invoke it.
    assert!(parse_str("#uuid \"not-a-uuid\"").unwrap_err().is_syntax());
    assert_eq!(parse("#_ #uuid \"not-a-uuid\" 123"), Value::int(123));

    // A counting handler proves no invocation happens while discarding.
    let count = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&count);
    let cfg = ParserConfig::builder()
        .tag_handler(
            Tag::new("counted").unwrap(),
            Arc::new(move |_tag: &Tag, v: Value| -> edn_codec::Result<Value> {
                seen.fetch_add(1, Ordering::SeqCst);
                Ok(v)
            }),
        )
        .build();
    let mut parser = Parser::with_config(cfg);
    let mut src = StrSource::new("#_ #counted 1 #counted 2");
    assert_eq!(parser.next_value(&mut src).unwrap(), Some(Value::int(2)));
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

// =============================================================================
// Tags
// =============================================================================

#[test]
fn test_unregistered_tag_becomes_tagged_value() {
    match parse("#myapp/thing {:a 1}") {
        Value::Tagged(tv) => {
            assert_eq!(tv.tag().prefix(), Some("myapp"));
            assert_eq!(tv.tag().name(), "thing");
        }
        other => panic!("expected tagged value, got {:?}", other),
    }
}

#[test]
fn test_inst_tag_decomposes_timestamp() {
    match parse("#inst \"1985-04-12T23:20:50.52Z\"") {
        Value::Instant(pi) => {
            assert_eq!(pi.years, 1985);
            assert_eq!(pi.months, 4);
            assert_eq!(pi.days, 12);
            assert_eq!(pi.hours, 23);
            assert_eq!(pi.minutes, 20);
            assert_eq!(pi.seconds, 50);
            assert_eq!(pi.nanoseconds, 520_000_000);
        }
        other => panic!("expected instant, got {:?}", other),
    }
}

#[test]
fn test_inst_tag_rejects_bad_payloads() {
    assert!(parse_str("#inst \"85-04-12\"").unwrap_err().is_syntax());
    assert!(parse_str("#inst \"1985-13-01\"").unwrap_err().is_syntax());
    assert!(parse_str("#inst 42").unwrap_err().is_syntax());
}

#[test]
fn test_uuid_tag() {
    match parse("#uuid \"f81d4fae-7dec-11d0-a765-00a0c91e6bf6\"") {
        Value::Uuid(u) => assert_eq!(u.to_string(), "f81d4fae-7dec-11d0-a765-00a0c91e6bf6"),
        other => panic!("expected uuid, got {:?}", other),
    }
    assert!(parse_str("#uuid :not-a-string").unwrap_err().is_syntax());
}

#[test]
fn test_custom_handler_replaces_builtin() {
    // Replace #inst wholesale: handlers are plain configuration.
    let cfg = ParserConfig::builder()
        .tag_handler(
            Tag::new("inst").unwrap(),
            Arc::new(|_tag: &Tag, v: Value| -> edn_codec::Result<Value> {
                Ok(Value::list([v]))
            }),
        )
        .build();
    let mut parser = Parser::with_config(cfg);
    let mut src = StrSource::new("#inst \"whatever\"");
    assert_eq!(
        parser.next_value(&mut src).unwrap(),
        Some(Value::list([Value::string("whatever")]))
    );
}

// =============================================================================
// Namespaced maps
// =============================================================================

#[test]
fn test_namespaced_map_rewrites_keys() {
    assert_eq!(
        parse("#:foo{:a 1, b 2, _/c 3, :_/d 4}"),
        parse("{:foo/a 1, foo/b 2, c 3, :d 4}")
    );
}

#[test]
fn test_namespaced_map_values_untouched() {
    assert_eq!(parse("#:foo{:a b}"), parse("{:foo/a b}"));
}

#[test]
fn test_namespaced_map_non_named_keys_untouched() {
    assert_eq!(parse("#:foo{1 2, \"s\" 3}"), parse("{1 2, \"s\" 3}"));
}

#[test]
fn test_namespaced_map_errors() {
    assert!(parse_str("#:foo (1 2)").unwrap_err().is_syntax());
    assert!(parse_str("#:foo/bar {}").unwrap_err().is_syntax());
    assert!(parse_str("#:\"foo\" {}").unwrap_err().is_syntax());
}

// =============================================================================
// End of input and unbalanced delimiters
// =============================================================================

#[test]
fn test_end_of_input_is_none_not_error() {
    let mut parser = Parser::new();
    let mut src = StrSource::new("1 2");
    assert_eq!(parser.next_value(&mut src).unwrap(), Some(Value::int(1)));
    assert_eq!(parser.next_value(&mut src).unwrap(), Some(Value::int(2)));
    assert_eq!(parser.next_value(&mut src).unwrap(), None);
    assert_eq!(parser.next_value(&mut src).unwrap(), None);
}

#[test]
fn test_unbalanced_delimiters() {
    assert!(parse_str(")").unwrap_err().is_syntax());
    assert!(parse_str("(]").unwrap_err().is_syntax());
    assert!(parse_str("[1").unwrap_err().is_syntax());
    assert!(parse_str("{:a 1").unwrap_err().is_syntax());
}

// =============================================================================
// Keyword interning
// =============================================================================

#[test]
fn test_keywords_from_separate_parses_are_identical() {
    let a = parse(":interned/keyword");
    let b = parse(":interned/keyword");
    // Keyword equality is identity: equal means same canonical instance.
    assert_eq!(a, b);
}

// =============================================================================
// Larger documents
// =============================================================================

#[test]
fn test_mixed_document() {
    let text = r#"
        ; sample document
        {:id #uuid "f81d4fae-7dec-11d0-a765-00a0c91e6bf6"
         :created #inst "2010-11-12T09:08:07Z"
         :scores [1 2.0 3N 4.0M]
         :tags #{:a :b}
         :child {:nested (x y z)}}
    "#;
    match parse(text) {
        Value::Map(map) => {
            assert_eq!(map.len(), 5);
            assert!(map.contains_key(&kw("id")));
            assert!(map.contains_key(&kw("scores")));
        }
        other => panic!("expected map, got {:?}", other),
    }
}

#[test]
fn test_reading_from_io_source() {
    use edn_codec::ReadSource;
    let bytes = "[1 2 3]".as_bytes();
    let mut parser = Parser::new();
    let mut src = ReadSource::new(bytes);
    assert_eq!(
        parser.next_value(&mut src).unwrap(),
        Some(Value::vector([Value::int(1), Value::int(2), Value::int(3)]))
    );
    assert_eq!(parser.next_value(&mut src).unwrap(), None);
}
