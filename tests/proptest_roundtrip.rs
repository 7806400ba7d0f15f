// edn-codec - Property-based round-trip tests
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Property-based tests for the print/parse round trip.
//!
//! For any generated value tree, printing and re-parsing must produce an
//! equal tree, preserving the list/vector distinction and the numeric
//! type distinctions exactly.

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use proptest::prelude::*;

use edn_codec::{parse_str, print_string, Keyword, Symbol, Value};

// =============================================================================
// Strategies for generating values
// =============================================================================

fn arb_symbol_name() -> impl Strategy<Value = String> {
    // The bare words nil/true/false read back as literals, not symbols.
    "[a-z][a-z0-9-]{0,8}"
        .prop_filter("reserved word", |s| {
            s != "nil" && s != "true" && s != "false"
        })
}

fn arb_atom() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Nil),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        any::<i128>().prop_map(|n| Value::BigInt(BigInt::from(n))),
        // Finite floats only: edn has no notation for NaN or infinities.
        any::<f64>()
            .prop_filter("finite", |f| f.is_finite())
            .prop_map(Value::Float),
        (any::<i64>(), 0i64..20).prop_map(|(digits, scale)| {
            Value::Decimal(BigDecimal::new(BigInt::from(digits), scale))
        }),
        arb_char().prop_map(Value::Char),
        "[ -~]{0,12}".prop_map(Value::string),
        (proptest::option::of(arb_symbol_name()), arb_symbol_name()).prop_map(|(p, n)| {
            Value::Symbol(match p {
                Some(p) => Symbol::namespaced(&p, &n).unwrap(),
                None => Symbol::new(&n).unwrap(),
            })
        }),
        (proptest::option::of(arb_symbol_name()), arb_symbol_name()).prop_map(|(p, n)| {
            Value::Keyword(match p {
                Some(p) => Keyword::namespaced(&p, &n).unwrap(),
                None => Keyword::new(&n).unwrap(),
            })
        }),
    ]
}

/// Characters the printer can always represent: printable ASCII plus the
/// named whitespace characters.
fn arb_char() -> impl Strategy<Value = char> {
    prop_oneof![
        proptest::char::range('!', '~'),
        Just(' '),
        Just('\t'),
        Just('\n'),
        Just('\r'),
        Just(','),
    ]
}

fn arb_value() -> impl Strategy<Value = Value> {
    arb_atom().prop_recursive(3, 24, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::list),
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::vector),
            prop::collection::vec(inner.clone(), 0..5).prop_map(Value::set),
            prop::collection::vec((inner.clone(), inner), 0..5).prop_map(Value::map),
        ]
    })
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// print then parse is the identity on value trees.
    #[test]
    fn roundtrip_preserves_value(v in arb_value()) {
        let text = print_string(&v).unwrap();
        let reparsed = parse_str(&text)
            .unwrap_or_else(|e| panic!("unreadable output '{}': {}", text, e))
            .expect("empty output");
        prop_assert_eq!(reparsed, v);
    }

    /// Lists never come back as vectors, nor default ints as bigints.
    #[test]
    fn roundtrip_preserves_type_distinctions(items in prop::collection::vec(any::<i64>(), 0..6)) {
        let list = Value::list(items.iter().copied().map(Value::int));
        let vector = Value::vector(items.iter().copied().map(Value::int));
        let bigs = Value::vector(items.iter().map(|n| Value::BigInt(BigInt::from(*n))));

        let list_back = parse_str(&print_string(&list).unwrap()).unwrap().unwrap();
        let vector_back = parse_str(&print_string(&vector).unwrap()).unwrap().unwrap();
        let bigs_back = parse_str(&print_string(&bigs).unwrap()).unwrap().unwrap();

        prop_assert_eq!(&list_back, &list);
        prop_assert_eq!(&vector_back, &vector);
        prop_assert_eq!(&bigs_back, &bigs);
        if !items.is_empty() {
            prop_assert_ne!(&list_back, &vector_back);
            prop_assert_ne!(&vector_back, &bigs_back);
        }
    }

    /// Whitespace and commas are interchangeable separators.
    #[test]
    fn commas_are_whitespace(a in any::<i64>(), b in any::<i64>()) {
        let spaced = edn_codec::parse_all_str(&format!("{} {}", a, b)).unwrap();
        let commaed = edn_codec::parse_all_str(&format!("{},{}", a, b)).unwrap();
        prop_assert_eq!(spaced, commaed);
    }
}
