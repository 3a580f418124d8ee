// Copyright the anyedn authors.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Property-based round-trip tests: printing any tree built from
//! atoms and containers and reading it back yields an equal tree, and
//! numeric literals of any base decode to the mathematically correct
//! value.

use anyedn::meta::{merge_metadata, strip_metadata};
use anyedn::number::Rational;
use anyedn::read::read_one;
use anyedn::value::{SpecialKind, Value};
use kstring::KString;
use num::BigInt;
use proptest::prelude::*;

// Symbol, keyword and tag names; `true`, `false` and `nil` are
// excluded since those spellings read back as other atoms.
fn arb_name() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z*!_?$%&=<>.][a-zA-Z0-9*!_?$%&=<>.]{0,8}")
        .unwrap()
        .prop_filter("reserved spellings are not symbols",
                     |s| !matches!(s.as_str(), "true" | "false" | "nil"))
}

fn arb_atom() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Nil),
        Just(Value::KeywordNil),
        prop::sample::select(vec![SpecialKind::PosInf,
                                  SpecialKind::NegInf,
                                  SpecialKind::Nan])
            .prop_map(Value::Special),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| Value::Integer(BigInt::from(n))),
        (any::<i64>(), 1i64..1000).prop_map(|(n, d)| Value::Rational(
            Rational::new(BigInt::from(n), BigInt::from(d)).unwrap())),
        // quotients of small integers cover plenty of interesting
        // mantissas; Debug printing of f64 round-trips exactly
        (any::<i32>(), 1i32..10000).prop_map(|(n, d)| Value::Float(
            f64::from(n) / f64::from(d))),
        any::<char>().prop_map(Value::Char),
        any::<String>().prop_map(|s| Value::String(KString::from_string(s))),
        (any::<bool>(), arb_name()).prop_map(|(kw, s)| {
            let s = KString::from_string(s);
            if kw { Value::Keyword(s) } else { Value::Symbol(s) }
        }),
    ]
}

fn arb_value() -> impl Strategy<Value = Value> {
    arb_atom().prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5)
                .prop_map(Value::List),
            prop::collection::vec(inner.clone(), 0..5)
                .prop_map(Value::Vector),
            prop::collection::vec(inner.clone(), 0..5)
                .prop_map(Value::Set),
            prop::collection::vec((inner.clone(), inner.clone()), 0..4)
                .prop_map(Value::Map),
            (arb_name(), inner.clone()).prop_map(
                |(t, v)| Value::Tagged(KString::from_string(t),
                                       Box::new(v))),
            inner.clone().prop_map(|v| Value::Discard(Box::new(v))),
            (inner.clone(), inner.clone()).prop_map(
                |(t, m)| Value::Meta(Box::new(t), Box::new(m))),
        ]
    })
}

proptest! {
    #[test]
    fn print_read_roundtrip(v in arb_value()) {
        let text = v.to_string();
        let back = read_one(&text).unwrap().into_value();
        prop_assert_eq!(back, v);
    }

    #[test]
    fn strip_metadata_is_idempotent(v in arb_value()) {
        let once = strip_metadata(v);
        let twice = strip_metadata(once.clone());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn merge_metadata_always_wraps(v in arb_value(), m in arb_value()) {
        let merged = merge_metadata(v, m);
        prop_assert!(matches!(merged, Value::Meta(_, _)));
    }

    #[test]
    fn radix_literals_decode_correctly(n in any::<i64>(),
                                       base in 2u32..=36) {
        let b = BigInt::from(n);
        let text = format!("{}{}r{}",
                           if n < 0 { "-" } else { "" },
                           base,
                           b.magnitude().to_str_radix(base));
        let back = read_one(&text).unwrap().into_value();
        prop_assert_eq!(back, Value::Integer(b));
    }

    #[test]
    fn hexadecimal_literals_decode_correctly(n in any::<i64>()) {
        let b = BigInt::from(n);
        let text = format!("{}0x{}",
                           if n < 0 { "-" } else { "" },
                           b.magnitude().to_str_radix(16));
        let back = read_one(&text).unwrap().into_value();
        prop_assert_eq!(back, Value::Integer(b));
    }
}
