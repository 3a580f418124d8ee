// Copyright the anyedn authors.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use anyedn::number::Rational;
use anyedn::parse::{lex, LexError, Token};
use anyedn::read::{read_all, read_one, ReadError, ReadErrorWithPos};
use anyedn::value::{integer, keyword, string, symbol, SpecialKind, Value};
use kstring::KString;
use num::BigInt;

fn vals(input: &str) -> Vec<Value> {
    read_all(input).unwrap()
        .into_iter().map(|v| v.into_value()).collect()
}

fn val(input: &str) -> Value {
    read_one(input).unwrap().into_value()
}

fn err(input: &str) -> ReadErrorWithPos {
    read_one(input).unwrap_err()
}

fn rational(n: i64, d: i64) -> Value {
    Value::Rational(Rational::new(BigInt::from(n), BigInt::from(d)).unwrap())
}

#[test]
fn empty_map() {
    assert_eq!(val("{}"), Value::Map(vec![]));
}

#[test]
fn toplevel_sequence() {
    assert_eq!(vals("1 2 3"), vec![integer(1), integer(2), integer(3)]);
}

#[test]
fn set_with_discard() {
    // the reader keeps the discarded element in place, and `ns/foo`
    // (no leading colon) is a symbol
    assert_eq!(val("#{1 true #_ nil :foo ns/foo}"),
               Value::Set(vec![
                   integer(1),
                   Value::Bool(true),
                   Value::Discard(Box::new(Value::Nil)),
                   keyword("foo"),
                   symbol("ns/foo"),
               ]));
    assert_eq!(val(":ns/foo"), keyword("ns/foo"));
}

#[test]
fn tagged_map() {
    assert_eq!(val("#myapp/Person {:first \"Fred\" :last \"Mertz\"}"),
               Value::Tagged(
                   KString::from_static("myapp/Person"),
                   Box::new(Value::Map(vec![
                       (keyword("first"), string("Fred")),
                       (keyword("last"), string("Mertz")),
                   ]))));
}

#[test]
fn chained_metadata() {
    // the left-most caret ends up outermost
    assert_eq!(val("^:a ^:b value"),
               Value::Meta(
                   Box::new(Value::Meta(
                       Box::new(symbol("value")),
                       Box::new(keyword("b")))),
                   Box::new(keyword("a"))));
}

#[test]
fn numeric_bases() {
    assert_eq!(vals("0xFF 0777 2r1010 22/7"),
               vec![integer(255), integer(511), integer(10),
                    rational(22, 7)]);
    assert_eq!(val("-0x10"), integer(-16));
    assert_eq!(val("+0x10"), integer(16));
    assert_eq!(val("36rZZ"), integer(1295));
    assert_eq!(val("-2r111"), integer(-7));
    assert_eq!(val("-7/2"), rational(-7, 2));
}

#[test]
fn special_floats() {
    assert_eq!(vals("##Inf ##-Inf ##NaN"),
               vec![Value::Special(SpecialKind::PosInf),
                    Value::Special(SpecialKind::NegInf),
                    Value::Special(SpecialKind::Nan)]);
}

#[test]
fn string_escapes() {
    let v = val("\"hello\\tworld\"");
    assert_eq!(v, string("hello\tworld"));
    assert_eq!(v.to_string(), "\"hello\\tworld\"");
    assert_eq!(val("\"a\\\"b\\\\c\\nd\""), string("a\"b\\c\nd"));
    // unknown escapes lose the backslash and keep the character
    assert_eq!(val("\"a\\qb\""), string("aqb"));
}

#[test]
fn zero_spellings() {
    for s in ["0", "00", "000", "+0", "-0"] {
        assert_eq!(val(s), integer(0), "{:?}", s);
    }
}

#[test]
fn keyword_nil_is_not_nil() {
    assert_eq!(val(":nil"), Value::KeywordNil);
    assert_eq!(val("nil"), Value::Nil);
    assert_ne!(val(":nil"), val("nil"));
    assert_eq!(val(":nil").to_string(), ":nil");
}

#[test]
fn slash_and_sign_symbols() {
    assert_eq!(val("/"), symbol("/"));
    assert_eq!(val("+abc"), symbol("+abc"));
    assert_eq!(val("-def"), symbol("-def"));
    assert_eq!(val("-123"), integer(-123));
    assert_eq!(val("+5"), integer(5));
    assert_eq!(val("+"), symbol("+"));
    assert_eq!(val("-"), symbol("-"));
}

#[test]
fn floats() {
    assert_eq!(val("1.5"), Value::Float(1.5));
    assert_eq!(val("-0.25"), Value::Float(-0.25));
    assert_eq!(val("3.14e-2"), Value::Float(0.0314));
    assert_eq!(val("1e5"), Value::Float(100000.0));
    assert_eq!(val("1.5M"), Value::Float(1.5));
    assert_eq!(val("42N"), integer(42));
}

#[test]
fn vector_list_distinction() {
    assert_eq!(val("(1 2)"), Value::List(vec![integer(1), integer(2)]));
    assert_eq!(val("[1 2]"), Value::Vector(vec![integer(1), integer(2)]));
    assert_ne!(val("(1 2)"), val("[1 2]"));
}

#[test]
fn commas_are_whitespace() {
    assert_eq!(val("[1, 2, 3]"),
               Value::Vector(vec![integer(1), integer(2), integer(3)]));
}

#[test]
fn comments_are_skipped() {
    assert_eq!(vals("1 ; one\n2"), vec![integer(1), integer(2)]);
}

#[test]
fn char_literals() {
    assert_eq!(vals(r"\newline \return \tab \space \a \1"),
               vec![Value::Char('\n'), Value::Char('\r'),
                    Value::Char('\t'), Value::Char(' '),
                    Value::Char('a'), Value::Char('1')]);
    // a char followed by more word characters splits
    assert_eq!(vals(r"\ab"), vec![Value::Char('a'), symbol("b")]);
}

#[test]
fn number_symbol_split() {
    assert_eq!(vals("1abc"), vec![integer(1), symbol("abc")]);
}

#[test]
fn discard_preserved_at_toplevel() {
    assert_eq!(vals("#_ 1 2"),
               vec![Value::Discard(Box::new(integer(1))), integer(2)]);
}

#[test]
fn sets_keep_duplicates() {
    assert_eq!(val("#{1 1 2}"),
               Value::Set(vec![integer(1), integer(1), integer(2)]));
}

#[test]
fn maps_keep_duplicate_keys_and_order() {
    assert_eq!(val("{:a 1 :a 2}"),
               Value::Map(vec![(keyword("a"), integer(1)),
                               (keyword("a"), integer(2))]));
}

#[test]
fn empty_input_is_an_error() {
    for s in ["", "   ", " \n\t ", ";; nothing here\n", ", ,"] {
        let e = read_all(s).unwrap_err();
        assert!(matches!(e.err, ReadError::EmptyInput), "{:?}", s);
    }
}

#[test]
fn read_one_rejects_trailing_forms() {
    let e = err("1 2");
    assert!(matches!(e.err, ReadError::MoreThanOneValue));
}

#[test]
fn invalid_numbers() {
    assert!(matches!(err("0xZZ").err,
                     ReadError::Lex(LexError::InvalidHexadecimal(_))));
    assert!(matches!(err("089").err,
                     ReadError::Lex(LexError::InvalidOctal(_))));
    assert!(matches!(err("1//2").err,
                     ReadError::Lex(LexError::InvalidRational(_))));
    assert!(matches!(err("1/0").err,
                     ReadError::Lex(LexError::InvalidRational(_))));
    assert!(matches!(err("1r0").err,
                     ReadError::Lex(LexError::InvalidRadix(_))));
    assert!(matches!(err("37r12").err,
                     ReadError::Lex(LexError::InvalidRadix(_))));
    assert!(matches!(err("8r8").err,
                     ReadError::Lex(LexError::InvalidRadix(_))));
    assert!(matches!(err("2r10.1").err,
                     ReadError::Lex(LexError::InvalidRadix(_))));
}

#[test]
fn unterminated_string() {
    let e = err("\"abc");
    assert!(matches!(e.err, ReadError::Lex(LexError::UnterminatedString)));
}

#[test]
fn container_errors() {
    assert!(matches!(err("(1 2").err,
                     ReadError::PrematureEofExpectingClosingParen(_)));
    assert!(matches!(err("(1]").err, ReadError::ParenMismatch(..)));
    assert!(matches!(err("]").err, ReadError::UnexpectedClosingParen(_)));
    assert!(matches!(err("{:a}").err, ReadError::MissingMapValue));
    assert!(matches!(err("#1").err, ReadError::SharpExpectsSymbolOrSet));
    assert!(matches!(err("#_").err, ReadError::MissingExpressionAfter(_)));
    assert!(matches!(err("^:a").err, ReadError::MissingExpressionAfter(_)));
    assert!(matches!(err("#foo").err, ReadError::MissingExpressionAfter(_)));
}

#[test]
fn error_positions_are_line_based() {
    let e = err("\n\n(1");
    assert_eq!(e.pos.line, 3);
    let e = read_all("[\n \"oops").unwrap_err();
    assert_eq!(e.pos.line, 2);
}

#[test]
fn lex_reports_tokens_and_end_line() {
    let (ts, end_line) = lex("foo :bar\n42").unwrap();
    assert_eq!(end_line, 2);
    let kinds: Vec<Token> = ts.into_iter().map(|t| t.0).collect();
    assert_eq!(kinds,
               vec![Token::Symbol(KString::from_static("foo")),
                    Token::Keyword(KString::from_static("bar")),
                    Token::Integer(BigInt::from(42))]);

    let (ts, end_line) = lex("#{} ;; trailing\n").unwrap();
    assert_eq!(end_line, 2);
    assert_eq!(ts.len(), 3); // sharp, open, close
    assert_eq!(ts[1].1.line, 1);
}

#[test]
fn nested_structures() {
    assert_eq!(
        val("{:xs [1 2] :ys #{(3)} :m {:k nil}}"),
        Value::Map(vec![
            (keyword("xs"), Value::Vector(vec![integer(1), integer(2)])),
            (keyword("ys"),
             Value::Set(vec![Value::List(vec![integer(3)])])),
            (keyword("m"),
             Value::Map(vec![(keyword("k"), Value::Nil)])),
        ]));
}

#[test]
fn deep_nesting_is_bounded() {
    let mut s = String::new();
    for _ in 0..600 {
        s.push('(');
    }
    let e = read_all(&s).unwrap_err();
    assert!(matches!(e.err, ReadError::NestingTooDeep));
}
