// Copyright the anyedn authors.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use anyedn::meta::{get_metadata, merge_metadata, strip_metadata,
                   with_metadata};
use anyedn::read::read_one;
use anyedn::value::{integer, keyword, string, symbol, Value};

fn val(input: &str) -> Value {
    read_one(input).unwrap().into_value()
}

#[test]
fn get_after_with() {
    let v = with_metadata(symbol("x"), keyword("a"));
    assert_eq!(get_metadata(&v), Some(&keyword("a")));
    assert_eq!(get_metadata(&symbol("x")), None);
}

#[test]
fn get_on_chain_yields_outermost() {
    let v = val("^:a ^:b x");
    assert_eq!(get_metadata(&v), Some(&keyword("a")));
}

#[test]
fn strip_removes_wrappers_everywhere() {
    let v = val("^:a [1 ^:b (2 ^:c x) {^:d :k #myapp/T ^:e 3}]");
    let stripped = strip_metadata(v);
    assert_eq!(stripped,
               val("[1 (2 x) {:k #myapp/T 3}]"));
}

#[test]
fn strip_is_idempotent() {
    let v = val("^:a ^:b {:k [^:c 1]}");
    let once = strip_metadata(v);
    let twice = strip_metadata(once.clone());
    assert_eq!(once, twice);
}

#[test]
fn strip_leaves_plain_trees_alone() {
    let v = val("{:a [1 2] :b #{x}}");
    assert_eq!(strip_metadata(v.clone()), v);
}

#[test]
fn merge_on_unannotated_value_wraps() {
    let v = merge_metadata(symbol("x"), keyword("a"));
    assert_eq!(v, val("^:a x"));
}

#[test]
fn merge_folds_keywords_to_flag_maps() {
    let v = merge_metadata(val("^:a x"), keyword("b"));
    assert_eq!(v, val("^{:a true :b true} x"));
}

#[test]
fn merge_folds_strings_to_tag_entries() {
    let v = merge_metadata(val("^:a x"), string("doc"));
    assert_eq!(v, val("^{:a true :tag \"doc\"} x"));
}

#[test]
fn merge_keeps_map_entries_in_order() {
    let v = merge_metadata(val("^{:k 1} x"), val("{:l 2}"));
    assert_eq!(v, val("^{:k 1 :l 2} x"));
}

#[test]
fn merge_folds_other_values_to_value_entries() {
    let v = merge_metadata(val("^:a x"), integer(7));
    assert_eq!(v, val("^{:a true :value 7} x"));
}

#[test]
fn merge_always_yields_a_wrapper() {
    for s in ["x", "^:a x", "[1 2]", "nil"] {
        let v = merge_metadata(val(s), keyword("m"));
        assert!(matches!(v, Value::Meta(_, _)), "{:?}", s);
    }
}
