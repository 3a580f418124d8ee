// Copyright the anyedn authors.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Working with the `^meta` annotations of a value tree: attach,
//! strip, merge and extract.

use crate::value::Value;
use kstring::KString;

/// The metadata attached to `v`, if any. On chained annotations
/// (`^a ^b x`) this is the left-most one.
pub fn get_metadata(v: &Value) -> Option<&Value> {
    if let Value::Meta(_, m) = v {
        Some(m)
    } else {
        None
    }
}

/// Wrap `v` with the annotation `m`.
pub fn with_metadata(v: Value, m: Value) -> Value {
    Value::Meta(Box::new(v), Box::new(m))
}

/// Remove every metadata wrapper in the tree, descending into
/// containers, tagged literals and discards. Idempotent.
pub fn strip_metadata(v: Value) -> Value {
    match v {
        Value::Meta(target, _meta) => strip_metadata(*target),
        Value::List(vs) =>
            Value::List(vs.into_iter().map(strip_metadata).collect()),
        Value::Vector(vs) =>
            Value::Vector(vs.into_iter().map(strip_metadata).collect()),
        Value::Set(vs) =>
            Value::Set(vs.into_iter().map(strip_metadata).collect()),
        Value::Map(pairs) =>
            Value::Map(pairs.into_iter()
                       .map(|(k, v)| (strip_metadata(k), strip_metadata(v)))
                       .collect()),
        Value::Tagged(tag, v) =>
            Value::Tagged(tag, Box::new(strip_metadata(*v))),
        Value::Discard(v) =>
            Value::Discard(Box::new(strip_metadata(*v))),
        v => v
    }
}

// The map form of an annotation: a keyword is a flag set to true, a
// string is a :tag entry, a map is itself, anything else is a :value
// entry.
fn map_form(m: Value) -> Vec<(Value, Value)> {
    match m {
        Value::Keyword(_) | Value::KeywordNil =>
            vec![(m, Value::Bool(true))],
        Value::String(_) =>
            vec![(Value::Keyword(KString::from_static("tag")), m)],
        Value::Map(pairs) => pairs,
        m => vec![(Value::Keyword(KString::from_static("value")), m)],
    }
}

// Fold two annotations into one map, existing entries first.
fn combine(existing: Value, new: Value) -> Value {
    let mut pairs = map_form(existing);
    pairs.append(&mut map_form(new));
    Value::Map(pairs)
}

/// Attach `new_m` to `v`, folding it together with any annotation
/// already present. The result is always a metadata wrapper.
pub fn merge_metadata(v: Value, new_m: Value) -> Value {
    match v {
        Value::Meta(target, existing) =>
            Value::Meta(target, Box::new(combine(*existing, new_m))),
        v => with_metadata(v, new_m)
    }
}
