// Copyright the anyedn authors.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Rewriting a raw [Value] tree into native containers: the
//! source-level distinctions the reader preserves (vector vs. list,
//! `:nil` vs. `nil`, duplicate set elements, `##Inf` vs. a float) are
//! folded away, and tagged literals are resolved through a
//! user-supplied registry of handlers.

use crate::number::Rational;
use crate::settings::DiscardMode;
use crate::value::{SpecialKind, Value};
use std::collections::HashMap;
use kstring::KString;
use num::BigInt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("no handler for tag '{0}'")]
    HandlerNotFound(KString),
    #[error("discarded value in input")]
    DiscardedValue,
    #[error("handler for tag '{0}' failed: {1}")]
    Handler(KString, String),
}

/// The native rendition of a tree. Lists and vectors both come out as
/// [Native::Seq]; `:nil` comes out as [Native::Nil]; characters come
/// out as one-character strings; the non-finite markers come out as
/// the corresponding [f64] sentinels.
#[derive(Debug, Clone, PartialEq)]
pub enum Native {
    Nil,
    Bool(bool),
    Integer(BigInt),
    Float(f64),
    Rational(Rational),
    String(KString),
    Keyword(KString),
    /// Symbols have no native counterpart and stay what they are.
    Symbol(KString),
    Seq(Vec<Native>),
    /// Deduplicated, in first-occurrence order.
    Set(Vec<Native>),
    Map(Vec<(Native, Native)>),
    Meta(Box<Native>, Box<Native>),
}

/// A tag interpreter. Receives the tag name, the already-normalized
/// payload, and the registry itself (so it can hand nested work back).
pub type Handler =
    Box<dyn Fn(&str, Native, &Handlers) -> Result<Native, NormalizeError>>;

/// The registry of tag handlers, plus the policy for `#_` forms.
pub struct Handlers {
    handlers: HashMap<KString, Handler>,
    pub discard: DiscardMode,
}

impl Handlers {
    pub fn new() -> Self {
        Handlers {
            handlers: HashMap::new(),
            discard: DiscardMode::default(),
        }
    }

    pub fn with_discard(discard: DiscardMode) -> Self {
        Handlers {
            handlers: HashMap::new(),
            discard,
        }
    }

    pub fn register(
        &mut self,
        tag: &str,
        handler: impl Fn(&str, Native, &Handlers)
                        -> Result<Native, NormalizeError> + 'static,
    ) {
        self.handlers.insert(KString::from_ref(tag), Box::new(handler));
    }

    fn get(&self, tag: &str) -> Option<&Handler> {
        self.handlers.get(tag)
    }
}

impl Default for Handlers {
    fn default() -> Self {
        Handlers::new()
    }
}

impl std::fmt::Debug for Handlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>)
           -> Result<(), std::fmt::Error> {
        let mut tags: Vec<&str> =
            self.handlers.keys().map(|k| k.as_str()).collect();
        tags.sort();
        f.debug_struct("Handlers")
            .field("tags", &tags)
            .field("discard", &self.discard)
            .finish()
    }
}

fn normalize_items(vs: &[Value], handlers: &Handlers)
                   -> Result<Vec<Native>, NormalizeError> {
    vs.iter().map(|v| normalize(v, handlers)).collect()
}

/// Normalize a tree. Deterministic: the same tree and registry give
/// the same result.
pub fn normalize(v: &Value, handlers: &Handlers)
                 -> Result<Native, NormalizeError> {
    match v {
        Value::Nil | Value::KeywordNil => Ok(Native::Nil),
        Value::Bool(b) => Ok(Native::Bool(*b)),
        Value::Integer(n) => Ok(Native::Integer(n.clone())),
        Value::Float(x) => Ok(Native::Float(*x)),
        Value::Rational(r) => Ok(Native::Rational(r.clone())),
        Value::Special(SpecialKind::PosInf) =>
            Ok(Native::Float(f64::INFINITY)),
        Value::Special(SpecialKind::NegInf) =>
            Ok(Native::Float(f64::NEG_INFINITY)),
        Value::Special(SpecialKind::Nan) => Ok(Native::Float(f64::NAN)),
        Value::Char(c) => Ok(Native::String(KString::from_string(c.to_string()))),
        Value::String(s) => Ok(Native::String(s.clone())),
        Value::Keyword(s) => Ok(Native::Keyword(s.clone())),
        Value::Symbol(s) => Ok(Native::Symbol(s.clone())),
        Value::List(vs) | Value::Vector(vs) =>
            Ok(Native::Seq(normalize_items(vs, handlers)?)),
        Value::Set(vs) => {
            let mut items: Vec<Native> = Vec::with_capacity(vs.len());
            for v in vs {
                let n = normalize(v, handlers)?;
                if !items.contains(&n) {
                    items.push(n);
                }
            }
            Ok(Native::Set(items))
        }
        Value::Map(pairs) => {
            let mut out = Vec::with_capacity(pairs.len());
            for (k, v) in pairs {
                out.push((normalize(k, handlers)?, normalize(v, handlers)?));
            }
            Ok(Native::Map(out))
        }
        Value::Meta(target, meta) =>
            Ok(Native::Meta(Box::new(normalize(target, handlers)?),
                            Box::new(normalize(meta, handlers)?))),
        Value::Tagged(tag, v) => {
            let handler = handlers.get(tag).ok_or_else(
                || NormalizeError::HandlerNotFound(tag.clone()))?;
            let payload = normalize(v, handlers)?;
            handler(tag.as_str(), payload, handlers)
        }
        Value::Discard(v) => {
            match handlers.discard {
                DiscardMode::Propagate => normalize(v, handlers),
                DiscardMode::Reject => Err(NormalizeError::DiscardedValue),
            }
        }
    }
}
