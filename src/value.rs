// EDN values (runtime data types)

use crate::number::Rational;
use crate::pos::Pos;
use crate::settings::{Format, PLAIN_FORMAT};
use std::fmt::{Display, Write};
use kstring::KString;
use num::BigInt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parenkind {
    Round,
    Square,
    Curly
}

impl Parenkind {
    pub fn opening(self) -> char {
        match self {
            Parenkind::Round => '(',
            Parenkind::Square => '[',
            Parenkind::Curly => '{'
        }
    }
    pub fn closing(self) -> char {
        match self {
            Parenkind::Round => ')',
            Parenkind::Square => ']',
            Parenkind::Curly => '}'
        }
    }
}

/// The non-finite doubles `##Inf`, `##-Inf` and `##NaN`. Kept apart
/// from [Value::Float] so that the printer can re-emit the `##`
/// spellings verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialKind {
    PosInf,
    NegInf,
    Nan,
}

/// An EDN value tree. Containers own their children; equality is
/// structural and variant-discriminating (`Vector([1])` is not
/// `List([1])`, and [Value::KeywordNil] is not [Value::Nil]).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Integer(BigInt),
    Float(f64),
    Rational(Rational),
    Special(SpecialKind),
    Char(char),
    String(KString),
    /// `:foo` or `:ns/foo`. Never holds the name `nil`; that source
    /// text is [Value::KeywordNil].
    Keyword(KString),
    /// The literal keyword `:nil`, kept distinct from [Value::Nil] so
    /// it can be re-printed verbatim.
    KeywordNil,
    Symbol(KString),
    List(Vec<Value>),
    Vector(Vec<Value>),
    /// Insertion order preserved; the reader does not deduplicate
    /// (the normalizer does).
    Set(Vec<Value>),
    /// Key-value pairs in insertion order, duplicates allowed.
    Map(Vec<(Value, Value)>),
    /// `#tag value`
    Tagged(KString, Box<Value>),
    /// `#_ value`; the wrapped value is preserved in the tree so
    /// consumers can decide whether to honour the discard.
    Discard(Box<Value>),
    /// `^meta target` as (target, meta). `^a ^b x` nests as
    /// `Meta(Meta(x, b), a)`.
    Meta(Box<Value>, Box<Value>),
}

pub fn symbol(s: &str) -> Value {
    Value::Symbol(KString::from_ref(s))
}

/// The only constructor for keyword values; `keyword("nil")` yields
/// [Value::KeywordNil].
pub fn keyword(s: &str) -> Value {
    if s == "nil" {
        Value::KeywordNil
    } else {
        Value::Keyword(KString::from_ref(s))
    }
}

pub fn string(s: &str) -> Value {
    Value::String(KString::from_ref(s))
}

pub fn integer(n: i64) -> Value {
    Value::Integer(BigInt::from(n))
}

impl Value {
    pub fn at(self, p: Pos) -> ValueWithPos {
        ValueWithPos(self, p)
    }

    /// Render with an explicit printer [Format]; the [Display]
    /// implementation uses [PLAIN_FORMAT].
    pub fn format<'v>(&'v self, format: &'v Format) -> FormattedValue<'v> {
        FormattedValue { value: self, format }
    }
}

#[derive(Debug, Clone)]
pub struct ValueWithPos(pub Value, pub Pos);

impl ValueWithPos {
    pub fn value(&self) -> &Value {
        &self.0
    }
    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<ValueWithPos> for Value {
    fn from(v: ValueWithPos) -> Value {
        v.0
    }
}

pub struct FormattedValue<'v> {
    value: &'v Value,
    format: &'v Format,
}

pub(crate) fn fmt_string(f: &mut std::fmt::Formatter<'_>, s: &str)
                         -> Result<(), std::fmt::Error> {
    f.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            _ => f.write_char(c)?,
        }
    }
    f.write_char('"')
}

fn fmt_char(f: &mut std::fmt::Formatter<'_>, c: char, format: &Format)
            -> Result<(), std::fmt::Error> {
    if format.named_chars {
        match c {
            '\n' => return f.write_str("\\newline"),
            '\r' => return f.write_str("\\return"),
            '\t' => return f.write_str("\\tab"),
            ' ' => return f.write_str("\\space"),
            _ => {}
        }
    }
    f.write_fmt(format_args!("\\{}", c))
}

fn fmt_items(f: &mut std::fmt::Formatter<'_>, vs: &[Value], format: &Format)
             -> Result<(), std::fmt::Error> {
    for (i, v) in vs.iter().enumerate() {
        if i > 0 {
            f.write_char(' ')?;
        }
        fmt_value(f, v, format)?;
    }
    Ok(())
}

fn fmt_value(f: &mut std::fmt::Formatter<'_>, v: &Value, format: &Format)
             -> Result<(), std::fmt::Error> {
    match v {
        Value::Nil => f.write_str("nil"),
        Value::Bool(b) => f.write_str(if *b { "true" } else { "false" }),
        Value::Integer(n) => f.write_fmt(format_args!("{}", n)),
        // {:?} keeps a decimal point or exponent so the text reads
        // back as a float, not an integer.
        Value::Float(x) => f.write_fmt(format_args!("{:?}", x)),
        Value::Rational(r) => r.fmt(f),
        Value::Special(SpecialKind::PosInf) => f.write_str("##Inf"),
        Value::Special(SpecialKind::NegInf) => f.write_str("##-Inf"),
        Value::Special(SpecialKind::Nan) => f.write_str("##NaN"),
        Value::Char(c) => fmt_char(f, *c, format),
        Value::String(s) => fmt_string(f, s),
        Value::Keyword(s) => f.write_fmt(format_args!(":{}", s)),
        Value::KeywordNil => f.write_str(":nil"),
        Value::Symbol(s) => f.write_str(s),
        Value::List(vs) => {
            f.write_char('(')?;
            fmt_items(f, vs, format)?;
            f.write_char(')')
        }
        Value::Vector(vs) => {
            f.write_char('[')?;
            fmt_items(f, vs, format)?;
            f.write_char(']')
        }
        Value::Set(vs) => {
            f.write_str("#{")?;
            fmt_items(f, vs, format)?;
            f.write_char('}')
        }
        Value::Map(pairs) => {
            f.write_char('{')?;
            for (i, (k, v)) in pairs.iter().enumerate() {
                if i > 0 {
                    f.write_char(' ')?;
                }
                fmt_value(f, k, format)?;
                f.write_char(' ')?;
                fmt_value(f, v, format)?;
            }
            f.write_char('}')
        }
        Value::Tagged(tag, v) => {
            f.write_fmt(format_args!("#{} ", tag))?;
            fmt_value(f, v, format)
        }
        Value::Discard(v) => {
            f.write_str("#_ ")?;
            fmt_value(f, v, format)
        }
        Value::Meta(target, meta) => {
            f.write_char('^')?;
            fmt_value(f, meta, format)?;
            f.write_char(' ')?;
            fmt_value(f, target, format)
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>)
           -> Result<(), std::fmt::Error> {
        fmt_value(f, self, &PLAIN_FORMAT)
    }
}

impl<'v> std::fmt::Display for FormattedValue<'v> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>)
           -> Result<(), std::fmt::Error> {
        fmt_value(f, self.value, self.format)
    }
}

impl std::fmt::Display for ValueWithPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>)
           -> Result<(), std::fmt::Error> {
        self.0.fmt(f)
    }
}
