// Copyright the anyedn authors.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The implementation of the EDN `read` function (as well as helpers
//! around it), i.e. parsing a character stream to a [Value] tree
//! representation. See [parse](crate::parse) for using the underlying
//! tokenizer directly.

use crate::pos::Pos;
use crate::context::{self, Context};
use crate::parse::{Token, TokenWithPos, parse,
                   LexError, LexErrorWithPos};
use crate::value::{keyword, Parenkind, SpecialKind, Value, ValueWithPos};
use crate::buffered_chars::{buffered_chars, str_chars};
use std::fmt::{Formatter, Display};
use std::io::Write;
use std::path::Path;
use std::fs::File;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReadError {
    #[error("{0}")]
    Lex(LexError),
    #[error("empty input, expecting a value")]
    EmptyInput,
    #[error("expecting a single value, got more")]
    MoreThanOneValue,
    #[error("map literal with a dangling key")]
    MissingMapValue,
    #[error("'#' expects a symbol or '{{' after it")]
    SharpExpectsSymbolOrSet,
    #[error("nesting too deep")]
    NestingTooDeep,
    #[error("'{}' {1} expects '{}', got '{}'",
            .0.opening(), .0.closing(), .2.closing())]
    ParenMismatch(Parenkind, Pos, Parenkind),
    #[error("unexpected closing character '{}'", .0.closing())]
    UnexpectedClosingParen(Parenkind),
    #[error("premature EOF while expecting closing character '{}' for '{}'",
            .0.closing(), .0.opening())]
    PrematureEofExpectingClosingParen(Parenkind),
    #[error("missing expression after {0}")]
    MissingExpressionAfter(&'static str),
 }

#[derive(Error, Debug)]
#[error("{err} {pos}")]
pub struct ReadErrorWithPos {
    pub err: ReadError,
    pub pos: Pos
}

impl ReadError {
    fn at(self, p: Pos) -> ReadErrorWithPos {
        ReadErrorWithPos {
            err: self,
            pos: p
        }
    }
}

trait At<T> {
    fn at(self, p: Pos) -> Result<T, ReadErrorWithPos>;
}

impl<T> At<T> for Result<T, ReadError> {
    fn at(self, p: Pos) -> Result<T, ReadErrorWithPos> {
        match self {
            Err(e) => Err(e.at(p)),
            Ok(v) => Ok(v)
        }
    }
}

#[derive(Error, Debug)]
pub struct ReadErrorWithPosContext {
    err_with_pos: ReadErrorWithPos,
    container: Box<dyn Context>
}

impl Display for ReadErrorWithPosContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        f.write_fmt(format_args!("{} ",
                                 self.err_with_pos.err))?;
        self.container.format_with_pos(self.err_with_pos.pos, f)?;
        Ok(())
    }
}

impl From<LexErrorWithPos> for ReadErrorWithPos {
    fn from(ep: LexErrorWithPos) -> ReadErrorWithPos {
        let LexErrorWithPos { err, pos } = ep;
        ReadErrorWithPos {
            err: ReadError::Lex(err),
            pos
        }
    }
}

#[derive(Error, Debug)]
pub enum ReadErrorWithContext {
    #[error("{}: {0}", .1.to_string_without_pos())]
    IO(std::io::Error, Box<dyn Context>),
    #[error("{}: expecting file extension \"edn\", got {0:?}",
            .1.to_string_without_pos())]
    InvalidExtension(String, Box<dyn Context>),
}

#[derive(Error, Debug)]
pub enum ReadErrorWithLocation {
    #[error("{0}")]
    PC(Box<ReadErrorWithPosContext>),
    #[error("{0}")]
    File(Box<ReadErrorWithContext>)
}


// Transform an IO error without Pos context
fn io_add_file<T>(
    r: Result<T, std::io::Error>,
    path: &Path
) -> Result<T, ReadErrorWithLocation>
{
    match r {
        Err(e) => Err(ReadErrorWithLocation::File(Box::new(
            ReadErrorWithContext::IO(
                e,
                Box::new(context::FileContext { path: path.to_path_buf() }))))),
        Ok(v) => Ok(v)
    }
}

// Transform ReadErrorWithPos adding file
fn rewp_add_file<T>(
    r: Result<T, ReadErrorWithPos>,
    path: &Path
) -> Result<T, ReadErrorWithLocation>
{
    match r {
        Err(e) => Err(ReadErrorWithLocation::PC(
            Box::new(
                ReadErrorWithPosContext {
                    err_with_pos: e,
                    container: Box::new(context::FileContext { path: path.to_path_buf() })
                }))),
        Ok(v) => Ok(v)
    }
}

fn dec(fuel: u32) -> Result<u32, ReadError> {
    if fuel == 0 {
        return Err(ReadError::NestingTooDeep)
    }
    Ok(fuel - 1)
}

fn into_values(vs: Vec<ValueWithPos>) -> Vec<Value> {
    vs.into_iter().map(ValueWithPos::into_value).collect()
}

// Group the items of a `{...}` literal into pairs; the reader keeps
// duplicate keys.
fn into_map(vs: Vec<ValueWithPos>) -> Result<Value, ReadError> {
    if vs.len() % 2 != 0 {
        return Err(ReadError::MissingMapValue)
    }
    let mut pairs = Vec::with_capacity(vs.len() / 2);
    let mut items = vs.into_iter();
    while let (Some(k), Some(v)) = (items.next(), items.next()) {
        pairs.push((k.into_value(), v.into_value()));
    }
    Ok(Value::Map(pairs))
}

// Reads one expression. Returns None on EOF. Signals
// ReadError::UnexpectedClosingParen if there's no expression left in
// the current level.
fn iterator_read(
    ts: &mut impl Iterator<Item = Result<TokenWithPos, LexErrorWithPos>>,
    depth_fuel: u32,
) -> Result<Option<ValueWithPos>, ReadErrorWithPos>
{
    let TokenWithPos(t, pos) = match ts.next().transpose()? {
        Some(tp) => tp,
        None => return Ok(None)
    };
    match t {
        Token::Open(pk) => {
            let items = iterator_read_all(ts, Some((pk, pos)),
                                          dec(depth_fuel).at(pos)?)?;
            let v = match pk {
                Parenkind::Round => Value::List(into_values(items)),
                Parenkind::Square => Value::Vector(into_values(items)),
                Parenkind::Curly => into_map(items).at(pos)?,
            };
            Ok(Some(v.at(pos)))
        }
        Token::Close(pk) => {
            Err(ReadError::UnexpectedClosingParen(pk).at(pos))
        }
        Token::Sharp => {
            // a set or a tagged literal
            match ts.next().transpose()? {
                None =>
                    Err(ReadError::MissingExpressionAfter("'#'").at(pos)),
                Some(TokenWithPos(Token::Open(Parenkind::Curly), pos2)) => {
                    let items = iterator_read_all(
                        ts, Some((Parenkind::Curly, pos2)),
                        dec(depth_fuel).at(pos)?)?;
                    Ok(Some(Value::Set(into_values(items)).at(pos)))
                }
                Some(TokenWithPos(Token::Symbol(tag), pos2)) => {
                    if let Some(v) = iterator_read(
                        ts, dec(depth_fuel).at(pos2)?)? {
                        Ok(Some(Value::Tagged(tag, Box::new(v.into_value()))
                                .at(pos)))
                    } else {
                        Err(ReadError::MissingExpressionAfter("a tag")
                            .at(pos2))
                    }
                }
                Some(TokenWithPos(_, pos2)) =>
                    Err(ReadError::SharpExpectsSymbolOrSet.at(pos2)),
            }
        }
        Token::Ignore => {
            if let Some(v) = iterator_read(ts, dec(depth_fuel).at(pos)?)? {
                Ok(Some(Value::Discard(Box::new(v.into_value())).at(pos)))
            } else {
                Err(ReadError::MissingExpressionAfter("'#_'").at(pos))
            }
        }
        Token::Caret => {
            // ^a ^b x nests with the left-most caret outermost
            let fuel = dec(depth_fuel).at(pos)?;
            let meta = iterator_read(ts, fuel)?.ok_or_else(
                || ReadError::MissingExpressionAfter("'^'").at(pos))?;
            let target = iterator_read(ts, fuel)?.ok_or_else(
                || ReadError::MissingExpressionAfter("'^'").at(pos))?;
            Ok(Some(Value::Meta(Box::new(target.into_value()),
                                Box::new(meta.into_value())).at(pos)))
        }
        Token::Integer(n) | Token::Hexadecimal(n)
        | Token::Octal(n) | Token::Radix(n) =>
            Ok(Some(Value::Integer(n).at(pos))),
        Token::Rational(r) => Ok(Some(Value::Rational(r).at(pos))),
        Token::Float(x) => Ok(Some(Value::Float(x).at(pos))),
        Token::String(s) => Ok(Some(Value::String(s).at(pos))),
        Token::Char(c) => Ok(Some(Value::Char(c).at(pos))),
        Token::Bool(b) => Ok(Some(Value::Bool(b).at(pos))),
        Token::Nil => Ok(Some(Value::Nil.at(pos))),
        // the keyword constructor turns `:nil` into the KeywordNil
        // variant
        Token::Keyword(s) => Ok(Some(keyword(&s).at(pos))),
        Token::Symbol(s) => Ok(Some(Value::Symbol(s).at(pos))),
        Token::InfPos =>
            Ok(Some(Value::Special(SpecialKind::PosInf).at(pos))),
        Token::InfNeg =>
            Ok(Some(Value::Special(SpecialKind::NegInf).at(pos))),
        Token::Nan =>
            Ok(Some(Value::Special(SpecialKind::Nan).at(pos))),
    }
}

// Read and fill a vector of values up to the expected end
// delimiter. Whether map items pair up is checked by the caller.
fn iterator_read_all(
    ts: &mut impl Iterator<Item = Result<TokenWithPos, LexErrorWithPos>>,
    opt_parenkind: Option<(Parenkind, Pos)>,
    depth_fuel: u32,
) -> Result<Vec<ValueWithPos>, ReadErrorWithPos>
{
    let mut vs = Vec::new();
    while let Some(r) = iterator_read(ts, depth_fuel).transpose() {
        match r {
            Err(ep) => {
                let ReadErrorWithPos { err, pos } = &ep;
                match err {
                    ReadError::UnexpectedClosingParen(pk) => {
                        if let Some((parenkind, startpos)) = opt_parenkind {
                            if *pk == parenkind {
                                return Ok(vs)
                            } else {
                                return Err(ReadError::ParenMismatch(
                                    parenkind, startpos, *pk)
                                           .at(*pos))
                            }
                        } else {
                            return Err(ep)
                        }
                    }
                    _ => return Err(ep)
                }
            }
            Ok(v) => {
                vs.push(v);
            }
        }
    }
    if let Some((parenkind, startpos)) = opt_parenkind {
        Err(ReadError::PrematureEofExpectingClosingParen(parenkind)
            .at(startpos))
    } else {
        Ok(vs)
    }
}

fn read_stream(
    cs: &mut impl Iterator<Item = anyhow::Result<(char, Pos)>>,
) -> Result<Vec<ValueWithPos>, ReadErrorWithPos>
{
    let depth_fuel = 500;
    // ^ the limit with default settings on Linux is around 1200
    let mut ts = parse(cs);
    let vs = iterator_read_all(&mut ts, None, depth_fuel)?;
    if vs.is_empty() {
        Err(ReadError::EmptyInput.at(Pos::start()))
    } else {
        Ok(vs)
    }
}

/// Read (deserialize) every top-level form of the input to a sequence
/// of [ValueWithPos](ValueWithPos). Input without any form (empty or
/// only whitespace and comments) is an error.
pub fn read_all(input: &str) -> Result<Vec<ValueWithPos>, ReadErrorWithPos> {
    let mut cs = str_chars(input);
    read_stream(&mut cs)
}

/// Read input holding exactly one top-level form.
pub fn read_one(input: &str) -> Result<ValueWithPos, ReadErrorWithPos> {
    let mut vs = read_all(input)?;
    if vs.len() > 1 {
        return Err(ReadError::MoreThanOneValue.at(vs[1].1));
    }
    // read_all never returns an empty list
    Ok(vs.swap_remove(0))
}

/// Read (deserialize) the contents of a file to a sequence of
/// [ValueWithPos](ValueWithPos). The file name must carry the `edn`
/// extension.
pub fn read_file(path: &Path) -> Result<Vec<ValueWithPos>, ReadErrorWithLocation> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    if ext != "edn" {
        return Err(ReadErrorWithLocation::File(Box::new(
            ReadErrorWithContext::InvalidExtension(
                ext.to_string(),
                Box::new(context::FileContext { path: path.to_path_buf() })))));
    }
    let fh = io_add_file(File::open(path), path)?;
    let mut cs = buffered_chars(fh);
    let v = rewp_add_file(read_stream(&mut cs), path)?;
    Ok(v)
}

/// Serialize a single [Value](Value) to its canonical EDN text.
pub fn print(v: &Value) -> Vec<u8> {
    v.to_string().into_bytes()
}

/// Write (serialize) a sequence of [Value](Value) or
/// [ValueWithPos](ValueWithPos) to an output stream.
pub fn write_all<'t, T: Display + 't>(
    out: impl Write,
    vals: impl IntoIterator<Item = &'t T>
) -> Result<(), std::io::Error> {
    let mut out = out; // for `File`
    let mut seen_item = false;
    for v in vals.into_iter() {
        write!(out, "{}{}\n", if seen_item {"\n"} else {""}, v)?;
        seen_item = true;
    }
    Ok(())
}

/// Write (serialize) a sequence of [Value](Value) to a file.
pub fn write_file<'t>(path: &Path, vals: impl IntoIterator<Item = &'t Value>)
                      -> Result<(), std::io::Error> {
    write_all(File::create(path)?, vals)
}
