// Copyright the anyedn authors.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Translating a character stream to a token stream. This is
//! (currently) called "parser" because it fully parses atoms (like
//! strings, numbers of every base, keywords, etc.), thus "tokenizer"
//! may be selling it short (?). The only tokens that denote nesting
//! are `Token::Open`, `Token::Close` and the `Token::Sharp` prefix.
//! See [read](../read/index.html) if interested in trees rather than
//! atoms / tokens.

use crate::number::{parse_digits, Rational};
use crate::pos::Pos;
use crate::value::{fmt_string, Parenkind};
use num::BigInt;
use kstring::KString;
use thiserror::Error;
use genawaiter::rc::Gen;
use std::fmt::{Display, Write};

#[derive(Error, Debug)]
pub enum LexError {
    #[error("IO error ({0}) after")]
    IoError(anyhow::Error),
    #[error("invalid hexadecimal literal '{0}'")]
    InvalidHexadecimal(KString),
    #[error("invalid octal literal '{0}'")]
    InvalidOctal(KString),
    #[error("invalid rational literal '{0}'")]
    InvalidRational(KString),
    #[error("invalid radix literal '{0}'")]
    InvalidRadix(KString),
    #[error("unterminated string starting")]
    UnterminatedString,
    #[error("invalid character '{0}'")]
    InvalidChar(KString),
}

#[derive(Error, Debug)]
#[error("{err} {pos}")]
pub struct LexErrorWithPos {
    pub err: LexError,
    pub pos: Pos
}

impl LexError {
    fn at(self, p: Pos) -> LexErrorWithPos {
        LexErrorWithPos {
            err: self,
            pos: p
        }
    }
}

pub fn maybe_open_close(c: char) -> Option<Token> {
    match c {
        '(' => Some(Token::Open(Parenkind::Round)),
        '[' => Some(Token::Open(Parenkind::Square)),
        '{' => Some(Token::Open(Parenkind::Curly)),
        ')' => Some(Token::Close(Parenkind::Round)),
        ']' => Some(Token::Close(Parenkind::Square)),
        '}' => Some(Token::Close(Parenkind::Curly)),
        _ => None
    }
}

/// The token classes of EDN. The numeric bases are kept apart here so
/// that consumers interested in the source-level spelling can still
/// see it; [read](crate::read) folds them all into integer values.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Open(Parenkind),
    Close(Parenkind),
    Integer(BigInt),
    Hexadecimal(BigInt),
    Octal(BigInt),
    Radix(BigInt),
    Rational(Rational),
    Float(f64),
    String(KString),
    Char(char),
    Bool(bool),
    Nil,
    Keyword(KString),
    Symbol(KString),
    /// `#`, the prefix of sets and tagged literals.
    Sharp,
    /// `^`, the metadata prefix.
    Caret,
    /// `#_`, the discard prefix.
    Ignore,
    InfPos,
    InfNeg,
    Nan,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>)
           -> Result<(), std::fmt::Error> {
        match self {
            Token::Open(k) => f.write_char(k.opening()),
            Token::Close(k) => f.write_char(k.closing()),
            Token::Integer(n) => f.write_fmt(format_args!("{}", n)),
            Token::Hexadecimal(n) => f.write_fmt(format_args!("{}", n)),
            Token::Octal(n) => f.write_fmt(format_args!("{}", n)),
            Token::Radix(n) => f.write_fmt(format_args!("{}", n)),
            Token::Rational(r) => r.fmt(f),
            Token::Float(x) => f.write_fmt(format_args!("{:?}", x)),
            Token::String(s) => fmt_string(f, s),
            Token::Char(c) => f.write_fmt(format_args!("\\{}", c)),
            Token::Bool(b) => f.write_str(if *b { "true" } else { "false" }),
            Token::Nil => f.write_str("nil"),
            Token::Keyword(s) => f.write_fmt(format_args!(":{}", s)),
            Token::Symbol(s) => f.write_str(s),
            Token::Sharp => f.write_char('#'),
            Token::Caret => f.write_char('^'),
            Token::Ignore => f.write_str("#_"),
            Token::InfPos => f.write_str("##Inf"),
            Token::InfNeg => f.write_str("##-Inf"),
            Token::Nan => f.write_str("##NaN"),
        }
    }
}

#[derive(Debug)]
pub struct TokenWithPos(pub Token, pub Pos);

fn try_io<T>(
    o: Option<anyhow::Result<T>>,
    error_pos: Pos
) -> Result<Option<T>, LexErrorWithPos> {
    match o {
        Some(r) => {
            match r {
                Err(e) => Err(LexError::IoError(e).at(error_pos)),
                Ok(v) => Ok(Some(v))
            }
        }
        None => Ok(None)
    }
}

// Commas are whitespace in EDN.
fn is_whitespace_char(c: char) -> bool {
    c.is_whitespace() || c == ','
}

/// The characters that may appear inside symbols, keywords and
/// numeric literals. A maximal run of these is scanned as a unit and
/// then classified by [scan_word].
fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(c, '.' | '*' | '+' | '!' | '-' | '_' | '?' | '$'
                    | '%' | '&' | '=' | '<' | '>' | '/' | ':' | '#')
}

// The characters (other than `+`, `-` and `/`, which carry side
// conditions) that may start a symbol.
fn is_symbol_start(c: char) -> bool {
    c.is_ascii_alphabetic()
        || matches!(c, '.' | '*' | '!' | '_' | '?' | '$' | '%' | '&'
                    | '=' | '<' | '>')
}

// Returns (, None) iff reached EOF;
// returns (None, ) iff reached EOF at the begin and no c was given.
fn read_while(
    c: Option<char>,
    startpos: Pos,
    cs: &mut impl Iterator<Item = anyhow::Result<(char, Pos)>>,
    accepted: fn(char) -> bool,
    mut opt_out: Option<&mut String>,
) -> Result<(Option<char>, Option<(char, Pos)>),
            LexErrorWithPos> {
    if let Some(ref mut out) = opt_out {
        out.clear();
        if let Some(c) = c {
            out.push(c);
        }
    }
    let mut lastc = c;
    let mut lastpos = startpos;
    loop {
        if let Some(r) = cs.next() {
            match r {
                Err(e) => return Err(LexError::IoError(e).at(lastpos)),
                Ok((c, pos)) => {
                    lastpos = pos;
                    if accepted(c) {
                        if let Some(ref mut out) = opt_out {
                            out.push(c);
                        }
                        lastc = Some(c);
                    } else {
                        return Ok((lastc, Some((c, pos))));
                    }
                }
            }
        } else {
            return Ok((lastc, None))
        }
    }
}

// A `"`-delimited string body, after the opening quote. The escapes
// \n \t \r \b \f \" \\ are translated; for any other escaped
// character only the backslash is removed.
fn read_delimited(
    startpos: Pos,
    cs: &mut impl Iterator<Item = anyhow::Result<(char, Pos)>>,
    out: &mut String
) -> Result<(), LexErrorWithPos>
{
    out.clear();
    let mut escaped = false;
    let mut lastpos = startpos;
    loop {
        if let Some(r) = cs.next() {
            match r {
                Err(e) => return Err(LexError::IoError(e).at(lastpos)),
                Ok((c, pos)) => {
                    lastpos = pos;
                    if escaped {
                        match c {
                            'n' => out.push('\n'),
                            't' => out.push('\t'),
                            'r' => out.push('\r'),
                            'b' => out.push('\x08'),
                            'f' => out.push('\x0C'),
                            '"' => out.push('"'),
                            '\\' => out.push('\\'),
                            _ => out.push(c),
                        }
                        escaped = false;
                    } else if c == '\\' {
                        escaped = true;
                    } else if c == '"' {
                        return Ok(());
                    } else {
                        out.push(c);
                    }
                }
            }
        } else {
            return Err(LexError::UnterminatedString.at(startpos));
        }
    }
}

fn sign_len(s: &str) -> usize {
    match s.as_bytes().first() {
        Some(b'+') | Some(b'-') => 1,
        _ => 0
    }
}

fn apply_sign(s: &str, n: BigInt) -> BigInt {
    if s.starts_with('-') { -n } else { n }
}

fn digit_run(s: &str) -> usize {
    s.bytes().take_while(|b| b.is_ascii_digit()).count()
}

fn alnum_run(s: &str) -> usize {
    s.bytes().take_while(|b| b.is_ascii_alphanumeric()).count()
}

// Candidate scanners for [scan_word]. Each returns the number of
// bytes it matched at the start of `s` together with either the token
// or the lexical error the match decodes to; `None` when the rule
// does not apply at all. `s` consists of word characters only.

type Scan = Option<(usize, Result<Token, LexError>)>;

fn scan_hexadecimal(s: &str) -> Scan {
    let sl = sign_len(s);
    let r = &s[sl..];
    if !(r.starts_with("0x") || r.starts_with("0X")) {
        return None;
    }
    let n = alnum_run(&r[2..]);
    if n == 0 {
        return None;
    }
    let len = sl + 2 + n;
    Some((len, match parse_digits(&r[2..2 + n], 16) {
        Some(v) => Ok(Token::Hexadecimal(apply_sign(s, v))),
        None => Err(LexError::InvalidHexadecimal(KString::from_ref(&s[..len]))),
    }))
}

fn scan_octal(s: &str) -> Scan {
    let sl = sign_len(s);
    let r = &s[sl..];
    if !r.starts_with('0') {
        return None;
    }
    let n = digit_run(&r[1..]);
    if n == 0 {
        return None;
    }
    let len = sl + 1 + n;
    Some((len, match parse_digits(&r[1..1 + n], 8) {
        Some(v) => Ok(Token::Octal(apply_sign(s, v))),
        None => Err(LexError::InvalidOctal(KString::from_ref(&s[..len]))),
    }))
}

fn scan_zero_run(s: &str) -> Scan {
    let sl = sign_len(s);
    let n = s[sl..].bytes().take_while(|b| *b == b'0').count();
    if n == 0 {
        return None;
    }
    Some((sl + n, Ok(Token::Integer(0.into()))))
}

fn scan_radix(s: &str) -> Scan {
    let sl = sign_len(s);
    let r = &s[sl..];
    let b = digit_run(r);
    if b == 0 {
        return None;
    }
    let after = &r[b..];
    if !(after.starts_with('r') || after.starts_with('R')) {
        return None;
    }
    let n = alnum_run(&after[1..]);
    if n == 0 {
        return None;
    }
    let mut len = sl + b + 1 + n;
    // Word characters after the digit run (as in `2r10.1`) make the
    // whole lexeme invalid rather than splitting it.
    let trailing = len < s.len();
    if trailing {
        len = s.len();
    }
    let value = r[..b].parse::<u32>().ok()
        .filter(|base| (2..=36).contains(base))
        .and_then(|base| parse_digits(&after[1..1 + n], base));
    Some((len, match value {
        Some(v) if !trailing => Ok(Token::Radix(apply_sign(s, v))),
        _ => Err(LexError::InvalidRadix(KString::from_ref(&s[..len]))),
    }))
}

fn scan_rational(s: &str) -> Scan {
    let sl = sign_len(s);
    let r = &s[sl..];
    let n = digit_run(r);
    if n == 0 {
        return None;
    }
    let after = &r[n..];
    if !after.starts_with('/') {
        return None;
    }
    let d = &after[1..];
    if d.starts_with('/') {
        // `//` is never valid inside a number
        return Some((s.len(),
                     Err(LexError::InvalidRational(KString::from_ref(s)))));
    }
    let dn = digit_run(d);
    if dn == 0 {
        return None;
    }
    let len = sl + n + 1 + dn;
    let numer = apply_sign(s, parse_digits(&r[..n], 10)?);
    let denom = parse_digits(&d[..dn], 10)?;
    Some((len, match Rational::new(numer, denom) {
        Some(rat) => Ok(Token::Rational(rat)),
        None => Err(LexError::InvalidRational(KString::from_ref(&s[..len]))),
    }))
}

fn scan_float(s: &str) -> Scan {
    let sl = sign_len(s);
    let r = &s[sl..];
    let a = digit_run(r);
    if a == 0 {
        return None;
    }
    let mut len = a;
    let mut has_frac = false;
    if r[len..].starts_with('.') {
        let b = digit_run(&r[len + 1..]);
        if b > 0 {
            len += 1 + b;
            has_frac = true;
        }
    }
    let mut has_exp = false;
    if r[len..].starts_with('e') || r[len..].starts_with('E') {
        let e = 1 + sign_len(&r[len + 1..]);
        let d = digit_run(&r[len + e..]);
        if d > 0 {
            len += e + d;
            has_exp = true;
        }
    }
    if !has_frac && !has_exp {
        return None;
    }
    // The trailing exact-precision marker is accepted and dropped.
    let total = sl + len + if r[len..].starts_with('M') { 1 } else { 0 };
    let x = s[..sl + len].parse::<f64>().ok()?;
    Some((total, Ok(Token::Float(x))))
}

fn scan_integer(s: &str) -> Scan {
    let sl = sign_len(s);
    let r = &s[sl..];
    let a = digit_run(r);
    if a == 0 {
        return None;
    }
    // The trailing arbitrary-precision marker is accepted and dropped.
    let len = sl + a + if r[a..].starts_with('N') { 1 } else { 0 };
    let v = parse_digits(&r[..a], 10)?;
    Some((len, Ok(Token::Integer(apply_sign(s, v)))))
}

fn scan_keyword(s: &str) -> Scan {
    if !s.starts_with(':') || s.len() == 1 {
        return None;
    }
    Some((s.len(), Ok(Token::Keyword(KString::from_ref(&s[1..])))))
}

fn scan_symbol(s: &str) -> Scan {
    let c0 = s.chars().next()?;
    let ok = is_symbol_start(c0)
        || ((c0 == '+' || c0 == '-')
            && !s.as_bytes().get(1).map_or(false, |b| b.is_ascii_digit()))
        || c0 == '/';
    if !ok {
        return None;
    }
    let t = match s {
        "true" => Token::Bool(true),
        "false" => Token::Bool(false),
        "nil" => Token::Nil,
        _ => Token::Symbol(KString::from_ref(s)),
    };
    Some((s.len(), Ok(t)))
}

/// Classify the start of a word-character run. Disambiguation is
/// longest match first; on equal lengths the earlier rule wins, which
/// is what makes `089` an invalid octal rather than the integer 89,
/// and `08.5` the float 8.5 rather than an invalid octal.
fn scan_word(s: &str) -> Result<(Token, usize), LexError> {
    let candidates = [
        scan_hexadecimal(s),
        scan_octal(s),
        scan_zero_run(s),
        scan_radix(s),
        scan_rational(s),
        scan_float(s),
        scan_integer(s),
        scan_keyword(s),
        scan_symbol(s),
    ];
    let mut best: Scan = None;
    for c in candidates {
        if let Some((len, r)) = c {
            match best {
                Some((blen, _)) if len <= blen => {}
                _ => best = Some((len, r)),
            }
        }
    }
    match best {
        Some((len, Ok(t))) => Ok((t, len)),
        Some((_, Err(e))) => Err(e),
        None => {
            let first = s.chars().next().map_or(0, |c| c.len_utf8());
            Err(LexError::InvalidChar(KString::from_ref(&s[..first])))
        }
    }
}

// The four character names the reader recognizes, longest first.
const CHAR_NAMES: [(&str, char); 4] = [
    ("newline", '\n'),
    ("return", '\r'),
    ("space", ' '),
    ("tab", '\t'),
];

/// Tokenize a character stream. Whitespace (including commas) and `;`
/// line comments are consumed silently; everything else becomes a
/// [TokenWithPos] carrying the position of its first character.
pub fn parse<'s>(
    cs: impl Iterator<Item = anyhow::Result<(char, Pos)>> + 's,
)
    -> impl Iterator<Item = Result<TokenWithPos, LexErrorWithPos>> + 's
{
    Gen::new(|co| async move {
        let mut cs = cs;
        let mut tmp = String::new();
        let mut maybe_next_c_pos = None;
        let mut lastpos = Pos::start();
        loop {
            let c;
            let pos;
            if let Some(cp) = maybe_next_c_pos {
                (c, pos) = cp;
                maybe_next_c_pos = None;
            } else {
                if let Some(r) = cs.next() {
                    match r {
                        Err(e) => {
                            co.yield_(Err(
                                LexError::IoError(e).at(lastpos))).await;
                            return;
                        }
                        Ok(cp) => {
                            (c, pos) = cp;
                        }
                    }
                } else {
                    return;
                }
            }
            lastpos = pos;

            if let Some(t) = maybe_open_close(c) {
                co.yield_(Ok(TokenWithPos(t, pos))).await;
            } else if is_whitespace_char(c) {
                // skipped
            } else if c == ';' {
                // line comments
                match read_while(Some(c), pos, &mut cs, |c| c != '\n', None) {
                    Err(e) => {
                        co.yield_(Err(e)).await;
                        return;
                    }
                    Ok((_lastc, mcp)) => {
                        if mcp.is_none() {
                            // avoid calling next() again!
                            return
                        }
                        maybe_next_c_pos = mcp;
                    }
                }
            } else if c == '"' {
                match read_delimited(pos, &mut cs, &mut tmp) {
                    Err(e) => {
                        co.yield_(Err(e)).await;
                        return;
                    }
                    Ok(()) => {
                        co.yield_(Ok(
                            TokenWithPos(
                                Token::String(KString::from_ref(&tmp)),
                                pos))).await;
                    }
                }
            } else if c == '\\' {
                // \newline \return \tab \space or \X for any single X
                let c1;
                let pos1;
                match try_io(cs.next(), pos) {
                    Err(e) => {
                        co.yield_(Err(e)).await;
                        return;
                    }
                    Ok(None) => {
                        co.yield_(Err(LexError::InvalidChar(
                            KString::from_static("\\")).at(pos))).await;
                        return;
                    }
                    Ok(Some(cp)) => {
                        (c1, pos1) = cp;
                    }
                }
                if is_word_char(c1) {
                    match read_while(Some(c1), pos1, &mut cs, is_word_char,
                                     Some(&mut tmp)) {
                        Err(e) => {
                            co.yield_(Err(e)).await;
                            return;
                        }
                        Ok((_lastc, mcp)) => {
                            let (c2, eaten) = CHAR_NAMES.iter()
                                .find(|(name, _)| tmp.starts_with(name))
                                .map_or((c1, c1.len_utf8()),
                                        |(name, c2)| (*c2, name.len()));
                            co.yield_(Ok(TokenWithPos(Token::Char(c2), pos)))
                                .await;
                            // whatever trails the literal is lexed on
                            // its own, e.g. `\ab` is the char a then
                            // the symbol b
                            let mut i = eaten;
                            while i < tmp.len() {
                                let tpos = Pos { line: pos1.line,
                                                 col: pos1.col + i as u32 };
                                match scan_word(&tmp[i..]) {
                                    Ok((t, len)) => {
                                        co.yield_(Ok(TokenWithPos(t, tpos)))
                                            .await;
                                        i += len;
                                    }
                                    Err(e) => {
                                        co.yield_(Err(e.at(tpos))).await;
                                        return;
                                    }
                                }
                            }
                            if mcp.is_none() {
                                // avoid calling next() again!
                                return
                            }
                            maybe_next_c_pos = mcp;
                        }
                    }
                } else {
                    co.yield_(Ok(TokenWithPos(Token::Char(c1), pos))).await;
                }
            } else if c == '#' {
                // ##Inf ##-Inf ##NaN #_ or the bare prefix of sets
                // and tagged literals
                let c0;
                let pos0;
                match try_io(cs.next(), pos) {
                    Err(e) => {
                        co.yield_(Err(e)).await;
                        return;
                    }
                    Ok(None) => {
                        // let the reader report what is missing
                        co.yield_(Ok(TokenWithPos(Token::Sharp, pos))).await;
                        return;
                    }
                    Ok(Some(cp)) => {
                        (c0, pos0) = cp;
                    }
                }
                if c0 == '_' {
                    co.yield_(Ok(TokenWithPos(Token::Ignore, pos))).await;
                } else if c0 == '#' {
                    match read_while(None, pos0, &mut cs, is_word_char,
                                     Some(&mut tmp)) {
                        Err(e) => {
                            co.yield_(Err(e)).await;
                            return;
                        }
                        Ok((_lastc, mcp)) => {
                            let r = match tmp.as_str() {
                                "Inf" => Ok(Token::InfPos),
                                "-Inf" => Ok(Token::InfNeg),
                                "NaN" => Ok(Token::Nan),
                                _ => Err(LexError::InvalidChar(
                                    KString::from_string(format!("##{}", tmp)))),
                            };
                            match r {
                                Err(e) => {
                                    co.yield_(Err(e.at(pos))).await;
                                    return;
                                }
                                Ok(t) =>
                                    co.yield_(Ok(TokenWithPos(t, pos))).await
                            }
                            if mcp.is_none() {
                                // avoid calling next() again!
                                return
                            }
                            maybe_next_c_pos = mcp;
                        }
                    }
                } else {
                    co.yield_(Ok(TokenWithPos(Token::Sharp, pos))).await;
                    maybe_next_c_pos = Some((c0, pos0));
                }
            } else if c == '^' {
                co.yield_(Ok(TokenWithPos(Token::Caret, pos))).await;
            } else if is_word_char(c) {
                // numbers, booleans, nil, keywords, symbols
                match read_while(Some(c), pos, &mut cs, is_word_char,
                                 Some(&mut tmp)) {
                    Err(e) => {
                        co.yield_(Err(e)).await;
                        return;
                    }
                    Ok((_lastc, mcp)) => {
                        let mut i = 0;
                        while i < tmp.len() {
                            let tpos = Pos { line: pos.line,
                                             col: pos.col + i as u32 };
                            match scan_word(&tmp[i..]) {
                                Ok((t, len)) => {
                                    co.yield_(Ok(TokenWithPos(t, tpos)))
                                        .await;
                                    i += len;
                                }
                                Err(e) => {
                                    co.yield_(Err(e.at(tpos))).await;
                                    return;
                                }
                            }
                        }
                        if mcp.is_none() {
                            // avoid calling next() again!
                            return
                        }
                        maybe_next_c_pos = mcp;
                    }
                }
            } else {
                co.yield_(Err(LexError::InvalidChar(
                    KString::from_string(c.to_string())).at(pos))).await;
                return;
            }
        }
    }).into_iter()
}

/// Tokenize a whole in-memory buffer. Returns the tokens and the
/// final 1-based line number of the input.
pub fn lex(input: &str) -> Result<(Vec<TokenWithPos>, u32), LexErrorWithPos> {
    let mut cs = crate::buffered_chars::str_chars(input);
    let mut ts = Vec::new();
    for r in parse(&mut cs) {
        ts.push(r?);
    }
    let end_line = 1 + input.bytes().filter(|b| *b == b'\n').count() as u32;
    Ok((ts, end_line))
}
