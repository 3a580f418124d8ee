// Copyright the anyedn authors.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Character sources for the tokenizer: a buffering UTF-8 decoder
//! over a file, and the equivalent over an in-memory string. Both
//! yield each character together with its [Pos].

use crate::pos::Pos;
use std::{fs, io};
use anyhow::{Result, anyhow};
use utf8::BufReadDecoder;
use genawaiter::rc::Gen;


pub fn buffered_chars(fh: fs::File)
                      -> impl Iterator<Item=Result<(char, Pos)>>
{
    Gen::new(|co| async move {
        let mut inp = BufReadDecoder::new(io::BufReader::new(fh));
        let mut pos = Pos::start();
        loop {
            if let Some(r) = inp.next_strict() {
                match r {
                    Ok(x) => {
                        for c in x.chars() {
                            co.yield_(Ok((c, pos))).await;
                            pos = pos.after(c);
                        }
                    },
                    Err(e) => {
                        co.yield_(Err(anyhow!("buffered_chars: {}", e))).await;
                        return;
                    }
                }
            } else {
                return;
            }
        }
    }).into_iter()
}

/// The in-memory equivalent of [buffered_chars]; infallible, but kept
/// on the same `Result` item type so the tokenizer takes either.
pub fn str_chars<'s>(s: &'s str)
                     -> impl Iterator<Item=Result<(char, Pos)>> + 's
{
    Gen::new(|co| async move {
        let mut pos = Pos::start();
        for c in s.chars() {
            co.yield_(Ok((c, pos))).await;
            pos = pos.after(c);
        }
    }).into_iter()
}
