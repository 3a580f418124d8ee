// Copyright the anyedn authors.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use anyedn::meta::strip_metadata;
use anyedn::parse::{parse, Token, TokenWithPos};
use anyedn::read::{read_file, write_all};
use anyedn::buffered_chars::buffered_chars;
use anyedn::value::Value;
use clap::Parser as ClapParser;
use std::io::{stdout, BufWriter};
use std::path::PathBuf;
use anyhow::Result;

#[derive(clap::Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Dump the raw token stream, one token per line, instead of
    /// reading trees
    #[clap(short, long)]
    tokens: bool,
    /// With --tokens, prefix every token with its position
    #[clap(long)]
    pos: bool,
    /// Drop ^meta annotations before printing the trees
    #[clap(short, long)]
    strip_meta: bool,
    /// Path to the input file (must end in .edn)
    input_path: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.tokens {

        // The raw token stream is handy when the reader builds a
        // surprising tree: what gets printed here is exactly what the
        // tree reader consumes. Delimiter checking is left to the
        // reader; this mode only reports how unbalanced the stream
        // ended up.

        let fh = std::fs::File::open(&args.input_path)?;
        let mut cs = buffered_chars(fh);
        let mut count = 0u64;
        let mut depth = 0i64;
        for te in parse(&mut cs) {
            let TokenWithPos(token, pos) = te?;
            match token {
                Token::Open(_) => depth += 1,
                Token::Close(_) => depth -= 1,
                _ => {}
            }
            if args.pos {
                println!("{pos}\t{token}");
            } else {
                println!("{token}");
            }
            count += 1;
        }
        if depth == 0 {
            eprintln!(";; {count} token(s)");
        } else {
            eprintln!(";; {count} token(s), net delimiter depth {depth} at EOF");
        }

    } else {

        // Read every top-level form, then re-print the canonical
        // text, optionally with metadata removed.

        let mut vals: Vec<Value> = read_file(&args.input_path)?
            .into_iter().map(|v| v.into_value()).collect();
        if args.strip_meta {
            vals = vals.into_iter().map(strip_metadata).collect();
        }
        write_all(BufWriter::new(stdout()), &vals)?;

    }
    Ok(())
}
