//! Insert a block into the middle of a file without rewriting it by hand.
//!
//! Usage: `cargo run --example patch_file -- <path> <offset> <text>`
//!
//! The text is inserted at the byte offset; everything after it shifts up.

use std::env;
use std::process::ExitCode;

use relic_stream::{shared, FileStream, SegmentedStream, Stream, Whence};

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    if args.len() != 4 {
        eprintln!("usage: patch_file <path> <offset> <text>");
        return ExitCode::FAILURE;
    }
    let offset: u64 = match args[2].parse() {
        Ok(n) => n,
        Err(_) => {
            eprintln!("offset must be a non-negative integer");
            return ExitCode::FAILURE;
        }
    };
    let text = args[3].as_bytes().to_vec();

    let result = (|| -> relic_stream::Result<u64> {
        let file = shared(FileStream::open(&args[1])?);
        let mut seg = SegmentedStream::new(file.clone())?;
        seg.seek_write(offset as i64, Whence::Start)?;
        seg.insert(text.len() as u64);
        seg.write_all(&text)?;
        seg.commit(|n| file.borrow_mut().truncate(n))?;
        let len = file.borrow_mut().size();
        len
    })();

    match result {
        Ok(len) => {
            println!("patched {} (now {} bytes)", args[1], len);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("patch failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
