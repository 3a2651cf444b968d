#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    // Every parser must return an error rather than panic
    let _ = nexafs::ingest::parse_columns(Cursor::new(data));
    let _ = nexafs::ingest::parse_delimited(Cursor::new(data), b',');
    let _ = nexafs::ingest::parse_delimited(Cursor::new(data), b'\t');
});
