//! Host list input: one host entry per line.

use std::fs;
use std::io;
use std::path::Path;

/// Reads a host list file, one entry per line.
pub fn read_hosts<P: AsRef<Path>>(path: P) -> io::Result<Vec<String>> {
    let content = fs::read_to_string(path.as_ref())?;
    Ok(parse_hosts(&content))
}

/// Splits text into host entries. Lines are kept as they are, apart from
/// the line terminator.
pub fn parse_hosts(content: &str) -> Vec<String> {
    content.lines().map(String::from).collect()
}
