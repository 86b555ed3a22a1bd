//! Front-matter extraction.
//!
//! A source file may open with a metadata block fenced by dash lines:
//!
//! ```text
//! ---
//! title: Hello
//! tags: [rust, web]
//! ---
//! # Body starts here
//! ```
//!
//! The block only exists if the very first line is a delimiter: three or
//! more `-`, optionally followed by whitespace. It runs until the next
//! delimiter line, which is consumed. A block that is opened but never
//! closed swallows the rest of the file: everything is metadata and the body
//! is empty.
//!
//! This module only splits bytes. Decoding the block into fields is the job
//! of [`crate::metadata`].

use std::fs;
use std::io;
use std::path::Path;

/// Raw halves of a source file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Split {
    /// Bytes between the delimiters, without the delimiter lines.
    pub meta: Vec<u8>,
    /// Everything after the closing delimiter (or the whole file).
    pub body: Vec<u8>,
}

/// True if `line` (with or without its line ending) is a delimiter.
fn is_delimiter(line: &[u8]) -> bool {
    let trimmed = line.trim_ascii_end();
    let dashes = trimmed.iter().take_while(|&&b| b == b'-').count();
    dashes >= 3 && dashes == trimmed.len()
}

/// Split `content` into its front matter and body.
pub fn split(content: &[u8]) -> Split {
    let mut lines = content.split_inclusive(|&b| b == b'\n');

    let Some(first) = lines.next() else {
        return Split::default();
    };
    if !is_delimiter(first) {
        return Split {
            meta: Vec::new(),
            body: content.to_vec(),
        };
    }

    let mut meta = Vec::new();
    let mut consumed = first.len();
    for line in lines {
        consumed += line.len();
        if is_delimiter(line) {
            return Split {
                meta,
                body: content[consumed..].to_vec(),
            };
        }
        meta.extend_from_slice(line);
    }

    // Unterminated: the remainder is all metadata.
    Split {
        meta,
        body: Vec::new(),
    }
}

/// Read `path` and split it.
///
/// With `remove` set, the file is rewritten to hold only the body; its
/// permission bits are kept.
pub fn extract_file(path: &Path, remove: bool) -> io::Result<Split> {
    let content = fs::read(path)?;
    let split = split(&content);

    if remove {
        let permissions = fs::metadata(path)?.permissions();
        fs::write(path, &split.body)?;
        fs::set_permissions(path, permissions)?;
    }

    Ok(split)
}
