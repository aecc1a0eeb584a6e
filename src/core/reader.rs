//! Line-oriented reader for the portal's delimited sources.
//!
//! Each line becomes exactly `N` fields or the reader stops with
//! [`PortalError::FieldCountMismatch`]. Text between double quotes loses its
//! commas before the line is split, so `A,"B,C",D` reads as `A`, `BC`, `D`.
//! Lines end at `\n`, `\r\n` or a bare `\r`.

use crate::utils::error::{PortalError, Result};
use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// One decoded line. `line` is 1-based and does not count a skipped header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record<const N: usize> {
    pub line: usize,
    pub fields: [String; N],
}

/// Lazily yields fixed-arity records from one source, in a single pass.
///
/// The iterator is fused after the first error.
pub struct FileReader<R, const N: usize> {
    source_name: String,
    reader: R,
    pending: VecDeque<String>,
    sep: char,
    header: bool,
    line: usize,
    done: bool,
}

impl<const N: usize> FileReader<BufReader<File>, N> {
    pub fn open(path: impl AsRef<Path>, sep: char, header: bool) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| PortalError::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self::new(
            path.display().to_string(),
            BufReader::new(file),
            sep,
            header,
        ))
    }
}

impl<R: BufRead, const N: usize> FileReader<R, N> {
    pub fn new(source_name: impl Into<String>, reader: R, sep: char, header: bool) -> Self {
        Self {
            source_name: source_name.into(),
            reader,
            pending: VecDeque::new(),
            sep,
            header,
            line: 0,
            done: false,
        }
    }

    fn next_line(&mut self) -> Option<io::Result<String>> {
        if let Some(line) = self.pending.pop_front() {
            return Some(Ok(line));
        }

        let mut buf = Vec::new();
        match self.reader.read_until(b'\n', &mut buf) {
            Ok(0) => return None,
            Ok(_) => {}
            Err(err) => return Some(Err(err)),
        }
        let text = match String::from_utf8(buf) {
            Ok(text) => text,
            Err(err) => return Some(Err(io::Error::new(io::ErrorKind::InvalidData, err))),
        };

        let text = text.strip_suffix('\n').unwrap_or(&text);
        let text = text.strip_suffix('\r').unwrap_or(text);
        self.pending.extend(text.split('\r').map(str::to_string));
        self.pending.pop_front().map(Ok)
    }
}

impl<R: BufRead, const N: usize> Iterator for FileReader<R, N> {
    type Item = Result<Record<N>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let raw = match self.next_line()? {
            Ok(raw) => raw,
            Err(err) => {
                self.done = true;
                return Some(Err(err.into()));
            }
        };

        if self.header {
            self.header = false;
            return self.next();
        }

        self.line += 1;
        let fields = split_fields(&raw, self.sep);
        let actual = fields.len();

        match <[String; N]>::try_from(fields) {
            Ok(fields) => Some(Ok(Record {
                line: self.line,
                fields,
            })),
            Err(_) => {
                self.done = true;
                Some(Err(PortalError::FieldCountMismatch {
                    source_name: self.source_name.clone(),
                    line: self.line,
                    actual,
                    expected: N,
                }))
            }
        }
    }
}

impl<R: BufRead, const N: usize> std::iter::FusedIterator for FileReader<R, N> {}

/// Splits one raw line into trimmed fields.
///
/// Trailing line breaks are dropped, commas inside double-quoted segments
/// are removed along with the quotes, the rest is split on `sep` and each
/// field loses its surrounding spaces.
pub fn split_fields(raw: &str, sep: char) -> Vec<String> {
    let line = strip_quoted_commas(raw.trim_end_matches(['\r', '\n']));

    line.split(sep)
        .map(|field| field.trim_matches(' ').to_string())
        .collect()
}

fn strip_quoted_commas(line: &str) -> String {
    line.split('"')
        .enumerate()
        .map(|(offset, segment)| {
            if offset % 2 == 1 {
                segment.replace(',', "")
            } else {
                segment.to_string()
            }
        })
        .collect()
}
