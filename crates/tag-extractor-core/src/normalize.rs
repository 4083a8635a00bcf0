//! Line normalization into tag candidates.
//!
//! Every character that is neither an ASCII letter nor ASCII whitespace is
//! deleted (not replaced), the remainder is lowercased, and the line is split
//! on runs of ASCII whitespace. `"don't"` therefore becomes `"dont"`, and
//! `"e-mail"` becomes `"email"`. Other whitespace, such as a no-break space,
//! is deleted too, so it joins the words around it.

use regex::Regex;
use std::io::{self, BufRead};
use std::sync::LazyLock;

/// Anything that is not an ASCII letter or ASCII whitespace.
static NON_LETTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z \t\n\x0B\x0C\r]").expect("valid regex"));

/// Word separators: space, tab, line feed, vertical tab, form feed, carriage
/// return.
const fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r')
}

/// Split one line of text into cleaned, lowercase tokens.
///
/// Tokens are produced lazily. The returned tokens are never empty and
/// consist solely of `a`–`z`. Non-ASCII letters count as non-letters and
/// are stripped.
pub fn tokens(line: &str) -> impl Iterator<Item = String> {
    // Deleted characters are never separators, so cleaning each
    // separator-delimited piece is the same as cleaning the whole line first.
    line.split(is_separator)
        .map(|piece| NON_LETTER.replace_all(piece, "").to_ascii_lowercase())
        .filter(|token| !token.is_empty())
}

/// Read `reader` line by line, decoding each line lossily.
///
/// A line ends at `\n`, `\r`, or `\r\n`. Invalid UTF-8 becomes U+FFFD,
/// which the normalizer strips like any other non-letter. Only genuine read
/// failures surface as errors.
pub fn lines<R: BufRead>(reader: R) -> Lines<R> {
    Lines {
        reader,
        skip_lf: false,
    }
}

/// Iterator returned by [`lines`].
#[derive(Debug)]
pub struct Lines<R> {
    reader: R,
    /// The previous line ended at `\r`; a `\n` right after it belongs to it.
    skip_lf: bool,
}

impl<R: BufRead> Iterator for Lines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut bytes = Vec::new();
        loop {
            let buf = match self.reader.fill_buf() {
                Ok(buf) => buf,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Some(Err(err)),
            };
            if buf.is_empty() {
                return (!bytes.is_empty()).then(|| Ok(decode(&bytes)));
            }
            if self.skip_lf {
                self.skip_lf = false;
                if buf[0] == b'\n' {
                    self.reader.consume(1);
                    continue;
                }
            }
            match buf.iter().position(|&b| b == b'\n' || b == b'\r') {
                Some(end) => {
                    bytes.extend_from_slice(&buf[..end]);
                    self.skip_lf = buf[end] == b'\r';
                    self.reader.consume(end + 1);
                    return Some(Ok(decode(&bytes)));
                }
                None => {
                    let len = buf.len();
                    bytes.extend_from_slice(buf);
                    self.reader.consume(len);
                }
            }
        }
    }
}

fn decode(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
