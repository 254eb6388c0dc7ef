// Copyright (C) 2024 Red Hat
// SPDX-License-Identifier: Apache-2.0

//! A logfmt decoder that borrows from the line whenever possible.

use std::borrow::Cow;
use thiserror::Error;

/// A logfmt syntax error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("logfmt syntax error at pos {pos}: {msg}")]
pub struct SyntaxError {
    /// The byte offset of the error in the line.
    pub pos: usize,
    /// The error description.
    pub msg: &'static str,
}

/// A decoded pair. The value is owned only when it contained escape sequences.
pub(crate) type KeyVal<'a> = (&'a str, Cow<'a, str>);

/// Iterate over the key/value pairs of a line, stopping at the first error.
pub(crate) struct Decoder<'a> {
    line: &'a str,
    pos: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(line: &'a str) -> Decoder<'a> {
        Decoder { line, pos: 0 }
    }

    fn syntax_error(&self, msg: &'static str) -> SyntaxError {
        SyntaxError { pos: self.pos, msg }
    }

    fn unexpected_byte(&self, c: u8) -> SyntaxError {
        self.syntax_error(match c {
            b'=' => "unexpected '='",
            _ => "unexpected '\"'",
        })
    }

    fn scan_keyval(&mut self) -> Result<Option<KeyVal<'a>>, SyntaxError> {
        let bytes = self.line.as_bytes();

        // Skip the garbage between pairs
        match bytes[self.pos..].iter().position(|c| *c > b' ') {
            Some(skip) => self.pos += skip,
            None => {
                self.pos = bytes.len();
                return Ok(None);
            }
        }

        let start = self.pos;
        self.pos = bytes[start..]
            .iter()
            .position(|c| *c == b'=' || *c == b'"' || *c <= b' ')
            .map_or(bytes.len(), |end| start + end);
        let key = &self.line[start..self.pos];
        match bytes.get(self.pos) {
            Some(b'"') => return Err(self.unexpected_byte(b'"')),
            Some(b'=') if key.is_empty() => return Err(self.unexpected_byte(b'=')),
            _ => {}
        }
        if key.contains(char::REPLACEMENT_CHARACTER) {
            return Err(self.syntax_error("invalid key"));
        }
        if bytes.get(self.pos) != Some(&b'=') {
            // A bare key
            return Ok(Some((key, Cow::Borrowed(""))));
        }

        self.pos += 1;
        let value = match bytes.get(self.pos) {
            None => Cow::Borrowed(""),
            Some(c) if *c <= b' ' => Cow::Borrowed(""),
            Some(b'"') => self.quoted_value()?,
            Some(_) => self.value()?,
        };
        Ok(Some((key, value)))
    }

    fn value(&mut self) -> Result<Cow<'a, str>, SyntaxError> {
        let bytes = self.line.as_bytes();
        let start = self.pos;
        self.pos = bytes[start..]
            .iter()
            .position(|c| *c == b'=' || *c == b'"' || *c <= b' ')
            .map_or(bytes.len(), |end| start + end);
        match bytes.get(self.pos) {
            Some(c) if *c == b'=' || *c == b'"' => Err(self.unexpected_byte(*c)),
            _ => Ok(Cow::Borrowed(&self.line[start..self.pos])),
        }
    }

    fn quoted_value(&mut self) -> Result<Cow<'a, str>, SyntaxError> {
        let bytes = self.line.as_bytes();
        let start = self.pos;
        let mut has_escape = false;
        let mut escaped = false;
        for (p, c) in bytes[start + 1..].iter().enumerate() {
            if escaped {
                escaped = false;
            } else if *c == b'\\' {
                has_escape = true;
                escaped = true;
            } else if *c == b'"' {
                self.pos = start + p + 2;
                let quoted = &self.line[start..self.pos];
                return if has_escape {
                    serde_json::from_str::<String>(&normalize_escapes(quoted))
                        .map(Cow::Owned)
                        .map_err(|_| self.syntax_error("invalid quoted value"))
                } else {
                    Ok(Cow::Borrowed(&quoted[1..quoted.len() - 1]))
                };
            }
        }
        self.pos = bytes.len();
        Err(self.syntax_error("unterminated quoted value"))
    }
}

/// Rewrite the escapes that logfmt accepts but json does not: `\'` becomes a plain quote,
/// and an unpaired utf-16 surrogate becomes U+FFFD.
fn normalize_escapes(quoted: &str) -> String {
    let mut result = String::with_capacity(quoted.len());
    let mut rest = quoted;
    while let Some(pos) = rest.find('\\') {
        result.push_str(&rest[..pos]);
        rest = &rest[pos..];
        let escape_len = match rest[1..].chars().next() {
            Some('\'') => {
                result.push('\'');
                2
            }
            Some('u') => match utf16_escape(rest) {
                Some(high) if (0xD800..0xDC00).contains(&high) => match utf16_escape(&rest[6..]) {
                    Some(low) if (0xDC00..0xE000).contains(&low) => {
                        result.push_str(&rest[..12]);
                        12
                    }
                    _ => {
                        result.push_str("\\ufffd");
                        6
                    }
                },
                Some(low) if (0xDC00..0xE000).contains(&low) => {
                    result.push_str("\\ufffd");
                    6
                }
                _ => {
                    result.push_str("\\u");
                    2
                }
            },
            Some(c) => {
                result.push('\\');
                result.push(c);
                1 + c.len_utf8()
            }
            None => {
                result.push('\\');
                1
            }
        };
        rest = &rest[escape_len..];
    }
    result.push_str(rest);
    result
}

/// Read the code unit of a `\uXXXX` escape.
fn utf16_escape(s: &str) -> Option<u16> {
    let hex = s.strip_prefix("\\u")?.get(..4)?;
    if hex.bytes().all(|c| c.is_ascii_hexdigit()) {
        u16::from_str_radix(hex, 16).ok()
    } else {
        None
    }
}

impl<'a> Iterator for Decoder<'a> {
    type Item = Result<KeyVal<'a>, SyntaxError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.line.len() {
            return None;
        }
        let result = self.scan_keyval();
        if result.is_err() {
            // Stop at the first error
            self.pos = self.line.len();
        }
        result.transpose()
    }
}
