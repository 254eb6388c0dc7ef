// Copyright (C) 2024 Red Hat
// SPDX-License-Identifier: Apache-2.0

//! A logfmt encoder writing to a string.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub(crate) enum EncodeError {
    #[error("nil key")]
    NilKey,

    #[error("invalid key: {0}")]
    InvalidKey(String),
}

/// Characters that can't be in a key, and that need quoting in a value.
fn is_special(c: char) -> bool {
    c <= ' ' || c == '=' || c == '"' || c == char::REPLACEMENT_CHARACTER
}

pub(crate) struct Encoder {
    buf: String,
}

impl Encoder {
    pub fn with_capacity(capacity: usize) -> Encoder {
        Encoder {
            buf: String::with_capacity(capacity),
        }
    }

    pub fn encode_keyval(&mut self, key: &str, value: &str) -> Result<(), EncodeError> {
        if key.is_empty() {
            return Err(EncodeError::NilKey);
        }
        if key.contains(is_special) {
            return Err(EncodeError::InvalidKey(key.to_string()));
        }
        if !self.buf.is_empty() {
            self.buf.push(' ');
        }
        self.buf.push_str(key);
        self.buf.push('=');
        // A bare null would read as a nil value.
        if value == "null" || value.contains(is_special) {
            self.write_quoted(value);
        } else {
            self.buf.push_str(value);
        }
        Ok(())
    }

    fn write_quoted(&mut self, value: &str) {
        self.buf.reserve(value.len() + 2);
        self.buf.push('"');
        for c in value.chars() {
            match c {
                '\\' | '"' => {
                    self.buf.push('\\');
                    self.buf.push(c);
                }
                '\n' => self.buf.push_str("\\n"),
                '\r' => self.buf.push_str("\\r"),
                '\t' => self.buf.push_str("\\t"),
                c if c < ' ' => self.buf.push_str(&format!("\\u{:04x}", c as u32)),
                c => self.buf.push(c),
            }
        }
        self.buf.push('"');
    }

    pub fn finish(self) -> String {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(pairs: &[(&str, &str)]) -> Result<String, EncodeError> {
        let mut encoder = Encoder::with_capacity(64);
        for (key, value) in pairs {
            encoder.encode_keyval(key, value)?;
        }
        Ok(encoder.finish())
    }

    #[test]
    fn test_encode() {
        assert_eq!(
            encode(&[("a", "1"), ("b", ""), ("c", "x y")]).unwrap(),
            "a=1 b= c=\"x y\""
        );
        assert_eq!(
            encode(&[("msg", "a=b \"q\"\\\n\t\u{1}")]).unwrap(),
            r#"msg="a=b \"q\"\\\n\t\u0001""#
        );
        assert_eq!(encode(&[("k", "héllo")]).unwrap(), "k=héllo");
        assert_eq!(
            encode(&[("a", "null"), ("b", "nil"), ("c", "nullable")]).unwrap(),
            r#"a="null" b=nil c=nullable"#
        );
    }

    #[test]
    fn test_encode_bad_key() {
        assert_eq!(encode(&[("", "v")]), Err(EncodeError::NilKey));
        assert_eq!(
            encode(&[("a b", "v")]),
            Err(EncodeError::InvalidKey("a b".into()))
        );
        assert!(encode(&[("a=", "v")]).is_err());
    }
}
