// Copyright (C) 2024 Red Hat
// SPDX-License-Identifier: Apache-2.0

//! The logfmt tokenizer decodes `key=value` pairs.

use crate::{is_variable_field, Error, LineTokenizer, Token, DEFAULT_PLACEHOLDER};
use std::borrow::Cow;

mod decode;
mod encode;

pub use decode::SyntaxError;
use decode::Decoder;
use encode::Encoder;

/// Produce a flat list of keys and values, replacing the variable fields with a placeholder.
#[derive(Debug, Clone)]
pub struct LogfmtTokenizer {
    placeholder: String,
}

impl LogfmtTokenizer {
    /// Create the tokenizer with the placeholder used for variable fields.
    pub fn new(placeholder: impl Into<String>) -> LogfmtTokenizer {
        LogfmtTokenizer {
            placeholder: placeholder.into(),
        }
    }

    /// The placeholder used for variable fields.
    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }
}

impl Default for LogfmtTokenizer {
    fn default() -> Self {
        LogfmtTokenizer::new(DEFAULT_PLACEHOLDER)
    }
}

impl LineTokenizer for LogfmtTokenizer {
    type State = ();

    fn name(&self) -> &'static str {
        "logfmt"
    }

    fn tokenize<'a>(
        &self,
        line: &'a str,
        tokens: &mut Vec<Token<'a>>,
        _state: &mut (),
    ) -> Result<(), Error> {
        tokens.clear();
        if tokens.capacity() == 0 {
            tokens.reserve(64);
        }
        for keyval in Decoder::new(line) {
            match keyval {
                Ok((key, value)) => {
                    tokens.push(Cow::Borrowed(key));
                    if is_variable_field(key) {
                        tokens.push(Cow::Owned(self.placeholder.clone()));
                    } else {
                        tokens.push(value);
                    }
                }
                Err(err) => {
                    tokens.clear();
                    return Err(err.into());
                }
            }
        }
        Ok(())
    }

    /// Encode the tokens pairs, a missing last value is encoded as an empty value.
    /// The result is empty when a key can't be encoded.
    fn join<T: AsRef<str>>(&self, tokens: &[T], _state: &()) -> String {
        let mut encoder = Encoder::with_capacity(crate::tokens_len(tokens) + tokens.len());
        for pair in tokens.chunks(2) {
            let key = pair[0].as_ref();
            let value = pair.get(1).map_or("", |value| value.as_ref());
            if let Err(err) = encoder.encode_keyval(key, value) {
                tracing::debug!(%err, "Could not encode logfmt tokens");
                return String::new();
            }
        }
        encoder.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINE: &str = r#"ts=2024-05-30T12:50:36.648377186Z caller=scheduler_processor.go:143 level=warn msg="error contacting scheduler" err="rpc error: code = Unavailable desc = connection error: desc = \"error reading server preface: EOF\"" addr=10.0.151.101:9095"#;

    fn tokenize(line: &str) -> Vec<Token<'_>> {
        LogfmtTokenizer::new("<_>").tokenize_line(line).unwrap().0
    }

    #[test]
    fn test_logfmt_tokenize() {
        assert_eq!(
            tokenize(r#"foo=bar baz="this is a message""#),
            ["foo", "bar", "baz", "this is a message"]
        );
        assert_eq!(
            tokenize(r#"foo baz="this is a message""#),
            ["foo", "", "baz", "this is a message"]
        );
        assert_eq!(
            tokenize(r#"foo= baz="this is a message""#),
            ["foo", "", "baz", "this is a message"]
        );
        assert_eq!(tokenize("foo baz"), ["foo", "", "baz", ""]);
        assert_eq!(
            tokenize(LINE),
            [
                "ts",
                "<_>",
                "caller",
                "scheduler_processor.go:143",
                "level",
                "warn",
                "msg",
                "error contacting scheduler",
                "err",
                r#"rpc error: code = Unavailable desc = connection error: desc = "error reading server preface: EOF""#,
                "addr",
                "10.0.151.101:9095"
            ]
        );
    }

    #[test]
    fn test_logfmt_variable_fields() {
        assert_eq!(
            tokenize("t=1 T=2 TIME=3 traceid=abc level=info"),
            ["t", "<_>", "T", "2", "TIME", "<_>", "traceid", "<_>", "level", "info"]
        );
    }

    #[test]
    fn test_logfmt_not_applicable() {
        let tokenizer = LogfmtTokenizer::default();
        let mut tokens = vec![Cow::Borrowed("previous")];
        let result = tokenizer.tokenize("key=\"unterminated", &mut tokens, &mut ());
        assert!(result.unwrap_err().is_not_applicable());
        assert!(tokens.is_empty());
    }

    #[test]
    fn test_logfmt_join() {
        let tokenizer = LogfmtTokenizer::new("");
        let join = |tokens: &[&str]| tokenizer.join(tokens, &());
        assert_eq!(join(&[]), "");
        assert_eq!(
            join(&["foo", "bar", "baz", "this is a message"]),
            r#"foo=bar baz="this is a message""#
        );
        assert_eq!(
            join(&["foo", "", "baz", "this is a message"]),
            r#"foo= baz="this is a message""#
        );
        assert_eq!(join(&["foo", "", "baz", ""]), "foo= baz=");
        assert_eq!(join(&["foo"]), "foo=");
        assert_eq!(join(&["foo", "", "bar"]), "foo= bar=");
        assert_eq!(join(&["", "value"]), "");
    }

    #[test]
    fn test_logfmt_lenient_escapes() {
        assert_eq!(
            tokenize(r#"msg="it\'s down" level=warn"#),
            ["msg", "it's down", "level", "warn"]
        );
        assert_eq!(tokenize(r#"msg="bad \ud800 x""#), ["msg", "bad \u{FFFD} x"]);
    }

    #[test]
    fn test_logfmt_join_null() {
        let tokenizer = LogfmtTokenizer::new("");
        assert_eq!(tokenizer.join(&["a", "null"], &()), r#"a="null""#);
        let (tokens, state) = tokenizer.tokenize_line(r#"a="null""#).unwrap();
        assert_eq!(tokens, ["a", "null"]);
        assert_eq!(tokenizer.join(&tokens, &state), r#"a="null""#);
    }

    #[test]
    fn test_logfmt_round_trip() {
        let tokenizer = LogfmtTokenizer::new("");
        let line = LINE.replace("ts=2024-05-30T12:50:36.648377186Z", "level=warn");
        let (tokens, state) = tokenizer.tokenize_line(&line).unwrap();
        assert_eq!(tokenizer.join(&tokens, &state), line);
    }
}
