// Copyright (C) 2024 Red Hat
// SPDX-License-Identifier: Apache-2.0

//! The json tokenizer extracts the message of a structured log.
//!
//! The document is not fully validated: the top level object is read until the first
//! syntax error, so that a malformed value after the message does not matter.

use crate::fields::message_rank;
use crate::{
    Error, LineTokenizer, PunctuationTokenizer, SpacesAfter, Token, DEFAULT_PLACEHOLDER,
    MESSAGE_FIELDS,
};
use serde::de::{DeserializeSeed, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde_json::value::RawValue;
use std::borrow::Cow;

/// Tokenize the message field of a json line with the [PunctuationTokenizer].
#[derive(Debug, Clone)]
pub struct JsonTokenizer {
    punctuation: PunctuationTokenizer,
    placeholder: String,
}

impl JsonTokenizer {
    /// Create the tokenizer with the placeholder used to surround the message.
    pub fn new(placeholder: impl Into<String>) -> JsonTokenizer {
        JsonTokenizer {
            punctuation: PunctuationTokenizer::new(),
            placeholder: placeholder.into(),
        }
    }
}

impl Default for JsonTokenizer {
    fn default() -> Self {
        JsonTokenizer::new(DEFAULT_PLACEHOLDER)
    }
}

impl LineTokenizer for JsonTokenizer {
    type State = SpacesAfter;

    fn name(&self) -> &'static str {
        "json"
    }

    fn tokenize<'a>(
        &self,
        line: &'a str,
        tokens: &mut Vec<Token<'a>>,
        spaces: &mut SpacesAfter,
    ) -> Result<(), Error> {
        match message_field(line) {
            Some(message) => self.punctuation.tokenize(message, tokens, spaces),
            None => {
                tokens.clear();
                spaces.clear();
                Err(Error::NoMessageField)
            }
        }
    }

    /// Render the message between two placeholders, to indicate that it was extracted.
    fn join<T: AsRef<str>>(&self, tokens: &[T], spaces: &SpacesAfter) -> String {
        let message = self.punctuation.join(tokens, spaces);
        let mut result = String::with_capacity(message.len() + 2 * self.placeholder.len());
        result.push_str(&self.placeholder);
        result.push_str(&message);
        result.push_str(&self.placeholder);
        result
    }
}

/// The first top-level string value of each message field.
#[derive(Default)]
struct Candidates<'a> {
    seen: [bool; MESSAGE_FIELDS.len()],
    values: [Option<&'a str>; MESSAGE_FIELDS.len()],
}

impl<'a> Candidates<'a> {
    /// Returns true the first time a field is seen, later duplicates are ignored.
    fn first_occurrence(&mut self, rank: usize) -> bool {
        !std::mem::replace(&mut self.seen[rank], true)
    }

    fn best(&self) -> Option<&'a str> {
        self.values.iter().flatten().next().copied()
    }
}

/// Returns the raw content (escapes included) of the highest priority message field.
pub(crate) fn message_field(doc: &str) -> Option<&str> {
    let mut candidates = Candidates::default();
    let mut deserializer = serde_json::Deserializer::from_str(doc);
    // A syntax error stops the scan, the fields found before are still valid.
    let _ = MessageFields(&mut candidates).deserialize(&mut deserializer);
    candidates.best()
}

/// Collect the message fields of the top level object.
struct MessageFields<'c, 'a>(&'c mut Candidates<'a>);

impl<'a> DeserializeSeed<'a> for MessageFields<'_, 'a> {
    type Value = ();

    fn deserialize<D: Deserializer<'a>>(self, deserializer: D) -> Result<(), D::Error> {
        deserializer.deserialize_map(self)
    }
}

impl<'a> Visitor<'a> for MessageFields<'_, 'a> {
    type Value = ();

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a json object")
    }

    fn visit_map<A: MapAccess<'a>>(self, mut map: A) -> Result<(), A::Error> {
        while let Some(key) = map.next_key::<Cow<str>>()? {
            match message_rank(&key) {
                Some(rank) if self.0.first_occurrence(rank) => {
                    let raw: &'a RawValue = map.next_value()?;
                    if let Some(value) = raw
                        .get()
                        .strip_prefix('"')
                        .and_then(|value| value.strip_suffix('"'))
                    {
                        self.0.values[rank] = Some(value);
                        if rank == 0 {
                            // Nothing can take precedence
                            return Ok(());
                        }
                    }
                }
                _ => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_field() {
        assert_eq!(message_field(r#"{"msg": "hello"}"#), Some("hello"));
        assert_eq!(message_field(r#" { "level" : 1 , "log":"a" } "#), Some("a"));
        assert_eq!(message_field(r#"{"msg":"b","message":"a"}"#), Some("a"));
        assert_eq!(message_field(r#"{"msg":""}"#), Some(""));
        assert_eq!(message_field(r#"{"msg":"say \"hi\""}"#), Some(r#"say \"hi\""#));
        assert_eq!(message_field("{\"msg\" :\t \"spaced\" }"), Some("spaced"));
    }

    #[test]
    fn test_message_field_nested() {
        assert_eq!(
            message_field(r#"{"ctx":{"msg":"nested","list":[{"log":"x"}, "]"]},"content":"top"}"#),
            Some("top")
        );
        assert_eq!(message_field(r#"{"ctx":{"msg":"nested"}}"#), None);
    }

    #[test]
    fn test_message_field_type() {
        assert_eq!(message_field(r#"{"msg":42}"#), None);
        assert_eq!(message_field(r#"{"msg":{"text":"a"},"content":"b"}"#), Some("b"));
        // The first occurrence of a field decides.
        assert_eq!(message_field(r#"{"msg":null,"msg":"late"}"#), None);
    }

    #[test]
    fn test_message_field_escaped_key() {
        assert_eq!(message_field(r#"{"m\u0073g":"escaped"}"#), Some("escaped"));
    }

    #[test]
    fn test_message_field_lenient() {
        // The message is found before the invalid value.
        assert_eq!(
            message_field(r#"{"msg":"ok","host":foobar","ip":[1]}"#),
            Some("ok")
        );
        assert_eq!(message_field(r#"{"msg":"ok", oops}"#), Some("ok"));
        assert_eq!(message_field(r#"{"level":"info", oops, "msg":"lost"}"#), None);
    }

    #[test]
    fn test_message_field_not_json() {
        assert_eq!(message_field(""), None);
        assert_eq!(message_field("msg=hello"), None);
        assert_eq!(message_field("[\"msg\",\"hello\"]"), None);
        assert_eq!(message_field(r#"{"msg":"unterminated}"#), None);
    }

    #[test]
    fn test_json_tokenizer() {
        let tokenizer = JsonTokenizer::new("<_>");
        let (tokens, spaces) = tokenizer
            .tokenize_line(r#"{"level":"info","message":"user=admin logged in"}"#)
            .unwrap();
        assert_eq!(tokens, ["user", "=", "admin", "logged", "in"]);
        assert_eq!(tokenizer.join(&tokens, &spaces), "<_>user=admin logged in<_>");
    }

    #[test]
    fn test_json_not_applicable() {
        let tokenizer = JsonTokenizer::default();
        let mut tokens = vec![Cow::Borrowed("previous")];
        let mut spaces = SpacesAfter::from_indexes(1, vec![0]);
        let result = tokenizer.tokenize("plain text line", &mut tokens, &mut spaces);
        assert_eq!(result, Err(Error::NoMessageField));
        assert!(tokens.is_empty());
        assert!(spaces.is_empty());
    }
}
