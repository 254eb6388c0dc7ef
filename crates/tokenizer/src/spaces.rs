// Copyright (C) 2024 Red Hat
// SPDX-License-Identifier: Apache-2.0

//! The baseline tokenizer.

use crate::{Error, LineTokenizer, Token};
use std::borrow::Cow;

/// Split the line on each space.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpacesTokenizer;

impl SpacesTokenizer {
    /// Create the tokenizer.
    pub fn new() -> SpacesTokenizer {
        SpacesTokenizer
    }
}

impl LineTokenizer for SpacesTokenizer {
    type State = ();

    fn name(&self) -> &'static str {
        "spaces"
    }

    fn tokenize<'a>(
        &self,
        line: &'a str,
        tokens: &mut Vec<Token<'a>>,
        _state: &mut (),
    ) -> Result<(), Error> {
        tokens.clear();
        tokens.extend(line.split(' ').map(Cow::Borrowed));
        Ok(())
    }

    fn join<T: AsRef<str>>(&self, tokens: &[T], _state: &()) -> String {
        let mut result = String::with_capacity(crate::tokens_len(tokens) + tokens.len());
        for (idx, token) in tokens.iter().enumerate() {
            if idx > 0 {
                result.push(' ');
            }
            result.push_str(token.as_ref());
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spaces() {
        let tokenizer = SpacesTokenizer::new();
        let (tokens, _) = tokenizer.tokenize_line("a  b=c d").unwrap();
        assert_eq!(tokens, ["a", "", "b=c", "d"]);
        assert_eq!(tokenizer.join(&tokens, &()), "a  b=c d");
    }

    #[test]
    fn test_spaces_empty() {
        let tokenizer = SpacesTokenizer::new();
        let (tokens, _) = tokenizer.tokenize_line("").unwrap();
        assert_eq!(tokens, [""]);
        assert_eq!(tokenizer.join(&tokens, &()), "");
    }
}
