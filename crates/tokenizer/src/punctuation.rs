// Copyright (C) 2024 Red Hat
// SPDX-License-Identifier: Apache-2.0

//! The punctuation tokenizer splits words and punctuation marks.
//!
//! Letters, digits and the `_ - . : /` characters are kept together, so that identifiers,
//! timestamps, paths and urls remain a single token. Any other punctuation mark, as well as
//! the `=` sign, becomes a token of its own.

use crate::{Error, LineTokenizer, SpacesAfter, Token};
use lazy_static::lazy_static;
use regex::Regex;
use std::borrow::Cow;

/// The maximum number of tokens, the rest of the line is kept as the last token.
pub const MAX_TOKENS: usize = 127;

lazy_static! {
    // Unicode punctuation (general category P) and the equal sign are boundaries,
    // except for the characters that are part of words.
    static ref BOUNDARY: Regex = Regex::new(r"[[ =\p{P}]--[_\-.:/]]").unwrap();
}

/// Split the line on spaces and punctuation marks.
#[derive(Debug, Clone, Copy, Default)]
pub struct PunctuationTokenizer;

impl PunctuationTokenizer {
    /// Create the tokenizer.
    pub fn new() -> PunctuationTokenizer {
        PunctuationTokenizer
    }
}

impl LineTokenizer for PunctuationTokenizer {
    type State = SpacesAfter;

    fn name(&self) -> &'static str {
        "punctuation"
    }

    fn tokenize<'a>(
        &self,
        line: &'a str,
        tokens: &mut Vec<Token<'a>>,
        spaces: &mut SpacesAfter,
    ) -> Result<(), Error> {
        tokens.clear();
        if tokens.capacity() == 0 {
            tokens.reserve(MAX_TOKENS + 1);
        }
        spaces.clear();
        spaces.reserve(64);

        let mut start = 0;
        for boundary in BOUNDARY.find_iter(line) {
            if tokens.len() >= MAX_TOKENS {
                break;
            }
            let pos = boundary.start();
            if pos > start {
                tokens.push(Cow::Borrowed(&line[start..pos]));
            }
            if boundary.as_str() == " " {
                spaces.push(tokens.len());
            } else {
                tokens.push(Cow::Borrowed(boundary.as_str()));
            }
            start = boundary.end();
        }

        if start < line.len() {
            tokens.push(Cow::Borrowed(&line[start..]));
        }
        Ok(())
    }

    fn join<T: AsRef<str>>(&self, tokens: &[T], spaces: &SpacesAfter) -> String {
        spaces.render(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(line: &str) -> Vec<Token<'_>> {
        PunctuationTokenizer::new().tokenize_line(line).unwrap().0
    }

    #[test]
    fn test_boundaries() {
        assert_eq!(tokenize("a,b;c"), ["a", ",", "b", ";", "c"]);
        assert_eq!(tokenize("key=value"), ["key", "=", "value"]);
        assert_eq!(tokenize("/var/log_dir:1.2-3"), ["/var/log_dir:1.2-3"]);
        assert_eq!(tokenize("a+b<c>$"), ["a+b<c>$"]);
    }

    #[test]
    fn test_unicode() {
        // Letters of any script are not split, multi-byte punctuation is kept whole.
        assert_eq!(tokenize("héllo «wörld»"), ["héllo", "«", "wörld", "»"]);
        assert_eq!(tokenize("日本語、テスト"), ["日本語", "、", "テスト"]);
    }

    #[test]
    fn test_spaces() {
        let tokenizer = PunctuationTokenizer::new();
        let (tokens, spaces) = tokenizer.tokenize_line("  a  (b) ").unwrap();
        assert_eq!(tokens, ["a", "(", "b", ")"]);
        assert_eq!(spaces, SpacesAfter::from_indexes(2, vec![0, 0, 3]));
        assert_eq!(tokenizer.join(&tokens, &spaces), "  a  (b) ");
    }

    #[test]
    fn test_empty() {
        let tokenizer = PunctuationTokenizer::new();
        let (tokens, spaces) = tokenizer.tokenize_line("").unwrap();
        assert!(tokens.is_empty());
        assert_eq!(tokenizer.join(&tokens, &spaces), "");
    }

    #[test]
    fn test_max_tokens() {
        let line = "a,".repeat(100);
        let tokens = tokenize(&line);
        // The last boundary before the limit pushed both the word and the comma.
        assert_eq!(tokens.len(), MAX_TOKENS + 2);
        assert_eq!(tokens[MAX_TOKENS], ",");
        assert_eq!(tokens[MAX_TOKENS + 1], "a,".repeat(100 - 64).as_str());
    }
}
