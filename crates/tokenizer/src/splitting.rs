// Copyright (C) 2024 Red Hat
// SPDX-License-Identifier: Apache-2.0

//! The splitting tokenizer is a faster, coarser tokenizer for key/value lines.

use crate::{Error, LineTokenizer, SpacesAfter, Token};
use std::borrow::Cow;

/// Split the line after the key/value separator, then on spaces.
///
/// The separator is the most frequent of `=` and `:`, the other one is regular text.
#[derive(Debug, Clone, Copy, Default)]
pub struct SplittingTokenizer;

impl SplittingTokenizer {
    /// Create the tokenizer.
    pub fn new() -> SplittingTokenizer {
        SplittingTokenizer
    }
}

fn count_byte(line: &str, needle: u8) -> usize {
    line.bytes().filter(|c| *c == needle).count()
}

/// Pick the key/value separator, a tie selects the colon.
fn separator(line: &str) -> (char, usize) {
    let equals = count_byte(line, b'=');
    let colons = count_byte(line, b':');
    if colons >= equals {
        (':', colons)
    } else {
        ('=', equals)
    }
}

/// Split the line after each separator. Like a regular split, a line that ends with the
/// separator (or an empty line) produces a final empty segment.
fn split_after(line: &str, separator: char) -> impl Iterator<Item = &str> {
    let trailing = line.is_empty() || line.ends_with(separator);
    line.split_inclusive(separator)
        .chain(trailing.then_some(""))
}

impl LineTokenizer for SplittingTokenizer {
    type State = SpacesAfter;

    fn name(&self) -> &'static str {
        "splitting"
    }

    fn tokenize<'a>(
        &self,
        line: &'a str,
        tokens: &mut Vec<Token<'a>>,
        spaces: &mut SpacesAfter,
    ) -> Result<(), Error> {
        let (separator, separator_count) = separator(line);
        let space_count = count_byte(line, b' ');

        tokens.clear();
        if tokens.capacity() == 0 {
            tokens.reserve(space_count + separator_count + 1);
        }
        spaces.clear();
        spaces.reserve(space_count);

        for segment in split_after(line, separator) {
            let mut words = segment.split(' ').peekable();
            while let Some(word) = words.next() {
                tokens.push(Cow::Borrowed(word));
                if words.peek().is_some() {
                    spaces.push(tokens.len());
                }
            }
        }
        Ok(())
    }

    fn join<T: AsRef<str>>(&self, tokens: &[T], spaces: &SpacesAfter) -> String {
        spaces.render(tokens)
    }
}
