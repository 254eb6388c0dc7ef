// Copyright (C) 2024 Red Hat
// SPDX-License-Identifier: Apache-2.0

//! This module contains the tokenizers side-channel used to render the tokens back.

/// The position of the spaces removed from the line.
///
/// Each entry is the index of the token followed by a space, repeated when multiple
/// spaces follow the same token. Spaces found before the first token are counted apart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpacesAfter {
    leading: usize,
    after: Vec<usize>,
}

static NO_SPACES: SpacesAfter = SpacesAfter::new();

impl SpacesAfter {
    /// Create an empty list.
    pub const fn new() -> SpacesAfter {
        SpacesAfter {
            leading: 0,
            after: Vec::new(),
        }
    }

    /// Create a list from token indexes.
    pub fn from_indexes(leading: usize, after: Vec<usize>) -> SpacesAfter {
        SpacesAfter { leading, after }
    }

    /// The number of spaces before the first token.
    pub fn leading(&self) -> usize {
        self.leading
    }

    /// The indexes of the tokens followed by a space.
    pub fn indexes(&self) -> &[usize] {
        &self.after
    }

    /// The total number of spaces.
    pub fn len(&self) -> usize {
        self.leading + self.after.len()
    }

    /// Check if there are no spaces.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn clear(&mut self) {
        self.leading = 0;
        self.after.clear();
    }

    pub(crate) fn reserve(&mut self, additional: usize) {
        self.after.reserve(additional)
    }

    /// Record a space after the `count` tokens emitted so far.
    pub(crate) fn push(&mut self, count: usize) {
        match count.checked_sub(1) {
            Some(idx) => self.after.push(idx),
            None => self.leading += 1,
        }
    }

    /// Write the tokens with their spaces.
    pub(crate) fn render<T: AsRef<str>>(&self, tokens: &[T]) -> String {
        let mut result = String::with_capacity(crate::tokens_len(tokens) + self.len());
        result.extend(std::iter::repeat(' ').take(self.leading));
        let mut spaces = self.after.iter().peekable();
        for (idx, token) in tokens.iter().enumerate() {
            result.push_str(token.as_ref());
            while spaces.next_if_eq(&&idx).is_some() {
                result.push(' ');
            }
        }
        result
    }
}

/// The state of a [crate::FormatTokenizer], one variant per tokenizer family.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TokenizerState {
    /// The tokenizer does not need a state.
    #[default]
    None,
    /// The tokenizer removed spaces.
    Spaces(SpacesAfter),
}

impl TokenizerState {
    /// Get the spaces list. A stateless value renders without spaces.
    pub fn spaces(&self) -> &SpacesAfter {
        match self {
            TokenizerState::Spaces(spaces) => spaces,
            TokenizerState::None => &NO_SPACES,
        }
    }

    /// Take the spaces list out, keeping its allocation when there is one.
    pub(crate) fn take_spaces(&mut self) -> SpacesAfter {
        match std::mem::take(self) {
            TokenizerState::Spaces(spaces) => spaces,
            TokenizerState::None => SpacesAfter::new(),
        }
    }
}
