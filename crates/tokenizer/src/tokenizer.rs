// Copyright (C) 2024 Red Hat
// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! This library provides reversible line tokenizers for log template mining.
//!
//! A tokenizer splits a log line into an ordered list of tokens, designed to be clustered
//! into templates, for example with a Drain tree. Each tokenizer also returns the state
//! needed by [LineTokenizer::join] to render the tokens back into a line:
//!
//! ```rust
//! # use logmine_tokenizer::{LineTokenizer, PunctuationTokenizer};
//! let tokenizer = PunctuationTokenizer::new();
//! let line = "level=warn msg=\"connection reset\"";
//! let (tokens, state) = tokenizer.tokenize_line(line).unwrap();
//! assert_eq!(tokens, ["level", "=", "warn", "msg", "=", "\"", "connection", "reset", "\""]);
//! assert_eq!(tokenizer.join(&tokens, &state), line);
//! ```
//!
//! The structured tokenizers replace noisy values with a placeholder:
//!
//! ```rust
//! # use logmine_tokenizer::{LineTokenizer, LogfmtTokenizer, JsonTokenizer};
//! let logfmt = LogfmtTokenizer::new("<_>");
//! let (tokens, _) = logfmt.tokenize_line("ts=2024-05-30T12:50:36Z level=warn").unwrap();
//! assert_eq!(tokens, ["ts", "<_>", "level", "warn"]);
//!
//! let json = JsonTokenizer::new("<_>");
//! let (tokens, state) = json.tokenize_line(r#"{"level":30,"msg":"Transaction complete."}"#).unwrap();
//! assert_eq!(json.join(&tokens, &state), "<_>Transaction complete.<_>");
//! ```
//!
//! Use [FormatTokenizer] to select the tokenizer from a configuration.

use smol_str::SmolStr;
use std::borrow::Cow;
use thiserror::Error;

mod fields;
mod format;
mod json;
mod logfmt;
mod punctuation;
mod spaces;
mod splitting;
mod state;

pub use fields::{is_variable_field, MESSAGE_FIELDS};
pub use format::{FormatTokenizer, LogFormat, TokenizerConfig, DEFAULT_PLACEHOLDER};
pub use json::JsonTokenizer;
pub use logfmt::{LogfmtTokenizer, SyntaxError};
pub use punctuation::{PunctuationTokenizer, MAX_TOKENS};
pub use spaces::SpacesTokenizer;
pub use splitting::SplittingTokenizer;
pub use state::{SpacesAfter, TokenizerState};

/// A token is a view of the line, or an owned string when the value had to be decoded.
pub type Token<'a> = Cow<'a, str>;

/// The tokenizer errors.
///
/// The tokenization errors mean that the line does not fit the tokenizer strategy:
/// the caller is expected to fall back to another tokenizer, or to skip the line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The line is not a valid logfmt line.
    #[error("{0}")]
    Logfmt(#[from] SyntaxError),

    /// The line is not a json object with a message field.
    #[error("no message field found")]
    NoMessageField,

    /// The format name is not known.
    #[error("unknown format: {0}")]
    UnknownFormat(String),
}

impl Error {
    /// Check if the error means the tokenizer does not apply to the line.
    pub fn is_not_applicable(&self) -> bool {
        matches!(self, Error::Logfmt(_) | Error::NoMessageField)
    }
}

/// The common interface of the line tokenizers.
///
/// The `tokens` and `state` arguments are scratch buffers: they are cleared and refilled
/// by each call, so that their allocation can be reused for the next line.
pub trait LineTokenizer {
    /// The side-channel needed to render the tokens back.
    type State: Clone + Default + std::fmt::Debug;

    /// The name of the tokenizer format.
    fn name(&self) -> &'static str;

    /// Split a line into tokens. On error, the `tokens` buffer is left empty.
    fn tokenize<'a>(
        &self,
        line: &'a str,
        tokens: &mut Vec<Token<'a>>,
        state: &mut Self::State,
    ) -> Result<(), Error>;

    /// Render tokens into a line.
    ///
    /// The state must be the one produced by [LineTokenizer::tokenize] for these tokens.
    fn join<T: AsRef<str>>(&self, tokens: &[T], state: &Self::State) -> String;

    /// Copy the tokens so that they can outlive the line and the scratch buffers.
    fn clone_tokens<T: AsRef<str>>(
        &self,
        tokens: &[T],
        state: &Self::State,
    ) -> (Vec<SmolStr>, Self::State) {
        (
            tokens
                .iter()
                .map(|token| SmolStr::new(token.as_ref()))
                .collect(),
            state.clone(),
        )
    }

    /// Tokenize a line with fresh buffers.
    fn tokenize_line<'a>(&self, line: &'a str) -> Result<(Vec<Token<'a>>, Self::State), Error> {
        let mut tokens = Vec::new();
        let mut state = Self::State::default();
        self.tokenize(line, &mut tokens, &mut state)?;
        Ok((tokens, state))
    }
}

/// Returns the total length of the tokens, to pre-allocate the joined line.
fn tokens_len<T: AsRef<str>>(tokens: &[T]) -> usize {
    tokens.iter().map(|token| token.as_ref().len()).sum()
}
