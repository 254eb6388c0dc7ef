// Copyright (C) 2024 Red Hat
// SPDX-License-Identifier: Apache-2.0

//! This module provides the tokenizer selection from a log format configuration.

use crate::{
    Error, JsonTokenizer, LineTokenizer, LogfmtTokenizer, PunctuationTokenizer, SpacesAfter,
    SpacesTokenizer, SplittingTokenizer, Token, TokenizerState,
};
use serde::{Deserialize, Serialize};

/// The default placeholder for masked values.
pub const DEFAULT_PLACEHOLDER: &str = "<_>";

/// The log formats, one per tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Plain space separated words.
    Spaces,
    /// Free form text, the default.
    Punctuation,
    /// Key/value text.
    Splitting,
    /// Logfmt key=value pairs.
    Logfmt,
    /// Json objects.
    Json,
}

impl LogFormat {
    /// All the formats.
    pub const ALL: [LogFormat; 5] = [
        LogFormat::Spaces,
        LogFormat::Punctuation,
        LogFormat::Splitting,
        LogFormat::Logfmt,
        LogFormat::Json,
    ];

    /// The format name.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Spaces => "spaces",
            LogFormat::Punctuation => "punctuation",
            LogFormat::Splitting => "splitting",
            LogFormat::Logfmt => "logfmt",
            LogFormat::Json => "json",
        }
    }

    /// Guess the format of a line.
    pub fn detect(line: &str) -> LogFormat {
        if line.len() < 2 {
            LogFormat::Punctuation
        } else if line.starts_with('{') && line.ends_with('}') {
            LogFormat::Json
        } else if line.matches('=').count() + 5 > line.matches(' ').count() {
            LogFormat::Logfmt
        } else {
            LogFormat::Punctuation
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LogFormat::ALL
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownFormat(s.to_string()))
    }
}

/// The tokenizer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenizerConfig {
    /// The log format, detected from the first line when unset.
    #[serde(default)]
    pub format: Option<LogFormat>,

    /// The placeholder for masked values.
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
}

fn default_placeholder() -> String {
    DEFAULT_PLACEHOLDER.to_string()
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        TokenizerConfig {
            format: None,
            placeholder: default_placeholder(),
        }
    }
}

impl TokenizerConfig {
    /// Resolve the format, using the sample line when it is not configured.
    pub fn format_for(&self, sample: &str) -> LogFormat {
        self.format.unwrap_or_else(|| LogFormat::detect(sample))
    }

    /// Create the tokenizer for the lines that look like the sample.
    pub fn build(&self, sample: &str) -> FormatTokenizer {
        FormatTokenizer::new(self.format_for(sample), &self.placeholder)
    }
}

/// A tokenizer selected at runtime.
#[derive(Debug, Clone)]
pub enum FormatTokenizer {
    /// See [SpacesTokenizer]
    Spaces(SpacesTokenizer),
    /// See [PunctuationTokenizer]
    Punctuation(PunctuationTokenizer),
    /// See [SplittingTokenizer]
    Splitting(SplittingTokenizer),
    /// See [LogfmtTokenizer]
    Logfmt(LogfmtTokenizer),
    /// See [JsonTokenizer]
    Json(JsonTokenizer),
}

impl FormatTokenizer {
    /// Create the tokenizer of a format.
    pub fn new(format: LogFormat, placeholder: &str) -> FormatTokenizer {
        match format {
            LogFormat::Spaces => FormatTokenizer::Spaces(SpacesTokenizer::new()),
            LogFormat::Punctuation => FormatTokenizer::Punctuation(PunctuationTokenizer::new()),
            LogFormat::Splitting => FormatTokenizer::Splitting(SplittingTokenizer::new()),
            LogFormat::Logfmt => FormatTokenizer::Logfmt(LogfmtTokenizer::new(placeholder)),
            LogFormat::Json => FormatTokenizer::Json(JsonTokenizer::new(placeholder)),
        }
    }

    /// The format of the tokenizer.
    pub fn format(&self) -> LogFormat {
        match self {
            FormatTokenizer::Spaces(_) => LogFormat::Spaces,
            FormatTokenizer::Punctuation(_) => LogFormat::Punctuation,
            FormatTokenizer::Splitting(_) => LogFormat::Splitting,
            FormatTokenizer::Logfmt(_) => LogFormat::Logfmt,
            FormatTokenizer::Json(_) => LogFormat::Json,
        }
    }
}

/// Run a tokenizer that records spaces, reusing the state allocation.
fn with_spaces<R>(state: &mut TokenizerState, f: impl FnOnce(&mut SpacesAfter) -> R) -> R {
    let mut spaces = state.take_spaces();
    let result = f(&mut spaces);
    *state = TokenizerState::Spaces(spaces);
    result
}

impl LineTokenizer for FormatTokenizer {
    type State = TokenizerState;

    fn name(&self) -> &'static str {
        self.format().as_str()
    }

    fn tokenize<'a>(
        &self,
        line: &'a str,
        tokens: &mut Vec<Token<'a>>,
        state: &mut TokenizerState,
    ) -> Result<(), Error> {
        match self {
            FormatTokenizer::Spaces(t) => {
                *state = TokenizerState::None;
                t.tokenize(line, tokens, &mut ())
            }
            FormatTokenizer::Logfmt(t) => {
                *state = TokenizerState::None;
                t.tokenize(line, tokens, &mut ())
            }
            FormatTokenizer::Punctuation(t) => {
                with_spaces(state, |spaces| t.tokenize(line, tokens, spaces))
            }
            FormatTokenizer::Splitting(t) => {
                with_spaces(state, |spaces| t.tokenize(line, tokens, spaces))
            }
            FormatTokenizer::Json(t) => with_spaces(state, |spaces| t.tokenize(line, tokens, spaces)),
        }
    }

    fn join<T: AsRef<str>>(&self, tokens: &[T], state: &TokenizerState) -> String {
        match self {
            FormatTokenizer::Spaces(t) => t.join(tokens, &()),
            FormatTokenizer::Logfmt(t) => t.join(tokens, &()),
            FormatTokenizer::Punctuation(t) => t.join(tokens, state.spaces()),
            FormatTokenizer::Splitting(t) => t.join(tokens, state.spaces()),
            FormatTokenizer::Json(t) => t.join(tokens, state.spaces()),
        }
    }
}
