// Copyright (C) 2024 Red Hat
// SPDX-License-Identifier: Apache-2.0

//! This module is the entrypoint of the logmine command line.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use itertools::Itertools;
use logmine_tokenizer::{
    is_variable_field, FormatTokenizer, LineTokenizer, LogFormat, PunctuationTokenizer, Token,
    TokenizerConfig, TokenizerState,
};
use smol_str::SmolStr;
use std::io::BufRead;
use std::path::{Path, PathBuf};

mod config;

#[derive(Parser)]
#[clap(version, about, long_about = None)]
#[clap(disable_help_subcommand = true)]
struct Cli {
    #[clap(long, help = "Tokenizer configuration", value_name = "FILE")]
    config: Option<PathBuf>,

    #[clap(long, help = "The log format, detected from the first line when unset")]
    format: Option<LogFormat>,

    #[clap(long, help = "The placeholder for masked values")]
    placeholder: Option<String>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[clap(about = "Print the tokens of each line")]
    Tokenize { file: Option<PathBuf> },

    #[clap(about = "Print each line rendered back from its tokens")]
    Join { file: Option<PathBuf> },

    #[clap(
        about = "Check that the lines are rendered back unchanged",
        long_about = "Check that the lines are rendered back unchanged. Json lines and logfmt lines with masked values are skipped, their rendering is not the input line."
    )]
    Check { file: Option<PathBuf> },

    #[clap(about = "Print the detected format of each line")]
    Detect { file: Option<PathBuf> },

    // Debug tokenizer
    #[clap(hide = true, about = "Tokenize a single line")]
    DebugTokenizer { line: String },
}

impl Cli {
    fn settings(&self) -> Result<TokenizerConfig> {
        let mut settings = match &self.config {
            Some(path) => config::from_path(path)
                .with_context(|| format!("Failed to load the config {:?}", path))?,
            None => TokenizerConfig::default(),
        };
        if let Some(format) = self.format {
            settings.format = Some(format);
        }
        if let Some(placeholder) = &self.placeholder {
            settings.placeholder = placeholder.clone();
        }
        Ok(settings)
    }

    fn run(self) -> Result<()> {
        let settings = self.settings()?;
        tracing::debug!(?settings, "Loaded settings");
        match self.command {
            Commands::Tokenize { file } => tokenize(&settings, file.as_deref()),
            Commands::Join { file } => join(&settings, file.as_deref()),
            Commands::Check { file } => check(&settings, file.as_deref()),
            Commands::Detect { file } => detect(file.as_deref()),
            Commands::DebugTokenizer { line } => debug_tokenizer(&settings, &line),
        }
    }
}

fn main() -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

    let logger = tracing_subscriber::Registry::default();

    let _flush = match std::env::var_os("LOGMINE_LOG") {
        None => {
            // Default INFO stderr logger, stdout is for the results
            logger
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(false)
                        .compact()
                        .with_filter(tracing_subscriber::filter::LevelFilter::INFO),
                )
                .init();
            None
        }
        Some(_level) => {
            // Tracing spans
            let logger = logger.with(
                tracing_tree::HierarchicalLayer::new(1)
                    .with_writer(std::io::stderr)
                    .with_targets(true)
                    .with_bracketed_fields(true)
                    .with_filter(tracing_subscriber::filter::EnvFilter::from_env(
                        "LOGMINE_LOG",
                    )),
            );
            if let Ok(fp) = std::env::var("LOGMINE_TRACE") {
                let chrome = tracing_chrome::ChromeLayerBuilder::new()
                    .file(fp)
                    .include_args(true)
                    .build();
                logger.with(chrome.0).init();
                // Return the chrome flush guard so that it is not dropped until the end
                Some(chrome.1)
            } else {
                logger.init();
                None
            }
        }
    };
    Cli::parse().run()
}

/// Open the file, or stdin when no path is provided.
fn open_input(file: Option<&Path>) -> Result<Box<dyn BufRead>> {
    match file {
        Some(path) => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("Failed to open {:?}", path))?;
            Ok(Box::new(std::io::BufReader::new(file)))
        }
        None => Ok(Box::new(std::io::stdin().lock())),
    }
}

/// Call the action for each line with its 1-based number.
fn for_each_line(
    file: Option<&Path>,
    mut action: impl FnMut(usize, &str) -> Result<()>,
) -> Result<()> {
    for (idx, line) in open_input(file)?.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read line {}", idx + 1))?;
        action(idx + 1, &line)?;
    }
    Ok(())
}

/// The tokenizer of the input, created from the first non-empty line when the format is unset.
struct LineProcessor<'a> {
    settings: &'a TokenizerConfig,
    tokenizer: Option<FormatTokenizer>,
    fallback: FormatTokenizer,
}

/// The result of a line tokenization.
struct Tokenized<'a> {
    tokens: Vec<Token<'a>>,
    state: TokenizerState,
    /// The tokens come from the fallback tokenizer.
    fallback: bool,
}

impl<'s> LineProcessor<'s> {
    fn new(settings: &'s TokenizerConfig) -> LineProcessor<'s> {
        LineProcessor {
            settings,
            tokenizer: settings
                .format
                .map(|format| FormatTokenizer::new(format, &settings.placeholder)),
            fallback: FormatTokenizer::Punctuation(PunctuationTokenizer::new()),
        }
    }

    fn tokenizer(&mut self, line: &str) -> &FormatTokenizer {
        if self.tokenizer.is_none() && !line.is_empty() {
            let tokenizer = self.settings.build(line);
            tracing::info!(format = %tokenizer.format(), "Detected log format");
            self.tokenizer = Some(tokenizer);
        }
        self.tokenizer.as_ref().unwrap_or(&self.fallback)
    }

    /// Tokenize a line, using the punctuation tokenizer when the line does not fit the format.
    fn process<'a>(&mut self, nr: usize, line: &'a str) -> Result<Tokenized<'a>> {
        let tokenizer = self.tokenizer(line);
        match tokenizer.tokenize_line(line) {
            Ok((tokens, state)) => Ok(Tokenized {
                tokens,
                state,
                fallback: false,
            }),
            Err(err) if err.is_not_applicable() => {
                tracing::debug!(nr, %err, "Line is not applicable, using punctuation");
                let (tokens, state) = self.fallback.tokenize_line(line)?;
                Ok(Tokenized {
                    tokens,
                    state,
                    fallback: true,
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Check if the rendered line is expected to be the input line.
    fn is_reversible(&self, tokenized: &Tokenized) -> bool {
        if tokenized.fallback {
            return true;
        }
        match self.tokenizer.as_ref().map(FormatTokenizer::format) {
            Some(LogFormat::Json) => false,
            Some(LogFormat::Logfmt) => !tokenized
                .tokens
                .iter()
                .step_by(2)
                .any(|key| is_variable_field(key)),
            _ => true,
        }
    }

    fn render<T: AsRef<str>>(
        &self,
        fallback: bool,
        tokens: &[T],
        state: &TokenizerState,
    ) -> String {
        match &self.tokenizer {
            Some(tokenizer) if !fallback => tokenizer.join(tokens, state),
            _ => self.fallback.join(tokens, state),
        }
    }
}

#[tracing::instrument(level = "debug", skip(settings))]
fn tokenize(settings: &TokenizerConfig, file: Option<&Path>) -> Result<()> {
    let mut processor = LineProcessor::new(settings);
    for_each_line(file, |nr, line| {
        let tokenized = processor.process(nr, line)?;
        println!("{}", serde_json::to_string(&tokenized.tokens)?);
        Ok(())
    })
}

#[tracing::instrument(level = "debug", skip(settings))]
fn join(settings: &TokenizerConfig, file: Option<&Path>) -> Result<()> {
    let mut processor = LineProcessor::new(settings);
    for_each_line(file, |nr, line| {
        let tokenized = processor.process(nr, line)?;
        println!(
            "{}",
            processor.render(tokenized.fallback, &tokenized.tokens, &tokenized.state)
        );
        Ok(())
    })
}

/// A line that was not rendered back unchanged.
struct Mismatch {
    nr: usize,
    line: String,
    fallback: bool,
    tokens: Vec<SmolStr>,
    state: TokenizerState,
}

#[tracing::instrument(level = "debug", skip(settings))]
fn check(settings: &TokenizerConfig, file: Option<&Path>) -> Result<()> {
    let mut processor = LineProcessor::new(settings);
    let mut mismatches = Vec::new();
    let mut line_count = 0;
    let mut fallback_count = 0;
    let mut skipped_count = 0;
    for_each_line(file, |nr, line| {
        line_count += 1;
        let tokenized = processor.process(nr, line)?;
        if tokenized.fallback {
            fallback_count += 1;
        }
        if !processor.is_reversible(&tokenized) {
            skipped_count += 1;
        } else if processor.render(tokenized.fallback, &tokenized.tokens, &tokenized.state) != line {
            let (tokens, state) = processor
                .fallback
                .clone_tokens(&tokenized.tokens, &tokenized.state);
            mismatches.push(Mismatch {
                nr,
                line: line.to_string(),
                fallback: tokenized.fallback,
                tokens,
                state,
            });
        }
        Ok(())
    })?;

    for mismatch in &mismatches {
        println!("{} | {}", mismatch.nr, mismatch.line);
        println!(
            "{} > {}",
            mismatch.nr,
            processor.render(mismatch.fallback, &mismatch.tokens, &mismatch.state)
        );
    }
    tracing::info!(
        lines = line_count,
        fallback = fallback_count,
        skipped = skipped_count,
        mismatch = mismatches.len(),
        "Checked round trip"
    );
    if mismatches.is_empty() {
        Ok(())
    } else {
        Err(anyhow::anyhow!(
            "{} lines out of {} were not rendered back unchanged",
            mismatches.len(),
            line_count
        ))
    }
}

#[tracing::instrument(level = "debug")]
fn detect(file: Option<&Path>) -> Result<()> {
    let mut formats = Vec::new();
    for_each_line(file, |_nr, line| {
        let format = LogFormat::detect(line);
        println!("{} | {}", format, line);
        formats.push(format);
        Ok(())
    })?;
    for (format, count) in formats
        .into_iter()
        .counts()
        .into_iter()
        .sorted_by(|x, y| Ord::cmp(&y.1, &x.1).then(Ord::cmp(x.0.as_str(), y.0.as_str())))
    {
        tracing::info!(%format, count, "Detected");
    }
    Ok(())
}

fn debug_tokenizer(settings: &TokenizerConfig, line: &str) -> Result<()> {
    let tokenizer = settings.build(line);
    let (tokens, state) = tokenizer
        .tokenize_line(line)
        .with_context(|| format!("The line does not fit the {} format", tokenizer.format()))?;
    println!("format: {}", tokenizer.format());
    println!("tokens: {}", tokens.iter().format(" | "));
    println!("state:  {:?}", state);
    println!("join:   {}", tokenizer.join(&tokens, &state));
    Ok(())
}
