// Copyright (C) 2024 Red Hat
// SPDX-License-Identifier: Apache-2.0

//! This module loads the tokenizer configuration file.

use logmine_tokenizer::TokenizerConfig;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid file: {0}")]
    BadFile(#[from] std::io::Error),

    #[error("invalid json: {0}")]
    BadJSON(#[from] serde_json::Error),

    #[error("invalid yaml: {0}")]
    BadYAML(#[from] serde_yaml::Error),

    #[error("unknown config format: {0}")]
    UnknownFormat(String),
}

pub fn from_path(path: &Path) -> Result<TokenizerConfig, Error> {
    let file = std::fs::File::open(path)?;
    from_reader(path, file)
}

fn from_reader<R: std::io::Read>(path: &Path, file: R) -> Result<TokenizerConfig, Error> {
    let reader = std::io::BufReader::new(file);
    match path.extension().and_then(std::ffi::OsStr::to_str) {
        Some("yaml") | Some("yml") => Ok(serde_yaml::from_reader(reader)?),
        Some("json") => Ok(serde_json::from_reader(reader)?),
        m_ext => Err(Error::UnknownFormat(m_ext.unwrap_or("").to_string())),
    }
}
