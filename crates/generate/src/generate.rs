// Copyright (C) 2024 Red Hat
// SPDX-License-Identifier: Apache-2.0

//! Log line generator
//!
//! The generators are deterministic, the plain text lines are created with [gen_lines]:
//!
//! ```rust
//! # use logmine_generate::{gen_lines};
//! assert_eq!(gen_lines().next(), Some("J8xbWovSpJUT zox0 igY5l".to_string()))
//! ```
//!
//! Structured lines are created with [gen_logfmt_lines] and [gen_json_lines].

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

const SEED: u64 = 42;

const LEVELS: [&str; 4] = ["debug", "info", "warn", "error"];

fn fixed_rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(SEED)
}

fn gen_word(rng: &mut impl Rng, size: usize) -> String {
    rng.sample_iter(&rand::distr::Alphanumeric)
        .take(size)
        .map(char::from)
        .collect()
}

fn gen_line(rng: &mut impl Rng) -> String {
    let mut result = String::with_capacity(256);
    for _ in 0..rng.random_range(2..10) {
        let word_size = rng.random_range(2..18);
        result.push_str(&gen_word(rng, word_size));
        result.push(' ');
    }
    result.pop();
    result
}

fn gen_timestamp(rng: &mut impl Rng) -> String {
    format!(
        "2024-05-{:02}T{:02}:{:02}:{:02}.{:06}Z",
        rng.random_range(1..31),
        rng.random_range(0..24),
        rng.random_range(0..60),
        rng.random_range(0..60),
        rng.random_range(0..1_000_000)
    )
}

fn gen_level(rng: &mut impl Rng) -> &'static str {
    LEVELS[rng.random_range(0..LEVELS.len())]
}

fn gen_logfmt_line(rng: &mut impl Rng) -> String {
    let ts = gen_timestamp(rng);
    let level = gen_level(rng);
    let caller = format!("{}.go:{}", gen_word(rng, 8), rng.random_range(1..500));
    let msg = gen_line(rng);
    format!(r#"ts={ts} caller={caller} level={level} msg="{msg}""#)
}

fn gen_json_line(rng: &mut impl Rng) -> String {
    let time = gen_timestamp(rng);
    let level = gen_level(rng);
    let pid = rng.random_range(1..65536);
    let msg = gen_line(rng);
    format!(r#"{{"time":"{time}","level":"{level}","pid":{pid},"msg":"{msg}"}}"#)
}

struct RandomLine {
    rng: ChaCha8Rng,
    generator: fn(&mut ChaCha8Rng) -> String,
}

impl Iterator for RandomLine {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        Some((self.generator)(&mut self.rng))
    }
}

fn random_lines(generator: fn(&mut ChaCha8Rng) -> String) -> impl Iterator<Item = String> {
    RandomLine {
        rng: fixed_rng(),
        generator,
    }
}

/// Plain text lines made of random words.
pub fn gen_lines() -> impl Iterator<Item = String> {
    random_lines(gen_line)
}

/// Logfmt lines with a timestamp, a level and a quoted message.
pub fn gen_logfmt_lines() -> impl Iterator<Item = String> {
    random_lines(gen_logfmt_line)
}

/// Json lines with a timestamp, a level and a message field.
pub fn gen_json_lines() -> impl Iterator<Item = String> {
    random_lines(gen_json_line)
}
