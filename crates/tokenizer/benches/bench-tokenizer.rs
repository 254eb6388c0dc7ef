// Copyright (C) 2024 Red Hat
// SPDX-License-Identifier: Apache-2.0

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use logmine_generate::{gen_json_lines, gen_lines, gen_logfmt_lines};
use logmine_tokenizer::{
    JsonTokenizer, LineTokenizer, LogfmtTokenizer, PunctuationTokenizer, SplittingTokenizer,
};

fn bench_tokenizer<T: LineTokenizer>(c: &mut Criterion, tokenizer: &T, lines: &[String]) {
    c.bench_function(&format!("tokenize::{}", tokenizer.name()), |b| {
        let mut tokens = Vec::new();
        let mut state = T::State::default();
        b.iter(|| {
            for line in lines {
                let _ = tokenizer.tokenize(black_box(line), &mut tokens, &mut state);
            }
        })
    });
}

pub fn tokenizers(c: &mut Criterion) {
    let lines = gen_lines().take(202).collect::<Vec<String>>();
    let logfmt_lines = gen_logfmt_lines().take(202).collect::<Vec<String>>();
    let json_lines = gen_json_lines().take(202).collect::<Vec<String>>();
    bench_tokenizer(c, &PunctuationTokenizer::new(), &lines);
    bench_tokenizer(c, &SplittingTokenizer::new(), &logfmt_lines);
    bench_tokenizer(c, &LogfmtTokenizer::default(), &logfmt_lines);
    bench_tokenizer(c, &JsonTokenizer::default(), &json_lines);
}

pub fn join(c: &mut Criterion) {
    let line = gen_logfmt_lines().next().unwrap_or_default();
    let tokenizer = PunctuationTokenizer::new();
    let (tokens, state) = tokenizer.tokenize_line(&line).unwrap();
    c.bench_function("join::punctuation", |b| {
        b.iter(|| tokenizer.join(black_box(&tokens), &state))
    });
}

criterion_group!(benches, tokenizers, join);
criterion_main!(benches);
