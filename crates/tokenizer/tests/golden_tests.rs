// Copyright (C) 2024 Red Hat
// SPDX-License-Identifier: Apache-2.0

use goldenfile::Mint;
use logmine_tokenizer::{FormatTokenizer, LineTokenizer, LogFormat};
use std::io::Write;

const LINES: [&str; 3] = [
    r#"level=info msg="user logged in" user=admin"#,
    r#"{"time":"2024-05-30","msg":"GET /index.html 200"}"#,
    "Connection reset by peer (errno=104)",
];

#[test]
fn it_tokenizes_formats() {
    let mut mint = Mint::new("tests/");
    let mut expected = mint.new_goldenfile("tokens.txt").unwrap();
    for line in LINES {
        writeln!(expected, "== {}", line).unwrap();
        for format in LogFormat::ALL {
            let tokenizer = FormatTokenizer::new(format, "<_>");
            match tokenizer.tokenize_line(line) {
                Ok((tokens, state)) => {
                    let json = serde_json::to_string(&tokens).unwrap();
                    writeln!(expected, "{}: {}", format, json).unwrap();
                    writeln!(expected, "  {}", tokenizer.join(&tokens, &state)).unwrap();
                }
                Err(err) => writeln!(expected, "{}: {}", format, err).unwrap(),
            }
        }
    }
}
