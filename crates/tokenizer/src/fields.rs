// Copyright (C) 2024 Red Hat
// SPDX-License-Identifier: Apache-2.0

//! This module contains the well-known structured log field names.

/// The json fields that may contain the log message, by priority.
pub const MESSAGE_FIELDS: [&str; 6] = ["log", "message", "msg", "msg_", "_msg", "content"];

const VARIABLE_FIELDS: [&str; 4] = ["ts", "traceID", "time", "timestamp"];

/// Check if a field value is too variable to be part of a template, e.g. a timestamp.
pub fn is_variable_field(key: &str) -> bool {
    // The single letter key is case sensitive: `T` is not a time.
    key == "t"
        || VARIABLE_FIELDS
            .iter()
            .any(|field| key.eq_ignore_ascii_case(field))
}

/// Returns the priority of a message field.
pub(crate) fn message_rank(key: &str) -> Option<usize> {
    MESSAGE_FIELDS.iter().position(|field| *field == key)
}

#[test]
fn test_is_variable_field() {
    for key in ["ts", "TS", "t", "traceid", "traceID", "Time", "TIMESTAMP"] {
        assert!(is_variable_field(key), "{} is variable", key);
    }
    for key in ["T", "level", "msg", "tsx", "trace", ""] {
        assert!(!is_variable_field(key), "{} is not variable", key);
    }
}

#[test]
fn test_message_rank() {
    assert_eq!(message_rank("log"), Some(0));
    assert_eq!(message_rank("_msg"), Some(4));
    assert_eq!(message_rank("Message"), None);
}
