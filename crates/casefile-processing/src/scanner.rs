//! Heuristic content scanning
//!
//! Works on the first [`CONTENT_SCAN_WINDOW_BYTES`] of a file, decoded lossily
//! as text. Three rule groups apply:
//!
//! - markup/script rules, only for types a consumer may render as markup
//! - server-side open tags, for every type (the "shell disguised as image")
//! - null bytes, for every type that is not a binary raster or document format
//!
//! Every rule, the null-byte check included, sees only that window. Content
//! past it is not inspected.
//!
//! Markup rules are anchored to tag or call syntax so that prose mentioning a
//! "function (", a "window. Open" or a "< 5 = ..." comparison passes.

use regex::{Regex, RegexBuilder};
use std::path::Path;

use casefile_core::constants::CONTENT_SCAN_WINDOW_BYTES;
use casefile_core::{DeclaredType, UploadErrorKind};

use crate::bounded_read::read_head;

/// `(name, pattern, case_insensitive)`
type RuleSpec = (&'static str, &'static str, bool);

const MARKUP_RULES: &[RuleSpec] = &[
    ("script_tag", r"<script\b", true),
    ("iframe_tag", r"<iframe\b", true),
    ("embed_tag", r"<(embed|object)\b", true),
    ("event_handler", r"<[a-z][^<>]*\son[a-z]+\s*=", true),
    ("script_uri", r"\b(java|vb)script:\S", true),
    (
        "script_api",
        r"\b(eval|Function|setTimeout|setInterval)\(",
        false,
    ),
    (
        "global_object",
        r"\b(document\.(cookie|write|domain)|window\.(location|open|eval))\b",
        false,
    ),
];

const SERVER_RULES: &[RuleSpec] = &[("server_open_tag", r"<\?(php\b|=)", true)];

struct Rule {
    name: &'static str,
    pattern: Regex,
}

fn compile(rules: &[RuleSpec]) -> Result<Vec<Rule>, regex::Error> {
    rules
        .iter()
        .map(|&(name, pattern, case_insensitive)| -> Result<Rule, regex::Error> {
            Ok(Rule {
                name,
                pattern: RegexBuilder::new(pattern)
                    .case_insensitive(case_insensitive)
                    .build()?,
            })
        })
        .collect()
}

/// Content scanner with precompiled rules
pub struct ContentScanner {
    markup_rules: Vec<Rule>,
    server_rules: Vec<Rule>,
}

impl ContentScanner {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            markup_rules: compile(MARKUP_RULES)?,
            server_rules: compile(SERVER_RULES)?,
        })
    }

    /// Classify an already-read prefix. Never touches the file.
    pub fn check(&self, declared: DeclaredType, prefix: &[u8]) -> Result<(), UploadErrorKind> {
        let category = declared.category();

        if !category.allows_null_bytes() && prefix.contains(&0) {
            return Err(malicious("null_byte"));
        }

        let text = String::from_utf8_lossy(prefix);

        if let Some(rule) = first_match(&self.server_rules, &text) {
            return Err(malicious(rule));
        }

        if category.is_markup_capable() {
            if let Some(rule) = first_match(&self.markup_rules, &text) {
                return Err(malicious(rule));
            }
        }

        Ok(())
    }

    /// Scan the head of the file at `path` for `declared`.
    pub async fn scan(&self, path: &Path, declared: DeclaredType) -> Result<(), UploadErrorKind> {
        let prefix = read_head(path, CONTENT_SCAN_WINDOW_BYTES)
            .await
            .map_err(UploadErrorKind::io)?;
        self.check(declared, &prefix)
    }
}

fn first_match(rules: &[Rule], text: &str) -> Option<&'static str> {
    rules
        .iter()
        .find(|rule| rule.pattern.is_match(text))
        .map(|rule| rule.name)
}

fn malicious(rule: &str) -> UploadErrorKind {
    UploadErrorKind::MaliciousContent {
        rule: rule.to_string(),
    }
}
