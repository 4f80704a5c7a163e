//! Lexical clean-up of raw manifest markup.
//!
//! The SDK manifests are namespaced (`<sdk:platform>`), use self-closing
//! boolean flags (`<sdk:obsolete/>`) and contain a tag literally named
//! `source`. None of that survives tree queries well, so the raw text is
//! rewritten before it is parsed:
//!
//! 1. strip the `sdk:` prefix from every tag name
//! 2. `<obsolete/>` becomes `<obsolete>true</obsolete>`
//! 3. `<source>` becomes `<sdk-source>`
//! 4. every remaining self-closing tag is removed
//!
//! This is a best-effort pass, not a validating parser. Anything it cannot
//! fix is handed to the resolver unchanged.

use std::sync::OnceLock;

use regex::Regex;

fn vendor_prefix_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<(/?)sdk:").unwrap())
}

fn obsolete_flag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<obsolete\s*/>").unwrap())
}

fn source_tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // Group 1: optional closing slash, group 2: whatever ends the name
    PATTERN.get_or_init(|| Regex::new(r"<(/?)source([\s/>])").unwrap())
}

fn self_closing_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<[^<]*?/>").unwrap())
}

/// Rewrite raw manifest text into markup the resolver can query.
pub fn normalize(raw: &str) -> String {
    let text = vendor_prefix_pattern().replace_all(raw, "<$1");
    let text = obsolete_flag_pattern().replace_all(&text, "<obsolete>true</obsolete>");
    let text = source_tag_pattern().replace_all(&text, "<${1}sdk-source${2}");
    self_closing_pattern().replace_all(&text, "").into_owned()
}
