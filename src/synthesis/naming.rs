//! Component naming strategies.
//!
//! Names are cosmetic: they are derived after clustering and never affect it.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeSet, HashSet};

use crate::blocks::Block;
use crate::scanner::{LexemeKind, Lexer};

const MAX_COMMENT_CHARS: usize = 40;
const MAX_COMMENT_WORDS: usize = 5;
const MAX_NAME_WORDS: usize = 4;

/// Checked in this order; the first one present in the block wins.
pub const CONTENT_KEYWORDS: &[&str] = &[
    "button", "input", "modal", "form", "table", "card", "list", "nav", "menu", "header", "footer",
    "dialog", "tab", "badge", "avatar", "alert", "dropdown", "select", "checkbox",
];

static LABEL_CHILD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<(?:h[1-6]|label|legend|caption|title)\b[^>]*>\s*([^<{]+?)\s*<")
        .expect("valid label pattern")
});

static UTILITY_CLASS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:[a-z0-9]+:)*-?(?:p[xytblr]?|m[xytblr]?|[wh]|min-[wh]|max-[wh]|size|text|bg|border|rounded|gap|space-[xy]|items|justify|content|self|place|font|leading|tracking|shadow|opacity|z|top|left|right|bottom|inset|overflow|order|transition|duration|ease|cursor|ring|outline|fill|stroke|grid-cols|grid-rows|col-span|row-span|flex|basis|grow|shrink|translate-[xy]|scale|rotate|animate|aspect|object|whitespace|break|truncate|underline|uppercase|lowercase|capitalize|italic|antialiased)(?:-.+)?$",
    )
    .expect("valid utility class pattern")
});

const UTILITY_WORDS: &[&str] = &[
    "block", "inline", "inline-block", "hidden", "relative", "absolute", "fixed", "sticky", "static",
    "grid", "flex", "container", "clearfix", "row", "col", "active", "disabled", "visible",
    "invisible", "sr-only",
];

/// Derives a base name for a block; `rank` is 1-based.
pub fn derive_name(document: &str, block: &Block, rank: usize) -> String {
    leading_comment(document, block.start)
        .or_else(|| label_text(&block.text))
        .or_else(|| class_keyword(&block.text))
        .or_else(|| content_keyword(&block.text))
        .unwrap_or_else(|| format!("Component{rank}"))
}

/// A short comment (`<!-- -->`, `{/* */}`, `/* */`) directly before `start`.
fn leading_comment(document: &str, start: usize) -> Option<String> {
    let before = document.get(..start)?.trim_end();

    let inner = if let Some(rest) = before.strip_suffix("-->") {
        &rest[rest.rfind("<!--")? + 4..]
    } else if let Some(rest) = before.strip_suffix("*/}") {
        &rest[rest.rfind("{/*")? + 3..]
    } else if let Some(rest) = before.strip_suffix("*/") {
        &rest[rest.rfind("/*")? + 2..]
    } else {
        return None;
    };

    let inner = inner.trim();
    let words = inner.split_whitespace().count();
    if inner.is_empty() || inner.chars().count() > MAX_COMMENT_CHARS || words > MAX_COMMENT_WORDS {
        return None;
    }
    non_empty(pascal_case(inner))
}

fn label_text(text: &str) -> Option<String> {
    LABEL_CHILD
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .find_map(|m| non_empty(pascal_case(m.as_str())))
}

/// First class on the root tag that is not a layout/utility class.
fn class_keyword(text: &str) -> Option<String> {
    let empty = BTreeSet::new();
    let mut class_attr = false;

    for lexeme in Lexer::new(text, &empty) {
        match lexeme.kind {
            LexemeKind::TagEnd { .. } => break,
            LexemeKind::AttrText => {
                let attr = lexeme.text.trim_end();
                class_attr = attr.ends_with("class=") || attr.ends_with("className=");
            }
            LexemeKind::Literal { .. } if class_attr => {
                let value = lexeme
                    .text
                    .get(1..lexeme.text.len().saturating_sub(1))
                    .unwrap_or_default();
                return value
                    .split_whitespace()
                    .filter(|class| !is_utility_class(class))
                    .find_map(|class| non_empty(pascal_case(class)));
            }
            _ => class_attr = false,
        }
    }
    None
}

fn is_utility_class(class: &str) -> bool {
    UTILITY_WORDS.contains(&class) || UTILITY_CLASS.is_match(class) || class.contains('[')
}

fn content_keyword(text: &str) -> Option<String> {
    let lower = text.to_ascii_lowercase();
    let words: HashSet<&str> = lower
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    CONTENT_KEYWORDS
        .iter()
        .find(|keyword| words.contains(*keyword))
        .map(|keyword| pascal_case(keyword))
}

/// `"user profile-card"` -> `"UserProfileCard"`. Non-ASCII characters are
/// dropped and a leading digit run is removed so the result is an identifier.
pub fn pascal_case(text: &str) -> String {
    let mut name = String::new();
    for word in text
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .take(MAX_NAME_WORDS)
    {
        let shout = word.len() > 1 && word.chars().all(|c| !c.is_ascii_lowercase());
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            name.push(first.to_ascii_uppercase());
            if shout {
                name.extend(chars.map(|c| c.to_ascii_lowercase()));
            } else {
                name.extend(chars);
            }
        }
    }
    name.trim_start_matches(|c: char| c.is_ascii_digit()).to_string()
}

fn non_empty(name: String) -> Option<String> {
    (!name.is_empty()).then_some(name)
}

/// Hands out unique names: `Card`, `Card2`, `Card3`, ...
#[derive(Debug, Default)]
pub struct NameRegistry {
    used: HashSet<String>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claim(&mut self, base: String) -> String {
        if self.used.insert(base.clone()) {
            return base;
        }
        let mut suffix = 2;
        loop {
            let candidate = format!("{base}{suffix}");
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            suffix += 1;
        }
    }
}
