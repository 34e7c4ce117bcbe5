/*!
# Variable Analyzer

Finds the identifiers referenced from a block's dynamic slots.

Every bare identifier (the positions the normalizer turns into `$ID<n>`)
is numbered in document order. Blocks sharing a signature have the same
number of bare identifiers in the same places and repeat names at the same
places, so an ordinal taken from one member points at the corresponding
identifier in every other member. Object-literal keys are not bare.

Bare identifiers are split into:

- **references**: candidate component parameters;
- **locals**: arrow-function parameters (`x =>`, `(a, b) =>`), bound inside
  the block itself.
*/

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::config::ExtractorConfig;
use crate::normalizer::code::{scan_code, CodePiece, CodeToken};
use crate::scanner::{LexemeKind, Lexer};

/// How a bare slot identifier is used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SlotUsage {
    Reference,
    Local,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotIdentifier {
    pub name: String,
    /// Index among all bare identifiers of the block
    pub ordinal: usize,
    pub usage: SlotUsage,
}

/// Advisory role of a parameter, guessed from its name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleHint {
    Entity,
    Flag,
    Callback,
    Collection,
    Count,
    Text,
    Value,
}

const CALLBACK_SUFFIXES: &[&str] = &["handler", "callback", "listener", "fn", "cb"];
const FLAG_PREFIXES: &[&str] = &["is", "has", "can", "should", "show", "hide", "enable", "disable"];
const FLAG_WORDS: &[&str] = &[
    "visible", "open", "active", "selected", "checked", "loading", "disabled", "enabled", "expanded",
];
const COUNT_SUFFIXES: &[&str] = &["count", "total", "size", "length", "index", "idx", "page", "num"];
const COLLECTION_SUFFIXES: &[&str] = &["list", "items", "array", "rows", "collection", "set"];
const TEXT_SUFFIXES: &[&str] = &[
    "title", "label", "text", "name", "message", "caption", "description", "placeholder", "heading",
    "content", "url", "href", "src",
];
const ENTITY_SUFFIXES: &[&str] = &[
    "user", "item", "product", "order", "account", "customer", "record", "entry", "post", "model",
    "profile", "data", "row", "node",
];

impl RoleHint {
    /// Guesses a role from camelCase/snake_case naming cues.
    pub fn infer(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        let ends = |suffixes: &[&str]| suffixes.iter().any(|s| lower.ends_with(s));

        if has_word_prefix(name, "on") || has_word_prefix(name, "handle") || ends(CALLBACK_SUFFIXES) {
            RoleHint::Callback
        } else if FLAG_PREFIXES.iter().any(|p| has_word_prefix(name, p))
            || FLAG_WORDS.contains(&lower.as_str())
        {
            RoleHint::Flag
        } else if ends(COUNT_SUFFIXES) || lower.starts_with("num") {
            RoleHint::Count
        } else if ends(COLLECTION_SUFFIXES) || is_plural(&lower) {
            RoleHint::Collection
        } else if ends(TEXT_SUFFIXES) {
            RoleHint::Text
        } else if ends(ENTITY_SUFFIXES) {
            RoleHint::Entity
        } else {
            RoleHint::Value
        }
    }
}

impl fmt::Display for RoleHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RoleHint::Entity => "entity",
            RoleHint::Flag => "flag",
            RoleHint::Callback => "callback",
            RoleHint::Collection => "collection",
            RoleHint::Count => "count",
            RoleHint::Text => "text",
            RoleHint::Value => "value",
        };
        f.write_str(label)
    }
}

/// `onClick`, `on_click`, `isOpen`: the prefix followed by a word boundary.
fn has_word_prefix(name: &str, prefix: &str) -> bool {
    name.len() > prefix.len()
        && name.starts_with(prefix)
        && name[prefix.len()..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_uppercase() || c == '_')
}

fn is_plural(lower: &str) -> bool {
    lower.len() > 3 && lower.ends_with('s') && !lower.ends_with("ss") && !lower.ends_with("us")
}

/// A component parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    pub name: String,
    pub role_hint: RoleHint,
}

impl Variable {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let role_hint = RoleHint::infer(&name);
        Self { name, role_hint }
    }
}

pub struct VariableAnalyzer<'c> {
    self_closing_tags: &'c BTreeSet<String>,
    structural_keywords: &'c BTreeSet<String>,
}

impl<'c> VariableAnalyzer<'c> {
    pub fn new(config: &'c ExtractorConfig) -> Self {
        Self {
            self_closing_tags: &config.self_closing_tags,
            structural_keywords: &config.structural_keywords,
        }
    }

    /// All bare slot identifiers of `text`, in document order.
    pub fn slot_identifiers(&self, text: &str) -> Vec<SlotIdentifier> {
        let mut identifiers = Vec::new();

        for lexeme in Lexer::new(text, self.self_closing_tags) {
            if lexeme.kind != LexemeKind::Code {
                continue;
            }
            let pieces: Vec<CodePiece<'_>> = scan_code(lexeme.text, self.structural_keywords)
                .into_iter()
                .filter(|piece| !piece.is_whitespace())
                .collect();
            let locals = arrow_parameters(&pieces);

            for (i, piece) in pieces.iter().enumerate() {
                if !piece.is_bare() {
                    continue;
                }
                let usage = if locals[i] {
                    SlotUsage::Local
                } else {
                    SlotUsage::Reference
                };
                identifiers.push(SlotIdentifier {
                    name: piece.text.to_string(),
                    ordinal: identifiers.len(),
                    usage,
                });
            }
        }

        identifiers
    }

    /// Referenced identifiers of `text`, deduplicated and sorted by name.
    /// A name bound as a local anywhere in the block is never a reference.
    pub fn variables(&self, text: &str) -> Vec<Variable> {
        reference_ordinals(&self.slot_identifiers(text))
            .into_keys()
            .map(Variable::new)
            .collect()
    }
}

/// First ordinal of every referenced name, keyed by name.
pub fn reference_ordinals(identifiers: &[SlotIdentifier]) -> BTreeMap<String, usize> {
    let locals: BTreeSet<&str> = identifiers
        .iter()
        .filter(|id| id.usage == SlotUsage::Local)
        .map(|id| id.name.as_str())
        .collect();

    let mut references = BTreeMap::new();
    for id in identifiers {
        if id.usage == SlotUsage::Reference && !locals.contains(id.name.as_str()) {
            references.entry(id.name.clone()).or_insert(id.ordinal);
        }
    }
    references
}

/// Marks identifiers bound by `x =>` and `(a, b) =>`.
fn arrow_parameters(pieces: &[CodePiece<'_>]) -> Vec<bool> {
    let mut locals = vec![false; pieces.len()];

    for i in 1..pieces.len() {
        if pieces[i].token != Some(CodeToken::Arrow) {
            continue;
        }
        let prev = i - 1;
        match pieces[prev].token {
            Some(CodeToken::Identifier) => locals[prev] = true,
            Some(CodeToken::RightParen) => {
                let mut depth = 0usize;
                let mut j = prev;
                loop {
                    match pieces[j].token {
                        Some(CodeToken::RightParen) => depth += 1,
                        Some(CodeToken::LeftParen) => {
                            depth = depth.saturating_sub(1);
                            if depth == 0 {
                                break;
                            }
                        }
                        Some(CodeToken::Identifier) => locals[j] = true,
                        _ => {}
                    }
                    if j == 0 {
                        break;
                    }
                    j -= 1;
                }
            }
            _ => {}
        }
    }

    locals
}
