/*!
# Normalizer

Rewrites a block's text into its canonical form and hashes it into a
[`Signature`]. The rewrite is applied in one pass over the region lexer:

1. every quoted literal becomes `$STR`, whatever its content;
2. every decimal number (markup text, attributes, slot code) becomes `$NUM`;
3. every bare identifier inside a dynamic slot becomes `$ID<n>`, where `n`
   numbers distinct names by first appearance in the block; structural
   keywords, property names after `.`/`?.` and object-literal keys stay;
4. comments are dropped and whitespace runs collapse to one space.

Numbering keeps identifier sharing in the signature: `{a} {a}` and
`{x} {y}` bind different numbers of values and never share a cluster.
A literal `$` in markup or code is written as `$$`, so raw text never
spells a placeholder.

Two blocks with equal signatures are treated as structurally equivalent.
*/

pub mod code;

use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};
use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::borrow::Cow;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::config::ExtractorConfig;
use crate::scanner::{LexemeKind, Lexer};
use code::{scan_code, CodeToken};

pub use code::{CodePiece, WordRole};

pub const STRING_PLACEHOLDER: &str = "$STR";
pub const NUMBER_PLACEHOLDER: &str = "$NUM";
pub const IDENTIFIER_PLACEHOLDER: &str = "$ID";

static NUMBER_IN_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d+(?:\.\d+)?\b").expect("valid number pattern"));

/// SHA-256 digest of a canonical form
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Signature([u8; 32]);

impl Signature {
    pub fn of(canonical: &str) -> Self {
        let digest = Sha256::digest(canonical.as_bytes());
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// First 12 hex digits, for logs and text reports
    pub fn short(&self) -> String {
        hex::encode(&self.0[..6])
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self.short())
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

pub struct Normalizer<'c> {
    self_closing_tags: &'c BTreeSet<String>,
    structural_keywords: &'c BTreeSet<String>,
}

impl<'c> Normalizer<'c> {
    pub fn new(config: &'c ExtractorConfig) -> Self {
        Self {
            self_closing_tags: &config.self_closing_tags,
            structural_keywords: &config.structural_keywords,
        }
    }

    pub fn canonical_form(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut names: HashMap<&str, usize> = HashMap::new();

        for lexeme in Lexer::new(text, self.self_closing_tags) {
            match lexeme.kind {
                LexemeKind::Text | LexemeKind::AttrText => {
                    let escaped = escape_dollars(lexeme.text);
                    let rewritten =
                        NUMBER_IN_TEXT.replace_all(&escaped, NoExpand(NUMBER_PLACEHOLDER));
                    out.push_str(&rewritten);
                }
                LexemeKind::Comment => out.push(' '),
                LexemeKind::TagStart { .. } => out.push_str(lexeme.text),
                LexemeKind::TagEnd { self_closing, .. } => {
                    out.push_str(if self_closing { "/>" } else { ">" });
                }
                LexemeKind::CloseTag { name } => {
                    out.push_str("</");
                    out.push_str(name);
                    out.push('>');
                }
                LexemeKind::Literal { .. } => out.push_str(STRING_PLACEHOLDER),
                LexemeKind::SlotOpen => out.push('{'),
                LexemeKind::SlotClose => out.push('}'),
                LexemeKind::Code => {
                    for piece in scan_code(lexeme.text, self.structural_keywords) {
                        if piece.is_bare() {
                            let next = names.len() + 1;
                            let n = *names.entry(piece.text).or_insert(next);
                            out.push_str(IDENTIFIER_PLACEHOLDER);
                            out.push_str(&n.to_string());
                        } else if piece.token == Some(CodeToken::Number) {
                            out.push_str(NUMBER_PLACEHOLDER);
                        } else {
                            out.push_str(&escape_dollars(piece.text));
                        }
                    }
                }
            }
        }

        collapse_whitespace(&out)
    }

    pub fn signature(&self, text: &str) -> Signature {
        Signature::of(&self.canonical_form(text))
    }
}

fn escape_dollars(text: &str) -> Cow<'_, str> {
    if text.contains('$') {
        Cow::Owned(text.replace('$', "$$"))
    } else {
        Cow::Borrowed(text)
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn canonical(text: &str) -> String {
        let config = ExtractorConfig::default();
        Normalizer::new(&config).canonical_form(text)
    }

    #[test]
    fn test_literals_numbers_and_identifiers() {
        assert_eq!(
            canonical(r#"<div class="card" data-n=3>{user.name} has {count + 1} items</div>"#),
            "<div class=$STR data-n=$NUM>{$ID1.name} has {$ID2 + $NUM} items</div>"
        );
    }

    #[test]
    fn test_structural_keywords_stay_literal() {
        assert_eq!(
            canonical("<ul>{items.map(item => <li key={item.id}>{item.label}</li>)}</ul>"),
            "<ul>{$ID1.map($ID2 => <li key={$ID2.id}>{$ID2.label}</li>)}</ul>"
        );
        assert_eq!(canonical("<p>{ok ? true : null}</p>"), "<p>{$ID1 ? true : null}</p>");
    }

    #[test]
    fn test_whitespace_and_comments() {
        assert_eq!(
            canonical("<div>\n   <!-- note -->\n  <span>a   b</span>\n</div>"),
            "<div> <span>a b</span> </div>"
        );
        assert_eq!(canonical("<p>{/* hint */ x}</p>"), "<p>{ $ID1}</p>");
    }

    #[test]
    fn test_self_closing_spelling_is_canonical() {
        assert_eq!(canonical("<p><br></p>"), canonical("<p><br/></p>"));
    }

    #[test]
    fn test_blocks_differing_in_literals_share_signature() {
        let config = ExtractorConfig::default();
        let normalizer = Normalizer::new(&config);
        let a = normalizer.signature(r#"<a href="/one" title='x'>{label} 1</a>"#);
        let b = normalizer.signature(r#"<a href="/two/three" title='yy'>{caption} 42</a>"#);
        assert_eq!(a, b);

        let c = normalizer.signature(r#"<a href="/one">{label.text} 1</a>"#);
        assert_ne!(a, c);
    }

    #[test]
    fn test_object_keys_stay_literal() {
        let config = ExtractorConfig::default();
        let normalizer = Normalizer::new(&config);
        assert_eq!(
            normalizer.canonical_form("<p style={{ color: tint }}>x</p>"),
            "<p style={{ color: $ID1 }}>x</p>"
        );
        assert_ne!(
            normalizer.signature("<p style={{ color: tint }}>x</p>"),
            normalizer.signature("<p style={{ margin: tint }}>x</p>")
        );
        assert_eq!(
            normalizer.signature("<p style={{ color: tint }}>x</p>"),
            normalizer.signature("<p style={{ color: shade }}>x</p>")
        );
    }

    #[test]
    fn test_shared_identifiers_are_part_of_the_signature() {
        let config = ExtractorConfig::default();
        let normalizer = Normalizer::new(&config);
        assert_eq!(canonical("<li>{a} {a}</li>"), "<li>{$ID1} {$ID1}</li>");
        assert_eq!(canonical("<li>{x} {y}</li>"), "<li>{$ID1} {$ID2}</li>");
        assert_ne!(
            normalizer.signature("<li>{a} {a}</li>"),
            normalizer.signature("<li>{x} {y}</li>")
        );
        assert_eq!(
            normalizer.signature("<li>{x} {y}</li>"),
            normalizer.signature("<li>{p} {q}</li>")
        );
    }

    #[test]
    fn test_raw_dollar_never_spells_a_placeholder() {
        assert_eq!(canonical("<p a=$STR>x</p>"), "<p a=$$STR>x</p>");
        assert_ne!(canonical("<p a=$STR>x</p>"), canonical(r#"<p a="x">x</p>"#));
        assert_ne!(canonical("<p>$NUM</p>"), canonical("<p>7</p>"));
        assert_eq!(canonical("<p>{a.$el}</p>"), "<p>{$ID1.$$el}</p>");
    }

    #[test]
    fn test_text_words_are_not_placeholders() {
        assert_ne!(canonical("<h2>Users</h2>"), canonical("<h2>Orders</h2>"));
        assert_eq!(canonical("<h2>Level h1</h2>"), "<h2>Level h1</h2>");
    }

    #[test]
    fn test_signature_hex() {
        let signature = Signature::of("<p></p>");
        assert_eq!(signature.to_hex().len(), 64);
        assert!(signature.to_hex().starts_with(&signature.short()));
        assert_eq!(
            serde_json::to_string(&signature).unwrap(),
            format!("\"{}\"", signature)
        );
    }
}
