//! Tokenizer for expression code inside dynamic slots.
//!
//! Quoted literals never reach this lexer: the region lexer has already cut
//! them out, so every piece here is plain expression syntax.

use logos::Logos;
use std::collections::BTreeSet;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodeToken {
    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*")]
    Identifier,
    #[regex(r"\d+(\.\d+)?")]
    Number,

    #[token("?.")]
    OptionalDot,
    #[token(".")]
    Dot,
    #[token("...")]
    Spread,
    #[token("=>")]
    Arrow,

    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("{")]
    LeftBrace,
    #[token("}")]
    RightBrace,
    #[token("[")]
    LeftBracket,
    #[token("]")]
    RightBracket,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,

    #[regex(r"[-+*/%=!<>&|^~?;@#\\]")]
    Operator,

    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,
}

/// How an identifier is used in its expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WordRole {
    /// Listed in the structural keyword set
    Keyword,
    /// Property name after `.` or `?.`
    Member,
    /// Object-literal key: `{ color: c }`, `{ a, size: n }`
    Key,
    /// Any other identifier
    Bare,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodePiece<'a> {
    /// `None` for characters the tokenizer does not recognise
    pub token: Option<CodeToken>,
    pub text: &'a str,
    /// Set for identifiers only
    pub role: Option<WordRole>,
}

impl CodePiece<'_> {
    pub fn is_bare(&self) -> bool {
        self.role == Some(WordRole::Bare)
    }

    pub fn is_whitespace(&self) -> bool {
        self.token == Some(CodeToken::Whitespace)
    }
}

/// Splits slot code into pieces and classifies its identifiers.
pub fn scan_code<'a>(code: &'a str, keywords: &BTreeSet<String>) -> Vec<CodePiece<'a>> {
    let mut pieces = Vec::new();
    let mut lexer = CodeToken::lexer(code);
    let mut after_dot = false;

    while let Some(result) = lexer.next() {
        let token = result.ok();
        let text = lexer.slice();

        let role = match token {
            Some(CodeToken::Identifier) if after_dot => Some(WordRole::Member),
            Some(CodeToken::Identifier) if keywords.contains(text) => Some(WordRole::Keyword),
            Some(CodeToken::Identifier) => Some(WordRole::Bare),
            _ => None,
        };

        match token {
            Some(CodeToken::Whitespace) => {}
            Some(CodeToken::Dot) | Some(CodeToken::OptionalDot) => after_dot = true,
            _ => after_dot = false,
        }

        pieces.push(CodePiece { token, text, role });
    }

    for i in 0..pieces.len() {
        if pieces[i].role == Some(WordRole::Bare) && is_object_key(&pieces, i) {
            pieces[i].role = Some(WordRole::Key);
        }
    }

    pieces
}

/// An identifier between `{`/`,` and `:`, whitespace aside.
fn is_object_key(pieces: &[CodePiece<'_>], i: usize) -> bool {
    let before = pieces[..i]
        .iter()
        .rev()
        .find(|piece| !piece.is_whitespace())
        .and_then(|piece| piece.token);
    let after = pieces[i + 1..]
        .iter()
        .find(|piece| !piece.is_whitespace())
        .and_then(|piece| piece.token);
    matches!(before, Some(CodeToken::LeftBrace) | Some(CodeToken::Comma))
        && after == Some(CodeToken::Colon)
}
