/*!
# Scanner

Lazy tag-event stream over a document. Built on the region lexer, so quoted
literals (single, double and template) are opaque: tag-like text inside them
never produces an event.

```rust,ignore
let config = ExtractorConfig::default();
let events: Vec<Event> = Scanner::new(text, &config.self_closing_tags).collect();
```
*/

pub mod lexer;

pub use lexer::{Lexeme, LexemeKind, Lexer};

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Kind of a tag event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EventKind {
    OpenTag,
    CloseTag,
    SelfClose,
}

/// Tag event. `offset` is the position of `<`, `end` the position just past `>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Event<'a> {
    pub kind: EventKind,
    pub name: &'a str,
    pub offset: usize,
    pub end: usize,
}

impl fmt::Display for Event<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            EventKind::OpenTag => write!(f, "<{}> @{}", self.name, self.offset),
            EventKind::CloseTag => write!(f, "</{}> @{}", self.name, self.offset),
            EventKind::SelfClose => write!(f, "<{}/> @{}", self.name, self.offset),
        }
    }
}

/// Per-document scanner owning its cursor and mode stack.
pub struct Scanner<'a> {
    text: &'a str,
    self_closing_tags: &'a BTreeSet<String>,
    lexer: Lexer<'a>,
    pending: Option<(&'a str, usize)>,
}

impl<'a> Scanner<'a> {
    pub fn new(text: &'a str, self_closing_tags: &'a BTreeSet<String>) -> Self {
        Self {
            text,
            self_closing_tags,
            lexer: Lexer::new(text, self_closing_tags),
            pending: None,
        }
    }

    /// Restart from offset 0. The event sequence is identical on every pass.
    pub fn reset(&mut self) {
        self.lexer = Lexer::new(self.text, self.self_closing_tags);
        self.pending = None;
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Event<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        for lexeme in self.lexer.by_ref() {
            match lexeme.kind {
                LexemeKind::TagStart { name } => {
                    self.pending = Some((name, lexeme.start));
                }
                LexemeKind::TagEnd { self_closing, .. } => {
                    let Some((name, offset)) = self.pending.take() else {
                        continue;
                    };
                    let kind = if self_closing {
                        EventKind::SelfClose
                    } else {
                        EventKind::OpenTag
                    };
                    return Some(Event {
                        kind,
                        name,
                        offset,
                        end: lexeme.end,
                    });
                }
                LexemeKind::CloseTag { name } => {
                    return Some(Event {
                        kind: EventKind::CloseTag,
                        name,
                        offset: lexeme.start,
                        end: lexeme.end,
                    });
                }
                _ => {}
            }
        }
        None
    }
}
