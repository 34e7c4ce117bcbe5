/*!
# Region Lexer

String-aware lexer over block-structured markup. It splits a document into
regions (markup text, tags, quoted literals, dynamic slots) while honouring
quoting context, so that tag-like text inside a literal is never seen as a tag.

The lexer runs a mode stack:

- **Markup**: text between tags. Quotes are plain characters here (an
  apostrophe in prose must not swallow the rest of the document).
- **Tag**: the inside of `<name ... >`. Attribute values are literals;
  `{...}` attribute expressions are slots.
- **Slot**: the inside of `{...}`. Strings, template literals and comments
  are opaque; JSX elements may open here and push a Markup frame that their
  own close tag pops again.

Offsets are byte offsets. Every delimiter is ASCII, so all slicing happens on
character boundaries.
*/

use std::collections::BTreeSet;

/// Elements whose content is raw text up to their close tag.
const RAWTEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Kind of a lexical region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexemeKind<'a> {
    /// Markup text between tags
    Text,
    /// `<!-- -->`, `<!doctype>`, `<? ?>` in markup; `/* */` and `//` in slots
    Comment,
    /// `<name` (empty name for a `<>` fragment)
    TagStart { name: &'a str },
    /// Attribute names, `=`, whitespace and unquoted values inside a tag
    AttrText,
    /// `>` or `/>`; `self_closing` covers both the explicit marker and void elements
    TagEnd { self_closing: bool, explicit: bool },
    /// `</name>` (empty name for a `</>` fragment)
    CloseTag { name: &'a str },
    /// A quoted literal including its delimiters
    Literal { quote: u8 },
    /// `{` opening a dynamic slot
    SlotOpen,
    /// `}` closing a dynamic slot
    SlotClose,
    /// Expression text inside a slot
    Code,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lexeme<'a> {
    pub kind: LexemeKind<'a>,
    pub start: usize,
    pub end: usize,
    pub text: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode<'a> {
    /// `element` is `None` only for the root frame
    Markup { element: Option<&'a str> },
    Tag { name: &'a str },
    Slot { depth: usize },
}

/// Lazy region lexer. Constructing it again over the same text yields the same stream.
pub struct Lexer<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    modes: Vec<Mode<'a>>,
    rawtext: Option<&'a str>,
    self_closing_tags: &'a BTreeSet<String>,
}

impl<'a> Lexer<'a> {
    pub fn new(text: &'a str, self_closing_tags: &'a BTreeSet<String>) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
            modes: vec![Mode::Markup { element: None }],
            rawtext: None,
            self_closing_tags,
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    fn mode(&self) -> Mode<'a> {
        self.modes
            .last()
            .copied()
            .unwrap_or(Mode::Markup { element: None })
    }

    fn emit(&mut self, kind: LexemeKind<'a>, start: usize, end: usize) -> Lexeme<'a> {
        self.pos = end;
        Lexeme {
            kind,
            start,
            end,
            text: &self.text[start..end],
        }
    }

    fn byte(&self, i: usize) -> Option<u8> {
        self.bytes.get(i).copied()
    }

    fn starts_with_at(&self, i: usize, pat: &str) -> bool {
        self.bytes
            .get(i..i + pat.len())
            .is_some_and(|s| s == pat.as_bytes())
    }

    fn find_from(&self, i: usize, pat: &str) -> Option<usize> {
        self.text.get(i..)?.find(pat).map(|rel| i + rel)
    }

    fn is_name_byte(b: u8) -> bool {
        b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':' | b'.' | b'$')
    }

    fn scan_name(&self, from: usize) -> usize {
        let mut i = from;
        while i < self.bytes.len() && Self::is_name_byte(self.bytes[i]) {
            i += 1;
        }
        i
    }

    /// `<` at `i` starts an open tag (`<name` or the `<>` fragment).
    fn opens_tag(&self, i: usize) -> bool {
        match self.byte(i + 1) {
            Some(b) => b.is_ascii_alphabetic() || b == b'>',
            None => false,
        }
    }

    /// `<` at `i` starts a close tag (`</name` or the `</>` fragment).
    fn closes_tag(&self, i: usize) -> bool {
        self.byte(i + 1) == Some(b'/')
            && match self.byte(i + 2) {
                Some(b) => b.is_ascii_alphabetic() || b == b'>',
                None => false,
            }
    }

    /// `<` at `i` starts a comment or a directive.
    fn opens_comment(&self, i: usize) -> bool {
        matches!(self.byte(i + 1), Some(b'!') | Some(b'?'))
    }

    /// Inside a slot, `<` only starts an element where an expression may begin.
    fn jsx_allowed(&self, i: usize) -> bool {
        let before = self.text[..i].trim_end();
        match before.as_bytes().last() {
            None => true,
            Some(b) if b"({[,?:&|=>!".contains(b) => true,
            Some(_) => before.ends_with("return") && {
                let head = &before[..before.len() - "return".len()];
                !head
                    .as_bytes()
                    .last()
                    .is_some_and(|&b| Self::is_name_byte(b))
            },
        }
    }

    /// End offset (exclusive) of the quoted literal starting at `start`.
    /// Unterminated literals run to the end of input.
    fn scan_quoted(&self, start: usize, quote: u8) -> usize {
        let len = self.bytes.len();
        let mut i = start + 1;
        while i < len {
            match self.bytes[i] {
                b'\\' => i += 2,
                b if b == quote => return i + 1,
                b'$' if quote == b'`' && self.byte(i + 1) == Some(b'{') => {
                    i = self.scan_template_expr(i + 2);
                }
                _ => i += 1,
            }
        }
        len
    }

    /// Skips a `${...}` template substitution whose body starts at `from`.
    fn scan_template_expr(&self, from: usize) -> usize {
        let len = self.bytes.len();
        let mut depth = 1usize;
        let mut i = from;
        while i < len {
            match self.bytes[i] {
                q @ (b'\'' | b'"' | b'`') => i = self.scan_quoted(i, q),
                b'{' => {
                    depth += 1;
                    i += 1;
                }
                b'}' => {
                    depth -= 1;
                    i += 1;
                    if depth == 0 {
                        return i;
                    }
                }
                _ => i += 1,
            }
        }
        len
    }

    /// End offset of the regex literal `/.../flags` starting at `start`, or `None`
    /// when no closing `/` follows on the same line.
    fn scan_regex(&self, start: usize) -> Option<usize> {
        let len = self.bytes.len();
        let mut in_class = false;
        let mut i = start + 1;
        while i < len {
            match self.bytes[i] {
                b'\n' => return None,
                b'\\' => i += 2,
                b'[' => {
                    in_class = true;
                    i += 1;
                }
                b']' => {
                    in_class = false;
                    i += 1;
                }
                b'/' if !in_class => {
                    if i == start + 1 {
                        return None;
                    }
                    let mut end = i + 1;
                    while end < len && self.bytes[end].is_ascii_alphabetic() {
                        end += 1;
                    }
                    return Some(end);
                }
                _ => i += 1,
            }
        }
        None
    }

    fn lex_comment_in_markup(&mut self, start: usize) -> Lexeme<'a> {
        let end = if self.starts_with_at(start, "<!--") {
            self.find_from(start + 4, "-->")
                .map(|i| i + 3)
                .unwrap_or(self.bytes.len())
        } else {
            self.find_from(start, ">")
                .map(|i| i + 1)
                .unwrap_or(self.bytes.len())
        };
        self.emit(LexemeKind::Comment, start, end)
    }

    fn lex_tag_start(&mut self, start: usize) -> Lexeme<'a> {
        let name_end = self.scan_name(start + 1);
        let name = &self.text[start + 1..name_end];
        self.modes.push(Mode::Tag { name });
        self.emit(LexemeKind::TagStart { name }, start, name_end)
    }

    fn lex_close_tag(&mut self, start: usize) -> Option<Lexeme<'a>> {
        let name_end = self.scan_name(start + 2);
        let name = &self.text[start + 2..name_end];
        let Some(gt) = self.find_from(name_end, ">") else {
            // unterminated close tag: the rest of input is text
            let end = self.bytes.len();
            return Some(self.emit(LexemeKind::Text, start, end));
        };
        self.pop_element(name);
        Some(self.emit(LexemeKind::CloseTag { name }, start, gt + 1))
    }

    /// Pops the Markup frame opened by `name` (and anything above it) when the
    /// element was opened from inside a slot. Root markup is never popped.
    fn pop_element(&mut self, name: &str) {
        let mut idx = self.modes.len();
        while idx > 1 {
            idx -= 1;
            match self.modes[idx] {
                Mode::Markup { element: Some(open) } if open.eq_ignore_ascii_case(name) => {
                    self.modes.truncate(idx);
                    return;
                }
                Mode::Markup { element: Some(_) } => continue,
                _ => return,
            }
        }
    }

    fn next_in_markup(&mut self) -> Option<Lexeme<'a>> {
        let start = self.pos;
        let len = self.bytes.len();

        if let Some(raw) = self.rawtext.take() {
            let close = self.find_rawtext_close(start, raw).unwrap_or(len);
            if close > start {
                return Some(self.emit(LexemeKind::Text, start, close));
            }
        }

        match self.bytes[start] {
            b'<' if self.closes_tag(start) => return self.lex_close_tag(start),
            b'<' if self.opens_tag(start) => return Some(self.lex_tag_start(start)),
            b'<' if self.opens_comment(start) => return Some(self.lex_comment_in_markup(start)),
            b'{' => {
                self.modes.push(Mode::Slot { depth: 0 });
                return Some(self.emit(LexemeKind::SlotOpen, start, start + 1));
            }
            _ => {}
        }

        let mut i = start + 1;
        while i < len {
            match self.bytes[i] {
                b'{' => break,
                b'<' if self.closes_tag(i) || self.opens_tag(i) || self.opens_comment(i) => break,
                _ => i += 1,
            }
        }
        Some(self.emit(LexemeKind::Text, start, i))
    }

    fn find_rawtext_close(&self, from: usize, name: &str) -> Option<usize> {
        let mut i = from;
        while let Some(lt) = self.find_from(i, "</") {
            let candidate = lt + 2;
            let matches = self
                .text
                .get(candidate..candidate + name.len())
                .is_some_and(|s| s.eq_ignore_ascii_case(name));
            if matches && !self.byte(candidate + name.len()).is_some_and(Self::is_name_byte) {
                return Some(lt);
            }
            i = candidate;
        }
        None
    }

    fn next_in_tag(&mut self, name: &'a str) -> Option<Lexeme<'a>> {
        let start = self.pos;
        let len = self.bytes.len();
        match self.bytes[start] {
            q @ (b'"' | b'\'' | b'`') => {
                let end = self.scan_quoted(start, q);
                return Some(self.emit(LexemeKind::Literal { quote: q }, start, end));
            }
            b'{' => {
                self.modes.push(Mode::Slot { depth: 0 });
                return Some(self.emit(LexemeKind::SlotOpen, start, start + 1));
            }
            b'>' => return Some(self.finish_tag(name, start, start + 1, false)),
            b'/' if self.byte(start + 1) == Some(b'>') => {
                return Some(self.finish_tag(name, start, start + 2, true));
            }
            _ => {}
        }

        let mut i = start + 1;
        while i < len {
            match self.bytes[i] {
                b'"' | b'\'' | b'`' | b'{' | b'>' => break,
                b'/' if self.byte(i + 1) == Some(b'>') => break,
                _ => i += 1,
            }
        }
        Some(self.emit(LexemeKind::AttrText, start, i))
    }

    fn finish_tag(&mut self, name: &'a str, start: usize, end: usize, explicit: bool) -> Lexeme<'a> {
        self.modes.pop();
        let self_closing = explicit || self.self_closing_tags.contains(name);
        if !self_closing {
            if RAWTEXT_ELEMENTS
                .iter()
                .any(|raw| raw.eq_ignore_ascii_case(name))
            {
                self.rawtext = Some(name);
            }
            if self.modes.len() > 1 {
                self.modes.push(Mode::Markup {
                    element: Some(name),
                });
            }
        }
        self.emit(
            LexemeKind::TagEnd {
                self_closing,
                explicit,
            },
            start,
            end,
        )
    }

    fn next_in_slot(&mut self, depth: usize) -> Option<Lexeme<'a>> {
        let start = self.pos;
        let len = self.bytes.len();
        match self.bytes[start] {
            q @ (b'"' | b'\'' | b'`') => {
                let end = self.scan_quoted(start, q);
                return Some(self.emit(LexemeKind::Literal { quote: q }, start, end));
            }
            b'/' if self.byte(start + 1) == Some(b'*') => {
                let end = self
                    .find_from(start + 2, "*/")
                    .map(|i| i + 2)
                    .unwrap_or(len);
                return Some(self.emit(LexemeKind::Comment, start, end));
            }
            b'/' if self.byte(start + 1) == Some(b'/') => {
                let end = self.find_from(start, "\n").unwrap_or(len);
                return Some(self.emit(LexemeKind::Comment, start, end));
            }
            b'}' if depth == 0 => {
                self.modes.pop();
                return Some(self.emit(LexemeKind::SlotClose, start, start + 1));
            }
            b'/' if self.jsx_allowed(start) => {
                if let Some(end) = self.scan_regex(start) {
                    return Some(self.emit(LexemeKind::Literal { quote: b'/' }, start, end));
                }
            }
            b'<' if self.jsx_allowed(start) && self.closes_tag(start) => {
                return self.lex_close_tag(start);
            }
            b'<' if self.jsx_allowed(start) && self.opens_tag(start) => {
                return Some(self.lex_tag_start(start));
            }
            _ => {}
        }

        let mut depth = depth;
        let mut i = start;
        while i < len {
            match self.bytes[i] {
                b'"' | b'\'' | b'`' => break,
                b'/' if matches!(self.byte(i + 1), Some(b'*') | Some(b'/')) => break,
                b'/' if i > start && self.jsx_allowed(i) && self.scan_regex(i).is_some() => break,
                b'{' => {
                    depth += 1;
                    i += 1;
                }
                b'}' if depth == 0 => break,
                b'}' => {
                    depth -= 1;
                    i += 1;
                }
                b'<' if i > start
                    && self.jsx_allowed(i)
                    && (self.opens_tag(i) || self.closes_tag(i)) =>
                {
                    break
                }
                _ => i += 1,
            }
        }
        if let Some(Mode::Slot { depth: d }) = self.modes.last_mut() {
            *d = depth;
        }
        Some(self.emit(LexemeKind::Code, start, i))
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Lexeme<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.bytes.len() {
            return None;
        }
        match self.mode() {
            Mode::Markup { .. } => self.next_in_markup(),
            Mode::Tag { name } => self.next_in_tag(name),
            Mode::Slot { depth } => self.next_in_slot(depth),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<String> {
        let void: BTreeSet<String> = ["br".to_string()].into_iter().collect();
        Lexer::new(text, &void)
            .map(|lx| match lx.kind {
                LexemeKind::Text => format!("text:{}", lx.text),
                LexemeKind::Comment => "comment".to_string(),
                LexemeKind::TagStart { name } => format!("<{}", name),
                LexemeKind::AttrText => format!("attr:{}", lx.text),
                LexemeKind::TagEnd { self_closing, .. } => {
                    if self_closing { "/>".to_string() } else { ">".to_string() }
                }
                LexemeKind::CloseTag { name } => format!("</{}>", name),
                LexemeKind::Literal { .. } => format!("lit:{}", lx.text),
                LexemeKind::SlotOpen => "{".to_string(),
                LexemeKind::SlotClose => "}".to_string(),
                LexemeKind::Code => format!("code:{}", lx.text),
            })
            .collect()
    }

    #[test]
    fn test_simple_element() {
        assert_eq!(
            kinds(r#"<p class="a">Hi</p>"#),
            vec!["<p", "attr: class=", r#"lit:"a""#, ">", "text:Hi", "</p>"]
        );
    }

    #[test]
    fn test_apostrophe_in_text_is_not_a_literal() {
        assert_eq!(
            kinds("<p>Don't</p><b>x</b>"),
            vec!["<p", ">", "text:Don't", "</p>", "<b", ">", "text:x", "</b>"]
        );
    }

    #[test]
    fn test_literal_in_slot_is_opaque() {
        assert_eq!(
            kinds(r#"{"<i>x</i>"}"#),
            vec!["{", r#"lit:"<i>x</i>""#, "}"]
        );
    }

    #[test]
    fn test_escaped_quote_in_literal() {
        assert_eq!(
            kinds(r#"{"a\"<b>"}"#),
            vec!["{", r#"lit:"a\"<b>""#, "}"]
        );
    }

    #[test]
    fn test_template_literal_with_substitution() {
        let text = "{`<b>${ {a: '}'}.a }</b>`}";
        assert_eq!(kinds(text), vec!["{", "lit:`<b>${ {a: '}'}.a }</b>`", "}"]);
    }

    #[test]
    fn test_arrow_in_attribute_slot_does_not_end_tag() {
        assert_eq!(
            kinds("<a onClick={() => go(1)}>x</a>"),
            vec!["<a", "attr: onClick=", "{", "code:() => go(1)", "}", ">", "text:x", "</a>"]
        );
    }

    #[test]
    fn test_jsx_inside_slot() {
        assert_eq!(
            kinds("{ok && <b>it's</b>}"),
            vec!["{", "code:ok && ", "<b", ">", "text:it's", "</b>", "}"]
        );
    }

    #[test]
    fn test_comparison_is_not_a_tag() {
        assert_eq!(kinds("{a <b}"), vec!["{", "code:a <b", "}"]);
    }

    #[test]
    fn test_void_and_explicit_self_close() {
        assert_eq!(kinds("<br><i/>"), vec!["<br", "/>", "<i", "/>"]);
    }

    #[test]
    fn test_comment_hides_tags() {
        assert_eq!(
            kinds("<!-- <div> --><p></p>"),
            vec!["comment", "<p", ">", "</p>"]
        );
    }

    #[test]
    fn test_script_is_raw_text() {
        assert_eq!(
            kinds("<script>if (a < b) { x('<p>') }</script>"),
            vec!["<script", ">", "text:if (a < b) { x('<p>') }", "</script>"]
        );
    }

    #[test]
    fn test_fragment() {
        assert_eq!(kinds("<></>"), vec!["<", ">", "</>"]);
    }

    #[test]
    fn test_nested_braces_stay_in_code() {
        assert_eq!(
            kinds("<a style={{ color: c }}/>"),
            vec!["<a", "attr: style=", "{", "code:{ color: c }", "}", "/>"]
        );
    }

    #[test]
    fn test_regex_literal_in_slot_is_opaque() {
        assert_eq!(
            kinds(r#"{s.replace(/'/g, "")}"#),
            vec!["{", "code:s.replace(", "lit:/'/g", "code:, ", r#"lit:"""#, "code:)", "}"]
        );
        assert_eq!(
            kinds(r"{ok && /[/}]\//.test(s)}"),
            vec!["{", "code:ok && ", r"lit:/[/}]\//", "code:.test(s)", "}"]
        );
    }

    #[test]
    fn test_division_is_not_a_regex() {
        assert_eq!(kinds("{a / b / c}"), vec!["{", "code:a / b / c", "}"]);
        assert_eq!(kinds("{(x) / 2}"), vec!["{", "code:(x) / 2", "}"]);
    }

    #[test]
    fn test_close_tag_matches_open_frame_ignoring_case() {
        assert_eq!(
            kinds("{<Item>x</item>}"),
            vec!["{", "<Item", ">", "text:x", "</item>", "}"]
        );
    }

    #[test]
    fn test_multiline_template_literal_is_opaque() {
        let text = "{`first <b>\n  second</b> <i>\n  third`}";
        assert_eq!(
            kinds(text),
            vec!["{", "lit:`first <b>\n  second</b> <i>\n  third`", "}"]
        );
    }

    #[test]
    fn test_restartable() {
        let void = BTreeSet::new();
        let text = "<div>{'<p>'}<span/></div>";
        let first: Vec<_> = Lexer::new(text, &void).collect();
        let second: Vec<_> = Lexer::new(text, &void).collect();
        assert_eq!(first, second);
    }
}
