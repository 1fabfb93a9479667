//! Tolerant single-pass scanner for TypeScript/JavaScript with JSX.
//!
//! The scanner does not build a full syntax tree. It walks the text once and
//! records the constructs the checkers inspect: JSX elements with their
//! attributes and children, calls, string literals, imports and comments.
//! Nodes are emitted in depth-first pre-order; parents reserve a slot before
//! their children are scanned and fill it once complete.

use super::node::*;
use super::ParseError;
use std::path::Path;

/// Keywords after which an expression (and so JSX or a regex) may start
const EXPRESSION_KEYWORDS: &[&str] = &[
    "return", "yield", "default", "case", "else", "do", "typeof", "void", "delete", "in", "of",
    "throw", "await", "instanceof", "new",
];

/// Words followed by `(` that do not form a call
const NON_CALL_WORDS: &[&str] = &[
    "if", "for", "while", "switch", "catch", "function", "return", "typeof", "await", "with",
    "yield", "void", "delete", "in", "of", "instanceof", "constructor", "super",
];

pub(crate) struct ScanOutput {
    pub nodes: Vec<Node>,
    pub comments: Vec<Span>,
}

/// Scan script text. `jsx` enables JSX recognition (tsx/jsx/js files).
pub(crate) fn scan(
    path: &Path,
    text: &str,
    line_starts: &[usize],
    jsx: bool,
) -> Result<ScanOutput, ParseError> {
    let mut scanner = Scanner {
        path,
        src: text,
        b: text.as_bytes(),
        pos: 0,
        line_starts,
        jsx,
        slots: Vec::new(),
        comments: Vec::new(),
        calls: Vec::new(),
        elements: Vec::new(),
        prev: Prev::Start,
        pending_new: false,
    };

    match scanner.code(false) {
        Ok(()) | Err(Fail::Backtrack) => {}
        Err(Fail::Error(e)) => return Err(e),
    }

    Ok(ScanOutput {
        nodes: scanner.slots.into_iter().flatten().collect(),
        comments: scanner.comments,
    })
}

/// Block comments in a stylesheet
pub(crate) fn stylesheet_comments(text: &str) -> Vec<Span> {
    let mut comments = Vec::new();
    let mut from = 0;
    while let Some(rel) = text[from..].find("/*") {
        let start = from + rel;
        let end = text[start + 2..]
            .find("*/")
            .map(|e| start + 2 + e + 2)
            .unwrap_or(text.len());
        comments.push(Span::new(start, end));
        from = end;
    }
    comments
}

/// Previous significant token, used to tell `<` and `/` apart
#[derive(Debug, Clone, PartialEq)]
enum Prev {
    Start,
    Punct(u8),
    Arrow,
    Word(String),
    Value,
}

impl Prev {
    fn expression_allowed(&self) -> bool {
        match self {
            Prev::Start | Prev::Arrow => true,
            Prev::Punct(c) => b"(,=:?&|{}[!;+-*%~^<>".contains(c),
            Prev::Word(w) => EXPRESSION_KEYWORDS.contains(&w.as_str()),
            Prev::Value => false,
        }
    }
}

enum Fail {
    /// Not JSX after all; rewind and treat `<` as an operator
    Backtrack,
    Error(ParseError),
}

struct Snapshot {
    pos: usize,
    slots: usize,
    comments: usize,
    calls: usize,
    elements: usize,
    prev: Prev,
}

struct Scanner<'a> {
    path: &'a Path,
    src: &'a str,
    b: &'a [u8],
    pos: usize,
    line_starts: &'a [usize],
    jsx: bool,
    slots: Vec<Option<Node>>,
    comments: Vec<Span>,
    /// Open parentheses; `Some(callee)` when the paren started a call
    calls: Vec<Option<String>>,
    /// Open JSX elements
    elements: Vec<String>,
    prev: Prev,
    pending_new: bool,
}

fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_' || c == b'$'
}

fn is_ident_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_' || c == b'$'
}

impl<'a> Scanner<'a> {
    fn peek(&self, offset: usize) -> Option<u8> {
        self.b.get(self.pos + offset).copied()
    }

    fn line_col(&self, offset: usize) -> (usize, usize) {
        let idx = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        };
        let start = self.line_starts.get(idx).copied().unwrap_or(0);
        (idx + 1, offset - start + 1)
    }

    fn error(&self, offset: usize, message: impl Into<String>) -> Fail {
        Fail::Error(ParseError::Syntax {
            path: self.path.to_path_buf(),
            line: self.line_col(offset).0,
            message: message.into(),
        })
    }

    fn reserve(&mut self) -> usize {
        self.slots.push(None);
        self.slots.len() - 1
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            pos: self.pos,
            slots: self.slots.len(),
            comments: self.comments.len(),
            calls: self.calls.len(),
            elements: self.elements.len(),
            prev: self.prev.clone(),
        }
    }

    fn restore(&mut self, snap: Snapshot) {
        self.pos = snap.pos;
        self.slots.truncate(snap.slots);
        self.comments.truncate(snap.comments);
        self.calls.truncate(snap.calls);
        self.elements.truncate(snap.elements);
        self.prev = snap.prev;
    }

    fn skip_ws_from(&self, mut p: usize) -> usize {
        while p < self.b.len() && self.b[p].is_ascii_whitespace() {
            p += 1;
        }
        p
    }

    fn ident_at(&self, p: usize) -> Option<(&'a str, usize)> {
        if p < self.b.len() && is_ident_start(self.b[p]) {
            let mut end = p + 1;
            while end < self.b.len() && is_ident_char(self.b[end]) {
                end += 1;
            }
            Some((&self.src[p..end], end))
        } else {
            None
        }
    }

    /// Read a quoted script string at `p`. Returns the unescaped value and
    /// the offset past the closing quote, or `None` if unterminated.
    fn string_at(&self, p: usize) -> Option<(String, usize)> {
        let quote = *self.b.get(p)?;
        let mut value = String::new();
        let mut i = p + 1;
        let mut run = i;
        while i < self.b.len() {
            match self.b[i] {
                b'\\' => {
                    value.push_str(&self.src[run..i]);
                    let next = *self.b.get(i + 1)?;
                    match next {
                        b'n' => value.push('\n'),
                        b't' => value.push('\t'),
                        b'\n' => {}
                        _ => {
                            let ch = self.src[i + 1..].chars().next()?;
                            value.push(ch);
                            i += ch.len_utf8() - 1;
                        }
                    }
                    i += 2;
                    run = i;
                }
                b'\n' => return None,
                c if c == quote => {
                    value.push_str(&self.src[run..i]);
                    return Some((value, i + 1));
                }
                _ => i += 1,
            }
        }
        None
    }

    /// Scan code until end of input, or until the brace closing the current
    /// expression container when `until_brace` is set.
    fn code(&mut self, until_brace: bool) -> Result<(), Fail> {
        let open = self.pos.saturating_sub(1);
        let call_base = self.calls.len();
        let mut depth = 0usize;

        loop {
            let Some(c) = self.peek(0) else {
                if until_brace {
                    return Err(self.error(open, "unterminated expression"));
                }
                return Ok(());
            };

            match c {
                c if c.is_ascii_whitespace() => self.pos += 1,
                b'/' if self.peek(1) == Some(b'/') => {
                    let start = self.pos;
                    let end = self.src[start..]
                        .find('\n')
                        .map(|e| start + e)
                        .unwrap_or(self.b.len());
                    self.comments.push(Span::new(start, end));
                    self.pos = end;
                }
                b'/' if self.peek(1) == Some(b'*') => {
                    let start = self.pos;
                    let end = self.src[start + 2..]
                        .find("*/")
                        .map(|e| start + 2 + e + 2)
                        .unwrap_or(self.b.len());
                    self.comments.push(Span::new(start, end));
                    self.pos = end;
                }
                b'/' => {
                    if self.prev.expression_allowed() {
                        self.regex();
                    } else {
                        self.pos += 1;
                        self.prev = Prev::Punct(b'/');
                    }
                }
                b'"' | b'\'' => self.string()?,
                b'`' => self.template()?,
                b'{' => {
                    depth += 1;
                    self.pos += 1;
                    self.prev = Prev::Punct(b'{');
                }
                b'}' => {
                    self.pos += 1;
                    if depth == 0 && until_brace {
                        self.calls.truncate(call_base);
                        self.prev = Prev::Value;
                        return Ok(());
                    }
                    depth = depth.saturating_sub(1);
                    self.prev = Prev::Punct(b'}');
                }
                b'(' => {
                    self.calls.push(None);
                    self.pos += 1;
                    self.prev = Prev::Punct(b'(');
                }
                b')' | b']' => {
                    if c == b')' && self.calls.len() > call_base {
                        self.calls.pop();
                    }
                    self.pos += 1;
                    self.prev = Prev::Value;
                }
                b'=' if self.peek(1) == Some(b'>') => {
                    self.pos += 2;
                    self.prev = Prev::Arrow;
                }
                b'<' if self.jsx
                    && self.prev.expression_allowed()
                    && self
                        .peek(1)
                        .is_some_and(|n| is_ident_start(n) || n == b'>') =>
                {
                    let snap = self.snapshot();
                    match self.element() {
                        Ok(()) => {}
                        Err(Fail::Backtrack) => {
                            self.restore(snap);
                            self.pos += 1;
                            self.prev = Prev::Punct(b'<');
                        }
                        Err(e) => return Err(e),
                    }
                }
                c if c.is_ascii_digit() => {
                    while self
                        .peek(0)
                        .is_some_and(|n| n.is_ascii_alphanumeric() || n == b'_' || n == b'.')
                    {
                        self.pos += 1;
                    }
                    self.prev = Prev::Value;
                }
                c if is_ident_start(c) => self.word(),
                c if !c.is_ascii() => {
                    self.pos += 1;
                    self.prev = Prev::Value;
                }
                c => {
                    self.pos += 1;
                    self.prev = Prev::Punct(c);
                }
            }
        }
    }

    fn regex(&mut self) {
        let start = self.pos;
        let mut i = start + 1;
        let mut in_class = false;
        while i < self.b.len() {
            match self.b[i] {
                b'\\' => {
                    i += 2;
                    continue;
                }
                b'[' => in_class = true,
                b']' => in_class = false,
                b'/' if !in_class => {
                    i += 1;
                    while i < self.b.len() && is_ident_char(self.b[i]) {
                        i += 1;
                    }
                    self.pos = i;
                    self.prev = Prev::Value;
                    return;
                }
                b'\n' => break,
                _ => {}
            }
            i += 1;
        }
        self.pos = start + 1;
        self.prev = Prev::Punct(b'/');
    }

    fn string(&mut self) -> Result<(), Fail> {
        let start = self.pos;
        let Some((value, end)) = self.string_at(start) else {
            return Err(self.error(start, "unterminated string literal"));
        };

        let module_specifier = matches!(&self.prev, Prev::Word(w) if w == "from" || w == "import");
        if !module_specifier {
            let (line, column) = self.line_col(start);
            self.slots.push(Some(Node::StringLiteral(Literal {
                value,
                span: Span::new(start, end),
                line,
                column,
                enclosing_calls: self.calls.iter().flatten().cloned().collect(),
                attribute: None,
            })));
        }

        self.pos = end;
        self.prev = Prev::Value;
        Ok(())
    }

    fn template(&mut self) -> Result<(), Fail> {
        let start = self.pos;
        self.pos += 1;
        loop {
            match self.peek(0) {
                None => return Err(self.error(start, "unterminated template literal")),
                Some(b'\\') => self.pos += 2,
                Some(b'`') => {
                    self.pos += 1;
                    break;
                }
                Some(b'$') if self.peek(1) == Some(b'{') => {
                    self.pos += 2;
                    self.prev = Prev::Punct(b'{');
                    self.code(true)?;
                }
                Some(_) => self.pos += 1,
            }
        }
        self.prev = Prev::Value;
        Ok(())
    }

    fn word(&mut self) {
        let start = self.pos;
        let Some((word, end)) = self.ident_at(start) else {
            self.pos += 1;
            return;
        };
        let member = self.prev == Prev::Punct(b'.');
        self.pos = end;

        if !member && word == "import" {
            let next = self.skip_ws_from(end);
            if !matches!(self.b.get(next), Some(b'(') | Some(b'.')) && self.import(start) {
                return;
            }
        }
        if !member && word == "new" {
            self.pending_new = true;
            self.prev = Prev::Word(word.to_string());
            return;
        }
        let is_new = std::mem::take(&mut self.pending_new);

        // Dotted member chain, `a.b?.c`
        let mut callee = word.to_string();
        loop {
            let mut p = self.pos;
            if self.b.get(p) == Some(&b'?') && self.b.get(p + 1) == Some(&b'.') {
                p += 1;
            }
            if self.b.get(p) != Some(&b'.') {
                break;
            }
            match self.ident_at(p + 1) {
                Some((part, part_end)) => {
                    callee.push('.');
                    callee.push_str(part);
                    self.pos = part_end;
                }
                None => break,
            }
        }

        let after = self.skip_ws_from(self.pos);
        let declares = matches!(&self.prev, Prev::Word(w) if w == "function");
        if self.b.get(after) == Some(&b'(')
            && !declares
            && (member || callee.contains('.') || !NON_CALL_WORDS.contains(&word))
        {
            let arg_start = self.skip_ws_from(after + 1);
            let has_arguments = arg_start < self.b.len() && self.b[arg_start] != b')';
            let first_arg = match self.b.get(arg_start) {
                Some(b'"') | Some(b'\'') => self.string_at(arg_start).and_then(|(v, e)| {
                    let tail = self.skip_ws_from(e);
                    matches!(self.b.get(tail), Some(b',') | Some(b')')).then_some(v)
                }),
                _ => None,
            };
            let (line, column) = self.line_col(start);
            self.slots.push(Some(Node::Call(Call {
                callee: callee.clone(),
                is_new,
                has_arguments,
                first_arg,
                span: Span::new(start, after + 1),
                line,
                column,
            })));
            self.calls.push(Some(callee));
            self.pos = after + 1;
            self.prev = Prev::Punct(b'(');
            return;
        }

        self.prev = if !member && (EXPRESSION_KEYWORDS.contains(&word) || word == "function" || word == "from") {
            Prev::Word(word.to_string())
        } else {
            Prev::Value
        };
    }

    /// Parse an import declaration starting at `start` (the `import` keyword,
    /// already consumed). Returns false, leaving the position untouched, when
    /// the text is not a declaration this scanner understands.
    fn import(&mut self, start: usize) -> bool {
        let mut p = self.skip_ws_from(self.pos);
        let mut default = None;
        let mut namespace = None;
        let mut named = Vec::new();
        let mut type_only = false;

        let source = if matches!(self.b.get(p), Some(b'"') | Some(b'\'')) {
            match self.string_at(p) {
                Some((s, e)) => {
                    p = e;
                    s
                }
                None => return false,
            }
        } else {
            if let Some(("type", e)) = self.ident_at(p) {
                let q = self.skip_ws_from(e);
                let next_word = self.ident_at(q).map(|(w, _)| w);
                if matches!(self.b.get(q), Some(b'{') | Some(b'*'))
                    || next_word.is_some_and(|w| w != "from")
                {
                    type_only = true;
                    p = q;
                }
            }

            if let Some((name, e)) = self.ident_at(p) {
                if name != "from" {
                    default = Some(name.to_string());
                    p = self.skip_ws_from(e);
                    if self.b.get(p) == Some(&b',') {
                        p = self.skip_ws_from(p + 1);
                    }
                }
            }

            if self.b.get(p) == Some(&b'*') {
                p = self.skip_ws_from(p + 1);
                match self.ident_at(p) {
                    Some(("as", e)) => p = self.skip_ws_from(e),
                    _ => return false,
                }
                match self.ident_at(p) {
                    Some((name, e)) => {
                        namespace = Some(name.to_string());
                        p = self.skip_ws_from(e);
                    }
                    None => return false,
                }
            }

            if self.b.get(p) == Some(&b'{') {
                p = self.skip_ws_from(p + 1);
                loop {
                    if self.b.get(p) == Some(&b'}') {
                        p = self.skip_ws_from(p + 1);
                        break;
                    }
                    let Some((mut name, mut e)) = self.ident_at(p) else {
                        return false;
                    };
                    if name == "type" {
                        let q = self.skip_ws_from(e);
                        if let Some((inner, inner_end)) = self.ident_at(q) {
                            name = inner;
                            e = inner_end;
                        }
                    }
                    p = self.skip_ws_from(e);
                    if let Some(("as", e)) = self.ident_at(p) {
                        let q = self.skip_ws_from(e);
                        match self.ident_at(q) {
                            Some((local, le)) => {
                                name = local;
                                p = self.skip_ws_from(le);
                            }
                            None => return false,
                        }
                    }
                    named.push(name.to_string());
                    match self.b.get(p) {
                        Some(b',') => p = self.skip_ws_from(p + 1),
                        Some(b'}') => {}
                        _ => return false,
                    }
                }
            }

            match self.ident_at(p) {
                Some(("from", e)) => p = self.skip_ws_from(e),
                _ => return false,
            }
            match self.string_at(p) {
                Some((s, e)) => {
                    p = e;
                    s
                }
                None => return false,
            }
        };

        let mut end = p;
        while matches!(self.b.get(end), Some(b' ') | Some(b'\t')) {
            end += 1;
        }
        if self.b.get(end) == Some(&b';') {
            p = end + 1;
        }

        let (line, _) = self.line_col(start);
        self.slots.push(Some(Node::Import(Import {
            default,
            namespace,
            named,
            source,
            type_only,
            span: Span::new(start, p),
            line,
        })));
        self.pos = p;
        self.prev = Prev::Punct(b';');
        true
    }

    /// Parse a JSX element or fragment at `<`
    fn element(&mut self) -> Result<(), Fail> {
        let start = self.pos;
        let mut p = self.skip_ws_from(start + 1);

        if self.b.get(p) == Some(&b'>') {
            self.pos = p + 1;
            return self.children(start);
        }

        let name_start = p;
        while p < self.b.len()
            && (is_ident_char(self.b[p]) || matches!(self.b[p], b'.' | b'-' | b':'))
        {
            p += 1;
        }
        if p == name_start {
            return Err(Fail::Backtrack);
        }
        let tag = self.src[name_start..p].to_string();
        let name_end = p;

        // Generic arrow parameters in TSX: `<T,>` or `<T extends X>`
        let q = self.skip_ws_from(p);
        if self.b.get(q) == Some(&b',') || matches!(self.ident_at(q), Some(("extends", _))) {
            return Err(Fail::Backtrack);
        }

        let slot = self.reserve();
        let ancestors = self.elements.clone();
        let mut attributes = Vec::new();
        self.pos = p;

        let self_closing = loop {
            self.pos = self.skip_ws_from(self.pos);
            match self.peek(0) {
                None => return Err(self.error(start, format!("unterminated <{}> tag", tag))),
                Some(b'/') if self.peek(1) == Some(b'>') => {
                    self.pos += 2;
                    break true;
                }
                Some(b'>') => {
                    self.pos += 1;
                    break false;
                }
                Some(b'{') => {
                    self.pos += 1;
                    self.prev = Prev::Punct(b'{');
                    self.code(true)?;
                }
                Some(c) if is_ident_start(c) => {
                    let attribute = self.attribute(&tag)?;
                    attributes.push(attribute);
                }
                Some(_) => return Err(Fail::Backtrack),
            }
        };

        let (line, column) = self.line_col(start);
        let element = Element {
            tag: tag.clone(),
            attributes,
            ancestors,
            span: Span::new(start, self.pos),
            name_end,
            line,
            column,
        };
        self.slots[slot] = Some(if self_closing {
            Node::ElementSelfClose(element)
        } else {
            Node::ElementOpen(element)
        });

        if !self_closing {
            self.elements.push(tag);
            let result = self.children(start);
            self.elements.pop();
            result?;
        }
        self.prev = Prev::Value;
        Ok(())
    }

    fn attribute(&mut self, tag: &str) -> Result<Attribute, Fail> {
        let start = self.pos;
        let mut p = start;
        while p < self.b.len() && (is_ident_char(self.b[p]) || matches!(self.b[p], b'-' | b':')) {
            p += 1;
        }
        let name = self.src[start..p].to_string();
        let slot = self.reserve();
        let (line, column) = self.line_col(start);

        let eq = self.skip_ws_from(p);
        let (value, value_span) = if self.b.get(eq) == Some(&b'=') {
            let v = self.skip_ws_from(eq + 1);
            match self.b.get(v) {
                Some(&quote) if quote == b'"' || quote == b'\'' => {
                    // JSX attribute strings have no escapes and may span lines
                    let Some(close) = self.src[v + 1..].find(quote as char) else {
                        return Err(self.error(v, "unterminated attribute value"));
                    };
                    let end = v + 1 + close;
                    let text = self.src[v + 1..end].to_string();
                    let (lline, lcol) = self.line_col(v);
                    self.slots.push(Some(Node::StringLiteral(Literal {
                        value: text.clone(),
                        span: Span::new(v, end + 1),
                        line: lline,
                        column: lcol,
                        enclosing_calls: self.calls.iter().flatten().cloned().collect(),
                        attribute: Some(name.clone()),
                    })));
                    self.pos = end + 1;
                    (AttrValue::Literal(text), Some(Span::new(v + 1, end)))
                }
                Some(b'{') => {
                    self.pos = v + 1;
                    self.prev = Prev::Punct(b'{');
                    self.code(true)?;
                    let inner = Span::new(v + 1, self.pos - 1);
                    (
                        AttrValue::Expression(self.src[inner.range()].to_string()),
                        Some(inner),
                    )
                }
                _ => return Err(Fail::Backtrack),
            }
        } else {
            self.pos = p;
            (AttrValue::None, None)
        };

        let attribute = Attribute {
            tag: tag.to_string(),
            name,
            value,
            span: Span::new(start, self.pos),
            value_span,
            line,
            column,
        };
        self.slots[slot] = Some(Node::Attribute(attribute.clone()));
        Ok(attribute)
    }

    /// Children of an open element or fragment, through its closing tag
    fn children(&mut self, open: usize) -> Result<(), Fail> {
        loop {
            match self.peek(0) {
                None => {
                    let what = self.elements.last().cloned().unwrap_or_default();
                    return Err(self.error(open, format!("unterminated <{}> element", what)));
                }
                Some(b'<') => {
                    let q = self.skip_ws_from(self.pos + 1);
                    if self.b.get(q) == Some(&b'/') {
                        let Some(close) = self.src[q..].find('>') else {
                            return Err(self.error(self.pos, "unterminated closing tag"));
                        };
                        self.pos = q + close + 1;
                        return Ok(());
                    }
                    let snap = self.snapshot();
                    match self.element() {
                        Ok(()) => {}
                        Err(Fail::Backtrack) => {
                            self.restore(snap);
                            self.text(1);
                        }
                        Err(e) => return Err(e),
                    }
                }
                Some(b'{') => {
                    let start = self.pos;
                    let slot = self.reserve();
                    self.pos += 1;
                    self.prev = Prev::Punct(b'{');
                    self.code(true)?;
                    let inner = self.src[start + 1..self.pos - 1].trim();
                    let comment_only = inner.starts_with("/*") && inner.ends_with("*/");
                    if !inner.is_empty() && !comment_only {
                        let (line, column) = self.line_col(start);
                        self.slots[slot] = Some(Node::Expression(Expression {
                            text: inner.to_string(),
                            span: Span::new(start, self.pos),
                            line,
                            column,
                            ancestors: self.elements.clone(),
                        }));
                    }
                }
                Some(_) => self.text(0),
            }
        }
    }

    /// Consume a run of JSX text, at least `min` bytes, up to `<` or `{`
    fn text(&mut self, min: usize) {
        let start = self.pos;
        let mut p = (start + min).min(self.b.len());
        while p < self.b.len() && self.b[p] != b'<' && self.b[p] != b'{' {
            p += 1;
        }
        self.pos = p;

        let raw = &self.src[start..p];
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return;
        }
        let lead = raw.len() - raw.trim_start().len();
        let text_start = start + lead;
        let (line, column) = self.line_col(text_start);
        self.slots.push(Some(Node::Text(Text {
            value: trimmed.to_string(),
            span: Span::new(text_start, text_start + trimmed.len()),
            line,
            column,
            ancestors: self.elements.clone(),
        })));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_starts(text: &str) -> Vec<usize> {
        std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect()
    }

    fn nodes(text: &str) -> Vec<Node> {
        scan(Path::new("t.tsx"), text, &line_starts(text), true)
            .unwrap()
            .nodes
    }

    #[test]
    fn test_element_with_attributes() {
        let nodes = nodes(r#"const a = <img src="a.png" alt={label} hidden />;"#);
        let el = nodes[0].as_element().unwrap();
        assert!(matches!(nodes[0], Node::ElementSelfClose(_)));
        assert_eq!(el.tag, "img");
        assert_eq!(el.literal_attr("src"), Some("a.png"));
        assert_eq!(el.attr("alt").and_then(|a| a.expression()), Some("label"));
        assert_eq!(el.attr("hidden").map(|a| &a.value), Some(&AttrValue::None));
        assert!(matches!(nodes[1], Node::Attribute(ref a) if a.name == "src"));
    }

    #[test]
    fn test_preorder_and_ancestors() {
        let text = "function A() {\n  return (\n    <form>\n      <button>Save</button>\n    </form>\n  );\n}\n";
        let nodes = nodes(text);
        let kinds: Vec<_> = nodes
            .iter()
            .filter_map(|n| match n {
                Node::ElementOpen(e) => Some(format!("open:{}", e.tag)),
                Node::Text(t) => Some(format!("text:{}", t.value)),
                _ => None,
            })
            .collect();
        assert_eq!(kinds, vec!["open:form", "open:button", "text:Save"]);

        let button = nodes
            .iter()
            .filter_map(Node::as_element)
            .find(|e| e.tag == "button")
            .unwrap();
        assert_eq!(button.ancestors, vec!["form".to_string()]);
        assert_eq!(button.line, 4);
    }

    #[test]
    fn test_calls_and_enclosing() {
        let nodes = nodes(r#"const x = t("home.title"); alert(t("a.b"), "Hello there");"#);
        let calls: Vec<_> = nodes
            .iter()
            .filter_map(|n| match n {
                Node::Call(c) => Some((c.callee.clone(), c.first_arg.clone())),
                _ => None,
            })
            .collect();
        assert_eq!(
            calls,
            vec![
                ("t".to_string(), Some("home.title".to_string())),
                ("alert".to_string(), None),
                ("t".to_string(), Some("a.b".to_string())),
            ]
        );

        let hello = nodes
            .iter()
            .find_map(|n| match n {
                Node::StringLiteral(l) if l.value == "Hello there" => Some(l),
                _ => None,
            })
            .unwrap();
        assert_eq!(hello.enclosing_calls, vec!["alert".to_string()]);
    }

    #[test]
    fn test_new_call() {
        let nodes = nodes("const f = new Function('a', 'return a');\nconst g = new Function();");
        let calls: Vec<_> = nodes
            .iter()
            .filter_map(|n| match n {
                Node::Call(c) => Some(c),
                _ => None,
            })
            .collect();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].is_new && calls[0].has_arguments);
        assert!(calls[1].is_new && !calls[1].has_arguments);
    }

    #[test]
    fn test_imports() {
        let text = "import React, { useState as useS, type FC } from 'react';\nimport * as _ from \"lodash\";\nimport './styles.css';\n";
        let imports: Vec<_> = nodes(text)
            .into_iter()
            .filter_map(|n| match n {
                Node::Import(i) => Some(i),
                _ => None,
            })
            .collect();
        assert_eq!(imports.len(), 3);
        assert_eq!(imports[0].default.as_deref(), Some("React"));
        assert_eq!(imports[0].named, vec!["useS".to_string(), "FC".to_string()]);
        assert_eq!(imports[0].source, "react");
        assert_eq!(imports[1].namespace.as_deref(), Some("_"));
        assert_eq!(imports[2].source, "./styles.css");
        assert!(imports[2].bindings().is_empty());
        assert_eq!(imports[1].line, 2);
    }

    #[test]
    fn test_comparison_is_not_jsx() {
        let nodes = nodes("if (a < b && c > d) { x = y / 2; }");
        assert!(nodes.iter().all(|n| n.as_element().is_none()));
    }

    #[test]
    fn test_generic_arrow_backtracks() {
        let nodes = nodes("const id = <T,>(x: T) => x;\nconst s = 'ok';");
        assert!(nodes.iter().all(|n| n.as_element().is_none()));
        assert!(nodes
            .iter()
            .any(|n| matches!(n, Node::StringLiteral(l) if l.value == "ok")));
    }

    #[test]
    fn test_regex_with_quote() {
        let nodes = nodes("const re = /don't/g;\nconst s = \"after\";");
        assert!(nodes
            .iter()
            .any(|n| matches!(n, Node::StringLiteral(l) if l.value == "after")));
    }

    #[test]
    fn test_template_substitution_scanned() {
        let nodes = nodes("const m = `Hi ${t('greet.name')}`;");
        assert!(nodes
            .iter()
            .any(|n| matches!(n, Node::Call(c) if c.callee == "t")));
    }

    #[test]
    fn test_comments_recorded() {
        let text = "// note\nconst a = 1; /* block */";
        let out = scan(Path::new("t.ts"), text, &line_starts(text), false).unwrap();
        assert_eq!(out.comments.len(), 2);
        assert_eq!(&text[out.comments[0].range()], "// note");
        assert_eq!(&text[out.comments[1].range()], "/* block */");
    }

    #[test]
    fn test_jsx_expression_child_and_fragment() {
        let nodes = nodes("const v = <>\n  <p>{user.message}</p>\n  {/* hidden */}\n</>;");
        let exprs: Vec<_> = nodes
            .iter()
            .filter_map(|n| match n {
                Node::Expression(e) => Some(e.text.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(exprs, vec!["user.message".to_string()]);
    }

    #[test]
    fn test_unterminated_element_is_error() {
        let text = "const a = (\n  <div>\n    <span>hi</span>\n";
        let result = scan(Path::new("t.tsx"), text, &line_starts(text), true);
        assert!(matches!(result, Err(ParseError::Syntax { line: 2, .. })));
    }

    #[test]
    fn test_unterminated_string_is_error() {
        let text = "const a = 'abc\nconst b = 1;";
        let result = scan(Path::new("t.ts"), text, &line_starts(text), false);
        assert!(result.is_err());
    }
}
