//! Source units: a parsed file with its node sequence, line index and
//! pending-edit state

pub mod node;
mod scanner;
pub mod suppress;

pub use node::{AttrValue, Attribute, Call, Element, Expression, Import, Literal, Node, Span, Text};
pub use suppress::Suppressions;

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while reading or parsing a source unit
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid UTF-8")]
    Encoding { path: PathBuf },

    #[error("{path}:{line}: {message}")]
    Syntax {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("{path}: overlapping edits at offset {offset}")]
    OverlappingEdits { path: PathBuf, offset: usize },
}

/// Kind of file a unit was parsed from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    /// TypeScript/JavaScript, with or without JSX
    Script { jsx: bool },
    /// CSS and SCSS
    Stylesheet,
}

impl Language {
    pub fn from_path(path: &Path) -> Option<Language> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "tsx" | "jsx" | "js" => Some(Language::Script { jsx: true }),
            "ts" | "mts" | "cts" | "mjs" | "cjs" => Some(Language::Script { jsx: false }),
            "css" | "scss" => Some(Language::Stylesheet),
            _ => None,
        }
    }

    pub fn is_script(&self) -> bool {
        matches!(self, Language::Script { .. })
    }
}

/// A text edit against a unit's current text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub span: Span,
    pub replacement: String,
}

impl Edit {
    pub fn replace(span: Span, replacement: impl Into<String>) -> Self {
        Self {
            span,
            replacement: replacement.into(),
        }
    }

    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self::replace(Span::new(at, at), text)
    }
}

/// A parsed source file
#[derive(Debug, Clone)]
pub struct SourceUnit {
    path: PathBuf,
    text: String,
    language: Language,
    nodes: Vec<Node>,
    comments: Vec<Span>,
    line_starts: Vec<usize>,
    dirty: bool,
}

impl SourceUnit {
    /// Read and parse a file from disk
    pub fn parse(path: &Path) -> Result<Self, ParseError> {
        let bytes = fs::read(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let text = String::from_utf8(bytes).map_err(|_| ParseError::Encoding {
            path: path.to_path_buf(),
        })?;
        Self::from_text(path, text)
    }

    /// Parse in-memory text as if it were read from `path`
    pub fn from_text(path: impl AsRef<Path>, text: impl Into<String>) -> Result<Self, ParseError> {
        let path = path.as_ref().to_path_buf();
        let text = text.into();
        let language = Language::from_path(&path).unwrap_or(Language::Script { jsx: true });
        let line_starts = line_starts(&text);

        let (nodes, comments) = match language {
            Language::Script { jsx } => {
                let out = scanner::scan(&path, &text, &line_starts, jsx)?;
                (out.nodes, out.comments)
            }
            Language::Stylesheet => (Vec::new(), scanner::stylesheet_comments(&text)),
        };

        Ok(Self {
            path,
            text,
            language,
            nodes,
            comments,
            line_starts,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn full_text(&self) -> &str {
        &self.text
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// All nodes in depth-first pre-order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn nodes_matching<'a, P>(&'a self, predicate: P) -> impl Iterator<Item = &'a Node>
    where
        P: Fn(&Node) -> bool + 'a,
    {
        self.nodes.iter().filter(move |n| predicate(n))
    }

    /// Opening and self-closing elements
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.nodes.iter().filter_map(Node::as_element)
    }

    pub fn imports(&self) -> impl Iterator<Item = &Import> {
        self.nodes.iter().filter_map(|n| match n {
            Node::Import(i) => Some(i),
            _ => None,
        })
    }

    pub fn calls(&self) -> impl Iterator<Item = &Call> {
        self.nodes.iter().filter_map(|n| match n {
            Node::Call(c) => Some(c),
            _ => None,
        })
    }

    pub fn comments(&self) -> &[Span] {
        &self.comments
    }

    pub fn in_comment(&self, offset: usize) -> bool {
        self.comments.iter().any(|c| c.contains(offset))
    }

    /// True when every non-blank character of the line lies inside a comment
    pub fn is_comment_line(&self, line: usize) -> bool {
        let Some(start) = self.line_starts.get(line.wrapping_sub(1)).copied() else {
            return false;
        };
        let text = self.line(line).unwrap_or("");
        let mut saw = false;
        for (i, ch) in text.char_indices() {
            if ch.is_whitespace() {
                continue;
            }
            saw = true;
            if !self.in_comment(start + i) {
                return false;
            }
        }
        saw
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// 1-based line containing `offset`
    pub fn line_of(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(i) => i + 1,
            Err(i) => i,
        }
    }

    /// 1-based column of `offset` within its line
    pub fn column_of(&self, offset: usize) -> usize {
        let line = self.line_of(offset);
        offset - self.line_starts[line - 1] + 1
    }

    /// Offset of the first byte of a 1-based line
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.line_starts.get(line.checked_sub(1)?).copied()
    }

    /// Text of a 1-based line, without its line terminator
    pub fn line(&self, line: usize) -> Option<&str> {
        let start = self.line_start(line)?;
        let end = self
            .line_starts
            .get(line)
            .map(|next| next - 1)
            .unwrap_or(self.text.len());
        Some(self.text[start..end].trim_end_matches('\r'))
    }

    /// (1-based line number, line text) pairs
    pub fn lines(&self) -> impl Iterator<Item = (usize, &str)> {
        self.text.lines().enumerate().map(|(i, l)| (i + 1, l))
    }

    /// Apply non-overlapping edits and re-parse. The unit is consumed so no
    /// handle to the pre-edit node sequence survives.
    pub fn mutate(self, mut edits: Vec<Edit>) -> Result<SourceUnit, ParseError> {
        if edits.is_empty() {
            return Ok(self);
        }
        edits.sort_by(|a, b| b.span.start.cmp(&a.span.start).then(b.span.end.cmp(&a.span.end)));

        let mut text = self.text;
        let mut limit = text.len();
        for edit in &edits {
            if edit.span.end > limit || edit.span.start > edit.span.end {
                return Err(ParseError::OverlappingEdits {
                    path: self.path,
                    offset: edit.span.start,
                });
            }
            text.replace_range(edit.span.range(), &edit.replacement);
            limit = edit.span.start;
        }

        let mut unit = SourceUnit::from_text(self.path, text)?;
        unit.dirty = true;
        Ok(unit)
    }

    /// Write pending changes back to the origin path. Returns whether
    /// anything was written; a clean unit is left untouched.
    pub fn save(&mut self) -> std::io::Result<bool> {
        if !self.dirty {
            return Ok(false);
        }
        fs::write(&self.path, &self.text)?;
        self.dirty = false;
        Ok(true)
    }
}

fn line_starts(text: &str) -> Vec<usize> {
    std::iter::once(0)
        .chain(text.match_indices('\n').map(|(i, _)| i + 1))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_language_from_path() {
        assert_eq!(
            Language::from_path(Path::new("a/App.tsx")),
            Some(Language::Script { jsx: true })
        );
        assert_eq!(
            Language::from_path(Path::new("a/util.ts")),
            Some(Language::Script { jsx: false })
        );
        assert_eq!(
            Language::from_path(Path::new("index.css")),
            Some(Language::Stylesheet)
        );
        assert_eq!(Language::from_path(Path::new("README.md")), None);
    }

    #[test]
    fn test_line_and_column() {
        let unit = SourceUnit::from_text("a.ts", "let a = 1;\nlet bb = 2;\n").unwrap();
        assert_eq!(unit.line_of(0), 1);
        assert_eq!(unit.line_of(11), 2);
        assert_eq!(unit.column_of(15), 5);
        assert_eq!(unit.line(2), Some("let bb = 2;"));
        assert_eq!(unit.line(9), None);
    }

    #[test]
    fn test_nodes_matching() {
        let unit = SourceUnit::from_text(
            "a.tsx",
            "const A = () => <div><img src=\"x.png\" /><img src=\"y.png\" alt=\"\" /></div>;",
        )
        .unwrap();
        let imgs: Vec<_> = unit
            .nodes_matching(|n| matches!(n, Node::ElementSelfClose(e) if e.tag == "img"))
            .collect();
        assert_eq!(imgs.len(), 2);
    }

    #[test]
    fn test_comment_line() {
        let unit = SourceUnit::from_text("a.ts", "// only comment\nconst x = 1; // trailing\n").unwrap();
        assert!(unit.is_comment_line(1));
        assert!(!unit.is_comment_line(2));
    }

    #[test]
    fn test_mutate_reparses_and_marks_dirty() {
        let unit = SourceUnit::from_text("a.tsx", "const a = <img src=\"a.png\" />;").unwrap();
        let img = unit.elements().next().unwrap().clone();
        let unit = unit
            .mutate(vec![Edit::insert(img.name_end, " alt=\"\"")])
            .unwrap();
        assert!(unit.is_dirty());
        assert_eq!(unit.full_text(), "const a = <img alt=\"\" src=\"a.png\" />;");
        assert!(unit.elements().next().unwrap().has_attr("alt"));
    }

    #[test]
    fn test_mutate_rejects_overlap() {
        let unit = SourceUnit::from_text("a.ts", "abcdef").unwrap();
        let result = unit.mutate(vec![
            Edit::replace(Span::new(0, 3), "x"),
            Edit::replace(Span::new(2, 4), "y"),
        ]);
        assert!(matches!(result, Err(ParseError::OverlappingEdits { .. })));
    }

    #[test]
    fn test_save_is_noop_without_edits() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.ts");
        fs::write(&path, "const a = 1;").unwrap();

        let mut unit = SourceUnit::parse(&path).unwrap();
        assert!(!unit.save().unwrap());

        let mut unit = unit
            .mutate(vec![Edit::replace(Span::new(10, 11), "2")])
            .unwrap();
        assert!(unit.save().unwrap());
        assert!(!unit.save().unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "const a = 2;");
    }

    #[test]
    fn test_parse_missing_file() {
        let result = SourceUnit::parse(Path::new("/nonexistent/complint/a.tsx"));
        assert!(matches!(result, Err(ParseError::Io { .. })));
    }
}
