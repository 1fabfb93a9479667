//! Closed node model exposed by a parsed source unit

use std::ops::Range;

/// Byte range into the unit's text
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }
}

/// Value side of a JSX attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    /// `name="text"`
    Literal(String),
    /// `name={expr}`, holding the raw expression text
    Expression(String),
    /// Bare `name`
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Tag of the element owning this attribute
    pub tag: String,
    pub name: String,
    pub value: AttrValue,
    /// Whole `name=value` text
    pub span: Span,
    /// Inside the quotes or braces
    pub value_span: Option<Span>,
    pub line: usize,
    pub column: usize,
}

impl Attribute {
    /// Static string value: `"x"`, `'x'`, `{"x"}` or `{'x'}`
    pub fn literal(&self) -> Option<&str> {
        match &self.value {
            AttrValue::Literal(s) => Some(s.as_str()),
            AttrValue::Expression(expr) => {
                let expr = expr.trim();
                let quoted = expr.len() >= 2
                    && ((expr.starts_with('"') && expr.ends_with('"'))
                        || (expr.starts_with('\'') && expr.ends_with('\''))
                        || (expr.starts_with('`') && expr.ends_with('`') && !expr.contains("${")));
                if quoted {
                    Some(&expr[1..expr.len() - 1])
                } else {
                    None
                }
            }
            AttrValue::None => None,
        }
    }

    pub fn expression(&self) -> Option<&str> {
        match &self.value {
            AttrValue::Expression(expr) => Some(expr.trim()),
            _ => None,
        }
    }
}

/// A JSX element, opening or self-closing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attributes: Vec<Attribute>,
    /// Enclosing element tags, outermost first
    pub ancestors: Vec<String>,
    /// From `<` to the closing `>` of the opening tag
    pub span: Span,
    /// Offset just past the tag name, where new attributes are inserted
    pub name_end: usize,
    pub line: usize,
    pub column: usize,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    pub fn literal_attr(&self, name: &str) -> Option<&str> {
        self.attr(name).and_then(|a| a.literal())
    }

    /// `className` (or `class`) attribute
    pub fn class_attr(&self) -> Option<&Attribute> {
        self.attr("className").or_else(|| self.attr("class"))
    }

    pub fn is_inside(&self, tag: &str) -> bool {
        self.ancestors.iter().any(|a| a == tag)
    }

    /// Heading level for `h1`..`h6`
    pub fn heading_level(&self) -> Option<u8> {
        let bytes = self.tag.as_bytes();
        if bytes.len() == 2 && bytes[0] == b'h' && (b'1'..=b'6').contains(&bytes[1]) {
            Some(bytes[1] - b'0')
        } else {
            None
        }
    }
}

/// A call expression, `foo(...)`, `a.b.c(...)` or `new Foo(...)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    /// Dotted callee path
    pub callee: String,
    pub is_new: bool,
    pub has_arguments: bool,
    /// First argument when it is a plain string literal
    pub first_arg: Option<String>,
    pub span: Span,
    pub line: usize,
    pub column: usize,
}

impl Call {
    /// Last segment of the callee path
    pub fn name(&self) -> &str {
        self.callee.rsplit('.').next().unwrap_or(&self.callee)
    }
}

/// A quoted string literal in script code or a JSX attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub value: String,
    pub span: Span,
    pub line: usize,
    pub column: usize,
    /// Callee names of enclosing calls, outermost first
    pub enclosing_calls: Vec<String>,
    /// Attribute name when this literal is a JSX attribute value
    pub attribute: Option<String>,
}

impl Literal {
    pub fn inside_call(&self, name: &str) -> bool {
        self.enclosing_calls
            .iter()
            .any(|c| c == name || c.rsplit('.').next() == Some(name))
    }
}

/// Non-blank JSX text child
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    /// Trimmed text
    pub value: String,
    pub span: Span,
    pub line: usize,
    pub column: usize,
    pub ancestors: Vec<String>,
}

/// JSX child expression container, `{...}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    /// Trimmed inner text
    pub text: String,
    pub span: Span,
    pub line: usize,
    pub column: usize,
    pub ancestors: Vec<String>,
}

/// An ES import declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub default: Option<String>,
    pub namespace: Option<String>,
    /// Local names of `{ ... }` bindings
    pub named: Vec<String>,
    pub source: String,
    pub type_only: bool,
    pub span: Span,
    pub line: usize,
}

impl Import {
    /// All local binding names
    pub fn bindings(&self) -> Vec<&str> {
        self.default
            .iter()
            .chain(self.namespace.iter())
            .chain(self.named.iter())
            .map(String::as_str)
            .collect()
    }

    pub fn binds(&self, name: &str) -> bool {
        self.bindings().contains(&name)
    }
}

/// Node variants produced by the scanner, in depth-first pre-order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    ElementOpen(Element),
    ElementSelfClose(Element),
    Attribute(Attribute),
    Call(Call),
    StringLiteral(Literal),
    Text(Text),
    Expression(Expression),
    Import(Import),
}

impl Node {
    pub fn line(&self) -> usize {
        match self {
            Node::ElementOpen(e) | Node::ElementSelfClose(e) => e.line,
            Node::Attribute(a) => a.line,
            Node::Call(c) => c.line,
            Node::StringLiteral(l) => l.line,
            Node::Text(t) => t.line,
            Node::Expression(e) => e.line,
            Node::Import(i) => i.line,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Node::ElementOpen(e) | Node::ElementSelfClose(e) => e.span,
            Node::Attribute(a) => a.span,
            Node::Call(c) => c.span,
            Node::StringLiteral(l) => l.span,
            Node::Text(t) => t.span,
            Node::Expression(e) => e.span,
            Node::Import(i) => i.span,
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::ElementOpen(e) | Node::ElementSelfClose(e) => Some(e),
            _ => None,
        }
    }
}
