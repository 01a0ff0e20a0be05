// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Document tree used to lay out generated C++ text.
//!
//! **DDD Context:** Code Generation / Layout
//!
//! Code generators build `Document` values instead of writing into a string
//! buffer. The tree is rendered once, in a final pass, by a pure function.
//!
//! Indentation is written lazily: a `Line` only records that the next piece of
//! text starts a new line, and the indentation of the nesting level active at
//! that text is emitted just before it. Two consecutive `Line`s therefore
//! produce a blank line that carries no whitespace.
//!
//! # Example
//!
//! ```
//! use dznshell_core::codegen::document::{Indent, line, nest};
//! use dznshell_core::docvec;
//!
//! let doc = docvec!["void Stop()", line(), "{", nest(1, docvec![line(), "m_pump.stop();"]), line(), "}"];
//! assert_eq!(
//!     doc.to_pretty_string(Indent::default()),
//!     "void Stop()\n{\n    m_pump.stop();\n}"
//! );
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// The whitespace written for one level of nesting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Indent {
    /// A number of space characters per level.
    Spaces(usize),
    /// One tab character per level.
    Tab,
}

impl Default for Indent {
    fn default() -> Self {
        Indent::Spaces(4)
    }
}

impl Indent {
    /// The text of a single indentation level.
    #[must_use]
    pub fn unit(self) -> String {
        match self {
            Indent::Spaces(count) => " ".repeat(count),
            Indent::Tab => "\t".to_string(),
        }
    }
}

impl fmt::Display for Indent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Indent::Spaces(1) => write!(f, "1 space"),
            Indent::Spaces(count) => write!(f, "{count} spaces"),
            Indent::Tab => write!(f, "tab"),
        }
    }
}

/// A layout tree describing generated text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Document<'a> {
    /// A borrowed string literal.
    Str(&'a str),
    /// An owned string.
    String(String),
    /// A newline; the next text is indented to the active level.
    Line,
    /// Increase the nesting level of the inner document.
    Nest(usize, Box<Document<'a>>),
    /// A sequence of documents.
    Vec(Vec<Document<'a>>),
    /// Empty document.
    Nil,
}

/// Coerce a value into a `Document`.
pub trait Documentable<'a> {
    fn to_doc(self) -> Document<'a>;
}

impl<'a> Documentable<'a> for &'a str {
    fn to_doc(self) -> Document<'a> {
        Document::Str(self)
    }
}

impl<'a> Documentable<'a> for String {
    fn to_doc(self) -> Document<'a> {
        Document::String(self)
    }
}

impl<'a> Documentable<'a> for &'a String {
    fn to_doc(self) -> Document<'a> {
        Document::Str(self.as_str())
    }
}

impl<'a> Documentable<'a> for ecow::EcoString {
    fn to_doc(self) -> Document<'a> {
        Document::String(self.to_string())
    }
}

impl<'a> Documentable<'a> for Document<'a> {
    fn to_doc(self) -> Document<'a> {
        self
    }
}

impl<'a> Documentable<'a> for Vec<Document<'a>> {
    fn to_doc(self) -> Document<'a> {
        Document::Vec(self)
    }
}

/// Concatenate documents into a `Document::Vec`.
///
/// Each element is converted via [`Documentable`]. No separator is inserted.
///
/// ```
/// use dznshell_core::codegen::document::Indent;
/// use dznshell_core::docvec;
///
/// let doc = docvec!["int", " ", "count"];
/// assert_eq!(doc.to_pretty_string(Indent::Tab), "int count");
/// ```
#[macro_export]
macro_rules! docvec {
    () => {
        $crate::codegen::document::Document::Vec(Vec::new())
    };

    ($first:expr $(,)?) => {
        $crate::codegen::document::Document::Vec(
            vec![$crate::codegen::document::Documentable::to_doc($first)]
        )
    };

    ($first:expr, $($rest:expr),+ $(,)?) => {
        match $crate::codegen::document::Documentable::to_doc($first) {
            $crate::codegen::document::Document::Vec(mut vec) => {
                $(
                    vec.push($crate::codegen::document::Documentable::to_doc($rest));
                )*
                $crate::codegen::document::Document::Vec(vec)
            },
            first => {
                $crate::codegen::document::Document::Vec(
                    vec![first, $($crate::codegen::document::Documentable::to_doc($rest)),+]
                )
            }
        }
    };
}

/// Creates a `Line` document.
#[must_use]
pub fn line() -> Document<'static> {
    Document::Line
}

/// Creates a `Nil` document.
#[must_use]
pub fn nil() -> Document<'static> {
    Document::Nil
}

/// Increase the nesting of `doc` by `levels`.
#[must_use]
pub fn nest(levels: usize, doc: Document<'_>) -> Document<'_> {
    Document::Nest(levels, Box::new(doc))
}

/// Joins documents with a separator between each pair.
#[must_use]
pub fn join<'a>(
    docs: impl IntoIterator<Item = Document<'a>>,
    separator: &Document<'a>,
) -> Document<'a> {
    let docs: Vec<_> = docs.into_iter().collect();
    if docs.is_empty() {
        return Document::Nil;
    }
    let mut result = Vec::with_capacity(docs.len() * 2 - 1);
    let mut first = true;
    for doc in docs {
        if !first {
            result.push(separator.clone());
        }
        result.push(doc);
        first = false;
    }
    Document::Vec(result)
}

/// Concatenates documents without any separator.
#[must_use]
pub fn concat<'a>(docs: impl IntoIterator<Item = Document<'a>>) -> Document<'a> {
    Document::Vec(docs.into_iter().collect())
}

// --- Rendering ---

struct Renderer {
    output: String,
    unit: String,
    at_line_start: bool,
}

impl Renderer {
    fn write_text(&mut self, text: &str, level: usize) {
        for (index, part) in text.split('\n').enumerate() {
            if index > 0 {
                self.newline();
            }
            if part.is_empty() {
                continue;
            }
            if self.at_line_start {
                write_indent(&mut self.output, &self.unit, level);
                self.at_line_start = false;
            }
            self.output.push_str(part);
        }
    }

    fn newline(&mut self) {
        self.output.push('\n');
        self.at_line_start = true;
    }
}

impl Document<'_> {
    /// True when rendering produces no characters at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Document::Str(s) => s.is_empty(),
            Document::String(s) => s.is_empty(),
            Document::Line => false,
            Document::Nest(_, doc) => doc.is_empty(),
            Document::Vec(docs) => docs.iter().all(Document::is_empty),
            Document::Nil => true,
        }
    }

    /// Renders the document to a string using `indent` per nesting level.
    ///
    /// Embedded `'\n'` characters in text are treated like `Line`, so
    /// multi-line strings are indented consistently with the tree.
    #[must_use]
    pub fn to_pretty_string(&self, indent: Indent) -> String {
        let mut renderer = Renderer {
            output: String::new(),
            unit: indent.unit(),
            at_line_start: true,
        };
        self.render_to(&mut renderer, 0);
        renderer.output
    }

    fn render_to(&self, renderer: &mut Renderer, level: usize) {
        match self {
            Document::Str(s) => renderer.write_text(s, level),
            Document::String(s) => renderer.write_text(s, level),
            Document::Nil => {}
            Document::Line => renderer.newline(),
            Document::Nest(extra, doc) => doc.render_to(renderer, level + extra),
            Document::Vec(docs) => {
                for doc in docs {
                    doc.render_to(renderer, level);
                }
            }
        }
    }
}

fn write_indent(output: &mut String, unit: &str, level: usize) {
    for _ in 0..level {
        output.push_str(unit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(doc: &Document<'_>) -> String {
        doc.to_pretty_string(Indent::default())
    }

    #[test]
    fn str_document() {
        assert_eq!(render(&Document::Str("hello")), "hello");
    }

    #[test]
    fn string_document() {
        assert_eq!(render(&Document::String("world".to_string())), "world");
    }

    #[test]
    fn nil_document() {
        assert_eq!(render(&Document::Nil), "");
    }

    #[test]
    fn line_document() {
        let doc = Document::Vec(vec![Document::Str("a"), Document::Line, Document::Str("b")]);
        assert_eq!(render(&doc), "a\nb");
    }

    #[test]
    fn nest_document() {
        let doc = docvec!["{", nest(1, docvec![line(), "body();"]), line(), "}"];
        assert_eq!(render(&doc), "{\n    body();\n}");
    }

    #[test]
    fn nested_nest() {
        let doc = nest(
            1,
            docvec![line(), "outer", nest(1, docvec![line(), "inner"])],
        );
        assert_eq!(doc.to_pretty_string(Indent::Spaces(2)), "\n  outer\n    inner");
    }

    #[test]
    fn nest_indents_first_line_after_outer_line() {
        // The line break lies outside the nest, the text inside it.
        let doc = docvec!["a", line(), nest(1, docvec!["b"])];
        assert_eq!(render(&doc), "a\n    b");
    }

    #[test]
    fn blank_lines_carry_no_indentation() {
        let doc = nest(1, docvec!["a", line(), line(), "b"]);
        assert_eq!(render(&doc), "    a\n\n    b");
    }

    #[test]
    fn tab_indentation() {
        let doc = docvec!["{", nest(2, docvec![line(), "x;"]), line(), "}"];
        assert_eq!(doc.to_pretty_string(Indent::Tab), "{\n\t\tx;\n}");
    }

    #[test]
    fn embedded_newlines_follow_nesting() {
        let doc = nest(1, docvec!["first\nsecond"]);
        assert_eq!(render(&doc), "    first\n    second");
    }

    #[test]
    fn docvec_macro_empty() {
        let doc = docvec![];
        assert_eq!(render(&doc), "");
        assert!(doc.is_empty());
    }

    #[test]
    fn docvec_macro_mixed_types() {
        let owned = "world".to_string();
        let doc = docvec!["hello ", Document::String(owned), ecow::EcoString::from("!")];
        assert_eq!(render(&doc), "hello world!");
    }

    #[test]
    fn docvec_flattens_leading_vec() {
        let inner = docvec!["a", "b"];
        let doc = docvec![inner, "c"];
        assert_eq!(render(&doc), "abc");
        if let Document::Vec(v) = doc {
            assert_eq!(v.len(), 3);
        } else {
            panic!("Expected Vec");
        }
    }

    #[test]
    fn join_documents() {
        let docs = vec![Document::Str("a"), Document::Str("b"), Document::Str("c")];
        assert_eq!(render(&join(docs, &Document::Str(", "))), "a, b, c");
    }

    #[test]
    fn join_empty() {
        let docs: Vec<Document> = vec![];
        assert_eq!(join(docs, &Document::Str(", ")), Document::Nil);
    }

    #[test]
    fn concat_documents() {
        let doc = concat(vec![Document::Str("x"), line(), Document::Str("y")]);
        assert_eq!(render(&doc), "x\ny");
    }

    #[test]
    fn emptiness() {
        assert!(nest(1, docvec!["", nil()]).is_empty());
        assert!(!docvec![line()].is_empty());
        assert!(!docvec!["x"].is_empty());
    }

    #[test]
    fn indent_display() {
        assert_eq!(Indent::Spaces(4).to_string(), "4 spaces");
        assert_eq!(Indent::Spaces(1).to_string(), "1 space");
        assert_eq!(Indent::Tab.to_string(), "tab");
    }
}
