// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Structural model of C++ source files.
//!
//! **DDD Context:** Code Generation / C++ Structure
//!
//! Generators assemble a tree of [`Node`]s (namespaces, include groups,
//! records with access sections, functions, member variables, comments and
//! free text) and render it once. Rendering is a pure function of the tree:
//!
//! - identical trees render byte-identical text;
//! - indentation is applied per nesting level ([`Indent`]);
//! - [`Node::Sections`] separates its non-empty children by one blank line;
//! - leading and trailing blank lines of every block are trimmed;
//! - blank lines never carry whitespace;
//! - a malformed node fails the whole render with a [`StructureError`], so
//!   nothing is ever rendered partially.

// Spurious warnings from miette derive macro expansion
#![allow(unused_assignments)]

mod function;
mod types;

pub use function::{Function, FunctionKind, FunctionPrefix};
pub use types::{Fqn, Param, TypeDesc, TypePostfix};

use ecow::EcoString;
use miette::Diagnostic;
use thiserror::Error;

use super::document::{Document, Indent, join, line, nest, nil};
use super::text::{BulletList, TextBlock};
use crate::docvec;
use crate::scoping::NamespaceIds;

/// A code-model tree that cannot be rendered.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum StructureError {
    #[error("{construct} has an empty name")]
    #[diagnostic(code(dznshell::codegen::empty_name))]
    EmptyName { construct: &'static str },

    #[error("{construct} has no scope")]
    #[diagnostic(
        code(dznshell::codegen::missing_scope),
        help("constructors and destructors need the record they belong to")
    )]
    MissingScope { construct: &'static str },

    #[error("constructor '{name}' combines an initialization with member initializers")]
    #[diagnostic(code(dznshell::codegen::conflicting_initialization))]
    ConflictingInitialization { name: String },

    #[error("pure function '{name}' (= 0) must be virtual")]
    #[diagnostic(code(dznshell::codegen::pure_without_virtual))]
    PureWithoutVirtual { name: String },

    #[error("type description is empty")]
    #[diagnostic(code(dznshell::codegen::empty_type))]
    EmptyType,

    #[error("include group contains an empty path")]
    #[diagnostic(code(dznshell::codegen::empty_include))]
    EmptyInclude,
}

/// Result type for code-model rendering.
pub type Result<T> = std::result::Result<T, StructureError>;

/// Kind of include group: `<...>` or `"..."`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IncludeKind {
    System,
    Project,
}

/// A titled group of `#include` directives.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IncludeGroup {
    pub kind: IncludeKind,
    pub paths: Vec<EcoString>,
}

impl IncludeGroup {
    #[must_use]
    pub fn system<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<EcoString>,
    {
        Self {
            kind: IncludeKind::System,
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn project<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<EcoString>,
    {
        Self {
            kind: IncludeKind::Project,
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    fn to_doc(&self) -> Result<Document<'static>> {
        if self.paths.is_empty() {
            return Ok(nil());
        }
        if self.paths.iter().any(|p| p.trim().is_empty()) {
            return Err(StructureError::EmptyInclude);
        }
        let plural = if self.paths.len() == 1 { "" } else { "s" };
        let (title, open, close) = match self.kind {
            IncludeKind::System => ("System", '<', '>'),
            IncludeKind::Project => ("Project", '"', '"'),
        };
        let mut lines = vec![Document::String(format!("// {title} include{plural}"))];
        lines.extend(
            self.paths
                .iter()
                .map(|p| Document::String(format!("#include {open}{p}{close}"))),
        );
        Ok(join(lines, &line()))
    }
}

/// `namespace A::B { ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace {
    pub ids: NamespaceIds,
    pub contents: Vec<Node>,
}

impl Namespace {
    #[must_use]
    pub fn new(ids: NamespaceIds, contents: Vec<Node>) -> Self {
        Self { ids, contents }
    }

    fn to_doc(&self) -> Result<Document<'static>> {
        let name = self.ids.to_cpp();
        let head = if name.is_empty() {
            "namespace {".to_string()
        } else {
            format!("namespace {name} {{")
        };
        let body = block_doc(&self.contents)?;
        if body.is_empty() {
            return Ok(Document::String(format!("{head}}}")));
        }
        let tail = if name.is_empty() {
            "} // namespace".to_string()
        } else {
            format!("}} // namespace {name}")
        };
        Ok(docvec![head, line(), body, line(), tail])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Struct,
    Class,
}

/// Access specifier of a record section. `Default` writes no label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    Default,
    Public,
    Protected,
    Private,
}

/// A run of members under one access specifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccessSection {
    pub access: Access,
    pub members: Vec<Node>,
}

impl AccessSection {
    #[must_use]
    pub fn new(access: Access, members: Vec<Node>) -> Self {
        Self { access, members }
    }
}

/// A struct or class definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record {
    pub kind: RecordKind,
    pub name: EcoString,
    pub sections: Vec<AccessSection>,
}

impl Record {
    #[must_use]
    pub fn new(kind: RecordKind, name: impl Into<EcoString>) -> Self {
        Self {
            kind,
            name: name.into(),
            sections: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_section(mut self, access: Access, members: Vec<Node>) -> Self {
        self.sections.push(AccessSection::new(access, members));
        self
    }

    fn to_doc(&self) -> Result<Document<'static>> {
        if self.name.trim().is_empty() {
            return Err(StructureError::EmptyName {
                construct: match self.kind {
                    RecordKind::Struct => "struct",
                    RecordKind::Class => "class",
                },
            });
        }
        let keyword = match self.kind {
            RecordKind::Struct => "struct",
            RecordKind::Class => "class",
        };
        let mut sections = Vec::new();
        for section in &self.sections {
            let members = block_doc(&section.members)?;
            let label = match section.access {
                Access::Default => None,
                Access::Public => Some("public:"),
                Access::Protected => Some("protected:"),
                Access::Private => Some("private:"),
            };
            let doc = match (label, members.is_empty()) {
                (None, true) => continue,
                (None, false) => nest(1, members),
                (Some(label), true) => Document::Str(label),
                (Some(label), false) => docvec![label, line(), nest(1, members)],
            };
            sections.push(doc);
        }
        let body = join(sections, &docvec![line(), line()]);
        let body = if body.is_empty() {
            nil()
        } else {
            docvec![line(), body]
        };
        Ok(docvec![
            format!("{keyword} {}", self.name),
            line(),
            "{",
            body,
            line(),
            "};"
        ])
    }
}

/// `Type name;` inside a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberVariable {
    pub ty: TypeDesc,
    pub name: EcoString,
}

impl MemberVariable {
    #[must_use]
    pub fn new(ty: TypeDesc, name: impl Into<EcoString>) -> Self {
        Self {
            ty,
            name: name.into(),
        }
    }

    fn to_doc(&self) -> Result<Document<'static>> {
        self.ty.validate()?;
        if self.name.trim().is_empty() {
            return Err(StructureError::EmptyName {
                construct: "member variable",
            });
        }
        Ok(Document::String(format!("{} {};", self.ty, self.name)))
    }
}

/// A node of the C++ code model.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Node {
    Namespace(Namespace),
    Includes(IncludeGroup),
    /// Lines prefixed with `//`.
    Comment(TextBlock),
    Record(Record),
    Declaration(Function),
    Definition(Function),
    Variable(MemberVariable),
    /// Free text, written as is.
    Text(TextBlock),
    /// One empty line.
    Blank,
    /// Children one after another.
    Block(Vec<Node>),
    /// Children nested one level deeper.
    Indented(Vec<Node>),
    /// Non-empty children separated by one blank line.
    Sections(Vec<Node>),
}

impl Node {
    /// Free text from a string, split into lines.
    #[must_use]
    pub fn text(text: &str) -> Self {
        Node::Text(TextBlock::from_text(text))
    }

    /// A comment from a string, split into lines.
    #[must_use]
    pub fn comment(text: &str) -> Self {
        Node::Comment(TextBlock::from_text(text))
    }

    /// A statement head followed by a braced body nested one level:
    /// `if (...)` and `{ ... }` on their own lines. An empty head yields a
    /// bare scope.
    #[must_use]
    pub fn braced(head: &str, body: Vec<Node>) -> Self {
        let mut nodes = Vec::with_capacity(4);
        if !head.is_empty() {
            nodes.push(Node::text(head));
        }
        nodes.extend([Node::text("{"), Node::Indented(body), Node::text("}")]);
        Node::Block(nodes)
    }

    pub(crate) fn to_doc(&self) -> Result<Document<'static>> {
        match self {
            Node::Namespace(namespace) => namespace.to_doc(),
            Node::Includes(group) => group.to_doc(),
            Node::Comment(block) => Ok(block.bulleted(&BulletList::comment()).to_doc()),
            Node::Record(record) => record.to_doc(),
            Node::Declaration(function) => function.declaration_doc(),
            Node::Definition(function) => Ok(function.definition_doc()?.unwrap_or(Document::Nil)),
            Node::Variable(variable) => variable.to_doc(),
            Node::Text(block) => Ok(block.to_doc()),
            Node::Blank => Ok(nil()),
            Node::Block(children) => block_doc(children),
            Node::Indented(children) => Ok(nest(1, block_doc(children)?)),
            Node::Sections(children) => {
                let mut docs = Vec::new();
                for child in children {
                    let doc = child.to_doc()?;
                    if !doc.is_empty() {
                        docs.push(doc);
                    }
                }
                Ok(join(docs, &docvec![line(), line()]))
            }
        }
    }
}

/// Render `nodes` one after another. Children that render empty are skipped;
/// [`Node::Blank`] entries produce empty lines, except at either end.
pub(crate) fn block_doc(nodes: &[Node]) -> Result<Document<'static>> {
    let mut parts: Vec<(bool, Document<'static>)> = Vec::new();
    for node in nodes {
        if *node == Node::Blank {
            parts.push((true, nil()));
            continue;
        }
        let doc = node.to_doc()?;
        if !doc.is_empty() {
            parts.push((false, doc));
        }
    }
    let start = parts.iter().position(|(blank, _)| !blank);
    let end = parts.iter().rposition(|(blank, _)| !blank);
    let (Some(start), Some(end)) = (start, end) else {
        return Ok(nil());
    };
    let docs = parts.drain(start..=end).map(|(_, doc)| doc);
    Ok(join(docs, &line()))
}

/// Render a single node, without a trailing newline.
///
/// # Errors
///
/// Returns a [`StructureError`] for a malformed tree.
pub fn render_node(node: &Node, indent: Indent) -> Result<String> {
    Ok(node.to_doc()?.to_pretty_string(indent))
}

/// A complete source file: a sequence of top-level nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SourceFile {
    pub nodes: Vec<Node>,
}

impl SourceFile {
    #[must_use]
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Render the file. The text has no leading blank lines and ends with
    /// exactly one newline.
    ///
    /// # Errors
    ///
    /// Returns a [`StructureError`] for a malformed tree.
    pub fn render(&self, indent: Indent) -> Result<String> {
        let text = block_doc(&self.nodes)?.to_pretty_string(indent);
        let trimmed = TextBlock::from_text(&text).trimmed();
        let mut output = trimmed
            .lines()
            .iter()
            .map(EcoString::as_str)
            .collect::<Vec<_>>()
            .join("\n");
        output.push('\n');
        Ok(output)
    }
}
