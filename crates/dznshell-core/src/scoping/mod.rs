// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Namespace identifiers and scope resolution.
//!
//! **DDD Context:** Scoping
//!
//! A [`NamespaceIds`] value is an ordered sequence of C++ identifiers. Joined
//! together they form a fully-qualified name (FQN). The empty sequence denotes
//! the global scope.
//!
//! [`scope_resolution_order`] lists the FQNs a reference can denote when it is
//! used from inside some namespace, innermost first. The [`SymbolTable`] uses
//! that order to resolve references against registered symbols.

// Spurious warnings from miette derive macro expansion
#![allow(unused_assignments)]

mod symbol_table;

pub use symbol_table::{ResolutionError, Symbol, SymbolId, SymbolTable};

use std::fmt;

use ecow::EcoString;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for namespace identifier operations.
pub type Result<T> = std::result::Result<T, NamespaceIdsError>;

/// A malformed namespace identifier sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum NamespaceIdsError {
    /// A segment does not match `[A-Za-z_][A-Za-z0-9_]*`.
    #[error("'{id}' in '{text}' is not a valid C++ identifier")]
    #[diagnostic(
        code(dznshell::scoping::invalid_identifier),
        help("identifiers start with a letter or underscore, followed by letters, digits or underscores")
    )]
    InvalidIdentifier { id: String, text: String },

    /// An empty segment, e.g. `My..Project` or a trailing separator.
    #[error("'{text}' contains an empty namespace segment")]
    #[diagnostic(code(dznshell::scoping::empty_segment))]
    EmptySegment { text: String },

    /// The global scope where a named scope is required.
    #[error("expected a non-empty namespace identifier sequence")]
    #[diagnostic(code(dznshell::scoping::empty))]
    Empty,
}

/// Checks an identifier against the C++ identifier grammar.
#[must_use]
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// An ordered sequence of namespace identifiers.
///
/// Displayed in dotted notation (`My.Project`); [`NamespaceIds::to_cpp`] gives
/// the C++ notation (`My::Project`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NamespaceIds(Vec<EcoString>);

impl NamespaceIds {
    /// The global scope.
    #[must_use]
    pub fn global() -> Self {
        Self(Vec::new())
    }

    /// Build from individual identifiers, validating each of them.
    ///
    /// # Errors
    ///
    /// Returns [`NamespaceIdsError::InvalidIdentifier`] for a malformed id.
    pub fn new<I, S>(ids: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ids: Vec<EcoString> = ids.into_iter().map(|s| EcoString::from(s.as_ref())).collect();
        for id in &ids {
            if !is_identifier(id) {
                return Err(NamespaceIdsError::InvalidIdentifier {
                    id: id.to_string(),
                    text: join_dotted(&ids),
                });
            }
        }
        Ok(Self(ids))
    }

    /// Parse dotted (`My.Project`) or C++ (`My::Project`, `::My::Project`)
    /// notation. An empty string parses to the global scope.
    ///
    /// # Errors
    ///
    /// Returns an error for empty segments or invalid identifiers.
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        let body = trimmed.strip_prefix("::").unwrap_or(trimmed);
        if body.is_empty() {
            return Ok(Self::global());
        }
        let normalized = body.replace("::", ".");
        let mut ids = Vec::new();
        for id in normalized.split('.') {
            if id.is_empty() {
                return Err(NamespaceIdsError::EmptySegment {
                    text: text.to_string(),
                });
            }
            if !is_identifier(id) {
                return Err(NamespaceIdsError::InvalidIdentifier {
                    id: id.to_string(),
                    text: text.to_string(),
                });
            }
            ids.push(EcoString::from(id));
        }
        Ok(Self(ids))
    }

    /// Like [`NamespaceIds::parse`] but rejects the global scope.
    ///
    /// # Errors
    ///
    /// Returns [`NamespaceIdsError::Empty`] for an empty text.
    pub fn parse_non_empty(text: &str) -> Result<Self> {
        let ids = Self::parse(text)?;
        if ids.is_global() {
            return Err(NamespaceIdsError::Empty);
        }
        Ok(ids)
    }

    #[must_use]
    pub fn is_global(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn ids(&self) -> &[EcoString] {
        &self.0
    }

    /// The last identifier, i.e. the unqualified name.
    #[must_use]
    pub fn name(&self) -> Option<&EcoString> {
        self.0.last()
    }

    /// All identifiers but the last: the enclosing scope.
    #[must_use]
    pub fn parent(&self) -> Self {
        match self.0.split_last() {
            Some((_, rest)) => Self(rest.to_vec()),
            None => Self::global(),
        }
    }

    /// Concatenate two sequences.
    #[must_use]
    pub fn join(&self, other: &NamespaceIds) -> Self {
        let mut ids = self.0.clone();
        ids.extend(other.0.iter().cloned());
        Self(ids)
    }

    /// Append one identifier.
    ///
    /// # Errors
    ///
    /// Returns [`NamespaceIdsError::InvalidIdentifier`] for a malformed id.
    pub fn child(&self, id: &str) -> Result<Self> {
        if !is_identifier(id) {
            return Err(NamespaceIdsError::InvalidIdentifier {
                id: id.to_string(),
                text: format!("{self}.{id}"),
            });
        }
        let mut ids = self.0.clone();
        ids.push(EcoString::from(id));
        Ok(Self(ids))
    }

    /// True when the trailing identifiers equal `suffix`.
    #[must_use]
    pub fn ends_with(&self, suffix: &NamespaceIds) -> bool {
        self.0.ends_with(&suffix.0)
    }

    /// C++ notation without root prefix: `My::Project`.
    #[must_use]
    pub fn to_cpp(&self) -> String {
        self.0.join("::")
    }
}

fn join_dotted(ids: &[EcoString]) -> String {
    ids.iter().map(EcoString::as_str).collect::<Vec<_>>().join(".")
}

impl fmt::Display for NamespaceIds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&join_dotted(&self.0))
    }
}

impl TryFrom<String> for NamespaceIds {
    type Error = NamespaceIdsError;

    fn try_from(text: String) -> Result<Self> {
        Self::parse(&text)
    }
}

impl TryFrom<&str> for NamespaceIds {
    type Error = NamespaceIdsError;

    fn try_from(text: &str) -> Result<Self> {
        Self::parse(text)
    }
}

impl From<NamespaceIds> for String {
    fn from(ids: NamespaceIds) -> Self {
        ids.to_string()
    }
}

/// The FQNs `searchable` may denote when referenced from `calling_scope`,
/// innermost scope first.
///
/// Starting from the full calling scope, one trailing level is dropped at a
/// time until the global scope is reached:
///
/// ```
/// use dznshell_core::scoping::{NamespaceIds, scope_resolution_order};
///
/// let order = scope_resolution_order(
///     &NamespaceIds::parse("IHeater").unwrap(),
///     &NamespaceIds::parse("My.Project").unwrap(),
/// );
/// let dotted: Vec<String> = order.iter().map(ToString::to_string).collect();
/// assert_eq!(dotted, ["My.Project.IHeater", "My.IHeater", "IHeater"]);
/// ```
#[must_use]
pub fn scope_resolution_order(
    searchable: &NamespaceIds,
    calling_scope: &NamespaceIds,
) -> Vec<NamespaceIds> {
    (0..=calling_scope.len())
        .rev()
        .map(|depth| NamespaceIds(calling_scope.0[..depth].to_vec()).join(searchable))
        .collect()
}
