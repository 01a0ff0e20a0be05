// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Symbol table over namespace-qualified names.
//!
//! **DDD Context:** Scoping
//!
//! Symbols are registered under their FQN and addressed by [`SymbolId`]
//! handles. Symbols registered via [`SymbolTable::from_model`] also remember
//! the model element they stand for.
//!
//! Resolution of a reference used inside a context namespace:
//!
//! 1. the reference is joined to the context and to each enclosing
//!    namespace in turn, innermost first, and the first FQN that exists wins;
//! 2. the reference as written (its global form) is tried last;
//! 3. otherwise a unique suffix match over all symbols is accepted.
//!
//! A fully-qualified reference therefore resolves to itself unless an inner
//! scope declares the same path, as in C++ nested-scope lookup.
//!
//! More than one candidate at any step is an ambiguity, never a guess.

use std::collections::HashMap;
use std::fmt;

use miette::Diagnostic;
use thiserror::Error;
use tracing::debug;

use super::{NamespaceIds, scope_resolution_order};
use crate::model::{ElementId, Model};

/// Stable handle to a registered symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(u32);

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "symbol#{}", self.0)
    }
}

/// A registered symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    fqn: NamespaceIds,
    element: Option<ElementId>,
}

impl Symbol {
    #[must_use]
    pub fn fqn(&self) -> &NamespaceIds {
        &self.fqn
    }

    /// The model element this symbol was registered for, if any.
    #[must_use]
    pub fn element(&self) -> Option<ElementId> {
        self.element
    }
}

/// A reference that does not denote exactly one symbol.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ResolutionError {
    /// No symbol matches the reference.
    #[error("unknown symbol '{reference}' (referenced from scope '{context}')")]
    #[diagnostic(
        code(dznshell::resolve::unknown_symbol),
        help("check the spelling or qualify the name with its namespace")
    )]
    UnknownSymbol {
        reference: NamespaceIds,
        context: NamespaceIds,
    },

    /// Several symbols match with the same specificity.
    #[error("ambiguous symbol '{reference}', candidates: {}", format_candidates(.candidates))]
    #[diagnostic(
        code(dznshell::resolve::ambiguous_symbol),
        help("use a fully-qualified name to select one of the candidates")
    )]
    AmbiguousSymbol {
        reference: NamespaceIds,
        candidates: Vec<NamespaceIds>,
    },

    /// The empty (global) reference never denotes a symbol.
    #[error("empty symbol reference")]
    #[diagnostic(code(dznshell::resolve::empty_reference))]
    EmptyReference,

    /// The symbol exists but was not registered for a model element.
    #[error("symbol '{fqn}' is not bound to a model element")]
    #[diagnostic(code(dznshell::resolve::unbound_symbol))]
    UnboundSymbol { fqn: NamespaceIds },
}

fn format_candidates(candidates: &[NamespaceIds]) -> String {
    candidates
        .iter()
        .map(|c| format!("'{c}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type for symbol resolution.
pub type Result<T> = std::result::Result<T, ResolutionError>;

/// Registered symbols, addressable by handle and by FQN.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    by_fqn: HashMap<NamespaceIds, Vec<SymbolId>>,
}

impl SymbolTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every element of `model` under its FQN.
    #[must_use]
    pub fn from_model(model: &Model) -> Self {
        let mut table = Self::new();
        for (id, element) in model.iter() {
            table.insert(element.fqn().clone(), Some(id));
        }
        debug!(symbols = table.len(), "built symbol table from model");
        table
    }

    /// Register `name` inside `namespace`.
    ///
    /// Registering the same FQN twice yields two symbols; resolving that FQN
    /// afterwards reports an ambiguity.
    ///
    /// # Errors
    ///
    /// Returns [`super::NamespaceIdsError`] if `name` is not an identifier.
    pub fn register(
        &mut self,
        namespace: &NamespaceIds,
        name: &str,
    ) -> super::Result<SymbolId> {
        let fqn = namespace.child(name)?;
        Ok(self.insert(fqn, None))
    }

    /// Register a model element under `fqn`.
    pub fn register_element(&mut self, fqn: NamespaceIds, element: ElementId) -> SymbolId {
        self.insert(fqn, Some(element))
    }

    fn insert(&mut self, fqn: NamespaceIds, element: Option<ElementId>) -> SymbolId {
        let id = SymbolId(u32::try_from(self.symbols.len()).unwrap_or(u32::MAX));
        self.by_fqn.entry(fqn.clone()).or_default().push(id);
        self.symbols.push(Symbol { fqn, element });
        id
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Look up a symbol by handle.
    #[must_use]
    pub fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.0 as usize)
    }

    /// Resolve `reference` as used from inside `context`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError::AmbiguousSymbol`] when more than one symbol
    /// matches at the deciding step, [`ResolutionError::UnknownSymbol`] when
    /// none matches.
    pub fn resolve(&self, reference: &NamespaceIds, context: &NamespaceIds) -> Result<SymbolId> {
        if reference.is_global() {
            return Err(ResolutionError::EmptyReference);
        }

        for candidate in scope_resolution_order(reference, context) {
            if let Some(found) = self.unique_at(&candidate, reference)? {
                return Ok(found);
            }
        }

        let suffix_matches: Vec<SymbolId> = self
            .symbols
            .iter()
            .enumerate()
            .filter(|(_, s)| s.fqn.len() > reference.len() && s.fqn.ends_with(reference))
            .filter_map(|(index, _)| u32::try_from(index).ok().map(SymbolId))
            .collect();
        match suffix_matches.as_slice() {
            [] => Err(ResolutionError::UnknownSymbol {
                reference: reference.clone(),
                context: context.clone(),
            }),
            [only] => Ok(*only),
            many => Err(self.ambiguity(reference, many)),
        }
    }

    /// Resolve `reference` and return the model element behind it.
    ///
    /// # Errors
    ///
    /// Propagates resolution errors, and returns
    /// [`ResolutionError::UnboundSymbol`] for symbols without an element.
    pub fn resolve_element(
        &self,
        reference: &NamespaceIds,
        context: &NamespaceIds,
    ) -> Result<ElementId> {
        let id = self.resolve(reference, context)?;
        let symbol = self
            .symbol(id)
            .ok_or_else(|| ResolutionError::UnknownSymbol {
                reference: reference.clone(),
                context: context.clone(),
            })?;
        symbol.element.ok_or_else(|| ResolutionError::UnboundSymbol {
            fqn: symbol.fqn.clone(),
        })
    }

    fn unique_at(&self, fqn: &NamespaceIds, reference: &NamespaceIds) -> Result<Option<SymbolId>> {
        match self.by_fqn.get(fqn).map(Vec::as_slice) {
            None | Some([]) => Ok(None),
            Some([only]) => Ok(Some(*only)),
            Some(many) => Err(self.ambiguity(reference, many)),
        }
    }

    fn ambiguity(&self, reference: &NamespaceIds, ids: &[SymbolId]) -> ResolutionError {
        let mut candidates: Vec<NamespaceIds> = ids
            .iter()
            .filter_map(|id| self.symbol(*id))
            .map(|s| s.fqn.clone())
            .collect();
        candidates.sort();
        ResolutionError::AmbiguousSymbol {
            reference: reference.clone(),
            candidates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(text: &str) -> NamespaceIds {
        NamespaceIds::parse(text).unwrap()
    }

    fn fqn_of(table: &SymbolTable, id: SymbolId) -> String {
        table.symbol(id).unwrap().fqn().to_string()
    }

    /// Three interfaces named `IHeater` in three namespaces.
    fn three_heaters() -> SymbolTable {
        let mut table = SymbolTable::new();
        table.register(&ids("My.Project"), "IHeater").unwrap();
        table.register(&ids("My.Other"), "IHeater").unwrap();
        table.register(&ids("Vendor"), "IHeater").unwrap();
        table
    }

    #[test]
    fn exact_fqn_wins() {
        let table = three_heaters();
        let id = table.resolve(&ids("Vendor.IHeater"), &ids("My.Project")).unwrap();
        assert_eq!(fqn_of(&table, id), "Vendor.IHeater");
    }

    #[test]
    fn unqualified_reference_in_neutral_scope_is_ambiguous() {
        let table = three_heaters();
        let err = table.resolve(&ids("IHeater"), &NamespaceIds::global()).unwrap_err();
        assert_eq!(
            err,
            ResolutionError::AmbiguousSymbol {
                reference: ids("IHeater"),
                candidates: vec![ids("My.Other.IHeater"), ids("My.Project.IHeater"), ids("Vendor.IHeater")],
            }
        );
    }

    #[test]
    fn every_fully_qualified_form_resolves_uniquely() {
        let table = three_heaters();
        for fqn in ["My.Project.IHeater", "My.Other.IHeater", "Vendor.IHeater"] {
            let id = table.resolve(&ids(fqn), &NamespaceIds::global()).unwrap();
            assert_eq!(fqn_of(&table, id), fqn);
        }
    }

    #[test]
    fn enclosing_scope_is_searched_outward() {
        let table = three_heaters();
        let id = table.resolve(&ids("IHeater"), &ids("My.Project.Sub")).unwrap();
        assert_eq!(fqn_of(&table, id), "My.Project.IHeater");
    }

    #[test]
    fn innermost_scope_shadows_outer() {
        let mut table = SymbolTable::new();
        table.register(&ids("My"), "ILog").unwrap();
        table.register(&ids("My.Project"), "ILog").unwrap();
        let id = table.resolve(&ids("ILog"), &ids("My.Project.Sub")).unwrap();
        assert_eq!(fqn_of(&table, id), "My.Project.ILog");
        let id = table.resolve(&ids("ILog"), &ids("My.Other")).unwrap();
        assert_eq!(fqn_of(&table, id), "My.ILog");
    }

    #[test]
    fn enclosing_scope_preferred_over_global_name() {
        let mut table = SymbolTable::new();
        table.register(&NamespaceIds::global(), "Result").unwrap();
        table.register(&ids("My.Project.IToaster"), "Result").unwrap();
        let id = table.resolve(&ids("Result"), &ids("My.Project.IToaster")).unwrap();
        assert_eq!(fqn_of(&table, id), "My.Project.IToaster.Result");
        let id = table.resolve(&ids("Result"), &ids("My.Other")).unwrap();
        assert_eq!(fqn_of(&table, id), "Result");
    }

    #[test]
    fn qualified_reference_resolves_to_itself_when_not_shadowed() {
        let mut table = SymbolTable::new();
        table.register(&ids("Vendor"), "ILog").unwrap();
        table.register(&ids("My"), "ILog").unwrap();
        let id = table.resolve(&ids("Vendor.ILog"), &ids("My.Project")).unwrap();
        assert_eq!(fqn_of(&table, id), "Vendor.ILog");
    }

    #[test]
    fn partially_qualified_reference_uses_scope() {
        let table = three_heaters();
        let id = table.resolve(&ids("Project.IHeater"), &ids("My")).unwrap();
        assert_eq!(fqn_of(&table, id), "My.Project.IHeater");
    }

    #[test]
    fn unique_suffix_fallback() {
        let mut table = SymbolTable::new();
        table.register(&ids("Deep.Inside"), "IPower").unwrap();
        let id = table.resolve(&ids("IPower"), &ids("Elsewhere")).unwrap();
        assert_eq!(fqn_of(&table, id), "Deep.Inside.IPower");
    }

    #[test]
    fn unknown_symbol() {
        let table = three_heaters();
        assert_eq!(
            table.resolve(&ids("ICord"), &ids("My")),
            Err(ResolutionError::UnknownSymbol {
                reference: ids("ICord"),
                context: ids("My"),
            })
        );
    }

    #[test]
    fn duplicate_registration_is_ambiguous() {
        let mut table = SymbolTable::new();
        table.register(&ids("A"), "X").unwrap();
        table.register(&ids("A"), "X").unwrap();
        assert!(matches!(
            table.resolve(&ids("A.X"), &NamespaceIds::global()),
            Err(ResolutionError::AmbiguousSymbol { .. })
        ));
    }

    #[test]
    fn empty_reference_is_rejected() {
        let table = three_heaters();
        assert_eq!(
            table.resolve(&NamespaceIds::global(), &ids("My")),
            Err(ResolutionError::EmptyReference)
        );
    }

    #[test]
    fn register_rejects_invalid_name() {
        let mut table = SymbolTable::new();
        assert!(table.register(&ids("A"), "no way").is_err());
        assert!(table.is_empty());
    }

    #[test]
    fn unbound_symbol_has_no_element() {
        let table = three_heaters();
        assert!(matches!(
            table.resolve_element(&ids("Vendor.IHeater"), &NamespaceIds::global()),
            Err(ResolutionError::UnboundSymbol { .. })
        ));
    }

    #[test]
    fn ambiguity_message_lists_candidates() {
        let table = three_heaters();
        let err = table.resolve(&ids("IHeater"), &NamespaceIds::global()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "ambiguous symbol 'IHeater', candidates: 'My.Other.IHeater', 'My.Project.IHeater', 'Vendor.IHeater'"
        );
    }
}
