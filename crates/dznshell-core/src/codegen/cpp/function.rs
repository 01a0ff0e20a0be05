// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Functions, constructors and destructors as declaration/definition pairs.
//!
//! A single [`Function`] value renders both its declaration (inside a record)
//! and its definition (in a source file, qualified with its scope).

use ecow::EcoString;

use super::types::{Param, TypeDesc};
use super::{Node, StructureError, block_doc};
use crate::codegen::document::{Document, join, line, nest};
use crate::docvec;

/// Keyword written in front of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FunctionPrefix {
    #[default]
    None,
    Virtual,
    Static,
}

impl FunctionPrefix {
    fn keyword(self) -> &'static str {
        match self {
            FunctionPrefix::None => "",
            FunctionPrefix::Virtual => "virtual ",
            FunctionPrefix::Static => "static ",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    Regular { return_type: TypeDesc },
    Constructor { explicit: bool, member_inits: Vec<EcoString> },
    Destructor,
}

/// A C++ function.
///
/// ```
/// use dznshell_core::codegen::cpp::{Function, Node, TypeDesc, render_node};
/// use dznshell_core::codegen::document::Indent;
/// use dznshell_core::codegen::text::TextBlock;
///
/// let f = Function::new(TypeDesc::verbatim("int"), "Count")
///     .with_scope("Counter")
///     .with_qualifier("const")
///     .with_body(vec![Node::Text(TextBlock::from_text("return m_count;"))]);
/// let indent = Indent::default();
/// assert_eq!(render_node(&Node::Declaration(f.clone()), indent).unwrap(), "int Count() const;");
/// assert_eq!(
///     render_node(&Node::Definition(f), indent).unwrap(),
///     "int Counter::Count() const\n{\n    return m_count;\n}"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Function {
    kind: FunctionKind,
    name: EcoString,
    scope: Option<EcoString>,
    params: Vec<Param>,
    prefix: FunctionPrefix,
    qualifier: Option<EcoString>,
    is_override: bool,
    initialization: Option<EcoString>,
    body: Vec<Node>,
}

fn non_empty(text: EcoString) -> Option<EcoString> {
    if text.trim().is_empty() { None } else { Some(text) }
}

fn unqualified(scope: &str) -> EcoString {
    EcoString::from(scope.rsplit("::").next().unwrap_or(scope))
}

impl Function {
    fn with_kind(kind: FunctionKind, name: EcoString, scope: Option<EcoString>) -> Self {
        Self {
            kind,
            name,
            scope,
            params: Vec::new(),
            prefix: FunctionPrefix::None,
            qualifier: None,
            is_override: false,
            initialization: None,
            body: Vec::new(),
        }
    }

    /// A regular (member or free) function.
    #[must_use]
    pub fn new(return_type: TypeDesc, name: impl Into<EcoString>) -> Self {
        Self::with_kind(FunctionKind::Regular { return_type }, name.into(), None)
    }

    /// A constructor of the record named by `scope`.
    #[must_use]
    pub fn constructor(scope: impl Into<EcoString>) -> Self {
        let scope = non_empty(scope.into());
        let name = scope.as_deref().map(unqualified).unwrap_or_default();
        Self::with_kind(
            FunctionKind::Constructor {
                explicit: false,
                member_inits: Vec::new(),
            },
            name,
            scope,
        )
    }

    /// The destructor of the record named by `scope`.
    #[must_use]
    pub fn destructor(scope: impl Into<EcoString>) -> Self {
        let scope = non_empty(scope.into());
        let name = scope.as_deref().map(unqualified).unwrap_or_default();
        Self::with_kind(FunctionKind::Destructor, name, scope)
    }

    /// Qualify the definition with `scope`, e.g. the owning record.
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<EcoString>) -> Self {
        self.scope = non_empty(scope.into());
        self
    }

    #[must_use]
    pub fn with_param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    #[must_use]
    pub fn with_params(mut self, params: impl IntoIterator<Item = Param>) -> Self {
        self.params.extend(params);
        self
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: FunctionPrefix) -> Self {
        self.prefix = prefix;
        self
    }

    /// Trailing qualifier such as `const` or `noexcept`.
    #[must_use]
    pub fn with_qualifier(mut self, qualifier: impl Into<EcoString>) -> Self {
        self.qualifier = non_empty(qualifier.into());
        self
    }

    #[must_use]
    pub fn overriding(mut self) -> Self {
        self.is_override = true;
        self
    }

    /// `= default`, `= delete` or `= 0`. Such functions have no definition.
    #[must_use]
    pub fn with_initialization(mut self, initialization: impl Into<EcoString>) -> Self {
        self.initialization = non_empty(initialization.into());
        self
    }

    /// Mark a constructor `explicit`. No effect on other functions.
    #[must_use]
    pub fn explicit(mut self) -> Self {
        if let FunctionKind::Constructor { explicit, .. } = &mut self.kind {
            *explicit = true;
        }
        self
    }

    /// Append a member initializer, e.g. `m_locator(locator)`. No effect on
    /// other functions than constructors.
    #[must_use]
    pub fn with_member_init(mut self, init: impl Into<EcoString>) -> Self {
        if let FunctionKind::Constructor { member_inits, .. } = &mut self.kind {
            member_inits.push(init.into());
        }
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Vec<Node>) -> Self {
        self.body = body;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> &FunctionKind {
        &self.kind
    }

    fn construct(&self) -> &'static str {
        match self.kind {
            FunctionKind::Regular { .. } => "function",
            FunctionKind::Constructor { .. } => "constructor",
            FunctionKind::Destructor => "destructor",
        }
    }

    pub(crate) fn validate(&self) -> Result<(), StructureError> {
        let construct = self.construct();
        match &self.kind {
            FunctionKind::Regular { return_type } => return_type.validate()?,
            FunctionKind::Constructor { member_inits, .. } => {
                if self.initialization.is_some() && !member_inits.is_empty() {
                    return Err(StructureError::ConflictingInitialization {
                        name: self.name.to_string(),
                    });
                }
            }
            FunctionKind::Destructor => {}
        }
        if !matches!(self.kind, FunctionKind::Regular { .. }) && self.scope.is_none() {
            return Err(StructureError::MissingScope { construct });
        }
        if self.name.trim().is_empty() {
            return Err(StructureError::EmptyName { construct });
        }
        if self.initialization.as_deref() == Some("0") && self.prefix != FunctionPrefix::Virtual {
            return Err(StructureError::PureWithoutVirtual {
                name: self.name.to_string(),
            });
        }
        self.params.iter().try_for_each(Param::validate)
    }

    fn suffix(&self) -> String {
        let mut suffix = String::new();
        if let Some(qualifier) = &self.qualifier {
            suffix.push(' ');
            suffix.push_str(qualifier);
        }
        if self.is_override {
            suffix.push_str(" override");
        }
        suffix
    }

    /// The declaration, as written inside a record.
    pub(crate) fn declaration_doc(&self) -> Result<Document<'static>, StructureError> {
        self.validate()?;
        let params: Vec<String> = self.params.iter().map(Param::as_decl).collect();
        let params = params.join(", ");
        let head = match &self.kind {
            FunctionKind::Regular { return_type } => format!(
                "{}{return_type} {}({params}){}",
                self.prefix.keyword(),
                self.name,
                self.suffix()
            ),
            FunctionKind::Constructor { explicit, .. } => format!(
                "{}{}({params})",
                if *explicit { "explicit " } else { "" },
                self.name
            ),
            FunctionKind::Destructor => format!(
                "{}~{}(){}",
                self.prefix.keyword(),
                self.name,
                self.suffix()
            ),
        };
        let init = self
            .initialization
            .as_ref()
            .map(|init| format!(" = {init}"))
            .unwrap_or_default();
        Ok(Document::String(format!("{head}{init};")))
    }

    /// The definition with its body, or `None` for functions initialized
    /// with `= default`, `= delete` or `= 0`.
    pub(crate) fn definition_doc(&self) -> Result<Option<Document<'static>>, StructureError> {
        self.validate()?;
        if self.initialization.is_some() {
            return Ok(None);
        }
        let params: Vec<String> = self.params.iter().map(Param::as_def).collect();
        let params = params.join(", ");
        let scope = self
            .scope
            .as_ref()
            .map(|scope| format!("{scope}::"))
            .unwrap_or_default();
        let signature = match &self.kind {
            FunctionKind::Regular { return_type } => {
                format!("{return_type} {scope}{}({params}){}", self.name, self.qualifier_only())
            }
            FunctionKind::Constructor { .. } => format!("{scope}{}({params})", self.name),
            FunctionKind::Destructor => format!("{scope}~{}()", self.name),
        };
        let inits = match &self.kind {
            FunctionKind::Constructor { member_inits, .. } if !member_inits.is_empty() => {
                let lines = member_inits.iter().enumerate().map(|(index, init)| {
                    let lead = if index == 0 { ": " } else { ", " };
                    Document::String(format!("{lead}{init}"))
                });
                nest(1, docvec![line(), join(lines, &line())])
            }
            _ => Document::Nil,
        };
        let body = block_doc(&self.body)?;
        let body = if body.is_empty() {
            Document::Nil
        } else {
            nest(1, docvec![line(), body])
        };
        Ok(Some(docvec![signature, inits, line(), "{", body, line(), "}"]))
    }

    fn qualifier_only(&self) -> String {
        self.qualifier
            .as_ref()
            .map(|qualifier| format!(" {qualifier}"))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::cpp::{TypePostfix, render_node};
    use crate::codegen::document::Indent;
    use crate::codegen::text::TextBlock;

    fn decl(f: &Function) -> String {
        render_node(&Node::Declaration(f.clone()), Indent::default()).unwrap()
    }

    fn def(f: &Function) -> String {
        render_node(&Node::Definition(f.clone()), Indent::default()).unwrap()
    }

    fn locator_param() -> Param {
        Param::new(
            TypeDesc::verbatim("dzn::locator")
                .with_const()
                .with_postfix(TypePostfix::Reference),
            "locator",
        )
    }

    #[test]
    fn static_function_declaration_and_definition() {
        let f = Function::new(
            TypeDesc::verbatim("dzn::locator")
                .with_const()
                .with_postfix(TypePostfix::Reference),
            "FacilitiesCheck",
        )
        .with_prefix(FunctionPrefix::Static)
        .with_scope("ToasterShell")
        .with_param(locator_param())
        .with_body(vec![Node::Text(TextBlock::from_text("return locator;"))]);
        assert_eq!(
            decl(&f),
            "static const dzn::locator& FacilitiesCheck(const dzn::locator& locator);"
        );
        assert_eq!(
            def(&f),
            "const dzn::locator& ToasterShell::FacilitiesCheck(const dzn::locator& locator)\n{\n    return locator;\n}"
        );
    }

    #[test]
    fn constructor_with_member_inits() {
        let f = Function::constructor("ToasterShell")
            .with_param(locator_param())
            .with_member_init("m_dispatcher(locator.get<dzn::pump>())")
            .with_member_init("m_encapsulee(locator)");
        assert_eq!(decl(&f), "ToasterShell(const dzn::locator& locator);");
        assert_eq!(
            def(&f),
            "ToasterShell::ToasterShell(const dzn::locator& locator)\n    : m_dispatcher(locator.get<dzn::pump>())\n    , m_encapsulee(locator)\n{\n}"
        );
    }

    #[test]
    fn explicit_constructor_declaration() {
        let f = Function::constructor("Shell").explicit().with_param(locator_param());
        assert_eq!(decl(&f), "explicit Shell(const dzn::locator& locator);");
    }

    #[test]
    fn virtual_destructor_default() {
        let f = Function::destructor("Base")
            .with_prefix(FunctionPrefix::Virtual)
            .with_initialization("default");
        assert_eq!(decl(&f), "virtual ~Base() = default;");
        assert_eq!(def(&f), "");
    }

    #[test]
    fn pure_virtual_override() {
        let f = Function::new(TypeDesc::void(), "Run")
            .with_prefix(FunctionPrefix::Virtual)
            .with_qualifier("const")
            .overriding()
            .with_initialization("0");
        assert_eq!(decl(&f), "virtual void Run() const override = 0;");
    }

    #[test]
    fn pure_without_virtual_is_rejected() {
        let f = Function::new(TypeDesc::void(), "Run").with_initialization("0");
        assert_eq!(
            f.validate(),
            Err(StructureError::PureWithoutVirtual {
                name: "Run".to_string()
            })
        );
    }

    #[test]
    fn constructor_default_with_inits_is_rejected() {
        let f = Function::constructor("X")
            .with_initialization("default")
            .with_member_init("m_a(1)");
        assert!(matches!(
            f.validate(),
            Err(StructureError::ConflictingInitialization { .. })
        ));
    }

    #[test]
    fn constructor_without_scope_is_rejected() {
        let f = Function::constructor("");
        assert_eq!(
            f.validate(),
            Err(StructureError::MissingScope {
                construct: "constructor"
            })
        );
    }

    #[test]
    fn empty_function_name_is_rejected() {
        let f = Function::new(TypeDesc::void(), " ");
        assert_eq!(
            f.validate(),
            Err(StructureError::EmptyName {
                construct: "function"
            })
        );
    }

    #[test]
    fn nested_scope_constructor_name() {
        let f = Function::constructor("Outer::Inner");
        assert_eq!(f.name(), "Inner");
        assert_eq!(def(&f), "Outer::Inner::Inner()\n{\n}");
    }
}
