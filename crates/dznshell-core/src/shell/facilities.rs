// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Dezyne runtime facilities of a shell: runtime, dispatcher and locator.
//!
//! **DDD Context:** Shell Generation / Facilities
//!
//! A shell either owns its facilities, creating them and handing a clone of
//! the user's prototype locator to the encapsulee, or it imports them by
//! reference from the locator it is constructed with. `FacilitiesCheck`
//! rejects a locator that contradicts the chosen strategy at run time.

use ecow::EcoString;

use super::config::FacilitiesOrigin;
use crate::codegen::cpp::{Function, FunctionPrefix, MemberVariable, Node, Param, TypeDesc, TypePostfix};

pub(crate) const DISPATCHER: &str = "m_dispatcher";
pub(crate) const LOCATOR: &str = "m_locator";
pub(crate) const RUNTIME: &str = "m_runtime";

fn locator_ref() -> TypeDesc {
    TypeDesc::verbatim("dzn::locator")
        .with_const()
        .with_postfix(TypePostfix::Reference)
}

/// Facility members and functions of one shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Facilities {
    origin: FacilitiesOrigin,
    /// Fully-qualified C++ name of the shell, used in run-time messages.
    shell_fqn: EcoString,
    /// Unqualified shell name, the scope of member definitions.
    shell_name: EcoString,
}

impl Facilities {
    pub(crate) fn new(origin: FacilitiesOrigin, shell_fqn: impl Into<EcoString>, shell_name: impl Into<EcoString>) -> Self {
        Self {
            origin,
            shell_fqn: shell_fqn.into(),
            shell_name: shell_name.into(),
        }
    }

    pub(crate) fn origin(&self) -> FacilitiesOrigin {
        self.origin
    }

    pub(crate) fn system_includes(&self) -> Vec<&'static str> {
        match self.origin {
            FacilitiesOrigin::OwnedByShell => vec!["dzn/locator.hh", "dzn/pump.hh", "dzn/runtime.hh"],
            FacilitiesOrigin::ImportedViaLocator => vec!["dzn/locator.hh", "dzn/pump.hh"],
        }
    }

    fn param_name(&self) -> &'static str {
        match self.origin {
            FacilitiesOrigin::OwnedByShell => "prototypeLocator",
            FacilitiesOrigin::ImportedViaLocator => "locator",
        }
    }

    /// The locator parameter of the shell constructor.
    pub(crate) fn constructor_param(&self) -> Param {
        Param::new(locator_ref(), self.param_name())
    }

    /// Member initializers of the facilities, followed by the encapsulee's.
    pub(crate) fn member_inits(&self, encapsulee_member: &str) -> Vec<EcoString> {
        match self.origin {
            FacilitiesOrigin::OwnedByShell => vec![
                EcoString::from(format!(
                    "{LOCATOR}(std::move(FacilitiesCheck({}).clone().set({RUNTIME}).set({DISPATCHER})))",
                    self.param_name()
                )),
                EcoString::from(format!("{encapsulee_member}({LOCATOR})")),
            ],
            FacilitiesOrigin::ImportedViaLocator => vec![
                EcoString::from(format!(
                    "{DISPATCHER}(FacilitiesCheck({}).get<dzn::pump>())",
                    self.param_name()
                )),
                EcoString::from(format!("{encapsulee_member}({})", self.param_name())),
            ],
        }
    }

    /// The `// Facilities` member block.
    pub(crate) fn member_variables(&self) -> Node {
        let mut members = vec![Node::comment("Facilities")];
        match self.origin {
            FacilitiesOrigin::OwnedByShell => {
                members.push(Node::Variable(MemberVariable::new(
                    TypeDesc::verbatim("dzn::runtime"),
                    RUNTIME,
                )));
                members.push(Node::Variable(MemberVariable::new(
                    TypeDesc::verbatim("dzn::pump"),
                    DISPATCHER,
                )));
                members.push(Node::Variable(MemberVariable::new(
                    TypeDesc::verbatim("dzn::locator"),
                    LOCATOR,
                )));
            }
            FacilitiesOrigin::ImportedViaLocator => {
                members.push(Node::Variable(MemberVariable::new(
                    TypeDesc::verbatim("dzn::pump").with_postfix(TypePostfix::Reference),
                    DISPATCHER,
                )));
            }
        }
        members.push(Node::Blank);
        members.push(Node::Declaration(self.facilities_check()));
        Node::Block(members)
    }

    /// `Locator()` returns the shell's own locator; only owned facilities
    /// have one.
    pub(crate) fn locator_accessor(&self) -> Option<Function> {
        match self.origin {
            FacilitiesOrigin::OwnedByShell => Some(
                Function::new(
                    TypeDesc::verbatim("dzn::locator").with_postfix(TypePostfix::Reference),
                    "Locator",
                )
                .with_scope(self.shell_name.clone())
                .with_body(vec![Node::text(&format!("return {LOCATOR};"))]),
            ),
            FacilitiesOrigin::ImportedViaLocator => None,
        }
    }

    /// The `// Facility accessor(s)` block of the public section.
    pub(crate) fn accessor_declarations(&self) -> Node {
        let accessor = match self.locator_accessor() {
            Some(function) => Node::Declaration(function),
            None => Node::comment("<none>"),
        };
        Node::Block(vec![Node::comment("Facility accessor(s)"), accessor])
    }

    /// Static check of the locator the shell is constructed with.
    pub(crate) fn facilities_check(&self) -> Function {
        let (comparison, problem) = match self.origin {
            FacilitiesOrigin::OwnedByShell => ("!= nullptr", "Overlapping"),
            FacilitiesOrigin::ImportedViaLocator => ("== nullptr", "Missing"),
        };
        let checks = [("dzn::pump", "dispatcher"), ("dzn::runtime", "Dezyne runtime")];
        let mut body = Vec::new();
        for (facility, description) in checks {
            let message = match self.origin {
                FacilitiesOrigin::OwnedByShell => {
                    format!("{}: {problem} {description} found ({facility})", self.shell_fqn)
                }
                FacilitiesOrigin::ImportedViaLocator => {
                    format!("{}: {} missing ({facility})", self.shell_fqn, capitalize(description))
                }
            };
            body.push(Node::braced(
                &format!("if (locator.try_get<{facility}>() {comparison})"),
                vec![Node::text(&format!("throw std::runtime_error(\"{message}\");"))],
            ));
            body.push(Node::Blank);
        }
        body.push(Node::text("return locator;"));
        Function::new(locator_ref(), "FacilitiesCheck")
            .with_scope(self.shell_name.clone())
            .with_prefix(FunctionPrefix::Static)
            .with_param(Param::new(locator_ref(), "locator"))
            .with_body(body)
    }
}

/// Uppercase the first character.
pub(crate) fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
