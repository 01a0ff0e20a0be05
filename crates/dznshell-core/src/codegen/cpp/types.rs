// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! C++ names, type descriptions and parameters.

use std::fmt;

use ecow::EcoString;

use super::StructureError;
use crate::scoping::NamespaceIds;

/// A C++ fully-qualified name, optionally prefixed with the root scope `::`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fqn {
    ids: NamespaceIds,
    root: bool,
}

impl Fqn {
    #[must_use]
    pub fn new(ids: NamespaceIds) -> Self {
        Self { ids, root: false }
    }

    /// Prefixed with `::` so lookup starts in the global namespace.
    #[must_use]
    pub fn rooted(ids: NamespaceIds) -> Self {
        Self { ids, root: true }
    }

    #[must_use]
    pub fn ids(&self) -> &NamespaceIds {
        &self.ids
    }
}

impl fmt::Display for Fqn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.root && !self.ids.is_global() {
            f.write_str("::")?;
        }
        f.write_str(&self.ids.to_cpp())
    }
}

/// Suffix applied to a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TypePostfix {
    #[default]
    None,
    Reference,
    Pointer,
}

/// A (possibly templated, const, reference or pointer) C++ type.
///
/// ```
/// use dznshell_core::codegen::cpp::{TypeDesc, TypePostfix};
///
/// let ty = TypeDesc::verbatim("dzn::locator").with_const().with_postfix(TypePostfix::Reference);
/// assert_eq!(ty.to_string(), "const dzn::locator&");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeDesc {
    base: EcoString,
    template_args: Vec<TypeDesc>,
    postfix: TypePostfix,
    is_const: bool,
    default_value: Option<EcoString>,
}

impl TypeDesc {
    /// A type spelled as given, e.g. `size_t` or `unsigned int`.
    #[must_use]
    pub fn verbatim(base: impl Into<EcoString>) -> Self {
        Self {
            base: base.into(),
            template_args: Vec::new(),
            postfix: TypePostfix::None,
            is_const: false,
            default_value: None,
        }
    }

    #[must_use]
    pub fn fqn(fqn: &Fqn) -> Self {
        Self::verbatim(fqn.to_string())
    }

    #[must_use]
    pub fn void() -> Self {
        Self::verbatim("void")
    }

    /// `base<arg>`.
    #[must_use]
    pub fn template(base: impl Into<EcoString>, arg: TypeDesc) -> Self {
        Self::verbatim(base).with_template_arg(arg)
    }

    #[must_use]
    pub fn with_template_arg(mut self, arg: TypeDesc) -> Self {
        self.template_args.push(arg);
        self
    }

    #[must_use]
    pub fn with_const(mut self) -> Self {
        self.is_const = true;
        self
    }

    #[must_use]
    pub fn with_postfix(mut self, postfix: TypePostfix) -> Self {
        self.postfix = postfix;
        self
    }

    /// Default argument used in declarations only.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<EcoString>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    #[must_use]
    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    pub(crate) fn validate(&self) -> Result<(), StructureError> {
        if self.base.trim().is_empty() {
            return Err(StructureError::EmptyType);
        }
        self.template_args.iter().try_for_each(TypeDesc::validate)
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_const {
            f.write_str("const ")?;
        }
        f.write_str(&self.base)?;
        if !self.template_args.is_empty() {
            let args: Vec<String> = self.template_args.iter().map(ToString::to_string).collect();
            write!(f, "<{}>", args.join(", "))?;
        }
        match self.postfix {
            TypePostfix::None => Ok(()),
            TypePostfix::Reference => f.write_str("&"),
            TypePostfix::Pointer => f.write_str("*"),
        }
    }
}

/// A function parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Param {
    ty: TypeDesc,
    name: EcoString,
}

impl Param {
    #[must_use]
    pub fn new(ty: TypeDesc, name: impl Into<EcoString>) -> Self {
        Self {
            ty,
            name: name.into(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declaration form, including the default value if present.
    #[must_use]
    pub fn as_decl(&self) -> String {
        match self.ty.default_value() {
            Some(value) => format!("{} {} = {value}", self.ty, self.name),
            None => self.as_def(),
        }
    }

    /// Definition form, never with a default value.
    #[must_use]
    pub fn as_def(&self) -> String {
        format!("{} {}", self.ty, self.name)
    }

    pub(crate) fn validate(&self) -> Result<(), StructureError> {
        self.ty.validate()?;
        if self.name.trim().is_empty() {
            return Err(StructureError::EmptyName {
                construct: "parameter",
            });
        }
        Ok(())
    }
}
