// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! In-memory Dezyne model.
//!
//! **DDD Context:** Model
//!
//! The model is an arena: a flat vector of [`Element`]s addressed by stable
//! [`ElementId`] handles. Elements carry their fully-qualified name; types
//! declared inside an interface (enums, subints, externs) are separate
//! elements whose FQN lies inside the interface namespace.
//!
//! References between elements (a port's interface, an event's reply type, a
//! formal's type) are kept as written in the source model, as [`TypeRef`]s,
//! and are resolved by the shell builder against the symbol table.
//!
//! Models are normally produced by an external importer. [`ModelBuilder`]
//! offers a fluent way to build them in code:
//!
//! ```
//! use dznshell_core::model::{Event, Formal, ModelBuilder, Port};
//!
//! let model = ModelBuilder::new()
//!     .extern_type("My.IToaster.Millis", "size_t")
//!     .interface(
//!         "My.IToaster",
//!         vec![
//!             Event::in_event("Toast", "void").with_formal(Formal::input("time", "Millis")),
//!             Event::out_event("Done"),
//!         ],
//!     )
//!     .component("My.Toaster", vec![Port::provides("api", "IToaster")])
//!     .build()
//!     .unwrap();
//! assert_eq!(model.len(), 3);
//! ```

use std::fmt;

use ecow::EcoString;

use crate::error::ModelError;
use crate::scoping::{NamespaceIds, NamespaceIdsError};

/// Stable handle to an element in a [`Model`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u32);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A type or interface name as written in the model, e.g. `IToaster` or
/// `My.Project.IToaster.Result`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeRef(EcoString);

impl TypeRef {
    #[must_use]
    pub fn new(text: impl Into<EcoString>) -> Self {
        Self(text.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The built-in type this reference names, if any.
    #[must_use]
    pub fn builtin(&self) -> Option<Builtin> {
        match self.0.as_str() {
            "void" => Some(Builtin::Void),
            "bool" => Some(Builtin::Bool),
            _ => None,
        }
    }

    /// Parse the reference into namespace identifiers.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a non-empty dotted or `::` name.
    pub fn parse(&self) -> Result<NamespaceIds, NamespaceIdsError> {
        NamespaceIds::parse_non_empty(&self.0)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeRef {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// Types built into the modeling language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Void,
    Bool,
}

/// Port direction as seen from the component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PortDirection {
    Provides,
    Requires,
}

impl PortDirection {
    /// `"Provides"` or `"Requires"`, used to prefix accessor names.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            PortDirection::Provides => "Provides",
            PortDirection::Requires => "Requires",
        }
    }
}

impl fmt::Display for PortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortDirection::Provides => write!(f, "provides"),
            PortDirection::Requires => write!(f, "requires"),
        }
    }
}

/// A component or system port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Port {
    pub name: EcoString,
    pub direction: PortDirection,
    pub interface: TypeRef,
    /// Satisfied externally through the locator, never proxied by a shell.
    pub injected: bool,
}

impl Port {
    #[must_use]
    pub fn provides(name: impl Into<EcoString>, interface: impl Into<TypeRef>) -> Self {
        Self {
            name: name.into(),
            direction: PortDirection::Provides,
            interface: interface.into(),
            injected: false,
        }
    }

    #[must_use]
    pub fn requires(name: impl Into<EcoString>, interface: impl Into<TypeRef>) -> Self {
        Self {
            name: name.into(),
            direction: PortDirection::Requires,
            interface: interface.into(),
            injected: false,
        }
    }

    /// Mark the port as injected.
    #[must_use]
    pub fn injected(mut self) -> Self {
        self.injected = true;
        self
    }
}

/// Event direction as seen from the provider of an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventDirection {
    In,
    Out,
}

/// Direction of an event parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormalDirection {
    In,
    Out,
    InOut,
}

/// An event parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formal {
    pub name: EcoString,
    pub type_name: TypeRef,
    pub direction: FormalDirection,
}

impl Formal {
    #[must_use]
    pub fn new(
        name: impl Into<EcoString>,
        type_name: impl Into<TypeRef>,
        direction: FormalDirection,
    ) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            direction,
        }
    }

    #[must_use]
    pub fn input(name: impl Into<EcoString>, type_name: impl Into<TypeRef>) -> Self {
        Self::new(name, type_name, FormalDirection::In)
    }

    #[must_use]
    pub fn output(name: impl Into<EcoString>, type_name: impl Into<TypeRef>) -> Self {
        Self::new(name, type_name, FormalDirection::Out)
    }
}

/// An interface event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub name: EcoString,
    pub direction: EventDirection,
    pub reply: TypeRef,
    pub formals: Vec<Formal>,
}

impl Event {
    #[must_use]
    pub fn in_event(name: impl Into<EcoString>, reply: impl Into<TypeRef>) -> Self {
        Self {
            name: name.into(),
            direction: EventDirection::In,
            reply: reply.into(),
            formals: Vec::new(),
        }
    }

    /// Out-events never carry a reply.
    #[must_use]
    pub fn out_event(name: impl Into<EcoString>) -> Self {
        Self {
            name: name.into(),
            direction: EventDirection::Out,
            reply: TypeRef::new("void"),
            formals: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_formal(mut self, formal: Formal) -> Self {
        self.formals.push(formal);
        self
    }
}

/// A component instance inside a system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    pub name: EcoString,
    pub component: TypeRef,
}

impl Instance {
    #[must_use]
    pub fn new(name: impl Into<EcoString>, component: impl Into<TypeRef>) -> Self {
        Self {
            name: name.into(),
            component: component.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub fqn: NamespaceIds,
    pub ports: Vec<Port>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct System {
    pub fqn: NamespaceIds,
    pub ports: Vec<Port>,
    pub instances: Vec<Instance>,
}

/// A component implemented by hand-written code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Foreign {
    pub fqn: NamespaceIds,
    pub ports: Vec<Port>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    pub fqn: NamespaceIds,
    pub events: Vec<Event>,
}

impl Interface {
    /// Events in declaration order that flow in `direction`.
    pub fn events(&self, direction: EventDirection) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(move |e| e.direction == direction)
    }

    #[must_use]
    pub fn event(&self, name: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.name == name)
    }
}

/// A data type defined by target-language text, e.g. `size_t`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extern {
    pub fqn: NamespaceIds,
    pub value: EcoString,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enum {
    pub fqn: NamespaceIds,
    pub fields: Vec<EcoString>,
}

/// A bounded integer type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubInt {
    pub fqn: NamespaceIds,
    pub min: i64,
    pub max: i64,
}

/// The kind of an [`Element`], for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Component,
    System,
    Foreign,
    Interface,
    Extern,
    Enum,
    SubInt,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementKind::Component => "component",
            ElementKind::System => "system",
            ElementKind::Foreign => "foreign component",
            ElementKind::Interface => "interface",
            ElementKind::Extern => "extern type",
            ElementKind::Enum => "enum",
            ElementKind::SubInt => "subint",
        };
        f.write_str(name)
    }
}

/// A named element of the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Component(Component),
    System(System),
    Foreign(Foreign),
    Interface(Interface),
    Extern(Extern),
    Enum(Enum),
    SubInt(SubInt),
}

impl Element {
    #[must_use]
    pub fn fqn(&self) -> &NamespaceIds {
        match self {
            Element::Component(c) => &c.fqn,
            Element::System(s) => &s.fqn,
            Element::Foreign(f) => &f.fqn,
            Element::Interface(i) => &i.fqn,
            Element::Extern(e) => &e.fqn,
            Element::Enum(e) => &e.fqn,
            Element::SubInt(s) => &s.fqn,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ElementKind {
        match self {
            Element::Component(_) => ElementKind::Component,
            Element::System(_) => ElementKind::System,
            Element::Foreign(_) => ElementKind::Foreign,
            Element::Interface(_) => ElementKind::Interface,
            Element::Extern(_) => ElementKind::Extern,
            Element::Enum(_) => ElementKind::Enum,
            Element::SubInt(_) => ElementKind::SubInt,
        }
    }

    /// True for elements a shell can be generated around.
    #[must_use]
    pub fn is_encapsulatable(&self) -> bool {
        matches!(self, Element::Component(_) | Element::System(_))
    }
}

/// The arena of model elements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Model {
    elements: Vec<Element>,
}

impl Model {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an element and return its handle.
    pub fn push(&mut self, element: Element) -> ElementId {
        let id = ElementId(u32::try_from(self.elements.len()).unwrap_or(u32::MAX));
        self.elements.push(element);
        id
    }

    #[must_use]
    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.0 as usize)
    }

    /// All elements with their handles, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (ElementId, &Element)> {
        self.elements
            .iter()
            .enumerate()
            .filter_map(|(index, element)| u32::try_from(index).ok().map(|i| (ElementId(i), element)))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// True if at least one component or system exists.
    #[must_use]
    pub fn has_encapsulatable(&self) -> bool {
        self.elements.iter().any(Element::is_encapsulatable)
    }
}

/// Fluent construction of a [`Model`].
///
/// Element names are parsed as they are added; the first malformed name is
/// reported by [`ModelBuilder::build`].
#[derive(Debug, Default)]
pub struct ModelBuilder {
    model: Model,
    error: Option<ModelError>,
}

impl ModelBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn add(mut self, fqn: &str, make: impl FnOnce(NamespaceIds) -> Element) -> Self {
        if self.error.is_some() {
            return self;
        }
        match NamespaceIds::parse_non_empty(fqn) {
            Ok(ids) => {
                self.model.push(make(ids));
            }
            Err(source) => {
                self.error = Some(ModelError::InvalidElementName {
                    text: fqn.to_string(),
                    source,
                });
            }
        }
        self
    }

    #[must_use]
    pub fn component(self, fqn: &str, ports: Vec<Port>) -> Self {
        self.add(fqn, |fqn| Element::Component(Component { fqn, ports }))
    }

    #[must_use]
    pub fn system(self, fqn: &str, ports: Vec<Port>, instances: Vec<Instance>) -> Self {
        self.add(fqn, |fqn| {
            Element::System(System {
                fqn,
                ports,
                instances,
            })
        })
    }

    #[must_use]
    pub fn foreign(self, fqn: &str, ports: Vec<Port>) -> Self {
        self.add(fqn, |fqn| Element::Foreign(Foreign { fqn, ports }))
    }

    #[must_use]
    pub fn interface(self, fqn: &str, events: Vec<Event>) -> Self {
        self.add(fqn, |fqn| Element::Interface(Interface { fqn, events }))
    }

    #[must_use]
    pub fn extern_type(self, fqn: &str, value: &str) -> Self {
        let value = EcoString::from(value);
        self.add(fqn, |fqn| Element::Extern(Extern { fqn, value }))
    }

    #[must_use]
    pub fn enumeration<I, S>(self, fqn: &str, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<EcoString>,
    {
        let fields = fields.into_iter().map(Into::into).collect();
        self.add(fqn, |fqn| Element::Enum(Enum { fqn, fields }))
    }

    #[must_use]
    pub fn subint(self, fqn: &str, min: i64, max: i64) -> Self {
        self.add(fqn, |fqn| Element::SubInt(SubInt { fqn, min, max }))
    }

    /// Finish the model.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidElementName`] for the first malformed
    /// element name.
    pub fn build(self) -> Result<Model, ModelError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.model),
        }
    }
}
