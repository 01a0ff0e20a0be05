// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Binds the references of an encapsulee to model elements.
//!
//! **DDD Context:** Shell Generation / Resolution
//!
//! Port interfaces are resolved in the scope enclosing the encapsulee; event
//! reply and parameter types in the scope of their interface, so types nested
//! in an interface are found first.

use ecow::EcoString;
use tracing::debug;

use crate::error::{ConfigurationError, ModelError, ShellError};
use crate::model::{
    Builtin, Element, ElementId, Event, EventDirection, Formal, FormalDirection, Interface, Model,
    Port, System, TypeRef,
};
use crate::scoping::{NamespaceIds, ResolutionError, SymbolTable, is_identifier};

type Result<T> = std::result::Result<T, ShellError>;

/// The type of an event reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ReplyType {
    Void,
    Bool,
    Enum {
        fqn: NamespaceIds,
        fields: Vec<EcoString>,
    },
    SubInt,
    Extern(EcoString),
}

impl ReplyType {
    /// C++ spelling of the type.
    pub(crate) fn cpp_type(&self) -> String {
        match self {
            ReplyType::Void => "void".to_string(),
            ReplyType::Bool => "bool".to_string(),
            ReplyType::Enum { fqn, .. } => format!("::{}", fqn.to_cpp()),
            ReplyType::SubInt => "int".to_string(),
            ReplyType::Extern(value) => value.to_string(),
        }
    }

    /// C++ spelling of one value of the type, if it has such a value.
    pub(crate) fn cpp_value(&self, value: &str) -> Option<String> {
        match self {
            ReplyType::Bool if value == "true" || value == "false" => Some(value.to_string()),
            ReplyType::Enum { fqn, fields } if fields.iter().any(|f| f == value) => {
                Some(format!("::{}::{value}", fqn.to_cpp()))
            }
            _ => None,
        }
    }

    /// All values of an enumerable reply type.
    pub(crate) fn values(&self) -> Vec<EcoString> {
        match self {
            ReplyType::Bool => vec!["false".into(), "true".into()],
            ReplyType::Enum { fields, .. } => fields.clone(),
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ResolvedFormal<'m> {
    pub formal: &'m Formal,
    pub cpp_type: EcoString,
}

impl ResolvedFormal<'_> {
    /// `size_t time`, or `size_t& time` for out and inout parameters.
    pub(crate) fn as_param(&self) -> String {
        let reference = if self.formal.direction == FormalDirection::In {
            ""
        } else {
            "&"
        };
        format!("{}{reference} {}", self.cpp_type, self.formal.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ResolvedEvent<'m> {
    pub event: &'m Event,
    pub reply: ReplyType,
    pub formals: Vec<ResolvedFormal<'m>>,
}

impl ResolvedEvent<'_> {
    pub(crate) fn name(&self) -> &str {
        &self.event.name
    }

    pub(crate) fn direction(&self) -> EventDirection {
        self.event.direction
    }

    /// Lambda parameter list including parentheses, empty without formals.
    pub(crate) fn lambda_params(&self) -> String {
        if self.formals.is_empty() {
            return String::new();
        }
        let params: Vec<String> = self.formals.iter().map(ResolvedFormal::as_param).collect();
        format!("({})", params.join(", "))
    }

    /// Argument list of a forwarding call.
    pub(crate) fn call_args(&self) -> String {
        let args: Vec<&str> = self.formals.iter().map(|f| f.formal.name.as_str()).collect();
        args.join(", ")
    }

    /// `, a, b` for every in-parameter, appended to a `[&` capture list.
    pub(crate) fn value_captures(&self) -> String {
        self.formals
            .iter()
            .filter(|f| f.formal.direction == FormalDirection::In)
            .map(|f| format!(", {}", f.formal.name))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ResolvedInterface<'m> {
    pub fqn: NamespaceIds,
    pub events: Vec<ResolvedEvent<'m>>,
}

impl<'m> ResolvedInterface<'m> {
    pub(crate) fn name(&self) -> &str {
        self.fqn.name().map_or("", EcoString::as_str)
    }

    pub(crate) fn events(&self, direction: EventDirection) -> impl Iterator<Item = &ResolvedEvent<'m>> {
        self.events.iter().filter(move |e| e.direction() == direction)
    }

    pub(crate) fn event(&self, name: &str) -> Option<&ResolvedEvent<'m>> {
        self.events.iter().find(|e| e.name() == name)
    }
}

/// The element a shell is generated around.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Encapsulee<'m> {
    pub fqn: &'m NamespaceIds,
    pub ports: &'m [Port],
    pub system: Option<&'m System>,
}

impl Encapsulee<'_> {
    pub(crate) fn name(&self) -> &str {
        self.fqn.name().map_or("", EcoString::as_str)
    }

    /// The namespace enclosing the encapsulee.
    pub(crate) fn scope(&self) -> NamespaceIds {
        self.fqn.parent()
    }
}

/// Resolution of references over one model.
pub(crate) struct Resolver<'m> {
    model: &'m Model,
    symbols: SymbolTable,
}

impl<'m> Resolver<'m> {
    pub(crate) fn new(model: &'m Model) -> Self {
        Self {
            model,
            symbols: SymbolTable::from_model(model),
        }
    }

    fn element(&self, id: ElementId) -> Result<&'m Element> {
        self.model.get(id).ok_or_else(|| {
            ShellError::Internal(crate::error::InternalInvariantError::Message(format!(
                "symbol table refers to missing element {id}"
            )))
        })
    }

    fn parse_ref(reference: &TypeRef, context: impl FnOnce() -> String) -> Result<NamespaceIds> {
        reference.parse().map_err(|source| {
            ShellError::Model(ModelError::MalformedReference {
                text: reference.to_string(),
                context: context(),
                source,
            })
        })
    }

    /// Look up the encapsulee. It must be a unique component or system.
    pub(crate) fn encapsulee(&self, fqn: &NamespaceIds) -> Result<Encapsulee<'m>> {
        let id = self
            .symbols
            .resolve_element(fqn, &NamespaceIds::global())
            .map_err(|error| match error {
                ResolutionError::AmbiguousSymbol { candidates, .. } => {
                    ConfigurationError::AmbiguousEncapsulee {
                        fqn: fqn.clone(),
                        candidates,
                    }
                }
                _ => ConfigurationError::UnknownEncapsulee { fqn: fqn.clone() },
            })?;
        let element = self.element(id)?;
        let (ports, system) = match element {
            Element::Component(component) => (component.ports.as_slice(), None),
            Element::System(system) => (system.ports.as_slice(), Some(system)),
            Element::Foreign(_)
            | Element::Interface(_)
            | Element::Extern(_)
            | Element::Enum(_)
            | Element::SubInt(_) => {
                return Err(ConfigurationError::NotEncapsulatable {
                    fqn: element.fqn().clone(),
                    kind: element.kind(),
                }
                .into());
            }
        };
        Ok(Encapsulee {
            fqn: element.fqn(),
            ports,
            system,
        })
    }

    /// Check that every system instance refers to a component-like element.
    pub(crate) fn check_instances(&self, system: &System) -> Result<()> {
        let scope = system.fqn.parent();
        for instance in &system.instances {
            let reference = Self::parse_ref(&instance.component, || {
                format!("instance '{}' of '{}'", instance.name, system.fqn)
            })?;
            let element = self.element(self.symbols.resolve_element(&reference, &scope)?)?;
            match element {
                Element::Component(_) | Element::System(_) | Element::Foreign(_) => {}
                Element::Interface(_) | Element::Extern(_) | Element::Enum(_) | Element::SubInt(_) => {
                    return Err(ModelError::NotAComponent {
                        instance: instance.name.clone(),
                        fqn: element.fqn().clone(),
                        kind: element.kind(),
                    }
                    .into());
                }
            }
        }
        Ok(())
    }

    /// Resolve the interface of `port` used inside `scope`.
    pub(crate) fn interface(&self, port: &Port, scope: &NamespaceIds) -> Result<ResolvedInterface<'m>> {
        let reference = Self::parse_ref(&port.interface, || format!("port '{}'", port.name))?;
        let element = self.element(self.symbols.resolve_element(&reference, scope)?)?;
        let Element::Interface(interface) = element else {
            return Err(ModelError::NotAnInterface {
                port: port.name.clone(),
                fqn: element.fqn().clone(),
                kind: element.kind(),
            }
            .into());
        };
        let events = interface
            .events
            .iter()
            .map(|event| self.event(interface, event))
            .collect::<Result<Vec<_>>>()?;
        debug!(port = %port.name, interface = %interface.fqn, "resolved port interface");
        Ok(ResolvedInterface {
            fqn: interface.fqn.clone(),
            events,
        })
    }

    fn event(&self, interface: &'m Interface, event: &'m Event) -> Result<ResolvedEvent<'m>> {
        check_identifier("event", &event.name)?;
        let reply = match event.reply.builtin() {
            Some(Builtin::Void) => ReplyType::Void,
            Some(Builtin::Bool) => ReplyType::Bool,
            None => {
                let what = format!("reply type of event '{}'", event.name);
                match self.data_type(&event.reply, &interface.fqn, &what)? {
                    Element::Enum(e) => ReplyType::Enum {
                        fqn: e.fqn.clone(),
                        fields: e.fields.clone(),
                    },
                    Element::SubInt(_) => ReplyType::SubInt,
                    Element::Extern(e) => ReplyType::Extern(e.value.clone()),
                    other => return Err(not_a_data_type(what, other)),
                }
            }
        };
        let mut formals = Vec::with_capacity(event.formals.len());
        for formal in &event.formals {
            check_identifier("parameter", &formal.name)?;
            if event.direction == EventDirection::Out && formal.direction != FormalDirection::In {
                return Err(ModelError::OutEventWithOutParameter {
                    interface: interface.fqn.clone(),
                    event: event.name.clone(),
                    formal: formal.name.clone(),
                }
                .into());
            }
            let cpp_type = match formal.type_name.builtin() {
                Some(Builtin::Bool) => EcoString::from("bool"),
                Some(Builtin::Void) => {
                    return Err(ModelError::MalformedReference {
                        text: "void".to_string(),
                        context: format!("parameter '{}' of event '{}'", formal.name, event.name),
                        source: crate::scoping::NamespaceIdsError::Empty,
                    }
                    .into());
                }
                None => {
                    let what = format!("type of parameter '{}'", formal.name);
                    match self.data_type(&formal.type_name, &interface.fqn, &what)? {
                        Element::Extern(e) => e.value.clone(),
                        Element::Enum(e) => EcoString::from(format!("::{}", e.fqn.to_cpp())),
                        Element::SubInt(_) => EcoString::from("int"),
                        other => return Err(not_a_data_type(what, other)),
                    }
                }
            };
            formals.push(ResolvedFormal { formal, cpp_type });
        }
        Ok(ResolvedEvent {
            event,
            reply,
            formals,
        })
    }

    fn data_type(&self, reference: &TypeRef, scope: &NamespaceIds, what: &str) -> Result<&'m Element> {
        let ids = Self::parse_ref(reference, || what.to_string())?;
        self.element(self.symbols.resolve_element(&ids, scope)?)
    }
}

fn not_a_data_type(what: String, element: &Element) -> ShellError {
    ModelError::NotADataType {
        what,
        fqn: element.fqn().clone(),
        kind: element.kind(),
    }
    .into()
}

pub(crate) fn check_identifier(what: &'static str, name: &EcoString) -> Result<()> {
    if is_identifier(name) {
        Ok(())
    } else {
        Err(ModelError::InvalidIdentifier {
            what,
            name: name.clone(),
        }
        .into())
    }
}
