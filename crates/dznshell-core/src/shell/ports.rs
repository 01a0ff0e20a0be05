// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Boundary ports of a shell.
//!
//! **DDD Context:** Shell Generation / Port Wiring
//!
//! An STS port is handed out as is; its accessor refers straight to the
//! encapsulee's port. An MTS port is proxied by a boundary port member of the
//! shell whose functors post every event crossing the boundary onto the
//! dispatcher: in-events of provides ports synchronously through
//! `dzn::shell`, out-events of requires ports asynchronously.

use ecow::EcoString;

use super::artifact::Wiring;
use super::classifier::PortClass;
use super::config::RuntimeSemantics;
use super::facilities::{DISPATCHER, capitalize};
use super::resolve::{ResolvedEvent, ResolvedInterface};
use crate::codegen::cpp::{Fqn, Function, MemberVariable, Node, TypeDesc};
use crate::model::{EventDirection, Port, PortDirection};
use crate::scoping::NamespaceIds;

/// Name of the encapsulee member of every shell.
pub(crate) const ENCAPSULEE: &str = "m_encapsulee";

/// A non-injected port of the encapsulee with its resolved interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ShellPort<'m> {
    pub port: &'m Port,
    pub semantics: RuntimeSemantics,
    pub interface: ResolvedInterface<'m>,
    /// Arbitrated between clients; see the `arbitration` module.
    pub multi_client: bool,
}

impl<'m> ShellPort<'m> {
    /// `None` for injected ports.
    pub(crate) fn new(port: &'m Port, class: PortClass, interface: ResolvedInterface<'m>) -> Option<Self> {
        let semantics = class.semantics()?;
        Some(Self {
            port,
            semantics,
            interface,
            multi_client: false,
        })
    }

    pub(crate) fn name(&self) -> &str {
        &self.port.name
    }

    pub(crate) fn direction(&self) -> PortDirection {
        self.port.direction
    }

    pub(crate) fn is_mts(&self) -> bool {
        self.semantics == RuntimeSemantics::Mts
    }

    /// `::My::Project::IToaster`.
    pub(crate) fn interface_type(&self) -> TypeDesc {
        TypeDesc::fqn(&Fqn::rooted(self.interface.fqn.clone()))
    }

    /// The encapsulee's own port, e.g. `m_encapsulee.api`.
    pub(crate) fn encapsulee_port(&self) -> String {
        format!("{ENCAPSULEE}.{}", self.port.name)
    }

    /// `m_ppApi` or `m_rpHeater`, for MTS ports only.
    pub(crate) fn boundary_name(&self) -> Option<String> {
        if !self.is_mts() {
            return None;
        }
        let prefix = match self.direction() {
            PortDirection::Provides => "m_pp",
            PortDirection::Requires => "m_rp",
        };
        Some(format!("{prefix}{}", capitalize(&self.port.name)))
    }

    pub(crate) fn boundary_member(&self) -> Option<MemberVariable> {
        self.boundary_name()
            .map(|name| MemberVariable::new(self.interface_type(), name))
    }

    /// The port an accessor hands out.
    pub(crate) fn accessor_target(&self) -> String {
        self.boundary_name().unwrap_or_else(|| self.encapsulee_port())
    }

    /// `ProvidesApi`, `RequiresHeater`.
    pub(crate) fn accessor_name(&self) -> String {
        format!("{}{}", self.direction().title(), capitalize(&self.port.name))
    }

    /// `::Dzn::Mts<::My::Project::IToaster>`.
    pub(crate) fn strict_type(&self, support_ns: &NamespaceIds) -> TypeDesc {
        let enclosure = support_ns
            .child(self.semantics.enclosure())
            .map(|ids| Fqn::rooted(ids).to_string())
            .unwrap_or_else(|_| self.semantics.enclosure().to_string());
        TypeDesc::template(enclosure, self.interface_type())
    }

    /// The strictly typed accessor of a single-client port.
    pub(crate) fn accessor(&self, shell_name: &str, support_ns: &NamespaceIds) -> Function {
        Function::new(self.strict_type(support_ns), self.accessor_name())
            .with_scope(shell_name)
            .with_body(vec![Node::text(&format!("return {{{}}};", self.accessor_target()))])
    }

    /// The boundary member initializer, e.g. `m_ppApi(m_encapsulee.api)`.
    pub(crate) fn member_init(&self) -> Option<EcoString> {
        self.boundary_name()
            .map(|name| EcoString::from(format!("{name}({})", self.encapsulee_port())))
    }

    /// Names the far side of the encapsulee's port in its meta data.
    pub(crate) fn meta_name(&self) -> Option<String> {
        if !self.is_mts() {
            return None;
        }
        let side = match self.direction() {
            PortDirection::Provides => "require",
            PortDirection::Requires => "provide",
        };
        Some(format!(
            "{}.meta.{side}.name = \"{}\";",
            self.encapsulee_port(),
            self.port.name
        ))
    }

    /// Events rerouted through the dispatcher.
    fn rerouted_events(&self) -> impl Iterator<Item = &ResolvedEvent<'m>> {
        let direction = match self.direction() {
            PortDirection::Provides => EventDirection::In,
            PortDirection::Requires => EventDirection::Out,
        };
        let active = self.is_mts();
        self.interface
            .events(direction)
            .filter(move |_| active)
    }

    /// Functor assignments of the boundary port that post onto the
    /// dispatcher. Empty for STS ports.
    pub(crate) fn reroutes(&self) -> Vec<Node> {
        let Some(boundary) = self.boundary_name() else {
            return Vec::new();
        };
        self.rerouted_events()
            .map(|event| {
                let (side, call) = match self.direction() {
                    PortDirection::Provides => (
                        "in",
                        format!(
                            "return dzn::shell({DISPATCHER}, [&{}] {{ return {}.in.{}({}); }});",
                            event.value_captures(),
                            self.encapsulee_port(),
                            event.name(),
                            event.call_args()
                        ),
                    ),
                    PortDirection::Requires => (
                        "out",
                        format!(
                            "return {DISPATCHER}([&{}] {{ return {}.out.{}({}); }});",
                            event.value_captures(),
                            self.encapsulee_port(),
                            event.name(),
                            event.call_args()
                        ),
                    ),
                };
                Node::Block(vec![
                    Node::text(&format!(
                        "{boundary}.{side}.{} = [&]{} {{",
                        event.name(),
                        event.lambda_params()
                    )),
                    Node::Indented(vec![Node::text(&call)]),
                    Node::text("};"),
                ])
            })
            .collect()
    }

    /// Copies the functors the user bound to the boundary port onto the
    /// encapsulee's port, e.g. `m_encapsulee.api.out = m_ppApi.out;`.
    pub(crate) fn forward_functors(&self) -> Option<String> {
        let boundary = self.boundary_name()?;
        let side = match self.direction() {
            PortDirection::Provides => "out",
            PortDirection::Requires => "in",
        };
        Some(format!("{}.{side} = {boundary}.{side};", self.encapsulee_port()))
    }

    pub(crate) fn check_bindings(&self) -> String {
        format!("{}.check_bindings();", self.accessor_target())
    }

    pub(crate) fn wiring(&self) -> Wiring {
        match (self.direction(), self.semantics) {
            (PortDirection::Provides, _) if self.multi_client => Wiring::MultiClientAccessor,
            (PortDirection::Provides, semantics) => Wiring::Accessor(semantics),
            (PortDirection::Requires, RuntimeSemantics::Sts) => Wiring::PassThrough,
            (PortDirection::Requires, RuntimeSemantics::Mts) => Wiring::Dispatched,
        }
    }
}

/// Nodes under a `// title` comment, or `// <none>` when there are none.
pub(crate) fn titled_group(title: &str, nodes: Vec<Node>) -> Node {
    let mut block = vec![Node::comment(title)];
    if nodes.is_empty() {
        block.push(Node::comment("<none>"));
    } else {
        block.extend(nodes);
    }
    Node::Block(block)
}
