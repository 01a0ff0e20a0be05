// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Orchestration of a shell build.
//!
//! **DDD Context:** Shell Generation
//!
//! [`build`] runs its stages strictly in sequence:
//!
//! 1. validate the configuration and find the encapsulee
//! 2. classify its ports
//! 3. resolve interfaces and event types
//! 4. assemble the shell skeleton (facilities, constructor, `FinalConstruct`)
//! 5. add the strictly typed accessors of the provides ports
//! 6. add the proxy wiring of the requires ports
//! 7. merge in multi-client arbitration when configured
//! 8. render the header, source and support files and hash them
//!
//! Every stage either succeeds completely or returns an error; no partial
//! artifact ever leaves this module.

use std::collections::HashSet;

use ecow::EcoString;
use tracing::{debug, info, instrument};

use super::arbitration::{self, ArbitrationPlan};
use super::artifact::{GeneratedArtifact, GeneratedFile, PortWiring, Wiring};
use super::classifier::classify;
use super::config::Configuration;
use super::facilities::Facilities;
use super::overview::{Overview, footer};
use super::ports::{ENCAPSULEE, ShellPort, titled_group};
use super::resolve::{Encapsulee, Resolver, check_identifier};
use super::support_files::{strict_port_filename, strict_port_header, support_namespace};
use crate::codegen::cpp::{
    Access, Fqn, Function, IncludeGroup, MemberVariable, Namespace, Node, Param, Record, RecordKind,
    SourceFile, TypeDesc, TypePostfix,
};
use crate::error::{ConfigurationError, ModelError, Result};
use crate::model::{Model, Port, PortDirection};
use crate::scoping::NamespaceIds;

/// Generate the Advanced Shell described by `config` from `model`.
///
/// # Errors
///
/// Returns a [`crate::ShellError`] when the configuration is invalid, a
/// reference cannot be resolved or the model is ill-formed.
#[instrument(skip_all, fields(encapsulee = %config.encapsulee()))]
pub fn build(model: &Model, config: &Configuration) -> Result<GeneratedArtifact> {
    if !model.has_encapsulatable() {
        return Err(ModelError::EmptyModel.into());
    }
    let fqn = NamespaceIds::parse_non_empty(config.encapsulee()).map_err(|source| {
        ConfigurationError::InvalidEncapsuleeName {
            text: config.encapsulee().to_string(),
            source,
        }
    })?;
    let source_basename = config.source_basename()?;
    let target_basename = config.target_basename()?;
    let support_ns = support_namespace(config.support_files_ns_prefix())?;

    let resolver = Resolver::new(model);
    let encapsulee = resolver.encapsulee(&fqn)?;
    if let Some(system) = encapsulee.system {
        resolver.check_instances(system)?;
    }
    check_ports(encapsulee.ports)?;
    debug!(encapsulee = %encapsulee.fqn, ports = encapsulee.ports.len(), "validated configuration");

    let classification = classify(config.ports(), encapsulee.fqn, encapsulee.ports)?;
    debug!(
        dispatched = classification.dispatched().count(),
        injected = classification.injected().count(),
        "classified ports"
    );

    let scope = encapsulee.scope();
    let mut ports = Vec::new();
    let mut injected = Vec::new();
    for classified in classification.iter() {
        let interface = resolver.interface(classified.port, &scope)?;
        match ShellPort::new(classified.port, classified.class, interface) {
            Some(port) => ports.push(port),
            None => injected.push(classified.port),
        }
    }
    debug!(ports = ports.len(), "resolved port interfaces");

    let arbitration = match config.ports().multi_client() {
        Some(multi_client) => {
            let plan = arbitration::plan(multi_client, &ports)?;
            for port in &mut ports {
                port.multi_client = port.name() == plan.port();
            }
            debug!(port = plan.port(), "planned multi-client arbitration");
            Some(plan)
        }
        None => None,
    };

    let facilities = Facilities::new(
        config.facilities_origin(),
        cpp_name(&scope, &target_basename),
        target_basename.clone(),
    );
    let shell = Shell {
        encapsulee,
        scope,
        name: target_basename.clone(),
        facilities,
        support_ns,
        ports: &ports,
        arbitration: arbitration.as_ref(),
    };
    let overview = Overview {
        config,
        encapsulee: encapsulee.fqn,
        source_basename: &source_basename,
        target_basename: &target_basename,
        ports: &ports,
        injected: &injected,
    };

    let indent = config.indent();
    let header = SourceFile::new(vec![
        overview.header_comment(),
        Node::Blank,
        shell.includes(&source_basename),
        Node::Blank,
        shell.in_scope(vec![Node::Record(shell.record())]),
        Node::Blank,
        footer(),
    ])
    .render(indent)?;
    let source = SourceFile::new(vec![
        overview.source_comment(),
        Node::Blank,
        Node::Includes(IncludeGroup::system(["dzn/runtime.hh"])),
        Node::Blank,
        Node::Includes(IncludeGroup::project([format!("{target_basename}.hh")])),
        Node::Blank,
        shell.in_scope(vec![Node::Sections(shell.definitions())]),
        Node::Blank,
        footer(),
    ])
    .render(indent)?;
    let strict_port = strict_port_header(&shell.support_ns, config.copyright(), indent)?;
    debug!(
        header_bytes = header.len(),
        source_bytes = source.len(),
        "rendered shell"
    );

    let wiring = encapsulee
        .ports
        .iter()
        .map(|port| PortWiring {
            port: port.name.clone(),
            direction: port.direction,
            wiring: ports
                .iter()
                .find(|p| p.name() == port.name.as_str())
                .map_or(Wiring::Excluded, ShellPort::wiring),
        })
        .collect();
    let artifact = GeneratedArtifact::new(
        target_basename.clone(),
        GeneratedFile::new(format!("{target_basename}.hh"), header, shell.scope.clone()),
        GeneratedFile::new(format!("{target_basename}.cc"), source, shell.scope.clone()),
        vec![strict_port],
        wiring,
    );
    if config.verbose() {
        info!(
            shell = %target_basename,
            encapsulee = %encapsulee.fqn,
            dispatched = artifact.dispatch_count(),
            hash = artifact.content_hash(),
            "generated advanced shell"
        );
    }
    Ok(artifact)
}

/// Port names must be unique identifiers, and only requires ports can be
/// injected.
fn check_ports(ports: &[Port]) -> Result<()> {
    let mut seen = HashSet::new();
    for port in ports {
        check_identifier("port", &port.name)?;
        if !seen.insert(port.name.as_str()) {
            return Err(ModelError::DuplicatePort {
                port: port.name.clone(),
            }
            .into());
        }
        if port.injected && port.direction == PortDirection::Provides {
            return Err(ModelError::InjectedProvidesPort {
                port: port.name.clone(),
            }
            .into());
        }
    }
    Ok(())
}

/// `A::B::Name`, or `Name` in the global namespace.
fn cpp_name(scope: &NamespaceIds, name: &str) -> String {
    if scope.is_global() {
        name.to_string()
    } else {
        format!("{}::{name}", scope.to_cpp())
    }
}

/// Blank lines between `nodes`.
fn spaced(nodes: impl IntoIterator<Item = Node>) -> Vec<Node> {
    let mut spaced = Vec::new();
    for node in nodes {
        if !spaced.is_empty() {
            spaced.push(Node::Blank);
        }
        spaced.push(node);
    }
    spaced
}

/// Everything the skeleton stages need about one shell.
struct Shell<'a, 'm> {
    encapsulee: Encapsulee<'m>,
    scope: NamespaceIds,
    name: EcoString,
    facilities: Facilities,
    support_ns: NamespaceIds,
    ports: &'a [ShellPort<'m>],
    arbitration: Option<&'a ArbitrationPlan>,
}

impl<'a, 'm> Shell<'a, 'm> {
    fn ports(
        &self,
        direction: PortDirection,
    ) -> impl Iterator<Item = &'a ShellPort<'m>> + use<'a, 'm> {
        self.ports.iter().filter(move |p| p.direction() == direction)
    }

    fn multi_client_port(&self) -> Option<(&'a ArbitrationPlan, &'a ShellPort<'m>)> {
        let plan = self.arbitration?;
        let port = self.ports.iter().find(|p| p.multi_client)?;
        Some((plan, port))
    }

    /// Wraps `nodes` in the encapsulee's namespace unless it is global.
    fn in_scope(&self, nodes: Vec<Node>) -> Node {
        if self.scope.is_global() {
            Node::Block(nodes)
        } else {
            Node::Namespace(Namespace::new(self.scope.clone(), nodes))
        }
    }

    fn includes(&self, source_basename: &str) -> Node {
        let mut system = self.facilities.system_includes();
        if self.arbitration.is_some() {
            system.extend(arbitration::SYSTEM_INCLUDES);
        }
        Node::Block(vec![
            Node::Includes(IncludeGroup::system(system)),
            Node::Blank,
            Node::Includes(IncludeGroup::project([
                format!("{source_basename}.hh"),
                strict_port_filename(&self.support_ns),
            ])),
        ])
    }

    fn encapsulee_type(&self) -> TypeDesc {
        TypeDesc::fqn(&Fqn::rooted(self.encapsulee.fqn.clone()))
    }

    fn constructor(&self) -> Function {
        let instance_name = Param::new(
            TypeDesc::verbatim("std::string")
                .with_const()
                .with_postfix(TypePostfix::Reference)
                .with_default("\"\""),
            "encapsuleeInstanceName",
        );
        let mut constructor = Function::constructor(self.name.clone())
            .with_param(self.facilities.constructor_param())
            .with_param(instance_name);
        for init in self
            .facilities
            .member_inits(ENCAPSULEE)
            .into_iter()
            .chain(self.ports.iter().filter_map(ShellPort::member_init))
        {
            constructor = constructor.with_member_init(init);
        }

        let mut meta = vec![Node::text(&format!(
            "{ENCAPSULEE}.dzn_meta.name = encapsuleeInstanceName;"
        ))];
        meta.extend(self.ports.iter().filter_map(|p| p.meta_name()).map(|m| Node::text(&m)));

        let mut body = vec![
            Node::comment("Complete the component meta info of the encapsulee and its boundary ports"),
            Node::Block(meta),
            Node::Blank,
            titled_group(
                "Reroute in-events of boundary provides-port(s) via the dispatcher",
                spaced(self.ports(PortDirection::Provides).flat_map(ShellPort::reroutes)),
            ),
            Node::Blank,
            titled_group(
                "Reroute out-events of boundary requires-port(s) via the dispatcher",
                spaced(self.ports(PortDirection::Requires).flat_map(ShellPort::reroutes)),
            ),
        ];
        if let Some((plan, port)) = self.multi_client_port() {
            body.push(Node::Blank);
            body.push(plan.out_event_routes(port));
        }
        constructor.with_body(body)
    }

    fn final_construct(&self) -> Function {
        let parent = Param::new(
            TypeDesc::verbatim("dzn::meta")
                .with_const()
                .with_postfix(TypePostfix::Pointer)
                .with_default("nullptr"),
            "parentComponentMeta",
        );
        let mut checks: Vec<Node> = self
            .ports
            .iter()
            .map(|p| Node::text(&p.check_bindings()))
            .collect();
        if let Some(plan) = self.arbitration {
            checks.push(plan.check_client_bindings());
        }
        let forwards = |direction: PortDirection| -> Vec<Node> {
            self.ports(direction)
                .filter_map(ShellPort::forward_functors)
                .map(|f| Node::text(&f))
                .collect()
        };
        Function::new(TypeDesc::void(), "FinalConstruct")
            .with_scope(self.name.clone())
            .with_param(parent)
            .with_body(vec![
                titled_group("Check the bindings of all boundary ports", checks),
                Node::Blank,
                titled_group(
                    "Copy the out-functors of boundary provides-port(s) to the encapsulee",
                    forwards(PortDirection::Provides),
                ),
                Node::Blank,
                titled_group(
                    "Copy the in-functors of boundary requires-port(s) to the encapsulee",
                    forwards(PortDirection::Requires),
                ),
                Node::Blank,
                Node::comment("Complete the encapsulee and check its bindings"),
                Node::text(&format!("{ENCAPSULEE}.dzn_meta.parent = parentComponentMeta;")),
                Node::text(&format!("{ENCAPSULEE}.check_bindings();")),
            ])
    }

    fn accessor(&self, port: &ShellPort<'_>) -> Function {
        match self.arbitration {
            Some(plan) if port.multi_client => plan.accessor(port, &self.name, &self.support_ns),
            _ => port.accessor(&self.name, &self.support_ns),
        }
    }

    fn accessors(&self, direction: PortDirection) -> Vec<Function> {
        self.ports(direction).map(|p| self.accessor(p)).collect()
    }

    fn boundary_members(&self, direction: PortDirection) -> Vec<Node> {
        self.ports(direction)
            .filter_map(ShellPort::boundary_member)
            .map(Node::Variable)
            .collect()
    }

    fn record(&self) -> Record {
        let declarations = |functions: Vec<Function>| -> Vec<Node> {
            functions.into_iter().map(Node::Declaration).collect()
        };
        let public = vec![
            Node::Declaration(self.constructor()),
            Node::Declaration(self.final_construct()),
            Node::Blank,
            self.facilities.accessor_declarations(),
            Node::Blank,
            titled_group(
                "Provides port accessor(s)",
                declarations(self.accessors(PortDirection::Provides)),
            ),
            Node::Blank,
            titled_group(
                "Requires port accessor(s)",
                declarations(self.accessors(PortDirection::Requires)),
            ),
        ];
        let mut private = vec![
            self.facilities.member_variables(),
            Node::Blank,
            Node::comment(&format!(
                "The encapsulated component \"{}\"",
                self.encapsulee.name()
            )),
            Node::Variable(MemberVariable::new(self.encapsulee_type(), ENCAPSULEE)),
            Node::Blank,
            titled_group(
                "Boundary provides-port(s) (MTS) to reroute inwards events",
                self.boundary_members(PortDirection::Provides),
            ),
            Node::Blank,
            titled_group(
                "Boundary requires-port(s) (MTS) to reroute outwards events",
                self.boundary_members(PortDirection::Requires),
            ),
        ];
        if let Some((plan, port)) = self.multi_client_port() {
            private.push(Node::Blank);
            private.push(plan.members(port, &self.name));
        }
        Record::new(RecordKind::Struct, self.name.clone())
            .with_section(Access::Default, public)
            .with_section(Access::Private, private)
    }

    /// Member definitions for the source file, in declaration order.
    fn definitions(&self) -> Vec<Node> {
        let mut definitions = vec![
            Node::Definition(self.constructor()),
            Node::Definition(self.final_construct()),
        ];
        definitions.extend(self.facilities.locator_accessor().map(Node::Definition));
        for direction in [PortDirection::Provides, PortDirection::Requires] {
            definitions.extend(self.accessors(direction).into_iter().map(Node::Definition));
        }
        definitions.push(Node::Definition(self.facilities.facilities_check()));
        if let Some((plan, port)) = self.multi_client_port() {
            definitions.push(Node::Definition(plan.factory(port, &self.name)));
        }
        debug!(
            shell = %self.name,
            origin = ?self.facilities.origin(),
            definitions = definitions.len(),
            "assembled shell skeleton"
        );
        definitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelBuilder;

    #[test]
    fn duplicate_ports_are_rejected() {
        let ports = vec![Port::provides("api", "I"), Port::requires("api", "I")];
        assert_eq!(
            check_ports(&ports),
            Err(ModelError::DuplicatePort { port: "api".into() }.into())
        );
    }

    #[test]
    fn injected_provides_port_is_rejected() {
        let ports = vec![Port::provides("api", "I").injected()];
        assert_eq!(
            check_ports(&ports),
            Err(ModelError::InjectedProvidesPort { port: "api".into() }.into())
        );
    }

    #[test]
    fn port_names_must_be_identifiers() {
        let ports = vec![Port::provides("my api", "I")];
        assert!(matches!(
            check_ports(&ports),
            Err(crate::ShellError::Model(ModelError::InvalidIdentifier { .. }))
        ));
    }

    #[test]
    fn cpp_names() {
        assert_eq!(cpp_name(&NamespaceIds::global(), "Shell"), "Shell");
        assert_eq!(cpp_name(&NamespaceIds::parse("A.B").unwrap(), "Shell"), "A::B::Shell");
    }

    #[test]
    fn spacing_puts_blanks_between() {
        let nodes = spaced([Node::text("a"), Node::text("b")]);
        assert_eq!(nodes, vec![Node::text("a"), Node::Blank, Node::text("b")]);
        assert!(spaced(Vec::new()).is_empty());
    }

    #[test]
    fn empty_model_is_reported() {
        let model = ModelBuilder::new().interface("I", vec![]).build().unwrap();
        let config = Configuration::new("I.dzn", "I");
        assert_eq!(build(&model, &config), Err(ModelError::EmptyModel.into()));
    }
}
