// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Support files the generated shells include.
//!
//! **DDD Context:** Shell Generation / Support Files

use super::artifact::GeneratedFile;
use super::config::Result;
use super::overview::{footer, strict_port_comment};
use crate::codegen::cpp::{
    Access, Function, MemberVariable, Namespace, Node, Param, Record, RecordKind, SourceFile,
    StructureError, TypeDesc, TypePostfix,
};
use crate::codegen::document::Indent;
use crate::error::ConfigurationError;
use crate::scoping::NamespaceIds;

/// The namespace of the support files: the optional prefix followed by `Dzn`.
///
/// # Errors
///
/// Returns [`ConfigurationError::InvalidNamespacePrefix`] for a malformed
/// prefix.
pub(crate) fn support_namespace(prefix: Option<&str>) -> Result<NamespaceIds> {
    let invalid = |source| ConfigurationError::InvalidNamespacePrefix {
        text: prefix.unwrap_or_default().to_string(),
        source,
    };
    let prefix = match prefix {
        Some(text) => NamespaceIds::parse(text).map_err(invalid)?,
        None => NamespaceIds::global(),
    };
    prefix.child("Dzn").map_err(invalid)
}

/// `Acme_Dzn_StrictPort.hh` for namespace `Acme::Dzn`.
pub(crate) fn strict_port_filename(namespace: &NamespaceIds) -> String {
    let ids: Vec<&str> = namespace.ids().iter().map(|id| id.as_str()).collect();
    format!("{}_StrictPort.hh", ids.join("_"))
}

fn enclosure(name: &str, semantics: &str) -> Node {
    Node::Block(vec![
        Node::comment(&format!(
            "Enclosure for a port that conforms to {semantics} Runtime Semantics ({})",
            name.to_uppercase()
        )),
        Node::text("template <typename P>"),
        Node::Record(Record::new(RecordKind::Struct, name).with_section(
            Access::Default,
            vec![Node::Variable(MemberVariable::new(
                TypeDesc::verbatim("P").with_postfix(TypePostfix::Reference),
                "port",
            ))],
        )),
    ])
}

fn connect_ports(enclosure: &str) -> Node {
    let strict = || TypeDesc::template(enclosure, TypeDesc::verbatim("P"));
    Node::Block(vec![
        Node::text("template <typename P>"),
        Node::Definition(
            Function::new(TypeDesc::void(), "ConnectPorts")
                .with_param(Param::new(strict(), "provided"))
                .with_param(Param::new(strict(), "required"))
                .with_body(vec![Node::text("connect(provided.port, required.port);")]),
        ),
    ])
}

/// The header with the `Sts`/`Mts` enclosures and `ConnectPorts` overloads.
pub(crate) fn strict_port_header(
    namespace: &NamespaceIds,
    copyright: &str,
    indent: Indent,
) -> std::result::Result<GeneratedFile, StructureError> {
    let body = Namespace::new(
        namespace.clone(),
        vec![Node::Sections(vec![
            enclosure("Sts", "Single-threaded"),
            enclosure("Mts", "Multi-threaded"),
            connect_ports("Sts"),
            connect_ports("Mts"),
        ])],
    );
    let file = SourceFile::new(vec![
        strict_port_comment(copyright, &namespace.to_cpp()),
        Node::Blank,
        Node::Namespace(body),
        Node::Blank,
        footer(),
    ]);
    Ok(GeneratedFile::new(
        strict_port_filename(namespace),
        file.render(indent)?,
        namespace.clone(),
    ))
}
