// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Leading comment blocks and footers of the generated files.
//!
//! **DDD Context:** Shell Generation

use ecow::EcoString;

use super::config::{Configuration, RuntimeSemantics};
use super::ports::ShellPort;
use crate::codegen::cpp::Node;
use crate::codegen::text::{BulletList, TextBlock};
use crate::model::{Port, PortDirection};
use crate::scoping::NamespaceIds;

pub(crate) const DO_NOT_MODIFY: &str = "This is generated code. DO NOT MODIFY manually.";

/// `// Generated by: dznshell v0.1.0`.
pub(crate) fn footer() -> Node {
    Node::comment(&format!("Generated by: dznshell v{}", env!("CARGO_PKG_VERSION")))
}

/// Copyright text followed by a blank line, or nothing.
fn copyright(text: &str) -> TextBlock {
    let mut block = TextBlock::from_text(text).trimmed();
    if !block.is_empty() {
        block.push_blank();
    }
    block
}

/// The facts the header overview reports.
pub(crate) struct Overview<'a, 'm> {
    pub config: &'a Configuration,
    pub encapsulee: &'a NamespaceIds,
    pub source_basename: &'a str,
    pub target_basename: &'a str,
    pub ports: &'a [ShellPort<'m>],
    pub injected: &'a [&'m Port],
}

impl Overview<'_, '_> {
    fn configuration(&self) -> TextBlock {
        let ports = self.config.ports();
        let mut lines = vec![
            format!("Encapsulee FQN: {}", self.encapsulee),
            format!("Source file basename: {}", self.source_basename),
            format!("Target file basename: {}", self.target_basename),
            format!(
                "Dezyne facilities: {}",
                self.config.facilities_origin().description()
            ),
            format!("Port semantics: {ports}"),
        ];
        if let Some(multi_client) = ports.multi_client() {
            lines.push(format!("Multi-client port: {multi_client}"));
        }
        TextBlock::from_lines(lines).bulleted(&BulletList::dash())
    }

    fn port_group(&self, direction: PortDirection, semantics: RuntimeSemantics) -> TextBlock {
        let entries: TextBlock = self
            .ports
            .iter()
            .filter(|p| p.direction() == direction && p.semantics == semantics)
            .map(|p| {
                let suffix = if p.multi_client { " (multi-client)" } else { "" };
                EcoString::from(format!("{}: {}{suffix}", p.name(), p.interface.name()))
            })
            .collect();
        if entries.is_empty() {
            return entries;
        }
        let mut group = TextBlock::new();
        group.push(&format!(
            "{} ports ({}):",
            direction.title(),
            semantics.description()
        ));
        group.extend(entries.bulleted(&BulletList::dash()));
        group
    }

    fn injected_group(&self) -> TextBlock {
        if self.injected.is_empty() {
            return TextBlock::new();
        }
        let entries: TextBlock = self
            .injected
            .iter()
            .map(|p| EcoString::from(format!("{}: {}", p.name, p.interface)))
            .collect();
        let mut group = TextBlock::new();
        group.push("Injected requires ports:");
        group.extend(entries.bulleted(&BulletList::dash()));
        group
    }

    /// The leading comment of the header file.
    pub(crate) fn header_comment(&self) -> Node {
        let mut block = copyright(self.config.copyright());
        block.push("Advanced Shell");
        block.push_blank();
        block.push("Creator information:");
        match self.config.creator_info().map(|info| TextBlock::from_text(info).trimmed()) {
            Some(info) if !info.is_empty() => block.extend(info.indented(4)),
            _ => block.push("    <none>"),
        }
        block.push_blank();
        block.push("Configuration:");
        block.extend(self.configuration());
        block.push_blank();

        let groups = [
            self.port_group(PortDirection::Provides, RuntimeSemantics::Sts),
            self.port_group(PortDirection::Provides, RuntimeSemantics::Mts),
            self.port_group(PortDirection::Requires, RuntimeSemantics::Sts),
            self.port_group(PortDirection::Requires, RuntimeSemantics::Mts),
            self.injected_group(),
        ];
        for group in groups.into_iter().filter(|g| !g.is_empty()) {
            block.extend(group);
            block.push_blank();
        }
        block.push(DO_NOT_MODIFY);
        Node::Comment(block)
    }

    /// The leading comment of the source file.
    pub(crate) fn source_comment(&self) -> Node {
        let mut block = copyright(self.config.copyright());
        block.push("Advanced Shell");
        block.push_blank();
        block.push(DO_NOT_MODIFY);
        Node::Comment(block)
    }
}

/// The leading comment of the strict port support file.
pub(crate) fn strict_port_comment(copyright_text: &str, cpp_ns: &str) -> Node {
    let mut block = TextBlock::from_text(&format!(
        "Dezyne Strict Port

Description: constructs that let the compiler reject the interconnection
             of Dezyne ports with different runtime semantics.

Contents:
- Enclosures Sts and Mts stating the runtime semantics of a port. An
  enclosure holds a reference to the Dezyne port itself.
- ConnectPorts overloads that only accept enclosures of equal semantics.

Example:

    {cpp_ns}::Mts<IMyService> mtsPort{{m_dznPort}};
    {cpp_ns}::Sts<IMyService> stsPort{{m_dznPort}};

    {cpp_ns}::ConnectPorts(stsPort, GetStsPort()); // Ok
    {cpp_ns}::ConnectPorts(mtsPort, GetStsPort()); // Compilation error
"
    ));
    block.push_blank();
    block.push(DO_NOT_MODIFY);
    let copyright_text = TextBlock::from_text(copyright_text).trimmed();
    if !copyright_text.is_empty() {
        block.push_blank();
        block.extend(copyright_text);
    }
    Node::Comment(block)
}
