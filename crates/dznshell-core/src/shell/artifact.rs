// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The immutable result of a successful build.
//!
//! **DDD Context:** Shell Generation

use std::fmt::Write as _;

use ecow::EcoString;
use sha2::{Digest, Sha256};

use super::config::RuntimeSemantics;
use crate::model::PortDirection;
use crate::scoping::NamespaceIds;

/// One generated text file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GeneratedFile {
    filename: EcoString,
    contents: String,
    namespace: NamespaceIds,
}

impl GeneratedFile {
    pub(crate) fn new(filename: impl Into<EcoString>, contents: String, namespace: NamespaceIds) -> Self {
        Self {
            filename: filename.into(),
            contents,
            namespace,
        }
    }

    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    #[must_use]
    pub fn contents(&self) -> &str {
        &self.contents
    }

    /// The C++ namespace the file declares its contents in.
    #[must_use]
    pub fn namespace(&self) -> &NamespaceIds {
        &self.namespace
    }
}

/// How the shell exposes one port of the encapsulee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Wiring {
    /// Provides port behind a strictly typed accessor.
    Accessor(RuntimeSemantics),
    /// MTS provides port shared by claim/release arbitrated clients.
    MultiClientAccessor,
    /// STS requires port handed out unchanged.
    PassThrough,
    /// MTS requires port whose out-events are posted on the dispatcher.
    Dispatched,
    /// Injected requires port, left alone.
    Excluded,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PortWiring {
    pub port: EcoString,
    pub direction: PortDirection,
    pub wiring: Wiring,
}

/// Header, source and support files of one shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    basename: EcoString,
    header: GeneratedFile,
    source: GeneratedFile,
    support_files: Vec<GeneratedFile>,
    content_hash: String,
    wiring: Vec<PortWiring>,
}

impl GeneratedArtifact {
    pub(crate) fn new(
        basename: EcoString,
        header: GeneratedFile,
        source: GeneratedFile,
        support_files: Vec<GeneratedFile>,
        wiring: Vec<PortWiring>,
    ) -> Self {
        let content_hash = content_hash(
            [&header, &source]
                .into_iter()
                .chain(support_files.iter()),
        );
        Self {
            basename,
            header,
            source,
            support_files,
            content_hash,
            wiring,
        }
    }

    /// Basename of the header and source file, e.g. `ToasterAdvShell`.
    #[must_use]
    pub fn basename(&self) -> &str {
        &self.basename
    }

    #[must_use]
    pub fn header(&self) -> &GeneratedFile {
        &self.header
    }

    #[must_use]
    pub fn source(&self) -> &GeneratedFile {
        &self.source
    }

    #[must_use]
    pub fn header_text(&self) -> &str {
        self.header.contents()
    }

    #[must_use]
    pub fn source_text(&self) -> &str {
        self.source.contents()
    }

    #[must_use]
    pub fn support_files(&self) -> &[GeneratedFile] {
        &self.support_files
    }

    /// All files: header, source, then support files.
    pub fn files(&self) -> impl Iterator<Item = &GeneratedFile> {
        [&self.header, &self.source]
            .into_iter()
            .chain(self.support_files.iter())
    }

    /// Lowercase hex SHA-256 over all file names and contents.
    #[must_use]
    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    /// Wiring per port, in port declaration order.
    #[must_use]
    pub fn wiring(&self) -> &[PortWiring] {
        &self.wiring
    }

    #[must_use]
    pub fn wiring_of(&self, port: &str) -> Option<Wiring> {
        self.wiring.iter().find(|w| w.port == port).map(|w| w.wiring)
    }

    /// Number of requires ports with dispatched wiring.
    #[must_use]
    pub fn dispatch_count(&self) -> usize {
        self.wiring
            .iter()
            .filter(|w| w.wiring == Wiring::Dispatched)
            .count()
    }
}

fn content_hash<'a>(files: impl IntoIterator<Item = &'a GeneratedFile>) -> String {
    let mut hasher = Sha256::new();
    for file in files {
        hasher.update(file.filename.as_bytes());
        hasher.update([0u8]);
        hasher.update(file.contents.as_bytes());
        hasher.update([0u8]);
    }
    hasher
        .finalize()
        .iter()
        .fold(String::with_capacity(64), |mut hex, byte| {
            let _ = write!(hex, "{byte:02x}");
            hex
        })
}
