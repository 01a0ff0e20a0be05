// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Advanced Shell generator core.
//!
//! This crate turns an in-memory Dezyne model into a C++ "shell" around one
//! component or system, with per-port runtime semantics:
//! - Scoping (namespace identifiers, symbol table, scope resolution)
//! - Structural code model (C++ construct tree and deterministic renderer)
//! - Port classification (single- vs multi-threaded semantics per port)
//! - Multi-client arbitration (claim/release exclusive port access)
//! - The Advanced Shell builder that orchestrates all of the above
//!
//! The builder is a pure function of its inputs: it performs no I/O and holds
//! no state between calls, so independent builds may run in parallel.

#![doc = include_str!("../../../README.md")]

pub mod codegen;
pub mod error;
pub mod model;
pub mod scoping;
pub mod shell;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use error::{Result, ShellError};

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::error::{ConfigurationError, ModelError, ShellError};
    pub use crate::model::{Model, ModelBuilder, Port, PortDirection};
    pub use crate::scoping::NamespaceIds;
    pub use crate::shell::{
        Configuration, FacilitiesOrigin, GeneratedArtifact, MultiClientConfig, PortsConfig,
        RuntimeSemantics, build,
    };
}
