// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Error taxonomy of the shell builder.
//!
//! **DDD Context:** Shell Generation
//!
//! Every failure of [`crate::shell::build`] is a [`ShellError`]. The variants
//! separate invalid user configuration, unresolvable references, ill-formed
//! models and violations of the builder's own invariants. Errors integrate
//! with [`miette`] for reporting.

// Spurious warnings from miette derive macro expansion
#![allow(unused_assignments)]

use ecow::EcoString;
use miette::Diagnostic;
use thiserror::Error;

use crate::codegen::cpp::StructureError;
use crate::model::ElementKind;
use crate::scoping::{NamespaceIds, NamespaceIdsError, ResolutionError};

/// Result type for shell generation.
pub type Result<T> = std::result::Result<T, ShellError>;

/// Any failure of a shell build.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ShellError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Internal(#[from] InternalInvariantError),
}

impl From<StructureError> for ShellError {
    fn from(error: StructureError) -> Self {
        ShellError::Internal(InternalInvariantError::Structure(error))
    }
}

/// Invalid user-supplied configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ConfigurationError {
    #[error("invalid encapsulee name '{text}'")]
    #[diagnostic(
        code(dznshell::config::invalid_encapsulee),
        help("use a dotted fully-qualified name, e.g. My.Project.Toaster")
    )]
    InvalidEncapsuleeName {
        text: String,
        #[source]
        source: NamespaceIdsError,
    },

    #[error("encapsulee '{fqn}' not found in the model")]
    #[diagnostic(code(dznshell::config::unknown_encapsulee))]
    UnknownEncapsulee { fqn: NamespaceIds },

    #[error("encapsulee '{fqn}' is ambiguous, candidates: {}", format_fqns(.candidates))]
    #[diagnostic(
        code(dznshell::config::ambiguous_encapsulee),
        help("fully qualify the encapsulee name")
    )]
    AmbiguousEncapsulee {
        fqn: NamespaceIds,
        candidates: Vec<NamespaceIds>,
    },

    #[error("encapsulee '{fqn}' is a {kind}, expected a component or system")]
    #[diagnostic(code(dznshell::config::not_encapsulatable))]
    NotEncapsulatable { fqn: NamespaceIds, kind: ElementKind },

    #[error("port '{port}' is configured but '{encapsulee}' has no such port")]
    #[diagnostic(code(dznshell::config::unknown_port))]
    UnknownPort {
        port: EcoString,
        encapsulee: NamespaceIds,
    },

    #[error("no runtime semantics configured for {direction} port '{port}'")]
    #[diagnostic(
        code(dznshell::config::missing_port_config),
        help("name the port explicitly or set a default for its direction")
    )]
    MissingPortConfig {
        port: EcoString,
        direction: crate::model::PortDirection,
    },

    #[error("source filename '{path}' has no usable file stem")]
    #[diagnostic(code(dznshell::config::invalid_source_filename))]
    InvalidSourceFilename { path: String },

    #[error("output basename '{basename}' is not a valid C++ identifier")]
    #[diagnostic(code(dznshell::config::invalid_basename))]
    InvalidBasename { basename: String },

    #[error("invalid support-file namespace prefix '{text}'")]
    #[diagnostic(code(dznshell::config::invalid_namespace_prefix))]
    InvalidNamespacePrefix {
        text: String,
        #[source]
        source: NamespaceIdsError,
    },

    #[error("invalid multi-client configuration for port '{port}': {reason}")]
    #[diagnostic(code(dznshell::config::multi_client))]
    MultiClient { port: EcoString, reason: String },

    #[error("invalid configuration file: {message}")]
    #[diagnostic(code(dznshell::config::parse))]
    Parse { message: String },
}

impl From<toml::de::Error> for ConfigurationError {
    fn from(error: toml::de::Error) -> Self {
        ConfigurationError::Parse {
            message: error.to_string(),
        }
    }
}

/// A missing or ill-formed model element.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ModelError {
    #[error("the model contains no component or system")]
    #[diagnostic(
        code(dznshell::model::empty),
        help("a shell can only be generated around a component or system")
    )]
    EmptyModel,

    #[error("invalid element name '{text}'")]
    #[diagnostic(code(dznshell::model::invalid_element_name))]
    InvalidElementName {
        text: String,
        #[source]
        source: NamespaceIdsError,
    },

    #[error("malformed reference '{text}' in {context}")]
    #[diagnostic(code(dznshell::model::malformed_reference))]
    MalformedReference {
        text: String,
        context: String,
        #[source]
        source: NamespaceIdsError,
    },

    #[error("{what} '{name}' is not a valid C++ identifier")]
    #[diagnostic(code(dznshell::model::invalid_identifier))]
    InvalidIdentifier { what: &'static str, name: EcoString },

    #[error("port '{port}' refers to '{fqn}', which is a {kind}, not an interface")]
    #[diagnostic(code(dznshell::model::not_an_interface))]
    NotAnInterface {
        port: EcoString,
        fqn: NamespaceIds,
        kind: ElementKind,
    },

    #[error("{what} '{fqn}' is a {kind} and cannot be used as a data type")]
    #[diagnostic(code(dznshell::model::not_a_data_type))]
    NotADataType {
        what: String,
        fqn: NamespaceIds,
        kind: ElementKind,
    },

    #[error("instance '{instance}' refers to '{fqn}', which is a {kind}, not a component")]
    #[diagnostic(code(dznshell::model::not_a_component))]
    NotAComponent {
        instance: EcoString,
        fqn: NamespaceIds,
        kind: ElementKind,
    },

    #[error("provides port '{port}' cannot be injected")]
    #[diagnostic(
        code(dznshell::model::injected_provides),
        help("only requires ports are satisfied via the locator")
    )]
    InjectedProvidesPort { port: EcoString },

    #[error("port name '{port}' occurs more than once")]
    #[diagnostic(code(dznshell::model::duplicate_port))]
    DuplicatePort { port: EcoString },

    #[error("out-event '{event}' of '{interface}' has out parameter '{formal}'")]
    #[diagnostic(
        code(dznshell::model::out_event_out_parameter),
        help("out-events can only carry in parameters")
    )]
    OutEventWithOutParameter {
        interface: NamespaceIds,
        event: EcoString,
        formal: EcoString,
    },
}

/// A violated builder invariant. Indicates a defect, not a user error.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum InternalInvariantError {
    #[error("internal error: generated code structure is malformed")]
    #[diagnostic(code(dznshell::internal::structure))]
    Structure(#[source] StructureError),

    #[error("internal error: {0}")]
    #[diagnostic(code(dznshell::internal))]
    Message(String),
}

fn format_fqns(fqns: &[NamespaceIds]) -> String {
    fqns.iter()
        .map(|c| format!("'{c}'"))
        .collect::<Vec<_>>()
        .join(", ")
}
