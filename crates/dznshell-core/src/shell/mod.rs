// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The Advanced Shell builder.
//!
//! **DDD Context:** Shell Generation
//!
//! An Advanced Shell wraps one Dezyne component or system in a C++ struct
//! that owns (or imports) the Dezyne facilities and exposes every port with
//! its runtime semantics stated in the type:
//!
//! - provides ports get strictly typed `Sts<I>`/`Mts<I>` accessors; the
//!   in-events of MTS provides ports are posted on the shell's dispatcher
//! - MTS requires ports get a boundary port whose out-events are posted on
//!   the dispatcher; STS requires ports are handed out unchanged
//! - injected requires ports are left to the locator
//! - one MTS provides port may be shared by several clients through
//!   claim/release [`arbitration`]
//!
//! [`build`] is the entry point; it returns a [`GeneratedArtifact`] or a
//! [`crate::ShellError`].

pub mod arbitration;
mod artifact;
mod builder;
mod classifier;
mod config;
mod facilities;
mod overview;
mod ports;
mod resolve;
mod support_files;

#[cfg(test)]
mod tests;

pub use arbitration::{Arbiter, ClaimOutcome};
pub use artifact::{GeneratedArtifact, GeneratedFile, PortWiring, Wiring};
pub use builder::build;
pub use classifier::{Classification, ClassifiedPort, PortClass, classify};
pub use config::{
    Configuration, FacilitiesOrigin, MultiClientConfig, PortsConfig, RuntimeSemantics, WILDCARD,
};
