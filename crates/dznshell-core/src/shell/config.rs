// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Configuration of a shell build.
//!
//! **DDD Context:** Shell Generation / Configuration
//!
//! A [`Configuration`] is one immutable value handed to [`super::build`]. It is
//! built in code with chained `with_*` calls, or read from TOML:
//!
//! ```toml
//! source_filename = "Toaster.dzn"
//! encapsulee = "My.Project.Toaster"
//! facilities = "imported"
//!
//! [ports]
//! provides = "mts"
//! requires = "sts"
//!
//! [ports.explicit]
//! heater = "mts"
//!
//! [ports.multi_client]
//! port = "api"
//! claim_event = "Claim"
//! claim_success = "Ok"
//! release_event = "Release"
//! ```

use std::collections::BTreeMap;
use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use ecow::EcoString;
use serde::{Deserialize, Serialize};

use crate::codegen::document::Indent;
use crate::error::ConfigurationError;
use crate::model::PortDirection;

/// Result type for configuration handling.
pub type Result<T> = std::result::Result<T, ConfigurationError>;

/// Key of the explicit port map that sets the default of both directions.
pub const WILDCARD: &str = "*";

/// Runtime execution semantics of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeSemantics {
    /// Single-threaded: events pass straight through to the encapsulee.
    Sts,
    /// Multi-threaded: inward events are rerouted via the dispatcher.
    Mts,
}

impl RuntimeSemantics {
    /// `"STS"` or `"MTS"`.
    #[must_use]
    pub fn abbreviation(self) -> &'static str {
        match self {
            RuntimeSemantics::Sts => "STS",
            RuntimeSemantics::Mts => "MTS",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            RuntimeSemantics::Sts => "Single-threaded",
            RuntimeSemantics::Mts => "Multi-threaded",
        }
    }

    /// Name of the strict-port enclosure template, `Sts` or `Mts`.
    #[must_use]
    pub fn enclosure(self) -> &'static str {
        match self {
            RuntimeSemantics::Sts => "Sts",
            RuntimeSemantics::Mts => "Mts",
        }
    }
}

impl fmt::Display for RuntimeSemantics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

/// Where the Dezyne runtime facilities (runtime, dispatcher, locator) come
/// from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FacilitiesOrigin {
    /// The shell creates and owns all facilities.
    #[default]
    #[serde(rename = "owned")]
    OwnedByShell,
    /// The shell takes them by reference from a user supplied locator.
    #[serde(rename = "imported")]
    ImportedViaLocator,
}

impl FacilitiesOrigin {
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            FacilitiesOrigin::OwnedByShell => {
                "Create all facilities (dispatcher, runtime and locator)"
            }
            FacilitiesOrigin::ImportedViaLocator => {
                "Import facilities (by reference) from the user provided dzn::locator argument"
            }
        }
    }
}

/// Claim/release arbitration of one multi-threaded provides port.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MultiClientConfig {
    pub port: EcoString,
    pub claim_event: EcoString,
    /// Reply value of the claim event that grants ownership.
    pub claim_success: EcoString,
    /// Reply value returned to a claimant while another client owns the port.
    /// Inferred when the reply type has exactly two values.
    #[serde(default)]
    pub claim_failure: Option<EcoString>,
    pub release_event: EcoString,
}

impl MultiClientConfig {
    #[must_use]
    pub fn new(
        port: impl Into<EcoString>,
        claim_event: impl Into<EcoString>,
        claim_success: impl Into<EcoString>,
        release_event: impl Into<EcoString>,
    ) -> Self {
        Self {
            port: port.into(),
            claim_event: claim_event.into(),
            claim_success: claim_success.into(),
            claim_failure: None,
            release_event: release_event.into(),
        }
    }

    #[must_use]
    pub fn with_claim_failure(mut self, value: impl Into<EcoString>) -> Self {
        self.claim_failure = Some(value.into());
        self
    }
}

impl fmt::Display for MultiClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (claim: {} -> {}, release: {})",
            self.port, self.claim_event, self.claim_success, self.release_event
        )
    }
}

/// Runtime semantics per port.
///
/// A port's semantics is its explicit entry if present, otherwise the default
/// of its direction, otherwise the [`WILDCARD`] entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PortsConfig {
    #[serde(default)]
    explicit: BTreeMap<EcoString, RuntimeSemantics>,
    #[serde(default)]
    provides: Option<RuntimeSemantics>,
    #[serde(default)]
    requires: Option<RuntimeSemantics>,
    #[serde(default)]
    multi_client: Option<MultiClientConfig>,
}

impl Default for PortsConfig {
    fn default() -> Self {
        Self::all_mts()
    }
}

impl PortsConfig {
    /// No defaults and no explicit entries.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            explicit: BTreeMap::new(),
            provides: None,
            requires: None,
            multi_client: None,
        }
    }

    fn uniform(provides: RuntimeSemantics, requires: RuntimeSemantics) -> Self {
        Self::empty()
            .with_provides_default(provides)
            .with_requires_default(requires)
    }

    /// Every port multi-threaded, like `dzn code --shell`.
    #[must_use]
    pub fn all_mts() -> Self {
        Self::uniform(RuntimeSemantics::Mts, RuntimeSemantics::Mts)
    }

    #[must_use]
    pub fn all_sts() -> Self {
        Self::uniform(RuntimeSemantics::Sts, RuntimeSemantics::Sts)
    }

    /// Provides ports single-threaded, requires ports multi-threaded.
    #[must_use]
    pub fn sts_provides_mts_requires() -> Self {
        Self::uniform(RuntimeSemantics::Sts, RuntimeSemantics::Mts)
    }

    /// Provides ports multi-threaded, requires ports single-threaded.
    #[must_use]
    pub fn mts_provides_sts_requires() -> Self {
        Self::uniform(RuntimeSemantics::Mts, RuntimeSemantics::Sts)
    }

    /// All provides ports with `provides`, requires ports named explicitly.
    #[must_use]
    pub fn mixed<I, J, S, T>(provides: RuntimeSemantics, sts_requires: I, mts_requires: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<EcoString>,
        T: Into<EcoString>,
    {
        let mut config = Self::empty().with_provides_default(provides);
        for port in sts_requires {
            config = config.with_port(port, RuntimeSemantics::Sts);
        }
        for port in mts_requires {
            config = config.with_port(port, RuntimeSemantics::Mts);
        }
        config
    }

    /// Set the semantics of one port by name, or of both defaults with
    /// [`WILDCARD`].
    #[must_use]
    pub fn with_port(mut self, name: impl Into<EcoString>, semantics: RuntimeSemantics) -> Self {
        self.explicit.insert(name.into(), semantics);
        self
    }

    #[must_use]
    pub fn with_provides_default(mut self, semantics: RuntimeSemantics) -> Self {
        self.provides = Some(semantics);
        self
    }

    #[must_use]
    pub fn with_requires_default(mut self, semantics: RuntimeSemantics) -> Self {
        self.requires = Some(semantics);
        self
    }

    #[must_use]
    pub fn with_multi_client(mut self, multi_client: MultiClientConfig) -> Self {
        self.multi_client = Some(multi_client);
        self
    }

    #[must_use]
    pub fn multi_client(&self) -> Option<&MultiClientConfig> {
        self.multi_client.as_ref()
    }

    /// Explicitly named ports, excluding the wildcard entry.
    pub fn explicit_ports(&self) -> impl Iterator<Item = (&EcoString, RuntimeSemantics)> {
        self.explicit
            .iter()
            .filter(|(name, _)| name.as_str() != WILDCARD)
            .map(|(name, semantics)| (name, *semantics))
    }

    /// The explicit entry of a port, ignoring defaults.
    #[must_use]
    pub fn explicit(&self, port: &str) -> Option<RuntimeSemantics> {
        if port == WILDCARD {
            return None;
        }
        self.explicit.get(port).copied()
    }

    /// The default for ports of `direction` without an explicit entry.
    #[must_use]
    pub fn default_for(&self, direction: PortDirection) -> Option<RuntimeSemantics> {
        let default = match direction {
            PortDirection::Provides => self.provides,
            PortDirection::Requires => self.requires,
        };
        default.or_else(|| self.explicit.get(WILDCARD).copied())
    }

    fn describe_default(semantics: Option<RuntimeSemantics>) -> String {
        match semantics {
            Some(semantics) => format!("All {semantics}"),
            None => "explicit only".to_string(),
        }
    }
}

impl fmt::Display for PortsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let provides = self.default_for(PortDirection::Provides);
        let requires = self.default_for(PortDirection::Requires);
        if provides == requires {
            write!(f, "provides/requires: {}", Self::describe_default(provides))?;
        } else {
            write!(
                f,
                "provides ports: {}, requires ports: {}",
                Self::describe_default(provides),
                Self::describe_default(requires)
            )?;
        }
        let explicit: Vec<String> = self
            .explicit_ports()
            .map(|(name, semantics)| format!("{name}={semantics}"))
            .collect();
        if !explicit.is_empty() {
            write!(f, " (explicit: {})", explicit.join(", "))?;
        }
        Ok(())
    }
}

fn default_suffix() -> EcoString {
    EcoString::from("AdvShell")
}

/// Everything a shell build needs besides the model.
///
/// # Example
///
/// ```
/// use dznshell_core::shell::{Configuration, FacilitiesOrigin, PortsConfig};
///
/// let config = Configuration::new("Toaster.dzn", "My.Project.Toaster")
///     .with_ports(PortsConfig::mts_provides_sts_requires())
///     .with_facilities_origin(FacilitiesOrigin::ImportedViaLocator)
///     .with_copyright("Copyright (c) 2026 Toast Inc.");
/// assert_eq!(config.target_basename().unwrap(), "ToasterAdvShell");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Configuration {
    source_filename: Utf8PathBuf,
    encapsulee: EcoString,
    #[serde(default = "default_suffix")]
    output_basename_suffix: EcoString,
    #[serde(default)]
    ports: PortsConfig,
    #[serde(default, rename = "facilities")]
    facilities_origin: FacilitiesOrigin,
    #[serde(default)]
    copyright: String,
    #[serde(default)]
    support_files_ns_prefix: Option<EcoString>,
    #[serde(default)]
    creator_info: Option<String>,
    #[serde(default)]
    verbose: bool,
    #[serde(default)]
    indent: Indent,
}

impl Configuration {
    /// A configuration with all ports multi-threaded and facilities owned by
    /// the shell.
    #[must_use]
    pub fn new(source_filename: impl Into<Utf8PathBuf>, encapsulee: &str) -> Self {
        Self {
            source_filename: source_filename.into(),
            encapsulee: EcoString::from(encapsulee),
            output_basename_suffix: default_suffix(),
            ports: PortsConfig::all_mts(),
            facilities_origin: FacilitiesOrigin::OwnedByShell,
            copyright: String::new(),
            support_files_ns_prefix: None,
            creator_info: None,
            verbose: false,
            indent: Indent::default(),
        }
    }

    /// Parse a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::Parse`] for malformed TOML, unknown keys
    /// or missing required keys.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    #[must_use]
    pub fn with_output_basename_suffix(mut self, suffix: &str) -> Self {
        self.output_basename_suffix = EcoString::from(suffix);
        self
    }

    #[must_use]
    pub fn with_ports(mut self, ports: PortsConfig) -> Self {
        self.ports = ports;
        self
    }

    #[must_use]
    pub fn with_facilities_origin(mut self, origin: FacilitiesOrigin) -> Self {
        self.facilities_origin = origin;
        self
    }

    #[must_use]
    pub fn with_copyright(mut self, copyright: &str) -> Self {
        self.copyright = copyright.to_string();
        self
    }

    /// Namespace in front of `Dzn` for the support files, e.g. `My.Support`.
    #[must_use]
    pub fn with_support_files_ns_prefix(mut self, prefix: &str) -> Self {
        self.support_files_ns_prefix = Some(EcoString::from(prefix));
        self
    }

    #[must_use]
    pub fn with_creator_info(mut self, info: &str) -> Self {
        self.creator_info = Some(info.to_string());
        self
    }

    /// Emit `info`-level summaries while building.
    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    #[must_use]
    pub fn with_indent(mut self, indent: Indent) -> Self {
        self.indent = indent;
        self
    }

    #[must_use]
    pub fn source_filename(&self) -> &Utf8Path {
        &self.source_filename
    }

    /// The encapsulee name as configured.
    #[must_use]
    pub fn encapsulee(&self) -> &str {
        &self.encapsulee
    }

    #[must_use]
    pub fn output_basename_suffix(&self) -> &str {
        &self.output_basename_suffix
    }

    #[must_use]
    pub fn ports(&self) -> &PortsConfig {
        &self.ports
    }

    #[must_use]
    pub fn facilities_origin(&self) -> FacilitiesOrigin {
        self.facilities_origin
    }

    #[must_use]
    pub fn copyright(&self) -> &str {
        &self.copyright
    }

    #[must_use]
    pub fn support_files_ns_prefix(&self) -> Option<&str> {
        self.support_files_ns_prefix.as_deref()
    }

    #[must_use]
    pub fn creator_info(&self) -> Option<&str> {
        self.creator_info.as_deref()
    }

    #[must_use]
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    #[must_use]
    pub fn indent(&self) -> Indent {
        self.indent
    }

    /// File stem of the source filename, e.g. `Toaster` for `dzn/Toaster.dzn`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidSourceFilename`] if there is none.
    pub fn source_basename(&self) -> Result<EcoString> {
        self.source_filename
            .file_stem()
            .filter(|stem| !stem.is_empty())
            .map(EcoString::from)
            .ok_or_else(|| ConfigurationError::InvalidSourceFilename {
                path: self.source_filename.to_string(),
            })
    }

    /// Source basename followed by the suffix. Doubles as the C++ struct name.
    ///
    /// # Errors
    ///
    /// Returns an error if the basename is missing or not a C++ identifier.
    pub fn target_basename(&self) -> Result<EcoString> {
        let mut basename = self.source_basename()?;
        basename.push_str(&self.output_basename_suffix);
        if !crate::scoping::is_identifier(&basename) {
            return Err(ConfigurationError::InvalidBasename {
                basename: basename.to_string(),
            });
        }
        Ok(basename)
    }
}
