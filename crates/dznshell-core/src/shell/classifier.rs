// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Assigns runtime semantics to the ports of an encapsulee.
//!
//! **DDD Context:** Shell Generation / Port Classification
//!
//! Every port gets exactly one [`PortClass`]. Injected requires ports are
//! satisfied through the locator and never proxied; they need no
//! configuration and never take part in dispatch wiring.

use ecow::EcoString;
use tracing::debug;

use super::config::{PortsConfig, Result, RuntimeSemantics};
use crate::error::ConfigurationError;
use crate::model::{Port, PortDirection};
use crate::scoping::NamespaceIds;

/// The generation role of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortClass {
    /// A provides port with a strictly typed accessor.
    Provided(RuntimeSemantics),
    /// A requires port with pass-through (STS) or dispatched (MTS) wiring.
    Required(RuntimeSemantics),
    /// An injected requires port, excluded from generation.
    Injected,
}

impl PortClass {
    #[must_use]
    pub fn semantics(self) -> Option<RuntimeSemantics> {
        match self {
            PortClass::Provided(semantics) | PortClass::Required(semantics) => Some(semantics),
            PortClass::Injected => None,
        }
    }
}

/// A port together with its class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifiedPort<'m> {
    pub port: &'m Port,
    pub class: PortClass,
}

/// The classes of all ports of one encapsulee, in port declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification<'m> {
    ports: Vec<ClassifiedPort<'m>>,
}

impl<'m> Classification<'m> {
    pub fn iter(&self) -> impl Iterator<Item = &ClassifiedPort<'m>> {
        self.ports.iter()
    }

    pub fn provided(&self) -> impl Iterator<Item = &ClassifiedPort<'m>> {
        self.ports
            .iter()
            .filter(|p| matches!(p.class, PortClass::Provided(_)))
    }

    /// Non-injected requires ports.
    pub fn required(&self) -> impl Iterator<Item = &ClassifiedPort<'m>> {
        self.ports
            .iter()
            .filter(|p| matches!(p.class, PortClass::Required(_)))
    }

    pub fn injected(&self) -> impl Iterator<Item = &ClassifiedPort<'m>> {
        self.ports.iter().filter(|p| p.class == PortClass::Injected)
    }

    /// Requires ports whose events are dispatched (MTS).
    pub fn dispatched(&self) -> impl Iterator<Item = &ClassifiedPort<'m>> {
        self.ports
            .iter()
            .filter(|p| p.class == PortClass::Required(RuntimeSemantics::Mts))
    }

    #[must_use]
    pub fn class_of(&self, port: &str) -> Option<PortClass> {
        self.ports
            .iter()
            .find(|p| p.port.name == port)
            .map(|p| p.class)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ports.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }
}

/// Classify the `ports` of `encapsulee` according to `config`.
///
/// # Errors
///
/// Returns [`ConfigurationError::UnknownPort`] when an explicit entry names
/// no port of the encapsulee, and [`ConfigurationError::MissingPortConfig`]
/// when a non-injected port has neither an entry nor a default.
pub fn classify<'m>(
    config: &PortsConfig,
    encapsulee: &NamespaceIds,
    ports: &'m [Port],
) -> Result<Classification<'m>> {
    if let Some((name, _)) = config
        .explicit_ports()
        .find(|(name, _)| !ports.iter().any(|p| &p.name == *name))
    {
        return Err(ConfigurationError::UnknownPort {
            port: EcoString::clone(name),
            encapsulee: encapsulee.clone(),
        });
    }

    let mut classified = Vec::with_capacity(ports.len());
    for port in ports {
        let class = if port.direction == PortDirection::Requires && port.injected {
            PortClass::Injected
        } else {
            let semantics = config
                .explicit(&port.name)
                .or_else(|| config.default_for(port.direction))
                .ok_or_else(|| ConfigurationError::MissingPortConfig {
                    port: port.name.clone(),
                    direction: port.direction,
                })?;
            match port.direction {
                PortDirection::Provides => PortClass::Provided(semantics),
                PortDirection::Requires => PortClass::Required(semantics),
            }
        };
        debug!(port = %port.name, ?class, "classified port");
        classified.push(ClassifiedPort { port, class });
    }
    Ok(Classification { ports: classified })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encapsulee() -> NamespaceIds {
        NamespaceIds::parse("My.Toaster").unwrap()
    }

    fn toaster_ports() -> Vec<Port> {
        vec![
            Port::provides("api", "IToaster"),
            Port::requires("heater", "IHeater"),
            Port::requires("cord", "IPowerCord"),
            Port::requires("log", "ILog").injected(),
        ]
    }

    #[test]
    fn all_mts_defaults() {
        let ports = toaster_ports();
        let classes = classify(&PortsConfig::all_mts(), &encapsulee(), &ports).unwrap();
        assert_eq!(classes.class_of("api"), Some(PortClass::Provided(RuntimeSemantics::Mts)));
        assert_eq!(classes.class_of("heater"), Some(PortClass::Required(RuntimeSemantics::Mts)));
        assert_eq!(classes.class_of("log"), Some(PortClass::Injected));
        assert_eq!(classes.dispatched().count(), 2);
        assert_eq!(classes.len(), 4);
    }

    #[test]
    fn explicit_entry_beats_default() {
        let ports = toaster_ports();
        let config = PortsConfig::all_mts().with_port("cord", RuntimeSemantics::Sts);
        let classes = classify(&config, &encapsulee(), &ports).unwrap();
        assert_eq!(classes.class_of("cord"), Some(PortClass::Required(RuntimeSemantics::Sts)));
        assert_eq!(classes.dispatched().count(), 1);
    }

    #[test]
    fn injected_port_ignores_its_entry() {
        let ports = toaster_ports();
        let config = PortsConfig::all_mts().with_port("log", RuntimeSemantics::Mts);
        let classes = classify(&config, &encapsulee(), &ports).unwrap();
        assert_eq!(classes.class_of("log"), Some(PortClass::Injected));
        assert!(classes.dispatched().all(|p| p.port.name != "log"));
    }

    #[test]
    fn injected_port_needs_no_config() {
        let ports = vec![Port::provides("api", "IToaster"), Port::requires("log", "ILog").injected()];
        let config = PortsConfig::empty().with_port("api", RuntimeSemantics::Sts);
        let classes = classify(&config, &encapsulee(), &ports).unwrap();
        assert_eq!(classes.injected().count(), 1);
        assert_eq!(classes.required().count(), 0);
    }

    #[test]
    fn unknown_explicit_port() {
        let ports = toaster_ports();
        let config = PortsConfig::all_mts().with_port("toaster", RuntimeSemantics::Sts);
        assert_eq!(
            classify(&config, &encapsulee(), &ports),
            Err(ConfigurationError::UnknownPort {
                port: "toaster".into(),
                encapsulee: encapsulee(),
            })
        );
    }

    #[test]
    fn missing_config() {
        let ports = toaster_ports();
        let config = PortsConfig::empty().with_provides_default(RuntimeSemantics::Mts);
        assert_eq!(
            classify(&config, &encapsulee(), &ports),
            Err(ConfigurationError::MissingPortConfig {
                port: "heater".into(),
                direction: PortDirection::Requires,
            })
        );
    }

    #[test]
    fn zero_required_ports_yield_empty_dispatch_set() {
        let ports = vec![Port::provides("api", "IToaster")];
        let classes = classify(&PortsConfig::all_mts(), &encapsulee(), &ports).unwrap();
        assert_eq!(classes.required().count(), 0);
        assert_eq!(classes.dispatched().count(), 0);
        assert_eq!(classes.provided().count(), 1);
    }

    #[test]
    fn zero_ports_at_all() {
        let classes = classify(&PortsConfig::all_sts(), &encapsulee(), &[]).unwrap();
        assert!(classes.is_empty());
    }
}
