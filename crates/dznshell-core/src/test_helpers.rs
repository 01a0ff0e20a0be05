// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Shared test models.

use crate::model::{Event, Formal, Model, ModelBuilder, Port};

/// The toaster used throughout the tests.
///
/// `My.Project.Toaster` provides `api: IToaster` and requires
/// `heater: IHeater`, `cord: IPowerCord` and the injected `log: ILog`.
///
/// # Panics
///
/// Panics if the model is ill-formed.
pub fn toaster_model() -> Model {
    toaster_builder().build().expect("toaster model")
}

/// The toaster's builder, for tests that add elements.
pub fn toaster_builder() -> ModelBuilder {
    ModelBuilder::new()
        .extern_type("My.Project.Millis", "size_t")
        .enumeration("My.Project.IToaster.Result", ["Ok", "Busy"])
        .interface(
            "My.Project.IToaster",
            vec![
                Event::in_event("Claim", "Result"),
                Event::in_event("Release", "void"),
                Event::in_event("SetTime", "void").with_formal(Formal::input("timeMs", "Millis")),
                Event::in_event("Toast", "void"),
                Event::out_event("Done"),
            ],
        )
        .interface(
            "My.Project.IHeater",
            vec![
                Event::in_event("On", "void"),
                Event::in_event("Off", "void"),
                Event::out_event("Hot"),
            ],
        )
        .interface(
            "My.Project.IPowerCord",
            vec![
                Event::in_event("IsPlugged", "bool"),
                Event::out_event("Unplugged"),
            ],
        )
        .interface("My.Project.ILog", vec![Event::in_event("Write", "void")])
        .component(
            "My.Project.Toaster",
            vec![
                Port::provides("api", "IToaster"),
                Port::requires("heater", "IHeater"),
                Port::requires("cord", "IPowerCord"),
                Port::requires("log", "ILog").injected(),
            ],
        )
}
