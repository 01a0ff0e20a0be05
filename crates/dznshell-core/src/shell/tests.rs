// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! End-to-end shell builds.

use super::*;
use crate::codegen::document::Indent;
use crate::error::{ConfigurationError, ModelError, ShellError};
use crate::model::{Event, Instance, ModelBuilder, Port, PortDirection};
use crate::test_helpers::{toaster_builder, toaster_model};

fn toaster_config() -> Configuration {
    Configuration::new("dzn/Toaster.dzn", "My.Project.Toaster")
}

fn build_toaster(config: &Configuration) -> GeneratedArtifact {
    build(&toaster_model(), config).unwrap()
}

fn multi_client() -> MultiClientConfig {
    MultiClientConfig::new("api", "Claim", "Ok", "Release")
}

#[test]
fn all_mts_toaster() {
    let artifact = build_toaster(&toaster_config());
    assert_eq!(artifact.basename(), "ToasterAdvShell");
    assert_eq!(artifact.header().filename(), "ToasterAdvShell.hh");
    assert_eq!(artifact.source().filename(), "ToasterAdvShell.cc");
    assert_eq!(artifact.content_hash().len(), 64);
    assert_eq!(artifact.dispatch_count(), 2);

    let header = artifact.header_text();
    assert!(header.contains("#include <dzn/runtime.hh>\n"));
    assert!(header.contains("// Project includes\n#include \"Toaster.hh\"\n#include \"Dzn_StrictPort.hh\"\n"));
    assert!(header.contains("namespace My::Project {\n\nstruct ToasterAdvShell\n{\n"));
    assert!(header.contains(
        "    ToasterAdvShell(const dzn::locator& prototypeLocator, const std::string& encapsuleeInstanceName = \"\");\n\
         \x20   void FinalConstruct(const dzn::meta* parentComponentMeta = nullptr);\n"
    ));
    assert!(header.contains("    // Facility accessor(s)\n    dzn::locator& Locator();\n"));
    assert!(header.contains(
        "    // Provides port accessor(s)\n    ::Dzn::Mts<::My::Project::IToaster> ProvidesApi();\n"
    ));
    assert!(header.contains(
        "    // Requires port accessor(s)\n\
         \x20   ::Dzn::Mts<::My::Project::IHeater> RequiresHeater();\n\
         \x20   ::Dzn::Mts<::My::Project::IPowerCord> RequiresCord();\n"
    ));
    assert!(header.contains(
        "    // The encapsulated component \"Toaster\"\n    ::My::Project::Toaster m_encapsulee;\n"
    ));
    assert!(header.contains("    ::My::Project::IToaster m_ppApi;\n"));
    assert!(header.contains("    ::My::Project::IHeater m_rpHeater;\n"));
    assert!(!header.contains("RequiresLog"));
    assert!(header.contains("};\n\n} // namespace My::Project\n\n// Generated by: dznshell v"));
    assert!(header.ends_with('\n'));
}

#[test]
fn all_mts_toaster_source() {
    let artifact = build_toaster(&toaster_config());
    let source = artifact.source_text();
    assert!(source.contains("// Project include\n#include \"ToasterAdvShell.hh\"\n"));
    assert!(source.contains(
        "ToasterAdvShell::ToasterAdvShell(const dzn::locator& prototypeLocator, const std::string& encapsuleeInstanceName)\n"
    ));
    assert!(source.contains(", m_encapsulee(m_locator)\n"));
    assert!(source.contains(", m_ppApi(m_encapsulee.api)\n"));
    assert!(source.contains("    m_encapsulee.dzn_meta.name = encapsuleeInstanceName;\n"));
    assert!(source.contains("    m_encapsulee.api.meta.require.name = \"api\";\n"));
    assert!(source.contains("    m_encapsulee.heater.meta.provide.name = \"heater\";\n"));
    assert!(source.contains(
        "    m_ppApi.in.SetTime = [&](size_t timeMs) {\n\
         \x20       return dzn::shell(m_dispatcher, [&, timeMs] { return m_encapsulee.api.in.SetTime(timeMs); });\n\
         \x20   };\n"
    ));
    assert!(source.contains(
        "    m_rpHeater.out.Hot = [&] {\n\
         \x20       return m_dispatcher([&] { return m_encapsulee.heater.out.Hot(); });\n\
         \x20   };\n"
    ));
    assert!(source.contains(
        "void ToasterAdvShell::FinalConstruct(const dzn::meta* parentComponentMeta)\n{\n\
         \x20   // Check the bindings of all boundary ports\n\
         \x20   m_ppApi.check_bindings();\n\
         \x20   m_rpHeater.check_bindings();\n\
         \x20   m_rpCord.check_bindings();\n"
    ));
    assert!(source.contains("    m_encapsulee.api.out = m_ppApi.out;\n"));
    assert!(source.contains("    m_encapsulee.cord.in = m_rpCord.in;\n"));
    assert!(source.contains(
        "    m_encapsulee.dzn_meta.parent = parentComponentMeta;\n    m_encapsulee.check_bindings();\n}\n"
    ));
    assert!(source.contains(
        "::Dzn::Mts<::My::Project::IToaster> ToasterAdvShell::ProvidesApi()\n{\n    return {m_ppApi};\n}\n"
    ));
    assert!(source.contains(
        "throw std::runtime_error(\"My::Project::ToasterAdvShell: Overlapping dispatcher found (dzn::pump)\");"
    ));
    assert!(!source.contains("m_encapsulee.log"));
}

#[test]
fn wiring_follows_port_declaration_order() {
    let artifact = build_toaster(&toaster_config());
    let wiring: Vec<_> = artifact
        .wiring()
        .iter()
        .map(|w| (w.port.as_str(), w.direction, w.wiring))
        .collect();
    assert_eq!(
        wiring,
        vec![
            ("api", PortDirection::Provides, Wiring::Accessor(RuntimeSemantics::Mts)),
            ("heater", PortDirection::Requires, Wiring::Dispatched),
            ("cord", PortDirection::Requires, Wiring::Dispatched),
            ("log", PortDirection::Requires, Wiring::Excluded),
        ]
    );
}

#[test]
fn builds_are_deterministic() {
    let config = toaster_config().with_ports(PortsConfig::all_mts().with_multi_client(multi_client()));
    let first = build_toaster(&config);
    let second = build_toaster(&config);
    assert_eq!(first, second);
    assert_eq!(first.content_hash(), second.content_hash());
}

#[test]
fn verbose_does_not_change_the_output() {
    let quiet = build_toaster(&toaster_config());
    let verbose = build_toaster(&toaster_config().with_verbose(true));
    assert_eq!(quiet.content_hash(), verbose.content_hash());
}

#[test]
fn indentation_is_configurable() {
    let spaces = build_toaster(&toaster_config());
    let tabs = build_toaster(&toaster_config().with_indent(Indent::Tab));
    assert!(tabs.header_text().contains("\n\t::My::Project::Toaster m_encapsulee;\n"));
    assert_ne!(spaces.content_hash(), tabs.content_hash());
}

#[test]
fn tab_indentation_reaches_every_nesting_level() {
    let config = toaster_config()
        .with_indent(Indent::Tab)
        .with_ports(PortsConfig::all_mts().with_multi_client(multi_client()));
    let artifact = build_toaster(&config);
    for file in artifact.files() {
        for line in file.contents().lines() {
            let leading = &line[..line.len() - line.trim_start().len()];
            assert!(
                !leading.contains(' '),
                "{}: space indentation in {line:?}",
                file.filename()
            );
        }
    }
    let source = artifact.source_text();
    assert!(source.contains("\t\t\t{\n\t\t\t\treturn ::My::Project::IToaster::Result::Busy;\n"));
    assert!(source.contains("\tfor (auto& client : m_apiClients)\n\t{\n\t\tclient.second->check_bindings();\n\t}\n"));
    assert!(source.contains("\t\tthrow std::runtime_error("));
}

#[test]
fn sts_provides_port_passes_through() {
    let artifact = build_toaster(&toaster_config().with_ports(PortsConfig::sts_provides_mts_requires()));
    assert_eq!(
        artifact.wiring_of("api"),
        Some(Wiring::Accessor(RuntimeSemantics::Sts))
    );
    assert_eq!(artifact.dispatch_count(), 2);
    assert!(!artifact.header_text().contains("m_ppApi"));
    assert!(artifact.header_text().contains(
        "    // Boundary provides-port(s) (MTS) to reroute inwards events\n    // <none>\n"
    ));
    assert!(artifact.source_text().contains(
        "::Dzn::Sts<::My::Project::IToaster> ToasterAdvShell::ProvidesApi()\n{\n    return {m_encapsulee.api};\n}\n"
    ));
}

#[test]
fn all_sts_toaster_has_nothing_to_dispatch() {
    let artifact = build_toaster(&toaster_config().with_ports(PortsConfig::all_sts()));
    assert_eq!(artifact.dispatch_count(), 0);
    assert_eq!(artifact.wiring_of("heater"), Some(Wiring::PassThrough));
    let source = artifact.source_text();
    assert!(source.contains(
        "    // Reroute out-events of boundary requires-port(s) via the dispatcher\n    // <none>\n"
    ));
    assert!(source.contains("    m_encapsulee.heater.check_bindings();\n"));
    assert!(source.contains("return {m_encapsulee.cord};"));
}

#[test]
fn mixed_requires_ports() {
    let config = toaster_config().with_ports(PortsConfig::mixed(
        RuntimeSemantics::Mts,
        ["cord"],
        ["heater"],
    ));
    let artifact = build_toaster(&config);
    assert_eq!(artifact.wiring_of("heater"), Some(Wiring::Dispatched));
    assert_eq!(artifact.wiring_of("cord"), Some(Wiring::PassThrough));
    assert_eq!(artifact.dispatch_count(), 1);
    assert!(artifact.header_text().contains("::Dzn::Sts<::My::Project::IPowerCord> RequiresCord();"));
}

#[test]
fn zero_requires_ports() {
    let model = ModelBuilder::new()
        .interface("Kitchen.ITimer", vec![Event::in_event("Start", "void"), Event::out_event("Expired")])
        .component("Kitchen.Timer", vec![Port::provides("timer", "ITimer")])
        .build()
        .unwrap();
    let artifact = build(&model, &Configuration::new("Timer.dzn", "Kitchen.Timer")).unwrap();
    assert_eq!(artifact.dispatch_count(), 0);
    assert!(artifact.header_text().contains("    // Requires port accessor(s)\n    // <none>\n"));
}

#[test]
fn imported_facilities() {
    let artifact = build_toaster(
        &toaster_config().with_facilities_origin(FacilitiesOrigin::ImportedViaLocator),
    );
    let header = artifact.header_text();
    assert!(!header.contains("#include <dzn/runtime.hh>"));
    assert!(header.contains("    dzn::pump& m_dispatcher;\n"));
    assert!(header.contains("    // Facility accessor(s)\n    // <none>\n"));
    let source = artifact.source_text();
    assert!(source.contains("(const dzn::locator& locator, const std::string& encapsuleeInstanceName)\n"));
    assert!(source.contains(": m_dispatcher(FacilitiesCheck(locator).get<dzn::pump>())\n"));
    assert!(source.contains(", m_encapsulee(locator)\n"));
    assert!(source.contains("Dispatcher missing (dzn::pump)"));
    assert!(!source.contains("Locator()"));
}

#[test]
fn global_namespace_has_no_namespace_block() {
    let model = ModelBuilder::new()
        .interface("ILamp", vec![Event::in_event("On", "void")])
        .component("Lamp", vec![Port::provides("lamp", "ILamp")])
        .build()
        .unwrap();
    let artifact = build(&model, &Configuration::new("Lamp.dzn", "Lamp")).unwrap();
    assert!(!artifact.header_text().contains("namespace "));
    assert!(artifact.header_text().contains("\nstruct LampAdvShell\n{\n"));
    assert!(artifact.source_text().contains("\nLampAdvShell::LampAdvShell("));
    assert!(artifact.source_text().contains("\"LampAdvShell: Overlapping dispatcher found"));
    assert!(artifact.header().namespace().is_global());
}

#[test]
fn support_files_use_the_prefix() {
    let artifact = build_toaster(&toaster_config().with_support_files_ns_prefix("Acme"));
    let support = &artifact.support_files()[0];
    assert_eq!(support.filename(), "Acme_Dzn_StrictPort.hh");
    assert!(support.contents().contains("namespace Acme::Dzn {\n"));
    assert!(artifact.header_text().contains("#include \"Acme_Dzn_StrictPort.hh\""));
    assert!(artifact.header_text().contains("::Acme::Dzn::Mts<::My::Project::IToaster> ProvidesApi();"));
}

#[test]
fn every_support_file_is_included_by_the_shell() {
    let config = toaster_config().with_ports(PortsConfig::all_mts().with_multi_client(multi_client()));
    let artifact = build_toaster(&config);
    let names: Vec<&str> = artifact.support_files().iter().map(|f| f.filename()).collect();
    assert_eq!(names, ["Dzn_StrictPort.hh"]);
    for name in names {
        assert!(artifact.header_text().contains(&format!("#include \"{name}\"")));
    }
    assert!(!artifact.header_text().contains("MultiClientSelector"));
}

#[test]
fn copyright_heads_every_file() {
    let artifact = build_toaster(&toaster_config().with_copyright("Copyright (c) Acme"));
    assert!(artifact.header_text().starts_with("// Copyright (c) Acme\n"));
    assert!(artifact.source_text().starts_with("// Copyright (c) Acme\n"));
    assert!(artifact.support_files()[0].contents().contains("// Copyright (c) Acme\n"));
}

#[test]
fn multi_client_port() {
    let config = toaster_config().with_ports(PortsConfig::all_mts().with_multi_client(multi_client()));
    let artifact = build_toaster(&config);
    assert_eq!(artifact.wiring_of("api"), Some(Wiring::MultiClientAccessor));

    let header = artifact.header_text();
    assert!(header.contains("#include <map>\n#include <memory>\n#include <mutex>\n"));
    assert!(header.contains("// - api: IToaster (multi-client)\n"));
    assert!(header.contains(
        "    ::Dzn::Mts<::My::Project::IToaster> ProvidesApi(const std::string& clientIdentifier);\n"
    ));
    assert!(header.contains("    std::optional<std::string> m_apiOwner;\n"));
    assert!(header.contains("    std::recursive_mutex m_apiMutex;\n"));

    let source = artifact.source_text();
    assert!(source.contains("    return {ApiClientPort(clientIdentifier)};\n"));
    assert!(source.contains(
        "::My::Project::IToaster& ToasterAdvShell::ApiClientPort(const std::string& clientIdentifier)\n{\n"
    ));
    assert!(source.contains("return ::My::Project::IToaster::Result::Busy;"));
    assert!(source.contains("if (reply != ::My::Project::IToaster::Result::Ok)"));
    assert!(source.contains("    m_ppApi.out.Done = [&] {\n"));
    assert!(source.contains("m_apiClients.at(*m_apiOwner)->out.Done();"));
    assert!(source.contains("    for (auto& client : m_apiClients)\n    {\n"));
}

#[test]
fn nested_reply_type_shadows_global_namesake() {
    let model = toaster_builder()
        .enumeration("Result", ["Yes", "No"])
        .build()
        .unwrap();
    let config = toaster_config().with_ports(PortsConfig::all_mts().with_multi_client(multi_client()));
    let artifact = build(&model, &config).unwrap();
    let source = artifact.source_text();
    assert!(source.contains("-> ::My::Project::IToaster::Result {"));
    assert!(source.contains("if (reply != ::My::Project::IToaster::Result::Ok)"));
    assert!(!source.contains("::Result::Yes"));
}

#[test]
fn multi_client_port_must_be_mts() {
    let config = toaster_config().with_ports(PortsConfig::all_sts().with_multi_client(multi_client()));
    assert!(matches!(
        build(&toaster_model(), &config),
        Err(ShellError::Configuration(ConfigurationError::MultiClient { .. }))
    ));
}

#[test]
fn system_encapsulee() {
    let model = toaster_builder()
        .system(
            "My.Project.ToasterSystem",
            vec![Port::provides("api", "IToaster"), Port::requires("heater", "IHeater")],
            vec![Instance::new("toaster", "Toaster")],
        )
        .build()
        .unwrap();
    let config = Configuration::new("ToasterSystem.dzn", "My.Project.ToasterSystem");
    let artifact = build(&model, &config).unwrap();
    assert!(artifact.header_text().contains("    ::My::Project::ToasterSystem m_encapsulee;\n"));
    assert_eq!(artifact.dispatch_count(), 1);
}

#[test]
fn system_instance_must_be_a_component() {
    let model = toaster_builder()
        .system(
            "My.Project.Broken",
            vec![],
            vec![Instance::new("oops", "IToaster")],
        )
        .build()
        .unwrap();
    let config = Configuration::new("Broken.dzn", "My.Project.Broken");
    assert!(matches!(
        build(&model, &config),
        Err(ShellError::Model(ModelError::NotAComponent { .. }))
    ));
}

#[test]
fn configuration_errors() {
    let model = toaster_model();
    let cases = [
        Configuration::new("Toaster.dzn", "My.Project.Oven"),
        Configuration::new("Toaster.dzn", "My..Toaster"),
        toaster_config().with_ports(PortsConfig::all_mts().with_port("fan", RuntimeSemantics::Sts)),
        toaster_config().with_ports(PortsConfig::empty()),
        toaster_config().with_output_basename_suffix("-shell"),
        toaster_config().with_support_files_ns_prefix("Acme..Dzn"),
    ];
    for config in &cases {
        assert!(
            matches!(build(&model, config), Err(ShellError::Configuration(_))),
            "expected a configuration error for {config:?}"
        );
    }
}

#[test]
fn model_errors() {
    let duplicate = ModelBuilder::new()
        .interface("I", vec![])
        .component("C", vec![Port::provides("p", "I"), Port::requires("p", "I")])
        .build()
        .unwrap();
    assert_eq!(
        build(&duplicate, &Configuration::new("C.dzn", "C")),
        Err(ModelError::DuplicatePort { port: "p".into() }.into())
    );

    let unresolved = ModelBuilder::new()
        .component("C", vec![Port::provides("p", "IMissing")])
        .build()
        .unwrap();
    assert!(matches!(
        build(&unresolved, &Configuration::new("C.dzn", "C")),
        Err(ShellError::Resolution(_))
    ));

    let empty = ModelBuilder::new().build().unwrap();
    assert_eq!(
        build(&empty, &Configuration::new("C.dzn", "C")),
        Err(ModelError::EmptyModel.into())
    );
}

#[derive(Clone, Default)]
struct Captured(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

impl std::io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn captured_logs(config: &Configuration) -> String {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .finish();
    tracing::subscriber::with_default(subscriber, || build_toaster(config));
    let bytes = captured.0.lock().unwrap().clone();
    String::from_utf8(bytes).unwrap()
}

#[test]
fn verbose_builds_log_a_summary() {
    let logs = captured_logs(&toaster_config().with_verbose(true));
    assert!(logs.contains("generated advanced shell"));
    assert!(logs.contains("shell=ToasterAdvShell"));
    assert!(logs.contains("dispatched=2"));
}

#[test]
fn quiet_builds_log_nothing_at_info() {
    assert!(captured_logs(&toaster_config()).is_empty());
}
