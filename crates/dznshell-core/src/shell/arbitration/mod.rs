// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Claim/release arbitration of a multi-client provides port.
//!
//! **DDD Context:** Shell Generation / Multi-Client Arbitration
//!
//! Every client asks the shell for its own port instance by identifier. All
//! client ports funnel their in-events into the one boundary port of the
//! encapsulee; out-events of the encapsulee go to the client that currently
//! owns the port and to nobody while it is unclaimed. Ownership is taken by
//! the claim event and given back by the release event.
//!
//! The generated critical sections follow [`contract::Arbiter`]:
//!
//! - claim is a test-and-set of the owner slot under the arbitration mutex,
//!   after which the claim is forwarded; a refused claim clears the slot only
//!   while the claimant still holds it;
//! - release only acts for the owner;
//! - out-events are routed under the same mutex.
//!
//! Forwarding to the encapsulee happens outside the mutex because it blocks
//! on the dispatcher, which may deliver out-events in the meantime.

pub mod contract;

use ecow::EcoString;

use super::config::{MultiClientConfig, Result, RuntimeSemantics};
use super::facilities::capitalize;
use super::ports::{ShellPort, titled_group};
use super::resolve::{ReplyType, ResolvedEvent};
use crate::codegen::cpp::{Function, MemberVariable, Node, Param, TypeDesc, TypePostfix};
use crate::error::ConfigurationError;
use crate::model::{EventDirection, PortDirection};
use crate::scoping::NamespaceIds;

pub use contract::{Arbiter, ClaimOutcome};

/// Header includes the arbitration members need.
pub(crate) const SYSTEM_INCLUDES: [&str; 5] = ["map", "memory", "mutex", "optional", "string"];

const CLIENT_ID: &str = "clientIdentifier";

fn client_id_param() -> Param {
    Param::new(
        TypeDesc::verbatim("std::string")
            .with_const()
            .with_postfix(TypePostfix::Reference),
        CLIENT_ID,
    )
}

/// A validated multi-client configuration bound to its port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ArbitrationPlan {
    port: EcoString,
    boundary: String,
    interface_type: TypeDesc,
    claim_event: EcoString,
    release_event: EcoString,
    reply_type: String,
    success: String,
    failure: String,
}

fn invalid(config: &MultiClientConfig, reason: impl Into<String>) -> ConfigurationError {
    ConfigurationError::MultiClient {
        port: config.port.clone(),
        reason: reason.into(),
    }
}

/// Check `config` against the shell ports and bind it.
///
/// The port must be a non-injected MTS provides port. The claim event must
/// be an in-event replying an enum or bool that has the success value; the
/// failure value is the configured one, or the only other value of a
/// two-valued reply type. The release event must be a distinct in-event
/// without a reply.
pub(crate) fn plan(config: &MultiClientConfig, ports: &[ShellPort<'_>]) -> Result<ArbitrationPlan> {
    let port = ports
        .iter()
        .find(|p| p.name() == config.port.as_str())
        .ok_or_else(|| invalid(config, "not a non-injected port of the encapsulee"))?;
    if port.direction() != PortDirection::Provides {
        return Err(invalid(config, "must be a provides port"));
    }
    if port.semantics != RuntimeSemantics::Mts {
        return Err(invalid(config, "must have multi-threaded (MTS) semantics"));
    }
    if config.claim_event == config.release_event {
        return Err(invalid(config, "claim and release must be different events"));
    }

    let claim = in_event(config, port, &config.claim_event)?;
    let success = claim.reply.cpp_value(&config.claim_success).ok_or_else(|| {
        invalid(
            config,
            format!(
                "claim event '{}' cannot reply '{}'",
                config.claim_event, config.claim_success
            ),
        )
    })?;
    let failure = match &config.claim_failure {
        Some(value) if *value == config.claim_success => {
            return Err(invalid(config, "claim failure and success values must differ"));
        }
        Some(value) => claim.reply.cpp_value(value).ok_or_else(|| {
            invalid(
                config,
                format!("claim event '{}' cannot reply '{value}'", config.claim_event),
            )
        })?,
        None => infer_failure(config, &claim.reply)?,
    };

    let release = in_event(config, port, &config.release_event)?;
    if release.reply != ReplyType::Void {
        return Err(invalid(
            config,
            format!("release event '{}' must not reply a value", config.release_event),
        ));
    }

    let boundary = port
        .boundary_name()
        .ok_or_else(|| invalid(config, "has no boundary port"))?;
    Ok(ArbitrationPlan {
        port: config.port.clone(),
        boundary,
        interface_type: port.interface_type(),
        claim_event: config.claim_event.clone(),
        release_event: config.release_event.clone(),
        reply_type: claim.reply.cpp_type(),
        success,
        failure,
    })
}

fn in_event<'p, 'm>(
    config: &MultiClientConfig,
    port: &'p ShellPort<'m>,
    name: &str,
) -> Result<&'p ResolvedEvent<'m>> {
    match port.interface.event(name) {
        Some(event) if event.direction() == EventDirection::In => Ok(event),
        Some(_) => Err(invalid(config, format!("'{name}' is not an in-event"))),
        None => Err(invalid(
            config,
            format!("interface '{}' has no event '{name}'", port.interface.fqn),
        )),
    }
}

fn infer_failure(config: &MultiClientConfig, reply: &ReplyType) -> Result<String> {
    let values = reply.values();
    if values.is_empty() {
        return Err(invalid(
            config,
            format!(
                "claim event '{}' must reply an enum or bool",
                config.claim_event
            ),
        ));
    }
    let others: Vec<&EcoString> = values.iter().filter(|v| **v != config.claim_success).collect();
    match others.as_slice() {
        [only] => reply
            .cpp_value(only)
            .ok_or_else(|| invalid(config, "claim reply value cannot be spelled")),
        _ => Err(invalid(
            config,
            "the claim reply type has more than two values; configure the failure value",
        )),
    }
}

impl ArbitrationPlan {
    pub(crate) fn port(&self) -> &str {
        &self.port
    }

    fn cap(&self) -> String {
        capitalize(&self.port)
    }

    fn clients(&self) -> String {
        format!("m_{}Clients", self.port)
    }

    fn owner(&self) -> String {
        format!("m_{}Owner", self.port)
    }

    fn mutex(&self) -> String {
        format!("m_{}Mutex", self.port)
    }

    fn lock(&self) -> String {
        format!("std::lock_guard<std::recursive_mutex> lock({});", self.mutex())
    }

    fn factory_name(&self) -> String {
        format!("{}ClientPort", self.cap())
    }

    /// Private members of the arbitration construct.
    pub(crate) fn members(&self, port: &ShellPort<'_>, shell_name: &str) -> Node {
        let clients = TypeDesc::verbatim("std::map")
            .with_template_arg(TypeDesc::verbatim("std::string"))
            .with_template_arg(TypeDesc::template("std::unique_ptr", self.interface_type.clone()));
        let owner = TypeDesc::template("std::optional", TypeDesc::verbatim("std::string"));
        Node::Block(vec![
            Node::comment(&format!("Multi-client arbitration of provides-port \"{}\"", self.port)),
            Node::Variable(MemberVariable::new(clients, self.clients())),
            Node::Variable(MemberVariable::new(owner, self.owner())),
            Node::Variable(MemberVariable::new(
                TypeDesc::verbatim("std::recursive_mutex"),
                self.mutex(),
            )),
            Node::Blank,
            Node::Declaration(self.factory(port, shell_name)),
        ])
    }

    /// The per-client accessor replacing the single-client one.
    pub(crate) fn accessor(&self, port: &ShellPort<'_>, shell_name: &str, support_ns: &NamespaceIds) -> Function {
        Function::new(port.strict_type(support_ns), port.accessor_name())
            .with_scope(shell_name)
            .with_param(client_id_param())
            .with_body(vec![Node::text(&format!(
                "return {{{}({CLIENT_ID})}};",
                self.factory_name()
            ))])
    }

    /// Creates a client port on first request and wires its in-events.
    pub(crate) fn factory(&self, port: &ShellPort<'_>, shell_name: &str) -> Function {
        Function::new(
            self.interface_type.clone().with_postfix(TypePostfix::Reference),
            self.factory_name(),
        )
        .with_scope(shell_name)
        .with_param(client_id_param())
        .with_body(self.factory_body(port))
    }

    fn factory_body(&self, port: &ShellPort<'_>) -> Vec<Node> {
        let mut body = vec![
            Node::text(&self.lock()),
            Node::text(&format!("auto found = {}.find({CLIENT_ID});", self.clients())),
            Node::braced(
                &format!("if (found != {}.end())", self.clients()),
                vec![Node::text("return *found->second;")],
            ),
            Node::Blank,
            Node::text(&format!(
                "auto& client = *({}[{CLIENT_ID}] = std::make_unique<{}>({}));",
                self.clients(),
                self.interface_type,
                self.boundary
            )),
            Node::text(&format!("client.meta.require.name = {CLIENT_ID};")),
        ];
        for event in port.interface.events(EventDirection::In) {
            body.push(Node::Blank);
            body.push(self.in_event_wiring(event));
        }
        body.push(Node::Blank);
        body.push(Node::text("return client;"));
        body
    }

    fn forward(&self, event: &ResolvedEvent<'_>) -> String {
        format!("{}.in.{}({})", self.boundary, event.name(), event.call_args())
    }

    fn in_event_wiring(&self, event: &ResolvedEvent<'_>) -> Node {
        let params = event.lambda_params();
        let params = if params.is_empty() { "()".to_string() } else { params };
        let lock = self.lock();
        let owner = self.owner();
        let is_claim = self.claim_event.as_str() == event.name();
        let body = if is_claim {
            vec![
                Node::braced(
                    "",
                    vec![
                        Node::text(&lock),
                        Node::braced(
                            &format!("if ({owner}.has_value())"),
                            vec![Node::text(&format!("return {};", self.failure))],
                        ),
                        Node::text(&format!("{owner} = {CLIENT_ID};")),
                    ],
                ),
                Node::text(&format!("auto reply = {};", self.forward(event))),
                Node::braced(
                    &format!("if (reply != {})", self.success),
                    vec![
                        Node::text(&lock),
                        Node::braced(
                            &format!("if ({owner} == {CLIENT_ID})"),
                            vec![Node::text(&format!("{owner}.reset();"))],
                        ),
                    ],
                ),
                Node::text("return reply;"),
            ]
        } else if self.release_event.as_str() == event.name() {
            vec![
                Node::braced(
                    "",
                    vec![
                        Node::text(&lock),
                        Node::braced(
                            &format!("if ({owner} != {CLIENT_ID})"),
                            vec![Node::text("return;")],
                        ),
                    ],
                ),
                Node::text(&format!("{};", self.forward(event))),
                Node::text(&lock),
                Node::text(&format!("{owner}.reset();")),
            ]
        } else {
            vec![Node::text(&format!("return {};", self.forward(event)))]
        };
        let head = if is_claim {
            format!(
                "client.in.{} = [this, {CLIENT_ID}]{params} -> {} {{",
                event.name(),
                self.reply_type
            )
        } else if self.release_event.as_str() == event.name() {
            format!("client.in.{} = [this, {CLIENT_ID}]{params} {{", event.name())
        } else {
            format!("client.in.{} = [this]{params} {{", event.name())
        };
        Node::Block(vec![Node::text(&head), Node::Indented(body), Node::text("};")])
    }

    /// Constructor statements routing the encapsulee's out-events to the
    /// owner. Nothing is delivered while the port is unclaimed.
    pub(crate) fn out_event_routes(&self, port: &ShellPort<'_>) -> Node {
        let routes = port
            .interface
            .events(EventDirection::Out)
            .map(|event| {
                let owner = self.owner();
                Node::Block(vec![
                    Node::text(&format!(
                        "{}.out.{} = [&]{} {{",
                        self.boundary,
                        event.name(),
                        event.lambda_params()
                    )),
                    Node::Indented(vec![
                        Node::text(&self.lock()),
                        Node::braced(
                            &format!("if (!{owner}.has_value())"),
                            vec![Node::text("return;")],
                        ),
                        Node::text(&format!(
                            "{}.at(*{owner})->out.{}({});",
                            self.clients(),
                            event.name(),
                            event.call_args()
                        )),
                    ]),
                    Node::text("};"),
                ])
            })
            .collect();
        titled_group(
            &format!("Route out-events of \"{}\" to the client owning it", self.port),
            routes,
        )
    }

    /// `FinalConstruct` statements checking every client port.
    pub(crate) fn check_client_bindings(&self) -> Node {
        Node::braced(
            &format!("for (auto& client : {})", self.clients()),
            vec![Node::text("client.second->check_bindings();")],
        )
    }
}
