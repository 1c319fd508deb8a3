//! Scripted replay of membership events and record operations against an
//! in-memory group channel.
//!
//! A script is a JSON array of steps:
//!
//! ```json
//! [
//!   {"step": "bind", "id": "cluster:19"},
//!   {"step": "event", "event": "joined"},
//!   {"step": "set", "key": "cert", "value": {"x": "y"}},
//!   {"step": "get", "key": "cert"}
//! ]
//! ```

use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use tokio::sync::broadcast;
use tracing::debug;

use peerlink_config::EndpointConfig;
use peerlink_core::{BindingId, Event, PeerError, Result};
use peerlink_peer::codec;
use peerlink_peer::{MemoryChannel, MembershipEvent, PeerEndpoint};

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    /// Transport creates a binding.
    Bind { id: String },
    /// Transport tears a binding down (send a `broken` event separately).
    Unbind { id: String },
    /// Deliver a membership event.
    Event { event: MembershipEvent },
    /// Deliver a raw hook name, e.g. `endpoint.cluster.changed`.
    Hook { name: String },
    /// Publish a record through the endpoint.
    Set {
        key: String,
        #[serde(default)]
        value: Value,
    },
    /// Read a record through the endpoint.
    Get { key: String },
    /// Simulate a peer writing raw text into the remote view.
    Publish {
        key: String,
        #[serde(default)]
        value: Option<String>,
        /// Target binding; the first one when omitted.
        #[serde(default)]
        binding: Option<String>,
    },
    /// Copy every binding's local slot into its remote view.
    Propagate,
}

pub fn parse_script(raw: &str) -> Result<Vec<Step>> {
    serde_json::from_str(raw).map_err(|e| PeerError::Script(format!("invalid script: {e}")))
}

pub fn load_script(path: &Path) -> Result<Vec<Step>> {
    let raw = std::fs::read_to_string(path)?;
    parse_script(&raw)
}

/// Drives one endpoint over a [`MemoryChannel`] and renders what happens as
/// text lines.
pub struct Replay {
    channel: MemoryChannel,
    endpoint: PeerEndpoint<MemoryChannel>,
    events: broadcast::Receiver<Event>,
}

impl Replay {
    pub fn new(config: &EndpointConfig, loopback: bool) -> Self {
        let channel = if loopback {
            MemoryChannel::loopback()
        } else {
            MemoryChannel::new()
        };
        let endpoint = PeerEndpoint::new(channel.clone(), config);
        let events = endpoint.event_bus().subscribe();
        Self {
            channel,
            endpoint,
            events,
        }
    }

    pub fn endpoint(&self) -> &PeerEndpoint<MemoryChannel> {
        &self.endpoint
    }

    /// Run all steps, stopping at the first failing one.
    pub fn run(&mut self, steps: &[Step]) -> Result<Vec<String>> {
        let mut lines = Vec::new();
        for (i, step) in steps.iter().enumerate() {
            debug!(index = i, ?step, "replaying step");
            let mut out = self
                .apply(step)
                .map_err(|e| PeerError::Script(format!("step {}: {e}", i + 1)))?;
            lines.append(&mut out);
            lines.append(&mut self.drain_events());
        }
        Ok(lines)
    }

    fn apply(&mut self, step: &Step) -> Result<Vec<String>> {
        let mut lines = Vec::new();
        match step {
            Step::Bind { id } => {
                self.channel.add_binding(id.as_str());
                lines.push(format!("bound {id}"));
            }
            Step::Unbind { id } => {
                if self.channel.remove_binding(&BindingId::new(id.as_str())) {
                    lines.push(format!("unbound {id}"));
                } else {
                    lines.push(format!("no binding {id}"));
                }
            }
            Step::Event { event } => {
                self.endpoint.handle(*event);
                lines.push(format!("{event} -> {}", self.endpoint.state()));
            }
            Step::Hook { name } => {
                self.endpoint.dispatch_hook(name)?;
                lines.push(format!("{name} -> {}", self.endpoint.state()));
            }
            Step::Set { key, value } => {
                self.endpoint.set(key, value)?;
            }
            Step::Get { key } => {
                let value = self.endpoint.get(key)?;
                lines.push(format!("get {key} = {}", codec::to_text(&value)?));
            }
            Step::Publish {
                key,
                value,
                binding,
            } => {
                let target = match binding {
                    Some(id) => self.channel.binding(&BindingId::new(id.as_str())),
                    None => self.channel.first(),
                };
                let target = target
                    .ok_or_else(|| PeerError::Script("no binding to publish into".into()))?;
                target.publish_remote(key, value.as_deref());
                lines.push(format!("peer published {key}"));
            }
            Step::Propagate => {
                for id in self.endpoint.list_binding_identifiers() {
                    if let Some(b) = self.channel.binding(&id) {
                        b.propagate();
                    }
                }
                lines.push("propagated".to_string());
            }
        }
        Ok(lines)
    }

    fn drain_events(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            lines.push(match event {
                Event::FlagRaised { endpoint, flag, .. } => {
                    format!("+ {}", flag.qualified(&endpoint))
                }
                Event::FlagCleared { endpoint, flag, .. } => {
                    format!("- {}", flag.qualified(&endpoint))
                }
                Event::RecordPublished {
                    binding,
                    key,
                    present: true,
                    ..
                } => format!("published {key} on {binding}"),
                Event::RecordPublished { binding, key, .. } => {
                    format!("withdrew {key} on {binding}")
                }
                Event::BindingMissing { operation, .. } => {
                    format!("! no peer binding for {operation}")
                }
            });
        }
        lines
    }
}
