use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use peerlink_config::{BindingPolicy, EndpointConfig, MalformedPayloadPolicy};
use peerlink_core::{BindingId, Event, EventBus, Flag, FlagSet, PeerError, Result};

use crate::channel::{Binding, GroupChannel, ReadOutcome};
use crate::codec;
use crate::lifecycle::{LifecycleState, MembershipEvent};

/// One participant's endpoint on a peer group.
///
/// Membership events drive the lifecycle state; every resulting flag change
/// is published on the event bus. `get`/`set` go straight to the channel
/// and never touch lifecycle state.
///
/// Event handlers take `&mut self` and must not be invoked concurrently.
pub struct PeerEndpoint<C: GroupChannel> {
    name: String,
    channel: C,
    state: LifecycleState,
    /// Whether a `joined` was ever observed.
    has_joined: bool,
    binding_policy: BindingPolicy,
    malformed_payload: MalformedPayloadPolicy,
    pub(crate) global_client_cert_key: String,
    bus: EventBus,
}

impl<C: GroupChannel> PeerEndpoint<C> {
    pub fn new(channel: C, config: &EndpointConfig) -> Self {
        info!(
            endpoint = %config.name,
            binding_policy = ?config.binding_policy,
            malformed_payload = ?config.malformed_payload,
            "peer endpoint created"
        );
        Self {
            name: config.name.clone(),
            channel,
            state: LifecycleState::Idle,
            has_joined: false,
            binding_policy: config.binding_policy,
            malformed_payload: config.malformed_payload,
            global_client_cert_key: config.global_client_cert_key.clone(),
            bus: EventBus::default(),
        }
    }

    /// Publish onto an existing bus instead of a private one.
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.bus = bus;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn flags(&self) -> FlagSet {
        self.state.flags()
    }

    pub fn is_set(&self, flag: Flag) -> bool {
        self.flags().is_set(flag)
    }

    /// Names of the raised flags, namespaced by endpoint (`cluster.connected`).
    pub fn raised_flags(&self) -> Vec<String> {
        self.flags()
            .raised()
            .into_iter()
            .map(|f| f.qualified(&self.name))
            .collect()
    }

    // ── Lifecycle ──────────────────────────────────────────────

    /// Apply a membership event and publish the flags it raised or cleared.
    pub fn handle(&mut self, event: MembershipEvent) -> FlagSet {
        let before = self.state;
        if event == MembershipEvent::Changed && !self.has_joined {
            warn!(
                endpoint = %self.name,
                "peer data changed before any peer joined; marking clustered without a connection"
            );
        }
        match event {
            MembershipEvent::Joined => self.has_joined = true,
            MembershipEvent::Broken => self.has_joined = false,
            MembershipEvent::Changed | MembershipEvent::Departed => {}
        }

        self.state = before.on(event);
        if self.state == before {
            debug!(endpoint = %self.name, %event, state = %before, "membership event had no effect");
            return self.flags();
        }

        info!(endpoint = %self.name, %event, from = %before, to = %self.state, "lifecycle transition");
        self.publish_flag_changes(before.flags(), self.state.flags());
        self.flags()
    }

    pub fn joined(&mut self) -> FlagSet {
        self.handle(MembershipEvent::Joined)
    }

    pub fn changed(&mut self) -> FlagSet {
        self.handle(MembershipEvent::Changed)
    }

    pub fn departed(&mut self) -> FlagSet {
        self.handle(MembershipEvent::Departed)
    }

    pub fn broken(&mut self) -> FlagSet {
        self.handle(MembershipEvent::Broken)
    }

    /// Dispatch a transport hook such as `endpoint.cluster.joined`.
    pub fn dispatch_hook(&mut self, hook: &str) -> Result<FlagSet> {
        let event = MembershipEvent::from_hook(&self.name, hook)
            .ok_or_else(|| PeerError::UnknownEvent(hook.to_string()))?;
        Ok(self.handle(event))
    }

    /// Hook names this endpoint reacts to.
    pub fn hook_names(&self) -> Vec<String> {
        MembershipEvent::ALL
            .iter()
            .map(|e| e.hook_name(&self.name))
            .collect()
    }

    fn publish_flag_changes(&self, before: FlagSet, after: FlagSet) {
        for flag in Flag::ALL {
            let (was, is) = (before.is_set(flag), after.is_set(flag));
            if was == is {
                continue;
            }
            let endpoint = self.name.clone();
            let at = Utc::now();
            debug!(flag = %flag.qualified(&self.name), raised = is, "lifecycle flag changed");
            self.bus.publish(if is {
                Event::FlagRaised { endpoint, flag, at }
            } else {
                Event::FlagCleared { endpoint, flag, at }
            });
        }
    }

    // ── Bindings ───────────────────────────────────────────────

    /// Identifiers of all active bindings, in transport order.
    pub fn list_binding_identifiers(&self) -> Vec<BindingId> {
        self.channel
            .current_bindings()
            .iter()
            .map(|b| b.identifier().clone())
            .collect()
    }

    /// The authoritative binding under the configured policy, or `None` when
    /// no binding exists (before the first join, or mid-teardown).
    fn active_binding(&self, operation: &str) -> Result<Option<C::Binding>> {
        let bindings = self.channel.current_bindings();
        match (bindings.len(), self.binding_policy) {
            (0, _) => {
                warn!(endpoint = %self.name, operation, "no peer relation: possibly departing");
                self.bus.publish(Event::BindingMissing {
                    endpoint: self.name.clone(),
                    operation: operation.to_string(),
                });
                Ok(None)
            }
            (1, _) => Ok(bindings.into_iter().next()),
            (count, BindingPolicy::Single) => {
                warn!(endpoint = %self.name, operation, count, "refusing to pick among several bindings");
                Err(PeerError::AmbiguousBinding { count })
            }
            (_, BindingPolicy::First) => {
                let ignored: Vec<String> = bindings[1..]
                    .iter()
                    .map(|b| b.identifier().to_string())
                    .collect();
                debug!(endpoint = %self.name, ?ignored, "several bindings, using the first");
                Ok(bindings.into_iter().next())
            }
        }
    }

    // ── Keyed exchange ─────────────────────────────────────────

    /// Read a record from the group's view.
    ///
    /// Returns `{}` when there is no binding, no value, an empty value, or
    /// the view cannot be read. A value that is not JSON follows the
    /// malformed-payload policy.
    pub fn get(&self, key: &str) -> Result<Value> {
        Ok(self.fetch(key)?.unwrap_or_else(codec::empty_record))
    }

    /// Read a record and decode it into `T`.
    ///
    /// `None` when there is no record to read; published values such as
    /// `0` or `false` decode as themselves.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(value) = self.fetch(key)? else {
            return Ok(None);
        };
        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| PeerError::MalformedPayload {
                key: key.to_string(),
                reason: e.to_string(),
            })
    }

    /// The decoded record, or `None` when nothing usable was published.
    fn fetch(&self, key: &str) -> Result<Option<Value>> {
        check_key(key)?;
        let Some(binding) = self.active_binding("get")? else {
            return Ok(None);
        };

        let raw = match binding.try_read(key) {
            ReadOutcome::Value(raw) if !raw.trim().is_empty() => raw,
            ReadOutcome::Value(_) | ReadOutcome::Absent => return Ok(None),
            ReadOutcome::Unavailable(reason) => {
                warn!(
                    endpoint = %self.name,
                    binding = %binding.identifier(),
                    key,
                    %reason,
                    "retrieving key from peer data failed"
                );
                return Ok(None);
            }
        };

        match codec::decode(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => match self.malformed_payload {
                MalformedPayloadPolicy::Empty => {
                    warn!(endpoint = %self.name, key, error = %e, "ignoring malformed peer payload");
                    Ok(None)
                }
                MalformedPayloadPolicy::Error => Err(PeerError::MalformedPayload {
                    key: key.to_string(),
                    reason: e.to_string(),
                }),
            },
        }
    }

    /// Publish a record into the local slot. Empty values withdraw it.
    ///
    /// Without a binding this is a logged no-op. Propagation to peers is
    /// asynchronous; a following `get` may still see the old value.
    /// A non-finite float serializes as `null` and so withdraws the record.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        check_key(key)?;
        let Some(binding) = self.active_binding("set")? else {
            return Ok(());
        };

        let data = codec::encode(value)?;
        let present = data.is_some();
        binding.write(key, data);
        debug!(endpoint = %self.name, binding = %binding.identifier(), key, present, "published record");

        self.bus.publish(Event::RecordPublished {
            endpoint: self.name.clone(),
            binding: binding.identifier().clone(),
            key: key.to_string(),
            present,
        });
        Ok(())
    }

    /// Withdraw a record from the local slot.
    pub fn clear(&self, key: &str) -> Result<()> {
        self.set(key, &Value::Null)
    }
}

fn check_key(key: &str) -> Result<()> {
    if key.trim().is_empty() {
        return Err(PeerError::InvalidKey(key.to_string()));
    }
    Ok(())
}
