use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use peerlink_core::BindingId;

use crate::channel::{Binding, GroupChannel, ReadOutcome};

#[derive(Debug)]
struct BindingState {
    /// Records this participant published (absent markers included).
    local: HashMap<String, Option<String>>,
    /// Last-writer-wins snapshot of what the group published.
    remote: HashMap<String, Option<String>>,
    view_available: bool,
    /// Every local write, in order.
    writes: Vec<(String, Option<String>)>,
}

impl Default for BindingState {
    fn default() -> Self {
        Self {
            local: HashMap::new(),
            remote: HashMap::new(),
            view_available: true,
            writes: Vec::new(),
        }
    }
}

/// Handle to one in-memory binding. Clones share state.
#[derive(Debug, Clone)]
pub struct MemoryBinding {
    id: BindingId,
    state: Arc<RwLock<BindingState>>,
    loopback: bool,
}

impl MemoryBinding {
    fn new(id: BindingId, loopback: bool) -> Self {
        Self {
            id,
            state: Arc::new(RwLock::new(BindingState::default())),
            loopback,
        }
    }

    /// Simulate a peer publishing `value` under `key`.
    pub fn publish_remote(&self, key: &str, value: Option<&str>) {
        self.state
            .write()
            .remote
            .insert(key.to_string(), value.map(str::to_string));
    }

    /// Drop everything the group published.
    pub fn clear_remote(&self) {
        self.state.write().remote.clear();
    }

    /// Value currently held in the local slot for `key`.
    pub fn local_value(&self, key: &str) -> Option<String> {
        self.state.read().local.get(key).cloned().flatten()
    }

    /// Whether `key` was ever written locally, including absent writes.
    pub fn has_local_entry(&self, key: &str) -> bool {
        self.state.read().local.contains_key(key)
    }

    /// All local writes so far, oldest first.
    pub fn writes(&self) -> Vec<(String, Option<String>)> {
        self.state.read().writes.clone()
    }

    /// Copy the local slot into the remote view, as the transport would
    /// after a sync round.
    pub fn propagate(&self) {
        let mut state = self.state.write();
        let local: Vec<_> = state.local.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        let count = local.len();
        state.remote.extend(local);
        debug!(binding = %self.id, records = count, "propagated local slot");
    }

    /// Make the remote view (un)addressable.
    pub fn set_view_available(&self, available: bool) {
        self.state.write().view_available = available;
    }
}

impl Binding for MemoryBinding {
    fn identifier(&self) -> &BindingId {
        &self.id
    }

    fn try_read(&self, key: &str) -> ReadOutcome {
        let state = self.state.read();
        if !state.view_available {
            return ReadOutcome::Unavailable(format!("remote view of {} is not addressable", self.id));
        }
        match state.remote.get(key) {
            Some(Some(v)) => ReadOutcome::Value(v.clone()),
            Some(None) | None => ReadOutcome::Absent,
        }
    }

    fn write(&self, key: &str, value: Option<String>) {
        let mut state = self.state.write();
        state.writes.push((key.to_string(), value.clone()));
        if self.loopback {
            state.remote.insert(key.to_string(), value.clone());
        }
        state.local.insert(key.to_string(), value);
    }
}

/// In-memory [`GroupChannel`] keeping bindings in insertion order.
///
/// With loopback enabled, local writes show up in the remote view at once,
/// which models a group where propagation is synchronous.
#[derive(Debug, Clone, Default)]
pub struct MemoryChannel {
    bindings: Arc<RwLock<Vec<MemoryBinding>>>,
    loopback: bool,
}

impl MemoryChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Channel whose bindings mirror local writes into the remote view.
    pub fn loopback() -> Self {
        Self {
            bindings: Arc::default(),
            loopback: true,
        }
    }

    /// Create a binding (transport join). Returns the existing handle if the
    /// identifier is already bound.
    pub fn add_binding(&self, id: impl Into<BindingId>) -> MemoryBinding {
        let id = id.into();
        let mut bindings = self.bindings.write();
        if let Some(existing) = bindings.iter().find(|b| b.id == id) {
            return existing.clone();
        }
        let binding = MemoryBinding::new(id, self.loopback);
        info!(binding = %binding.id, "peer-group binding created");
        bindings.push(binding.clone());
        binding
    }

    /// Tear a binding down (transport `broken`).
    pub fn remove_binding(&self, id: &BindingId) -> bool {
        let mut bindings = self.bindings.write();
        let before = bindings.len();
        bindings.retain(|b| &b.id != id);
        let removed = bindings.len() != before;
        if removed {
            info!(binding = %id, "peer-group binding removed");
        }
        removed
    }

    pub fn binding(&self, id: &BindingId) -> Option<MemoryBinding> {
        self.bindings.read().iter().find(|b| &b.id == id).cloned()
    }

    /// First binding in insertion order.
    pub fn first(&self) -> Option<MemoryBinding> {
        self.bindings.read().first().cloned()
    }

    pub fn len(&self) -> usize {
        self.bindings.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.read().is_empty()
    }
}

impl GroupChannel for MemoryChannel {
    type Binding = MemoryBinding;

    fn current_bindings(&self) -> Vec<MemoryBinding> {
        self.bindings.read().clone()
    }
}
