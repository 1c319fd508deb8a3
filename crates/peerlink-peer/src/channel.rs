//! Interface to the group channel the transport maintains.
//!
//! The endpoint never owns the channel; it only reads the remote view and
//! writes its own local slot of whichever binding is authoritative.

use peerlink_core::BindingId;

/// Result of a key lookup against a binding's remote read view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The group published a value for the key.
    Value(String),
    /// No value (missing entry or an explicit absent marker).
    Absent,
    /// The view could not be addressed right now, e.g. mid-teardown.
    Unavailable(String),
}

/// This participant's connection to one peer group instance.
pub trait Binding {
    /// Stable identifier assigned by the transport at creation.
    fn identifier(&self) -> &BindingId;

    /// Read `key` from the remote view (last writer wins).
    fn try_read(&self, key: &str) -> ReadOutcome;

    /// Write `key` into the local slot. `None` withdraws the record.
    /// Propagation to other participants happens out of band.
    fn write(&self, key: &str, value: Option<String>);
}

/// A shared broadcast key-value store, enumerated as per-group bindings.
pub trait GroupChannel {
    type Binding: Binding;

    /// Active bindings in transport-reported order.
    fn current_bindings(&self) -> Vec<Self::Binding>;
}
