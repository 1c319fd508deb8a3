use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of one peer-group binding, e.g. `"cluster:19"`.
///
/// Assigned by the transport when the binding is created and never changed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BindingId(String);

impl BindingId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BindingId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for BindingId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Lifecycle flags an endpoint exposes to the surrounding application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flag {
    Connected,
    Available,
    Clustered,
}

impl Flag {
    pub const ALL: [Flag; 3] = [Flag::Connected, Flag::Available, Flag::Clustered];

    pub fn as_str(&self) -> &'static str {
        match self {
            Flag::Connected => "connected",
            Flag::Available => "available",
            Flag::Clustered => "clustered",
        }
    }

    /// Flag name namespaced by endpoint, e.g. `cluster.connected`.
    pub fn qualified(&self, endpoint: &str) -> String {
        format!("{endpoint}.{}", self.as_str())
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of the three lifecycle flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagSet {
    pub connected: bool,
    pub available: bool,
    pub clustered: bool,
}

impl FlagSet {
    pub fn is_set(&self, flag: Flag) -> bool {
        match flag {
            Flag::Connected => self.connected,
            Flag::Available => self.available,
            Flag::Clustered => self.clustered,
        }
    }

    /// Flags that are set, in declaration order.
    pub fn raised(&self) -> Vec<Flag> {
        Flag::ALL.into_iter().filter(|f| self.is_set(*f)).collect()
    }
}
