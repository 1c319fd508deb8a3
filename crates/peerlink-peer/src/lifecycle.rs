use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use peerlink_core::{FlagSet, PeerError};

/// Membership events delivered by the group transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipEvent {
    /// A peer relation was established.
    Joined,
    /// The remote read view changed.
    Changed,
    /// A peer left; the binding persists.
    Departed,
    /// The binding was torn down entirely.
    Broken,
}

impl MembershipEvent {
    pub const ALL: [MembershipEvent; 4] = [
        MembershipEvent::Joined,
        MembershipEvent::Changed,
        MembershipEvent::Departed,
        MembershipEvent::Broken,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipEvent::Joined => "joined",
            MembershipEvent::Changed => "changed",
            MembershipEvent::Departed => "departed",
            MembershipEvent::Broken => "broken",
        }
    }

    /// Transport hook name for this event, e.g. `endpoint.cluster.joined`.
    pub fn hook_name(&self, endpoint: &str) -> String {
        format!("endpoint.{endpoint}.{}", self.as_str())
    }

    /// Inverse of [`hook_name`](Self::hook_name). Hooks for other endpoints yield `None`.
    pub fn from_hook(endpoint: &str, hook: &str) -> Option<Self> {
        let event = hook
            .strip_prefix("endpoint.")?
            .strip_prefix(endpoint)?
            .strip_prefix('.')?;
        event.parse().ok()
    }
}

impl fmt::Display for MembershipEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MembershipEvent {
    type Err = PeerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "joined" => Ok(MembershipEvent::Joined),
            "changed" => Ok(MembershipEvent::Changed),
            "departed" => Ok(MembershipEvent::Departed),
            "broken" => Ok(MembershipEvent::Broken),
            other => Err(PeerError::UnknownEvent(other.to_string())),
        }
    }
}

/// Peer-group lifecycle as seen by one endpoint.
///
/// | state       | connected | available | clustered |
/// |-------------|-----------|-----------|-----------|
/// | `Idle`      | no        | no        | no        |
/// | `Connected` | yes       | yes       | no        |
/// | `Clustered` | yes       | yes       | yes       |
/// | `Detached`  | no        | no        | yes       |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    #[default]
    Idle,
    Connected,
    Clustered,
    /// Clustered data is retained while no peer is connected: either every
    /// peer departed, or the view changed before any peer joined.
    Detached,
}

impl LifecycleState {
    /// Apply one membership event.
    ///
    /// `departed` keeps the clustered indication; only `broken` drops it.
    pub fn on(self, event: MembershipEvent) -> Self {
        use LifecycleState::*;
        use MembershipEvent::*;

        match (self, event) {
            (_, Broken) => Idle,

            (Idle, Joined) | (Connected, Joined) => Connected,
            (Clustered, Joined) | (Detached, Joined) => Clustered,

            (Idle, Changed) | (Detached, Changed) => Detached,
            (Connected, Changed) | (Clustered, Changed) => Clustered,

            (Idle, Departed) | (Connected, Departed) => Idle,
            (Clustered, Departed) | (Detached, Departed) => Detached,
        }
    }

    /// Project the state onto the three lifecycle flags.
    pub fn flags(self) -> FlagSet {
        let connected = matches!(self, LifecycleState::Connected | LifecycleState::Clustered);
        FlagSet {
            connected,
            available: connected,
            clustered: matches!(self, LifecycleState::Clustered | LifecycleState::Detached),
        }
    }

    pub fn is_connected(self) -> bool {
        self.flags().connected
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Idle => "idle",
            LifecycleState::Connected => "connected",
            LifecycleState::Clustered => "clustered",
            LifecycleState::Detached => "detached",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
