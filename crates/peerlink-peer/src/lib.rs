//! # peerlink-peer
//!
//! One participant's view of a peer group: a lifecycle state machine driven by
//! membership events (`joined`, `changed`, `departed`, `broken`) and a keyed
//! record exchange that reads and writes JSON text through a shared group
//! channel the endpoint does not own.
//!
//! The channel is abstracted behind [`GroupChannel`] / [`Binding`]; an
//! in-memory implementation ([`MemoryChannel`]) backs tests and the replay CLI.
//!
pub mod channel;
pub mod codec;
pub mod endpoint;
pub mod lifecycle;
pub mod memory;
pub mod records;

pub use channel::{Binding, GroupChannel, ReadOutcome};
pub use endpoint::PeerEndpoint;
pub use lifecycle::{LifecycleState, MembershipEvent};
pub use memory::{MemoryBinding, MemoryChannel};
