//! # peerlink-config
//!
//! Configuration system for peerlink. Reads from `peerlink.toml` and
//! environment variables, in that precedence order.

pub mod schema;
pub mod loader;

pub use schema::PeerlinkConfig;
pub use schema::{
    BindingPolicy, ConfigWarning, EndpointConfig, LoggingConfig, MalformedPayloadPolicy,
    WarningSeverity,
};
pub use loader::ConfigLoader;
