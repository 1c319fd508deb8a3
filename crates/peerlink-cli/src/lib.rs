//! # peerlink-cli
//!
//! Command-line interface for the peerlink endpoint.
//!
//! ## Commands
//!
//! - `peerlink replay <script.json>` — Replay membership events and record operations
//! - `peerlink config` — Show the resolved configuration
//! - `peerlink hooks` — List the transport hooks the endpoint reacts to

pub mod commands;
pub mod replay;

pub use commands::Cli;
