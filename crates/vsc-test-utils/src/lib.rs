//! Shared test doubles for the vsc workspace.
//!
//! - [`ScriptedChannel`]: a [`Channel`](vsc_tunnel::Channel) that replays
//!   canned outputs and records every command it was asked to run
//! - [`LogCapture`]: collects formatted `tracing` output so tests can assert
//!   on log lines

pub mod channel;
pub mod logs;

pub use channel::ScriptedChannel;
pub use logs::LogCapture;
