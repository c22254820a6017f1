//! Command execution channels for vsc
//!
//! Every network operation vsc performs is expressed as a command (usually a
//! `curl` invocation) and handed to a [`Channel`]. The channel decides where
//! the command runs:
//!
//! - [`LocalChannel`] spawns it on this machine
//! - [`SshChannel`] runs it on a remote host through the system `ssh` client,
//!   optionally hopping through a gateway
//!
//! Callers only look at the exit status and the captured output streams.

pub mod channel;
pub mod curl;
pub mod error;
pub mod local;
pub mod ssh;
pub mod types;

pub use channel::Channel;
pub use curl::CurlRequest;
pub use error::{Result, TunnelError};
pub use local::{LocalChannel, check_binary_on_path};
pub use ssh::{SshChannel, SshTarget};
pub use types::{CommandOutput, RemoteCommand};
