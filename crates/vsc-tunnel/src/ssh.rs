//! Remote command execution over SSH
//!
//! Commands are wrapped in an invocation of the system `ssh` client and run
//! on the target host; files are copied back with `scp`. Key-based
//! authentication (agent, `~/.ssh/config`) is assumed: `BatchMode` is on so a
//! password prompt fails fast instead of hanging.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::channel::Channel;
use crate::error::{Result, TunnelError};
use crate::local::LocalChannel;
use crate::types::{CommandOutput, RemoteCommand};

/// An SSH destination in `[user@]host[:port]` form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshTarget {
    pub user: Option<String>,
    pub hostname: String,
    pub port: Option<u16>,
}

impl SshTarget {
    /// `user@host` or `host`, without the port
    pub fn destination(&self) -> String {
        match &self.user {
            Some(user) => format!("{user}@{}", self.hostname),
            None => self.hostname.clone(),
        }
    }
}

impl FromStr for SshTarget {
    type Err = TunnelError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: &str| TunnelError::InvalidTarget {
            target: s.to_string(),
            reason: reason.to_string(),
        };

        let (user, rest) = match s.split_once('@') {
            Some((user, rest)) if !user.is_empty() => (Some(user.to_string()), rest),
            Some(_) => return Err(invalid("empty user name")),
            None => (None, s),
        };

        let (hostname, port) = match rest.rsplit_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse::<u16>()
                    .map_err(|_| invalid("port must be a number between 0 and 65535"))?;
                (host, Some(port))
            }
            None => (rest, None),
        };

        if hostname.is_empty() {
            return Err(invalid("empty host name"));
        }
        if let Some(user) = &user {
            if let Some(reason) = unsafe_part(user) {
                return Err(invalid(&format!("user name {reason}")));
            }
        }
        if let Some(reason) = unsafe_part(hostname) {
            return Err(invalid(&format!("host name {reason}")));
        }

        Ok(Self {
            user,
            hostname: hostname.to_string(),
            port,
        })
    }
}

/// Why `part` cannot be passed to `ssh` as a destination, if it cannot.
///
/// A leading `-` would be read as an option.
fn unsafe_part(part: &str) -> Option<&'static str> {
    if part.starts_with('-') {
        Some("must not start with '-'")
    } else if part.chars().any(|c| c.is_whitespace() || c.is_control()) {
        Some("must not contain whitespace or control characters")
    } else {
        None
    }
}

impl fmt::Display for SshTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.destination())?;
        if let Some(port) = self.port {
            write!(f, ":{port}")?;
        }
        Ok(())
    }
}

/// Channel that executes on a remote host through `ssh`
#[derive(Debug, Clone)]
pub struct SshChannel {
    target: SshTarget,
    gateway: Option<SshTarget>,
    spawner: LocalChannel,
}

impl SshChannel {
    /// Connect directly to `target`
    pub fn new(target: SshTarget) -> Self {
        Self {
            target,
            gateway: None,
            spawner: LocalChannel::new(),
        }
    }

    /// Hop through `gateway` (ssh `-J`) before reaching the target
    pub fn with_gateway(mut self, gateway: SshTarget) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Wrap `command` in an `ssh` invocation that runs it on the target.
    pub fn ssh_command(&self, command: &RemoteCommand) -> RemoteCommand {
        let mut ssh = RemoteCommand::new("ssh").args(["-o", "BatchMode=yes"]);
        if let Some(gateway) = &self.gateway {
            ssh = ssh.arg("-J").arg(gateway.to_string());
        }
        if let Some(port) = self.target.port {
            ssh = ssh.arg("-p").arg(port.to_string());
        }
        ssh.arg(self.target.destination())
            .arg("--")
            .arg(command.to_shell_line())
    }

    /// Build the `scp` invocation copying `remote` to `local`.
    pub fn scp_command(&self, remote: &Path, local: &Path) -> RemoteCommand {
        let mut scp = RemoteCommand::new("scp").args(["-o", "BatchMode=yes"]);
        if let Some(gateway) = &self.gateway {
            scp = scp.arg("-J").arg(gateway.to_string());
        }
        if let Some(port) = self.target.port {
            scp = scp.arg("-P").arg(port.to_string());
        }
        scp.arg(format!(
            "{}:{}",
            self.target.destination(),
            remote.to_string_lossy()
        ))
        .arg(local.to_string_lossy())
    }
}

impl Channel for SshChannel {
    fn run(&self, command: &RemoteCommand) -> Result<CommandOutput> {
        tracing::debug!(host = %self.target, command = %command, "Running remote command");
        self.spawner.run(&self.ssh_command(command))
    }

    fn fetch(&self, remote: &Path, local_dir: &Path) -> Result<PathBuf> {
        let file_name = remote.file_name().ok_or_else(|| TunnelError::FetchFailed {
            path: remote.to_path_buf(),
            reason: "path has no file name".to_string(),
        })?;
        std::fs::create_dir_all(local_dir)?;
        let dest = local_dir.join(file_name);

        let output = self.spawner.run(&self.scp_command(remote, &dest))?;
        if !output.success() {
            return Err(TunnelError::FetchFailed {
                path: remote.to_path_buf(),
                reason: output.stderr.trim().to_string(),
            });
        }
        Ok(dest)
    }

    fn describe(&self) -> String {
        match &self.gateway {
            Some(gateway) => format!("ssh {} via {}", self.target, gateway),
            None => format!("ssh {}", self.target),
        }
    }
}
