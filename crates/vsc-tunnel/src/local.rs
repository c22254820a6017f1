//! Local command execution
//!
//! Runs commands as child processes of vsc itself. No shell is involved:
//! the program is spawned directly with its argument vector.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::channel::Channel;
use crate::error::{Result, TunnelError};
use crate::types::{CommandOutput, RemoteCommand};

/// Channel that executes on the local machine
#[derive(Debug, Clone, Default)]
pub struct LocalChannel;

impl LocalChannel {
    /// Create a channel that runs in the current working directory
    pub fn new() -> Self {
        Self
    }
}

impl Channel for LocalChannel {
    fn run(&self, command: &RemoteCommand) -> Result<CommandOutput> {
        tracing::debug!(command = %command, "Running local command");

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args);

        let output = cmd.output().map_err(|source| TunnelError::Spawn {
            program: command.program.clone(),
            source,
        })?;

        Ok(CommandOutput::from_process(output))
    }

    fn fetch(&self, remote: &Path, local_dir: &Path) -> Result<PathBuf> {
        let file_name = remote.file_name().ok_or_else(|| TunnelError::FetchFailed {
            path: remote.to_path_buf(),
            reason: "path has no file name".to_string(),
        })?;
        let dest = local_dir.join(file_name);

        // Already in place when both directories are the same
        if dest == remote {
            return Ok(dest);
        }

        std::fs::create_dir_all(local_dir)?;
        std::fs::copy(remote, &dest).map_err(|e| TunnelError::FetchFailed {
            path: remote.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(dest)
    }

    fn describe(&self) -> String {
        "local".to_string()
    }
}

/// Locate `tool` on `PATH`, trying `PATHEXT` suffixes on Windows.
///
/// Fails with [`TunnelError::BinaryNotFound`] when no candidate is a file.
pub fn check_binary_on_path(tool: &str) -> Result<PathBuf> {
    let suffixes: Vec<String> = if cfg!(windows) {
        std::env::var("PATHEXT")
            .unwrap_or_else(|_| ".COM;.EXE;.BAT;.CMD".to_string())
            .split(';')
            .map(str::to_ascii_lowercase)
            .collect()
    } else {
        vec![String::new()]
    };

    let path_var = std::env::var_os("PATH").unwrap_or_default();
    std::env::split_paths(&path_var)
        .flat_map(|dir| {
            suffixes
                .iter()
                .map(move |suffix| dir.join(format!("{tool}{suffix}")))
        })
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| TunnelError::BinaryNotFound {
            tool: tool.to_string(),
        })
}
