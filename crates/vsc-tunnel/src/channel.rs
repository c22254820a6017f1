//! The channel abstraction shared by local and remote execution

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::types::{CommandOutput, RemoteCommand};

/// Executes commands somewhere and reports what happened.
///
/// Implementations must not treat a non-zero exit as an error: the caller
/// decides what a failed command means. `Err` is reserved for failures to
/// run the command at all.
pub trait Channel {
    /// Run a command to completion, capturing stdout and stderr.
    fn run(&self, command: &RemoteCommand) -> Result<CommandOutput>;

    /// Copy a file produced on the channel's host into `local_dir`,
    /// returning the local path of the copy.
    fn fetch(&self, remote: &Path, local_dir: &Path) -> Result<PathBuf>;

    /// Short human-readable description, e.g. `local` or `ssh dev@build`.
    fn describe(&self) -> String;

    /// Create `dir` (and parents) on the channel's host.
    fn ensure_dir(&self, dir: &Path) -> Result<CommandOutput> {
        let command = RemoteCommand::new("mkdir")
            .arg("-p")
            .arg(dir.to_string_lossy());
        self.run(&command)
    }
}

impl<C: Channel + ?Sized> Channel for &C {
    fn run(&self, command: &RemoteCommand) -> Result<CommandOutput> {
        (**self).run(command)
    }

    fn fetch(&self, remote: &Path, local_dir: &Path) -> Result<PathBuf> {
        (**self).fetch(remote, local_dir)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

impl<C: Channel + ?Sized> Channel for Box<C> {
    fn run(&self, command: &RemoteCommand) -> Result<CommandOutput> {
        (**self).run(command)
    }

    fn fetch(&self, remote: &Path, local_dir: &Path) -> Result<PathBuf> {
        (**self).fetch(remote, local_dir)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
