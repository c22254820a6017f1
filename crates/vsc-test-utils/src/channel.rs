//! A scripted, recording channel.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use vsc_tunnel::{Channel, CommandOutput, RemoteCommand, Result};

/// Exit code returned for commands no rule matches.
pub const UNSCRIPTED_EXIT: i32 = 127;

/// Channel that answers from a list of rules instead of running anything.
///
/// Each rule pairs a substring with an output. A command is answered by the
/// first rule whose substring occurs in its rendered shell line; rules are
/// not consumed, so repeated commands get the same answer. Unmatched
/// commands exit with [`UNSCRIPTED_EXIT`].
///
/// # Example
///
/// ```
/// use vsc_test_utils::ScriptedChannel;
/// use vsc_tunnel::{Channel, CommandOutput, RemoteCommand};
///
/// let channel = ScriptedChannel::new().respond("releases", CommandOutput::ok("[]"));
/// let out = channel.run(&RemoteCommand::new("curl").arg("https://x/releases")).unwrap();
/// assert_eq!(out.stdout, "[]");
/// assert_eq!(channel.commands().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct ScriptedChannel {
    rules: Vec<(String, CommandOutput)>,
    commands: Mutex<Vec<RemoteCommand>>,
    fetched: Mutex<Vec<PathBuf>>,
}

impl ScriptedChannel {
    /// Create a channel with no rules
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer commands containing `pattern` with `output`
    pub fn respond(mut self, pattern: impl Into<String>, output: CommandOutput) -> Self {
        self.rules.push((pattern.into(), output));
        self
    }

    /// Every command run so far, in order
    pub fn commands(&self) -> Vec<RemoteCommand> {
        self.commands
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Rendered shell lines of every command run so far
    pub fn command_lines(&self) -> Vec<String> {
        self.commands()
            .iter()
            .map(RemoteCommand::to_shell_line)
            .collect()
    }

    /// Remote paths passed to `fetch`, in order
    pub fn fetched(&self) -> Vec<PathBuf> {
        self.fetched
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Channel for ScriptedChannel {
    fn run(&self, command: &RemoteCommand) -> Result<CommandOutput> {
        let line = command.to_shell_line();
        self.commands
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(command.clone());

        let output = self
            .rules
            .iter()
            .find(|(pattern, _)| line.contains(pattern.as_str()))
            .map(|(_, output)| output.clone())
            .unwrap_or_else(|| {
                CommandOutput::failed(UNSCRIPTED_EXIT, format!("no scripted response for: {line}"))
            });
        Ok(output)
    }

    fn fetch(&self, remote: &Path, local_dir: &Path) -> Result<PathBuf> {
        self.fetched
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(remote.to_path_buf());
        let name = remote.file_name().map(PathBuf::from).unwrap_or_default();
        Ok(local_dir.join(name))
    }

    fn describe(&self) -> String {
        "scripted".to_string()
    }
}
