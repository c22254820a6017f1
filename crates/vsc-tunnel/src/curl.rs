//! `curl` command construction
//!
//! All HTTP traffic goes through `curl` on whichever host the channel
//! targets, so the same request works locally and over SSH.

use std::path::{Path, PathBuf};

use crate::types::RemoteCommand;

/// Builder for a `curl` invocation.
///
/// ```
/// use vsc_tunnel::CurlRequest;
///
/// let cmd = CurlRequest::get("https://api.github.com/repos/a/b/releases")
///     .header("Accept", "application/vnd.github+json")
///     .into_command();
/// assert_eq!(cmd.program, "curl");
/// assert_eq!(cmd.args.last().unwrap(), "https://api.github.com/repos/a/b/releases");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurlRequest {
    method: Method,
    url: String,
    headers: Vec<(String, String)>,
    body: Option<String>,
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Method {
    Get,
    Post,
}

impl CurlRequest {
    /// A GET request for `url`
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
            output: None,
        }
    }

    /// A POST request for `url` with the given body
    pub fn post(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            body: Some(body.into()),
            ..Self::get(url)
        }
    }

    /// Add a request header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Write the response body to `path` instead of stdout
    pub fn output(mut self, path: impl AsRef<Path>) -> Self {
        self.output = Some(path.as_ref().to_path_buf());
        self
    }

    /// Build the command descriptor.
    ///
    /// `--fail` is always passed so a 4xx/5xx response yields a non-zero
    /// exit instead of an error page on stdout.
    pub fn into_command(self) -> RemoteCommand {
        let mut cmd = RemoteCommand::new("curl")
            .args(["--silent", "--show-error", "--location", "--fail"]);
        if self.method == Method::Post {
            cmd = cmd.arg("--request").arg("POST");
        }
        for (name, value) in &self.headers {
            cmd = cmd.arg("--header").arg(format!("{name}: {value}"));
        }
        if let Some(body) = self.body {
            cmd = cmd.arg("--data").arg(body);
        }
        if let Some(output) = self.output {
            cmd = cmd.arg("--output").arg(output.to_string_lossy());
        }
        cmd.arg(self.url)
    }
}

impl From<CurlRequest> for RemoteCommand {
    fn from(request: CurlRequest) -> Self {
        request.into_command()
    }
}
