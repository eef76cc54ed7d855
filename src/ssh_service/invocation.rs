use crate::models::{HostRecord, DEFAULT_PORT};
use std::process::Stdio;
use tokio::process::Command;

/// A fully described child process: program, arguments and extra env.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// `ssh -t [-i identity] [-p port] user@hostname`
    pub fn native(host: &HostRecord, program: &str, term: &str) -> Self {
        // -t keeps a remote pty even though our stdout is a pipe.
        let mut invocation = Self::new(program).arg("-t");
        if !host.identity_file.is_empty() {
            invocation = invocation.arg("-i").arg(&host.identity_file);
        }
        if host.port != DEFAULT_PORT {
            invocation = invocation.arg("-p").arg(&host.port);
        }
        invocation.arg(host.destination()).env("TERM", term)
    }

    /// `zzh connect <name> [--panel-id id]`
    pub fn delegated(host: &HostRecord, program: &str, panel_id: Option<&str>, term: &str) -> Self {
        let mut invocation = Self::new(program).arg("connect").arg(&host.name);
        if let Some(id) = panel_id {
            invocation = invocation.arg("--panel-id").arg(id);
        }
        invocation.env("TERM", term)
    }

    /// Inherits stdin and the parent environment; output streams are piped
    /// so they can be copied into the session log.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }

    /// Shell-like rendering for logs.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
