use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading the SSH client configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read SSH config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse SSH config {path} line {line}: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Could not determine home directory")]
    NoHome,
}

/// Errors raised while running a session.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("Failed to create log file {path}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error during session: {0}")]
    Io(#[from] std::io::Error),

    #[error("{program} exited with code {code}")]
    Exited { program: String, code: i32 },

    #[error("{program} was terminated by signal {signal}")]
    Signaled { program: String, signal: i32 },
}

impl LaunchError {
    /// Exit code reported by the child, if it exited on its own.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            LaunchError::Exited { code, .. } => Some(*code),
            _ => None,
        }
    }
}
