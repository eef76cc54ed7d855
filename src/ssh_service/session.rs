use super::invocation::Invocation;
use super::signals::{send_signal, SignalSource};
use super::tee::{pump, SharedWriter, TeeWriter};
use crate::error::LaunchError;
use chrono::{Local, SecondsFormat};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitStatus;

/// Terminal-side destination for one child stream.
pub type Output = Box<dyn Write + Send>;

pub fn start_marker(label: &str) -> String {
    format!(
        "=== SSH Session to {} started at {} ===\n\n",
        label,
        Local::now().to_rfc3339_opts(SecondsFormat::Secs, false)
    )
}

pub fn end_marker() -> String {
    format!(
        "=== SSH Session ended at {} ===\n",
        Local::now().to_rfc3339_opts(SecondsFormat::Secs, false)
    )
}

/// One child process run with its output tee'd into a session log.
pub struct Session {
    invocation: Invocation,
    log_path: PathBuf,
    label: String,
    stdout: Output,
    stderr: Output,
}

impl Session {
    /// `label` names the session in the start marker.
    pub fn new(invocation: Invocation, log_path: PathBuf, label: impl Into<String>) -> Self {
        Self {
            invocation,
            log_path,
            label: label.into(),
            stdout: Box::new(io::stdout()),
            stderr: Box::new(io::stderr()),
        }
    }

    /// Replaces the terminal streams the child output is copied to.
    pub fn with_output(mut self, stdout: Output, stderr: Output) -> Self {
        self.stdout = stdout;
        self.stderr = stderr;
        self
    }

    pub async fn run(self, mut signals: SignalSource) -> Result<(), LaunchError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|source| LaunchError::LogFile {
                path: self.log_path.clone(),
                source,
            })?;
        let log = SharedWriter::new(file);
        write_log(&log, &start_marker(&self.label))?;

        tracing::info!(
            "Starting session: {} (log: {:?})",
            self.invocation.display(),
            self.log_path
        );
        let mut child = self
            .invocation
            .command()
            .spawn()
            .map_err(|source| LaunchError::Spawn {
                program: self.invocation.program.clone(),
                source,
            })?;

        let stdout_pump = child.stdout.take().map(|out| {
            let writer = TeeWriter::new(self.stdout, log.clone());
            tokio::spawn(pump(out, writer))
        });
        let stderr_pump = child.stderr.take().map(|err| {
            let writer = TeeWriter::new(self.stderr, log.clone());
            tokio::spawn(pump(err, writer))
        });

        // Signals are only sent while the child is unreaped, so the pid
        // cannot have been reused.
        let mut forwarded = 0;
        let status = loop {
            tokio::select! {
                biased;
                status = child.wait() => break status,
                Some(sig) = signals.recv() => {
                    let Some(pid) = child.id() else { continue };
                    match send_signal(pid, sig) {
                        Ok(()) => {
                            tracing::info!("Forwarded signal {} to pid {}", sig, pid);
                            forwarded += 1;
                        }
                        Err(e) => {
                            tracing::warn!("Failed to forward signal {} to pid {}: {}", sig, pid, e)
                        }
                    }
                }
            }
        };
        signals.close();
        if forwarded > 0 {
            tracing::info!("Forwarded {} signal(s) during session", forwarded);
        }

        let mut copy_error = None;
        for pump in [stdout_pump, stderr_pump].into_iter().flatten() {
            match pump.await {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => copy_error = copy_error.or(Some(e)),
                Err(e) => {
                    copy_error =
                        copy_error.or(Some(io::Error::new(io::ErrorKind::Other, e.to_string())))
                }
            }
        }

        // The end marker is written even when waiting on the child failed.
        write_log(&log, &end_marker())?;
        drop(log);

        let status = status?;
        tracing::info!("Session ended: {}", status);
        check_status(&self.invocation.program, status)?;

        match copy_error {
            Some(e) => Err(LaunchError::Io(e)),
            None => Ok(()),
        }
    }
}

fn write_log(log: &SharedWriter<File>, text: &str) -> Result<(), LaunchError> {
    log.with(|file| {
        file.write_all(text.as_bytes())?;
        file.flush()
    })??;
    Ok(())
}

fn check_status(program: &str, status: ExitStatus) -> Result<(), LaunchError> {
    if status.success() {
        return Ok(());
    }
    if let Some(code) = status.code() {
        return Err(LaunchError::Exited {
            program: program.to_string(),
            code,
        });
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return Err(LaunchError::Signaled {
                program: program.to_string(),
                signal,
            });
        }
    }

    Err(LaunchError::Exited {
        program: program.to_string(),
        code: -1,
    })
}
