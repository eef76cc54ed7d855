//! Forwarding of termination signals to the session child.

use std::io;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A stream of signal numbers to deliver to the child.
///
/// `os()` captures SIGINT, SIGTERM and SIGQUIT for as long as the source is
/// alive. Dropping it stops the capture task.
pub struct SignalSource {
    feed: mpsc::UnboundedReceiver<i32>,
    producer: Option<JoinHandle<()>>,
}

impl SignalSource {
    #[cfg(unix)]
    pub fn os() -> io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        let mut interrupt = signal(SignalKind::interrupt())?;
        let mut terminate = signal(SignalKind::terminate())?;
        let mut quit = signal(SignalKind::quit())?;
        let (tx, feed) = mpsc::unbounded_channel();

        let producer = tokio::spawn(async move {
            loop {
                let sig = tokio::select! {
                    Some(()) = interrupt.recv() => libc::SIGINT,
                    Some(()) = terminate.recv() => libc::SIGTERM,
                    Some(()) = quit.recv() => libc::SIGQUIT,
                    else => break,
                };
                if tx.send(sig).is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            feed,
            producer: Some(producer),
        })
    }

    #[cfg(not(unix))]
    pub fn os() -> io::Result<Self> {
        // The console delivers Ctrl+C to the child directly.
        let (_tx, feed) = mpsc::unbounded_channel();
        Ok(Self {
            feed,
            producer: None,
        })
    }

    /// Signals pushed by the caller instead of the OS.
    pub fn from_channel(feed: mpsc::UnboundedReceiver<i32>) -> Self {
        Self {
            feed,
            producer: None,
        }
    }

    pub async fn recv(&mut self) -> Option<i32> {
        self.feed.recv().await
    }

    /// Stops accepting signals; later sends into the channel fail.
    pub fn close(&mut self) {
        self.feed.close();
        if let Some(producer) = self.producer.take() {
            producer.abort();
        }
    }
}

impl Drop for SignalSource {
    fn drop(&mut self) {
        if let Some(producer) = self.producer.take() {
            producer.abort();
        }
    }
}

#[cfg(unix)]
pub(crate) fn send_signal(pid: u32, sig: i32) -> io::Result<()> {
    let pid = libc::pid_t::try_from(pid)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "pid out of range"))?;
    // SAFETY: kill(2) has no memory-safety preconditions.
    let rc = unsafe { libc::kill(pid, sig) };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
pub(crate) fn send_signal(_pid: u32, _sig: i32) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "signal forwarding is only supported on unix",
    ))
}
