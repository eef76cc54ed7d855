use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncRead, AsyncReadExt};

/// Forwards every write to both destinations; fails if either fails.
#[derive(Debug)]
pub struct TeeWriter<A, B> {
    primary: A,
    secondary: B,
}

impl<A: Write, B: Write> TeeWriter<A, B> {
    pub fn new(primary: A, secondary: B) -> Self {
        Self { primary, secondary }
    }
}

impl<A: Write, B: Write> Write for TeeWriter<A, B> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.primary.write_all(buf)?;
        self.secondary.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.primary.flush()?;
        self.secondary.flush()
    }
}

/// A writer shared between the stdout and stderr pumps.
#[derive(Debug)]
pub struct SharedWriter<W>(Arc<Mutex<W>>);

impl<W> SharedWriter<W> {
    pub fn new(inner: W) -> Self {
        Self(Arc::new(Mutex::new(inner)))
    }

    pub fn with<T>(&self, f: impl FnOnce(&mut W) -> T) -> io::Result<T> {
        let mut guard = self
            .0
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer poisoned"))?;
        Ok(f(&mut guard))
    }
}

impl<W> Clone for SharedWriter<W> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<W: Write> Write for SharedWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.with(|w| w.write(buf))?
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        // One lock per chunk so the two pumps never interleave inside it.
        self.with(|w| w.write_all(buf))?
    }

    fn flush(&mut self) -> io::Result<()> {
        self.with(|w| w.flush())?
    }
}

/// Copies `reader` into `writer` until EOF, flushing after each chunk.
///
/// After a write failure the rest of the stream is still drained so the
/// child never blocks on a full pipe; the first failure is returned.
pub async fn pump<R, W>(mut reader: R, mut writer: W) -> io::Result<u64>
where
    R: AsyncRead + Unpin,
    W: Write,
{
    let mut buf = [0u8; 8192];
    let mut copied = 0u64;
    let mut failure = None;

    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        if failure.is_none() {
            match writer.write_all(&buf[..n]).and_then(|_| writer.flush()) {
                Ok(()) => copied += n as u64,
                Err(e) => {
                    tracing::warn!("Session output copy failed: {}", e);
                    failure = Some(e);
                }
            }
        }
    }

    match failure {
        Some(e) => Err(e),
        None => Ok(copied),
    }
}
