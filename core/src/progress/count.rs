use std::io::{self, Read, Write};

use super::ProgressListener;

/// `Read` adapter that reports cumulative bytes read to a listener.
///
/// `total` is the caller's size estimate for the underlying stream; reading
/// past it is allowed and simply reported as-is (the stage-weighted listener
/// clamps overflow to the stage's full share).
pub struct CountingReader<R, L> {
    inner: R,
    listener: L,
    total: i64,
    read: i64,
}

impl<R: Read, L: ProgressListener> CountingReader<R, L> {
    pub fn new(inner: R, listener: L, total: i64) -> Self {
        Self {
            inner,
            listener,
            total,
            read: 0,
        }
    }

    pub fn into_inner(self) -> (R, L) {
        (self.inner, self.listener)
    }
}

impl<R: Read, L: ProgressListener> Read for CountingReader<R, L> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.read += n as i64;
        self.listener
            .in_progress(self.total, self.read)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        Ok(n)
    }
}

/// `Write` adapter that reports cumulative bytes written to a listener.
pub struct CountingWriter<W, L> {
    inner: W,
    listener: L,
    total: i64,
    written: i64,
}

impl<W: Write, L: ProgressListener> CountingWriter<W, L> {
    pub fn new(inner: W, listener: L, total: i64) -> Self {
        Self {
            inner,
            listener,
            total,
            written: 0,
        }
    }

    pub fn into_inner(self) -> (W, L) {
        (self.inner, self.listener)
    }
}

impl<W: Write, L: ProgressListener> Write for CountingWriter<W, L> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.written += n as i64;
        self.listener
            .in_progress(self.total, self.written)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
