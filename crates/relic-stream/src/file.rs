//! Local-file stream backing.
//!
//! Wraps a `std::fs::File` opened read+write behind the [`Stream`]
//! contract. The file is always opened for both directions even when the
//! caller only intends one, because the adapters above need to seek around
//! and overwrite arbitrary points in the file.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::error::{Result, StreamError};
use crate::stream::{resolve_seek_clamped, Stream, Whence};

/// A stream backed by a file on disk.
///
/// Logical read and write cursors are kept by the adapter and translated to
/// OS-level seeks per operation, so the two cursors behave independently
/// even though the file handle has only one position.
#[derive(Debug)]
pub struct FileStream {
    handle: File,
    rpos: u64,
    wpos: u64,
}

impl FileStream {
    /// Open an existing file for read/write access.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::info!(path = %path.display(), "Opening file stream");
        let handle = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| StreamError::Open(format!("{}: {}", path.display(), e)))?;
        Ok(Self {
            handle,
            rpos: 0,
            wpos: 0,
        })
    }

    /// Create a new file (truncating any existing one) for read/write access.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::info!(path = %path.display(), "Creating file stream");
        let handle = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|e| StreamError::Open(format!("{}: {}", path.display(), e)))?;
        Ok(Self {
            handle,
            rpos: 0,
            wpos: 0,
        })
    }
}

impl Stream for FileStream {
    fn try_read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.handle.seek(SeekFrom::Start(self.rpos))?;
        let n = self.handle.read(buf)?;
        self.rpos += n as u64;
        Ok(n)
    }

    fn try_write(&mut self, buf: &[u8]) -> Result<usize> {
        self.handle.seek(SeekFrom::Start(self.wpos))?;
        let n = self.handle.write(buf)?;
        self.wpos += n as u64;
        Ok(n)
    }

    fn seek_read(&mut self, delta: i64, whence: Whence) -> Result<u64> {
        let len = self.size()?;
        self.rpos = resolve_seek_clamped(self.rpos, len, delta, whence);
        Ok(self.rpos)
    }

    fn seek_write(&mut self, delta: i64, whence: Whence) -> Result<u64> {
        let len = self.size()?;
        self.wpos = resolve_seek_clamped(self.wpos, len, delta, whence);
        Ok(self.wpos)
    }

    fn tell_read(&self) -> u64 {
        self.rpos
    }

    fn tell_write(&self) -> u64 {
        self.wpos
    }

    fn size(&mut self) -> Result<u64> {
        Ok(self.handle.metadata()?.len())
    }

    fn truncate(&mut self, new_size: u64) -> Result<()> {
        self.handle.flush()?;
        self.handle.set_len(new_size)?;
        self.rpos = self.rpos.min(new_size);
        self.wpos = self.wpos.min(new_size);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.handle.flush()?;
        Ok(())
    }
}
