//! In-memory stream backing.
//!
//! A growable byte vector behind the [`Stream`] contract. Writing past the
//! current end zero-fills the gap and extends the vector, which is what the
//! segmented stream relies on when it flattens edits that enlarge the file.

use crate::error::Result;
use crate::stream::{resolve_seek_clamped, Stream, Whence};

/// A stream backed by a `Vec<u8>`.
///
/// # Example
///
/// ```
/// use relic_stream::{MemStream, Stream, Whence};
///
/// let mut s = MemStream::new();
/// s.write_all(b"ABCDEF").unwrap();
/// s.seek_read(2, Whence::Start).unwrap();
/// let mut buf = [0u8; 2];
/// s.read_exact(&mut buf).unwrap();
/// assert_eq!(&buf, b"CD");
/// ```
#[derive(Debug, Default)]
pub struct MemStream {
    data: Vec<u8>,
    rpos: u64,
    wpos: u64,
}

impl MemStream {
    /// Create an empty memory stream.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a memory stream over existing bytes. Cursors start at 0.
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self {
            data,
            rpos: 0,
            wpos: 0,
        }
    }

    /// Borrow the current contents.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Consume the stream, returning the underlying bytes.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

impl Stream for MemStream {
    fn try_read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let len = self.data.len() as u64;
        if self.rpos >= len {
            return Ok(0);
        }
        let avail = (len - self.rpos) as usize;
        let n = buf.len().min(avail);
        let start = self.rpos as usize;
        buf[..n].copy_from_slice(&self.data[start..start + n]);
        self.rpos += n as u64;
        Ok(n)
    }

    fn try_write(&mut self, buf: &[u8]) -> Result<usize> {
        let end = self.wpos as usize + buf.len();
        if end > self.data.len() {
            // Zero-fill any gap between the old end and the write position.
            self.data.resize(end, 0);
        }
        let start = self.wpos as usize;
        self.data[start..end].copy_from_slice(buf);
        self.wpos = end as u64;
        Ok(buf.len())
    }

    fn seek_read(&mut self, delta: i64, whence: Whence) -> Result<u64> {
        self.rpos = resolve_seek_clamped(self.rpos, self.data.len() as u64, delta, whence);
        Ok(self.rpos)
    }

    fn seek_write(&mut self, delta: i64, whence: Whence) -> Result<u64> {
        self.wpos = resolve_seek_clamped(self.wpos, self.data.len() as u64, delta, whence);
        Ok(self.wpos)
    }

    fn tell_read(&self) -> u64 {
        self.rpos
    }

    fn tell_write(&self) -> u64 {
        self.wpos
    }

    fn size(&mut self) -> Result<u64> {
        Ok(self.data.len() as u64)
    }

    fn truncate(&mut self, new_size: u64) -> Result<()> {
        self.data.resize(new_size as usize, 0);
        self.rpos = self.rpos.min(new_size);
        self.wpos = self.wpos.min(new_size);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}
