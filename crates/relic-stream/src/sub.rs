//! Bounded window onto another stream.
//!
//! A [`SubStream`] exposes `[0, len)` of itself as `[offset, offset+len)`
//! of its parent. It never grows the parent: reads and writes clip to the
//! window, and resizing the window ([`SubStream::set_size`]) is pure
//! bookkeeping — the caller must have already made room in the parent,
//! typically by going through a segmented stream's insert/remove and a
//! truncate callback.

use crate::error::Result;
use crate::stream::{resolve_seek_checked, SharedStream, Stream, Whence};

/// A fixed-offset, bounded, length-mutable window onto a parent stream.
///
/// Several sub-streams may share one parent serially; the parent cursor is
/// repositioned on every call, so sub-streams do not disturb each other.
pub struct SubStream {
    parent: SharedStream,
    offset: u64,
    len: u64,
    rpos: u64,
    wpos: u64,
}

impl SubStream {
    /// Create a window of `len` bytes starting at `offset` in `parent`.
    pub fn new(parent: SharedStream, offset: u64, len: u64) -> Self {
        Self {
            parent,
            offset,
            len,
            rpos: 0,
            wpos: 0,
        }
    }

    /// Offset of the window within the parent.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Update the window length. Bookkeeping only: the parent must already
    /// hold `offset + new_len` bytes (except transiently, mid-commit, while
    /// the parent is being grown). Cursors clamp to the new length.
    pub fn set_size(&mut self, new_len: u64) {
        self.len = new_len;
        self.rpos = self.rpos.min(new_len);
        self.wpos = self.wpos.min(new_len);
    }

    /// Shift the window within the parent by `delta` bytes.
    pub fn relocate(&mut self, delta: i64) {
        self.offset = (self.offset as i64 + delta) as u64;
    }
}

impl Stream for SubStream {
    fn try_read(&mut self, buf: &mut [u8]) -> Result<usize> {
        if self.rpos >= self.len {
            return Ok(0);
        }
        let n = buf.len().min((self.len - self.rpos) as usize);
        let mut parent = self.parent.borrow_mut();
        parent.seek_read((self.offset + self.rpos) as i64, Whence::Start)?;
        let got = parent.try_read(&mut buf[..n])?;
        self.rpos += got as u64;
        Ok(got)
    }

    fn try_write(&mut self, buf: &[u8]) -> Result<usize> {
        if self.wpos >= self.len {
            return Ok(0);
        }
        let n = buf.len().min((self.len - self.wpos) as usize);
        let mut parent = self.parent.borrow_mut();
        parent.seek_write((self.offset + self.wpos) as i64, Whence::Start)?;
        let put = parent.try_write(&buf[..n])?;
        self.wpos += put as u64;
        Ok(put)
    }

    fn seek_read(&mut self, delta: i64, whence: Whence) -> Result<u64> {
        self.rpos = resolve_seek_checked(self.rpos, self.len, delta, whence)?;
        Ok(self.rpos)
    }

    fn seek_write(&mut self, delta: i64, whence: Whence) -> Result<u64> {
        self.wpos = resolve_seek_checked(self.wpos, self.len, delta, whence)?;
        Ok(self.wpos)
    }

    fn tell_read(&self) -> u64 {
        self.rpos
    }

    fn tell_write(&self) -> u64 {
        self.wpos
    }

    fn size(&mut self) -> Result<u64> {
        Ok(self.len)
    }

    fn truncate(&mut self, new_size: u64) -> Result<()> {
        // A bare sub-stream cannot reshape its parent; window adjustments go
        // through set_size() once the owner has made room.
        self.set_size(new_size);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.parent.borrow_mut().flush()
    }
}
