//! Segmented stream — an insert/remove edit overlay on a backing stream.
//!
//! A [`SegmentedStream`] lets callers insert and delete byte ranges at any
//! offset of a backing stream with O(1) logical cost. Nothing moves in the
//! backing until [`SegmentedStream::commit`] flattens all pending edits in
//! a single pass.
//!
//! Internally the stream is a recursive rope of three sources:
//!
//! 1. *first* — a contiguous range of the backing that has not been
//!    restructured (overwrites of this range go straight through);
//! 2. *second* — an inline buffer of inserted bytes staged for commit;
//! 3. *third* — an optional nested node holding the logical suffix.
//!
//! While a segmented stream is alive its backing must not be used by
//! anything else; doing so corrupts the pending edits.
//!
//! # Example
//!
//! ```
//! use relic_stream::{shared, MemStream, SegmentedStream, Stream, Whence};
//!
//! let backing = shared(MemStream::from_vec(b"ABCDEF".to_vec()));
//! let mut seg = SegmentedStream::new(backing.clone()).unwrap();
//! seg.seek_write(3, Whence::Start).unwrap();
//! seg.insert(2);
//! seg.write_all(b"xy").unwrap();
//! seg.commit(|n| backing.borrow_mut().truncate(n)).unwrap();
//! ```

use crate::error::{Result, StreamError};
use crate::stream::{resolve_seek_clamped, SharedStream, Stream, Whence};
use crate::util::move_range;

/// One node of the three-source rope.
#[derive(Debug, Default)]
struct Node {
    /// Start of this node's backing range.
    first_start: u64,
    /// End (exclusive) of this node's backing range.
    first_end: u64,
    /// Inserted or staged bytes following the backing range.
    second: Vec<u8>,
    /// Logical suffix. The innermost node has no tail.
    third: Option<Box<Node>>,
    /// Cursor within this node's logical span.
    pos: u64,
}

impl Node {
    fn first_len(&self) -> u64 {
        self.first_end - self.first_start
    }

    /// Total logical length: sum of the three sources.
    fn len(&self) -> u64 {
        self.first_len()
            + self.second.len() as u64
            + self.third.as_ref().map_or(0, |t| t.len())
    }

    /// Position the cursor at `pos` (already clamped by the caller) and keep
    /// every tail node's cursor consistent so a straight read-through lands
    /// correctly.
    fn seek_to(&mut self, pos: u64) {
        self.pos = pos;
        let second_end = self.first_len() + self.second.len() as u64;
        if let Some(third) = &mut self.third {
            third.seek_to(pos.saturating_sub(second_end));
        }
    }

    fn read(&mut self, backing: &mut dyn Stream, buf: &mut [u8]) -> Result<usize> {
        let first_len = self.first_len();
        let mut done = 0usize;

        if self.pos < first_len {
            let n = buf.len().min((first_len - self.pos) as usize);
            backing.seek_read((self.first_start + self.pos) as i64, Whence::Start)?;
            let got = backing.try_read(&mut buf[..n])?;
            self.pos += got as u64;
            done += got;
            if got < n {
                // Backing came up short; report what we have.
                return Ok(done);
            }
        }

        let second_end = first_len + self.second.len() as u64;
        if done < buf.len() && self.pos < second_end {
            let off = (self.pos - first_len) as usize;
            let n = (buf.len() - done).min(self.second.len() - off);
            buf[done..done + n].copy_from_slice(&self.second[off..off + n]);
            self.pos += n as u64;
            done += n;
        }

        if done < buf.len() {
            if let Some(third) = &mut self.third {
                let got = third.read(backing, &mut buf[done..])?;
                self.pos += got as u64;
                done += got;
            }
        }

        Ok(done)
    }

    fn write(&mut self, backing: &mut dyn Stream, buf: &[u8]) -> Result<usize> {
        let first_len = self.first_len();
        let mut done = 0usize;

        if self.pos < first_len {
            // Overwrites of the untouched backing range go straight through.
            let n = buf.len().min((first_len - self.pos) as usize);
            backing.seek_write((self.first_start + self.pos) as i64, Whence::Start)?;
            let put = backing.try_write(&buf[..n])?;
            self.pos += put as u64;
            done += put;
            if put < n {
                return Ok(done);
            }
        }

        let second_end = first_len + self.second.len() as u64;
        if done < buf.len() && self.pos < second_end {
            let off = (self.pos - first_len) as usize;
            let n = (buf.len() - done).min(self.second.len() - off);
            self.second[off..off + n].copy_from_slice(&buf[done..done + n]);
            self.pos += n as u64;
            done += n;
        }

        if done < buf.len() {
            match &mut self.third {
                Some(third) => {
                    let put = third.write(backing, &buf[done..])?;
                    self.pos += put as u64;
                    done += put;
                }
                None => {
                    // Cursor sits at the logical end: writing extends the
                    // stream by appending to the inline buffer.
                    self.second.extend_from_slice(&buf[done..]);
                    self.pos += (buf.len() - done) as u64;
                    done = buf.len();
                }
            }
        }

        Ok(done)
    }

    /// Split this node at the cursor. Afterwards *first* ends at the cursor,
    /// *second* is empty, and a new tail node carries everything that
    /// followed the cursor.
    fn split(&mut self) {
        debug_assert!(self.pos < self.first_len());
        let tail = Node {
            first_start: self.first_start + self.pos,
            first_end: self.first_end,
            second: std::mem::take(&mut self.second),
            third: self.third.take(),
            pos: 0,
        };
        self.first_end = tail.first_start;
        self.third = Some(Box::new(tail));
    }

    fn insert(&mut self, len: u64) {
        let first_len = self.first_len();
        if self.pos < first_len {
            self.split();
            self.second = vec![0; len as usize];
        } else {
            let second_end = first_len + self.second.len() as u64;
            if self.pos <= second_end {
                let at = (self.pos - first_len) as usize;
                self.second
                    .splice(at..at, std::iter::repeat(0u8).take(len as usize));
            } else {
                self.third
                    .as_mut()
                    .expect("cursor past inline data requires a tail node")
                    .insert(len);
            }
        }
    }

    fn remove(&mut self, len: u64) {
        if len == 0 {
            return;
        }
        let mut remove = len;
        let mut first_len = self.first_len();

        if self.pos < first_len {
            if self.pos + remove >= first_len {
                // The range runs past the end of the backing span; trim its
                // tail and fall through for the remainder.
                remove -= first_len - self.pos;
                self.first_end = self.first_start + self.pos;
                first_len = self.pos;
            } else if self.pos == 0 {
                // Entirely inside the backing span, at its start.
                self.first_start += remove;
                return;
            } else {
                // Entirely inside the backing span: split and trim the head
                // off the new tail node.
                self.split();
                let tail = self.third.as_mut().expect("split creates a tail node");
                tail.first_start += remove;
                debug_assert!(tail.first_start < tail.first_end);
                return;
            }
        }

        if remove == 0 {
            return;
        }

        let second_len = self.second.len() as u64;
        let second_end = first_len + second_len;
        if self.pos < second_end {
            if self.pos == first_len {
                if remove >= second_len {
                    self.second.clear();
                    remove -= second_len;
                } else {
                    self.second.drain(..remove as usize);
                    remove = 0;
                }
            } else {
                let crop = (self.pos - first_len) as usize;
                if crop as u64 + remove >= second_len {
                    remove -= second_len - crop as u64;
                    self.second.truncate(crop);
                } else {
                    self.second.drain(crop..crop + remove as usize);
                    remove = 0;
                }
            }
        }

        if remove == 0 {
            return;
        }

        self.third
            .as_mut()
            .expect("removal extends past inline data")
            .remove(remove);
    }

    /// Flatten this node into the backing so its data starts at `dest`.
    ///
    /// Sources move towards the earlier of their origin and destination, and
    /// a source is never written over before it has been read: when data
    /// shifts forwards the tail node is flattened first to clear the way.
    fn commit(&mut self, backing: &mut dyn Stream, dest: u64) -> Result<()> {
        debug_assert!(self.first_start <= self.first_end);
        let first_len = self.first_len();
        let second_len = self.second.len() as u64;
        let dest_second = dest + first_len;
        let dest_third = dest_second + second_len;

        if self.first_start > dest {
            // Backing span moves towards the start.
            move_range(backing, self.first_start, dest, first_len)?;
            self.first_start = dest;
            self.first_end = dest + first_len;
            if let Some(third) = &mut self.third {
                third.commit(backing, dest_third)?;
            }
        } else if self.first_start < dest {
            // Moving towards the end: flatten the tail first so the move
            // cannot overwrite it.
            if let Some(third) = &mut self.third {
                third.commit(backing, dest_third)?;
            }
            move_range(backing, self.first_start, dest, first_len)?;
            self.first_start = dest;
            self.first_end = dest + first_len;
        } else if let Some(third) = &mut self.third {
            third.commit(backing, dest_third)?;
        }

        if second_len > 0 {
            backing.seek_write(dest_second as i64, Whence::Start)?;
            backing.write_all(&self.second)?;
            self.second.clear();
            self.first_end += second_len;
        }

        if let Some(third) = self.third.take() {
            self.first_end += third.len();
        }

        Ok(())
    }
}

/// An edit overlay over a backing stream, committed in one pass.
///
/// Both trait cursors share a single logical position: seeking the read
/// cursor moves the write cursor and vice versa, mirroring how the overlay
/// is used by archive editors.
pub struct SegmentedStream {
    backing: SharedStream,
    root: Node,
}

impl SegmentedStream {
    /// Create an overlay covering the whole of `backing`.
    pub fn new(backing: SharedStream) -> Result<Self> {
        let len = backing.borrow_mut().size()?;
        Ok(Self {
            backing,
            root: Node {
                first_start: 0,
                first_end: len,
                second: Vec::new(),
                third: None,
                pos: 0,
            },
        })
    }

    /// Insert `len` zero bytes at the cursor. The logical length grows by
    /// `len`; the cursor does not move, so the new bytes can be overwritten
    /// immediately.
    pub fn insert(&mut self, len: u64) {
        self.root.insert(len);
    }

    /// Delete `len` bytes starting at the cursor.
    pub fn remove(&mut self, len: u64) -> Result<()> {
        if self.root.pos + len > self.root.len() {
            return Err(StreamError::Write(format!(
                "cannot remove {} bytes at offset {} of a {}-byte stream",
                len,
                self.root.pos,
                self.root.len()
            )));
        }
        self.root.remove(len);
        Ok(())
    }

    /// Flatten every pending edit into the backing stream.
    ///
    /// `truncate` is invoked at most once, with the final total length: when
    /// the stream grew it is called *before* any data moves so a constrained
    /// backing can make room, and when the stream shrank it is called after
    /// flattening. A commit that leaves the length unchanged never calls it.
    ///
    /// The cursor position is preserved. On error the backing may be
    /// partially updated; the overlay still holds whatever was not yet
    /// flattened.
    pub fn commit<F>(&mut self, mut truncate: F) -> Result<()>
    where
        F: FnMut(u64) -> Result<()>,
    {
        let total = self.root.len();
        let backing_len = self.backing.borrow_mut().size()?;
        tracing::debug!(total, backing_len, "Committing segmented stream");

        if backing_len < total {
            // Make room before anything moves.
            truncate(total)?;
            let grown = self.backing.borrow_mut().size()?;
            if grown < total {
                return Err(StreamError::Write(format!(
                    "backing grew to {} of the {} bytes required",
                    grown, total
                )));
            }
        }

        {
            let mut backing = self.backing.borrow_mut();
            self.root.commit(&mut *backing, 0)?;
        }

        debug_assert_eq!(self.root.first_start, 0);
        debug_assert!(self.root.second.is_empty());
        debug_assert!(self.root.third.is_none());
        debug_assert_eq!(self.root.first_end, total);

        let now = self.backing.borrow_mut().size()?;
        if now > total {
            truncate(total)?;
        }

        Ok(())
    }
}

impl Stream for SegmentedStream {
    fn try_read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut backing = self.backing.borrow_mut();
        self.root.read(&mut *backing, buf)
    }

    fn try_write(&mut self, buf: &[u8]) -> Result<usize> {
        let mut backing = self.backing.borrow_mut();
        self.root.write(&mut *backing, buf)
    }

    fn seek_read(&mut self, delta: i64, whence: Whence) -> Result<u64> {
        let target = resolve_seek_clamped(self.root.pos, self.root.len(), delta, whence);
        self.root.seek_to(target);
        Ok(target)
    }

    fn seek_write(&mut self, delta: i64, whence: Whence) -> Result<u64> {
        self.seek_read(delta, whence)
    }

    fn tell_read(&self) -> u64 {
        self.root.pos
    }

    fn tell_write(&self) -> u64 {
        self.root.pos
    }

    fn size(&mut self) -> Result<u64> {
        Ok(self.root.len())
    }

    fn truncate(&mut self, new_size: u64) -> Result<()> {
        let len = self.root.len();
        let saved = self.root.pos.min(new_size);
        if new_size < len {
            self.root.seek_to(new_size);
            self.root.remove(len - new_size);
        } else if new_size > len {
            self.root.seek_to(len);
            self.root.insert(new_size - len);
        }
        self.root.seek_to(saved);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        // Edits are held until commit(); there is nothing to push down.
        Ok(())
    }
}
