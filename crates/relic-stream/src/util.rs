//! Bulk copy and move helpers.

use crate::error::Result;
use crate::stream::{Stream, Whence};

const CHUNK_SIZE: usize = 4096;

/// Copy `src` from its current read position to `dest` at its current write
/// position, until `src` is exhausted. Returns the number of bytes copied.
pub fn copy_streams(dest: &mut dyn Stream, src: &mut dyn Stream) -> Result<u64> {
    let mut buf = [0u8; CHUNK_SIZE];
    let mut total = 0u64;
    loop {
        let r = src.try_read(&mut buf)?;
        if r == 0 {
            break;
        }
        dest.write_all(&buf[..r])?;
        total += r as u64;
    }
    Ok(total)
}

/// Move `len` bytes within one stream from offset `from` to offset `to`.
///
/// The ranges may overlap: the copy runs low-to-high when the data moves
/// backwards and high-to-low when it moves forwards, so no byte is
/// overwritten before it has been read. Cursor positions are left where the
/// final chunk put them.
pub fn move_range(stream: &mut dyn Stream, from: u64, to: u64, len: u64) -> Result<()> {
    if from == to || len == 0 {
        return Ok(());
    }
    let mut buf = [0u8; CHUNK_SIZE];
    if to < from {
        // Moving towards the start: walk forwards.
        let mut done = 0u64;
        while done < len {
            let n = CHUNK_SIZE.min((len - done) as usize);
            stream.seek_read((from + done) as i64, Whence::Start)?;
            stream.read_exact(&mut buf[..n])?;
            stream.seek_write((to + done) as i64, Whence::Start)?;
            stream.write_all(&buf[..n])?;
            done += n as u64;
        }
    } else {
        // Moving towards the end: walk backwards so the overlap is safe.
        let mut remaining = len;
        while remaining > 0 {
            let n = CHUNK_SIZE.min(remaining as usize);
            remaining -= n as u64;
            stream.seek_read((from + remaining) as i64, Whence::Start)?;
            stream.read_exact(&mut buf[..n])?;
            stream.seek_write((to + remaining) as i64, Whence::Start)?;
            stream.write_all(&buf[..n])?;
        }
    }
    Ok(())
}
