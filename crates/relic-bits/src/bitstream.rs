//! The bit stream adapter.

use relic_stream::{Result, SharedStream, StreamError, Whence};

/// Order in which bits are consumed from (and produced into) each byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitOrder {
    /// Least-significant bit first ("little-endian"). Multi-byte values are
    /// assembled by taking successive chunks from successive bytes, each
    /// chunk landing above the bits already read.
    Lsb,
    /// Most-significant bit first ("big-endian"). Values read MSB-to-LSB in
    /// stream order.
    Msb,
}

/// A sub-byte read/write/seek adapter over a byte stream.
///
/// The adapter tracks an absolute *bit* position and a one-byte buffer for
/// the partial byte it is currently inside. Partially written bytes merge
/// with the byte already in the backing (read/modify/write), so interleaved
/// reads and writes that straddle a byte observe each other's effects.
///
/// The backing is addressed absolutely on every byte transfer, so its own
/// cursor positions are never disturbed in a way the adapter depends on.
pub struct BitStream {
    parent: SharedStream,
    order: BitOrder,
    /// Absolute position in bits.
    bit_pos: u64,
    /// Value of the byte at `bit_pos / 8`, when buffered.
    buf: Option<u8>,
    /// Buffered byte holds written bits not yet in the backing.
    dirty: bool,
}

impl BitStream {
    /// Create a bit-level view over `parent` starting at bit 0.
    pub fn new(parent: SharedStream, order: BitOrder) -> Self {
        Self {
            parent,
            order,
            bit_pos: 0,
            buf: None,
            dirty: false,
        }
    }

    /// Current position in bits.
    pub fn tell(&self) -> u64 {
        self.bit_pos
    }

    /// Current bit order.
    pub fn order(&self) -> BitOrder {
        self.order
    }

    /// Switch bit order, flushing any pending write-side partial byte first.
    pub fn set_order(&mut self, order: BitOrder) -> Result<()> {
        self.flush()?;
        self.order = order;
        Ok(())
    }

    /// Read up to `bits` bits (1..=32), returning the value and the count of
    /// bits actually read.
    ///
    /// Hitting end-of-stream mid-value is not an error: in LSB-first order
    /// the partial value and its true bit count are returned; in MSB-first
    /// order the value is padded with low zero bits and the full count is
    /// reported, so fixed-width consumers see a left-aligned final value.
    /// A read starting at end-of-stream returns `(0, 0)`.
    pub fn read(&mut self, bits: u8) -> Result<(u32, u8)> {
        check_width(bits)?;
        let mut value: u32 = 0;
        let mut got: u8 = 0;
        let mut left = bits;

        while left > 0 {
            let idx = self.bit_pos / 8;
            let off = (self.bit_pos % 8) as u8;

            let cur = match self.byte_for_read(idx)? {
                Some(b) => b,
                None => {
                    if got == 0 {
                        return Ok((0, 0));
                    }
                    if self.order == BitOrder::Msb {
                        value <<= left;
                        got += left;
                    }
                    return Ok((value, got));
                }
            };

            let take = left.min(8 - off);
            let mask = (1u32 << take) - 1;
            let chunk = match self.order {
                BitOrder::Lsb => ((cur >> off) as u32) & mask,
                BitOrder::Msb => ((cur >> (8 - off - take)) as u32) & mask,
            };
            match self.order {
                BitOrder::Lsb => value |= chunk << got,
                BitOrder::Msb => value = (value << take) | chunk,
            }

            self.bit_pos += take as u64;
            if off + take == 8 {
                self.buf = None;
            }
            got += take;
            left -= take;
        }

        Ok((value, bits))
    }

    /// Write the low `bits` bits (1..=32) of `value`.
    ///
    /// Bytes only partially covered by the write keep their remaining bits:
    /// the existing byte is fetched from the backing and merged. Writing
    /// past end-of-stream extends the backing (if it is writable).
    pub fn write(&mut self, bits: u8, value: u32) -> Result<u8> {
        check_width(bits)?;
        let value = if bits == 32 {
            value
        } else {
            value & ((1u32 << bits) - 1)
        };
        let mut left = bits;

        while left > 0 {
            let idx = self.bit_pos / 8;
            let off = (self.bit_pos % 8) as u8;
            let take = left.min(8 - off);
            let mask = ((1u32 << take) - 1) as u8;

            let chunk = match self.order {
                BitOrder::Lsb => (value >> (bits - left)) as u8 & mask,
                BitOrder::Msb => (value >> (left - take)) as u8 & mask,
            };

            // A whole-byte write needs no merge with the backing.
            let base = if off == 0 && take == 8 {
                0
            } else {
                self.byte_for_write(idx)?.unwrap_or(0)
            };

            let shift = match self.order {
                BitOrder::Lsb => off,
                BitOrder::Msb => 8 - off - take,
            };
            let merged = (base & !(mask << shift)) | (chunk << shift);

            self.bit_pos += take as u64;
            if off + take == 8 {
                self.store_byte(idx, merged)?;
                self.buf = None;
                self.dirty = false;
            } else {
                self.buf = Some(merged);
                self.dirty = true;
            }
            left -= take;
        }

        Ok(bits)
    }

    /// Reposition in bits. Any pending partial byte is flushed first; when
    /// the target lands mid-byte that byte is pre-fetched so subsequent
    /// operations continue seamlessly. Seeking outside the stream is an
    /// error.
    pub fn seek(&mut self, delta: i64, whence: Whence) -> Result<u64> {
        self.flush()?;
        let total_bits = self.parent.borrow_mut().size()? * 8;
        let base = match whence {
            Whence::Start => 0i128,
            Whence::Current => self.bit_pos as i128,
            Whence::End => total_bits as i128,
        };
        let target = base + delta as i128;
        if target < 0 || target > total_bits as i128 {
            return Err(StreamError::Seek(format!(
                "bit seek target {} outside stream of {} bits",
                target, total_bits
            )));
        }
        self.bit_pos = target as u64;
        self.buf = None;
        if self.bit_pos % 8 != 0 {
            self.buf = self.fetch_byte(self.bit_pos / 8)?;
        }
        Ok(self.bit_pos)
    }

    /// Write back a pending partial byte.
    ///
    /// The byte at the current position is merged with the buffered bits and
    /// stored; the bit position and the buffer are left intact, so writing
    /// can resume mid-byte and a subsequent read observes the merged value.
    pub fn flush(&mut self) -> Result<()> {
        if self.dirty {
            if let Some(b) = self.buf {
                self.store_byte(self.bit_pos / 8, b)?;
            }
            self.dirty = false;
        }
        Ok(())
    }

    fn byte_for_read(&mut self, idx: u64) -> Result<Option<u8>> {
        if self.dirty {
            // A pending write would shadow the backing; push it down so the
            // read sees the merged byte.
            self.flush()?;
        }
        if self.buf.is_none() {
            self.buf = self.fetch_byte(idx)?;
        }
        Ok(self.buf)
    }

    fn byte_for_write(&mut self, idx: u64) -> Result<Option<u8>> {
        if self.buf.is_none() {
            self.buf = self.fetch_byte(idx)?;
        }
        Ok(self.buf)
    }

    fn fetch_byte(&mut self, idx: u64) -> Result<Option<u8>> {
        let mut parent = self.parent.borrow_mut();
        if idx >= parent.size()? {
            return Ok(None);
        }
        parent.seek_read(idx as i64, Whence::Start)?;
        let mut byte = [0u8; 1];
        match parent.try_read(&mut byte)? {
            0 => Ok(None),
            _ => Ok(Some(byte[0])),
        }
    }

    fn store_byte(&mut self, idx: u64, value: u8) -> Result<()> {
        let mut parent = self.parent.borrow_mut();
        parent.seek_write(idx as i64, Whence::Start)?;
        parent.write_all(&[value])
    }
}

fn check_width(bits: u8) -> Result<()> {
    if bits == 0 || bits > 32 {
        return Err(StreamError::Read(format!(
            "bit width {} outside the supported 1..=32 range",
            bits
        )));
    }
    Ok(())
}
