//! # relic-wire
//!
//! Readers and writers for the fixed-width quantities game asset formats
//! are made of: 8/16/32/64-bit signed and unsigned integers in either byte
//! order, length-prefixed byte strings, and null-terminated or padded
//! fixed-width strings.
//!
//! The traits extend any [`Stream`] via blanket impls, with byte order
//! chosen per call through `byteorder`'s marker types, mirroring how the
//! rest of the ecosystem reads binary data:
//!
//! ```
//! use byteorder::{BigEndian, LittleEndian};
//! use relic_stream::{MemStream, Stream, Whence};
//! use relic_wire::{WireRead, WireWrite};
//!
//! let mut s = MemStream::new();
//! s.write_u16::<LittleEndian>(0x1234).unwrap();
//! s.write_u16::<BigEndian>(0x1234).unwrap();
//! s.seek_read(0, Whence::Start).unwrap();
//! assert_eq!(s.read_u16::<LittleEndian>().unwrap(), 0x1234);
//! assert_eq!(s.read_u16::<BigEndian>().unwrap(), 0x1234);
//! ```

use byteorder::ByteOrder;
use relic_stream::{Stream, StreamError};
use thiserror::Error;

/// Errors from the wire helpers.
#[derive(Error, Debug)]
pub enum WireError {
    #[error(transparent)]
    Stream(#[from] StreamError),

    #[error("string data is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("string of {len} bytes does not fit in a {max}-byte field")]
    StringTooLong { len: usize, max: usize },

    #[error("data of {len} bytes exceeds what a {prefix:?} length prefix can describe")]
    PrefixOverflow { len: usize, prefix: PrefixWidth },
}

pub type Result<T> = std::result::Result<T, WireError>;

/// Width of the length prefix in front of a prefixed byte string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixWidth {
    U8,
    U16,
    U32,
}

impl PrefixWidth {
    fn max_len(self) -> usize {
        match self {
            PrefixWidth::U8 => u8::MAX as usize,
            PrefixWidth::U16 => u16::MAX as usize,
            PrefixWidth::U32 => u32::MAX as usize,
        }
    }
}

/// Fixed-width reads over any stream.
pub trait WireRead: Stream {
    fn read_u8(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    fn read_u16<B: ByteOrder>(&mut self) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.read_exact(&mut buf)?;
        Ok(B::read_u16(&buf))
    }

    fn read_i16<B: ByteOrder>(&mut self) -> Result<i16> {
        Ok(self.read_u16::<B>()? as i16)
    }

    fn read_u32<B: ByteOrder>(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(B::read_u32(&buf))
    }

    fn read_i32<B: ByteOrder>(&mut self) -> Result<i32> {
        Ok(self.read_u32::<B>()? as i32)
    }

    fn read_u64<B: ByteOrder>(&mut self) -> Result<u64> {
        let mut buf = [0u8; 8];
        self.read_exact(&mut buf)?;
        Ok(B::read_u64(&buf))
    }

    fn read_i64<B: ByteOrder>(&mut self) -> Result<i64> {
        Ok(self.read_u64::<B>()? as i64)
    }

    /// Read exactly `len` raw bytes.
    fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Read a byte string preceded by its length in the given prefix width
    /// (always little-endian, the dominant convention in the target
    /// formats).
    fn read_len_bytes(&mut self, prefix: PrefixWidth) -> Result<Vec<u8>> {
        let len = match prefix {
            PrefixWidth::U8 => self.read_u8()? as usize,
            PrefixWidth::U16 => self.read_u16::<byteorder::LittleEndian>()? as usize,
            PrefixWidth::U32 => self.read_u32::<byteorder::LittleEndian>()? as usize,
        };
        self.read_bytes(len)
    }

    /// Read a fixed `len`-byte string field. With `chop` the result stops at
    /// the first NUL; without it all `len` bytes are kept.
    fn read_padded_string(&mut self, len: usize, chop: bool) -> Result<String> {
        let mut buf = self.read_bytes(len)?;
        if chop {
            if let Some(nul) = buf.iter().position(|&b| b == 0) {
                buf.truncate(nul);
            }
        }
        Ok(String::from_utf8(buf)?)
    }
}

impl<S: Stream + ?Sized> WireRead for S {}

/// Fixed-width writes over any stream.
pub trait WireWrite: Stream {
    fn write_u8(&mut self, value: u8) -> Result<()> {
        self.write_all(&[value])?;
        Ok(())
    }

    fn write_i8(&mut self, value: i8) -> Result<()> {
        self.write_u8(value as u8)
    }

    fn write_u16<B: ByteOrder>(&mut self, value: u16) -> Result<()> {
        let mut buf = [0u8; 2];
        B::write_u16(&mut buf, value);
        self.write_all(&buf)?;
        Ok(())
    }

    fn write_i16<B: ByteOrder>(&mut self, value: i16) -> Result<()> {
        self.write_u16::<B>(value as u16)
    }

    fn write_u32<B: ByteOrder>(&mut self, value: u32) -> Result<()> {
        let mut buf = [0u8; 4];
        B::write_u32(&mut buf, value);
        self.write_all(&buf)?;
        Ok(())
    }

    fn write_i32<B: ByteOrder>(&mut self, value: i32) -> Result<()> {
        self.write_u32::<B>(value as u32)
    }

    fn write_u64<B: ByteOrder>(&mut self, value: u64) -> Result<()> {
        let mut buf = [0u8; 8];
        B::write_u64(&mut buf, value);
        self.write_all(&buf)?;
        Ok(())
    }

    fn write_i64<B: ByteOrder>(&mut self, value: i64) -> Result<()> {
        self.write_u64::<B>(value as u64)
    }

    /// Write a byte string preceded by its length in the given prefix width
    /// (little-endian).
    fn write_len_bytes(&mut self, prefix: PrefixWidth, data: &[u8]) -> Result<()> {
        if data.len() > prefix.max_len() {
            return Err(WireError::PrefixOverflow {
                len: data.len(),
                prefix,
            });
        }
        match prefix {
            PrefixWidth::U8 => self.write_u8(data.len() as u8)?,
            PrefixWidth::U16 => {
                self.write_u16::<byteorder::LittleEndian>(data.len() as u16)?
            }
            PrefixWidth::U32 => {
                self.write_u32::<byteorder::LittleEndian>(data.len() as u32)?
            }
        }
        self.write_all(data)?;
        Ok(())
    }

    /// Write `value` into a fixed `len`-byte field, filling the remainder
    /// with `pad`. The value must fit.
    fn write_padded_string(&mut self, value: &str, len: usize, pad: u8) -> Result<()> {
        let bytes = value.as_bytes();
        if bytes.len() > len {
            return Err(WireError::StringTooLong {
                len: bytes.len(),
                max: len,
            });
        }
        self.write_all(bytes)?;
        let mut remaining = len - bytes.len();
        let fill = [pad; 16];
        while remaining > 0 {
            let n = remaining.min(fill.len());
            self.write_all(&fill[..n])?;
            remaining -= n;
        }
        Ok(())
    }
}

impl<S: Stream + ?Sized> WireWrite for S {}
