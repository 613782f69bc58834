//! # relic-bits
//!
//! Bit-level I/O over any byte stream from `relic-stream`. Classic-game
//! codecs (LZW dictionaries, RLE variants, packed tile data) address their
//! input in bit widths from 1 to 32 and in both bit orders, frequently
//! switching width mid-stream; [`BitStream`] provides that view, including
//! bit-granular seeking and read-modify-write of partial bytes.
//!
//! ## Example
//!
//! ```
//! use relic_bits::{BitOrder, BitStream};
//! use relic_stream::{shared, MemStream};
//!
//! let backing = shared(MemStream::from_vec(vec![0x12, 0x34]));
//! let mut bits = BitStream::new(backing, BitOrder::Msb);
//! assert_eq!(bits.read(12).unwrap(), (0x123, 12));
//! assert_eq!(bits.read(4).unwrap(), (0x4, 4));
//! ```

pub mod bitstream;

pub use bitstream::{BitOrder, BitStream};
