//! # relic-stream
//!
//! Seekable byte-stream primitives for classic-game asset tools: the
//! [`Stream`] contract, concrete memory and file backings, bounded
//! [`SubStream`] windows, and the [`SegmentedStream`] edit overlay that
//! turns insertions and deletions anywhere in a file into a single-pass
//! on-disk reconciliation at commit time.
//!
//! ## Composition
//!
//! Adapters stack: a segmented stream can sit on a sub-stream window of a
//! file, and filter adapters from `relic-filter` slot in anywhere a
//! [`SharedStream`] is accepted. Reads pull bytes down the chain; writes
//! buffer in the topmost adapter until committed or flushed downwards.
//!
//! ## Example
//!
//! ```
//! use relic_stream::{shared, MemStream, SegmentedStream, Stream, Whence};
//!
//! let backing = shared(MemStream::from_vec(b"HELLOWORLD".to_vec()));
//! let mut seg = SegmentedStream::new(backing.clone()).unwrap();
//!
//! // Make room in the middle and fill it, then reconcile in one pass.
//! seg.seek_write(5, Whence::Start).unwrap();
//! seg.insert(2);
//! seg.write_all(b", ").unwrap();
//! seg.commit(|n| backing.borrow_mut().truncate(n)).unwrap();
//! ```

pub mod error;
pub mod file;
pub mod mem;
pub mod meta;
pub mod seg;
pub mod stream;
pub mod sub;
pub mod supp;
pub mod util;

pub use error::{Result, StreamError};
pub use file::FileStream;
pub use mem::MemStream;
pub use meta::{MetaKind, MetadataSource};
pub use seg::SegmentedStream;
pub use stream::{shared, SharedStream, Stream, TruncateFn, Whence};
pub use sub::SubStream;
pub use supp::{SuppData, SuppFilenames, SuppItem, SuppKind};
pub use util::{copy_streams, move_range};
