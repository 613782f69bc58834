//! # relic-filter
//!
//! Transform filters (compression, encryption) and the [`FilteredStream`]
//! adapter that makes filtered data look like a plain seekable byte stream.
//!
//! The [`Filter`] contract is the seam real codecs implement — an LZW
//! decompressor or a cipher lives outside this crate but plugs into the
//! same two-method trait the bundled [`IdentityFilter`] implements.
//!
//! ## Example
//!
//! ```
//! use relic_filter::{FilteredStream, IdentityFilter};
//! use relic_stream::{shared, MemStream, Stream};
//!
//! let backing = shared(MemStream::from_vec(b"packed".to_vec()));
//! let target = backing.clone();
//! let mut view = FilteredStream::new(
//!     backing,
//!     Box::new(IdentityFilter::new()),
//!     Box::new(IdentityFilter::new()),
//!     Box::new(move |n| target.borrow_mut().truncate(n)),
//! );
//! assert_eq!(view.size().unwrap(), 6);
//! ```

pub mod filter;
pub mod filtered;

pub use filter::{run_filter, Filter, FilterError, IdentityFilter, Transform};
pub use filtered::FilteredStream;
