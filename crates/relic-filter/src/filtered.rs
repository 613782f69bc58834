//! Seekable random access over filtered data.
//!
//! Filters are not length-preserving, so the only way to offer seeks and
//! overwrites on top of an encoded backing is to materialise the decoded
//! form: the first operation that needs the decoded view pulls the whole
//! backing through the read filter into an in-memory cache, and every read,
//! write and seek then works on the cache. [`FilteredStream::flush`]
//! re-encodes the cache through the write filter, writes it back, and tells
//! the owner the new encoded length through the truncate callback.
//!
//! For the target domain (individual game asset files) whole-file
//! materialisation is the intended trade-off, not a limitation.
//!
//! # Example
//!
//! ```
//! use relic_filter::{FilteredStream, IdentityFilter};
//! use relic_stream::{shared, MemStream, Stream, Whence};
//!
//! let backing = shared(MemStream::from_vec(b"ABCDEF".to_vec()));
//! let target = backing.clone();
//! let mut f = FilteredStream::new(
//!     backing,
//!     Box::new(IdentityFilter::new()),
//!     Box::new(IdentityFilter::new()),
//!     Box::new(move |n| target.borrow_mut().truncate(n)),
//! );
//! f.seek_write(3, Whence::Start).unwrap();
//! f.write_all(b"xyz").unwrap();
//! f.flush().unwrap();
//! ```

use relic_stream::{
    Result, SharedStream, Stream, StreamError, TruncateFn, Whence,
};

use crate::filter::{run_filter, Filter};

/// A bidirectional filter adapter over a backing stream.
///
/// `size()` reports the *decoded* length — the view the caller manipulates.
/// Decode failures surface as a read error on whichever operation first
/// forces the cache to load.
pub struct FilteredStream {
    backing: SharedStream,
    read_filter: Box<dyn Filter>,
    write_filter: Box<dyn Filter>,
    truncate_cb: TruncateFn,
    cache: Vec<u8>,
    loaded: bool,
    dirty: bool,
    rpos: u64,
    wpos: u64,
}

impl FilteredStream {
    /// Create the adapter. Nothing is read from `backing` until the first
    /// operation that needs the decoded view.
    pub fn new(
        backing: SharedStream,
        read_filter: Box<dyn Filter>,
        write_filter: Box<dyn Filter>,
        truncate_cb: TruncateFn,
    ) -> Self {
        Self {
            backing,
            read_filter,
            write_filter,
            truncate_cb,
            cache: Vec::new(),
            loaded: false,
            dirty: false,
            rpos: 0,
            wpos: 0,
        }
    }

    /// Pull the whole backing through the read filter into the cache.
    fn ensure_loaded(&mut self) -> Result<()> {
        if self.loaded {
            return Ok(());
        }
        let mut raw = Vec::new();
        {
            let mut backing = self.backing.borrow_mut();
            backing.seek_read(0, Whence::Start)?;
            let mut chunk = [0u8; 4096];
            loop {
                let n = backing.try_read(&mut chunk)?;
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&chunk[..n]);
            }
        }
        self.cache = run_filter(&mut *self.read_filter, &raw)
            .map_err(|e| StreamError::Read(format!("decode filter failed: {}", e)))?;
        tracing::debug!(
            encoded = raw.len(),
            decoded = self.cache.len(),
            "Loaded filter cache"
        );
        self.loaded = true;
        Ok(())
    }
}

impl Stream for FilteredStream {
    fn try_read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.ensure_loaded()?;
        let len = self.cache.len() as u64;
        if self.rpos >= len {
            return Ok(0);
        }
        let n = buf.len().min((len - self.rpos) as usize);
        let start = self.rpos as usize;
        buf[..n].copy_from_slice(&self.cache[start..start + n]);
        self.rpos += n as u64;
        Ok(n)
    }

    fn try_write(&mut self, buf: &[u8]) -> Result<usize> {
        self.ensure_loaded()?;
        let end = self.wpos as usize + buf.len();
        if end > self.cache.len() {
            self.cache.resize(end, 0);
        }
        let start = self.wpos as usize;
        self.cache[start..end].copy_from_slice(buf);
        self.wpos = end as u64;
        self.dirty = true;
        Ok(buf.len())
    }

    fn seek_read(&mut self, delta: i64, whence: Whence) -> Result<u64> {
        self.ensure_loaded()?;
        let len = self.cache.len() as u64;
        let base = match whence {
            Whence::Start => 0i128,
            Whence::Current => self.rpos as i128,
            Whence::End => len as i128,
        };
        self.rpos = (base + delta as i128).clamp(0, len as i128) as u64;
        Ok(self.rpos)
    }

    fn seek_write(&mut self, delta: i64, whence: Whence) -> Result<u64> {
        self.ensure_loaded()?;
        let len = self.cache.len() as u64;
        let base = match whence {
            Whence::Start => 0i128,
            Whence::Current => self.wpos as i128,
            Whence::End => len as i128,
        };
        self.wpos = (base + delta as i128).clamp(0, len as i128) as u64;
        Ok(self.wpos)
    }

    fn tell_read(&self) -> u64 {
        self.rpos
    }

    fn tell_write(&self) -> u64 {
        self.wpos
    }

    fn size(&mut self) -> Result<u64> {
        self.ensure_loaded()?;
        Ok(self.cache.len() as u64)
    }

    fn truncate(&mut self, new_size: u64) -> Result<()> {
        self.ensure_loaded()?;
        self.cache.resize(new_size as usize, 0);
        self.rpos = self.rpos.min(new_size);
        self.wpos = self.wpos.min(new_size);
        self.dirty = true;
        Ok(())
    }

    /// Re-encode the cache and write it back.
    ///
    /// The encoded bytes are written to the backing from offset zero, the
    /// truncate callback is told the encoded length, and only then is the
    /// backing itself flushed — so stacked filtered streams propagate all
    /// the way down. The cache stays loaded and usable; a clean cache skips
    /// the re-encode.
    fn flush(&mut self) -> Result<()> {
        if self.dirty {
            let encoded = run_filter(&mut *self.write_filter, &self.cache)
                .map_err(|e| StreamError::Write(format!("encode filter failed: {}", e)))?;
            {
                let mut backing = self.backing.borrow_mut();
                backing.seek_write(0, Whence::Start)?;
                backing.write_all(&encoded)?;
            }
            (self.truncate_cb)(encoded.len() as u64)?;
            tracing::debug!(
                decoded = self.cache.len(),
                encoded = encoded.len(),
                "Flushed filter cache"
            );
            self.dirty = false;
        }
        self.backing.borrow_mut().flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterError, IdentityFilter, Transform};
    use relic_stream::{shared, MemStream};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn identity_over(data: &[u8]) -> (SharedStream, FilteredStream) {
        let backing = shared(MemStream::from_vec(data.to_vec()));
        let target = backing.clone();
        let f = FilteredStream::new(
            backing.clone(),
            Box::new(IdentityFilter::new()),
            Box::new(IdentityFilter::new()),
            Box::new(move |n| target.borrow_mut().truncate(n)),
        );
        (backing, f)
    }

    fn contents(backing: &SharedStream) -> Vec<u8> {
        let mut out = vec![0u8; backing.borrow_mut().size().unwrap() as usize];
        backing.borrow_mut().seek_read(0, Whence::Start).unwrap();
        backing.borrow_mut().read_exact(&mut out).unwrap();
        out
    }

    #[test]
    fn test_read_through_identity() {
        let (_backing, mut f) = identity_over(b"ABCDEFGHIJKLMNOPQRSTUVWXYZ");
        f.seek_read(10, Whence::Start).unwrap();
        let mut buf = [0u8; 10];
        f.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"KLMNOPQRST");
    }

    #[test]
    fn test_overwrite_and_flush() {
        let (backing, mut f) = identity_over(b"ABCDEFGHIJKLMNOPQRSTUVWXYZ");
        f.seek_write(10, Whence::Start).unwrap();
        f.write_all(b"1234567890").unwrap();
        f.flush().unwrap();
        assert_eq!(contents(&backing), b"ABCDEFGHIJ1234567890UVWXYZ");
    }

    #[test]
    fn test_write_from_scratch() {
        let (backing, mut f) = identity_over(b"");
        f.write_all(b"ABCDEFGHIJKLMNOPQRSTUVWXYZ").unwrap();
        f.seek_write(10, Whence::Start).unwrap();
        f.write_all(b"1234567890").unwrap();
        f.flush().unwrap();
        assert_eq!(contents(&backing), b"ABCDEFGHIJ1234567890UVWXYZ");
    }

    #[test]
    fn test_size_reports_decoded_length() {
        let (_backing, mut f) = identity_over(b"ABCDEF");
        assert_eq!(f.size().unwrap(), 6);
    }

    /// Encode doubles every byte; decode halves, rejecting odd input or
    /// mismatched pairs. A simple non-length-preserving codec.
    struct DoubleEncode;
    struct DoubleDecode;

    impl Filter for DoubleEncode {
        fn transform(
            &mut self,
            input: &[u8],
            output: &mut [u8],
        ) -> std::result::Result<Transform, FilterError> {
            let n = input.len().min(output.len() / 2);
            for (i, &b) in input[..n].iter().enumerate() {
                output[i * 2] = b;
                output[i * 2 + 1] = b;
            }
            Ok(Transform {
                consumed: n,
                produced: n * 2,
            })
        }
    }

    impl Filter for DoubleDecode {
        fn transform(
            &mut self,
            input: &[u8],
            output: &mut [u8],
        ) -> std::result::Result<Transform, FilterError> {
            if input.len() == 1 {
                return Err(FilterError::Corrupt("odd-length doubled data".into()));
            }
            let pairs = (input.len() / 2).min(output.len());
            for i in 0..pairs {
                if input[i * 2] != input[i * 2 + 1] {
                    return Err(FilterError::Corrupt("mismatched byte pair".into()));
                }
                output[i] = input[i * 2];
            }
            Ok(Transform {
                consumed: pairs * 2,
                produced: pairs,
            })
        }
    }

    fn doubling_over(data: &[u8]) -> (SharedStream, FilteredStream) {
        let backing = shared(MemStream::from_vec(data.to_vec()));
        let target = backing.clone();
        let f = FilteredStream::new(
            backing.clone(),
            Box::new(DoubleDecode),
            Box::new(DoubleEncode),
            Box::new(move |n| target.borrow_mut().truncate(n)),
        );
        (backing, f)
    }

    #[test]
    fn test_non_length_preserving_round_trip() {
        let (backing, mut f) = doubling_over(b"AABBCC");
        assert_eq!(f.size().unwrap(), 3);
        let mut buf = [0u8; 3];
        f.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"ABC");

        f.seek_write(0, Whence::End).unwrap();
        f.write_all(b"D").unwrap();
        f.flush().unwrap();
        assert_eq!(contents(&backing), b"AABBCCDD");
    }

    #[test]
    fn test_decode_failure_surfaces_on_first_use() {
        let (_backing, mut f) = doubling_over(b"AAB");
        let err = f.size().unwrap_err();
        assert!(matches!(err, StreamError::Read(_)));
        assert!(err.to_string().contains("odd-length"));
    }

    /// Write filter that counts its passes, to observe re-encode behaviour.
    struct CountingIdentity {
        passes: Rc<RefCell<u32>>,
    }

    impl Filter for CountingIdentity {
        fn transform(
            &mut self,
            input: &[u8],
            output: &mut [u8],
        ) -> std::result::Result<Transform, FilterError> {
            let n = input.len().min(output.len());
            output[..n].copy_from_slice(&input[..n]);
            Ok(Transform {
                consumed: n,
                produced: n,
            })
        }

        fn reset(&mut self) {
            *self.passes.borrow_mut() += 1;
        }
    }

    #[test]
    fn test_flush_reencodes_only_when_dirty() {
        let passes = Rc::new(RefCell::new(0u32));
        let backing = shared(MemStream::from_vec(b"ABC".to_vec()));
        let target = backing.clone();
        let mut f = FilteredStream::new(
            backing,
            Box::new(IdentityFilter::new()),
            Box::new(CountingIdentity {
                passes: passes.clone(),
            }),
            Box::new(move |n| target.borrow_mut().truncate(n)),
        );

        f.flush().unwrap();
        assert_eq!(*passes.borrow(), 0, "clean cache must not re-encode");

        f.write_all(b"X").unwrap();
        f.flush().unwrap();
        f.flush().unwrap();
        assert_eq!(*passes.borrow(), 1, "one dirty flush, one encode pass");

        f.write_all(b"Y").unwrap();
        f.flush().unwrap();
        assert_eq!(*passes.borrow(), 2);
    }

    #[test]
    fn test_truncate_resizes_decoded_view() {
        let (backing, mut f) = identity_over(b"ABCDEFGH");
        f.truncate(4).unwrap();
        assert_eq!(f.size().unwrap(), 4);
        f.flush().unwrap();
        assert_eq!(contents(&backing), b"ABCD");
    }
}
