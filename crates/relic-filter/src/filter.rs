//! The filter contract and the reference identity filter.
//!
//! A filter is a stateful byte transducer: compression, encryption, XOR
//! scrambling. Filters are driven by repeated [`Filter::transform`] calls;
//! each call consumes some input and produces some output, and neither count
//! is required to match the other — filters may buffer internally and need
//! not preserve length. An empty input slice signals end-of-stream and asks
//! the filter to drain anything it is still holding.
//!
//! Each instance runs in one direction. A full pass over a byte sequence
//! starts with [`Filter::reset`] and ends when a transform call neither
//! consumes nor produces.

use thiserror::Error;

/// Errors raised by a filter while transforming data.
#[derive(Error, Debug)]
pub enum FilterError {
    /// The input cannot be decoded; the message names what was wrong.
    #[error("corrupt data: {0}")]
    Corrupt(String),

    /// Any other filter failure.
    #[error("filter error: {0}")]
    Other(String),
}

/// Byte counts reported by one [`Filter::transform`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transform {
    /// Bytes consumed from the input slice.
    pub consumed: usize,
    /// Bytes produced into the output slice.
    pub produced: usize,
}

/// A one-directional byte transducer.
pub trait Filter {
    /// Consume some of `input`, produce some of `output`, and report both
    /// counts. An empty `input` means no more data is coming: drain any
    /// internal state. Returning `{consumed: 0, produced: 0}` on an empty
    /// input ends the pass.
    fn transform(&mut self, input: &[u8], output: &mut [u8]) -> Result<Transform, FilterError>;

    /// Prepare for a fresh pass over a new byte sequence. Stateless filters
    /// need not override this.
    fn reset(&mut self) {}
}

/// The no-op filter: output is a byte-for-byte copy of input.
#[derive(Debug, Default)]
pub struct IdentityFilter;

impl IdentityFilter {
    pub fn new() -> Self {
        Self
    }
}

impl Filter for IdentityFilter {
    fn transform(&mut self, input: &[u8], output: &mut [u8]) -> Result<Transform, FilterError> {
        let n = input.len().min(output.len());
        output[..n].copy_from_slice(&input[..n]);
        Ok(Transform {
            consumed: n,
            produced: n,
        })
    }
}

/// Drive `filter` over the whole of `input`, collecting everything it
/// produces, including its end-of-stream drain.
pub fn run_filter(filter: &mut dyn Filter, input: &[u8]) -> Result<Vec<u8>, FilterError> {
    filter.reset();
    let mut out = Vec::new();
    let mut buf = [0u8; 4096];
    let mut pos = 0usize;
    loop {
        let step = filter.transform(&input[pos..], &mut buf)?;
        out.extend_from_slice(&buf[..step.produced]);
        pos += step.consumed;
        if step.consumed == 0 && step.produced == 0 {
            if pos < input.len() {
                return Err(FilterError::Corrupt(format!(
                    "filter stalled with {} bytes unconsumed",
                    input.len() - pos
                )));
            }
            break;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_copies_everything() {
        let mut f = IdentityFilter::new();
        let out = run_filter(&mut f, b"ABCDEFGHIJ").unwrap();
        assert_eq!(out, b"ABCDEFGHIJ");
    }

    #[test]
    fn test_identity_respects_small_output_buffer() {
        let mut f = IdentityFilter::new();
        let mut out = [0u8; 4];
        let step = f.transform(b"ABCDEFGH", &mut out).unwrap();
        assert_eq!(step, Transform { consumed: 4, produced: 4 });
        assert_eq!(&out, b"ABCD");
    }

    #[test]
    fn test_identity_end_of_stream() {
        let mut f = IdentityFilter::new();
        let mut out = [0u8; 4];
        let step = f.transform(&[], &mut out).unwrap();
        assert_eq!(step, Transform { consumed: 0, produced: 0 });
    }

    /// A filter that holds every input byte until end-of-stream, then emits
    /// the whole sequence reversed. Exercises buffering and the drain phase.
    #[derive(Default)]
    struct ReverseFilter {
        held: Vec<u8>,
        draining: bool,
    }

    impl Filter for ReverseFilter {
        fn transform(
            &mut self,
            input: &[u8],
            output: &mut [u8],
        ) -> Result<Transform, FilterError> {
            if !input.is_empty() {
                self.held.extend_from_slice(input);
                return Ok(Transform {
                    consumed: input.len(),
                    produced: 0,
                });
            }
            if !self.draining {
                self.held.reverse();
                self.draining = true;
            }
            let n = self.held.len().min(output.len());
            output[..n].copy_from_slice(&self.held[..n]);
            self.held.drain(..n);
            Ok(Transform {
                consumed: 0,
                produced: n,
            })
        }

        fn reset(&mut self) {
            self.held.clear();
            self.draining = false;
        }
    }

    #[test]
    fn test_buffering_filter_drains_at_end() {
        let mut f = ReverseFilter::default();
        let out = run_filter(&mut f, b"ABCDE").unwrap();
        assert_eq!(out, b"EDCBA");

        // reset() makes the instance good for another pass.
        let out = run_filter(&mut f, b"123").unwrap();
        assert_eq!(out, b"321");
    }

    /// A filter that rejects everything, for error-path tests.
    struct BrokenFilter;

    impl Filter for BrokenFilter {
        fn transform(&mut self, _: &[u8], _: &mut [u8]) -> Result<Transform, FilterError> {
            Err(FilterError::Corrupt("bad dictionary entry".into()))
        }
    }

    #[test]
    fn test_corrupt_input_surfaces_message() {
        let mut f = BrokenFilter;
        let err = run_filter(&mut f, b"x").unwrap_err();
        assert!(err.to_string().contains("bad dictionary entry"));
    }

    /// A filter that never consumes; run_filter must not spin forever.
    struct StallingFilter;

    impl Filter for StallingFilter {
        fn transform(&mut self, _: &[u8], _: &mut [u8]) -> Result<Transform, FilterError> {
            Ok(Transform {
                consumed: 0,
                produced: 0,
            })
        }
    }

    #[test]
    fn test_stalled_filter_is_an_error() {
        let mut f = StallingFilter;
        let err = run_filter(&mut f, b"data").unwrap_err();
        assert!(matches!(err, FilterError::Corrupt(_)));
    }
}
