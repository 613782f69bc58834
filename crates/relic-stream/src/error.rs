//! Error types for stream operations.

use thiserror::Error;

/// Errors that can occur while operating on a stream.
///
/// Short reads and writes are *not* errors — `try_read`/`try_write` report
/// them through their return count. The `Incomplete*` variants are raised by
/// the exact-count helpers ([`read_exact`](crate::Stream::read_exact),
/// [`write_all`](crate::Stream::write_all)) and by adapters that cannot
/// retry a partial transfer.
#[derive(Error, Debug)]
pub enum StreamError {
    #[error("failed to open stream: {0}")]
    Open(String),

    #[error("read error: {0}")]
    Read(String),

    #[error("write error: {0}")]
    Write(String),

    #[error("seek error: {0}")]
    Seek(String),

    #[error("incomplete write: {written} of {expected} bytes written")]
    IncompleteWrite {
        /// Bytes actually written before the transfer stopped.
        written: u64,
        /// Bytes the caller required.
        expected: u64,
    },

    #[error("incomplete read: {read} of {expected} bytes read")]
    IncompleteRead {
        /// Bytes actually read before the transfer stopped.
        read: u64,
        /// Bytes the caller required.
        expected: u64,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StreamError>;
