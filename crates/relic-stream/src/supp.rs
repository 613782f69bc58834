//! Supplemental-file registry.
//!
//! Some asset formats keep part of their data in a second file: an external
//! FAT, a shared compression dictionary, a palette, or instrument patches.
//! Format handlers report which kinds they need as [`SuppFilenames`] and the
//! caller opens each file and hands back a [`SuppData`] map of ready
//! streams, each paired with the truncate callback that resizes it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::stream::{SharedStream, TruncateFn};

/// The kinds of supplemental file a format can require.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum SuppKind {
    /// External compression dictionary.
    Dictionary,
    /// File allocation table stored outside the archive.
    Fat,
    /// Palette data.
    Palette,
    /// Instrument patches/settings.
    Instruments,
}

/// An opened supplemental file: the stream plus the callback that resizes it.
pub struct SuppItem {
    /// The stream containing the supplemental data.
    pub stream: SharedStream,
    /// Callback through which adapters request a length change.
    pub truncate: TruncateFn,
}

/// Supplemental kinds mapped to open streams.
pub type SuppData = BTreeMap<SuppKind, SuppItem>;

/// Supplemental kinds mapped to the filenames a handler expects.
pub type SuppFilenames = BTreeMap<SuppKind, String>;
