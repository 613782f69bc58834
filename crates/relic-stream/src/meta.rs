//! Metadata contract for format handlers.
//!
//! Formats that carry free-form metadata (a description string, the name of
//! an external palette file) expose it through [`MetadataSource`]. The
//! defaults describe a format with no metadata at all, so handlers only
//! override what they actually support.

use serde::{Deserialize, Serialize};

use crate::error::{Result, StreamError};

/// Metadata item kinds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum MetaKind {
    /// Free-form file description.
    Description,
    /// Filename of the palette this file depends on.
    PaletteFilename,
}

/// Read/write access to a format's metadata items.
pub trait MetadataSource {
    /// The metadata kinds this format supports. Optional items are listed
    /// even when currently empty.
    fn meta_list(&self) -> Vec<MetaKind> {
        Vec::new()
    }

    /// Fetch the value of a supported metadata item.
    fn meta_get(&self, kind: MetaKind) -> Result<String> {
        Err(StreamError::Read(format!(
            "metadata item {:?} not supported by this format",
            kind
        )))
    }

    /// Change the value of a supported metadata item. An empty value removes
    /// the item where the format allows it.
    fn meta_set(&mut self, kind: MetaKind, _value: &str) -> Result<()> {
        Err(StreamError::Write(format!(
            "metadata item {:?} not supported by this format",
            kind
        )))
    }
}
