//! Non-fatal failure kinds surfaced by the engine.

use core::fmt;

/// Every variant degrades to a renderable state; none of them stops the reader.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReaderError {
    /// Source text missing or unreadable. The empty document is installed instead.
    ResourceUnavailable,
    /// Font selector outside `0..=2`.
    InvalidFontIndex(u8),
    /// Buffer growth failed while appending a fragment.
    AllocationFailure,
    /// Non-zero fragment index with no transfer in progress.
    OutOfRangeChunk,
}

impl fmt::Display for ReaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResourceUnavailable => f.write_str("text resource unavailable"),
            Self::InvalidFontIndex(index) => write!(f, "invalid font index {index}"),
            Self::AllocationFailure => f.write_str("out of memory while receiving text"),
            Self::OutOfRangeChunk => f.write_str("fragment arrived without a transfer start"),
        }
    }
}
