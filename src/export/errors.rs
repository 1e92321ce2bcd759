//! Error types for framebuffer export.

use std::path::PathBuf;
use thiserror::Error;

/// Reasons a capture attempt was abandoned.
///
/// Every variant is terminal for that attempt only; none is fatal to the host.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The display subsystem has no framebuffer to hand out.
    #[error("Failed to get framebuffer")]
    NoBuffer,
    /// The framebuffer exists but exposes no pixel store.
    #[error("Failed to get pixel data")]
    NoPixelData,
    /// width * height * 3 does not fit in memory.
    #[error("Frame too large: {width}x{height}")]
    FrameTooLarge { width: u32, height: u32 },
    /// The pixel store is shorter than width * height * 3.
    #[error("Pixel data truncated: expected {expected} bytes, got {actual}")]
    TruncatedPixelData { expected: usize, actual: usize },
    /// The output file could not be created.
    #[error("Failed to open file {}: {source}", path.display())]
    CannotOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Writing or closing the output file failed; a partial file may remain.
    #[error("Failed to write file {}: {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ExportError {
    /// Whether a (possibly partial) file may have been left on storage.
    pub fn may_leave_file(&self) -> bool {
        matches!(self, ExportError::WriteFailed { .. })
    }
}
