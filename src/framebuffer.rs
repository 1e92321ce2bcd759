//! Read-only framebuffer views.
//!
//! The display subsystem owns the raster; the exporter only borrows a handle
//! to it for the duration of one capture. Pixels are packed 3 bytes per pixel
//! in B, G, R order.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

/// Bytes per packed pixel.
pub const BYTES_PER_PIXEL: usize = 3;

/// A read-only raster in packed BGR888 format.
pub trait FrameBuffer {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Raw pixel bytes, row-major, or `None` if the buffer has no backing store.
    fn pixels(&self) -> Option<&[u8]>;
}

impl<T: FrameBuffer + ?Sized> FrameBuffer for Rc<T> {
    fn width(&self) -> u32 {
        (**self).width()
    }

    fn height(&self) -> u32 {
        (**self).height()
    }

    fn pixels(&self) -> Option<&[u8]> {
        (**self).pixels()
    }
}

/// Accessor for the currently displayed framebuffer.
pub trait FramebufferSource {
    type Frame: FrameBuffer;

    /// Handle to the current frame, or `None` if the display is not up.
    fn acquire(&self) -> Option<Self::Frame>;
}

/// Byte length of a packed BGR888 raster, or `None` if it does not fit in `usize`.
pub fn packed_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(BYTES_PER_PIXEL)
}

/// Owned BGR888 frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BgrFrame {
    width: u32,
    height: u32,
    pixels: Option<Vec<u8>>,
}

impl BgrFrame {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        BgrFrame {
            width,
            height,
            pixels: Some(pixels),
        }
    }

    /// A frame whose pixel store is unavailable.
    pub fn without_pixels(width: u32, height: u32) -> Self {
        BgrFrame {
            width,
            height,
            pixels: None,
        }
    }

    /// A frame filled with a single `[b, g, r]` colour.
    ///
    /// Dimensions whose byte length overflows get no pixel store.
    pub fn solid(width: u32, height: u32, bgr: [u8; 3]) -> Self {
        let Some(len) = packed_len(width, height) else {
            return BgrFrame::without_pixels(width, height);
        };
        let pixels = bgr.iter().copied().cycle().take(len).collect();
        BgrFrame::new(width, height, pixels)
    }

    /// Load a raw BGR888 dump from disk.
    pub fn from_raw_file(path: &Path, width: u32, height: u32) -> std::io::Result<Self> {
        let pixels = std::fs::read(path)?;
        Ok(BgrFrame::new(width, height, pixels))
    }
}

impl FrameBuffer for BgrFrame {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn pixels(&self) -> Option<&[u8]> {
        self.pixels.as_deref()
    }
}

/// Cloneable handle to a display's current frame.
///
/// Clones share the same slot, so a host can swap the frame while the
/// exporter holds its own handle.
#[derive(Debug, Clone, Default)]
pub struct SharedDisplay {
    current: Rc<RefCell<Option<Rc<BgrFrame>>>>,
}

impl SharedDisplay {
    pub fn new() -> Self {
        SharedDisplay::default()
    }

    pub fn with_frame(frame: BgrFrame) -> Self {
        let display = SharedDisplay::new();
        display.present(frame);
        display
    }

    /// Replace the displayed frame.
    pub fn present(&self, frame: BgrFrame) {
        *self.current.borrow_mut() = Some(Rc::new(frame));
    }
}

impl FramebufferSource for SharedDisplay {
    type Frame = Rc<BgrFrame>;

    fn acquire(&self) -> Option<Self::Frame> {
        self.current.borrow().clone()
    }
}
