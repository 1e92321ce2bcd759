//! Binary PPM (P6) encoding of BGR888 rasters.

use std::io::{self, Write};

use crate::framebuffer::BYTES_PER_PIXEL;

/// Magic token for binary 8-bit RGB PPM.
pub const MAGIC: &str = "P6";
/// Maximum channel value, always 8-bit.
pub const MAX_VALUE: u8 = 255;

/// The three-line text header preceding pixel data.
pub fn header(width: u32, height: u32) -> String {
    format!("{}\n{} {}\n{}\n", MAGIC, width, height, MAX_VALUE)
}

/// Swap each (B, G, R) triple in `bgr` into (R, G, B) order in `rgb`.
///
/// Both slices must have the same length, a multiple of three.
pub fn bgr_to_rgb_row(bgr: &[u8], rgb: &mut [u8]) {
    for (src, dst) in bgr
        .chunks_exact(BYTES_PER_PIXEL)
        .zip(rgb.chunks_exact_mut(BYTES_PER_PIXEL))
    {
        dst[0] = src[2];
        dst[1] = src[1];
        dst[2] = src[0];
    }
}

/// Write a P6 image from packed BGR pixels.
///
/// `bgr` must hold at least `width * height * 3` bytes; trailing bytes are
/// ignored. Rows are written top to bottom.
pub fn write_bgr_as_rgb<W: Write>(
    writer: &mut W,
    width: u32,
    height: u32,
    bgr: &[u8],
) -> io::Result<()> {
    writer.write_all(header(width, height).as_bytes())?;

    let stride = (width as usize).saturating_mul(BYTES_PER_PIXEL);
    if stride == 0 {
        return Ok(());
    }

    let mut row = vec![0u8; stride.min(bgr.len())];
    for src in bgr.chunks_exact(stride).take(height as usize) {
        bgr_to_rgb_row(src, &mut row);
        writer.write_all(&row)?;
    }
    Ok(())
}
