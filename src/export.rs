//! Framebuffer export to timestamped PPM files.
//!
//! A capture reads the current frame, names the output after the local
//! wall-clock second, and streams a P6 image to the storage root. Failures
//! are logged and returned; no file cleanup or retry is attempted.
//!
//! Two captures within the same second map to the same name and the later
//! one overwrites the earlier.

mod errors;

pub use errors::ExportError;

use chrono::{Datelike, Local, NaiveDateTime, Timelike};
use std::cell::Cell;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use crate::framebuffer::{packed_len, FrameBuffer, FramebufferSource};
use crate::ppm;

/// Log target shared by every component of the plugin.
pub const LOG_TARGET: &str = "screenshot";

/// Default storage root on the device (SD card mount).
pub const DEFAULT_STORAGE_ROOT: &str = "/sd";

/// Something that can capture the display when asked.
pub trait Exporter {
    /// Capture the current frame, returning the written file's path.
    fn export(&mut self) -> Result<PathBuf, ExportError>;
}

/// Source of local wall-clock time.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// The system's local time zone clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A settable clock, for deterministic file names.
#[derive(Debug, Clone)]
pub struct FixedClock {
    at: Cell<NaiveDateTime>,
}

impl FixedClock {
    pub fn new(at: NaiveDateTime) -> Self {
        FixedClock { at: Cell::new(at) }
    }

    pub fn set(&self, at: NaiveDateTime) {
        self.at.set(at);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.at.get()
    }
}

/// File name for a capture taken at `at`: `screenshot-YYYYMMDDHHMMSS.ppm`.
pub fn screenshot_filename(at: &NaiveDateTime) -> String {
    format!(
        "screenshot-{:04}{:02}{:02}{:02}{:02}{:02}.ppm",
        at.year(),
        at.month(),
        at.day(),
        at.hour(),
        at.minute(),
        at.second()
    )
}

/// Exports frames from a [`FramebufferSource`] into a storage directory.
pub struct FramebufferExporter<S, C = LocalClock> {
    source: S,
    storage_root: PathBuf,
    clock: C,
}

impl<S: FramebufferSource> FramebufferExporter<S, LocalClock> {
    pub fn new(source: S, storage_root: impl Into<PathBuf>) -> Self {
        FramebufferExporter {
            source,
            storage_root: storage_root.into(),
            clock: LocalClock,
        }
    }
}

impl<S: FramebufferSource, C: Clock> FramebufferExporter<S, C> {
    /// Replace the clock used for file names.
    pub fn with_clock<C2: Clock>(self, clock: C2) -> FramebufferExporter<S, C2> {
        FramebufferExporter {
            source: self.source,
            storage_root: self.storage_root,
            clock,
        }
    }

    /// Path the next capture would be written to.
    pub fn next_path(&self) -> PathBuf {
        self.storage_root.join(screenshot_filename(&self.clock.now()))
    }

    fn capture(&self) -> Result<PathBuf, ExportError> {
        let frame = self.source.acquire().ok_or(ExportError::NoBuffer)?;
        let width = frame.width();
        let height = frame.height();
        let pixels = frame.pixels().ok_or(ExportError::NoPixelData)?;

        let expected =
            packed_len(width, height).ok_or(ExportError::FrameTooLarge { width, height })?;
        if pixels.len() < expected {
            return Err(ExportError::TruncatedPixelData {
                expected,
                actual: pixels.len(),
            });
        }

        let path = self.next_path();
        log::info!(
            target: LOG_TARGET,
            "Saving screenshot to {} ({}x{})",
            path.display(),
            width,
            height
        );

        let file = File::create(&path).map_err(|source| ExportError::CannotOpen {
            path: path.clone(),
            source,
        })?;

        let mut writer = BufWriter::new(file);
        ppm::write_bgr_as_rgb(&mut writer, width, height, pixels)
            .and_then(|()| writer.flush())
            .map_err(|source| ExportError::WriteFailed {
                path: path.clone(),
                source,
            })?;
        drop(writer);

        log::info!(target: LOG_TARGET, "Screenshot saved: {}", path.display());
        Ok(path)
    }
}

impl<S: FramebufferSource, C: Clock> Exporter for FramebufferExporter<S, C> {
    fn export(&mut self) -> Result<PathBuf, ExportError> {
        self.capture().inspect_err(|e| {
            log::error!(target: LOG_TARGET, "{}", e);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framebuffer::{BgrFrame, SharedDisplay};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .and_then(|date| date.and_hms_opt(h, mi, s))
            .unwrap()
    }

    #[test]
    fn test_filename_zero_pads_fields() {
        assert_eq!(
            screenshot_filename(&at(2024, 3, 5, 7, 8, 9)),
            "screenshot-20240305070809.ppm"
        );
        assert_eq!(
            screenshot_filename(&at(2025, 12, 31, 23, 59, 59)),
            "screenshot-20251231235959.ppm"
        );
    }

    #[test]
    fn test_export_writes_ppm() {
        let dir = TempDir::new().unwrap();
        let display = SharedDisplay::with_frame(BgrFrame::new(2, 1, vec![10, 20, 30, 40, 50, 60]));
        let mut exporter = FramebufferExporter::new(display, dir.path())
            .with_clock(FixedClock::new(at(2024, 3, 5, 7, 8, 9)));

        let path = exporter.export().unwrap();
        assert_eq!(path, dir.path().join("screenshot-20240305070809.ppm"));

        let bytes = std::fs::read(&path).unwrap();
        let mut expected = b"P6\n2 1\n255\n".to_vec();
        expected.extend_from_slice(&[30, 20, 10, 60, 50, 40]);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_no_buffer_creates_no_file() {
        let dir = TempDir::new().unwrap();
        let mut exporter = FramebufferExporter::new(SharedDisplay::new(), dir.path());

        assert!(matches!(exporter.export(), Err(ExportError::NoBuffer)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_no_pixel_data() {
        let dir = TempDir::new().unwrap();
        let display = SharedDisplay::with_frame(BgrFrame::without_pixels(4, 4));
        let mut exporter = FramebufferExporter::new(display, dir.path());

        assert!(matches!(exporter.export(), Err(ExportError::NoPixelData)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_truncated_pixels_rejected_before_open() {
        let dir = TempDir::new().unwrap();
        let display = SharedDisplay::with_frame(BgrFrame::new(2, 2, vec![0; 6]));
        let mut exporter = FramebufferExporter::new(display, dir.path());

        match exporter.export() {
            Err(ExportError::TruncatedPixelData { expected, actual }) => {
                assert_eq!(expected, 12);
                assert_eq!(actual, 6);
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_overflowing_dimensions_rejected_before_open() {
        let dir = TempDir::new().unwrap();
        let display = SharedDisplay::with_frame(BgrFrame::new(u32::MAX, u32::MAX, vec![0; 3]));
        let mut exporter = FramebufferExporter::new(display, dir.path());

        match exporter.export() {
            Err(ExportError::FrameTooLarge { width, height }) => {
                assert_eq!(width, u32::MAX);
                assert_eq!(height, u32::MAX);
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_missing_storage_root_cannot_open() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("not-mounted");
        let display = SharedDisplay::with_frame(BgrFrame::solid(1, 1, [0, 0, 0]));
        let mut exporter = FramebufferExporter::new(display, &root);

        match exporter.export() {
            Err(ExportError::CannotOpen { path, .. }) => assert!(path.starts_with(&root)),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_same_second_overwrites() {
        let dir = TempDir::new().unwrap();
        let display = SharedDisplay::with_frame(BgrFrame::solid(1, 1, [1, 1, 1]));
        let mut exporter = FramebufferExporter::new(display.clone(), dir.path())
            .with_clock(FixedClock::new(at(2024, 1, 1, 0, 0, 0)));

        let first = exporter.export().unwrap();
        display.present(BgrFrame::solid(1, 1, [9, 9, 9]));
        let second = exporter.export().unwrap();

        assert_eq!(first, second);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
        assert_eq!(std::fs::read(&second).unwrap().last(), Some(&9));
    }
}
