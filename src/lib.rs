//! logo-screenshot library crate.
//!
//! A LOGO+P chord detector over the host's scancode stream, and a framebuffer
//! exporter that writes the current display to a timestamped PPM file.

pub mod chord;
pub mod cli;
pub mod config;
pub mod export;
pub mod framebuffer;
pub mod host;
pub mod listener;
pub mod plugin;
pub mod ppm;
pub mod scancode;

pub use chord::{ChordDetector, HookVerdict};
pub use export::{ExportError, Exporter, FramebufferExporter};
pub use framebuffer::{BgrFrame, FrameBuffer, FramebufferSource, SharedDisplay};
pub use plugin::{InputHook, ScreenshotPlugin};
pub use scancode::InputEvent;
