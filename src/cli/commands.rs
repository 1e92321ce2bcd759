//! Subcommand handlers for export, replay, listen and config actions.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::time::Duration;
use thiserror::Error;

use super::args::{ConfigAction, FrameArgs};
use crate::chord::ChordDetector;
use crate::config::Config;
use crate::export::{ExportError, Exporter, FramebufferExporter};
use crate::framebuffer::{BgrFrame, SharedDisplay};
use crate::host::LocalHost;
use crate::listener::KeyListener;
use crate::plugin::{PluginError, ScreenshotPlugin};
use crate::scancode::{parse_event, InputEvent, ParseEventError};

/// Global flag set when Ctrl+C is received.
static CTRLC_RECEIVED: AtomicBool = AtomicBool::new(false);

/// Errors surfaced by subcommands.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Failed to read frame '{}': {source}", path.display())]
    Frame { path: PathBuf, source: io::Error },
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Plugin(#[from] PluginError),
    #[error("line {line}: {source}")]
    Event {
        line: usize,
        source: ParseEventError,
    },
    #[error("Key listener failed: {0}")]
    Listener(String),
    #[error("Failed to install Ctrl+C handler: {0}")]
    Ctrlc(#[from] ctrlc::Error),
    #[error("Failed to serialize config: {0}")]
    ConfigFormat(#[from] toml::ser::Error),
    #[error("Config file already exists: {}", .0.display())]
    ConfigExists(PathBuf),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Outcome of a replay run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplaySummary {
    pub events: usize,
    pub consumed: usize,
}

/// Storage directory: `--out` wins over the config file.
pub fn storage_root(frame: &FrameArgs, config: &Config) -> PathBuf {
    frame
        .out
        .clone()
        .unwrap_or_else(|| config.capture.storage_root.clone())
}

fn load_display(frame: &FrameArgs) -> Result<SharedDisplay, CommandError> {
    let bgr = BgrFrame::from_raw_file(&frame.input, frame.width, frame.height).map_err(|source| {
        CommandError::Frame {
            path: frame.input.clone(),
            source,
        }
    })?;
    Ok(SharedDisplay::with_frame(bgr))
}

/// Register the plugin on a fresh host displaying `frame`.
fn boot_host(
    frame: &FrameArgs,
    root: &Path,
) -> Result<(LocalHost, ScreenshotPlugin), CommandError> {
    let mut host = LocalHost::new(load_display(frame)?);
    let exporter = FramebufferExporter::new(host.display(), root);
    let mut plugin = ScreenshotPlugin::new();
    plugin.init(&mut host, ChordDetector::new(exporter))?;
    Ok((host, plugin))
}

/// Capture the frame once.
pub fn run_export(frame: &FrameArgs, root: &Path) -> Result<PathBuf, CommandError> {
    let mut exporter = FramebufferExporter::new(load_display(frame)?, root);
    Ok(exporter.export()?)
}

/// Feed `events` through the plugin, writing one verdict line per event.
///
/// Blank lines and lines starting with `#` are skipped.
pub fn run_replay<R: BufRead, W: Write>(
    frame: &FrameArgs,
    root: &Path,
    events: R,
    out: &mut W,
) -> Result<ReplaySummary, CommandError> {
    let (mut host, mut plugin) = boot_host(frame, root)?;
    let mut summary = ReplaySummary::default();

    let result = replay_lines(&mut host, events, out, &mut summary);
    plugin.cleanup(&mut host);
    result.map(|()| summary)
}

fn replay_lines<R: BufRead, W: Write>(
    host: &mut LocalHost,
    events: R,
    out: &mut W,
    summary: &mut ReplaySummary,
) -> Result<(), CommandError> {
    for (index, line) in events.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let event = parse_event(trimmed).map_err(|source| CommandError::Event {
            line: index + 1,
            source,
        })?;
        let consumed = host.dispatch(&event);

        summary.events += 1;
        if consumed {
            summary.consumed += 1;
        }
        writeln!(out, "{} {}", trimmed, if consumed { "consumed" } else { "pass" })?;
    }
    Ok(())
}

/// Run the plugin against the desktop keyboard until Ctrl+C.
pub fn run_listen(frame: &FrameArgs, root: &Path) -> Result<(), CommandError> {
    ctrlc::set_handler(move || {
        CTRLC_RECEIVED.store(true, Ordering::SeqCst);
        eprintln!("\nReceived Ctrl+C, shutting down...");
    })?;

    let (mut host, mut plugin) = boot_host(frame, root)?;
    let (tx, rx) = mpsc::channel();
    let mut listener = KeyListener::new();
    listener.start(tx).map_err(CommandError::Listener)?;

    eprintln!("Listening for LOGO+P, saving to {} (Ctrl+C to stop)", root.display());

    while !CTRLC_RECEIVED.load(Ordering::SeqCst) {
        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(code) => {
                host.dispatch(&InputEvent::Scancode(code));
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                listener.stop();
                plugin.cleanup(&mut host);
                return Err(CommandError::Listener("listener thread exited".to_string()));
            }
        }
    }

    listener.stop();
    plugin.cleanup(&mut host);
    Ok(())
}

/// Handle config subcommand actions.
pub fn handle_config_action(
    action: ConfigAction,
    config: &Config,
    config_path: &Path,
) -> Result<(), CommandError> {
    match action {
        ConfigAction::Show => {
            println!("Current configuration:");
            println!("  Storage root: {}", config.capture.storage_root.display());
            println!("  Log level: {}", config.log.level);
            println!();

            if config_path.exists() {
                println!("Config file: {} (exists)", config_path.display());
            } else {
                println!("Config file: {} (not found)", config_path.display());
            }
        }
        ConfigAction::Init => {
            write_default_config(config_path)?;
            println!("Created config file: {}", config_path.display());
        }
    }
    Ok(())
}

/// Write the default configuration, refusing to overwrite an existing file.
pub fn write_default_config(config_path: &Path) -> Result<(), CommandError> {
    if config_path.exists() {
        return Err(CommandError::ConfigExists(config_path.to_path_buf()));
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let body = Config::default().to_toml()?;
    std::fs::write(
        config_path,
        format!("# logo-screenshot configuration\n\n{}", body),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn frame_args(dir: &TempDir, bgr: &[u8], width: u32, height: u32) -> FrameArgs {
        let input = dir.path().join("frame.bgr");
        std::fs::write(&input, bgr).unwrap();
        FrameArgs {
            input,
            width,
            height,
            out: None,
        }
    }

    #[test]
    fn test_storage_root_prefers_out_flag() {
        let dir = TempDir::new().unwrap();
        let mut frame = frame_args(&dir, &[], 0, 0);
        let config = Config::default();
        assert_eq!(storage_root(&frame, &config), PathBuf::from("/sd"));

        frame.out = Some(PathBuf::from("/tmp/shots"));
        assert_eq!(storage_root(&frame, &config), PathBuf::from("/tmp/shots"));
    }

    #[test]
    fn test_run_export_writes_file() {
        let dir = TempDir::new().unwrap();
        let frame = frame_args(&dir, &[10, 20, 30, 40, 50, 60], 2, 1);
        let shots = dir.path().join("shots");
        std::fs::create_dir(&shots).unwrap();

        let path = run_export(&frame, &shots).unwrap();
        let bytes = std::fs::read(path).unwrap();
        assert!(bytes.starts_with(b"P6\n2 1\n255\n"));
        assert!(bytes.ends_with(&[30, 20, 10, 60, 50, 40]));
    }

    #[test]
    fn test_run_export_missing_frame() {
        let dir = TempDir::new().unwrap();
        let frame = FrameArgs {
            input: dir.path().join("nope.bgr"),
            width: 1,
            height: 1,
            out: None,
        };
        let err = run_export(&frame, dir.path()).unwrap_err();
        assert!(matches!(err, CommandError::Frame { .. }));
    }

    #[test]
    fn test_replay_reports_verdicts() {
        let dir = TempDir::new().unwrap();
        let frame = frame_args(&dir, &[0; 3], 1, 1);
        let events = "# chord\n0xe05b\n\nkey:p\n0x19\n0x99\n0xe0db\n";
        let mut out = Vec::new();

        let summary = run_replay(&frame, dir.path(), events.as_bytes(), &mut out).unwrap();
        assert_eq!(
            summary,
            ReplaySummary {
                events: 5,
                consumed: 1
            }
        );

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "0xe05b pass",
                "key:p pass",
                "0x19 consumed",
                "0x99 pass",
                "0xe0db pass"
            ]
        );

        let ppm_count = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.path().extension().map_or(false, |x| x == "ppm"))
            .count();
        assert_eq!(ppm_count, 1);
    }

    #[test]
    fn test_replay_bad_line_reports_line_number() {
        let dir = TempDir::new().unwrap();
        let frame = frame_args(&dir, &[0; 3], 1, 1);
        let mut out = Vec::new();

        let err = run_replay(&frame, dir.path(), "0x19\nbogus\n".as_bytes(), &mut out).unwrap_err();
        match err {
            CommandError::Event { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_write_default_config_refuses_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        write_default_config(&path).unwrap();
        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded, Config::default());

        assert!(matches!(
            write_default_config(&path),
            Err(CommandError::ConfigExists(_))
        ));
    }
}
