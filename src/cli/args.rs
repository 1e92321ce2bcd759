//! CLI argument parsing with clap.

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// Screenshot hook harness: LOGO+P captures the framebuffer to a PPM file
#[derive(Parser, Debug)]
#[command(name = "logo-screenshot")]
#[command(version, about = "Capture the framebuffer to PPM on LOGO+P", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Config file path
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,
}

/// The raw frame to present on the simulated display.
#[derive(ClapArgs, Debug, Clone)]
pub struct FrameArgs {
    /// Raw BGR888 framebuffer dump
    #[arg(long, short)]
    pub input: PathBuf,

    /// Frame width in pixels
    #[arg(long, short = 'W')]
    pub width: u32,

    /// Frame height in pixels
    #[arg(long, short = 'H')]
    pub height: u32,

    /// Directory to write screenshots to (overrides config storage_root)
    #[arg(long, short)]
    pub out: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Capture the frame once
    Export {
        #[command(flatten)]
        frame: FrameArgs,
    },
    /// Feed event lines through the plugin and print each verdict
    Replay {
        #[command(flatten)]
        frame: FrameArgs,

        /// Event file, one event per line (default: stdin)
        #[arg(long, short)]
        events: Option<PathBuf>,
    },
    /// Watch the desktop keyboard for LOGO+P until Ctrl+C
    Listen {
        #[command(flatten)]
        frame: FrameArgs,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_subcommand() {
        let args = Args::parse_from([
            "logo-screenshot",
            "export",
            "--input",
            "frame.bgr",
            "--width",
            "320",
            "--height",
            "240",
        ]);
        match args.command {
            Command::Export { frame } => {
                assert_eq!(frame.input, PathBuf::from("frame.bgr"));
                assert_eq!(frame.width, 320);
                assert_eq!(frame.height, 240);
                assert!(frame.out.is_none());
            }
            _ => panic!("Expected Export subcommand"),
        }
        assert!(args.config.is_none());
    }

    #[test]
    fn test_short_flags() {
        let args = Args::parse_from([
            "logo-screenshot",
            "replay",
            "-i",
            "f.bgr",
            "-W",
            "2",
            "-H",
            "1",
            "-o",
            "/tmp/shots",
            "-e",
            "events.txt",
        ]);
        match args.command {
            Command::Replay { frame, events } => {
                assert_eq!(frame.out, Some(PathBuf::from("/tmp/shots")));
                assert_eq!(events, Some(PathBuf::from("events.txt")));
            }
            _ => panic!("Expected Replay subcommand"),
        }
    }

    #[test]
    fn test_config_option_after_subcommand() {
        let args = Args::parse_from(["logo-screenshot", "config", "show", "-c", "/tmp/c.toml"]);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/c.toml")));
        assert!(matches!(
            args.command,
            Command::Config {
                action: ConfigAction::Show
            }
        ));
    }

    #[test]
    fn test_missing_dimensions_rejected() {
        let result = Args::try_parse_from(["logo-screenshot", "listen", "--input", "f.bgr"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_init_subcommand() {
        let args = Args::parse_from(["logo-screenshot", "config", "init"]);
        assert!(matches!(
            args.command,
            Command::Config {
                action: ConfigAction::Init
            }
        ));
    }
}
