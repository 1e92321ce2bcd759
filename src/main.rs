use clap::Parser;
use std::io;

use logo_screenshot::cli::{self, Args, Command};
use logo_screenshot::config::{self, Config};

fn main() {
    let args = Args::parse();

    let config_path = args.config.clone().unwrap_or_else(config::default_path);
    let config = match Config::load(Some(&config_path)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log.level))
        .init();

    let result = match args.command {
        Command::Export { frame } => {
            let root = cli::storage_root(&frame, &config);
            cli::run_export(&frame, &root).map(|path| println!("{}", path.display()))
        }
        Command::Replay { frame, events } => {
            let root = cli::storage_root(&frame, &config);
            let stdout = io::stdout();
            let mut out = stdout.lock();
            let summary = match events {
                Some(path) => std::fs::File::open(&path)
                    .map_err(cli::CommandError::from)
                    .and_then(|file| {
                        cli::run_replay(&frame, &root, io::BufReader::new(file), &mut out)
                    }),
                None => cli::run_replay(&frame, &root, io::stdin().lock(), &mut out),
            };
            summary.map(|s| {
                eprintln!("{} events, {} consumed", s.events, s.consumed);
            })
        }
        Command::Listen { frame } => {
            let root = cli::storage_root(&frame, &config);
            cli::run_listen(&frame, &root)
        }
        Command::Config { action } => cli::handle_config_action(action, &config, &config_path),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
