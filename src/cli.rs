// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::types::ConfigKind;

/// Command-line arguments for `gmlaunch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "gmlaunch",
    version,
    about = "Start locally a grew_match instance.",
    long_about = None
)]
pub struct CliArgs {
    /// The data to serve in the interface: a corpus directory, or a JSON
    /// file describing one corpus or a set of corpora.
    #[arg(value_name = "DATA")]
    pub data: PathBuf,

    /// PORT number for the backend server.
    #[arg(long = "backend_port", value_name = "PORT", default_value_t = 8899)]
    pub backend_port: u16,

    /// PORT number for the frontend server.
    #[arg(long = "frontend_port", value_name = "PORT", default_value_t = 8000)]
    pub frontend_port: u16,

    /// Type of corpus, used when DATA is a directory.
    #[arg(long, value_enum, default_value_t = ConfigKind::Ud)]
    pub config: ConfigKind,

    /// Right-to-left script, used when DATA is a directory.
    #[arg(long)]
    pub rtl: bool,

    /// Reset the dependent repositories to upstream and clean the compiled
    /// corpora before the first compilation.
    #[arg(long = "hard_reset")]
    pub hard_reset: bool,

    /// Do not clone or update the dependent repositories.
    #[arg(long = "no_update")]
    pub no_update: bool,

    /// Working directory holding the clones, corpora and logs.
    #[arg(
        long = "work_dir",
        env = "GMLAUNCH_HOME",
        value_name = "PATH",
        default_value = "local_files"
    )]
    pub work_dir: PathBuf,

    /// Storage directory for compiled corpora (default: <work_dir>/corpora).
    #[arg(long = "corpora_dir", env = "GMLAUNCH_CORPORA", value_name = "PATH")]
    pub corpora_dir: Option<PathBuf>,

    /// Directory for server logs (default: <work_dir>/log).
    #[arg(long = "log_dir", env = "GMLAUNCH_LOG_DIR", value_name = "PATH")]
    pub log_dir: Option<PathBuf>,

    /// Launcher profile (TOML) overriding tool commands and layout.
    #[arg(long, env = "GMLAUNCH_PROFILE", value_name = "PATH")]
    pub profile: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `GMLAUNCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve configuration and print the launch plan without running anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_stock_setup() {
        let args = CliArgs::try_parse_from(["gmlaunch", "corpus"]).unwrap();
        assert_eq!(args.backend_port, 8899);
        assert_eq!(args.frontend_port, 8000);
        assert_eq!(args.config, ConfigKind::Ud);
        assert!(!args.rtl);
        assert!(!args.hard_reset);
    }

    #[test]
    fn underscore_options_are_accepted() {
        let args = CliArgs::try_parse_from([
            "gmlaunch",
            "corpus.json",
            "--backend_port",
            "9000",
            "--config",
            "sud",
            "--rtl",
        ])
        .unwrap();
        assert_eq!(args.backend_port, 9000);
        assert_eq!(args.config, ConfigKind::Sud);
        assert!(args.rtl);
    }
}
