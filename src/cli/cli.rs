use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::application::data::{ColorChoice, LogLevel};

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Navigate a directory tree and enumerate its files")]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Command,

    #[clap(long, short, default_value = "warn", value_enum, global = true)]
    pub log_level: LogLevel,

    /// Config file to use instead of ./pathwalk.yaml
    #[clap(long, short, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print every regular file under PATH, one per line, depth first
    Files {
        path: OsString,
        /// Warn about and skip entries that are neither files nor directories
        #[clap(long)]
        skip_special: bool,
        /// Fail once a directory nested deeper than this is reached
        #[clap(long)]
        max_depth: Option<usize>,
    },
    /// List the immediate children of PATH
    Ls {
        path: OsString,
        #[clap(long, value_enum)]
        color: Option<ColorChoice>,
    },
    /// Navigate from PATH through each SELECTOR ('.', '..' or an entry name)
    /// and print the node reached
    Show {
        path: OsString,
        selectors: Vec<OsString>,
    },
}
