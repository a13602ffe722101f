use std::io;
use std::path::Path;

use snafu::Snafu;
use snafu::prelude::*;
use tracing::debug;

use crate::application::RuntimeConfig;
use crate::application::commands::{list_children, list_files, show_node};
use crate::cli::{Cli, Command};
use crate::config::{WalkConfig, WalkConfigError};
use crate::filesystem::{PathNodeError, WalkError};

pub struct Application;

impl Application {
    pub fn run(cli: Cli) -> Result<(), ApplicationError> {
        let file_config = match &cli.config {
            Some(path) => WalkConfig::from_path(path),
            None => WalkConfig::read(Path::new(".")),
        }
        .context(ConfigSnafu)?;
        debug!("Loaded config: {:?}", file_config);

        let runtime_config = RuntimeConfig::new(cli, file_config);
        debug!("Runtime config: {:?}", runtime_config);

        let stdout = io::stdout();
        let mut out = stdout.lock();
        match &runtime_config.command {
            Command::Files { path, .. } => {
                list_files(path, runtime_config.walk_options.clone(), &mut out)?;
            }
            Command::Ls { path, .. } => {
                list_children(path, runtime_config.color.should_colorize(), &mut out)?;
            }
            Command::Show { path, selectors } => {
                show_node(path, selectors, &mut out)?;
            }
        }

        Ok(())
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered during configuration stage"))]
    ConfigError { source: WalkConfigError },
    #[snafu(display("Failed to navigate the filesystem"))]
    NodeError { source: PathNodeError },
    #[snafu(display("Failed to enumerate files"))]
    WalkError { source: WalkError },
    #[snafu(display("Failed to write to standard output"))]
    OutputError { source: io::Error },
}
