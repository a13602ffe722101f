use crate::application::data::ColorChoice;
use crate::cli::{Cli, Command};
use crate::config::WalkConfig;
use crate::filesystem::{EntryPolicy, WalkOptions};

/// Effective settings for one run: the config file overlaid with flags.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub command: Command,
    pub walk_options: WalkOptions,
    pub color: ColorChoice,
}

impl RuntimeConfig {
    pub fn new(cli: Cli, file_config: WalkConfig) -> Self {
        let mut walk_options = WalkOptions {
            entry_policy: file_config.entry_policy.unwrap_or_default(),
            max_depth: file_config.max_depth,
        };
        let mut color = file_config.color.unwrap_or_default();

        match &cli.command {
            Command::Files {
                skip_special,
                max_depth,
                ..
            } => {
                if *skip_special {
                    walk_options.entry_policy = EntryPolicy::Skip;
                }
                if max_depth.is_some() {
                    walk_options.max_depth = *max_depth;
                }
            }
            Command::Ls {
                color: Some(choice),
                ..
            } => color = *choice,
            _ => {}
        }

        Self {
            command: cli.command,
            walk_options,
            color,
        }
    }
}
