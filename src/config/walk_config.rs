use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

use crate::{application::data::ColorChoice, filesystem::EntryPolicy};

const CONFIG_FILE_NAME: &str = "pathwalk.yaml";

const TRAVERSAL_SECTION: &str = "traversal";
const OUTPUT_SECTION: &str = "output";
const SPECIAL_ENTRIES_KEY: &str = "special_entries";
const MAX_DEPTH_KEY: &str = "max_depth";
const COLOR_KEY: &str = "color";

fn get_config_file_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE_NAME)
}

/// Settings read from `pathwalk.yaml`. Absent keys stay `None` so command-line
/// flags can tell "not configured" apart from an explicit value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkConfig {
    pub entry_policy: Option<EntryPolicy>,
    pub max_depth: Option<usize>,
    pub color: Option<ColorChoice>,
}

impl WalkConfig {
    /// Reads `pathwalk.yaml` from `dir`, falling back to defaults when the file
    /// does not exist.
    pub fn read(dir: &Path) -> Result<Self, WalkConfigError> {
        let path = get_config_file_path(dir);
        if !path.exists() {
            info!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::from_path(&path)
    }

    pub fn from_path(path: &Path) -> Result<Self, WalkConfigError> {
        debug!("Reading config file: {}", path.display());
        let contents = fs::read_to_string(path).context(ReadSnafu {
            file_path: path.display().to_string(),
        })?;
        debug!("Successfully read config file: {} bytes", contents.len());

        contents.as_str().try_into()
    }

    fn apply_traversal(
        &mut self,
        section: &LinkedHashMap<Yaml, Yaml>,
    ) -> Result<(), WalkConfigError> {
        for (key, value) in section {
            match key.as_str() {
                Some(SPECIAL_ENTRIES_KEY) => {
                    self.entry_policy = Some(
                        value
                            .as_str()
                            .and_then(EntryPolicy::from_name)
                            .context(invalid_value(SPECIAL_ENTRIES_KEY, value))?,
                    );
                }
                Some(MAX_DEPTH_KEY) => {
                    self.max_depth = match value {
                        Yaml::Value(Scalar::Null) => None,
                        Yaml::Value(Scalar::Integer(depth)) => Some(
                            usize::try_from(*depth)
                                .ok()
                                .context(invalid_value(MAX_DEPTH_KEY, value))?,
                        ),
                        _ => return invalid_value(MAX_DEPTH_KEY, value).fail(),
                    };
                }
                _ => debug!("Ignoring unknown traversal setting: {:?}", key),
            }
        }
        Ok(())
    }

    fn apply_output(&mut self, section: &LinkedHashMap<Yaml, Yaml>) -> Result<(), WalkConfigError> {
        for (key, value) in section {
            match key.as_str() {
                Some(COLOR_KEY) => {
                    self.color = Some(
                        value
                            .as_str()
                            .and_then(ColorChoice::from_name)
                            .context(invalid_value(COLOR_KEY, value))?,
                    );
                }
                _ => debug!("Ignoring unknown output setting: {:?}", key),
            }
        }
        Ok(())
    }
}

fn invalid_value(key: &str, value: &Yaml) -> InvalidValueSnafu<String, String> {
    InvalidValueSnafu {
        key: key.to_string(),
        value: format!("{value:?}"),
    }
}

fn section<'a, 'input>(
    value: &'a Yaml<'input>,
    name: &str,
) -> Result<&'a LinkedHashMap<Yaml<'input>, Yaml<'input>>, WalkConfigError> {
    value
        .as_mapping()
        .context(SectionNotMapSnafu { section: name })
}

impl TryFrom<&str> for WalkConfig {
    type Error = WalkConfigError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let documents = Yaml::load_from_str(contents).context(ParseSnafu)?;
        let document = documents.first().context(MalformedConfigSnafu)?;
        let top_level = document.as_mapping().context(TopLevelNotMapSnafu)?;

        let mut config = WalkConfig::default();
        for (key, value) in top_level {
            match key.as_str() {
                Some(TRAVERSAL_SECTION) => {
                    config.apply_traversal(section(value, TRAVERSAL_SECTION)?)?
                }
                Some(OUTPUT_SECTION) => config.apply_output(section(value, OUTPUT_SECTION)?)?,
                _ => debug!("Ignoring unknown config section: {:?}", key),
            }
        }

        Ok(config)
    }
}

#[derive(Debug, Snafu)]
pub enum WalkConfigError {
    #[snafu(display("Failed to read the config file: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to parse the config file"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Improperly formatted config file"))]
    MalformedConfig,
    #[snafu(display("Top level of config should be a map"))]
    TopLevelNotMap,
    #[snafu(display("Section '{}' should be a map", section))]
    SectionNotMap { section: String },
    #[snafu(display("Invalid value for '{}': {}", key, value))]
    InvalidValue { key: String, value: String },
}
