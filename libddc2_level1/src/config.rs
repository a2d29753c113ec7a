use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::assembler::AssemblerOptions;
use super::conditioner::Polarity;
use super::error::ConfigError;
use super::schema::DumpSchema;

/// Structure representing the application configuration. Contains pathing and processing
/// options. Configs are seralizable and deserializable to YAML using serde and serde_yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub polarity: Polarity,
    pub drop_unintegrable: bool,
    pub trace_dropped: bool,
    pub schema: Option<DumpSchema>,
}

impl Default for Config {
    /// Generate a new Config object. Paths will be empty/invalid
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("None"),
            output_path: PathBuf::from("None"),
            polarity: Polarity::default(),
            drop_unintegrable: false,
            trace_dropped: false,
            schema: None,
        }
    }
}

impl Config {
    /// Read the configuration in a YAML file
    /// Returns a Config if successful
    pub fn read_config_file(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            return Err(ConfigError::BadFilePath(config_path.to_path_buf()));
        }

        let yaml_str = std::fs::read_to_string(config_path)?;

        Ok(serde_yaml::from_str::<Self>(&yaml_str)?)
    }

    /// Check that the input directory exists
    pub fn get_input_directory(&self) -> Result<&Path, ConfigError> {
        if self.input_path.is_dir() {
            Ok(self.input_path.as_path())
        } else {
            Err(ConfigError::BadFilePath(self.input_path.clone()))
        }
    }

    /// Get the path to the output hdf5 file. Its parent directory must exist
    pub fn get_output_file(&self) -> Result<&Path, ConfigError> {
        let parent = match self.output_path.parent() {
            Some(p) if p.as_os_str().is_empty() => Path::new("."),
            Some(p) => p,
            None => return Err(ConfigError::BadFilePath(self.output_path.clone())),
        };
        if parent.exists() && self.output_path.file_name().is_some() {
            Ok(self.output_path.as_path())
        } else {
            Err(ConfigError::BadFilePath(self.output_path.clone()))
        }
    }

    /// The record layout; the DDC2 default unless one is given
    pub fn get_schema(&self) -> DumpSchema {
        self.schema.clone().unwrap_or_default()
    }

    pub fn assembler_options(&self) -> AssemblerOptions {
        AssemblerOptions {
            schema: self.get_schema(),
            polarity: self.polarity,
            drop_unintegrable: self.drop_unintegrable,
            trace_dropped: self.trace_dropped,
        }
    }
}
