use std::path::PathBuf;
use thiserror::Error;

use super::constants::*;

#[derive(Debug, Clone, Error)]
pub enum FormatError {
    #[error("Dump does not contain a record separator ({len} dashes)", len=RECORD_SEPARATOR.len())]
    MissingSeparator,
    #[error("Dump preamble is missing the baseline line")]
    MissingBaselineLine,
    #[error("Dump preamble baseline line has no trailing integer: {0:?}")]
    BadBaseline(String),
    #[error("Dump preamble is missing the anchor date/time line")]
    MissingAnchorLine,
    #[error("Dump preamble anchor line has no trailing date and time: {0:?}")]
    MissingAnchorTokens(String),
    #[error("Dump preamble anchor {0:?} is not a valid date/time: {1}")]
    BadAnchor(String, time::error::Parse),
    #[error("Record {block} is missing marker {marker:?} on line {line}")]
    MissingMarker {
        block: usize,
        marker: String,
        line: usize,
    },
    #[error("Record {block} has a malformed {marker:?} value on line {line}: {text:?}")]
    BadField {
        block: usize,
        marker: String,
        line: usize,
        text: String,
    },
    #[error("Record {block} has a malformed sample row on line {line}: {text:?}")]
    BadSampleRow {
        block: usize,
        line: usize,
        text: String,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum IntegrationError {
    #[error("Spline needs at least {min} samples, waveform has {0}", min=MIN_SPLINE_POINTS)]
    TooFewSamples(usize),
    #[error("Spline abscissa must be strictly increasing; found {0} after {1}")]
    NonIncreasing(f64, f64),
    #[error("Spline was given {0} abscissae but {1} ordinates")]
    LengthMismatch(usize, usize),
}

#[derive(Debug, Error)]
pub enum Level1Error {
    #[error("Level1 pipeline failed due to format error: {0}")]
    Format(#[from] FormatError),
    #[error("Level1 pipeline failed to integrate record {block}: {source}")]
    Integration {
        block: usize,
        source: IntegrationError,
    },
}

#[derive(Debug, Error)]
pub enum DumpStackError {
    #[error("DumpStack could not open input directory {0:?}")]
    BadDirectory(PathBuf),
    #[error("DumpStack failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum HDF5WriterError {
    #[error("HDF5Writer failed due to HDF5 error: {0}")]
    HDF5Error(#[from] hdf5::Error),
    #[error("HDF5Writer failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("HDF5Writer failed to convert to yaml: {0}")]
    ParsingError(#[from] serde_yaml::Error),
    #[error("HDF5Writer failed to build the offsets matrix: {0}")]
    ShapeError(#[from] ndarray::ShapeError),
    #[error("HDF5Writer was given an invalid output path {0:?}")]
    BadFilePath(PathBuf),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration as file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("Config failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Config failed to parse YAML: {0}")]
    ParsingError(#[from] serde_yaml::Error),
}

#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("Processor failed due to DumpStack error: {0}")]
    DumpError(#[from] DumpStackError),
    #[error("Processor failed due to Level1 error: {0}")]
    Level1Error(#[from] Level1Error),
    #[error("Processor failed due to format error: {0}")]
    FormatError(#[from] FormatError),
    #[error("Processor failed due to HDF5Writer error: {0}")]
    HDFError(#[from] HDF5WriterError),
    #[error("Processor failed due to Config error: {0}")]
    ConfigError(#[from] ConfigError),
}
