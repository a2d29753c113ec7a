use serde::{Deserialize, Serialize};

use super::constants::*;
use super::error::FormatError;

/// How the integer value is pulled out of a matched metadata line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldRule {
    /// The integer between the first `=` and the next comma (`start timestamp = 1234, ...`)
    AfterEquals,
    /// The last whitespace separated token of the line (`Nsamples 128`)
    TrailingToken,
}

/// A single metadata field: which line it lives on, the marker that line must contain,
/// and the rule used to read the value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMatcher {
    pub marker: String,
    pub line: usize,
    pub rule: FieldRule,
}

impl FieldMatcher {
    pub fn new(marker: &str, line: usize, rule: FieldRule) -> Self {
        Self {
            marker: String::from(marker),
            line,
            rule,
        }
    }

    /// Read the field from the lines of a record block.
    ///
    /// A missing line or a line without the marker is structural corruption of the dump,
    /// not a per-record issue, so both are FormatErrors.
    pub fn extract(&self, lines: &[&str], block: usize) -> Result<i64, FormatError> {
        let line = match lines.get(self.line) {
            Some(l) if l.contains(&self.marker) => *l,
            _ => {
                return Err(FormatError::MissingMarker {
                    block,
                    marker: self.marker.clone(),
                    line: self.line,
                })
            }
        };

        let token = match self.rule {
            FieldRule::AfterEquals => line
                .split_once('=')
                .and_then(|(_, rest)| rest.split(',').next()),
            FieldRule::TrailingToken => line.split_whitespace().last(),
        };

        token
            .and_then(|t| t.trim().parse::<i64>().ok())
            .ok_or_else(|| FormatError::BadField {
                block,
                marker: self.marker.clone(),
                line: self.line,
                text: String::from(line),
            })
    }
}

/// Layout of one waveform record in a dump.
///
/// The default is the DDC2 layout. Other layouts can be given in the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpSchema {
    pub device_tick: FieldMatcher,
    pub local_tick: FieldMatcher,
    pub sample_count: FieldMatcher,
    pub first_sample_line: usize,
    pub sample_delimiter: char,
}

impl Default for DumpSchema {
    fn default() -> Self {
        Self {
            device_tick: FieldMatcher::new(
                DEVICE_TICK_MARKER,
                DEVICE_TICK_LINE,
                FieldRule::AfterEquals,
            ),
            local_tick: FieldMatcher::new(
                LOCAL_TICK_MARKER,
                LOCAL_TICK_LINE,
                FieldRule::AfterEquals,
            ),
            sample_count: FieldMatcher::new(
                SAMPLE_COUNT_MARKER,
                SAMPLE_COUNT_LINE,
                FieldRule::TrailingToken,
            ),
            first_sample_line: FIRST_SAMPLE_LINE,
            sample_delimiter: SAMPLE_DELIMITER,
        }
    }
}

impl DumpSchema {
    /// Parse one sample row into `(sample_index, raw_adc, local_tick)`.
    ///
    /// Returns None if the row has fewer than three integer fields. Fields past the third
    /// (including the empty one left by a trailing delimiter) are ignored.
    pub fn parse_sample_row(&self, row: &str) -> Option<[i64; FIELDS_PER_SAMPLE]> {
        let mut fields = row.split(self.sample_delimiter).map(str::trim);
        let mut values = [0i64; FIELDS_PER_SAMPLE];
        for value in values.iter_mut() {
            *value = fields.next()?.parse().ok()?;
        }
        Some(values)
    }
}
