use std::fmt::Display;

use super::conditioner::sample_time_ns;
use super::error::{FormatError, Level1Error};
use super::schema::DumpSchema;

/// One digitized sample as written by the DDC2
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSample {
    pub sample_index: i64,
    /// Sample time relative to the start of the waveform
    pub time_ns: i64,
    pub raw_adc: i64,
    pub local_tick: i64,
}

/// A waveform record as parsed from a dump block, before any conditioning
#[derive(Debug, Clone, PartialEq)]
pub struct RawWaveform {
    pub device_tick: i64,
    pub local_tick: i64,
    pub declared_sample_count: usize,
    pub samples: Vec<RawSample>,
}

/// Why a record was left out of the table
#[derive(Debug, Clone, PartialEq)]
pub enum DropReason {
    /// The number of sample rows does not match the declared Nsamples
    IncompleteWaveform { declared: usize, parsed: usize },
    /// The waveform could not be integrated and the run is configured to drop it
    Unintegrable(String),
}

impl Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IncompleteWaveform { declared, parsed } => write!(
                f,
                "incomplete waveform ({parsed} samples, {declared} declared)"
            ),
            Self::Unintegrable(reason) => write!(f, "unintegrable waveform ({reason})"),
        }
    }
}

/// Result of running one block through a pipeline stage.
///
/// Dropped records are recoverable, Fatal ends the run.
#[derive(Debug)]
pub enum RecordOutcome<T> {
    Accepted(T),
    Dropped(DropReason),
    Fatal(Level1Error),
}

impl<T> From<FormatError> for RecordOutcome<T> {
    fn from(value: FormatError) -> Self {
        Self::Fatal(Level1Error::Format(value))
    }
}

/// Parse a record block using the given schema.
///
/// `block_number` is only used to label errors.
pub fn extract_record(
    block: &str,
    block_number: usize,
    schema: &DumpSchema,
) -> RecordOutcome<RawWaveform> {
    match parse_block(block, block_number, schema) {
        Ok(waveform) => {
            if waveform.samples.len() == waveform.declared_sample_count {
                RecordOutcome::Accepted(waveform)
            } else {
                RecordOutcome::Dropped(DropReason::IncompleteWaveform {
                    declared: waveform.declared_sample_count,
                    parsed: waveform.samples.len(),
                })
            }
        }
        Err(e) => RecordOutcome::from(e),
    }
}

fn parse_block(
    block: &str,
    block_number: usize,
    schema: &DumpSchema,
) -> Result<RawWaveform, FormatError> {
    let lines: Vec<&str> = block.lines().collect();

    let device_tick = schema.device_tick.extract(&lines, block_number)?;
    let local_tick = schema.local_tick.extract(&lines, block_number)?;
    let declared = schema.sample_count.extract(&lines, block_number)?;
    let declared_sample_count =
        usize::try_from(declared).map_err(|_| FormatError::BadField {
            block: block_number,
            marker: schema.sample_count.marker.clone(),
            line: schema.sample_count.line,
            text: lines[schema.sample_count.line].to_string(),
        })?;

    // Nsamples is untrusted; size by what is actually in the block
    let mut samples = Vec::with_capacity(lines.len().saturating_sub(schema.first_sample_line));
    for (offset, row) in lines
        .iter()
        .skip(schema.first_sample_line)
        .enumerate()
        .filter(|(_, row)| !row.trim().is_empty())
    {
        let parsed = schema
            .parse_sample_row(row)
            .and_then(|[sample_index, raw_adc, local_tick]| {
                Some(RawSample {
                    sample_index,
                    time_ns: sample_time_ns(sample_index)?,
                    raw_adc,
                    local_tick,
                })
            });
        match parsed {
            Some(sample) => samples.push(sample),
            None => {
                return Err(FormatError::BadSampleRow {
                    block: block_number,
                    line: schema.first_sample_line + offset,
                    text: row.to_string(),
                })
            }
        }
    }

    Ok(RawWaveform {
        device_tick,
        local_tick,
        declared_sample_count,
        samples,
    })
}
