use super::charge::integrate_charge;
use super::clock::ClockAnchor;
use super::conditioner::{Polarity, SignalConditioner};
use super::error::Level1Error;
use super::extractor::{extract_record, DropReason, RawWaveform, RecordOutcome};
use super::schema::DumpSchema;
use super::table::{WaveformRow, WaveformTable};
use super::tokenizer::TokenizedDump;

/// Run options the assembler needs from the configuration
#[derive(Debug, Clone, Default)]
pub struct AssemblerOptions {
    pub schema: DumpSchema,
    pub polarity: Polarity,
    /// Drop waveforms the spline cannot be fit to instead of failing the run
    pub drop_unintegrable: bool,
    /// Log every dropped record at warn level instead of debug
    pub trace_dropped: bool,
}

/// Counts reported at the end of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Level1Summary {
    pub raw_records: usize,
    pub accepted: usize,
    pub dropped_incomplete: usize,
    pub dropped_unintegrable: usize,
    pub skipped_blank: usize,
}

impl Level1Summary {
    pub fn dropped(&self) -> usize {
        self.dropped_incomplete + self.dropped_unintegrable
    }
}

/// A waveform that passed extraction and integration but has not been time stamped yet
#[derive(Debug)]
struct ChargedWaveform {
    raw: RawWaveform,
    voltages_mv: Vec<f64>,
    charge_nvs: f64,
}

/// TableAssembler takes record blocks one at a time and builds the WaveformTable.
///
/// Each block is extracted, validated, conditioned and integrated; the tagged outcome is
/// then dispatched here. The clock anchor is taken from the first accepted record.
#[derive(Debug)]
pub struct TableAssembler {
    options: AssemblerOptions,
    conditioner: SignalConditioner,
    anchor_wallclock_ns: i128,
    anchor: Option<ClockAnchor>,
    table: WaveformTable,
    summary: Level1Summary,
}

impl TableAssembler {
    pub fn new(dump: &TokenizedDump, options: AssemblerOptions) -> Self {
        Self {
            conditioner: SignalConditioner::new(dump.preamble.baseline, options.polarity),
            anchor_wallclock_ns: dump.preamble.anchor_wallclock_ns,
            anchor: None,
            table: WaveformTable::new(dump.preamble.clone()),
            summary: Level1Summary::default(),
            options,
        }
    }

    /// Process one record block.
    ///
    /// Returns Err only for fatal conditions; dropped records are counted and logged.
    pub fn append_block(&mut self, block: &str, block_number: usize) -> Result<(), Level1Error> {
        if block.trim().is_empty() {
            log::debug!("Skipping blank block {block_number}");
            self.summary.skipped_blank += 1;
            return Ok(());
        }
        self.summary.raw_records += 1;

        match self.evaluate(block, block_number) {
            RecordOutcome::Accepted(waveform) => {
                self.append_waveform(waveform);
                self.summary.accepted += 1;
                Ok(())
            }
            RecordOutcome::Dropped(reason) => {
                match reason {
                    DropReason::IncompleteWaveform { .. } => self.summary.dropped_incomplete += 1,
                    DropReason::Unintegrable(_) => self.summary.dropped_unintegrable += 1,
                }
                if self.options.trace_dropped {
                    log::warn!("Dropping record {block_number}: {reason}");
                } else {
                    log::debug!("Dropping record {block_number}: {reason}");
                }
                Ok(())
            }
            RecordOutcome::Fatal(e) => Err(e),
        }
    }

    /// Extract, condition and integrate a block
    fn evaluate(&self, block: &str, block_number: usize) -> RecordOutcome<ChargedWaveform> {
        let raw = match extract_record(block, block_number, &self.options.schema) {
            RecordOutcome::Accepted(raw) => raw,
            RecordOutcome::Dropped(reason) => return RecordOutcome::Dropped(reason),
            RecordOutcome::Fatal(e) => return RecordOutcome::Fatal(e),
        };

        let times: Vec<f64> = raw
            .samples
            .iter()
            .map(|s| s.time_ns as f64)
            .collect();
        let voltages_mv: Vec<f64> = raw
            .samples
            .iter()
            .map(|s| self.conditioner.voltage_mv(s.raw_adc))
            .collect();

        match integrate_charge(&times, &voltages_mv) {
            Ok(charge_nvs) => RecordOutcome::Accepted(ChargedWaveform {
                raw,
                voltages_mv,
                charge_nvs,
            }),
            Err(e) if self.options.drop_unintegrable => {
                RecordOutcome::Dropped(DropReason::Unintegrable(e.to_string()))
            }
            Err(source) => RecordOutcome::Fatal(Level1Error::Integration {
                block: block_number,
                source,
            }),
        }
    }

    /// Time stamp an accepted waveform and add it to the table
    fn append_waveform(&mut self, waveform: ChargedWaveform) {
        let ChargedWaveform {
            raw,
            voltages_mv,
            charge_nvs,
        } = waveform;
        let anchor_wallclock_ns = self.anchor_wallclock_ns;
        let anchor = *self.anchor.get_or_insert_with(|| {
            log::info!("Clock anchored to device tick {}", raw.device_tick);
            ClockAnchor::new(anchor_wallclock_ns, raw.device_tick)
        });

        let waveform_index = self.table.next_waveform_index();
        let rows = raw
            .samples
            .iter()
            .zip(voltages_mv)
            .map(|(sample, voltage_mv)| WaveformRow {
                waveform_index,
                sample_index: sample.sample_index,
                time_ns: sample.time_ns,
                raw_adc: sample.raw_adc,
                voltage_mv,
                timestamp: anchor.timestamp(raw.device_tick, raw.local_tick, sample.local_tick),
                charge_nvs,
            })
            .collect();
        self.table.push_waveform(rows);
    }

    pub fn summary(&self) -> &Level1Summary {
        &self.summary
    }

    pub fn anchor(&self) -> Option<&ClockAnchor> {
        self.anchor.as_ref()
    }

    /// Consume the assembler, handing off the finished table
    pub fn finish(self) -> (WaveformTable, Level1Summary) {
        (self.table, self.summary)
    }
}

/// Run every block of a dump through a TableAssembler
pub fn assemble(
    dump: &TokenizedDump,
    options: AssemblerOptions,
) -> Result<(WaveformTable, Level1Summary), Level1Error> {
    let mut assembler = TableAssembler::new(dump, options);
    for (block_number, block) in dump.blocks.iter().enumerate() {
        assembler.append_block(block, block_number)?;
    }
    Ok(assembler.finish())
}
