use std::path::Path;
use std::sync::{Arc, Mutex};

use super::assembler::{Level1Summary, TableAssembler};
use super::conditioner::Polarity;
use super::config::Config;
use super::dump_stack::DumpStack;
use super::error::{HDF5WriterError, ProcessorError};
use super::hdf_writer::{sidecar_path, HDFWriter};
use super::table::{TableSink, WaveformTable};
use super::tokenizer::tokenize;

/// Update the shared progress value. A poisoned lock only loses progress reporting.
fn report_progress(status: &Arc<Mutex<f32>>, progress: f32) {
    if let Ok(mut stat) = status.lock() {
        *stat = progress;
    }
}

/// Build the Level-1 table from the dump in the input directory.
///
/// Nothing is written here, so any error leaves no output behind.
pub fn build_table(
    config: &Config,
    stack: &DumpStack,
    status: &Arc<Mutex<f32>>,
) -> Result<(WaveformTable, Level1Summary), ProcessorError> {
    let raw_dump = stack.read_all()?;
    let dump = tokenize(&raw_dump)?;
    log::info!("Found {} record blocks", dump.n_blocks());

    let mut assembler = TableAssembler::new(&dump, config.assembler_options());
    let total_blocks = dump.n_blocks();
    let flush_frac: f32 = 0.01;
    let flush_val = ((total_blocks as f32 * flush_frac) as usize).max(1);
    let mut count = 0;
    for (block_number, block) in dump.blocks.iter().enumerate() {
        assembler.append_block(block, block_number)?;
        count += 1;
        if count >= flush_val {
            count = 0;
            report_progress(status, (block_number + 1) as f32 / total_blocks as f32);
        }
    }
    Ok(assembler.finish())
}

/// Write the table and the file list. The writer is closed (dropped) on return.
fn write_output(
    path: &Path,
    polarity: Polarity,
    table: &WaveformTable,
    stack: &DumpStack,
) -> Result<(), HDF5WriterError> {
    let mut writer = HDFWriter::new(path, polarity)?;
    writer.write_table(table)?;
    writer.write_fileinfo(stack)?;
    writer.close()
}

/// Remove whatever a failed write left behind
fn remove_partial_output(path: &Path) {
    let mut targets = vec![path.to_path_buf()];
    if let Ok(sidecar) = sidecar_path(path) {
        targets.push(sidecar);
    }
    for target in targets.iter().filter(|t| t.is_file()) {
        match std::fs::remove_file(target) {
            Ok(()) => log::info!("Removed partial output {}", target.display()),
            Err(e) => log::error!("Could not remove partial output {}: {e}", target.display()),
        }
    }
}

/// The main loop of the Level-1 processing.
///
/// Reads the capture, builds the table and, only if that succeeds, writes it to the output
/// file. A failed write removes the partial output.
pub fn process(config: Config, status: Arc<Mutex<f32>>) -> Result<(), ProcessorError> {
    let input_dir = config.get_input_directory()?;
    let output_file = config.get_output_file()?;

    let stack = DumpStack::new(input_dir)?;
    log::info!(
        "Found {} input files with total size: {}",
        stack.n_files(),
        human_bytes::human_bytes(*stack.get_total_data_size() as f64)
    );

    report_progress(&status, 0.0);
    let (table, summary) = build_table(&config, &stack, &status)?;
    log::info!(
        "Number of waveforms = {} ({} records, {} incomplete, {} unintegrable)",
        summary.accepted,
        summary.raw_records,
        summary.dropped_incomplete,
        summary.dropped_unintegrable
    );
    if summary.dropped_unintegrable > 0 {
        log::warn!(
            "{} waveforms had too few samples to integrate and were dropped",
            summary.dropped_unintegrable
        );
    }

    if let Err(e) = write_output(output_file, config.polarity, &table, &stack) {
        remove_partial_output(output_file);
        return Err(e.into());
    }
    report_progress(&status, 1.0);

    Ok(())
}
