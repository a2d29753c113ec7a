use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

use hdf5::types::VarLenUnicode;
use libddc2_level1::config::Config;
use libddc2_level1::constants::RECORD_SEPARATOR;
use libddc2_level1::dump_stack::DumpStack;
use libddc2_level1::error::{FormatError, HDF5WriterError, ProcessorError};
use libddc2_level1::process::{build_table, process};
use libddc2_level1::table::WaveformRow;

/// Text of one DDC2 record with a negative going pulse
fn record(device_tick: i64, n_samples: usize, declared: usize) -> String {
    let local_tick = 40;
    let mut text = String::from("\nWaveform\nchannel = 0\ntrigger = 1\nmode = 3\n");
    text.push_str(&format!("start timestamp = {device_tick}, overflow = 0\n"));
    text.push_str(&format!("local time = {local_tick}, overflow = 0\n"));
    text.push_str("threshold = 20\n");
    text.push_str(&format!("Nsamples = {declared}\n"));
    text.push_str("\nisamp,adc,time\n");
    for i in 0..n_samples {
        let adc = if (10..20).contains(&i) { 400 } else { 500 };
        text.push_str(&format!("{},{},{},\n", i, adc, local_tick + i as i64));
    }
    text
}

fn capture(records: &[String]) -> String {
    let mut text = String::from("BASELINE = 500\nRun start 2019-03-01 12:00:00.500000\n");
    text.push_str(&records.join(RECORD_SEPARATOR));
    text
}

fn write_gz(path: &Path, text: &str) {
    let mut encoder = GzEncoder::new(File::create(path).unwrap(), Compression::default());
    encoder.write_all(text.as_bytes()).unwrap();
    encoder.finish().unwrap();
}

/// Split the capture over two compressed chunks and a plain text dump
fn write_capture(dir: &Path, text: &str) {
    let lines: Vec<&str> = text.split_inclusive('\n').collect();
    let third = lines.len() / 3;
    write_gz(&dir.join("level0_000000.txt.gz"), &lines[..third].concat());
    write_gz(&dir.join("level0_000001.txt.gz"), &lines[third..2 * third].concat());
    std::fs::write(dir.join("dump_000002.txt"), lines[2 * third..].concat()).unwrap();
}

fn config_for(dir: &Path) -> Config {
    Config {
        input_path: dir.to_path_buf(),
        output_path: dir.join("level1.h5"),
        ..Default::default()
    }
}

#[test]
fn test_capture_across_files() {
    let dir = tempfile::tempdir().unwrap();
    let records = vec![
        record(1_000, 32, 32),
        record(2_000, 32, 40),
        record(3_000, 32, 32),
        record(4_000, 32, 32),
    ];
    write_capture(dir.path(), &capture(&records));

    let config = config_for(dir.path());
    let stack = DumpStack::new(dir.path()).unwrap();
    assert_eq!(stack.n_files(), 3);
    let status = Arc::new(Mutex::new(0.0));
    let (table, summary) = build_table(&config, &stack, &status).unwrap();

    assert_eq!(summary.raw_records, 4);
    assert_eq!(summary.accepted, 3);
    assert_eq!(summary.dropped_incomplete, 1);
    assert_eq!(table.n_waveforms(), 3);
    assert_eq!(table.n_rows(), 96);
    assert_eq!(*status.lock().unwrap(), 1.0);

    // 100 counts = 22 mV for 40 ns
    for charge in table.charges() {
        assert!((charge - 0.88).abs() < 0.88 * 0.05, "charge was {charge}");
    }
    // Fourth record is waveform 2, 3000 ticks after the anchor
    let first = table.waveform(0).unwrap()[0].timestamp;
    let last = table.waveform(2).unwrap()[0].timestamp;
    assert!((first - 1_551_441_600.5).abs() < 1e-6);
    assert!((last - first - 3_000.0 * 4e-9).abs() < 1e-6);
}

#[test]
fn test_repeat_runs_identical() {
    let dir = tempfile::tempdir().unwrap();
    let records = vec![record(1_000, 24, 24), record(9_000, 24, 24)];
    write_capture(dir.path(), &capture(&records));

    let config = config_for(dir.path());
    let stack = DumpStack::new(dir.path()).unwrap();
    let status = Arc::new(Mutex::new(0.0));
    let first = build_table(&config, &stack, &status).unwrap();
    let second = build_table(&config, &stack, &status).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_missing_anchor_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let records = [record(1_000, 16, 16), record(2_000, 16, 16)];
    let text = format!("BASELINE = 500\n{}", records.join(RECORD_SEPARATOR));
    write_capture(dir.path(), &text);

    let config = config_for(dir.path());
    let result = process(config.clone(), Arc::new(Mutex::new(0.0)));
    assert!(matches!(
        result,
        Err(ProcessorError::FormatError(FormatError::MissingAnchorLine))
    ));
    assert!(!config.output_path.exists());
    assert!(!dir.path().join("level1.yml").exists());
}

#[test]
fn test_process_writes_output() {
    let dir = tempfile::tempdir().unwrap();
    let records = vec![record(1_000, 32, 32), record(5_000, 32, 32)];
    write_capture(dir.path(), &capture(&records));

    let config = config_for(dir.path());
    process(config.clone(), Arc::new(Mutex::new(0.0))).unwrap();
    assert!(config.output_path.exists());
    assert!(dir.path().join("level1.yml").exists());
}

#[test]
fn test_output_contents() {
    let dir = tempfile::tempdir().unwrap();
    let records = vec![
        record(1_000, 32, 32),
        record(2_000, 32, 33),
        record(5_000, 24, 24),
    ];
    write_capture(dir.path(), &capture(&records));

    let config = config_for(dir.path());
    let stack = DumpStack::new(dir.path()).unwrap();
    let (expected, _) = build_table(&config, &stack, &Arc::new(Mutex::new(0.0))).unwrap();
    process(config.clone(), Arc::new(Mutex::new(0.0))).unwrap();

    let file = hdf5::File::open(&config.output_path).unwrap();
    let group = file.group("waveforms").unwrap();

    let rows = group.dataset("table").unwrap().read_raw::<WaveformRow>().unwrap();
    assert_eq!(rows.len(), 56);
    assert_eq!(rows, expected.rows());
    // Sample 12 of the second accepted waveform sits inside the pulse
    let row = rows[32 + 12];
    assert_eq!(row.waveform_index, 1);
    assert_eq!(row.sample_index, 12);
    assert_eq!(row.time_ns, 48);
    assert_eq!(row.raw_adc, 400);
    assert!((row.voltage_mv - 22.0).abs() < 1e-9);

    let offsets = group.dataset("offsets").unwrap().read_2d::<u64>().unwrap();
    assert_eq!(offsets.shape(), &[2, 2]);
    assert_eq!(offsets[[1, 0]], 32);
    assert_eq!(offsets[[1, 1]], 24);

    let charges = group.dataset("charges").unwrap().read_raw::<f64>().unwrap();
    assert_eq!(charges, expected.charges());

    let n_waveforms = group.attr("n_waveforms").unwrap().read_scalar::<u64>().unwrap();
    let n_rows = group.attr("n_rows").unwrap().read_scalar::<u64>().unwrap();
    let baseline = group.attr("baseline").unwrap().read_scalar::<i64>().unwrap();
    let polarity = group
        .attr("polarity")
        .unwrap()
        .read_scalar::<VarLenUnicode>()
        .unwrap();
    assert_eq!(n_waveforms, 2);
    assert_eq!(n_rows, 56);
    assert_eq!(baseline, 500);
    assert_eq!(polarity.as_str(), "inverted");
}

#[test]
fn test_failed_write_leaves_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let records = vec![record(1_000, 32, 32), record(5_000, 32, 32)];
    write_capture(dir.path(), &capture(&records));
    // A directory where the file list should go makes the last write step fail
    std::fs::create_dir(dir.path().join("level1.yml")).unwrap();

    let config = config_for(dir.path());
    let result = process(config.clone(), Arc::new(Mutex::new(0.0)));
    assert!(matches!(
        result,
        Err(ProcessorError::HDFError(HDF5WriterError::IOError(_)))
    ));
    assert!(!config.output_path.exists());
    assert!(dir.path().join("level1.yml").is_dir());
}
