use hdf5::types::VarLenUnicode;
use hdf5::File;
use ndarray::Array2;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::conditioner::Polarity;
use super::dump_stack::DumpStack;
use super::error::HDF5WriterError;
use super::table::{TableSink, WaveformTable};

const WAVEFORMS_NAME: &str = "waveforms";
const TABLE_NAME: &str = "table";
const OFFSETS_NAME: &str = "offsets";
const CHARGES_NAME: &str = "charges";

/// This is the version of the output format
const FORMAT_VERSION: &str = "1.0";

/// A simple struct which wraps around the hdf5-rust library.
///
/// Opens an HDF5 file and writes the Level-1 table into it.
#[derive(Debug)]
pub struct HDFWriter {
    file_handle: File,
    parent_file_path: PathBuf,
    waveforms_group: hdf5::Group,
    polarity: Polarity,
}
// Structure
// waveforms - baseline, anchor_date, anchor_time, polarity, n_waveforms, n_rows, version
// |---- table(dset) - one compound row per sample
// |---- offsets(dset) - first row, row count per waveform
// |---- charges(dset) - charge per waveform

impl HDFWriter {
    /// Create the writer, opening a file at path and creating the waveforms group
    pub fn new(path: &Path, polarity: Polarity) -> Result<Self, HDF5WriterError> {
        let parent_file_path = sidecar_path(path)?;
        let file_handle = File::create(path)?;

        let level1_version = format!("{}:{}", env!("CARGO_PKG_NAME"), FORMAT_VERSION);

        let waveforms_group = file_handle.create_group(WAVEFORMS_NAME)?;
        waveforms_group
            .new_attr::<VarLenUnicode>()
            .create("version")?
            .write_scalar(&to_unicode(&level1_version)?)?;

        Ok(Self {
            file_handle,
            parent_file_path,
            waveforms_group,
            polarity,
        })
    }

    /// Write the input file list in a separate yaml file
    pub fn write_fileinfo(&self, stack: &DumpStack) -> Result<(), HDF5WriterError> {
        let mut file_map = BTreeMap::<String, Vec<String>>::new();
        let mut file_list = Vec::<String>::new();
        let mut size_list = Vec::<String>::new();
        for (path, bytes) in stack.get_file_stack() {
            file_list.push(path.to_string_lossy().to_string());
            size_list.push(human_bytes::human_bytes(*bytes as f64));
        }
        file_map.insert(String::from("input_file_names"), file_list);
        file_map.insert(String::from("input_file_sizes"), size_list);

        let mut parent_file = std::fs::File::create(&self.parent_file_path)?;
        parent_file.write_all(serde_yaml::to_string(&file_map)?.as_bytes())?;

        Ok(())
    }

    /// Flush and close the file, consuming the writer
    pub fn close(self) -> Result<(), HDF5WriterError> {
        self.file_handle.flush()?;
        Ok(())
    }
}

/// Path of the `<stem>.yml` file list written next to the HDF5 file
pub fn sidecar_path(path: &Path) -> Result<PathBuf, HDF5WriterError> {
    match (path.parent(), path.file_stem()) {
        (Some(parent), Some(stem)) => Ok(parent.join(format!("{}.yml", stem.to_string_lossy()))),
        _ => Err(HDF5WriterError::BadFilePath(path.to_path_buf())),
    }
}

fn to_unicode(value: &str) -> Result<VarLenUnicode, HDF5WriterError> {
    VarLenUnicode::from_str(value)
        .map_err(|e| HDF5WriterError::HDF5Error(hdf5::Error::from(e.to_string())))
}

impl TableSink for HDFWriter {
    type Error = HDF5WriterError;

    /// Write the table, its per-waveform offsets and charges, and the run metadata
    fn write_table(&mut self, table: &WaveformTable) -> Result<(), HDF5WriterError> {
        let preamble = table.preamble();

        self.waveforms_group
            .new_dataset_builder()
            .with_data(table.rows())
            .create(TABLE_NAME)?;

        let spans = table.spans();
        let flat: Vec<u64> = spans
            .iter()
            .flat_map(|(start, count)| [*start as u64, *count as u64])
            .collect();
        let offsets = Array2::from_shape_vec((spans.len(), 2), flat)?;
        self.waveforms_group
            .new_dataset_builder()
            .with_data(&offsets)
            .create(OFFSETS_NAME)?;
        self.waveforms_group
            .new_dataset_builder()
            .with_data(&table.charges())
            .create(CHARGES_NAME)?;

        self.waveforms_group
            .new_attr::<i64>()
            .create("baseline")?
            .write_scalar(&preamble.baseline)?;
        self.waveforms_group
            .new_attr::<VarLenUnicode>()
            .create("anchor_date")?
            .write_scalar(&to_unicode(&preamble.anchor_date)?)?;
        self.waveforms_group
            .new_attr::<VarLenUnicode>()
            .create("anchor_time")?
            .write_scalar(&to_unicode(&preamble.anchor_time)?)?;
        let polarity = match self.polarity {
            Polarity::Inverted => "inverted",
            Polarity::Legacy => "legacy",
        };
        self.waveforms_group
            .new_attr::<VarLenUnicode>()
            .create("polarity")?
            .write_scalar(&to_unicode(polarity)?)?;
        self.waveforms_group
            .new_attr::<u64>()
            .create("n_waveforms")?
            .write_scalar(&(table.n_waveforms() as u64))?;
        self.waveforms_group
            .new_attr::<u64>()
            .create("n_rows")?
            .write_scalar(&(table.n_rows() as u64))?;

        log::info!(
            "{} waveforms ({} rows) written.",
            table.n_waveforms(),
            table.n_rows()
        );
        Ok(())
    }
}
