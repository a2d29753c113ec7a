//! # ddc2_level1
//!
//! ddc2_level1 is the Level-1 processing for the DDC2 digitizer, written in Rust. It takes
//! the textual waveform dump recorded from the DDC2 (gzip compressed level0 chunks plus any
//! plain text dump files left behind by an interrupted capture) and turns it into a single
//! time synchronized, per-sample table with baseline corrected voltages and the integrated
//! charge of every waveform, stored in the HDF5 format.
//!
//! ## Installation
//!
//! The only method of install is from source.
//!
//! ### HDF5
//!
//! Before building and running ddc2_level1, HDF5 must be installed. Typically this will be
//! installed using a package manager (homebrew, apt, etc), and the Rust libraries will
//! auto detect the location of the HDF install. If it is installed to a custom location,
//! write the following snippet into the file `.cargo/config.toml` in the repository:
//!
//! ```toml
//! [env]
//! HDF5_DIR="/path/to/my/hdf5/install/"
//!
//! [build]
//! rustflags="-C link-args=-Wl,-rpath,/path/to/my/hdf5/install/lib"
//! ```
//!
//! ### Building & Install
//!
//! To build and install the CLI use `cargo install --path ./ddc2_level1_cli` from the top
//! level repository.
//!
//! ## Input
//!
//! The input directory holds `level0_######.txt.gz` chunks and optionally
//! `dump_######.txt` files. Chunks are read in sorted order, then dump files in sorted
//! order, and concatenated. The text looks like
//!
//! ```text
//! BASELINE = 512
//! Run start 2019-03-01 12:00:00.250000
//!
//! ...
//! start timestamp = 1234567, ...
//! local time = 250, ...
//! ...
//! Nsamples = 128
//! ...
//! 0,510,250,
//! 1,498,251,
//! ----------------------------------------------------------------------------------------------------
//! ```
//!
//! The first line ends in the ADC baseline, the second in the date and time (UTC) the
//! device clock is anchored to. Records are separated by a line of 100 dashes. Within a
//! record, line 5 holds the device tick, line 6 the record's local tick, line 8 the number
//! of samples and lines 11 onwards the samples as `sample index, adc, local tick`. A
//! different layout can be described with the `schema` field of the configuration.
//!
//! Records with fewer sample lines than they declare are dropped. Any structural problem
//! (missing separator, preamble, metadata or a malformed sample row) aborts the run before
//! anything is written.
//!
//! ## Configuration
//!
//! ```yml
//! input_path: None
//! output_path: None
//! polarity: inverted
//! drop_unintegrable: false
//! trace_dropped: false
//! schema: null
//! ```
//!
//! - `polarity`: `inverted` computes `baseline - adc`, `legacy` computes `adc - baseline`
//! - `drop_unintegrable`: waveforms with fewer than 4 samples cannot be fit with a spline.
//! By default this aborts the run; set this to drop them instead.
//! - `trace_dropped`: log every dropped record as a warning
//! - `schema`: record layout, `null` for the DDC2 default
//!
//! ## Output
//!
//! ```text
//! level1.h5
//! waveforms - baseline, anchor_date, anchor_time, polarity, n_waveforms, n_rows, version
//! |---- table(dset) - waveform_index, sample_index, time_ns, raw_adc, voltage_mv, timestamp, charge_nvs
//! |---- offsets(dset) - first row, row count of each waveform
//! |---- charges(dset) - charge of each waveform in nVs
//! ```
//!
//! Next to the HDF5 file a `level1.yml` file lists the input files that were read.
pub mod assembler;
pub mod charge;
pub mod clock;
pub mod conditioner;
pub mod config;
pub mod constants;
pub mod dump_stack;
pub mod error;
pub mod extractor;
pub mod hdf_writer;
pub mod process;
pub mod schema;
pub mod spline;
pub mod table;
pub mod tokenizer;
