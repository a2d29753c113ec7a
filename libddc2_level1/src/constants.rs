/// Line of dashes separating two waveform records in a DDC2 dump
pub const RECORD_SEPARATOR: &str =
    "----------------------------------------------------------------------------------------------------";

/// The DDC2 internal clock runs at 250 MHz
pub const NS_PER_TICK: i64 = 4;
/// ADC counts to millivolts
pub const MV_PER_ADC_COUNT: f64 = 0.220;
/// mV*ns to nV*s
pub const MVNS_PER_NVS: f64 = 1.0e3;
pub const NS_PER_SECOND: f64 = 1.0e9;

/// Minimum number of points needed to fit the cubic spline
pub const MIN_SPLINE_POINTS: usize = 4;

// DDC2 record layout (line numbers are counted from the start of a block)
pub const DEVICE_TICK_MARKER: &str = "start timestamp";
pub const DEVICE_TICK_LINE: usize = 5;
pub const LOCAL_TICK_MARKER: &str = "local time";
pub const LOCAL_TICK_LINE: usize = 6;
pub const SAMPLE_COUNT_MARKER: &str = "Nsamples";
pub const SAMPLE_COUNT_LINE: usize = 8;
pub const FIRST_SAMPLE_LINE: usize = 11;
pub const SAMPLE_DELIMITER: char = ',';
pub const FIELDS_PER_SAMPLE: usize = 3;

// Input file naming
pub const COMPRESSED_PATTERN: &str = "level0";
pub const COMPRESSED_EXTENSION: &str = ".txt.gz";
pub const SUPPLEMENT_PATTERN: &str = "dump";
pub const SUPPLEMENT_EXTENSION: &str = ".txt";
