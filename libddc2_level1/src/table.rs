use hdf5::H5Type;

use super::tokenizer::Preamble;

/// One sample of one accepted waveform; the Level-1 output row
#[derive(H5Type, Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct WaveformRow {
    pub waveform_index: u64,
    pub sample_index: i64,
    pub time_ns: i64,
    pub raw_adc: i64,
    pub voltage_mv: f64,
    /// Seconds since the unix epoch
    pub timestamp: f64,
    pub charge_nvs: f64,
}

/// All accepted waveforms of a run, in acceptance order.
///
/// Rows of a waveform are contiguous; `offsets` remembers where each waveform starts.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformTable {
    preamble: Preamble,
    rows: Vec<WaveformRow>,
    offsets: Vec<usize>,
}

impl WaveformTable {
    pub fn new(preamble: Preamble) -> Self {
        Self {
            preamble,
            rows: Vec::new(),
            offsets: Vec::new(),
        }
    }

    /// Index the next waveform will be given
    pub fn next_waveform_index(&self) -> u64 {
        self.offsets.len() as u64
    }

    /// Append the rows of one waveform. The rows must already carry `next_waveform_index()`.
    pub fn push_waveform(&mut self, rows: Vec<WaveformRow>) -> u64 {
        let index = self.next_waveform_index();
        self.offsets.push(self.rows.len());
        self.rows.extend(rows);
        index
    }

    pub fn n_waveforms(&self) -> usize {
        self.offsets.len()
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn rows(&self) -> &[WaveformRow] {
        &self.rows
    }

    pub fn preamble(&self) -> &Preamble {
        &self.preamble
    }

    /// First row and row count of each waveform
    pub fn spans(&self) -> Vec<(usize, usize)> {
        self.offsets
            .iter()
            .enumerate()
            .map(|(idx, start)| {
                let stop = self.offsets.get(idx + 1).copied().unwrap_or(self.rows.len());
                (*start, stop - start)
            })
            .collect()
    }

    /// Rows of one waveform
    pub fn waveform(&self, waveform_index: usize) -> Option<&[WaveformRow]> {
        let start = *self.offsets.get(waveform_index)?;
        let stop = self
            .offsets
            .get(waveform_index + 1)
            .copied()
            .unwrap_or(self.rows.len());
        Some(&self.rows[start..stop])
    }

    /// The charge of each waveform
    pub fn charges(&self) -> Vec<f64> {
        self.offsets
            .iter()
            .map(|start| self.rows[*start].charge_nvs)
            .collect()
    }
}

/// Destination of a finished table
pub trait TableSink {
    type Error;

    fn write_table(&mut self, table: &WaveformTable) -> Result<(), Self::Error>;
}

/// Collects rows in memory
impl TableSink for Vec<WaveformRow> {
    type Error = std::convert::Infallible;

    fn write_table(&mut self, table: &WaveformTable) -> Result<(), Self::Error> {
        self.extend_from_slice(table.rows());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preamble() -> Preamble {
        Preamble {
            baseline: 0,
            anchor_date: String::from("2019-03-01"),
            anchor_time: String::from("12:00:00.000000"),
            anchor_wallclock_ns: 0,
        }
    }

    fn rows(waveform_index: u64, n: i64, charge: f64) -> Vec<WaveformRow> {
        (0..n)
            .map(|i| WaveformRow {
                waveform_index,
                sample_index: i,
                time_ns: 4 * i,
                raw_adc: 0,
                voltage_mv: 0.0,
                timestamp: 0.0,
                charge_nvs: charge,
            })
            .collect()
    }

    #[test]
    fn test_push_and_slice() {
        let mut table = WaveformTable::new(preamble());
        assert!(table.is_empty());
        assert_eq!(table.push_waveform(rows(0, 4, 1.5)), 0);
        assert_eq!(table.push_waveform(rows(1, 6, 2.5)), 1);
        assert_eq!(table.n_waveforms(), 2);
        assert_eq!(table.n_rows(), 10);
        assert_eq!(table.waveform(1).unwrap().len(), 6);
        assert!(table.waveform(2).is_none());
        assert_eq!(table.spans(), vec![(0, 4), (4, 6)]);
        assert_eq!(table.charges(), vec![1.5, 2.5]);
    }

    #[test]
    fn test_memory_sink() {
        let mut table = WaveformTable::new(preamble());
        table.push_waveform(rows(0, 5, 0.0));
        let mut sink: Vec<WaveformRow> = Vec::new();
        sink.write_table(&table).unwrap();
        assert_eq!(sink.len(), 5);
    }
}
