use serde::{Deserialize, Serialize};

use super::constants::{MV_PER_ADC_COUNT, NS_PER_TICK};

/// Sign convention applied when removing the baseline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// baseline - adc; negative going pulses become positive
    #[default]
    Inverted,
    /// adc - baseline
    Legacy,
}

/// Baseline correction and ADC to millivolt scaling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalConditioner {
    baseline: i64,
    polarity: Polarity,
}

impl SignalConditioner {
    pub fn new(baseline: i64, polarity: Polarity) -> Self {
        Self { baseline, polarity }
    }

    /// Baseline corrected ADC value
    pub fn condition(&self, raw_adc: i64) -> i64 {
        match self.polarity {
            Polarity::Inverted => self.baseline - raw_adc,
            Polarity::Legacy => raw_adc - self.baseline,
        }
    }

    pub fn voltage_mv(&self, raw_adc: i64) -> f64 {
        self.condition(raw_adc) as f64 * MV_PER_ADC_COUNT
    }
}

/// Sample time relative to the start of the waveform. None if it does not fit in an i64.
pub fn sample_time_ns(sample_index: i64) -> Option<i64> {
    sample_index.checked_mul(NS_PER_TICK)
}
