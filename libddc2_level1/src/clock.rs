use super::constants::{NS_PER_SECOND, NS_PER_TICK};

/// The single (wall clock, device tick) reference pair of a run.
///
/// Built once from the first accepted record. Every later timestamp is the anchor wall clock
/// plus a tick delta, so long runs never need to re-read a wall clock. Device tick wraparound
/// is not handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockAnchor {
    wallclock_ns: i128,
    device_tick: i64,
}

impl ClockAnchor {
    pub fn new(wallclock_ns: i128, device_tick: i64) -> Self {
        Self {
            wallclock_ns,
            device_tick,
        }
    }

    pub fn device_tick(&self) -> i64 {
        self.device_tick
    }

    /// Absolute time of a sample in nanoseconds since the epoch
    pub fn timestamp_ns(&self, device_tick: i64, record_local_tick: i64, sample_tick: i64) -> i128 {
        let ticks = (device_tick as i128 - self.device_tick as i128) + sample_tick as i128
            - record_local_tick as i128;
        self.wallclock_ns + ticks * NS_PER_TICK as i128
    }

    /// Absolute time of a sample in seconds since the epoch
    pub fn timestamp(&self, device_tick: i64, record_local_tick: i64, sample_tick: i64) -> f64 {
        let ns = self.timestamp_ns(device_tick, record_local_tick, sample_tick);
        let seconds = ns.div_euclid(NS_PER_SECOND as i128);
        let fraction = ns.rem_euclid(NS_PER_SECOND as i128);
        seconds as f64 + fraction as f64 / NS_PER_SECOND
    }
}
