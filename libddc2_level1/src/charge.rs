use super::constants::MVNS_PER_NVS;
use super::error::IntegrationError;
use super::spline::CubicSpline;

/// Integrate a conditioned waveform to a charge in nV*s.
///
/// A cubic spline is fit through `(time_ns, voltage_mv)` and integrated from t = 0 to the
/// last sample time. The samples must be in sample order.
pub fn integrate_charge(times_ns: &[f64], voltages_mv: &[f64]) -> Result<f64, IntegrationError> {
    let spline = CubicSpline::not_a_knot(times_ns, voltages_mv)?;
    let upper = times_ns.last().copied().unwrap_or(0.0);
    Ok(spline.integral(0.0, upper) / MVNS_PER_NVS)
}
