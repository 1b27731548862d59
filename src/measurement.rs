//! Automatic pass/hold status of measurement readings.

use crate::schema::{MeasurementMode, MeasurementSpec};
use crate::store::PassHold;

/// Computes the status a reading earns under `spec`.
///
/// Bounds are inclusive. Returns `None` when the bounds the mode needs are not
/// configured or the reading is not a finite number, in which case the status
/// is left to the inspector.
pub fn auto_status(spec: &MeasurementSpec, value: f64) -> Option<PassHold> {
    if !value.is_finite() {
        return None;
    }
    let passed = match spec.mode {
        MeasurementMode::Between => {
            let (min, max) = (spec.min?, spec.max?);
            value >= min && value <= max
        }
        MeasurementMode::Higher => value >= spec.min?,
        MeasurementMode::Lower => value <= spec.max?,
    };
    Some(if passed { PassHold::Pass } else { PassHold::Hold })
}

/// Whether `value` falls outside the given inclusive bounds. Missing bounds are open.
pub fn out_of_bounds(value: f64, min: Option<f64>, max: Option<f64>) -> bool {
    min.is_some_and(|min| value < min) || max.is_some_and(|max| value > max)
}
