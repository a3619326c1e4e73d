//! Early-warning score tables.
//!
//! Both scores are sums of independent per-parameter contributions from
//! fixed, non-overlapping bands. They are pure functions of the sample at
//! the time it was taken and are never recomputed for stored readings.

use crate::models::VitalSignsSample;

/// Early Warning Score over all five monitored parameters.
///
/// Out-of-range input still scores (the outermost band applies); NaN falls
/// through every band and contributes nothing.
pub fn ews(sample: &VitalSignsSample) -> u32 {
    let mut score = 0;

    // Heart rate
    if sample.heart_rate < 40.0 {
        score += 3;
    } else if sample.heart_rate < 51.0 {
        score += 1;
    } else if sample.heart_rate > 130.0 {
        score += 3;
    } else if sample.heart_rate > 110.0 {
        score += 2;
    } else if sample.heart_rate > 100.0 {
        score += 1;
    }

    // Systolic blood pressure
    if sample.systolic_bp < 90.0 {
        score += 3;
    } else if sample.systolic_bp < 100.0 {
        score += 2;
    } else if sample.systolic_bp < 110.0 {
        score += 1;
    } else if sample.systolic_bp > 220.0 {
        score += 3;
    }

    // Respiratory rate
    if sample.respiratory_rate < 8.0 {
        score += 3;
    } else if sample.respiratory_rate < 12.0 {
        score += 1;
    } else if sample.respiratory_rate > 24.0 {
        score += 2;
    } else if sample.respiratory_rate > 20.0 {
        score += 1;
    }

    // Temperature
    if sample.temperature < 35.0 {
        score += 3;
    } else if sample.temperature < 36.0 {
        score += 1;
    } else if sample.temperature > 39.0 {
        score += 2;
    } else if sample.temperature > 38.0 {
        score += 1;
    }

    // Oxygen saturation
    if sample.oxygen_saturation < 91.0 {
        score += 3;
    } else if sample.oxygen_saturation < 94.0 {
        score += 2;
    } else if sample.oxygen_saturation < 96.0 {
        score += 1;
    }

    score
}

/// Modified Early Warning Score. Same shape as [`ews`] over a narrower
/// parameter set: heart rate, systolic BP, respiratory rate and temperature.
/// There is no oxygen-saturation term.
pub fn mews(sample: &VitalSignsSample) -> u32 {
    let mut score = 0;

    // Heart rate
    if sample.heart_rate < 40.0 {
        score += 2;
    } else if sample.heart_rate < 51.0 {
        score += 1;
    } else if sample.heart_rate > 130.0 {
        score += 3;
    } else if sample.heart_rate > 110.0 {
        score += 2;
    } else if sample.heart_rate > 100.0 {
        score += 1;
    }

    // Systolic blood pressure
    if sample.systolic_bp < 70.0 {
        score += 3;
    } else if sample.systolic_bp < 81.0 {
        score += 2;
    } else if sample.systolic_bp < 101.0 {
        score += 1;
    } else if sample.systolic_bp > 200.0 {
        score += 2;
    }

    // Respiratory rate
    if sample.respiratory_rate < 9.0 {
        score += 2;
    } else if sample.respiratory_rate > 30.0 {
        score += 3;
    } else if sample.respiratory_rate > 20.0 {
        score += 2;
    } else if sample.respiratory_rate > 14.0 {
        score += 1;
    }

    // Temperature
    if sample.temperature < 35.0 {
        score += 2;
    } else if sample.temperature > 38.5 {
        score += 2;
    }

    score
}
