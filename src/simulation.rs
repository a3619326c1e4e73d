//! Synthetic patient data: vital-sign samples, risk heuristics and an ECG
//! trace for waveform display.
//!
//! All generators take the RNG as a parameter so tests can run them seeded.
//! The risk values are simulated probabilities biased by the EWS bands, not
//! clinically derived ones.

use std::f64::consts::PI;

use rand::Rng;

use crate::models::{RiskAssessment, VitalSignsSample};

/// Generate one plausible reading. Each parameter is drawn around its
/// normal value with a little jitter and clamped to the monitor's
/// displayable range, so outputs always lie inside the clamps below.
pub fn generate_vitals<R: Rng + ?Sized>(rng: &mut R) -> VitalSignsSample {
    let heart_rate = 60.0 + rng.gen::<f64>() * 40.0 + (rng.gen::<f64>() - 0.5) * 20.0;
    let systolic_bp = 110.0 + rng.gen::<f64>() * 30.0 + (rng.gen::<f64>() - 0.5) * 20.0;
    let diastolic_bp = 70.0 + rng.gen::<f64>() * 20.0 + (rng.gen::<f64>() - 0.5) * 10.0;
    let respiratory_rate = 12.0 + rng.gen::<f64>() * 8.0 + (rng.gen::<f64>() - 0.5) * 4.0;
    let temperature = 36.5 + rng.gen::<f64>() * 1.5 + (rng.gen::<f64>() - 0.5) * 0.5;
    let oxygen_saturation = 95.0 + rng.gen::<f64>() * 5.0 + (rng.gen::<f64>() - 0.5) * 2.0;

    VitalSignsSample {
        heart_rate: heart_rate.clamp(40.0, 150.0),
        systolic_bp: systolic_bp.clamp(80.0, 200.0),
        diastolic_bp: diastolic_bp.clamp(50.0, 120.0),
        respiratory_rate: respiratory_rate.clamp(8.0, 30.0),
        temperature: temperature.clamp(35.0, 40.0),
        oxygen_saturation: oxygen_saturation.clamp(85.0, 100.0),
    }
}

/// Low-band risks used for freshly seeded monitors, before any scoring
/// pass has run.
pub fn baseline_risks<R: Rng + ?Sized>(rng: &mut R) -> RiskAssessment {
    RiskAssessment {
        sepsis: rng.gen::<f64>() * 0.3,
        sudden_death: rng.gen::<f64>() * 0.2,
    }
}

/// Draw sepsis and sudden-death risks, biased upward when the EWS crosses
/// 5 or 7 and capped per band.
pub fn assess_risks<R: Rng + ?Sized>(ews_score: u32, rng: &mut R) -> RiskAssessment {
    let mut risks = baseline_risks(rng);

    if ews_score >= 7 {
        risks.sepsis = (risks.sepsis + 0.4).min(0.9);
        risks.sudden_death = (risks.sudden_death + 0.3).min(0.8);
    } else if ews_score >= 5 {
        risks.sepsis = (risks.sepsis + 0.2).min(0.7);
        risks.sudden_death = (risks.sudden_death + 0.2).min(0.6);
    }

    risks
}

/// Synthetic PQRST trace scaled to roughly [-0.5, 1.0], two beats across
/// the requested number of points, with a little noise on top.
pub fn ecg_wave<R: Rng + ?Sized>(points: usize, rng: &mut R) -> Vec<f64> {
    let mut data = Vec::with_capacity(points);

    for i in 0..points {
        let t = (i as f64 / points as f64) * 4.0 * PI;
        let phase = t % (2.0 * PI);
        let mut value = 0.0;

        // P wave
        if phase < 0.3 {
            value += 0.1 * (t * 10.0).sin();
        }

        // QRS complex
        if phase > 0.8 && phase < 1.2 {
            let qrs_t = (phase - 0.8) / 0.4;
            if qrs_t < 0.3 {
                value -= 0.2 * (qrs_t * PI / 0.3).sin();
            } else if qrs_t < 0.7 {
                value += 0.8 * ((qrs_t - 0.3) * PI / 0.4).sin();
            } else {
                value -= 0.3 * ((qrs_t - 0.7) * PI / 0.3).sin();
            }
        }

        // T wave
        if phase > 1.5 && phase < 2.0 {
            value += 0.3 * ((phase - 1.5) * PI / 0.5).sin();
        }

        value += (rng.gen::<f64>() - 0.5) * 0.05;
        data.push(value);
    }

    data
}
