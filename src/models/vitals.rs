use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One raw set of physiological readings, before scoring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VitalSignsSample {
    pub heart_rate: f64,
    pub systolic_bp: f64,
    pub diastolic_bp: f64,
    pub respiratory_rate: f64,
    pub temperature: f64,
    pub oxygen_saturation: f64,
}

/// Simulated risk probabilities derived from a scoring pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub sepsis: f64,
    pub sudden_death: f64,
}

/// A persisted reading: the raw sample plus the scores and risks computed
/// when it was recorded. Append-only per monitor; scores are never
/// recomputed retroactively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VitalSign {
    pub id: String,
    pub monitor_id: String,
    pub heart_rate: f64,
    pub systolic_bp: f64,
    pub diastolic_bp: f64,
    pub respiratory_rate: f64,
    pub temperature: f64,
    pub oxygen_saturation: f64,
    pub ews_score: i64,
    pub mews_score: i64,
    pub sepsis_risk: f64,
    pub sudden_death_risk: f64,
    pub timestamp: DateTime<Utc>,
}

impl VitalSign {
    pub fn sample(&self) -> VitalSignsSample {
        VitalSignsSample {
            heart_rate: self.heart_rate,
            systolic_bp: self.systolic_bp,
            diastolic_bp: self.diastolic_bp,
            respiratory_rate: self.respiratory_rate,
            temperature: self.temperature,
            oxygen_saturation: self.oxygen_saturation,
        }
    }
}
