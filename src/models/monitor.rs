use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Alarm, VitalSign};

/// A bedside monitor. Seeded once at system initialization and never
/// structurally mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Monitor {
    pub id: String,
    pub name: String,
    pub location: String,
    pub patient_name: String,
    pub patient_age: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Dashboard view of a monitor: the most recent reading plus whatever
/// alarms are still active.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorSummary {
    #[serde(flatten)]
    pub monitor: Monitor,
    pub latest_vital_sign: Option<VitalSign>,
    pub active_alarms: Vec<Alarm>,
}

/// Detail view: recent reading history for charts plus recent alarms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorDetail {
    #[serde(flatten)]
    pub monitor: Monitor,
    pub vital_signs: Vec<VitalSign>,
    pub alarms: Vec<Alarm>,
}
