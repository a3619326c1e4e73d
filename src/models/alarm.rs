use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What tripped the alarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlarmKind {
    SepsisRisk,
    SuddenDeathRisk,
    EwsHigh,
    VitalSign,
}

impl AlarmKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlarmKind::SepsisRisk => "SEPSIS_RISK",
            AlarmKind::SuddenDeathRisk => "SUDDEN_DEATH_RISK",
            AlarmKind::EwsHigh => "EWS_HIGH",
            AlarmKind::VitalSign => "VITAL_SIGN",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SEPSIS_RISK" => Some(AlarmKind::SepsisRisk),
            "SUDDEN_DEATH_RISK" => Some(AlarmKind::SuddenDeathRisk),
            "EWS_HIGH" => Some(AlarmKind::EwsHigh),
            "VITAL_SIGN" => Some(AlarmKind::VitalSign),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlarmSeverity {
    Medium,
    High,
    Critical,
}

impl AlarmSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlarmSeverity::Medium => "MEDIUM",
            AlarmSeverity::High => "HIGH",
            AlarmSeverity::Critical => "CRITICAL",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "MEDIUM" => Some(AlarmSeverity::Medium),
            "HIGH" => Some(AlarmSeverity::High),
            "CRITICAL" => Some(AlarmSeverity::Critical),
            _ => None,
        }
    }
}

/// A persisted alarm row. Created when a scoring pass crosses a threshold;
/// afterwards only the mute/active flags change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alarm {
    pub id: String,
    pub monitor_id: String,
    pub kind: AlarmKind,
    pub severity: AlarmSeverity,
    pub message: String,
    pub is_active: bool,
    pub is_muted: bool,
    pub timestamp: DateTime<Utc>,
}
