//! Data models shared between the store, the simulation and the API layer.

pub mod alarm;
pub mod monitor;
pub mod vitals;

pub use alarm::{Alarm, AlarmKind, AlarmSeverity};
pub use monitor::{Monitor, MonitorDetail, MonitorSummary};
pub use vitals::{RiskAssessment, VitalSign, VitalSignsSample};
