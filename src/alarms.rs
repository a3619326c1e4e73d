//! Alarm threshold evaluation.
//!
//! Pure decision logic: given the latest score and risk values for a
//! monitor, decide whether an alarm should be raised and at what severity.
//! The evaluator is stateless: it does not look at alarms already active for
//! the monitor, so repeated passes over a deteriorating patient stack new
//! alarm rows rather than deduplicating.

use crate::models::{AlarmKind, AlarmSeverity, RiskAssessment};

/// An alarm the evaluator decided to raise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmTrigger {
    pub kind: AlarmKind,
    pub severity: AlarmSeverity,
    pub message: &'static str,
}

/// Evaluate the fixed threshold bands.
///
/// CRITICAL when EWS >= 7 or sepsis risk >= 0.8 or sudden-death risk >= 0.7;
/// HIGH when EWS >= 5 or sepsis risk >= 0.5 or sudden-death risk >= 0.4;
/// otherwise no alarm. Within a band the risk checks take precedence over
/// the EWS check when attributing a kind.
pub fn evaluate(ews_score: u32, risks: &RiskAssessment) -> Option<AlarmTrigger> {
    if ews_score >= 7 || risks.sepsis >= 0.8 || risks.sudden_death >= 0.7 {
        let (kind, message) = if risks.sepsis >= 0.8 {
            (AlarmKind::SepsisRisk, "High sepsis risk - immediate intervention")
        } else if risks.sudden_death >= 0.7 {
            (AlarmKind::SuddenDeathRisk, "High sudden-death risk - emergency")
        } else {
            (AlarmKind::EwsHigh, "Critical EWS - immediate assessment")
        };
        return Some(AlarmTrigger {
            kind,
            severity: AlarmSeverity::Critical,
            message,
        });
    }

    if ews_score >= 5 || risks.sepsis >= 0.5 || risks.sudden_death >= 0.4 {
        let (kind, message) = if risks.sepsis >= 0.5 {
            (AlarmKind::SepsisRisk, "Moderate sepsis risk - intensive monitoring")
        } else if risks.sudden_death >= 0.4 {
            (AlarmKind::SuddenDeathRisk, "Sudden-death risk - special attention")
        } else {
            (AlarmKind::EwsHigh, "Elevated EWS - assessment required")
        };
        return Some(AlarmTrigger {
            kind,
            severity: AlarmSeverity::High,
            message,
        });
    }

    None
}

/// Severity for the demonstration alarms raised while seeding monitors,
/// graded by the same EWS bands the evaluator uses.
pub fn seed_severity(ews_score: u32) -> AlarmSeverity {
    if ews_score >= 7 {
        AlarmSeverity::Critical
    } else if ews_score >= 5 {
        AlarmSeverity::High
    } else {
        AlarmSeverity::Medium
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn risks(sepsis: f64, sudden_death: f64) -> RiskAssessment {
        RiskAssessment {
            sepsis,
            sudden_death,
        }
    }

    #[test_case(7, 0.0, 0.0 ; "ews at critical threshold")]
    #[test_case(0, 0.8, 0.0 ; "sepsis at critical threshold")]
    #[test_case(0, 0.0, 0.7 ; "sudden death at critical threshold")]
    fn critical_band(ews: u32, sepsis: f64, sd: f64) {
        let trigger = evaluate(ews, &risks(sepsis, sd)).unwrap();
        assert_eq!(trigger.severity, AlarmSeverity::Critical);
    }

    #[test_case(5, 0.0, 0.0 ; "ews at high threshold")]
    #[test_case(6, 0.0, 0.0 ; "ews just below critical")]
    #[test_case(0, 0.5, 0.0 ; "sepsis at high threshold")]
    #[test_case(0, 0.79, 0.0 ; "sepsis just below critical")]
    #[test_case(0, 0.0, 0.4 ; "sudden death at high threshold")]
    fn high_band(ews: u32, sepsis: f64, sd: f64) {
        let trigger = evaluate(ews, &risks(sepsis, sd)).unwrap();
        assert_eq!(trigger.severity, AlarmSeverity::High);
    }

    #[test_case(0, 0.0, 0.0)]
    #[test_case(4, 0.49, 0.39 ; "everything just below the high band")]
    fn quiet_band_raises_nothing(ews: u32, sepsis: f64, sd: f64) {
        assert_eq!(evaluate(ews, &risks(sepsis, sd)), None);
    }

    #[test]
    fn sepsis_takes_precedence_over_sudden_death_and_ews() {
        let trigger = evaluate(9, &risks(0.85, 0.75)).unwrap();
        assert_eq!(trigger.kind, AlarmKind::SepsisRisk);

        let trigger = evaluate(9, &risks(0.1, 0.75)).unwrap();
        assert_eq!(trigger.kind, AlarmKind::SuddenDeathRisk);

        let trigger = evaluate(9, &risks(0.1, 0.1)).unwrap();
        assert_eq!(trigger.kind, AlarmKind::EwsHigh);
    }

    #[test]
    fn high_band_attributes_kind_with_the_lower_thresholds() {
        let trigger = evaluate(0, &risks(0.55, 0.45)).unwrap();
        assert_eq!(trigger.kind, AlarmKind::SepsisRisk);
        assert_eq!(trigger.severity, AlarmSeverity::High);

        let trigger = evaluate(5, &risks(0.1, 0.45)).unwrap();
        assert_eq!(trigger.kind, AlarmKind::SuddenDeathRisk);

        let trigger = evaluate(5, &risks(0.1, 0.1)).unwrap();
        assert_eq!(trigger.kind, AlarmKind::EwsHigh);
    }

    #[test_case(7, AlarmSeverity::Critical)]
    #[test_case(5, AlarmSeverity::High)]
    #[test_case(4, AlarmSeverity::Medium)]
    fn seed_severity_follows_ews_bands(ews: u32, expected: AlarmSeverity) {
        assert_eq!(seed_severity(ews), expected);
    }
}
