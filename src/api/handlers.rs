//! Request handlers.
//!
//! The scoring pass and the seeding pass both run sequentially over the
//! monitor list inside a single request; refresh cadence is the client's
//! concern, there is no server-side scheduler.

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::models::{Alarm, AlarmKind, AlarmSeverity, Monitor, RiskAssessment, VitalSign, VitalSignsSample};
use crate::store::{HistoryQuery, MonitorStore};
use crate::{alarms, scoring, simulation};

use super::ApiError;

/// Chance that a freshly seeded monitor gets a demonstration alarm.
const DEMO_ALARM_PROBABILITY: f64 = 0.3;

const DEFAULT_HISTORY_LIMIT: i64 = 50;
const MAX_HISTORY_LIMIT: i64 = 500;
const DEFAULT_WAVEFORM_POINTS: usize = 100;

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

pub async fn list_monitors(store: web::Data<MonitorStore>) -> Result<HttpResponse, ApiError> {
    let summaries = store.list_monitor_summaries().await?;
    Ok(HttpResponse::Ok().json(summaries))
}

/// Seed the fixed monitor fleet. A no-op when monitors already exist, so
/// the dashboard can call it unconditionally at startup.
pub async fn seed_monitors(
    store: web::Data<MonitorStore>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError> {
    if store.count_monitors().await? > 0 {
        return Ok(HttpResponse::Ok().json(json!({ "message": "Monitors already exist" })));
    }

    let mut rng = rand::thread_rng();
    let count = config.simulation.monitors;

    for i in 1..=count {
        let monitor = Monitor {
            id: Uuid::new_v4().to_string(),
            name: format!("Monitor {i:02}"),
            location: format!("Bed {i:02} - ICU"),
            patient_name: format!("Patient {i:02}"),
            patient_age: 25 + rng.gen_range(0..50),
            is_active: true,
            created_at: Utc::now(),
        };
        store.insert_monitor(&monitor).await?;

        let sample = simulation::generate_vitals(&mut rng);
        let ews = scoring::ews(&sample);
        let mews = scoring::mews(&sample);
        let risks = simulation::baseline_risks(&mut rng);
        store
            .insert_vital_sign(&build_vital_sign(&monitor.id, &sample, ews, mews, &risks))
            .await?;

        if rng.gen::<f64>() < DEMO_ALARM_PROBABILITY {
            let severity = alarms::seed_severity(ews);
            let message = match severity {
                AlarmSeverity::Critical => "Critical EWS - immediate intervention",
                AlarmSeverity::High => "High EWS - urgent assessment",
                AlarmSeverity::Medium => "Abnormal vital signs",
            };
            store
                .insert_alarm(&Alarm {
                    id: Uuid::new_v4().to_string(),
                    monitor_id: monitor.id.clone(),
                    kind: AlarmKind::VitalSign,
                    severity,
                    message: message.to_string(),
                    is_active: true,
                    is_muted: false,
                    timestamp: Utc::now(),
                })
                .await?;
        }
    }

    info!(count, "seeded monitors");
    Ok(HttpResponse::Ok().json(json!({ "message": "Monitors created successfully" })))
}

pub async fn monitor_detail(
    store: web::Data<MonitorStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    match store.monitor_detail(&id).await? {
        Some(detail) => Ok(HttpResponse::Ok().json(detail)),
        None => Err(ApiError::NotFound("Monitor not found".into())),
    }
}

pub async fn mute_monitor_alarms(
    store: web::Data<MonitorStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    if store.get_monitor(&id).await?.is_none() {
        return Err(ApiError::NotFound("Monitor not found".into()));
    }
    let muted = store.mute_active_alarms(&id).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Alarms muted successfully",
        "muted": muted,
    })))
}

#[derive(Debug, Deserialize)]
pub struct WaveformParams {
    pub points: Option<usize>,
}

/// Synthetic ECG trace for the waveform widget. Generated fresh per
/// request, not persisted.
pub async fn monitor_waveform(
    store: web::Data<MonitorStore>,
    path: web::Path<String>,
    params: web::Query<WaveformParams>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    if store.get_monitor(&id).await?.is_none() {
        return Err(ApiError::NotFound("Monitor not found".into()));
    }
    let points = params
        .points
        .unwrap_or(DEFAULT_WAVEFORM_POINTS)
        .clamp(10, 1000);
    let wave = simulation::ecg_wave(points, &mut rand::thread_rng());
    Ok(HttpResponse::Ok().json(json!({
        "monitor_id": id,
        "points": wave,
    })))
}

/// One scoring pass over every monitor: generate a reading, score it,
/// assess the risks, persist, and raise whatever alarms the thresholds
/// demand. Alarms stack; nothing deduplicates against rows already active.
pub async fn run_scoring_pass(store: web::Data<MonitorStore>) -> Result<HttpResponse, ApiError> {
    let monitors = store.list_monitors().await?;
    let mut rng = rand::thread_rng();
    let mut alarms_raised = 0u32;

    for monitor in &monitors {
        let sample = simulation::generate_vitals(&mut rng);
        let ews = scoring::ews(&sample);
        let mews = scoring::mews(&sample);
        let risks = simulation::assess_risks(ews, &mut rng);

        store
            .insert_vital_sign(&build_vital_sign(&monitor.id, &sample, ews, mews, &risks))
            .await?;

        if let Some(trigger) = alarms::evaluate(ews, &risks) {
            store
                .insert_alarm(&Alarm {
                    id: Uuid::new_v4().to_string(),
                    monitor_id: monitor.id.clone(),
                    kind: trigger.kind,
                    severity: trigger.severity,
                    message: trigger.message.to_string(),
                    is_active: true,
                    is_muted: false,
                    timestamp: Utc::now(),
                })
                .await?;
            alarms_raised += 1;
        }
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Vital signs updated successfully",
        "monitors_updated": monitors.len(),
        "alarms_raised": alarms_raised,
    })))
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub monitor_id: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

pub async fn history(
    store: web::Data<MonitorStore>,
    params: web::Query<HistoryParams>,
) -> Result<HttpResponse, ApiError> {
    let start = params.start.as_deref().map(parse_rfc3339).transpose()?;
    let end = params.end.as_deref().map(parse_rfc3339).transpose()?;

    let query = HistoryQuery {
        monitor_id: params.monitor_id.clone(),
        start,
        end,
        page: params.page.unwrap_or(1).max(1),
        limit: params
            .limit
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .clamp(1, MAX_HISTORY_LIMIT),
    };

    let page = store.history(&query).await?;
    Ok(HttpResponse::Ok().json(page))
}

pub async fn statistics(store: web::Data<MonitorStore>) -> Result<HttpResponse, ApiError> {
    let stats = store.statistics().await?;
    Ok(HttpResponse::Ok().json(stats))
}

fn parse_rfc3339(value: &str) -> Result<DateTime<Utc>, ApiError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ApiError::BadRequest(format!("Invalid timestamp: {value}")))
}

fn build_vital_sign(
    monitor_id: &str,
    sample: &VitalSignsSample,
    ews: u32,
    mews: u32,
    risks: &RiskAssessment,
) -> VitalSign {
    VitalSign {
        id: Uuid::new_v4().to_string(),
        monitor_id: monitor_id.to_string(),
        heart_rate: sample.heart_rate,
        systolic_bp: sample.systolic_bp,
        diastolic_bp: sample.diastolic_bp,
        respiratory_rate: sample.respiratory_rate,
        temperature: sample.temperature,
        oxygen_saturation: sample.oxygen_saturation,
        ews_score: ews as i64,
        mews_score: mews as i64,
        sepsis_risk: risks.sepsis,
        sudden_death_risk: risks.sudden_death,
        timestamp: Utc::now(),
    }
}
