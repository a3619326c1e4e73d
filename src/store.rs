//! SQLite-backed persistence for monitors, readings and alarms.
//!
//! Readings are append-only; the scores stored with a reading are whatever
//! the scoring pass computed when it was recorded. Alarms are mutated only
//! through [`MonitorStore::mute_active_alarms`]; everything else is insert
//! or select.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::{debug, info, instrument};

use crate::models::{Alarm, AlarmKind, AlarmSeverity, Monitor, MonitorDetail, MonitorSummary, VitalSign};

/// How many readings the monitor detail view returns for charting.
const DETAIL_VITALS_LIMIT: i64 = 100;
/// How many alarms the monitor detail view returns.
const DETAIL_ALARMS_LIMIT: i64 = 50;

/// History query parameters, already validated by the API layer.
#[derive(Debug, Clone, Default)]
pub struct HistoryQuery {
    pub monitor_id: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub page: i64,
    pub limit: i64,
}

/// One history row: a reading joined with its monitor's display fields.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub vital_sign: VitalSign,
    pub monitor_name: String,
    pub monitor_location: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryPage {
    pub data: Vec<HistoryEntry>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatisticsOverview {
    pub total_monitors: i64,
    pub active_monitors: i64,
    pub total_vital_signs: i64,
    pub total_alarms: i64,
    pub active_alarms: i64,
    pub critical_alarms: i64,
}

/// Score averages over every stored reading; risks reported as percentages.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreAverages {
    pub ews_score: f64,
    pub mews_score: f64,
    pub sepsis_risk: f64,
    pub sudden_death_risk: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlarmKindCount {
    pub kind: AlarmKind,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlarmSeverityCount {
    pub severity: AlarmSeverity,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlarmBreakdown {
    pub by_kind: Vec<AlarmKindCount>,
    pub by_severity: Vec<AlarmSeverityCount>,
}

/// One point of the 24-hour trend series.
#[derive(Debug, Clone, Serialize)]
pub struct TrendPoint {
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

#[derive(Debug, Clone, Serialize)]
pub struct Statistics {
    pub overview: StatisticsOverview,
    pub averages: ScoreAverages,
    pub alarms: AlarmBreakdown,
    pub trend_last_24h: Vec<TrendPoint>,
    pub recent_vital_signs: Vec<HistoryEntry>,
}

/// Connection pool plus every query the dashboard needs.
#[derive(Clone)]
pub struct MonitorStore {
    pool: Arc<SqlitePool>,
}

impl MonitorStore {
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await?;
        info!(url, "connected to database");
        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Pool with a single connection, for in-memory databases where every
    /// connection would otherwise see its own empty schema.
    pub async fn connect_single(url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(url)
            .await?;
        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS monitors (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                location TEXT NOT NULL,
                patient_name TEXT NOT NULL,
                patient_age INTEGER NOT NULL,
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at INTEGER NOT NULL
            )",
        )
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS vital_signs (
                id TEXT PRIMARY KEY,
                monitor_id TEXT NOT NULL REFERENCES monitors(id),
                heart_rate REAL NOT NULL,
                systolic_bp REAL NOT NULL,
                diastolic_bp REAL NOT NULL,
                respiratory_rate REAL NOT NULL,
                temperature REAL NOT NULL,
                oxygen_saturation REAL NOT NULL,
                ews_score INTEGER NOT NULL,
                mews_score INTEGER NOT NULL,
                sepsis_risk REAL NOT NULL,
                sudden_death_risk REAL NOT NULL,
                timestamp INTEGER NOT NULL
            )",
        )
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS alarms (
                id TEXT PRIMARY KEY,
                monitor_id TEXT NOT NULL REFERENCES monitors(id),
                kind TEXT NOT NULL,
                severity TEXT NOT NULL,
                message TEXT NOT NULL,
                is_active INTEGER NOT NULL DEFAULT 1,
                is_muted INTEGER NOT NULL DEFAULT 0,
                timestamp INTEGER NOT NULL
            )",
        )
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_vital_signs_monitor_ts
             ON vital_signs (monitor_id, timestamp DESC)",
        )
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_alarms_monitor_active
             ON alarms (monitor_id, is_active)",
        )
        .execute(self.pool.as_ref())
        .await?;

        debug!("database schema ready");
        Ok(())
    }

    // ===== Monitors =====

    pub async fn count_monitors(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM monitors")
            .fetch_one(self.pool.as_ref())
            .await?;
        Ok(row.try_get("n")?)
    }

    #[instrument(skip(self, monitor), fields(monitor_id = %monitor.id, name = %monitor.name))]
    pub async fn insert_monitor(&self, monitor: &Monitor) -> Result<()> {
        sqlx::query(
            "INSERT INTO monitors (id, name, location, patient_name, patient_age, is_active, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&monitor.id)
        .bind(&monitor.name)
        .bind(&monitor.location)
        .bind(&monitor.patient_name)
        .bind(monitor.patient_age)
        .bind(monitor.is_active)
        .bind(monitor.created_at.timestamp())
        .execute(self.pool.as_ref())
        .await?;
        Ok(())
    }

    pub async fn list_monitors(&self) -> Result<Vec<Monitor>> {
        let rows = sqlx::query("SELECT * FROM monitors ORDER BY name")
            .fetch_all(self.pool.as_ref())
            .await?;
        rows.iter().map(monitor_from_row).collect()
    }

    pub async fn get_monitor(&self, id: &str) -> Result<Option<Monitor>> {
        let row = sqlx::query("SELECT * FROM monitors WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;
        row.as_ref().map(monitor_from_row).transpose()
    }

    /// Dashboard listing: every monitor with its most recent reading and
    /// the alarms still active for it.
    #[instrument(skip(self))]
    pub async fn list_monitor_summaries(&self) -> Result<Vec<MonitorSummary>> {
        let monitors = self.list_monitors().await?;
        let mut summaries = Vec::with_capacity(monitors.len());

        for monitor in monitors {
            let latest = sqlx::query(
                "SELECT * FROM vital_signs WHERE monitor_id = ?
                 ORDER BY timestamp DESC LIMIT 1",
            )
            .bind(&monitor.id)
            .fetch_optional(self.pool.as_ref())
            .await?;

            let alarm_rows = sqlx::query(
                "SELECT * FROM alarms WHERE monitor_id = ? AND is_active = 1
                 ORDER BY timestamp DESC",
            )
            .bind(&monitor.id)
            .fetch_all(self.pool.as_ref())
            .await?;

            summaries.push(MonitorSummary {
                latest_vital_sign: latest.as_ref().map(vital_sign_from_row).transpose()?,
                active_alarms: alarm_rows.iter().map(alarm_from_row).collect::<Result<_>>()?,
                monitor,
            });
        }

        Ok(summaries)
    }

    /// Detail view for one monitor: recent readings for charts plus the
    /// recent alarm history. Returns `None` for an unknown id.
    #[instrument(skip(self), fields(monitor_id = %id))]
    pub async fn monitor_detail(&self, id: &str) -> Result<Option<MonitorDetail>> {
        let monitor = match self.get_monitor(id).await? {
            Some(m) => m,
            None => return Ok(None),
        };

        let vital_rows = sqlx::query(
            "SELECT * FROM vital_signs WHERE monitor_id = ?
             ORDER BY timestamp DESC LIMIT ?",
        )
        .bind(id)
        .bind(DETAIL_VITALS_LIMIT)
        .fetch_all(self.pool.as_ref())
        .await?;

        let alarm_rows = sqlx::query(
            "SELECT * FROM alarms WHERE monitor_id = ?
             ORDER BY timestamp DESC LIMIT ?",
        )
        .bind(id)
        .bind(DETAIL_ALARMS_LIMIT)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(Some(MonitorDetail {
            monitor,
            vital_signs: vital_rows.iter().map(vital_sign_from_row).collect::<Result<_>>()?,
            alarms: alarm_rows.iter().map(alarm_from_row).collect::<Result<_>>()?,
        }))
    }

    // ===== Vital signs =====

    #[instrument(skip(self, vital), fields(monitor_id = %vital.monitor_id, ews = vital.ews_score))]
    pub async fn insert_vital_sign(&self, vital: &VitalSign) -> Result<()> {
        sqlx::query(
            "INSERT INTO vital_signs
             (id, monitor_id, heart_rate, systolic_bp, diastolic_bp, respiratory_rate,
              temperature, oxygen_saturation, ews_score, mews_score, sepsis_risk,
              sudden_death_risk, timestamp)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&vital.id)
        .bind(&vital.monitor_id)
        .bind(vital.heart_rate)
        .bind(vital.systolic_bp)
        .bind(vital.diastolic_bp)
        .bind(vital.respiratory_rate)
        .bind(vital.temperature)
        .bind(vital.oxygen_saturation)
        .bind(vital.ews_score)
        .bind(vital.mews_score)
        .bind(vital.sepsis_risk)
        .bind(vital.sudden_death_risk)
        .bind(vital.timestamp.timestamp())
        .execute(self.pool.as_ref())
        .await?;
        Ok(())
    }

    /// Paged reading history, optionally filtered to one monitor and a
    /// time range. Newest first.
    #[instrument(skip(self, query))]
    pub async fn history(&self, query: &HistoryQuery) -> Result<HistoryPage> {
        let mut conditions = Vec::new();
        if query.monitor_id.is_some() {
            conditions.push("v.monitor_id = ?");
        }
        if query.start.is_some() && query.end.is_some() {
            conditions.push("v.timestamp >= ? AND v.timestamp <= ?");
        }
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        let select_sql = format!(
            "SELECT v.*, m.name AS monitor_name, m.location AS monitor_location
             FROM vital_signs v JOIN monitors m ON m.id = v.monitor_id{where_clause}
             ORDER BY v.timestamp DESC LIMIT ? OFFSET ?"
        );
        let count_sql =
            format!("SELECT COUNT(*) AS n FROM vital_signs v{where_clause}");

        let offset = (query.page - 1).max(0) * query.limit;

        let mut select = sqlx::query(&select_sql);
        let mut count = sqlx::query(&count_sql);
        if let Some(id) = &query.monitor_id {
            select = select.bind(id);
            count = count.bind(id);
        }
        if let (Some(start), Some(end)) = (query.start, query.end) {
            select = select.bind(start.timestamp()).bind(end.timestamp());
            count = count.bind(start.timestamp()).bind(end.timestamp());
        }
        select = select.bind(query.limit).bind(offset);

        let rows = select.fetch_all(self.pool.as_ref()).await?;
        let total: i64 = count.fetch_one(self.pool.as_ref()).await?.try_get("n")?;

        let data = rows
            .iter()
            .map(history_entry_from_row)
            .collect::<Result<Vec<_>>>()?;

        Ok(HistoryPage {
            data,
            pagination: Pagination {
                page: query.page,
                limit: query.limit,
                total,
                pages: (total + query.limit - 1) / query.limit.max(1),
            },
        })
    }

    // ===== Alarms =====

    #[instrument(skip(self, alarm), fields(monitor_id = %alarm.monitor_id, severity = alarm.severity.as_str()))]
    pub async fn insert_alarm(&self, alarm: &Alarm) -> Result<()> {
        sqlx::query(
            "INSERT INTO alarms (id, monitor_id, kind, severity, message, is_active, is_muted, timestamp)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&alarm.id)
        .bind(&alarm.monitor_id)
        .bind(alarm.kind.as_str())
        .bind(alarm.severity.as_str())
        .bind(&alarm.message)
        .bind(alarm.is_active)
        .bind(alarm.is_muted)
        .bind(alarm.timestamp.timestamp())
        .execute(self.pool.as_ref())
        .await?;
        Ok(())
    }

    /// Mute every active alarm for a monitor. Returns how many rows changed.
    #[instrument(skip(self), fields(monitor_id = %monitor_id))]
    pub async fn mute_active_alarms(&self, monitor_id: &str) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE alarms SET is_muted = 1 WHERE monitor_id = ? AND is_active = 1",
        )
        .bind(monitor_id)
        .execute(self.pool.as_ref())
        .await?;
        Ok(result.rows_affected())
    }

    // ===== Statistics =====

    #[instrument(skip(self))]
    pub async fn statistics(&self) -> Result<Statistics> {
        let overview = StatisticsOverview {
            total_monitors: self.scalar("SELECT COUNT(*) AS n FROM monitors").await?,
            active_monitors: self
                .scalar("SELECT COUNT(*) AS n FROM monitors WHERE is_active = 1")
                .await?,
            total_vital_signs: self.scalar("SELECT COUNT(*) AS n FROM vital_signs").await?,
            total_alarms: self.scalar("SELECT COUNT(*) AS n FROM alarms").await?,
            active_alarms: self
                .scalar("SELECT COUNT(*) AS n FROM alarms WHERE is_active = 1")
                .await?,
            critical_alarms: self
                .scalar("SELECT COUNT(*) AS n FROM alarms WHERE is_active = 1 AND severity = 'CRITICAL'")
                .await?,
        };

        let avg_row = sqlx::query(
            "SELECT AVG(ews_score) AS ews, AVG(mews_score) AS mews,
                    AVG(sepsis_risk) AS sepsis, AVG(sudden_death_risk) AS sudden
             FROM vital_signs",
        )
        .fetch_one(self.pool.as_ref())
        .await?;
        let averages = ScoreAverages {
            ews_score: avg_row.try_get::<Option<f64>, _>("ews")?.unwrap_or(0.0),
            mews_score: avg_row.try_get::<Option<f64>, _>("mews")?.unwrap_or(0.0),
            sepsis_risk: avg_row.try_get::<Option<f64>, _>("sepsis")?.unwrap_or(0.0) * 100.0,
            sudden_death_risk: avg_row
                .try_get::<Option<f64>, _>("sudden")?
                .unwrap_or(0.0)
                * 100.0,
        };

        let kind_rows = sqlx::query(
            "SELECT kind, COUNT(*) AS n FROM alarms WHERE is_active = 1 GROUP BY kind",
        )
        .fetch_all(self.pool.as_ref())
        .await?;
        let by_kind = kind_rows
            .iter()
            .map(|row| {
                let kind: String = row.try_get("kind")?;
                Ok(AlarmKindCount {
                    kind: AlarmKind::parse(&kind)
                        .ok_or_else(|| anyhow!("unknown alarm kind: {kind}"))?,
                    count: row.try_get("n")?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let severity_rows = sqlx::query(
            "SELECT severity, COUNT(*) AS n FROM alarms WHERE is_active = 1 GROUP BY severity",
        )
        .fetch_all(self.pool.as_ref())
        .await?;
        let by_severity = severity_rows
            .iter()
            .map(|row| {
                let severity: String = row.try_get("severity")?;
                Ok(AlarmSeverityCount {
                    severity: AlarmSeverity::parse(&severity)
                        .ok_or_else(|| anyhow!("unknown alarm severity: {severity}"))?,
                    count: row.try_get("n")?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let since = Utc::now() - chrono::Duration::hours(24);
        let trend_rows = sqlx::query(
            "SELECT * FROM vital_signs WHERE timestamp >= ? ORDER BY timestamp ASC",
        )
        .bind(since.timestamp())
        .fetch_all(self.pool.as_ref())
        .await?;
        let trend = trend_rows
            .iter()
            .map(trend_point_from_row)
            .collect::<Result<Vec<_>>>()?;

        let recent_rows = sqlx::query(
            "SELECT v.*, m.name AS monitor_name, m.location AS monitor_location
             FROM vital_signs v JOIN monitors m ON m.id = v.monitor_id
             ORDER BY v.timestamp DESC LIMIT 20",
        )
        .fetch_all(self.pool.as_ref())
        .await?;
        let recent = recent_rows
            .iter()
            .map(history_entry_from_row)
            .collect::<Result<Vec<_>>>()?;

        Ok(Statistics {
            overview,
            averages,
            alarms: AlarmBreakdown {
                by_kind,
                by_severity,
            },
            trend_last_24h: trend,
            recent_vital_signs: recent,
        })
    }

    async fn scalar(&self, sql: &str) -> Result<i64> {
        let row = sqlx::query(sql).fetch_one(self.pool.as_ref()).await?;
        Ok(row.try_get("n")?)
    }
}

fn timestamp_from_secs(secs: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| anyhow!("invalid timestamp: {secs}"))
}

fn monitor_from_row(row: &SqliteRow) -> Result<Monitor> {
    Ok(Monitor {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        location: row.try_get("location")?,
        patient_name: row.try_get("patient_name")?,
        patient_age: row.try_get("patient_age")?,
        is_active: row.try_get("is_active")?,
        created_at: timestamp_from_secs(row.try_get("created_at")?)?,
    })
}

fn vital_sign_from_row(row: &SqliteRow) -> Result<VitalSign> {
    Ok(VitalSign {
        id: row.try_get("id")?,
        monitor_id: row.try_get("monitor_id")?,
        heart_rate: row.try_get("heart_rate")?,
        systolic_bp: row.try_get("systolic_bp")?,
        diastolic_bp: row.try_get("diastolic_bp")?,
        respiratory_rate: row.try_get("respiratory_rate")?,
        temperature: row.try_get("temperature")?,
        oxygen_saturation: row.try_get("oxygen_saturation")?,
        ews_score: row.try_get("ews_score")?,
        mews_score: row.try_get("mews_score")?,
        sepsis_risk: row.try_get("sepsis_risk")?,
        sudden_death_risk: row.try_get("sudden_death_risk")?,
        timestamp: timestamp_from_secs(row.try_get("timestamp")?)?,
    })
}

fn alarm_from_row(row: &SqliteRow) -> Result<Alarm> {
    let kind: String = row.try_get("kind")?;
    let severity: String = row.try_get("severity")?;
    Ok(Alarm {
        id: row.try_get("id")?,
        monitor_id: row.try_get("monitor_id")?,
        kind: AlarmKind::parse(&kind).ok_or_else(|| anyhow!("unknown alarm kind: {kind}"))?,
        severity: AlarmSeverity::parse(&severity)
            .ok_or_else(|| anyhow!("unknown alarm severity: {severity}"))?,
        message: row.try_get("message")?,
        is_active: row.try_get("is_active")?,
        is_muted: row.try_get("is_muted")?,
        timestamp: timestamp_from_secs(row.try_get("timestamp")?)?,
    })
}

fn history_entry_from_row(row: &SqliteRow) -> Result<HistoryEntry> {
    Ok(HistoryEntry {
        vital_sign: vital_sign_from_row(row)?,
        monitor_name: row.try_get("monitor_name")?,
        monitor_location: row.try_get("monitor_location")?,
    })
}

fn trend_point_from_row(row: &SqliteRow) -> Result<TrendPoint> {
    Ok(TrendPoint {
        heart_rate: row.try_get("heart_rate")?,
        systolic_bp: row.try_get("systolic_bp")?,
        diastolic_bp: row.try_get("diastolic_bp")?,
        respiratory_rate: row.try_get("respiratory_rate")?,
        temperature: row.try_get("temperature")?,
        oxygen_saturation: row.try_get("oxygen_saturation")?,
        ews_score: row.try_get("ews_score")?,
        mews_score: row.try_get("mews_score")?,
        sepsis_risk: row.try_get("sepsis_risk")?,
        sudden_death_risk: row.try_get("sudden_death_risk")?,
        timestamp: timestamp_from_secs(row.try_get("timestamp")?)?,
    })
}
