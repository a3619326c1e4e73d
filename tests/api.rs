//! End-to-end API tests against an in-memory SQLite store.

use actix_web::{test, web, App};
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use vigil::api;
use vigil::config::Config;
use vigil::models::{Alarm, AlarmKind, AlarmSeverity};
use vigil::store::MonitorStore;

const TEST_MONITORS: u32 = 4;

async fn setup_store() -> MonitorStore {
    let store = MonitorStore::connect_single("sqlite::memory:")
        .await
        .expect("connect in-memory db");
    store.init_schema().await.expect("init schema");
    store
}

fn test_config() -> Config {
    let mut config = Config::default();
    config.simulation.monitors = TEST_MONITORS;
    config
}

macro_rules! test_app {
    ($store:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($store.clone()))
                .app_data(web::Data::new(test_config()))
                .configure(api::configure),
        )
        .await
    };
}

macro_rules! get_json {
    ($app:expr, $uri:expr) => {{
        let req = test::TestRequest::get().uri($uri).to_request();
        let body: Value = test::call_and_read_body_json(&$app, req).await;
        body
    }};
}

macro_rules! post {
    ($app:expr, $uri:expr) => {
        test::call_service(&$app, test::TestRequest::post().uri($uri).to_request()).await
    };
}

macro_rules! get {
    ($app:expr, $uri:expr) => {
        test::call_service(&$app, test::TestRequest::get().uri($uri).to_request()).await
    };
}

#[actix_web::test]
async fn health_endpoint_responds() {
    let store = setup_store().await;
    let app = test_app!(store);

    let body = get_json!(app, "/api/health");
    assert_eq!(body["status"], "ok");
}

#[actix_web::test]
async fn seeding_creates_the_fleet_with_initial_readings() {
    let store = setup_store().await;
    let app = test_app!(store);

    let resp = post!(app, "/api/monitors");
    assert!(resp.status().is_success());

    let monitors = get_json!(app, "/api/monitors");
    let monitors = monitors.as_array().expect("array of monitors");
    assert_eq!(monitors.len(), TEST_MONITORS as usize);

    for monitor in monitors {
        assert!(monitor["name"].as_str().unwrap().starts_with("Monitor "));
        assert!(monitor["is_active"].as_bool().unwrap());
        let age = monitor["patient_age"].as_i64().unwrap();
        assert!((25..75).contains(&age));

        let vital = &monitor["latest_vital_sign"];
        assert!(!vital.is_null(), "seeded monitor has an initial reading");
        // Seeded risks stay in the low bands.
        assert!(vital["sepsis_risk"].as_f64().unwrap() < 0.3);
        assert!(vital["sudden_death_risk"].as_f64().unwrap() < 0.2);
    }
}

#[actix_web::test]
async fn seeding_twice_is_a_no_op() {
    let store = setup_store().await;
    let app = test_app!(store);

    post!(app, "/api/monitors");
    let resp = post!(app, "/api/monitors");
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Monitors already exist");

    assert_eq!(store.count_monitors().await.unwrap(), TEST_MONITORS as i64);
}

#[actix_web::test]
async fn scoring_pass_appends_one_reading_per_monitor() {
    let store = setup_store().await;
    let app = test_app!(store);

    post!(app, "/api/monitors");
    let resp = post!(app, "/api/vital-signs");
    assert!(resp.status().is_success());
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["monitors_updated"].as_u64().unwrap(), TEST_MONITORS as u64);

    let monitors = get_json!(app, "/api/monitors");
    for monitor in monitors.as_array().unwrap() {
        let vital = &monitor["latest_vital_sign"];
        let hr = vital["heart_rate"].as_f64().unwrap();
        let spo2 = vital["oxygen_saturation"].as_f64().unwrap();
        assert!((40.0..=150.0).contains(&hr));
        assert!((85.0..=100.0).contains(&spo2));

        // Anything the threshold evaluator raises is HIGH or CRITICAL;
        // MEDIUM only ever comes from the seeding demo alarms.
        for alarm in monitor["active_alarms"].as_array().unwrap() {
            let severity = alarm["severity"].as_str().unwrap();
            let kind = alarm["kind"].as_str().unwrap();
            if kind != "VITAL_SIGN" {
                assert!(severity == "HIGH" || severity == "CRITICAL");
            }
        }
    }
}

#[actix_web::test]
async fn monitor_detail_returns_history_and_404_for_unknown_ids() {
    let store = setup_store().await;
    let app = test_app!(store);

    post!(app, "/api/monitors");
    post!(app, "/api/vital-signs");

    let monitors = get_json!(app, "/api/monitors");
    let id = monitors[0]["id"].as_str().unwrap().to_string();

    let detail = get_json!(app, &format!("/api/monitors/{id}"));
    assert_eq!(detail["id"], id.as_str());
    let vitals = detail["vital_signs"].as_array().unwrap();
    assert_eq!(vitals.len(), 2, "seed reading plus one scoring pass");

    let resp = get!(app, "/api/monitors/no-such-id");
    assert_eq!(resp.status(), 404);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Monitor not found");
}

#[actix_web::test]
async fn muting_flags_every_active_alarm() {
    let store = setup_store().await;
    let app = test_app!(store);

    post!(app, "/api/monitors");
    let monitors = get_json!(app, "/api/monitors");
    let id = monitors[0]["id"].as_str().unwrap().to_string();

    // Stack two active alarms directly; the evaluator never deduplicates.
    for _ in 0..2 {
        store
            .insert_alarm(&Alarm {
                id: Uuid::new_v4().to_string(),
                monitor_id: id.clone(),
                kind: AlarmKind::EwsHigh,
                severity: AlarmSeverity::High,
                message: "Elevated EWS - assessment required".into(),
                is_active: true,
                is_muted: false,
                timestamp: Utc::now(),
            })
            .await
            .unwrap();
    }

    let resp = post!(app, &format!("/api/monitors/{id}/mute"));
    assert!(resp.status().is_success());
    let body: Value = test::read_body_json(resp).await;
    assert!(body["muted"].as_u64().unwrap() >= 2);

    let detail = get_json!(app, &format!("/api/monitors/{id}"));
    for alarm in detail["alarms"].as_array().unwrap() {
        assert!(alarm["is_muted"].as_bool().unwrap());
        // Muting does not deactivate.
        assert!(alarm["is_active"].as_bool().unwrap());
    }

    let resp = post!(app, "/api/monitors/no-such-id/mute");
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn history_pages_and_filters() {
    let store = setup_store().await;
    let app = test_app!(store);

    post!(app, "/api/monitors");
    for _ in 0..3 {
        post!(app, "/api/vital-signs");
    }
    // 4 monitors x (1 seed reading + 3 scoring passes).
    let expected_total = (TEST_MONITORS * 4) as i64;
    let expected_pages = (expected_total + 4) / 5;

    let page = get_json!(app, "/api/history?limit=5&page=1");
    assert_eq!(page["data"].as_array().unwrap().len(), 5);
    assert_eq!(page["pagination"]["total"].as_i64().unwrap(), expected_total);
    assert_eq!(page["pagination"]["pages"].as_i64().unwrap(), expected_pages);

    let last = get_json!(app, &format!("/api/history?limit=5&page={expected_pages}"));
    let remainder = (expected_total % 5) as usize;
    let expected_len = if remainder == 0 { 5 } else { remainder };
    assert_eq!(last["data"].as_array().unwrap().len(), expected_len);

    // Filter to one monitor.
    let monitors = get_json!(app, "/api/monitors");
    let id = monitors[0]["id"].as_str().unwrap();
    let filtered = get_json!(app, &format!("/api/history?monitor_id={id}"));
    assert_eq!(filtered["pagination"]["total"].as_i64().unwrap(), 4);
    for entry in filtered["data"].as_array().unwrap() {
        assert_eq!(entry["monitor_id"].as_str().unwrap(), id);
        assert!(entry["monitor_name"].as_str().unwrap().starts_with("Monitor "));
    }

    // A time range in the future matches nothing.
    let empty = get_json!(
        app,
        "/api/history?start=2099-01-01T00:00:00Z&end=2099-01-02T00:00:00Z"
    );
    assert_eq!(empty["pagination"]["total"].as_i64().unwrap(), 0);

    let resp = get!(app, "/api/history?start=yesterday&end=today");
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn statistics_reflect_stored_data() {
    let store = setup_store().await;
    let app = test_app!(store);

    post!(app, "/api/monitors");
    post!(app, "/api/vital-signs");

    let stats = get_json!(app, "/api/statistics");
    let overview = &stats["overview"];
    assert_eq!(overview["total_monitors"].as_i64().unwrap(), TEST_MONITORS as i64);
    assert_eq!(overview["active_monitors"].as_i64().unwrap(), TEST_MONITORS as i64);
    assert_eq!(
        overview["total_vital_signs"].as_i64().unwrap(),
        (TEST_MONITORS * 2) as i64
    );
    assert!(
        overview["active_alarms"].as_i64().unwrap() <= overview["total_alarms"].as_i64().unwrap()
    );

    // Risk averages are reported as percentages.
    let sepsis_avg = stats["averages"]["sepsis_risk"].as_f64().unwrap();
    assert!((0.0..=100.0).contains(&sepsis_avg));

    // Everything stored so far falls inside the 24h trend window.
    assert_eq!(
        stats["trend_last_24h"].as_array().unwrap().len(),
        (TEST_MONITORS * 2) as usize
    );
    assert!(stats["recent_vital_signs"].as_array().unwrap().len() <= 20);
}

#[actix_web::test]
async fn waveform_returns_a_trace_for_known_monitors() {
    let store = setup_store().await;
    let app = test_app!(store);

    post!(app, "/api/monitors");
    let monitors = get_json!(app, "/api/monitors");
    let id = monitors[0]["id"].as_str().unwrap();

    let wave = get_json!(app, &format!("/api/monitors/{id}/waveform?points=64"));
    assert_eq!(wave["monitor_id"].as_str().unwrap(), id);
    assert_eq!(wave["points"].as_array().unwrap().len(), 64);

    let resp = get!(app, "/api/monitors/no-such-id/waveform");
    assert_eq!(resp.status(), 404);
}
