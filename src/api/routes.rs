//! Route table for the dashboard API.

use actix_web::web;

use super::handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/monitors", web::get().to(handlers::list_monitors))
            .route("/monitors", web::post().to(handlers::seed_monitors))
            .route("/monitors/{id}", web::get().to(handlers::monitor_detail))
            .route("/monitors/{id}/mute", web::post().to(handlers::mute_monitor_alarms))
            .route("/monitors/{id}/waveform", web::get().to(handlers::monitor_waveform))
            .route("/vital-signs", web::post().to(handlers::run_scoring_pass))
            .route("/history", web::get().to(handlers::history))
            .route("/statistics", web::get().to(handlers::statistics)),
    );
}
