//! Vigil core library
//!
//! Simulated ICU monitoring backend: synthetic vital signs, early-warning
//! scores, alarm evaluation and the HTTP API the dashboard consumes.

pub mod alarms;
pub mod api;
pub mod models;
pub mod scoring;
pub mod simulation;
pub mod store;

/// Application configuration
pub mod config {
    use serde::Deserialize;

    #[derive(Debug, Clone, Deserialize)]
    pub struct Config {
        pub server: ServerConfig,
        pub database: DatabaseConfig,
        pub simulation: SimulationConfig,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ServerConfig {
        pub host: String,
        pub port: u16,
        /// Directory of static dashboard assets served at `/`.
        pub assets_dir: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct DatabaseConfig {
        pub url: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct SimulationConfig {
        /// Number of bedside monitors seeded at initialization.
        pub monitors: u32,
    }

    impl Default for Config {
        fn default() -> Self {
            Config {
                server: ServerConfig {
                    host: "127.0.0.1".into(),
                    port: 8080,
                    assets_dir: "./web".into(),
                },
                database: DatabaseConfig {
                    url: "sqlite::memory:".into(),
                },
                simulation: SimulationConfig { monitors: 16 },
            }
        }
    }

    /// Load configuration from file, layered with environment overrides
    pub fn load_config() -> Result<Config, config::ConfigError> {
        let env = std::env::var("VIGIL_ENV").unwrap_or_else(|_| "development".into());

        config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(config::Environment::with_prefix("VIGIL").separator("__"))
            .build()?
            .try_deserialize()
    }
}
