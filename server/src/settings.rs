use std::default::Default;
use std::env;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Layer the configuration files and the environment, lowest priority first.
pub fn load() -> Result<Settings, ConfigError> {
    let run_mode = env::var(RUN_MODE_ENV).unwrap_or_else(|_| "development".into());
    Config::builder()
        .add_source(File::with_name(DEFAULT_CFG_PATH).required(false))
        .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
        .add_source(File::with_name(LOCAL_CFG_PATH).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}

const DEFAULT_CFG_PATH: &str = "config/default";
const LOCAL_CFG_PATH: &str = "config/local";
const RUN_MODE_ENV: &str = "SIXTYSIX_SERVER_RUN_MODE";
const ENV_PREFIX: &str = "SIXTYSIX_SERVER";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub logging: Logging,
    pub runtime: Runtime,
    pub server: Server,
    pub game: sixtysix_game::Settings,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub level: String,
}

impl Default for Logging {
    fn default() -> Self {
        Logging {
            level: "info".into(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Runtime {
    pub threaded: bool,
    pub worker_threads: usize,
    pub max_blocking_threads: usize,
    pub thread_name: String,
}

impl Default for Runtime {
    fn default() -> Self {
        let num_cores = num_cpus::get_physical();
        Runtime {
            threaded: true,
            worker_threads: num_cores,
            max_blocking_threads: num_cores * 2,
            thread_name: "sixtysix-worker".into(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Server {
    pub bind_addr: String,
}

impl Default for Server {
    fn default() -> Self {
        Server {
            bind_addr: "127.0.0.1:6666".into(),
        }
    }
}
