use std::env;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use rotator_api::models::DISCOVERY_PORT;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
    pub location: String,
    pub verbose_driver_exceptions: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logger {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Discovery {
    pub enabled: bool,
    #[serde(default = "default_discovery_port")]
    pub port: u16,
}

fn default_discovery_port() -> u16 {
    DISCOVERY_PORT
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    /// Number of simulated rotators, addressed as 0..count
    pub count: u32,
    pub can_reverse: bool,
    /// Degrees advanced per motion step
    pub step_size: f64,
    pub steps_per_sec: u32,
}

impl Device {
    pub fn step_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.steps_per_sec.max(1) as f64)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub logger: Logger,
    pub discovery: Discovery,
    pub device: Device,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or("development".into());

        let settings: Settings = Config::builder()
            .add_source(File::with_name("configs/default"))
            .add_source(File::with_name(&format!("configs/{run_mode}")).required(false))
            .add_source(Environment::with_prefix("ROTATOR").separator("__"))
            .build()?
            .try_deserialize()?;

        settings.validate()?;

        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.device.count == 0 {
            return Err(ConfigError::Message(
                "device.count must be at least 1".to_string(),
            ));
        }

        if !self.device.step_size.is_finite() || self.device.step_size <= 0.0 {
            return Err(ConfigError::Message(format!(
                "device.step_size must be a positive number, got {}",
                self.device.step_size
            )));
        }

        if self.device.steps_per_sec == 0 {
            return Err(ConfigError::Message(
                "device.steps_per_sec must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
