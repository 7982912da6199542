//! Server configuration, deserialised from `config.toml` and `PLENUM_*`
//! environment variables.

use plenum_workflow::EngineConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host: String,
  #[serde(default = "default_port")]
  pub port: u16,

  /// Revocation windows, in hours.
  #[serde(default = "default_delay")]
  pub select_delay_hours:     i64,
  #[serde(default = "default_delay")]
  pub assessment_delay_hours: i64,
  #[serde(default = "default_delay")]
  pub review_delay_hours:     i64,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host: default_host(),
      port: default_port(),
      select_delay_hours: default_delay(),
      assessment_delay_hours: default_delay(),
      review_delay_hours: default_delay(),
    }
  }
}

impl ServerConfig {
  pub fn engine_config(&self) -> EngineConfig {
    EngineConfig {
      select_delay_hours:     self.select_delay_hours,
      assessment_delay_hours: self.assessment_delay_hours,
      review_delay_hours:     self.review_delay_hours,
    }
  }
}

fn default_host() -> String {
  "127.0.0.1".to_string()
}

fn default_port() -> u16 {
  8080
}

fn default_delay() -> i64 {
  48
}
