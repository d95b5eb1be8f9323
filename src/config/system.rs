//! System configuration - root configuration structure.

use core::time::Duration;

use heapless::{FnvIndexMap, String};
use serde::Deserialize;

use super::motor::MotorConfig;

/// Root configuration structure from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct HalConfig {
    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u16,

    /// Motors keyed by logical name (e.g. `"exampleMechanism.leftMotor"`).
    #[serde(default)]
    pub motors: FnvIndexMap<String<48>, MotorConfig, 32>,
}

fn default_timeout_ms() -> u16 {
    20
}

impl HalConfig {
    /// Get a motor configuration by name.
    pub fn motor(&self, name: &str) -> Option<&MotorConfig> {
        self.motors
            .iter()
            .find(|(k, _)| k.as_str() == name)
            .map(|(_, v)| v)
    }

    /// Request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.timeout_ms))
    }
}

impl Default for HalConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            motors: FnvIndexMap::new(),
        }
    }
}
