//! Configuration validation.

use crate::error::{ConfigError, Error, Result};

use super::{HalConfig, MotorConfig};

/// Highest CAN device id accepted by either family.
pub const MAX_DEVICE_ID: u8 = 62;

/// Validate a HAL configuration.
///
/// Checks:
/// - Timeout is non-zero
/// - Device ids are in range and bound to at most one motor per family
/// - Ramps are finite and non-negative
/// - Gains are finite
/// - Output ranges satisfy -1 <= min <= max <= 1
pub fn validate_config(config: &HalConfig) -> Result<()> {
    if config.timeout_ms == 0 {
        return Err(Error::Config(ConfigError::InvalidTimeout(config.timeout_ms)));
    }

    for (_, motor) in config.motors.iter() {
        validate_motor(motor)?;
    }

    let motors: heapless::Vec<&MotorConfig, 32> = config.motors.values().collect();
    for (i, a) in motors.iter().enumerate() {
        for b in &motors[i + 1..] {
            if a.family() == b.family() && a.device_id == b.device_id {
                return Err(Error::Config(ConfigError::DuplicateDevice {
                    family: a.family(),
                    device_id: a.device_id,
                }));
            }
        }
    }

    Ok(())
}

fn validate_motor(config: &MotorConfig) -> Result<()> {
    if config.device_id > MAX_DEVICE_ID {
        return Err(Error::Config(ConfigError::InvalidDeviceId(config.device_id)));
    }

    for ramp in [config.open_loop_ramp, config.closed_loop_ramp].into_iter().flatten() {
        if !ramp.is_finite() || ramp < 0.0 {
            return Err(Error::Config(ConfigError::InvalidRamp(ramp)));
        }
    }

    if let Some(gains) = config.gains {
        if let Some(bad) = gains.values().find(|g| !g.is_finite()) {
            return Err(Error::Config(ConfigError::InvalidGain(bad)));
        }
    }

    if let Some(range) = config.output_range {
        if !range.is_valid() {
            return Err(Error::Config(ConfigError::InvalidOutputRange {
                min: range.min,
                max: range.max,
            }));
        }
    }

    Ok(())
}
