//! Motor provider for name-based provisioning.
//!
//! Resolves logical motor names from configuration into ready-to-use
//! controllers. The provider is an ordinary value owned by the application, so
//! its lifetime is the application's, and each name is handed out at most once.

use alloc::boxed::Box;

use heapless::{FnvIndexSet, String};

use crate::config::{validate_config, ControllerKind, HalConfig, MotorConfig};
use crate::controller::{
    CanSpeedController, ErrorCode, RevStatus, SparkMax, SparkMode, TalonFx, TalonMode,
};
use crate::error::{truncated, ConfigError, Error, Result};
use crate::transport::Transport;

/// Source of exclusive device handles, keyed by CAN device id.
pub trait DeviceBus {
    /// Transport for CTRE devices.
    type Ctre: Transport<Mode = TalonMode, Status = ErrorCode> + 'static;

    /// Transport for REV devices.
    type Rev: Transport<Mode = SparkMode, Status = RevStatus> + 'static;

    /// Open the CTRE device with `device_id`.
    fn open_ctre(&mut self, device_id: u8) -> Result<Self::Ctre>;

    /// Open the REV device with `device_id`.
    fn open_rev(&mut self, device_id: u8) -> Result<Self::Rev>;
}

/// Hands out configured motor controllers by logical name.
///
/// # Example
///
/// ```rust,ignore
/// use motor_hal::{load_config, MotorProvider};
///
/// let config = load_config("motors.toml")?;
/// let mut provider = MotorProvider::new(config, bus)?;
///
/// let mut left = provider.can_motor("exampleMechanism.leftMotor")?;
/// left.set(0.5)?;
/// ```
pub struct MotorProvider<B: DeviceBus> {
    /// Validated configuration.
    config: HalConfig,
    /// Device bus used to open transports.
    bus: B,
    /// Names already handed out.
    claimed: FnvIndexSet<String<48>, 32>,
}

impl<B: DeviceBus> MotorProvider<B> {
    /// Create a provider after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns the first validation error in `config`.
    pub fn new(config: HalConfig, bus: B) -> Result<Self> {
        validate_config(&config)?;
        Ok(Self {
            config,
            bus,
            claimed: FnvIndexSet::new(),
        })
    }

    /// Get the configuration.
    pub fn config(&self) -> &HalConfig {
        &self.config
    }

    /// Get the device bus.
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Check if a motor name exists in the configuration.
    pub fn has_motor(&self, name: &str) -> bool {
        self.config.motor(name).is_some()
    }

    /// Check if a motor has already been handed out.
    pub fn is_claimed(&self, name: &str) -> bool {
        self.claimed.iter().any(|k| k.as_str() == name)
    }

    /// Number of motors handed out so far.
    pub fn claimed_count(&self) -> usize {
        self.claimed.len()
    }

    /// Build, configure, and hand out the controller named `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The name is not configured
    /// - The name was already handed out
    /// - The bus cannot open the device
    /// - The device rejects one of the configured settings
    pub fn can_motor(&mut self, name: &str) -> Result<Box<dyn CanSpeedController>> {
        let key: String<48> = truncated(name);

        let motor = self
            .config
            .motor(name)
            .ok_or_else(|| Error::Config(ConfigError::MotorNotFound(key.clone())))?;

        if self.claimed.contains(&key) {
            return Err(Error::Config(ConfigError::MotorAlreadyClaimed(key)));
        }

        let mut controller = open(&mut self.bus, motor, self.config.timeout())?;
        motor.apply(controller.as_mut()).map_err(|e| {
            tracing::error!(motor = name, error = %e, "motor configuration rejected");
            e
        })?;

        // Capacity matches the motor table, so this cannot overflow.
        let _ = self.claimed.insert(key);

        tracing::info!(
            motor = name,
            family = %motor.family(),
            device_id = motor.device_id,
            "motor controller provisioned"
        );
        Ok(controller)
    }
}

fn open<B: DeviceBus>(
    bus: &mut B,
    motor: &MotorConfig,
    timeout: core::time::Duration,
) -> Result<Box<dyn CanSpeedController>> {
    let controller: Box<dyn CanSpeedController> = match motor.kind {
        ControllerKind::TalonFx => {
            let transport = bus.open_ctre(motor.device_id)?;
            Box::new(TalonFx::new(motor.device_id, transport).with_timeout(timeout))
        }
        ControllerKind::SparkMax => {
            let transport = bus.open_rev(motor.device_id)?;
            Box::new(SparkMax::new(motor.device_id, transport).with_timeout(timeout))
        }
    };
    Ok(controller)
}
