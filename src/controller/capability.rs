//! Capability contract shared by every motor controller.
//!
//! Mechanism code talks only to these traits. Both are object safe so that a
//! provider can hand out `Box<dyn CanSpeedController>` without exposing the
//! device family behind it.

use crate::controller::{ControlMode, FeedbackSensor, NativeDevice, NeutralMode};
use crate::error::Result;

/// Minimal open-loop motor controller.
pub trait SpeedController {
    /// Command open-loop output, conventionally in `-1.0..=1.0`.
    ///
    /// No clamping is applied beyond what the device itself does.
    fn set(&mut self, power: f64) -> Result<()>;

    /// Current output as a fraction of supply.
    fn get(&mut self) -> f64;

    /// Invert the direction of positive output.
    fn set_inverted(&mut self, inverted: bool) -> Result<()>;

    /// Whether output is inverted.
    fn inverted(&self) -> bool;

    /// Force open-loop zero output. Idempotent.
    fn stop_motor(&mut self) -> Result<()>;
}

/// Full smart motor controller reachable over CAN.
pub trait CanSpeedController: SpeedController {
    /// Physical device behind this controller.
    fn device(&self) -> NativeDevice;

    /// Command `value` under `mode`.
    ///
    /// Velocity is given in sensor units per second. Closed-loop modes carry
    /// the stored arbitrary feed-forward term.
    fn set_control(&mut self, mode: ControlMode, value: f64) -> Result<()>;

    /// Generic mode of the last transmitted command, if any.
    fn control_mode(&self) -> Option<ControlMode>;

    /// Selected sensor position in sensor units.
    fn sensor_position(&mut self) -> f64;

    /// Selected sensor velocity in sensor units per second.
    fn sensor_velocity(&mut self) -> f64;

    /// Overwrite the sensor accumulator with an absolute position.
    fn set_position(&mut self, position: f64) -> Result<()>;

    /// Mirror `leader`'s output.
    ///
    /// Fails with [`ControllerError::IncompatibleFollower`] before touching the
    /// bus if `leader` belongs to another device family.
    ///
    /// [`ControllerError::IncompatibleFollower`]: crate::error::ControllerError::IncompatibleFollower
    fn follow(&mut self, leader: &dyn CanSpeedController) -> Result<()>;

    /// Minimum seconds from neutral to full output in open loop.
    fn set_open_loop_ramp(&mut self, seconds_from_neutral_to_full: f64) -> Result<()>;

    /// Minimum seconds from neutral to full output in closed loop.
    fn set_closed_loop_ramp(&mut self, seconds_from_neutral_to_full: f64) -> Result<()>;

    /// Configure the velocity feed-forward gain (kF).
    fn set_ff(&mut self, value: f64) -> Result<()>;

    /// Configure the proportional gain.
    fn set_p(&mut self, value: f64) -> Result<()>;

    /// Configure the integral gain.
    fn set_i(&mut self, value: f64) -> Result<()>;

    /// Configure the derivative gain.
    fn set_d(&mut self, value: f64) -> Result<()>;

    /// Set the arbitrary feed-forward added to closed-loop commands.
    ///
    /// Persists across mode changes until overwritten.
    fn set_arbitrary_feed_forward(&mut self, value: f64);

    /// Select the sensor that feeds closed-loop control.
    fn set_selected_feedback_sensor(&mut self, sensor: FeedbackSensor) -> Result<()>;

    /// Invert the sensor phase.
    fn set_sensor_inverted(&mut self, inverted: bool) -> Result<()>;

    /// Limit reverse and forward peak output.
    fn set_output_range(&mut self, min_output: f64, max_output: f64) -> Result<()>;

    /// Restore the device's factory configuration.
    fn restore_factory_default(&mut self) -> Result<()>;

    /// Behavior when output is neutral.
    fn set_neutral_mode(&mut self, mode: NeutralMode) -> Result<()>;
}
