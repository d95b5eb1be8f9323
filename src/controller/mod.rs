//! Controller module for motor-hal.
//!
//! Provides the capability traits and one adapter per device family.

mod capability;
mod mode;
mod pwm;
mod spark_max;
mod talon_fx;
pub mod translate;

pub use capability::{CanSpeedController, SpeedController};
pub use mode::{
    Command, ControlMode, DeviceFamily, FeedbackSensor, Gain, GainSet, NativeDevice, NeutralMode,
};
pub use pwm::PwmSpeedController;
pub use spark_max::{RevModes, RevStatus, SparkMax, SparkMode};
pub use talon_fx::{CtreModes, ErrorCode, TalonFx, TalonMode};
pub use translate::{translate, ModeTable};
