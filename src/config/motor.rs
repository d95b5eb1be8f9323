//! Motor configuration from TOML.

use serde::Deserialize;

use crate::controller::{CanSpeedController, DeviceFamily, FeedbackSensor, NeutralMode};
use crate::error::Result;

/// Concrete controller model behind a logical motor name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerKind {
    /// CTRE Talon FX
    TalonFx,
    /// REV SPARK MAX
    SparkMax,
}

impl ControllerKind {
    /// Native command family of this model.
    pub const fn family(self) -> DeviceFamily {
        match self {
            ControllerKind::TalonFx => DeviceFamily::Ctre,
            ControllerKind::SparkMax => DeviceFamily::Rev,
        }
    }
}

/// Closed-loop gains; unset gains are left at the device's value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct GainConfig {
    /// Proportional gain.
    #[serde(default)]
    pub p: Option<f64>,
    /// Integral gain.
    #[serde(default)]
    pub i: Option<f64>,
    /// Derivative gain.
    #[serde(default)]
    pub d: Option<f64>,
    /// Velocity feed-forward gain.
    #[serde(default)]
    pub f: Option<f64>,
}

impl GainConfig {
    /// All configured gain values.
    pub fn values(&self) -> impl Iterator<Item = f64> {
        [self.p, self.i, self.d, self.f].into_iter().flatten()
    }
}

/// Peak output limits as a fraction of supply.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct OutputRange {
    /// Peak reverse output.
    pub min: f64,
    /// Peak forward output.
    pub max: f64,
}

impl OutputRange {
    /// Check -1 <= min <= max <= 1.
    pub fn is_valid(&self) -> bool {
        -1.0 <= self.min && self.min <= self.max && self.max <= 1.0
    }
}

/// Complete motor configuration from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct MotorConfig {
    /// Controller model.
    #[serde(rename = "family")]
    pub kind: ControllerKind,

    /// CAN device id (0-62).
    pub device_id: u8,

    /// Invert motor output.
    #[serde(default)]
    pub inverted: bool,

    /// Invert sensor phase.
    #[serde(default)]
    pub sensor_inverted: Option<bool>,

    /// Neutral behavior.
    #[serde(default)]
    pub neutral_mode: Option<NeutralMode>,

    /// Closed-loop feedback sensor.
    #[serde(default)]
    pub feedback_sensor: Option<FeedbackSensor>,

    /// Seconds from neutral to full output in open loop.
    #[serde(default)]
    pub open_loop_ramp: Option<f64>,

    /// Seconds from neutral to full output in closed loop.
    #[serde(default)]
    pub closed_loop_ramp: Option<f64>,

    /// Restore factory configuration before applying anything else.
    #[serde(default)]
    pub factory_default: bool,

    /// Closed-loop gains.
    #[serde(default)]
    pub gains: Option<GainConfig>,

    /// Peak output limits.
    #[serde(default)]
    pub output_range: Option<OutputRange>,
}

impl MotorConfig {
    /// Native command family of the configured controller.
    pub fn family(&self) -> DeviceFamily {
        self.kind.family()
    }

    /// Push every configured setting to a controller.
    ///
    /// Stops at the first setting the device rejects.
    pub fn apply(&self, controller: &mut dyn CanSpeedController) -> Result<()> {
        if self.factory_default {
            controller.restore_factory_default()?;
        }

        controller.set_inverted(self.inverted)?;

        if let Some(inverted) = self.sensor_inverted {
            controller.set_sensor_inverted(inverted)?;
        }
        if let Some(mode) = self.neutral_mode {
            controller.set_neutral_mode(mode)?;
        }
        if let Some(sensor) = self.feedback_sensor {
            controller.set_selected_feedback_sensor(sensor)?;
        }

        if let Some(gains) = self.gains {
            if let Some(p) = gains.p {
                controller.set_p(p)?;
            }
            if let Some(i) = gains.i {
                controller.set_i(i)?;
            }
            if let Some(d) = gains.d {
                controller.set_d(d)?;
            }
            if let Some(f) = gains.f {
                controller.set_ff(f)?;
            }
        }

        if let Some(seconds) = self.open_loop_ramp {
            controller.set_open_loop_ramp(seconds)?;
        }
        if let Some(seconds) = self.closed_loop_ramp {
            controller.set_closed_loop_ramp(seconds)?;
        }
        if let Some(range) = self.output_range {
            controller.set_output_range(range.min, range.max)?;
        }

        Ok(())
    }
}
