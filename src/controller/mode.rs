//! Device-agnostic command vocabulary.

use core::fmt;

use serde::Deserialize;

/// Generic control strategy for a commanded value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlMode {
    /// Open-loop fraction of supply, conventionally -1.0..=1.0
    PercentOutput,
    /// Closed-loop position in sensor units
    Position,
    /// Closed-loop velocity in sensor units per second
    Velocity,
    /// Closed-loop current in amps
    Current,
    /// Mirror another controller; value is the leader's device id
    Follower,
    /// Streamed motion profile
    MotionProfile,
    /// Trapezoidal motion to a position target
    MotionMagic,
    /// Streamed motion profile with auxiliary arc control
    MotionProfileArc,
    /// Output off
    Disabled,
}

impl ControlMode {
    /// Every generic mode, in declaration order.
    pub const ALL: [ControlMode; 9] = [
        ControlMode::PercentOutput,
        ControlMode::Position,
        ControlMode::Velocity,
        ControlMode::Current,
        ControlMode::Follower,
        ControlMode::MotionProfile,
        ControlMode::MotionMagic,
        ControlMode::MotionProfileArc,
        ControlMode::Disabled,
    ];

    /// Whether a command in this mode is sent together with the arbitrary
    /// feed-forward term.
    #[inline]
    pub const fn supports_feed_forward(self) -> bool {
        self.is_closed_loop()
    }

    /// Whether the device closes a loop around a sensor in this mode.
    #[inline]
    pub const fn is_closed_loop(self) -> bool {
        !matches!(
            self,
            ControlMode::PercentOutput | ControlMode::Follower | ControlMode::Disabled
        )
    }
}

impl fmt::Display for ControlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A generic command before translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Command {
    /// Control strategy
    pub mode: ControlMode,
    /// Setpoint in normalized units (units/s for velocity, raw otherwise)
    pub value: f64,
    /// Arbitrary feed-forward added by the device, if the mode allows it
    pub feed_forward: Option<f64>,
}

impl Command {
    /// Command without a feed-forward term.
    #[inline]
    pub const fn new(mode: ControlMode, value: f64) -> Self {
        Self {
            mode,
            value,
            feed_forward: None,
        }
    }

    /// Attach an arbitrary feed-forward term.
    #[inline]
    pub fn with_feed_forward(mut self, feed_forward: f64) -> Self {
        self.feed_forward = Some(feed_forward);
        self
    }
}

/// Motor behavior when commanded to neutral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NeutralMode {
    /// Let the motor spin down freely
    #[default]
    Coast,
    /// Short the windings to stop quickly
    Brake,
}

/// Sensor feeding the device's closed loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FeedbackSensor {
    /// Sensor built into the motor
    IntegratedSensor,
    /// External quadrature encoder
    QuadEncoder,
    /// Analog input
    Analog,
    /// Pulse-width encoder
    PulseWidth,
    /// First remote sensor over CAN
    RemoteSensor0,
    /// Second remote sensor over CAN
    RemoteSensor1,
    /// Sum of two configured terms
    SensorSum,
    /// Difference of two configured terms
    SensorDifference,
}

/// Gain channel of the device's closed-loop slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gain {
    /// Proportional
    P,
    /// Integral
    I,
    /// Derivative
    D,
    /// Velocity feed-forward
    F,
}

/// Last gains successfully committed to a device.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GainSet {
    /// Proportional gain
    pub p: f64,
    /// Integral gain
    pub i: f64,
    /// Derivative gain
    pub d: f64,
    /// Velocity feed-forward gain
    pub f: f64,
}

impl GainSet {
    /// Store a committed gain value.
    pub fn store(&mut self, gain: Gain, value: f64) {
        match gain {
            Gain::P => self.p = value,
            Gain::I => self.i = value,
            Gain::D => self.d = value,
            Gain::F => self.f = value,
        }
    }

    /// Read a gain value.
    pub fn get(&self, gain: Gain) -> f64 {
        match gain {
            Gain::P => self.p,
            Gain::I => self.i,
            Gain::D => self.d,
            Gain::F => self.f,
        }
    }
}

/// Native command family of a device.
///
/// Controllers can only follow leaders that share their family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceFamily {
    /// CTRE Phoenix devices (Talon FX)
    Ctre,
    /// REV devices (SPARK MAX)
    Rev,
    /// Plain PWM speed controllers
    Pwm,
}

impl fmt::Display for DeviceFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeviceFamily::Ctre => "CTRE",
            DeviceFamily::Rev => "REV",
            DeviceFamily::Pwm => "PWM",
        };
        f.write_str(name)
    }
}

/// Identity of the physical device behind a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NativeDevice {
    /// Native command family
    pub family: DeviceFamily,
    /// Bus-level device id (CAN id or PWM channel)
    pub device_id: u8,
}
