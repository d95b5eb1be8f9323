//! Downstream transport seam.
//!
//! A [`Transport`] is the exclusive handle to one physical device. Every call is
//! a synchronous request/response bounded by a timeout; the transport owns the
//! wire protocol and answers with a family-specific status code.

use core::fmt;
use core::time::Duration;

use crate::controller::{FeedbackSensor, Gain, NeutralMode};
use crate::error::{ControllerError, Result};

#[cfg(feature = "alloc")]
pub mod sim;

/// Default bound on a single request round trip.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(20);

/// Closed-loop slot used for gain configuration.
pub const PRIMARY_SLOT: u8 = 0;

/// Device-native set command produced by mode translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Demand<M> {
    /// Native mode tag
    pub mode: M,
    /// Setpoint in native units
    pub value: f64,
    /// Arbitrary feed-forward term (four-term set) or `None` (two-term set)
    pub feed_forward: Option<f64>,
}

/// A single request sent to a device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Request<M> {
    /// Command an output
    Set(Demand<M>),
    /// Mirror the output of another device of the same family
    Follow {
        /// Leader's device id
        leader_id: u8,
    },
    /// Configure one gain of a closed-loop slot
    ConfigGain {
        /// Slot index
        slot: u8,
        /// Gain channel
        gain: Gain,
        /// Gain value
        value: f64,
    },
    /// Seconds from neutral to full output in open loop
    ConfigOpenLoopRamp(f64),
    /// Seconds from neutral to full output in closed loop
    ConfigClosedLoopRamp(f64),
    /// Select the closed-loop feedback sensor
    ConfigFeedbackSensor(FeedbackSensor),
    /// Overwrite the feedback accumulator
    SetSensorPosition(f64),
    /// Invert the sensor phase
    SetSensorPhase(bool),
    /// Peak reverse output
    ConfigPeakOutputReverse(f64),
    /// Peak forward output
    ConfigPeakOutputForward(f64),
    /// Restore factory configuration
    FactoryDefault,
    /// Invert motor output
    SetInverted(bool),
    /// Neutral behavior
    SetNeutralMode(NeutralMode),
}

/// Telemetry signals that can be read back from a device, in native units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Signal {
    /// Selected sensor position
    Position,
    /// Selected sensor velocity over the device's native interval
    Velocity,
    /// Applied output as a fraction of supply
    Output,
}

/// Status code returned by a device for each request.
pub trait DeviceStatus: fmt::Display {
    /// Success status of this code space.
    const OK: Self;

    /// Whether the device accepted the request.
    fn is_ok(&self) -> bool;
}

/// Exclusive handle to one physical device.
pub trait Transport {
    /// Native mode tag understood by the device.
    type Mode: Copy + fmt::Debug;

    /// Status code space of the device.
    type Status: DeviceStatus;

    /// Send a request and wait up to `timeout` for its acknowledgement.
    ///
    /// Transports must answer with a timeout status instead of blocking longer.
    fn request(&mut self, request: Request<Self::Mode>, timeout: Duration) -> Self::Status;

    /// Read the latest value of a telemetry signal.
    fn read(&mut self, signal: Signal) -> f64;
}

/// Translate a device status into the crate's failure taxonomy.
///
/// A success status is a no-op. Any other status becomes
/// [`ControllerError::CommandFailed`] carrying the device's diagnostic text.
#[inline]
pub fn check<S: DeviceStatus>(status: S) -> Result<()> {
    if status.is_ok() {
        return Ok(());
    }
    Err(ControllerError::command_failed(&status).into())
}
