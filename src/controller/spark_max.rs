//! REV SPARK MAX adapter.
//!
//! The SPARK MAX has no streamed motion-profile or follower set-modes; those
//! generic modes fall back to disabled output. Velocity is native in units per
//! minute, and following is its own request rather than a set-mode.

use core::fmt;
use core::time::Duration;

use crate::controller::translate::{translate, ModeTable};
use crate::controller::{
    CanSpeedController, Command, ControlMode, DeviceFamily, FeedbackSensor, Gain, GainSet,
    NativeDevice, NeutralMode, SpeedController,
};
use crate::error::{ControllerError, Result};
use crate::transport::{
    check, DeviceStatus, Request, Signal, Transport, DEFAULT_TIMEOUT, PRIMARY_SLOT,
};
use crate::units::{UnitsPerMin, UnitsPerSec};

/// Native SPARK MAX control types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SparkMode {
    /// Duty cycle
    DutyCycle,
    /// Position closed loop
    Position,
    /// Velocity closed loop, units per minute
    Velocity,
    /// Current closed loop
    Current,
    /// Trapezoidal Smart Motion
    SmartMotion,
    /// Output off
    Disabled,
}

/// Mode table for the REV family.
pub struct RevModes;

impl ModeTable for RevModes {
    type Native = SparkMode;
    const FAMILY: DeviceFamily = DeviceFamily::Rev;
    const DISABLED: SparkMode = SparkMode::Disabled;

    fn native_mode(mode: ControlMode) -> Option<SparkMode> {
        match mode {
            ControlMode::PercentOutput => Some(SparkMode::DutyCycle),
            ControlMode::Position => Some(SparkMode::Position),
            ControlMode::Velocity => Some(SparkMode::Velocity),
            ControlMode::Current => Some(SparkMode::Current),
            ControlMode::MotionMagic => Some(SparkMode::SmartMotion),
            ControlMode::Disabled => Some(SparkMode::Disabled),
            ControlMode::Follower | ControlMode::MotionProfile | ControlMode::MotionProfileArc => {
                None
            }
        }
    }

    fn control_mode(native: SparkMode) -> ControlMode {
        match native {
            SparkMode::DutyCycle => ControlMode::PercentOutput,
            SparkMode::Position => ControlMode::Position,
            SparkMode::Velocity => ControlMode::Velocity,
            SparkMode::Current => ControlMode::Current,
            SparkMode::SmartMotion => ControlMode::MotionMagic,
            SparkMode::Disabled => ControlMode::Disabled,
        }
    }

    fn velocity_to_native(velocity: UnitsPerSec) -> f64 {
        UnitsPerMin::from(velocity).value()
    }

    fn velocity_from_native(native: f64) -> UnitsPerSec {
        UnitsPerSec::from(UnitsPerMin(native))
    }
}

/// REV library status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RevStatus {
    /// Success
    Ok,
    /// Unspecified failure
    Error,
    /// No response within the timeout
    Timeout,
    /// Unknown parameter id
    ParamInvalidId,
    /// Parameter type mismatch
    ParamMismatchType,
    /// Parameter is read-only
    ParamAccessMode,
    /// Parameter value rejected
    ParamInvalid,
    /// Follower configuration rejected
    FollowConfigMismatch,
    /// Setpoint outside the allowed range
    SetpointOutOfRange,
    /// Device not on the bus
    CanDisconnected,
    /// CAN id outside the valid range
    InvalidCanId,
}

impl fmt::Display for RevStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RevStatus::Ok => "kOk",
            RevStatus::Error => "kError",
            RevStatus::Timeout => "kTimeout",
            RevStatus::ParamInvalidId => "kParamInvalidID",
            RevStatus::ParamMismatchType => "kParamMismatchType",
            RevStatus::ParamAccessMode => "kParamAccessMode",
            RevStatus::ParamInvalid => "kParamInvalid",
            RevStatus::FollowConfigMismatch => "kFollowConfigMismatch",
            RevStatus::SetpointOutOfRange => "kSetpointOutOfRange",
            RevStatus::CanDisconnected => "kCANDisconnected",
            RevStatus::InvalidCanId => "kInvalidCANId",
        };
        f.write_str(name)
    }
}

impl DeviceStatus for RevStatus {
    const OK: Self = RevStatus::Ok;

    fn is_ok(&self) -> bool {
        *self == RevStatus::Ok
    }
}

/// SPARK MAX motor controller.
pub struct SparkMax<T>
where
    T: Transport<Mode = SparkMode, Status = RevStatus>,
{
    device_id: u8,
    transport: T,
    timeout: Duration,
    feed_forward: f64,
    gains: GainSet,
    inverted: bool,
    last_mode: Option<SparkMode>,
    following: bool,
}

impl<T> SparkMax<T>
where
    T: Transport<Mode = SparkMode, Status = RevStatus>,
{
    /// Bind an adapter to the device behind `transport`.
    pub fn new(device_id: u8, transport: T) -> Self {
        Self {
            device_id,
            transport,
            timeout: DEFAULT_TIMEOUT,
            feed_forward: 0.0,
            gains: GainSet::default(),
            inverted: false,
            last_mode: None,
            following: false,
        }
    }

    /// Override the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// CAN device id.
    #[inline]
    pub fn device_id(&self) -> u8 {
        self.device_id
    }

    /// Current arbitrary feed-forward term.
    #[inline]
    pub fn feed_forward(&self) -> f64 {
        self.feed_forward
    }

    /// Gains committed to the device.
    #[inline]
    pub fn gains(&self) -> GainSet {
        self.gains
    }

    fn send(&mut self, request: Request<SparkMode>) -> Result<()> {
        check(self.transport.request(request, self.timeout))
    }

    fn command(&mut self, command: Command) -> Result<()> {
        let demand = translate::<RevModes>(command);
        // A rejected set leaves a follower following.
        self.send(Request::Set(demand))?;
        self.last_mode = Some(demand.mode);
        self.following = false;
        Ok(())
    }

    fn config_gain(&mut self, gain: Gain, value: f64) -> Result<()> {
        self.send(Request::ConfigGain {
            slot: PRIMARY_SLOT,
            gain,
            value,
        })?;
        self.gains.store(gain, value);
        Ok(())
    }

    /// Sensors the SPARK MAX can close a loop on.
    fn supports_sensor(sensor: FeedbackSensor) -> bool {
        matches!(
            sensor,
            FeedbackSensor::IntegratedSensor | FeedbackSensor::QuadEncoder | FeedbackSensor::Analog
        )
    }
}

impl<T> SpeedController for SparkMax<T>
where
    T: Transport<Mode = SparkMode, Status = RevStatus>,
{
    fn set(&mut self, power: f64) -> Result<()> {
        self.set_control(ControlMode::PercentOutput, power)
    }

    fn get(&mut self) -> f64 {
        self.transport.read(Signal::Output)
    }

    fn set_inverted(&mut self, inverted: bool) -> Result<()> {
        self.send(Request::SetInverted(inverted))?;
        self.inverted = inverted;
        Ok(())
    }

    fn inverted(&self) -> bool {
        self.inverted
    }

    fn stop_motor(&mut self) -> Result<()> {
        self.command(Command::new(ControlMode::PercentOutput, 0.0))
    }
}

impl<T> CanSpeedController for SparkMax<T>
where
    T: Transport<Mode = SparkMode, Status = RevStatus>,
{
    fn device(&self) -> NativeDevice {
        NativeDevice {
            family: DeviceFamily::Rev,
            device_id: self.device_id,
        }
    }

    fn set_control(&mut self, mode: ControlMode, value: f64) -> Result<()> {
        let feed_forward = self.feed_forward;
        self.command(Command::new(mode, value).with_feed_forward(feed_forward))
    }

    fn control_mode(&self) -> Option<ControlMode> {
        if self.following {
            return Some(ControlMode::Follower);
        }
        self.last_mode.map(RevModes::control_mode)
    }

    fn sensor_position(&mut self) -> f64 {
        self.transport.read(Signal::Position)
    }

    fn sensor_velocity(&mut self) -> f64 {
        RevModes::velocity_from_native(self.transport.read(Signal::Velocity)).value()
    }

    fn set_position(&mut self, position: f64) -> Result<()> {
        self.send(Request::SetSensorPosition(position))
    }

    fn follow(&mut self, leader: &dyn CanSpeedController) -> Result<()> {
        let leader = leader.device();
        if leader.family != DeviceFamily::Rev {
            return Err(ControllerError::IncompatibleFollower {
                follower: DeviceFamily::Rev,
                leader: leader.family,
            }
            .into());
        }
        self.send(Request::Follow {
            leader_id: leader.device_id,
        })?;
        self.following = true;
        Ok(())
    }

    fn set_open_loop_ramp(&mut self, seconds_from_neutral_to_full: f64) -> Result<()> {
        self.send(Request::ConfigOpenLoopRamp(seconds_from_neutral_to_full))
    }

    fn set_closed_loop_ramp(&mut self, seconds_from_neutral_to_full: f64) -> Result<()> {
        self.send(Request::ConfigClosedLoopRamp(seconds_from_neutral_to_full))
    }

    fn set_ff(&mut self, value: f64) -> Result<()> {
        self.config_gain(Gain::F, value)
    }

    fn set_p(&mut self, value: f64) -> Result<()> {
        self.config_gain(Gain::P, value)
    }

    fn set_i(&mut self, value: f64) -> Result<()> {
        self.config_gain(Gain::I, value)
    }

    fn set_d(&mut self, value: f64) -> Result<()> {
        self.config_gain(Gain::D, value)
    }

    fn set_arbitrary_feed_forward(&mut self, value: f64) {
        self.feed_forward = value;
    }

    fn set_selected_feedback_sensor(&mut self, sensor: FeedbackSensor) -> Result<()> {
        // Rejected locally with the status the device would report.
        if !Self::supports_sensor(sensor) {
            return check(RevStatus::ParamInvalid);
        }
        self.send(Request::ConfigFeedbackSensor(sensor))
    }

    fn set_sensor_inverted(&mut self, inverted: bool) -> Result<()> {
        self.send(Request::SetSensorPhase(inverted))
    }

    fn set_output_range(&mut self, min_output: f64, max_output: f64) -> Result<()> {
        self.send(Request::ConfigPeakOutputReverse(min_output))?;
        self.send(Request::ConfigPeakOutputForward(max_output))
    }

    fn restore_factory_default(&mut self) -> Result<()> {
        self.send(Request::FactoryDefault)?;
        self.inverted = false;
        self.gains = GainSet::default();
        Ok(())
    }

    fn set_neutral_mode(&mut self, mode: NeutralMode) -> Result<()> {
        self.send(Request::SetNeutralMode(mode))
    }
}
