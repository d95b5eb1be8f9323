//! CTRE Talon FX adapter.
//!
//! Reference device family: every generic mode has a native equivalent and
//! velocity travels over the wire in sensor units per 100 ms.

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
use crate::units::{UnitsPer100Ms, UnitsPerSec};

/// Native Phoenix control modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TalonMode {
    /// Duty cycle
    PercentOutput,
    /// Position closed loop
    Position,
    /// Velocity closed loop, units per 100 ms
    Velocity,
    /// Current closed loop
    Current,
    /// Follow the device whose id is the demand value
    Follower,
    /// Buffered motion profile
    MotionProfile,
    /// Motion Magic
    MotionMagic,
    /// Buffered motion profile with arc
    MotionProfileArc,
    /// Neutral output
    Disabled,
}

/// Mode table for the CTRE family.
pub struct CtreModes;

impl ModeTable for CtreModes {
    type Native = TalonMode;
    const FAMILY: DeviceFamily = DeviceFamily::Ctre;
    const DISABLED: TalonMode = TalonMode::Disabled;

    fn native_mode(mode: ControlMode) -> Option<TalonMode> {
        Some(match mode {
            ControlMode::PercentOutput => TalonMode::PercentOutput,
            ControlMode::Position => TalonMode::Position,
            ControlMode::Velocity => TalonMode::Velocity,
            ControlMode::Current => TalonMode::Current,
            ControlMode::Follower => TalonMode::Follower,
            ControlMode::MotionProfile => TalonMode::MotionProfile,
            ControlMode::MotionMagic => TalonMode::MotionMagic,
            ControlMode::MotionProfileArc => TalonMode::MotionProfileArc,
            ControlMode::Disabled => TalonMode::Disabled,
        })
    }

    fn control_mode(native: TalonMode) -> ControlMode {
        match native {
            TalonMode::PercentOutput => ControlMode::PercentOutput,
            TalonMode::Position => ControlMode::Position,
            TalonMode::Velocity => ControlMode::Velocity,
            TalonMode::Current => ControlMode::Current,
            TalonMode::Follower => ControlMode::Follower,
            TalonMode::MotionProfile => ControlMode::MotionProfile,
            TalonMode::MotionMagic => ControlMode::MotionMagic,
            TalonMode::MotionProfileArc => ControlMode::MotionProfileArc,
            TalonMode::Disabled => ControlMode::Disabled,
        }
    }

    fn velocity_to_native(velocity: UnitsPerSec) -> f64 {
        UnitsPer100Ms::from(velocity).value()
    }

    fn velocity_from_native(native: f64) -> UnitsPerSec {
        UnitsPerSec::from(UnitsPer100Ms(native))
    }
}

/// Phoenix error code.
///
/// The code space is large; only the well-known values get a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ErrorCode(pub i32);

impl ErrorCode {
    /// Success
    pub const OK: Self = Self(0);
    /// Received frame is older than expected
    pub const CAN_MSG_STALE: Self = Self(1);
    /// Could not transmit
    pub const TX_FAILED: Self = Self(-1);
    /// Parameter out of range
    pub const INVALID_PARAM_VALUE: Self = Self(-2);
    /// No response within the timeout
    pub const RX_TIMEOUT: Self = Self(-3);
    /// Transmit did not complete within the timeout
    pub const TX_TIMEOUT: Self = Self(-4);
    /// Response came from an unexpected arbitration id
    pub const UNEXPECTED_ARB_ID: Self = Self(-5);
    /// Transmit buffer full
    pub const BUFFER_FULL: Self = Self(6);
    /// Selected sensor is not connected
    pub const SENSOR_NOT_PRESENT: Self = Self(-7);
    /// Device firmware too old for the request
    pub const FIRMWARE_TOO_OLD: Self = Self(-8);
    /// Unspecified failure
    pub const GENERAL_ERROR: Self = Self(-100);
    /// Signal has not been updated
    pub const SIG_NOT_UPDATED: Self = Self(-200);
    /// Some gain values were not committed
    pub const NOT_ALL_PID_VALUES_UPDATED: Self = Self(-201);

    /// Name of a well-known code.
    pub fn name(self) -> Option<&'static str> {
        Some(match self.0 {
            0 => "OK",
            1 => "CanMsgStale",
            -1 => "TxFailed",
            -2 => "InvalidParamValue",
            -3 => "RxTimeout",
            -4 => "TxTimeout",
            -5 => "UnexpectedArbId",
            6 => "BufferFull",
            -7 => "SensorNotPresent",
            -8 => "FirmwareTooOld",
            -100 => "GeneralError",
            -200 => "SigNotUpdated",
            -201 => "NotAllPIDValuesUpdated",
            _ => return None,
        })
    }

    /// Whether the request timed out on the bus.
    pub fn is_timeout(self) -> bool {
        self == Self::RX_TIMEOUT || self == Self::TX_TIMEOUT
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "ErrorCode({})", self.0),
        }
    }
}

impl DeviceStatus for ErrorCode {
    const OK: Self = ErrorCode::OK;

    fn is_ok(&self) -> bool {
        *self == ErrorCode::OK
    }
}

/// Talon FX motor controller.
///
/// Owns the transport handle for exactly one device.
pub struct TalonFx<T>
where
    T: Transport<Mode = TalonMode, Status = ErrorCode>,
{
    /// CAN device id.
    device_id: u8,

    /// Exclusive device handle.
    transport: T,

    /// Bound on each request round trip.
    timeout: Duration,

    /// Arbitrary feed-forward for closed-loop commands.
    feed_forward: f64,

    /// Gains committed so far.
    gains: GainSet,

    /// Output inversion last accepted by the device.
    inverted: bool,

    /// Native mode of the last accepted set command.
    last_mode: Option<TalonMode>,
}

impl<T> TalonFx<T>
where
    T: Transport<Mode = TalonMode, Status = ErrorCode>,
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

    fn send(&mut self, request: Request<TalonMode>) -> Result<()> {
        check(self.transport.request(request, self.timeout))
    }

    fn command(&mut self, command: Command) -> Result<()> {
        let demand = translate::<CtreModes>(command);
        self.send(Request::Set(demand))?;
        self.last_mode = Some(demand.mode);
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
}

impl<T> SpeedController for TalonFx<T>
where
    T: Transport<Mode = TalonMode, Status = ErrorCode>,
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

impl<T> CanSpeedController for TalonFx<T>
where
    T: Transport<Mode = TalonMode, Status = ErrorCode>,
{
    fn device(&self) -> NativeDevice {
        NativeDevice {
            family: DeviceFamily::Ctre,
            device_id: self.device_id,
        }
    }

    fn set_control(&mut self, mode: ControlMode, value: f64) -> Result<()> {
        let feed_forward = self.feed_forward;
        self.command(Command::new(mode, value).with_feed_forward(feed_forward))
    }

    fn control_mode(&self) -> Option<ControlMode> {
        self.last_mode.map(CtreModes::control_mode)
    }

    fn sensor_position(&mut self) -> f64 {
        self.transport.read(Signal::Position)
    }

    fn sensor_velocity(&mut self) -> f64 {
        CtreModes::velocity_from_native(self.transport.read(Signal::Velocity)).value()
    }

    fn set_position(&mut self, position: f64) -> Result<()> {
        self.send(Request::SetSensorPosition(position))
    }

    fn follow(&mut self, leader: &dyn CanSpeedController) -> Result<()> {
        let leader = leader.device();
        if leader.family != DeviceFamily::Ctre {
            return Err(ControllerError::IncompatibleFollower {
                follower: DeviceFamily::Ctre,
                leader: leader.family,
            }
            .into());
        }
        self.command(Command::new(ControlMode::Follower, f64::from(leader.device_id)))
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
