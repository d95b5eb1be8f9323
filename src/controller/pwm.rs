//! PWM H-bridge speed controller.
//!
//! Open-loop only: magnitude goes out as a duty cycle, sign as a direction pin.

use embedded_hal::digital::{self, OutputPin};
use embedded_hal::pwm::{self, SetDutyCycle};

use crate::controller::{DeviceFamily, NativeDevice, SpeedController};
use crate::error::{ControllerError, Result};

/// Speed controller driven by a PWM channel and a direction pin.
///
/// Generic over:
/// - `P`: PWM channel (must implement `SetDutyCycle`)
/// - `D`: direction pin (must implement `OutputPin`)
pub struct PwmSpeedController<P, D>
where
    P: SetDutyCycle,
    D: OutputPin,
{
    /// PWM channel number, for identification only.
    channel: u8,

    /// Duty-cycle output.
    pwm: P,

    /// Direction pin (high = forward unless inverted).
    direction: D,

    /// Cached direction pin level to avoid redundant writes.
    current_forward: Option<bool>,

    /// Whether positive power drives the pin low.
    inverted: bool,

    /// Last applied power after saturation.
    power: f64,
}

impl<P, D> PwmSpeedController<P, D>
where
    P: SetDutyCycle,
    D: OutputPin,
{
    /// Create a controller with zero output.
    pub fn new(channel: u8, pwm: P, direction: D) -> Self {
        Self {
            channel,
            pwm,
            direction,
            current_forward: None,
            inverted: false,
            power: 0.0,
        }
    }

    /// Physical device behind this controller.
    pub fn device(&self) -> NativeDevice {
        NativeDevice {
            family: DeviceFamily::Pwm,
            device_id: self.channel,
        }
    }

    /// Release the PWM channel and direction pin.
    pub fn release(self) -> (P, D) {
        (self.pwm, self.direction)
    }

    fn set_direction(&mut self, forward: bool) -> Result<()> {
        if self.current_forward == Some(forward) {
            return Ok(());
        }

        let written = if forward {
            self.direction.set_high()
        } else {
            self.direction.set_low()
        };
        written.map_err(|e| {
            ControllerError::command_failed(format_args!(
                "direction pin: {:?}",
                digital::Error::kind(&e)
            ))
        })?;

        self.current_forward = Some(forward);
        Ok(())
    }

    fn set_duty(&mut self, magnitude: f64) -> Result<()> {
        let max = self.pwm.max_duty_cycle();
        let duty = libm::round(magnitude * f64::from(max)) as u16;
        self.pwm.set_duty_cycle(duty).map_err(|e| {
            ControllerError::command_failed(format_args!(
                "pwm duty cycle: {:?}",
                pwm::Error::kind(&e)
            ))
            .into()
        })
    }
}

impl<P, D> SpeedController for PwmSpeedController<P, D>
where
    P: SetDutyCycle,
    D: OutputPin,
{
    fn set(&mut self, power: f64) -> Result<()> {
        // The bridge saturates at full duty.
        let power = power.clamp(-1.0, 1.0);
        self.set_direction((power >= 0.0) != self.inverted)?;
        self.set_duty(libm::fabs(power))?;
        self.power = power;
        Ok(())
    }

    fn get(&mut self) -> f64 {
        self.power
    }

    fn set_inverted(&mut self, inverted: bool) -> Result<()> {
        self.inverted = inverted;
        Ok(())
    }

    fn inverted(&self) -> bool {
        self.inverted
    }

    fn stop_motor(&mut self) -> Result<()> {
        self.set_duty(0.0)?;
        self.power = 0.0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction as PinTransaction};

    struct FakePwm {
        max: u16,
        duty: u16,
    }

    impl pwm::ErrorType for FakePwm {
        type Error = Infallible;
    }

    impl SetDutyCycle for FakePwm {
        fn max_duty_cycle(&self) -> u16 {
            self.max
        }

        fn set_duty_cycle(&mut self, duty: u16) -> core::result::Result<(), Infallible> {
            self.duty = duty;
            Ok(())
        }
    }

    #[test]
    fn test_direction_written_only_on_change() {
        let pin = PinMock::new(&[
            PinTransaction::set(State::High),
            PinTransaction::set(State::Low),
        ]);
        let mut motor = PwmSpeedController::new(0, FakePwm { max: 1000, duty: 0 }, pin);

        motor.set(0.5).unwrap();
        motor.set(-0.25).unwrap();
        motor.set(-0.5).unwrap();
        assert_eq!(motor.get(), -0.5);

        let (pwm, mut pin) = motor.release();
        assert_eq!(pwm.duty, 500);
        pin.done();
    }

    #[test]
    fn test_power_saturates() {
        let pin = PinMock::new(&[PinTransaction::set(State::High)]);
        let mut motor = PwmSpeedController::new(0, FakePwm { max: 255, duty: 0 }, pin);

        motor.set(3.0).unwrap();
        assert_eq!(motor.get(), 1.0);

        let (pwm, mut pin) = motor.release();
        assert_eq!(pwm.duty, 255);
        pin.done();
    }

    #[test]
    fn test_inverted_flips_direction_pin() {
        let pin = PinMock::new(&[PinTransaction::set(State::Low)]);
        let mut motor = PwmSpeedController::new(0, FakePwm { max: 100, duty: 0 }, pin);

        motor.set_inverted(true).unwrap();
        assert!(motor.inverted());
        motor.set(0.3).unwrap();

        let (pwm, mut pin) = motor.release();
        assert_eq!(pwm.duty, 30);
        pin.done();
    }

    #[test]
    fn test_stop_leaves_direction_alone() {
        let pin = PinMock::new(&[PinTransaction::set(State::High)]);
        let mut motor = PwmSpeedController::new(5, FakePwm { max: 100, duty: 0 }, pin);

        motor.set(0.8).unwrap();
        motor.stop_motor().unwrap();
        motor.stop_motor().unwrap();
        assert_eq!(motor.get(), 0.0);
        assert_eq!(motor.device().device_id, 5);

        let (pwm, mut pin) = motor.release();
        assert_eq!(pwm.duty, 0);
        pin.done();
    }
}
