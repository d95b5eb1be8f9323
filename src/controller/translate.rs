//! Control-mode translation.
//!
//! Turns a generic [`Command`] into a family-native [`Demand`]: mode lookup,
//! velocity normalization, and feed-forward composition.

use crate::controller::{Command, ControlMode, DeviceFamily};
use crate::transport::Demand;
use crate::units::UnitsPerSec;

/// Mapping between generic modes and one family's native command set.
pub trait ModeTable {
    /// Native mode tag.
    type Native: Copy + core::fmt::Debug + PartialEq;

    /// Family this table belongs to.
    const FAMILY: DeviceFamily;

    /// Native mode that forces output off.
    const DISABLED: Self::Native;

    /// Native mode for a generic mode, or `None` if the family has no equivalent.
    fn native_mode(mode: ControlMode) -> Option<Self::Native>;

    /// Generic mode category of a native mode.
    fn control_mode(native: Self::Native) -> ControlMode;

    /// Convert a normalized velocity to the family's native velocity unit.
    fn velocity_to_native(velocity: UnitsPerSec) -> f64;

    /// Convert a native velocity reading to units per second.
    fn velocity_from_native(native: f64) -> UnitsPerSec;
}

/// Translate a generic command for the family described by `T`.
///
/// An unmapped mode is logged at error level and replaced with a disabled,
/// zero-output demand so it can never drive the motor.
pub fn translate<T: ModeTable>(command: Command) -> Demand<T::Native> {
    let Some(native) = T::native_mode(command.mode) else {
        tracing::error!(
            family = %T::FAMILY,
            mode = %command.mode,
            "CAN control mode is not translatable, forcing output disabled"
        );
        return Demand {
            mode: T::DISABLED,
            value: 0.0,
            feed_forward: None,
        };
    };

    let value = match command.mode {
        ControlMode::Velocity => T::velocity_to_native(UnitsPerSec(command.value)),
        _ => command.value,
    };

    let feed_forward = if command.mode.supports_feed_forward() {
        Some(command.feed_forward.unwrap_or(0.0))
    } else {
        None
    };

    Demand {
        mode: native,
        value,
        feed_forward,
    }
}
