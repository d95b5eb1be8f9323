//! Error types for motor-hal.
//!
//! Every device-specific failure is folded into this taxonomy at the adapter
//! boundary, so callers only ever match on these enums.

use core::fmt;

use crate::controller::DeviceFamily;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all motor-hal operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration parsing, validation, or provisioning error
    Config(ConfigError),
    /// Controller command or argument error
    Controller(ControllerError),
}

/// Configuration and provisioning errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Logical motor name not present in configuration
    MotorNotFound(heapless::String<48>),
    /// Logical motor name was already handed out by the provider
    MotorAlreadyClaimed(heapless::String<48>),
    /// Two motors bound to the same physical device
    DuplicateDevice {
        /// Device family of both entries
        family: DeviceFamily,
        /// Shared CAN device id
        device_id: u8,
    },
    /// CAN device id outside 0..=62
    InvalidDeviceId(u8),
    /// Ramp time must be finite and non-negative
    InvalidRamp(f64),
    /// Output range must satisfy -1 <= min <= max <= 1
    InvalidOutputRange {
        /// Reverse peak output
        min: f64,
        /// Forward peak output
        max: f64,
    },
    /// Gain must be finite
    InvalidGain(f64),
    /// Transport timeout must be non-zero
    InvalidTimeout(u16),
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Errors raised by device adapters.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerError {
    /// The transport reported a non-success status (including timeouts).
    ///
    /// Carries the device's own diagnostic text.
    CommandFailed(heapless::String<64>),
    /// `follow` was given a leader from another native command family.
    IncompatibleFollower {
        /// Family of the controller asked to follow
        follower: DeviceFamily,
        /// Family of the proposed leader
        leader: DeviceFamily,
    },
}

impl ControllerError {
    /// Build a `CommandFailed` from any displayable diagnostic.
    ///
    /// Diagnostics longer than the buffer are truncated.
    pub fn command_failed(diagnostic: impl fmt::Display) -> Self {
        ControllerError::CommandFailed(truncated(diagnostic))
    }
}

/// Format `text` into a fixed-capacity string, dropping whatever does not fit.
pub(crate) fn truncated<const N: usize>(text: impl fmt::Display) -> heapless::String<N> {
    use core::fmt::Write;
    let mut out = Truncating(heapless::String::new());
    let _ = write!(out, "{}", text);
    out.0
}

struct Truncating<const N: usize>(heapless::String<N>);

impl<const N: usize> fmt::Write for Truncating<N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}

impl Error {
    /// True if this is a transport-reported command failure.
    pub fn is_command_failed(&self) -> bool {
        matches!(self, Error::Controller(ControllerError::CommandFailed(_)))
    }

    /// Diagnostic text of a command failure, if any.
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            Error::Controller(ControllerError::CommandFailed(msg)) => Some(msg.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Controller(e) => write!(f, "Controller error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::MotorNotFound(name) => write!(f, "Motor '{}' not found", name),
            ConfigError::MotorAlreadyClaimed(name) => {
                write!(f, "Motor '{}' has already been claimed", name)
            }
            ConfigError::DuplicateDevice { family, device_id } => {
                write!(f, "Device {} id {} is bound to more than one motor", family, device_id)
            }
            ConfigError::InvalidDeviceId(id) => write!(f, "Invalid device id: {}. Must be 0-62", id),
            ConfigError::InvalidRamp(v) => write!(f, "Invalid ramp: {}. Must be >= 0", v),
            ConfigError::InvalidOutputRange { min, max } => {
                write!(f, "Invalid output range: [{}, {}]", min, max)
            }
            ConfigError::InvalidGain(v) => write!(f, "Invalid gain: {}. Must be finite", v),
            ConfigError::InvalidTimeout(v) => write!(f, "Invalid timeout: {} ms. Must be > 0", v),
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for ControllerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerError::CommandFailed(msg) => write!(f, "Command failed: {}", msg),
            ControllerError::IncompatibleFollower { follower, leader } => {
                write!(f, "{} controller cannot follow a {} controller", follower, leader)
            }
        }
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<ControllerError> for Error {
    fn from(e: ControllerError) -> Self {
        Error::Controller(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for ControllerError {}
