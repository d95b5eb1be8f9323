//! Configuration module for motor-hal.
//!
//! Provides types for loading and validating motor controller configurations
//! from TOML files (with `std` feature) or pre-parsed data.

#[cfg(feature = "std")]
mod loader;
mod motor;
mod system;
mod validation;

pub use motor::{ControllerKind, GainConfig, MotorConfig, OutputRange};
pub use system::HalConfig;
pub use validation::{validate_config, MAX_DEVICE_ID};

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};
