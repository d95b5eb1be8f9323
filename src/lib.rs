//! # motor-hal
//!
//! Device-agnostic motor controller abstraction for robot mechanisms.
//!
//! ## Features
//!
//! - **One capability contract**: [`SpeedController`] and [`CanSpeedController`]
//!   hide which physical controller is installed
//! - **Control-mode translation**: generic modes map to each family's native
//!   command set; untranslatable modes force output off
//! - **Unit normalization**: velocities are always units per second at the API
//! - **Uniform failures**: every device status is checked and folded into [`Error`]
//! - **Config-driven provisioning**: [`MotorProvider`] hands out controllers by
//!   logical name from a TOML file
//! - **no_std compatible**: Core library works without standard library
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use motor_hal::{load_config, CanSpeedController, ControlMode, MotorProvider};
//!
//! let config = load_config("motors.toml")?;
//! let mut provider = MotorProvider::new(config, bus)?;
//!
//! let mut left = provider.can_motor("exampleMechanism.leftMotor")?;
//! left.set_arbitrary_feed_forward(0.05);
//! left.set_control(ControlMode::Velocity, 1200.0)?;
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables file I/O and TOML parsing
//! - `alloc`: Enables the provider and the simulation transport
//! - `defmt`: Enables defmt formatting for embedded targets

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

#[cfg(feature = "alloc")]
extern crate alloc;

// Core modules
pub mod config;
pub mod controller;
pub mod error;
#[cfg(feature = "alloc")]
pub mod provider;
pub mod transport;
pub mod units;

// Re-exports for ergonomic API
pub use config::{validate_config, HalConfig, MotorConfig};
pub use controller::{
    CanSpeedController, Command, ControlMode, DeviceFamily, FeedbackSensor, NativeDevice,
    NeutralMode, PwmSpeedController, SparkMax, SpeedController, TalonFx,
};
pub use error::{ConfigError, ControllerError, Error, Result};
#[cfg(feature = "alloc")]
pub use provider::{DeviceBus, MotorProvider};
pub use transport::{Transport, DEFAULT_TIMEOUT};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::load_config;
