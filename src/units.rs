//! Unit types for sensor rates.
//!
//! Callers always see velocities in [`UnitsPerSec`]. Device families report and
//! accept velocity over their own sampling interval; these newtypes keep the two
//! from being mixed up inside the adapters.

/// Normalized velocity in sensor units per second.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct UnitsPerSec(pub f64);

/// Native velocity in sensor units per 100 ms (CTRE reporting interval).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct UnitsPer100Ms(pub f64);

/// Native velocity in sensor units per minute (REV reporting interval).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct UnitsPerMin(pub f64);

/// 100 ms sampling windows per second.
const WINDOWS_PER_SEC: f64 = 10.0;

/// Seconds per minute.
const SECS_PER_MIN: f64 = 60.0;

impl UnitsPerSec {
    /// Create a new UnitsPerSec value.
    #[inline]
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl UnitsPer100Ms {
    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl UnitsPerMin {
    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl From<UnitsPerSec> for UnitsPer100Ms {
    #[inline]
    fn from(v: UnitsPerSec) -> Self {
        Self(v.0 / WINDOWS_PER_SEC)
    }
}

impl From<UnitsPer100Ms> for UnitsPerSec {
    #[inline]
    fn from(v: UnitsPer100Ms) -> Self {
        Self(v.0 * WINDOWS_PER_SEC)
    }
}

impl From<UnitsPerSec> for UnitsPerMin {
    #[inline]
    fn from(v: UnitsPerSec) -> Self {
        Self(v.0 * SECS_PER_MIN)
    }
}

impl From<UnitsPerMin> for UnitsPerSec {
    #[inline]
    fn from(v: UnitsPerMin) -> Self {
        Self(v.0 / SECS_PER_MIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_100ms_conversion() {
        let native: UnitsPer100Ms = UnitsPerSec::new(100.0).into();
        assert!((native.value() - 10.0).abs() < 1e-12);

        let back: UnitsPerSec = native.into();
        assert!((back.value() - 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_per_minute_conversion() {
        let native: UnitsPerMin = UnitsPerSec::new(2.5).into();
        assert!((native.value() - 150.0).abs() < 1e-12);

        let back: UnitsPerSec = native.into();
        assert!((back.value() - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_sign_preserved() {
        let native: UnitsPer100Ms = UnitsPerSec::new(-40.0).into();
        assert!(native.value() < 0.0);
    }
}
