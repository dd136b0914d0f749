// ABOUTME: Physical units with dimension checks and conversion to canonical base units
// ABOUTME: Provides Quantity, Pace, Speed, and the validated display UnitSet
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Units
//!
//! Quantities always travel with their unit. Conversion happens only at the
//! point of arithmetic or display, through the canonical base unit of the
//! unit's dimension (meter, kilogram, second, kilocalorie, count, count per
//! minute, fraction, degree Celsius).

use crate::constants::time::{METERS_PER_KILOMETER, SECONDS_PER_MINUTE};
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Physical dimension of a unit. Two units are compatible iff their dimensions match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    /// Distance
    Length,
    /// Body or equipment mass
    Mass,
    /// Elapsed time
    Time,
    /// Energy expenditure
    Energy,
    /// Dimensionless counts (steps, strokes)
    Count,
    /// Events per unit of time (heart rate, cadence)
    Rate,
    /// Ratio expressed as a percentage
    Percentage,
    /// Temperature
    Temperature,
}

/// A physical unit tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    /// Meter (base length)
    Meter,
    /// Kilometer
    Kilometer,
    /// International mile
    Mile,
    /// Yard
    Yard,
    /// Foot
    Foot,
    /// Kilogram (base mass)
    Kilogram,
    /// Pound
    Pound,
    /// Second (base time)
    Second,
    /// Minute
    Minute,
    /// Hour
    Hour,
    /// Kilocalorie (base energy)
    Kilocalorie,
    /// Kilojoule
    Kilojoule,
    /// Plain count (base count)
    Count,
    /// Count per minute (base rate)
    CountPerMinute,
    /// Count per second
    CountPerSecond,
    /// Percent
    Percent,
    /// Degree Celsius (base temperature)
    Celsius,
    /// Degree Fahrenheit
    Fahrenheit,
}

impl Unit {
    /// Dimension of this unit
    #[must_use]
    pub const fn dimension(self) -> Dimension {
        match self {
            Self::Meter | Self::Kilometer | Self::Mile | Self::Yard | Self::Foot => {
                Dimension::Length
            }
            Self::Kilogram | Self::Pound => Dimension::Mass,
            Self::Second | Self::Minute | Self::Hour => Dimension::Time,
            Self::Kilocalorie | Self::Kilojoule => Dimension::Energy,
            Self::Count => Dimension::Count,
            Self::CountPerMinute | Self::CountPerSecond => Dimension::Rate,
            Self::Percent => Dimension::Percentage,
            Self::Celsius | Self::Fahrenheit => Dimension::Temperature,
        }
    }

    /// Multiplicative factor from this unit to its base unit.
    /// Temperature units also carry an offset, see [`Unit::to_base`].
    #[must_use]
    pub const fn base_factor(self) -> f64 {
        match self {
            Self::Meter
            | Self::Kilogram
            | Self::Second
            | Self::Kilocalorie
            | Self::Count
            | Self::CountPerMinute
            | Self::Celsius => 1.0,
            Self::Kilometer => METERS_PER_KILOMETER,
            Self::Mile => 1609.344,
            Self::Yard => 0.9144,
            Self::Foot => 0.3048,
            Self::Pound => 0.453_592_37,
            Self::Minute => SECONDS_PER_MINUTE,
            Self::Hour => 3600.0,
            Self::Kilojoule => 1.0 / 4.184,
            Self::CountPerSecond => 60.0,
            Self::Percent => 0.01,
            Self::Fahrenheit => 5.0 / 9.0,
        }
    }

    /// Convert a value in this unit to the dimension's base unit
    #[must_use]
    pub fn to_base(self, value: f64) -> f64 {
        match self {
            Self::Fahrenheit => (value - 32.0) * self.base_factor(),
            _ => value * self.base_factor(),
        }
    }

    /// Convert a value in the dimension's base unit to this unit
    #[must_use]
    pub fn from_base(self, value: f64) -> f64 {
        match self {
            Self::Fahrenheit => value / self.base_factor() + 32.0,
            _ => value / self.base_factor(),
        }
    }

    /// Whether two units share a dimension
    #[must_use]
    pub fn is_compatible_with(self, other: Self) -> bool {
        self.dimension() == other.dimension()
    }

    /// Convert `value` from this unit to `target`
    ///
    /// # Errors
    ///
    /// Returns `IncompatibleUnits` when the dimensions differ
    pub fn convert(self, value: f64, target: Self) -> AppResult<f64> {
        if self == target {
            return Ok(value);
        }
        if !self.is_compatible_with(target) {
            return Err(AppError::incompatible_units(format!(
                "cannot convert {} to {}",
                self.symbol(),
                target.symbol()
            )));
        }
        Ok(target.from_base(self.to_base(value)))
    }

    /// Short display symbol
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Meter => "m",
            Self::Kilometer => "km",
            Self::Mile => "mi",
            Self::Yard => "yd",
            Self::Foot => "ft",
            Self::Kilogram => "kg",
            Self::Pound => "lb",
            Self::Second => "s",
            Self::Minute => "min",
            Self::Hour => "h",
            Self::Kilocalorie => "kcal",
            Self::Kilojoule => "kJ",
            Self::Count => "count",
            Self::CountPerMinute => "count/min",
            Self::CountPerSecond => "count/s",
            Self::Percent => "%",
            Self::Celsius => "degC",
            Self::Fahrenheit => "degF",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A numeric value carried with its unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    /// Magnitude in `unit`
    pub value: f64,
    /// Unit of `value`
    pub unit: Unit,
}

impl Quantity {
    /// Create a quantity
    #[must_use]
    pub const fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }

    /// Magnitude expressed in `unit`
    ///
    /// # Errors
    ///
    /// Returns `IncompatibleUnits` when `unit` has another dimension
    pub fn value_in(&self, unit: Unit) -> AppResult<f64> {
        self.unit.convert(self.value, unit)
    }

    /// This quantity re-expressed in `unit`
    ///
    /// # Errors
    ///
    /// Returns `IncompatibleUnits` when `unit` has another dimension
    pub fn to(&self, unit: Unit) -> AppResult<Self> {
        Ok(Self::new(self.value_in(unit)?, unit))
    }

    /// Magnitude in the dimension's base unit
    #[must_use]
    pub fn base_value(&self) -> f64 {
        self.unit.to_base(self.value)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

/// Time needed per unit of length, stored canonically as seconds per meter
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Pace {
    seconds_per_meter: f64,
}

impl Pace {
    /// Pace over `meters` covered in `seconds`. Absent for zero or negative distance.
    #[must_use]
    pub fn from_duration_and_distance(seconds: f64, meters: f64) -> Option<Self> {
        if meters <= 0.0 || !meters.is_finite() || !seconds.is_finite() || seconds < 0.0 {
            return None;
        }
        Some(Self {
            seconds_per_meter: seconds / meters,
        })
    }

    /// Pace given as seconds per `length` unit
    ///
    /// # Errors
    ///
    /// Returns `IncompatibleUnits` when `length` is not a length unit
    pub fn from_seconds_per(seconds: f64, length: Unit) -> AppResult<Self> {
        ensure_dimension(length, Dimension::Length, "pace length")?;
        Ok(Self {
            seconds_per_meter: seconds / length.base_factor(),
        })
    }

    /// Seconds needed per `length` unit
    ///
    /// # Errors
    ///
    /// Returns `IncompatibleUnits` when `length` is not a length unit
    pub fn seconds_per(&self, length: Unit) -> AppResult<f64> {
        ensure_dimension(length, Dimension::Length, "pace length")?;
        Ok(self.seconds_per_meter * length.base_factor())
    }

    /// Seconds per meter
    #[must_use]
    pub const fn seconds_per_meter(&self) -> f64 {
        self.seconds_per_meter
    }

    /// Whether this pace is slower than `limit`
    #[must_use]
    pub fn is_slower_than(&self, limit: Self) -> bool {
        self.seconds_per_meter > limit.seconds_per_meter
    }
}

/// Distance covered per unit of time, stored canonically as meters per second
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Speed {
    meters_per_second: f64,
}

impl Speed {
    /// Speed over `meters` covered in `seconds`. Undefined for zero duration.
    #[must_use]
    pub fn from_distance_and_duration(meters: f64, seconds: f64) -> Option<Self> {
        if seconds <= 0.0 || !seconds.is_finite() || !meters.is_finite() {
            return None;
        }
        Some(Self {
            meters_per_second: meters / seconds,
        })
    }

    /// Meters per second
    #[must_use]
    pub const fn meters_per_second(&self) -> f64 {
        self.meters_per_second
    }

    /// Speed expressed as `length` per `time`
    ///
    /// # Errors
    ///
    /// Returns `IncompatibleUnits` when the units are not length and time
    pub fn in_units(&self, length: Unit, time: Unit) -> AppResult<f64> {
        ensure_dimension(length, Dimension::Length, "speed length")?;
        ensure_dimension(time, Dimension::Time, "speed time")?;
        Ok(self.meters_per_second * time.base_factor() / length.base_factor())
    }
}

fn ensure_dimension(unit: Unit, expected: Dimension, role: &str) -> AppResult<()> {
    if unit.dimension() == expected {
        Ok(())
    } else {
        Err(AppError::incompatible_units(format!(
            "{role} must be {expected:?}, got {} ({:?})",
            unit.symbol(),
            unit.dimension()
        )))
    }
}

/// Display units for one workout. Every sub-unit is checked against the
/// dimension its role requires when the set is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSet {
    distance: Unit,
    pace_length: Unit,
    speed_length: Unit,
    speed_time: Unit,
    energy: Unit,
}

impl UnitSet {
    /// Build a unit set
    ///
    /// # Errors
    ///
    /// Returns `IncompatibleUnits` when a sub-unit has the wrong dimension
    pub fn new(
        distance: Unit,
        pace_length: Unit,
        speed_length: Unit,
        speed_time: Unit,
        energy: Unit,
    ) -> AppResult<Self> {
        ensure_dimension(distance, Dimension::Length, "distance")?;
        ensure_dimension(pace_length, Dimension::Length, "pace length")?;
        ensure_dimension(speed_length, Dimension::Length, "speed length")?;
        ensure_dimension(speed_time, Dimension::Time, "speed time")?;
        ensure_dimension(energy, Dimension::Energy, "energy")?;
        Ok(Self {
            distance,
            pace_length,
            speed_length,
            speed_time,
            energy,
        })
    }

    /// Kilometers, min/km, km/h, kcal
    #[must_use]
    pub const fn metric() -> Self {
        Self {
            distance: Unit::Kilometer,
            pace_length: Unit::Kilometer,
            speed_length: Unit::Kilometer,
            speed_time: Unit::Hour,
            energy: Unit::Kilocalorie,
        }
    }

    /// Miles, min/mi, mph, kcal
    #[must_use]
    pub const fn imperial() -> Self {
        Self {
            distance: Unit::Mile,
            pace_length: Unit::Mile,
            speed_length: Unit::Mile,
            speed_time: Unit::Hour,
            energy: Unit::Kilocalorie,
        }
    }

    /// Meters, s/m, m/s, kcal (pool swimming)
    #[must_use]
    pub const fn swimming() -> Self {
        Self {
            distance: Unit::Meter,
            pace_length: Unit::Meter,
            speed_length: Unit::Meter,
            speed_time: Unit::Second,
            energy: Unit::Kilocalorie,
        }
    }

    /// Distance display unit
    #[must_use]
    pub const fn distance(&self) -> Unit {
        self.distance
    }

    /// Energy display unit
    #[must_use]
    pub const fn energy(&self) -> Unit {
        self.energy
    }

    /// Pace length unit
    #[must_use]
    pub const fn pace_length(&self) -> Unit {
        self.pace_length
    }

    /// Speed length unit
    #[must_use]
    pub const fn speed_length(&self) -> Unit {
        self.speed_length
    }

    /// Speed time unit
    #[must_use]
    pub const fn speed_time(&self) -> Unit {
        self.speed_time
    }

    /// Distance in display units
    #[must_use]
    pub fn distance_value(&self, distance: &Quantity) -> Option<f64> {
        distance.value_in(self.distance).ok()
    }

    /// Energy in display units
    #[must_use]
    pub fn energy_value(&self, energy: &Quantity) -> Option<f64> {
        energy.value_in(self.energy).ok()
    }

    /// Pace as seconds per display length unit
    #[must_use]
    pub fn pace_value(&self, pace: &Pace) -> f64 {
        pace.seconds_per_meter() * self.pace_length.base_factor()
    }

    /// Speed as display length per display time unit
    #[must_use]
    pub fn speed_value(&self, speed: &Speed) -> f64 {
        speed.meters_per_second() * self.speed_time.base_factor() / self.speed_length.base_factor()
    }
}

impl Default for UnitSet {
    fn default() -> Self {
        Self::metric()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_conversion_through_base_unit() {
        assert!(Unit::Mile
            .convert(1.0, Unit::Kilometer)
            .is_ok_and(|km| close(km, 1.609_344)));
        assert!(Unit::Kilojoule
            .convert(4.184, Unit::Kilocalorie)
            .is_ok_and(|kcal| close(kcal, 1.0)));
        assert!(Unit::Fahrenheit
            .convert(212.0, Unit::Celsius)
            .is_ok_and(|c| close(c, 100.0)));
        assert!(Unit::CountPerSecond
            .convert(2.0, Unit::CountPerMinute)
            .is_ok_and(|bpm| close(bpm, 120.0)));
    }

    #[test]
    fn test_incompatible_dimensions_rejected() {
        let err = Unit::Meter.convert(1.0, Unit::Second).err();
        assert_eq!(err.map(|e| e.code), Some(ErrorCode::IncompatibleUnits));
        assert!(Quantity::new(1.0, Unit::Kilocalorie).to(Unit::Mile).is_err());
        assert!(UnitSet::new(
            Unit::Kilometer,
            Unit::Kilometer,
            Unit::Kilometer,
            Unit::Meter,
            Unit::Kilocalorie
        )
        .is_err());
    }

    #[test]
    fn test_pace_and_speed_are_absent_when_undefined() {
        assert!(Pace::from_duration_and_distance(60.0, 0.0).is_none());
        assert!(Speed::from_distance_and_duration(100.0, 0.0).is_none());
    }

    #[test]
    fn test_display_values_follow_unit_set() {
        let pace = Pace::from_duration_and_distance(300.0, 1000.0);
        assert!(pace.is_some_and(|p| close(UnitSet::metric().pace_value(&p), 300.0)));
        assert!(pace.is_some_and(|p| close(UnitSet::imperial().pace_value(&p), 482.803_2)));

        let speed = Speed::from_distance_and_duration(1000.0, 300.0);
        assert!(speed.is_some_and(|s| close(UnitSet::metric().speed_value(&s), 12.0)));
        assert!(speed.is_some_and(|s| {
            close(UnitSet::swimming().speed_value(&s), 1000.0 / 300.0)
        }));
    }

    #[test]
    fn test_pace_limit_comparison() {
        let limit = Pace::from_seconds_per(600.0, Unit::Kilometer).ok();
        let slow = Pace::from_duration_and_distance(650.0, 1000.0);
        let fast = Pace::from_duration_and_distance(550.0, 1000.0);
        assert!(matches!((limit, slow), (Some(l), Some(p)) if p.is_slower_than(l)));
        assert!(matches!((limit, fast), (Some(l), Some(p)) if !p.is_slower_than(l)));
    }
}
