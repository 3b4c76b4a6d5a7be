//! Unit conversion for user-entered values.
//!
//! The engine itself is unit-agnostic: targets are stored in canonical units
//! (kilograms, meters, seconds) and `convert` is the single pure function
//! callers use to normalize user input before handing values to the engine.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Units accepted for user-entered target values
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Kilograms,
    Pounds,
    Meters,
    Kilometers,
    Miles,
    Seconds,
    Minutes,
}

#[derive(PartialEq, Eq)]
enum Dimension {
    Mass,
    Distance,
    Time,
}

impl Unit {
    fn dimension(self) -> Dimension {
        match self {
            Unit::Kilograms | Unit::Pounds => Dimension::Mass,
            Unit::Meters | Unit::Kilometers | Unit::Miles => Dimension::Distance,
            Unit::Seconds | Unit::Minutes => Dimension::Time,
        }
    }

    /// Factor to the dimension's canonical unit (kg, m, s)
    fn to_base(self) -> f64 {
        match self {
            Unit::Kilograms => 1.0,
            Unit::Pounds => 0.453_592_37,
            Unit::Meters => 1.0,
            Unit::Kilometers => 1000.0,
            Unit::Miles => 1609.344,
            Unit::Seconds => 1.0,
            Unit::Minutes => 60.0,
        }
    }

    /// The canonical storage unit for this unit's dimension
    pub fn canonical(self) -> Unit {
        match self.dimension() {
            Dimension::Mass => Unit::Kilograms,
            Dimension::Distance => Unit::Meters,
            Dimension::Time => Unit::Seconds,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Unit::Kilograms => "kg",
            Unit::Pounds => "lb",
            Unit::Meters => "m",
            Unit::Kilometers => "km",
            Unit::Miles => "mi",
            Unit::Seconds => "s",
            Unit::Minutes => "min",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for Unit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "kg" | "kgs" | "kilograms" => Ok(Unit::Kilograms),
            "lb" | "lbs" | "pounds" => Ok(Unit::Pounds),
            "m" | "meters" | "metres" => Ok(Unit::Meters),
            "km" | "kilometers" | "kilometres" => Ok(Unit::Kilometers),
            "mi" | "miles" => Ok(Unit::Miles),
            "s" | "sec" | "seconds" => Ok(Unit::Seconds),
            "min" | "minutes" => Ok(Unit::Minutes),
            other => Err(Error::InvalidCommand(format!("unknown unit '{}'", other))),
        }
    }
}

/// Convert a value between two units of the same dimension
///
/// Cross-dimension conversions (e.g. kilograms to minutes) fail with
/// `Error::UnitConversion`.
pub fn convert(value: f64, from: Unit, to: Unit) -> Result<f64> {
    if from.dimension() != to.dimension() {
        return Err(Error::UnitConversion {
            from: from.to_string(),
            to: to.to_string(),
        });
    }
    Ok(value * from.to_base() / to.to_base())
}
