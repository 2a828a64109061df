//! Unit-aware, immutable durations used for limit periods and elapsed times.
//!
//! A [`Duration`] is a non-negative magnitude paired with a [`TimeUnit`]. Arithmetic normalizes
//! to the left operand's unit, and comparisons always go through the millisecond base value, so
//! `Duration(1, h)` equals `Duration(60, min)`.

mod format;
mod unit;

pub use unit::*;

// std
use std::{cmp::Ordering, ops::Add};
// self
use crate::_prelude::*;

/// Errors raised while constructing, parsing, or combining durations.
#[derive(Clone, Debug, PartialEq, ThisError)]
pub enum DurationError {
	/// Durations cannot be negative.
	#[error("Duration value must not be negative, got {value}.")]
	Negative {
		/// Rejected magnitude.
		value: f64,
	},
	/// NaN and infinities are rejected.
	#[error("Duration value must be finite.")]
	NonFinite,
	/// The compact duration string could not be split into a number and a unit.
	#[error("Duration string `{input}` is malformed; expected `<number><unit>`.")]
	Malformed {
		/// Original input.
		input: String,
	},
	/// The unit suffix or name is not recognized.
	#[error("Time unit `{unit}` is not recognized.")]
	UnknownUnit {
		/// Unrecognized unit text.
		unit: String,
	},
	/// Subtraction would produce a negative duration.
	#[error("Cannot subtract {subtrahend} from {minuend}; the result would be negative.")]
	NegativeDifference {
		/// Left operand.
		minuend: Duration,
		/// Right operand.
		subtrahend: Duration,
	},
}

/// Non-negative time span expressed in a specific [`TimeUnit`].
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(try_from = "DurationRepr")]
pub struct Duration {
	value: f64,
	unit: TimeUnit,
}
impl Duration {
	/// Creates a duration after validating the magnitude.
	pub fn new(value: f64, unit: TimeUnit) -> Result<Self, DurationError> {
		if !value.is_finite() {
			return Err(DurationError::NonFinite);
		}
		if value < 0. {
			return Err(DurationError::Negative { value });
		}

		Ok(Self { value, unit })
	}

	/// Creates a duration measured in milliseconds.
	pub fn from_millis(millis: f64) -> Result<Self, DurationError> {
		Self::new(millis, TimeUnit::Millisecond)
	}

	/// Zero-length duration in milliseconds.
	pub const fn zero() -> Self {
		Self { value: 0., unit: TimeUnit::Millisecond }
	}

	/// Builds a duration from a base value the caller already proved finite and non-negative.
	pub(crate) fn from_base_unchecked(millis: f64, unit: TimeUnit) -> Self {
		Self { value: millis / unit.factor(), unit }
	}

	/// Magnitude in [`Self::unit`].
	pub fn value(&self) -> f64 {
		self.value
	}

	/// Unit the magnitude is expressed in.
	pub fn unit(&self) -> TimeUnit {
		self.unit
	}

	/// Returns the duration in milliseconds, the engine's base unit.
	pub fn to_base_unit(self) -> f64 {
		self.value * self.unit.factor()
	}

	/// Returns the duration in seconds.
	pub fn to_seconds(self) -> f64 {
		self.to_base_unit() / TimeUnit::Second.factor()
	}

	/// Returns `true` if the duration has zero length.
	pub fn is_zero(&self) -> bool {
		self.value == 0.
	}

	/// Re-expresses the same span in `unit`.
	pub fn convert_to(&self, unit: TimeUnit) -> Self {
		if unit == self.unit {
			return *self;
		}

		Self::from_base_unchecked(self.to_base_unit(), unit)
	}

	/// Subtracts `other`, keeping the left operand's unit.
	pub fn checked_sub(&self, other: Duration) -> Result<Self, DurationError> {
		let diff = self.to_base_unit() - other.to_base_unit();

		if diff < 0. {
			return Err(DurationError::NegativeDifference { minuend: *self, subtrahend: other });
		}

		Ok(Self::from_base_unchecked(diff, self.unit))
	}

	/// Subtracts `other`, clamping at zero.
	pub fn saturating_sub(&self, other: Duration) -> Self {
		Self::from_base_unchecked((self.to_base_unit() - other.to_base_unit()).max(0.), self.unit)
	}
}
impl Add for Duration {
	type Output = Duration;

	fn add(self, rhs: Duration) -> Self::Output {
		Self::from_base_unchecked(self.to_base_unit() + rhs.to_base_unit(), self.unit)
	}
}
impl PartialEq for Duration {
	fn eq(&self, other: &Self) -> bool {
		self.to_base_unit() == other.to_base_unit()
	}
}
impl PartialOrd for Duration {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		self.to_base_unit().partial_cmp(&other.to_base_unit())
	}
}
impl Default for Duration {
	fn default() -> Self {
		Self::zero()
	}
}
impl TryFrom<DurationRepr> for Duration {
	type Error = DurationError;

	fn try_from(value: DurationRepr) -> Result<Self, Self::Error> {
		match value {
			DurationRepr::Compact(s) => s.parse(),
			DurationRepr::Parts { value, unit } => Self::new(value, unit),
		}
	}
}
impl From<Duration> for time::Duration {
	fn from(value: Duration) -> Self {
		time::Duration::seconds_f64(value.to_seconds())
	}
}
impl TryFrom<time::Duration> for Duration {
	type Error = DurationError;

	fn try_from(value: time::Duration) -> Result<Self, Self::Error> {
		Self::new(value.as_seconds_f64(), TimeUnit::Second)
	}
}

/// Accepted serialized shapes: `"1h"` or `{ "value": 1, "unit": "hour" }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum DurationRepr {
	Compact(String),
	Parts { value: f64, unit: TimeUnit },
}
