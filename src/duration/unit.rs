// self
use crate::{_prelude::*, duration::DurationError};

/// Time granularities understood by the engine.
///
/// Every unit carries a fixed millisecond factor. Months are 30 days and years are 360 days; no
/// calendar is consulted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TimeUnit {
	/// One millisecond (the base unit).
	Millisecond,
	/// 1_000 milliseconds.
	Second,
	/// 60 seconds.
	Minute,
	/// 60 minutes.
	Hour,
	/// 24 hours.
	Day,
	/// 7 days.
	Week,
	/// 30 days.
	Month,
	/// 360 days.
	Year,
}
impl TimeUnit {
	/// All units ordered from finest to coarsest.
	pub const ALL: [TimeUnit; 8] = [
		TimeUnit::Millisecond,
		TimeUnit::Second,
		TimeUnit::Minute,
		TimeUnit::Hour,
		TimeUnit::Day,
		TimeUnit::Week,
		TimeUnit::Month,
		TimeUnit::Year,
	];

	/// Number of milliseconds in one unit.
	pub const fn millis(self) -> u64 {
		match self {
			TimeUnit::Millisecond => 1,
			TimeUnit::Second => 1_000,
			TimeUnit::Minute => 60_000,
			TimeUnit::Hour => 3_600_000,
			TimeUnit::Day => 86_400_000,
			TimeUnit::Week => 604_800_000,
			TimeUnit::Month => 2_592_000_000,
			TimeUnit::Year => 31_104_000_000,
		}
	}

	/// Millisecond factor as a float, for arithmetic on fractional values.
	pub const fn factor(self) -> f64 {
		self.millis() as f64
	}

	/// Compact suffix used by duration strings (`"ms"`, `"s"`, `"min"`, ...).
	pub const fn suffix(self) -> &'static str {
		match self {
			TimeUnit::Millisecond => "ms",
			TimeUnit::Second => "s",
			TimeUnit::Minute => "min",
			TimeUnit::Hour => "h",
			TimeUnit::Day => "day",
			TimeUnit::Week => "week",
			TimeUnit::Month => "month",
			TimeUnit::Year => "year",
		}
	}

	/// Long, singular name used by plan definitions.
	pub const fn as_str(self) -> &'static str {
		match self {
			TimeUnit::Millisecond => "millisecond",
			TimeUnit::Second => "second",
			TimeUnit::Minute => "minute",
			TimeUnit::Hour => "hour",
			TimeUnit::Day => "day",
			TimeUnit::Week => "week",
			TimeUnit::Month => "month",
			TimeUnit::Year => "year",
		}
	}
}
impl Display for TimeUnit {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.suffix())
	}
}
impl FromStr for TimeUnit {
	type Err = DurationError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let unit = match s.trim().to_ascii_lowercase().as_str() {
			"ms" | "millisecond" | "milliseconds" => TimeUnit::Millisecond,
			"s" | "second" | "seconds" => TimeUnit::Second,
			"min" | "minute" | "minutes" => TimeUnit::Minute,
			"h" | "hour" | "hours" => TimeUnit::Hour,
			"day" | "days" => TimeUnit::Day,
			"week" | "weeks" => TimeUnit::Week,
			"month" | "months" => TimeUnit::Month,
			"year" | "years" => TimeUnit::Year,
			_ => return Err(DurationError::UnknownUnit { unit: s.to_owned() }),
		};

		Ok(unit)
	}
}
impl TryFrom<String> for TimeUnit {
	type Error = DurationError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		value.parse()
	}
}
impl From<TimeUnit> for String {
	fn from(value: TimeUnit) -> Self {
		value.as_str().to_owned()
	}
}
