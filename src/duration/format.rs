//! Compact duration strings and human-readable rendering.

// self
use crate::{
	_prelude::*,
	duration::{Duration, DurationError, TimeUnit},
};

// Units used by `humanize`, coarsest first. Months and years are left out so long spans read in
// days, which is how quota windows are usually quoted.
const HUMANIZE_UNITS: [TimeUnit; 4] =
	[TimeUnit::Day, TimeUnit::Hour, TimeUnit::Minute, TimeUnit::Second];

impl Duration {
	/// Re-expresses the span in the largest unit whose magnitude is at least one.
	pub fn best_unit(&self) -> Self {
		let millis = self.to_base_unit();
		let unit = TimeUnit::ALL
			.into_iter()
			.rev()
			.find(|unit| millis >= unit.factor())
			.unwrap_or(TimeUnit::Millisecond);

		self.convert_to(unit)
	}

	/// Renders the span as a compound string such as `"1day 2h 3min 4s"`.
	///
	/// Milliseconds are only shown for spans shorter than one second; longer spans are rounded to
	/// the nearest second.
	pub fn humanize(&self) -> String {
		let millis = self.to_base_unit().round() as u64;

		if millis < TimeUnit::Second.millis() {
			return format!("{millis}ms");
		}

		let mut rest = (millis + TimeUnit::Second.millis() / 2) / TimeUnit::Second.millis()
			* TimeUnit::Second.millis();
		let mut parts = Vec::new();

		for unit in HUMANIZE_UNITS {
			let whole = rest / unit.millis();

			if whole > 0 {
				parts.push(format!("{whole}{}", unit.suffix()));

				rest -= whole * unit.millis();
			}
		}

		parts.join(" ")
	}
}
impl Display for Duration {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{} {}", self.value(), self.unit().suffix())
	}
}
impl FromStr for Duration {
	type Err = DurationError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let trimmed = s.trim();
		let malformed = || DurationError::Malformed { input: s.to_owned() };
		let split = trimmed.find(|c: char| c.is_ascii_alphabetic()).ok_or_else(malformed)?;
		let (number, unit) = trimmed.split_at(split);
		let number = number.trim();

		if number.is_empty() {
			return Err(malformed());
		}

		let value = number.parse::<f64>().map_err(|_| malformed())?;
		let unit = unit.parse::<TimeUnit>()?;

		Duration::new(value, unit)
	}
}
