//! The atomic constraint: at most `count` requests per `period`.

// self
use crate::{
	_prelude::*,
	duration::{Duration, DurationError},
};

/// Errors raised while constructing a [`Limit`].
#[derive(Clone, Debug, PartialEq, ThisError)]
pub enum LimitError {
	/// A limit must allow at least one request.
	#[error("Limit count must be positive.")]
	ZeroCount,
	/// A limit must span a positive period.
	#[error("Limit period must be positive.")]
	ZeroPeriod,
	/// The period could not be parsed or validated.
	#[error(transparent)]
	Period(#[from] DurationError),
}

/// "At most `count` requests per `period`."
///
/// The finest limit of a stack is its rate; every coarser limit is a quota.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LimitRepr")]
pub struct Limit {
	count: u64,
	period: Duration,
}
impl Limit {
	/// Creates a limit after validating both components.
	pub fn new(count: u64, period: Duration) -> Result<Self, LimitError> {
		if count == 0 {
			return Err(LimitError::ZeroCount);
		}
		if period.is_zero() {
			return Err(LimitError::ZeroPeriod);
		}

		Ok(Self { count, period })
	}

	/// Creates a limit from a compact period string such as `"1h"`.
	pub fn per(count: u64, period: &str) -> Result<Self, LimitError> {
		Self::new(count, period.parse()?)
	}

	/// Maximum number of requests per period.
	pub fn count(&self) -> u64 {
		self.count
	}

	/// Window the count applies to.
	pub fn period(&self) -> Duration {
		self.period
	}

	/// Period length in milliseconds.
	pub fn period_millis(&self) -> f64 {
		self.period.to_base_unit()
	}

	/// Sustained throughput in requests per millisecond.
	pub fn per_millisecond(&self) -> f64 {
		self.count as f64 / self.period_millis()
	}

	/// Spacing between requests when the count is spread evenly over the period.
	pub fn spacing_millis(&self) -> f64 {
		self.period_millis() / self.count as f64
	}

	/// Unit-count limit that spreads this limit's requests evenly across its period.
	pub fn uniform(&self) -> Self {
		Self {
			count: 1,
			period: Duration::from_base_unchecked(self.spacing_millis(), self.period.unit()),
		}
	}

	/// Linear projection of the count onto another period.
	pub fn rescaled_to(&self, period: Duration) -> f64 {
		self.count as f64 * period.to_base_unit() / self.period_millis()
	}

	/// Multiplies the count, keeping the period; `None` on overflow.
	pub(crate) fn scaled(&self, factor: u64) -> Option<Self> {
		self.count.checked_mul(factor).map(|count| Self { count, period: self.period })
	}
}
impl Display for Limit {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{}/{}{}", self.count, self.period.value(), self.period.unit().suffix())
	}
}
impl TryFrom<LimitRepr> for Limit {
	type Error = LimitError;

	fn try_from(value: LimitRepr) -> Result<Self, Self::Error> {
		Self::new(value.count, value.period)
	}
}

#[derive(Deserialize)]
struct LimitRepr {
	#[serde(alias = "max")]
	count: u64,
	period: Duration,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::duration::TimeUnit;

	#[test]
	fn validates_count_and_period() {
		assert_eq!(Limit::new(0, Duration::zero()), Err(LimitError::ZeroCount));
		assert_eq!(Limit::per(1, "0s"), Err(LimitError::ZeroPeriod));
		assert!(matches!(Limit::per(1, "soon"), Err(LimitError::Period(_))));

		let limit = Limit::per(10, "1s").expect("Limit fixture should be valid.");

		assert_eq!(limit.count(), 10);
		assert_eq!(limit.period_millis(), 1_000.);
		assert_eq!(limit.to_string(), "10/1s");
	}

	#[test]
	fn uniform_spreads_requests() {
		let limit = Limit::per(20, "1min").expect("Limit fixture should be valid.");
		let uniform = limit.uniform();

		assert_eq!(uniform.count(), 1);
		assert_eq!(uniform.period_millis(), 3_000.);
		assert_eq!(uniform.period().unit(), TimeUnit::Minute);
		assert_eq!(uniform.per_millisecond(), limit.per_millisecond());
	}

	#[test]
	fn rescales_linearly() {
		let daily = Limit::per(1_000, "1day").expect("Limit fixture should be valid.");
		let month = "1month".parse().expect("Period fixture should parse.");

		assert_eq!(daily.rescaled_to(month), 30_000.);
		assert_eq!(daily.scaled(3).map(|l| l.count()), Some(3_000));
		assert_eq!(Limit::per(u64::MAX, "1s").ok().and_then(|l| l.scaled(2)), None);
	}

	#[test]
	fn serde_accepts_max_alias() {
		let limit: Limit = serde_json::from_str(r#"{"max":1800,"period":"1h"}"#)
			.expect("Limit should deserialize from the plan shape.");

		assert_eq!(limit, Limit::per(1_800, "1h").expect("Limit fixture should be valid."));
		assert!(serde_json::from_str::<Limit>(r#"{"count":0,"period":"1h"}"#).is_err());
	}
}
