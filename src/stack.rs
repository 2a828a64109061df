//! Ordered rate + quota stacks and their analytic capacity curves.
//!
//! A [`LimitStack`] holds limits ordered from the finest period (the rate, index 0) to the
//! coarsest quota. Within a partially elapsed quota window, consumption is bounded both by what
//! the next-finer limit could deliver and by the quota's own per-window ceiling, so bursts never
//! exceed a coarser quota even when the rate alone would allow it.
//!
//! Construction goes through [`LimitStackBuilder`], which drops unreachable or redundant quotas
//! and reports them in [`StackBuild::rejected`] instead of failing.

pub mod availability;
pub mod builder;
pub mod curve;

pub use builder::*;
pub use curve::*;

// self
use crate::{
	_prelude::*,
	duration::Duration,
	limit::Limit,
};

/// Errors raised by stack construction and capacity queries.
#[derive(Clone, Debug, PartialEq, ThisError)]
pub enum LimitStackError {
	/// Neither a rate nor any quota was supplied.
	#[error("A limit stack needs a rate or at least one quota.")]
	NoLimits,
	/// Elapsed time cannot be negative.
	#[error("Elapsed time must not be negative, got {millis}ms.")]
	NegativeTime {
		/// Rejected elapsed time in milliseconds.
		millis: f64,
	},
	/// Elapsed time must be a finite number.
	#[error("Elapsed time must be finite.")]
	NonFiniteTime,
	/// `capacity_during` needs `end > start`.
	#[error("Interval end {end} must be after its start {start}.")]
	EmptyInterval {
		/// Interval start.
		start: Duration,
		/// Interval end.
		end: Duration,
	},
	/// Scaling by zero consumers is meaningless.
	#[error("Scale factor must be positive.")]
	ZeroScale,
	/// Scaling overflowed a limit count.
	#[error("Scaling by {factor} overflows a limit count.")]
	ScaleOverflow {
		/// Requested factor.
		factor: u64,
	},
}

/// Validated limits ordered finest to coarsest; index 0 is the rate.
#[derive(Serialize)]
pub struct LimitStack {
	limits: Vec<Limit>,
	#[serde(skip)]
	exhaustion_cache: OnceLock<Vec<Duration>>,
}
impl LimitStack {
	/// Starts a builder with no limits.
	pub fn builder() -> LimitStackBuilder {
		LimitStackBuilder::default()
	}

	/// Builds a stack from a rate and any number of candidate quotas.
	pub fn assemble<I>(rate: Limit, quotas: I) -> StackBuild
	where
		I: IntoIterator<Item = Limit>,
	{
		builder::assemble(rate, quotas.into_iter().collect())
	}

	/// Builds a stack from quotas alone, deriving a uniform unit rate from the finest quota.
	pub fn from_quotas<I>(quotas: I) -> Result<StackBuild, LimitStackError>
	where
		I: IntoIterator<Item = Limit>,
	{
		LimitStackBuilder::default().quotas(quotas).build()
	}

	/// Rebuilds the stack on top of a new rate, re-validating the accepted quotas.
	pub fn with_rate(&self, rate: Limit) -> StackBuild {
		Self::assemble(rate, self.quotas().iter().copied())
	}

	/// Wraps limits that already satisfy every construction invariant.
	pub(crate) fn from_validated(limits: Vec<Limit>) -> Self {
		debug_assert!(!limits.is_empty());

		Self { limits, exhaustion_cache: OnceLock::new() }
	}

	/// All limits, finest first.
	pub fn limits(&self) -> &[Limit] {
		&self.limits
	}

	/// The finest limit.
	pub fn rate(&self) -> Limit {
		self.limits[0]
	}

	/// Every limit coarser than the rate.
	pub fn quotas(&self) -> &[Limit] {
		&self.limits[1..]
	}

	/// The coarsest limit (the rate when there are no quotas).
	pub fn coarsest(&self) -> Limit {
		self.limits[self.limits.len() - 1]
	}

	/// Period of the coarsest limit.
	pub fn coarsest_period(&self) -> Duration {
		self.coarsest().period()
	}

	/// Maximum number of requests obtainable by elapsed time `t`.
	///
	/// The window is closed on the left, so `capacity_at(0) == rate.count`.
	pub fn capacity_at(&self, t: Duration) -> u64 {
		self.capacity_at_base(t.to_base_unit())
	}

	/// [`Self::capacity_at`] for a raw millisecond offset.
	pub fn capacity_at_millis(&self, millis: f64) -> Result<u64, LimitStackError> {
		if !millis.is_finite() {
			return Err(LimitStackError::NonFiniteTime);
		}
		if millis < 0. {
			return Err(LimitStackError::NegativeTime { millis });
		}

		Ok(self.capacity_at_base(millis))
	}

	/// Requests obtainable within `(start, end]`.
	pub fn capacity_during(&self, start: Duration, end: Duration) -> Result<u64, LimitStackError> {
		if end <= start {
			return Err(LimitStackError::EmptyInterval { start, end });
		}

		Ok(self.capacity_at(end).saturating_sub(self.capacity_at(start)))
	}

	/// Smallest elapsed time at which capacity reaches `target`, in the rate's unit.
	pub fn min_time(&self, target: u64) -> Duration {
		let rate = self.rate();

		if target == 0 {
			return Duration::zero().convert_to(rate.period().unit());
		}

		let mut remaining = target;
		let mut elapsed = 0.;

		for quota in self.quotas().iter().rev() {
			let whole = remaining / quota.count();
			// Landing exactly on a window boundary must not burn that whole window.
			let consumed = if remaining % quota.count() == 0 { whole - 1 } else { whole };

			elapsed += consumed as f64 * quota.period_millis();
			remaining -= consumed * quota.count();
		}

		// The rate releases whole bursts at the start of each of its periods.
		elapsed += ((remaining - 1) / rate.count()) as f64 * rate.period_millis();

		Duration::from_base_unchecked(elapsed, rate.period().unit())
	}

	/// Capacity at a validated, non-negative millisecond offset.
	///
	/// Walks the stack coarsest-first. At each quota level the whole windows contribute
	/// `n * count` and the ramp inside the current window is capped by `count`. Keeping a running
	/// `offset` and `cap` turns the nested `offset + min(cap, inner)` into a single pass.
	pub(crate) fn capacity_at_base(&self, millis: f64) -> u64 {
		let mut t = millis;
		let mut offset: i128 = 0;
		let mut cap: Option<i128> = None;

		for quota in self.quotas().iter().rev() {
			let period = quota.period_millis();
			let windows = (t / period).floor();
			let count = quota.count() as i128;
			let from_windows = windows as i128 * count;

			t -= windows * period;
			offset += from_windows;
			cap = Some(match cap {
				Some(cap) => (cap - from_windows).min(count),
				None => count,
			});
		}

		let rate = self.rate();
		let ramp = rate.count() as i128 * (t / rate.period_millis() + 1.).floor() as i128;
		let total = offset + cap.map_or(ramp, |cap| cap.min(ramp));

		total.max(0) as u64
	}
}
impl Clone for LimitStack {
	fn clone(&self) -> Self {
		Self::from_validated(self.limits.clone())
	}
}
impl PartialEq for LimitStack {
	fn eq(&self, other: &Self) -> bool {
		self.limits == other.limits
	}
}
impl Debug for LimitStack {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("LimitStack").field(&self.limits).finish()
	}
}
impl Display for LimitStack {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		for (i, limit) in self.limits.iter().enumerate() {
			if i > 0 {
				f.write_str(" + ")?;
			}

			Display::fmt(limit, f)?;
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::duration::TimeUnit;

	fn limit(count: u64, period: &str) -> Limit {
		Limit::per(count, period).expect("Limit fixture should be valid.")
	}

	fn secs(value: f64) -> Duration {
		Duration::new(value, TimeUnit::Second).expect("Elapsed fixture should be valid.")
	}

	fn two_level() -> LimitStack {
		LimitStack::assemble(limit(1, "2s"), [limit(1_800, "1h")]).into_stack()
	}

	#[test]
	fn left_boundary_equals_rate_count() {
		assert_eq!(two_level().capacity_at(Duration::zero()), 1);

		let bursty = LimitStack::assemble(limit(10, "1s"), []).into_stack();

		assert_eq!(bursty.capacity_at(Duration::zero()), 10);
		assert_eq!(bursty.capacity_at(secs(0.999)), 10);
		assert_eq!(bursty.capacity_at(secs(1.)), 20);
	}

	#[test]
	fn quota_caps_the_ramp_inside_a_window() {
		let stack = two_level();

		assert_eq!(stack.capacity_at(secs(2.)), 2);
		assert_eq!(stack.capacity_at(secs(3_598.)), 1_800);
		assert_eq!(stack.capacity_at(secs(3_599.)), 1_800);
		assert_eq!(stack.capacity_at(secs(3_600.)), 1_801);
		assert_eq!(stack.capacity_at(secs(7_200.)), 3_601);
	}

	#[test]
	fn three_levels_respect_every_ceiling() {
		let stack =
			LimitStack::assemble(limit(10, "1s"), [limit(100, "1min"), limit(1_000, "1h")]).into_stack();

		assert_eq!(stack.capacity_at(secs(9.)), 100);
		assert_eq!(stack.capacity_at(secs(60.)), 110);
		assert_eq!(stack.capacity_at(secs(600.)), 1_000);
		assert_eq!(stack.capacity_at(secs(3_599.)), 1_000);
		assert_eq!(stack.capacity_at(secs(3_600.)), 1_010);
	}

	#[test]
	fn min_time_inverts_capacity() {
		let stack = two_level();
		let t = stack.min_time(1_800);

		assert_eq!(t.unit(), TimeUnit::Second);
		assert_eq!(t.value(), 3_598.);
		assert_eq!(stack.capacity_at(t), 1_800);
		assert_eq!(stack.capacity_at_millis(t.to_base_unit() - 1.), Ok(1_799));
		assert_eq!(stack.min_time(1_801), secs(3_600.));
		assert_eq!(stack.min_time(3_600), secs(3_600. + 3_598.));
		assert!(stack.min_time(0).is_zero());
		assert_eq!(stack.min_time(1), Duration::zero());
	}

	#[test]
	fn min_time_lands_on_burst_boundaries() {
		let stack = LimitStack::assemble(limit(10, "1s"), [limit(100, "1min")]).into_stack();

		for (target, expected) in [(5, 0.), (10, 0.), (11, 1_000.), (15, 1_000.), (100, 9_000.)] {
			let t = stack.min_time(target).to_base_unit();

			assert_eq!(t, expected, "Target {target} should be reached at {expected}ms.");
			assert!(stack.capacity_at_base(t) >= target);

			if t >= 1. {
				assert!(stack.capacity_at_base(t - 1.) < target, "Target {target} is reached earlier.");
			}
		}

		assert_eq!(stack.min_time(101).to_base_unit(), 60_000.);
	}

	#[test]
	fn raw_millis_are_validated() {
		let stack = two_level();

		assert_eq!(
			stack.capacity_at_millis(-1.),
			Err(LimitStackError::NegativeTime { millis: -1. })
		);
		assert_eq!(stack.capacity_at_millis(f64::NAN), Err(LimitStackError::NonFiniteTime));
		assert_eq!(stack.capacity_at_millis(2_000.), Ok(2));
	}

	#[test]
	fn capacity_during_requires_forward_interval() {
		let stack = two_level();

		assert_eq!(stack.capacity_during(secs(0.), secs(10.)), Ok(5));
		assert!(matches!(
			stack.capacity_during(secs(10.), secs(10.)),
			Err(LimitStackError::EmptyInterval { .. })
		));
	}

	#[test]
	fn rebasing_builds_a_new_stack() {
		let stack = two_level();
		let faster = stack.with_rate(limit(2, "1s")).into_stack();

		assert_eq!(faster.rate(), limit(2, "1s"));
		assert_eq!(faster.quotas(), stack.quotas());
		assert_eq!(stack.rate(), limit(1, "2s"));
		assert_eq!(faster.to_string(), "2/1s + 1800/1h");
	}
}
