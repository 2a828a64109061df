//! Validating construction for [`LimitStack`].
//!
//! Candidate quotas are evaluated in ascending period order. Each one is either accepted or
//! rejected on its own; rejecting a quota never affects how the next one is judged beyond the
//! limits already accepted. Rejections are returned as data and logged, not raised.

// self
use crate::{
	_prelude::*,
	duration::Duration,
	limit::Limit,
	obs::{self, AnalysisKind, AnalysisOutcome, AnalysisSpan, AnalysisStage},
	stack::{LimitStack, LimitStackError},
};

// Relative slack for comparisons against linearly projected capacities.
const CAPACITY_TOLERANCE: f64 = 1e-9;

/// Why a candidate quota was left out of a stack.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RejectionReason {
	/// The quota's count does not exceed the rate's count, so it can never bind.
	NotAboveRate {
		/// Count of the stack's rate.
		rate_count: u64,
	},
	/// The quota's period does not extend past the last accepted limit.
	PeriodNotCoarser {
		/// Period of the last accepted limit.
		previous: Duration,
	},
	/// The rate alone cannot deliver the count within the quota's period.
	ExceedsRateCapacity {
		/// Requests the rate delivers over the quota's period.
		deliverable: f64,
	},
	/// A tighter, already accepted quota caps delivery below the count.
	Unreachable {
		/// The accepted quota that binds first.
		binding: Limit,
		/// Requests the binding quota allows over the candidate's period.
		deliverable: f64,
	},
}
impl RejectionReason {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(&self) -> &'static str {
		match self {
			RejectionReason::NotAboveRate { .. } => "not_above_rate",
			RejectionReason::PeriodNotCoarser { .. } => "period_not_coarser",
			RejectionReason::ExceedsRateCapacity { .. } => "exceeds_rate_capacity",
			RejectionReason::Unreachable { .. } => "unreachable",
		}
	}
}
impl Display for RejectionReason {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			RejectionReason::NotAboveRate { rate_count } =>
				write!(f, "count does not exceed the rate count {rate_count}"),
			RejectionReason::PeriodNotCoarser { previous } =>
				write!(f, "period is not longer than the previous limit period {previous}"),
			RejectionReason::ExceedsRateCapacity { deliverable } =>
				write!(f, "the rate delivers at most {deliverable} requests in this period"),
			RejectionReason::Unreachable { binding, deliverable } =>
				write!(f, "quota {binding} allows at most {deliverable} requests in this period"),
		}
	}
}

/// A candidate quota that was dropped during construction.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RejectedQuota {
	/// The dropped quota.
	pub quota: Limit,
	/// Why it was dropped.
	pub reason: RejectionReason,
}

/// Outcome of building a stack: the usable stack plus any dropped quotas.
#[derive(Clone, Debug, PartialEq)]
pub struct StackBuild {
	/// The validated stack.
	pub stack: LimitStack,
	/// Quotas that were dropped, in evaluation order.
	pub rejected: Vec<RejectedQuota>,
}
impl StackBuild {
	/// Discards the rejection report.
	pub fn into_stack(self) -> LimitStack {
		self.stack
	}

	/// Returns `true` when every candidate quota was accepted.
	pub fn is_clean(&self) -> bool {
		self.rejected.is_empty()
	}
}

/// Builder for [`LimitStack`] values.
#[derive(Clone, Debug, Default)]
pub struct LimitStackBuilder {
	/// Explicit rate; derived from the finest quota when absent.
	pub rate: Option<Limit>,
	/// Candidate quotas in any order.
	pub quotas: Vec<Limit>,
}
impl LimitStackBuilder {
	/// Sets the rate.
	pub fn rate(mut self, rate: Limit) -> Self {
		self.rate = Some(rate);

		self
	}

	/// Adds a single candidate quota.
	pub fn quota(mut self, quota: Limit) -> Self {
		self.quotas.push(quota);

		self
	}

	/// Adds multiple candidate quotas.
	pub fn quotas<I>(mut self, quotas: I) -> Self
	where
		I: IntoIterator<Item = Limit>,
	{
		self.quotas.extend(quotas);

		self
	}

	/// Consumes the builder and validates the resulting stack.
	///
	/// Without an explicit rate, one request per `period / count` of the finest quota is used.
	pub fn build(self) -> Result<StackBuild, LimitStackError> {
		let rate = match self.rate {
			Some(rate) => rate,
			None => self
				.quotas
				.iter()
				.min_by(|a, b| a.period_millis().total_cmp(&b.period_millis()))
				.map(Limit::uniform)
				.ok_or(LimitStackError::NoLimits)?,
		};

		Ok(assemble(rate, self.quotas))
	}
}

/// Validates `quotas` against `rate` and the quotas accepted before them.
pub(crate) fn assemble(rate: Limit, mut quotas: Vec<Limit>) -> StackBuild {
	const KIND: AnalysisKind = AnalysisKind::StackValidation;

	let _span = AnalysisSpan::new(AnalysisStage::Assemble, quotas.len() + 1).entered();

	quotas.sort_by(|a, b| a.period_millis().total_cmp(&b.period_millis()));

	let mut limits = Vec::with_capacity(quotas.len() + 1);
	let mut rejected = Vec::new();

	limits.push(rate);

	for quota in quotas {
		match admit(&limits, quota) {
			Ok(()) => limits.push(quota),
			Err(reason) => {
				let rejection = RejectedQuota { quota, reason };

				obs::record_quota_rejected(&rejection);
				obs::record_analysis_outcome(KIND, AnalysisOutcome::QuotaRejected);
				rejected.push(rejection);
			},
		}
	}

	StackBuild { stack: LimitStack::from_validated(limits), rejected }
}

fn admit(accepted: &[Limit], quota: Limit) -> Result<(), RejectionReason> {
	let rate = accepted[0];
	let previous = accepted[accepted.len() - 1];

	if quota.count() <= rate.count() {
		return Err(RejectionReason::NotAboveRate { rate_count: rate.count() });
	}
	if quota.period() <= previous.period() {
		return Err(RejectionReason::PeriodNotCoarser { previous: previous.period() });
	}

	let deliverable = rate.rescaled_to(quota.period());

	if exceeds(quota.count(), deliverable) {
		return Err(RejectionReason::ExceedsRateCapacity { deliverable });
	}

	for tighter in &accepted[1..] {
		let deliverable = tighter.rescaled_to(quota.period());

		if exceeds(quota.count(), deliverable) {
			return Err(RejectionReason::Unreachable { binding: *tighter, deliverable });
		}
	}

	Ok(())
}

fn exceeds(count: u64, deliverable: f64) -> bool {
	count as f64 > deliverable * (1. + CAPACITY_TOLERANCE)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn limit(count: u64, period: &str) -> Limit {
		Limit::per(count, period).expect("Limit fixture should be valid.")
	}

	#[test]
	fn sorts_candidates_by_period() {
		let build = LimitStack::assemble(limit(10, "1s"), [limit(1_000, "1h"), limit(100, "1min")]);

		assert!(build.is_clean());
		assert_eq!(build.stack.limits(), &[limit(10, "1s"), limit(100, "1min"), limit(1_000, "1h")]);
	}

	#[test]
	fn drops_quota_not_above_rate() {
		let build = LimitStack::assemble(limit(10, "1s"), [limit(10, "1h"), limit(500, "1day")]);

		assert_eq!(build.stack.quotas(), &[limit(500, "1day")]);
		assert_eq!(
			build.rejected,
			vec![RejectedQuota {
				quota: limit(10, "1h"),
				reason: RejectionReason::NotAboveRate { rate_count: 10 },
			}]
		);
	}

	#[test]
	fn drops_quota_beyond_rate_capacity() {
		let build = LimitStack::assemble(limit(1, "2s"), [limit(2_000, "1h")]);

		assert!(build.stack.quotas().is_empty());
		assert_eq!(
			build.rejected[0].reason,
			RejectionReason::ExceedsRateCapacity { deliverable: 1_800. }
		);
	}

	#[test]
	fn drops_quota_unreachable_under_tighter_quota() {
		let build =
			LimitStack::assemble(limit(10, "1s"), [limit(100, "1min"), limit(10_000, "1h")]);

		assert_eq!(build.stack.quotas(), &[limit(100, "1min")]);
		assert_eq!(
			build.rejected[0].reason,
			RejectionReason::Unreachable { binding: limit(100, "1min"), deliverable: 6_000. }
		);
	}

	#[test]
	fn drops_duplicate_periods() {
		let build = LimitStack::assemble(limit(10, "1s"), [limit(100, "1min"), limit(200, "60s")]);

		assert_eq!(build.stack.quotas().len(), 1);
		assert!(matches!(build.rejected[0].reason, RejectionReason::PeriodNotCoarser { .. }));
		assert_eq!(build.rejected[0].reason.as_str(), "period_not_coarser");
	}

	#[test]
	fn rejection_does_not_block_later_quotas() {
		let build = LimitStack::assemble(
			limit(1, "2s"),
			[limit(5_000, "1h"), limit(20_000, "1day"), limit(40_000, "1month")],
		);

		assert_eq!(build.stack.quotas(), &[limit(20_000, "1day"), limit(40_000, "1month")]);
		assert_eq!(build.rejected.len(), 1);
	}

	#[test]
	fn derives_uniform_rate_from_finest_quota() {
		let build = LimitStack::builder()
			.quotas([limit(10_000, "1day"), limit(20, "1min")])
			.build()
			.expect("Quota-only stack should build.");

		assert!(build.is_clean());
		assert_eq!(build.stack.rate().count(), 1);
		assert_eq!(build.stack.rate().period_millis(), 3_000.);
		assert_eq!(build.stack.quotas(), &[limit(20, "1min"), limit(10_000, "1day")]);
		assert_eq!(LimitStack::from_quotas([]), Err(LimitStackError::NoLimits));
	}
}
