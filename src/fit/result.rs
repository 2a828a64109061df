//! Verdicts produced by fit analysis.

// self
use crate::{
	_prelude::*,
	duration::Duration,
	fit::schedule::{AnchoredRequest, Schedule},
	limit::Limit,
	obs::AnalysisOutcome,
};

/// Why a demand profile cannot be served by a policy.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FitFailure {
	/// The demand's sustained rate is higher than the policy's.
	RateExceeded {
		/// Demand rate.
		demand: Limit,
		/// Policy rate.
		policy: Limit,
	},
	/// A demand quota asks for more than a policy quota allows over the longer of the two periods.
	QuotaExceeded {
		/// Offending demand quota.
		demand: Limit,
		/// Policy quota it was compared against.
		policy: Limit,
		/// Period both counts were projected onto.
		over: Duration,
		/// Demand count projected onto `over`.
		demanded: f64,
		/// Policy count projected onto `over`.
		allowed: f64,
	},
	/// The peak backlog takes longer to drain than the policy's coarsest window.
	BacklogUnrecoverable {
		/// Largest observed excess of demand over capacity.
		max_backlog: u64,
		/// Time to clear it at the policy rate.
		drain_time: Duration,
		/// Coarsest policy period the drain had to fit in.
		window: Duration,
	},
}
impl FitFailure {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(&self) -> &'static str {
		match self {
			FitFailure::RateExceeded { .. } => "rate_exceeded",
			FitFailure::QuotaExceeded { .. } => "quota_exceeded",
			FitFailure::BacklogUnrecoverable { .. } => "backlog_unrecoverable",
		}
	}

	pub(crate) const fn outcome(&self) -> AnalysisOutcome {
		match self {
			FitFailure::RateExceeded { .. } => AnalysisOutcome::RateExceeded,
			FitFailure::QuotaExceeded { .. } => AnalysisOutcome::QuotaExceeded,
			FitFailure::BacklogUnrecoverable { .. } => AnalysisOutcome::BacklogUnrecoverable,
		}
	}
}
impl Display for FitFailure {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			FitFailure::RateExceeded { demand, policy } =>
				write!(f, "demand rate {demand} is faster than policy rate {policy}"),
			FitFailure::QuotaExceeded { demand, policy, over, demanded, allowed } => write!(
				f,
				"demand quota {demand} needs {demanded} requests per {over} but policy quota {policy} allows {allowed}"
			),
			FitFailure::BacklogUnrecoverable { max_backlog, drain_time, window } => write!(
				f,
				"a backlog of {max_backlog} requests takes {} to drain, longer than the {} window",
				drain_time.humanize(),
				window.humanize()
			),
		}
	}
}

/// Details of a demand profile the policy can serve.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct FitReport {
	/// Largest excess of demand over capacity across the sampled horizon.
	pub max_backlog: u64,
	/// Time to clear `max_backlog` at the policy rate.
	pub drain_time: Duration,
	/// First sampled instant at which `max_backlog` was observed.
	pub peak_at: Duration,
	/// Distance between consecutive samples.
	pub sampling_step: Duration,
	/// Sampled span.
	pub horizon: Duration,
	/// One entry per queued request, spaced at the policy rate.
	pub schedule: Schedule,
}
impl FitReport {
	/// Returns `true` when demand ever outpaced capacity.
	pub fn has_backlog(&self) -> bool {
		self.max_backlog > 0
	}

	/// Places the drain schedule on the wall clock, with `start` marking `t = 0`.
	///
	/// Draining begins at [`Self::peak_at`].
	pub fn anchored_schedule(
		&self,
		start: OffsetDateTime,
	) -> impl Iterator<Item = AnchoredRequest> + use<> {
		let schedule = self.schedule;
		let drain_start = start.checked_add(self.peak_at.into());

		drain_start.into_iter().flat_map(move |at| schedule.anchored_at(at))
	}
}

/// Outcome of comparing a demand profile against a policy.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "verdict", content = "details", rename_all = "snake_case")]
pub enum FitResult {
	/// The policy serves the demand, possibly after queueing.
	Fits(FitReport),
	/// The policy cannot serve the demand.
	DoesNotFit(FitFailure),
}
impl FitResult {
	/// Returns `true` when the demand can be served.
	pub fn can_be_served(&self) -> bool {
		matches!(self, FitResult::Fits(_))
	}

	/// The success report, if any.
	pub fn report(&self) -> Option<&FitReport> {
		match self {
			FitResult::Fits(report) => Some(report),
			FitResult::DoesNotFit(_) => None,
		}
	}

	/// The failure reason, if any.
	pub fn failure(&self) -> Option<&FitFailure> {
		match self {
			FitResult::Fits(_) => None,
			FitResult::DoesNotFit(failure) => Some(failure),
		}
	}
}
