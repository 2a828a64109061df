//! Optional observability helpers for capacity analysis.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `quota_planner.analysis` with the `analysis`
//!   (kind), `stage` (operation), `limits` (stack depth) and `samples` fields, plus a warning event
//!   for every dropped quota.
//! - Enable `metrics` to increment the `quota_planner_analysis_total` counter for every
//!   attempt and outcome, labeled by `analysis` + `outcome`, and to record the number of evaluated
//!   instants in the `quota_planner_samples` histogram.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Analysis kinds observed by the planner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnalysisKind {
	/// Quota admission while building a stack.
	StackValidation,
	/// Capacity curve sampling.
	CapacityCurve,
	/// Demand-versus-policy fit analysis.
	FitAnalysis,
}
impl AnalysisKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			AnalysisKind::StackValidation => "stack_validation",
			AnalysisKind::CapacityCurve => "capacity_curve",
			AnalysisKind::FitAnalysis => "fit_analysis",
		}
	}
}
impl Display for AnalysisKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Operations that open an analysis span.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnalysisStage {
	/// Validating candidate quotas into a stack.
	Assemble,
	/// Accumulated capacity curve.
	CapacityCurve,
	/// Per-window capacity curve.
	InstantaneousCurve,
	/// Demand-versus-policy comparison.
	Analyze,
}
impl AnalysisStage {
	/// Returns a stable label suitable for span fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			AnalysisStage::Assemble => "assemble",
			AnalysisStage::CapacityCurve => "capacity_curve",
			AnalysisStage::InstantaneousCurve => "instantaneous_curve",
			AnalysisStage::Analyze => "analyze",
		}
	}

	/// Kind of analysis the stage belongs to.
	pub const fn kind(self) -> AnalysisKind {
		match self {
			AnalysisStage::Assemble => AnalysisKind::StackValidation,
			AnalysisStage::CapacityCurve | AnalysisStage::InstantaneousCurve =>
				AnalysisKind::CapacityCurve,
			AnalysisStage::Analyze => AnalysisKind::FitAnalysis,
		}
	}
}
impl Display for AnalysisStage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each analysis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnalysisOutcome {
	/// Entry to an analysis helper.
	Attempt,
	/// The demand fits the policy.
	Fits,
	/// The demand rate is faster than the policy rate.
	RateExceeded,
	/// A demand quota exceeds a policy quota.
	QuotaExceeded,
	/// The backlog cannot drain within the policy window.
	BacklogUnrecoverable,
	/// A candidate quota was dropped during stack construction.
	QuotaRejected,
	/// A capacity curve was sampled.
	Sampled,
}
impl AnalysisOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			AnalysisOutcome::Attempt => "attempt",
			AnalysisOutcome::Fits => "fits",
			AnalysisOutcome::RateExceeded => "rate_exceeded",
			AnalysisOutcome::QuotaExceeded => "quota_exceeded",
			AnalysisOutcome::BacklogUnrecoverable => "backlog_unrecoverable",
			AnalysisOutcome::QuotaRejected => "quota_rejected",
			AnalysisOutcome::Sampled => "sampled",
		}
	}
}
impl Display for AnalysisOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
