// self
use crate::obs::{AnalysisKind, AnalysisOutcome};

/// Records an analysis outcome via the global metrics recorder (when enabled).
pub fn record_analysis_outcome(kind: AnalysisKind, outcome: AnalysisOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"quota_planner_analysis_total",
			"analysis" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records how many instants a sampling pass evaluated (when enabled).
pub fn record_samples(kind: AnalysisKind, samples: usize) {
	#[cfg(feature = "metrics")]
	{
		metrics::histogram!("quota_planner_samples", "analysis" => kind.as_str())
			.record(samples as f64);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, samples);
	}
}
