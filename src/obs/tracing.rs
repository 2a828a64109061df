// self
use crate::{_prelude::*, obs::AnalysisStage, stack::RejectedQuota};

/// Span opened by every analysis entry point.
///
/// Carries the stage, the depth of the stack under analysis, and, once known, the number of
/// instants evaluated.
#[derive(Clone, Debug)]
pub struct AnalysisSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl AnalysisSpan {
	/// Creates a span for `stage` over a stack of `limits` levels.
	pub fn new(stage: AnalysisStage, limits: usize) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::debug_span!(
				"quota_planner.analysis",
				analysis = stage.kind().as_str(),
				stage = stage.as_str(),
				limits,
				samples = tracing::field::Empty,
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (stage, limits);

			Self {}
		}
	}

	/// Enters the span for the rest of the enclosing scope.
	pub fn entered(self) -> AnalysisSpanGuard {
		#[cfg(feature = "tracing")]
		{
			AnalysisSpanGuard { guard: self.span.entered() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = self;

			AnalysisSpanGuard {}
		}
	}
}

/// RAII guard returned by [`AnalysisSpan::entered`].
pub struct AnalysisSpanGuard {
	#[cfg(feature = "tracing")]
	guard: tracing::span::EnteredSpan,
}
impl AnalysisSpanGuard {
	/// Records how many instants the analysis evaluated.
	pub fn record_samples(&self, samples: usize) {
		#[cfg(feature = "tracing")]
		{
			self.guard.record("samples", samples);
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = samples;
		}
	}
}
impl Debug for AnalysisSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("AnalysisSpanGuard(..)")
	}
}

/// Emits a warning for a quota dropped during stack construction (when enabled).
pub fn record_quota_rejected(rejection: &RejectedQuota) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(
			count = rejection.quota.count(),
			period = %rejection.quota.period(),
			reason = rejection.reason.as_str(),
			"Dropped quota {}: {}.",
			rejection.quota,
			rejection.reason
		);
	}

	#[cfg(not(feature = "tracing"))]
	{
		let _ = rejection;
	}
}
