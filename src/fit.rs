//! Demand-versus-policy admission analysis.
//!
//! [`FitAnalyzer::analyze`] runs four checks in order and stops at the first failure:
//!
//! 1. The demand rate must not be faster than the policy rate.
//! 2. Every demand quota must fit every policy quota once both are projected onto the longer of
//!    their two periods.
//! 3. Both capacity curves are sampled across the shared horizon; the largest excess of demand over
//!    the policy is the backlog.
//! 4. The backlog must drain at the policy rate within the policy's coarsest window.
//!
//! A drained backlog assumes a single burst: demand arriving while the queue drains is not
//! composed into a second backlog.

pub mod result;
pub mod schedule;

pub use result::*;
pub use schedule::*;

// self
use crate::{
	_prelude::*,
	demand::DemandProfile,
	duration::Duration,
	limit::Limit,
	obs::{self, AnalysisKind, AnalysisOutcome, AnalysisSpan, AnalysisSpanGuard, AnalysisStage},
	stack::{self, LimitStack},
};

// Relative slack for comparisons between linearly projected counts.
const PROJECTION_TOLERANCE: f64 = 1e-9;

/// Tuning knobs for [`FitAnalyzer`].
///
/// Every multiple of the policy rate period across the horizon is sampled; only the execution
/// strategy is configurable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitConfig {
	/// Evaluate samples on the rayon pool when the `parallel` feature is enabled.
	pub parallel: bool,
}
impl Default for FitConfig {
	fn default() -> Self {
		Self { parallel: true }
	}
}

/// Compares demand profiles against a policy stack.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FitAnalyzer {
	config: FitConfig,
}
impl FitAnalyzer {
	/// Creates an analyzer with the given configuration.
	pub fn with_config(config: FitConfig) -> Self {
		Self { config }
	}

	/// Active configuration.
	pub fn config(&self) -> &FitConfig {
		&self.config
	}

	/// Decides whether `policy` can serve `demand` and, if so, how the backlog drains.
	pub fn analyze(&self, policy: &LimitStack, demand: &DemandProfile) -> FitResult {
		const KIND: AnalysisKind = AnalysisKind::FitAnalysis;

		let span = AnalysisSpan::new(AnalysisStage::Analyze, policy.limits().len()).entered();

		obs::record_analysis_outcome(KIND, AnalysisOutcome::Attempt);

		let result = match self.check(policy, demand, &span) {
			Ok(report) => FitResult::Fits(report),
			Err(failure) => FitResult::DoesNotFit(failure),
		};
		let outcome = result.failure().map_or(AnalysisOutcome::Fits, FitFailure::outcome);

		obs::record_analysis_outcome(KIND, outcome);

		result
	}

	fn check(
		&self,
		policy: &LimitStack,
		demand: &DemandProfile,
		span: &AnalysisSpanGuard,
	) -> Result<FitReport, FitFailure> {
		check_rate(policy.rate(), demand.rate())?;
		check_quotas(policy.quotas(), demand.quotas())?;

		let backlog = self.sample_backlog(policy, demand);

		span.record_samples(backlog.samples);
		obs::record_samples(AnalysisKind::FitAnalysis, backlog.samples);

		let rate = policy.rate();
		let unit = rate.period().unit();

		if backlog.max == 0 {
			return Ok(FitReport {
				max_backlog: 0,
				drain_time: Duration::zero().convert_to(unit),
				peak_at: Duration::zero().convert_to(backlog.horizon.unit()),
				sampling_step: backlog.step,
				horizon: backlog.horizon,
				schedule: Schedule::empty(),
			});
		}

		let drain_millis = backlog.max as f64 * rate.period_millis() / rate.count() as f64;
		let drain_time = Duration::from_base_unchecked(drain_millis, unit);
		let window = policy.coarsest_period();

		if drain_time > window {
			return Err(FitFailure::BacklogUnrecoverable {
				max_backlog: backlog.max,
				drain_time,
				window,
			});
		}

		Ok(FitReport {
			max_backlog: backlog.max,
			drain_time,
			peak_at: backlog.peak_at,
			sampling_step: backlog.step,
			horizon: backlog.horizon,
			schedule: Schedule::new(backlog.max, rate.spacing_millis(), unit),
		})
	}

	fn sample_backlog(&self, policy: &LimitStack, demand: &DemandProfile) -> Backlog {
		let horizon = if demand.coarsest_period() > policy.coarsest_period() {
			demand.coarsest_period()
		} else {
			policy.coarsest_period()
		};
		let horizon_millis = horizon.to_base_unit();
		let step_millis = policy.rate().period_millis();
		let (peak_at, peak) =
			stack::peak_sample(horizon_millis, step_millis, self.config.parallel, |t| {
				demand.capacity_at_base(t) as i128 - policy.capacity_at_base(t) as i128
			});
		let (max, peak_at) = if peak > 0 {
			(u64::try_from(peak).unwrap_or(u64::MAX), peak_at)
		} else {
			(0, 0.)
		};

		Backlog {
			max,
			peak_at: Duration::from_base_unchecked(peak_at, horizon.unit()),
			step: policy.rate().period(),
			horizon,
			samples: stack::grid_len(horizon_millis, step_millis),
		}
	}
}

/// Runs [`FitAnalyzer::analyze`] with the default configuration.
pub fn fit_analysis(policy: &LimitStack, demand: &DemandProfile) -> FitResult {
	FitAnalyzer::default().analyze(policy, demand)
}

struct Backlog {
	max: u64,
	peak_at: Duration,
	step: Duration,
	horizon: Duration,
	samples: usize,
}

fn check_rate(policy: Limit, demand: Limit) -> Result<(), FitFailure> {
	// Compares count/period ratios by cross-multiplying.
	let demanded = demand.count() as f64 * policy.period_millis();
	let allowed = policy.count() as f64 * demand.period_millis();

	if demanded > allowed * (1. + PROJECTION_TOLERANCE) {
		return Err(FitFailure::RateExceeded { demand, policy });
	}

	Ok(())
}

fn check_quotas(policy: &[Limit], demand: &[Limit]) -> Result<(), FitFailure> {
	for &p in policy {
		for &d in demand {
			let over = if d.period() > p.period() { d.period() } else { p.period() };
			let demanded = d.rescaled_to(over);
			let allowed = p.rescaled_to(over);

			if demanded > allowed * (1. + PROJECTION_TOLERANCE) {
				return Err(FitFailure::QuotaExceeded { demand: d, policy: p, over, demanded, allowed });
			}
		}
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn limit(count: u64, period: &str) -> Limit {
		Limit::per(count, period).expect("Limit fixture should be valid.")
	}

	fn stack(rate: Limit, quotas: &[Limit]) -> LimitStack {
		LimitStack::assemble(rate, quotas.iter().copied()).into_stack()
	}

	#[test]
	fn rate_check_compares_throughput() {
		assert!(check_rate(limit(10, "1s"), limit(600, "1min")).is_ok());
		assert!(check_rate(limit(10, "1s"), limit(601, "1min")).is_err());
		assert!(check_rate(limit(1, "2s"), limit(1, "1s")).is_err());
	}

	#[test]
	fn quota_check_projects_onto_longer_period() {
		let policy = [limit(1_000, "1h")];

		assert!(check_quotas(&policy, &[limit(24_000, "1day")]).is_ok());

		let failure = check_quotas(&policy, &[limit(24_001, "1day")])
			.expect_err("Over-budget daily quota should be rejected.");

		assert!(matches!(
			failure,
			FitFailure::QuotaExceeded { allowed, demanded, .. }
				if allowed == 24_000. && demanded == 24_001.
		));
	}

	#[test]
	fn burst_backlog_drains_within_window() {
		// The policy admits 2 per 10s with at most 10 per minute; demand bursts 10 at once.
		let policy = stack(limit(2, "10s"), &[limit(10, "1min")]);
		let demand = DemandProfile::new(stack(limit(10, "1min"), &[]));
		let result = FitAnalyzer::with_config(FitConfig { parallel: false })
			.analyze(&policy, &demand);
		let report = result.report().expect("Burst should be servable after queueing.");

		assert_eq!(report.max_backlog, 8);
		assert_eq!(report.peak_at, Duration::zero());
		assert_eq!(report.drain_time.to_base_unit(), 40_000.);
		assert_eq!(report.schedule.len(), 8);
		assert_eq!(report.schedule.spacing().to_base_unit(), 5_000.);
		assert!(report.has_backlog());
	}

	#[test]
	fn long_drain_is_unrecoverable() {
		let policy = stack(limit(1, "10s"), &[]);
		let demand = DemandProfile::new(stack(limit(6, "1min"), &[]));
		let result = fit_analysis(&policy, &demand);

		assert!(!result.can_be_served());
		assert_eq!(result.failure().map(FitFailure::as_str), Some("backlog_unrecoverable"));
	}
}
