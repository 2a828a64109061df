//! Quota exhaustion and unavailability metrics.
//!
//! When requests are issued as fast as the stack allows, each quota is exhausted some time before
//! its window ends and the caller then sits idle until the window resets. These helpers expose
//! those instants for reporting layers.

// self
use crate::{duration::Duration, stack::LimitStack};

impl LimitStack {
	/// Earliest time each quota's count is fully consumed, in the best display unit.
	///
	/// Equivalent to `min_time(quota.count)` per quota; the rate is excluded.
	pub fn quota_exhaustion_thresholds(&self) -> &[Duration] {
		self.exhaustion_cache.get_or_init(|| {
			self.quotas().iter().map(|quota| self.min_time(quota.count()).best_unit()).collect()
		})
	}

	/// Idle time between exhausting each quota and the reset of its window.
	pub fn quota_recovery_intervals(&self) -> Vec<Duration> {
		self.quotas()
			.iter()
			.zip(self.quota_exhaustion_thresholds())
			.map(|(quota, threshold)| quota.period().saturating_sub(*threshold))
			.collect()
	}

	/// Recovery interval of the coarsest quota; zero without quotas.
	pub fn max_unavailability(&self) -> Duration {
		self.quota_recovery_intervals().pop().unwrap_or_default()
	}

	/// [`Self::max_unavailability`] as a fraction of the coarsest quota period.
	pub fn max_unavailability_ratio(&self) -> f64 {
		if self.quotas().is_empty() {
			return 0.;
		}

		self.max_unavailability().to_base_unit() / self.coarsest_period().to_base_unit()
	}
}
