//! Sampling capacity curves over a horizon.
//!
//! Samples are independent, so with the `parallel` feature they are evaluated on the rayon pool.
//! Output order always matches input order.

// crates.io
#[cfg(feature = "parallel")] use rayon::prelude::*;
// self
use crate::{
	_prelude::*,
	duration::Duration,
	obs::{self, AnalysisKind, AnalysisOutcome, AnalysisSpan, AnalysisStage},
	stack::LimitStack,
};

/// One point of a sampled capacity curve.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CurvePoint {
	/// Elapsed time, in the horizon's unit.
	pub at: Duration,
	/// Capacity at `at`.
	pub capacity: u64,
}

impl LimitStack {
	/// Evaluates [`LimitStack::capacity_at`] at every instant, preserving order.
	pub fn sample_capacity(&self, instants: &[Duration]) -> Vec<u64> {
		let millis = instants.iter().map(|t| t.to_base_unit()).collect::<Vec<_>>();

		map_samples(&millis, true, |t| self.capacity_at_base(t))
	}

	/// Accumulated capacity at every multiple of the rate period across `[0, horizon]`.
	///
	/// The horizon itself is always the last point, even when it is not a multiple of the period.
	pub fn capacity_curve(&self, horizon: Duration) -> Vec<CurvePoint> {
		const KIND: AnalysisKind = AnalysisKind::CapacityCurve;

		let span = AnalysisSpan::new(AnalysisStage::CapacityCurve, self.limits().len()).entered();
		let grid = sample_grid(horizon.to_base_unit(), self.rate().period_millis());
		let capacities = map_samples(&grid, true, |t| self.capacity_at_base(t));

		span.record_samples(grid.len());
		obs::record_samples(KIND, grid.len());
		obs::record_analysis_outcome(KIND, AnalysisOutcome::Sampled);

		to_points(&grid, capacities, horizon)
	}

	/// Capacity within the current coarsest window: each sample uses `t mod coarsest period`.
	///
	/// Past the first window this shows how much of the running window is usable, rather than the
	/// total accumulated since `t = 0`.
	pub fn instantaneous_curve(&self, horizon: Duration) -> Vec<CurvePoint> {
		const KIND: AnalysisKind = AnalysisKind::CapacityCurve;

		let span =
			AnalysisSpan::new(AnalysisStage::InstantaneousCurve, self.limits().len()).entered();
		let window = self.coarsest_period().to_base_unit();
		let grid = sample_grid(horizon.to_base_unit(), self.rate().period_millis());
		let capacities = map_samples(&grid, true, |t| self.capacity_at_base(t % window));

		span.record_samples(grid.len());
		obs::record_samples(KIND, grid.len());
		obs::record_analysis_outcome(KIND, AnalysisOutcome::Sampled);

		to_points(&grid, capacities, horizon)
	}
}

/// Millisecond offsets `0, step, 2 * step, ...` up to `horizon`, with `horizon` appended last.
pub(crate) fn sample_grid(horizon: f64, step: f64) -> Vec<f64> {
	let steps = (horizon / step).floor() as u64;
	let mut grid = (0..=steps).map(|k| k as f64 * step).collect::<Vec<_>>();

	if grid.last().is_some_and(|last| *last < horizon) {
		grid.push(horizon);
	}

	grid
}

/// Number of instants in [`sample_grid`].
pub(crate) fn grid_len(horizon: f64, step: f64) -> usize {
	let steps = (horizon / step).floor();

	steps as usize + 1 + usize::from(steps * step < horizon)
}

/// Maps `f` over `grid`, on the rayon pool when allowed and compiled in.
pub(crate) fn map_samples<T, F>(grid: &[f64], parallel: bool, f: F) -> Vec<T>
where
	T: Send,
	F: Fn(f64) -> T + Send + Sync,
{
	#[cfg(feature = "parallel")]
	{
		if parallel {
			return grid.par_iter().map(|&t| f(t)).collect();
		}
	}
	#[cfg(not(feature = "parallel"))]
	let _ = parallel;

	grid.iter().map(|&t| f(t)).collect()
}

/// Largest `f(t)` over the instants of [`sample_grid`], streamed instead of collected.
///
/// Returns `(t, f(t))`; ties keep the earliest instant.
pub(crate) fn peak_sample<F>(horizon: f64, step: f64, parallel: bool, f: F) -> (f64, i128)
where
	F: Fn(f64) -> i128 + Send + Sync,
{
	let steps = (horizon / step).floor() as u64;
	let sample = |k: u64| {
		let t = k as f64 * step;

		(t, f(t))
	};
	#[cfg(feature = "parallel")]
	let grid_peak = if parallel {
		(0..=steps).into_par_iter().map(sample).reduce_with(earliest_max)
	} else {
		(0..=steps).map(sample).reduce(earliest_max)
	};
	#[cfg(not(feature = "parallel"))]
	let grid_peak = {
		let _ = parallel;

		(0..=steps).map(sample).reduce(earliest_max)
	};
	let tail = (steps as f64 * step < horizon).then(|| (horizon, f(horizon)));

	grid_peak.into_iter().chain(tail).reduce(earliest_max).unwrap_or_else(|| (0., f(0.)))
}

fn earliest_max(best: (f64, i128), next: (f64, i128)) -> (f64, i128) {
	if next.1 > best.1 || (next.1 == best.1 && next.0 < best.0) { next } else { best }
}

fn to_points(grid: &[f64], capacities: Vec<u64>, horizon: Duration) -> Vec<CurvePoint> {
	grid.iter()
		.zip(capacities)
		.map(|(&t, capacity)| CurvePoint {
			at: Duration::from_base_unchecked(t, horizon.unit()),
			capacity,
		})
		.collect()
}
