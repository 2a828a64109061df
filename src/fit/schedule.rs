//! Lazily evaluated drain schedules.
//!
//! A backlog of millions of requests is common for month-long horizons, so the schedule stores
//! only its length and spacing and yields offsets on demand.

// self
use crate::{
	_prelude::*,
	duration::{Duration, TimeUnit},
};

/// A queued request and its offset from the start of the drain.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ScheduledRequest {
	/// Zero-based position in the queue.
	pub id: u64,
	/// Offset from the drain start.
	pub offset: Duration,
}

/// A queued request placed on the wall clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct AnchoredRequest {
	/// Zero-based position in the queue.
	pub id: u64,
	/// Absolute time the request may be issued.
	pub at: OffsetDateTime,
}

/// Evenly spaced offsets for draining a backlog at the policy's rate.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Schedule {
	len: u64,
	spacing_millis: f64,
	unit: TimeUnit,
}
impl Schedule {
	/// A schedule with no requests.
	pub const fn empty() -> Self {
		Self { len: 0, spacing_millis: 0., unit: TimeUnit::Millisecond }
	}

	pub(crate) fn new(len: u64, spacing_millis: f64, unit: TimeUnit) -> Self {
		Self { len, spacing_millis, unit }
	}

	/// Number of scheduled requests.
	pub fn len(&self) -> u64 {
		self.len
	}

	/// Returns `true` when nothing is queued.
	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	/// Gap between consecutive requests.
	pub fn spacing(&self) -> Duration {
		Duration::from_base_unchecked(self.spacing_millis, self.unit)
	}

	/// The `id`-th request, if it exists.
	pub fn get(&self, id: u64) -> Option<ScheduledRequest> {
		(id < self.len).then(|| ScheduledRequest {
			id,
			offset: Duration::from_base_unchecked(id as f64 * self.spacing_millis, self.unit),
		})
	}

	/// Iterates requests in queue order.
	pub fn iter(&self) -> ScheduleIter {
		ScheduleIter { schedule: *self, next: 0 }
	}

	/// Places every request on the wall clock relative to `start`.
	///
	/// Iteration stops early if an instant would leave the representable date range.
	pub fn anchored_at(
		&self,
		start: OffsetDateTime,
	) -> impl Iterator<Item = AnchoredRequest> + use<> {
		self.iter().map_while(move |request| {
			start
				.checked_add(request.offset.into())
				.map(|at| AnchoredRequest { id: request.id, at })
		})
	}
}
impl Default for Schedule {
	fn default() -> Self {
		Self::empty()
	}
}
impl IntoIterator for &Schedule {
	type IntoIter = ScheduleIter;
	type Item = ScheduledRequest;

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}

/// Iterator returned by [`Schedule::iter`].
#[derive(Clone, Debug)]
pub struct ScheduleIter {
	schedule: Schedule,
	next: u64,
}
impl Iterator for ScheduleIter {
	type Item = ScheduledRequest;

	fn next(&mut self) -> Option<Self::Item> {
		let request = self.schedule.get(self.next)?;

		self.next += 1;

		Some(request)
	}

	// Not `ExactSizeIterator`: a queue longer than `usize::MAX` has no exact `usize` length.
	fn size_hint(&self) -> (usize, Option<usize>) {
		let remaining = self.schedule.len.saturating_sub(self.next);

		match usize::try_from(remaining) {
			Ok(n) => (n, Some(n)),
			Err(_) => (usize::MAX, None),
		}
	}
}
