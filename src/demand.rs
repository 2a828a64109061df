//! Declared consumption patterns.
//!
//! A [`DemandProfile`] has the same shape as a policy stack but describes what a client wants to
//! consume. Scaling a profile models `n` identical consumers sharing one plan.

// std
use std::ops::Deref;
// self
use crate::{
	_prelude::*,
	stack::{LimitStack, LimitStackError},
};

/// A [`LimitStack`] read as desired consumption rather than an allowance.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DemandProfile {
	stack: LimitStack,
	consumers: u64,
}
impl DemandProfile {
	/// Wraps a stack describing one consumer.
	pub fn new(stack: LimitStack) -> Self {
		Self { stack, consumers: 1 }
	}

	/// The underlying stack.
	pub fn stack(&self) -> &LimitStack {
		&self.stack
	}

	/// Number of identical consumers this profile aggregates.
	pub fn consumers(&self) -> u64 {
		self.consumers
	}

	/// Multiplies every count by `n`, keeping periods.
	///
	/// Scaling is exact: `scale_by(n).capacity_at(t) == n * capacity_at(t)` for all `t`.
	pub fn scale_by(&self, n: u64) -> Result<Self, LimitStackError> {
		if n == 0 {
			return Err(LimitStackError::ZeroScale);
		}

		let limits = self
			.stack
			.limits()
			.iter()
			.map(|limit| limit.scaled(n))
			.collect::<Option<Vec<_>>>()
			.ok_or(LimitStackError::ScaleOverflow { factor: n })?;
		let consumers =
			self.consumers.checked_mul(n).ok_or(LimitStackError::ScaleOverflow { factor: n })?;

		Ok(Self { stack: LimitStack::from_validated(limits), consumers })
	}
}
impl Deref for DemandProfile {
	type Target = LimitStack;

	fn deref(&self) -> &Self::Target {
		&self.stack
	}
}
impl From<LimitStack> for DemandProfile {
	fn from(stack: LimitStack) -> Self {
		Self::new(stack)
	}
}
impl Display for DemandProfile {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		if self.consumers == 1 {
			Display::fmt(&self.stack, f)
		} else {
			write!(f, "{} ({} consumers)", self.stack, self.consumers)
		}
	}
}
