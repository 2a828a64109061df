//! Planner-level error types shared by durations, limits, stacks, and plan loading.

// self
use crate::{
	_prelude::*,
	duration::DurationError,
	limit::LimitError,
	stack::LimitStackError,
};

/// Planner-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Canonical planner error exposed by fallible entry points.
///
/// Every variant is an invalid argument: the engine never fails on well-formed input, and
/// unreachable quotas or demand that does not fit are reported as data instead.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Malformed or negative duration.
	#[error(transparent)]
	Duration(#[from] DurationError),
	/// Invalid limit count or period.
	#[error(transparent)]
	Limit(#[from] LimitError),
	/// Invalid stack construction or query.
	#[error(transparent)]
	Stack(#[from] LimitStackError),
	/// Plan definition could not be loaded.
	#[error(transparent)]
	Config(#[from] ConfigError),
}

/// Plan-definition failures raised while loading configuration.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// The plan document is not valid JSON or does not match the expected shape.
	#[error("Plan definition is malformed at `{}`.", source.path())]
	Parse {
		/// Structured parsing failure, including the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// A bare numeric period was given without any unit to interpret it in.
	#[error("Period {value} has no unit and the plan declares no default unit.")]
	MissingUnit {
		/// The unitless magnitude.
		value: f64,
	},
}
impl From<serde_path_to_error::Error<serde_json::Error>> for ConfigError {
	fn from(source: serde_path_to_error::Error<serde_json::Error>) -> Self {
		Self::Parse { source }
	}
}
