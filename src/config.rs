//! Explicit plan definitions for building stacks and demand profiles from JSON.
//!
//! Periods may be compact strings (`"1h"`), bare numbers interpreted in the plan's default
//! `unit`, or `{ "value": 1, "unit": "hour" }` objects. Limit counts accept either `max` or
//! `count`.
//!
//! ```json
//! {
//!   "name": "pro",
//!   "unit": "second",
//!   "rate": { "max": 10, "period": 1 },
//!   "quotas": [{ "max": 40000, "period": "1month" }]
//! }
//! ```

// self
use crate::{
	_prelude::*,
	demand::DemandProfile,
	duration::{Duration, TimeUnit},
	error::ConfigError,
	fit::{FitAnalyzer, FitConfig, FitResult},
	limit::Limit,
	stack::{LimitStack, StackBuild},
};

/// Period as written in a plan definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PeriodConfig {
	/// Compact string such as `"30min"`.
	Compact(String),
	/// Bare magnitude in the plan's default unit.
	Value(f64),
	/// Magnitude with an optional explicit unit.
	Parts {
		/// Magnitude.
		value: f64,
		/// Unit; falls back to the plan's default unit.
		#[serde(default)]
		unit: Option<TimeUnit>,
	},
}
impl PeriodConfig {
	/// Resolves the period, using `default_unit` for unitless values.
	pub fn resolve(&self, default_unit: Option<TimeUnit>) -> Result<Duration> {
		let (value, unit) = match self {
			PeriodConfig::Compact(s) => return Ok(s.parse()?),
			PeriodConfig::Value(value) => (*value, None),
			PeriodConfig::Parts { value, unit } => (*value, *unit),
		};
		let unit = unit.or(default_unit).ok_or(ConfigError::MissingUnit { value })?;

		Ok(Duration::new(value, unit)?)
	}
}

/// A single rate or quota entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LimitConfig {
	/// Maximum requests per period.
	#[serde(alias = "count")]
	pub max: u64,
	/// Period the maximum applies to.
	pub period: PeriodConfig,
}
impl LimitConfig {
	/// Resolves the entry into a validated [`Limit`].
	pub fn resolve(&self, default_unit: Option<TimeUnit>) -> Result<Limit> {
		Ok(Limit::new(self.max, self.period.resolve(default_unit)?)?)
	}
}

/// A named plan: an optional rate plus any number of quotas.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanConfig {
	/// Display name.
	#[serde(default)]
	pub name: Option<String>,
	/// Default unit for bare numeric periods.
	#[serde(default)]
	pub unit: Option<TimeUnit>,
	/// Explicit rate; derived from the finest quota when absent.
	#[serde(default)]
	pub rate: Option<LimitConfig>,
	/// Candidate quotas in any order.
	#[serde(default)]
	pub quotas: Vec<LimitConfig>,
}
impl PlanConfig {
	/// Parses a plan from JSON, reporting the path of the first offending field.
	pub fn from_json_str(s: &str) -> Result<Self> {
		from_json_str(s)
	}

	/// Validates the plan into a stack, reporting dropped quotas.
	pub fn build(&self) -> Result<StackBuild> {
		let quotas =
			self.quotas.iter().map(|quota| quota.resolve(self.unit)).collect::<Result<Vec<_>>>()?;
		let build = match &self.rate {
			Some(rate) => LimitStack::assemble(rate.resolve(self.unit)?, quotas),
			None => LimitStack::from_quotas(quotas)?,
		};

		Ok(build)
	}
}

/// A plan read as demand, optionally shared by several identical consumers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DemandConfig {
	/// Per-consumer consumption pattern.
	#[serde(flatten)]
	pub plan: PlanConfig,
	/// Number of consumers; each one follows `plan`.
	#[serde(default = "default_consumers")]
	pub consumers: u64,
}
impl DemandConfig {
	/// Parses a demand definition from JSON.
	pub fn from_json_str(s: &str) -> Result<Self> {
		from_json_str(s)
	}

	/// Builds the aggregate demand profile.
	pub fn build(&self) -> Result<DemandProfile> {
		let profile = DemandProfile::new(self.plan.build()?.into_stack());

		if self.consumers == 1 {
			return Ok(profile);
		}

		Ok(profile.scale_by(self.consumers)?)
	}
}
impl Default for DemandConfig {
	fn default() -> Self {
		Self { plan: PlanConfig::default(), consumers: default_consumers() }
	}
}

/// A policy, a demand, and analyzer settings in one document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FitScenarioConfig {
	/// The plan offered by the API.
	pub policy: PlanConfig,
	/// The consumption to check against it.
	pub demand: DemandConfig,
	/// Analyzer settings.
	#[serde(default)]
	pub fit: FitConfig,
}
impl FitScenarioConfig {
	/// Parses a scenario from JSON.
	pub fn from_json_str(s: &str) -> Result<Self> {
		from_json_str(s)
	}

	/// Builds both sides and runs the fit analysis.
	pub fn run(&self) -> Result<FitResult> {
		let policy = self.policy.build()?.into_stack();
		let demand = self.demand.build()?;

		Ok(FitAnalyzer::with_config(self.fit).analyze(&policy, &demand))
	}
}

fn default_consumers() -> u64 {
	1
}

fn from_json_str<T>(s: &str) -> Result<T>
where
	T: for<'de> Deserialize<'de>,
{
	let mut de = serde_json::Deserializer::from_str(s);

	Ok(serde_path_to_error::deserialize(&mut de).map_err(ConfigError::from)?)
}
