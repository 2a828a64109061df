//! Analytic capacity engine for tiered API rate limits: nested rate + quota curves, minimum-time
//! inverses, and demand-versus-plan fit analysis with backlog scheduling.
//!
//! ```
//! use quota_planner::{DemandProfile, Limit, LimitStack, fit_analysis};
//!
//! let policy =
//! 	LimitStack::assemble(Limit::per(10, "1s")?, [Limit::per(40_000, "1month")?]).into_stack();
//! let demand = DemandProfile::new(
//! 	LimitStack::assemble(Limit::per(5, "1s")?, [Limit::per(1_000, "1day")?]).into_stack(),
//! );
//!
//! assert_eq!(policy.capacity_at("0s".parse()?), 10);
//! assert!(fit_analysis(&policy, &demand).can_be_served());
//! # Ok::<(), quota_planner::Error>(())
//! ```

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod config;
pub mod demand;
pub mod duration;
pub mod error;
pub mod fit;
pub mod limit;
pub mod obs;
pub mod stack;

pub use config::{DemandConfig, FitScenarioConfig, LimitConfig, PeriodConfig, PlanConfig};
pub use demand::DemandProfile;
pub use duration::{Duration, DurationError, TimeUnit};
pub use error::{ConfigError, Error, Result};
pub use fit::{
	FitAnalyzer, FitConfig, FitFailure, FitReport, FitResult, Schedule, ScheduledRequest,
	fit_analysis,
};
pub use limit::{Limit, LimitError};
pub use stack::{
	CurvePoint, LimitStack, LimitStackBuilder, LimitStackError, RejectedQuota, RejectionReason,
	StackBuild,
};

mod _prelude {
	pub use std::{
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		str::FromStr,
		sync::OnceLock,
	};

	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;

	pub use crate::error::{Error, Result};
}

#[cfg(test)] use {color_eyre as _, proptest as _};
