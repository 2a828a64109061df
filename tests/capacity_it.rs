// self
use quota_planner::{Duration, Limit, LimitStack, LimitStackError, RejectionReason, TimeUnit};

fn scenario_a() -> color_eyre::Result<LimitStack> {
	let build = LimitStack::assemble(Limit::per(1, "2s")?, [Limit::per(1_800, "1h")?]);

	assert!(build.is_clean(), "Scenario A quotas should all be admitted.");

	Ok(build.into_stack())
}

#[test]
fn scenario_a_capacity_and_inverse() -> color_eyre::Result<()> {
	let stack = scenario_a()?;

	assert_eq!(stack.capacity_at("0s".parse()?), 1);
	assert_eq!(stack.capacity_at("2s".parse()?), 2);

	let t = stack.min_time(1_800);

	assert_eq!(stack.capacity_at(t), 1_800);
	assert_eq!(t.unit(), TimeUnit::Second);
	assert_eq!(t, Duration::new(3_598., TimeUnit::Second)?);
	// One millisecond earlier the quota is not yet exhausted.
	assert!(stack.capacity_at_millis(t.to_base_unit() - 1.)? < 1_800);

	Ok(())
}

#[test]
fn scenario_a_reports_exhaustion_and_dead_time() -> color_eyre::Result<()> {
	let stack = scenario_a()?;
	let thresholds = stack.quota_exhaustion_thresholds();

	assert_eq!(thresholds.len(), 1);
	assert_eq!(thresholds[0].unit(), TimeUnit::Minute);
	assert_eq!(thresholds[0].humanize(), "59min 58s");
	assert_eq!(stack.max_unavailability().humanize(), "2s");

	Ok(())
}

#[test]
fn capacity_during_counts_requests_in_window() -> color_eyre::Result<()> {
	let stack = scenario_a()?;

	assert_eq!(stack.capacity_during("0s".parse()?, "1h".parse()?)?, 1_800);
	assert_eq!(stack.capacity_during("1h".parse()?, "2h".parse()?)?, 1_800);
	assert!(matches!(
		stack.capacity_during("2h".parse()?, "1h".parse()?),
		Err(LimitStackError::EmptyInterval { .. })
	));

	Ok(())
}

#[test]
fn inconsistent_plan_still_yields_usable_stack() -> color_eyre::Result<()> {
	let build = LimitStack::builder()
		.rate(Limit::per(10, "1s")?)
		.quota(Limit::per(5, "1min")?)
		.quota(Limit::per(100, "1min")?)
		.quota(Limit::per(200_000, "1day")?)
		.quota(Limit::per(50_000, "1month")?)
		.build()?;
	let reasons = build.rejected.iter().map(|r| r.reason.as_str()).collect::<Vec<_>>();

	assert_eq!(build.stack.quotas(), &[Limit::per(100, "1min")?, Limit::per(50_000, "1month")?]);
	assert_eq!(reasons, vec!["not_above_rate", "unreachable"]);
	assert!(matches!(build.rejected[1].reason, RejectionReason::Unreachable { .. }));

	Ok(())
}

#[test]
fn curves_track_the_capacity_function() -> color_eyre::Result<()> {
	let stack = scenario_a()?;
	let horizon = "2h".parse::<Duration>()?;
	let curve = stack.capacity_curve(horizon);

	assert_eq!(curve.len(), 3_601);
	assert!(curve.windows(2).all(|w| w[0].capacity <= w[1].capacity));
	assert_eq!(curve.last().map(|p| p.capacity), Some(stack.capacity_at(horizon)));

	let instantaneous = stack.instantaneous_curve(horizon);

	// The hour window resets at index 1800 (t = 1h).
	assert_eq!(instantaneous[1_799].capacity, 1_800);
	assert_eq!(instantaneous[1_800].capacity, 1);
	assert_eq!(instantaneous[1_801].capacity, 2);

	Ok(())
}
