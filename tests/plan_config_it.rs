// self
use quota_planner::{ConfigError, DemandConfig, Error, FitScenarioConfig, PlanConfig, TimeUnit};

const PRO_PLAN: &str = r#"{
	"name": "pro",
	"unit": "s",
	"rate": { "max": 10, "period": 1 },
	"quotas": [
		{ "max": 5, "period": "1h" },
		{ "max": 40000, "period": { "value": 1, "unit": "month" } }
	]
}"#;

#[test]
fn plan_loads_and_reports_dropped_quotas() -> color_eyre::Result<()> {
	let plan = PlanConfig::from_json_str(PRO_PLAN)?;

	assert_eq!(plan.unit, Some(TimeUnit::Second));

	let build = plan.build()?;

	assert_eq!(build.stack.to_string(), "10/1s + 40000/1month");
	assert_eq!(build.rejected.len(), 1);
	assert_eq!(build.rejected[0].reason.as_str(), "not_above_rate");

	Ok(())
}

#[test]
fn demand_config_flattens_the_plan() -> color_eyre::Result<()> {
	let demand = DemandConfig::from_json_str(
		r#"{
			"name": "nightly sync",
			"rate": { "count": 5, "period": "1s" },
			"quotas": [{ "count": 1000, "period": "1day" }],
			"consumers": 2
		}"#,
	)?;
	let profile = demand.build()?;

	assert_eq!(demand.plan.name.as_deref(), Some("nightly sync"));
	assert_eq!(profile.consumers(), 2);
	assert_eq!(profile.to_string(), "10/1s + 2000/1day (2 consumers)");

	Ok(())
}

#[test]
fn scenario_runs_end_to_end() -> color_eyre::Result<()> {
	let scenario = FitScenarioConfig::from_json_str(&format!(
		r#"{{
			"policy": {PRO_PLAN},
			"demand": {{
				"rate": {{ "max": 5, "period": "1s" }},
				"quotas": [{{ "max": 1000, "period": "1day" }}]
			}},
			"fit": {{ "parallel": false }}
		}}"#
	))?;

	assert!(!scenario.fit.parallel);
	assert!(scenario.run()?.can_be_served());

	Ok(())
}

#[test]
fn unitless_period_without_default_unit_is_rejected() -> color_eyre::Result<()> {
	let plan = PlanConfig::from_json_str(r#"{ "rate": { "max": 1, "period": 2 } }"#)?;

	assert!(matches!(plan.build(), Err(Error::Config(ConfigError::MissingUnit { .. }))));

	Ok(())
}

#[test]
fn unknown_unit_names_the_failing_field() {
	let err = PlanConfig::from_json_str(r#"{ "unit": "fortnight" }"#)
		.expect_err("Unknown unit should fail to parse.");

	assert!(err.to_string().contains("`unit`"), "Unexpected message: {err}.");
}
