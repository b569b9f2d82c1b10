use crate::harness::workspace::{run_actions_route, run_details_route};
use crate::harness::{Assertion, RunActionsFixture, Scenario};
use std::time::Duration;
use wfprobe_core::{ActionStatus, TriggerStatus, WorkflowRunStatus};

fn secs(n: u64) -> Duration {
    Duration::from_secs(n)
}

#[test]
fn test_trigger_wait_and_assert() {
    Scenario::new("trigger_wait_and_assert")
        .with_trigger("manual", "run-1")
        .with_run_statuses("run-1", &["Running", "Running", "Running", "Succeeded"])
        .with_run_actions(
            "run-1",
            RunActionsFixture::new("run-1", "Succeeded")
                .action("Parse_order", "Succeeded")
                .action("Send_email", "Succeeded")
                .action("Notify_sales", "Skipped"),
        )
        .trigger_post("manual", r#"{"orderId": 42}"#)
        .assert(Assertion::CurrentRun("run-1".into()))
        .wait_for_run()
        .assert_sleeps(&[secs(2), secs(4), secs(6)])
        .load_history()
        .assert_run_status(WorkflowRunStatus::Succeeded)
        .assert_trigger(TriggerStatus::Succeeded)
        .assert_action("Parse order", ActionStatus::Succeeded)
        .assert_action("Send email", ActionStatus::Succeeded)
        .assert_action("Notify sales", ActionStatus::Skipped)
        .assert_action("Archive order", ActionStatus::ActionDoesntExistInRunHistory)
        // Four polls plus the history load.
        .assert_hits(&run_details_route("run-1"), 5)
        .assert_hits(&run_actions_route("run-1"), 1)
        .assert(Assertion::ManagementCallsAuthorized)
        .run()
        .expect("scenario should pass");
}

#[test]
fn test_trigger_with_get() {
    Scenario::new("trigger_with_get")
        .with_trigger("manual", "run-get")
        .with_run_statuses("run-get", &["Failed"])
        .with_run_actions(
            "run-get",
            RunActionsFixture::new("run-get", "Failed").action("Call_api", "Failed"),
        )
        .trigger_get("manual")
        .wait_for_run()
        .assert(Assertion::SleepCount(0))
        .load_history()
        .assert_run_status(WorkflowRunStatus::Failed)
        .assert_action("Call api", ActionStatus::Failed)
        .check(|manager| {
            anyhow::ensure!(!manager.was_run_successful("")?, "run should not be successful");
            let response = manager
                .last_response()
                .ok_or_else(|| anyhow::anyhow!("no trigger response"))?;
            anyhow::ensure!(response.status == 202, "status {}", response.status);
            anyhow::ensure!(
                response.client_tracking_id.as_deref() == Some("tracking-run-get"),
                "tracking id {:?}",
                response.client_tracking_id
            );
            anyhow::ensure!(response.correlation_id.as_deref() == Some("corr-1"));
            Ok(())
        })
        .run()
        .unwrap();
}

#[test]
fn test_trigger_body_reaches_callback() {
    Scenario::new("trigger_body_reaches_callback")
        .with_trigger("manual", "run-body")
        .with_run_statuses("run-body", &["Succeeded"])
        .trigger_post("manual", r#"{"orderId": 7}"#)
        .wait_for_run()
        .assert_run_status(WorkflowRunStatus::Succeeded)
        .assert(Assertion::RequestBodyContains {
            url_prefix: "/invoke/manual".into(),
            text: r#""orderId": 7"#.into(),
        })
        .assert(Assertion::ManagementCallsAuthorized)
        .run()
        .unwrap();
}
