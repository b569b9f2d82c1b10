use crate::harness::workspace::content_route;
use crate::harness::{Assertion, ErrorMatch, Scenario};
use wfprobe_core::{ActionStatus, TriggerStatus, WorkflowRunStatus};

const RUN_ID: &str = "08584737551867954143243946780CU57";
const ORDER_RUN: &str = include_str!("../../fixtures/runs/order_run_actions.json");

fn order_run() -> Scenario {
    Scenario::new("order_run")
        .with_run_actions_body(RUN_ID, ORDER_RUN)
        .with_run_statuses(RUN_ID, &["Failed"])
        .with_content("trigger-out", r#"{"headers": {"Content-Type": "application/json"}, "body": {"orderId": 42}}"#)
        .with_content("trigger-in", r#"{"method": "POST", "relativePath": "/orders"}"#)
        .with_content("parse-in", r#"{"content": {"orderId": 42}}"#)
        .with_content("parse-out", r#"{"body": {"orderId": 42, "lines": 3}}"#)
}

#[test]
fn test_existing_run_statuses() {
    order_run()
        .load_run(RUN_ID)
        .assert(Assertion::CurrentRun(RUN_ID.into()))
        .assert_run_status(WorkflowRunStatus::Failed)
        .assert_trigger(TriggerStatus::Succeeded)
        .assert_action("Parse order", ActionStatus::Succeeded)
        .assert_action("Check stock", ActionStatus::Failed)
        .assert_action("Send confirmation", ActionStatus::Skipped)
        .assert_action("Terminate", ActionStatus::Succeeded)
        .assert_action("Refund", ActionStatus::ActionDoesntExistInRunHistory)
        .run()
        .expect("scenario should pass");
}

#[test]
fn test_unformatted_names_match_exactly() {
    order_run()
        .load_run(RUN_ID)
        .check(|manager| {
            let raw = manager.action_status("Parse order", "", false, false)?;
            anyhow::ensure!(raw == ActionStatus::ActionDoesntExistInRunHistory, "got {:?}", raw);
            let exact = manager.action_status("Parse_order", "", false, false)?;
            anyhow::ensure!(exact == ActionStatus::Succeeded, "got {:?}", exact);
            Ok(())
        })
        .run()
        .unwrap();
}

#[test]
fn test_content_links_are_followed() {
    order_run()
        .load_run(RUN_ID)
        .assert(Assertion::ActionInputContains {
            action: "Parse order".into(),
            text: r#""orderId": 42"#.into(),
        })
        .assert(Assertion::ActionOutputContains {
            action: "Parse order".into(),
            text: r#""lines": 3"#.into(),
        })
        .assert(Assertion::TriggerMessageContains(r#""body": {"orderId": 42}"#.into()))
        .check(|manager| {
            let inputs = manager.trigger_input_message("", false)?;
            anyhow::ensure!(inputs.contains(r#""relativePath": "/orders""#), "trigger inputs: {}", inputs);
            Ok(())
        })
        .assert_hits(&content_route("parse-out"), 1)
        .assert(Assertion::ManagementCallsAuthorized)
        .run()
        .unwrap();
}

#[test]
fn test_action_json_and_errors() {
    order_run()
        .load_run(RUN_ID)
        .check(|manager| {
            let json = manager.action_json("Check stock", "", false, true)?;
            anyhow::ensure!(json["code"] == "BadRequest", "got {}", json);
            anyhow::ensure!(json["error"]["message"] == "Stock service rejected the request.");

            let trigger = manager.trigger_details("", false)?;
            anyhow::ensure!(trigger.name == "When_a_HTTP_request_is_received");
            anyhow::ensure!(trigger.code.is_none());

            let statuses = manager.action_statuses("", false)?;
            let names: Vec<&str> = statuses.iter().map(|(name, _)| name.as_str()).collect();
            anyhow::ensure!(
                names == ["Parse_order", "Check_stock", "Send_confirmation", "Terminate"],
                "document order lost: {:?}",
                names
            );
            Ok(())
        })
        .run()
        .unwrap();
}

#[test]
fn test_missing_links_and_actions() {
    order_run()
        .load_run(RUN_ID)
        .assert(Assertion::ActionOutputContains {
            action: "Check stock".into(),
            text: String::new(),
        })
        .expect_failure(ErrorMatch::ContentLinkMissing)
        .assert(Assertion::ActionInputContains {
            action: "Refund".into(),
            text: String::new(),
        })
        .expect_failure(ErrorMatch::ActionNotFound)
        .run()
        .unwrap();
}

#[test]
fn test_expired_content_link() {
    Scenario::new("expired_content_link")
        .with_run_actions_body(RUN_ID, ORDER_RUN)
        .with_run_statuses(RUN_ID, &["Failed"])
        .with_route(
            &content_route("parse-out"),
            crate::harness::MockResponse::status(403, "AuthorizationFailure"),
        )
        .load_run(RUN_ID)
        .assert(Assertion::ActionOutputContains {
            action: "Parse order".into(),
            text: String::new(),
        })
        .expect_failure(ErrorMatch::Transport(403))
        .run()
        .unwrap();
}
