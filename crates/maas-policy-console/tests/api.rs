#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;
use tracing_test::traced_test;

use maas_policy_console::app_state::AppState;
use maas_policy_console::config;
use maas_policy_console::router::build_router;
use maas_policy_core::FixedClock;

const TEST_CONFIG: &str = r#"
version: 1
live:
  enabled: false
  history_cap: 5
  seed: 11
"#;

fn app() -> (AppState, Router) {
    app_with(TEST_CONFIG)
}

fn app_with(yaml: &str) -> (AppState, Router) {
    let cfg = config::load_from_str(yaml).unwrap();
    let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap()));
    let state = AppState::with_clock(cfg, clock).unwrap();
    let router = build_router(state.clone());
    (state, router)
}

async fn call(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            req = req.header("content-type", "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let response = router.clone().oneshot(req.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

fn candidate(team: &str, model: &str, at: &str) -> Value {
    json!({ "team": team, "model": model, "time_of_day": at })
}

#[tokio::test]
async fn catalog_and_initial_policies_are_served() {
    let (_, router) = app();

    let (status, teams) = call(&router, "GET", "/v1/catalog/teams", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(teams.as_array().unwrap().len(), 4);

    let (_, models) = call(&router, "GET", "/v1/catalog/models", None).await;
    assert_eq!(models.as_array().unwrap().len(), 15);

    let (status, policies) = call(&router, "GET", "/v1/policies", None).await;
    assert_eq!(status, StatusCode::OK);
    let policies = policies.as_array().unwrap();
    assert_eq!(policies.len(), 3);
    assert_eq!(policies[0]["id"], "policy-1");
    assert_eq!(policies[0]["limits_summary"], "200,000 tokens/hour, 09:00-17:00");
    assert_eq!(policies[1]["limits_summary"], "Unlimited, 24/7");
}

#[tokio::test]
async fn search_matches_name_or_description_case_insensitively() {
    let (_, router) = app();

    let (_, found) = call(&router, "GET", "/v1/policies?search=MARKETING", None).await;
    let ids: Vec<_> = found.as_array().unwrap().iter().map(|p| p["id"].clone()).collect();
    assert_eq!(ids, vec![json!("policy-3")]);

    let (_, found) = call(&router, "GET", "/v1/policies?search=expensive", None).await;
    assert_eq!(found[0]["id"], "policy-2");

    let (_, found) = call(&router, "GET", "/v1/policies?search=nothing-like-this", None).await;
    assert!(found.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn evaluate_uses_initial_policies() {
    let (_, router) = app();

    let (status, out) = call(&router, "POST", "/v1/evaluate", Some(candidate("marketing", "phi-4", "12:00"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(out["decision"], "accept");
    assert_eq!(out["reason"], "Request meets all policy requirements");
    assert!(out.get("policy_id").is_none());

    let (_, out) = call(&router, "POST", "/v1/evaluate", Some(candidate("marketing", "phi-4", "08:30"))).await;
    assert_eq!(out["decision"], "reject");
    assert_eq!(out["reason"], "Request outside allowed time range");
    assert_eq!(out["policy_id"], "policy-1");

    let (_, out) = call(&router, "POST", "/v1/evaluate", Some(candidate("cto", "gpt-4", "12:00"))).await;
    assert_eq!(out["reason"], "Model not approved by policy");
    assert_eq!(out["policy_id"], "policy-2");
}

#[tokio::test]
async fn evaluate_refuses_bad_input() {
    let (_, router) = app();

    let (status, err) = call(&router, "POST", "/v1/evaluate", Some(candidate("", "phi-4", "12:00"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["code"], "BAD_REQUEST");
    assert_eq!(err["msg"], "Please select both a team and a model");

    let (status, err) = call(&router, "POST", "/v1/evaluate", Some(candidate("cto", "phi-4", "25:00"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["code"], "BAD_REQUEST");

    let mut extra = candidate("cto", "phi-4", "12:00");
    extra["priority"] = json!("high");
    let (status, _) = call(&router, "POST", "/v1/evaluate", Some(extra)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn policy_crud_changes_later_evaluations() {
    let (state, router) = app();
    let spec = json!({
        "name": "Deny marketing",
        "description": "no marketing at all",
        "items": [{ "type": "team", "value": "marketing", "is_approve": false }],
        "time_range": { "start_time": "00:00", "end_time": "23:59", "unlimited": true }
    });

    let (status, created) = call(&router, "POST", "/v1/policies", Some(spec.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();
    assert!(id.starts_with("policy-"));
    assert!(created["items"][0]["id"].as_str().unwrap().starts_with("item-"));
    assert_eq!(created["limits_summary"], "Unlimited, 24/7");

    let (_, out) = call(&router, "POST", "/v1/evaluate", Some(candidate("marketing", "phi-4", "12:00"))).await;
    assert_eq!(out["reason"], "Team not approved by policy");
    assert_eq!(out["policy_id"], id.as_str());

    let mut renamed = spec.clone();
    renamed["name"] = json!("Deny marketing (edited)");
    let (status, updated) = call(&router, "PUT", &format!("/v1/policies/{id}"), Some(renamed)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Deny marketing (edited)");
    assert_eq!(updated["created"], created["created"]);

    let (status, fetched) = call(&router, "GET", &format!("/v1/policies/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Deny marketing (edited)");

    let (status, _) = call(&router, "DELETE", &format!("/v1/policies/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, out) = call(&router, "POST", "/v1/evaluate", Some(candidate("marketing", "phi-4", "12:00"))).await;
    assert_eq!(out["decision"], "accept");

    let m = state.metrics();
    assert_eq!(m.policy_mutations.get(&[("op", "create")]), 1);
    assert_eq!(m.policy_mutations.get(&[("op", "delete")]), 1);
    assert_eq!(m.policies.get(&[]), 3);
}

#[tokio::test]
async fn unknown_policy_is_not_found() {
    let (_, router) = app();
    let spec = json!({
        "name": "x",
        "items": [{ "type": "model", "value": "phi-4", "is_approve": true }]
    });

    for (method, body) in [("GET", None), ("PUT", Some(spec)), ("DELETE", None)] {
        let (status, err) = call(&router, method, "/v1/policies/policy-missing", body).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method}");
        assert_eq!(err["code"], "NOT_FOUND");
    }
}

#[tokio::test]
async fn invalid_policy_is_refused() {
    let (_, router) = app();

    let (status, err) = call(&router, "POST", "/v1/policies", Some(json!({ "name": "  ", "items": [] }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["code"], "BAD_REQUEST");

    let (_, policies) = call(&router, "GET", "/v1/policies", None).await;
    assert_eq!(policies.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn simulations_accumulate_newest_first_and_clear() {
    let (state, router) = app();

    let mut req = candidate("cto", "gpt-4", "12:00");
    req["count"] = json!(3);
    let (status, run) = call(&router, "POST", "/v1/simulations", Some(req)).await;
    assert_eq!(status, StatusCode::OK);
    let batch = run["results"].as_array().unwrap();
    assert_eq!(batch.len(), 3);
    assert!(batch.iter().all(|r| r["decision"] == "reject" && r["policy_id"] == "policy-2"));
    assert!(batch[0]["id"].as_str().unwrap().starts_with("sim-"));

    let mut req = candidate("engineering", "phi-4", "10:00");
    req["count"] = json!(2);
    call(&router, "POST", "/v1/simulations", Some(req)).await;

    let (_, all) = call(&router, "GET", "/v1/simulations", None).await;
    let results = all["results"].as_array().unwrap();
    assert_eq!(results.len(), 5);
    assert_eq!(results[0]["request"]["team"], "engineering");
    assert_eq!(all["stats"]["total"], 5);
    assert_eq!(all["stats"]["accepted"], 2);
    assert_eq!(all["stats"]["acceptance_rate"], 40.0);

    let m = state.metrics();
    let labels = [
        ("decision", "reject"),
        ("reason", "Model not approved by policy"),
        ("source", "simulate"),
    ];
    assert_eq!(m.evaluations.get(&labels), 3);

    let (status, _) = call(&router, "DELETE", "/v1/simulations", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, all) = call(&router, "GET", "/v1/simulations", None).await;
    assert!(all["results"].as_array().unwrap().is_empty());
    assert_eq!(all["stats"]["acceptance_rate"], 0.0);
}

#[tokio::test]
async fn simulation_without_team_records_nothing() {
    let (_, router) = app();

    let (status, err) = call(&router, "POST", "/v1/simulations", Some(candidate("cto", "", "12:00"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["msg"], "Please select both a team and a model");

    let (_, all) = call(&router, "GET", "/v1/simulations", None).await;
    assert!(all["results"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn request_feed_filters_and_caps() {
    let (state, router) = app();
    let live = state.live();
    for _ in 0..8 {
        live.tick().unwrap();
    }

    let (status, feed) = call(&router, "GET", "/v1/requests", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(feed["total"], 5);
    assert_eq!(feed["showing"], 5);
    assert_eq!(feed["stats"]["total"], 5);

    let (_, all) = call(&router, "GET", "/v1/requests?team=all&decision=all", None).await;
    assert_eq!(all["showing"], 5);

    let (_, rejected) = call(&router, "GET", "/v1/requests?decision=reject", None).await;
    assert_eq!(rejected["showing"], feed["stats"]["rejected"]);
    assert_eq!(rejected["total"], 5);

    let (status, err) = call(&router, "GET", "/v1/requests?decision=maybe", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["code"], "BAD_REQUEST");

    let (status, _) = call(&router, "DELETE", "/v1/requests", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, feed) = call(&router, "GET", "/v1/requests", None).await;
    assert_eq!(feed["total"], 0);
}

#[tokio::test]
async fn live_mode_toggles() {
    let (_, router) = app();

    let (_, status) = call(&router, "GET", "/v1/live", None).await;
    assert_eq!(status, json!({ "enabled": false, "interval_ms": 2000 }));

    let (code, status) = call(&router, "PUT", "/v1/live", Some(json!({ "enabled": true }))).await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(status["enabled"], true);

    let (_, status) = call(&router, "PUT", "/v1/live", Some(json!({ "enabled": false }))).await;
    assert_eq!(status["enabled"], false);

    let (code, _) = call(&router, "PUT", "/v1/live", Some(json!({ "on": true }))).await;
    assert_eq!(code, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn ops_endpoints() {
    let (_, router) = app();
    call(&router, "POST", "/v1/evaluate", Some(candidate("marketing", "phi-4", "12:00"))).await;

    let (status, body) = call(&router, "GET", "/healthz", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("ok".into()));

    let (status, body) = call(&router, "GET", "/metrics", None).await;
    assert_eq!(status, StatusCode::OK);
    let text = body.as_str().unwrap();
    assert!(text.contains("maas_policies 3"));
    assert!(text.contains("maas_live_enabled 0"));
    assert!(text.contains("source=\"evaluate\""));
}

#[tokio::test]
async fn simulation_history_is_capped() {
    let (_, router) = app_with(
        r#"
version: 1
live:
  enabled: false
simulator:
  history_cap: 4
"#,
    );

    let mut first = candidate("cto", "gpt-4", "12:00");
    first["count"] = json!(3);
    call(&router, "POST", "/v1/simulations", Some(first)).await;
    let mut second = candidate("engineering", "phi-4", "10:00");
    second["count"] = json!(3);
    let (_, run) = call(&router, "POST", "/v1/simulations", Some(second)).await;
    assert_eq!(run["results"].as_array().unwrap().len(), 3);

    let (_, all) = call(&router, "GET", "/v1/simulations", None).await;
    let teams: Vec<_> = all["results"].as_array().unwrap().iter().map(|r| r["request"]["team"].clone()).collect();
    assert_eq!(teams, vec![json!("engineering"), json!("engineering"), json!("engineering"), json!("cto")]);
    assert_eq!(all["stats"]["total"], 4);
}

#[tokio::test]
async fn duplicate_items_are_refused() {
    let (_, router) = app();
    let spec = json!({
        "name": "Twice",
        "items": [
            { "type": "team", "value": "cto", "is_approve": true },
            { "type": "team", "value": "cto", "is_approve": false }
        ]
    });

    let (status, err) = call(&router, "POST", "/v1/policies", Some(spec.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["msg"], "duplicate team item: cto");

    let (status, _) = call(&router, "PUT", "/v1/policies/policy-1", Some(spec)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (_, p1) = call(&router, "GET", "/v1/policies/policy-1", None).await;
    assert_eq!(p1["name"], "Engineering Access Policy");
}

#[tokio::test]
async fn palette_lists_unused_catalog_entries() {
    let (_, router) = app();

    let (status, palette) = call(&router, "GET", "/v1/policies/policy-2/available", None).await;
    assert_eq!(status, StatusCode::OK);
    let teams: Vec<_> = palette["teams"].as_array().unwrap().iter().map(|t| t["id"].clone()).collect();
    assert_eq!(teams, vec![json!("engineering"), json!("product"), json!("marketing")]);
    // policy-2 names models outside the catalog, so all 15 remain
    assert_eq!(palette["models"].as_array().unwrap().len(), 15);

    let (status, _) = call(&router, "GET", "/v1/policies/policy-missing/available", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn feed_rows_carry_display_labels() {
    let (state, router) = app();
    state.live().tick().unwrap();

    let (_, feed) = call(&router, "GET", "/v1/requests", None).await;
    let row = &feed["requests"][0];
    let team = row["team"].as_str().unwrap();
    assert_eq!(row["team_name"], state.catalog().team_name(team));
    assert_eq!(row["team_color"], state.catalog().team_color(team));
    assert_eq!(row["model_name"], state.catalog().model_name(row["model"].as_str().unwrap()));
    assert!(row["id"].as_str().unwrap().starts_with("req-"));
}

#[tokio::test]
#[traced_test]
async fn rejection_emits_one_event() {
    let (_, router) = app();
    let (_, out) = call(&router, "POST", "/v1/evaluate", Some(candidate("cto", "gpt-4", "12:00"))).await;
    assert_eq!(out["decision"], "reject");

    logs_assert(|lines: &[&str]| {
        match lines.iter().filter(|l| l.contains("request rejected")).count() {
            1 => Ok(()),
            n => Err(format!("expected one rejection event, got {n}")),
        }
    });
}
