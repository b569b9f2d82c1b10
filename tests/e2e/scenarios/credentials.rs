use crate::harness::mock_api::{MockManagementApi, MockResponse};
use crate::harness::workspace::{run_details_route, WORKFLOW};
use crate::harness::fixtures;
use anyhow::Result;
use wfprobe_core::{
    build_http_client, ApiConfig, ApiTransport, ClientSecretCredential, CredentialsConfig,
    ManagementClient, ProbeError, RunId, TokenProvider,
};

const TOKEN_ROUTE: &str = "/tenant-1/oauth2/v2.0/token";

fn credentials(api: &MockManagementApi) -> CredentialsConfig {
    CredentialsConfig {
        tenant_id: "tenant-1".into(),
        client_id: "client-1".into(),
        client_secret: "s3cret&more".into(),
        authority: api.base_url().to_string(),
    }
}

#[test]
fn test_token_is_cached_until_refresh() -> Result<()> {
    let api = MockManagementApi::start()?;
    api.route(
        TOKEN_ROUTE,
        MockResponse::ok(r#"{"token_type": "Bearer", "expires_in": 3599, "access_token": "tok-1"}"#),
    );

    let http = build_http_client(&ApiConfig::default())?;
    let credential = ClientSecretCredential::new(&credentials(&api), http)?;
    assert_eq!(credential.authorization_header()?, "Bearer tok-1");
    assert_eq!(credential.authorization_header()?, "Bearer tok-1");
    assert_eq!(api.hits(TOKEN_ROUTE), 1);

    let calls = api.calls();
    let body = &calls[0].body;
    assert_eq!(calls[0].method, "POST");
    assert!(body.contains("grant_type=client_credentials"));
    assert!(body.contains("client_id=client-1"));
    assert!(body.contains("client_secret=s3cret%26more"));
    assert!(body.contains("scope=https%3A%2F%2Fmanagement.azure.com%2F.default"));
    Ok(())
}

#[test]
fn test_short_lived_token_is_renewed() -> Result<()> {
    let api = MockManagementApi::start()?;
    api.route(
        TOKEN_ROUTE,
        MockResponse::ok(r#"{"expires_in": "30", "access_token": "short"}"#),
    );

    let http = build_http_client(&ApiConfig::default())?;
    let credential = ClientSecretCredential::new(&credentials(&api), http)?;
    credential.authorization_header()?;
    credential.authorization_header()?;
    assert_eq!(api.hits(TOKEN_ROUTE), 2);
    Ok(())
}

#[test]
fn test_rejected_credentials() -> Result<()> {
    let api = MockManagementApi::start()?;
    api.route(
        TOKEN_ROUTE,
        MockResponse::status(401, r#"{"error": "invalid_client"}"#),
    );

    let http = build_http_client(&ApiConfig::default())?;
    let credential = ClientSecretCredential::new(&credentials(&api), http)?;
    let err = credential.authorization_header().unwrap_err();
    assert!(matches!(err, ProbeError::Auth(ref reason) if reason.contains("invalid_client")));
    assert!(err.recovery_suggestion().is_some());
    Ok(())
}

#[test]
fn test_management_client_sends_acquired_token() -> Result<()> {
    let api = MockManagementApi::start()?;
    api.route(
        TOKEN_ROUTE,
        MockResponse::ok(r#"{"expires_in": 3599, "access_token": "tok-mgmt"}"#),
    );
    api.route(
        &run_details_route("run-1"),
        MockResponse::ok(fixtures::run_details("run-1", "Succeeded")),
    );

    let mut config = ApiConfig::default();
    config.base_url = format!("{}/", api.base_url());
    let http = build_http_client(&ApiConfig::default())?;
    let credential = ClientSecretCredential::new(&credentials(&api), http)?;
    let client = ManagementClient::new(&config, Box::new(credential))?;

    let endpoints = crate::harness::workspace::endpoints();
    let body = client.get(&endpoints.run_details(WORKFLOW, &RunId::new("run-1")))?;
    assert!(body.contains("\"run-1\""));

    let calls = api.calls();
    let management = calls
        .iter()
        .find(|c| c.url == run_details_route("run-1"))
        .expect("management call recorded");
    assert_eq!(management.authorization.as_deref(), Some("Bearer tok-mgmt"));
    Ok(())
}
