mod common;

use anyhow::Result;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use wellness_admin::api::{self, LoginCredentials};
use wellness_admin::cli::config::CliContext;
use wellness_admin::middleware::GuardDecision;

// One test per binary: the config directory comes from the process environment
#[tokio::test]
async fn cli_session_lifecycle() -> Result<()> {
    let dir = tempfile::tempdir()?;
    std::env::set_var("WELLNESS_CLI_CONFIG_DIR", dir.path());

    let server = common::backend().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::envelope(json!({
            "access_token": "tok-cli",
            "user": common::user_json()
        }))))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/clients"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    // Fresh install: protected commands are refused
    let ctx = CliContext::open_with(common::config_for(&server), "/clients").await?;
    assert!(ctx.require_session().await.is_err());

    // Sign in from the login route; token lands in both stores
    let ctx = CliContext::open_with(common::config_for(&server), "/login").await?;
    assert_eq!(ctx.edge_decision().await, GuardDecision::Allow);
    let credentials = LoginCredentials { email: "admin@clinic.test".into(), password: "secret".into() };
    ctx.check(api::sign_in(&ctx.http, &credentials).await)?;
    assert_eq!(ctx.cookie.value().await.as_deref(), Some("tok-cli"));
    assert!(dir.path().join("storage.json").exists());

    // Next run restores it; login route now sends home
    let ctx = CliContext::open_with(common::config_for(&server), "/login").await?;
    assert_eq!(ctx.edge_decision().await, GuardDecision::Redirect("/".to_string()));
    assert_eq!(ctx.session().user().map(|u| u.email).as_deref(), Some("admin@clinic.test"));

    // A rejected token tears the stored session down and reads as expired
    let ctx = CliContext::open_with(common::config_for(&server), "/clients").await?;
    ctx.require_session().await?;
    let err = ctx
        .check(api::fetch_clients(&ctx.http, &Default::default()).await)
        .unwrap_err();
    assert!(err.to_string().contains("Session expired"), "{}", err);

    let ctx = CliContext::open_with(common::config_for(&server), "/clients").await?;
    assert!(ctx.require_session().await.is_err());
    assert_eq!(ctx.cookie.value().await, None);
    Ok(())
}
