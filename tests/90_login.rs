mod common;

use anyhow::Result;
use axum::http::{header, Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use common::{body_json, header_value, request};

#[tokio::test]
async fn login_sets_the_session_cookie() -> Result<()> {
    let server = common::backend().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::envelope(json!({
            "access_token": "tok-fresh",
            "user": common::user_json()
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let app = common::console(&server)?;
    let form = json!({ "email": "admin@clinic.test", "password": "secret" });
    let res = app.oneshot(request(Method::POST, "/login", None, Some(form))?).await?;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        header_value(&res, header::SET_COOKIE).as_deref(),
        Some("access_token=tok-fresh; Path=/; Max-Age=604800")
    );
    let body = body_json(res).await?;
    assert_eq!(body["data"]["user"]["email"], "admin@clinic.test");
    assert_eq!(body["message"], "Signed in successfully.");
    Ok(())
}

#[tokio::test]
async fn wrong_password_reports_backend_message_without_cookie() -> Result<()> {
    let server = common::backend().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(common::error_body("Invalid credentials", "INVALID_CREDENTIALS")))
        .mount(&server)
        .await;

    let app = common::console(&server)?;
    let form = json!({ "email": "admin@clinic.test", "password": "nope" });
    let res = app.oneshot(request(Method::POST, "/login", None, Some(form))?).await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(header_value(&res, header::SET_COOKIE), None);
    let body = body_json(res).await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid credentials");
    assert_eq!(body["code"], "INVALID_CREDENTIALS");
    Ok(())
}

#[tokio::test]
async fn malformed_login_form_never_reaches_backend() -> Result<()> {
    let server = common::backend().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let app = common::console(&server)?;
    let form = json!({ "email": "not-an-email", "password": "" });
    let res = app.oneshot(request(Method::POST, "/login", None, Some(form))?).await?;

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(res).await?;
    assert_eq!(body["details"]["fields"]["email"], "Please enter a valid email address");
    assert_eq!(body["details"]["fields"]["password"], "Password is required");
    Ok(())
}

#[tokio::test]
async fn logout_clears_cookie_and_returns_to_login() -> Result<()> {
    let server = common::backend().await;
    let app = common::console(&server)?;

    let res = app.oneshot(request(Method::POST, "/logout", Some("tok"), None)?).await?;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(header_value(&res, header::LOCATION).as_deref(), Some("/login"));
    assert_eq!(header_value(&res, header::SET_COOKIE).as_deref(), Some("access_token=; Path=/; Max-Age=0"));
    Ok(())
}
