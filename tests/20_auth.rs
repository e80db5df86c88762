mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn refresh_reissues_a_valid_token() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let token = common::token_for(Some("admin"));
    let res = client
        .post(format!("{}/auth/refresh", server.base_url))
        .json(&json!({ "token": token }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["success"], true);
    assert!(body["data"]["token"].is_string());
    assert!(body["data"]["expires_in"].as_i64().unwrap() > 0);
    Ok(())
}

#[tokio::test]
async fn refresh_rejects_garbage_tokens() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/auth/refresh", server.base_url))
        .json(&json!({ "token": "not-a-jwt" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["error"], true);
    assert_eq!(body["code"], "UNAUTHORIZED");
    Ok(())
}

#[tokio::test]
async fn whoami_resolves_the_embedded_role() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let token = common::token_for(Some("admin"));
    let res = client
        .get(format!("{}/api/auth/whoami", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"]["role"], "admin");
    assert_eq!(body["data"]["email"], "it@suq.example.com");
    Ok(())
}

#[tokio::test]
async fn whoami_reports_unknown_role_as_null() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    // Authenticated but un-roled: the token verifies, the tag does not parse
    let token = common::token_with_raw_role("owner");
    let res = client
        .get(format!("{}/api/auth/whoami", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert!(body["data"]["role"].is_null());
    Ok(())
}

#[tokio::test]
async fn logout_acknowledges_authenticated_callers() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let token = common::token_for(Some("broker"));
    let res = client
        .delete(format!("{}/api/auth/session", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"]["signed_out"], true);
    Ok(())
}

#[tokio::test]
async fn login_without_database_fails_without_leaking_details() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/auth/login", server.base_url))
        .json(&json!({ "email": "a@suq.example.com", "password": "whatever-pw" }))
        .send()
        .await?;

    // 401 with a database (unknown account), 5xx without one; never a success
    assert!(!res.status().is_success(), "unexpected status: {}", res.status());
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["error"], true);
    assert!(body["message"].is_string());
    Ok(())
}
