mod common;

use anyhow::Result;
use reqwest::redirect::Policy;
use reqwest::StatusCode;

fn no_redirect_client() -> reqwest::Client {
    reqwest::Client::builder().redirect(Policy::none()).build().expect("client")
}

#[tokio::test]
async fn gated_routes_reject_anonymous_api_callers() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    for path in ["/api/admin/brokers", "/api/trainer/courses", "/api/broker/media", "/api/auth/whoami"] {
        let res = client.get(format!("{}{}", server.base_url, path)).send().await?;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "expected 401 for {}", path);
    }
    Ok(())
}

#[tokio::test]
async fn malformed_tokens_are_unauthorized() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/admin/brokers", server.base_url))
        .bearer_auth("tampered.token.value")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn role_outside_allow_list_is_forbidden() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    // A trainer must not see admin pages, nor broker pages
    let trainer = common::token_for(Some("trainer"));
    for path in ["/api/admin/brokers", "/api/admin/staff", "/api/broker/media"] {
        let res = client
            .get(format!("{}{}", server.base_url, path))
            .bearer_auth(&trainer)
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::FORBIDDEN, "expected 403 for {}", path);
    }
    Ok(())
}

#[tokio::test]
async fn unknown_and_missing_roles_are_denied_everywhere() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    for token in [common::token_with_raw_role("owner"), common::token_for(None)] {
        for path in ["/api/admin/brokers", "/api/trainer/courses", "/api/broker/media"] {
            let res = client
                .get(format!("{}{}", server.base_url, path))
                .bearer_auth(&token)
                .send()
                .await?;
            assert_eq!(res.status(), StatusCode::FORBIDDEN, "expected 403 for {}", path);
        }
    }
    Ok(())
}

#[tokio::test]
async fn allowed_role_passes_the_gate() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    // With no database provisioned the handler itself may fail, but the gate
    // must not be the thing rejecting an allowed role
    let admin = common::token_for(Some("admin"));
    let res = client
        .get(format!("{}/api/admin/brokers", server.base_url))
        .bearer_auth(&admin)
        .send()
        .await?;
    assert_ne!(res.status(), StatusCode::UNAUTHORIZED);
    assert_ne!(res.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn browsers_are_redirected_to_the_login_route() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = no_redirect_client();

    let res = client
        .get(format!("{}/api/admin/brokers", server.base_url))
        .header("accept", "text/html,application/xhtml+xml")
        .send()
        .await?;

    assert!(res.status().is_redirection(), "unexpected status: {}", res.status());
    assert_eq!(res.headers().get("location").and_then(|v| v.to_str().ok()), Some("/login"));
    Ok(())
}

#[tokio::test]
async fn wrong_role_browser_traffic_also_redirects() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = no_redirect_client();

    let broker = common::token_for(Some("broker"));
    let res = client
        .get(format!("{}/api/admin/articles", server.base_url))
        .header("accept", "text/html")
        .bearer_auth(&broker)
        .send()
        .await?;

    assert!(res.status().is_redirection(), "unexpected status: {}", res.status());
    assert_eq!(res.headers().get("location").and_then(|v| v.to_str().ok()), Some("/login"));
    Ok(())
}
