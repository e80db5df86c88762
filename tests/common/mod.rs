#![allow(dead_code)] // not every test file uses every helper

use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;

static SERVER: OnceLock<TestServer> = OnceLock::new();

/// The development JWT secret; pinned here and in the spawned server's
/// environment so tokens minted by tests verify on the server side.
pub const TEST_JWT_SECRET: &str = "suq-development-secret";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    #[allow(dead_code)]
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Spawn the already-built binary to keep start fast during tests
        // Assumes debug profile; adjust if you run tests with --release
        let mut cmd = Command::new("target/debug/suq-api");
        cmd.env("SUQ_API_PORT", port.to_string())
            .env("APP_ENV", "development")
            .env("SECURITY_JWT_SECRET", TEST_JWT_SECRET)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // Inherit the rest of the environment so DATABASE_URL from .env is
        // visible when a database is provisioned for the run
        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            match client.get(&url).send().await {
                Ok(resp) => {
                    // Consider server ready on any non-404 response
                    if resp.status() == StatusCode::OK || resp.status() == StatusCode::SERVICE_UNAVAILABLE {
                        return Ok(());
                    }
                }
                Err(_) => {}
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    // Match the spawned server's token configuration in this process too, so
    // helper-minted claims use the same secret. Must happen before the
    // config singleton is first touched.
    std::env::set_var("APP_ENV", "development");
    std::env::set_var("SECURITY_JWT_SECRET", TEST_JWT_SECRET);

    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Mint a token for a role tag (or none) against the test secret.
pub fn token_for(role: Option<&str>) -> String {
    use suq_api::auth::{generate_token, Claims, Role};

    let role = role.map(|tag| tag.parse::<Role>().expect("known role tag"));
    let claims = Claims::new(uuid::Uuid::new_v4(), "it@suq.example.com".to_string(), role);
    generate_token(&claims).expect("token generation")
}

/// Mint a token whose role claim is an arbitrary tag, bypassing the closed
/// enum, to exercise the unknown-role path end to end.
pub fn token_with_raw_role(tag: &str) -> String {
    use suq_api::auth::{generate_token, Claims};

    let mut claims = Claims::new(uuid::Uuid::new_v4(), "it@suq.example.com".to_string(), None);
    claims.role = Some(tag.to_string());
    generate_token(&claims).expect("token generation")
}
