use std::io::Write;

use anyhow::Context;
use clap::Subcommand;
use serde_json::json;

use crate::auth::identity::AuthEvent;
use crate::cli::client::{RemoteClient, StoredSessionProvider};
use crate::cli::config::{clear_session, load_session, save_session};
use crate::cli::OutputFormat;

use super::{build_context, print_value};

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login to the server")]
    Login {
        #[arg(help = "Email address")]
        email: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Logout from the server")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,

    #[command(about = "Refresh the session token")]
    Refresh,

    #[command(about = "Show the server-resolved identity")]
    Whoami,
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { email, password } => {
            let password = match password {
                Some(password) => password,
                None => prompt_password()?,
            };

            let client = RemoteClient::from_config()?;
            let session = client.login(email.trim(), &password).await?;
            save_session(&session)?;

            // Report the transition to the resolver and show what it derived
            let ctx = build_context()?;
            ctx.on_session_change(AuthEvent::SignedIn, Some(session.to_session())).await;
            let snapshot = ctx.snapshot();

            match snapshot.identity {
                Some(identity) => {
                    print_value(
                        &json!({ "signed_in": identity.email, "role": identity.role }),
                        output_format,
                    );
                }
                None => println!("Signed in, but no identity resolved"),
            }
            Ok(())
        }
        AuthCommands::Logout => {
            if let Some(saved) = load_session()? {
                let client = RemoteClient::from_config()?;
                // Best effort; the local session is cleared regardless
                let _ = client.logout(&saved.token).await;
            }
            clear_session()?;

            let ctx = build_context()?;
            ctx.on_session_change(AuthEvent::SignedOut, None).await;
            debug_assert!(ctx.snapshot().identity.is_none());

            println!("Signed out");
            Ok(())
        }
        AuthCommands::Status => {
            let ctx = build_context()?;
            ctx.initialize(&StoredSessionProvider).await;
            let snapshot = ctx.snapshot();

            match snapshot.identity {
                Some(identity) => print_value(
                    &json!({
                        "signed_in": true,
                        "email": identity.email,
                        "role": identity.role,
                    }),
                    output_format,
                ),
                None => print_value(&json!({ "signed_in": false }), output_format),
            }
            Ok(())
        }
        AuthCommands::Refresh => {
            let saved = load_session()?.context("no saved session, run `suq auth login` first")?;
            let client = RemoteClient::from_config()?;
            let refreshed = client.refresh(&saved).await?;
            save_session(&refreshed)?;

            let ctx = build_context()?;
            ctx.on_session_change(AuthEvent::TokenRefreshed, Some(refreshed.to_session())).await;

            print_value(&json!({ "refreshed": true, "expires_at": refreshed.expires_at }), output_format);
            Ok(())
        }
        AuthCommands::Whoami => {
            let saved = load_session()?.context("no saved session, run `suq auth login` first")?;
            let client = RemoteClient::from_config()?;
            let body = client.whoami(&saved.token).await?;
            print_value(&body["data"], output_format);
            Ok(())
        }
    }
}

fn prompt_password() -> anyhow::Result<String> {
    print!("Password: ");
    std::io::stdout().flush()?;
    let mut password = String::new();
    std::io::stdin().read_line(&mut password)?;
    Ok(password.trim_end_matches(['\r', '\n']).to_string())
}
