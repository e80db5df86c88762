pub mod auth;
pub mod data;
pub mod server;

use std::sync::Arc;

use crate::auth::context::AuthContext;
use crate::config;

use super::client::{RemoteClient, RemoteRoleLookup};
use super::OutputFormat;

/// One resolver per CLI invocation: the configured role source plus the
/// remote profile lookup. Commands drive it with session transitions and
/// read it through gates.
pub(crate) fn build_context() -> anyhow::Result<AuthContext> {
    let client = RemoteClient::from_config()?;
    let role_source = config::config().auth.role_source;
    Ok(AuthContext::new(role_source, Arc::new(RemoteRoleLookup::new(client))))
}

pub(crate) fn print_value(value: &serde_json::Value, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value).unwrap_or_default()),
        OutputFormat::Text => match value {
            serde_json::Value::Array(items) => {
                for item in items {
                    println!("{}", serde_json::to_string(item).unwrap_or_default());
                }
                println!("({} rows)", items.len());
            }
            other => println!("{}", serde_json::to_string_pretty(other).unwrap_or_default()),
        },
    }
}
