use clap::Subcommand;
use serde_json::json;

use crate::cli::client::RemoteClient;
use crate::cli::config::{load_server_config, save_server_config, ServerConfig};
use crate::cli::OutputFormat;

use super::print_value;

#[derive(Subcommand)]
pub enum ServerCommands {
    #[command(about = "Show the configured server")]
    Show,

    #[command(about = "Set the server base URL")]
    Set {
        #[arg(help = "Base URL, e.g. https://api.suq.example.com")]
        url: String,
    },

    #[command(about = "Ping the server's health endpoint")]
    Ping,
}

pub async fn handle(cmd: ServerCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ServerCommands::Show => {
            let config = load_server_config()?;
            print_value(&json!({ "base_url": config.base_url }), output_format);
            Ok(())
        }
        ServerCommands::Set { url } => {
            let config = ServerConfig { base_url: url.trim_end_matches('/').to_string() };
            save_server_config(&config)?;
            print_value(&json!({ "base_url": config.base_url }), output_format);
            Ok(())
        }
        ServerCommands::Ping => {
            let client = RemoteClient::from_config()?;
            let health = client.health().await?;
            print_value(&health, output_format);
            Ok(())
        }
    }
}
