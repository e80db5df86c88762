use anyhow::{bail, Context};
use clap::{Subcommand, ValueEnum};

use crate::auth::gate::{AccessGate, GateDecision};
use crate::auth::Role;
use crate::cli::client::{RemoteClient, StoredSessionProvider};
use crate::cli::config::load_session;
use crate::cli::OutputFormat;
use crate::config;

use super::{build_context, print_value};

#[derive(Subcommand)]
pub enum DataCommands {
    #[command(about = "List records of an entity the current role may read")]
    List {
        #[arg(value_enum)]
        entity: Entity,
    },
}

/// Every data surface the CLI can read, with the API path and the role
/// allow-list its page carries in the admin app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Entity {
    Brokers,
    Trainers,
    Staff,
    Quiz,
    Signals,
    Carousel,
    ExchangeRates,
    Articles,
    Courses,
    Media,
    Profile,
}

impl Entity {
    fn path(&self) -> &'static str {
        match self {
            Entity::Brokers => "/api/admin/brokers",
            Entity::Trainers => "/api/admin/trainers",
            Entity::Staff => "/api/admin/staff",
            Entity::Quiz => "/api/admin/quiz",
            Entity::Signals => "/api/admin/signals",
            Entity::Carousel => "/api/admin/carousel",
            Entity::ExchangeRates => "/api/admin/exchange-rates",
            Entity::Articles => "/api/admin/articles",
            Entity::Courses => "/api/trainer/courses",
            Entity::Media => "/api/broker/media",
            Entity::Profile => "/api/auth/whoami",
        }
    }

    fn allowed_roles(&self) -> &'static [Role] {
        match self {
            Entity::Brokers
            | Entity::Trainers
            | Entity::Staff
            | Entity::Quiz
            | Entity::Signals
            | Entity::Carousel
            | Entity::ExchangeRates
            | Entity::Articles => &[Role::Admin],
            Entity::Courses => &[Role::Trainer],
            Entity::Media => &[Role::Broker],
            Entity::Profile => &[Role::Admin, Role::Trainer, Role::Broker],
        }
    }
}

pub async fn handle(cmd: DataCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        DataCommands::List { entity } => {
            // Resolve identity, then let the gate decide before any request
            // leaves the machine.
            let ctx = build_context()?;
            let mut gate = AccessGate::new(ctx.subscribe());
            ctx.initialize(&StoredSessionProvider).await;

            match gate.wait(entity.allowed_roles()).await {
                GateDecision::Granted(identity) => {
                    tracing::debug!("Gate granted {:?} to {}", entity, identity.email);
                }
                GateDecision::Denied => {
                    // The CLI's redirect to the login entry point
                    bail!(
                        "access denied for {:?}; sign in with `suq auth login` ({})",
                        entity,
                        config::config().auth.login_route
                    );
                }
                GateDecision::Pending => unreachable!("gate.wait never yields Pending"),
            }

            let saved = load_session()?.context("session disappeared, run `suq auth login`")?;
            let client = RemoteClient::from_config()?;
            let data = client.get_data(entity.path(), &saved.token).await?;
            print_value(&data, output_format);
            Ok(())
        }
    }
}
