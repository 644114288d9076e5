//! Command-line entry point for the truck checkout service.
//!
//! Usage:
//!
//! ```text
//! truckbot [--config truckbot.toml] [--database-url URL] <command>
//! ```
//!
//! Commands:
//!
//! - `migrate`: create the fleet tables in `PostgreSQL`;
//! - `seed --file trucks.json`: provision trucks from a JSON array of
//!   `{"name": "Tulip", "default_team": "beltline", "checked_out": false}`;
//! - `sweep`: release lapsed checkouts once;
//! - `console [--in-memory]`: read chat commands from stdin and print the
//!   replies, sweeping lapsed checkouts in the background.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use clap::{Parser, Subcommand};
use diesel::{
    Connection, PgConnection,
    connection::SimpleConnection,
    r2d2::{ConnectionManager, Pool},
};
use mockable::DefaultClock;
use serde::Deserialize;
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    task::JoinHandle,
};
use tracing::{info, warn};
use truckbot::{
    command::{CommandReply, CommandRequest, CommandService, TeamPrompt},
    config::FleetConfig,
    fleet::{
        adapters::{
            LogNotifier,
            memory::InMemoryFleetStore,
            postgres::{FleetPgPool, PostgresFleetStore},
        },
        ports::{FleetStore, FleetStoreError},
        services::{
            CheckoutEngine, CreateTruckRequest, TruckRegistryError, TruckRegistryService,
            UserDirectoryService,
        },
    },
    telemetry,
};

const CREATE_FLEET_TABLES: &str =
    include_str!("../../migrations/2026-10-01-000000_create_fleet_tables/up.sql");

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

type Engine<S> = CheckoutEngine<S, LogNotifier, DefaultClock>;

#[derive(Parser)]
#[command(name = "truckbot", about = "Shared truck checkout service", version)]
struct Cli {
    /// Configuration file; `truckbot.toml` is read when present otherwise.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// `PostgreSQL` URL, overriding the configured one.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the fleet tables.
    Migrate,
    /// Provision trucks from a JSON file.
    Seed {
        /// JSON array of trucks.
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Release lapsed checkouts once and exit.
    Sweep,
    /// Read chat commands from stdin and print replies.
    Console {
        /// Use a throwaway in-memory fleet even when a database is configured.
        #[arg(long)]
        in_memory: bool,
        /// Chat user id commands are issued as.
        #[arg(long, default_value = "console")]
        user_id: String,
        /// Display name commands are issued as.
        #[arg(long, default_value = "Console User")]
        user_name: String,
    },
}

#[derive(Debug, Deserialize)]
struct SeedTruck {
    name: String,
    default_team: Option<String>,
    #[serde(default)]
    checked_out: bool,
}

struct ConsoleIdentity {
    user_id: String,
    user_name: String,
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let cli = Cli::parse();
    let mut config = FleetConfig::load(cli.config.as_deref())?;
    if let Some(url) = cli.database_url {
        config.database_url = Some(url);
    }
    telemetry::init_tracing(&config.log)?;

    match cli.command {
        Commands::Migrate => migrate(&config).await,
        Commands::Seed { file } => seed(&postgres_store(&config)?, &file).await,
        Commands::Sweep => {
            let expired = build_engine(&config, postgres_store(&config)?)
                .expire_lapsed()
                .await?;
            info!(count = expired.len(), "sweep finished");
            Ok(())
        }
        Commands::Console {
            in_memory,
            user_id,
            user_name,
        } => {
            let identity = ConsoleIdentity { user_id, user_name };
            if in_memory || config.database_url.is_none() {
                let store = Arc::new(InMemoryFleetStore::new());
                provision_demo_fleet(&store).await?;
                console(&config, store, &identity).await
            } else {
                console(&config, postgres_store(&config)?, &identity).await
            }
        }
    }
}

fn postgres_store(config: &FleetConfig) -> Result<Arc<PostgresFleetStore>, BoxError> {
    let url = config
        .database_url
        .as_deref()
        .ok_or("database_url is not configured")?;
    let pool: FleetPgPool = Pool::builder().build(ConnectionManager::<PgConnection>::new(url))?;
    Ok(Arc::new(PostgresFleetStore::new(pool)))
}

fn build_engine<S: FleetStore>(config: &FleetConfig, store: Arc<S>) -> Engine<S> {
    CheckoutEngine::new(store, Arc::new(LogNotifier), Arc::new(DefaultClock))
        .with_policy(config.checkout.clone())
        .with_channel(config.notifications.channel.as_str())
}

async fn migrate(config: &FleetConfig) -> Result<(), BoxError> {
    let url = config
        .database_url
        .clone()
        .ok_or("database_url is not configured")?;
    tokio::task::spawn_blocking(move || -> Result<(), BoxError> {
        let mut connection = PgConnection::establish(&url)?;
        connection.batch_execute(CREATE_FLEET_TABLES)?;
        Ok(())
    })
    .await??;
    info!("fleet tables ready");
    Ok(())
}

async fn seed<S: FleetStore>(store: &Arc<S>, file: &Path) -> Result<(), BoxError> {
    let text = tokio::fs::read_to_string(file).await?;
    let trucks: Vec<SeedTruck> = serde_json::from_str(&text)?;
    let registry = TruckRegistryService::new(Arc::clone(store));
    for entry in trucks {
        let mut request = CreateTruckRequest::new(entry.name.as_str()).with_checked_out(entry.checked_out);
        if let Some(team) = entry.default_team {
            request = request.with_default_team(team);
        }
        match registry.create_truck(request).await {
            Ok(truck) => info!(truck = %truck.name(), "provisioned truck"),
            Err(TruckRegistryError::Store(FleetStoreError::DuplicateTruckName(name))) => {
                warn!(truck = %name, "truck already provisioned, skipping");
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

async fn provision_demo_fleet(store: &Arc<InMemoryFleetStore>) -> Result<(), BoxError> {
    let registry = TruckRegistryService::new(Arc::clone(store));
    for (name, team) in [
        ("Libby", "floaters"),
        ("Tulip", "beltline"),
        ("Watson", "forest_restoration"),
        ("Andre350", "urban_trees"),
    ] {
        registry
            .create_truck(CreateTruckRequest::new(name).with_default_team(team))
            .await?;
    }
    Ok(())
}

fn spawn_sweeper<S>(engine: Engine<S>, period: Duration) -> JoinHandle<()>
where
    S: FleetStore + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            match engine.expire_lapsed().await {
                Ok(expired) if !expired.is_empty() => {
                    info!(count = expired.len(), "expired lapsed checkouts");
                }
                Ok(_) => {}
                Err(err) => warn!(error = %err, "expiry sweep failed"),
            }
        }
    })
}

async fn console<S>(
    config: &FleetConfig,
    store: Arc<S>,
    identity: &ConsoleIdentity,
) -> Result<(), BoxError>
where
    S: FleetStore + 'static,
{
    let clock = Arc::new(DefaultClock);
    let sweeper = spawn_sweeper(
        build_engine(config, Arc::clone(&store)),
        Duration::from_secs(config.sweep_interval_secs),
    );
    let service = CommandService::new(
        build_engine(config, Arc::clone(&store)),
        TruckRegistryService::new(Arc::clone(&store)),
        UserDirectoryService::new(store, clock),
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let mut pending: Option<TeamPrompt> = None;
    loop {
        let next = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = next else { break };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let reply = match pending.take() {
            Some(prompt) => {
                service
                    .complete_team_selection(&prompt.metadata, input)
                    .await?
            }
            None => {
                service
                    .handle(CommandRequest::new(
                        identity.user_id.as_str(),
                        identity.user_name.as_str(),
                        input,
                    ))
                    .await?
            }
        };
        let mut output = reply.text().to_owned();
        if let CommandReply::SelectTeam(prompt) = reply {
            for option in &prompt.options {
                output.push_str(&format!("\n  {} ({})", option.value, option.label));
            }
            pending = Some(prompt);
        }
        output.push('\n');
        stdout.write_all(output.as_bytes()).await?;
        stdout.flush().await?;
    }

    sweeper.abort();
    Ok(())
}
