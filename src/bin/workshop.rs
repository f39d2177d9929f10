//! workshop CLI: run the API server or operate on the store directly.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use secrecy::ExposeSecret;
use workshop_tracker::api::build_router;
use workshop_tracker::config::Config;
use workshop_tracker::db::Db;
use workshop_tracker::model::{MachineId, UserId};
use workshop_tracker::rules::validate;
use workshop_tracker::store::{MemoryStore, WorkshopStore};
use workshop_tracker::telemetry::{TelemetryConfig, init_telemetry};

#[derive(Parser)]
#[command(name = "workshop", about = "Workshop machines, usage, and incidents")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API server
    Serve {
        /// Listen address (overrides BIND_ADDR)
        #[arg(long)]
        bind: Option<std::net::SocketAddr>,
        /// Serve from an in-process store instead of Postgres
        #[arg(long)]
        in_memory: bool,
    },
    /// Run pending database migrations
    Migrate,
    /// List machines
    Machines,
    /// List users
    Users,
    /// Incident operations
    Incidents {
        #[command(subcommand)]
        action: IncidentAction,
    },
    /// Machine usage operations
    Usage {
        #[command(subcommand)]
        action: UsageAction,
    },
}

#[derive(Subcommand)]
enum IncidentAction {
    /// List open and in-progress incidents
    Open,
    /// Report an incident on a machine
    Report {
        machine_id: i64,
        description: String,
        /// Reporting user (defaults to WORKSHOP_USER_ID)
        #[arg(long)]
        user: Option<i64>,
    },
}

#[derive(Subcommand)]
enum UsageAction {
    /// Start using a machine
    Start { machine_id: i64, user_id: i64 },
    /// Stop using a machine
    End { machine_id: i64 },
    /// List active sessions
    Active,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Command::Serve { bind, in_memory } => cmd_serve(config, bind, in_memory).await,
        Command::Migrate => {
            open_db(&config).await?;
            println!("Migrations applied.");
            Ok(())
        }
        Command::Machines => cmd_machines(&open_db(&config).await?).await,
        Command::Users => cmd_users(&open_db(&config).await?).await,
        Command::Incidents { action } => {
            let db = open_db(&config).await?;
            match action {
                IncidentAction::Open => cmd_incidents_open(&db).await,
                IncidentAction::Report {
                    machine_id,
                    description,
                    user,
                } => {
                    let reporter = user.map(UserId).unwrap_or(config.acting_user);
                    cmd_incident_report(&db, MachineId(machine_id), &description, reporter).await
                }
            }
        }
        Command::Usage { action } => {
            let db = open_db(&config).await?;
            match action {
                UsageAction::Start {
                    machine_id,
                    user_id,
                } => {
                    let id = db
                        .start_usage(MachineId(machine_id), UserId(user_id))
                        .await?;
                    println!("Usage started: session {id} on machine {machine_id}");
                    Ok(())
                }
                UsageAction::End { machine_id } => {
                    let id = db.end_usage(MachineId(machine_id)).await?;
                    println!("Usage ended: session {id} on machine {machine_id}");
                    Ok(())
                }
                UsageAction::Active => cmd_usage_active(&db).await,
            }
        }
    }
}

/// Connect to Postgres and bring the schema up to date.
async fn open_db(config: &Config) -> anyhow::Result<Db> {
    let db = Db::connect(config.require_database_url()?.expose_secret()).await?;
    db.migrate().await?;
    Ok(db)
}

async fn cmd_serve(
    config: Config,
    bind: Option<std::net::SocketAddr>,
    in_memory: bool,
) -> anyhow::Result<()> {
    let _guard = init_telemetry(TelemetryConfig {
        endpoint: config.otel_endpoint.clone(),
        service_name: "workshop".to_string(),
        default_level: config.log_level.clone(),
    })?;

    let addr = bind.unwrap_or(config.bind_addr);

    if in_memory {
        serve(Arc::new(MemoryStore::new()), &config, addr).await
    } else {
        let db = open_db(&config).await?;
        serve(Arc::new(db), &config, addr).await
    }
}

async fn serve<S: WorkshopStore>(
    store: Arc<S>,
    config: &Config,
    addr: std::net::SocketAddr,
) -> anyhow::Result<()> {
    if config.seed_on_boot && store.seed_if_empty().await? {
        tracing::info!("installed sample machines and users");
    }

    let app = build_router(store, config.acting_user);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, acting_user = %config.acting_user, "workshop API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("shutting down");
        })
        .await?;
    Ok(())
}

async fn cmd_machines(db: &Db) -> anyhow::Result<()> {
    let machines = db.list_machines().await?;
    if machines.is_empty() {
        println!("No machines found.");
        return Ok(());
    }

    println!("{:<4}  {:<10}  {:<24}  STATUS", "ID", "NAME", "TYPE");
    println!("{}", "-".repeat(60));
    for m in &machines {
        println!(
            "{:<4}  {:<10}  {:<24}  {}",
            m.id, m.name, m.machine_type, m.status
        );
    }
    Ok(())
}

async fn cmd_users(db: &Db) -> anyhow::Result<()> {
    let users = db.list_users().await?;
    if users.is_empty() {
        println!("No users found.");
        return Ok(());
    }

    println!("{:<4}  {:<20}  ROLE", "ID", "NAME");
    println!("{}", "-".repeat(40));
    for u in &users {
        println!("{:<4}  {:<20}  {}", u.id, u.name, u.role);
    }
    Ok(())
}

async fn cmd_incidents_open(db: &Db) -> anyhow::Result<()> {
    let incidents = db.list_open_incidents().await?;
    if incidents.is_empty() {
        println!("No open incidents.");
        return Ok(());
    }

    println!(
        "{:<5}  {:<10}  {:<12}  {:<16}  {:<18}  DESCRIPTION",
        "ID", "MACHINE", "STATUS", "REPORTED BY", "CREATED"
    );
    println!("{}", "-".repeat(100));
    for i in &incidents {
        println!(
            "{:<5}  {:<10}  {:<12}  {:<16}  {:<18}  {}",
            i.id,
            i.machine_name,
            i.status,
            i.reported_by,
            i.created_at.format("%Y-%m-%d %H:%M"),
            i.description
        );
    }
    println!("\n{} incident(s)", incidents.len());
    Ok(())
}

async fn cmd_incident_report(
    db: &Db,
    machine_id: MachineId,
    description: &str,
    reporter: UserId,
) -> anyhow::Result<()> {
    let new = validate::incident_report(Some(machine_id), Some(description), reporter)?;
    let id = db.report_incident(&new).await?;
    println!("Incident {id} reported on machine {machine_id}");
    Ok(())
}

async fn cmd_usage_active(db: &Db) -> anyhow::Result<()> {
    let sessions = db.list_active_usage().await?;
    if sessions.is_empty() {
        println!("No machine is in use.");
        return Ok(());
    }

    println!("{:<6}  {:<8}  {:<6}  STARTED", "ID", "MACHINE", "USER");
    println!("{}", "-".repeat(44));
    for s in &sessions {
        println!(
            "{:<6}  {:<8}  {:<6}  {}",
            s.id,
            s.machine_id,
            s.user_id,
            s.started_at.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}
