use std::sync::Arc;

use anyhow::Context;
use bookings::model::{parse_date, parse_time};
use bookings::{DesiredBookingStore, SQLiteBookingStore};
use clap::Parser;
use common::logger::{TraceId, init_logger, root_span};
use courts::{BookingOrchestrator, CourtResolver};
use driver::{
    cli::{Cli, Command},
    config::{AppConfig, VenueConfig},
    runner::run_pending,
};
use session::SessionManager;
use session::store::JsonCredentialStore;
use session::transport::ReqwestTransport;
use tracing::{Instrument, info};

/// Logs in (or reuses a fresh token) and wires the orchestrator.
/// Any error here ends the run before a single booking is attempted.
async fn init_orchestrator(
    cfg: &AppConfig,
    venue: &VenueConfig,
) -> anyhow::Result<BookingOrchestrator> {
    let transport = Arc::new(ReqwestTransport::new(
        venue.http_timeout(),
        &venue.user_agent,
    )?);
    let credentials = Arc::new(JsonCredentialStore::new(&cfg.credentials_path));

    let session = SessionManager::initialize(
        transport,
        credentials,
        venue.session_settings(),
        chrono::Local::now().naive_local(),
    )
    .await
    .context("could not start a session with the reservation service")?;

    let resolver = CourtResolver::new(venue.courts.clone(), venue.formats.clone());

    Ok(BookingOrchestrator::new(
        session,
        resolver,
        venue.sports_package_id,
    ))
}

async fn run(cfg: &AppConfig, lookahead_days: Option<i64>) -> anyhow::Result<()> {
    let mut venue = VenueConfig::load(cfg.venue_path.as_deref()).await?;
    if let Some(days) = lookahead_days {
        venue.lookahead_days = days;
        venue.validate()?;
    }

    let store = SQLiteBookingStore::new(&cfg.database_url).await?;
    let orchestrator = init_orchestrator(cfg, &venue).await?;

    run_pending(
        &orchestrator,
        &store,
        chrono::Local::now().naive_local(),
        venue.lookahead(),
    )
    .await?;

    Ok(())
}

async fn add(cfg: &AppConfig, date: &str, time: &str) -> anyhow::Result<()> {
    let store = SQLiteBookingStore::new(&cfg.database_url).await?;

    match store.create(parse_date(date)?, parse_time(time)?).await? {
        Some(b) => println!("queued #{} {} {}", b.id, b.date, b.time.format("%H:%M")),
        None => println!("a booking for {date} {time} already exists"),
    }
    Ok(())
}

async fn remove(cfg: &AppConfig, id: i64) -> anyhow::Result<()> {
    let store = SQLiteBookingStore::new(&cfg.database_url).await?;

    if store.delete(id).await? {
        println!("removed #{id}");
    } else {
        println!("no booking #{id}");
    }
    Ok(())
}

async fn list(cfg: &AppConfig, command: &Command) -> anyhow::Result<()> {
    let store = SQLiteBookingStore::new(&cfg.database_url).await?;

    let today = chrono::Local::now().date_naive();
    for b in store.list(command.list_filter(today)).await? {
        println!(
            "#{:<5} {} {} {}",
            b.id,
            b.date,
            b.time.format("%H:%M"),
            b.status
        );
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = AppConfig::from_env().with_cli(&cli);

    init_logger("courtbot", cfg.json_logs);

    let trace_id = TraceId::new();
    let span = root_span("courtbot", &trace_id);

    async {
        match &cli.command {
            Command::Run { lookahead_days } => {
                info!("starting court booking run");
                run(&cfg, *lookahead_days).await
            }
            Command::Add { date, time } => add(&cfg, date, time).await,
            Command::Remove { id } => remove(&cfg, *id).await,
            Command::List { .. } => list(&cfg, &cli.command).await,
        }
    }
    .instrument(span)
    .await
}
