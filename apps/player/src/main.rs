mod cli;

use anyhow::{bail, Context, Result};
use clap::Parser;
use cli::{Cli, Command, OffsetCommand};
use cuesync_cues::{demo, CueScript};
use cuesync_engine::{EngineConfig, Player, SyncEngine};
use cuesync_events::{
    event_names, CallbackEventBus, SequenceCompleteEvent, StatusChangedEvent,
    TranscriptAppendedEvent,
};
use cuesync_offset::{MemoryPersistence, OffsetPersistence, OffsetStore};
use cuesync_storage::{default_database_path, Database};
use cuesync_transport::{ClockTransport, ManualTransport, Transport};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// How often `play` checks whether the sequence has finished.
const COMPLETION_POLL: Duration = Duration::from_millis(100);

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,cuesync=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let script = load_script(&cli)?;
    let config = load_config(&cli)?;

    match &cli.command {
        Command::Play { rate } => {
            let offset = session_offset_store(&cli, &config)?;
            play(script, config, offset, *rate).await
        }
        Command::Inspect { at } => {
            let offset = session_offset_store(&cli, &config)?;
            inspect(script, config, offset, *at)
        }
        Command::ExportScript => {
            println!("{}", script.to_json_pretty()?);
            Ok(())
        }
        Command::Validate => validate(&script),
        Command::Offset { action } => {
            if cli.offset.is_some() {
                tracing::warn!("--offset is ignored by the offset command");
            }
            let store = persisted_offset_store(&cli, &config)?;
            manage_offset(&store, action);
            Ok(())
        }
    }
}

fn load_script(cli: &Cli) -> Result<CueScript> {
    match &cli.script {
        Some(path) => CueScript::from_path(path).context("loading cue script"),
        None => Ok(demo::charger_support_call()),
    }
}

fn load_config(cli: &Cli) -> Result<EngineConfig> {
    match &cli.config {
        Some(path) => EngineConfig::from_path(path).context("loading engine config"),
        None => Ok(EngineConfig::default()),
    }
}

fn persisted_offset_store(cli: &Cli, config: &EngineConfig) -> Result<Arc<OffsetStore>> {
    let persistence: Arc<dyn OffsetPersistence> = if cli.no_persist {
        Arc::new(MemoryPersistence::new())
    } else {
        let path = match &cli.db {
            Some(path) => path.clone(),
            None => default_database_path()
                .context("no platform data directory, pass --db or --no-persist")?,
        };
        let db = Database::open_or_create(&path)
            .with_context(|| format!("opening settings database {}", path.display()))?;
        Arc::new(db)
    };
    Ok(Arc::new(OffsetStore::with_config(persistence, config.offset)))
}

/// The stored offset, or the `--offset` override kept in memory.
fn session_offset_store(cli: &Cli, config: &EngineConfig) -> Result<Arc<OffsetStore>> {
    let Some(value) = cli.offset else {
        return persisted_offset_store(cli, config);
    };
    let store = OffsetStore::with_config(Arc::new(MemoryPersistence::new()), config.offset);
    store.set(value);
    Ok(Arc::new(store))
}

async fn play(
    script: CueScript,
    config: EngineConfig,
    offset: Arc<OffsetStore>,
    rate: f64,
) -> Result<()> {
    let duration = script.duration.or_else(|| script.last_cue_end());
    let transport = ClockTransport::new(duration).with_rate(rate);
    tracing::info!(
        title = script.title.as_deref().unwrap_or("untitled"),
        cues = script.cues.len(),
        offset = offset.get(),
        rate = transport.rate(),
        "replaying script"
    );

    let bus = Arc::new(CallbackEventBus::new(print_event));
    let engine =
        SyncEngine::with_config(script, offset, Some(transport), config).with_event_bus(bus);
    let mut player = Player::new(engine);
    player.start();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut poll = tokio::time::interval(COMPLETION_POLL);

    loop {
        tokio::select! {
            result = &mut ctrl_c => {
                result.context("listening for ctrl-c")?;
                tracing::info!("interrupted");
                player.reset();
                break;
            }
            _ = poll.tick() => {
                if player.snapshot().is_complete {
                    break;
                }
                if !player.is_ticking() {
                    tracing::warn!("playback stopped before the sequence completed");
                    break;
                }
            }
        }
    }

    Ok(())
}

fn print_event(topic: &str, payload: serde_json::Value) {
    match topic {
        event_names::TRANSCRIPT_APPENDED => {
            if let Ok(event) = serde_json::from_value::<TranscriptAppendedEvent>(payload) {
                println!("{:>6}: {}", event.speaker, event.text);
            }
        }
        event_names::STATUS_CHANGED => {
            if let Ok(event) = serde_json::from_value::<StatusChangedEvent>(payload) {
                if !event.status.is_empty() {
                    println!("        [{:>6.1}s] {}", event.effective_time, event.status);
                }
            }
        }
        event_names::COMPLETE => {
            if let Ok(event) = serde_json::from_value::<SequenceCompleteEvent>(payload) {
                println!("-- complete at {:.1}s --", event.effective_time);
            }
        }
        _ => {}
    }
}

fn inspect(
    script: CueScript,
    config: EngineConfig,
    offset: Arc<OffsetStore>,
    at: f64,
) -> Result<()> {
    let transport = match script.duration {
        Some(duration) => ManualTransport::with_duration(duration),
        None => ManualTransport::new(),
    };
    let mut engine = SyncEngine::with_config(script, offset, Some(transport), config);
    engine.start();
    if let Some(transport) = engine.transport_mut() {
        transport.set_current_time(at);
    }
    let _ = engine.tick();

    println!("{}", serde_json::to_string_pretty(engine.snapshot())?);
    Ok(())
}

fn validate(script: &CueScript) -> Result<()> {
    let warnings = script.validate();
    for warning in &warnings {
        println!("warning: {warning}");
    }
    if !warnings.is_empty() {
        bail!("{} warning(s) in script", warnings.len());
    }
    println!(
        "ok: {} cues, {} status triggers, {} steps",
        script.cues.len(),
        script.status_triggers.len(),
        script.steps.len()
    );
    Ok(())
}

fn manage_offset(store: &OffsetStore, action: &OffsetCommand) {
    match action {
        OffsetCommand::Get => {}
        OffsetCommand::Set { seconds } => store.set(*seconds),
        OffsetCommand::Adjust { delta } => store.adjust(*delta),
        OffsetCommand::Reset => store.reset_to_default(),
        OffsetCommand::Zero => store.reset_to_zero(),
    }
    let marker = if store.is_default() { " (default)" } else { "" };
    println!("{:+.2}s{marker}", store.get());
}
