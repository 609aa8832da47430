//! AC command handlers.
//!
//! Every subcommand runs against a short-lived [`Synchronizer`]: subscribe,
//! wait for the initial snapshot of every room, act, then unsubscribe.

use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use serde_json::{Map, Value, json};
use tabled::Tabled;
use tokio::sync::broadcast::error::RecvError;

use campus_api::{FirebaseClient, MemoryStore, RealtimeStore, TransportConfig};
use campus_core::{
    ConsoleConfig, CoreError, DeviceKey, DeviceRegistry, GroupSummary, ProjectionSnapshot,
    SyncEvent, Synchronizer, ToggleResult, aggregate,
};

use crate::cli::{AcArgs, AcCommand, GlobalOpts, OutputFormat};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util::{self, Target};

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct RoomRow {
    #[tabled(rename = "Room")]
    room: String,
    #[tabled(rename = "On")]
    on: String,
    #[tabled(rename = "Status")]
    status: String,
}

/// One unit of a room, as shown by `ac status ROOM`.
#[derive(Serialize)]
struct UnitState {
    room: String,
    unit: String,
    on: bool,
}

#[derive(Tabled)]
struct UnitRow {
    #[tabled(rename = "Unit")]
    unit: String,
    #[tabled(rename = "Power")]
    power: String,
}

/// Outcome of one write, plus the power the store echoed back.
#[derive(Serialize)]
struct ToggleOutcome {
    room: String,
    unit: String,
    desired: bool,
    result: ToggleResult,
    confirmed: Option<bool>,
}

#[derive(Tabled)]
struct ToggleRow {
    #[tabled(rename = "Unit")]
    unit: String,
    #[tabled(rename = "Requested")]
    requested: String,
    #[tabled(rename = "Result")]
    result: String,
    #[tabled(rename = "Now")]
    now: String,
}

fn room_row(summary: &GroupSummary, color: bool) -> RoomRow {
    RoomRow {
        room: summary.group.clone(),
        on: format!("{}/{}", summary.on, summary.total),
        status: output::status_label(summary.status, color),
    }
}

fn toggle_row(outcome: &ToggleOutcome, color: bool) -> ToggleRow {
    ToggleRow {
        unit: outcome.unit.clone(),
        requested: output::power_label(outcome.desired, color),
        result: match &outcome.result {
            ToggleResult::Ok => "ok".into(),
            ToggleResult::Failed(failure) => failure.to_string(),
        },
        now: outcome
            .confirmed
            .map_or_else(|| "-".into(), |on| output::power_label(on, color)),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    console: &ConsoleConfig,
    args: AcArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if global.demo {
        let store = demo_store(&console.registry);
        return run(store, console, args, global).await;
    }

    let realtime = console
        .realtime
        .as_ref()
        .ok_or_else(|| CliError::NotConfigured {
            service: "realtime".into(),
            flag: "realtime".into(),
            path: config::config_path().display().to_string(),
        })?;
    let store = FirebaseClient::new(
        realtime.url.clone(),
        realtime.secret.clone(),
        &TransportConfig::with_timeout(console.timeout),
    )?;
    run(store, console, args, global).await
}

/// An in-process store holding every registry unit, switched off.
fn demo_store(registry: &DeviceRegistry) -> MemoryStore {
    let tree: Map<String, Value> = registry
        .iter()
        .map(|(group, devices)| {
            let units: Map<String, Value> = devices
                .iter()
                .map(|d| (d.clone(), json!({ "status": "OFF" })))
                .collect();
            (group.to_owned(), Value::Object(units))
        })
        .collect();
    MemoryStore::with_tree(Value::Object(tree))
}

async fn run<S: RealtimeStore>(
    store: S,
    console: &ConsoleConfig,
    args: AcArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let sync = Synchronizer::new(store, console.registry.clone(), console.sync.clone());
    sync.start();

    let result = match wait_ready(&sync, args.wait, global).await {
        Ok(()) => execute(&sync, args, global, console.sync.write_timeout).await,
        Err(e) => Err(e),
    };
    sync.stop();
    result
}

async fn wait_ready<S: RealtimeStore>(
    sync: &Synchronizer<S>,
    wait_secs: u64,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let spinner = spinner(global, "Loading AC state...");
    let ready = tokio::time::timeout(Duration::from_secs(wait_secs), sync.ready()).await;
    spinner.finish_and_clear();
    match ready {
        Ok(result) => Ok(result?),
        Err(_) => Err(CliError::Timeout { seconds: wait_secs }),
    }
}

fn spinner(global: &GlobalOpts, message: &'static str) -> ProgressBar {
    if global.quiet || !matches!(global.output, OutputFormat::Table) {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

async fn execute<S: RealtimeStore>(
    sync: &Synchronizer<S>,
    args: AcArgs,
    global: &GlobalOpts,
    echo_wait: Duration,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);

    match args.command {
        AcCommand::Status { room: None } => {
            let out = render_rooms(&global.output, &sync.summary(), color);
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AcCommand::Status { room: Some(room) } => {
            let snap = sync.projection_snapshot();
            let units = snap.group(&room).ok_or(CoreError::UnknownGroup {
                group: room.clone(),
            })?;
            let states: Vec<UnitState> = units
                .iter()
                .map(|(unit, &on)| UnitState {
                    room: room.clone(),
                    unit: unit.clone(),
                    on,
                })
                .collect();
            let out = output::render_list(
                &global.output,
                &states,
                |s| UnitRow {
                    unit: s.unit.clone(),
                    power: output::power_label(s.on, color),
                },
                |s| format!("{}/{}\t{}", s.room, s.unit, if s.on { "ON" } else { "OFF" }),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AcCommand::On { target } => {
            let writes = switch(sync, &target, true).await?;
            report(sync, writes, true, echo_wait, global, color).await
        }
        AcCommand::Off { target } => {
            let writes = switch(sync, &target, false).await?;
            report(sync, writes, false, echo_wait, global, color).await
        }

        AcCommand::Toggle { target } => {
            let Target::Unit { room, unit } = util::parse_target(&target)? else {
                return Err(CliError::Validation {
                    field: "target".into(),
                    reason: "toggle flips a single unit: use ROOM/UNIT".into(),
                });
            };
            let desired = !sync
                .projection_snapshot()
                .power(&room, &unit)
                .ok_or_else(|| CoreError::UnknownDevice {
                    group: room.clone(),
                    device: unit.clone(),
                })?;
            let result = sync.flip(&room, &unit).await?;
            let writes = vec![(DeviceKey::new(room, unit), result)];
            report(sync, writes, desired, echo_wait, global, color).await
        }

        AcCommand::Watch => watch(sync, global, color).await,
    }
}

// ── Switching ───────────────────────────────────────────────────────

/// Write `on` to one unit or every unit of a room.
async fn switch<S: RealtimeStore>(
    sync: &Synchronizer<S>,
    target: &str,
    on: bool,
) -> Result<Vec<(DeviceKey, ToggleResult)>, CliError> {
    let writes = match util::parse_target(target)? {
        Target::Unit { room, unit } => {
            let result = sync.toggle(&room, &unit, on).await?;
            vec![(DeviceKey::new(room, unit), result)]
        }
        Target::Room(room) => sync
            .toggle_group(&room, on)
            .await?
            .into_iter()
            .map(|t| (DeviceKey::new(room.as_str(), t.device), t.result))
            .collect(),
    };
    Ok(writes)
}

/// Wait for the store to echo the successful writes, print one row per
/// write, and fail if any write failed.
async fn report<S: RealtimeStore>(
    sync: &Synchronizer<S>,
    writes: Vec<(DeviceKey, ToggleResult)>,
    desired: bool,
    echo_wait: Duration,
    global: &GlobalOpts,
    color: bool,
) -> Result<(), CliError> {
    let accepted: Vec<&DeviceKey> = writes
        .iter()
        .filter(|(_, result)| result.is_ok())
        .map(|(key, _)| key)
        .collect();
    let snap = await_echo(sync, &accepted, desired, echo_wait).await;

    let total = writes.len();
    let outcomes: Vec<ToggleOutcome> = writes
        .into_iter()
        .map(|(key, result)| ToggleOutcome {
            confirmed: snap.power(&key.group, &key.device),
            room: key.group,
            unit: key.device,
            desired,
            result,
        })
        .collect();
    let failed = outcomes.iter().filter(|o| !o.result.is_ok()).count();

    let out = output::render_list(
        &global.output,
        &outcomes,
        |o| toggle_row(o, color),
        |o| format!("{}/{}", o.room, o.unit),
    );
    output::print_output(&out, global.quiet);

    if failed > 0 {
        return Err(CliError::ToggleFailed { failed, total });
    }
    Ok(())
}

/// Wait until every key in `keys` shows `desired` in the projection, or
/// `limit` elapses. Returns the last snapshot seen.
async fn await_echo<S: RealtimeStore>(
    sync: &Synchronizer<S>,
    keys: &[&DeviceKey],
    desired: bool,
    limit: Duration,
) -> Arc<ProjectionSnapshot> {
    let mut stream = sync.watch_projection();
    let confirmed = |snap: &ProjectionSnapshot| {
        keys.iter()
            .all(|k| snap.power(&k.group, &k.device) == Some(desired))
    };

    let wait = async {
        loop {
            if confirmed(&stream.latest()) {
                return;
            }
            if stream.changed().await.is_none() {
                return;
            }
        }
    };
    if tokio::time::timeout(limit, wait).await.is_err() {
        tracing::debug!(units = keys.len(), "echo not seen before timeout");
    }
    stream.latest()
}

// ── Watch ───────────────────────────────────────────────────────────

async fn watch<S: RealtimeStore>(
    sync: &Synchronizer<S>,
    global: &GlobalOpts,
    color: bool,
) -> Result<(), CliError> {
    let mut stream = sync.watch_projection();
    let mut events = sync.events();

    output::print_output(
        &render_rooms(&global.output, &sync.summary(), color),
        global.quiet,
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = stream.changed() => {
                let Some(snap) = changed else { break };
                let out = render_rooms(&global.output, &aggregate::summarize(&snap), color);
                output::print_output(&out, global.quiet);
            }
            event = events.recv() => match event {
                Ok(SyncEvent::SubscriptionFailed { group, message }) => {
                    eprintln!("{group}: subscription lost: {message}");
                }
                Ok(SyncEvent::Resubscribing { group, attempt, delay }) => {
                    eprintln!("{group}: resubscribing (attempt {attempt}) in {}s", delay.as_secs());
                }
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            },
        }
    }
    Ok(())
}

fn render_rooms(format: &OutputFormat, rows: &[GroupSummary], color: bool) -> String {
    output::render_list(
        format,
        rows,
        |s| room_row(s, color),
        |s| format!("{}\t{}/{}\t{}", s.group, s.on, s.total, s.status),
    )
}
