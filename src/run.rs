//! Application execution logic.
//!
//! This module builds the configured snapshot source, dispatches the selected
//! command, and runs the `watch` reload loop.

use std::io::Write;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::signal;
use tokio::time::MissedTickBehavior;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::IntervalStream;

use net_rewind::change::Change;
use net_rewind::config::{Mode, Position, SourceConfig, ValidatedConfig};
use net_rewind::observation::{Observation, ObservationKind, Timestamp};
use net_rewind::source::{
    ApiSource, FileSource, FilteredSource, ReqwestClient, SnapshotSource, SourceError,
};
use net_rewind::timeline::{Comparison, Selection, Timeline};

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for runtime execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// The source could not deliver data.
    #[error("Failed to retrieve data: {0}")]
    Retrieval(#[from] SourceError),

    /// Output could not be serialized.
    #[error("Failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),

    /// Output could not be written.
    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),

    /// The watch tick stream ended.
    #[error("Watch stream terminated unexpectedly")]
    StreamTerminated,
}

/// Executes the configured command.
///
/// # Errors
///
/// Returns an error if the source fails in a one-shot command, or if the
/// output cannot be written. Reload failures in `watch` mode are logged and
/// never returned.
#[cfg(not(tarpaulin_include))]
pub async fn execute(config: ValidatedConfig) -> Result<(), RunError> {
    let ValidatedConfig {
        source,
        hours,
        filter,
        mode,
        ..
    } = config;

    if !filter.is_empty() {
        tracing::debug!("Device filter active: {filter:?}");
    }

    let mut stdout = std::io::stdout();
    match source {
        SourceConfig::Api { url, headers } => {
            let api = ApiSource::new(ReqwestClient::new(), url).with_headers(headers);
            dispatch(&FilteredSource::new(api, filter), hours, mode, &mut stdout).await
        }
        SourceConfig::File(path) => {
            tracing::debug!("Reading observations from {}", path.display());
            let file = FileSource::new(path);
            dispatch(&FilteredSource::new(file, filter), hours, mode, &mut stdout).await
        }
    }
}

/// Runs one mode against a source, writing JSON results to `out`.
async fn dispatch<S: SnapshotSource, W: Write>(
    source: &S,
    hours: u32,
    mode: Mode,
    out: &mut W,
) -> Result<(), RunError> {
    match mode {
        Mode::Show(position) => {
            if let Some(selection) = show(source, hours, position).await? {
                write_json(out, &selection)?;
            }
            Ok(())
        }
        Mode::Compare {
            first,
            second,
            kind,
        } => {
            let differences = source.compare(&first, &second, kind).await?;
            log_compare_summary(&first, &second, kind, differences.len());
            write_json(out, &differences)
        }
        Mode::Devices => {
            let devices = source.devices().await?;
            tracing::info!("{} device(s) known", devices.len());
            write_json(out, &devices)
        }
        Mode::Watch { interval } => run_watch_loop(source, hours, interval).await,
    }
}

/// Loads the window and selects one position.
///
/// Returns `None` (after a warning) when the window is empty or the position
/// is out of range.
async fn show<S: SnapshotSource>(
    source: &S,
    hours: u32,
    position: Position,
) -> Result<Option<Selection>, RunError> {
    let timeline = Timeline::new(source.timeline(hours).await?);
    log_window(&timeline, hours);

    let Some(index) = resolve_index(&timeline, position) else {
        tracing::warn!(
            "No instant at {} in a window of {} instant(s)",
            describe_position(position),
            timeline.len()
        );
        return Ok(None);
    };

    let selection = timeline.select(index);
    if let Some(ref selection) = selection {
        report_selection(selection);
    }
    Ok(selection)
}

/// Maps a requested position onto a timeline index.
fn resolve_index(timeline: &Timeline, position: Position) -> Option<usize> {
    match position {
        Position::Latest => timeline.latest_index(),
        Position::Index(index) => (index < timeline.len()).then_some(index),
        Position::Percent(percent) => timeline.index_for_position(percent),
    }
}

fn describe_position(position: Position) -> String {
    match position {
        Position::Latest => "the latest position".to_string(),
        Position::Index(index) => format!("index {index}"),
        Position::Percent(percent) => format!("position {percent}%"),
    }
}

fn log_window(timeline: &Timeline, hours: u32) {
    match (timeline.first(), timeline.last()) {
        (Some(first), Some(last)) => tracing::info!(
            "Loaded {} observation(s) across {} instant(s) ({first} .. {last})",
            timeline.observations().len(),
            timeline.len(),
        ),
        _ => tracing::warn!("No observations in the last {hours} hour(s)"),
    }
}

fn log_compare_summary(first: &Timestamp, second: &Timestamp, kind: ObservationKind, count: usize) {
    tracing::info!("{kind} differences between {first} and {second}: {count} device(s)");
}

/// Logs the state summary and change lines of a selection.
fn report_selection(selection: &Selection) {
    tracing::info!(
        "Instant {} (index {}): {} device(s)",
        selection.instant,
        selection.index,
        selection.state.len()
    );

    match selection.comparison {
        Comparison::FirstSnapshot => {
            tracing::info!("First snapshot of the window, no changes to compute");
        }
        Comparison::Changes(ref changes) if changes.is_empty() => {
            tracing::info!("No changes since the previous instant");
        }
        Comparison::Changes(ref changes) => log_changes(changes),
    }
}

fn log_changes(changes: &[Change]) {
    for change in changes {
        tracing::info!(
            "{kind} {device}: {description}",
            kind = change.kind,
            device = change.device_id,
            description = change.description,
        );
    }
}

fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> Result<(), RunError> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

// ============================================================================
// Watch
// ============================================================================

/// Outcome of one `watch` reload.
#[derive(Debug, PartialEq)]
enum Refresh {
    /// The latest instant moved; carries the selection at the new latest instant.
    Advanced(Box<Selection>),
    /// The window reloaded but its latest instant was already reported.
    Unchanged,
    /// The reload failed and the previous timeline stays in effect.
    Stale,
}

/// Timeline kept across `watch` reloads.
#[derive(Debug, Default)]
struct WatchState {
    timeline: Timeline,
    reported: Option<Timestamp>,
}

impl WatchState {
    /// Applies a reload result, keeping the previous timeline on error.
    fn apply(&mut self, result: Result<Vec<Observation>, SourceError>) -> Refresh {
        let observations = match result {
            Ok(observations) => observations,
            Err(e) => {
                tracing::warn!(
                    "Reload failed, keeping previous timeline ({} instant(s)): {e}",
                    self.timeline.len()
                );
                return Refresh::Stale;
            }
        };

        self.timeline = Timeline::new(observations);
        let Some(selection) = self
            .timeline
            .latest_index()
            .and_then(|index| self.timeline.select(index))
        else {
            return Refresh::Unchanged;
        };

        if self.reported.as_ref() == Some(&selection.instant) {
            return Refresh::Unchanged;
        }
        self.reported = Some(selection.instant.clone());
        Refresh::Advanced(Box::new(selection))
    }
}

/// Reloads the window every `interval` until a shutdown signal arrives.
///
/// Excluded from coverage - requires signal handling.
#[cfg(not(tarpaulin_include))]
async fn run_watch_loop<S: SnapshotSource>(
    source: &S,
    hours: u32,
    interval: Duration,
) -> Result<(), RunError> {
    tracing::info!(
        "Watching the last {hours} hour(s), reloading every {}s",
        interval.as_secs()
    );

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut ticks = IntervalStream::new(ticker);

    let mut state = WatchState::default();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;

            () = &mut shutdown => {
                tracing::info!("Shutdown signal received, stopping...");
                return Ok(());
            }

            tick = ticks.next() => {
                if tick.is_none() {
                    return Err(RunError::StreamTerminated);
                }
                let result = source.timeline(hours).await;
                match state.apply(result) {
                    Refresh::Advanced(selection) => report_selection(&selection),
                    Refresh::Unchanged => tracing::debug!("No new instant"),
                    Refresh::Stale => {}
                }
            }
        }
    }
}

/// Returns a future that completes when a shutdown signal is received.
///
/// If a handler cannot be installed, that signal is never delivered.
///
/// Excluded from coverage - requires OS signal handling.
#[cfg(not(tarpaulin_include))]
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
