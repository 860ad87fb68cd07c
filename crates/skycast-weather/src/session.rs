//! Forecast screen state.
//!
//! [`ForecastSession`] owns one screen activation: it reconciles network
//! transitions, gateway fetch completions, and the offline slot into the
//! [`ForecastViewState`] the screen renders. All state changes happen on a
//! single owner task; network observation and fetches run elsewhere and
//! report in through one event channel. Consumers subscribe through a
//! `watch` channel and dropping the session tears the task down.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use crate::cache::ForecastCache;
use crate::error::{GatewayError, UnavailableReason};
use crate::gateway::WeatherGateway;
use crate::geocode;
use crate::types::{ForecastSummary, NetworkStatus, OriginMode, RequestContext};

/// What the forecast screen should currently display.
#[derive(Debug, Clone, PartialEq)]
pub enum ForecastViewState {
    Loading,
    Live(ForecastSummary),
    CachedOffline {
        summary: ForecastSummary,
        captured_at: DateTime<Utc>,
    },
    Unavailable(UnavailableReason),
}

/// Work the driver performs on behalf of the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Start a gateway fetch under the given generation.
    Fetch(u64),
    /// Resolve the offline fallback from the cache slot.
    Fallback,
}

/// Follow-up for a completed fetch.
#[derive(Debug)]
enum Disposition {
    /// Superseded generation; nothing changes.
    Ignored,
    /// State updated, nothing else to do.
    Publish,
    /// State updated and the summary should be written through.
    Persist(ForecastSummary),
    /// Consult the cache slot.
    RunFallback,
}

/// Pure transition logic for one screen activation.
///
/// Fetch attempts are numbered; a completion only counts while its
/// generation is the in-flight one, which keeps results that arrive after
/// the screen moved on from clobbering newer state.
struct Reconciler {
    origin: OriginMode,
    state: ForecastViewState,
    next_generation: u64,
    inflight: Option<u64>,
}

impl Reconciler {
    fn new(origin: OriginMode) -> Self {
        Self {
            origin,
            state: ForecastViewState::Loading,
            next_generation: 0,
            inflight: None,
        }
    }

    fn begin_fetch(&mut self) -> Command {
        self.next_generation += 1;
        self.inflight = Some(self.next_generation);
        Command::Fetch(self.next_generation)
    }

    /// Command to run when the screen activates. Favorite and map openings
    /// fetch immediately; the current-location screen waits for the first
    /// network transition.
    fn on_activate(&mut self) -> Option<Command> {
        match self.origin {
            OriginMode::CurrentLocation => None,
            OriginMode::SavedFavorite | OriginMode::MapSelection => Some(self.begin_fetch()),
        }
    }

    /// React to a network transition. Repeated identical transitions are
    /// harmless: each triggers at most one fetch attempt.
    fn on_network(&mut self, status: NetworkStatus) -> Option<Command> {
        if self.origin != OriginMode::CurrentLocation {
            return None;
        }

        match status {
            NetworkStatus::Online => match self.state {
                // A live forecast is already fresher than anything a
                // refetch would race against; stay put.
                ForecastViewState::Live(_) => None,
                _ if self.inflight.is_some() => None,
                _ => Some(self.begin_fetch()),
            },
            NetworkStatus::Offline => match self.state {
                // Covers a pending fetch too: show the fallback now and let
                // a later completion win if one still lands.
                ForecastViewState::Loading => Some(Command::Fallback),
                ForecastViewState::Live(_)
                | ForecastViewState::CachedOffline { .. }
                | ForecastViewState::Unavailable(_) => None,
            },
            NetworkStatus::Unknown => None,
        }
    }

    fn on_fetch_done(
        &mut self,
        generation: u64,
        outcome: Result<ForecastSummary, GatewayError>,
    ) -> Disposition {
        if self.inflight != Some(generation) {
            return Disposition::Ignored;
        }
        self.inflight = None;

        match outcome {
            Ok(summary) => {
                self.state = ForecastViewState::Live(summary.clone());
                if self.origin.writes_through() {
                    Disposition::Persist(summary)
                } else {
                    Disposition::Publish
                }
            }
            Err(_) => {
                if self.origin == OriginMode::CurrentLocation {
                    Disposition::RunFallback
                } else {
                    self.state = ForecastViewState::Unavailable(UnavailableReason::FetchFailed);
                    Disposition::Publish
                }
            }
        }
    }

    /// Resolve the offline/failure fallback from the cache slot contents.
    fn apply_fallback(&mut self, cached: Option<ForecastSummary>) {
        self.state = match cached {
            Some(summary) => {
                let captured_at = summary.captured_at;
                ForecastViewState::CachedOffline {
                    summary,
                    captured_at,
                }
            }
            None => ForecastViewState::Unavailable(UnavailableReason::NoDataAvailable),
        };
    }
}

/// Events marshalled onto the owner task.
#[derive(Debug)]
enum SessionEvent {
    Network(NetworkStatus),
    FetchDone {
        generation: u64,
        outcome: Result<ForecastSummary, GatewayError>,
    },
}

/// One forecast screen activation.
///
/// Lives as long as the screen is visible; dropping it (or calling
/// [`deactivate`](Self::deactivate)) cancels the owner task. In-flight
/// fetches are not cancelled, their completions just have nowhere to go.
pub struct ForecastSession {
    states: watch::Receiver<ForecastViewState>,
    cancel: CancellationToken,
}

impl ForecastSession {
    /// Spawn the owner task for a screen activation.
    ///
    /// `network` is the transition stream from a started [`NetworkMonitor`]
    /// (or any equivalent signal).
    ///
    /// [`NetworkMonitor`]: crate::monitor::NetworkMonitor
    pub fn activate(
        ctx: RequestContext,
        gateway: Arc<dyn WeatherGateway>,
        cache: Arc<ForecastCache>,
        mut network: mpsc::Receiver<NetworkStatus>,
    ) -> Self {
        let (state_tx, state_rx) = watch::channel(ForecastViewState::Loading);
        let (event_tx, event_rx) = mpsc::channel(16);
        let cancel = CancellationToken::new();

        // Forward network transitions onto the owner task's event channel.
        let forward_tx = event_tx.clone();
        let forward_cancel = cancel.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = forward_cancel.cancelled() => break,
                    status = network.recv() => match status {
                        Some(status) => {
                            if forward_tx.send(SessionEvent::Network(status)).await.is_err() {
                                break;
                            }
                        }
                        None => break,
                    },
                }
            }
        });

        tokio::spawn(drive(
            ctx,
            gateway,
            cache,
            event_tx,
            event_rx,
            state_tx,
            cancel.clone(),
        ));

        Self {
            states: state_rx,
            cancel,
        }
    }

    /// Subscribe to view-state transitions.
    pub fn states(&self) -> watch::Receiver<ForecastViewState> {
        self.states.clone()
    }

    /// The state the screen should currently render.
    pub fn current(&self) -> ForecastViewState {
        self.states.borrow().clone()
    }

    /// Tear the session down explicitly.
    pub fn deactivate(self) {}
}

impl Drop for ForecastSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn drive(
    ctx: RequestContext,
    gateway: Arc<dyn WeatherGateway>,
    cache: Arc<ForecastCache>,
    event_tx: mpsc::Sender<SessionEvent>,
    mut events: mpsc::Receiver<SessionEvent>,
    states: watch::Sender<ForecastViewState>,
    cancel: CancellationToken,
) {
    let mut machine = Reconciler::new(ctx.origin);

    if let Some(Command::Fetch(generation)) = machine.on_activate() {
        spawn_fetch(&ctx, &gateway, &event_tx, generation);
    }

    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => break,
            event = events.recv() => match event {
                Some(event) => event,
                None => break,
            },
        };

        match event {
            SessionEvent::Network(status) => {
                tracing::debug!(?status, "Network transition");
                match machine.on_network(status) {
                    Some(Command::Fetch(generation)) => {
                        spawn_fetch(&ctx, &gateway, &event_tx, generation);
                    }
                    Some(Command::Fallback) => {
                        machine.apply_fallback(cache.get());
                        publish(&states, &machine);
                    }
                    None => {}
                }
            }
            SessionEvent::FetchDone {
                generation,
                outcome,
            } => {
                if let Err(e) = &outcome {
                    tracing::warn!("Forecast fetch failed: {}", e);
                }
                match machine.on_fetch_done(generation, outcome) {
                    Disposition::Ignored => {
                        tracing::debug!(generation, "Ignoring superseded fetch result");
                    }
                    Disposition::Publish => publish(&states, &machine),
                    Disposition::Persist(summary) => {
                        publish(&states, &machine);
                        // Write-through failures never block the live view.
                        if let Err(e) = cache.put(&summary) {
                            tracing::warn!("Failed to persist forecast slot: {}", e);
                        }
                    }
                    Disposition::RunFallback => {
                        machine.apply_fallback(cache.get());
                        publish(&states, &machine);
                    }
                }
            }
        }
    }
}

fn publish(states: &watch::Sender<ForecastViewState>, machine: &Reconciler) {
    let _ = states.send(machine.state.clone());
}

fn spawn_fetch(
    ctx: &RequestContext,
    gateway: &Arc<dyn WeatherGateway>,
    events: &mpsc::Sender<SessionEvent>,
    generation: u64,
) {
    let ctx = ctx.clone();
    let gateway = gateway.clone();
    let events = events.clone();

    tokio::spawn(async move {
        let outcome = fetch_named(&ctx, gateway.as_ref()).await;
        let _ = events
            .send(SessionEvent::FetchDone {
                generation,
                outcome,
            })
            .await;
    });
}

/// Fetch a summary and resolve its display name: the context's place name
/// when one was carried in, else reverse geocoding, else raw coordinates.
async fn fetch_named(
    ctx: &RequestContext,
    gateway: &dyn WeatherGateway,
) -> Result<ForecastSummary, GatewayError> {
    let coords = ctx.coordinates;
    let mut summary = gateway.fetch(coords.latitude, coords.longitude).await?;

    summary.location_name = match &ctx.place_name {
        Some(name) => name.clone(),
        None => geocode::reverse_geocode(coords.latitude, coords.longitude)
            .await
            .unwrap_or_else(|| coords.label()),
    };

    Ok(summary)
}
