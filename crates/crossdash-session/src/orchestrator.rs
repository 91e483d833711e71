//! Async driver for [`SessionMachine`].
//!
//! The [`Orchestrator`] owns the machine and runs one cooperative loop: it
//! spawns capability calls onto a `JoinSet`, feeds their settlements, reveal
//! signals and countdown ticks back into the machine, and publishes a
//! [`SessionSnapshot`] after every transition.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use crossdash_resolver::{AddressResolver, ResolutionErrorKind};
use crossdash_routing::{compute_route, RoutingCapability, RoutingErrorKind};
use tokio::sync::{mpsc, watch};
use tokio::task::{self, JoinError, JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use crate::advisory::RevealSignal;
use crate::countdown::CountdownScheduler;
use crate::location::{LocationError, LocationProvider};
use crate::machine::{Effect, SessionEvent, SessionMachine, SessionSnapshot};
use crate::map::{MapView, DEFAULT_ZOOM};

const REVEAL_CHANNEL_CAPACITY: usize = 16;

/// The injected collaborators of a session.
#[derive(Clone)]
pub struct Capabilities {
    pub location: Arc<dyn LocationProvider>,
    pub resolver: Arc<dyn AddressResolver>,
    pub routing: Arc<dyn RoutingCapability>,
    pub map: Arc<dyn MapView>,
}

/// Which capability call a spawned task carries.
#[derive(Debug, Clone, Copy)]
enum Call {
    Location,
    Resolution,
    Route { generation: u64 },
}

impl Call {
    /// The settlement applied when the task died without producing one.
    fn settle_aborted(self, reason: &JoinError) -> SessionEvent {
        match self {
            Call::Location => SessionEvent::LocationSettled {
                result: Err(LocationError::Unknown(reason.to_string())),
                at: Utc::now(),
            },
            Call::Resolution => {
                SessionEvent::ResolutionSettled(Err(ResolutionErrorKind::NetworkFailure))
            }
            Call::Route { generation } => SessionEvent::RouteSettled {
                generation,
                result: Err(RoutingErrorKind::ProviderError),
            },
        }
    }
}

pub struct Orchestrator {
    id: Uuid,
    caps: Capabilities,
    machine: SessionMachine,
    countdown: CountdownScheduler,
    eta_rx: Option<watch::Receiver<Option<u32>>>,
    tasks: JoinSet<SessionEvent>,
    in_flight: HashMap<task::Id, Call>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
}

impl Orchestrator {
    /// Creates an idle session and the receiver its snapshots are published on.
    #[must_use]
    pub fn new(caps: Capabilities, eta_tick: Duration) -> (Self, watch::Receiver<SessionSnapshot>) {
        let (snapshot_tx, snapshot_rx) = watch::channel(SessionSnapshot::default());
        let orchestrator = Self {
            id: Uuid::new_v4(),
            caps,
            machine: SessionMachine::new(),
            countdown: CountdownScheduler::new(eta_tick),
            eta_rx: None,
            tasks: JoinSet::new(),
            in_flight: HashMap::new(),
            snapshot_tx,
        };
        (orchestrator, snapshot_rx)
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Runs the session until `shutdown` fires or nothing further can happen
    /// (reveal channel closed, no call in flight, countdown settled).
    ///
    /// Teardown cancels the countdown and aborts in-flight calls; their
    /// results are never applied. Returns the final snapshot.
    pub async fn run(
        self,
        reveals: mpsc::Receiver<RevealSignal>,
        shutdown: CancellationToken,
    ) -> SessionSnapshot {
        let span = tracing::info_span!("session", id = %self.id);
        self.drive(reveals, shutdown).instrument(span).await
    }

    async fn drive(
        mut self,
        mut reveals: mpsc::Receiver<RevealSignal>,
        shutdown: CancellationToken,
    ) -> SessionSnapshot {
        tracing::info!("session started");
        self.dispatch(SessionEvent::Start);
        let mut reveals_open = true;

        loop {
            if !reveals_open && self.tasks.is_empty() && self.eta_rx.is_none() {
                tracing::debug!("session quiescent");
                break;
            }

            tokio::select! {
                biased;

                () = shutdown.cancelled() => {
                    tracing::info!("session shutdown requested");
                    break;
                }

                Some(joined) = self.tasks.join_next_with_id(), if !self.tasks.is_empty() => {
                    self.settle(joined);
                }

                signal = reveals.recv(), if reveals_open => {
                    match signal {
                        Some(signal) => self.dispatch(SessionEvent::Reveal(signal)),
                        None => {
                            tracing::debug!("reveal channel closed");
                            reveals_open = false;
                        }
                    }
                }

                tick = next_eta(&mut self.eta_rx) => {
                    match tick {
                        Some(eta) => self.dispatch(SessionEvent::EtaTick(eta)),
                        None => self.eta_rx = None,
                    }
                }
            }
        }

        self.countdown.cancel();
        self.tasks.abort_all();
        self.in_flight.clear();
        let snapshot = self.machine.snapshot().clone();
        tracing::info!(phase = %snapshot.phase, "session ended");
        snapshot
    }

    fn settle(&mut self, joined: Result<(task::Id, SessionEvent), JoinError>) {
        match joined {
            Ok((id, event)) => {
                self.in_flight.remove(&id);
                self.dispatch(event);
            }
            Err(e) => {
                let call = self.in_flight.remove(&e.id());
                tracing::error!(error = %e, call = ?call, "session task failed");
                if let Some(call) = call {
                    self.dispatch(call.settle_aborted(&e));
                }
            }
        }
    }

    fn spawn_call<F>(&mut self, call: Call, future: F)
    where
        F: std::future::Future<Output = SessionEvent> + Send + 'static,
    {
        let handle = self.tasks.spawn(future.in_current_span());
        self.in_flight.insert(handle.id(), call);
    }

    fn dispatch(&mut self, event: SessionEvent) {
        for effect in self.machine.handle(event) {
            self.execute(effect);
        }

        let latest = self.machine.snapshot();
        self.snapshot_tx.send_if_modified(|current| {
            if current == latest {
                false
            } else {
                current.clone_from(latest);
                true
            }
        });
    }

    fn execute(&mut self, effect: Effect) {
        match effect {
            Effect::AcquireLocation => {
                let location = Arc::clone(&self.caps.location);
                self.spawn_call(Call::Location, async move {
                    let result = location.acquire().await;
                    SessionEvent::LocationSettled {
                        result,
                        at: Utc::now(),
                    }
                });
            }
            Effect::Resolve(at) => {
                let resolver = Arc::clone(&self.caps.resolver);
                self.spawn_call(Call::Resolution, async move {
                    let result = resolver.resolve(at).await.map_err(|e| {
                        tracing::error!(error = %e, "resolver call failed");
                        e.kind()
                    });
                    SessionEvent::ResolutionSettled(result)
                });
            }
            Effect::ShowUser(at) => {
                self.caps.map.center_on(at, DEFAULT_ZOOM);
                self.caps.map.show_marker(at);
            }
            Effect::StartCountdown(initial) => {
                self.eta_rx = Some(self.countdown.start(initial));
            }
            Effect::ComputeRoute {
                generation,
                origin,
                destination,
            } => {
                let routing = Arc::clone(&self.caps.routing);
                self.spawn_call(Call::Route { generation }, async move {
                    let result = compute_route(routing.as_ref(), origin, destination)
                        .await
                        .map_err(|e| {
                            tracing::warn!(generation, error = %e, "routing call failed");
                            e.kind()
                        });
                    SessionEvent::RouteSettled { generation, result }
                });
            }
            Effect::RenderRoute(route) => {
                self.caps.map.draw_route(&route.path);
                self.caps.map.fit_bounds(&route.bounds);
            }
        }
    }
}

/// Next countdown value, or `None` once the countdown has settled.
/// Pends forever while no countdown is running.
async fn next_eta(rx: &mut Option<watch::Receiver<Option<u32>>>) -> Option<Option<u32>> {
    let Some(rx) = rx else {
        return std::future::pending().await;
    };
    match rx.changed().await {
        Ok(()) => Some(*rx.borrow_and_update()),
        Err(_) => None,
    }
}

/// A session running on its own task.
pub struct SessionHandle {
    id: Uuid,
    reveal_tx: mpsc::Sender<RevealSignal>,
    snapshot_rx: watch::Receiver<SessionSnapshot>,
    shutdown: CancellationToken,
    task: JoinHandle<SessionSnapshot>,
}

impl SessionHandle {
    /// Spawns a new session. Must be called from within a Tokio runtime.
    #[must_use]
    pub fn spawn(caps: Capabilities, eta_tick: Duration) -> Self {
        let (orchestrator, snapshot_rx) = Orchestrator::new(caps, eta_tick);
        let id = orchestrator.id();
        let (reveal_tx, reveal_rx) = mpsc::channel(REVEAL_CHANNEL_CAPACITY);
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(orchestrator.run(reveal_rx, shutdown.clone()));
        Self {
            id,
            reveal_tx,
            snapshot_rx,
            shutdown,
            task,
        }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Forwards a reveal signal. Returns `false` if the session has ended.
    pub async fn reveal(&self, signal: RevealSignal) -> bool {
        self.reveal_tx.send(signal).await.is_ok()
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// A receiver for following snapshot changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Tears the session down and returns its final snapshot.
    ///
    /// # Errors
    ///
    /// Returns the [`JoinError`] if the session task panicked.
    pub async fn shutdown(self) -> Result<SessionSnapshot, JoinError> {
        self.shutdown.cancel();
        self.task.await
    }
}
