mod listeners;
mod session;
mod session_api;

pub use listeners::{DisplayListener, Listeners, SubscriptionHandle, EVENT_BUFFER};
pub use session::{
    Session, SessionState, Settings, Snapshot, SolveRequest, SolveTicket, Status,
    DEFAULT_MAX_STOPS, DEFAULT_SOLVE_TIMEOUT,
};

use async_channel::{Receiver, Sender};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use uuid::Uuid;

use crate::{
    api::DynSolver,
    entities::{Coordinates, DisplayEvent, SolvedRoute},
    error::{engine_stopped_error, solver_error, timeout_error, Error},
};

enum Command {
    Tap(Coordinates),
    Reset,
    SelectDirection(usize),
    Subscribe(Box<dyn DisplayListener>, oneshot::Sender<SubscriptionHandle>),
    Unsubscribe(SubscriptionHandle),
    Snapshot(oneshot::Sender<Snapshot>),
    Completion {
        ticket: SolveTicket,
        outcome: Result<SolvedRoute, Error>,
    },
}

struct InFlight {
    ticket: SolveTicket,
    deadline: Instant,
    handle: JoinHandle<()>,
}

/// Drives one `Session` on a dedicated task. Commands and solve completions
/// share one queue and are applied one at a time in arrival order.
pub struct Engine {
    pub id: Uuid,
    commands: Sender<Command>,
}

impl Engine {
    /// Spawns the session task. Must be called from within a tokio runtime.
    #[tracing::instrument(name = "Engine::new", skip_all)]
    pub fn new(solver: DynSolver, settings: Settings) -> Self {
        let (commands, inbox) = async_channel::unbounded();
        let session = Session::new(settings);
        let id = session.id;

        tokio::spawn(run(session, solver, inbox, commands.clone()));

        tracing::info!("started session {}", id);

        Self { id, commands }
    }

    /// Subscribes a fresh bounded channel and returns its receiving end. The
    /// subscription is dropped once `EVENT_BUFFER` events are left unread.
    pub async fn events(&self) -> Result<Receiver<DisplayEvent>, Error> {
        let (tx, rx) = async_channel::bounded(EVENT_BUFFER);
        self.request(|reply| Command::Subscribe(Box::new(tx), reply))
            .await?;

        Ok(rx)
    }

    fn send(&self, command: Command) {
        if self.commands.try_send(command).is_err() {
            tracing::warn!("session {} is no longer running", self.id);
        }
    }

    async fn request<T, F>(&self, command: F) -> Result<T, Error>
    where
        F: FnOnce(oneshot::Sender<T>) -> Command,
    {
        let (reply, response) = oneshot::channel();

        self.commands
            .send(command(reply))
            .await
            .map_err(|_| engine_stopped_error())?;

        response.await.map_err(|_| engine_stopped_error())
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.commands.close();
    }
}

#[tracing::instrument(name = "Engine::run", skip_all, fields(session_id = %session.id))]
async fn run(
    mut session: Session,
    solver: DynSolver,
    inbox: Receiver<Command>,
    loopback: Sender<Command>,
) {
    let mut in_flight: Option<InFlight> = None;

    loop {
        let deadline = in_flight
            .as_ref()
            .map(|solve| solve.deadline)
            .unwrap_or_else(Instant::now);

        tokio::select! {
            command = inbox.recv() => {
                let command = match command {
                    Ok(command) => command,
                    Err(_) => break,
                };

                match command {
                    Command::Tap(location) => {
                        if let Some(request) = session.handle_tap(location) {
                            let timeout = session.settings().solve_timeout;
                            in_flight = Some(spawn_solve(
                                solver.clone(),
                                request,
                                timeout,
                                loopback.clone(),
                            ));
                        }
                    }
                    Command::Reset => {
                        session.reset();
                        if let Some(solve) = in_flight.take() {
                            solve.handle.abort();
                        }
                    }
                    Command::SelectDirection(index) => session.select_direction(index),
                    Command::Subscribe(listener, reply) => {
                        let handle = session.subscribe(listener);
                        if reply.send(handle).is_err() {
                            session.unsubscribe(handle);
                        }
                    }
                    Command::Unsubscribe(handle) => {
                        session.unsubscribe(handle);
                    }
                    Command::Snapshot(reply) => {
                        let _ = reply.send(session.snapshot());
                    }
                    Command::Completion { ticket, outcome } => {
                        if in_flight.as_ref().map(|solve| solve.ticket) == Some(ticket) {
                            in_flight = None;
                        }
                        session.complete_solve(ticket, outcome);
                    }
                }
            }
            _ = tokio::time::sleep_until(deadline), if in_flight.is_some() => {
                if let Some(solve) = in_flight.take() {
                    tracing::warn!("solve {:?} passed its deadline", solve.ticket);
                    solve.handle.abort();
                    session.complete_solve(solve.ticket, Err(timeout_error()));
                }
            }
        }
    }

    if let Some(solve) = in_flight {
        solve.handle.abort();
    }

    tracing::info!("session stopped");
}

fn spawn_solve(
    solver: DynSolver,
    request: SolveRequest,
    timeout: Duration,
    loopback: Sender<Command>,
) -> InFlight {
    let SolveRequest { ticket, stops } = request;

    let deadline = Instant::now()
        .checked_add(timeout)
        .unwrap_or_else(|| Instant::now() + DEFAULT_SOLVE_TIMEOUT);

    let handle = tokio::spawn(async move {
        let outcome = match AssertUnwindSafe(solver.solve(stops)).catch_unwind().await {
            Ok(Ok(route)) => Ok(route),
            Ok(Err(err)) if err.is_solver_error() => Err(err),
            Ok(Err(err)) => Err(solver_error(err.message)),
            Err(_) => {
                tracing::warn!("route solver panicked during solve {:?}", ticket);
                Err(solver_error("route solver panicked"))
            }
        };

        if loopback
            .send(Command::Completion { ticket, outcome })
            .await
            .is_err()
        {
            tracing::debug!("session gone before solve {:?} completed", ticket);
        }
    });

    InFlight {
        ticket,
        deadline,
        handle,
    }
}
