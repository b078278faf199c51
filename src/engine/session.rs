use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use super::listeners::{DisplayListener, Listeners, SubscriptionHandle};
use crate::entities::{Coordinates, DisplayEvent, SolvedRoute, Stop, StopSequence};
use crate::error::Error;

pub const DEFAULT_SOLVE_TIMEOUT: Duration = Duration::from_millis(15_000);
pub const DEFAULT_MAX_STOPS: usize = 2;

#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub solve_timeout: Duration,
    pub max_stops: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            solve_timeout: DEFAULT_SOLVE_TIMEOUT,
            max_stops: DEFAULT_MAX_STOPS,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    AwaitingOrigin,
    AwaitingDestination,
    RouteSolving,
    Inspecting,
}

/// Identifies one solve request. Outcomes carrying any other ticket than the
/// one the session waits for are dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SolveTicket(u64);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum Status {
    AwaitingOrigin,
    AwaitingDestination,
    RouteSolving {
        ticket: SolveTicket,
        deadline: DateTime<Utc>,
    },
    Inspecting {
        route: SolvedRoute,
    },
}

impl Status {
    pub fn state(&self) -> SessionState {
        match self {
            Self::AwaitingOrigin => SessionState::AwaitingOrigin,
            Self::AwaitingDestination => SessionState::AwaitingDestination,
            Self::RouteSolving { .. } => SessionState::RouteSolving,
            Self::Inspecting { .. } => SessionState::Inspecting,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SolveRequest {
    pub ticket: SolveTicket,
    pub stops: Vec<Stop>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub session_id: Uuid,
    pub status: Status,
    pub stops: Vec<Stop>,
}

/// Single-owner state machine turning taps and solve outcomes into display
/// events. Performs no I/O; the caller runs the solves it requests.
pub struct Session {
    pub id: Uuid,
    status: Status,
    stops: StopSequence,
    settings: Settings,
    listeners: Listeners,
    next_ticket: u64,
    reset_confirmed: bool,
}

impl Session {
    pub fn new(settings: Settings) -> Self {
        Self {
            id: Uuid::new_v4(),
            status: Status::AwaitingOrigin,
            stops: StopSequence::bounded(settings.max_stops),
            settings,
            listeners: Listeners::default(),
            next_ticket: 0,
            reset_confirmed: false,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn state(&self) -> SessionState {
        self.status.state()
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn stops(&self) -> &StopSequence {
        &self.stops
    }

    pub fn route(&self) -> Option<&SolvedRoute> {
        match &self.status {
            Status::Inspecting { route } => Some(route),
            _ => None,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            session_id: self.id,
            status: self.status.clone(),
            stops: self.stops.as_slice().to_vec(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn DisplayListener>) -> SubscriptionHandle {
        self.listeners.add(listener)
    }

    pub fn unsubscribe(&mut self, handle: SubscriptionHandle) -> bool {
        self.listeners.remove(handle)
    }

    /// Advances the session for a tap at `location`. Returns the solve to run
    /// when the tap completed the stop sequence.
    #[tracing::instrument(skip(self), fields(session_id = %self.id))]
    pub fn handle_tap(&mut self, location: Coordinates) -> Option<SolveRequest> {
        match &self.status {
            Status::AwaitingOrigin => {
                self.stops.clear();

                if let Err(err) = self.stops.add_stop(location) {
                    tracing::warn!("origin stop rejected: {}", err);
                    return None;
                }

                self.status = Status::AwaitingDestination;
                self.emit(DisplayEvent::OriginPlaced { location });

                None
            }
            Status::AwaitingDestination => {
                let placed = match self.stops.add_stop(location) {
                    Ok(_) => location,
                    Err(err) => {
                        tracing::debug!("extra stop absorbed: {}", err);
                        self.stops
                            .destination()
                            .map(|stop| stop.location)
                            .unwrap_or(location)
                    }
                };

                let stops: Vec<Stop> = self.stops.iter().take(2).cloned().collect();
                let ticket = self.issue_ticket();

                self.status = Status::RouteSolving {
                    ticket,
                    deadline: self.solve_deadline(),
                };
                self.emit(DisplayEvent::DestinationPlaced { location: placed });

                tracing::info!("requesting solve {:?} for {} stops", ticket, stops.len());

                Some(SolveRequest { ticket, stops })
            }
            Status::RouteSolving { .. } => {
                tracing::debug!("tap ignored while a solve is in flight");
                None
            }
            Status::Inspecting { route } => {
                let route = route.clone();
                let callout = route.callout_text();
                self.emit(DisplayEvent::InspectRequested {
                    location,
                    route,
                    callout,
                });

                None
            }
        }
    }

    /// Applies the outcome of the solve identified by `ticket`.
    #[tracing::instrument(skip(self, outcome), fields(session_id = %self.id))]
    pub fn complete_solve(&mut self, ticket: SolveTicket, outcome: Result<SolvedRoute, Error>) {
        let awaited = match &self.status {
            Status::RouteSolving { ticket: current, .. } => *current == ticket,
            _ => false,
        };

        if !awaited {
            tracing::debug!("discarding stale outcome of solve {:?}", ticket);
            return;
        }

        match outcome {
            Ok(route) => {
                tracing::info!("solve {:?} produced route {:?}", ticket, route.name);
                self.status = Status::Inspecting {
                    route: route.clone(),
                };
                self.emit(DisplayEvent::RouteReady { route });
            }
            Err(error) => {
                tracing::warn!("solve {:?} failed: {}", ticket, error);
                self.stops.clear();
                self.status = Status::AwaitingOrigin;
                self.emit(DisplayEvent::RouteFailed { error });
            }
        }
    }

    /// Emits the maneuver at `index` of the inspected route.
    #[tracing::instrument(skip(self), fields(session_id = %self.id))]
    pub fn select_direction(&mut self, index: usize) {
        let step = match &self.status {
            Status::Inspecting { route } => route.directions.get(index).cloned(),
            _ => None,
        };

        match step {
            Some(step) => self.emit(DisplayEvent::DirectionSelected { index, step }),
            None => tracing::debug!("no direction {} to select", index),
        }
    }

    /// Returns to `AwaitingOrigin`, dropping stops, route and any pending
    /// solve. Repeated resets emit a single `SessionReset`.
    #[tracing::instrument(skip(self), fields(session_id = %self.id))]
    pub fn reset(&mut self) {
        if self.reset_confirmed {
            tracing::debug!("session already reset");
            return;
        }

        self.stops.clear();
        self.status = Status::AwaitingOrigin;
        self.emit(DisplayEvent::SessionReset);
        self.reset_confirmed = true;
    }

    fn issue_ticket(&mut self) -> SolveTicket {
        let ticket = SolveTicket(self.next_ticket);
        self.next_ticket += 1;

        ticket
    }

    fn solve_deadline(&self) -> DateTime<Utc> {
        let now = Utc::now();

        chrono::Duration::from_std(self.settings.solve_timeout)
            .ok()
            .and_then(|timeout| now.checked_add_signed(timeout))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    fn emit(&mut self, event: DisplayEvent) {
        self.reset_confirmed = false;
        self.listeners.publish(&event);
    }
}
