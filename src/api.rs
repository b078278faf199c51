use async_trait::async_trait;
use std::sync::Arc;

use crate::engine::{Snapshot, SubscriptionHandle};
use crate::engine::{DisplayListener, SessionState};
use crate::entities::{Coordinates, SolvedRoute, Stop};
use crate::error::Error;

/// External service computing a route through an ordered stop sequence.
#[async_trait]
pub trait RouteSolver {
    async fn solve(&self, stops: Vec<Stop>) -> Result<SolvedRoute, Error>;
}

pub type DynSolver = Arc<dyn RouteSolver + Send + Sync>;

/// Tap-driven route session. Taps and resets never fail; errors are reported
/// to listeners as display events.
#[async_trait]
pub trait SessionAPI {
    async fn handle_tap(&self, location: Coordinates);
    async fn reset(&self);
    async fn select_direction(&self, index: usize);
    async fn current_state(&self) -> Result<SessionState, Error>;
    async fn snapshot(&self) -> Result<Snapshot, Error>;
    async fn subscribe(
        &self,
        listener: Box<dyn DisplayListener>,
    ) -> Result<SubscriptionHandle, Error>;
    async fn unsubscribe(&self, handle: SubscriptionHandle);
}

pub type DynAPI = Arc<dyn SessionAPI + Send + Sync>;
