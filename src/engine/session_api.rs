use super::{Command, DisplayListener, Engine, SessionState, Snapshot, SubscriptionHandle};

use async_trait::async_trait;

use crate::{api::SessionAPI, entities::Coordinates, error::Error};

#[async_trait]
impl SessionAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn handle_tap(&self, location: Coordinates) {
        self.send(Command::Tap(location));
    }

    #[tracing::instrument(skip(self))]
    async fn reset(&self) {
        self.send(Command::Reset);
    }

    #[tracing::instrument(skip(self))]
    async fn select_direction(&self, index: usize) {
        self.send(Command::SelectDirection(index));
    }

    async fn current_state(&self) -> Result<SessionState, Error> {
        let snapshot = self.snapshot().await?;

        Ok(snapshot.status.state())
    }

    async fn snapshot(&self) -> Result<Snapshot, Error> {
        self.request(Command::Snapshot).await
    }

    #[tracing::instrument(skip_all)]
    async fn subscribe(
        &self,
        listener: Box<dyn DisplayListener>,
    ) -> Result<SubscriptionHandle, Error> {
        self.request(|reply| Command::Subscribe(listener, reply))
            .await
    }

    #[tracing::instrument(skip(self))]
    async fn unsubscribe(&self, handle: SubscriptionHandle) {
        self.send(Command::Unsubscribe(handle));
    }
}
