use serde::{Deserialize, Serialize};

use crate::entities::DisplayEvent;
use crate::error::{listener_closed_error, Error};

/// Events a channel subscriber may leave unread before it is dropped.
pub const EVENT_BUFFER: usize = 64;

/// Receiver of display events. Returning an error unsubscribes the listener.
pub trait DisplayListener: Send {
    fn on_event(&mut self, event: &DisplayEvent) -> Result<(), Error>;
}

impl<F> DisplayListener for F
where
    F: FnMut(&DisplayEvent) + Send,
{
    fn on_event(&mut self, event: &DisplayEvent) -> Result<(), Error> {
        (*self)(event);
        Ok(())
    }
}

impl DisplayListener for async_channel::Sender<DisplayEvent> {
    fn on_event(&mut self, event: &DisplayEvent) -> Result<(), Error> {
        self.try_send(event.clone()).map_err(|err| {
            if err.is_full() {
                tracing::warn!(
                    "listener fell {} events behind",
                    self.capacity().unwrap_or_default()
                );
            }
            listener_closed_error()
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionHandle(u64);

#[derive(Default)]
pub struct Listeners {
    next_id: u64,
    entries: Vec<(SubscriptionHandle, Box<dyn DisplayListener>)>,
}

impl Listeners {
    pub fn add(&mut self, listener: Box<dyn DisplayListener>) -> SubscriptionHandle {
        let handle = SubscriptionHandle(self.next_id);
        self.next_id += 1;
        self.entries.push((handle, listener));

        handle
    }

    pub fn remove(&mut self, handle: SubscriptionHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(h, _)| *h != handle);

        self.entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn publish(&mut self, event: &DisplayEvent) {
        self.entries.retain_mut(|(handle, listener)| match listener.on_event(event) {
            Ok(()) => true,
            Err(_) => {
                tracing::debug!("dropping closed listener {:?}", handle);
                false
            }
        });
    }
}
