// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::sync::Mutex;

/// Manages a generic, thread-safe fan-out event channel.
///
/// This EventBus is generic over the type `T` of event it transports. This
/// ensures that `kyber-core` remains decoupled from specific event types
/// defined in higher-level crates.
///
/// Every subscriber owns its own `flume::Receiver` and sees every event
/// published after the subscription was taken. Subscribers that drop their
/// receiver are pruned on the next publish.
#[derive(Debug)]
pub struct EventBus<T: Clone + Send + Sync + 'static> {
    subscribers: Mutex<Vec<flume::Sender<T>>>,
}

impl<T: Clone + Send + Sync + 'static> EventBus<T> {
    /// Creates a new EventBus with no subscribers.
    pub fn new() -> Self {
        log::info!("Generic EventBus initialized.");
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Registers a new subscriber and returns its receiving end.
    ///
    /// Events published before this call are not delivered to the new
    /// subscriber.
    pub fn subscribe(&self) -> flume::Receiver<T> {
        let (sender, receiver) = flume::unbounded();
        match self.subscribers.lock() {
            Ok(mut subscribers) => subscribers.push(sender),
            Err(poisoned) => poisoned.into_inner().push(sender),
        }
        receiver
    }

    /// Publishes an event to every live subscriber.
    ///
    /// Each subscriber receives its own clone of the event. Subscribers whose
    /// receiver has been dropped are removed.
    pub fn publish(&self, event: T) {
        // The event itself cannot be formatted without a `Debug` trait bound,
        // which we omit to keep the bus as generic as possible.
        log::trace!("Publishing an event.");

        let mut subscribers = match self.subscribers.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        subscribers.retain(|sender| sender.send(event.clone()).is_ok());
    }

    /// Returns the number of live subscribers at the time of the call.
    pub fn subscriber_count(&self) -> usize {
        match self.subscribers.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}
