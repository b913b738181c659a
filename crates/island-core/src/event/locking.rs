//! Serializing decorator for agent event queues.

use island_types::event::{AgentEvent, AgentEventKind};
use parking_lot::Mutex;

use super::queue::{AgentEventQueue, AgentEventSubscriber, PublishError};

/// Wraps any [`AgentEventQueue`] so that at most one `publish` runs at a
/// time across all threads.
///
/// Subscription passes straight through: it needs `&mut self`, so it can
/// only happen while the decorator is exclusively owned and no publisher
/// can be running. The lock is not reentrant; a subscriber must not publish
/// to the queue that is delivering to it.
#[derive(Debug)]
pub struct LockingAgentEventQueue<Q> {
    inner: Mutex<Q>,
}

impl<Q: AgentEventQueue> LockingAgentEventQueue<Q> {
    pub fn new(inner: Q) -> Self {
        Self {
            inner: Mutex::new(inner),
        }
    }

    pub fn into_inner(self) -> Q {
        self.inner.into_inner()
    }
}

impl<Q: AgentEventQueue> AgentEventQueue for LockingAgentEventQueue<Q> {
    fn subscribe_all_events(&mut self, subscriber: AgentEventSubscriber) {
        self.inner.get_mut().subscribe_all_events(subscriber);
    }

    fn subscribe_type(&mut self, kind: AgentEventKind, subscriber: AgentEventSubscriber) {
        self.inner.get_mut().subscribe_type(kind, subscriber);
    }

    fn subscribe_tag(&mut self, tag: &str, subscriber: AgentEventSubscriber) {
        self.inner.get_mut().subscribe_tag(tag, subscriber);
    }

    fn publish(&self, event: &AgentEvent) -> Result<(), PublishError> {
        self.inner.lock().publish(event)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    use island_types::agent::AgentId;
    use island_types::event::AgentEventPayload;

    use super::*;
    use crate::event::in_memory::InMemoryAgentEventQueue;
    use crate::event::queue::subscriber;

    #[test]
    fn test_concurrent_publishers_never_overlap() {
        const PUBLISHERS: usize = 8;
        const EVENTS_EACH: usize = 25;

        let in_flight = Arc::new(AtomicUsize::new(0));
        let max_in_flight = Arc::new(AtomicUsize::new(0));
        let delivered = Arc::new(AtomicUsize::new(0));

        let mut queue = LockingAgentEventQueue::new(InMemoryAgentEventQueue::new());
        {
            let in_flight = Arc::clone(&in_flight);
            let max_in_flight = Arc::clone(&max_in_flight);
            let delivered = Arc::clone(&delivered);
            queue.subscribe_all_events(subscriber(move |_| {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                max_in_flight.fetch_max(now, Ordering::SeqCst);
                thread::sleep(Duration::from_micros(200));
                delivered.fetch_add(1, Ordering::SeqCst);
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok(())
            }));
        }
        let queue = Arc::new(queue);

        thread::scope(|scope| {
            for _ in 0..PUBLISHERS {
                let queue = Arc::clone(&queue);
                scope.spawn(move || {
                    for _ in 0..EVENTS_EACH {
                        let event =
                            AgentEvent::new(AgentId::new(), AgentEventPayload::AgentShutdown);
                        queue.publish(&event).unwrap();
                    }
                });
            }
        });

        assert_eq!(max_in_flight.load(Ordering::SeqCst), 1);
        assert_eq!(delivered.load(Ordering::SeqCst), PUBLISHERS * EVENTS_EACH);
    }

    #[test]
    fn test_subscriptions_pass_through_to_inner_queue() {
        let mut queue = LockingAgentEventQueue::new(InMemoryAgentEventQueue::new());
        queue.subscribe_all_events(subscriber(|_| Ok(())));
        queue.subscribe_type(AgentEventKind::TcpScan, subscriber(|_| Ok(())));
        queue.subscribe_tag("t", subscriber(|_| Ok(())));

        assert_eq!(queue.into_inner().subscription_count(), 3);
    }
}
