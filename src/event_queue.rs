//! Defers connector notifications out of the context that delivers them.
//!
//! Notification callbacks may fire where blocking on the register bus is not
//! allowed. The producer half only enqueues; a worker owning the consumer half
//! later replays the events, in arrival order, into the real sink.

use core::fmt::Debug;

use heapless::spsc::{Consumer, Producer, Queue};

use super::connector_fsm::{ConnectorEvent, ConnectorEventSink};

/// Holds up to `N - 1` pending events.
pub struct EventQueue<const N: usize> {
    queue: Queue<ConnectorEvent, N>,
}

impl<const N: usize> EventQueue<N> {
    pub const fn new() -> Self {
        Self {
            queue: Queue::new(),
        }
    }

    pub fn split(&mut self) -> (EventProducer<'_, N>, EventConsumer<'_, N>) {
        let (producer, consumer) = self.queue.split();
        (EventProducer { producer }, EventConsumer { consumer })
    }
}

impl<const N: usize> Default for EventQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

pub struct EventProducer<'a, const N: usize> {
    producer: Producer<'a, ConnectorEvent, N>,
}

/// A full queue hands the rejected event back.
impl<'a, const N: usize> ConnectorEventSink for EventProducer<'a, N> {
    type Error = ConnectorEvent;

    fn on_connector_event(&mut self, event: ConnectorEvent) -> Result<(), Self::Error> {
        self.producer.enqueue(event).map_err(|event| {
            log::warn!("Connector event queue full, dropping {:?}", event);
            event
        })
    }
}

pub struct EventConsumer<'a, const N: usize> {
    consumer: Consumer<'a, ConnectorEvent, N>,
}

impl<'a, const N: usize> EventConsumer<'a, N> {
    pub fn len(&self) -> usize {
        self.consumer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Feeds every pending event to `sink`. A failing event is logged and
    /// dropped, the remaining events are still delivered. Returns how many
    /// events were taken off the queue.
    pub fn dispatch_pending<S>(&mut self, sink: &mut S) -> usize
    where
        S: ConnectorEventSink,
        S::Error: Debug,
    {
        let mut handled = 0;
        while let Some(event) = self.consumer.dequeue() {
            if let Err(err) = sink.on_connector_event(event) {
                log::error!("Error handling {:?}: {:?}", event, err);
            }
            handled += 1;
        }
        handled
    }
}
