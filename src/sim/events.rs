//! Topic-based event bus
//!
//! Dispatch is synchronous and single-threaded: `publish` runs every handler
//! registered for the event's topic, in registration order, before it returns.
//! A handler may publish further events; those are dispatched depth-first
//! inside the outer publish.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::actor::Direction;

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Board geometry is available
    BoardInitialized,
    /// Actor moved one cell
    Moved,
    /// Actor hit something unsafe
    Collision,
    /// Actor reached an unclaimed goal slot
    GoalReached,
    /// Countdown fraction for the timer bar
    TimeRemaining,
    ScoreChanged,
    HighScoreChanged,
    LifeLost,
    GameOver,
    GameWon,
    /// Actor and obstacles return to their start positions
    Reset,
}

/// Event payloads; each variant belongs to exactly one topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    BoardInitialized {
        rows: usize,
        columns: usize,
        cell_width: f32,
        cell_height: f32,
    },
    Moved {
        direction: Direction,
        row: usize,
    },
    Collision,
    GoalReached {
        slot: usize,
    },
    /// Remaining time as a fraction of the limit (0.0 - 1.0)
    TimeRemaining(f32),
    ScoreChanged(u32),
    HighScoreChanged(u32),
    LifeLost {
        lives: u8,
    },
    GameOver,
    GameWon,
    Reset,
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::BoardInitialized { .. } => Topic::BoardInitialized,
            Event::Moved { .. } => Topic::Moved,
            Event::Collision => Topic::Collision,
            Event::GoalReached { .. } => Topic::GoalReached,
            Event::TimeRemaining(_) => Topic::TimeRemaining,
            Event::ScoreChanged(_) => Topic::ScoreChanged,
            Event::HighScoreChanged(_) => Topic::HighScoreChanged,
            Event::LifeLost { .. } => Topic::LifeLost,
            Event::GameOver => Topic::GameOver,
            Event::GameWon => Topic::GameWon,
            Event::Reset => Topic::Reset,
        }
    }
}

type Handler = Rc<dyn Fn(&EventBus, &Event)>;

/// Topic-based event bus
///
/// Cloning is cheap and every clone shares the same subscriptions.
#[derive(Clone, Default)]
pub struct EventBus {
    handlers: Rc<RefCell<HashMap<Topic, Vec<Handler>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for every future publish on `topic`
    ///
    /// The handler receives the bus so it can publish follow-up events.
    pub fn subscribe<F>(&self, topic: Topic, handler: F)
    where
        F: Fn(&EventBus, &Event) + 'static,
    {
        self.handlers
            .borrow_mut()
            .entry(topic)
            .or_default()
            .push(Rc::new(handler));
    }

    /// Publish an event to its topic's subscribers
    pub fn publish(&self, event: Event) {
        let topic = event.topic();

        // Snapshot so handlers can subscribe or publish while we dispatch
        let handlers: Vec<Handler> = match self.handlers.borrow().get(&topic) {
            Some(handlers) => handlers.clone(),
            None => Vec::new(),
        };

        if handlers.is_empty() {
            log::trace!("No subscribers for topic {:?}", topic);
            return;
        }

        log::trace!("Dispatching {:?} to {} handler(s)", event, handlers.len());
        for handler in &handlers {
            handler(self, &event);
        }
    }

    /// Publish a batch of events in order
    pub fn publish_all(&self, events: impl IntoIterator<Item = Event>) {
        for event in events {
            self.publish(event);
        }
    }

    /// Number of handlers registered for a topic
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.handlers.borrow().get(&topic).map_or(0, Vec::len)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let handlers = self.handlers.borrow();
        f.debug_struct("EventBus")
            .field("topics", &handlers.len())
            .finish()
    }
}

/// Collects every event published on the given topics, for HUD-style
/// observers and tests.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<Event>>>,
}

impl EventLog {
    /// Subscribe a fresh log to `topics`
    pub fn attach(bus: &EventBus, topics: &[Topic]) -> Self {
        let log = Self::default();
        for &topic in topics {
            let events = Rc::clone(&log.events);
            bus.subscribe(topic, move |_, event| events.borrow_mut().push(event.clone()));
        }
        log
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    pub fn count(&self, topic: Topic) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|e| e.topic() == topic)
            .count()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_publish_without_subscribers_is_noop() {
        let bus = EventBus::new();
        bus.publish(Event::GameOver);
        assert_eq!(bus.subscriber_count(Topic::GameOver), 0);
    }

    #[test]
    fn test_handlers_run_in_registration_order() {
        let bus = EventBus::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for id in 0..3 {
            let order = Rc::clone(&order);
            bus.subscribe(Topic::Collision, move |_, _| order.borrow_mut().push(id));
        }

        bus.publish(Event::Collision);
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn test_only_matching_topic_is_dispatched() {
        let bus = EventBus::new();
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        bus.subscribe(Topic::Reset, move |_, _| counter.set(counter.get() + 1));

        bus.publish(Event::GameOver);
        bus.publish(Event::Reset);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_reentrant_publish_is_depth_first() {
        let bus = EventBus::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let o = Rc::clone(&order);
        bus.subscribe(Topic::Collision, move |bus, _| {
            o.borrow_mut().push("collision:first");
            bus.publish(Event::LifeLost { lives: 4 });
        });
        let o = Rc::clone(&order);
        bus.subscribe(Topic::Collision, move |_, _| o.borrow_mut().push("collision:second"));
        let o = Rc::clone(&order);
        bus.subscribe(Topic::LifeLost, move |_, _| o.borrow_mut().push("life-lost"));

        bus.publish(Event::Collision);
        assert_eq!(
            *order.borrow(),
            vec!["collision:first", "life-lost", "collision:second"]
        );
    }

    #[test]
    fn test_subscribe_during_dispatch_sees_only_future_events() {
        let bus = EventBus::new();
        let late_hits = Rc::new(Cell::new(0));

        let hits = Rc::clone(&late_hits);
        bus.subscribe(Topic::Reset, move |bus, _| {
            let hits = Rc::clone(&hits);
            bus.subscribe(Topic::Reset, move |_, _| hits.set(hits.get() + 1));
        });

        bus.publish(Event::Reset);
        assert_eq!(late_hits.get(), 0);
        bus.publish(Event::Reset);
        assert_eq!(late_hits.get(), 1);
    }

    #[test]
    fn test_event_log_records_selected_topics() {
        let bus = EventBus::new();
        let log = EventLog::attach(&bus, &[Topic::ScoreChanged, Topic::GameWon]);

        bus.publish(Event::ScoreChanged(20));
        bus.publish(Event::Collision);
        bus.publish(Event::GameWon);

        assert_eq!(log.events(), vec![Event::ScoreChanged(20), Event::GameWon]);
        assert_eq!(log.count(Topic::ScoreChanged), 1);

        log.clear();
        assert!(log.events().is_empty());
        bus.publish(Event::GameWon);
        assert_eq!(log.count(Topic::GameWon), 1);
    }
}
