//! In-memory change bus.
//!
//! Synchronous, deterministic delivery on the calling thread. This is the
//! bus shared by the main chart view and any detail window.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::memento::{ChangeTopic, ChartChange};
use crate::ports::{ChartChangeHandler, ChartChangePublisher, ChartChangeSubscriber};

/// In-memory change bus.
///
/// Features:
/// - Synchronous delivery in subscription order
/// - Change capture for assertions
/// - Rejection of publishes made from inside a handler
///
/// # Example
///
/// ```ignore
/// let bus = Rc::new(InMemoryChangeBus::new());
/// bus.subscribe(ChangeTopic::WeightMap, refresher);
/// bus.publish(ChartChange::WeightMap(weights))?;
/// assert_eq!(bus.change_count(), 1);
/// ```
pub struct InMemoryChangeBus {
    handlers: RefCell<HashMap<ChangeTopic, Vec<Rc<dyn ChartChangeHandler>>>>,
    published: RefCell<Vec<ChartChange>>,
    dispatching: Cell<bool>,
}

impl InMemoryChangeBus {
    pub fn new() -> Self {
        Self {
            handlers: RefCell::new(HashMap::new()),
            published: RefCell::new(Vec::new()),
            dispatching: Cell::new(false),
        }
    }

    /// Returns all published changes.
    pub fn published_changes(&self) -> Vec<ChartChange> {
        self.published.borrow().clone()
    }

    /// Returns changes published on one topic.
    pub fn changes_on(&self, topic: ChangeTopic) -> Vec<ChartChange> {
        self.published
            .borrow()
            .iter()
            .filter(|change| change.topic() == topic)
            .cloned()
            .collect()
    }

    pub fn change_count(&self) -> usize {
        self.published.borrow().len()
    }

    pub fn has_change(&self, topic: ChangeTopic) -> bool {
        self.published.borrow().iter().any(|change| change.topic() == topic)
    }

    /// Clears the published log; subscriptions are kept.
    pub fn clear(&self) {
        self.published.borrow_mut().clear();
    }

    pub fn handler_count(&self, topic: ChangeTopic) -> usize {
        self.handlers.borrow().get(&topic).map_or(0, Vec::len)
    }
}

impl Default for InMemoryChangeBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Clears the dispatching flag when delivery ends, even on unwind.
struct DispatchGuard<'a>(&'a Cell<bool>);

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl ChartChangePublisher for InMemoryChangeBus {
    fn publish(&self, change: ChartChange) -> Result<(), DomainError> {
        if self.dispatching.get() {
            warn!(topic = %change.topic(), "Rejected change published during dispatch");
            return Err(DomainError::new(
                ErrorCode::ReentrantNotification,
                format!("Cannot publish '{}' while handlers are running", change.topic()),
            ));
        }
        self.dispatching.set(true);
        let _guard = DispatchGuard(&self.dispatching);

        self.published.borrow_mut().push(change.clone());

        // Clone handlers so none of them can observe a held borrow
        let topic_handlers: Vec<Rc<dyn ChartChangeHandler>> = self
            .handlers
            .borrow()
            .get(&change.topic())
            .cloned()
            .unwrap_or_default();

        debug!(topic = %change.topic(), handlers = topic_handlers.len(), "Dispatching chart change");

        let mut errors = Vec::new();
        for handler in topic_handlers {
            if let Err(e) = handler.handle(&change) {
                errors.push(format!("{}: {}", handler.name(), e));
            }
        }

        if !errors.is_empty() {
            return Err(DomainError::new(
                ErrorCode::HandlerFailed,
                format!("Handler errors: {}", errors.join(", ")),
            ));
        }
        Ok(())
    }
}

impl ChartChangeSubscriber for InMemoryChangeBus {
    fn subscribe(&self, topic: ChangeTopic, handler: Rc<dyn ChartChangeHandler>) {
        self.handlers.borrow_mut().entry(topic).or_default().push(handler);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_model::WeightMap;
    use std::cell::RefCell;

    struct CountingHandler(Rc<Cell<usize>>);

    impl ChartChangeHandler for CountingHandler {
        fn handle(&self, _: &ChartChange) -> Result<(), DomainError> {
            self.0.set(self.0.get() + 1);
            Ok(())
        }
        fn name(&self) -> &'static str {
            "CountingHandler"
        }
    }

    #[test]
    fn publish_stores_change() {
        let bus = InMemoryChangeBus::new();
        bus.publish(ChartChange::ObjectivesChanged).unwrap();

        assert_eq!(bus.change_count(), 1);
        assert!(bus.has_change(ChangeTopic::ObjectivesChanged));
        assert!(!bus.has_change(ChangeTopic::Objectives));
    }

    #[test]
    fn handlers_only_receive_their_topic() {
        let bus = InMemoryChangeBus::new();
        let counter = Rc::new(Cell::new(0));
        bus.subscribe(ChangeTopic::WeightMap, Rc::new(CountingHandler(counter.clone())));

        bus.publish(ChartChange::WeightMap(WeightMap::new())).unwrap();
        bus.publish(ChartChange::AlternativeOrderChanged).unwrap();

        assert_eq!(counter.get(), 1);
        assert_eq!(bus.changes_on(ChangeTopic::WeightMap).len(), 1);
    }

    #[test]
    fn subscribe_all_registers_for_every_topic() {
        let bus = InMemoryChangeBus::new();
        let counter = Rc::new(Cell::new(0));
        bus.subscribe_all(&ChangeTopic::ALL, Rc::new(CountingHandler(counter.clone())));

        bus.publish(ChartChange::ObjectivesChanged).unwrap();
        bus.publish(ChartChange::AlternativeOrderChanged).unwrap();

        assert_eq!(counter.get(), 2);
        assert_eq!(bus.handler_count(ChangeTopic::Objectives), 1);
    }

    #[test]
    fn handlers_run_in_subscription_order() {
        struct Recording(&'static str, Rc<RefCell<Vec<&'static str>>>);
        impl ChartChangeHandler for Recording {
            fn handle(&self, _: &ChartChange) -> Result<(), DomainError> {
                self.1.borrow_mut().push(self.0);
                Ok(())
            }
            fn name(&self) -> &'static str {
                self.0
            }
        }

        let bus = InMemoryChangeBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        bus.subscribe(ChangeTopic::ObjectivesChanged, Rc::new(Recording("first", log.clone())));
        bus.subscribe(ChangeTopic::ObjectivesChanged, Rc::new(Recording("second", log.clone())));

        bus.publish(ChartChange::ObjectivesChanged).unwrap();
        assert_eq!(*log.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn publishing_from_a_handler_is_rejected() {
        struct Republisher {
            bus: RefCell<Option<Rc<InMemoryChangeBus>>>,
            result: RefCell<Option<Result<(), DomainError>>>,
        }
        impl ChartChangeHandler for Republisher {
            fn handle(&self, _: &ChartChange) -> Result<(), DomainError> {
                if let Some(bus) = self.bus.borrow().as_ref() {
                    *self.result.borrow_mut() = Some(bus.publish(ChartChange::ObjectivesChanged));
                }
                Ok(())
            }
            fn name(&self) -> &'static str {
                "Republisher"
            }
        }

        let bus = Rc::new(InMemoryChangeBus::new());
        let handler = Rc::new(Republisher {
            bus: RefCell::new(Some(bus.clone())),
            result: RefCell::new(None),
        });
        bus.subscribe(ChangeTopic::AlternativeOrderChanged, handler.clone());

        bus.publish(ChartChange::AlternativeOrderChanged).unwrap();

        let inner = handler.result.borrow_mut().take().unwrap();
        assert_eq!(inner.unwrap_err().code, ErrorCode::ReentrantNotification);
        assert_eq!(bus.change_count(), 1);

        // Guard is released once dispatch ends
        handler.bus.borrow_mut().take();
        bus.publish(ChartChange::ObjectivesChanged).unwrap();
    }

    #[test]
    fn handler_error_is_reported_after_all_handlers_run() {
        struct FailingHandler;
        impl ChartChangeHandler for FailingHandler {
            fn handle(&self, _: &ChartChange) -> Result<(), DomainError> {
                Err(DomainError::new(ErrorCode::InternalError, "Handler failed"))
            }
            fn name(&self) -> &'static str {
                "FailingHandler"
            }
        }

        let bus = InMemoryChangeBus::new();
        let counter = Rc::new(Cell::new(0));
        bus.subscribe(ChangeTopic::ObjectivesChanged, Rc::new(FailingHandler));
        bus.subscribe(ChangeTopic::ObjectivesChanged, Rc::new(CountingHandler(counter.clone())));

        let err = bus.publish(ChartChange::ObjectivesChanged).unwrap_err();
        assert_eq!(err.code, ErrorCode::HandlerFailed);
        assert!(err.message.contains("FailingHandler"));
        assert_eq!(counter.get(), 1);
    }
}
