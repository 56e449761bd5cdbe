//! Change bus ports - how chart mutations reach dependent views.
//!
//! Delivery is synchronous and single-threaded: a publish call returns only
//! after every subscribed handler has run.

use std::rc::Rc;

use crate::domain::foundation::DomainError;
use crate::domain::memento::{ChangeTopic, ChartChange};

/// Handler invoked for each published change on a subscribed topic.
///
/// Handlers must not publish; the bus rejects reentrant notifications.
///
/// # Example
///
/// ```ignore
/// struct LayoutRefresher { /* ... */ }
///
/// impl ChartChangeHandler for LayoutRefresher {
///     fn handle(&self, change: &ChartChange) -> Result<(), DomainError> {
///         // recompute rows and labels
///         Ok(())
///     }
///
///     fn name(&self) -> &'static str {
///         "LayoutRefresher"
///     }
/// }
/// ```
pub trait ChartChangeHandler {
    fn handle(&self, change: &ChartChange) -> Result<(), DomainError>;

    /// Handler name for logging and error messages.
    fn name(&self) -> &'static str;
}

/// Port for publishing chart changes.
pub trait ChartChangePublisher {
    /// Delivers `change` to every handler subscribed to its topic, in
    /// subscription order.
    ///
    /// # Errors
    /// - `ReentrantNotification` when called from inside a handler
    /// - `HandlerFailed` when any handler returned an error; the remaining
    ///   handlers still run
    fn publish(&self, change: ChartChange) -> Result<(), DomainError>;
}

/// Port for registering change handlers.
pub trait ChartChangeSubscriber {
    fn subscribe(&self, topic: ChangeTopic, handler: Rc<dyn ChartChangeHandler>);

    /// Subscribes the same handler to several topics.
    fn subscribe_all(&self, topics: &[ChangeTopic], handler: Rc<dyn ChartChangeHandler>) {
        for topic in topics {
            self.subscribe(*topic, Rc::clone(&handler));
        }
    }
}

/// Combined publish/subscribe capability.
pub trait ChartChangeBus: ChartChangePublisher + ChartChangeSubscriber {}

impl<T: ChartChangePublisher + ChartChangeSubscriber> ChartChangeBus for T {}
