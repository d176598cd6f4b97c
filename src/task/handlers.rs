//! Flat dispatch: one handler per event kind.

use super::behavior::Behavior;
use super::context::{Context, Scope};
use crate::core::{Event, EventKind, Handler, HandlerResult};
use std::collections::HashMap;
use tracing::debug;

/// Behavior that dispatches each event through a kind → handler map.
///
/// Events without a handler are dropped with a debug log.
pub struct HandlerTable<K: EventKind, D> {
    scope: Scope<K, D>,
    handlers: HashMap<K, Handler<K, Scope<K, D>>>,
}

impl<K: EventKind, D> HandlerTable<K, D> {
    /// Create an empty table whose handlers share `data`.
    pub fn new(ctx: Context<K>, data: D) -> Self {
        Self {
            scope: Scope::new(ctx, data),
            handlers: HashMap::new(),
        }
    }

    /// Register `handler` for `kind`, replacing any previous one.
    pub fn on<F>(mut self, kind: K, handler: F) -> Self
    where
        F: FnMut(&mut Scope<K, D>, &Event<K>) -> HandlerResult + Send + 'static,
    {
        self.handlers.insert(kind, Box::new(handler));
        self
    }

    /// True if a handler is registered for `kind`.
    pub fn handles(&self, kind: &K) -> bool {
        self.handlers.contains_key(kind)
    }

    pub fn scope(&self) -> &Scope<K, D> {
        &self.scope
    }

    /// Adapter data shared by the handlers.
    pub fn data(&self) -> &D {
        &self.scope.data
    }
}

impl<K, D> Behavior<K> for HandlerTable<K, D>
where
    K: EventKind,
    D: Send + 'static,
{
    fn process_event(&mut self, _ctx: &Context<K>, event: Event<K>) -> HandlerResult {
        match self.handlers.get_mut(event.kind()) {
            Some(handler) => handler(&mut self.scope, &event),
            None => {
                debug!(
                    task = self.scope.name(),
                    event = event.kind().name(),
                    "no handler for event"
                );
                Ok(())
            }
        }
    }
}
