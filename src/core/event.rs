//! Events exchanged between tasks.
//!
//! An [`Event`] is the only unit of communication in the runtime: an
//! immutable pair of a kind (used as the dispatch key) and an arbitrary
//! JSON value.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Debug;
use std::hash::Hash;

/// Trait for event kinds, the keys handlers and transitions are registered under.
///
/// Implemented for `String` and `&'static str` for open, string-keyed
/// dispatch, and generated for closed enums by [`event_kind!`](crate::event_kind).
///
/// # Example
///
/// ```rust
/// use taskfsm::core::EventKind;
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug)]
/// enum Control {
///     Pause,
///     Quit,
/// }
///
/// impl EventKind for Control {
///     fn name(&self) -> &str {
///         match self {
///             Self::Pause => "pause",
///             Self::Quit => "quit",
///         }
///     }
/// }
///
/// assert_eq!(Control::Quit.name(), "quit");
/// assert_eq!("quit".name(), "quit");
/// ```
pub trait EventKind: Clone + Eq + Hash + Debug + Send + Sync + 'static {
    /// Name used in logs and history records.
    fn name(&self) -> &str;
}

impl EventKind for String {
    fn name(&self) -> &str {
        self
    }
}

impl EventKind for &'static str {
    fn name(&self) -> &str {
        self
    }
}

/// Immutable `{kind, value}` message.
///
/// # Example
///
/// ```rust
/// use taskfsm::core::Event;
/// use serde_json::json;
///
/// let event = Event::with_value("track", json!({"title": "Intro"}));
/// assert_eq!(*event.kind(), "track");
/// assert_eq!(event.value()["title"], "Intro");
///
/// let quit = Event::new("quit");
/// assert!(quit.value().is_null());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event<K> {
    kind: K,
    value: Value,
}

impl<K: EventKind> Event<K> {
    /// Create an event that carries no value.
    pub fn new(kind: K) -> Self {
        Self {
            kind,
            value: Value::Null,
        }
    }

    /// Create an event carrying `value`.
    pub fn with_value(kind: K, value: impl Into<Value>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    /// The dispatch key.
    pub fn kind(&self) -> &K {
        &self.kind
    }

    /// The payload; `Null` for events created with [`new`](Self::new).
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Consume the event, returning its parts.
    pub fn into_parts(self) -> (K, Value) {
        (self.kind, self.value)
    }
}
