//! Outcome of dispatching one event.

/// What a machine did with an event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// Moved from one state to another (possibly the same one)
    Transitioned { from: String, to: String },

    /// An in-place handler of the current state ran
    Handled,

    /// Neither a transition nor a handler matched; the event was dropped
    Unhandled,

    /// A transition matched but its target does not exist; nothing ran
    BrokenTransition { from: String, to: String },

    /// The current state name does not resolve; nothing ran
    NoState { name: String },
}

impl Dispatch {
    /// True if a handler or hook could have observed the event.
    pub fn is_effective(&self) -> bool {
        matches!(self, Self::Transitioned { .. } | Self::Handled)
    }

    /// Short stable label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Transitioned { .. } => "transitioned",
            Self::Handled => "handled",
            Self::Unhandled => "unhandled",
            Self::BrokenTransition { .. } => "broken_transition",
            Self::NoState { .. } => "no_state",
        }
    }
}
