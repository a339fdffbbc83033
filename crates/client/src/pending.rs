//! Pending Action Registry.
//!
//! One in-flight flag per mutation key, set when the operation starts and
//! cleared on every completion path. The registry does not itself block a
//! duplicate submission; callers consult [`PendingActions::is_pending`]
//! to disable the originating control while a key is in flight.

use std::collections::HashSet;
use std::fmt;

use saltmarsh_core::ProductId;

/// Key identifying one in-flight mutation: verb plus target.
///
/// Renders as the wire-compatible `add-<productId>` form used by the
/// store UI for loading state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActionKey {
    Add(ProductId),
    Update(ProductId),
    Remove(ProductId),
    Clear,
}

impl fmt::Display for ActionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add(id) => write!(f, "add-{id}"),
            Self::Update(id) => write!(f, "update-{id}"),
            Self::Remove(id) => write!(f, "remove-{id}"),
            Self::Clear => write!(f, "clear"),
        }
    }
}

/// In-flight flags for the controller's mutations.
#[derive(Debug, Default)]
pub struct PendingActions {
    in_flight: HashSet<ActionKey>,
}

impl PendingActions {
    /// Mark a key as in flight. Returns `false` when the key was already
    /// pending (a duplicate submission the caller chose not to prevent).
    pub fn begin(&mut self, key: ActionKey) -> bool {
        self.in_flight.insert(key)
    }

    /// Clear a key. Called on success and failure paths alike; no key
    /// outlives its originating operation.
    pub fn finish(&mut self, key: &ActionKey) {
        self.in_flight.remove(key);
    }

    /// Whether a key is currently in flight.
    #[must_use]
    pub fn is_pending(&self, key: &ActionKey) -> bool {
        self.in_flight.contains(key)
    }

    /// True when nothing is in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.in_flight.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_rendering_matches_ui_form() {
        assert_eq!(ActionKey::Add(ProductId::new("p2")).to_string(), "add-p2");
        assert_eq!(ActionKey::Update(ProductId::new("7")).to_string(), "update-7");
        assert_eq!(ActionKey::Remove(ProductId::new("7")).to_string(), "remove-7");
        assert_eq!(ActionKey::Clear.to_string(), "clear");
    }

    #[test]
    fn test_begin_finish_lifecycle() {
        let mut pending = PendingActions::default();
        let key = ActionKey::Add(ProductId::new("p1"));

        assert!(pending.begin(key.clone()));
        assert!(pending.is_pending(&key));
        assert!(!pending.begin(key.clone()));

        pending.finish(&key);
        assert!(!pending.is_pending(&key));
        assert!(pending.is_empty());
    }

    #[test]
    fn test_keys_are_independent_per_target() {
        let mut pending = PendingActions::default();
        pending.begin(ActionKey::Update(ProductId::new("a")));

        assert!(!pending.is_pending(&ActionKey::Update(ProductId::new("b"))));
        assert!(!pending.is_pending(&ActionKey::Remove(ProductId::new("a"))));
    }
}
