//! Stop-callback table.
//!
//! Effects carry a serializable `(owner, name)` reference instead of a
//! live function pointer; subsystems register the actual behavior here
//! under the name, and the world resolves it at stop time. A reference
//! that no longer resolves is treated as "no veto", not an error.

use std::collections::HashMap;
use std::rc::Rc;

use living_core::{EntityId, StopReason};

/// Outcome of a stop callback. Only a verb-initiated stop honors a
/// veto; timeout and combat interrupts ignore it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopDecision {
    Proceed,
    Veto,
}

pub type StopFn = Rc<dyn Fn(EntityId, StopReason) -> StopDecision>;

/// Named stop-callback registry owned by the world.
#[derive(Default)]
pub struct CallbackTable {
    entries: HashMap<String, StopFn>,
}

impl CallbackTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the behavior behind a callback name.
    pub fn register(&mut self, name: impl Into<String>, callback: StopFn) {
        self.entries.insert(name.into(), callback);
    }

    /// Removes a registration, returning whether it existed.
    pub fn unregister(&mut self, name: &str) -> bool {
        self.entries.remove(name).is_some()
    }

    pub fn resolve(&self, name: &str) -> Option<&StopFn> {
        self.entries.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_resolve_unregister() {
        let mut table = CallbackTable::new();
        assert!(table.resolve("wake_up").is_none());

        table.register("wake_up", Rc::new(|_, _| StopDecision::Proceed));
        let decision = table.resolve("wake_up").unwrap()(EntityId(1), StopReason::Verb);
        assert_eq!(decision, StopDecision::Proceed);

        assert!(table.unregister("wake_up"));
        assert!(!table.unregister("wake_up"));
    }
}
