//! Message delivery seam.
//!
//! The core never formats text: it hands the opaque [`Message`] payload
//! to an injected collaborator and moves on. Delivery is fire-and-forget
//! from the core's perspective; rendering (including resolution of
//! [`Message::Computed`] payloads) belongs to the presentation layer.

use std::cell::RefCell;

use living_core::{EntityId, Message};

pub trait Messenger {
    fn deliver(&self, entity: EntityId, message: &Message);
}

/// Discards everything. The default when no frontend is attached.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullMessenger;

impl Messenger for NullMessenger {
    fn deliver(&self, _entity: EntityId, _message: &Message) {}
}

/// Buffers deliveries in memory. Used by tests and simple frontends
/// that drain messages once per loop iteration.
#[derive(Debug, Default)]
pub struct RecordingMessenger {
    deliveries: RefCell<Vec<(EntityId, Message)>>,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drains everything delivered since the last call.
    pub fn take(&self) -> Vec<(EntityId, Message)> {
        self.deliveries.take()
    }

    /// Literal texts delivered to one entity, in order. Computed
    /// payloads are skipped; resolving them is not this type's job.
    pub fn texts_for(&self, entity: EntityId) -> Vec<String> {
        self.deliveries
            .borrow()
            .iter()
            .filter(|(to, _)| *to == entity)
            .filter_map(|(_, message)| match message {
                Message::Literal(text) => Some(text.clone()),
                Message::Computed(_) => None,
            })
            .collect()
    }
}

impl Messenger for RecordingMessenger {
    fn deliver(&self, entity: EntityId, message: &Message) {
        self.deliveries.borrow_mut().push((entity, message.clone()));
    }
}
