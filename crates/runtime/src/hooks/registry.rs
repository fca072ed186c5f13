//! Hook registry: ordered subscriber lists keyed by hook name.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use thiserror::Error;
use tracing::error;

use super::HookEvent;

/// Failure reported by a single subscriber. Isolated by the registry:
/// logged, never propagated to the publisher or to later subscribers.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct HookError(pub String);

pub type HookFn = Rc<dyn Fn(&HookEvent) -> Result<(), HookError>>;

/// Process-wide mapping from hook name to its subscribers.
///
/// Empty at startup, cleared at shutdown, and always passed by
/// reference from the world; never an implicit global. Firing order is
/// registration order, and the subscriber list is snapshotted before a
/// publish, so subscriptions added mid-publish are not visited until
/// the next one.
#[derive(Default)]
pub struct HookRegistry {
    topics: RefCell<HashMap<String, Vec<HookFn>>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a subscriber to the named hook.
    pub fn subscribe(&self, name: &str, callback: HookFn) {
        self.topics
            .borrow_mut()
            .entry(name.to_owned())
            .or_default()
            .push(callback);
    }

    /// Fires every subscriber of the named hook with the same payload.
    ///
    /// A failing subscriber must not break the event chain: the error
    /// is logged and the remaining subscribers still run.
    pub fn publish(&self, name: &str, event: &HookEvent) {
        let snapshot = {
            let topics = self.topics.borrow();
            match topics.get(name) {
                Some(subscribers) => subscribers.clone(),
                None => return,
            }
        };

        for (index, callback) in snapshot.iter().enumerate() {
            if let Err(err) = callback(event) {
                error!(
                    target: "runtime::hooks",
                    hook = name,
                    subscriber = index,
                    error = %err,
                    "hook subscriber failed, continuing"
                );
            }
        }
    }

    /// Number of subscribers currently attached to a hook.
    pub fn subscriber_count(&self, name: &str) -> usize {
        self.topics.borrow().get(name).map_or(0, Vec::len)
    }

    /// Drops every subscription. Part of world teardown.
    pub fn clear(&self) {
        self.topics.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use living_core::EntityId;

    use super::*;
    use crate::hooks::names;

    #[test]
    fn subscribers_fire_in_registration_order() {
        let registry = HookRegistry::new();
        let order: Rc<RefCell<Vec<u8>>> = Rc::default();

        for tag in [1u8, 2, 3] {
            let order = Rc::clone(&order);
            registry.subscribe(
                names::HOOK_LIVING_KILLED,
                Rc::new(move |_| {
                    order.borrow_mut().push(tag);
                    Ok(())
                }),
            );
        }

        registry.publish(
            names::HOOK_LIVING_KILLED,
            &HookEvent::LivingKilled {
                victim: EntityId(7),
            },
        );
        assert_eq!(*order.borrow(), vec![1, 2, 3]);
    }

    #[test]
    fn failing_subscriber_does_not_break_the_chain() {
        let registry = HookRegistry::new();
        let reached: Rc<RefCell<bool>> = Rc::default();

        registry.subscribe(
            names::HOOK_LIVING_KILLED,
            Rc::new(|_| Err(HookError("observer exploded".into()))),
        );
        let flag = Rc::clone(&reached);
        registry.subscribe(
            names::HOOK_LIVING_KILLED,
            Rc::new(move |_| {
                *flag.borrow_mut() = true;
                Ok(())
            }),
        );

        registry.publish(
            names::HOOK_LIVING_KILLED,
            &HookEvent::LivingKilled {
                victim: EntityId(7),
            },
        );
        assert!(*reached.borrow());
    }

    #[test]
    fn subscriptions_added_during_publish_wait_for_the_next_one() {
        let registry = Rc::new(HookRegistry::new());
        let count: Rc<RefCell<u32>> = Rc::default();

        let inner_registry = Rc::clone(&registry);
        let inner_count = Rc::clone(&count);
        registry.subscribe(
            names::HOOK_LIVING_HUNTED,
            Rc::new(move |_| {
                let late_count = Rc::clone(&inner_count);
                inner_registry.subscribe(
                    names::HOOK_LIVING_HUNTED,
                    Rc::new(move |_| {
                        *late_count.borrow_mut() += 1;
                        Ok(())
                    }),
                );
                Ok(())
            }),
        );

        let event = HookEvent::LivingHunted { hunters: vec![] };
        registry.publish(names::HOOK_LIVING_HUNTED, &event);
        assert_eq!(*count.borrow(), 0);
        registry.publish(names::HOOK_LIVING_HUNTED, &event);
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn publish_to_unknown_hook_is_a_no_op() {
        let registry = HookRegistry::new();
        registry.publish("_hook_nobody_home", &HookEvent::LivingHunted { hunters: vec![] });
    }

    #[test]
    fn clear_empties_every_topic() {
        let registry = HookRegistry::new();
        registry.subscribe(names::HOOK_LIVING_KILLED, Rc::new(|_| Ok(())));
        assert_eq!(registry.subscriber_count(names::HOOK_LIVING_KILLED), 1);
        registry.clear();
        assert_eq!(registry.subscriber_count(names::HOOK_LIVING_KILLED), 0);
    }
}
