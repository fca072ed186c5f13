//! Command interception.
//!
//! Every command an entity issues passes through its effect stack
//! before execution. The first effect that does not pass the verb
//! decides the outcome; effects added later are consulted first.

use living_core::{Gate, StopReason};
use tracing::debug;

use crate::callback::StopDecision;
use crate::world::World;

/// Outcome of running a verb through an entity's effect stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    /// True when the command must not reach normal execution.
    pub blocked: bool,
}

impl Verdict {
    pub const PASS: Self = Self { blocked: false };
    pub const BLOCKED: Self = Self { blocked: true };
}

impl World {
    /// Runs `verb` through the entity's active effects. The raw argument
    /// string travels along untouched; only the verb is gated.
    ///
    /// Most recent effect first. A verb that passes one effect is still
    /// subject to the next; the stop verb of an effect is absorbed by
    /// that effect whether or not the break goes through. Unknown
    /// entities have nothing to intercept.
    pub fn evaluate_command(
        &mut self,
        id: living_core::EntityId,
        verb: &str,
        args: &str,
    ) -> Verdict {
        let Some(living) = self.livings.get(&id) else {
            return Verdict::PASS;
        };
        let wizard = living.wizard;

        // Gate decisions only need the specs; clone what the mutation
        // below will invalidate the borrow of.
        let mut plan = None;
        for effect in living.effects.iter().rev() {
            match effect.gate(verb, &self.config.always_allowed) {
                Gate::Pass => continue,
                gate => {
                    plan = Some((
                        effect.id,
                        gate,
                        effect.spec.stop_callback.clone(),
                        effect.spec.fail_message.clone(),
                    ));
                    break;
                }
            }
        }
        let Some((effect_id, gate, stop_callback, fail_message)) = plan else {
            return Verdict::PASS;
        };

        match gate {
            Gate::Pass => unreachable!(),
            Gate::Stop => {
                // The stop verb is consumed by this effect regardless of
                // the veto outcome.
                let vetoed = match &stop_callback {
                    Some(reference) => match self.callbacks.resolve(&reference.name) {
                        Some(callback) => {
                            callback(reference.owner, StopReason::Verb) == StopDecision::Veto
                        }
                        None => false,
                    },
                    None => false,
                };
                if vetoed {
                    debug!(
                        target: "runtime::effects",
                        entity = %id,
                        effect = %effect_id,
                        "voluntary stop vetoed"
                    );
                } else {
                    self.stop_effect(id, effect_id, StopReason::Verb, false);
                }
                Verdict::BLOCKED
            }
            Gate::Absorb => {
                debug!(
                    target: "runtime::effects",
                    entity = %id,
                    effect = %effect_id,
                    verb,
                    args,
                    "command absorbed"
                );
                if let Some(message) = &fail_message {
                    self.messenger.deliver(id, message);
                }
                if wizard {
                    // Privileged entities see the message but are never
                    // actually restrained.
                    Verdict::PASS
                } else {
                    Verdict::BLOCKED
                }
            }
        }
    }
}
