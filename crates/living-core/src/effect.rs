//! Paralysis-style status effects.
//!
//! An effect sits on a living entity and filters every command the
//! entity issues until it is stopped by its verb, its timeout, or an
//! incoming attack. The decision logic here is pure; callback
//! resolution, message delivery, and timer wiring happen in the runtime.
use std::fmt;

use crate::common::EntityId;
use crate::timeline::TaskHandle;

/// Identifier of one active effect instance, assigned by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectId(pub u64);

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "effect#{}", self.0)
    }
}

/// Opaque message payload, rendered by the presentation layer.
///
/// `Computed` names a presentation-side callback evaluated at delivery
/// time; the core never resolves it.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Message {
    Literal(String),
    Computed(String),
}

impl Message {
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Literal(text.into())
    }
}

/// Stop-callback reference: the owning entity plus the operation name
/// resolved through the runtime callback table. Kept as plain data so
/// effect instances serialize.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StopCallback {
    pub owner: EntityId,
    pub name: String,
}

impl StopCallback {
    pub fn new(owner: EntityId, name: impl Into<String>) -> Self {
        Self {
            owner,
            name: name.into(),
        }
    }
}

/// Why an effect left the `Active` state. All three are terminal; the
/// instance is destroyed on entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    Verb,
    Timeout,
    Combat,
}

/// Pure per-command decision of a single effect instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gate {
    /// The command proceeds untouched.
    Pass,
    /// The command is the stop verb; the runtime resolves the veto.
    Stop,
    /// The effect absorbs the command and delivers the fail message.
    Absorb,
}

/// Everything that configures an effect, without the runtime-assigned
/// identity or timer. This is also the shape that persists.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectSpec {
    /// Verb that ends the effect, if any.
    pub stop_verb: Option<String>,
    /// Callback consulted when the effect stops. On a verb stop a truthy
    /// result vetoes the stop; timeout and combat ignore the result.
    pub stop_callback: Option<StopCallback>,
    /// Delivered to the actor when a command is absorbed.
    pub fail_message: Option<Message>,
    /// Delivered to the owner when the effect stops.
    pub stop_message: Option<Message>,
    /// Automatic expiry in ticks. None means the effect never times out.
    pub duration: Option<u64>,
    /// Stop immediately when the owner is attacked.
    pub combat_breaks: bool,
    /// Let speech commands (leading apostrophe) through.
    pub talk_allowed: bool,
    /// Extra verbs this specific effect allows.
    pub allowed_verbs: Vec<String>,
}

impl EffectSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Standard settings: stopped by 'stop', generic busy messages
    /// parameterized by the activity name.
    pub fn standard(activity: &str) -> Self {
        Self {
            stop_verb: Some("stop".to_owned()),
            stop_message: Some(Message::literal(format!("You stop {activity}.\n"))),
            fail_message: Some(Message::literal(
                "You are busy with other things right now. You must 'stop' \
                 to do something else.\n",
            )),
            ..Self::default()
        }
    }

    pub fn with_stop_verb(mut self, verb: impl Into<String>) -> Self {
        self.stop_verb = Some(verb.into());
        self
    }

    pub fn with_stop_callback(mut self, callback: StopCallback) -> Self {
        self.stop_callback = Some(callback);
        self
    }

    pub fn with_fail_message(mut self, message: Message) -> Self {
        self.fail_message = Some(message);
        self
    }

    pub fn with_stop_message(mut self, message: Message) -> Self {
        self.stop_message = Some(message);
        self
    }

    pub fn with_duration(mut self, ticks: u64) -> Self {
        self.duration = Some(ticks);
        self
    }

    pub fn with_combat_breaks(mut self, breaks: bool) -> Self {
        self.combat_breaks = breaks;
        self
    }

    pub fn with_talk_allowed(mut self, allowed: bool) -> Self {
        self.talk_allowed = allowed;
        self
    }

    pub fn with_allowed_verbs<I, S>(mut self, verbs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_verbs = verbs.into_iter().map(Into::into).collect();
        self
    }
}

/// One active effect instance on an entity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Effect {
    pub id: EffectId,
    pub spec: EffectSpec,
    /// Handle of the pending timeout task, cancelled on destruction.
    /// Not persisted; rebuilt from the remaining duration on load.
    pub timer: Option<TaskHandle>,
}

impl Effect {
    pub fn from_spec(id: EffectId, spec: EffectSpec) -> Self {
        Self {
            id,
            spec,
            timer: None,
        }
    }

    /// Decides what this effect does with one incoming verb.
    ///
    /// Order matters: the global allow-list and per-effect verbs pass
    /// first, then speech while talkable, then the stop verb; anything
    /// else is absorbed.
    pub fn gate(&self, verb: &str, always_allowed: &[String]) -> Gate {
        if always_allowed.iter().any(|allowed| allowed == verb) {
            return Gate::Pass;
        }
        if self.spec.allowed_verbs.iter().any(|allowed| allowed == verb) {
            return Gate::Pass;
        }
        if self.spec.talk_allowed && verb.starts_with('\'') {
            return Gate::Pass;
        }
        if self.spec.stop_verb.as_deref() == Some(verb) {
            return Gate::Stop;
        }
        Gate::Absorb
    }
}
