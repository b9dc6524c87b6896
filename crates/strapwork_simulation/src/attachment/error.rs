//! Причины отказа attach/detach
//!
//! Все варианты — нормальные исходы interaction попыток, не фатальные ошибки.
//! Caller может повторить или сделать branch по варианту.

use bevy::prelude::Entity;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AttachError {
    #[error("entity {0:?} is already attached")]
    AlreadyLinked(Entity),

    #[error("anchor {anchor:?} has {remaining} capacity left, {requested} requested")]
    CapacityExceeded {
        anchor: Entity,
        requested: u32,
        remaining: u32,
    },

    #[error("{entity:?} is out of interaction range of {anchor:?}")]
    OutOfRange { entity: Entity, anchor: Entity },

    #[error("detach on cooldown until tick {until}")]
    CooldownActive { until: u64 },

    #[error("entity {0:?} is not attached")]
    NotLinked(Entity),

    #[error("entity {0:?} cannot be attached")]
    NotAttachable(Entity),

    #[error("entity {0:?} is not an anchor")]
    NotAnAnchor(Entity),

    #[error("entity {0:?} cannot attach to itself")]
    SelfAttach(Entity),
}
