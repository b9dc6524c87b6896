//! Attachment events + replicated snapshot
//!
//! # Flow
//! - Input/AI/interaction layer → `AttachIntent`
//! - `process_attach_intents` → orchestration → `AttachStateChanged` | `AttachRejected`
//! - Network/UI слой читает `AttachStateChanged` и реплицирует `AttachSnapshot`

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::attachment::components::Attachable;
use crate::attachment::error::AttachError;

/// Что именно хочет сделать entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachIntentKind {
    Attach,
    Detach { force: bool },
    /// Attach если свободен, non-forced Detach если пристёгнут
    Toggle,
}

/// Intent: пристегнуть / отстегнуть entity
///
/// `anchor` нужен для Attach/Toggle, для Detach игнорируется
/// (отстёгиваемся от текущего anchor).
#[derive(Event, Debug, Clone)]
pub struct AttachIntent {
    pub entity: Entity,
    pub anchor: Entity,
    pub kind: AttachIntentKind,
}

impl AttachIntent {
    pub fn attach(entity: Entity, anchor: Entity) -> Self {
        Self {
            entity,
            anchor,
            kind: AttachIntentKind::Attach,
        }
    }

    pub fn detach(entity: Entity, force: bool) -> Self {
        Self {
            entity,
            anchor: Entity::PLACEHOLDER,
            kind: AttachIntentKind::Detach { force },
        }
    }

    pub fn toggle(entity: Entity, anchor: Entity) -> Self {
        Self {
            entity,
            anchor,
            kind: AttachIntentKind::Toggle,
        }
    }
}

/// Минимальное replicated состояние attachable
///
/// `anchor` хранится как `Entity::to_bits()` — стабильный u64 для wire формата.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachSnapshot {
    pub attached: bool,
    pub anchor: Option<u64>,
}

impl AttachSnapshot {
    /// Чистая деривация из текущего состояния (без side effects)
    pub fn of(attachable: &Attachable) -> Self {
        Self {
            attached: attachable.is_attached(),
            anchor: attachable.anchor().map(Entity::to_bits),
        }
    }

    pub fn anchor_entity(&self) -> Option<Entity> {
        self.anchor.map(Entity::from_bits)
    }
}

/// Event: transition закоммичен (attach, detach, forced release)
///
/// Отправляется строго ПОСЛЕ того как обе стороны обновлены.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct AttachStateChanged {
    pub entity: Entity,
    pub snapshot: AttachSnapshot,
}

/// Event: intent отклонён (для popup'ов / звуков в UI)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct AttachRejected {
    pub entity: Entity,
    pub anchor: Option<Entity>,
    pub reason: AttachError,
}
