//! Attachment domain — buckle/strap state machine
//!
//! Две роли:
//! - `Attachable` ("buckle"): пристёгивается максимум к одному anchor
//! - `Anchor` ("strap"): держит несколько attachable до `max_capacity`
//!
//! # State machine
//! `Unattached` ⇄ `Attached(anchor)`, начальное состояние `Unattached`.
//! - Attach: не linked + в range + есть capacity → snap позиции к anchor
//! - Detach: linked + cooldown прошёл + в range (force пропускает оба гейта)
//! - Toggle: Attach или Detach в зависимости от текущего state
//!
//! # Flow
//! - Gameplay код: `try_attach` / `try_detach` / `toggle_attach` напрямую на `World`
//! - Input/AI: `AttachIntent` → `process_attach_intents` (FixedUpdate)
//! - Результат: `AttachStateChanged` (snapshot для сети) или `AttachRejected`
//! - Despawn любой стороны → component hooks отстёгивают другую сторону

use bevy::prelude::*;

pub mod audit;
pub mod blockers;
pub mod components;
pub mod config;
pub mod error;
pub mod events;
pub mod orchestration;
pub mod policy;
pub mod systems;

#[cfg(test)]
mod orchestration_tests;

// Re-exports
pub use audit::{verify_link_consistency, LinkViolation};
pub use blockers::{can_change_direction, can_fall, can_move};
pub use components::{Anchor, Attachable, DEFAULT_ANCHOR_CAPACITY, DEFAULT_ATTACHABLE_SIZE};
pub use config::{AttachConfig, DEFAULT_DETACH_COOLDOWN_TICKS, DEFAULT_INTERACTION_RANGE};
pub use error::AttachError;
pub use events::{AttachIntent, AttachIntentKind, AttachRejected, AttachSnapshot, AttachStateChanged};
pub use orchestration::{release_all, toggle_attach, try_attach, try_detach};
pub use policy::{distance_between, within_interaction_range};
pub use systems::process_attach_intents;

use crate::shared::ClockPlugin;

/// Attachment Plugin
///
/// Регистрирует события, `AttachConfig` и обработку intent'ов в FixedUpdate.
/// Logical clock (`SimulationTick`) подключается автоматически, если его ещё нет.
#[derive(Default)]
pub struct AttachmentPlugin {
    pub config: AttachConfig,
}

impl AttachmentPlugin {
    pub fn with_config(config: AttachConfig) -> Self {
        Self { config }
    }
}

impl Plugin for AttachmentPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<ClockPlugin>() {
            app.add_plugins(ClockPlugin);
        }

        app.insert_resource(self.config.clone())
            .add_event::<AttachIntent>()
            .add_event::<AttachStateChanged>()
            .add_event::<AttachRejected>()
            .add_systems(FixedUpdate, process_attach_intents);
    }
}
