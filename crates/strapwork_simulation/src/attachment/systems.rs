//! Attachment systems (FixedUpdate)

use bevy::ecs::event::{EventCursor, Events};
use bevy::prelude::*;

use crate::attachment::events::{AttachIntent, AttachIntentKind, AttachRejected};
use crate::attachment::orchestration::{toggle_attach, try_attach, try_detach};
use crate::logger::log;

/// System: обработка AttachIntent событий
///
/// Exclusive (`&mut World`): orchestration мутирует обе стороны link'а,
/// двигает Transform и пишет события — проще и безопаснее одним writer'ом.
/// Интенты обрабатываются в порядке отправки.
pub fn process_attach_intents(world: &mut World, mut cursor: Local<EventCursor<AttachIntent>>) {
    let Some(events) = world.get_resource::<Events<AttachIntent>>() else {
        return;
    };
    let intents: Vec<AttachIntent> = cursor.read(events).cloned().collect();

    for intent in intents {
        let result = match intent.kind {
            AttachIntentKind::Attach => try_attach(world, intent.entity, intent.anchor),
            AttachIntentKind::Detach { force } => try_detach(world, intent.entity, force),
            AttachIntentKind::Toggle => toggle_attach(world, intent.entity, intent.anchor),
        };

        let Err(reason) = result else {
            continue;
        };

        log(&format!(
            "AttachIntent {:?} for {:?} rejected: {}",
            intent.kind, intent.entity, reason
        ));

        let anchor = match intent.kind {
            AttachIntentKind::Detach { .. } => None,
            _ => Some(intent.anchor),
        };
        if let Some(mut rejected) = world.get_resource_mut::<Events<AttachRejected>>() {
            rejected.send(AttachRejected {
                entity: intent.entity,
                anchor,
                reason,
            });
        }
    }
}
