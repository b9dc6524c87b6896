//! Attach / Detach / Toggle — единственное место, где меняется link
//!
//! Каждая операция:
//! 1. Валидирует всё (наличие ролей, link state, range, cooldown, capacity)
//! 2. Только потом мутирует ОБЕ стороны в одном вызове
//! 3. Отправляет `AttachStateChanged` после коммита
//!
//! Отказ = `Err(AttachError)` без каких-либо изменений state.
//! Все функции берут `&mut World` → single writer, без interleaving.

use bevy::ecs::event::Events;
use bevy::prelude::*;

use crate::attachment::components::{Anchor, Attachable};
use crate::attachment::config::AttachConfig;
use crate::attachment::error::AttachError;
use crate::attachment::events::{AttachSnapshot, AttachStateChanged};
use crate::attachment::policy::{cooldown_active, within_interaction_range};
use crate::logger::log;
use crate::shared::current_tick;

/// Пристегнуть `entity` к `anchor`
///
/// При успехе:
/// - `entity` linked к `anchor`, anchor получает member и `+size` occupied
/// - позиция `entity` = позиция `anchor`
/// - non-forced detach запрещён следующие `detach_cooldown_ticks`
///
/// Сам attach cooldown'ом не ограничен (re-attach сразу после detach разрешён).
pub fn try_attach(world: &mut World, entity: Entity, anchor: Entity) -> Result<(), AttachError> {
    let config = attach_config(world);
    let now = current_tick(world);

    let attachable = world
        .get::<Attachable>(entity)
        .ok_or(AttachError::NotAttachable(entity))?;
    if entity == anchor {
        return Err(AttachError::SelfAttach(entity));
    }
    if attachable.is_attached() {
        return Err(AttachError::AlreadyLinked(entity));
    }
    let size = attachable.size();

    let strap = world
        .get::<Anchor>(anchor)
        .ok_or(AttachError::NotAnAnchor(anchor))?;
    let remaining = strap.remaining();
    let has_room = strap.has_room_for(size);

    if !within_interaction_range(world, entity, anchor, config.interaction_range) {
        return Err(AttachError::OutOfRange { entity, anchor });
    }
    if !has_room {
        return Err(AttachError::CapacityExceeded {
            anchor,
            requested: size,
            remaining,
        });
    }

    // Коммит: сначала anchor (единственная мутация, которая может отказать),
    // потом attachable и transform
    let added = world
        .get_mut::<Anchor>(anchor)
        .is_some_and(|mut strap| strap.add_member(entity, size));
    if !added {
        return Err(AttachError::CapacityExceeded {
            anchor,
            requested: size,
            remaining,
        });
    }

    let snapshot = world.get_mut::<Attachable>(entity).map(|mut attachable| {
        attachable.link(anchor, now.after(config.detach_cooldown_ticks));
        AttachSnapshot::of(&attachable)
    });

    if let Some(anchor_position) = world.get::<Transform>(anchor).map(|t| t.translation) {
        if let Some(mut transform) = world.get_mut::<Transform>(entity) {
            transform.translation = anchor_position;
        }
    }

    if let Some(snapshot) = snapshot {
        emit_state_changed(world, entity, snapshot);
    }

    log(&format!(
        "🔗 {:?} attached to {:?} (tick {}, size {})",
        entity,
        anchor,
        now.get(),
        size
    ));

    Ok(())
}

/// Отстегнуть `entity` от текущего anchor
///
/// `force = true` пропускает cooldown и range (разрушение anchor, stun, knockback).
/// При успехе cooldown перевзводится на `now + detach_cooldown_ticks`.
pub fn try_detach(world: &mut World, entity: Entity, force: bool) -> Result<(), AttachError> {
    let config = attach_config(world);
    let now = current_tick(world);

    let attachable = world
        .get::<Attachable>(entity)
        .ok_or(AttachError::NotAttachable(entity))?;
    let Some(anchor) = attachable.anchor() else {
        return Err(AttachError::NotLinked(entity));
    };
    let size = attachable.size();
    let deadline = attachable.detach_cooldown_until();

    if !force {
        if cooldown_active(now, deadline) {
            return Err(AttachError::CooldownActive {
                until: deadline.unwrap_or_default(),
            });
        }
        if !within_interaction_range(world, entity, anchor, config.interaction_range) {
            return Err(AttachError::OutOfRange { entity, anchor });
        }
    }

    // Anchor мог уже исчезнуть только если его hook не отработал — снимаем link в любом случае
    if let Some(mut strap) = world.get_mut::<Anchor>(anchor) {
        strap.remove_member(entity, size);
    }

    let snapshot = world.get_mut::<Attachable>(entity).map(|mut attachable| {
        attachable.unlink(Some(now.after(config.detach_cooldown_ticks)));
        AttachSnapshot::of(&attachable)
    });

    if let Some(snapshot) = snapshot {
        emit_state_changed(world, entity, snapshot);
    }

    log(&format!(
        "🔓 {:?} detached from {:?} (tick {}, forced: {})",
        entity,
        anchor,
        now.get(),
        force
    ));

    Ok(())
}

/// Attach если свободен, иначе non-forced Detach
pub fn toggle_attach(world: &mut World, entity: Entity, anchor: Entity) -> Result<(), AttachError> {
    let attached = world
        .get::<Attachable>(entity)
        .ok_or(AttachError::NotAttachable(entity))?
        .is_attached();

    if attached {
        try_detach(world, entity, false)
    } else {
        try_attach(world, entity, anchor)
    }
}

/// Forced detach всех members anchor (например strap сломан)
///
/// Возвращает сколько entity было отстёгнуто.
pub fn release_all(world: &mut World, anchor: Entity) -> Result<usize, AttachError> {
    let members = world
        .get::<Anchor>(anchor)
        .ok_or(AttachError::NotAnAnchor(anchor))?
        .members()
        .to_vec();

    let released = members
        .into_iter()
        .filter(|&member| try_detach(world, member, true).is_ok())
        .count();

    Ok(released)
}

fn attach_config(world: &World) -> AttachConfig {
    world
        .get_resource::<AttachConfig>()
        .cloned()
        .unwrap_or_default()
}

/// Отправить snapshot (если события зарегистрированы AttachmentPlugin)
pub(crate) fn emit_state_changed(world: &mut World, entity: Entity, snapshot: AttachSnapshot) {
    if let Some(mut events) = world.get_resource_mut::<Events<AttachStateChanged>>() {
        events.send(AttachStateChanged { entity, snapshot });
    }
}
