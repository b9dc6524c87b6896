//! Attachable / Anchor компоненты + lifecycle hooks
//!
//! Связь двусторонняя: `Attachable::anchor` ↔ `Anchor::members`.
//! Мутирует её только `orchestration` (и hooks ниже), поэтому все поля,
//! от которых зависит link/capacity инвариант, приватные.
//!
//! Hooks:
//! - `on_replace` (remove, despawn И повторный insert поверх старого значения) →
//!   другая сторона link'а освобождается
//! - `on_insert` → link, скопированный через `Clone`, сбрасывается: link
//!   появляется только через orchestration

use bevy::ecs::component::HookContext;
use bevy::ecs::event::Events;
use bevy::ecs::world::DeferredWorld;
use bevy::prelude::*;

use crate::attachment::events::{AttachSnapshot, AttachStateChanged};
use crate::logger::{log_info, log_warning};

/// Размер attachable по умолчанию (один buckle занимает весь default strap)
pub const DEFAULT_ATTACHABLE_SIZE: u32 = 100;

/// Вместимость anchor по умолчанию
pub const DEFAULT_ANCHOR_CAPACITY: u32 = 100;

/// Attachable ("buckle") — entity который можно пристегнуть к одному Anchor
///
/// Инварианты:
/// - linked максимум к одному Anchor
/// - `size` фиксирован и учитывается в `Anchor::occupied` только пока linked
///
/// Remove / despawn / повторный insert пока linked → release на стороне Anchor.
#[derive(Component, Debug, Clone, PartialEq)]
#[component(
    storage = "SparseSet",
    on_replace = release_from_anchor_on_replace,
    on_insert = drop_copied_anchor_link
)]
pub struct Attachable {
    size: u32,
    anchor: Option<Entity>,
    /// Тик, до которого non-forced detach запрещён
    detach_cooldown_until: Option<u64>,
}

impl Default for Attachable {
    fn default() -> Self {
        Self::with_size(DEFAULT_ATTACHABLE_SIZE)
    }
}

impl Attachable {
    pub fn with_size(size: u32) -> Self {
        Self {
            size,
            anchor: None,
            detach_cooldown_until: None,
        }
    }

    /// Сколько capacity занимает на anchor
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Anchor, к которому пристёгнут (None = Unattached)
    pub fn anchor(&self) -> Option<Entity> {
        self.anchor
    }

    pub fn is_attached(&self) -> bool {
        self.anchor.is_some()
    }

    pub fn detach_cooldown_until(&self) -> Option<u64> {
        self.detach_cooldown_until
    }

    pub(crate) fn link(&mut self, anchor: Entity, cooldown_until: u64) {
        self.anchor = Some(anchor);
        self.detach_cooldown_until = Some(cooldown_until);
    }

    pub(crate) fn unlink(&mut self, cooldown_until: Option<u64>) -> Option<Entity> {
        if cooldown_until.is_some() {
            self.detach_cooldown_until = cooldown_until;
        }
        self.anchor.take()
    }
}

/// Anchor ("strap") — entity который держит несколько Attachable до `max_capacity`
///
/// Инвариант: `occupied == Σ size(members) <= max_capacity`.
/// Remove / despawn / повторный insert → все members принудительно отстёгиваются.
#[derive(Component, Debug, Clone, PartialEq)]
#[component(
    storage = "SparseSet",
    on_replace = release_members_on_replace,
    on_insert = drop_copied_members
)]
pub struct Anchor {
    max_capacity: u32,
    members: Vec<Entity>,
    occupied: u32,
}

impl Default for Anchor {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_ANCHOR_CAPACITY)
    }
}

impl Anchor {
    pub fn with_capacity(max_capacity: u32) -> Self {
        Self {
            max_capacity,
            members: Vec::new(),
            occupied: 0,
        }
    }

    pub fn max_capacity(&self) -> u32 {
        self.max_capacity
    }

    pub fn members(&self) -> &[Entity] {
        &self.members
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.members.contains(&entity)
    }

    pub fn occupied(&self) -> u32 {
        self.occupied
    }

    pub fn remaining(&self) -> u32 {
        self.max_capacity.saturating_sub(self.occupied)
    }

    /// Влезет ли ещё `size` (чистая проверка, без side effects)
    pub fn has_room_for(&self, size: u32) -> bool {
        self.occupied
            .checked_add(size)
            .is_some_and(|total| total <= self.max_capacity)
    }

    /// Добавить member; false если уже есть или не влезает
    pub(crate) fn add_member(&mut self, entity: Entity, size: u32) -> bool {
        if self.contains(entity) || !self.has_room_for(size) {
            return false;
        }
        self.members.push(entity);
        self.occupied += size;
        true
    }

    /// Убрать member; false если его не было
    ///
    /// `size` фиксирован у attachable, поэтому вычитается ровно то, что было добавлено.
    pub(crate) fn remove_member(&mut self, entity: Entity, size: u32) -> bool {
        let Some(index) = self.members.iter().position(|&member| member == entity) else {
            return false;
        };
        self.members.swap_remove(index);
        self.occupied -= size;
        true
    }
}

// ============================================================================
// Lifecycle hooks
// ============================================================================

fn send_state_changed(world: &mut DeferredWorld, entity: Entity, snapshot: AttachSnapshot) {
    if let Some(mut events) = world.get_resource_mut::<Events<AttachStateChanged>>() {
        events.send(AttachStateChanged { entity, snapshot });
    }
}

/// Hook: старое значение Attachable уходит → убрать его из members своего anchor
fn release_from_anchor_on_replace(mut world: DeferredWorld, context: HookContext) {
    let entity = context.entity;
    let Some((anchor, size)) = world
        .get::<Attachable>(entity)
        .and_then(|attachable| attachable.anchor.map(|anchor| (anchor, attachable.size)))
    else {
        return;
    };

    let removed = world
        .get_mut::<Anchor>(anchor)
        .is_some_and(|mut strap| strap.remove_member(entity, size));

    if removed {
        send_state_changed(
            &mut world,
            entity,
            AttachSnapshot {
                attached: false,
                anchor: None,
            },
        );
        log_info(&format!(
            "Attachable {:?} replaced or removed while attached, released from anchor {:?}",
            entity, anchor
        ));
    }
}

/// Hook: новое значение Attachable пришло с link'ом (Clone linked компонента) → сбросить
fn drop_copied_anchor_link(mut world: DeferredWorld, context: HookContext) {
    let Some(mut attachable) = world.get_mut::<Attachable>(context.entity) else {
        return;
    };
    if let Some(anchor) = attachable.anchor.take() {
        log_warning(&format!(
            "Attachable inserted on {:?} with a copied link to {:?}, link dropped",
            context.entity, anchor
        ));
    }
}

/// Hook: старое значение Anchor уходит → forced detach всех members
fn release_members_on_replace(mut world: DeferredWorld, context: HookContext) {
    let anchor = context.entity;
    let Some(members) = world
        .get::<Anchor>(anchor)
        .map(|strap| strap.members.clone())
    else {
        return;
    };

    for member in members {
        let Some(mut attachable) = world.get_mut::<Attachable>(member) else {
            continue;
        };
        if attachable.anchor != Some(anchor) {
            continue;
        }
        attachable.unlink(None);
        let snapshot = AttachSnapshot::of(&attachable);

        send_state_changed(&mut world, member, snapshot);

        log_info(&format!(
            "Anchor {:?} replaced or removed, force-released {:?}",
            anchor, member
        ));
    }

    if let Some(mut strap) = world.get_mut::<Anchor>(anchor) {
        strap.members.clear();
        strap.occupied = 0;
    }
}

/// Hook: новое значение Anchor пришло с members (Clone занятого anchor) → сбросить
fn drop_copied_members(mut world: DeferredWorld, context: HookContext) {
    let Some(mut strap) = world.get_mut::<Anchor>(context.entity) else {
        return;
    };
    if strap.members.is_empty() && strap.occupied == 0 {
        return;
    }
    strap.members.clear();
    strap.occupied = 0;
    log_warning(&format!(
        "Anchor inserted on {:?} with copied members, members dropped",
        context.entity
    ));
}
