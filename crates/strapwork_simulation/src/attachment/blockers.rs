//! Capability queries: может ли entity двигаться / поворачиваться / падать
//!
//! Выводятся напрямую из `Attachable` state, поэтому всегда согласованы с link'ом
//! (не только в момент transition). Entity без `Attachable` ничем не ограничен.

use bevy::prelude::*;

use crate::attachment::components::Attachable;

impl Attachable {
    /// Пристёгнутый entity не двигается и не поворачивается
    pub fn blocks_movement(&self) -> bool {
        self.is_attached()
    }

    /// Пристёгнутый entity не может упасть (strap держит)
    pub fn prevents_fall(&self) -> bool {
        self.is_attached()
    }
}

pub fn can_move(world: &World, entity: Entity) -> bool {
    !world
        .get::<Attachable>(entity)
        .is_some_and(Attachable::blocks_movement)
}

pub fn can_change_direction(world: &World, entity: Entity) -> bool {
    can_move(world, entity)
}

pub fn can_fall(world: &World, entity: Entity) -> bool {
    !world
        .get::<Attachable>(entity)
        .is_some_and(Attachable::prevents_fall)
}
