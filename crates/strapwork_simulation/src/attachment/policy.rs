//! Validity policy: дистанция + cooldown
//!
//! Один и тот же range predicate используется и для Attach, и для non-forced Detach.

use bevy::prelude::*;

use crate::shared::SimulationTick;

/// Дистанция между двумя entity по `Transform` (None если у кого-то нет Transform)
pub fn distance_between(world: &World, a: Entity, b: Entity) -> Option<f32> {
    let a = world.get::<Transform>(a)?;
    let b = world.get::<Transform>(b)?;
    Some(a.translation.distance(b.translation))
}

/// Находится ли `anchor` в пределах `range` от `entity`
///
/// Entity без Transform считается вне досягаемости.
pub fn within_interaction_range(world: &World, entity: Entity, anchor: Entity, range: f32) -> bool {
    distance_between(world, entity, anchor).is_some_and(|distance| distance <= range)
}

/// Cooldown активен: дедлайн задан и ещё не наступил
pub fn cooldown_active(now: SimulationTick, deadline: Option<u64>) -> bool {
    !now.has_reached(deadline)
}
