//! Seeded сценарий "зал ожидания": сиденья, скамейки и беспокойные пассажиры
//!
//! Используется headless бинарником и тестами детерминизма.
//! Каждый пассажир крутится возле своего "домашнего" anchor и иногда
//! шлёт Toggle intent — часть отклоняется cooldown'ом или capacity.

use bevy::prelude::*;
use rand::Rng;

use crate::attachment::{process_attach_intents, Anchor, AttachIntent, Attachable};
use crate::DeterministicRng;

/// Расстояние между anchor'ами (больше interaction range — не пересекаются)
pub const ANCHOR_SPACING: f32 = 4.0;

/// Разброс пассажира вокруг home anchor по X/Z (диагональ < interaction range)
pub const PASSENGER_SPREAD: f32 = 0.9;

/// Вместимость скамейки (три default attachable)
pub const BENCH_CAPACITY: u32 = 300;

#[derive(Debug, Clone, Copy)]
pub struct SeatingLayout {
    pub seats: usize,
    pub benches: usize,
    pub passengers: usize,
    /// Вероятность Toggle intent за тик
    pub restlessness: f64,
}

impl Default for SeatingLayout {
    fn default() -> Self {
        Self {
            seats: 6,
            benches: 2,
            passengers: 12,
            restlessness: 0.05,
        }
    }
}

/// Пассажир: к какому anchor тянется
#[derive(Component, Debug, Clone, Copy)]
pub struct Passenger {
    pub home: Entity,
}

/// Параметры сценария (resource для системы)
#[derive(Resource, Debug, Clone, Copy)]
pub struct Restlessness(pub f64);

/// Scenario Plugin: пассажиры шлют intent'ы ДО их обработки в том же тике
pub struct ScenarioPlugin {
    pub layout: SeatingLayout,
}

impl Plugin for ScenarioPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Restlessness(self.layout.restlessness))
            .add_systems(
                FixedUpdate,
                restless_passengers.before(process_attach_intents),
            );
    }
}

/// Спавнит anchors и пассажиров. Позиции берутся из `DeterministicRng`.
///
/// Возвращает anchors в порядке спавна (сначала сиденья, потом скамейки).
pub fn spawn_seating(world: &mut World, layout: SeatingLayout) -> Vec<Entity> {
    let mut anchors = Vec::with_capacity(layout.seats + layout.benches);

    for index in 0..layout.seats + layout.benches {
        let anchor = if index < layout.seats {
            Anchor::default()
        } else {
            Anchor::with_capacity(BENCH_CAPACITY)
        };
        let position = Vec3::new(index as f32 * ANCHOR_SPACING, 0.0, 0.0);
        anchors.push(world.spawn((anchor, Transform::from_translation(position))).id());
    }

    if anchors.is_empty() {
        return anchors;
    }

    for _ in 0..layout.passengers {
        let (home, offset) = {
            let mut rng = world.get_resource_or_insert_with(|| DeterministicRng::new(42));
            let home = anchors[rng.rng.gen_range(0..anchors.len())];
            let offset = Vec3::new(
                rng.rng.gen_range(-PASSENGER_SPREAD..PASSENGER_SPREAD),
                0.0,
                rng.rng.gen_range(-PASSENGER_SPREAD..PASSENGER_SPREAD),
            );
            (home, offset)
        };

        let home_position = world
            .get::<Transform>(home)
            .map(|transform| transform.translation)
            .unwrap_or_default();

        world.spawn((
            Passenger { home },
            Attachable::default(),
            Transform::from_translation(home_position + offset),
        ));
    }

    anchors
}

/// System: случайные Toggle intent'ы пассажиров
pub fn restless_passengers(
    passengers: Query<(Entity, &Passenger)>,
    restlessness: Res<Restlessness>,
    mut rng: ResMut<DeterministicRng>,
    mut intents: EventWriter<AttachIntent>,
) {
    for (entity, passenger) in passengers.iter() {
        if rng.rng.gen_bool(restlessness.0) {
            intents.write(AttachIntent::toggle(entity, passenger.home));
        }
    }
}
