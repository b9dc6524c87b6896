//! Logical clock симуляции
//!
//! Cooldown'ы считаются в тиках, а не в wall-clock секундах:
//! одинаковый input → одинаковый результат при replay и в тестах.

use bevy::prelude::*;

/// Номер текущего fixed тика (60Hz)
///
/// Монотонный, увеличивается ровно на 1 за каждый проход FixedMain.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Reflect)]
#[reflect(Resource)]
pub struct SimulationTick(pub u64);

impl SimulationTick {
    pub fn get(&self) -> u64 {
        self.0
    }

    /// Тик через `ticks` от текущего (насыщающее сложение)
    pub fn after(&self, ticks: u64) -> u64 {
        self.0.saturating_add(ticks)
    }

    /// Наступил ли дедлайн (None = ограничения нет)
    pub fn has_reached(&self, deadline: Option<u64>) -> bool {
        deadline.map_or(true, |deadline| self.0 >= deadline)
    }
}

/// Clock Plugin: `SimulationTick` + инкремент в FixedFirst
pub struct ClockPlugin;

impl Plugin for ClockPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimulationTick>()
            .add_systems(FixedFirst, advance_simulation_tick);
    }
}

/// System: продвинуть logical clock (FixedFirst, до всех gameplay систем)
pub fn advance_simulation_tick(mut tick: ResMut<SimulationTick>) {
    tick.0 += 1;
}

/// Текущий тик из World (0 если clock ещё не установлен)
pub fn current_tick(world: &World) -> SimulationTick {
    world
        .get_resource::<SimulationTick>()
        .copied()
        .unwrap_or_default()
}
