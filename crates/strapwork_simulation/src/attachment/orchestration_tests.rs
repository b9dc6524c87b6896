//! Tests for attach / detach / toggle orchestration.

#[cfg(test)]
mod tests {
    use bevy::ecs::event::Events;
    use bevy::prelude::*;

    use crate::attachment::events::{AttachSnapshot, AttachStateChanged};
    use crate::attachment::*;
    use crate::shared::SimulationTick;

    struct Fixture {
        world: World,
        human: Entity,
        chair: Entity,
    }

    fn fixture() -> Fixture {
        let mut world = World::new();
        world.insert_resource(AttachConfig::default());
        world.insert_resource(SimulationTick(0));
        world.init_resource::<Events<AttachStateChanged>>();

        let chair = world
            .spawn((Anchor::default(), Transform::from_xyz(3.0, 0.0, 2.0)))
            .id();
        let human = world
            .spawn((Attachable::default(), Transform::from_xyz(3.5, 0.0, 2.0)))
            .id();

        Fixture { world, human, chair }
    }

    fn advance(world: &mut World, ticks: u64) {
        world.resource_mut::<SimulationTick>().0 += ticks;
    }

    fn last_snapshot(world: &World) -> Option<AttachStateChanged> {
        let events = world.resource::<Events<AttachStateChanged>>();
        events.iter_current_update_events().last().cloned()
    }

    #[test]
    fn test_attach_side_effects() {
        let Fixture { mut world, human, chair } = fixture();

        assert_eq!(try_attach(&mut world, human, chair), Ok(()));

        let attachable = world.get::<Attachable>(human).unwrap();
        assert_eq!(attachable.anchor(), Some(chair));
        assert!(attachable.is_attached());

        let anchor = world.get::<Anchor>(chair).unwrap();
        assert!(anchor.contains(human));
        assert_eq!(anchor.occupied(), DEFAULT_ATTACHABLE_SIZE);

        assert!(!can_move(&world, human));
        assert!(!can_change_direction(&world, human));
        assert!(!can_fall(&world, human));

        // Snap к позиции anchor
        assert_eq!(
            world.get::<Transform>(human).unwrap().translation,
            Vec3::new(3.0, 0.0, 2.0)
        );

        let changed = last_snapshot(&world).unwrap();
        assert_eq!(changed.entity, human);
        assert_eq!(
            changed.snapshot,
            AttachSnapshot {
                attached: true,
                anchor: Some(chair.to_bits()),
            }
        );
        assert_eq!(changed.snapshot.anchor_entity(), Some(chair));
    }

    #[test]
    fn test_reattach_rejected() {
        let Fixture { mut world, human, chair } = fixture();
        let other = world
            .spawn((Anchor::with_capacity(500), Transform::from_xyz(3.0, 0.0, 2.5)))
            .id();

        try_attach(&mut world, human, chair).unwrap();
        let before = world.get::<Anchor>(chair).unwrap().clone();

        assert_eq!(
            try_attach(&mut world, human, chair),
            Err(AttachError::AlreadyLinked(human))
        );
        assert_eq!(
            try_attach(&mut world, human, other),
            Err(AttachError::AlreadyLinked(human))
        );

        assert_eq!(world.get::<Anchor>(chair).unwrap(), &before);
        assert_eq!(world.get::<Anchor>(other).unwrap().occupied(), 0);
        assert_eq!(world.get::<Attachable>(human).unwrap().anchor(), Some(chair));
    }

    #[test]
    fn test_detach_cooldown_gate() {
        let Fixture { mut world, human, chair } = fixture();
        try_attach(&mut world, human, chair).unwrap();

        // Сразу после attach — cooldown
        assert_eq!(
            try_detach(&mut world, human, false),
            Err(AttachError::CooldownActive {
                until: DEFAULT_DETACH_COOLDOWN_TICKS
            })
        );
        assert!(toggle_attach(&mut world, human, chair).is_err());
        assert!(world.get::<Attachable>(human).unwrap().is_attached());

        advance(&mut world, DEFAULT_DETACH_COOLDOWN_TICKS - 1);
        assert!(try_detach(&mut world, human, false).is_err());

        advance(&mut world, 1);
        assert_eq!(try_detach(&mut world, human, false), Ok(()));

        let attachable = world.get::<Attachable>(human).unwrap();
        assert!(!attachable.is_attached());
        assert_eq!(
            attachable.detach_cooldown_until(),
            Some(2 * DEFAULT_DETACH_COOLDOWN_TICKS)
        );
        assert!(can_move(&world, human));
        assert!(can_change_direction(&world, human));
        assert!(can_fall(&world, human));

        let anchor = world.get::<Anchor>(chair).unwrap();
        assert!(anchor.members().is_empty());
        assert_eq!(anchor.occupied(), 0);
    }

    #[test]
    fn test_reattach_after_detach_has_no_cooldown() {
        let Fixture { mut world, human, chair } = fixture();
        try_attach(&mut world, human, chair).unwrap();
        advance(&mut world, 60);
        try_detach(&mut world, human, false).unwrap();

        // Re-attach в том же тике
        assert_eq!(try_attach(&mut world, human, chair), Ok(()));

        // Но detach снова на cooldown
        assert!(matches!(
            try_detach(&mut world, human, false),
            Err(AttachError::CooldownActive { .. })
        ));
    }

    #[test]
    fn test_detach_not_linked() {
        let Fixture { mut world, human, .. } = fixture();

        assert_eq!(
            try_detach(&mut world, human, false),
            Err(AttachError::NotLinked(human))
        );
        assert_eq!(
            try_detach(&mut world, human, true),
            Err(AttachError::NotLinked(human))
        );
        assert!(last_snapshot(&world).is_none());
    }

    #[test]
    fn test_range_gate() {
        let Fixture { mut world, human, chair } = fixture();

        world.get_mut::<Transform>(human).unwrap().translation += Vec3::new(1000.0, 1000.0, 0.0);

        assert_eq!(
            try_attach(&mut world, human, chair),
            Err(AttachError::OutOfRange {
                entity: human,
                anchor: chair
            })
        );
        assert!(toggle_attach(&mut world, human, chair).is_err());
        assert_eq!(world.get::<Anchor>(chair).unwrap().occupied(), 0);

        // Обратно в range
        world.get_mut::<Transform>(human).unwrap().translation = Vec3::new(3.5, 0.0, 2.0);
        assert_eq!(try_attach(&mut world, human, chair), Ok(()));

        // Пристёгнут, но утащили далеко (desync) — non-forced detach отклонён
        advance(&mut world, 60);
        world.get_mut::<Transform>(human).unwrap().translation = Vec3::new(500.0, 0.0, 0.0);
        assert!(matches!(
            try_detach(&mut world, human, false),
            Err(AttachError::OutOfRange { .. })
        ));
        assert!(world.get::<Attachable>(human).unwrap().is_attached());

        // Вернули — detach проходит
        world.get_mut::<Transform>(human).unwrap().translation = Vec3::new(3.0, 0.0, 2.0);
        assert_eq!(try_detach(&mut world, human, false), Ok(()));
    }

    #[test]
    fn test_forced_detach_bypasses_gates() {
        let Fixture { mut world, human, chair } = fixture();
        try_attach(&mut world, human, chair).unwrap();

        // Cooldown активен + далеко
        world.get_mut::<Transform>(human).unwrap().translation = Vec3::splat(1000.0);

        assert_eq!(try_detach(&mut world, human, true), Ok(()));
        assert!(!world.get::<Attachable>(human).unwrap().is_attached());
        assert!(can_move(&world, human));
        assert!(can_change_direction(&world, human));
        assert!(can_fall(&world, human));
        assert_eq!(world.get::<Anchor>(chair).unwrap().occupied(), 0);

        let changed = last_snapshot(&world).unwrap();
        assert!(!changed.snapshot.attached);
        assert!(changed.snapshot.anchor.is_none());
    }

    #[test]
    fn test_capacity_ceiling() {
        let Fixture { mut world, human, chair } = fixture();
        let second = world
            .spawn((Attachable::default(), Transform::from_xyz(3.0, 0.0, 2.0)))
            .id();

        try_attach(&mut world, human, chair).unwrap();

        assert_eq!(
            try_attach(&mut world, second, chair),
            Err(AttachError::CapacityExceeded {
                anchor: chair,
                requested: DEFAULT_ATTACHABLE_SIZE,
                remaining: 0,
            })
        );

        let anchor = world.get::<Anchor>(chair).unwrap();
        assert_eq!(anchor.members(), &[human]);
        assert_eq!(anchor.occupied(), DEFAULT_ATTACHABLE_SIZE);
        assert!(!world.get::<Attachable>(second).unwrap().is_attached());
        assert!(can_move(&world, second));
    }

    #[test]
    fn test_role_validation() {
        let Fixture { mut world, human, chair } = fixture();
        let rock = world.spawn(Transform::from_xyz(3.0, 0.0, 2.0)).id();

        assert_eq!(
            try_attach(&mut world, rock, chair),
            Err(AttachError::NotAttachable(rock))
        );
        assert_eq!(
            try_attach(&mut world, human, rock),
            Err(AttachError::NotAnAnchor(rock))
        );
        assert_eq!(
            toggle_attach(&mut world, rock, chair),
            Err(AttachError::NotAttachable(rock))
        );

        // Entity с обеими ролями не может пристегнуться к себе
        world.entity_mut(chair).insert(Attachable::with_size(10));
        assert_eq!(
            try_attach(&mut world, chair, chair),
            Err(AttachError::SelfAttach(chair))
        );
    }

    #[test]
    fn test_toggle_roundtrip() {
        let Fixture { mut world, human, chair } = fixture();

        assert_eq!(toggle_attach(&mut world, human, chair), Ok(()));
        assert!(world.get::<Attachable>(human).unwrap().is_attached());

        advance(&mut world, DEFAULT_DETACH_COOLDOWN_TICKS);
        assert_eq!(toggle_attach(&mut world, human, chair), Ok(()));
        assert!(!world.get::<Attachable>(human).unwrap().is_attached());
    }

    #[test]
    fn test_release_all() {
        let Fixture { mut world, human, .. } = fixture();
        let bench = world
            .spawn((Anchor::with_capacity(300), Transform::from_xyz(3.2, 0.0, 2.0)))
            .id();
        let second = world
            .spawn((Attachable::default(), Transform::from_xyz(3.0, 0.0, 2.0)))
            .id();

        try_attach(&mut world, human, bench).unwrap();
        try_attach(&mut world, second, bench).unwrap();

        assert_eq!(release_all(&mut world, bench), Ok(2));
        assert_eq!(world.get::<Anchor>(bench).unwrap().occupied(), 0);
        assert!(can_move(&world, human));
        assert!(can_move(&world, second));
        assert!(verify_link_consistency(&mut world).is_empty());

        assert_eq!(
            release_all(&mut world, human),
            Err(AttachError::NotAnAnchor(human))
        );
    }

    #[test]
    fn test_custom_config() {
        let Fixture { mut world, human, chair } = fixture();
        world.insert_resource(AttachConfig {
            interaction_range: 0.1,
            detach_cooldown_ticks: 0,
        });

        // 0.5 > 0.1
        assert!(matches!(
            try_attach(&mut world, human, chair),
            Err(AttachError::OutOfRange { .. })
        ));

        world.get_mut::<Transform>(human).unwrap().translation = Vec3::new(3.0, 0.0, 2.0);
        try_attach(&mut world, human, chair).unwrap();

        // Без cooldown — detach в том же тике
        assert_eq!(try_detach(&mut world, human, false), Ok(()));
    }
}
