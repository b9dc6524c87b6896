//! Проверка link/capacity согласованности
//!
//! Для тестов и debug overlay. При корректной работе orchestration список
//! нарушений всегда пустой.

use bevy::prelude::*;

use crate::attachment::components::{Anchor, Attachable};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkViolation {
    /// Attachable ссылается на entity без Anchor
    DanglingAnchor { entity: Entity, anchor: Entity },
    /// Attachable ссылается на anchor, но anchor его не содержит
    MissingMember { entity: Entity, anchor: Entity },
    /// Anchor содержит entity, который ссылается не на него (или не Attachable)
    StrayMember { anchor: Entity, member: Entity },
    DuplicateMember { anchor: Entity, member: Entity },
    OccupiedMismatch { anchor: Entity, occupied: u32, expected: u32 },
    OverCapacity { anchor: Entity, occupied: u32, max_capacity: u32 },
}

pub fn verify_link_consistency(world: &mut World) -> Vec<LinkViolation> {
    let mut violations = Vec::new();

    let mut attachables = world.query::<(Entity, &Attachable)>();
    let mut anchors = world.query::<(Entity, &Anchor)>();

    for (entity, attachable) in attachables.iter(world) {
        let Some(anchor) = attachable.anchor() else {
            continue;
        };
        match world.get::<Anchor>(anchor) {
            None => violations.push(LinkViolation::DanglingAnchor { entity, anchor }),
            Some(strap) if !strap.contains(entity) => {
                violations.push(LinkViolation::MissingMember { entity, anchor })
            }
            Some(_) => {}
        }
    }

    for (anchor, strap) in anchors.iter(world) {
        let mut expected: u32 = 0;

        for (index, &member) in strap.members().iter().enumerate() {
            if strap.members()[..index].contains(&member) {
                violations.push(LinkViolation::DuplicateMember { anchor, member });
            }
            match world.get::<Attachable>(member) {
                Some(attachable) if attachable.anchor() == Some(anchor) => {
                    expected = expected.saturating_add(attachable.size());
                }
                _ => violations.push(LinkViolation::StrayMember { anchor, member }),
            }
        }

        if strap.occupied() != expected {
            violations.push(LinkViolation::OccupiedMismatch {
                anchor,
                occupied: strap.occupied(),
                expected,
            });
        }
        if strap.occupied() > strap.max_capacity() {
            violations.push(LinkViolation::OverCapacity {
                anchor,
                occupied: strap.occupied(),
                max_capacity: strap.max_capacity(),
            });
        }
    }

    violations
}
