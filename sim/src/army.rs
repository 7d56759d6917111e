//! Army compositions and deterministic deployment.
//!
//! Each half of the field is covered by a lattice of slots. Slots are handed
//! out front column first (nearest the midline), and within a column from the
//! centre row outward, so small armies meet in the middle of the arena.

use crate::components::Faction;
use crate::config::FieldConfig;
use crate::error::{Result, SimError};
use crate::vector::Vector;
use std::collections::BTreeMap;

/// Species name to head count. Ordered so spawn order is reproducible.
pub type Composition = BTreeMap<String, u32>;

/// Total head count of a composition.
pub fn head_count(composition: &Composition) -> usize {
    composition.values().map(|&n| n as usize).sum()
}

/// Lattice shape of one half: (columns, rows).
fn lattice(field: &FieldConfig) -> (usize, usize) {
    let spacing = field.deploy_spacing;
    if spacing <= 0.0 {
        return (0, 0);
    }
    let depth = field.midline() - 2.0 * field.deploy_margin;
    let half_height = field.height / 2.0 - field.deploy_margin;
    if depth < 0.0 || half_height < 0.0 {
        return (0, 0);
    }
    // Small epsilon so 5.5 / 0.5 lands on 11, not 10.999.
    let columns = (depth / spacing + 1e-4).floor() as usize + 1;
    let half_rows = (half_height / spacing + 1e-4).floor() as usize;
    (columns, 2 * half_rows + 1)
}

/// Number of combatants one side can deploy.
pub fn capacity(field: &FieldConfig) -> usize {
    let (columns, rows) = lattice(field);
    columns * rows
}

/// First `count` deployment slots of `faction`, in hand-out order.
pub fn deployment_slots(faction: Faction, count: usize, field: &FieldConfig) -> Result<Vec<Vector>> {
    let (columns, rows) = lattice(field);
    let available = columns * rows;
    if count > available {
        return Err(SimError::ArmyOverflow {
            faction,
            requested: count,
            capacity: available,
        });
    }

    let centre = field.height / 2.0;
    let spacing = field.deploy_spacing;
    let slots = (0..count)
        .map(|i| {
            let column = (i / rows) as f32;
            let row = i % rows;
            // 0, +1, -1, +2, -2, ...
            let offset = if row % 2 == 1 {
                ((row + 1) / 2) as f32
            } else {
                -((row / 2) as f32)
            };
            let x = match faction {
                Faction::Left => field.midline() - field.deploy_margin - column * spacing,
                Faction::Right => field.midline() + field.deploy_margin + column * spacing,
            };
            Vector::new(x, centre + offset * spacing)
        })
        .collect();
    Ok(slots)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_field_capacity() {
        let field = FieldConfig::default();
        assert_eq!(lattice(&field), (12, 17));
        assert_eq!(capacity(&field), 204);
    }

    #[test]
    fn test_slots_start_at_front_centre() {
        let field = FieldConfig::default();
        let left = deployment_slots(Faction::Left, 3, &field).unwrap();
        assert_eq!(left[0], Vector::new(6.0, 4.5));
        assert_eq!(left[1], Vector::new(6.0, 5.0));
        assert_eq!(left[2], Vector::new(6.0, 4.0));

        let right = deployment_slots(Faction::Right, 1, &field).unwrap();
        assert_eq!(right[0], Vector::new(7.0, 4.5));
    }

    #[test]
    fn test_full_army_stays_in_half_and_apart() {
        let field = FieldConfig::default();
        for faction in [Faction::Left, Faction::Right] {
            let slots = deployment_slots(faction, capacity(&field), &field).unwrap();
            for (i, a) in slots.iter().enumerate() {
                assert!(field.in_half(faction, *a), "{a:?} outside {faction:?} half");
                for b in &slots[i + 1..] {
                    assert!(a.distance(b) >= 0.2);
                }
            }
        }
    }

    #[test]
    fn test_overflow_is_an_error() {
        let field = FieldConfig::default();
        let err = deployment_slots(Faction::Right, 205, &field).unwrap_err();
        assert!(matches!(
            err,
            SimError::ArmyOverflow {
                requested: 205,
                capacity: 204,
                ..
            }
        ));
    }

    #[test]
    fn test_head_count() {
        let army: Composition = [("Grunt".to_string(), 3), ("Mage".to_string(), 2)]
            .into_iter()
            .collect();
        assert_eq!(head_count(&army), 5);
    }
}
