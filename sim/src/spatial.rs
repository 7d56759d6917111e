//! Spatial partitioning for neighbor queries.
//!
//! Provides O(1) cell lookup and O(k) neighbor queries where k is the number
//! of combatants in nearby cells, rather than O(n) for brute force.
//! Query results are ordered by distance, then by combatant id, so callers
//! that fold over them stay deterministic.

use crate::components::{CombatantId, Faction};
use crate::vector::Vector;
use std::collections::HashMap;

/// Grid-based spatial partitioning structure.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    /// Cell size in field units.
    pub cell_size: f32,
    cells: HashMap<(i32, i32), Vec<SpatialEntry>>,
    /// Reverse lookup: combatant to cell.
    entry_cells: HashMap<CombatantId, (i32, i32)>,
}

/// Entry in a spatial cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialEntry {
    pub id: CombatantId,
    pub pos: Vector,
    pub faction: Faction,
}

impl Default for SpatialGrid {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl SpatialGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
            entry_cells: HashMap::new(),
        }
    }

    /// Build a grid from a set of entries.
    pub fn from_entries(cell_size: f32, entries: impl IntoIterator<Item = SpatialEntry>) -> Self {
        let mut grid = Self::new(cell_size);
        for entry in entries {
            grid.insert(entry.id, entry.pos, entry.faction);
        }
        grid
    }

    #[inline]
    pub fn world_to_cell(&self, pos: Vector) -> (i32, i32) {
        (
            (pos.x / self.cell_size).floor() as i32,
            (pos.y / self.cell_size).floor() as i32,
        )
    }

    /// Insert a combatant, or move it if it is already present.
    pub fn insert(&mut self, id: CombatantId, pos: Vector, faction: Faction) {
        let cell = self.world_to_cell(pos);

        if let Some(old_cell) = self.entry_cells.get(&id).copied() {
            if let Some(entries) = self.cells.get_mut(&old_cell) {
                entries.retain(|e| e.id != id);
            }
        }

        self.cells
            .entry(cell)
            .or_default()
            .push(SpatialEntry { id, pos, faction });
        self.entry_cells.insert(id, cell);
    }

    fn candidates(
        &self,
        pos: Vector,
        radius: f32,
    ) -> Box<dyn Iterator<Item = &SpatialEntry> + '_> {
        // Float-to-int casts saturate; keep the cell walk from overflowing.
        let reach = ((radius / self.cell_size).ceil() as i32).saturating_add(1);
        let side = 2 * reach.unsigned_abs() as u64 + 1;
        if side.saturating_mul(side) > self.cells.len() as u64 {
            // Window larger than the occupied cells; scan those instead.
            return Box::new(self.cells.values().flatten());
        }
        let (cx, cy) = self.world_to_cell(pos);
        Box::new(
            (-reach..=reach)
                .flat_map(move |dx| {
                    (-reach..=reach).map(move |dy| (cx.saturating_add(dx), cy.saturating_add(dy)))
                })
                .filter_map(move |cell| self.cells.get(&cell))
                .flatten(),
        )
    }

    /// All combatants within `radius` (inclusive) of `pos`, closest first,
    /// ties by id.
    pub fn query_radius(&self, pos: Vector, radius: f32) -> Vec<SpatialEntry> {
        let mut results: Vec<SpatialEntry> = self
            .candidates(pos, radius)
            .filter(|e| e.pos.distance(&pos) <= radius)
            .copied()
            .collect();

        results.sort_by(|a, b| {
            a.pos
                .distance(&pos)
                .total_cmp(&b.pos.distance(&pos))
                .then(a.id.cmp(&b.id))
        });
        results
    }

    /// Members of `faction` within `radius` of `pos`.
    pub fn query_faction(&self, pos: Vector, radius: f32, faction: Faction) -> Vec<SpatialEntry> {
        let mut results = self.query_radius(pos, radius);
        results.retain(|e| e.faction == faction);
        results
    }

    /// Whether any combatant other than `exclude` sits strictly closer than
    /// `radius` to `pos`.
    pub fn any_closer_than(&self, pos: Vector, radius: f32, exclude: CombatantId) -> bool {
        self.candidates(pos, radius)
            .any(|e| e.id != exclude && e.pos.distance(&pos) < radius)
    }

    pub fn total_count(&self) -> usize {
        self.entry_cells.len()
    }
}
