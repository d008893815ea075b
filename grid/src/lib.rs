#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Spatial indexing for the Replay Director: a uniform battlefield grid,
//! the world/cell coordinate transform and the cooldown heatmap.

mod heatmap;
mod transform;

pub use heatmap::CooldownField;
pub use transform::GridTransform;

use replay_director_core::{CellCoord, UnitSnapshot, WorldPoint};

/// One cell of the uniform grid with its tick-scoped unit bucket.
#[derive(Clone, Debug)]
pub struct CellBucket {
    coord: CellCoord,
    units: Vec<UnitSnapshot>,
}

impl CellBucket {
    fn new(coord: CellCoord) -> Self {
        Self {
            coord,
            units: Vec::new(),
        }
    }

    /// Grid coordinate of the cell.
    #[must_use]
    pub const fn coord(&self) -> CellCoord {
        self.coord
    }

    /// Units bucketed into the cell this tick, in insertion order.
    #[must_use]
    pub fn units(&self) -> &[UnitSnapshot] {
        &self.units
    }
}

/// Uniform grid that buckets unit snapshots by ground position each tick.
///
/// Buckets are transient: [`SpatialGrid::reset`] clears them at the start of
/// every tick without releasing their storage, so steady-state operation
/// performs no per-tick allocation.
#[derive(Clone, Debug)]
pub struct SpatialGrid {
    transform: GridTransform,
    cells: Vec<CellBucket>,
}

impl SpatialGrid {
    /// Creates an empty grid covering the transform's world extent.
    #[must_use]
    pub fn new(transform: GridTransform) -> Self {
        let size = transform.size();
        let mut cells = Vec::with_capacity((size as usize) * (size as usize));
        for row in 0..size {
            for column in 0..size {
                cells.push(CellBucket::new(CellCoord::new(column, row)));
            }
        }
        Self { transform, cells }
    }

    /// Grid resolution in cells per side.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.transform.size()
    }

    /// Total number of cells in the grid.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Transform shared by the grid and its callers.
    #[must_use]
    pub const fn transform(&self) -> &GridTransform {
        &self.transform
    }

    /// Empties every cell's unit bucket while keeping the allocations.
    pub fn reset(&mut self) {
        for cell in &mut self.cells {
            cell.units.clear();
        }
    }

    /// Buckets a unit snapshot into the cell containing its position.
    ///
    /// Positions outside the world extent land in the nearest edge cell.
    pub fn insert(&mut self, unit: UnitSnapshot) {
        let coord = self.transform.cell_for(unit.position);
        let index = self.cell_index(coord);
        self.cells[index].units.push(unit);
    }

    /// Bucket at the provided coordinate.
    ///
    /// # Panics
    ///
    /// Panics when the coordinate lies outside the grid; coordinates
    /// produced by [`GridTransform::cell_for`] are always in range.
    #[must_use]
    pub fn cell(&self, coord: CellCoord) -> &CellBucket {
        let index = self.cell_index(coord);
        &self.cells[index]
    }

    /// Lazy row-major iteration over all cells.
    ///
    /// The order is part of the contract: scans that track a running
    /// maximum resolve ties in favour of the first cell encountered here.
    pub fn cells(&self) -> impl Iterator<Item = &CellBucket> {
        self.cells.iter()
    }

    /// Cells whose coordinates fall within `radius` world units of the cell
    /// containing `center`, clipped to the grid bounds, in row-major order.
    pub fn cells_near(
        &self,
        center: WorldPoint,
        radius: f32,
    ) -> impl Iterator<Item = &CellBucket> {
        let origin = self.transform.cell_for(center);
        let (radius_columns, radius_rows) = self.transform.distance_in_cells(radius);
        let max = self.size() - 1;

        let min_column = origin.column().saturating_sub(radius_columns);
        let max_column = origin.column().saturating_add(radius_columns).min(max);
        let min_row = origin.row().saturating_sub(radius_rows);
        let max_row = origin.row().saturating_add(radius_rows).min(max);

        (min_row..=max_row).flat_map(move |row| {
            (min_column..=max_column).map(move |column| self.cell(CellCoord::new(column, row)))
        })
    }

    fn cell_index(&self, coord: CellCoord) -> usize {
        (coord.row() as usize) * (self.size() as usize) + coord.column() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::{GridTransform, SpatialGrid};
    use replay_director_core::{CellCoord, OrderId, PlayerId, UnitId, UnitSnapshot, UnitTypeId, WorldPoint};

    fn unit(id: u32, x: f32, y: f32) -> UnitSnapshot {
        UnitSnapshot {
            id: UnitId::new(id),
            owner: PlayerId::new(0),
            type_id: UnitTypeId::new(1),
            order: OrderId::new(1),
            position: WorldPoint::new(x, y),
        }
    }

    fn grid_256x256_of_8() -> SpatialGrid {
        SpatialGrid::new(GridTransform::new(8, 256.0, 256.0, 0.0, 0.0))
    }

    #[test]
    fn insert_places_units_into_the_containing_cell() {
        let mut grid = grid_256x256_of_8();
        grid.insert(unit(1, 33.0, 70.0));

        let bucket = grid.cell(CellCoord::new(1, 2));
        assert_eq!(bucket.units().len(), 1);
        assert_eq!(bucket.units()[0].id, UnitId::new(1));
    }

    #[test]
    fn out_of_bounds_units_clamp_to_edge_cells() {
        let mut grid = grid_256x256_of_8();
        grid.insert(unit(1, -40.0, 500.0));

        let bucket = grid.cell(CellCoord::new(0, 7));
        assert_eq!(bucket.units().len(), 1);
    }

    #[test]
    fn reset_empties_buckets_without_losing_cells() {
        let mut grid = grid_256x256_of_8();
        grid.insert(unit(1, 10.0, 10.0));
        grid.insert(unit(2, 200.0, 200.0));

        grid.reset();

        assert_eq!(grid.cell_count(), 64);
        assert!(grid.cells().all(|cell| cell.units().is_empty()));
    }

    #[test]
    fn cells_iterate_in_row_major_order() {
        let grid = grid_256x256_of_8();
        let coords: Vec<_> = grid.cells().take(10).map(|cell| cell.coord()).collect();

        assert_eq!(coords[0], CellCoord::new(0, 0));
        assert_eq!(coords[7], CellCoord::new(7, 0));
        assert_eq!(coords[8], CellCoord::new(0, 1));
    }

    #[test]
    fn cells_near_covers_the_clipped_neighbourhood() {
        let grid = grid_256x256_of_8();
        // 32 world units convert to one cell in each direction.
        let coords: Vec<_> = grid
            .cells_near(WorldPoint::new(16.0, 16.0), 32.0)
            .map(|cell| cell.coord())
            .collect();

        assert_eq!(
            coords,
            vec![
                CellCoord::new(0, 0),
                CellCoord::new(1, 0),
                CellCoord::new(0, 1),
                CellCoord::new(1, 1),
            ]
        );
    }

    #[test]
    fn cells_near_with_zero_radius_returns_only_the_center_cell() {
        let mut grid = grid_256x256_of_8();
        grid.insert(unit(1, 100.0, 100.0));

        let buckets: Vec<_> = grid.cells_near(WorldPoint::new(100.0, 100.0), 0.0).collect();
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].units().len(), 1);
    }
}
