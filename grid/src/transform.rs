use replay_director_core::{CellCoord, WorldPoint};

/// Maps between world-space coordinates and cells of a fixed square grid.
///
/// The transform covers a world extent of `width × height` units shifted by
/// an origin offset. Positions are quantised with a plain floor so that the
/// extreme edge of the map still lands on the last cell after clamping.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridTransform {
    size: u32,
    width: f32,
    height: f32,
    offset_x: f32,
    offset_y: f32,
}

impl GridTransform {
    /// Creates a transform for a `size × size` grid over the provided extent.
    ///
    /// A zero `size` is promoted to one so the transform never divides by
    /// zero; callers validate resolution separately.
    #[must_use]
    pub fn new(size: u32, width: f32, height: f32, offset_x: f32, offset_y: f32) -> Self {
        Self {
            size: size.max(1),
            width,
            height,
            offset_x,
            offset_y,
        }
    }

    /// Grid resolution in cells per side.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Raw (unclamped) cell indices for a world position, offset applied.
    #[must_use]
    pub fn raw_cell(&self, position: WorldPoint) -> (i64, i64) {
        let column = (((position.x + self.offset_x) / self.width) * self.size as f32).floor();
        let row = (((position.y + self.offset_y) / self.height) * self.size as f32).floor();
        (column as i64, row as i64)
    }

    /// Cell containing the world position, clamped to the grid bounds.
    #[must_use]
    pub fn cell_for(&self, position: WorldPoint) -> CellCoord {
        let (column, row) = self.raw_cell(position);
        let max = i64::from(self.size - 1);
        CellCoord::new(
            column.clamp(0, max) as u32,
            row.clamp(0, max) as u32,
        )
    }

    /// Converts a world-space distance to whole cells per axis.
    ///
    /// The offset is deliberately not applied: a radius is a distance, not a
    /// position, so it shares the grid's scale factor without translation.
    #[must_use]
    pub fn distance_in_cells(&self, radius: f32) -> (u32, u32) {
        let columns = ((radius / self.width) * self.size as f32).floor();
        let rows = ((radius / self.height) * self.size as f32).floor();
        (columns.max(0.0) as u32, rows.max(0.0) as u32)
    }

    /// World-space center of the provided cell, offset removed.
    #[must_use]
    pub fn cell_center(&self, cell: CellCoord) -> WorldPoint {
        let x = ((cell.column() as f32 + 0.5) / self.size as f32) * self.width - self.offset_x;
        let y = ((cell.row() as f32 + 0.5) / self.size as f32) * self.height - self.offset_y;
        WorldPoint::new(x, y)
    }
}
