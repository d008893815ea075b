use replay_director_core::CellCoord;

/// Decaying per-cell scalar field marking recently shown regions.
///
/// Values live in `[0, 1]`: zero means "pay attention", one means the cell
/// was just shown and should be ignored until the value decays back below
/// the director's threshold.
#[derive(Clone, Debug)]
pub struct CooldownField {
    size: u32,
    values: Vec<f32>,
}

impl CooldownField {
    /// Creates a zeroed field matching a `size × size` grid.
    #[must_use]
    pub fn new(size: u32) -> Self {
        let size = size.max(1);
        Self {
            size,
            values: vec![0.0; (size as usize) * (size as usize)],
        }
    }

    /// Grid resolution in cells per side.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Multiplies every cell's value by the provided factor.
    ///
    /// Called on a configured interval rather than every tick to bound the
    /// per-tick update cost.
    pub fn decay_all(&mut self, factor: f32) {
        for value in &mut self.values {
            *value *= factor;
        }
    }

    /// Multiplies a single cell's value by the provided factor.
    pub fn decay_one(&mut self, cell: CellCoord, factor: f32) {
        if let Some(index) = self.index(cell) {
            self.values[index] *= factor;
        }
    }

    /// Marks a cell as just shown, setting its value to 1.0.
    pub fn mark_hot(&mut self, cell: CellCoord) {
        if let Some(index) = self.index(cell) {
            self.values[index] = 1.0;
        }
    }

    /// Current value of the cell, or 0.0 for out-of-range coordinates.
    #[must_use]
    pub fn value(&self, cell: CellCoord) -> f32 {
        self.index(cell)
            .map_or(0.0, |index| self.values[index])
    }

    /// Zeroes the entire field.
    pub fn clear(&mut self) {
        for value in &mut self.values {
            *value = 0.0;
        }
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.size && cell.row() < self.size {
            Some((cell.row() as usize) * (self.size as usize) + cell.column() as usize)
        } else {
            None
        }
    }
}
