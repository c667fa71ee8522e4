use crate::model::CanvasType;

/// Occupancy of the 16x16 alignment cells of the source image.
///
/// Cells are stored row-major. A cell once marked stays marked.
/// Rectangles passed to [`is_free`](Self::is_free) and [`mark`](Self::mark)
/// must lie inside the grid; out-of-bounds access panics.
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    rows: u32,
    cols: u32,
    cells: Vec<bool>,
}

impl OccupancyGrid {
    pub fn new(rows: u32, cols: u32) -> Self {
        Self {
            rows,
            cols,
            cells: vec![false; rows as usize * cols as usize],
        }
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    #[inline]
    fn index(&self, row: u32, col: u32) -> usize {
        assert!(
            row < self.rows && col < self.cols,
            "cell ({row}, {col}) outside {}x{} grid",
            self.rows,
            self.cols
        );
        row as usize * self.cols as usize + col as usize
    }

    /// Returns true if the cell at (row, col) is occupied.
    pub fn is_occupied(&self, row: u32, col: u32) -> bool {
        self.cells[self.index(row, col)]
    }

    /// Returns true if every cell in `[row, row+h) x [col, col+w)` is free.
    pub fn is_free(&self, row: u32, col: u32, height_units: u32, width_units: u32) -> bool {
        for r in row..row + height_units {
            for c in col..col + width_units {
                if self.cells[self.index(r, c)] {
                    return false;
                }
            }
        }
        true
    }

    /// Marks every cell in `[row, row+h) x [col, col+w)` as occupied.
    pub fn mark(&mut self, row: u32, col: u32, height_units: u32, width_units: u32) {
        debug_assert!(
            self.is_free(row, col, height_units, width_units),
            "marking occupied rectangle at ({row}, {col}) {width_units}x{height_units}"
        );
        for r in row..row + height_units {
            for c in col..col + width_units {
                let i = self.index(r, c);
                self.cells[i] = true;
            }
        }
    }

    /// In bounds and free when anchored at (row, col).
    pub fn fits(&self, row: u32, col: u32, canvas: &CanvasType) -> bool {
        row + canvas.units_h <= self.rows
            && col + canvas.units_w <= self.cols
            && self.is_free(row, col, canvas.units_h, canvas.units_w)
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| **c).count()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|c| *c)
    }
}
