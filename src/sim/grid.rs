//! Sparse cell index
//!
//! Maps an integer (column, row) to whatever occupies it. The key is
//! `col % cols + row * cols`, so a column at or past `cols` aliases onto an
//! earlier column of the same row and a negative column folds into the row
//! above. Callers bound their queries to the board; the grid itself never
//! rejects a coordinate.

use std::collections::HashMap;

/// A derived, rebuildable index from cell to occupant
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialGrid<T> {
    cols: i32,
    cells: HashMap<i32, T>,
}

impl<T: Copy + PartialEq> SpatialGrid<T> {
    pub fn new(cols: i32) -> Self {
        Self {
            cols: cols.max(1),
            cells: HashMap::new(),
        }
    }

    #[inline]
    fn key(&self, col: i32, row: i32) -> i32 {
        col % self.cols + row * self.cols
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn get(&self, col: i32, row: i32) -> Option<T> {
        self.cells.get(&self.key(col, row)).copied()
    }

    pub fn set(&mut self, col: i32, row: i32, value: T) {
        let key = self.key(col, row);
        self.cells.insert(key, value);
    }

    /// Remove every cell holding `value`, wherever it is
    pub fn remove(&mut self, value: T) {
        self.cells.retain(|_, v| *v != value);
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let mut grid = SpatialGrid::new(4);
        grid.set(1, 2, 'a');
        grid.set(3, 0, 'b');
        assert_eq!(grid.get(1, 2), Some('a'));
        assert_eq!(grid.get(3, 0), Some('b'));
        assert_eq!(grid.get(0, 0), None);

        grid.remove('a');
        assert_eq!(grid.get(1, 2), None);
        assert_eq!(grid.len(), 1);
    }

    #[test]
    fn test_remove_by_value_clears_all_cells_holding_it() {
        let mut grid = SpatialGrid::new(3);
        grid.set(0, 0, 7u32);
        grid.set(2, 2, 7u32);
        grid.set(1, 1, 8u32);
        grid.remove(7);
        assert_eq!(grid.len(), 1);
        assert_eq!(grid.get(1, 1), Some(8));
    }

    #[test]
    fn test_out_of_range_is_empty() {
        let mut grid = SpatialGrid::new(3);
        grid.set(0, 0, 1u32);
        assert_eq!(grid.get(0, 5), None);
        assert_eq!(grid.get(0, -1), None);
    }

    #[test]
    fn test_column_wraps_modulo_width() {
        let mut grid = SpatialGrid::new(3);
        grid.set(0, 1, 'x');
        // Column 3 aliases column 0 of the same row
        assert_eq!(grid.get(3, 1), Some('x'));
        // Column -1 folds into the last column of the previous row
        grid.set(2, 0, 'y');
        assert_eq!(grid.get(-1, 1), Some('y'));
    }
}
