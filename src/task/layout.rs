use std::collections::BTreeSet;

use crate::foundation::core::{Cell, Grid, Shift};
use crate::foundation::error::{GridShiftError, GridShiftResult};

/// Block positions on one grid at one point in time.
///
/// Cells are kept sorted, so two layouts holding the same blocks compare equal regardless of
/// the order they were sampled in. Translation preserves that order, which lets the `i`-th
/// block of an initial layout be paired with the `i`-th block of its shifted layout.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct Layout {
    grid: Grid,
    cells: Vec<Cell>,
}

impl Layout {
    /// Build a layout, rejecting out-of-bounds or duplicate cells.
    pub fn new(grid: Grid, cells: impl IntoIterator<Item = Cell>) -> GridShiftResult<Self> {
        let cells: Vec<Cell> = cells.into_iter().collect();
        let unique: BTreeSet<Cell> = cells.iter().copied().collect();
        if unique.len() != cells.len() {
            return Err(GridShiftError::invariant(format!(
                "layout has {} cells but only {} distinct positions",
                cells.len(),
                unique.len()
            )));
        }
        if let Some(c) = unique.iter().find(|c| !grid.contains(**c)) {
            return Err(GridShiftError::invariant(format!(
                "cell ({}, {}) is outside the {}x{} grid",
                c.x,
                c.y,
                grid.size(),
                grid.size()
            )));
        }
        Ok(Self {
            grid,
            cells: unique.into_iter().collect(),
        })
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.cells.binary_search(&cell).is_ok()
    }

    /// Translate every block by `shift` and re-validate the result.
    pub fn apply(&self, shift: Shift) -> GridShiftResult<Layout> {
        let moved = self
            .cells
            .iter()
            .map(|&c| {
                shift.apply_to(c, self.grid).ok_or_else(|| {
                    GridShiftError::invariant(format!(
                        "block at ({}, {}) leaves the grid when shifted {} by {}",
                        c.x,
                        c.y,
                        shift.direction(),
                        shift.magnitude()
                    ))
                })
            })
            .collect::<GridShiftResult<Vec<_>>>()?;
        Layout::new(self.grid, moved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::core::Direction;

    fn grid6() -> Grid {
        Grid::new(6).unwrap()
    }

    #[test]
    fn new_sorts_cells_canonically() {
        let a = Layout::new(grid6(), [Cell::new(3, 4), Cell::new(1, 1)]).unwrap();
        let b = Layout::new(grid6(), [Cell::new(1, 1), Cell::new(3, 4)]).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.cells()[0], Cell::new(1, 1));
    }

    #[test]
    fn new_rejects_duplicates_and_out_of_bounds() {
        let dup = Layout::new(grid6(), [Cell::new(2, 2), Cell::new(2, 2)]);
        assert!(matches!(dup, Err(GridShiftError::InvariantViolation(_))));

        let oob = Layout::new(grid6(), [Cell::new(6, 0)]);
        assert!(matches!(oob, Err(GridShiftError::InvariantViolation(_))));
    }

    #[test]
    fn apply_translates_all_blocks() {
        let layout = Layout::new(grid6(), [Cell::new(0, 0), Cell::new(3, 5)]).unwrap();
        let moved = layout
            .apply(Shift::new(Direction::Right, 2).unwrap())
            .unwrap();
        assert_eq!(moved.cells(), &[Cell::new(2, 0), Cell::new(5, 5)]);
        assert_eq!(moved.len(), layout.len());
    }

    #[test]
    fn apply_fails_when_a_block_leaves_the_grid() {
        let layout = Layout::new(grid6(), [Cell::new(1, 1), Cell::new(3, 4), Cell::new(5, 0)]).unwrap();
        let err = layout
            .apply(Shift::new(Direction::Right, 1).unwrap())
            .unwrap_err();
        assert!(matches!(err, GridShiftError::InvariantViolation(_)));
        assert!(err.to_string().contains("(5, 0)"));
    }

    #[test]
    fn empty_layout_applies_to_empty() {
        let layout = Layout::new(grid6(), []).unwrap();
        assert!(layout.is_empty());
        let moved = layout.apply(Shift::new(Direction::Up, 2).unwrap()).unwrap();
        assert!(moved.is_empty());
    }

    #[test]
    fn layouts_hash_by_grid_and_cells() {
        use std::collections::HashSet;
        let mut seen = HashSet::new();
        seen.insert(Layout::new(grid6(), [Cell::new(3, 4), Cell::new(1, 1)]).unwrap());
        seen.insert(Layout::new(grid6(), [Cell::new(1, 1), Cell::new(3, 4)]).unwrap());
        seen.insert(Layout::new(Grid::new(7).unwrap(), [Cell::new(1, 1), Cell::new(3, 4)]).unwrap());
        assert_eq!(seen.len(), 2);
    }
}
