use crate::foundation::error::{GridShiftError, GridShiftResult};

/// A grid cell. `x` is the column, `y` the row; row 0 is at the top.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Cell {
    pub x: u32,
    pub y: u32,
}

impl Cell {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Square grid bounds with the origin at the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct Grid {
    size: u32,
}

impl Grid {
    pub fn new(size: u32) -> GridShiftResult<Self> {
        if size == 0 {
            return Err(GridShiftError::configuration("grid size must be >= 1"));
        }
        Ok(Self { size })
    }

    pub fn size(self) -> u32 {
        self.size
    }

    pub fn cell_count(self) -> u64 {
        u64::from(self.size) * u64::from(self.size)
    }

    pub fn contains(self, cell: Cell) -> bool {
        cell.x < self.size && cell.y < self.size
    }

    /// Cells from which a block stays in bounds after `shift`.
    ///
    /// The grid is shrunk by `shift.magnitude` on the side the blocks move toward, so a
    /// rightward shift of 2 on a 6-grid allows `x <= 3`. Cells are listed row-major.
    pub fn safe_cells(self, shift: Shift) -> impl Iterator<Item = Cell> {
        (0..self.safe_cell_count(shift)).map(move |i| self.safe_cell_at(shift, i))
    }

    /// Number of cells in [`Grid::safe_cells`] without materializing them.
    pub fn safe_cell_count(self, shift: Shift) -> u64 {
        let m = shift.magnitude().min(self.size);
        u64::from(self.size) * u64::from(self.size - m)
    }

    /// The `index`-th cell of [`Grid::safe_cells`], computed without enumerating the region.
    ///
    /// `index` must be below [`Grid::safe_cell_count`].
    pub fn safe_cell_at(self, shift: Shift, index: u64) -> Cell {
        debug_assert!(index < self.safe_cell_count(shift));
        let m = shift.magnitude().min(self.size);
        let (x0, y0, width) = match shift.direction() {
            Direction::Up => (0, m, self.size),
            Direction::Down => (0, 0, self.size),
            Direction::Left => (m, 0, self.size - m),
            Direction::Right => (0, 0, self.size - m),
        };
        let width = u64::from(width);
        // Row and column are bounded by `size`, so both fit back into u32.
        let row = (index / width) as u32;
        let col = (index % width) as u32;
        Cell::new(x0 + col, y0 + row)
    }
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit offset `(dx, dy)`.
    pub fn offset(self) -> (i64, i64) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    /// Adverb used in instructions ("upward", ...).
    pub fn adverb(self) -> &'static str {
        match self {
            Direction::Up => "upward",
            Direction::Down => "downward",
            Direction::Left => "leftward",
            Direction::Right => "rightward",
        }
    }

    /// Name of the grid side the blocks move toward.
    pub fn side_name(self) -> &'static str {
        match self {
            Direction::Up => "top",
            Direction::Down => "bottom",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A uniform translation of every block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct Shift {
    direction: Direction,
    magnitude: u32,
}

impl Shift {
    pub const MIN_MAGNITUDE: u32 = 1;
    pub const MAX_MAGNITUDE: u32 = 2;

    pub fn new(direction: Direction, magnitude: u32) -> GridShiftResult<Self> {
        if !(Self::MIN_MAGNITUDE..=Self::MAX_MAGNITUDE).contains(&magnitude) {
            return Err(GridShiftError::configuration(format!(
                "shift magnitude must be in [{}, {}], got {magnitude}",
                Self::MIN_MAGNITUDE,
                Self::MAX_MAGNITUDE
            )));
        }
        Ok(Self {
            direction,
            magnitude,
        })
    }

    /// Every valid shift, direction-major.
    pub fn all() -> impl Iterator<Item = Shift> {
        Direction::ALL.into_iter().flat_map(|direction| {
            (Self::MIN_MAGNITUDE..=Self::MAX_MAGNITUDE).map(move |magnitude| Shift {
                direction,
                magnitude,
            })
        })
    }

    pub fn direction(self) -> Direction {
        self.direction
    }

    pub fn magnitude(self) -> u32 {
        self.magnitude
    }

    /// Offset `(dx, dy)` in cells.
    pub fn delta(self) -> (i64, i64) {
        let (dx, dy) = self.direction.offset();
        let m = i64::from(self.magnitude);
        (dx * m, dy * m)
    }

    /// Translate `cell`, returning `None` when it would leave `grid`.
    pub fn apply_to(self, cell: Cell, grid: Grid) -> Option<Cell> {
        let (dx, dy) = self.delta();
        let x = i64::from(cell.x) + dx;
        let y = i64::from(cell.y) + dy;
        let size = i64::from(grid.size());
        if !(0..size).contains(&x) || !(0..size).contains(&y) {
            return None;
        }
        Some(Cell::new(x as u32, y as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_rejects_zero_size() {
        assert!(Grid::new(0).is_err());
        assert_eq!(Grid::new(6).unwrap().cell_count(), 36);
    }

    #[test]
    fn shift_rejects_out_of_range_magnitude() {
        assert!(Shift::new(Direction::Up, 0).is_err());
        assert!(Shift::new(Direction::Up, 3).is_err());
        assert_eq!(Shift::new(Direction::Left, 2).unwrap().delta(), (-2, 0));
    }

    #[test]
    fn all_shifts_cover_four_directions_and_two_magnitudes() {
        let all: Vec<_> = Shift::all().collect();
        assert_eq!(all.len(), 8);
        for d in Direction::ALL {
            assert_eq!(all.iter().filter(|s| s.direction() == d).count(), 2);
        }
    }

    #[test]
    fn safe_cells_rightward_two_on_six_grid() {
        let grid = Grid::new(6).unwrap();
        let shift = Shift::new(Direction::Right, 2).unwrap();
        let cells: Vec<Cell> = grid.safe_cells(shift).collect();
        assert_eq!(cells.len(), 24);
        assert_eq!(cells.len() as u64, grid.safe_cell_count(shift));
        assert!(cells.iter().all(|c| c.x <= 3));
        assert!(cells.iter().all(|c| shift.apply_to(*c, grid).is_some()));
    }

    #[test]
    fn safe_cells_upward_excludes_top_rows() {
        let grid = Grid::new(4).unwrap();
        let shift = Shift::new(Direction::Up, 1).unwrap();
        let cells: Vec<Cell> = grid.safe_cells(shift).collect();
        assert!(cells.iter().all(|c| c.y >= 1));
        assert_eq!(cells.len(), 12);
    }

    #[test]
    fn safe_cells_empty_when_magnitude_covers_grid() {
        let grid = Grid::new(1).unwrap();
        let shift = Shift::new(Direction::Down, 1).unwrap();
        assert_eq!(grid.safe_cells(shift).count(), 0);
        assert_eq!(grid.safe_cell_count(shift), 0);

        let grid = Grid::new(2).unwrap();
        let shift = Shift::new(Direction::Left, 2).unwrap();
        assert_eq!(grid.safe_cells(shift).count(), 0);
    }

    #[test]
    fn safe_cell_at_walks_the_region_row_major() {
        for size in 1..=7u32 {
            let grid = Grid::new(size).unwrap();
            for shift in Shift::all() {
                let m = shift.magnitude().min(size);
                let full = 0..size;
                let (xs, ys) = match shift.direction() {
                    Direction::Up => (full.clone(), m..size),
                    Direction::Down => (full.clone(), 0..size - m),
                    Direction::Left => (m..size, full.clone()),
                    Direction::Right => (0..size - m, full.clone()),
                };
                let expected: Vec<Cell> = ys
                    .flat_map(|y| xs.clone().map(move |x| Cell::new(x, y)))
                    .collect();
                let actual: Vec<Cell> = grid.safe_cells(shift).collect();
                assert_eq!(actual, expected, "size {size}, {shift:?}");
            }
        }
    }

    #[test]
    fn safe_cell_at_handles_huge_grids() {
        let grid = Grid::new(u32::MAX).unwrap();
        let shift = Shift::new(Direction::Up, 2).unwrap();
        let last = grid.safe_cell_count(shift) - 1;
        assert_eq!(grid.safe_cell_at(shift, 0), Cell::new(0, 2));
        assert_eq!(
            grid.safe_cell_at(shift, last),
            Cell::new(u32::MAX - 1, u32::MAX - 1)
        );
        let left = Shift::new(Direction::Left, 1).unwrap();
        assert_eq!(grid.safe_cell_at(left, 0), Cell::new(1, 0));
    }

    #[test]
    fn apply_to_reports_out_of_bounds() {
        let grid = Grid::new(6).unwrap();
        let up = Shift::new(Direction::Up, 2).unwrap();
        assert_eq!(up.apply_to(Cell::new(3, 1), grid), None);
        assert_eq!(up.apply_to(Cell::new(3, 2), grid), Some(Cell::new(3, 0)));
        let right = Shift::new(Direction::Right, 1).unwrap();
        assert_eq!(right.apply_to(Cell::new(5, 0), grid), None);
    }
}
