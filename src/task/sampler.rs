//! Seeded placement of non-overlapping blocks plus a boundary-safe shift.
//!
//! All randomness comes from the caller's generator, so a fixed seed reproduces the exact
//! same layout and shift.

use rand::Rng;
use rand::seq::{SliceRandom, index};

use crate::foundation::core::{Direction, Grid, Shift};
use crate::foundation::error::{GridShiftError, GridShiftResult};
use crate::task::layout::Layout;

/// Reject block counts that no shift could accommodate.
///
/// A magnitude-1 shift leaves the largest safe sub-region (`size * (size - 1)` cells), so a
/// count above that is infeasible for every direction and magnitude.
pub fn check_capacity(grid_size: u32, num_blocks: usize) -> GridShiftResult<Grid> {
    let grid = Grid::new(grid_size)?;
    let n = num_blocks as u64;
    if n > grid.cell_count() {
        return Err(GridShiftError::configuration(format!(
            "{num_blocks} blocks cannot fit in a {grid_size}x{grid_size} grid ({} cells)",
            grid.cell_count()
        )));
    }
    let best = Shift::all()
        .map(|s| grid.safe_cell_count(s))
        .max()
        .unwrap_or(0);
    if n > best {
        return Err(GridShiftError::configuration(format!(
            "{num_blocks} blocks cannot stay inside a {grid_size}x{grid_size} grid under any \
             shift (at most {best} safe cells)"
        )));
    }
    Ok(grid)
}

/// Sample a layout of `num_blocks` distinct cells together with a shift that keeps every block
/// in bounds.
///
/// Direction and magnitude are drawn uniformly. If the drawn shift leaves too few safe cells,
/// the remaining shifts are tried in random order before giving up; the magnitude is never
/// quietly reduced.
pub fn sample<R: Rng + ?Sized>(
    grid_size: u32,
    num_blocks: usize,
    rng: &mut R,
) -> GridShiftResult<(Layout, Shift)> {
    let grid = check_capacity(grid_size, num_blocks)?;

    let first = random_shift(rng)?;
    let mut rest: Vec<Shift> = Shift::all().filter(|s| *s != first).collect();
    rest.shuffle(rng);

    for shift in std::iter::once(first).chain(rest) {
        match sample_with_shift(grid, num_blocks, shift, rng) {
            Ok(layout) => return Ok((layout, shift)),
            Err(GridShiftError::InfeasibleLayout(reason)) => {
                tracing::debug!(%reason, "resampling shift");
            }
            Err(e) => return Err(e),
        }
    }

    Err(GridShiftError::infeasible(format!(
        "no direction/magnitude combination can hold {num_blocks} blocks in a \
         {grid_size}x{grid_size} grid"
    )))
}

/// Place `num_blocks` blocks uniformly without replacement inside the safe sub-region of
/// `shift`.
///
/// Fails with [`GridShiftError::InfeasibleLayout`] before consuming any entropy when the
/// sub-region is too small.
pub fn sample_with_shift<R: Rng + ?Sized>(
    grid: Grid,
    num_blocks: usize,
    shift: Shift,
    rng: &mut R,
) -> GridShiftResult<Layout> {
    let available = grid.safe_cell_count(shift);
    if available < num_blocks as u64 {
        return Err(GridShiftError::infeasible(format!(
            "shift {} by {} leaves {available} safe cells for {num_blocks} blocks",
            shift.direction(),
            shift.magnitude(),
        )));
    }
    let length = usize::try_from(available).map_err(|_| {
        GridShiftError::configuration(format!(
            "{available} safe cells exceed the addressable range of this platform"
        ))
    })?;

    // Indices map straight onto the region, which is never materialized.
    let picked = index::sample(rng, length, num_blocks)
        .into_iter()
        .map(|i| grid.safe_cell_at(shift, i as u64));
    Layout::new(grid, picked)
}

fn random_shift<R: Rng + ?Sized>(rng: &mut R) -> GridShiftResult<Shift> {
    let direction = Direction::ALL[rng.gen_range(0..Direction::ALL.len())];
    let magnitude = rng.gen_range(Shift::MIN_MAGNITUDE..=Shift::MAX_MAGNITUDE);
    Shift::new(direction, magnitude)
}
