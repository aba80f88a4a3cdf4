use crate::foundation::error::{GridShiftError, GridShiftResult};
use crate::task::layout::Layout;

/// One distinct video frame and how many times it is repeated.
#[derive(Clone, Debug, PartialEq)]
pub struct PlannedFrame {
    /// Block positions in grid units.
    pub blocks: Vec<(f64, f64)>,
    pub repeat: u32,
}

/// Frame schedule of the ground-truth video: hold the initial layout, slide every block
/// linearly to its shifted cell, hold the final layout.
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionPlan {
    frames: Vec<PlannedFrame>,
}

impl TransitionPlan {
    pub fn new(
        initial: &Layout,
        final_layout: &Layout,
        hold_frames: u32,
        transition_frames: u32,
    ) -> GridShiftResult<Self> {
        if initial.len() != final_layout.len() || initial.grid() != final_layout.grid() {
            return Err(GridShiftError::invariant(
                "transition endpoints must hold the same blocks on the same grid",
            ));
        }
        if transition_frames == 0 {
            return Err(GridShiftError::configuration(
                "transition_frames must be >= 1",
            ));
        }

        let pairs: Vec<((f64, f64), (f64, f64))> = initial
            .cells()
            .iter()
            .zip(final_layout.cells())
            .map(|(a, b)| {
                (
                    (f64::from(a.x), f64::from(a.y)),
                    (f64::from(b.x), f64::from(b.y)),
                )
            })
            .collect();
        let at = |t: f64| -> Vec<(f64, f64)> {
            pairs
                .iter()
                .map(|&((x0, y0), (x1, y1))| (x0 + (x1 - x0) * t, y0 + (y1 - y0) * t))
                .collect()
        };

        let mut frames = Vec::with_capacity(transition_frames as usize + 2);
        if hold_frames > 0 {
            frames.push(PlannedFrame {
                blocks: at(0.0),
                repeat: hold_frames,
            });
        }
        for i in 0..transition_frames {
            let t = if transition_frames > 1 {
                f64::from(i) / f64::from(transition_frames - 1)
            } else {
                1.0
            };
            frames.push(PlannedFrame {
                blocks: at(t),
                repeat: 1,
            });
        }
        if hold_frames > 0 {
            frames.push(PlannedFrame {
                blocks: at(1.0),
                repeat: hold_frames,
            });
        }
        Ok(Self { frames })
    }

    pub fn frames(&self) -> &[PlannedFrame] {
        &self.frames
    }

    /// Total frames after expanding repeats.
    pub fn frame_count(&self) -> u64 {
        self.frames.iter().map(|f| u64::from(f.repeat)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::core::{Cell, Direction, Grid, Shift};

    fn endpoints() -> (Layout, Layout) {
        let grid = Grid::new(6).unwrap();
        let initial = Layout::new(grid, [Cell::new(0, 2), Cell::new(3, 5)]).unwrap();
        let moved = initial.apply(Shift::new(Direction::Right, 2).unwrap()).unwrap();
        (initial, moved)
    }

    #[test]
    fn plan_holds_slides_and_holds() {
        let (a, b) = endpoints();
        let plan = TransitionPlan::new(&a, &b, 5, 25).unwrap();
        assert_eq!(plan.frame_count(), 35);
        assert_eq!(plan.frames().len(), 27);

        let first = &plan.frames()[0];
        assert_eq!(first.repeat, 5);
        assert_eq!(first.blocks, vec![(0.0, 2.0), (3.0, 5.0)]);

        let last = plan.frames().last().unwrap();
        assert_eq!(last.blocks, vec![(2.0, 2.0), (5.0, 5.0)]);

        let mid = &plan.frames()[1 + 12];
        assert_eq!(mid.blocks, vec![(1.0, 2.0), (4.0, 5.0)]);
    }

    #[test]
    fn single_transition_frame_jumps_to_end() {
        let (a, b) = endpoints();
        let plan = TransitionPlan::new(&a, &b, 0, 1).unwrap();
        assert_eq!(plan.frame_count(), 1);
        assert_eq!(plan.frames()[0].blocks, vec![(2.0, 2.0), (5.0, 5.0)]);
    }

    #[test]
    fn mismatched_endpoints_are_rejected() {
        let (a, _) = endpoints();
        let other = Layout::new(a.grid(), [Cell::new(1, 1)]).unwrap();
        assert!(TransitionPlan::new(&a, &other, 5, 25).is_err());
        assert!(TransitionPlan::new(&a, &a, 5, 0).is_err());
    }
}
