use rand::Rng;

use crate::config::GenerationConfig;
use crate::foundation::core::Shift;
use crate::foundation::error::{GridShiftError, GridShiftResult};
use crate::task::layout::Layout;
use crate::task::prompt::{PromptFields, TEMPLATE_COUNT, render_prompt};
use crate::task::sampler;
use crate::task::{BlockColor, Difficulty};

/// One generated sample. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct TaskInstance {
    initial: Layout,
    final_layout: Layout,
    shift: Shift,
    color: BlockColor,
    template: usize,
    instruction: String,
}

impl TaskInstance {
    pub fn grid_size(&self) -> u32 {
        self.initial.grid().size()
    }

    pub fn initial(&self) -> &Layout {
        &self.initial
    }

    pub fn final_layout(&self) -> &Layout {
        &self.final_layout
    }

    pub fn shift(&self) -> Shift {
        self.shift
    }

    pub fn color(&self) -> BlockColor {
        self.color
    }

    /// Index of the phrasing template used for [`TaskInstance::instruction`].
    pub fn template(&self) -> usize {
        self.template
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    pub fn difficulty(&self) -> Difficulty {
        Difficulty::score(self.grid_size(), self.initial.len(), self.shift.magnitude())
    }
}

/// Sample a layout and shift, derive the shifted layout and phrase the instruction.
///
/// Draws from `rng` in a fixed order (grid size and block count when they are randomized,
/// layout and shift, then color, then template), so the same seed always yields the same
/// task.
pub fn build_task<R: Rng + ?Sized>(
    config: &GenerationConfig,
    rng: &mut R,
) -> GridShiftResult<TaskInstance> {
    let (grid_size, num_blocks) = config.task_dimensions(rng);
    let (initial, shift) = sampler::sample(grid_size, num_blocks, rng)?;

    // `apply` re-checks bounds and collisions; a failure here is a sampler bug.
    let final_layout = initial.apply(shift).map_err(|e| match e {
        GridShiftError::InvariantViolation(msg) => {
            GridShiftError::invariant(format!("derived final layout: {msg}"))
        }
        other => other,
    })?;

    let color = BlockColor::random(rng);
    let template = rng.gen_range(0..TEMPLATE_COUNT);
    let instruction = render_prompt(
        template,
        &PromptFields {
            grid_size,
            num_blocks: initial.len(),
            color,
            shift,
        },
    );

    Ok(TaskInstance {
        initial,
        final_layout,
        shift,
        color,
        template,
        instruction,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RandomSizes;
    use crate::foundation::core::{Cell, Direction};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn config(grid_size: u32, num_blocks: usize) -> GenerationConfig {
        GenerationConfig {
            grid_size,
            num_blocks,
            ..GenerationConfig::default()
        }
    }

    #[test]
    fn final_layout_is_initial_shifted() {
        let cfg = GenerationConfig::default();
        for seed in 0..32u64 {
            let task = build_task(&cfg, &mut ChaCha8Rng::seed_from_u64(seed)).unwrap();
            assert_eq!(&task.initial().apply(task.shift()).unwrap(), task.final_layout());
            assert_eq!(task.initial().len(), 3);
            assert_eq!(task.grid_size(), 6);
        }
    }

    #[test]
    fn instruction_names_direction_and_steps() {
        let task = build_task(&GenerationConfig::default(), &mut ChaCha8Rng::seed_from_u64(9))
            .unwrap();
        let text = task.instruction();
        assert!(text.contains(task.shift().direction().adverb()));
        assert!(text.contains(&format!("exactly {}", task.shift().magnitude())));
        assert!(text.contains(task.color().name()));
        assert!(task.template() < TEMPLATE_COUNT);
    }

    #[test]
    fn seed_42_is_reproducible() {
        let cfg = GenerationConfig::default();
        let a = build_task(&cfg, &mut ChaCha8Rng::seed_from_u64(42)).unwrap();
        let b = build_task(&cfg, &mut ChaCha8Rng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn seed_42_task_is_pinned() {
        let task = build_task(&GenerationConfig::default(), &mut ChaCha8Rng::seed_from_u64(42))
            .unwrap();
        assert_eq!(
            task.initial().cells(),
            [Cell::new(1, 2), Cell::new(3, 3), Cell::new(5, 3)]
        );
        assert_eq!(task.shift(), Shift::new(Direction::Down, 2).unwrap());
        assert_eq!(
            task.final_layout().cells(),
            [Cell::new(1, 4), Cell::new(3, 5), Cell::new(5, 5)]
        );
        assert_eq!(task.color(), BlockColor::Red);
        assert_eq!(task.template(), 0);
        assert!(task.instruction().starts_with(
            "The scene shows a 6x6 grid with 3 red square blocks, each with a black outline,"
        ));
        assert!(task.instruction().contains("simultaneously downward by exactly 2 steps."));
    }

    #[test]
    fn random_sizes_drive_grid_and_prompt() {
        let cfg = GenerationConfig {
            random_sizes: Some(RandomSizes::default()),
            ..GenerationConfig::default()
        };
        let mut grids = std::collections::BTreeSet::new();
        let mut difficulties = std::collections::BTreeSet::new();
        for seed in 0..200u64 {
            let task = build_task(&cfg, &mut ChaCha8Rng::seed_from_u64(seed)).unwrap();
            let n = task.grid_size();
            assert!((4..=12).contains(&n));
            assert!(task.initial().len() >= 2);
            assert!(task.initial().len() <= RandomSizes::default().max_blocks(n));
            assert!(task.instruction().contains(&format!("{n}x{n} grid")));
            assert_eq!(&task.initial().apply(task.shift()).unwrap(), task.final_layout());
            grids.insert(n);
            difficulties.insert(task.difficulty());
        }
        assert!(grids.len() > 5);
        assert!(difficulties.len() > 1);
    }

    #[test]
    fn shared_stream_yields_distinct_reproducible_sequence() {
        let cfg = GenerationConfig::default();
        let run = || {
            let mut rng = ChaCha8Rng::seed_from_u64(7);
            (0..8)
                .map(|_| build_task(&cfg, &mut rng).unwrap())
                .collect::<Vec<_>>()
        };
        let a = run();
        assert_eq!(a, run());
        assert!(a.windows(2).any(|w| w[0] != w[1]));
    }

    #[test]
    fn infeasible_configuration_is_reported_as_configuration_error() {
        let err = build_task(&config(2, 3), &mut ChaCha8Rng::seed_from_u64(0)).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn zero_blocks_is_allowed() {
        let task = build_task(&config(4, 0), &mut ChaCha8Rng::seed_from_u64(1)).unwrap();
        assert!(task.initial().is_empty());
        assert!(task.final_layout().is_empty());
        assert!(task.instruction().contains("0 "));
    }
}
