//! Task model: layouts, the seeded sampler, instruction phrasing and assembly.

pub mod assemble;
pub mod layout;
pub mod prompt;
pub mod sampler;

use rand::Rng;

/// Shared color of every block in a task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockColor {
    Red,
    Green,
    Blue,
    Yellow,
    Orange,
    Purple,
}

impl BlockColor {
    pub const ALL: [BlockColor; 6] = [
        BlockColor::Red,
        BlockColor::Green,
        BlockColor::Blue,
        BlockColor::Yellow,
        BlockColor::Orange,
        BlockColor::Purple,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BlockColor::Red => "red",
            BlockColor::Green => "green",
            BlockColor::Blue => "blue",
            BlockColor::Yellow => "yellow",
            BlockColor::Orange => "orange",
            BlockColor::Purple => "purple",
        }
    }

    /// Straight RGB fill used by the renderer.
    pub fn rgb(self) -> [u8; 3] {
        match self {
            BlockColor::Red => [220, 53, 69],
            BlockColor::Green => [40, 167, 69],
            BlockColor::Blue => [0, 123, 255],
            BlockColor::Yellow => [255, 193, 7],
            BlockColor::Orange => [255, 152, 0],
            BlockColor::Purple => [108, 117, 125],
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Expert,
}

impl Difficulty {
    /// Score grid size, block count and shift magnitude into a coarse bucket.
    pub fn score(grid_size: u32, num_blocks: usize, magnitude: u32) -> Self {
        let mut score = 0;
        score += match grid_size {
            10.. => 2,
            8..=9 => 1,
            _ => 0,
        };
        score += match num_blocks {
            5.. => 2,
            4 => 1,
            _ => 0,
        };
        score += match magnitude {
            3.. => 2,
            2 => 1,
            _ => 0,
        };
        match score {
            0..=1 => Difficulty::Easy,
            2..=3 => Difficulty::Medium,
            4..=5 => Difficulty::Hard,
            _ => Difficulty::Expert,
        }
    }
}

pub use assemble::{TaskInstance, build_task};
