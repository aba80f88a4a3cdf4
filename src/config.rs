use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use rand::Rng;

use crate::foundation::error::{GridShiftError, GridShiftResult};
use crate::task::sampler::check_capacity;

/// Batch generation settings.
///
/// Every field has a default, so a JSON config file only needs the keys it overrides.
/// Construct, then call [`GenerationConfig::validate`] once before sampling.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationConfig {
    /// Task family name; used for the output folder and task ids.
    pub domain: String,
    pub num_samples: u64,
    pub grid_size: u32,
    pub num_blocks: usize,
    /// Draw grid size and block count per task instead of using the fixed values above.
    pub random_sizes: Option<RandomSizes>,
    /// Output frame size `(width, height)` in pixels.
    pub image_size: (u32, u32),
    /// Base seed. `None` draws a fresh one per run (and logs it).
    pub seed: Option<u64>,
    pub emit_video: bool,
    pub video_fps: u32,
    /// Frames holding each end state in the ground-truth video.
    pub hold_frames: u32,
    /// Interpolated frames between the two states.
    pub transition_frames: u32,
    pub output_dir: PathBuf,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            domain: "grid_shift".to_string(),
            num_samples: 10,
            grid_size: 6,
            num_blocks: 3,
            random_sizes: None,
            image_size: (512, 512),
            seed: None,
            emit_video: true,
            video_fps: 10,
            hold_frames: 5,
            transition_frames: 25,
            output_dir: PathBuf::from("data/questions"),
        }
    }
}

/// Per-task ranges for the grid size and block count.
///
/// Each task draws its grid size uniformly from `grid_min..=grid_max`, then its block count
/// from `blocks_min` up to `blocks_max_ratio` of the grid's cells. The upper bound never
/// exceeds what a magnitude-1 shift can hold, `size * (size - 1)`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RandomSizes {
    pub grid_min: u32,
    pub grid_max: u32,
    pub blocks_min: usize,
    pub blocks_max_ratio: f64,
}

impl Default for RandomSizes {
    fn default() -> Self {
        Self {
            grid_min: 4,
            grid_max: 12,
            blocks_min: 2,
            blocks_max_ratio: 0.4,
        }
    }
}

impl RandomSizes {
    pub fn validate(&self) -> GridShiftResult<()> {
        if self.grid_min > self.grid_max {
            return Err(GridShiftError::configuration(format!(
                "grid_min {} exceeds grid_max {}",
                self.grid_min, self.grid_max
            )));
        }
        if !(0.0..=1.0).contains(&self.blocks_max_ratio) {
            return Err(GridShiftError::configuration(format!(
                "blocks_max_ratio must be within [0, 1], got {}",
                self.blocks_max_ratio
            )));
        }
        // Safe capacity grows with the grid, so the smallest size is the binding one.
        check_capacity(self.grid_min, self.blocks_min)?;
        Ok(())
    }

    /// Largest block count drawn for a `grid_size` grid.
    pub fn max_blocks(&self, grid_size: u32) -> usize {
        let size = u64::from(grid_size);
        let cells = size * size;
        let by_ratio = (cells as f64 * self.blocks_max_ratio).floor() as u64;
        let capacity = size * size.saturating_sub(1);
        let max = by_ratio.max(self.blocks_min as u64).min(capacity);
        usize::try_from(max).unwrap_or(usize::MAX)
    }

    /// Draw `(grid_size, num_blocks)` for one task. Call [`RandomSizes::validate`] first.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> (u32, usize) {
        let grid_size = rng.gen_range(self.grid_min..=self.grid_max);
        let num_blocks = rng.gen_range(self.blocks_min..=self.max_blocks(grid_size));
        (grid_size, num_blocks)
    }
}

impl GenerationConfig {
    pub fn from_json_file(path: &Path) -> GridShiftResult<Self> {
        let f = File::open(path).map_err(|e| {
            GridShiftError::io(format!("open config '{}': {e}", path.display()))
        })?;
        serde_json::from_reader(BufReader::new(f)).map_err(|e| {
            GridShiftError::configuration(format!("parse config '{}': {e}", path.display()))
        })
    }

    /// Check every field up front so a bad batch fails before anything is written.
    pub fn validate(&self) -> GridShiftResult<()> {
        if self.domain.is_empty()
            || !self
                .domain
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(GridShiftError::configuration(format!(
                "domain '{}' must be non-empty and use only [A-Za-z0-9_-]",
                self.domain
            )));
        }
        if self.num_samples == 0 {
            return Err(GridShiftError::configuration("num_samples must be >= 1"));
        }

        let largest_grid = match &self.random_sizes {
            Some(sizes) => {
                sizes.validate()?;
                sizes.grid_max
            }
            None => {
                check_capacity(self.grid_size, self.num_blocks)?;
                self.grid_size
            }
        };

        let (w, h) = self.image_size;
        if w == 0 || h == 0 {
            return Err(GridShiftError::configuration(
                "image width/height must be non-zero",
            ));
        }
        if w > u32::from(u16::MAX) || h > u32::from(u16::MAX) {
            return Err(GridShiftError::configuration(format!(
                "image size {w}x{h} exceeds the {max}x{max} raster limit",
                max = u16::MAX
            )));
        }
        if w < largest_grid || h < largest_grid {
            return Err(GridShiftError::configuration(format!(
                "image size {w}x{h} is smaller than one pixel per cell of a {n}x{n} grid",
                n = largest_grid
            )));
        }

        if self.emit_video {
            if self.video_fps == 0 {
                return Err(GridShiftError::configuration("video_fps must be non-zero"));
            }
            if self.transition_frames == 0 {
                return Err(GridShiftError::configuration(
                    "transition_frames must be >= 1",
                ));
            }
            if !w.is_multiple_of(2) || !h.is_multiple_of(2) {
                return Err(GridShiftError::configuration(
                    "image width/height must be even for yuv420p video output",
                ));
            }
        }
        Ok(())
    }

    /// Grid size and block count of the next task, drawn from `rng` only when
    /// [`GenerationConfig::random_sizes`] is set.
    pub fn task_dimensions<R: Rng + ?Sized>(&self, rng: &mut R) -> (u32, usize) {
        match &self.random_sizes {
            Some(sizes) => sizes.draw(rng),
            None => (self.grid_size, self.num_blocks),
        }
    }

    /// Folder holding every task directory of this domain.
    pub fn task_root(&self) -> PathBuf {
        self.output_dir.join(format!("{}_task", self.domain))
    }

    pub fn task_id(&self, index: u64) -> String {
        format!("{}_{index:08}", self.domain)
    }
}
