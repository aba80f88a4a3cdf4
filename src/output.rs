//! Per-task output directories.
//!
//! A task is written into a hidden staging directory next to its final location and renamed
//! into place only once every artifact is on disk. Dropping an uncommitted [`StagedTask`]
//! removes the staging directory, so a failed sample never leaves a partial task behind.

use std::path::{Path, PathBuf};

use crate::foundation::core::{Cell, Direction};
use crate::foundation::error::{GridShiftError, GridShiftResult};
use crate::render::FrameRGBA;
use crate::task::{BlockColor, Difficulty, TaskInstance};

pub const FIRST_FRAME: &str = "first_frame.png";
pub const FINAL_FRAME: &str = "final_frame.png";
pub const PROMPT: &str = "prompt.txt";
pub const VIDEO: &str = "ground_truth.mp4";
pub const METADATA: &str = "metadata.json";

/// Sidecar describing how a task was generated.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TaskMetadata {
    pub task_id: String,
    pub domain: String,
    pub seed: u64,
    pub grid_size: u32,
    pub num_blocks: usize,
    pub color: BlockColor,
    pub direction: Direction,
    pub magnitude: u32,
    pub difficulty: Difficulty,
    pub template: usize,
    pub initial_positions: Vec<Cell>,
    pub final_positions: Vec<Cell>,
    pub image_size: (u32, u32),
    pub has_video: bool,
}

impl TaskMetadata {
    pub fn new(
        task_id: &str,
        domain: &str,
        seed: u64,
        task: &TaskInstance,
        image_size: (u32, u32),
        has_video: bool,
    ) -> Self {
        Self {
            task_id: task_id.to_string(),
            domain: domain.to_string(),
            seed,
            grid_size: task.grid_size(),
            num_blocks: task.initial().len(),
            color: task.color(),
            direction: task.shift().direction(),
            magnitude: task.shift().magnitude(),
            difficulty: task.difficulty(),
            template: task.template(),
            initial_positions: task.initial().cells().to_vec(),
            final_positions: task.final_layout().cells().to_vec(),
            image_size,
            has_video,
        }
    }
}

/// A task directory under construction.
#[derive(Debug)]
pub struct StagedTask {
    staging: PathBuf,
    target: PathBuf,
    committed: bool,
}

impl StagedTask {
    /// Create a fresh staging directory for `task_id` under `root`.
    pub fn begin(root: &Path, task_id: &str) -> GridShiftResult<Self> {
        let staging = root.join(format!(".{task_id}.partial"));
        let target = root.join(task_id);
        if staging.exists() {
            std::fs::remove_dir_all(&staging).map_err(|e| {
                GridShiftError::io(format!(
                    "remove stale staging dir '{}': {e}",
                    staging.display()
                ))
            })?;
        }
        std::fs::create_dir_all(&staging).map_err(|e| {
            GridShiftError::io(format!("create staging dir '{}': {e}", staging.display()))
        })?;
        Ok(Self {
            staging,
            target,
            committed: false,
        })
    }

    /// Path of an artifact inside the staging directory.
    pub fn path(&self, name: &str) -> PathBuf {
        self.staging.join(name)
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn write_png(&self, name: &str, frame: &FrameRGBA) -> GridShiftResult<()> {
        frame.save_png(&self.path(name))
    }

    pub fn write_text(&self, name: &str, text: &str) -> GridShiftResult<()> {
        let p = self.path(name);
        std::fs::write(&p, text)
            .map_err(|e| GridShiftError::io(format!("write '{}': {e}", p.display())))
    }

    pub fn write_json<T: serde::Serialize>(&self, name: &str, value: &T) -> GridShiftResult<()> {
        let p = self.path(name);
        let bytes = serde_json::to_vec_pretty(value).map_err(|e| {
            GridShiftError::Other(
                anyhow::Error::new(e).context(format!("serialize '{}'", p.display())),
            )
        })?;
        std::fs::write(&p, bytes)
            .map_err(|e| GridShiftError::io(format!("write '{}': {e}", p.display())))
    }

    /// Move the staging directory to its final name, replacing an older task with the same id.
    pub fn commit(mut self) -> GridShiftResult<PathBuf> {
        if self.target.exists() {
            std::fs::remove_dir_all(&self.target).map_err(|e| {
                GridShiftError::io(format!(
                    "replace existing task '{}': {e}",
                    self.target.display()
                ))
            })?;
        }
        std::fs::rename(&self.staging, &self.target).map_err(|e| {
            GridShiftError::io(format!(
                "publish task '{}': {e}",
                self.target.display()
            ))
        })?;
        self.committed = true;
        Ok(self.target.clone())
    }
}

impl Drop for StagedTask {
    fn drop(&mut self) {
        if !self.committed {
            let _ = std::fs::remove_dir_all(&self.staging);
        }
    }
}
