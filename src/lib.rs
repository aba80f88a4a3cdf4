#![forbid(unsafe_code)]

pub mod config;
pub mod encode;
pub mod foundation;
pub mod output;
pub mod pipeline;
pub mod render;
pub mod task;

pub use config::{GenerationConfig, RandomSizes};
pub use encode::{FrameSink, InMemorySink, Mp4Sink, VideoConfig, is_ffmpeg_on_path};
pub use foundation::core::{Cell, Direction, Grid, Shift};
pub use foundation::error::{GridShiftError, GridShiftResult};
pub use output::{StagedTask, TaskMetadata};
pub use pipeline::{
    BatchReport, BatchThreading, generate_dataset, sample_seed, task_for_sample, write_transition,
};
pub use render::{FrameRGBA, GridRenderer, PlannedFrame, TransitionPlan};
pub use task::layout::Layout;
pub use task::{BlockColor, Difficulty, TaskInstance, build_task};
