use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::config::GenerationConfig;
use crate::encode::{FrameSink, Mp4Sink, VideoConfig, is_ffmpeg_on_path};
use crate::foundation::error::{GridShiftError, GridShiftResult};
use crate::output::{
    FINAL_FRAME, FIRST_FRAME, METADATA, PROMPT, StagedTask, TaskMetadata, VIDEO,
};
use crate::render::{GridRenderer, TransitionPlan};
use crate::task::{TaskInstance, build_task};

/// Threading controls for batch generation.
#[derive(Clone, Debug, Default)]
pub struct BatchThreading {
    /// Generate samples on a dedicated worker pool when `true`.
    pub parallel: bool,
    /// Explicit worker count. `None` uses rayon's default.
    pub threads: Option<usize>,
}

/// Summary of a finished batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchReport {
    /// Seed that reproduces this batch.
    pub base_seed: u64,
    pub written: u64,
    pub videos: u64,
    /// Folder holding the task directories.
    pub output_root: PathBuf,
}

/// Seed of sample `index`. Independent of how samples are scheduled, so sequential and
/// parallel batches produce the same tasks.
pub fn sample_seed(base_seed: u64, index: u64) -> u64 {
    base_seed.wrapping_add(index)
}

/// Build the task for sample `index` without rendering or writing anything.
pub fn task_for_sample(
    config: &GenerationConfig,
    base_seed: u64,
    index: u64,
) -> GridShiftResult<TaskInstance> {
    let mut rng = ChaCha8Rng::seed_from_u64(sample_seed(base_seed, index));
    build_task(config, &mut rng)
}

/// Generate `config.num_samples` task directories under [`GenerationConfig::task_root`].
///
/// The configuration is validated before anything touches the filesystem. The first failing
/// sample stops the batch and is reported with its index; tasks that were already published
/// stay in place.
pub fn generate_dataset(
    config: &GenerationConfig,
    threading: &BatchThreading,
) -> GridShiftResult<BatchReport> {
    config.validate()?;
    if threading.threads == Some(0) {
        return Err(GridShiftError::configuration(
            "threads must be >= 1 when set",
        ));
    }

    let base_seed = config.seed.unwrap_or_else(rand::random::<u64>);
    let emit_video = if config.emit_video && !is_ffmpeg_on_path() {
        tracing::warn!("ffmpeg not found on PATH; generating tasks without ground-truth videos");
        false
    } else {
        config.emit_video
    };

    let task_root = config.task_root();
    std::fs::create_dir_all(&task_root).map_err(|e| {
        GridShiftError::io(format!(
            "create output directory '{}': {e}",
            task_root.display()
        ))
    })?;

    tracing::info!(
        num_samples = config.num_samples,
        base_seed,
        grid_size = config.grid_size,
        num_blocks = config.num_blocks,
        random_sizes = config.random_sizes.is_some(),
        emit_video,
        parallel = threading.parallel,
        root = %task_root.display(),
        "generating tasks"
    );

    let written = AtomicU64::new(0);
    let videos = AtomicU64::new(0);
    let (w, h) = config.image_size;
    let run_one = |renderer: &mut GridRenderer, index: u64| -> GridShiftResult<()> {
        let has_video = write_sample(config, renderer, base_seed, index, emit_video)
            .map_err(|e| e.in_sample(index))?;
        written.fetch_add(1, Ordering::Relaxed);
        if has_video {
            videos.fetch_add(1, Ordering::Relaxed);
        }
        Ok(())
    };

    if threading.parallel {
        let pool = build_thread_pool(threading.threads)?;
        pool.install(|| {
            (0..config.num_samples).into_par_iter().try_for_each_init(
                || GridRenderer::new(w, h),
                |renderer, index| match renderer {
                    Ok(r) => run_one(r, index),
                    Err(e) => Err(GridShiftError::render(e.to_string()).in_sample(index)),
                },
            )
        })?;
    } else {
        let mut renderer = GridRenderer::new(w, h)?;
        for index in 0..config.num_samples {
            run_one(&mut renderer, index)?;
        }
    }

    let report = BatchReport {
        base_seed,
        written: written.into_inner(),
        videos: videos.into_inner(),
        output_root: task_root,
    };
    tracing::info!(
        written = report.written,
        videos = report.videos,
        base_seed,
        "done"
    );
    Ok(report)
}

/// Render the ground-truth transition of `task` into `sink`. Returns the frame count.
pub fn write_transition(
    renderer: &mut GridRenderer,
    task: &TaskInstance,
    config: &GenerationConfig,
    sink: &mut dyn FrameSink,
) -> GridShiftResult<u64> {
    let plan = TransitionPlan::new(
        task.initial(),
        task.final_layout(),
        config.hold_frames,
        config.transition_frames,
    )?;
    sink.begin(VideoConfig {
        width: renderer.width(),
        height: renderer.height(),
        fps: config.video_fps,
    })?;
    for planned in plan.frames() {
        let frame = renderer.render(task.grid_size(), &planned.blocks, task.color())?;
        for _ in 0..planned.repeat {
            sink.push_frame(&frame)?;
        }
    }
    sink.end()?;
    Ok(plan.frame_count())
}

#[tracing::instrument(level = "debug", skip(config, renderer))]
fn write_sample(
    config: &GenerationConfig,
    renderer: &mut GridRenderer,
    base_seed: u64,
    index: u64,
    emit_video: bool,
) -> GridShiftResult<bool> {
    let seed = sample_seed(base_seed, index);
    let task = task_for_sample(config, base_seed, index)?;
    let task_id = config.task_id(index);

    let staged = StagedTask::begin(&config.task_root(), &task_id)?;
    let first = renderer.render_layout(task.initial(), task.color())?;
    staged.write_png(FIRST_FRAME, &first)?;
    let last = renderer.render_layout(task.final_layout(), task.color())?;
    staged.write_png(FINAL_FRAME, &last)?;
    staged.write_text(PROMPT, task.instruction())?;

    if emit_video {
        let mut sink = Mp4Sink::new(staged.path(VIDEO));
        write_transition(renderer, &task, config, &mut sink)?;
    }

    let meta = TaskMetadata::new(
        &task_id,
        &config.domain,
        seed,
        &task,
        config.image_size,
        emit_video,
    );
    staged.write_json(METADATA, &meta)?;
    let dir = staged.commit()?;

    tracing::debug!(
        task_id = %task_id,
        grid_size = task.grid_size(),
        direction = %task.shift().direction(),
        magnitude = task.shift().magnitude(),
        dir = %dir.display(),
        "task written"
    );
    Ok(emit_video)
}

fn build_thread_pool(threads: Option<usize>) -> GridShiftResult<rayon::ThreadPool> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| GridShiftError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::InMemorySink;

    #[test]
    fn sample_seeds_are_disjoint_and_wrap() {
        assert_eq!(sample_seed(42, 0), 42);
        assert_eq!(sample_seed(42, 3), 45);
        assert_eq!(sample_seed(u64::MAX, 1), 0);
    }

    #[test]
    fn task_for_sample_is_reproducible() {
        let cfg = GenerationConfig::default();
        let a = task_for_sample(&cfg, 42, 5).unwrap();
        let b = task_for_sample(&cfg, 42, 5).unwrap();
        assert_eq!(a, b);
        let c = task_for_sample(&cfg, 42, 6).unwrap();
        let d = task_for_sample(&cfg, 43, 5).unwrap();
        assert_eq!(c, d);
    }

    #[test]
    fn transition_starts_and_ends_on_rendered_layouts() {
        let cfg = GenerationConfig {
            image_size: (96, 96),
            ..GenerationConfig::default()
        };
        let task = task_for_sample(&cfg, 1, 0).unwrap();
        let mut renderer = GridRenderer::new(96, 96).unwrap();
        let mut sink = InMemorySink::new();

        let n = write_transition(&mut renderer, &task, &cfg, &mut sink).unwrap();
        assert_eq!(n, 35);
        assert_eq!(sink.frames().len(), 35);
        assert!(sink.is_finished());
        assert_eq!(sink.config().map(|c| c.fps), Some(10));

        let first = renderer.render_layout(task.initial(), task.color()).unwrap();
        let last = renderer.render_layout(task.final_layout(), task.color()).unwrap();
        assert_eq!(sink.frames()[0].data, first.data);
        assert_eq!(sink.frames()[4].data, first.data);
        assert_eq!(sink.frames()[34].data, last.data);
        assert_ne!(sink.frames()[15].data, first.data);
    }

    #[test]
    fn zero_threads_is_a_configuration_error() {
        let cfg = GenerationConfig {
            output_dir: PathBuf::from("target").join("pipeline_zero_threads"),
            emit_video: false,
            ..GenerationConfig::default()
        };
        let err = generate_dataset(
            &cfg,
            &BatchThreading {
                parallel: true,
                threads: Some(0),
            },
        )
        .unwrap_err();
        assert!(err.is_configuration());
        assert!(!cfg.task_root().exists());
    }

    #[test]
    fn invalid_config_writes_nothing() {
        let cfg = GenerationConfig {
            grid_size: 2,
            num_blocks: 3,
            output_dir: PathBuf::from("target").join("pipeline_invalid_config"),
            ..GenerationConfig::default()
        };
        let _ = std::fs::remove_dir_all(&cfg.output_dir);
        let err = generate_dataset(&cfg, &BatchThreading::default()).unwrap_err();
        assert!(err.is_configuration());
        assert!(!cfg.output_dir.exists());
    }
}
