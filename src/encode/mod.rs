//! Video encoding sinks.

/// MP4 output through the system `ffmpeg`.
pub mod ffmpeg;
/// Frame sink trait and the in-memory sink.
pub mod sink;

pub use ffmpeg::{Mp4Sink, is_ffmpeg_on_path};
pub use sink::{FrameSink, InMemorySink, VideoConfig};
