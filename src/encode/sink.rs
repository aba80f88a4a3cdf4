use crate::foundation::error::{GridShiftError, GridShiftResult};
use crate::render::FrameRGBA;

/// Stream parameters handed to a [`FrameSink`] before the first frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VideoConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

impl VideoConfig {
    pub fn validate(&self) -> GridShiftResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(GridShiftError::encode("video width/height must be non-zero"));
        }
        if self.fps == 0 {
            return Err(GridShiftError::encode("video fps must be non-zero"));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            return Err(GridShiftError::encode(
                "video width/height must be even (required for yuv420p mp4 output)",
            ));
        }
        Ok(())
    }
}

/// Consumer of video frames in playback order.
pub trait FrameSink {
    /// Called once before any frame.
    fn begin(&mut self, cfg: VideoConfig) -> GridShiftResult<()>;
    /// Push the next frame.
    fn push_frame(&mut self, frame: &FrameRGBA) -> GridShiftResult<()>;
    /// Called once after the last frame.
    fn end(&mut self) -> GridShiftResult<()>;
}

/// Collects frames in memory; used in tests and for previews.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<VideoConfig>,
    frames: Vec<FrameRGBA>,
    finished: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(&self) -> Option<VideoConfig> {
        self.cfg
    }

    pub fn frames(&self) -> &[FrameRGBA] {
        &self.frames
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: VideoConfig) -> GridShiftResult<()> {
        cfg.validate()?;
        self.cfg = Some(cfg);
        self.frames.clear();
        self.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, frame: &FrameRGBA) -> GridShiftResult<()> {
        let cfg = self
            .cfg
            .ok_or_else(|| GridShiftError::encode("in-memory sink not started"))?;
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(GridShiftError::encode(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        self.frames.push(frame.clone());
        Ok(())
    }

    fn end(&mut self) -> GridShiftResult<()> {
        self.finished = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(w: u32, h: u32) -> FrameRGBA {
        FrameRGBA {
            width: w,
            height: h,
            data: vec![255; (w * h * 4) as usize],
            premultiplied: true,
        }
    }

    #[test]
    fn config_validation_catches_bad_values() {
        let ok = VideoConfig {
            width: 10,
            height: 10,
            fps: 10,
        };
        assert!(ok.validate().is_ok());
        assert!(VideoConfig { width: 0, ..ok }.validate().is_err());
        assert!(VideoConfig { width: 11, ..ok }.validate().is_err());
        assert!(VideoConfig { fps: 0, ..ok }.validate().is_err());
    }

    #[test]
    fn in_memory_sink_checks_frame_size() {
        let mut sink = InMemorySink::new();
        assert!(sink.push_frame(&frame(4, 4)).is_err());

        sink.begin(VideoConfig {
            width: 4,
            height: 4,
            fps: 10,
        })
        .unwrap();
        sink.push_frame(&frame(4, 4)).unwrap();
        assert!(sink.push_frame(&frame(2, 4)).is_err());
        sink.end().unwrap();

        assert_eq!(sink.frames().len(), 1);
        assert!(sink.is_finished());
    }
}
