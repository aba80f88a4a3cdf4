use std::{
    io::{Read as _, Write as _},
    path::{Path, PathBuf},
    process::{Child, ChildStdin, Command, Stdio},
};

use crate::encode::sink::{FrameSink, VideoConfig};
use crate::foundation::error::{GridShiftError, GridShiftResult};
use crate::render::FrameRGBA;

/// Sink that pipes raw RGBA frames into the system `ffmpeg` and writes an H.264 MP4.
pub struct Mp4Sink {
    out_path: PathBuf,
    overwrite: bool,
    /// Background used to flatten any alpha before encoding.
    bg_rgba: [u8; 4],

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,
    scratch: Vec<u8>,
    cfg: Option<VideoConfig>,
}

impl Mp4Sink {
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            bg_rgba: [255, 255, 255, 255],
            child: None,
            stdin: None,
            stderr_drain: None,
            scratch: Vec::new(),
            cfg: None,
        }
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn out_path(&self) -> &Path {
        &self.out_path
    }
}

impl FrameSink for Mp4Sink {
    fn begin(&mut self, cfg: VideoConfig) -> GridShiftResult<()> {
        cfg.validate()?;

        if let Some(parent) = self.out_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                GridShiftError::io(format!(
                    "failed to create output directory '{}': {e}",
                    parent.display()
                ))
            })?;
        }
        if !self.overwrite && self.out_path.exists() {
            return Err(GridShiftError::encode(format!(
                "output file '{}' already exists",
                self.out_path.display()
            )));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .arg(if self.overwrite { "-y" } else { "-n" })
            .args([
                "-loglevel",
                "error",
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgba",
                "-s",
                &format!("{}x{}", cfg.width, cfg.height),
                "-r",
                &cfg.fps.to_string(),
                "-i",
                "pipe:0",
                "-an",
                "-c:v",
                "libx264",
                "-pix_fmt",
                "yuv420p",
                "-movflags",
                "+faststart",
            ])
            .arg(&self.out_path);

        let mut child = cmd.spawn().map_err(|e| {
            GridShiftError::encode(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| GridShiftError::encode("failed to open ffmpeg stdin"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| GridShiftError::encode("failed to open ffmpeg stderr"))?;
        // Drained on a thread so a chatty ffmpeg cannot block on a full stderr pipe.
        let stderr_drain = std::thread::spawn(move || {
            let mut bytes = Vec::new();
            stderr.read_to_end(&mut bytes)?;
            Ok(bytes)
        });

        self.scratch = vec![0u8; (cfg.width as usize) * (cfg.height as usize) * 4];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        Ok(())
    }

    fn push_frame(&mut self, frame: &FrameRGBA) -> GridShiftResult<()> {
        let cfg = self
            .cfg
            .ok_or_else(|| GridShiftError::encode("mp4 sink not started"))?;
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(GridShiftError::encode(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }

        flatten_to_opaque_rgba8(
            &mut self.scratch,
            &frame.data,
            frame.premultiplied,
            self.bg_rgba,
        )?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(GridShiftError::encode("mp4 sink is already finalized"));
        };
        stdin.write_all(&self.scratch).map_err(|e| {
            GridShiftError::encode(format!("failed to write frame to ffmpeg stdin: {e}"))
        })
    }

    fn end(&mut self) -> GridShiftResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| GridShiftError::encode("mp4 sink not started"))?;

        let status = child.wait().map_err(|e| {
            GridShiftError::encode(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| GridShiftError::encode("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| GridShiftError::encode(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };
        self.cfg = None;

        if !status.success() {
            return Err(GridShiftError::encode(format!(
                "ffmpeg exited with status {status}: {}",
                String::from_utf8_lossy(&stderr_bytes).trim()
            )));
        }
        Ok(())
    }
}

impl Drop for Mp4Sink {
    fn drop(&mut self) {
        // Abandoned mid-stream (an earlier frame failed): do not leave ffmpeg running.
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

fn flatten_to_opaque_rgba8(
    dst: &mut [u8],
    src: &[u8],
    src_is_premul: bool,
    bg_rgba: [u8; 4],
) -> GridShiftResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(GridShiftError::encode(format!(
            "frame holds {} bytes, expected {}",
            src.len(),
            dst.len()
        )));
    }

    let bg = [
        u16::from(bg_rgba[0]),
        u16::from(bg_rgba[1]),
        u16::from(bg_rgba[2]),
    ];
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255 - a;
        for c in 0..3 {
            let fg = if src_is_premul {
                u16::from(s[c])
            } else {
                mul_div255(u16::from(s[c]), a)
            };
            d[c] = (fg + mul_div255(bg[c], inv)).min(255) as u8;
        }
        d[3] = 255;
    }
    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flatten_premul_over_black_produces_expected_rgb() {
        let src = vec![128u8, 0, 0, 128];
        let mut dst = vec![0u8; 4];
        flatten_to_opaque_rgba8(&mut dst, &src, true, [0, 0, 0, 255]).unwrap();
        assert_eq!(dst, vec![128u8, 0, 0, 255]);
    }

    #[test]
    fn flatten_straight_over_white_blends_background() {
        let src = vec![0u8, 0, 0, 0];
        let mut dst = vec![0u8; 4];
        flatten_to_opaque_rgba8(&mut dst, &src, false, [255, 255, 255, 255]).unwrap();
        assert_eq!(dst, vec![255u8, 255, 255, 255]);
    }

    #[test]
    fn flatten_rejects_mismatched_buffers() {
        let mut dst = vec![0u8; 8];
        assert!(flatten_to_opaque_rgba8(&mut dst, &[0u8; 4], true, [0; 4]).is_err());
    }

    #[test]
    fn push_before_begin_is_an_error() {
        let mut sink = Mp4Sink::new("target/never_written.mp4");
        let frame = FrameRGBA {
            width: 2,
            height: 2,
            data: vec![0; 16],
            premultiplied: true,
        };
        assert!(sink.push_frame(&frame).is_err());
        assert!(sink.end().is_err());
    }
}
