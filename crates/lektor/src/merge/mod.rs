pub mod ffmpeg;
#[cfg(unix)]
pub mod fifo;

pub use ffmpeg::FfmpegMuxer;

use std::{
    future::Future,
    path::{Path, PathBuf},
};

use crate::{error::LektorResult, TrackKind};

/// An external process combining one video and one audio input into `output`.
///
/// Inputs may be named pipes: implementations must read both of them
/// concurrently or in any order, and must not seek.
pub trait Muxer {
    fn mux(
        &self,
        video: &Path,
        audio: &Path,
        output: &Path,
    ) -> impl Future<Output = LektorResult<()>> + Send;
}

/// Files a job may leave in the lesson directory.
#[derive(Debug, Clone)]
pub struct JobArtifacts {
    pub output: PathBuf,
    pub fallback_video: PathBuf,
    pub fallback_audio: PathBuf,
}

impl JobArtifacts {
    pub fn new<P>(dir: P, index: usize) -> Self
    where
        P: AsRef<Path>,
    {
        let dir = dir.as_ref();
        Self {
            output: dir.join(format!("output{index}.mp4")),
            fallback_video: dir.join(format!("{}{index}.mp4", TrackKind::Video)),
            fallback_audio: dir.join(format!("{}{index}.mp4", TrackKind::Audio)),
        }
    }

    /// Replaces whatever the muxer left behind with the raw init blocks.
    pub async fn write_fallback(&self, video_init: &[u8], audio_init: &[u8]) -> LektorResult<()> {
        remove_if_exists(&self.output).await?;
        tokio::fs::write(&self.fallback_video, video_init).await?;
        tokio::fs::write(&self.fallback_audio, audio_init).await?;
        Ok(())
    }

    /// Removes raw init blocks left by an earlier failed run of the same job.
    pub async fn clear_fallback(&self) -> LektorResult<()> {
        remove_if_exists(&self.fallback_video).await?;
        remove_if_exists(&self.fallback_audio).await?;
        Ok(())
    }
}

async fn remove_if_exists(path: &Path) -> LektorResult<()> {
    match tokio::fs::remove_file(path).await {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
        _ => Ok(()),
    }
}
