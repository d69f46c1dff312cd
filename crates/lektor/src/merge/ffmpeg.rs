use std::{
    path::{Path, PathBuf},
    process::Stdio,
};

use tokio::process::Command;

use super::Muxer;
use crate::error::{LektorError, LektorResult};

/// Muxes one video and one audio input into a single container with stream copy.
#[derive(Debug, Clone)]
pub struct FfmpegMuxer {
    binary: PathBuf,
    extra_args: Vec<String>,
}

impl FfmpegMuxer {
    /// Uses the `ffmpeg` found in `PATH`.
    pub fn new() -> LektorResult<Self> {
        Ok(Self::with_binary(which::which("ffmpeg")?))
    }

    pub fn with_binary<P>(binary: P) -> Self
    where
        P: Into<PathBuf>,
    {
        Self {
            binary: binary.into(),
            extra_args: Vec::new(),
        }
    }

    /// Extra output options, split like a shell would, inserted before the output path.
    pub fn with_extra_args(mut self, args: &str) -> LektorResult<Self> {
        self.extra_args = shlex::split(args)
            .ok_or_else(|| LektorError::MuxError(format!("invalid ffmpeg arguments: {args}")))?;
        Ok(self)
    }

    fn command(&self, video: &Path, audio: &Path, output: &Path) -> Command {
        let mut command = Command::new(&self.binary);
        command
            .args(["-y", "-hide_banner", "-loglevel", "error"])
            .arg("-i")
            .arg(video)
            .arg("-i")
            .arg(audio)
            .args(["-map", "0", "-map", "1", "-c", "copy"])
            .args(&self.extra_args)
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

impl Muxer for FfmpegMuxer {
    async fn mux(&self, video: &Path, audio: &Path, output: &Path) -> LektorResult<()> {
        tracing::debug!("Muxing with {}...", self.binary.display());

        let result = self.command(video, audio, output).output().await?;
        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(LektorError::MuxError(format!(
                "{} exited with {}: {}",
                self.binary.display(),
                result.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}
