use std::path::{Path, PathBuf};

use crate::{
    error::LektorResult,
    fetch::ChallengeFetcher,
    merge::{fifo::FifoPair, JobArtifacts, Muxer},
    player::{ManifestResolver, MediaPlan},
    stream::stream_to_fifo,
    util::http::{BrowserHeaders, HttpClient},
    TrackKind,
};

/// Turns one player embed into one muxed file.
///
/// ```text
/// INIT ──► STREAMS_OPEN ──► MUXING ──┬──► DONE
///                                    └──► FAILED (raw init blocks written)
/// ```
pub struct MuxJob<M> {
    client: HttpClient,
    resolver: ManifestResolver,
    muxer: M,
}

impl<M> MuxJob<M>
where
    M: Muxer + Sync,
{
    pub fn new(client: HttpClient, muxer: M) -> Self {
        let resolver = ManifestResolver::new(
            ChallengeFetcher::new(client.clone()),
            BrowserHeaders::default(),
        );
        Self {
            client,
            resolver,
            muxer,
        }
    }

    pub fn with_resolver(mut self, resolver: ManifestResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Resolves `embed_url` and muxes it into `output<index>.mp4` inside `lesson_dir`.
    pub async fn run<P>(&self, embed_url: &str, lesson_dir: P, index: usize) -> LektorResult<PathBuf>
    where
        P: AsRef<Path>,
    {
        let resolved = self.resolver.resolve(embed_url).await?;
        let plan = MediaPlan::new(&resolved)?;
        self.mux(&plan, lesson_dir, index).await
    }

    pub async fn mux<P>(&self, plan: &MediaPlan, lesson_dir: P, index: usize) -> LektorResult<PathBuf>
    where
        P: AsRef<Path>,
    {
        let lesson_dir = lesson_dir.as_ref();
        let artifacts = JobArtifacts::new(lesson_dir, index);
        // Owning the endpoints of `index` also means owning its artifacts. When
        // another job holds them, nothing in the directory is touched.
        // Both are removed on every exit path when `fifos` goes out of scope.
        let fifos = FifoPair::create(lesson_dir, index)?;
        let label = format!("{}#{index}", lesson_dir.display());
        tracing::info!(
            "[{label}] INIT: {} video and {} audio segments",
            plan.video.segments.len(),
            plan.audio.segments.len()
        );

        match self.stream_and_mux(plan, &fifos, &artifacts, &label).await {
            Ok(()) => {
                tracing::info!("[{label}] DONE: {}", artifacts.output.display());
                Ok(artifacts.output)
            }
            Err(e) => {
                tracing::error!("[{label}] FAILED: {e}");
                match artifacts
                    .write_fallback(&plan.video.init_segment, &plan.audio.init_segment)
                    .await
                {
                    Ok(()) => tracing::warn!(
                        "Raw init segments saved to {} and {}",
                        artifacts.fallback_video.display(),
                        artifacts.fallback_audio.display()
                    ),
                    Err(e) => tracing::error!("Failed to save raw init segments: {e}"),
                }
                Err(e)
            }
        }
    }

    async fn stream_and_mux(
        &self,
        plan: &MediaPlan,
        fifos: &FifoPair,
        artifacts: &JobArtifacts,
        label: &str,
    ) -> LektorResult<()> {
        // raw init blocks of an earlier failed run
        artifacts.clear_fallback().await?;

        tracing::info!("[{label}] STREAMS_OPEN");
        tracing::info!("[{label}] MUXING");
        tokio::try_join!(
            self.muxer.mux(
                fifos.path(TrackKind::Video),
                fifos.path(TrackKind::Audio),
                &artifacts.output
            ),
            stream_to_fifo(&self.client, &plan.video, fifos.path(TrackKind::Video)),
            stream_to_fifo(&self.client, &plan.audio, fifos.path(TrackKind::Audio)),
        )?;

        Ok(())
    }
}
