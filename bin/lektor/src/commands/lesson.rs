use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    sync::{Arc, LazyLock},
};

use anyhow::{bail, Context};
use clap::Parser;
use lektor::{
    fetch::ChallengeFetcher, job::MuxJob, merge::ffmpeg::FfmpegMuxer,
    player::canonical_embed_url, BrowserHeaders,
};
use lektor_soundcloud::SoundCloudClient;
use regex::Regex;
use reqwest::Url;
use tokio::{sync::Semaphore, task::JoinSet};

use super::{mux_job, HttpOptions, MuxOptions, SoundCloudOptions};

static IFRAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<iframe[\s\S]+?src="(.+?)"[\s\S]*?</iframe>"#).unwrap());

/// Download every embedded player of one or more lesson pages
#[derive(Parser, Clone, Debug)]
#[clap(name = "lesson")]
pub struct LessonCommand {
    #[clap(flatten)]
    pub http: HttpOptions,

    #[clap(flatten)]
    pub mux: MuxOptions,

    #[clap(flatten)]
    pub soundcloud: SoundCloudOptions,

    /// Output directory, one sub directory is created per lesson
    #[clap(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Lessons processed at the same time
    #[clap(long, default_value = "20")]
    pub concurrency: usize,

    /// Lesson page URLs
    #[clap(required = true)]
    pub urls: Vec<String>,
}

/// Media found in one lesson iframe.
#[derive(Debug, PartialEq, Eq)]
enum Embed {
    Video(String),
    SoundCloud(String),
}

impl Embed {
    fn classify(src: &str) -> Option<Self> {
        if src.contains("soundcloud") && src.contains("track") {
            Some(Self::SoundCloud(src.to_string()))
        } else if src.contains("vimeo") {
            canonical_embed_url(src).map(Self::Video)
        } else {
            None
        }
    }
}

struct LessonContext {
    fetcher: ChallengeFetcher,
    headers: BrowserHeaders,
    http: HttpOptions,
    job: MuxJob<FfmpegMuxer>,
    soundcloud: Option<SoundCloudClient>,
    output: PathBuf,
}

impl LessonCommand {
    pub async fn run(self) -> anyhow::Result<()> {
        let client = self.http.into_client()?;
        let context = Arc::new(LessonContext {
            fetcher: ChallengeFetcher::new(client.clone()),
            headers: self.http.headers(),
            job: mux_job(&client, &self.http, &self.mux)?,
            soundcloud: self.soundcloud.into_client(client),
            http: self.http,
            output: self.output,
        });

        let mut failed = 0;
        let mut urls = Vec::with_capacity(self.urls.len());
        for url in &self.urls {
            match Url::parse(url) {
                Ok(url) => urls.push(url),
                Err(e) => {
                    tracing::error!("Invalid lesson URL {url}: {e}");
                    failed += 1;
                }
            }
        }

        let semaphore = Arc::new(Semaphore::new(self.concurrency.max(1)));
        let mut tasks = JoinSet::new();
        for (url, lesson_dir) in unique_lessons(urls) {
            let context = context.clone();
            let semaphore = semaphore.clone();
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await?;
                context
                    .download_lesson(&url, &lesson_dir)
                    .await
                    .with_context(|| format!("Lesson {url}"))
            });
        }

        while let Some(result) = tasks.join_next().await {
            match result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::error!("{e:#}");
                    failed += 1;
                }
                Err(e) => {
                    tracing::error!("Lesson task panicked: {e}");
                    failed += 1;
                }
            }
        }

        if failed > 0 {
            bail!("{failed} lesson(s) failed");
        }
        Ok(())
    }
}

impl LessonContext {
    async fn download_lesson(&self, url: &Url, lesson_dir: &Path) -> anyhow::Result<()> {
        self.http.apply_cookies(self.fetcher.client(), url);

        let page = self
            .fetcher
            .get(url.as_str(), self.headers.to_header_map()?)
            .await?;
        let sources = iframe_sources(&String::from_utf8_lossy(&page));

        let lesson_dir = self.output.join(lesson_dir);
        tokio::fs::create_dir_all(&lesson_dir).await?;
        tracing::info!("{url}: {} iframes", sources.len());

        let mut failed = 0;
        for (index, src) in sources.iter().enumerate() {
            let Some(embed) = Embed::classify(src) else {
                tracing::debug!("Skipping iframe {index}: {src}");
                continue;
            };
            if let Err(e) = self.download_embed(&embed, &lesson_dir, index).await {
                tracing::error!("[{}#{index}] {e:#}", lesson_dir.display());
                failed += 1;
            }
        }

        if failed > 0 {
            bail!("{failed} of {} embeds failed", sources.len());
        }
        Ok(())
    }

    async fn download_embed(
        &self,
        embed: &Embed,
        lesson_dir: &Path,
        index: usize,
    ) -> anyhow::Result<PathBuf> {
        match embed {
            Embed::Video(embed_url) => self
                .job
                .run(embed_url, lesson_dir, index)
                .await
                .with_context(|| format!("Video {embed_url}")),
            Embed::SoundCloud(src) => {
                let Some(soundcloud) = &self.soundcloud else {
                    bail!("SoundCloud track {src} skipped, no client id configured");
                };
                soundcloud.download(src, lesson_dir, index).await
            }
        }
    }
}

fn iframe_sources(page: &str) -> Vec<String> {
    IFRAME_REGEX
        .captures_iter(page)
        .map(|captures| captures[1].replace("&amp;", "&"))
        .collect()
}

/// Directory of a lesson relative to the output directory, mirroring the
/// URL path so that distinct lessons never share job indexes.
fn lesson_dir(url: &Url) -> PathBuf {
    let dir: PathBuf = url
        .path_segments()
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect();
    if dir.as_os_str().is_empty() {
        PathBuf::from("lesson")
    } else {
        dir
    }
}

/// Pairs every lesson with its directory. URLs resolving to a directory that
/// is already taken are skipped, two jobs must not run on the same endpoints.
fn unique_lessons(urls: Vec<Url>) -> Vec<(Url, PathBuf)> {
    let mut seen = HashSet::new();
    urls.into_iter()
        .filter_map(|url| {
            let dir = lesson_dir(&url);
            if seen.insert(dir.clone()) {
                Some((url, dir))
            } else {
                tracing::warn!("Skipping {url}, {} is taken by another lesson", dir.display());
                None
            }
        })
        .collect()
}
