mod model;
mod track;

pub use track::TrackRef;

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use lektor::HttpClient;
use model::{ResolveResponse, StreamLocation};
use serde::de::DeserializeOwned;
use tokio::{fs::File, io::AsyncWriteExt};
use url::Url;

const WIDGET_API: &str = "https://api-widget.soundcloud.com";

/// Downloads the audio tracks of SoundCloud widgets embedded in lessons.
#[derive(Clone)]
pub struct SoundCloudClient {
    client: HttpClient,
    client_id: String,
    api_base: String,
}

impl SoundCloudClient {
    pub fn new<S>(client: HttpClient, client_id: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            client,
            client_id: client_id.into(),
            api_base: WIDGET_API.to_string(),
        }
    }

    pub fn with_api_base<S>(mut self, api_base: S) -> Self
    where
        S: Into<String>,
    {
        self.api_base = api_base.into();
        self
    }

    /// Saves the track of `iframe_src` as `soundcloudaudio<index>.mp3` in `lesson_dir`.
    pub async fn download<P>(&self, iframe_src: &str, lesson_dir: P, index: usize) -> anyhow::Result<PathBuf>
    where
        P: AsRef<Path>,
    {
        let track = TrackRef::parse(iframe_src)
            .ok_or_else(|| anyhow!("No track id in widget source {iframe_src}"))?;
        let playlist_url = self.playlist_url(&track).await?;
        let segments = self.segments(&playlist_url).await?;
        log::info!("Track {}: {} segments", track.id, segments.len());

        let output = lesson_dir
            .as_ref()
            .join(format!("soundcloudaudio{index}.mp3"));
        if let Err(e) = self.write_segments(&segments, &output).await {
            _ = tokio::fs::remove_file(&output).await;
            return Err(e.context(format!("Failed to download track {}", track.id)));
        }

        Ok(output)
    }

    /// Resolves the track and follows its first transcoding to the media playlist.
    pub async fn playlist_url(&self, track: &TrackRef) -> anyhow::Result<Url> {
        let resolve_url = Url::parse_with_params(
            &format!("{}/resolve", self.api_base),
            [
                ("url", track.api_url().as_str()),
                ("format", "json"),
                ("client_id", self.client_id.as_str()),
            ],
        )?;
        let resolved: ResolveResponse = self
            .get_json(resolve_url)
            .await
            .context("Invalid resolve response")?;

        let transcoding = resolved
            .media
            .transcodings
            .first()
            .ok_or_else(|| anyhow!("Track {} has no transcodings", track.id))?;
        let mut transcoding_url = Url::parse(&transcoding.url)?;
        transcoding_url
            .query_pairs_mut()
            .append_pair("client_id", &self.client_id);

        let location: StreamLocation = self
            .get_json(transcoding_url)
            .await
            .context("Invalid transcoding response")?;

        Ok(Url::parse(&location.url)?)
    }

    /// Segment URLs of a media playlist, in playback order.
    pub async fn segments(&self, playlist_url: &Url) -> anyhow::Result<Vec<Url>> {
        let body = self
            .client
            .get(playlist_url.clone())
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        let playlist = m3u8_rs::parse_media_playlist_res(&body)
            .map_err(|e| anyhow!("Invalid media playlist {playlist_url}: {e:?}"))?;

        playlist
            .segments
            .iter()
            .map(|segment| Ok(playlist_url.join(&segment.uri)?))
            .collect()
    }

    async fn get_json<T>(&self, url: Url) -> anyhow::Result<T>
    where
        T: DeserializeOwned,
    {
        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn write_segments(&self, segments: &[Url], output: &Path) -> anyhow::Result<()> {
        let mut file = File::create(output).await?;
        for url in segments {
            let bytes = self
                .client
                .get(url.clone())
                .send()
                .await?
                .error_for_status()?
                .bytes()
                .await?;
            log::debug!("{url}: {} bytes", bytes.len());
            file.write_all(&bytes).await?;
        }
        file.flush().await?;
        Ok(())
    }
}
