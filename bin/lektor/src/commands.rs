use std::{path::PathBuf, time::Duration};

use clap::{Args, Subcommand};
use fake_user_agent::get_chrome_rua;
use lektor::{
    fetch::ChallengeFetcher,
    job::MuxJob,
    merge::ffmpeg::FfmpegMuxer,
    player::ManifestResolver,
    BrowserHeaders, HttpClient,
};
use lektor_soundcloud::SoundCloudClient;
use reqwest::{Client, Url};

mod audio;
mod lesson;
mod video;

#[derive(Subcommand, Clone)]
pub enum LektorCommand {
    Video(video::VideoCommand),
    Audio(audio::AudioCommand),
    Lesson(lesson::LessonCommand),
}

impl LektorCommand {
    pub async fn run(self) -> anyhow::Result<()> {
        match self {
            Self::Video(command) => command.run().await,
            Self::Audio(command) => command.run().await,
            Self::Lesson(command) => command.run().await,
        }
    }
}

#[derive(Args, Clone, Debug)]
pub struct HttpOptions {
    /// Session cookies, as copied from a browser `Cookie` header
    #[clap(long, env = "LEKTOR_COOKIES", hide_env_values = true)]
    pub cookies: Option<String>,

    /// User agent sent to the player host. A random Chrome one by default
    #[clap(long)]
    pub user_agent: Option<String>,

    /// Value of the `sec-ch-ua-platform` hint
    #[clap(long, default_value = "\"Windows\"")]
    pub platform: String,

    /// HTTP timeout, in seconds
    #[clap(short, long, default_value = "30")]
    pub timeout: u64,
}

impl HttpOptions {
    pub fn headers(&self) -> BrowserHeaders {
        BrowserHeaders::new(
            self.user_agent.clone().unwrap_or_else(|| get_chrome_rua().to_string()),
            self.platform.clone(),
        )
    }

    pub fn into_client(&self) -> anyhow::Result<HttpClient> {
        let builder = Client::builder().timeout(Duration::from_secs(self.timeout));
        Ok(HttpClient::new(builder)?)
    }

    /// Makes the session cookies available to every request for `url`.
    pub fn apply_cookies(&self, client: &HttpClient, url: &Url) {
        if let Some(cookies) = &self.cookies {
            client.add_cookies(cookies.split(';').filter(|c| !c.trim().is_empty()), url);
        }
    }
}

#[derive(Args, Clone, Debug)]
pub struct MuxOptions {
    /// Path to ffmpeg, searched in PATH by default
    #[clap(long)]
    pub ffmpeg: Option<PathBuf>,

    /// Additional ffmpeg output arguments
    #[clap(long, allow_hyphen_values = true)]
    pub ffmpeg_args: Option<String>,
}

impl MuxOptions {
    pub fn into_muxer(&self) -> anyhow::Result<FfmpegMuxer> {
        let muxer = match &self.ffmpeg {
            Some(binary) => FfmpegMuxer::with_binary(binary),
            None => FfmpegMuxer::new()?,
        };
        Ok(match &self.ffmpeg_args {
            Some(args) => muxer.with_extra_args(args)?,
            None => muxer,
        })
    }
}

#[derive(Args, Clone, Debug)]
pub struct SoundCloudOptions {
    /// Client id of the SoundCloud widget
    #[clap(long, env = "SOUNDCLOUD_CLIENT_ID")]
    pub client_id: Option<String>,
}

impl SoundCloudOptions {
    pub fn into_client(&self, client: HttpClient) -> Option<SoundCloudClient> {
        self.client_id
            .as_deref()
            .map(|client_id| SoundCloudClient::new(client, client_id))
    }
}

pub fn mux_job(
    client: &HttpClient,
    http: &HttpOptions,
    mux: &MuxOptions,
) -> anyhow::Result<MuxJob<FfmpegMuxer>> {
    let resolver = ManifestResolver::new(ChallengeFetcher::new(client.clone()), http.headers());
    Ok(MuxJob::new(client.clone(), mux.into_muxer()?).with_resolver(resolver))
}
