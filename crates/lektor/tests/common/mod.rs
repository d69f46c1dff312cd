#![allow(dead_code)]

use base64::{prelude::BASE64_STANDARD, Engine};
use lektor::HttpClient;
use serde_json::json;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

pub const CHALLENGE_PAGE: &str = r#"<!DOCTYPE html><html lang="en-US"><head><title>Just a moment...</title></head><body></body></html>"#;

pub fn client() -> HttpClient {
    HttpClient::new(reqwest::Client::builder()).unwrap()
}

pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("lektor=trace")
        .with_test_writer()
        .try_init();
}

pub trait PlayerMock {
    async fn mock_bytes<B>(&self, mock_path: &str, body: B) -> &Self
    where
        B: Into<Vec<u8>>;

    async fn mock_status(&self, mock_path: &str, status: u16) -> &Self;
}

impl PlayerMock for MockServer {
    async fn mock_bytes<B>(&self, mock_path: &str, body: B) -> &Self
    where
        B: Into<Vec<u8>>,
    {
        Mock::given(method("GET"))
            .and(path(mock_path))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
            .mount(self)
            .await;
        self
    }

    async fn mock_status(&self, mock_path: &str, status: u16) -> &Self {
        Mock::given(method("GET"))
            .and(path(mock_path))
            .respond_with(ResponseTemplate::new(status))
            .mount(self)
            .await;
        self
    }
}

/// Embed page markup the way the player host serves it, with an escaped manifest URL.
pub fn embed_page(manifest_url: &str) -> String {
    let escaped = manifest_url.replace('/', r"\/").replace('&', "\\u0026");
    format!(
        r#"<html><body><script>window.playerConfig = {{"request":{{"files":{{"dash":{{"cdns":{{"akfire_interconnect_quic":{{"avc_url":"{escaped}","origin":"gcs"}}}}}}}}}}}};</script></body></html>"#
    )
}

/// Manifest with a 1080p and a 720p video rendition and two audio renditions.
///
/// Hosted at `/exp=1/v/1/avf/playlist.json`, the selected renditions resolve to
/// `/exp=1/range/video/` and `/exp=1/v/1/audio/`.
pub fn manifest_body(video_segments: &[&str], audio_segments: &[&str]) -> String {
    let segments = |urls: &[&str]| -> Vec<_> { urls.iter().map(|u| json!({ "url": u })).collect() };
    json!({
        "clip_id": "7f1c",
        "base_url": "../",
        "video": [
            {
                "id": "low",
                "base_url": "../../range/low/",
                "bitrate": 9000000,
                "width": 1280,
                "height": 720,
                "init_segment": BASE64_STANDARD.encode(b"LOWINIT"),
                "segments": segments(video_segments),
            },
            {
                "id": "high",
                "base_url": "../../range/video/",
                "bitrate": 4000000,
                "width": 1920,
                "height": 1080,
                "init_segment": BASE64_STANDARD.encode(b"VINIT"),
                "segments": segments(video_segments),
            }
        ],
        "audio": [
            {
                "base_url": "audio-low/",
                "bitrate": 64000,
                "init_segment": BASE64_STANDARD.encode(b"LOWAINIT"),
                "segments": segments(audio_segments),
            },
            {
                "base_url": "audio/",
                "bitrate": 128000,
                "init_segment": BASE64_STANDARD.encode(b"AINIT"),
                "segments": segments(audio_segments),
            }
        ]
    })
    .to_string()
}

pub const MANIFEST_PATH: &str = "/exp=1/v/1/avf/playlist.json";
pub const EMBED_PATH: &str = "/video/76979871";
