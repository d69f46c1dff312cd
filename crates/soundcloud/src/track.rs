use std::sync::LazyLock;

use regex::Regex;

static TRACK_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"tracks(?:/|%2F)(\d+)").unwrap());
static SECRET_TOKEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"secret_token(?:=|%3D)([^&%"]+)"#).unwrap());

/// A track referenced by a widget iframe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRef {
    pub id: String,
    /// Needed for private tracks.
    pub secret_token: Option<String>,
}

impl TrackRef {
    pub fn parse(iframe_src: &str) -> Option<Self> {
        let id = TRACK_ID_REGEX.captures(iframe_src)?[1].to_string();
        let secret_token = SECRET_TOKEN_REGEX
            .captures(iframe_src)
            .map(|captures| captures[1].to_string());

        Some(Self { id, secret_token })
    }

    pub fn api_url(&self) -> String {
        match &self.secret_token {
            Some(token) => format!(
                "https://api.soundcloud.com/tracks/{}?secret_token={token}",
                self.id
            ),
            None => format!("https://api.soundcloud.com/tracks/{}", self.id),
        }
    }
}
