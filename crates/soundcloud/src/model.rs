use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ResolveResponse {
    pub media: Media,
}

#[derive(Debug, Deserialize)]
pub struct Media {
    pub transcodings: Vec<Transcoding>,
}

#[derive(Debug, Deserialize)]
pub struct Transcoding {
    pub url: String,
}

/// Answer of a transcoding endpoint: where the playlist currently lives.
#[derive(Debug, Deserialize)]
pub struct StreamLocation {
    pub url: String,
}
