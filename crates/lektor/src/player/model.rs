use base64::{prelude::BASE64_STANDARD, Engine};
use serde::Deserialize;

use crate::error::LektorResult;

/// Segmented-media description returned by the player's manifest endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    /// Relative to the manifest document itself.
    pub base_url: String,
    pub video: Vec<Rendition>,
    pub audio: Vec<Rendition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Rendition {
    /// Base64 encoded container initialization block.
    pub init_segment: String,
    /// Relative to [Manifest::base_url].
    pub base_url: String,
    pub bitrate: u64,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    /// Download and write order.
    pub segments: Vec<SegmentRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SegmentRef {
    pub url: String,
}

impl Rendition {
    pub fn decode_init_segment(&self) -> LektorResult<Vec<u8>> {
        Ok(BASE64_STANDARD.decode(self.init_segment.trim())?)
    }

    pub fn has_dimensions(&self, width: u32, height: u32) -> bool {
        self.width == width && self.height == height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_manifest() {
        let manifest: Manifest = serde_json::from_str(
            r#"{
                "clip_id": "0d6b",
                "base_url": "../",
                "video": [{
                    "id": "v1",
                    "base_url": "video/",
                    "bitrate": 1500000,
                    "width": 1280,
                    "height": 720,
                    "init_segment": "AAAAGGZ0eXA=",
                    "segments": [{"start": 0, "url": "segment-1.m4s"}, {"url": "segment-2.m4s"}]
                }],
                "audio": [{
                    "base_url": "audio/",
                    "bitrate": 128000,
                    "init_segment": "AAAA",
                    "segments": [{"url": "segment-1.m4s"}]
                }]
            }"#,
        )
        .unwrap();

        assert_eq!(manifest.base_url, "../");
        assert_eq!(manifest.video[0].segments.len(), 2);
        assert_eq!(manifest.video[0].segments[1].url, "segment-2.m4s");
        assert_eq!(manifest.audio[0].width, 0);
        assert_eq!(
            manifest.video[0].decode_init_segment().unwrap(),
            b"\0\0\0\x18ftyp"
        );
    }

    #[test]
    fn test_missing_field() {
        let result = serde_json::from_str::<Manifest>(r#"{"base_url": "", "video": []}"#);
        assert!(result.is_err());
    }
}
